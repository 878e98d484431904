//! Calibration gate
//!
//! The player holds a fingertip inside the central ring until the meter
//! fills. Leaving the ring drains the meter slowly instead of zeroing it.

use glam::Vec2;

use crate::config::Tuning;
use crate::geometry::point_in_circle;
use crate::gesture::Pointer;

#[derive(Debug, Clone)]
pub struct Calibration {
    center: Vec2,
    radius: f32,
    fill: f32,
    decay: f32,
    target: f32,
    accumulated: f32,
    complete: bool,
}

impl Calibration {
    pub fn new(center: Vec2, radius: f32, fill: f32, decay: f32, target: f32) -> Self {
        Self {
            center,
            radius,
            fill,
            decay,
            target: target.max(f32::EPSILON),
            accumulated: 0.0,
            complete: false,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(
            tuning.center(),
            tuning.calibration_radius,
            tuning.calibration_fill,
            tuning.calibration_decay,
            tuning.calibration_target,
        )
    }

    /// Advance one frame. Returns true on the frame the meter fills.
    pub fn update(&mut self, pointer: Option<Pointer>) -> bool {
        if self.complete {
            return false;
        }

        let inside = pointer.is_some_and(|p| point_in_circle(p.pos, self.center, self.radius));
        if inside {
            self.accumulated += self.fill;
        } else {
            self.accumulated = (self.accumulated - self.decay).max(0.0);
        }

        if self.progress() >= 100.0 {
            self.complete = true;
            return true;
        }
        false
    }

    /// Percent in [0, 100]
    pub fn progress(&self) -> f32 {
        (self.accumulated / self.target * 100.0).min(100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}
