//! Geometry helpers for blade hit tests and UI hit regions

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Inclusive on all edges
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// True if `p` lies inside or on the circle
#[inline]
pub fn point_in_circle(p: Vec2, center: Vec2, radius: f32) -> bool {
    p.distance_squared(center) <= radius * radius
}

/// True if the segment `a`-`b` touches the circle
///
/// Endpoints inside the circle count as a hit. Otherwise the closest point of
/// the segment to the center is tested; projections falling outside the
/// segment are a miss.
pub fn segment_intersects_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    if point_in_circle(a, center, radius) || point_in_circle(b, center, radius) {
        return true;
    }

    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq == 0.0 {
        return false; // Degenerate segment, endpoints already tested
    }

    let t = (center - a).dot(seg) / len_sq;
    if !(0.0..=1.0).contains(&t) {
        return false;
    }

    point_in_circle(a + seg * t, center, radius)
}

/// Uniform sample in `[min, max)`; returns `min` for an empty range
#[inline]
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..max)
}
