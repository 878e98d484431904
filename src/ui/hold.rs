//! Frame-accumulated hold meter (in-game exit button)

use crate::geometry::Rect;
use crate::gesture::Pointer;

/// Fills while the fist is held over the region, empties the moment it isn't
#[derive(Debug, Clone)]
pub struct HoldMeter {
    region: Rect,
    fill: f32,
    value: f32,
}

impl HoldMeter {
    pub fn new(region: Rect, fill: f32) -> Self {
        Self {
            region,
            fill,
            value: 0.0,
        }
    }

    /// Advance one frame; true once the meter is full
    pub fn update(&mut self, pointer: Option<Pointer>) -> bool {
        let active = pointer.is_some_and(|p| p.grabbing && self.region.contains(p.pos));
        if active {
            self.value += self.fill;
        } else {
            self.value = 0.0;
        }
        self.value >= 100.0
    }

    /// Percent in [0, 100]
    pub fn progress(&self) -> f32 {
        self.value.min(100.0)
    }

    pub fn region(&self) -> Rect {
        self.region
    }
}
