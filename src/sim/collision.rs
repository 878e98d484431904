//! Blade-versus-entity hit detection
//!
//! The blade is the fingertip trail. A hit needs an entity center within the
//! hit radius of the blade: either the newest sample, or the segment between
//! the two newest samples so a fast swipe can't tunnel through a fruit.

use glam::Vec2;

use super::state::Entity;
use crate::config::BladeTest;
use crate::geometry::{point_in_circle, segment_intersects_circle};
use crate::gesture::Trail;

/// The cutting shape for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BladePath {
    Point(Vec2),
    Segment(Vec2, Vec2),
}

impl BladePath {
    /// Build from the current trail. `None` when the trail is empty.
    ///
    /// Segment testing falls back to the point when only one sample exists.
    pub fn from_trail(trail: &Trail, test: BladeTest) -> Option<Self> {
        let newest = trail.newest()?.pos;
        match test {
            BladeTest::Point => Some(BladePath::Point(newest)),
            BladeTest::Segment => Some(match trail.blade_segment() {
                Some((a, b)) => BladePath::Segment(a, b),
                None => BladePath::Point(newest),
            }),
        }
    }

    /// Does the blade pass within `radius` of `center`?
    pub fn hits(&self, center: Vec2, radius: f32) -> bool {
        match *self {
            BladePath::Point(p) => point_in_circle(p, center, radius),
            BladePath::Segment(a, b) => segment_intersects_circle(a, b, center, radius),
        }
    }
}

/// IDs of whole entities the blade cuts this frame, in entity order
pub fn sliced_entities(entities: &[Entity], blade: &BladePath, hit_radius: f32) -> Vec<u32> {
    entities
        .iter()
        .filter(|e| e.sliced.is_none() && blade.hits(e.pos, hit_radius))
        .map(|e| e.id)
        .collect()
}

/// IDs of whole entities whose centers are inside a circle (dodge target)
pub fn entities_touching(entities: &[Entity], center: Vec2, radius: f32) -> Vec<u32> {
    entities
        .iter()
        .filter(|e| e.sliced.is_none() && point_in_circle(e.pos, center, radius))
        .map(|e| e.id)
        .collect()
}
