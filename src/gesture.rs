//! Gesture interpretation
//!
//! Turns raw hand landmarks into a screen-space pointer, a "grabbing" flag
//! and the blade trail (recent pointer samples, newest first).

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::perception::PerceptionFrame;

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

pub const LANDMARK_COUNT: usize = 21;

/// (fingertip, knuckle) pairs checked by the grab heuristic. Thumb excluded.
const FINGER_PAIRS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP, RING_MCP),
    (PINKY_TIP, PINKY_MCP),
];

/// Folded fingers needed to call it a fist
const GRAB_MIN_FOLDED: usize = 3;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One joint in normalized image coordinates ([0,1], y down, not mirrored)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A full hand as delivered by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from a flat `[x0, y0, x1, y1, ...]` buffer (42 values)
    pub fn from_flat(values: &[f32]) -> Option<Self> {
        if values.len() != LANDMARK_COUNT * 2 {
            return None;
        }
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        for (point, xy) in points.iter_mut().zip(values.chunks_exact(2)) {
            *point = Landmark::new(xy[0], xy[1]);
        }
        Some(Self { points })
    }

    #[inline]
    pub fn get(&self, joint: usize) -> Landmark {
        self.points[joint]
    }

    #[inline]
    pub fn index_tip(&self) -> Landmark {
        self.points[INDEX_TIP]
    }

    /// Number of fingers whose tip sits below (greater y than) its knuckle
    pub fn folded_fingers(&self) -> usize {
        FINGER_PAIRS
            .iter()
            .filter(|(tip, knuckle)| self.points[*tip].y > self.points[*knuckle].y)
            .count()
    }

    /// Cheap fist test, tolerant of one occluded finger
    pub fn is_grabbing(&self) -> bool {
        self.folded_fingers() >= GRAB_MIN_FOLDED
    }

    /// Idealized hand with the index tip at (x, y), open or fisted. Used to
    /// script input when no tracker is attached.
    pub fn synthetic(x: f32, y: f32, fist: bool) -> Self {
        let knuckle_y = if fist { y - 0.05 } else { y + 0.1 };
        let mut points = [Landmark::new(x, y + 0.2); LANDMARK_COUNT];
        for (tip, knuckle) in FINGER_PAIRS {
            points[knuckle] = Landmark::new(x, knuckle_y);
            points[tip] = Landmark::new(x, y);
        }
        Self { points }
    }
}

/// Semantic pointer derived from the index fingertip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    /// Screen-space position (mirrored, scaled to the render surface)
    pub pos: Vec2,
    pub grabbing: bool,
}

/// Map a normalized landmark to the selfie-view render surface
#[inline]
pub fn to_screen(landmark: Landmark, width: f32, height: f32) -> Vec2 {
    Vec2::new((1.0 - landmark.x) * width, landmark.y * height)
}

// ============================================================================
// BLADE TRAIL
// ============================================================================

/// A pointer position with its capture time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailSample {
    pub pos: Vec2,
    pub t_ms: f64,
}

/// Recent pointer samples, newest first, bounded by count and age
#[derive(Debug, Clone)]
pub struct Trail {
    samples: VecDeque<TrailSample>,
    max_len: usize,
    max_age_ms: f64,
}

impl Trail {
    pub fn new(max_len: usize, max_age_ms: f64) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_len + 1),
            max_len: max_len.max(1),
            max_age_ms,
        }
    }

    /// Record a sample at the head and drop anything over the length cap
    pub fn push(&mut self, pos: Vec2, t_ms: f64) {
        self.samples.push_front(TrailSample { pos, t_ms });
        self.samples.truncate(self.max_len);
    }

    /// Drop samples older than the age window
    pub fn evict(&mut self, now_ms: f64) {
        while let Some(oldest) = self.samples.back() {
            if now_ms - oldest.t_ms > self.max_age_ms {
                self.samples.pop_back();
            } else {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn newest(&self) -> Option<TrailSample> {
        self.samples.front().copied()
    }

    /// The two newest positions (newest, previous)
    pub fn blade_segment(&self) -> Option<(Vec2, Vec2)> {
        match (self.samples.front(), self.samples.get(1)) {
            (Some(a), Some(b)) => Some((a.pos, b.pos)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &TrailSample> {
        self.samples.iter()
    }
}

// ============================================================================
// INTERPRETER
// ============================================================================

/// Holds the latest pointer and trail between perception frames
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    width: f32,
    height: f32,
    pointer: Option<Pointer>,
    trail: Trail,
}

impl GestureInterpreter {
    pub fn new(width: f32, height: f32, trail_len: usize, trail_max_age_ms: f64) -> Self {
        Self {
            width,
            height,
            pointer: None,
            trail: Trail::new(trail_len, trail_max_age_ms),
        }
    }

    /// Apply one perception result
    ///
    /// A frame without a hand clears the trail at once so a stale blade can
    /// never slice anything.
    pub fn ingest(&mut self, frame: &PerceptionFrame) {
        match &frame.hand {
            Some(hand) => {
                let pos = to_screen(hand.index_tip(), self.width, self.height);
                let grabbing = hand.is_grabbing();
                self.pointer = Some(Pointer { pos, grabbing });
                self.trail.push(pos, frame.captured_at_ms);
            }
            None => {
                self.pointer = None;
                self.trail.clear();
            }
        }
    }

    /// Per-tick housekeeping: age out old trail samples
    pub fn evict(&mut self, now_ms: f64) {
        self.trail.evict(now_ms);
    }

    /// Drop the blade history but keep the pointer
    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    pub fn pointer(&self) -> Option<Pointer> {
        self.pointer
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Open hand with the index tip at (x, y); fingertips above knuckles
    pub(crate) fn open_hand(x: f32, y: f32) -> HandLandmarks {
        HandLandmarks::synthetic(x, y, false)
    }

    /// Fist with the index tip at (x, y); fingertips below knuckles
    pub(crate) fn fist(x: f32, y: f32) -> HandLandmarks {
        HandLandmarks::synthetic(x, y, true)
    }

    fn frame(hand: Option<HandLandmarks>, t: f64) -> PerceptionFrame {
        PerceptionFrame {
            hand,
            captured_at_ms: t,
        }
    }

    #[test]
    fn test_grab_needs_three_of_four() {
        let mut hand = open_hand(0.5, 0.5);
        assert!(!hand.is_grabbing());

        // Fold index, middle, ring
        for (tip, knuckle) in &FINGER_PAIRS[..3] {
            hand.points[*tip].y = hand.points[*knuckle].y + 0.05;
        }
        assert_eq!(hand.folded_fingers(), 3);
        assert!(hand.is_grabbing());

        // Only two folded
        hand.points[RING_TIP].y = hand.points[RING_MCP].y - 0.05;
        assert!(!hand.is_grabbing());
    }

    #[test]
    fn test_pointer_is_mirrored_and_scaled() {
        let mut gi = GestureInterpreter::new(1000.0, 500.0, 12, 250.0);
        gi.ingest(&frame(Some(open_hand(0.25, 0.4)), 0.0));
        let p = gi.pointer().expect("pointer");
        assert!((p.pos.x - 750.0).abs() < 1e-3);
        assert!((p.pos.y - 200.0).abs() < 1e-3);
        assert!(!p.grabbing);
    }

    #[test]
    fn test_trail_newest_first_and_bounded() {
        let mut gi = GestureInterpreter::new(100.0, 100.0, 3, 10_000.0);
        for i in 0..5 {
            gi.ingest(&frame(Some(open_hand(0.1 * i as f32, 0.5)), i as f64 * 16.0));
        }
        assert_eq!(gi.trail().len(), 3);
        let newest = gi.trail().newest().unwrap();
        assert_eq!(newest.t_ms, 64.0);
        let (a, b) = gi.trail().blade_segment().unwrap();
        assert!(a.x < b.x); // Mirrored: larger landmark x is further left
    }

    #[test]
    fn test_trail_age_eviction() {
        let mut trail = Trail::new(12, 100.0);
        trail.push(Vec2::ZERO, 0.0);
        trail.push(Vec2::ONE, 50.0);
        trail.evict(120.0);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.newest().unwrap().t_ms, 50.0);
        trail.evict(500.0);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_missing_hand_clears_trail() {
        let mut gi = GestureInterpreter::new(100.0, 100.0, 12, 1000.0);
        gi.ingest(&frame(Some(fist(0.5, 0.5)), 0.0));
        gi.ingest(&frame(Some(fist(0.6, 0.5)), 16.0));
        assert!(gi.pointer().unwrap().grabbing);
        assert_eq!(gi.trail().len(), 2);

        gi.ingest(&frame(None, 32.0));
        assert!(gi.pointer().is_none());
        assert!(gi.trail().is_empty());
        assert!(gi.trail().blade_segment().is_none());
    }

    #[test]
    fn test_from_flat() {
        let flat: Vec<f32> = (0..42).map(|i| i as f32 / 100.0).collect();
        let hand = HandLandmarks::from_flat(&flat).unwrap();
        assert_eq!(hand.get(INDEX_TIP), Landmark::new(0.16, 0.17));
        assert!(HandLandmarks::from_flat(&flat[..40]).is_none());
    }
}
