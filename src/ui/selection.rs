//! Hover / hold-to-confirm selection
//!
//! A target fires only after the hand has hovered it with a closed fist for
//! the full hold duration. Releasing the fist, sliding off, or losing the
//! hand throws away all accumulated hold time.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::gesture::Pointer;

/// A named hit region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionTarget<T> {
    pub id: T,
    pub rect: Rect,
}

impl<T> SelectionTarget<T> {
    pub fn new(id: T, rect: Rect) -> Self {
        Self { id, rect }
    }
}

/// Selection state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState<T> {
    Idle,
    Hovering(T),
    Holding { target: T, started_ms: f64 },
    /// Action fired; stays here until the fist opens or the pointer leaves
    Confirmed(T),
}

/// Hold-to-confirm state machine over a set of targets
#[derive(Debug, Clone)]
pub struct SelectionMachine<T> {
    hold_ms: f64,
    state: SelectionState<T>,
    progress: f32,
}

impl<T: Copy + PartialEq> SelectionMachine<T> {
    pub fn new(hold_ms: f64) -> Self {
        Self {
            hold_ms: hold_ms.max(1.0),
            state: SelectionState::Idle,
            progress: 0.0,
        }
    }

    pub fn state(&self) -> SelectionState<T> {
        self.state
    }

    /// Hold progress in percent, [0, 100]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Target under the pointer, if any
    pub fn hovered(&self) -> Option<T> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Hovering(t)
            | SelectionState::Holding { target: t, .. }
            | SelectionState::Confirmed(t) => Some(t),
        }
    }

    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
        self.progress = 0.0;
    }

    /// Advance one frame. Returns the target id on the single frame its hold
    /// completes.
    pub fn update(
        &mut self,
        pointer: Option<Pointer>,
        targets: &[SelectionTarget<T>],
        now_ms: f64,
    ) -> Option<T> {
        let hovered = pointer.and_then(|p| {
            targets
                .iter()
                .find(|t| t.rect.contains(p.pos))
                .map(|t| t.id)
        });
        let grabbing = pointer.is_some_and(|p| p.grabbing);

        let Some(target) = hovered else {
            self.reset();
            return None;
        };

        if !grabbing {
            self.state = SelectionState::Hovering(target);
            self.progress = 0.0;
            return None;
        }

        match self.state {
            SelectionState::Holding {
                target: held,
                started_ms,
            } if held == target => {
                let elapsed = (now_ms - started_ms).max(0.0);
                self.progress = ((elapsed / self.hold_ms) * 100.0).min(100.0) as f32;
                if self.progress >= 100.0 {
                    self.state = SelectionState::Confirmed(target);
                    return Some(target);
                }
                None
            }
            SelectionState::Confirmed(done) if done == target => {
                // Already fired; wait for a release
                None
            }
            _ => {
                // Fresh hold (new target, or fist just closed)
                self.state = SelectionState::Holding {
                    target,
                    started_ms: now_ms,
                };
                self.progress = 0.0;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Btn {
        A,
        B,
    }

    fn targets() -> Vec<SelectionTarget<Btn>> {
        vec![
            SelectionTarget::new(Btn::A, Rect::new(0.0, 0.0, 100.0, 100.0)),
            SelectionTarget::new(Btn::B, Rect::new(200.0, 0.0, 100.0, 100.0)),
        ]
    }

    fn at(x: f32, grabbing: bool) -> Option<Pointer> {
        Some(Pointer {
            pos: Vec2::new(x, 50.0),
            grabbing,
        })
    }

    #[test]
    fn test_idle_to_hover_to_hold_to_confirm() {
        let mut m = SelectionMachine::new(2000.0);
        let t = targets();

        assert_eq!(m.update(at(500.0, false), &t, 0.0), None);
        assert_eq!(m.state(), SelectionState::Idle);

        assert_eq!(m.update(at(50.0, false), &t, 10.0), None);
        assert_eq!(m.state(), SelectionState::Hovering(Btn::A));

        assert_eq!(m.update(at(50.0, true), &t, 100.0), None);
        assert!(matches!(m.state(), SelectionState::Holding { target: Btn::A, .. }));
        assert_eq!(m.progress(), 0.0);

        assert_eq!(m.update(at(50.0, true), &t, 1100.0), None);
        assert!((m.progress() - 50.0).abs() < 1e-3);

        // Exactly at the hold duration
        assert_eq!(m.update(at(50.0, true), &t, 2100.0), Some(Btn::A));
        assert_eq!(m.progress(), 100.0);
        assert_eq!(m.state(), SelectionState::Confirmed(Btn::A));

        // Fires only once while the fist stays closed
        assert_eq!(m.update(at(50.0, true), &t, 5000.0), None);
        assert_eq!(m.update(at(50.0, true), &t, 9000.0), None);
    }

    #[test]
    fn test_release_discards_progress() {
        let mut m = SelectionMachine::new(1000.0);
        let t = targets();

        m.update(at(50.0, true), &t, 0.0);
        m.update(at(50.0, true), &t, 900.0);
        assert!(m.progress() > 80.0);

        // Open the hand
        m.update(at(50.0, false), &t, 950.0);
        assert_eq!(m.progress(), 0.0);

        // Re-grab starts from zero
        m.update(at(50.0, true), &t, 1000.0);
        assert_eq!(m.progress(), 0.0);
        assert_eq!(m.update(at(50.0, true), &t, 1500.0), None);
        assert_eq!(m.update(at(50.0, true), &t, 2000.0), Some(Btn::A));
    }

    #[test]
    fn test_switching_target_restarts_hold() {
        let mut m = SelectionMachine::new(1000.0);
        let t = targets();

        m.update(at(50.0, true), &t, 0.0);
        m.update(at(50.0, true), &t, 800.0);
        m.update(at(250.0, true), &t, 900.0);
        assert!(matches!(m.state(), SelectionState::Holding { target: Btn::B, .. }));
        assert_eq!(m.progress(), 0.0);
        assert_eq!(m.update(at(250.0, true), &t, 1800.0), None);
        assert_eq!(m.update(at(250.0, true), &t, 1900.0), Some(Btn::B));
    }

    #[test]
    fn test_lost_hand_resets() {
        let mut m = SelectionMachine::new(1000.0);
        let t = targets();
        m.update(at(50.0, true), &t, 0.0);
        m.update(at(50.0, true), &t, 500.0);
        m.update(None, &t, 600.0);
        assert_eq!(m.state(), SelectionState::Idle);
        assert_eq!(m.progress(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_progress_never_exceeds_100(
            hold in 100.0f64..5000.0,
            steps in proptest::collection::vec(0.0f64..500.0, 1..60),
        ) {
            let mut m = SelectionMachine::new(hold);
            let t = targets();
            let mut now = 0.0;
            let mut fired = 0;
            for dt in steps {
                now += dt;
                if m.update(at(50.0, true), &t, now).is_some() {
                    fired += 1;
                }
                prop_assert!(m.progress() >= 0.0 && m.progress() <= 100.0);
            }
            prop_assert!(fired <= 1);
        }
    }
}
