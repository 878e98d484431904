//! Perception ingestion
//!
//! The hand tracker runs at its own cadence and reports through a callback.
//! Results land in a single latest-value slot; the game tick takes whatever
//! is newest without ever waiting. Older unread results are overwritten.

use std::sync::{Arc, Mutex, TryLockError};

use crate::gesture::HandLandmarks;

/// One tracker result: a hand, or nothing detected
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionFrame {
    pub hand: Option<HandLandmarks>,
    /// When the source video frame was captured (ms, same clock as the tick)
    pub captured_at_ms: f64,
}

impl PerceptionFrame {
    pub fn hand(hand: HandLandmarks, captured_at_ms: f64) -> Self {
        Self {
            hand: Some(hand),
            captured_at_ms,
        }
    }

    pub fn no_hand(captured_at_ms: f64) -> Self {
        Self {
            hand: None,
            captured_at_ms,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    latest: Option<PerceptionFrame>,
    /// Frames replaced before the reader saw them
    overwritten: u64,
}

/// Producer half, owned by the tracker callback
#[derive(Debug)]
pub struct PerceptionWriter {
    slot: Arc<Mutex<Slot>>,
}

/// Consumer half, owned by the game tick
#[derive(Debug)]
pub struct PerceptionReader {
    slot: Arc<Mutex<Slot>>,
}

/// Create a connected writer/reader pair
pub fn perception_slot() -> (PerceptionWriter, PerceptionReader) {
    let slot = Arc::new(Mutex::new(Slot::default()));
    (
        PerceptionWriter { slot: slot.clone() },
        PerceptionReader { slot },
    )
}

impl PerceptionWriter {
    /// Store a result, replacing any unread one
    pub fn publish(&self, frame: PerceptionFrame) {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.latest.replace(frame).is_some() {
            slot.overwritten += 1;
        }
    }
}

impl PerceptionReader {
    /// Take the newest unread result, if any. Never blocks: a slot busy with a
    /// concurrent write reads as "nothing new" and is picked up next tick.
    pub fn take_latest(&self) -> Option<PerceptionFrame> {
        match self.slot.try_lock() {
            Ok(mut slot) => slot.latest.take(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().latest.take(),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Count of results that were replaced before being read
    pub fn overwritten(&self) -> u64 {
        match self.slot.try_lock() {
            Ok(slot) => slot.overwritten,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().overwritten,
            Err(TryLockError::WouldBlock) => 0,
        }
    }
}
