//! Session controller: calibration, play, round end
//!
//! A [`Session`] owns one round from camera acquisition to result handoff.
//! The camera is held by a scoped guard, so it is released when the round
//! ends, when the session is stopped, or when the session is dropped.

use serde::{Deserialize, Serialize};

use crate::config::{GameMode, RoundConfig, Tuning};
use crate::error::MediaError;
use crate::gesture::GestureInterpreter;
use crate::hud::HudSnapshot;
use crate::perception::PerceptionReader;
use crate::sim::{BladePath, GameEvent, GameState, RoundOver, TickInput, tick};
use crate::ui::{Calibration, HoldMeter};

// ============================================================================
// COLLABORATORS
// ============================================================================

/// Live camera feeding the tracker and the renderer
pub trait MediaSource {
    /// Acquire the device. Failures are fatal to the current screen.
    fn start(&mut self) -> Result<(), MediaError>;
    /// Release the device. Must be safe to call more than once.
    fn stop(&mut self);
    /// Still of the current frame as a data URL
    fn snapshot(&mut self) -> Option<String>;
}

/// Where finished rounds go (the leaderboard store)
pub trait ResultSink {
    fn submit(&mut self, result: RoundResult);
}

impl ResultSink for Vec<RoundResult> {
    fn submit(&mut self, result: RoundResult) {
        self.push(result);
    }
}

/// Holds the camera for the session's lifetime
struct CameraGuard<M: MediaSource> {
    media: M,
    live: bool,
}

impl<M: MediaSource> CameraGuard<M> {
    fn acquire(mut media: M) -> Result<Self, MediaError> {
        media.start()?;
        log::info!("Camera acquired");
        Ok(Self { media, live: true })
    }

    fn release(&mut self) {
        if self.live {
            self.media.stop();
            self.live = false;
            log::info!("Camera released");
        }
    }
}

impl<M: MediaSource> Drop for CameraGuard<M> {
    fn drop(&mut self) {
        self.release();
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Final score: points, or survived seconds in dodge mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FinalScore {
    Points(u64),
    Seconds(f64),
}

impl FinalScore {
    /// Sort key, higher is better
    pub fn value(&self) -> f64 {
        match *self {
            FinalScore::Points(p) => p as f64,
            FinalScore::Seconds(s) => s,
        }
    }
}

/// Payload handed to the leaderboard when a round ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub score: FinalScore,
    pub mode: GameMode,
    /// Camera still at the moment the round ended (data URL)
    pub photo: Option<String>,
    pub timestamp_ms: f64,
}

// ============================================================================
// SESSION
// ============================================================================

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TimeUp,
    OutOfLives,
    /// Exit gesture or explicit stop; no result is recorded
    Exited,
}

impl From<RoundOver> for EndReason {
    fn from(reason: RoundOver) -> Self {
        match reason {
            RoundOver::TimeUp => EndReason::TimeUp,
            RoundOver::OutOfLives => EndReason::OutOfLives,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Calibrating,
    Playing,
    Ended(EndReason),
}

/// One round, from calibration to result handoff
pub struct Session<M: MediaSource> {
    round: RoundConfig,
    tuning: Tuning,
    camera: CameraGuard<M>,
    perception: PerceptionReader,
    gestures: GestureInterpreter,
    calibration: Calibration,
    exit: HoldMeter,
    state: GameState,
    phase: SessionPhase,
    started_at_ms: Option<f64>,
    /// Events from the most recent frame
    events: Vec<GameEvent>,
    /// Latest banner and when it was raised
    notification: Option<(String, f64)>,
    result: Option<RoundResult>,
}

impl<M: MediaSource> Session<M> {
    /// Acquire the camera and enter calibration
    pub fn start(
        round: RoundConfig,
        tuning: Tuning,
        media: M,
        perception: PerceptionReader,
        seed: u64,
    ) -> Result<Self, MediaError> {
        let round = round.validated();
        let camera = CameraGuard::acquire(media).inspect_err(|e| {
            log::warn!("Camera acquisition failed: {e}");
        })?;

        log::info!(
            "Session start: {} mode, {}s, seed {}",
            round.mode.as_str(),
            round.duration_secs,
            seed
        );

        Ok(Self {
            gestures: GestureInterpreter::new(
                tuning.width,
                tuning.height,
                tuning.trail_length,
                tuning.trail_max_age_ms,
            ),
            calibration: Calibration::from_tuning(&tuning),
            exit: HoldMeter::new(tuning.exit_rect, tuning.exit_fill),
            state: GameState::new(&round, &tuning, seed),
            round,
            tuning,
            camera,
            perception,
            phase: SessionPhase::Calibrating,
            started_at_ms: None,
            events: Vec::new(),
            notification: None,
            result: None,
        })
    }

    /// Run one render tick
    pub fn frame(&mut self, now_ms: f64, sink: &mut dyn ResultSink) -> SessionPhase {
        if matches!(self.phase, SessionPhase::Ended(_)) {
            self.events.clear();
            return self.phase;
        }

        if let Some(frame) = self.perception.take_latest() {
            self.gestures.ingest(&frame);
        }
        self.gestures.evict(now_ms);
        let pointer = self.gestures.pointer();

        match self.phase {
            SessionPhase::Calibrating => {
                if self.calibration.update(pointer) {
                    log::info!("Calibration complete, play starts");
                    self.phase = SessionPhase::Playing;
                    self.started_at_ms = Some(now_ms);
                    self.state.clock_ms = Some(now_ms);
                    self.gestures.clear_trail();
                    self.state.push_event(GameEvent::Started);
                }
            }
            SessionPhase::Playing => {
                if self.exit.update(pointer) {
                    log::info!("Exit gesture held, leaving round");
                    self.end(EndReason::Exited, now_ms, sink);
                } else {
                    let input = TickInput {
                        now_ms,
                        blade: BladePath::from_trail(self.gestures.trail(), self.tuning.blade_test),
                    };
                    tick(&mut self.state, &input, &self.tuning);
                    if let Some(reason) = self.state.round_over() {
                        self.end(reason.into(), now_ms, sink);
                    }
                }
            }
            SessionPhase::Ended(_) => {}
        }

        self.events = self.state.drain_events();
        if let Some(text) = self.events.iter().rev().find_map(GameEvent::notification) {
            self.notification = Some((text, now_ms));
        }
        self.phase
    }

    /// End the round once: snapshot, hand off, release the camera
    fn end(&mut self, reason: EndReason, now_ms: f64, sink: &mut dyn ResultSink) {
        if matches!(self.phase, SessionPhase::Ended(_)) {
            return;
        }
        self.phase = SessionPhase::Ended(reason);

        if reason != EndReason::Exited {
            let result = RoundResult {
                score: self.final_score(),
                mode: self.round.mode,
                photo: self.camera.media.snapshot(),
                timestamp_ms: now_ms,
            };
            log::info!("Round result: {:?} in {} mode", result.score, result.mode.as_str());
            sink.submit(result.clone());
            self.result = Some(result);
        }
        self.camera.release();
    }

    /// Abort the session (teardown). No result is recorded.
    pub fn stop(&mut self) {
        if !matches!(self.phase, SessionPhase::Ended(_)) {
            log::info!("Session stopped");
            self.phase = SessionPhase::Ended(EndReason::Exited);
        }
        self.camera.release();
    }

    pub fn final_score(&self) -> FinalScore {
        if self.round.mode.protects_center() {
            FinalScore::Seconds(self.state.survived_secs())
        } else {
            FinalScore::Points(self.state.score)
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn round(&self) -> &RoundConfig {
        &self.round
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn gestures(&self) -> &GestureInterpreter {
        &self.gestures
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn exit_meter(&self) -> &HoldMeter {
        &self.exit
    }

    pub fn started_at_ms(&self) -> Option<f64> {
        self.started_at_ms
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn notification(&self) -> Option<(&str, f64)> {
        self.notification.as_ref().map(|(text, at)| (text.as_str(), *at))
    }

    pub fn result(&self) -> Option<&RoundResult> {
        self.result.as_ref()
    }

    pub fn camera_live(&self) -> bool {
        self.camera.live
    }

    /// UI mirror of the current frame
    pub fn hud(&self, now_ms: f64) -> HudSnapshot<'_> {
        HudSnapshot::capture(self, now_ms)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gesture::tests::{fist, open_hand};
    use crate::perception::{PerceptionFrame, PerceptionWriter, perception_slot};
    use std::cell::Cell;
    use std::rc::Rc;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Camera double that counts start/stop calls
    #[derive(Clone, Default)]
    pub(crate) struct FakeCamera {
        pub starts: Rc<Cell<u32>>,
        pub stops: Rc<Cell<u32>>,
        pub fail: Option<MediaError>,
    }

    impl MediaSource for FakeCamera {
        fn start(&mut self) -> Result<(), MediaError> {
            if let Some(err) = self.fail.clone() {
                return Err(err);
            }
            self.starts.set(self.starts.get() + 1);
            Ok(())
        }

        fn stop(&mut self) {
            self.stops.set(self.stops.get() + 1);
        }

        fn snapshot(&mut self) -> Option<String> {
            Some("data:image/jpeg;base64,AAAA".to_string())
        }
    }

    fn quiet() -> Tuning {
        Tuning {
            spawn_interval_frames: 1e9,
            ..Tuning::default()
        }
    }

    /// Drive calibration with an open hand at the center
    fn calibrate(
        session: &mut Session<FakeCamera>,
        writer: &PerceptionWriter,
        sink: &mut Vec<RoundResult>,
        frame: &mut u64,
    ) {
        while session.phase() == SessionPhase::Calibrating {
            let t = *frame as f64 * FRAME_MS;
            writer.publish(PerceptionFrame::hand(open_hand(0.5, 0.5), t));
            session.frame(t, sink);
            *frame += 1;
            assert!(*frame < 1000, "calibration never completed");
        }
    }

    #[test]
    fn test_camera_failure_surfaces() {
        let (_writer, reader) = perception_slot();
        let camera = FakeCamera {
            fail: Some(MediaError::PermissionDenied),
            ..FakeCamera::default()
        };
        let err = Session::start(RoundConfig::default(), quiet(), camera, reader, 1)
            .err()
            .expect("start must fail");
        assert_eq!(err, MediaError::PermissionDenied);
    }

    #[test]
    fn test_calibration_gates_play() {
        let (writer, reader) = perception_slot();
        let camera = FakeCamera::default();
        let mut session = Session::start(RoundConfig::default(), quiet(), camera, reader, 1).unwrap();
        let mut sink = Vec::new();

        // No hand: nothing advances
        for f in 0..100 {
            session.frame(f as f64 * FRAME_MS, &mut sink);
        }
        assert_eq!(session.phase(), SessionPhase::Calibrating);
        assert_eq!(session.state().frame, 0);

        let mut frame = 100;
        calibrate(&mut session, &writer, &mut sink, &mut frame);
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert!(session.started_at_ms().is_some());
        assert!(session.events().contains(&GameEvent::Started));
        // Play starts with a fresh blade
        assert!(session.gestures().trail().is_empty());
        assert!(session.gestures().pointer().is_some());
        assert_eq!(session.notification().map(|(t, _)| t), Some("START!"));
    }

    #[test]
    fn test_timed_round_hands_off_one_result() {
        let (writer, reader) = perception_slot();
        let camera = FakeCamera::default();
        let stops = camera.stops.clone();
        let mut session = Session::start(RoundConfig::timed(1), quiet(), camera, reader, 1).unwrap();
        let mut sink = Vec::new();
        let mut frame = 0;
        calibrate(&mut session, &writer, &mut sink, &mut frame);

        for _ in 0..200 {
            session.frame(frame as f64 * FRAME_MS, &mut sink);
            frame += 1;
        }
        assert_eq!(session.phase(), SessionPhase::Ended(EndReason::TimeUp));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].mode, GameMode::Timed);
        assert_eq!(sink[0].score, FinalScore::Points(0));
        assert!(sink[0].photo.is_some());
        assert_eq!(stops.get(), 1);
        assert!(!session.camera_live());
    }

    #[test]
    fn test_exit_gesture_records_nothing() {
        let (writer, reader) = perception_slot();
        let camera = FakeCamera::default();
        let tuning = quiet();
        let exit = tuning.exit_rect.center();
        let mut session = Session::start(RoundConfig::survival(), tuning, camera, reader, 1).unwrap();
        let mut sink = Vec::new();
        let mut frame = 0;
        calibrate(&mut session, &writer, &mut sink, &mut frame);

        let lx = 1.0 - exit.x / session.tuning().width;
        let ly = exit.y / session.tuning().height;
        for _ in 0..100 {
            let t = frame as f64 * FRAME_MS;
            writer.publish(PerceptionFrame::hand(fist(lx, ly), t));
            session.frame(t, &mut sink);
            frame += 1;
        }
        assert_eq!(session.phase(), SessionPhase::Ended(EndReason::Exited));
        assert!(sink.is_empty());
        assert!(session.result().is_none());
        assert!(!session.camera_live());
    }

    #[test]
    fn test_camera_released_on_drop() {
        let (_writer, reader) = perception_slot();
        let camera = FakeCamera::default();
        let (starts, stops) = (camera.starts.clone(), camera.stops.clone());
        {
            let _session = Session::start(RoundConfig::dodge(), quiet(), camera, reader, 1).unwrap();
            assert_eq!(starts.get(), 1);
            assert_eq!(stops.get(), 0);
        }
        assert_eq!(stops.get(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (_writer, reader) = perception_slot();
        let camera = FakeCamera::default();
        let stops = camera.stops.clone();
        let mut session = Session::start(RoundConfig::default(), quiet(), camera, reader, 1).unwrap();
        session.stop();
        session.stop();
        drop(session);
        assert_eq!(stops.get(), 1);
    }

    #[test]
    fn test_dodge_scores_in_seconds() {
        let (writer, reader) = perception_slot();
        let mut session =
            Session::start(RoundConfig::dodge(), quiet(), FakeCamera::default(), reader, 1).unwrap();
        let mut sink = Vec::new();
        let mut frame = 0;
        calibrate(&mut session, &writer, &mut sink, &mut frame);
        for _ in 0..120 {
            session.frame(frame as f64 * FRAME_MS, &mut sink);
            frame += 1;
        }
        match session.final_score() {
            FinalScore::Seconds(s) => assert!((1.9..=2.01).contains(&s), "survived {s}"),
            other => panic!("expected seconds, got {other:?}"),
        }
    }
}
