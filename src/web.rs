//! Browser bridge
//!
//! JavaScript owns the camera element and the hand tracker. It pushes
//! tracker results in, calls `frame` from `requestAnimationFrame`, and draws
//! whatever JSON comes back.

use serde_json::json;
use wasm_bindgen::prelude::*;

use crate::audio::{AudioManager, sounds_for_frame};
use crate::config::{DEFAULT_DURATION_SECS, GameMode, RoundConfig, Tuning};
use crate::error::MediaError;
use crate::gesture::{GestureInterpreter, HandLandmarks};
use crate::highscores::HighScores;
use crate::perception::{PerceptionFrame, PerceptionReader, PerceptionWriter, perception_slot};
use crate::session::{MediaSource, Session};
use crate::ui::{MenuAction, MenuScreen, ResultsButton, ResultsScreen};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Blade Arcade loaded");
}

#[wasm_bindgen]
extern "C" {
    /// Camera wrapper implemented in JS around an already-opened stream
    pub type CameraHandle;

    /// Throws a DOMException (`NotAllowedError`, `NotReadableError`, ...)
    /// when the stream could not be opened
    #[wasm_bindgen(method, catch)]
    fn start(this: &CameraHandle) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn stop(this: &CameraHandle);

    /// JPEG data URL of the current video frame
    #[wasm_bindgen(method)]
    fn snapshot(this: &CameraHandle) -> Option<String>;
}

/// Map a getUserMedia failure onto the media error taxonomy
fn media_error(err: &JsValue) -> MediaError {
    let name = js_sys::Reflect::get(err, &JsValue::from_str("name"))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default();
    match name.as_str() {
        "NotAllowedError" | "SecurityError" => MediaError::PermissionDenied,
        "NotReadableError" | "AbortError" => MediaError::DeviceBusy,
        _ => MediaError::Unavailable(err.as_string().unwrap_or(name)),
    }
}

struct JsCamera(CameraHandle);

impl MediaSource for JsCamera {
    fn start(&mut self) -> Result<(), MediaError> {
        self.0.start().map_err(|e| media_error(&e))
    }

    fn stop(&mut self) {
        self.0.stop();
    }

    fn snapshot(&mut self) -> Option<String> {
        self.0.snapshot()
    }
}

/// Publish a flat `[x0, y0, ...]` landmark buffer; malformed buffers are dropped
fn publish_landmarks(writer: &PerceptionWriter, flat: &[f32], captured_at_ms: f64) -> bool {
    match HandLandmarks::from_flat(flat) {
        Some(hand) => {
            writer.publish(PerceptionFrame::hand(hand, captured_at_ms));
            true
        }
        None => {
            log::warn!("Dropping landmark buffer of length {}", flat.len());
            false
        }
    }
}

/// Landmark intake shared by every screen
struct HandFeed {
    writer: PerceptionWriter,
    reader: PerceptionReader,
    gestures: GestureInterpreter,
}

impl HandFeed {
    fn new(tuning: &Tuning) -> Self {
        let (writer, reader) = perception_slot();
        Self {
            writer,
            reader,
            gestures: GestureInterpreter::new(
                tuning.width,
                tuning.height,
                tuning.trail_length,
                tuning.trail_max_age_ms,
            ),
        }
    }

    fn push(&self, flat: &[f32], captured_at_ms: f64) -> bool {
        publish_landmarks(&self.writer, flat, captured_at_ms)
    }

    fn push_none(&self, captured_at_ms: f64) {
        self.writer.publish(PerceptionFrame::no_hand(captured_at_ms));
    }

    fn poll(&mut self, now_ms: f64) {
        if let Some(frame) = self.reader.take_latest() {
            self.gestures.ingest(&frame);
        }
        self.gestures.evict(now_ms);
    }
}

fn load_tuning(tuning_json: Option<String>) -> Result<Tuning, JsError> {
    match tuning_json {
        Some(json) => Ok(Tuning::from_json(&json)?),
        None => Ok(Tuning::default()),
    }
}

fn load_scores(scores_json: Option<String>) -> HighScores {
    scores_json
        .and_then(|json| {
            HighScores::from_json(&json)
                .inspect_err(|e| log::warn!("Ignoring unreadable leaderboard: {e}"))
                .ok()
        })
        .unwrap_or_default()
}

// ============================================================================
// ROUND
// ============================================================================

/// One round of play
#[wasm_bindgen]
pub struct WebGame {
    session: Session<JsCamera>,
    writer: PerceptionWriter,
    scores: HighScores,
    audio: AudioManager,
}

#[wasm_bindgen]
impl WebGame {
    /// Throws on a bad configuration or when the camera can't be acquired.
    /// `duration_secs` only matters for timed rounds.
    #[wasm_bindgen(constructor)]
    pub fn new(
        camera: CameraHandle,
        mode: &str,
        duration_secs: Option<i32>,
        tuning_json: Option<String>,
        scores_json: Option<String>,
        seed: f64,
    ) -> Result<WebGame, JsError> {
        let mode: GameMode = mode.parse().map_err(|e: String| JsError::new(&e))?;
        let duration = duration_secs.map_or(DEFAULT_DURATION_SECS as i64, i64::from);
        let round = RoundConfig::new(mode, duration)?;
        let tuning = load_tuning(tuning_json)?;
        let (writer, reader) = perception_slot();
        let session = Session::start(round, tuning, JsCamera(camera), reader, seed as u64)?;

        Ok(WebGame {
            session,
            writer,
            scores: load_scores(scores_json),
            audio: AudioManager::new(),
        })
    }

    /// Tracker result: 21 × (x, y) normalized landmarks
    pub fn push_landmarks(&self, flat: &[f32], captured_at_ms: f64) -> bool {
        publish_landmarks(&self.writer, flat, captured_at_ms)
    }

    /// Tracker ran but found no hand
    pub fn push_no_hand(&self, captured_at_ms: f64) {
        self.writer.publish(PerceptionFrame::no_hand(captured_at_ms));
    }

    /// Run one tick and return the HUD as JSON
    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsError> {
        self.session.frame(now_ms, &mut self.scores);
        for sound in sounds_for_frame(self.session.events()) {
            self.audio.play(sound);
        }
        Ok(self.session.hud(now_ms).to_json()?)
    }

    /// Teardown: releases the camera, records nothing
    pub fn stop(&mut self) {
        self.session.stop();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    /// Leaderboard for the host to persist
    pub fn scores_json(&self) -> Result<String, JsError> {
        Ok(self.scores.to_json()?)
    }

    /// The finished round, or `null` while playing or after an exit
    pub fn result_json(&self) -> Result<Option<String>, JsError> {
        Ok(self
            .session
            .result()
            .map(serde_json::to_string)
            .transpose()?)
    }
}

// ============================================================================
// MENU SCREENS
// ============================================================================

/// Mode-select screen
#[wasm_bindgen]
pub struct WebMenu {
    feed: HandFeed,
    screen: MenuScreen,
}

#[wasm_bindgen]
impl WebMenu {
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<WebMenu, JsError> {
        let tuning = load_tuning(tuning_json)?;
        let layout = MenuScreen::default_layout(tuning.width, tuning.height);
        Ok(WebMenu {
            feed: HandFeed::new(&tuning),
            screen: MenuScreen::new(layout, tuning.menu_hold_ms),
        })
    }

    pub fn push_landmarks(&self, flat: &[f32], captured_at_ms: f64) -> bool {
        self.feed.push(flat, captured_at_ms)
    }

    pub fn push_no_hand(&self, captured_at_ms: f64) {
        self.feed.push_none(captured_at_ms);
    }

    /// `{pointer, hovered, progress, duration, start}`; `start` is the round
    /// to launch once a mode card is confirmed
    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsError> {
        self.feed.poll(now_ms);
        let pointer = self.feed.gestures.pointer();
        let start = match self.screen.update(pointer, now_ms) {
            Some(MenuAction::Start(round)) => Some(round),
            Some(MenuAction::DurationSelected(_)) | None => None,
        };
        Ok(serde_json::to_string(&json!({
            "pointer": pointer,
            "hovered": self.screen.hovered(),
            "progress": self.screen.hold_progress(),
            "duration": self.screen.selected_duration(),
            "start": start,
        }))?)
    }
}

/// Results screen: restart or home
#[wasm_bindgen]
pub struct WebResults {
    feed: HandFeed,
    screen: ResultsScreen,
}

#[wasm_bindgen]
impl WebResults {
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<WebResults, JsError> {
        let tuning = load_tuning(tuning_json)?;
        let layout = ResultsScreen::default_layout(tuning.width, tuning.height);
        Ok(WebResults {
            feed: HandFeed::new(&tuning),
            screen: ResultsScreen::new(layout, tuning.results_hold_ms),
        })
    }

    pub fn push_landmarks(&self, flat: &[f32], captured_at_ms: f64) -> bool {
        self.feed.push(flat, captured_at_ms)
    }

    pub fn push_no_hand(&self, captured_at_ms: f64) {
        self.feed.push_none(captured_at_ms);
    }

    /// `{pointer, hovered, progress, choice}` with `choice` one of
    /// `"restart"`, `"home"` or `null`
    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsError> {
        self.feed.poll(now_ms);
        let pointer = self.feed.gestures.pointer();
        let choice = self.screen.update(pointer, now_ms).map(|button| match button {
            ResultsButton::Restart => "restart",
            ResultsButton::Home => "home",
        });
        Ok(serde_json::to_string(&json!({
            "pointer": pointer,
            "hovered": self.screen.hovered(),
            "progress": self.screen.hold_progress(),
            "choice": choice,
        }))?)
    }
}
