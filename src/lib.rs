//! Blade Arcade - slice flying fruit with a hand tracked through the camera
//!
//! Core modules:
//! - `gesture`: Landmarks to pointer, grab classification, blade trail
//! - `perception`: Latest-value slot fed by the external hand tracker
//! - `ui`: Hover/hold selection, calibration gate, menu screens
//! - `sim`: Deterministic simulation (spawning, physics, slicing, scoring)
//! - `session`: Round controller (calibrate, play, end, result handoff)
//! - `hud`: Serializable per-frame mirror for the presentation layer
//! - `highscores`: Top-10 leaderboard
//! - `audio`: Event sounds (Web Audio synthesis in the browser)
//! - `web`: wasm-bindgen bridge (wasm32 only)

pub mod audio;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod highscores;
pub mod hud;
pub mod perception;
pub mod session;
pub mod sim;
pub mod ui;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{GameMode, RoundConfig, Tuning};
pub use error::{ConfigError, MediaError};
pub use highscores::HighScores;
pub use session::{EndReason, MediaSource, ResultSink, RoundResult, Session, SessionPhase};

/// Game configuration constants
pub mod consts {
    /// Render surface size (pixels). Landmarks are scaled to this.
    pub const PLAYFIELD_WIDTH: f32 = 1280.0;
    pub const PLAYFIELD_HEIGHT: f32 = 720.0;

    /// Nominal frame rate; frame-counted timers assume this cadence
    pub const FRAMES_PER_SECOND: u32 = 60;

    /// Downward acceleration per frame² (pixels)
    pub const GRAVITY: f32 = 0.28;

    /// Entities spawn this far below the bottom edge
    pub const SPAWN_DEPTH: f32 = 100.0;
    /// Entities are culled once this far below the bottom edge
    pub const CULL_MARGIN: f32 = 300.0;

    /// Side rebound margin and horizontal damping
    pub const WALL_MARGIN: f32 = 50.0;
    pub const WALL_DAMPING: f32 = 0.5;

    /// Gravity / spin scaling for sliced halves
    pub const HALF_GRAVITY_SCALE: f32 = 0.8;
    pub const HALF_SPIN_SCALE: f32 = 1.5;

    /// Sideways kick given to each half when a fruit is cut
    pub const HALF_SPLIT_VX: f32 = 3.0;
    pub const HALF_SPLIT_VY: f32 = 1.0;

    /// Maximum particles alive at once
    pub const MAX_PARTICLES: usize = 512;
}
