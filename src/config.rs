//! Game modes, round configuration and tuning
//!
//! Every balance constant lives in [`Tuning`] so revisions of the game differ
//! only by data. Partial JSON documents override just the fields they name.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::geometry::Rect;

/// Game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Score as much as possible before the clock runs out
    #[default]
    Timed,
    /// Missed fruit cost a life
    Survival,
    /// Protect the center of the screen; score is time survived
    Dodge,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Timed => "timed",
            GameMode::Survival => "survival",
            GameMode::Dodge => "dodge",
        }
    }

    /// Round ends when the clock reaches zero
    pub fn has_clock(&self) -> bool {
        matches!(self, GameMode::Timed)
    }

    /// Round ends when lives reach zero
    pub fn uses_lives(&self) -> bool {
        matches!(self, GameMode::Survival | GameMode::Dodge)
    }

    /// Fruit falling off the bottom edge cost a life
    pub fn penalizes_misses(&self) -> bool {
        matches!(self, GameMode::Survival)
    }

    /// Entities reaching the center target cost a life
    pub fn protects_center(&self) -> bool {
        matches!(self, GameMode::Dodge)
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timed" | "time" => Ok(GameMode::Timed),
            "survival" => Ok(GameMode::Survival),
            "dodge" | "protect" => Ok(GameMode::Dodge),
            other => Err(format!("unknown game mode '{other}'")),
        }
    }
}

/// Durations offered by the menu for timed mode (seconds)
pub const DURATION_CHOICES: [u32; 3] = [60, 120, 180];
/// Fallback when a duration is missing or unusable
pub const DEFAULT_DURATION_SECS: u32 = 60;
/// Longest timed round accepted
pub const MAX_DURATION_SECS: u32 = 3600;

/// User-facing round setup: mode plus duration for timed mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub mode: GameMode,
    pub duration_secs: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Timed,
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }
}

impl RoundConfig {
    /// Strict constructor: rejects non-positive or oversized durations for
    /// timed rounds. Untimed modes ignore the duration.
    pub fn new(mode: GameMode, duration_secs: i64) -> Result<Self, ConfigError> {
        if !mode.has_clock() {
            return Ok(Self {
                mode,
                duration_secs: DEFAULT_DURATION_SECS,
            });
        }
        if duration_secs <= 0 || duration_secs > MAX_DURATION_SECS as i64 {
            return Err(ConfigError::InvalidDuration(duration_secs));
        }
        Ok(Self {
            mode,
            duration_secs: duration_secs as u32,
        })
    }

    pub fn timed(duration_secs: u32) -> Self {
        Self {
            mode: GameMode::Timed,
            duration_secs,
        }
        .validated()
    }

    pub fn survival() -> Self {
        Self {
            mode: GameMode::Survival,
            ..Default::default()
        }
    }

    pub fn dodge() -> Self {
        Self {
            mode: GameMode::Dodge,
            ..Default::default()
        }
    }

    /// Clamp an unusable duration to the default instead of failing
    pub fn validated(mut self) -> Self {
        if self.duration_secs == 0 || self.duration_secs > MAX_DURATION_SECS {
            log::warn!(
                "Round duration {}s out of range, using {}s",
                self.duration_secs,
                DEFAULT_DURATION_SECS
            );
            self.duration_secs = DEFAULT_DURATION_SECS;
        }
        self
    }
}

/// How the blade path is tested against entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BladeTest {
    /// Segment between the two newest trail samples (catches fast slashes)
    #[default]
    Segment,
    /// Newest trail sample only
    Point,
}

/// All balance constants. Frame-based values assume [`FRAMES_PER_SECOND`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Surface ===
    pub width: f32,
    pub height: f32,

    // === Physics ===
    pub gravity: f32,
    /// Bounce off the side margins instead of flying off screen
    pub wall_rebound: bool,
    /// Sliced halves fade to nothing over this window
    pub fade_window_ms: f64,

    // === Spawning ===
    /// Frames between spawns at difficulty 1.0
    pub spawn_interval_frames: f32,
    pub bomb_weight: f32,
    pub ice_weight: f32,
    pub basket_weight: f32,
    /// Extra entities launched by a sliced basket
    pub basket_burst: u32,
    pub launch_angle_min_deg: f32,
    pub launch_angle_max_deg: f32,
    /// Apex target above the top edge (random in range)
    pub apex_overshoot_min: f32,
    pub apex_overshoot_max: f32,
    /// Horizontal share of launch speed
    pub launch_spread: f32,
    /// 0 = free flight, 1 = aimed straight at the protected target (dodge)
    pub dodge_aim: f32,

    // === Blade ===
    pub hit_radius: f32,
    pub blade_test: BladeTest,
    pub trail_length: usize,
    pub trail_max_age_ms: f64,

    // === Effects ===
    pub ice_frames: u32,
    pub ice_speed: f32,
    pub ice_spawn_divisor: f32,
    pub bomb_penalty: u64,
    pub bomb_pause_ms: f64,
    pub particles_per_hit: usize,

    // === Progression ===
    pub difficulty_period_frames: u64,
    pub difficulty_growth: f32,
    /// Consecutive hits per multiplier step
    pub combo_step: u32,
    /// Frames per countdown second
    pub frames_per_second: u32,

    // === Modes ===
    pub lives: u32,
    pub protect_radius: f32,

    // === Gestures ===
    pub menu_hold_ms: f64,
    pub results_hold_ms: f64,
    pub calibration_radius: f32,
    pub calibration_fill: f32,
    pub calibration_decay: f32,
    pub calibration_target: f32,
    pub exit_rect: Rect,
    pub exit_fill: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,

            gravity: GRAVITY,
            wall_rebound: true,
            fade_window_ms: 1500.0,

            spawn_interval_frames: 35.0,
            bomb_weight: 0.08,
            ice_weight: 0.04,
            basket_weight: 0.03,
            basket_burst: 12,
            launch_angle_min_deg: 45.0,
            launch_angle_max_deg: 80.0,
            apex_overshoot_min: 50.0,
            apex_overshoot_max: 150.0,
            launch_spread: 0.6,
            dodge_aim: 1.0,

            hit_radius: 80.0,
            blade_test: BladeTest::Segment,
            trail_length: 12,
            trail_max_age_ms: 250.0,

            ice_frames: 300,
            ice_speed: 0.6,
            ice_spawn_divisor: 2.0,
            bomb_penalty: 5,
            bomb_pause_ms: 800.0,
            particles_per_hit: 15,

            difficulty_period_frames: 600,
            difficulty_growth: 1.2,
            combo_step: 10,
            frames_per_second: FRAMES_PER_SECOND,

            lives: 10,
            protect_radius: 60.0,

            menu_hold_ms: 3000.0,
            results_hold_ms: 3000.0,
            calibration_radius: 80.0,
            calibration_fill: 1.5,
            calibration_decay: 1.0,
            calibration_target: 45.0,
            exit_rect: Rect::new(PLAYFIELD_WIDTH - 250.0, 20.0, 220.0, 80.0),
            exit_fill: 1.2,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall or invert the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("gravity", self.gravity),
            ("fade_window_ms", self.fade_window_ms as f32),
            ("spawn_interval_frames", self.spawn_interval_frames),
            ("hit_radius", self.hit_radius),
            ("ice_speed", self.ice_speed),
            ("ice_spawn_divisor", self.ice_spawn_divisor),
            ("difficulty_growth", self.difficulty_growth),
            ("menu_hold_ms", self.menu_hold_ms as f32),
            ("results_hold_ms", self.results_hold_ms as f32),
            ("calibration_fill", self.calibration_fill),
            ("calibration_target", self.calibration_target),
            ("exit_fill", self.exit_fill),
            ("trail_length", self.trail_length as f32),
            ("trail_max_age_ms", self.trail_max_age_ms as f32),
            ("lives", self.lives as f32),
            ("calibration_radius", self.calibration_radius),
            ("combo_step", self.combo_step as f32),
            ("frames_per_second", self.frames_per_second as f32),
            ("difficulty_period_frames", self.difficulty_period_frames as f32),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        // Difficulty may never decrease
        if self.difficulty_growth < 1.0 {
            return Err(ConfigError::NonPositive {
                field: "difficulty_growth - 1",
                value: self.difficulty_growth - 1.0,
            });
        }

        let weights = [self.bomb_weight, self.ice_weight, self.basket_weight];
        if weights.iter().any(|w| *w < 0.0) || weights.iter().sum::<f32>() > 1.0 {
            return Err(ConfigError::InvalidWeights);
        }
        Ok(())
    }

    /// Center of the playfield (calibration ring and protected target)
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}
