//! Per-frame UI mirror
//!
//! The presentation layer reads this snapshot and never touches the game
//! state directly. It borrows from the session for the duration of one frame.

use glam::Vec2;
use serde::Serialize;

use crate::config::GameMode;
use crate::geometry::Rect;
use crate::gesture::Pointer;
use crate::session::{FinalScore, MediaSource, Session, SessionPhase};
use crate::sim::{Entity, MissMarker, Particle};

/// Entity plus its current opacity
#[derive(Debug, Clone, Serialize)]
pub struct EntityView<'a> {
    #[serde(flatten)]
    pub entity: &'a Entity,
    pub opacity: f32,
}

/// The protected target drawn in dodge mode
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TargetView {
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HudSnapshot<'a> {
    pub phase: SessionPhase,
    pub mode: GameMode,
    pub score: FinalScore,
    /// Only in modes with lives
    pub lives: Option<u32>,
    /// Only in timed mode
    pub time_left: Option<u32>,
    pub multiplier: u32,
    /// Hits toward the next multiplier step, out of `combo_step`
    pub combo_progress: u32,
    pub combo_step: u32,
    pub difficulty: f32,
    /// 0-1 through the current difficulty period
    pub level_progress: f32,
    pub frozen: bool,
    pub paused: bool,
    /// Percent
    pub calibration: f32,
    pub calibration_center: Vec2,
    pub calibration_radius: f32,
    /// Percent
    pub exit_progress: f32,
    pub exit_region: Rect,
    pub target: Option<TargetView>,
    pub notification: Option<&'a str>,
    pub notification_age_ms: Option<f64>,
    pub pointer: Option<Pointer>,
    /// Newest first
    pub trail: Vec<Vec2>,
    pub entities: Vec<EntityView<'a>>,
    pub particles: &'a [Particle],
    pub misses: &'a [MissMarker],
}

impl<'a> HudSnapshot<'a> {
    pub fn capture<M: MediaSource>(session: &'a Session<M>, now_ms: f64) -> Self {
        let state = session.state();
        let tuning = session.tuning();
        let mode = session.round().mode;
        let period = tuning.difficulty_period_frames.max(1);

        Self {
            phase: session.phase(),
            mode,
            score: session.final_score(),
            lives: mode.uses_lives().then_some(state.lives),
            time_left: mode.has_clock().then_some(state.time_left),
            multiplier: state.combo.multiplier,
            combo_progress: state.combo.progress(),
            combo_step: state.combo.step(),
            difficulty: state.difficulty,
            level_progress: (state.frame % period) as f32 / period as f32,
            frozen: state.ice_active(),
            paused: state.effects.paused_until_ms.is_some_and(|until| now_ms < until),
            calibration: session.calibration().progress(),
            calibration_center: session.calibration().center(),
            calibration_radius: session.calibration().radius(),
            exit_progress: session.exit_meter().progress(),
            exit_region: session.exit_meter().region(),
            target: mode.protects_center().then(|| TargetView {
                center: tuning.center(),
                radius: tuning.protect_radius,
            }),
            notification: session.notification().map(|(text, _)| text),
            notification_age_ms: session.notification().map(|(_, at)| now_ms - at),
            pointer: session.gestures().pointer(),
            trail: session.gestures().trail().iter().map(|s| s.pos).collect(),
            entities: state
                .entities
                .iter()
                .map(|entity| EntityView {
                    entity,
                    opacity: entity.opacity(now_ms, tuning.fade_window_ms),
                })
                .collect(),
            particles: &state.particles,
            misses: &state.misses,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
