//! Per-frame simulation tick
//!
//! Runs the gameplay systems in a fixed order: clock, progression, spawning,
//! physics, culling, protected-target check, blade collisions, effects.

use super::collision::{BladePath, entities_touching, sliced_entities};
use super::physics::{
    fell_off_screen, integrate_all, remove_faded, update_miss_markers, update_particles,
};
use super::scoring::{register_miss, register_target_hit, resolve_hit};
use super::spawn::maybe_spawn;
use super::state::{EntityKind, GameEvent, GameState, RoundOver};
use crate::config::Tuning;

/// Everything the tick needs from outside the simulation
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Frame timestamp (ms, monotonic)
    pub now_ms: f64,
    /// Current blade, `None` when no hand is tracked
    pub blade: Option<BladePath>,
}

/// Advance the round by one frame
pub fn tick(state: &mut GameState, input: &TickInput, tuning: &Tuning) {
    if state.is_over() {
        return;
    }

    let now = input.now_ms;
    let paused = state.is_paused(now);
    let elapsed = state.clock_ms.map_or(0.0, |prev| (now - prev).max(0.0));
    state.clock_ms = Some(now);

    if !paused {
        state.frame += 1;
        if state.mode.protects_center() {
            state.survived_ms += elapsed;
        }

        advance_difficulty(state, tuning);
        if advance_clock(state, tuning) {
            return;
        }

        let speed = if state.ice_active() {
            state.effects.ice_frames -= 1;
            tuning.ice_speed
        } else {
            1.0
        };

        maybe_spawn(state, tuning);
        integrate_all(&mut state.entities, tuning, speed);
    }

    remove_faded(&mut state.entities, now, tuning.fade_window_ms);
    cull_off_screen(state, tuning);

    if !paused && state.mode.protects_center() {
        protect_center(state, tuning);
    }

    if let Some(blade) = input.blade {
        for id in sliced_entities(&state.entities, &blade, tuning.hit_radius) {
            if state.is_over() {
                break;
            }
            resolve_hit(state, tuning, id, now);
        }
    }

    update_particles(&mut state.particles);
    update_miss_markers(&mut state.misses);
}

/// Difficulty grows every period, never shrinks
fn advance_difficulty(state: &mut GameState, tuning: &Tuning) {
    if state.frame.is_multiple_of(tuning.difficulty_period_frames) {
        state.difficulty *= tuning.difficulty_growth;
        log::info!("Difficulty up: {:.2}", state.difficulty);
        state.push_event(GameEvent::LevelUp {
            difficulty: state.difficulty,
        });
    }
}

/// Timed-mode countdown. Returns true when time just ran out.
fn advance_clock(state: &mut GameState, tuning: &Tuning) -> bool {
    if !state.mode.has_clock() || !state.frame.is_multiple_of(tuning.frames_per_second as u64) {
        return false;
    }
    state.time_left = state.time_left.saturating_sub(1);
    state.push_event(GameEvent::ClockTick {
        remaining: state.time_left,
    });
    if state.time_left == 0 {
        state.finish(RoundOver::TimeUp);
        return true;
    }
    false
}

/// Drop entities below the screen; whole fruit counts as a miss where the
/// mode punishes misses
fn cull_off_screen(state: &mut GameState, tuning: &Tuning) {
    let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.entities)
        .into_iter()
        .partition(|e| fell_off_screen(e, tuning));
    state.entities = kept;

    if !state.mode.penalizes_misses() {
        return;
    }
    for entity in gone {
        if entity.kind == EntityKind::Fruit && !entity.is_half() {
            register_miss(state, tuning, entity.pos);
        }
    }
}

/// Dodge mode: anything whole that reaches the target costs a life
fn protect_center(state: &mut GameState, tuning: &Tuning) {
    let center = tuning.center();
    for id in entities_touching(&state.entities, center, tuning.protect_radius) {
        let Some(index) = state.entities.iter().position(|e| e.id == id) else {
            continue;
        };
        let entity = state.entities.remove(index);
        log::debug!("#{} {:?} reached the target", entity.id, entity.kind);
        register_target_hit(state, tuning, entity.pos);
        if state.is_over() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundConfig;
    use crate::sim::spawn::spawn_kind;
    use glam::Vec2;
    use proptest::prelude::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn at(frame: u64) -> TickInput {
        TickInput {
            now_ms: frame as f64 * FRAME_MS,
            blade: None,
        }
    }

    /// Tuning without random spawns so tests control the world
    fn quiet() -> Tuning {
        Tuning {
            spawn_interval_frames: 1e9,
            ..Tuning::default()
        }
    }

    #[test]
    fn test_timed_round_ends_once_after_sixty_seconds() {
        let tuning = quiet();
        let mut state = GameState::new(&RoundConfig::timed(60), &tuning, 1);
        let mut ticks = 0;
        let mut overs = 0;
        for f in 1..=60 * 60 + 120 {
            tick(&mut state, &at(f), &tuning);
            for event in state.drain_events() {
                match event {
                    GameEvent::ClockTick { .. } => ticks += 1,
                    GameEvent::RoundOver(RoundOver::TimeUp) => overs += 1,
                    _ => {}
                }
            }
        }
        assert_eq!(ticks, 60);
        assert_eq!(overs, 1);
        assert_eq!(state.time_left, 0);
        assert_eq!(state.frame, 3600);
    }

    #[test]
    fn test_difficulty_grows_on_period() {
        let tuning = quiet();
        let mut state = GameState::new(&RoundConfig::survival(), &tuning, 1);
        for f in 1..600 {
            tick(&mut state, &at(f), &tuning);
        }
        assert_eq!(state.difficulty, 1.0);
        tick(&mut state, &at(600), &tuning);
        assert!((state.difficulty - 1.2).abs() < 1e-6);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::LevelUp { .. }))
        );
    }

    #[test]
    fn test_spawner_fills_the_sky() {
        let tuning = Tuning::default();
        let mut state = GameState::new(&RoundConfig::default(), &tuning, 5);
        for f in 1..=120 {
            tick(&mut state, &at(f), &tuning);
        }
        assert!(!state.entities.is_empty());
    }

    #[test]
    fn test_bomb_pause_freezes_world() {
        let tuning = quiet();
        let mut state = GameState::new(&RoundConfig::default(), &tuning, 1);
        spawn_kind(&mut state, &tuning, EntityKind::Fruit);
        state.effects.paused_until_ms = Some(10.0 * FRAME_MS);

        let before = state.entities[0].pos;
        let frame = state.frame;
        tick(&mut state, &at(2), &tuning);
        assert_eq!(state.entities[0].pos, before);
        assert_eq!(state.frame, frame);

        tick(&mut state, &at(11), &tuning);
        assert_ne!(state.entities[0].pos, before);
        assert!(state.effects.paused_until_ms.is_none());
    }

    #[test]
    fn test_survival_miss_costs_a_life() {
        let tuning = quiet();
        let mut state = GameState::new(&RoundConfig::survival(), &tuning, 1);
        let id = spawn_kind(&mut state, &tuning, EntityKind::Fruit);
        let bomb = spawn_kind(&mut state, &tuning, EntityKind::Bomb);
        for e in state.entities.iter_mut() {
            e.pos.y = tuning.height + 400.0;
        }
        tick(&mut state, &at(1), &tuning);
        assert!(state.entities.iter().all(|e| e.id != id && e.id != bomb));
        // Only the fruit counts
        assert_eq!(state.lives, 9);
        assert_eq!(state.misses.len(), 1);
    }

    #[test]
    fn test_falling_halves_are_culled_without_penalty() {
        let tuning = quiet();
        let mut state = GameState::new(&RoundConfig::survival(), &tuning, 1);
        let id = spawn_kind(&mut state, &tuning, EntityKind::Fruit);
        state.entities[0].pos = Vec2::new(400.0, 300.0);
        resolve_hit(&mut state, &tuning, id, 0.0);
        assert!(state.entities.iter().all(|e| e.is_half()));
        let combo = state.combo.hits;

        for e in state.entities.iter_mut() {
            e.pos.y = tuning.height + 400.0;
        }
        tick(&mut state, &at(1), &tuning);
        assert!(state.entities.is_empty());
        assert_eq!(state.lives, 10);
        assert_eq!(state.combo.hits, combo);
        assert!(state.misses.is_empty());
    }

    #[test]
    fn test_timed_miss_is_free() {
        let tuning = quiet();
        let mut state = GameState::new(&RoundConfig::default(), &tuning, 1);
        spawn_kind(&mut state, &tuning, EntityKind::Fruit);
        state.entities[0].pos.y = tuning.height + 400.0;
        state.combo.register_hit();
        tick(&mut state, &at(1), &tuning);
        assert!(state.entities.is_empty());
        assert_eq!(state.combo.hits, 1);
        assert!(state.misses.is_empty());
    }

    #[test]
    fn test_blade_slices_through_tick() {
        let tuning = quiet();
        let mut state = GameState::new(&RoundConfig::default(), &tuning, 1);
        spawn_kind(&mut state, &tuning, EntityKind::Fruit);
        state.entities[0].pos = Vec2::new(400.0, 300.0);
        state.entities[0].vel = Vec2::ZERO;
        state.entities[0].score_value = 2;

        let input = TickInput {
            now_ms: FRAME_MS,
            blade: Some(BladePath::Segment(Vec2::new(300.0, 300.0), Vec2::new(500.0, 300.0))),
        };
        tick(&mut state, &input, &tuning);
        assert_eq!(state.score, 2);
        assert_eq!(state.entities.iter().filter(|e| e.is_half()).count(), 2);

        // Same blade again: halves are immune
        let input = TickInput {
            now_ms: 2.0 * FRAME_MS,
            ..input
        };
        tick(&mut state, &input, &tuning);
        assert_eq!(state.score, 2);
    }

    #[test]
    fn test_halves_fade_out() {
        let tuning = quiet();
        let mut state = GameState::new(&RoundConfig::default(), &tuning, 1);
        spawn_kind(&mut state, &tuning, EntityKind::Fruit);
        let id = state.entities[0].id;
        state.entities[0].pos = Vec2::new(400.0, 300.0);
        resolve_hit(&mut state, &tuning, id, 0.0);
        assert_eq!(state.entities.len(), 2);

        tick(&mut state, &at(1), &tuning);
        assert_eq!(state.entities.len(), 2);
        let input = TickInput {
            now_ms: tuning.fade_window_ms,
            blade: None,
        };
        tick(&mut state, &input, &tuning);
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_ice_slows_and_expires() {
        let tuning = quiet();
        let mut state = GameState::new(&RoundConfig::default(), &tuning, 1);
        state.effects.ice_frames = 2;
        tick(&mut state, &at(1), &tuning);
        tick(&mut state, &at(2), &tuning);
        assert!(!state.ice_active());
        tick(&mut state, &at(3), &tuning);
        assert_eq!(state.effects.ice_frames, 0);
    }

    #[test]
    fn test_dodge_target_hit_and_survival_clock() {
        let tuning = quiet();
        let mut state = GameState::new(&RoundConfig::dodge(), &tuning, 1);
        spawn_kind(&mut state, &tuning, EntityKind::Fruit);
        state.entities[0].pos = tuning.center();
        state.entities[0].vel = Vec2::ZERO;

        tick(&mut state, &at(1), &tuning);
        assert!(state.entities.is_empty());
        assert_eq!(state.lives, tuning.lives - 1);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::TargetHit { .. }))
        );

        for f in 2..=61 {
            tick(&mut state, &at(f), &tuning);
        }
        // 60 frames after the first tick
        assert!((state.survived_secs() - 1.0).abs() < 0.011);
    }

    #[test]
    fn test_dodge_clock_frozen_while_paused() {
        let tuning = quiet();
        let mut state = GameState::new(&RoundConfig::dodge(), &tuning, 1);
        tick(&mut state, &at(0), &tuning);
        state.effects.paused_until_ms = Some(1000.0);
        tick(&mut state, &at(30), &tuning);
        assert_eq!(state.survived_ms, 0.0);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let mut a = GameState::new(&RoundConfig::default(), &tuning, 99);
        let mut b = GameState::new(&RoundConfig::default(), &tuning, 99);
        for f in 1..=400 {
            let input = TickInput {
                now_ms: f as f64 * FRAME_MS,
                blade: Some(BladePath::Point(Vec2::new(640.0, (f % 720) as f32))),
            };
            tick(&mut a, &input, &tuning);
            tick(&mut b, &input, &tuning);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.entities, b.entities);
    }

    proptest! {
        #[test]
        fn prop_frozen_after_game_over(
            seed in any::<u64>(),
            blades in prop::collection::vec((0.0f32..1280.0, 0.0f32..720.0), 1..60),
        ) {
            let tuning = Tuning::default();
            let mut state = GameState::new(&RoundConfig::survival(), &tuning, seed);
            for _ in 0..3 {
                spawn_kind(&mut state, &tuning, EntityKind::Fruit);
            }
            state.finish(RoundOver::OutOfLives);
            let (score, lives, time, frame) = (state.score, state.lives, state.time_left, state.frame);

            for (i, (x, y)) in blades.into_iter().enumerate() {
                let input = TickInput {
                    now_ms: i as f64 * FRAME_MS,
                    blade: Some(BladePath::Point(Vec2::new(x, y))),
                };
                tick(&mut state, &input, &tuning);
                register_miss(&mut state, &tuning, Vec2::new(x, y));
            }
            prop_assert_eq!(state.score, score);
            prop_assert_eq!(state.lives, lives);
            prop_assert_eq!(state.time_left, time);
            prop_assert_eq!(state.frame, frame);
        }
    }
}
