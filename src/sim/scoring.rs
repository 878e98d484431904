//! Hit resolution and life/combo bookkeeping
//!
//! Every mutator here is a no-op once the round has ended, so late collision
//! or timer events arriving after game over can't change the result.

use glam::Vec2;

use super::physics::emit_burst;
use super::spawn::spawn_entity;
use super::state::{Entity, EntityKind, GameEvent, GameState, HalfSide, MissMarker, Slice};
use crate::config::Tuning;
use crate::consts::*;

/// Explosion debris color for bombs
pub const BOMB_BURST_COLOR: u32 = 0xff5500;
/// Debris color when the protected target is struck
pub const TARGET_BURST_COLOR: u32 = 0xff0000;
/// Miss markers sit this far above the bottom edge
const MISS_MARKER_INSET: f32 = 50.0;

/// Resolve a blade hit on entity `id`. Returns false when nothing happened
/// (unknown id, already halved, or the round is over).
pub fn resolve_hit(state: &mut GameState, tuning: &Tuning, id: u32, now_ms: f64) -> bool {
    if state.is_over() {
        return false;
    }
    let Some(index) = state.entities.iter().position(|e| e.id == id) else {
        return false;
    };
    if state.entities[index].is_half() {
        debug_assert!(false, "halved entity #{id} passed to resolve_hit");
        log::warn!("Ignoring hit on halved entity #{id}");
        return false;
    }

    let entity = state.entities.remove(index);
    match entity.kind {
        EntityKind::Fruit => slice_fruit(state, tuning, entity, now_ms),
        EntityKind::Bomb => detonate_bomb(state, tuning, &entity, now_ms),
        EntityKind::Ice => {
            state.effects.ice_frames = tuning.ice_frames;
            emit_burst(state, entity.pos, entity.color, tuning.particles_per_hit);
            state.push_event(GameEvent::Sliced {
                id,
                kind: EntityKind::Ice,
                points: 0,
                pos: entity.pos,
            });
            state.push_event(GameEvent::FreezeStarted);
            log::debug!("Freeze for {} frames", tuning.ice_frames);
        }
        EntityKind::Basket => {
            emit_burst(state, entity.pos, entity.color, tuning.particles_per_hit);
            state.push_event(GameEvent::Sliced {
                id,
                kind: EntityKind::Basket,
                points: 0,
                pos: entity.pos,
            });
            for _ in 0..tuning.basket_burst {
                spawn_entity(state, tuning);
            }
            state.push_event(GameEvent::Burst {
                count: tuning.basket_burst,
            });
            log::debug!("Basket burst of {}", tuning.basket_burst);
        }
    }
    true
}

fn slice_fruit(state: &mut GameState, tuning: &Tuning, entity: Entity, now_ms: f64) {
    let (multiplier, stepped) = state.combo.register_hit();
    let points = entity.score_value as u64 * multiplier as u64;
    state.score += points;
    log::debug!(
        "Sliced #{} {:?} for {} (x{}), score {}",
        entity.id,
        entity.sprite,
        points,
        multiplier,
        state.score
    );

    let slice_at = now_ms;
    for (side, dx) in [(HalfSide::Left, -HALF_SPLIT_VX), (HalfSide::Right, HALF_SPLIT_VX)] {
        let id = state.next_entity_id();
        state.entities.push(Entity {
            id,
            vel: entity.vel + Vec2::new(dx, -HALF_SPLIT_VY),
            sliced: Some(Slice {
                side,
                at_ms: slice_at,
            }),
            ..entity.clone()
        });
    }

    emit_burst(state, entity.pos, entity.color, tuning.particles_per_hit);
    state.push_event(GameEvent::Sliced {
        id: entity.id,
        kind: EntityKind::Fruit,
        points,
        pos: entity.pos,
    });
    if stepped {
        state.push_event(GameEvent::ComboUp {
            multiplier: state.combo.multiplier,
        });
    }
}

fn detonate_bomb(state: &mut GameState, tuning: &Tuning, bomb: &Entity, now_ms: f64) {
    state.score = state.score.saturating_sub(tuning.bomb_penalty);
    state.combo.reset();
    state.effects.paused_until_ms = Some(now_ms + tuning.bomb_pause_ms);
    emit_burst(state, bomb.pos, BOMB_BURST_COLOR, tuning.particles_per_hit * 2);
    state.push_event(GameEvent::BombHit {
        penalty: tuning.bomb_penalty,
        pos: bomb.pos,
    });
    log::debug!("Bomb #{} hit, score {}", bomb.id, state.score);
}

/// An ordinary item fell off the bottom in a mode that punishes misses
pub fn register_miss(state: &mut GameState, tuning: &Tuning, pos: Vec2) {
    if state.is_over() {
        return;
    }
    state.combo.reset();
    let marker_pos = Vec2::new(pos.x.clamp(0.0, tuning.width), tuning.height - MISS_MARKER_INSET);
    state.misses.push(MissMarker {
        pos: marker_pos,
        life: 1.0,
    });
    state.push_event(GameEvent::Missed { pos: marker_pos });
    state.lose_life();
}

/// Something reached the protected target
pub fn register_target_hit(state: &mut GameState, tuning: &Tuning, pos: Vec2) {
    if state.is_over() {
        return;
    }
    state.combo.reset();
    emit_burst(state, pos, TARGET_BURST_COLOR, tuning.particles_per_hit);
    state.push_event(GameEvent::TargetHit { pos });
    state.lose_life();
}
