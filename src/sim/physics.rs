//! Per-frame motion: entities, particles and miss markers
//!
//! All rates are per frame. `speed` scales every motion term so slow motion
//! slows the whole world uniformly.

use glam::Vec2;

use super::state::{Entity, GameState, MissMarker, Particle};
use crate::config::Tuning;
use crate::consts::*;
use crate::geometry::random_range;

/// Particle life lost per frame
const PARTICLE_DECAY: f32 = 0.04;
/// Miss marker life lost per frame
const MISS_MARKER_DECAY: f32 = 0.02;
/// Burst speed range (per axis)
const PARTICLE_SPEED: f32 = 8.0;
const PARTICLE_SIZE_MIN: f32 = 5.0;
const PARTICLE_SIZE_MAX: f32 = 10.0;

/// Ballistic step for one entity
pub fn integrate(entity: &mut Entity, tuning: &Tuning, speed: f32) {
    let (gravity_scale, spin_scale) = if entity.is_half() {
        (HALF_GRAVITY_SCALE, HALF_SPIN_SCALE)
    } else {
        (1.0, 1.0)
    };

    entity.vel.y += tuning.gravity * gravity_scale * speed;
    entity.pos += entity.vel * speed;
    entity.rotation += entity.rotation_speed * spin_scale * speed;

    if tuning.wall_rebound {
        let left = WALL_MARGIN;
        let right = tuning.width - WALL_MARGIN;
        if entity.pos.x < left || entity.pos.x > right {
            entity.vel.x *= -WALL_DAMPING;
            // Nudge back inside so it doesn't re-trigger next frame
            entity.pos.x = if entity.pos.x < left { left + 1.0 } else { right - 1.0 };
        }
    }
}

/// Step every live entity
pub fn integrate_all(entities: &mut [Entity], tuning: &Tuning, speed: f32) {
    for entity in entities.iter_mut() {
        integrate(entity, tuning, speed);
    }
}

/// Below the bottom edge by more than the cull margin
#[inline]
pub fn fell_off_screen(entity: &Entity, tuning: &Tuning) -> bool {
    entity.pos.y > tuning.height + CULL_MARGIN
}

/// Drop halves that have fully faded. Returns how many were removed.
pub fn remove_faded(entities: &mut Vec<Entity>, now_ms: f64, fade_window_ms: f64) -> usize {
    let before = entities.len();
    entities.retain(|e| e.opacity(now_ms, fade_window_ms) > 0.0);
    before - entities.len()
}

/// Emit a burst of debris at `pos`
pub fn emit_burst(state: &mut GameState, pos: Vec2, color: u32, count: usize) {
    for _ in 0..count {
        let rng = state.rng();
        let vel = Vec2::new(
            random_range(rng, -PARTICLE_SPEED, PARTICLE_SPEED),
            random_range(rng, -PARTICLE_SPEED, PARTICLE_SPEED),
        );
        let size = random_range(rng, PARTICLE_SIZE_MIN, PARTICLE_SIZE_MAX);
        state.particles.push(Particle {
            pos,
            vel,
            color,
            life: 1.0,
            size,
        });
    }

    // Remove oldest particles to make room
    let excess = state.particles.len().saturating_sub(MAX_PARTICLES);
    if excess > 0 {
        state.particles.drain(..excess);
    }
}

/// Move and age particles; dead ones are removed
pub fn update_particles(particles: &mut Vec<Particle>) {
    for particle in particles.iter_mut() {
        particle.pos += particle.vel;
        particle.life -= PARTICLE_DECAY;
    }
    particles.retain(|p| p.life > 0.0);
}

/// Fade miss markers
pub fn update_miss_markers(markers: &mut Vec<MissMarker>) {
    for marker in markers.iter_mut() {
        marker.life -= MISS_MARKER_DECAY;
    }
    markers.retain(|m| m.life > 0.0);
}
