//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time enters only through `TickInput::now_ms`
//! - Seeded RNG only
//! - Stable iteration order (entity vector order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod physics;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{BladePath, entities_touching, sliced_entities};
pub use scoring::{register_miss, register_target_hit, resolve_hit};
pub use spawn::{FRUIT_CATALOG, ItemDef, maybe_spawn, spawn_entity, spawn_kind};
pub use state::{
    ActiveEffects, Combo, Entity, EntityKind, GameEvent, GameState, HalfSide, MissMarker,
    Particle, RoundOver, Slice, Sprite,
};
pub use tick::{TickInput, tick};
