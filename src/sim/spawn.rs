//! Spawn scheduling and launch kinematics
//!
//! Entities start below the bottom edge in the left or right third of the
//! screen and are thrown on a parabola whose apex clears the top edge.

use glam::Vec2;
use rand::Rng;

use super::state::{Entity, EntityKind, GameState, Sprite};
use crate::config::Tuning;
use crate::consts::*;
use crate::geometry::random_range;

/// Catalog entry: how an item looks and what it is worth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDef {
    pub sprite: Sprite,
    pub color: u32,
    pub score: u32,
}

/// Ordinary items, drawn uniformly
pub const FRUIT_CATALOG: [ItemDef; 6] = [
    ItemDef { sprite: Sprite::Watermelon, color: 0xff5555, score: 1 },
    ItemDef { sprite: Sprite::Banana, color: 0xffff55, score: 1 },
    ItemDef { sprite: Sprite::Orange, color: 0xffaa00, score: 1 },
    ItemDef { sprite: Sprite::Strawberry, color: 0xff0055, score: 2 },
    ItemDef { sprite: Sprite::Lemon, color: 0xffff00, score: 1 },
    ItemDef { sprite: Sprite::Coconut, color: 0xffffff, score: 3 },
];

pub const BOMB_DEF: ItemDef = ItemDef { sprite: Sprite::Bomb, color: 0x000000, score: 0 };
pub const ICE_DEF: ItemDef = ItemDef { sprite: Sprite::Ice, color: 0x00ffff, score: 0 };
pub const BASKET_DEF: ItemDef = ItemDef { sprite: Sprite::Basket, color: 0xd2b48c, score: 0 };

/// Distance from the side edges that launch zones keep clear of
const LAUNCH_EDGE_INSET: f32 = 100.0;
/// Drawn size of spawned entities
const ENTITY_SCALE: f32 = 2.2;
const MAX_ROTATION_SPEED: f32 = 0.1;

/// Weighted category draw
pub fn draw_kind<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning) -> EntityKind {
    let roll: f32 = rng.random();
    let bomb = tuning.bomb_weight;
    let ice = bomb + tuning.ice_weight;
    let basket = ice + tuning.basket_weight;

    if roll < bomb {
        EntityKind::Bomb
    } else if roll < ice {
        EntityKind::Ice
    } else if roll < basket {
        EntityKind::Basket
    } else {
        EntityKind::Fruit
    }
}

fn def_for<R: Rng + ?Sized>(rng: &mut R, kind: EntityKind) -> ItemDef {
    match kind {
        EntityKind::Fruit => FRUIT_CATALOG[rng.random_range(0..FRUIT_CATALOG.len())],
        EntityKind::Bomb => BOMB_DEF,
        EntityKind::Ice => ICE_DEF,
        EntityKind::Basket => BASKET_DEF,
    }
}

/// Speed needed to climb `height` against `gravity`: v0 = sqrt(2 g h)
#[inline]
pub fn launch_speed(gravity: f32, height: f32) -> f32 {
    (2.0 * gravity * height.max(0.0)).sqrt()
}

/// Frames until a body launched upward at `vy` (negative) from `y0` first
/// reaches `y`, or `None` if it never gets that high.
fn frames_to_reach(y0: f32, vy: f32, gravity: f32, y: f32) -> Option<f32> {
    // y0 + vy t + g t² / 2 = y, smaller root
    let disc = vy * vy - 2.0 * gravity * (y0 - y);
    if disc < 0.0 {
        return None;
    }
    let t = (-vy - disc.sqrt()) / gravity;
    (t > 0.0).then_some(t)
}

/// Initial position and velocity for a new entity
pub fn launch<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning, aim_at_center: bool) -> (Vec2, Vec2) {
    let w = tuning.width;
    let h = tuning.height;

    let from_left = rng.random_bool(0.5);
    let x = if from_left {
        random_range(rng, LAUNCH_EDGE_INSET, w / 3.0)
    } else {
        random_range(rng, 2.0 * w / 3.0, w - LAUNCH_EDGE_INSET)
    };
    let y = h + SPAWN_DEPTH;

    let angle = random_range(rng, tuning.launch_angle_min_deg, tuning.launch_angle_max_deg).to_radians();
    let apex = h + random_range(rng, tuning.apex_overshoot_min, tuning.apex_overshoot_max);
    let speed = launch_speed(tuning.gravity, apex);

    let direction = if from_left { 1.0 } else { -1.0 };
    let mut vx = angle.cos() * speed * tuning.launch_spread * direction;
    let vy = -angle.sin() * speed;

    // Dodge: bend the throw toward the protected target
    if aim_at_center {
        let center = tuning.center();
        if let Some(t) = frames_to_reach(y, vy, tuning.gravity, center.y) {
            let aimed = (center.x - x) / t;
            vx += (aimed - vx) * tuning.dodge_aim.clamp(0.0, 1.0);
        }
    }

    (Vec2::new(x, y), Vec2::new(vx, vy))
}

/// Launch one entity of a randomly drawn category
pub fn spawn_entity(state: &mut GameState, tuning: &Tuning) -> u32 {
    let kind = draw_kind(state.rng(), tuning);
    spawn_kind(state, tuning, kind)
}

/// Launch one entity of the given category
pub fn spawn_kind(state: &mut GameState, tuning: &Tuning, kind: EntityKind) -> u32 {
    let aim = state.mode.protects_center();
    let id = state.next_entity_id();
    let rng = state.rng();
    let def = def_for(rng, kind);
    let (pos, vel) = launch(rng, tuning, aim);
    let rotation_speed = random_range(rng, -MAX_ROTATION_SPEED, MAX_ROTATION_SPEED);

    log::debug!("Spawn #{id} {:?} at ({:.0}, {:.0})", kind, pos.x, pos.y);
    state.entities.push(Entity {
        id,
        kind,
        sprite: def.sprite,
        color: def.color,
        pos,
        vel,
        rotation: 0.0,
        rotation_speed,
        scale: ENTITY_SCALE,
        score_value: def.score,
        sliced: None,
    });
    id
}

/// Frames between spawns right now
pub fn spawn_interval(tuning: &Tuning, difficulty: f32, ice_active: bool) -> f32 {
    let mut interval = tuning.spawn_interval_frames / difficulty.max(f32::EPSILON);
    if ice_active {
        interval /= tuning.ice_spawn_divisor;
    }
    interval
}

/// Spawn scheduler: at most one entity per frame once the interval elapses
pub fn maybe_spawn(state: &mut GameState, tuning: &Tuning) -> Option<u32> {
    let interval = spawn_interval(tuning, state.difficulty, state.ice_active());
    if (state.frame - state.last_spawn_frame) as f32 > interval {
        state.last_spawn_frame = state.frame;
        Some(spawn_entity(state, tuning))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_category_weights() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        let n = 20_000;
        let mut fruit = 0;
        let mut bomb = 0;
        for _ in 0..n {
            match draw_kind(&mut rng, &tuning) {
                EntityKind::Fruit => fruit += 1,
                EntityKind::Bomb => bomb += 1,
                _ => {}
            }
        }
        let fruit_share = fruit as f32 / n as f32;
        let bomb_share = bomb as f32 / n as f32;
        assert!((0.82..0.88).contains(&fruit_share), "fruit share {fruit_share}");
        assert!((0.06..0.10).contains(&bomb_share), "bomb share {bomb_share}");
    }

    #[test]
    fn test_launch_zones_and_arc() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            let (pos, vel) = launch(&mut rng, &tuning, false);
            let w = tuning.width;
            let in_left = pos.x >= LAUNCH_EDGE_INSET && pos.x < w / 3.0;
            let in_right = pos.x >= 2.0 * w / 3.0 && pos.x < w - LAUNCH_EDGE_INSET;
            assert!(in_left || in_right);
            assert_eq!(pos.y, tuning.height + SPAWN_DEPTH);
            assert!(vel.y < 0.0, "must be thrown upward");
            // Thrown toward the middle
            if in_left {
                assert!(vel.x > 0.0);
            } else {
                assert!(vel.x < 0.0);
            }
        }
    }

    #[test]
    fn test_launch_speed_reaches_apex() {
        let g = 0.28;
        let v0 = launch_speed(g, 800.0);
        // v² = 2 g h
        assert!((v0 * v0 / (2.0 * g) - 800.0).abs() < 1e-2);
        assert_eq!(launch_speed(g, -5.0), 0.0);
    }

    #[test]
    fn test_dodge_throws_toward_center() {
        let tuning = Tuning {
            launch_angle_min_deg: 80.0,
            launch_angle_max_deg: 80.0,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(11);
        let center = tuning.center();
        for _ in 0..100 {
            let (pos, vel) = launch(&mut rng, &tuning, true);
            let t = frames_to_reach(pos.y, vel.y, tuning.gravity, center.y).expect("reaches center height");
            let x_at = pos.x + vel.x * t;
            assert!((x_at - center.x).abs() < 1.0, "passes {x_at} vs {}", center.x);
        }
    }

    #[test]
    fn test_spawn_interval_shrinks() {
        let tuning = Tuning::default();
        let base = spawn_interval(&tuning, 1.0, false);
        assert_eq!(base, tuning.spawn_interval_frames);
        assert!(spawn_interval(&tuning, 1.2, false) < base);
        assert_eq!(spawn_interval(&tuning, 1.0, true), base / tuning.ice_spawn_divisor);
    }

    #[test]
    fn test_spawned_entities_get_unique_ids() {
        let tuning = Tuning::default();
        let mut state = GameState::new(&RoundConfig::default(), &tuning, 5);
        let a = spawn_entity(&mut state, &tuning);
        let b = spawn_kind(&mut state, &tuning, EntityKind::Bomb);
        assert_ne!(a, b);
        assert_eq!(state.entities.len(), 2);
        assert_eq!(state.entities[1].sprite, Sprite::Bomb);
        assert!(state.entities.iter().all(|e| e.sliced.is_none()));
    }
}
