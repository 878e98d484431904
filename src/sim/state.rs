//! Game state and core simulation types
//!
//! Everything the per-frame systems mutate lives in [`GameState`], which the
//! session owns and lends to each system in turn.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{GameMode, RoundConfig, Tuning};

/// What an entity does when sliced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Ordinary item: points, combo, splits in two
    Fruit,
    /// Penalty, combo reset, short freeze of the world
    Bomb,
    /// Slow motion for a while
    Ice,
    /// Launches a burst of extra entities
    Basket,
}

/// Visual identity (catalog entry) of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sprite {
    Watermelon,
    Banana,
    Orange,
    Strawberry,
    Lemon,
    Coconut,
    Bomb,
    Ice,
    Basket,
}

/// Which half of a cut fruit this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HalfSide {
    Left,
    Right,
}

/// Marks an entity as one half of a sliced fruit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub side: HalfSide,
    /// Shared by both halves
    pub at_ms: f64,
}

/// A flying object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub sprite: Sprite,
    /// 0xRRGGBB
    pub color: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub scale: f32,
    pub score_value: u32,
    /// `None` while whole; halves can never be hit again
    pub sliced: Option<Slice>,
}

impl Entity {
    #[inline]
    pub fn is_half(&self) -> bool {
        self.sliced.is_some()
    }

    /// 1.0 for whole entities; halves fade linearly to 0 over the window
    pub fn opacity(&self, now_ms: f64, fade_window_ms: f64) -> f32 {
        match self.sliced {
            None => 1.0,
            Some(slice) => {
                let age = (now_ms - slice.at_ms).max(0.0);
                (1.0 - age / fade_window_ms).max(0.0) as f32
            }
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0xRRGGBB
    pub color: u32,
    /// 0-1, decreases every frame
    pub life: f32,
    pub size: f32,
}

/// Fading "X" where a fruit fell off screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissMarker {
    pub pos: Vec2,
    pub life: f32,
}

/// Timed effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    /// Frames of slow motion left
    pub ice_frames: u32,
    /// World frozen until this time (bomb cooldown)
    pub paused_until_ms: Option<f64>,
}

/// Consecutive-hit streak and the multiplier it earns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    pub hits: u32,
    pub multiplier: u32,
    step: u32,
}

impl Combo {
    pub fn new(step: u32) -> Self {
        Self {
            hits: 0,
            multiplier: 1,
            step: step.max(1),
        }
    }

    /// Count a hit. Returns the multiplier that applies to this hit and
    /// whether the streak just earned the next step.
    pub fn register_hit(&mut self) -> (u32, bool) {
        let applied = self.multiplier;
        self.hits += 1;
        let stepped = self.hits.is_multiple_of(self.step);
        if stepped {
            self.multiplier += 1;
        }
        (applied, stepped)
    }

    pub fn reset(&mut self) {
        self.hits = 0;
        self.multiplier = 1;
    }

    /// Hits toward the next multiplier step
    pub fn progress(&self) -> u32 {
        self.hits % self.step
    }

    pub fn step(&self) -> u32 {
        self.step
    }
}

/// Why a round ended on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOver {
    TimeUp,
    OutOfLives,
}

/// Things that happened this frame, for HUD, notifications and sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Sliced {
        id: u32,
        kind: EntityKind,
        points: u64,
        pos: Vec2,
    },
    BombHit {
        penalty: u64,
        pos: Vec2,
    },
    FreezeStarted,
    Burst {
        count: u32,
    },
    ComboUp {
        multiplier: u32,
    },
    Missed {
        pos: Vec2,
    },
    TargetHit {
        pos: Vec2,
    },
    LevelUp {
        difficulty: f32,
    },
    ClockTick {
        remaining: u32,
    },
    RoundOver(RoundOver),
}

impl GameEvent {
    /// Banner text for events worth announcing
    pub fn notification(&self) -> Option<String> {
        match self {
            GameEvent::Started => Some("START!".to_string()),
            GameEvent::BombHit { penalty, .. } => Some(format!("BOMB! -{penalty}")),
            GameEvent::FreezeStarted => Some("FREEZE!".to_string()),
            GameEvent::Burst { .. } => Some("BURST!".to_string()),
            GameEvent::ComboUp { multiplier } => Some(format!("COMBO x{multiplier}!")),
            GameEvent::Missed { .. } => Some("MISS!".to_string()),
            GameEvent::TargetHit { .. } => Some("HIT!".to_string()),
            GameEvent::LevelUp { .. } => Some("SPEED UP!".to_string()),
            _ => None,
        }
    }
}

/// Complete simulation state for one round
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: GameMode,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Frames simulated since play started
    pub frame: u64,
    pub score: u64,
    pub lives: u32,
    /// Timed mode countdown (seconds)
    pub time_left: u32,
    /// Grows by a fixed factor every difficulty period, never shrinks
    pub difficulty: f32,
    pub combo: Combo,
    pub effects: ActiveEffects,
    pub entities: Vec<Entity>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub misses: Vec<MissMarker>,
    pub last_spawn_frame: u64,
    /// Dodge mode score: unpaused play time
    pub survived_ms: f64,
    /// Timestamp of the previous tick
    pub clock_ms: Option<f64>,
    events: Vec<GameEvent>,
    over: Option<RoundOver>,
    next_id: u32,
}

impl GameState {
    pub fn new(round: &RoundConfig, tuning: &Tuning, seed: u64) -> Self {
        let lives = if round.mode.uses_lives() { tuning.lives } else { 0 };
        Self {
            mode: round.mode,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            frame: 0,
            score: 0,
            lives,
            time_left: round.duration_secs,
            difficulty: 1.0,
            combo: Combo::new(tuning.combo_step),
            effects: ActiveEffects::default(),
            entities: Vec::new(),
            particles: Vec::new(),
            misses: Vec::new(),
            last_spawn_frame: 0,
            survived_ms: 0.0,
            clock_ms: None,
            events: Vec::new(),
            over: None,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take this frame's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// True once the round has ended; all mutation stops
    #[inline]
    pub fn is_over(&self) -> bool {
        self.over.is_some()
    }

    pub fn round_over(&self) -> Option<RoundOver> {
        self.over
    }

    /// Latch game over. Later calls are ignored.
    pub fn finish(&mut self, reason: RoundOver) {
        if self.over.is_some() {
            return;
        }
        log::info!(
            "Round over ({:?}) at frame {}: score {}, lives {}",
            reason,
            self.frame,
            self.score,
            self.lives
        );
        self.over = Some(reason);
        self.push_event(GameEvent::RoundOver(reason));
    }

    /// World frozen by a bomb? Clears an expired pause.
    pub fn is_paused(&mut self, now_ms: f64) -> bool {
        match self.effects.paused_until_ms {
            Some(until) if now_ms < until => true,
            Some(_) => {
                self.effects.paused_until_ms = None;
                false
            }
            None => false,
        }
    }

    pub fn ice_active(&self) -> bool {
        self.effects.ice_frames > 0
    }

    /// Take one life; ends the round at zero
    pub fn lose_life(&mut self) {
        if self.is_over() {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.finish(RoundOver::OutOfLives);
        }
    }

    /// Dodge mode score in seconds, two decimals
    pub fn survived_secs(&self) -> f64 {
        (self.survived_ms / 10.0).floor() / 100.0
    }
}
