//! Game state and core simulation types
//!
//! All state that must survive a snapshot/restore lives here, including
//! both RNG streams and the pending timer queue.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::BossMachine;
use super::enemy::{Enemy, SpawnContext};
use super::event::GameEvent;
use super::item::{Item, ItemKind};
use super::player::Player;
use super::timer::TimerQueue;
use super::weapon::Bullet;
use crate::consts::*;
use crate::level::LevelConfig;
use crate::ticks_from_secs;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    GameOver,
    Victory,
}

/// Logical play area in pixels (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

impl Arena {
    /// Fall back to the default size for degenerate dimensions
    pub fn sanitized(self) -> Self {
        let valid = |v: f32| v.is_finite() && v >= 100.0;
        if valid(self.width) && valid(self.height) {
            self
        } else {
            log::warn!(
                "Arena {}x{} too small, using default",
                self.width,
                self.height
            );
            Self::default()
        }
    }
}

/// Explosion colors (RGB)
pub mod palette {
    pub const ROCK: u32 = 0x334155;
    pub const BIG_ROCK: u32 = 0x1e293b;
    pub const FRAGMENT: u32 = 0x475569;
    pub const BOMB: u32 = 0xf97316;
    pub const SHIELD: u32 = 0x3b82f6;
    pub const HIT: u32 = 0xef4444;
    pub const DEATH: u32 = 0xffffff;
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Ticks left to live
    pub life: u32,
    pub size: f32,
}

/// One-time early drops so runs are not starved of upgrades
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuaranteedDrops {
    pub power_dropped: bool,
    pub shield_dropped: bool,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Gameplay RNG stream
    pub rng: Pcg32,
    /// Cosmetic RNG stream (outlines, particles)
    pub fx_rng: Pcg32,
    pub level: LevelConfig,
    pub arena: Arena,
    pub phase: GamePhase,
    pub score: u64,
    /// Simulation tick counter (ticks since run start)
    pub time_ticks: u64,
    /// Ticks since the last normal asteroid spawn
    pub spawn_counter: u32,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub boss: BossMachine,
    pub timers: TimerQueue,
    pub drops: GuaranteedDrops,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a level-1 run on the default arena
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, LevelConfig::default(), Arena::default())
    }

    /// Create a run for the given level and arena
    pub fn with_config(seed: u64, level: LevelConfig, arena: Arena) -> Self {
        let level = level.sanitized();
        let arena = arena.sanitized();
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            fx_rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            boss: BossMachine::new(level.total_bosses, ticks_from_secs(level.boss_interval_seconds)),
            level,
            arena,
            phase: GamePhase::Playing,
            score: 0,
            time_ticks: 0,
            spawn_counter: 0,
            player: Player::new(&arena),
            bullets: Vec::new(),
            enemies: Vec::new(),
            items: Vec::new(),
            particles: Vec::new(),
            timers: TimerQueue::new(),
            drops: GuaranteedDrops::default(),
            next_id: 1,
        };
        state.reset(seed);
        state
    }

    /// Start a fresh run with the same level and arena
    ///
    /// The player value is reset in place; every pending timer is dropped.
    pub fn reset(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.fx_rng = Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);
        self.phase = GamePhase::Playing;
        self.score = 0;
        self.time_ticks = 0;
        self.spawn_counter = 0;
        self.player.reset(&self.arena);
        self.bullets.clear();
        self.enemies.clear();
        self.items.clear();
        self.particles.clear();
        self.boss = BossMachine::new(
            self.level.total_bosses,
            ticks_from_secs(self.level.boss_interval_seconds),
        );
        self.timers = TimerQueue::new();
        self.drops = GuaranteedDrops::default();
        self.next_id = 1;
        log::info!(
            "Run started: level {} ({}), seed {}",
            self.level.id,
            self.level.name,
            seed
        );
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.time_ticks as f32 / TICK_RATE as f32
    }

    /// Whole minutes since run start
    pub fn elapsed_minutes(&self) -> u32 {
        (self.time_ticks / (60 * TICK_RATE as u64)) as u32
    }

    /// Difficulty inputs for a new enemy
    pub fn spawn_context(&self, hp_multiplier: f32) -> SpawnContext {
        SpawnContext {
            arena: self.arena,
            score: self.score,
            elapsed_minutes: self.elapsed_minutes(),
            hp_multiplier,
        }
    }

    pub fn boss_index(&self) -> Option<usize> {
        self.enemies.iter().position(|e| e.is_boss())
    }

    /// Add a raw award, scaled by the level multiplier
    pub fn award_score(&mut self, base: u64, events: &mut Vec<GameEvent>) {
        let delta = self.level.scale_score(base);
        if delta == 0 {
            return;
        }
        self.score += delta;
        events.push(GameEvent::ScoreChanged {
            delta,
            total: self.score,
        });
    }

    pub fn spawn_item(&mut self, kind: ItemKind, pos: Vec2) {
        let id = self.next_entity_id();
        self.items.push(Item::new(id, kind, pos));
    }

    /// Spray `count` particles from `pos`, evicting the oldest over the cap
    pub fn burst(&mut self, pos: Vec2, color: u32, count: usize) {
        let overflow = (self.particles.len() + count).saturating_sub(MAX_PARTICLES);
        if overflow > 0 {
            let evict = overflow.min(self.particles.len());
            self.particles.drain(..evict);
        }
        for _ in 0..count.min(MAX_PARTICLES) {
            let angle = self.fx_rng.random::<f32>() * std::f32::consts::TAU;
            let speed = 60.0 + self.fx_rng.random::<f32>() * 240.0;
            let size = 1.5 + self.fx_rng.random::<f32>() * 2.5;
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color,
                life: PARTICLE_LIFETIME_TICKS,
                size,
            });
        }
    }

    /// Serialize a snapshot
    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Failed to serialize game state: {}", e);
                None
            }
        }
    }

    /// Restore a snapshot
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("Failed to restore game state: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run() {
        let state = GameState::new(1);
        assert!(state.is_playing());
        assert!(state.player.entering);
        assert_eq!(state.boss.total, 3);
        assert_eq!(state.boss.interval_ticks, 30 * TICK_RATE as u64);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = GameState::new(1);
        state.score = 999;
        state.time_ticks = 5000;
        state.player.power_level = 7;
        state.spawn_item(ItemKind::Bomb, Vec2::ZERO);
        state.burst(Vec2::ZERO, palette::HIT, 10);
        let token = state.timers.new_token();
        state.timers.schedule(
            6000,
            token,
            super::super::timer::DeferredAction::ShowerMeteor { x: 0.0, width: 20.0 },
        );

        state.reset(2);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.player.power_level, MIN_POWER_LEVEL);
        assert!(state.items.is_empty());
        assert!(state.particles.is_empty());
        assert!(state.timers.is_empty());
        assert_eq!(state.seed, 2);
    }

    #[test]
    fn test_particle_cap() {
        let mut state = GameState::new(1);
        for _ in 0..100 {
            state.burst(Vec2::ZERO, palette::ROCK, 20);
        }
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_degenerate_arena_falls_back() {
        let state = GameState::with_config(
            1,
            LevelConfig::default(),
            Arena {
                width: 0.0,
                height: f32::NAN,
            },
        );
        assert_eq!(state.arena, Arena::default());
    }

    #[test]
    fn test_elapsed_minutes_floor() {
        let mut state = GameState::new(1);
        state.time_ticks = 119 * TICK_RATE as u64;
        assert_eq!(state.elapsed_minutes(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let mut state = GameState::new(77);
        state.score = 1234;
        state.spawn_item(ItemKind::Health, Vec2::new(10.0, 20.0));
        let json = state.to_json().unwrap();
        let restored = GameState::from_json(&json).unwrap();
        assert_eq!(restored.score, 1234);
        assert_eq!(restored.items.len(), 1);
        assert_eq!(restored.boss, state.boss);
        assert!(GameState::from_json("{}").is_none());
    }
}
