//! Meteor Storm - simulation core of a vertical-scrolling asteroid shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, boss stages)
//! - `level`: Data-driven level difficulty records

pub mod level;
pub mod sim;

pub use level::LevelConfig;
pub use sim::{GameEvent, GameState, TickInput, step, tick};

/// Game configuration constants
///
/// Speeds are in pixels per second, timers in simulation ticks.
pub mod consts {
    /// Simulation ticks per second
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;

    /// Default logical play area
    pub const ARENA_WIDTH: f32 = 480.0;
    pub const ARENA_HEIGHT: f32 = 800.0;

    // === Player ===
    pub const PLAYER_SPEED: f32 = 660.0;
    pub const MAX_ENERGY: i32 = 50;
    pub const MIN_POWER_LEVEL: u8 = 1;
    pub const MAX_POWER_LEVEL: u8 = 10;
    pub const MAX_SHIELD: u8 = 3;
    pub const MAX_BOMBS: u8 = 4;
    pub const START_BOMBS: u8 = 1;
    /// Resting height as a fraction of arena height
    pub const PLAYER_REST_Y_RATIO: f32 = 0.75;
    /// Player is kept this far inside the arena edges
    pub const PLAYER_EDGE_MARGIN: f32 = 20.0;
    /// Fraction of the remaining distance covered per tick in pointer mode
    pub const POINTER_EASING: f32 = 0.22;
    /// Fraction of the remaining distance covered per tick while entering
    pub const ENTRY_EASING: f32 = 0.10;
    pub const ENTRY_SNAP_DISTANCE: f32 = 5.0;
    /// Entry starts this far below the bottom edge
    pub const ENTRY_START_OFFSET: f32 = 50.0;
    pub const ENTRY_INVINCIBLE_TICKS: u32 = 60;
    pub const HIT_INVINCIBLE_TICKS: u32 = 120;
    pub const SHIELD_INVINCIBLE_TICKS: u32 = 30;
    /// Weapon decay kicks in at this power level
    pub const WEAPON_DECAY_THRESHOLD: u8 = 3;
    /// Weapon decay never drops below this level
    pub const WEAPON_DECAY_FLOOR: u8 = 2;
    pub const WEAPON_DECAY_TICKS: u32 = 10 * TICK_RATE;

    // === Weapon ===
    pub const BULLET_SPEED: f32 = 1080.0;
    /// Extra forward speed of charged (max level) bullets
    pub const CHARGED_BULLET_BOOST: f32 = 300.0;
    pub const BULLET_SIZE: f32 = 4.0;
    pub const CHARGED_BULLET_SIZE: f32 = 7.0;
    /// Muzzle offset above the player center
    pub const MUZZLE_OFFSET: f32 = 10.0;
    pub const SHOT_COOLDOWN_BASE_MS: u32 = 160;
    pub const SHOT_COOLDOWN_MIN_MS: u32 = 80;
    pub const SHOT_COOLDOWN_MAX_LEVEL_MS: u32 = 45;
    /// Per-bullet damage at max power level (levels below deal their level)
    pub const MAX_LEVEL_BULLET_DAMAGE: u32 = 15;

    // === Enemies ===
    pub const BASE_SPAWN_THRESHOLD: f32 = 30.0;
    pub const MIN_SPAWN_THRESHOLD: f32 = 5.0;
    pub const BOSS_MODE_SPAWN_THRESHOLD: f32 = 60.0;
    pub const ENEMY_BASE_SPEED: f32 = 240.0;
    /// Asteroid width at which speed equals the base speed
    pub const ENEMY_REFERENCE_SIZE: f32 = 50.0;
    pub const ENEMY_SPEED_JITTER: f32 = 30.0;
    pub const FRAGMENT_MAX_DRIFT: f32 = 240.0;
    pub const MAX_SPIN: f32 = 3.6;
    pub const PLAYER_CONTACT_PADDING: f32 = 15.0;
    pub const BULLET_CONTACT_PADDING: f32 = 10.0;
    pub const MIN_ASTEROID_WIDTH: f32 = 20.0;
    pub const MIN_BOSS_WIDTH: f32 = 50.0;
    pub const MIN_FRAGMENT_WIDTH: f32 = 15.0;
    pub const MIN_CONTACT_DAMAGE: u32 = 5;
    pub const ASTEROID_SCORE_PER_PIXEL: f32 = 3.0;

    // === Boss ===
    pub const BOSS_BASE_WIDTH: f32 = 200.0;
    pub const BOSS_MAX_WIDTH_RATIO: f32 = 0.6;
    pub const BOSS_HP_PER_PIXEL: f32 = 5.0;
    pub const BOSS_HP_PER_MINUTE: u32 = 30;
    pub const BOSS_BASE_SPEED: f32 = 150.0;
    pub const BOSS_SPEED_PER_STAGE: f32 = 18.0;
    pub const BOSS_SPIN: f32 = 0.48;
    /// Fraction of its width the boss may poke past the side walls
    pub const BOSS_OVERFLOW_RATIO: f32 = 0.3;
    /// Bottom band of the arena the boss may not enter
    pub const BOSS_SAFE_ZONE_RATIO: f32 = 0.10;
    pub const BOSS_EDGE_PADDING: f32 = 20.0;
    pub const BOSS_TOP_MARGIN: f32 = 50.0;
    /// Distance past the side walls before an enemy is culled
    pub const ENEMY_CULL_SIDE_MARGIN: f32 = 200.0;
    /// Distance below the bottom edge before an enemy is culled
    pub const ENEMY_CULL_BOTTOM_MARGIN: f32 = 300.0;
    pub const BOSS_DAMAGE_PER_STAGE: u32 = 10;
    pub const BOSS_SCORE_BONUS: u64 = 5000;
    pub const BOSS_SPEED_BONUS_MAX: u64 = 3000;
    /// Speed bonus lost per second of boss fight
    pub const BOSS_SPEED_BONUS_DECAY: u64 = 25;
    pub const BOSS_WARNING_TICKS: u32 = 3 * TICK_RATE;
    /// Pause between the final boss kill and the victory screen
    pub const BOSS_DEFEAT_DELAY_TICKS: u32 = TICK_RATE;
    pub const VICTORY_ENERGY_BONUS: u64 = 10;

    // === Meteor shower (during boss fights) ===
    pub const SHOWER_PERIOD_TICKS: u64 = 5 * TICK_RATE as u64;
    pub const SHOWER_BASE_COUNT: u32 = 2;
    pub const SHOWER_COUNT_PER_STAGE: u32 = 2;
    pub const SHOWER_STAGGER_TICKS: u64 = 18;
    pub const SHOWER_STAGGER_MIN_TICKS: u64 = 6;
    pub const SHOWER_MIN_SIZE: f32 = 15.0;
    pub const SHOWER_SIZE_PER_STAGE: f32 = 5.0;

    // === Items ===
    pub const ITEM_SIZE: f32 = 20.0;
    pub const ITEM_SPEED: f32 = 180.0;
    pub const ITEM_PICKUP_RADIUS: f32 = 35.0;
    pub const ITEM_PULSE_RATE: f32 = 12.0;
    pub const POWER_ENERGY_RESTORE: i32 = 5;
    pub const HEALTH_ENERGY_RESTORE: i32 = 30;
    pub const POWER_DROP_CHANCE: f64 = 0.03;
    pub const SHIELD_DROP_CHANCE: f64 = 0.01;
    /// Drop chance for POWER and SHIELD once the player is at max power
    pub const FULL_POWER_DROP_CHANCE: f64 = 0.01;
    pub const BOMB_DROP_CHANCE: f64 = 1.0;
    pub const GUARANTEED_POWER_WINDOW_SECS: (f32, f32) = (8.0, 10.0);
    pub const GUARANTEED_SHIELD_WINDOW_SECS: (f32, f32) = (18.0, 20.0);

    // === Bomb ===
    pub const BOMB_SCORE_PER_ENEMY: u64 = 50;
    /// Fraction of the boss's current HP removed by a bomb
    pub const BOMB_BOSS_DAMAGE_FRACTION: f32 = 0.5;

    // === Particles ===
    pub const MAX_PARTICLES: usize = 512;
    pub const PARTICLE_LIFETIME_TICKS: u32 = 40;
    pub const EXPLOSION_PARTICLES: usize = 20;
    pub const BOMB_PARTICLES: usize = 15;
    pub const BOMB_BOSS_PARTICLES: usize = 30;
    pub const SHIELD_BREAK_PARTICLES: usize = 15;
    pub const HIT_PARTICLES: usize = 20;
    pub const DEATH_PARTICLES: usize = 80;
}

/// Convert a duration in milliseconds to whole ticks (rounded)
#[inline]
pub fn ticks_from_millis(ms: u32) -> u32 {
    (ms * consts::TICK_RATE + 500) / 1000
}

/// Convert a duration in seconds to whole ticks (rounded, never negative)
#[inline]
pub fn ticks_from_secs(secs: f32) -> u64 {
    (secs.max(0.0) * consts::TICK_RATE as f32).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_conversions() {
        assert_eq!(ticks_from_millis(1000), 60);
        assert_eq!(ticks_from_millis(160), 10);
        assert_eq!(ticks_from_millis(45), 3);
        assert_eq!(ticks_from_secs(30.0), 1800);
        assert_eq!(ticks_from_secs(-1.0), 0);
    }
}
