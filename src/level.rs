//! Level difficulty records
//!
//! Supplied once at run start and immutable for the run's duration.

use serde::{Deserialize, Serialize};

/// Difficulty knobs for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Level number (1-based)
    pub id: u32,
    /// Display name for the HUD
    #[serde(default)]
    pub name: String,
    /// Score the level is balanced around (informational)
    #[serde(default)]
    pub target_score: u64,
    /// Seconds from run start (first boss) or last boss kill (later bosses)
    pub boss_interval_seconds: f32,
    /// Boss encounters needed to clear the level
    pub total_bosses: u32,
    /// Divides the normal spawn threshold (higher = more asteroids)
    pub enemy_spawn_rate: f32,
    pub enemy_hp_multiplier: f32,
    pub boss_hp_multiplier: f32,
    pub score_multiplier: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::level_one()
    }
}

impl LevelConfig {
    /// Number of built-in levels
    pub const BUILTIN_LEVELS: u32 = 3;

    fn level_one() -> Self {
        Self {
            id: 1,
            name: "Level 1: First Mission".to_string(),
            target_score: 120_000,
            boss_interval_seconds: 30.0,
            total_bosses: 3,
            enemy_spawn_rate: 1.0,
            enemy_hp_multiplier: 1.0,
            boss_hp_multiplier: 1.0,
            score_multiplier: 1.0,
        }
    }

    /// Built-in level table
    pub fn builtin(id: u32) -> Option<Self> {
        match id {
            1 => Some(Self::level_one()),
            2 => Some(Self {
                id: 2,
                name: "Level 2: Advanced Op".to_string(),
                target_score: 180_000,
                boss_interval_seconds: 25.0,
                total_bosses: 4,
                enemy_spawn_rate: 1.2,
                enemy_hp_multiplier: 1.3,
                boss_hp_multiplier: 1.5,
                score_multiplier: 1.5,
            }),
            3 => Some(Self {
                id: 3,
                name: "Level 3: Final Battle".to_string(),
                target_score: 250_000,
                boss_interval_seconds: 20.0,
                total_bosses: 5,
                enemy_spawn_rate: 1.5,
                enemy_hp_multiplier: 1.6,
                boss_hp_multiplier: 2.0,
                score_multiplier: 2.0,
            }),
            _ => None,
        }
    }

    /// Look up a level, falling back to level 1 for unknown ids
    pub fn for_level(id: u32) -> Self {
        Self::builtin(id).unwrap_or_else(|| {
            log::warn!("Unknown level {}, falling back to level 1", id);
            Self::level_one()
        })
    }

    /// Parse a level record from JSON, falling back to level 1 if malformed
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Self>(json) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                log::warn!("Malformed level config ({}), falling back to level 1", e);
                Self::level_one()
            }
        }
    }

    /// Clamp every knob into a range the simulation can run with
    pub fn sanitized(mut self) -> Self {
        fn clamp_multiplier(field: &str, value: f32) -> f32 {
            if value.is_finite() && (0.1..=10.0).contains(&value) {
                value
            } else {
                let clamped = if value.is_finite() { value.clamp(0.1, 10.0) } else { 1.0 };
                log::warn!("Level {} out of range ({}), using {}", field, value, clamped);
                clamped
            }
        }

        self.enemy_spawn_rate = clamp_multiplier("enemy_spawn_rate", self.enemy_spawn_rate);
        self.enemy_hp_multiplier =
            clamp_multiplier("enemy_hp_multiplier", self.enemy_hp_multiplier);
        self.boss_hp_multiplier = clamp_multiplier("boss_hp_multiplier", self.boss_hp_multiplier);
        self.score_multiplier = clamp_multiplier("score_multiplier", self.score_multiplier);

        if !self.boss_interval_seconds.is_finite() || self.boss_interval_seconds < 1.0 {
            log::warn!(
                "Level boss_interval_seconds out of range ({}), using 30",
                self.boss_interval_seconds
            );
            self.boss_interval_seconds = 30.0;
        }
        if self.total_bosses == 0 {
            log::warn!("Level total_bosses is 0, using 1");
            self.total_bosses = 1;
        }
        self
    }

    /// Scale a raw score award by this level's multiplier
    pub fn scale_score(&self, base: u64) -> u64 {
        (base as f64 * self.score_multiplier as f64).floor() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level_falls_back() {
        let config = LevelConfig::for_level(42);
        assert_eq!(config, LevelConfig::for_level(1));
        assert_eq!(config.total_bosses, 3);
    }

    #[test]
    fn test_builtin_levels_get_harder() {
        let one = LevelConfig::for_level(1);
        let three = LevelConfig::for_level(3);
        assert!(three.boss_interval_seconds < one.boss_interval_seconds);
        assert!(three.total_bosses > one.total_bosses);
        assert!(three.enemy_hp_multiplier > one.enemy_hp_multiplier);
    }

    #[test]
    fn test_from_json_malformed() {
        let config = LevelConfig::from_json("{ not json");
        assert_eq!(config.id, 1);
    }

    #[test]
    fn test_from_json_sanitizes() {
        let json = r#"{
            "id": 9,
            "boss_interval_seconds": 0.0,
            "total_bosses": 0,
            "enemy_spawn_rate": 50.0,
            "enemy_hp_multiplier": 1.0,
            "boss_hp_multiplier": -3.0,
            "score_multiplier": 2.0
        }"#;
        let config = LevelConfig::from_json(json);
        assert_eq!(config.id, 9);
        assert_eq!(config.total_bosses, 1);
        assert_eq!(config.boss_interval_seconds, 30.0);
        assert_eq!(config.enemy_spawn_rate, 10.0);
        assert_eq!(config.boss_hp_multiplier, 0.1);
        assert_eq!(config.score_multiplier, 2.0);
    }

    #[test]
    fn test_scale_score() {
        let config = LevelConfig::for_level(2);
        assert_eq!(config.scale_score(100), 150);
    }
}
