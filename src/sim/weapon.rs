//! Player weapon: bullets, fire patterns and per-level tuning

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Steppable;
use super::state::Arena;
use crate::consts::*;
use crate::ticks_from_millis;

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Max-level shot (bigger and faster, drawn differently)
    pub charged: bool,
}

impl Bullet {
    pub fn is_off_screen(&self, arena: &Arena) -> bool {
        self.pos.y < -100.0 || self.pos.x < -200.0 || self.pos.x > arena.width + 200.0
    }
}

impl Steppable for Bullet {
    fn step(&mut self, _arena: &Arena, dt: f32) {
        self.pos += self.vel * dt;
    }
}

/// Ticks between volleys at the given power level
pub fn shot_cooldown_ticks(level: u8) -> u32 {
    let ms = if level >= MAX_POWER_LEVEL {
        SHOT_COOLDOWN_MAX_LEVEL_MS
    } else {
        SHOT_COOLDOWN_BASE_MS
            .saturating_sub(level as u32 * 10)
            .max(SHOT_COOLDOWN_MIN_MS)
    };
    ticks_from_millis(ms).max(1)
}

/// Damage dealt by one bullet at the given power level
///
/// Linear up to level 9; max level deals a fixed bonus above that.
pub fn bullet_damage(level: u8) -> u32 {
    if level >= MAX_POWER_LEVEL {
        MAX_LEVEL_BULLET_DAMAGE
    } else {
        level.max(MIN_POWER_LEVEL) as u32
    }
}

/// Build the volley for `level` fired from `origin` (player center)
pub fn fire_pattern(level: u8, origin: Vec2) -> Vec<Bullet> {
    let muzzle = origin - Vec2::new(0.0, MUZZLE_OFFSET);
    let shot = |offset_x: f32, vx: f32| Bullet {
        pos: muzzle + Vec2::new(offset_x, 0.0),
        vel: Vec2::new(vx, -BULLET_SPEED),
        size: BULLET_SIZE,
        charged: false,
    };

    match level {
        0 | 1 => vec![shot(0.0, 0.0)],
        2 => vec![shot(-8.0, 0.0), shot(8.0, 0.0)],
        3 => vec![shot(0.0, 0.0), shot(-12.0, 0.0), shot(12.0, 0.0)],
        4 => vec![
            shot(-3.0, 0.0),
            shot(3.0, 0.0),
            shot(-8.0, -60.0),
            shot(8.0, 60.0),
        ],
        5..=9 => {
            let center = (level as f32 - 1.0) / 2.0;
            (0..level)
                .map(|i| shot(0.0, (i as f32 - center) * 0.125 * 360.0))
                .collect()
        }
        _ => (0..22)
            .map(|i| Bullet {
                pos: muzzle,
                vel: Vec2::new(
                    (i as f32 - 10.5) * 0.045 * 150.0,
                    -(BULLET_SPEED + CHARGED_BULLET_BOOST),
                ),
                size: CHARGED_BULLET_SIZE,
                charged: true,
            })
            .collect(),
    }
}
