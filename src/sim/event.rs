//! Discrete events emitted by the simulation
//!
//! HUD, audio and achievement collaborators consume this stream; the core
//! never calls into them directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::item::ItemKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Score went up by `delta` (already scaled by the level multiplier)
    ScoreChanged { delta: u64, total: u64 },
    EnergyChanged(i32),
    PowerLevelChanged(u8),
    ShieldChanged(u8),
    BombCountChanged(u8),
    /// Player lost energy (a shield-absorbed hit is not damage)
    PlayerDamaged { amount: u32 },
    /// A shield stack absorbed a hit
    ShieldAbsorbed,
    BombUsed,
    ItemPickedUp(ItemKind),
    /// The auto-fire weapon emitted a volley
    BulletFired { count: u32 },
    EnemyExploded { is_boss: bool, pos: Vec2 },
    /// Warning phase started; the boss materializes when it ends
    BossWarning { stage: u32 },
    BossSpawned { stage: u32 },
    BossDamaged { hp: u32, max_hp: u32 },
    BossDefeated { stage: u32 },
    /// Boss left the play area without being destroyed
    BossEscaped { stage: u32 },
    GameOver { final_score: u64 },
    Victory { final_score: u64 },
}
