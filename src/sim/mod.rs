//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (gameplay and cosmetic streams kept apart)
//! - Deferred work goes through the owned timer queue
//! - No rendering or platform dependencies

pub mod body;
pub mod boss;
pub mod collision;
pub mod enemy;
pub mod event;
pub mod item;
pub mod player;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;
pub mod weapon;

pub use body::{Collidable, Contact, Damageable, Steppable};
pub use boss::{BossMachine, BossPhase};
pub use enemy::{Enemy, EnemyKind};
pub use event::GameEvent;
pub use item::{Item, ItemKind};
pub use player::{Player, PlayerStatus, Steering};
pub use state::{Arena, GamePhase, GameState, Particle};
pub use tick::{TickInput, step, tick};
pub use weapon::Bullet;
