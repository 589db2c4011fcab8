//! Collectible power-ups

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Collidable, Contact, Steppable};
use super::state::Arena;
use crate::consts::*;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Raises power level and restores a little energy
    Power,
    /// Adds a shield stack
    Shield,
    /// Adds a bomb charge
    Bomb,
    /// Restores energy
    Health,
}

/// A falling item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Pulse animation phase (cosmetic)
    pub pulse: f32,
}

impl Item {
    pub fn new(id: u32, kind: ItemKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::new(0.0, ITEM_SPEED),
            pulse: 0.0,
        }
    }

    pub fn is_off_screen(&self, arena: &Arena) -> bool {
        self.pos.y > arena.height + 100.0
    }
}

impl Steppable for Item {
    fn step(&mut self, _arena: &Arena, dt: f32) {
        self.pos += self.vel * dt;
        self.pulse += ITEM_PULSE_RATE * dt;
    }
}

impl Collidable for Item {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn contact_radius(&self, contact: Contact) -> f32 {
        match contact {
            Contact::Pickup => ITEM_PICKUP_RADIUS,
            Contact::Player | Contact::Projectile => ITEM_SIZE / 2.0,
        }
    }
}
