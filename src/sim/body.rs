//! Capabilities shared by simulated entities

use glam::Vec2;

use super::state::Arena;

/// What an entity is being tested against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Body contact with the player ship
    Player,
    /// A bullet
    Projectile,
    /// The player's pickup magnet (forgiving radius)
    Pickup,
}

/// Advances by one fixed timestep
pub trait Steppable {
    fn step(&mut self, arena: &Arena, dt: f32);
}

/// Has hit points
pub trait Damageable {
    /// Apply damage, returning true if this destroyed the entity
    fn apply_damage(&mut self, amount: u32) -> bool;

    fn is_destroyed(&self) -> bool;
}

/// Can be hit-tested against a point
pub trait Collidable {
    fn center(&self) -> Vec2;

    fn contact_radius(&self, contact: Contact) -> f32;

    /// Point-in-circle test using the current radius for `contact`
    fn touches(&self, point: Vec2, contact: Contact) -> bool {
        self.center().distance(point) < self.contact_radius(contact)
    }
}
