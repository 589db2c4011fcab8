//! The player ship and its state rules
//!
//! Every mutation of energy, power level, shield and bombs goes through
//! here so the floors and ceilings are enforced at each site.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::event::GameEvent;
use super::item::ItemKind;
use super::state::Arena;
use super::weapon::shot_cooldown_ticks;
use crate::consts::*;

/// Normalized steering intent for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Steering {
    /// Absolute pointer position in arena coordinates
    Pointer(Vec2),
    /// Discrete direction (components in -1..=1)
    Direction(Vec2),
}

/// How the ship is currently being driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputMode {
    #[default]
    Pointer,
    Direction,
}

/// Why the ship is currently invincible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InvincibleCause {
    #[default]
    Entry,
    Shield,
    Damage,
}

/// Coarse player state, derived from the fields below
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Normal,
    /// Recovering from a shield-absorbed hit
    ShieldedHit,
    /// Recovering from an energy hit
    PoweredDown,
    Invincible,
    Entering,
    Dead,
}

/// Result of a hit on the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Invincible, entering or already dead
    Ignored,
    ShieldAbsorbed,
    Damaged,
    Killed,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Smoothed-movement target
    pub target: Vec2,
    /// Displacement over the last tick (drives the bank animation)
    pub vel: Vec2,
    pub speed: f32,
    pub energy: i32,
    pub max_energy: i32,
    pub power_level: u8,
    pub shield: u8,
    pub bombs: u8,
    pub invincible_ticks: u32,
    pub invincible_cause: InvincibleCause,
    pub entering: bool,
    pub input_mode: InputMode,
    /// Ticks until the weapon may fire again
    pub shot_cooldown: u32,
    /// Ticks spent at or above the weapon decay threshold
    pub decay_ticks: u32,
}

impl Player {
    pub fn new(arena: &Arena) -> Self {
        let mut player = Self {
            pos: Vec2::ZERO,
            target: Vec2::ZERO,
            vel: Vec2::ZERO,
            speed: PLAYER_SPEED,
            energy: MAX_ENERGY,
            max_energy: MAX_ENERGY,
            power_level: MIN_POWER_LEVEL,
            shield: 0,
            bombs: START_BOMBS,
            invincible_ticks: 0,
            invincible_cause: InvincibleCause::Entry,
            entering: false,
            input_mode: InputMode::Pointer,
            shot_cooldown: 0,
            decay_ticks: 0,
        };
        player.reset(arena);
        player
    }

    /// Restore run-start values and fly in from below the arena
    pub fn reset(&mut self, arena: &Arena) {
        self.pos = Vec2::new(arena.width / 2.0, arena.height + ENTRY_START_OFFSET);
        self.target = Vec2::new(self.pos.x, Self::rest_y(arena));
        self.vel = Vec2::ZERO;
        self.speed = PLAYER_SPEED;
        self.energy = MAX_ENERGY;
        self.max_energy = MAX_ENERGY;
        self.power_level = MIN_POWER_LEVEL;
        self.shield = 0;
        self.bombs = START_BOMBS;
        self.invincible_ticks = ENTRY_INVINCIBLE_TICKS;
        self.invincible_cause = InvincibleCause::Entry;
        self.entering = true;
        self.input_mode = InputMode::Pointer;
        self.shot_cooldown = 0;
        self.decay_ticks = 0;
    }

    fn rest_y(arena: &Arena) -> f32 {
        arena.height * PLAYER_REST_Y_RATIO
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_ticks > 0
    }

    pub fn is_dead(&self) -> bool {
        self.energy <= 0
    }

    /// Can collide with enemies and items
    pub fn can_interact(&self) -> bool {
        !self.entering && !self.is_dead()
    }

    pub fn status(&self) -> PlayerStatus {
        if self.is_dead() {
            PlayerStatus::Dead
        } else if self.entering {
            PlayerStatus::Entering
        } else if self.is_invincible() {
            match self.invincible_cause {
                InvincibleCause::Shield => PlayerStatus::ShieldedHit,
                InvincibleCause::Damage => PlayerStatus::PoweredDown,
                InvincibleCause::Entry => PlayerStatus::Invincible,
            }
        } else {
            PlayerStatus::Normal
        }
    }

    fn make_invincible(&mut self, ticks: u32, cause: InvincibleCause) {
        self.invincible_ticks = ticks;
        self.invincible_cause = cause;
    }

    /// Count down invincibility frames
    pub fn update_invincibility(&mut self) {
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);
    }

    /// Move toward the steering intent (or finish the entry glide)
    pub fn steer(&mut self, steering: Option<Steering>, arena: &Arena, dt: f32) {
        let prev = self.pos;

        if self.entering {
            let rest_y = Self::rest_y(arena);
            self.pos.y += (rest_y - self.pos.y) * ENTRY_EASING;
            if (self.pos.y - rest_y).abs() < ENTRY_SNAP_DISTANCE {
                self.pos.y = rest_y;
                self.target = self.pos;
                self.entering = false;
                log::debug!("Player entry complete");
            }
            self.vel = self.pos - prev;
            return;
        }

        match steering {
            Some(Steering::Pointer(point)) => {
                self.input_mode = InputMode::Pointer;
                self.target = point;
            }
            Some(Steering::Direction(dir)) => {
                self.input_mode = InputMode::Direction;
                let dir = dir.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
                self.pos += dir * self.speed * dt;
            }
            None => {}
        }

        if self.input_mode == InputMode::Pointer {
            self.pos += (self.target - self.pos) * POINTER_EASING;
        }

        let min = Vec2::splat(PLAYER_EDGE_MARGIN);
        let max = Vec2::new(arena.width, arena.height) - PLAYER_EDGE_MARGIN;
        self.pos = self.pos.clamp(min, max.max(min));
        if self.input_mode == InputMode::Direction {
            self.target = self.pos;
        }
        self.vel = self.pos - prev;
    }

    /// Auto-fire gate: true on ticks where a volley goes out
    pub fn ready_to_fire(&mut self) -> bool {
        self.shot_cooldown = self.shot_cooldown.saturating_sub(1);
        if self.shot_cooldown == 0 {
            self.shot_cooldown = shot_cooldown_ticks(self.power_level);
            true
        } else {
            false
        }
    }

    /// Lose one power level every decay interval while at or above the threshold
    pub fn update_weapon_decay(&mut self, events: &mut Vec<GameEvent>) {
        if self.power_level >= WEAPON_DECAY_THRESHOLD {
            self.decay_ticks += 1;
            if self.decay_ticks >= WEAPON_DECAY_TICKS {
                self.decay_ticks = 0;
                let level = self.power_level.saturating_sub(1).max(WEAPON_DECAY_FLOOR);
                if level != self.power_level {
                    self.power_level = level;
                    events.push(GameEvent::PowerLevelChanged(level));
                }
            }
        } else {
            self.decay_ticks = 0;
        }
    }

    /// Take a contact hit worth `amount` energy
    ///
    /// Shield stacks are spent first and fully negate the hit.
    pub fn take_hit(&mut self, amount: u32, events: &mut Vec<GameEvent>) -> HitOutcome {
        if self.is_invincible() || !self.can_interact() {
            return HitOutcome::Ignored;
        }

        if self.shield > 0 {
            self.shield -= 1;
            events.push(GameEvent::ShieldChanged(self.shield));
            events.push(GameEvent::ShieldAbsorbed);
            self.make_invincible(SHIELD_INVINCIBLE_TICKS, InvincibleCause::Shield);
            return HitOutcome::ShieldAbsorbed;
        }

        let level = self.power_level.saturating_sub(1).max(MIN_POWER_LEVEL);
        if level != self.power_level {
            self.power_level = level;
            events.push(GameEvent::PowerLevelChanged(level));
        }

        let amount_i32 = i32::try_from(amount).unwrap_or(i32::MAX);
        self.energy = self.energy.saturating_sub(amount_i32).clamp(0, self.max_energy);
        events.push(GameEvent::EnergyChanged(self.energy));
        events.push(GameEvent::PlayerDamaged { amount });

        if self.is_dead() {
            HitOutcome::Killed
        } else {
            self.make_invincible(HIT_INVINCIBLE_TICKS, InvincibleCause::Damage);
            HitOutcome::Damaged
        }
    }

    fn restore_energy(&mut self, amount: i32) {
        self.energy = (self.energy + amount).clamp(0, self.max_energy);
    }

    /// Apply an item pickup
    pub fn collect(&mut self, kind: ItemKind, events: &mut Vec<GameEvent>) {
        events.push(GameEvent::ItemPickedUp(kind));
        match kind {
            ItemKind::Power => {
                let level = (self.power_level + 1).min(MAX_POWER_LEVEL);
                if level != self.power_level {
                    self.power_level = level;
                    events.push(GameEvent::PowerLevelChanged(level));
                }
                self.restore_energy(POWER_ENERGY_RESTORE);
            }
            ItemKind::Shield => {
                self.shield = (self.shield + 1).min(MAX_SHIELD);
                events.push(GameEvent::ShieldChanged(self.shield));
            }
            ItemKind::Bomb => {
                self.bombs = (self.bombs + 1).min(MAX_BOMBS);
                events.push(GameEvent::BombCountChanged(self.bombs));
            }
            ItemKind::Health => self.restore_energy(HEALTH_ENERGY_RESTORE),
        }
        events.push(GameEvent::EnergyChanged(self.energy));
    }

    /// Spend a bomb charge if one is held
    pub fn consume_bomb(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.bombs == 0 {
            return false;
        }
        self.bombs -= 1;
        events.push(GameEvent::BombCountChanged(self.bombs));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A player that has finished entering and lost its entry invincibility
    fn ready_player() -> Player {
        let mut p = Player::new(&Arena::default());
        p.entering = false;
        p.invincible_ticks = 0;
        p
    }

    #[test]
    fn test_reset_starts_entering() {
        let arena = Arena::default();
        let p = Player::new(&arena);
        assert!(p.entering);
        assert!(p.pos.y > arena.height);
        assert_eq!(p.status(), PlayerStatus::Entering);
        assert_eq!(p.bombs, START_BOMBS);
    }

    #[test]
    fn test_entry_completes_at_rest() {
        let arena = Arena::default();
        let mut p = Player::new(&arena);
        for _ in 0..120 {
            p.steer(None, &arena, SIM_DT);
        }
        assert!(!p.entering);
        assert_eq!(p.pos.y, arena.height * PLAYER_REST_Y_RATIO);
    }

    #[test]
    fn test_shield_negates_energy_loss() {
        let mut p = ready_player();
        p.shield = 2;
        let mut events = Vec::new();
        assert_eq!(p.take_hit(25, &mut events), HitOutcome::ShieldAbsorbed);
        assert_eq!(p.energy, MAX_ENERGY);
        assert_eq!(p.shield, 1);
        assert_eq!(p.status(), PlayerStatus::ShieldedHit);
        assert_eq!(p.invincible_ticks, SHIELD_INVINCIBLE_TICKS);
        // Invincible: next hit is ignored
        assert_eq!(p.take_hit(25, &mut events), HitOutcome::Ignored);
        assert_eq!(p.shield, 1);
    }

    #[test]
    fn test_hit_drops_power_and_energy() {
        let mut p = ready_player();
        p.power_level = 4;
        let mut events = Vec::new();
        assert_eq!(p.take_hit(10, &mut events), HitOutcome::Damaged);
        assert_eq!(p.power_level, 3);
        assert_eq!(p.energy, MAX_ENERGY - 10);
        assert_eq!(p.status(), PlayerStatus::PoweredDown);
        assert!(events.contains(&GameEvent::PlayerDamaged { amount: 10 }));
    }

    #[test]
    fn test_power_floor_on_hit() {
        let mut p = ready_player();
        let mut events = Vec::new();
        p.take_hit(1, &mut events);
        assert_eq!(p.power_level, MIN_POWER_LEVEL);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PowerLevelChanged(_))));
    }

    #[test]
    fn test_lethal_hit_clamps_energy() {
        let mut p = ready_player();
        p.energy = 1;
        let mut events = Vec::new();
        assert_eq!(p.take_hit(10, &mut events), HitOutcome::Killed);
        assert_eq!(p.energy, 0);
        assert_eq!(p.status(), PlayerStatus::Dead);
        assert_eq!(p.take_hit(10, &mut events), HitOutcome::Ignored);
    }

    #[test]
    fn test_pickup_caps() {
        let mut p = ready_player();
        let mut events = Vec::new();
        for _ in 0..20 {
            p.collect(ItemKind::Power, &mut events);
            p.collect(ItemKind::Shield, &mut events);
            p.collect(ItemKind::Bomb, &mut events);
        }
        assert_eq!(p.power_level, MAX_POWER_LEVEL);
        assert_eq!(p.shield, MAX_SHIELD);
        assert_eq!(p.bombs, MAX_BOMBS);
    }

    #[test]
    fn test_power_at_max_still_restores_energy() {
        let mut p = ready_player();
        p.power_level = MAX_POWER_LEVEL;
        p.energy = 10;
        let mut events = Vec::new();
        p.collect(ItemKind::Power, &mut events);
        assert_eq!(p.power_level, MAX_POWER_LEVEL);
        assert_eq!(p.energy, 10 + POWER_ENERGY_RESTORE);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PowerLevelChanged(_))));
        assert!(events.contains(&GameEvent::EnergyChanged(15)));
    }

    #[test]
    fn test_health_capped_at_max() {
        let mut p = ready_player();
        p.energy = MAX_ENERGY - 1;
        p.collect(ItemKind::Health, &mut Vec::new());
        assert_eq!(p.energy, MAX_ENERGY);
    }

    #[test]
    fn test_weapon_decay() {
        let mut p = ready_player();
        p.power_level = 4;
        let mut events = Vec::new();
        for _ in 0..WEAPON_DECAY_TICKS {
            p.update_weapon_decay(&mut events);
        }
        assert_eq!(p.power_level, 3);
        for _ in 0..WEAPON_DECAY_TICKS {
            p.update_weapon_decay(&mut events);
        }
        assert_eq!(p.power_level, WEAPON_DECAY_FLOOR);
        // Below threshold: timer resets and nothing decays
        for _ in 0..WEAPON_DECAY_TICKS * 2 {
            p.update_weapon_decay(&mut events);
        }
        assert_eq!(p.power_level, WEAPON_DECAY_FLOOR);
        assert_eq!(p.decay_ticks, 0);
    }

    #[test]
    fn test_direction_mode_clamped() {
        let arena = Arena::default();
        let mut p = ready_player();
        for _ in 0..200 {
            p.steer(Some(Steering::Direction(Vec2::new(-1.0, 0.0))), &arena, SIM_DT);
        }
        assert_eq!(p.input_mode, InputMode::Direction);
        assert_eq!(p.pos.x, PLAYER_EDGE_MARGIN);
        assert_eq!(p.target, p.pos);
    }

    #[test]
    fn test_pointer_mode_eases() {
        let arena = Arena::default();
        let mut p = ready_player();
        let start = p.pos;
        let goal = Vec2::new(100.0, 300.0);
        p.steer(Some(Steering::Pointer(goal)), &arena, SIM_DT);
        let moved = p.pos - start;
        assert!((moved - (goal - start) * POINTER_EASING).length() < 0.01);
        // Keeps easing toward the last target with no new input
        for _ in 0..100 {
            p.steer(None, &arena, SIM_DT);
        }
        assert!(p.pos.distance(goal) < 0.5);
    }

    #[test]
    fn test_fire_cadence() {
        let mut p = ready_player();
        let fired = (0..90).filter(|_| p.ready_to_fire()).count();
        assert_eq!(fired, 10);
    }

    #[test]
    fn test_consume_bomb() {
        let mut p = ready_player();
        let mut events = Vec::new();
        assert!(p.consume_bomb(&mut events));
        assert!(!p.consume_bomb(&mut events));
        assert_eq!(events, vec![GameEvent::BombCountChanged(0)]);
    }
}
