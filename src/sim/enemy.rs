//! Asteroids, fragments and bosses
//!
//! One `Enemy` record covers all three; behavior that differs is keyed off
//! `EnemyKind` in one place instead of flags scattered through the tick.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Collidable, Contact, Damageable, Steppable};
use super::state::Arena;
use crate::consts::*;

/// Enemy class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Regular falling asteroid (big ones can drop bombs)
    Asteroid { big: bool },
    /// Small asteroid shed by a damaged enemy or a meteor shower
    Fragment,
    /// Stage boss (1-based stage number)
    Boss { stage: u32 },
}

/// Inputs that drive difficulty when creating an enemy
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext {
    pub arena: Arena,
    pub score: u64,
    /// Whole minutes since run start
    pub elapsed_minutes: u32,
    /// Level HP multiplier (enemy or boss, depending on what is spawned)
    pub hp_multiplier: f32,
}

/// Cosmetic crater decoration, relative to the enemy center at initial size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crater {
    pub offset: Vec2,
    pub radius: f32,
}

/// HP thresholds that shed a fragment, each at most once per enemy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentTripwires {
    fired: [bool; 3],
}

impl FragmentTripwires {
    /// (hp percent, minimum current width, initial width divisor)
    const THRESHOLDS: [(u32, f32, f32); 3] = [(75, 40.0, 4.0), (50, 35.0, 4.0), (25, 30.0, 5.0)];

    pub fn has_fired(&self, percent: u32) -> bool {
        Self::THRESHOLDS
            .iter()
            .zip(self.fired.iter())
            .any(|(&(p, _, _), &fired)| p == percent && fired)
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Fall speed and drift for asteroids, bounce vector for bosses
    pub vel: Vec2,
    /// Current width (height is equal); shrinks with damage
    pub width: f32,
    pub initial_width: f32,
    pub hp: u32,
    pub max_hp: u32,
    /// Energy taken from the player on contact
    pub damage: u32,
    pub rotation: f32,
    pub spin: f32,
    /// Outline polygon at initial size (cosmetic)
    pub outline: Vec<Vec2>,
    pub craters: Vec<Crater>,
    pub tripwires: FragmentTripwires,
}

/// Speed for a falling body: smaller is faster
fn fall_speed(width: f32, rng: &mut Pcg32) -> f32 {
    ENEMY_BASE_SPEED * (ENEMY_REFERENCE_SIZE / width.max(1.0)) + rng.random::<f32>() * ENEMY_SPEED_JITTER
}

/// Contact damage for a body of the given width
fn contact_damage(width: f32) -> u32 {
    (width / 4.0).floor().max(0.0) as u32
}

fn scaled_hp(base: u32, multiplier: f32) -> u32 {
    ((base as f32 * multiplier).round() as u32).max(1)
}

impl Enemy {
    fn with_kind(id: u32, kind: EnemyKind, pos: Vec2, vel: Vec2, width: f32, hp: u32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            width,
            initial_width: width,
            hp,
            max_hp: hp,
            damage: contact_damage(width),
            rotation: 0.0,
            spin: 0.0,
            outline: Vec::new(),
            craters: Vec::new(),
            tripwires: FragmentTripwires::default(),
        }
    }

    /// Regular asteroid entering from above the arena
    pub fn asteroid(id: u32, ctx: &SpawnContext, rng: &mut Pcg32, fx: &mut Pcg32) -> Self {
        let big_chance = (0.15 + ctx.score as f64 / 20_000.0).min(0.6);
        let big = rng.random_bool(big_chance);
        let width = if big {
            80.0 + rng.random::<f32>() * 40.0
        } else {
            30.0 + rng.random::<f32>() * 20.0
        };
        let x = rng.random::<f32>() * (ctx.arena.width - width).max(0.0) + width / 2.0;
        let speed = fall_speed(width, rng);

        let minutes = ctx.elapsed_minutes as f32;
        let base_hp = (width / 10.0).ceil() as u32;
        let score_hp = (ctx.score as f32 / 5000.0 * 3.0).floor() as u32;
        // Quadratic in minutes so late runs spike
        let time_hp = (minutes * 10.0 + minutes * minutes * 5.0).floor() as u32;
        let hp = scaled_hp(base_hp + score_hp + time_hp, ctx.hp_multiplier);

        let mut enemy = Self::with_kind(
            id,
            EnemyKind::Asteroid { big },
            Vec2::new(x, -width),
            Vec2::new(0.0, speed),
            width,
            hp,
        );
        enemy.decorate(fx);
        enemy
    }

    /// Fragment shed at `pos` (also used for meteor-shower rocks)
    pub fn fragment(
        id: u32,
        pos: Vec2,
        width: f32,
        hp_multiplier: f32,
        rng: &mut Pcg32,
        fx: &mut Pcg32,
    ) -> Self {
        let speed = fall_speed(width, rng);
        let drift = (rng.random::<f32>() * 2.0 - 1.0) * FRAGMENT_MAX_DRIFT;
        let base_hp = ((width / 10.0).ceil() as u32).max(1);
        let mut enemy = Self::with_kind(
            id,
            EnemyKind::Fragment,
            pos,
            Vec2::new(drift, speed),
            width,
            scaled_hp(base_hp, hp_multiplier),
        );
        enemy.decorate(fx);
        enemy
    }

    /// Stage boss, centered above the arena
    pub fn boss(id: u32, stage: u32, ctx: &SpawnContext, rng: &mut Pcg32, fx: &mut Pcg32) -> Self {
        let stage = stage.max(1);
        let (size_mult, hp_mult) = match stage {
            1 => (2.0, 1),
            2 => (4.0, 3),
            _ => (5.0, 5),
        };
        let width = (BOSS_BASE_WIDTH * size_mult).min(ctx.arena.width * BOSS_MAX_WIDTH_RATIO);
        let speed = BOSS_BASE_SPEED + stage as f32 * BOSS_SPEED_PER_STAGE;
        let vx = if rng.random_bool(0.5) { speed } else { -speed };

        let base_hp = (width * BOSS_HP_PER_PIXEL).floor() as u32;
        let score_hp = (ctx.score as f32 / 5000.0 * 5.0).floor() as u32;
        let time_hp = ctx.elapsed_minutes * BOSS_HP_PER_MINUTE;
        let hp = scaled_hp((base_hp + score_hp + time_hp) * hp_mult, ctx.hp_multiplier);

        let mut enemy = Self::with_kind(
            id,
            EnemyKind::Boss { stage },
            Vec2::new(ctx.arena.width / 2.0, -width),
            Vec2::new(vx, speed),
            width,
            hp,
        );
        enemy.damage = BOSS_DAMAGE_PER_STAGE * stage;
        enemy.decorate(fx);
        enemy
    }

    /// Generate outline, craters and spin from the cosmetic stream
    fn decorate(&mut self, fx: &mut Pcg32) {
        let boss = self.is_boss();
        let w = self.width;

        let steps = if boss {
            20
        } else if w < 30.0 {
            5
        } else {
            8
        };
        let roughness = if boss { 0.3 } else { 0.45 };
        self.outline = (0..steps)
            .map(|i| {
                let angle = i as f32 / steps as f32 * std::f32::consts::TAU;
                let dist = w / 2.0 * (1.0 - fx.random::<f32>() * roughness);
                Vec2::new(angle.cos(), angle.sin()) * dist
            })
            .collect();

        let crater_count = if boss {
            15
        } else if w < 40.0 {
            1
        } else {
            3
        };
        self.craters = (0..crater_count)
            .map(|_| Crater {
                offset: Vec2::new(fx.random::<f32>() - 0.5, fx.random::<f32>() - 0.5) * w * 0.6,
                radius: fx.random::<f32>() * w * 0.15 + w * 0.05,
            })
            .collect();

        if !boss {
            self.rotation = fx.random::<f32>() * std::f32::consts::TAU;
            self.spin = (fx.random::<f32>() * 2.0 - 1.0) * MAX_SPIN;
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss { .. })
    }

    pub fn boss_stage(&self) -> Option<u32> {
        match self.kind {
            EnemyKind::Boss { stage } => Some(stage),
            _ => None,
        }
    }

    pub fn is_fragment(&self) -> bool {
        self.kind == EnemyKind::Fragment
    }

    pub fn is_big(&self) -> bool {
        self.kind == EnemyKind::Asteroid { big: true }
    }

    pub fn height(&self) -> f32 {
        self.width
    }

    /// Render scale relative to the initial outline
    pub fn scale(&self) -> f32 {
        if self.initial_width > 0.0 {
            self.width / self.initial_width
        } else {
            0.0
        }
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }

    /// Smallest width before the enemy is considered destroyed
    pub fn min_width(&self) -> f32 {
        if self.is_boss() {
            MIN_BOSS_WIDTH
        } else {
            MIN_ASTEROID_WIDTH
        }
    }

    /// Base score for destroying this enemy (before level and boss-fight modifiers)
    pub fn score_value(&self) -> u64 {
        if self.is_boss() {
            BOSS_SCORE_BONUS
        } else {
            (self.initial_width * ASTEROID_SCORE_PER_PIXEL).floor() as u64
        }
    }

    /// Fully below the top edge (eligible for bullet hits)
    pub fn is_on_screen(&self) -> bool {
        self.pos.y > 0.0
    }

    /// Past the cull margins around the arena
    ///
    /// The boss measures its margins from its bounce envelope, so a boss that
    /// is only clamped against a wall is never culled.
    pub fn is_off_screen(&self, arena: &Arena) -> bool {
        let (min, max) = if self.is_boss() {
            self.boss_envelope(arena)
        } else {
            (Vec2::ZERO, Vec2::new(arena.width, arena.height))
        };
        self.pos.y > max.y + ENEMY_CULL_BOTTOM_MARGIN
            || self.pos.x < min.x - ENEMY_CULL_SIDE_MARGIN
            || self.pos.x > max.x + ENEMY_CULL_SIDE_MARGIN
    }

    /// Corners of the box the boss center is clamped to
    ///
    /// Sides allow a partial excursion; the top margin and bottom safe zone
    /// keep the boss reachable.
    fn boss_envelope(&self, arena: &Arena) -> (Vec2, Vec2) {
        let overflow = self.width * BOSS_OVERFLOW_RATIO;
        let margin = self.width / 2.0 + BOSS_EDGE_PADDING;
        let top = margin + BOSS_TOP_MARGIN;
        let bottom = (arena.height * (1.0 - BOSS_SAFE_ZONE_RATIO) - margin).max(top);
        (
            Vec2::new(-overflow, top),
            Vec2::new(arena.width + overflow, bottom),
        )
    }

    /// Shrink in proportion to remaining HP
    ///
    /// Returns true once the enemy is at (or below) its minimum width.
    pub fn rescale_to_hp(&mut self) -> bool {
        if self.max_hp > 1 {
            let target = (self.initial_width * self.hp_ratio()).max(self.min_width());
            if self.width > target {
                self.width = target.min(self.initial_width);
                if !self.is_boss() {
                    self.damage = contact_damage(self.width).max(MIN_CONTACT_DAMAGE);
                }
            }
        }
        self.width <= self.min_width()
    }

    /// Trip any newly crossed HP thresholds, returning fragment widths to spawn
    pub fn due_fragments(&mut self) -> Vec<f32> {
        let percent = (self.hp_ratio() * 100.0).floor() as u32;
        let mut sizes = Vec::new();
        for (i, &(threshold, min_width, divisor)) in FragmentTripwires::THRESHOLDS.iter().enumerate() {
            if percent <= threshold && !self.tripwires.fired[i] && self.width > min_width {
                self.tripwires.fired[i] = true;
                sizes.push((self.initial_width / divisor).max(MIN_FRAGMENT_WIDTH));
            }
        }
        sizes
    }
}

impl Steppable for Enemy {
    fn step(&mut self, arena: &Arena, dt: f32) {
        self.pos += self.vel * dt;

        if self.is_boss() {
            // Elastic bounce off every edge of the envelope
            let (min, max) = self.boss_envelope(arena);
            if self.pos.x > max.x {
                self.pos.x = max.x;
                self.vel.x = -self.vel.x.abs();
            } else if self.pos.x < min.x {
                self.pos.x = min.x;
                self.vel.x = self.vel.x.abs();
            }
            if self.pos.y > max.y {
                self.pos.y = max.y;
                self.vel.y = -self.vel.y.abs();
            } else if self.pos.y < min.y {
                self.pos.y = min.y;
                self.vel.y = self.vel.y.abs();
            }

            self.rotation += BOSS_SPIN * dt;
        } else {
            self.rotation += self.spin * dt;
        }
    }
}

impl Damageable for Enemy {
    fn apply_damage(&mut self, amount: u32) -> bool {
        self.hp = self.hp.saturating_sub(amount);
        self.hp == 0
    }

    fn is_destroyed(&self) -> bool {
        self.hp == 0 || self.width <= 0.0
    }
}

impl Collidable for Enemy {
    fn center(&self) -> Vec2 {
        self.pos
    }

    /// Always based on the current width
    fn contact_radius(&self, contact: Contact) -> f32 {
        let half = self.width / 2.0;
        match contact {
            Contact::Player => half + PLAYER_CONTACT_PADDING,
            Contact::Projectile => half + BULLET_CONTACT_PADDING,
            Contact::Pickup => half,
        }
    }
}
