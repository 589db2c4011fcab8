//! Time- and score-driven entity creation
//!
//! Regular asteroids, boss materialization, meteor showers and the two
//! one-time early item drops.

use glam::Vec2;
use rand::Rng;

use super::enemy::Enemy;
use super::item::ItemKind;
use super::state::GameState;
use super::timer::{DeferredAction, TimerToken};
use crate::consts::*;

/// Ticks between regular asteroid spawns
///
/// Shrinks with score and elapsed minutes, then is divided by the level
/// spawn rate. A boss encounter swaps in a much larger constant.
pub fn spawn_threshold(score: u64, elapsed_minutes: u32, spawn_rate: f32, boss_mode: bool) -> f32 {
    if boss_mode {
        return BOSS_MODE_SPAWN_THRESHOLD;
    }
    let base = BASE_SPAWN_THRESHOLD - score as f32 / 1000.0 - elapsed_minutes as f32 * 2.0;
    base.max(MIN_SPAWN_THRESHOLD) / spawn_rate.max(0.1)
}

/// Count one tick toward the next regular spawn, spawning when it is due
pub fn update_spawning(state: &mut GameState) {
    state.spawn_counter += 1;
    let threshold = spawn_threshold(
        state.score,
        state.elapsed_minutes(),
        state.level.enemy_spawn_rate,
        state.boss.in_encounter(),
    );
    if state.spawn_counter as f32 > threshold {
        state.spawn_counter = 0;
        spawn_asteroid(state);
    }
}

pub fn spawn_asteroid(state: &mut GameState) {
    let id = state.next_entity_id();
    let ctx = state.spawn_context(state.level.enemy_hp_multiplier);
    let enemy = Enemy::asteroid(id, &ctx, &mut state.rng, &mut state.fx_rng);
    log::trace!("Asteroid {} spawned (width {:.0}, hp {})", id, enemy.width, enemy.hp);
    state.enemies.push(enemy);
}

/// Shed a fragment at `pos`
pub fn spawn_fragment(state: &mut GameState, pos: Vec2, width: f32) {
    let id = state.next_entity_id();
    let fragment = Enemy::fragment(
        id,
        pos,
        width,
        state.level.enemy_hp_multiplier,
        &mut state.rng,
        &mut state.fx_rng,
    );
    state.enemies.push(fragment);
}

/// Create the stage boss; refuses if one is already present
pub fn spawn_boss(state: &mut GameState, stage: u32) -> bool {
    if state.boss_index().is_some() {
        log::warn!("Boss {} not spawned: a boss is already present", stage);
        return false;
    }
    let id = state.next_entity_id();
    let ctx = state.spawn_context(state.level.boss_hp_multiplier);
    let boss = Enemy::boss(id, stage, &ctx, &mut state.rng, &mut state.fx_rng);
    log::info!("Boss {} spawned with {} hp", stage, boss.hp);
    state.enemies.push(boss);
    true
}

/// Queue one staggered meteor shower for the current boss stage
///
/// Every rock is scheduled under the fight's token, so killing or losing the
/// boss drops whatever has not fallen yet.
pub fn schedule_shower(state: &mut GameState, stage: u32, token: TimerToken) {
    let count = SHOWER_BASE_COUNT + SHOWER_COUNT_PER_STAGE * stage;
    let stagger = SHOWER_STAGGER_TICKS
        .saturating_sub(3 * stage as u64)
        .max(SHOWER_STAGGER_MIN_TICKS);
    let now = state.time_ticks;

    for i in 0..count as u64 {
        let width = SHOWER_MIN_SIZE + state.rng.random::<f32>() * SHOWER_SIZE_PER_STAGE * stage as f32;
        let x = state.rng.random::<f32>() * state.arena.width;
        state
            .timers
            .schedule(now + (i + 1) * stagger, token, DeferredAction::ShowerMeteor { x, width });
    }
    log::debug!("Meteor shower: {} rocks for stage {}", count, stage);
}

/// Run the deferred actions that came due this tick
pub fn run_due_timers(state: &mut GameState) {
    for action in state.timers.drain_due(state.time_ticks) {
        match action {
            DeferredAction::ShowerMeteor { x, width } => {
                // Token cancellation already covers a finished fight
                if !state.boss.is_active() {
                    continue;
                }
                spawn_fragment(state, Vec2::new(x, -width), width);
            }
        }
    }
}

/// Force the early POWER and SHIELD drops inside their time windows
pub fn update_guaranteed_drops(state: &mut GameState) {
    let secs = state.elapsed_secs();
    let in_window = |(start, end): (f32, f32)| secs >= start && secs < end;

    if !state.drops.power_dropped && in_window(GUARANTEED_POWER_WINDOW_SECS) {
        state.drops.power_dropped = true;
        drop_from_top(state, ItemKind::Power);
    }
    if !state.drops.shield_dropped && in_window(GUARANTEED_SHIELD_WINDOW_SECS) {
        state.drops.shield_dropped = true;
        drop_from_top(state, ItemKind::Shield);
    }
}

fn drop_from_top(state: &mut GameState, kind: ItemKind) {
    let margin = ITEM_SIZE * 2.0;
    let span = (state.arena.width - margin * 2.0).max(0.0);
    let x = margin + state.rng.random::<f32>() * span;
    log::debug!("Guaranteed {:?} drop at x={:.0}", kind, x);
    state.spawn_item(kind, Vec2::new(x, -ITEM_SIZE));
}

/// Roll the item drops for a destroyed non-boss enemy
pub fn roll_enemy_drops(state: &mut GameState, enemy: &Enemy) {
    let full_power = state.player.power_level >= MAX_POWER_LEVEL;
    let (power_chance, shield_chance) = if full_power {
        (FULL_POWER_DROP_CHANCE, FULL_POWER_DROP_CHANCE)
    } else {
        (POWER_DROP_CHANCE, SHIELD_DROP_CHANCE)
    };

    if state.rng.random_bool(power_chance) {
        state.spawn_item(ItemKind::Power, enemy.pos);
    }
    if enemy.is_fragment() && state.rng.random_bool(shield_chance) {
        state.spawn_item(ItemKind::Shield, enemy.pos);
    }
    if enemy.is_big() && state.rng.random_bool(BOMB_DROP_CHANCE) {
        state.spawn_item(ItemKind::Bomb, enemy.pos);
    }
}

/// A defeated boss leaves one HEALTH and two POWER items
pub fn drop_boss_rewards(state: &mut GameState, pos: Vec2) {
    state.spawn_item(ItemKind::Health, pos);
    for m in 0..2 {
        let offset = (m as f32 - 1.0) * 40.0;
        state.spawn_item(ItemKind::Power, pos + Vec2::new(offset, 0.0));
    }
}
