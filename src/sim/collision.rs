//! Hit testing and its consequences
//!
//! Entity lists are walked back to front so the current entry can be
//! swap-removed without disturbing the ones still to visit. Anything pushed
//! during the walk (fragments) lands past the cursor and is handled next tick.

use super::body::{Collidable, Contact, Damageable, Steppable};
use super::boss::kill_speed_bonus;
use super::event::GameEvent;
use super::player::HitOutcome;
use super::spawner::{drop_boss_rewards, roll_enemy_drops, spawn_fragment};
use super::state::{GamePhase, GameState, palette};
use super::weapon::bullet_damage;
use crate::consts::*;

/// Step items, apply pickups and drop the ones that fell out of play
pub fn update_items(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    let arena = state.arena;
    let mut i = state.items.len();
    while i > 0 {
        i -= 1;
        state.items[i].step(&arena, dt);

        if state.player.can_interact() && state.items[i].touches(state.player.pos, Contact::Pickup) {
            let item = state.items.swap_remove(i);
            state.player.collect(item.kind, events);
            log::debug!("Picked up {:?}", item.kind);
            continue;
        }

        if state.items[i].is_off_screen(&arena) {
            state.items.swap_remove(i);
        }
    }
}

pub fn update_bullets(state: &mut GameState, dt: f32) {
    let arena = state.arena;
    for bullet in &mut state.bullets {
        bullet.step(&arena, dt);
    }
    state.bullets.retain(|b| !b.is_off_screen(&arena));
}

/// Step enemies and resolve player contact, bullet hits and escapes
///
/// Stops early if the player dies; the caller checks the phase.
pub fn update_enemies(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    let arena = state.arena;
    let mut i = state.enemies.len();
    while i > 0 {
        i -= 1;
        state.enemies[i].step(&arena, dt);

        if resolve_player_contact(state, i, events) {
            if state.phase != GamePhase::Playing {
                return;
            }
            continue;
        }

        if state.enemies[i].is_on_screen() && resolve_bullet_hit(state, i, events) {
            continue;
        }

        cull_off_screen(state, i, events);
    }
}

/// Remove enemy `i` if it left play; an escaping boss re-queues its stage
fn cull_off_screen(state: &mut GameState, i: usize, events: &mut Vec<GameEvent>) -> bool {
    if !state.enemies[i].is_off_screen(&state.arena) {
        return false;
    }
    let enemy = state.enemies.swap_remove(i);
    if enemy.is_boss() {
        if let Some(record) = state.boss.on_boss_escaped(state.time_ticks) {
            state.timers.cancel(record.timers);
            events.push(GameEvent::BossEscaped {
                stage: record.stage,
            });
        }
    }
    true
}

/// Returns true if enemy `i` touched the player (it may have been removed)
fn resolve_player_contact(state: &mut GameState, i: usize, events: &mut Vec<GameEvent>) -> bool {
    let player = &state.player;
    if !player.can_interact()
        || player.is_invincible()
        || !state.enemies[i].touches(player.pos, Contact::Player)
    {
        return false;
    }

    let damage = state.enemies[i].damage;
    let pos = state.player.pos;
    match state.player.take_hit(damage, events) {
        HitOutcome::Ignored => return false,
        HitOutcome::ShieldAbsorbed => state.burst(pos, palette::SHIELD, SHIELD_BREAK_PARTICLES),
        HitOutcome::Damaged => state.burst(pos, palette::HIT, HIT_PARTICLES),
        HitOutcome::Killed => {
            state.burst(pos, palette::DEATH, DEATH_PARTICLES);
            end_run(state, events);
        }
    }

    // The boss shrugs off contact; everything else is spent
    if !state.enemies[i].is_boss() {
        state.enemies.swap_remove(i);
    }
    true
}

/// Returns true if a bullet destroyed enemy `i` (it has been removed)
fn resolve_bullet_hit(state: &mut GameState, i: usize, events: &mut Vec<GameEvent>) -> bool {
    let enemy = &state.enemies[i];
    let Some(j) = state
        .bullets
        .iter()
        .rposition(|b| enemy.touches(b.pos, Contact::Projectile))
    else {
        return false;
    };
    state.bullets.swap_remove(j);

    let damage = bullet_damage(state.player.power_level);
    let enemy = &mut state.enemies[i];
    let mut destroyed = enemy.apply_damage(damage);
    if enemy.is_boss() {
        events.push(GameEvent::BossDamaged {
            hp: enemy.hp,
            max_hp: enemy.max_hp,
        });
    }

    if !destroyed {
        let at_min_width = enemy.rescale_to_hp();
        let pos = enemy.pos;
        let fragments = enemy.due_fragments();
        if at_min_width {
            enemy.hp = 0;
            destroyed = true;
        }
        for width in fragments {
            spawn_fragment(state, pos, width);
        }
    }

    if destroyed || state.enemies[i].is_destroyed() {
        destroy_enemy(state, i, events);
        true
    } else {
        false
    }
}

/// Remove enemy `i` as a kill: particles, score, drops
fn destroy_enemy(state: &mut GameState, i: usize, events: &mut Vec<GameEvent>) {
    let enemy = state.enemies.swap_remove(i);
    let color = if enemy.is_boss() || enemy.is_big() {
        palette::BIG_ROCK
    } else if enemy.is_fragment() {
        palette::FRAGMENT
    } else {
        palette::ROCK
    };
    state.burst(enemy.pos, color, EXPLOSION_PARTICLES);
    events.push(GameEvent::EnemyExploded {
        is_boss: enemy.is_boss(),
        pos: enemy.pos,
    });

    if let Some(stage) = enemy.boss_stage() {
        let mut award = enemy.score_value();
        if let Some(record) = state.boss.on_boss_defeated(state.time_ticks) {
            let cancelled = state.timers.cancel(record.timers);
            log::debug!("Cancelled {} pending shower rocks", cancelled);
            award += kill_speed_bonus(record.fight_ticks);
        }
        state.award_score(award, events);
        events.push(GameEvent::BossDefeated { stage });
        drop_boss_rewards(state, enemy.pos);
    } else {
        let mut award = enemy.score_value();
        if state.boss.is_active() {
            award /= 2;
        }
        state.award_score(award, events);
        roll_enemy_drops(state, &enemy);
    }
}

/// Fire a bomb: clear every regular enemy and halve the boss's remaining HP
///
/// Returns false (and changes nothing) without a charge.
pub fn detonate_bomb(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    if !state.is_playing() || !state.player.consume_bomb(events) {
        return false;
    }
    events.push(GameEvent::BombUsed);

    let mut cleared = 0u64;
    let mut i = state.enemies.len();
    while i > 0 {
        i -= 1;
        if !state.enemies[i].is_boss() {
            let enemy = state.enemies.swap_remove(i);
            state.burst(enemy.pos, palette::BOMB, BOMB_PARTICLES);
            cleared += 1;
        }
    }
    state.award_score(cleared * BOMB_SCORE_PER_ENEMY, events);

    if let Some(b) = state.boss_index() {
        let boss = &mut state.enemies[b];
        let damage = (boss.hp as f32 * BOMB_BOSS_DAMAGE_FRACTION).floor() as u32;
        boss.apply_damage(damage);
        events.push(GameEvent::BossDamaged {
            hp: boss.hp,
            max_hp: boss.max_hp,
        });
        let pos = boss.pos;
        state.burst(pos, palette::BOMB, BOMB_BOSS_PARTICLES);
    }

    log::debug!("Bomb cleared {} enemies", cleared);
    true
}

/// The player is out of energy
pub fn end_run(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.phase = GamePhase::GameOver;
    state.timers.clear();
    events.push(GameEvent::GameOver {
        final_score: state.score,
    });
    log::info!(
        "Game over at {:.1}s with score {}",
        state.elapsed_secs(),
        state.score
    );
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::enemy::{Enemy, EnemyKind};
    use crate::sim::item::ItemKind;
    use crate::sim::timer::TimerToken;
    use crate::sim::weapon::Bullet;

    /// A run with the player in place and able to interact
    fn ready_state() -> GameState {
        let mut state = GameState::new(11);
        state.player.entering = false;
        state.player.invincible_ticks = 0;
        state.player.pos = Vec2::new(240.0, 600.0);
        state.player.target = state.player.pos;
        state
    }

    fn rock(state: &mut GameState, pos: Vec2, width: f32, hp: u32) -> usize {
        let id = state.next_entity_id();
        let mut enemy = Enemy::fragment(id, pos, width, 1.0, &mut state.rng, &mut state.fx_rng);
        enemy.kind = EnemyKind::Asteroid { big: false };
        enemy.vel = Vec2::ZERO;
        enemy.hp = hp;
        enemy.max_hp = hp;
        state.enemies.push(enemy);
        state.enemies.len() - 1
    }

    fn bullet_at(pos: Vec2) -> Bullet {
        Bullet {
            pos,
            vel: Vec2::ZERO,
            size: BULLET_SIZE,
            charged: false,
        }
    }

    #[test]
    fn test_contact_removes_rock_and_damages() {
        let mut state = ready_state();
        let pos = state.player.pos;
        rock(&mut state, pos, 40.0, 10);
        let mut events = Vec::new();
        update_enemies(&mut state, 0.0, &mut events);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.energy, MAX_ENERGY - 10);
        assert!(events.contains(&GameEvent::PlayerDamaged { amount: 10 }));
        assert!(state.player.is_invincible());
    }

    #[test]
    fn test_shield_absorbs_contact() {
        let mut state = ready_state();
        state.player.shield = 2;
        let pos = state.player.pos;
        rock(&mut state, pos, 40.0, 10);
        let mut events = Vec::new();
        update_enemies(&mut state, 0.0, &mut events);
        assert_eq!(state.player.energy, MAX_ENERGY);
        assert_eq!(state.player.shield, 1);
        assert!(events.contains(&GameEvent::ShieldAbsorbed));
    }

    #[test]
    fn test_boss_survives_contact() {
        let mut state = ready_state();
        crate::sim::spawner::spawn_boss(&mut state, 1);
        state.enemies[0].pos = state.player.pos;
        state.enemies[0].vel = Vec2::ZERO;
        let mut events = Vec::new();
        update_enemies(&mut state, 0.0, &mut events);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.player.energy, MAX_ENERGY - BOSS_DAMAGE_PER_STAGE as i32);
    }

    #[test]
    fn test_lethal_contact_ends_run_once() {
        let mut state = ready_state();
        state.player.energy = 1;
        let pos = state.player.pos;
        rock(&mut state, pos, 40.0, 10);
        rock(&mut state, pos, 40.0, 10);
        let mut events = Vec::new();
        update_enemies(&mut state, 0.0, &mut events);
        assert_eq!(state.phase, GamePhase::GameOver);
        let over = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(over, 1);
        // The walk stopped before reaching the second rock
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_offscreen_enemies_ignore_bullets() {
        let mut state = ready_state();
        let i = rock(&mut state, Vec2::new(100.0, -10.0), 40.0, 5);
        state.bullets.push(bullet_at(state.enemies[i].pos));
        let mut events = Vec::new();
        update_enemies(&mut state, 0.0, &mut events);
        assert_eq!(state.enemies[0].hp, 5);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_bullet_shrinks_and_fragments() {
        let mut state = ready_state();
        state.player.power_level = 5;
        let i = rock(&mut state, Vec2::new(100.0, 200.0), 100.0, 20);
        state.bullets.push(bullet_at(state.enemies[i].pos));
        let mut events = Vec::new();
        update_enemies(&mut state, 0.0, &mut events);

        let big = &state.enemies[0];
        assert_eq!(big.hp, 15);
        assert_eq!(big.width, 75.0);
        assert!(big.tripwires.has_fired(75));
        assert!(state.bullets.is_empty());
        assert_eq!(state.enemies.len(), 2);
        assert!(state.enemies[1].is_fragment());
        assert_eq!(state.enemies[1].width, 25.0);
    }

    #[test]
    fn test_min_width_destroys() {
        let mut state = ready_state();
        let i = rock(&mut state, Vec2::new(100.0, 200.0), 30.0, 2);
        state.bullets.push(bullet_at(state.enemies[i].pos));
        let mut events = Vec::new();
        update_enemies(&mut state, 0.0, &mut events);
        // Half of 30 is below the minimum width
        assert!(state.enemies.is_empty());
        assert!(events.iter().any(|e| matches!(e, GameEvent::EnemyExploded { is_boss: false, .. })));
        assert_eq!(state.score, 90);
    }

    #[test]
    fn test_kill_score_halved_during_boss_fight() {
        let mut state = ready_state();
        state.boss.activate(1, 0, TimerToken(1));
        let i = rock(&mut state, Vec2::new(100.0, 200.0), 40.0, 1);
        state.bullets.push(bullet_at(state.enemies[i].pos));
        let mut events = Vec::new();
        update_enemies(&mut state, 0.0, &mut events);
        assert_eq!(state.score, 60);
    }

    #[test]
    fn test_boss_kill_rewards() {
        let mut state = ready_state();
        let token = state.timers.new_token();
        state.boss.spawned = 1;
        state.boss.activate(1, 0, token);
        crate::sim::spawner::schedule_shower(&mut state, 1, token);
        crate::sim::spawner::spawn_boss(&mut state, 1);
        state.enemies[0].pos = Vec2::new(100.0, 200.0);
        state.enemies[0].hp = 1;
        state.time_ticks = 10 * TICK_RATE as u64;
        state.bullets.push(bullet_at(Vec2::new(100.0, 200.0)));

        let mut events = Vec::new();
        update_enemies(&mut state, 0.0, &mut events);
        assert!(state.enemies.is_empty());
        assert!(events.contains(&GameEvent::BossDefeated { stage: 1 }));
        assert_eq!(state.score, BOSS_SCORE_BONUS + BOSS_SPEED_BONUS_MAX - 250);
        assert_eq!(state.items.len(), 3);
        assert!(state.timers.is_empty());
        assert_eq!(state.boss.defeated, 1);
    }

    #[test]
    fn test_boss_escape() {
        let mut state = ready_state();
        let token = state.timers.new_token();
        state.boss.spawned = 3;
        state.boss.activate(3, 0, token);
        crate::sim::spawner::schedule_shower(&mut state, 3, token);
        crate::sim::spawner::spawn_boss(&mut state, 3);
        let overflow = state.enemies[0].width * BOSS_OVERFLOW_RATIO;
        state.enemies[0].pos = Vec2::new(-overflow - ENEMY_CULL_SIDE_MARGIN - 1.0, 300.0);

        let mut events = Vec::new();
        assert!(cull_off_screen(&mut state, 0, &mut events));
        assert!(state.enemies.is_empty());
        assert_eq!(events, vec![GameEvent::BossEscaped { stage: 3 }]);
        assert_eq!(state.boss.spawned, 2);
        assert_eq!(state.score, 0);
        assert!(state.timers.is_empty());
    }

    #[test]
    fn test_wall_bounce_is_not_an_escape() {
        let arena = crate::sim::state::Arena {
            width: 1920.0,
            height: 1080.0,
        };
        let mut state = GameState::with_config(5, crate::LevelConfig::default(), arena);
        state.player.entering = false;
        let token = state.timers.new_token();
        state.boss.spawned = 2;
        state.boss.activate(2, 0, token);
        assert!(crate::sim::spawner::spawn_boss(&mut state, 2));
        let boss = &mut state.enemies[0];
        boss.pos = Vec2::new(100.0, 300.0);
        boss.vel.x = -boss.vel.x.abs();
        let id = boss.id;

        let mut events = Vec::new();
        for _ in 0..(60 * TICK_RATE) {
            state.player.energy = state.player.max_energy;
            update_enemies(&mut state, SIM_DT, &mut events);
        }
        assert!(!events.iter().any(|e| matches!(e, GameEvent::BossEscaped { .. })));
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].id, id);
        assert_eq!(state.boss.spawned, 2);
    }

    #[test]
    fn test_item_pickup() {
        let mut state = ready_state();
        let pos = state.player.pos + Vec2::new(30.0, 0.0);
        state.spawn_item(ItemKind::Shield, pos);
        let mut events = Vec::new();
        update_items(&mut state, 0.0, &mut events);
        assert!(state.items.is_empty());
        assert_eq!(state.player.shield, 1);
        assert_eq!(events[0], GameEvent::ItemPickedUp(ItemKind::Shield));
    }

    #[test]
    fn test_items_ignored_while_entering() {
        let mut state = GameState::new(1);
        let pos = state.player.pos;
        state.spawn_item(ItemKind::Power, pos);
        let mut events = Vec::new();
        update_items(&mut state, 0.0, &mut events);
        assert_eq!(state.items.len(), 1);
        assert!(events.is_empty());
    }

    #[test]
    fn test_bomb() {
        let mut state = ready_state();
        crate::sim::spawner::spawn_boss(&mut state, 1);
        state.enemies[0].hp = 100;
        for k in 0..5 {
            rock(&mut state, Vec2::new(50.0 + k as f32 * 60.0, 100.0), 40.0, 10);
        }
        let mut events = Vec::new();
        assert!(detonate_bomb(&mut state, &mut events));
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].hp, 50);
        assert_eq!(state.score, 5 * BOMB_SCORE_PER_ENEMY);
        assert_eq!(state.player.bombs, START_BOMBS - 1);
        assert_eq!(events.iter().filter(|e| **e == GameEvent::BombUsed).count(), 1);

        // Out of charges
        let mut events = Vec::new();
        assert!(!detonate_bomb(&mut state, &mut events));
        assert!(events.is_empty());
    }
}
