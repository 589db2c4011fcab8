//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use serde::{Deserialize, Serialize};

use super::boss::BossTransition;
use super::collision::{detonate_bomb, update_bullets, update_enemies, update_items};
use super::event::GameEvent;
use super::player::Steering;
use super::spawner::{
    run_due_timers, schedule_shower, spawn_boss, update_guaranteed_drops, update_spawning,
};
use super::state::{GamePhase, GameState};
use super::weapon::fire_pattern;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Pointer target or direction intent; None keeps the current target
    pub steering: Option<Steering>,
    /// Bomb button pressed this tick
    pub bomb: bool,
}

/// Advance the game state by one fixed timestep
///
/// Returns the events produced during the tick, in order. A finished run
/// does not advance and produces nothing.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if !state.is_playing() {
        return events;
    }
    state.time_ticks += 1;

    if input.bomb {
        detonate_bomb(state, &mut events);
    }

    state.player.update_invincibility();
    state.player.update_weapon_decay(&mut events);
    state.player.steer(input.steering, &state.arena, dt);
    fire_weapon(state, &mut events);

    run_due_timers(state);
    update_items(state, dt, &mut events);
    update_bullets(state, dt);

    update_boss(state, &mut events);
    if !state.is_playing() {
        return events;
    }

    update_guaranteed_drops(state);
    update_spawning(state);
    update_enemies(state, dt, &mut events);
    update_particles(state, dt);

    events
}

/// Pure wrapper: advance a copy of `prev` and return it with the tick's events
pub fn step(prev: &GameState, input: &TickInput, dt: f32) -> (GameState, Vec<GameEvent>) {
    let mut next = prev.clone();
    let events = tick(&mut next, input, dt);
    (next, events)
}

fn fire_weapon(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.player.can_interact() || !state.player.ready_to_fire() {
        return;
    }
    let volley = fire_pattern(state.player.power_level, state.player.pos);
    events.push(GameEvent::BulletFired {
        count: volley.len() as u32,
    });
    state.bullets.extend(volley);
}

fn update_boss(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let now = state.time_ticks;
    let boss_present = state.boss_index().is_some();

    match state.boss.update(now, boss_present) {
        Some(BossTransition::WarningStarted { stage }) => {
            events.push(GameEvent::BossWarning { stage });
        }
        Some(BossTransition::Materialize { stage }) => {
            if spawn_boss(state, stage) {
                let token = state.timers.new_token();
                state.boss.activate(stage, now, token);
                events.push(GameEvent::BossSpawned { stage });
            }
        }
        Some(BossTransition::VictoryReached) => {
            finish_victory(state, events);
            return;
        }
        Some(BossTransition::ReturnedToIdle) | None => {}
    }

    if let Some((stage, token)) = state.boss.take_shower(now) {
        schedule_shower(state, stage, token);
    }
}

/// Every boss is down: bank the remaining energy and end the run
fn finish_victory(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let bonus = state.player.energy.max(0) as u64 * VICTORY_ENERGY_BONUS;
    if bonus > 0 {
        state.score += bonus;
        events.push(GameEvent::ScoreChanged {
            delta: bonus,
            total: state.score,
        });
    }
    state.phase = GamePhase::Victory;
    state.timers.clear();
    events.push(GameEvent::Victory {
        final_score: state.score,
    });
    log::info!(
        "Victory at {:.1}s with score {}",
        state.elapsed_secs(),
        state.score
    );
}

fn update_particles(state: &mut GameState, dt: f32) {
    for p in &mut state.particles {
        p.pos += p.vel * dt;
        p.vel *= 0.96;
        p.life = p.life.saturating_sub(1);
    }
    state.particles.retain(|p| p.life > 0);
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::boss::BossPhase;

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_finished_run_is_frozen() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::GameOver;
        let events = tick(&mut state, &idle(), SIM_DT);
        assert!(events.is_empty());
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_entry_then_autofire() {
        let mut state = GameState::new(1);
        let mut fired_while_entering = false;
        let mut ticks = 0;
        while state.player.entering {
            let events = tick(&mut state, &idle(), SIM_DT);
            fired_while_entering |= events
                .iter()
                .any(|e| matches!(e, GameEvent::BulletFired { .. }));
            ticks += 1;
            assert!(ticks < 200, "entry never finished");
        }
        assert!(!fired_while_entering);
        assert_eq!(state.player.pos.y, state.arena.height * PLAYER_REST_Y_RATIO);

        let events = tick(&mut state, &idle(), SIM_DT);
        assert!(events.contains(&GameEvent::BulletFired { count: 1 }));
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_pointer_steering() {
        let mut state = GameState::new(1);
        state.player.entering = false;
        state.player.invincible_ticks = 0;
        let input = TickInput {
            steering: Some(Steering::Pointer(Vec2::new(100.0, 600.0))),
            bomb: false,
        };
        let start = state.player.pos.x;
        tick(&mut state, &input, SIM_DT);
        assert!(state.player.pos.x < start);
        assert!(state.player.vel.x < 0.0);
    }

    #[test]
    fn test_step_leaves_prev_untouched() {
        let state = GameState::new(9);
        let (next, _) = step(&state, &idle(), SIM_DT);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(next.time_ticks, 1);
    }

    #[test]
    fn test_victory_banks_energy() {
        let mut state = GameState::new(1);
        state.boss.defeated = state.boss.total;
        state.boss.phase = BossPhase::Defeated {
            stage: state.boss.total,
            ticks_left: 1,
        };
        state.player.energy = 20;
        let events = tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Victory);
        assert_eq!(state.score, 200);
        assert_eq!(events.last(), Some(&GameEvent::Victory { final_score: 200 }));
    }

    #[test]
    fn test_particles_expire() {
        let mut state = GameState::new(1);
        state.burst(Vec2::new(100.0, 100.0), 0xffffff, 10);
        for _ in 0..PARTICLE_LIFETIME_TICKS {
            update_particles(&mut state, SIM_DT);
        }
        assert!(state.particles.is_empty());
    }
}
