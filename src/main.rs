//! Meteor Storm headless runner
//!
//! Plays a seeded run with a scripted autopilot and prints what happened.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use glam::Vec2;

use meteor_storm::consts::*;
use meteor_storm::sim::{Arena, GameEvent, GamePhase, GameState, Steering, TickInput, tick};
use meteor_storm::LevelConfig;

#[derive(Parser, Debug)]
#[command(name = "meteor-storm")]
#[command(about = "Run a deterministic Meteor Storm simulation without a renderer")]
struct Cli {
    /// Run seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Built-in level id (unknown ids fall back to level 1)
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Level record as JSON; overrides --level
    #[arg(long)]
    level_file: Option<PathBuf>,
    /// Simulated seconds before stopping
    #[arg(long, default_value_t = 180)]
    seconds: u32,
    /// Write the final state snapshot as JSON
    #[arg(long)]
    dump_state: Option<PathBuf>,
}

/// Follow items when any are falling, otherwise sit under the lowest rock.
/// Bombs go off when the screen gets crowded or energy runs low.
fn autopilot(state: &GameState) -> TickInput {
    let player = &state.player;
    let target_x = state
        .items
        .iter()
        .filter(|i| i.pos.y > 0.0 && i.pos.y < player.pos.y)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|i| i.pos.x)
        .or_else(|| {
            state
                .enemies
                .iter()
                .filter(|e| e.is_on_screen())
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|e| e.pos.x)
        })
        .unwrap_or(state.arena.width / 2.0);

    let crowd = state
        .enemies
        .iter()
        .filter(|e| !e.is_boss() && e.is_on_screen())
        .count();
    let bomb = player.bombs > 0 && (crowd >= 8 || (player.energy < 15 && crowd >= 3));

    TickInput {
        steering: Some(Steering::Pointer(Vec2::new(target_x, player.pos.y))),
        bomb,
    }
}

fn event_name(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::ScoreChanged { .. } => "score_changed",
        GameEvent::EnergyChanged(_) => "energy_changed",
        GameEvent::PowerLevelChanged(_) => "power_level_changed",
        GameEvent::ShieldChanged(_) => "shield_changed",
        GameEvent::BombCountChanged(_) => "bomb_count_changed",
        GameEvent::PlayerDamaged { .. } => "player_damaged",
        GameEvent::ShieldAbsorbed => "shield_absorbed",
        GameEvent::BombUsed => "bomb_used",
        GameEvent::ItemPickedUp(_) => "item_picked_up",
        GameEvent::BulletFired { .. } => "bullet_fired",
        GameEvent::EnemyExploded { .. } => "enemy_exploded",
        GameEvent::BossWarning { .. } => "boss_warning",
        GameEvent::BossSpawned { .. } => "boss_spawned",
        GameEvent::BossDamaged { .. } => "boss_damaged",
        GameEvent::BossDefeated { .. } => "boss_defeated",
        GameEvent::BossEscaped { .. } => "boss_escaped",
        GameEvent::GameOver { .. } => "game_over",
        GameEvent::Victory { .. } => "victory",
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let level = match &cli.level_file {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read level file: {}", path.display()))?;
            LevelConfig::from_json(&json)
        }
        None => LevelConfig::for_level(cli.level),
    };

    let mut state = GameState::with_config(cli.seed, level, Arena::default());
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    let max_ticks = cli.seconds as u64 * TICK_RATE as u64;

    while state.phase == GamePhase::Playing && state.time_ticks < max_ticks {
        let input = autopilot(&state);
        for event in tick(&mut state, &input, SIM_DT) {
            match &event {
                GameEvent::BossSpawned { stage } => {
                    println!("[{:>7.2}s] boss {} spawned", state.elapsed_secs(), stage)
                }
                GameEvent::BossDefeated { stage } => {
                    println!("[{:>7.2}s] boss {} defeated", state.elapsed_secs(), stage)
                }
                GameEvent::BossEscaped { stage } => {
                    println!("[{:>7.2}s] boss {} escaped", state.elapsed_secs(), stage)
                }
                _ => {}
            }
            *counts.entry(event_name(&event)).or_default() += 1;
        }
    }

    println!("Run finished.");
    println!("  Level:         {} ({})", state.level.id, state.level.name);
    println!("  Seed:          {}", state.seed);
    println!("  Phase:         {:?}", state.phase);
    println!("  Time:          {:.2}s", state.elapsed_secs());
    println!("  Final score:   {}", state.score);
    println!("  Energy:        {}", state.player.energy);
    println!("  Power level:   {}", state.player.power_level);
    println!("  Bosses:        {}/{}", state.boss.defeated, state.boss.total);
    println!("  Events:");
    for (name, count) in &counts {
        println!("    {:<20} {}", name, count);
    }

    if let Some(path) = &cli.dump_state {
        let json = state
            .to_json()
            .ok_or_else(|| anyhow!("failed to serialize final state"))?;
        fs::write(path, json)
            .with_context(|| format!("failed to write state: {}", path.display()))?;
        println!("State written to {}", path.display());
    }

    Ok(())
}
