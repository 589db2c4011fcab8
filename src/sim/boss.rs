//! Boss encounter sequencing
//!
//! Idle -> Warning -> Active -> Defeated -> Idle (or Victory after the last
//! stage). Transitions happen only on elapsed ticks and explicit kill or
//! escape calls; the machine never inspects the entity list itself.

use serde::{Deserialize, Serialize};

use super::timer::TimerToken;
use crate::consts::*;

/// Current encounter phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    /// Waiting for the spawn interval
    Idle,
    /// Telegraph before the boss entity exists
    Warning { stage: u32, ticks_left: u32 },
    /// Boss entity is live
    Active {
        stage: u32,
        since_tick: u64,
        next_shower_tick: u64,
        /// Cancels this fight's pending meteor-shower timers
        timers: TimerToken,
    },
    /// Brief pause after a kill
    Defeated { stage: u32, ticks_left: u32 },
    /// Every stage of the level has been defeated
    Victory,
}

/// What the caller must act on after `update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossTransition {
    WarningStarted { stage: u32 },
    /// Warning finished: spawn the boss entity and call `activate`
    Materialize { stage: u32 },
    ReturnedToIdle,
    VictoryReached,
}

/// Summary of a finished fight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FightRecord {
    pub stage: u32,
    pub fight_ticks: u64,
    pub timers: TimerToken,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossMachine {
    pub phase: BossPhase,
    /// Stages started so far (counted when the warning begins)
    pub spawned: u32,
    pub defeated: u32,
    pub total: u32,
    pub interval_ticks: u64,
    /// Tick the last encounter ended (kill or escape)
    pub last_encounter_end: Option<u64>,
}

impl BossMachine {
    pub fn new(total: u32, interval_ticks: u64) -> Self {
        Self {
            phase: BossPhase::Idle,
            spawned: 0,
            defeated: 0,
            total,
            interval_ticks,
            last_encounter_end: None,
        }
    }

    /// Warning or Active: ordinary spawns are throttled
    pub fn in_encounter(&self) -> bool {
        matches!(self.phase, BossPhase::Warning { .. } | BossPhase::Active { .. })
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, BossPhase::Active { .. })
    }

    pub fn active_stage(&self) -> Option<u32> {
        match self.phase {
            BossPhase::Active { stage, .. } => Some(stage),
            _ => None,
        }
    }

    pub fn is_victory(&self) -> bool {
        self.phase == BossPhase::Victory
    }

    fn should_trigger(&self, now: u64) -> bool {
        if self.phase != BossPhase::Idle || self.spawned >= self.total {
            return false;
        }
        match self.last_encounter_end {
            None => self.spawned == 0 && now >= self.interval_ticks,
            Some(end) => now.saturating_sub(end) >= self.interval_ticks,
        }
    }

    /// Advance timers. `boss_present` guards the singleton invariant.
    pub fn update(&mut self, now: u64, boss_present: bool) -> Option<BossTransition> {
        match self.phase {
            BossPhase::Idle => {
                if self.should_trigger(now) {
                    self.spawned += 1;
                    let stage = self.spawned;
                    self.phase = BossPhase::Warning {
                        stage,
                        ticks_left: BOSS_WARNING_TICKS,
                    };
                    log::info!("Boss {} warning at tick {}", stage, now);
                    Some(BossTransition::WarningStarted { stage })
                } else {
                    None
                }
            }
            BossPhase::Warning { stage, ticks_left } => {
                let ticks_left = ticks_left.saturating_sub(1);
                self.phase = BossPhase::Warning { stage, ticks_left };
                if ticks_left == 0 && !boss_present {
                    Some(BossTransition::Materialize { stage })
                } else {
                    None
                }
            }
            BossPhase::Active { .. } | BossPhase::Victory => None,
            BossPhase::Defeated { stage, ticks_left } => {
                let ticks_left = ticks_left.saturating_sub(1);
                if ticks_left > 0 {
                    self.phase = BossPhase::Defeated { stage, ticks_left };
                    None
                } else if self.defeated >= self.total {
                    self.phase = BossPhase::Victory;
                    log::info!("All {} bosses defeated", self.total);
                    Some(BossTransition::VictoryReached)
                } else {
                    self.phase = BossPhase::Idle;
                    Some(BossTransition::ReturnedToIdle)
                }
            }
        }
    }

    /// The boss entity now exists
    pub fn activate(&mut self, stage: u32, now: u64, timers: TimerToken) {
        self.phase = BossPhase::Active {
            stage,
            since_tick: now,
            next_shower_tick: now + SHOWER_PERIOD_TICKS,
            timers,
        };
        log::info!("Boss {} active at tick {}", stage, now);
    }

    /// Returns the stage and shower timer token when a meteor shower is due
    pub fn take_shower(&mut self, now: u64) -> Option<(u32, TimerToken)> {
        if let BossPhase::Active {
            stage,
            timers,
            ref mut next_shower_tick,
            ..
        } = self.phase
        {
            if now >= *next_shower_tick {
                *next_shower_tick = now + SHOWER_PERIOD_TICKS;
                return Some((stage, timers));
            }
        }
        None
    }

    /// Record a kill; no-op unless a fight is active
    pub fn on_boss_defeated(&mut self, now: u64) -> Option<FightRecord> {
        let BossPhase::Active {
            stage,
            since_tick,
            timers,
            ..
        } = self.phase
        else {
            return None;
        };
        self.defeated += 1;
        self.last_encounter_end = Some(now);
        self.phase = BossPhase::Defeated {
            stage,
            ticks_left: BOSS_DEFEAT_DELAY_TICKS,
        };
        log::info!("Boss {} defeated at tick {}", stage, now);
        Some(FightRecord {
            stage,
            fight_ticks: now.saturating_sub(since_tick),
            timers,
        })
    }

    /// Boss left the play area: back to Idle, stage is re-queued, no rewards
    pub fn on_boss_escaped(&mut self, now: u64) -> Option<FightRecord> {
        let BossPhase::Active {
            stage,
            since_tick,
            timers,
            ..
        } = self.phase
        else {
            return None;
        };
        self.spawned = self.spawned.saturating_sub(1);
        self.last_encounter_end = Some(now);
        self.phase = BossPhase::Idle;
        log::info!("Boss {} escaped at tick {}", stage, now);
        Some(FightRecord {
            stage,
            fight_ticks: now.saturating_sub(since_tick),
            timers,
        })
    }
}

/// Bonus for a fast kill, shrinking with every second of the fight
pub fn kill_speed_bonus(fight_ticks: u64) -> u64 {
    let secs = fight_ticks / TICK_RATE as u64;
    BOSS_SPEED_BONUS_MAX.saturating_sub(secs.saturating_mul(BOSS_SPEED_BONUS_DECAY))
}
