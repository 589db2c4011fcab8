//! Deferred actions scheduled for a future tick
//!
//! Owned by the game state and drained once per tick. Entries carry a
//! cancellation token so an encounter or run can drop everything it
//! scheduled in one call instead of guarding every callback.

use serde::{Deserialize, Serialize};

/// Something to do on a later tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Drop one meteor-shower rock at `x` with the given width
    ShowerMeteor { x: f32, width: f32 },
}

/// Cancellation token handed out by the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Scheduled {
    due_tick: u64,
    /// Insertion order, breaks ties between entries due on the same tick
    seq: u64,
    token: TimerToken,
    action: DeferredAction,
}

/// Tick-ordered queue of deferred actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerQueue {
    entries: Vec<Scheduled>,
    next_seq: u64,
    next_token: u32,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a token for a group of related timers
    pub fn new_token(&mut self) -> TimerToken {
        self.next_token += 1;
        TimerToken(self.next_token)
    }

    pub fn schedule(&mut self, due_tick: u64, token: TimerToken, action: DeferredAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Scheduled {
            due_tick,
            seq,
            token,
            action,
        });
    }

    /// Remove every pending action scheduled under `token`
    pub fn cancel(&mut self, token: TimerToken) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.token != token);
        before - self.entries.len()
    }

    /// Drop all pending actions
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return the actions due at or before `now`, oldest first
    pub fn drain_due(&mut self, now: u64) -> Vec<DeferredAction> {
        let mut due: Vec<Scheduled> = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due_tick <= now {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|e| (e.due_tick, e.seq));
        due.into_iter().map(|e| e.action).collect()
    }
}
