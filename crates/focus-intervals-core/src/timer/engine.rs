//! Interval engine implementation.
//!
//! The engine is a wall-clock-based state machine over a fixed list of
//! slots. It does not use internal threads - the caller is responsible for
//! calling `tick()` periodically and for passing "now" into every command.
//!
//! ## Slot transitions
//!
//! ```text
//! Pending -> Running -> (Paused | Done)
//! Paused  -> Running
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = IntervalEngine::new();
//! engine.start(0, clock.now_ms());
//! // In a loop:
//! engine.tick(clock.now_ms()); // Returns Some(Event) when a slot completes
//! ```

use tracing::debug;

use super::slot::{
    done_count, first_active_index, pristine_slots, running_index, IntervalSlot, SlotStatus,
    INTERVAL_DURATION_MS,
};
use crate::clock::timestamp;
use crate::events::Event;

/// Core interval state machine.
///
/// Only the first slot that is not done may run, and at most one slot runs
/// at a time. Progress is computed from wall-clock deltas, so an irregular
/// or suspended tick cadence never loses time.
#[derive(Debug, Clone)]
pub struct IntervalEngine {
    slots: Vec<IntervalSlot>,
    /// Base timestamp for the running slot's next delta. `Some` exactly
    /// while a slot is running.
    active_since_ms: Option<u64>,
}

impl Default for IntervalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl IntervalEngine {
    /// Create an engine with every slot pending.
    pub fn new() -> Self {
        Self {
            slots: pristine_slots(),
            active_since_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn slots(&self) -> &[IntervalSlot] {
        &self.slots
    }

    pub fn first_active_index(&self) -> Option<usize> {
        first_active_index(&self.slots)
    }

    pub fn running_index(&self) -> Option<usize> {
        running_index(&self.slots)
    }

    pub fn done_count(&self) -> usize {
        done_count(&self.slots)
    }

    pub fn active_since_ms(&self) -> Option<u64> {
        self.active_since_ms
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(IntervalSlot::is_done)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start `index` if it is the first active slot; otherwise ignore.
    pub fn start(&mut self, index: usize, now_ms: u64) -> Option<Event> {
        if self.first_active_index() != Some(index) {
            debug!(index, "start ignored: slot is not the first active slot");
            return None;
        }

        // Only the first active slot can be running, so this only fires on a
        // restart of that same slot or on inconsistent restored state.
        let demoted = self.running_index().filter(|&i| i != index);
        if let Some(i) = self.running_index() {
            self.slots[i].status = SlotStatus::Paused;
        }

        self.slots[index].status = SlotStatus::Running;
        self.active_since_ms = Some(now_ms);
        debug!(index, ?demoted, "slot started");
        Some(Event::SlotStarted {
            index,
            demoted,
            at: timestamp(now_ms),
        })
    }

    /// Pause `index` if it is running; otherwise ignore.
    ///
    /// Progress is kept as of the last tick.
    pub fn stop(&mut self, index: usize, now_ms: u64) -> Option<Event> {
        let slot = self.slots.get_mut(index)?;
        if !slot.is_running() {
            return None;
        }
        slot.status = SlotStatus::Paused;
        self.active_since_ms = None;
        debug!(index, elapsed_ms = slot.elapsed_ms, "slot stopped");
        Some(Event::SlotStopped {
            index,
            elapsed_ms: slot.elapsed_ms,
            at: timestamp(now_ms),
        })
    }

    /// Call periodically. Returns `Some(Event::SlotCompleted)` when the
    /// running slot reaches full duration.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        let index = self.running_index()?;
        let Some(since) = self.active_since_ms else {
            self.active_since_ms = Some(now_ms);
            return None;
        };

        let delta = now_ms.saturating_sub(since);
        let elapsed_now = self.slots[index].elapsed_ms.saturating_add(delta);

        if elapsed_now < INTERVAL_DURATION_MS {
            self.slots[index].elapsed_ms = elapsed_now;
            // Rebase so the next delta starts from this tick.
            self.active_since_ms = Some(now_ms);
            return None;
        }

        self.slots[index] = IntervalSlot::DONE;
        let next_index = index + 1;
        let next_index = if next_index < self.slots.len() {
            self.slots[next_index].status = SlotStatus::Running;
            self.active_since_ms = Some(now_ms);
            Some(next_index)
        } else {
            self.active_since_ms = None;
            None
        };
        debug!(index, ?next_index, "slot completed");
        Some(Event::SlotCompleted {
            index,
            next_index,
            at: timestamp(now_ms),
        })
    }

    pub fn reset(&mut self, now_ms: u64) -> Event {
        self.slots = pristine_slots();
        self.active_since_ms = None;
        Event::SessionReset {
            at: timestamp(now_ms),
        }
    }

    /// Replace the slot list wholesale, e.g. with a reconciled snapshot.
    ///
    /// The active start timestamp is kept only if a slot is running.
    pub fn install(&mut self, slots: Vec<IntervalSlot>, active_since_ms: Option<u64>) {
        self.slots = slots;
        self.active_since_ms = if self.running_index().is_some() {
            active_since_ms
        } else {
            None
        };
    }
}
