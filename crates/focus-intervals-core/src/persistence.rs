//! Throttled persistence of the slot list.
//!
//! Routine progress is written at most once per throttle window: the first
//! change arms a deadline, later changes ride along, and the write captures
//! whatever the slots look like when the deadline is polled. Transitions that
//! must not be lost bypass the throttle with [`PersistenceScheduler::flush`].
//!
//! There is no timer thread. The owner polls with the current time, which
//! keeps every write on the same logical thread as the mutations.

use std::time::Duration;

use tracing::trace;

use crate::storage::{PersistedSnapshot, SnapshotStore};
use crate::timer::{is_pristine, IntervalSlot, INTERVAL_COUNT};

pub struct PersistenceScheduler {
    store: Box<dyn SnapshotStore>,
    throttle_ms: u64,
    /// Deadline of the pending throttled write, if one is armed.
    pending_at_ms: Option<u64>,
    writes: u64,
}

impl PersistenceScheduler {
    pub fn new(store: Box<dyn SnapshotStore>, throttle: Duration) -> Self {
        Self {
            store,
            throttle_ms: u64::try_from(throttle.as_millis()).unwrap_or(u64::MAX),
            pending_at_ms: None,
            writes: 0,
        }
    }

    /// Read the stored record.
    pub fn load(&self) -> Option<PersistedSnapshot> {
        self.store.load(INTERVAL_COUNT)
    }

    /// Record that state changed. Arms a write unless one is already pending.
    pub fn mark_changed(&mut self, now_ms: u64) {
        if self.pending_at_ms.is_none() {
            self.pending_at_ms = Some(now_ms.saturating_add(self.throttle_ms));
        }
    }

    /// Fire the pending write if its deadline has passed. Returns whether a
    /// write happened.
    pub fn poll(&mut self, slots: &[IntervalSlot], now_ms: u64) -> bool {
        match self.pending_at_ms {
            Some(deadline) if now_ms >= deadline => {
                self.pending_at_ms = None;
                self.write(slots, now_ms);
                true
            }
            _ => false,
        }
    }

    /// Write immediately, leaving any pending throttled write armed.
    pub fn flush(&mut self, slots: &[IntervalSlot], now_ms: u64) {
        self.write(slots, now_ms);
    }

    /// Write immediately and drop the pending throttled write. Used when the
    /// host is about to lose the execution context.
    pub fn suspend(&mut self, slots: &[IntervalSlot], now_ms: u64) {
        self.write(slots, now_ms);
        self.pending_at_ms = None;
    }

    /// Remove the stored record and drop the pending write.
    pub fn clear(&mut self) {
        self.pending_at_ms = None;
        self.store.clear();
    }

    pub fn has_pending(&self) -> bool {
        self.pending_at_ms.is_some()
    }

    pub fn pending_deadline_ms(&self) -> Option<u64> {
        self.pending_at_ms
    }

    /// Number of writes issued to the store (successful or not).
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn write(&mut self, slots: &[IntervalSlot], now_ms: u64) {
        self.writes += 1;
        // A pristine session is stored as "no record".
        if is_pristine(slots) {
            trace!("clearing record for pristine session");
            self.store.clear();
            return;
        }
        trace!(saved_at = now_ms, "writing session snapshot");
        self.store.save(&PersistedSnapshot::capture(slots, now_ms));
    }
}
