//! Durable projection of the slot list.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "version": 1,
//!   "items": [{ "status": "running", "elapsedMs": 120000 }, ...],
//!   "runningIndex": 0,
//!   "savedAt": 1700000000000
//! }
//! ```
//!
//! Decoding is strict: a wrong version, a wrong slot count or any malformed
//! field discards the whole record. A fresh start is always preferable to
//! half-trusted progress.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::timer::{running_index, IntervalSlot, SlotStatus, INTERVAL_DURATION_MS};

/// Schema tag written into every record.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSnapshot {
    pub items: Vec<IntervalSlot>,
    /// Index of the running slot, or -1. Redundant with `items`.
    pub running_index: i64,
    /// Epoch milliseconds of the write.
    pub saved_at: u64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSnapshot {
    version: u32,
    items: Vec<IntervalSlot>,
    running_index: i64,
    saved_at: u64,
}

impl PersistedSnapshot {
    pub fn capture(slots: &[IntervalSlot], saved_at: u64) -> Self {
        Self {
            items: slots.to_vec(),
            running_index: running_index(slots).map_or(-1, |i| i as i64),
            saved_at,
        }
    }

    /// The stored running index, if it is non-negative.
    pub fn running_index(&self) -> Option<usize> {
        usize::try_from(self.running_index).ok()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&WireSnapshot {
            version: SNAPSHOT_VERSION,
            items: self.items.clone(),
            running_index: self.running_index,
            saved_at: self.saved_at,
        })
    }

    /// Parse and validate a stored record. `None` for anything malformed.
    pub fn decode(raw: &str, expected_slots: usize) -> Option<Self> {
        match Self::validate(raw, expected_slots) {
            Ok(snapshot) => Some(snapshot),
            Err(reason) => {
                debug!(%reason, "discarding persisted snapshot");
                None
            }
        }
    }

    fn validate(raw: &str, expected_slots: usize) -> Result<Self, String> {
        let wire: WireSnapshot = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        if wire.version != SNAPSHOT_VERSION {
            return Err(format!("unsupported version {}", wire.version));
        }
        if wire.items.len() != expected_slots {
            return Err(format!(
                "expected {expected_slots} items, found {}",
                wire.items.len()
            ));
        }
        if wire.items.iter().any(|s| s.elapsed_ms > INTERVAL_DURATION_MS) {
            return Err("elapsedMs exceeds interval duration".into());
        }
        if wire
            .items
            .iter()
            .any(|s| s.status == SlotStatus::Done && s.elapsed_ms != INTERVAL_DURATION_MS)
        {
            return Err("done slot without full elapsedMs".into());
        }
        if wire.items.iter().filter(|s| s.is_running()).count() > 1 {
            return Err("more than one running slot".into());
        }
        let mut done_so_far = true;
        for (i, slot) in wire.items.iter().enumerate() {
            let started = slot.is_running()
                || (slot.status == SlotStatus::Paused && slot.elapsed_ms > 0);
            if started && !done_so_far {
                return Err(format!("slot {i} has progress before earlier slots are done"));
            }
            done_so_far &= slot.is_done();
        }
        if usize::try_from(wire.running_index).is_ok_and(|i| i >= expected_slots) {
            return Err(format!("runningIndex {} out of range", wire.running_index));
        }
        Ok(Self {
            items: wire.items,
            running_index: wire.running_index,
            saved_at: wire.saved_at,
        })
    }
}
