use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every accepted state change produces an Event.
/// Rejected requests (starting an ineligible slot, stopping an idle one)
/// produce none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SlotStarted {
        index: usize,
        /// A slot that was still running and got paused to make room.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        demoted: Option<usize>,
        at: DateTime<Utc>,
    },
    SlotStopped {
        index: usize,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    /// A slot reached full duration. `next_index` is the slot that was
    /// auto-started, or `None` when the sequence is complete.
    SlotCompleted {
        index: usize,
        next_index: Option<usize>,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    /// Persisted state was caught up to the present.
    Reconciled {
        /// Slots that finished while nobody was watching.
        completed: usize,
        running_index: Option<usize>,
        caught_up_ms: u64,
        at: DateTime<Utc>,
    },
}
