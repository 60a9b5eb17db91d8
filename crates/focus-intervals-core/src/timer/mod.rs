mod engine;
mod reconcile;
mod slot;

pub use engine::IntervalEngine;
pub use reconcile::{reconcile, Reconciled};
pub use slot::{
    done_count, first_active_index, format_remaining, is_pristine, pristine_slots, running_index,
    IntervalSlot, SlotStatus, INTERVAL_COUNT, INTERVAL_DURATION_MS,
};
