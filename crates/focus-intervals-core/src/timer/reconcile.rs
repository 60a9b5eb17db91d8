//! Catch-up of wall-clock time that passed while nothing was ticking.
//!
//! Given the last persisted snapshot and "now", replay the gap against the
//! running slot. A long gap can finish several slots in a row; each
//! completion hands the leftover time to the next slot.

use super::slot::{IntervalSlot, SlotStatus, INTERVAL_DURATION_MS};
use crate::storage::PersistedSnapshot;

/// Outcome of replaying a gap against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub slots: Vec<IntervalSlot>,
    /// Slot still running after catch-up. Only `Some` if that slot really
    /// has status `running`.
    pub running_index: Option<usize>,
    /// Slots that reached full duration during the gap.
    pub completed: usize,
    /// Length of the gap that was replayed.
    pub gap_ms: u64,
}

/// Replay `now_ms - snapshot.saved_at` against the snapshot's running slot.
///
/// Deterministic and side-effect free; the caller installs the result.
pub fn reconcile(snapshot: &PersistedSnapshot, now_ms: u64) -> Reconciled {
    let mut slots = snapshot.items.clone();
    let gap_ms = now_ms.saturating_sub(snapshot.saved_at);
    let mut delta = gap_ms;
    let mut completed = 0;

    let mut idx = snapshot
        .running_index()
        .or_else(|| slots.iter().position(IntervalSlot::is_running));

    while let Some(i) = idx {
        if delta == 0 {
            break;
        }
        let Some(slot) = slots.get_mut(i) else {
            break;
        };
        // The index should always point at a running slot; anything else
        // means the snapshot is inconsistent and catch-up stops here.
        if slot.status != SlotStatus::Running {
            break;
        }

        let remaining = INTERVAL_DURATION_MS.saturating_sub(slot.elapsed_ms);
        if delta >= remaining {
            *slot = IntervalSlot::DONE;
            completed += 1;
            delta -= remaining;
            let next = i + 1;
            idx = match slots.get_mut(next) {
                Some(next_slot) => {
                    next_slot.status = SlotStatus::Running;
                    Some(next)
                }
                None => None,
            };
        } else {
            slot.elapsed_ms += delta;
            delta = 0;
        }
    }

    let running_index = idx.filter(|&i| slots.get(i).is_some_and(IntervalSlot::is_running));
    Reconciled {
        slots,
        running_index,
        completed,
        gap_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::slot::{pristine_slots, INTERVAL_COUNT};

    const T: u64 = 1_700_000_000_000;

    fn snapshot_with(slots: Vec<IntervalSlot>, running_index: i64) -> PersistedSnapshot {
        PersistedSnapshot {
            items: slots,
            running_index,
            saved_at: T,
        }
    }

    fn running(elapsed_ms: u64) -> IntervalSlot {
        IntervalSlot {
            status: SlotStatus::Running,
            elapsed_ms,
        }
    }

    #[test]
    fn carries_leftover_into_next_slot() {
        let mut slots = pristine_slots();
        slots[0] = running(2_600_000);
        let out = reconcile(&snapshot_with(slots, 0), T + 200_000);

        assert_eq!(out.slots[0], IntervalSlot::DONE);
        assert_eq!(out.slots[1], running(100_000));
        assert_eq!(out.running_index, Some(1));
        assert_eq!(out.completed, 1);
        assert_eq!(out.gap_ms, 200_000);
    }

    #[test]
    fn spans_multiple_slots() {
        let mut slots = pristine_slots();
        slots[0] = running(0);
        let out = reconcile(
            &snapshot_with(slots, 0),
            T + 2 * INTERVAL_DURATION_MS + 500_000,
        );

        assert_eq!(out.slots[0], IntervalSlot::DONE);
        assert_eq!(out.slots[1], IntervalSlot::DONE);
        assert_eq!(out.slots[2], running(500_000));
        assert_eq!(out.running_index, Some(2));
        assert_eq!(out.completed, 2);
    }

    #[test]
    fn partial_progress_stays_on_same_slot() {
        let mut slots = pristine_slots();
        slots[0] = IntervalSlot::DONE;
        slots[1] = running(1_000);
        let out = reconcile(&snapshot_with(slots, 1), T + 9_000);
        assert_eq!(out.slots[1], running(10_000));
        assert_eq!(out.completed, 0);
    }

    #[test]
    fn finishing_last_slot_leaves_nothing_running() {
        let mut slots = vec![IntervalSlot::DONE; INTERVAL_COUNT];
        slots[INTERVAL_COUNT - 1] = running(INTERVAL_DURATION_MS - 1);
        let snapshot = snapshot_with(slots, (INTERVAL_COUNT - 1) as i64);
        let out = reconcile(&snapshot, T + 10 * INTERVAL_DURATION_MS);

        assert!(out.slots.iter().all(IntervalSlot::is_done));
        assert_eq!(out.running_index, None);
        assert_eq!(out.completed, 1);
    }

    #[test]
    fn negative_running_index_is_rederived() {
        let mut slots = pristine_slots();
        slots[0] = running(0);
        let out = reconcile(&snapshot_with(slots, -1), T + 1_000);
        assert_eq!(out.slots[0], running(1_000));
        assert_eq!(out.running_index, Some(0));
    }

    #[test]
    fn nothing_running_is_noop() {
        let mut slots = pristine_slots();
        slots[0] = IntervalSlot {
            status: SlotStatus::Paused,
            elapsed_ms: 42,
        };
        let snapshot = snapshot_with(slots.clone(), -1);
        let out = reconcile(&snapshot, T + INTERVAL_DURATION_MS * 4);
        assert_eq!(out.slots, slots);
        assert_eq!(out.running_index, None);
        assert_eq!(out.completed, 0);
    }

    #[test]
    fn index_pointing_at_non_running_slot_stops_catch_up() {
        let mut slots = pristine_slots();
        slots[0] = IntervalSlot::DONE;
        let snapshot = snapshot_with(slots.clone(), 0);
        let out = reconcile(&snapshot, T + 60_000);
        assert_eq!(out.slots, slots);
        assert_eq!(out.running_index, None);
    }

    #[test]
    fn clock_behind_saved_at_means_no_gap() {
        let mut slots = pristine_slots();
        slots[0] = running(5_000);
        let out = reconcile(&snapshot_with(slots.clone(), 0), T - 60_000);
        assert_eq!(out.slots, slots);
        assert_eq!(out.running_index, Some(0));
        assert_eq!(out.gap_ms, 0);
    }
}
