use serde::{Deserialize, Serialize};

/// Number of focus intervals in a session.
pub const INTERVAL_COUNT: usize = 8;

/// Length of one focus interval: 45 minutes.
pub const INTERVAL_DURATION_MS: u64 = 45 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    #[default]
    Pending,
    Running,
    Paused,
    Done,
}

impl SlotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SlotStatus::Pending => "pending",
            SlotStatus::Running => "running",
            SlotStatus::Paused => "paused",
            SlotStatus::Done => "done",
        }
    }
}

/// One fixed-duration focus interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalSlot {
    pub status: SlotStatus,
    /// Accumulated progress. Only current up to the last tick while running.
    pub elapsed_ms: u64,
}

impl IntervalSlot {
    pub const PENDING: IntervalSlot = IntervalSlot {
        status: SlotStatus::Pending,
        elapsed_ms: 0,
    };

    pub const DONE: IntervalSlot = IntervalSlot {
        status: SlotStatus::Done,
        elapsed_ms: INTERVAL_DURATION_MS,
    };

    pub fn is_done(&self) -> bool {
        self.status == SlotStatus::Done
    }

    pub fn is_running(&self) -> bool {
        self.status == SlotStatus::Running
    }

    pub fn remaining_ms(&self) -> u64 {
        INTERVAL_DURATION_MS.saturating_sub(self.elapsed_ms)
    }

    /// 0 .. 100, rounded to the nearest percent.
    pub fn progress_pct(&self) -> u8 {
        let pct = (self.elapsed_ms.min(INTERVAL_DURATION_MS) * 100 + INTERVAL_DURATION_MS / 2)
            / INTERVAL_DURATION_MS;
        pct.min(100) as u8
    }

    /// `mm:ss` countdown label; done slots always read `00:00`.
    pub fn remaining_label(&self) -> String {
        if self.is_done() {
            return format_remaining(0);
        }
        format_remaining(self.remaining_ms())
    }
}

/// A fresh slot list: every slot pending with no progress.
pub fn pristine_slots() -> Vec<IntervalSlot> {
    vec![IntervalSlot::PENDING; INTERVAL_COUNT]
}

/// The lowest-indexed slot that is not done; the only one that may be started.
pub fn first_active_index(slots: &[IntervalSlot]) -> Option<usize> {
    slots.iter().position(|s| !s.is_done())
}

pub fn running_index(slots: &[IntervalSlot]) -> Option<usize> {
    slots.iter().position(IntervalSlot::is_running)
}

pub fn done_count(slots: &[IntervalSlot]) -> usize {
    slots.iter().filter(|s| s.is_done()).count()
}

pub fn is_pristine(slots: &[IntervalSlot]) -> bool {
    slots.iter().all(|s| *s == IntervalSlot::PENDING)
}

/// Format milliseconds as `mm:ss`, rounding partial seconds up.
pub fn format_remaining(ms: u64) -> String {
    let total_secs = ms.div_ceil(1000);
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
