//! Human and JSON renderings of a session.

use focus_intervals_core::timer::format_remaining;
use focus_intervals_core::{Event, SessionView, SlotStatus};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SlotRow {
    /// 1-based slot number.
    pub slot: usize,
    pub status: SlotStatus,
    pub elapsed_ms: u64,
    pub progress_pct: u8,
    pub remaining: String,
    /// True for the only slot `start` will accept.
    pub current: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub rows: Vec<SlotRow>,
    pub first_active_index: Option<usize>,
    pub running_index: Option<usize>,
    pub done: usize,
}

impl StatusReport {
    pub fn new(view: &SessionView) -> Self {
        let rows = view
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| SlotRow {
                slot: i + 1,
                status: slot.status,
                elapsed_ms: slot.elapsed_ms,
                progress_pct: slot.progress_pct(),
                remaining: slot.remaining_label(),
                current: view.first_active_index == Some(i),
            })
            .collect();
        Self {
            rows,
            first_active_index: view.first_active_index,
            running_index: view.running_index,
            done: view.done_count(),
        }
    }
}

const BAR_WIDTH: usize = 20;

fn bar(progress_pct: u8) -> String {
    let filled = usize::from(progress_pct) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// One line per slot, for terminals.
pub fn table(view: &SessionView) -> String {
    let report = StatusReport::new(view);
    let mut out = String::new();
    for row in &report.rows {
        let marker = if row.current { '>' } else { ' ' };
        out.push_str(&format!(
            "{marker} #{:<2} {:<8} {} {:>3}%  {}\n",
            row.slot,
            row.status.as_str(),
            bar(row.progress_pct),
            row.progress_pct,
            row.remaining,
        ));
    }
    out.push_str(&format!("{}/{} done\n", report.done, report.rows.len()));
    out
}

/// Short status line for the running slot.
pub fn running_line(view: &SessionView) -> Option<String> {
    let index = view.running_index?;
    let slot = view.slots.get(index)?;
    Some(format!(
        "#{} running {} {:>3}%  {} left",
        index + 1,
        bar(slot.progress_pct()),
        slot.progress_pct(),
        format_remaining(slot.remaining_ms()),
    ))
}

/// Describe an event in plain words.
pub fn describe(event: &Event) -> String {
    match event {
        Event::SlotStarted { index, .. } => format!("interval #{} started", index + 1),
        Event::SlotStopped { index, elapsed_ms, .. } => format!(
            "interval #{} stopped at {}",
            index + 1,
            format_remaining(*elapsed_ms)
        ),
        Event::SlotCompleted {
            index,
            next_index: Some(next),
            ..
        } => format!("interval #{} done, #{} started", index + 1, next + 1),
        Event::SlotCompleted {
            next_index: None, ..
        } => "all intervals done".to_string(),
        Event::SessionReset { .. } => "session reset".to_string(),
        Event::Reconciled {
            completed,
            caught_up_ms,
            ..
        } => format!(
            "caught up {} ({} interval(s) finished meanwhile)",
            format_remaining(*caught_up_ms),
            completed
        ),
    }
}
