//! Completion cues.
//!
//! The player itself lives with the host (terminal bell, sound command,
//! desktop notification). The core only decides *when* to play: whenever the
//! number of done slots goes up compared to the previous observation.

use tracing::debug;

/// Narrow interface to whatever plays the completion cue.
///
/// Implementations swallow their own playback faults; a failed cue must
/// leave the player ready for the next attempt.
pub trait NotificationPlayer {
    /// The number of completed slots increased.
    fn on_completion_count_increased(&mut self);

    /// Prime playback from a user gesture. Idempotent.
    fn unlock(&mut self) {}

    /// Stop any playback in progress.
    fn reset(&mut self) {}
}

/// A player that never makes a sound.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayer;

impl NotificationPlayer for SilentPlayer {
    fn on_completion_count_increased(&mut self) {}
}

/// Tracks the done-count baseline between observations.
///
/// The first observation after (re)arming only records the baseline, so a
/// session that is loaded already complete does not ring on startup.
#[derive(Debug, Clone, Default)]
pub struct CompletionWatcher {
    baseline: Option<usize>,
}

impl CompletionWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `done_count`; true when it grew since the previous observation.
    pub fn observe(&mut self, done_count: usize) -> bool {
        let increased = self.baseline.is_some_and(|prev| done_count > prev);
        self.baseline = Some(done_count);
        if increased {
            debug!(done_count, "completion count increased");
        }
        increased
    }

    /// Forget the baseline; the next observation is silent.
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    pub fn baseline(&self) -> Option<usize> {
        self.baseline
    }
}
