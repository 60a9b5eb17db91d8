//! A focus session: the interval engine wired to its collaborators.
//!
//! [`FocusSession`] owns the engine, the persistence scheduler, the
//! completion watcher, the notification player and the clock. Hosts drive it
//! through three kinds of calls:
//!
//! - user requests: [`start`](FocusSession::start), [`stop`](FocusSession::stop),
//!   [`reset`](FocusSession::reset)
//! - the periodic [`tick`](FocusSession::tick)
//! - lifecycle hooks: [`hydrate`](FocusSession::hydrate) at startup,
//!   [`on_hidden`](FocusSession::on_hidden) / [`on_visible`](FocusSession::on_visible)
//!   around backgrounding, [`shutdown`](FocusSession::shutdown) on teardown
//!
//! Transitions that must survive a crash (stop, completion, reset,
//! reconciliation) are written synchronously before the call returns.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::{timestamp, Clock};
use crate::events::Event;
use crate::notify::{CompletionWatcher, NotificationPlayer};
use crate::persistence::PersistenceScheduler;
use crate::storage::SnapshotStore;
use crate::timer::{reconcile, IntervalEngine, IntervalSlot};

/// Immutable copy of the session state for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub slots: Vec<IntervalSlot>,
    /// The only slot a `start` request is accepted for.
    pub first_active_index: Option<usize>,
    pub running_index: Option<usize>,
}

impl SessionView {
    pub fn done_count(&self) -> usize {
        crate::timer::done_count(&self.slots)
    }

    pub fn is_complete(&self) -> bool {
        self.first_active_index.is_none()
    }
}

pub struct FocusSession {
    engine: IntervalEngine,
    persistence: PersistenceScheduler,
    watcher: CompletionWatcher,
    player: Box<dyn NotificationPlayer>,
    clock: Box<dyn Clock>,
    hidden: bool,
}

impl FocusSession {
    /// Build a session with a pristine slot list. Call [`hydrate`](Self::hydrate)
    /// to pick up stored progress.
    pub fn new(
        store: Box<dyn SnapshotStore>,
        throttle: Duration,
        player: Box<dyn NotificationPlayer>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let engine = IntervalEngine::new();
        let mut watcher = CompletionWatcher::new();
        watcher.observe(engine.done_count());
        Self {
            engine,
            persistence: PersistenceScheduler::new(store, throttle),
            watcher,
            player,
            clock,
            hidden: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn view(&self) -> SessionView {
        SessionView {
            slots: self.engine.slots().to_vec(),
            first_active_index: self.engine.first_active_index(),
            running_index: self.engine.running_index(),
        }
    }

    pub fn engine(&self) -> &IntervalEngine {
        &self.engine
    }

    pub fn persistence(&self) -> &PersistenceScheduler {
        &self.persistence
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load the stored record and catch it up to now.
    ///
    /// Completions found here do not trigger the notification player.
    pub fn hydrate(&mut self) -> Option<Event> {
        self.hidden = false;
        self.watcher.reset();
        let event = self.reconcile_from_store();
        self.observe_completions();
        event
    }

    /// The host regained visibility: catch up time spent in the background.
    ///
    /// Only acts after [`on_hidden`](Self::on_hidden). Without that flush the
    /// stored record may lag behind the engine.
    pub fn on_visible(&mut self) -> Option<Event> {
        if !self.hidden {
            debug!("visible without prior hide; nothing to catch up");
            return None;
        }
        self.hidden = false;
        let event = self.reconcile_from_store();
        self.observe_completions();
        event
    }

    /// The host may stop running us at any moment.
    pub fn on_hidden(&mut self) {
        let now = self.clock.now_ms();
        self.persistence.suspend(self.engine.slots(), now);
        self.hidden = true;
        debug!("session suspended");
    }

    /// Final write before the session goes away.
    pub fn shutdown(&mut self) {
        let now = self.clock.now_ms();
        self.persistence.suspend(self.engine.slots(), now);
        debug!("session shut down");
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start `index`. Ignored unless it is the first active slot.
    pub fn start(&mut self, index: usize) -> Option<Event> {
        let now = self.clock.now_ms();
        let event = self.engine.start(index, now)?;
        self.player.unlock();
        self.persistence.mark_changed(now);
        Some(event)
    }

    /// Stop `index`. Ignored unless that slot is running.
    pub fn stop(&mut self, index: usize) -> Option<Event> {
        let now = self.clock.now_ms();
        let event = self.engine.stop(index, now)?;
        self.persistence.flush(self.engine.slots(), now);
        Some(event)
    }

    /// Stop whichever slot is running, if any.
    pub fn stop_running(&mut self) -> Option<Event> {
        let index = self.engine.running_index()?;
        self.stop(index)
    }

    /// Advance the running slot to now and fire any due throttled write.
    pub fn tick(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        let event = self.engine.tick(now);
        if event.is_some() {
            self.persistence.flush(self.engine.slots(), now);
            self.observe_completions();
        } else if self.engine.running_index().is_some() {
            self.persistence.mark_changed(now);
        }
        self.persistence.poll(self.engine.slots(), now);
        event
    }

    /// Back to eight pending slots; the stored record is removed.
    pub fn reset(&mut self) -> Event {
        let now = self.clock.now_ms();
        let event = self.engine.reset(now);
        self.persistence.clear();
        self.player.reset();
        self.watcher.reset();
        self.persistence.flush(self.engine.slots(), now);
        self.observe_completions();
        info!("session reset");
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reconcile_from_store(&mut self) -> Option<Event> {
        let Some(snapshot) = self.persistence.load() else {
            debug!("no stored session to reconcile");
            return None;
        };
        let now = self.clock.now_ms();
        let caught_up = reconcile(&snapshot, now);
        info!(
            gap_ms = caught_up.gap_ms,
            completed = caught_up.completed,
            running_index = ?caught_up.running_index,
            "reconciled stored session"
        );

        let running_index = caught_up.running_index;
        self.engine.install(caught_up.slots, Some(now));
        self.persistence.flush(self.engine.slots(), now);
        Some(Event::Reconciled {
            completed: caught_up.completed,
            running_index,
            caught_up_ms: caught_up.gap_ms,
            at: timestamp(now),
        })
    }

    fn observe_completions(&mut self) {
        if self.watcher.observe(self.engine.done_count()) {
            self.player.on_completion_count_increased();
        }
    }
}
