//! # Focus Intervals Core Library
//!
//! This library tracks a fixed sequence of eight 45-minute focus intervals.
//! Exactly one interval runs at a time, progress survives restarts, and time
//! that passed while nothing was ticking is caught up on the next load.
//!
//! ## Architecture
//!
//! - **Interval Engine**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` for progress updates
//! - **Reconciliation**: Replays the gap since the last write against a stored
//!   snapshot, possibly completing several intervals
//! - **Persistence**: Throttled writes of a versioned JSON record to a
//!   key-value store (SQLite by default), with forced writes for transitions
//!   that must not be lost
//! - **Session**: Wires the engine to its store, clock and notification player
//!
//! ## Key Components
//!
//! - [`IntervalEngine`]: Core interval state machine
//! - [`reconcile`]: Catch-up of unobserved time
//! - [`PersistenceScheduler`]: Throttled and forced writes
//! - [`FocusSession`]: Host-facing session API
//! - [`run_session`]: Cancellable tokio tick loop

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod persistence;
pub mod runner;
pub mod session;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError};
pub use events::Event;
pub use notify::{CompletionWatcher, NotificationPlayer, SilentPlayer};
pub use persistence::PersistenceScheduler;
pub use runner::{run_session, Control, Update};
pub use session::{FocusSession, SessionView};
pub use storage::{
    Config, Database, KvSnapshotStore, MemorySnapshotStore, PersistedSnapshot, SnapshotStore,
};
pub use timer::{
    reconcile, IntervalEngine, IntervalSlot, Reconciled, SlotStatus, INTERVAL_COUNT,
    INTERVAL_DURATION_MS,
};
