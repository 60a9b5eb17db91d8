//! Persistent store for the single session record.
//!
//! Every operation is best-effort. A failed write costs at most the progress
//! since the previous write; it never interrupts the session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use super::database::Database;
use super::snapshot::PersistedSnapshot;

/// Default key of the session record.
pub const DEFAULT_STORE_KEY: &str = "focus-intervals:v1";

/// Key-value storage for one serialized [`PersistedSnapshot`].
pub trait SnapshotStore {
    /// Write the snapshot. Failures are logged and swallowed.
    fn save(&mut self, snapshot: &PersistedSnapshot);

    /// Read back a snapshot with exactly `expected_slots` items, or `None`
    /// when there is no record or it fails validation.
    fn load(&self, expected_slots: usize) -> Option<PersistedSnapshot>;

    /// Remove the record. Failures are logged and swallowed.
    fn clear(&mut self);
}

/// Store backed by the SQLite `kv` table.
pub struct KvSnapshotStore {
    db: Database,
    key: String,
}

impl KvSnapshotStore {
    pub fn new(db: Database, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }
}

impl SnapshotStore for KvSnapshotStore {
    fn save(&mut self, snapshot: &PersistedSnapshot) {
        let json = match snapshot.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize session snapshot");
                return;
            }
        };
        if let Err(e) = self.db.kv_set(&self.key, &json) {
            warn!(key = %self.key, error = %e, "failed to persist session snapshot");
        }
    }

    fn load(&self, expected_slots: usize) -> Option<PersistedSnapshot> {
        match self.db.kv_get(&self.key) {
            Ok(raw) => PersistedSnapshot::decode(&raw?, expected_slots),
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read session snapshot");
                None
            }
        }
    }

    fn clear(&mut self) {
        if let Err(e) = self.db.kv_delete(&self.key) {
            warn!(key = %self.key, error = %e, "failed to clear session snapshot");
        }
    }
}

/// Store that keeps the serialized record in memory.
///
/// Goes through the same encode/decode path as the durable store, so it
/// exercises validation the same way. Clones share one record, which lets a
/// host hand the store to a session and still inspect it afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    raw: Arc<Mutex<Option<String>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an arbitrary payload, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&mut self, snapshot: &PersistedSnapshot) {
        match snapshot.to_json() {
            Ok(json) => *self.slot() = Some(json),
            Err(e) => warn!(error = %e, "failed to serialize session snapshot"),
        }
    }

    fn load(&self, expected_slots: usize) -> Option<PersistedSnapshot> {
        let raw = self.raw()?;
        PersistedSnapshot::decode(&raw, expected_slots)
    }

    fn clear(&mut self) {
        *self.slot() = None;
    }
}
