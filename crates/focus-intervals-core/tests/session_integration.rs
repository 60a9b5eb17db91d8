//! Integration tests for sessions that outlive a single process.
//!
//! Each test opens the SQLite-backed store in a temporary directory, lets one
//! session write to it, then opens a second session later on the clock and
//! checks what it recovers.

use std::path::Path;
use std::time::Duration;

use focus_intervals_core::storage::{KvSnapshotStore, DEFAULT_STORE_KEY};
use focus_intervals_core::{
    Clock, Database, Event, FocusSession, IntervalSlot, ManualClock, PersistedSnapshot,
    SilentPlayer, SlotStatus, SnapshotStore, INTERVAL_COUNT, INTERVAL_DURATION_MS,
};

const T: u64 = 1_700_000_000_000;

fn kv_store(path: &Path) -> KvSnapshotStore {
    KvSnapshotStore::new(Database::open_at(path).unwrap(), DEFAULT_STORE_KEY)
}

fn open_session(path: &Path, clock: &ManualClock) -> FocusSession {
    let mut session = FocusSession::new(
        Box::new(kv_store(path)),
        Duration::from_millis(1000),
        Box::new(SilentPlayer),
        Box::new(clock.clone()),
    );
    session.hydrate();
    session
}

fn seed(path: &Path, slots: &[IntervalSlot], saved_at: u64) {
    kv_store(path).save(&PersistedSnapshot::capture(slots, saved_at));
}

fn running(elapsed_ms: u64) -> IntervalSlot {
    IntervalSlot {
        status: SlotStatus::Running,
        elapsed_ms,
    }
}

#[test]
fn progress_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("session.db");
    let clock = ManualClock::new(T);

    let mut first = open_session(&db, &clock);
    first.start(0).unwrap();
    clock.advance(10 * 60 * 1000);
    first.tick();
    first.stop(0).unwrap();
    first.shutdown();
    drop(first);

    clock.advance(60 * 60 * 1000);
    let second = open_session(&db, &clock);
    let view = second.view();
    assert_eq!(view.slots[0].status, SlotStatus::Paused);
    assert_eq!(view.slots[0].elapsed_ms, 10 * 60 * 1000);
    assert_eq!(view.running_index, None);
    assert_eq!(view.first_active_index, Some(0));
}

#[test]
fn closed_process_catches_up_one_completion() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("session.db");
    let mut slots = vec![IntervalSlot::PENDING; INTERVAL_COUNT];
    slots[0] = running(2_600_000);
    seed(&db, &slots, T);

    let clock = ManualClock::new(T + 200_000);
    let session = open_session(&db, &clock);
    let view = session.view();
    assert_eq!(view.slots[0], IntervalSlot::DONE);
    assert_eq!(view.slots[1], running(100_000));
    assert_eq!(view.running_index, Some(1));
    assert_eq!(session.engine().active_since_ms(), Some(T + 200_000));
}

#[test]
fn closed_process_catches_up_several_completions() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("session.db");
    let mut slots = vec![IntervalSlot::PENDING; INTERVAL_COUNT];
    slots[0] = running(0);
    seed(&db, &slots, T);

    let clock = ManualClock::new(T + 2 * INTERVAL_DURATION_MS + 500_000);
    let session = open_session(&db, &clock);
    let view = session.view();
    assert_eq!(view.done_count(), 2);
    assert_eq!(view.slots[2], running(500_000));

    // The caught-up state is written back with a fresh timestamp.
    let stored = kv_store(&db).load(INTERVAL_COUNT).unwrap();
    assert_eq!(stored.saved_at, clock.now_ms());
    assert_eq!(stored.running_index, 2);
}

#[test]
fn whole_sequence_finishes_while_closed() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("session.db");
    let mut slots = vec![IntervalSlot::PENDING; INTERVAL_COUNT];
    slots[0] = running(0);
    seed(&db, &slots, T);

    let clock = ManualClock::new(T + 24 * 60 * 60 * 1000);
    let mut session = open_session(&db, &clock);
    let view = session.view();
    assert!(view.is_complete());
    assert_eq!(view.running_index, None);
    assert_eq!(session.engine().active_since_ms(), None);
    assert!(session.start(0).is_none());
}

#[test]
fn reset_removes_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("session.db");
    let clock = ManualClock::new(T);

    let mut session = open_session(&db, &clock);
    session.start(0);
    clock.advance(INTERVAL_DURATION_MS);
    assert!(matches!(session.tick(), Some(Event::SlotCompleted { .. })));
    assert!(kv_store(&db).load(INTERVAL_COUNT).is_some());

    session.reset();
    session.shutdown();
    assert!(kv_store(&db).load(INTERVAL_COUNT).is_none());
    assert_eq!(
        session.view().slots,
        vec![IntervalSlot::PENDING; INTERVAL_COUNT]
    );
}

#[test]
fn malformed_record_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("session.db");
    let database = Database::open_at(&db).unwrap();
    database
        .kv_set(
            DEFAULT_STORE_KEY,
            r#"{"version":1,"items":[{"status":"done","elapsedMs":2700000}],"runningIndex":-1,"savedAt":1}"#,
        )
        .unwrap();
    drop(database);

    let clock = ManualClock::new(T);
    let session = open_session(&db, &clock);
    assert_eq!(
        session.view().slots,
        vec![IntervalSlot::PENDING; INTERVAL_COUNT]
    );
}

#[test]
fn round_trip_preserves_slots() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("session.db");
    let mut slots = vec![IntervalSlot::PENDING; INTERVAL_COUNT];
    slots[0] = IntervalSlot::DONE;
    slots[1] = IntervalSlot::DONE;
    slots[2] = IntervalSlot {
        status: SlotStatus::Paused,
        elapsed_ms: 1_234_567,
    };
    seed(&db, &slots, T);

    let loaded = kv_store(&db).load(INTERVAL_COUNT).unwrap();
    assert_eq!(loaded.items, slots);
    assert_eq!(loaded.running_index(), None);
}
