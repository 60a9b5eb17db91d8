mod config;
pub mod database;
mod snapshot;
mod store;

pub use config::{Config, NotificationsConfig, PersistenceConfig, TickerConfig};
pub use database::Database;
pub use snapshot::{PersistedSnapshot, SNAPSHOT_VERSION};
pub use store::{KvSnapshotStore, MemorySnapshotStore, SnapshotStore, DEFAULT_STORE_KEY};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `FOCUS_INTERVALS_DATA_DIR` wins when set. Otherwise
/// `~/.config/focus-intervals[-dev]/`, where FOCUS_INTERVALS_ENV=dev selects
/// the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FOCUS_INTERVALS_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("FOCUS_INTERVALS_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("focus-intervals-dev")
            } else {
                base_dir.join("focus-intervals")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
