//! The shared key → value map behind the controller.
//!
//! All access goes through [`Store`]; the map itself is never handed out.
//! Reads take the read guard for one inspection only. Writes hold the write
//! guard across the snapshot save so the file never reflects a state between
//! two writes.

use crate::controller::snapshot::{Entries, SnapshotFile};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Result of a [`Store::set`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Value the key held before this write
    pub previous: Option<String>,
    /// The snapshot on disk reflects this write
    pub durable: bool,
}

impl WriteOutcome {
    /// Did this write replace a different value?
    pub fn overwrote(&self, value: &str) -> bool {
        self.previous.as_deref().is_some_and(|prev| prev != value)
    }
}

pub struct Store {
    entries: RwLock<Entries>,
    snapshot: Option<SnapshotFile>,
    poll_interval: Duration,
}

impl Store {
    /// In-memory store without persistence
    pub fn ephemeral(poll_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(Entries::new()),
            snapshot: None,
            poll_interval,
        }
    }

    /// Open a store, loading `snapshot` when given.
    ///
    /// A missing or unreadable snapshot is logged and the store starts empty.
    pub async fn open(snapshot: Option<SnapshotFile>, poll_interval: Duration) -> Self {
        let entries = match &snapshot {
            Some(file) => match file.load().await {
                Ok(entries) => {
                    info!(
                        path = %file.path().display(),
                        keys = entries.len(),
                        "Loaded snapshot"
                    );
                    entries
                }
                Err(e) if e.is_not_found() => {
                    warn!(path = %file.path().display(), "No snapshot found, starting empty");
                    Entries::new()
                }
                Err(e) => {
                    error!(
                        path = %file.path().display(),
                        error = %e,
                        "Failed to load snapshot, starting empty"
                    );
                    Entries::new()
                }
            },
            None => Entries::new(),
        };

        Self {
            entries: RwLock::new(entries),
            snapshot,
            poll_interval,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Copy of every entry at this instant
    pub async fn list(&self) -> Entries {
        self.entries.read().await.clone()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Wait until `key` is set and return its value.
    ///
    /// Re-checks every poll interval with no deadline. The guard is released
    /// before each sleep; dropping the future abandons the wait.
    pub async fn wait_for(&self, key: &str) -> String {
        let mut polls: u64 = 0;
        loop {
            if let Some(value) = self.get(key).await {
                if polls > 0 {
                    debug!(key, polls, "Key appeared");
                }
                return value;
            }
            polls += 1;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Set `key` to `value` (last write wins), persisting when enabled.
    pub async fn set(&self, key: String, value: String) -> WriteOutcome {
        let mut entries = self.entries.write().await;
        let previous = entries.insert(key.clone(), value.clone());

        let outcome = WriteOutcome {
            durable: self.persist(&entries).await,
            previous,
        };
        drop(entries);

        if outcome.overwrote(&value) {
            warn!(
                key = %key,
                previous_value = %outcome.previous.as_deref().unwrap_or_default(),
                value = %value,
                "Overwriting existing value"
            );
        }

        outcome
    }

    async fn persist(&self, entries: &Entries) -> bool {
        let Some(file) = &self.snapshot else {
            return false;
        };
        match file.save(entries).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    path = %file.path().display(),
                    error = %e,
                    "Failed to persist snapshot; keeping value in memory"
                );
                false
            }
        }
    }
}
