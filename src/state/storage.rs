//! Durable key/value storage shared by every open tab.
//!
//! DESIGN
//! ======
//! A "tab" is one session stack (`SessionStore` + `ApiClient` + `AuthService`).
//! Tabs that share a storage backend see each other's writes, and every write
//! is announced on a broadcast channel as a [`StorageEvent`] tagged with the
//! writer's [`TabId`]. Listeners skip their own events, which mirrors how
//! browser storage events only reach the other tabs.
//!
//! Writes are applied as a batch so related keys (the token pair) land together.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;
use uuid::Uuid;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const ROLE_KEY: &str = "userRole";

const EVENT_CAPACITY: usize = 64;

/// Identifies the tab that performed a write.
pub type TabId = Uuid;

/// Change notification for one key. `new_value` is `None` for removals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
    pub origin: TabId,
}

/// One entry of a write batch. `value: None` removes the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageWrite {
    pub key: &'static str,
    pub value: Option<String>,
}

impl StorageWrite {
    #[must_use]
    pub fn set(key: &'static str, value: impl Into<String>) -> Self {
        Self { key, value: Some(value.into()) }
    }

    #[must_use]
    pub fn remove(key: &'static str) -> Self {
        Self { key, value: None }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize storage: {0}")]
    Serialize(#[from] serde_json::Error),
}

// =============================================================================
// TRAIT
// =============================================================================

/// Persistent string map observable by every tab.
pub trait DurableStorage: Send + Sync {
    /// Read one key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Apply a batch of writes atomically and announce changed keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written. No events are
    /// sent for a failed batch.
    fn apply(&self, writes: &[StorageWrite], origin: TabId) -> Result<(), StorageError>;

    /// Subscribe to change notifications from all tabs.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// Apply `writes` to `entries`, returning the events for keys that changed.
fn apply_to_map(entries: &mut HashMap<String, String>, writes: &[StorageWrite], origin: TabId) -> Vec<StorageEvent> {
    let mut events = Vec::new();
    for write in writes {
        let previous = match &write.value {
            Some(value) => entries.insert(write.key.to_owned(), value.clone()),
            None => entries.remove(write.key),
        };
        if previous != write.value {
            events.push(StorageEvent { key: write.key.to_owned(), new_value: write.value.clone(), origin });
        }
    }
    events
}

fn announce(events: &broadcast::Sender<StorageEvent>, changed: Vec<StorageEvent>) {
    for event in changed {
        // No subscribers is fine.
        let _ = events.send(event);
    }
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local storage. Shared between tabs through an `Arc`.
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { entries: Mutex::new(HashMap::new()), events }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn apply(&self, writes: &[StorageWrite], origin: TabId) -> Result<(), StorageError> {
        let changed = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            apply_to_map(&mut entries, writes, origin)
        };
        announce(&self.events, changed);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON file storage with owner-only permissions (0600 on unix).
///
/// Every read goes to disk so separate processes sharing the file stay
/// consistent. Change events are only delivered within this process.
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
    events: broadcast::Sender<StorageEvent>,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { path: path.into(), write_lock: Mutex::new(()), events }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| StorageError::Io { path: self.path.clone(), source })?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt { path: self.path.clone(), source })
    }

    fn write_map(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&tmp)
                .map_err(io_err)?;
            file.write_all(contents.as_bytes()).map_err(io_err)?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)
                .map_err(io_err)?;
            file.write_all(contents.as_bytes()).map_err(io_err)?;
        }

        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.remove(key))
    }

    fn apply(&self, writes: &[StorageWrite], origin: TabId) -> Result<(), StorageError> {
        let changed = {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            // A corrupt file is replaced rather than blocking every later write.
            let (mut entries, recovered) = match self.read_map() {
                Ok(entries) => (entries, false),
                Err(StorageError::Corrupt { path, source }) => {
                    tracing::warn!(path = %path.display(), error = %source, "session file is corrupt; overwriting");
                    (HashMap::new(), true)
                }
                Err(e) => return Err(e),
            };
            let changed = apply_to_map(&mut entries, writes, origin);
            if changed.is_empty() && !recovered {
                return Ok(());
            }
            self.write_map(&entries)?;
            changed
        };
        tracing::debug!(path = %self.path.display(), keys = changed.len(), "session file updated");
        announce(&self.events, changed);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
