//! Shared key-value storage with cross-context change events.
//!
//! DESIGN
//! ======
//! One `SharedStorage` stands in for a browser profile's persistent storage.
//! Each `StorageContext` is one tab on it. Writes from a context are visible
//! to every context immediately, and every *other* context receives a
//! `StorageEvent` describing the change. The writing context never sees its
//! own events, and writes that leave a value unchanged emit nothing.
//!
//! PERSISTENCE
//! ===========
//! `SharedStorage::open` backs the area with a JSON object file. Every
//! mutation rewrites the whole file (0600 on unix) while the entry lock is
//! held, so the file always reflects the latest committed state. A failed
//! write rolls the in-memory change back and emits no event.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{trace, warn};
use uuid::Uuid;

/// Events buffered per subscriber before it lags.
pub const EVENT_CAPACITY: usize = 64;

/// Identifies one context (tab) on a shared storage area.
pub type ContextId = Uuid;

/// Errors produced by storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A thread panicked while holding the entry lock.
    #[error("storage lock poisoned")]
    Poisoned,

    /// The backing file could not be read or written.
    #[error("storage file {path:?} I/O failed: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// The backing file does not contain a JSON object of strings.
    #[error("storage file {path:?} is malformed: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    /// A value could not be serialized for storage.
    #[error("storage serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A change observed by contexts other than the one that made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Changed key, or `None` when the whole area was cleared.
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// Context that made the change.
    pub source: ContextId,
}

// =============================================================================
// SHARED STORAGE
// =============================================================================

/// One persistent key-value area shared by every context opened on it.
#[derive(Clone)]
pub struct SharedStorage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    entries: Mutex<BTreeMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
    file: Option<PathBuf>,
}

impl SharedStorage {
    /// Storage that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_entries(BTreeMap::new(), None)
    }

    /// File-backed storage. Loads `path` if it exists; the file is created on
    /// the first write otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = if path.exists() { load_entries(&path)? } else { BTreeMap::new() };
        Ok(Self::with_entries(entries, Some(path)))
    }

    fn with_entries(entries: BTreeMap<String, String>, file: Option<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { inner: Arc::new(StorageInner { entries: Mutex::new(entries), events, file }) }
    }

    /// Open a new context (tab) on this storage area.
    #[must_use]
    pub fn context(&self) -> StorageContext {
        StorageContext { storage: self.clone(), id: Uuid::new_v4() }
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.inner.file.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.inner.entries.lock().map_err(|_| StorageError::Poisoned)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, source: ContextId, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        let old_value = entries.get(key).cloned();
        if old_value.as_deref() == Some(value) {
            return Ok(());
        }

        entries.insert(key.to_owned(), value.to_owned());
        if let Err(e) = self.persist(&entries) {
            match &old_value {
                Some(old) => entries.insert(key.to_owned(), old.clone()),
                None => entries.remove(key),
            };
            return Err(e);
        }

        self.emit(StorageEvent {
            key: Some(key.to_owned()),
            old_value,
            new_value: Some(value.to_owned()),
            source,
        });
        Ok(())
    }

    fn remove(&self, source: ContextId, key: &str) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        let Some(old_value) = entries.remove(key) else {
            return Ok(());
        };

        if let Err(e) = self.persist(&entries) {
            entries.insert(key.to_owned(), old_value);
            return Err(e);
        }

        self.emit(StorageEvent { key: Some(key.to_owned()), old_value: Some(old_value), new_value: None, source });
        Ok(())
    }

    fn clear(&self, source: ContextId) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        if entries.is_empty() {
            return Ok(());
        }

        let previous = std::mem::take(&mut *entries);
        if let Err(e) = self.persist(&entries) {
            *entries = previous;
            return Err(e);
        }

        self.emit(StorageEvent { key: None, old_value: None, new_value: None, source });
        Ok(())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        match &self.inner.file {
            Some(path) => write_entries(path, entries),
            None => Ok(()),
        }
    }

    fn emit(&self, event: StorageEvent) {
        if self.inner.events.send(event).is_err() {
            trace!("storage change with no listeners");
        }
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// One tab's handle on a shared storage area.
#[derive(Clone)]
pub struct StorageContext {
    storage: SharedStorage,
    id: ContextId,
}

impl StorageContext {
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    #[must_use]
    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// # Errors
    ///
    /// Returns an error if the entry lock is poisoned.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get(key)
    }

    /// # Errors
    ///
    /// Returns an error if the lock is poisoned or the backing file write fails.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set(self.id, key, value)
    }

    /// # Errors
    ///
    /// Returns an error if the lock is poisoned or the backing file write fails.
    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove(self.id, key)
    }

    /// # Errors
    ///
    /// Returns an error if the lock is poisoned or the backing file write fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.clear(self.id)
    }

    /// Subscribe to changes made by other contexts.
    #[must_use]
    pub fn subscribe(&self) -> StorageEvents {
        StorageEvents { rx: self.storage.inner.events.subscribe(), own: self.id }
    }
}

/// What a subscriber observes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageUpdate {
    Changed(StorageEvent),
    /// The subscriber fell behind and this many events were dropped. Current
    /// state must be re-read from storage.
    Lagged(u64),
}

/// Stream of storage events from other contexts.
pub struct StorageEvents {
    rx: broadcast::Receiver<StorageEvent>,
    own: ContextId,
}

impl StorageEvents {
    /// Next change made by another context, or `Lagged` when events were
    /// dropped. `None` once the storage is gone.
    pub async fn recv(&mut self) -> Option<StorageUpdate> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.source == self.own => {}
                Ok(event) => return Some(StorageUpdate::Changed(event)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "storage events lagged");
                    return Some(StorageUpdate::Lagged(skipped));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// =============================================================================
// FILE BACKING
// =============================================================================

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    let contents =
        fs::read_to_string(path).map_err(|source| StorageError::Io { path: path.to_path_buf(), source })?;
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&contents).map_err(|source| StorageError::Parse { path: path.to_path_buf(), source })
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let contents = serde_json::to_string_pretty(entries)?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(contents.as_bytes()).map_err(io_err)
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
