//! JSON-file storage backend.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::{debug, trace};
use uuid::Uuid;

use portal_core::error::{AppError, ErrorKind};
use portal_core::events::StorageEvent;
use portal_core::result::AppResult;
use portal_core::traits::KeyValueStorage;

/// Persists keys as a flat JSON object in a single file.
///
/// Every call re-reads the file so that writes made by another process are
/// picked up on the next access. Writes go to a sibling temp file that is
/// renamed over the original.
#[derive(Debug)]
pub struct FileStorage {
    /// Location of the JSON document.
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
    origin: Uuid,
    events: broadcast::Sender<StorageEvent>,
}

impl FileStorage {
    /// Open (or lazily create) a file-backed store.
    pub fn new(path: impl Into<PathBuf>, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            origin: Uuid::new_v4(),
            events,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored entries.
    pub fn entries(&self) -> AppResult<BTreeMap<String, String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.load()
    }

    fn load(&self) -> AppResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Corrupt storage file {}: {e}", self.path.display()),
                    e,
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), keys = entries.len(), "Storage file written");
        Ok(())
    }

    fn mutate(&self, key: &str, value: Option<&str>) -> AppResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        let old_value = match value {
            Some(v) => entries.insert(key.to_string(), v.to_string()),
            None => entries.remove(key),
        };
        if old_value.as_deref() == value {
            return Ok(());
        }
        self.persist(&entries)?;
        trace!(key, origin = %self.origin, "Storage file key changed");
        let _ = self.events.send(StorageEvent {
            key: Some(key.to_string()),
            old_value,
            new_value: value.map(String::from),
            origin: self.origin,
        });
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.mutate(key, Some(value))
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.mutate(key, None)
    }

    fn origin(&self) -> Uuid {
        self.origin
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}
