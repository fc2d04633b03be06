//! In-memory storage area shared between tab handles.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::trace;
use uuid::Uuid;

use portal_core::events::StorageEvent;
use portal_core::result::AppResult;
use portal_core::traits::KeyValueStorage;

/// One storage origin: the data plus its change channel.
///
/// Every [`MemoryStorage`] opened on the same area sees the same data and
/// the same notifications, like windows of one browser profile.
#[derive(Debug, Clone)]
pub struct StorageArea {
    /// Key-value contents.
    entries: Arc<DashMap<String, String>>,
    /// Change notifications.
    events: broadcast::Sender<StorageEvent>,
}

impl StorageArea {
    /// Create an empty area with the given notification buffer.
    pub fn new(event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            entries: Arc::new(DashMap::new()),
            events,
        }
    }

    /// Open a new tab handle with a fresh origin id.
    pub fn open_tab(&self) -> MemoryStorage {
        MemoryStorage {
            area: self.clone(),
            origin: Uuid::new_v4(),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the area holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn notify(&self, event: StorageEvent) {
        // No receivers is fine: nobody is listening yet.
        let _ = self.events.send(event);
    }
}

/// A tab's handle onto a shared [`StorageArea`].
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    area: StorageArea,
    origin: Uuid,
}

impl MemoryStorage {
    /// Create a standalone handle on a private area.
    pub fn new(event_buffer: usize) -> Self {
        StorageArea::new(event_buffer).open_tab()
    }

    /// The shared area behind this handle.
    pub fn area(&self) -> &StorageArea {
        &self.area
    }

    /// Remove every key, notifying other tabs once.
    pub fn clear_all(&self) -> AppResult<()> {
        self.area.entries.clear();
        self.area.notify(StorageEvent {
            key: None,
            old_value: None,
            new_value: None,
            origin: self.origin,
        });
        Ok(())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.area.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let old_value = self
            .area
            .entries
            .insert(key.to_string(), value.to_string());
        if old_value.as_deref() == Some(value) {
            return Ok(());
        }
        trace!(key, origin = %self.origin, "Storage key set");
        self.area.notify(StorageEvent {
            key: Some(key.to_string()),
            old_value,
            new_value: Some(value.to_string()),
            origin: self.origin,
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        if let Some((_, old)) = self.area.entries.remove(key) {
            trace!(key, origin = %self.origin, "Storage key removed");
            self.area.notify(StorageEvent {
                key: Some(key.to_string()),
                old_value: Some(old),
                new_value: None,
                origin: self.origin,
            });
        }
        Ok(())
    }

    fn origin(&self) -> Uuid {
        self.origin
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.area.events.subscribe()
    }
}
