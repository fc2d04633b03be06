//! Storage backend for environments where persistence is blocked.

use tokio::sync::broadcast;
use uuid::Uuid;

use portal_core::error::AppError;
use portal_core::events::StorageEvent;
use portal_core::result::AppResult;
use portal_core::traits::KeyValueStorage;

/// A backend whose every access fails, as when a browser policy disables
/// local storage.
#[derive(Debug)]
pub struct DisabledStorage {
    origin: Uuid,
    events: broadcast::Sender<StorageEvent>,
}

impl DisabledStorage {
    /// Create a disabled backend.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(1);
        Self {
            origin: Uuid::new_v4(),
            events,
        }
    }

    fn unavailable(op: &str, key: &str) -> AppError {
        AppError::storage(format!("storage is disabled ({op} '{key}')"))
    }
}

impl Default for DisabledStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStorage for DisabledStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Err(Self::unavailable("get", key))
    }

    fn set(&self, key: &str, _value: &str) -> AppResult<()> {
        Err(Self::unavailable("set", key))
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        Err(Self::unavailable("remove", key))
    }

    fn origin(&self) -> Uuid {
        self.origin
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}
