//! Storage manager that dispatches to the configured backend.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use portal_core::config::{StorageBackendKind, StorageConfig};
use portal_core::error::AppError;
use portal_core::events::StorageEvent;
use portal_core::result::AppResult;
use portal_core::traits::KeyValueStorage;

use crate::disabled::DisabledStorage;

/// Storage manager that wraps the configured key-value backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StorageManager {
    /// The inner backend.
    inner: Arc<dyn KeyValueStorage>,
}

impl StorageManager {
    /// Create a new storage manager from configuration.
    pub fn new(config: &StorageConfig) -> AppResult<Self> {
        let inner: Arc<dyn KeyValueStorage> = match config.backend {
            #[cfg(feature = "memory")]
            StorageBackendKind::Memory => {
                info!("Initializing in-memory credential storage");
                Arc::new(crate::memory::MemoryStorage::new(config.event_buffer))
            }
            #[cfg(feature = "file")]
            StorageBackendKind::File => {
                info!(path = %config.path, "Initializing file credential storage");
                Arc::new(crate::file::FileStorage::new(
                    &config.path,
                    config.event_buffer,
                ))
            }
            StorageBackendKind::Disabled => {
                info!("Credential storage disabled by configuration");
                Arc::new(DisabledStorage::new())
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(AppError::configuration(format!(
                    "Storage backend '{other}' is not compiled in"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a storage manager from an existing backend (for testing).
    pub fn from_backend(backend: Arc<dyn KeyValueStorage>) -> Self {
        Self { inner: backend }
    }

    /// Shared handle to the inner backend.
    pub fn backend(&self) -> Arc<dyn KeyValueStorage> {
        Arc::clone(&self.inner)
    }
}

impl KeyValueStorage for StorageManager {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.inner.remove(key)
    }

    fn origin(&self) -> Uuid {
        self.inner.origin()
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.subscribe()
    }
}
