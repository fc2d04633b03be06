//! Key-value storage trait for pluggable persistence backends.

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::events::StorageEvent;
use crate::result::AppResult;

/// A synchronous string key-value store, modelled on browser local storage.
///
/// Calls are synchronous because reconciliation and navigation checks must
/// complete without awaiting. Any call may fail with
/// [`ErrorKind::Storage`](crate::error::ErrorKind::Storage) when the backend
/// is unusable.
pub trait KeyValueStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value.
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> AppResult<()>;

    /// Identity of this handle, stamped on every event it causes.
    fn origin(&self) -> Uuid;

    /// Subscribe to change notifications for the underlying area.
    ///
    /// The stream includes this handle's own writes; consumers filter by
    /// [`origin`](Self::origin).
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}
