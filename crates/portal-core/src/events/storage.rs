//! Storage change notifications.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A mutation of the persisted key-value store.
///
/// Every handle onto a shared storage area carries an origin id; a handle
/// only reacts to events whose origin differs from its own, the same way a
/// browser delivers `storage` events to every window except the writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    /// The key that changed, or `None` when the whole area was cleared.
    pub key: Option<String>,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change (`None` for removals).
    pub new_value: Option<String>,
    /// Handle that performed the write.
    pub origin: Uuid,
}

impl StorageEvent {
    /// Returns whether this event concerns any of the watched keys.
    ///
    /// A whole-area clear touches every key.
    pub fn touches(&self, keys: &[&str]) -> bool {
        match &self.key {
            Some(key) => keys.contains(&key.as_str()),
            None => true,
        }
    }
}
