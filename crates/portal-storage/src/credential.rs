//! The persisted credential: a signed token and its role label.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;

use portal_core::error::AppError;
use portal_core::events::StorageEvent;
use portal_core::traits::KeyValueStorage;

use crate::keys::CredentialKeys;

/// The two independently-readable credential fields.
///
/// Both fields are raw strings; nothing here checks that the token parses or
/// that the role is a member of the role enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Opaque signed token, absent when logged out.
    pub token: Option<String>,
    /// Role label, absent when unknown.
    pub role: Option<String>,
}

impl Credential {
    /// A credential with both fields present.
    pub fn new(token: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            role: Some(role.into()),
        }
    }

    /// Whether both fields are absent.
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.role.is_none()
    }

    /// Whether the fields are both present or both absent.
    pub fn is_consistent(&self) -> bool {
        self.token.is_some() == self.role.is_some()
    }
}

/// Reads and writes the credential fields of a key-value backend.
///
/// The first failing access marks the store unavailable for the rest of its
/// lifetime: reads then return an empty [`Credential`] and writes do
/// nothing, so the session degrades to logged-out instead of failing.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    backend: Arc<dyn KeyValueStorage>,
    keys: CredentialKeys,
    unavailable: Arc<AtomicBool>,
}

impl CredentialStore {
    /// Wrap a backend using the given key names.
    pub fn new(backend: Arc<dyn KeyValueStorage>, keys: CredentialKeys) -> Self {
        Self {
            backend,
            keys,
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Key names in use.
    pub fn keys(&self) -> &CredentialKeys {
        &self.keys
    }

    /// Whether the backend is still usable.
    pub fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::Acquire)
    }

    /// Origin id of the underlying backend handle.
    pub fn origin(&self) -> Uuid {
        self.backend.origin()
    }

    /// Subscribe to the backend's change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.backend.subscribe()
    }

    /// Read both fields.
    pub fn read(&self) -> Credential {
        if !self.is_available() {
            return Credential::default();
        }
        let token = self.backend.get(&self.keys.token);
        let role = self.backend.get(&self.keys.role);
        match (token, role) {
            (Ok(token), Ok(role)) => Credential { token, role },
            (Err(e), _) | (_, Err(e)) => {
                self.mark_unavailable(&e);
                Credential::default()
            }
        }
    }

    /// Write both fields; an absent field is removed.
    pub fn write(&self, credential: &Credential) {
        self.put(&self.keys.token, credential.token.as_deref());
        self.put(&self.keys.role, credential.role.as_deref());
    }

    /// Set only the role field.
    pub fn write_role(&self, role: &str) {
        self.put(&self.keys.role, Some(role));
    }

    /// Remove only the role field.
    pub fn clear_role(&self) {
        self.put(&self.keys.role, None);
    }

    /// Remove both fields.
    pub fn clear(&self) {
        self.put(&self.keys.token, None);
        self.put(&self.keys.role, None);
    }

    fn put(&self, key: &str, value: Option<&str>) {
        if !self.is_available() {
            return;
        }
        let result = match value {
            Some(v) => self.backend.set(key, v),
            None => self.backend.remove(key),
        };
        if let Err(e) = result {
            self.mark_unavailable(&e);
        }
    }

    fn mark_unavailable(&self, error: &AppError) {
        if !self.unavailable.swap(true, Ordering::AcqRel) {
            warn!(error = %error, "Credential storage unavailable; continuing logged out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disabled::DisabledStorage;
    use crate::memory::MemoryStorage;

    fn memory_store() -> (CredentialStore, Arc<MemoryStorage>) {
        let backend = Arc::new(MemoryStorage::new(8));
        let store = CredentialStore::new(backend.clone(), CredentialKeys::default());
        (store, backend)
    }

    #[test]
    fn test_write_read_clear() {
        let (store, backend) = memory_store();
        store.write(&Credential::new("a.b.c", "student"));
        assert_eq!(store.read(), Credential::new("a.b.c", "student"));
        assert_eq!(backend.get("role").unwrap(), Some("student".to_string()));

        store.clear();
        assert!(store.read().is_empty());
    }

    #[test]
    fn test_field_level_operations() {
        let (store, backend) = memory_store();
        store.write(&Credential::new("a.b.c", "student"));
        backend.remove("token").unwrap();
        let credential = store.read();
        assert_eq!(credential.token, None);
        assert_eq!(credential.role.as_deref(), Some("student"));
        assert!(!credential.is_consistent());

        store.clear_role();
        store.write_role("admin");
        assert_eq!(store.read().role.as_deref(), Some("admin"));
    }

    #[test]
    fn test_disabled_backend_degrades_to_empty() {
        let store = CredentialStore::new(
            Arc::new(DisabledStorage::new()),
            CredentialKeys::default(),
        );
        assert!(store.is_available());
        store.write(&Credential::new("a.b.c", "admin"));
        assert!(!store.is_available());
        assert!(store.read().is_empty());
        store.clear();
    }

    #[test]
    fn test_unavailable_latch_is_shared_between_clones() {
        let store = CredentialStore::new(
            Arc::new(DisabledStorage::new()),
            CredentialKeys::default(),
        );
        let clone = store.clone();
        let _ = store.read();
        assert!(!clone.is_available());
    }

    #[test]
    fn test_custom_keys() {
        let backend = Arc::new(MemoryStorage::new(8));
        let keys = CredentialKeys {
            token: "auth.token".to_string(),
            role: "auth.role".to_string(),
        };
        let store = CredentialStore::new(backend.clone(), keys);
        store.write(&Credential::new("x.y.z", "faculty"));
        assert_eq!(backend.get("auth.role").unwrap(), Some("faculty".to_string()));
        assert_eq!(backend.get("role").unwrap(), None);
    }
}
