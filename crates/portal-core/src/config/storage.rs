//! Credential storage configuration.

use serde::{Deserialize, Serialize};

/// Which key-value backend holds the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackendKind {
    /// In-process storage area shared between tabs.
    Memory,
    /// JSON file on disk.
    File,
    /// Storage disabled by policy; every access fails.
    Disabled,
}

impl Default for StorageBackendKind {
    fn default() -> Self {
        Self::Memory
    }
}

impl std::fmt::Display for StorageBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendKind::Memory => write!(f, "memory"),
            StorageBackendKind::File => write!(f, "file"),
            StorageBackendKind::Disabled => write!(f, "disabled"),
        }
    }
}

/// Credential storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend.
    #[serde(default)]
    pub backend: StorageBackendKind,
    /// Path of the JSON file used by the `file` backend.
    #[serde(default = "default_path")]
    pub path: String,
    /// Storage key holding the signed token.
    #[serde(default = "default_token_key")]
    pub token_key: String,
    /// Storage key holding the role label.
    #[serde(default = "default_role_key")]
    pub role_key: String,
    /// Capacity of the storage change broadcast channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            path: default_path(),
            token_key: default_token_key(),
            role_key: default_role_key(),
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_path() -> String {
    "data/session.json".to_string()
}

fn default_token_key() -> String {
    "token".to_string()
}

fn default_role_key() -> String {
    "role".to_string()
}

fn default_event_buffer() -> usize {
    64
}
