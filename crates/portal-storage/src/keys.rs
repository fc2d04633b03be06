//! Storage key names for the persisted credential.
//!
//! Centralising the key names keeps the credential store, the cross-tab
//! listener and the console in agreement about which keys matter.

use portal_core::config::StorageConfig;

/// Default key holding the signed token.
pub const TOKEN_KEY: &str = "token";

/// Default key holding the role label.
pub const ROLE_KEY: &str = "role";

/// The two storage keys that make up a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialKeys {
    /// Key of the signed token.
    pub token: String,
    /// Key of the role label.
    pub role: String,
}

impl CredentialKeys {
    /// Builds key names from storage configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            token: config.token_key.clone(),
            role: config.role_key.clone(),
        }
    }

    /// Keys whose changes should trigger a reconciliation.
    pub fn watched(&self) -> [&str; 2] {
        [self.token.as_str(), self.role.as_str()]
    }
}

impl Default for CredentialKeys {
    fn default() -> Self {
        Self {
            token: TOKEN_KEY.to_string(),
            role: ROLE_KEY.to_string(),
        }
    }
}
