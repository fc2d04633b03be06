//! Authoritative session state shared with every consumer.

use serde::{Deserialize, Serialize};

use portal_core::types::Role;

/// Result of the most recent complete reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "role", rename_all = "snake_case")]
pub enum SessionState {
    /// No reconciliation has run yet.
    Unknown,
    /// No valid credential.
    Anonymous,
    /// A valid, unexpired credential with a recognized role.
    Authenticated(Role),
}

impl SessionState {
    /// Whether the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The session role, if authenticated.
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Authenticated(role) => Some(*role),
            _ => None,
        }
    }

    /// Flattened `{authenticated, role}` view.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            authenticated: self.is_authenticated(),
            role: self.role(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Anonymous => write!(f, "anonymous"),
            Self::Authenticated(role) => write!(f, "authenticated({role})"),
        }
    }
}

/// The `{authenticated, role}` pair UI regions render from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Whether a valid session exists.
    pub authenticated: bool,
    /// Role of the session, when authenticated.
    pub role: Option<Role>,
}
