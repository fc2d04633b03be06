//! Session notices and invalidation reasons.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Role;

/// Why a reconciliation pass ended in the anonymous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    /// The persisted store cannot be used.
    #[error("credential storage is unavailable")]
    StorageUnavailable,
    /// The token is not a three-segment credential with a JSON payload.
    #[error("token is malformed")]
    Malformed,
    /// Neither the token nor storage yields a role.
    #[error("token carries no role")]
    MissingRole,
    /// A role is present but is not a member of the role enumeration.
    #[error("role is not recognized")]
    UnknownRole,
    /// The token's expiry has passed.
    #[error("token has expired")]
    Expired,
    /// A role was persisted without a token.
    #[error("role persisted without a token")]
    OrphanRole,
    /// The user signed out.
    #[error("signed out")]
    SignedOut,
}

/// Transient, user-facing session notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionNotice {
    /// A session became authenticated.
    SignedIn {
        /// Role of the new session.
        role: Role,
    },
    /// An authenticated session ended by explicit sign-out, here or in
    /// another window.
    SignedOut,
    /// An authenticated session ended because its token expired.
    Expired,
    /// An authenticated session ended because its credential became invalid.
    Invalidated {
        /// What was wrong with the credential.
        reason: InvalidationReason,
    },
}

impl SessionNotice {
    /// Builds the notice for leaving an authenticated session.
    pub fn for_reason(reason: InvalidationReason) -> Self {
        match reason {
            InvalidationReason::Expired => Self::Expired,
            InvalidationReason::SignedOut => Self::SignedOut,
            other => Self::Invalidated { reason: other },
        }
    }

    /// Short message suitable for a toast.
    pub fn message(&self) -> String {
        match self {
            Self::SignedIn { role } => format!("Signed in as {role}"),
            Self::SignedOut => "Logged out".to_string(),
            Self::Expired => "Session expired, please sign in again".to_string(),
            Self::Invalidated { reason } => format!("Signed out: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_for_reason() {
        assert_eq!(
            SessionNotice::for_reason(InvalidationReason::Expired),
            SessionNotice::Expired
        );
        assert_eq!(
            SessionNotice::for_reason(InvalidationReason::Malformed),
            SessionNotice::Invalidated {
                reason: InvalidationReason::Malformed
            }
        );
    }

    #[test]
    fn test_notice_serializes_tagged() {
        let json = serde_json::to_value(SessionNotice::SignedIn { role: Role::Admin }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "signed_in", "role": "admin"}));
    }
}
