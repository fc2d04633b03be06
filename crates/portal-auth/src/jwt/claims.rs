//! Claims extracted from a signed credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portal_core::types::Role;

use super::decoder::DecodeError;

/// A structurally valid payload whose role claim may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Expiration timestamp (seconds since epoch).
    pub expires_at: i64,
    /// String found at `user.role`, if any.
    pub role: Option<String>,
    /// Identifier of the signed-in user, when the payload carries one.
    pub subject_id: Option<String>,
}

impl TokenPayload {
    /// Whether the token is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }

    /// Converts into full claims, failing when the role claim is missing.
    pub fn into_claims(self) -> Result<DecodedClaims, DecodeError> {
        let role = self.role.ok_or(DecodeError::MissingRole)?;
        Ok(DecodedClaims {
            expires_at: self.expires_at,
            role,
            subject_id: self.subject_id,
        })
    }
}

/// The parts of a token payload the session subsystem uses.
///
/// Derived on every reconciliation pass and never cached beyond it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedClaims {
    /// Expiration timestamp (seconds since epoch).
    pub expires_at: i64,
    /// Role claimed at `user.role`, not yet checked against [`Role`].
    pub role: String,
    /// Identifier of the signed-in user, when the payload carries one.
    pub subject_id: Option<String>,
}

impl DecodedClaims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }

    /// Whether the token is expired at `now`. A token whose expiry equals
    /// `now` is already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }

    /// Remaining lifetime in seconds at `now` (0 if expired).
    pub fn remaining_seconds_at(&self, now: DateTime<Utc>) -> u64 {
        let remaining = self.expires_at - now.timestamp();
        if remaining > 0 { remaining as u64 } else { 0 }
    }

    /// The claimed role, if it is a member of the role enumeration.
    pub fn claimed_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}
