//! HMAC-signed token creation for development and test fixtures.
//!
//! Production tokens are issued by the backend; this encoder only produces
//! tokens with the same payload shape so that sessions can be exercised
//! locally.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;

use portal_core::error::AppError;
use portal_core::result::AppResult;

/// Creates signed tokens carrying `exp` and `user.role`.
#[derive(Clone)]
pub struct TokenEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for TokenEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEncoder").finish()
    }
}

impl TokenEncoder {
    /// Creates an encoder signing with the given HMAC secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a token for `subject_id` with the given role and expiry.
    ///
    /// The role is written verbatim so that fixtures can carry roles the
    /// portal does not recognize.
    pub fn issue(
        &self,
        subject_id: &str,
        role: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let claims = json!({
            "iat": Utc::now().timestamp(),
            "exp": expires_at.timestamp(),
            "user": {
                "_id": subject_id,
                "role": role,
            },
        });
        self.sign(&claims)
    }

    /// Issues a token valid for `ttl` from now.
    pub fn issue_for(&self, subject_id: &str, role: &str, ttl: Duration) -> AppResult<String> {
        self.issue(subject_id, role, Utc::now() + ttl)
    }

    /// Signs an arbitrary payload, for shapes the backend might send by
    /// mistake (no role, no expiry).
    pub fn sign(&self, claims: &serde_json::Value) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }
}
