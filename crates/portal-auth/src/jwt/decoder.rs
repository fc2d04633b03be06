//! Local decoding of signed credentials.
//!
//! The signature is never checked here. The backend re-validates the token
//! on every protected API call; the client only needs the expiry and the
//! role to decide what to show.

use jsonwebtoken::dangerous::insecure_decode;
use serde_json::Value;
use thiserror::Error;

use super::claims::{DecodedClaims, TokenPayload};

/// Why a token could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Not three segments, bad base64, non-JSON payload, or no usable expiry.
    #[error("malformed token: {0}")]
    Malformed(String),
    /// The payload has no string at `user.role`.
    #[error("token payload has no role claim at user.role")]
    MissingRole,
}

/// Parses a `header.payload.signature` credential into [`DecodedClaims`].
///
/// Expected payload shape (owned by the issuing backend):
///
/// ```json
/// { "exp": 1700000000, "user": { "_id": "...", "role": "student" } }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCodec;

impl TokenCodec {
    /// Creates a codec.
    pub fn new() -> Self {
        Self
    }

    /// Decodes a token without verifying its signature.
    pub fn decode(&self, token: &str) -> Result<DecodedClaims, DecodeError> {
        self.inspect(token)?.into_claims()
    }

    /// Parses the payload without requiring a role claim.
    ///
    /// Only [`DecodeError::Malformed`] is returned from here; callers that
    /// have another source for the role use this to still learn the expiry.
    pub fn inspect(&self, token: &str) -> Result<TokenPayload, DecodeError> {
        let token = token.trim();
        if token.split('.').count() != 3 {
            return Err(DecodeError::Malformed(
                "expected header.payload.signature".to_string(),
            ));
        }

        let payload = insecure_decode::<Value>(token)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?
            .claims;
        if !payload.is_object() {
            return Err(DecodeError::Malformed(
                "payload is not a JSON object".to_string(),
            ));
        }

        let expires_at = payload
            .get("exp")
            .and_then(|exp| exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64)))
            .ok_or_else(|| DecodeError::Malformed("missing numeric exp claim".to_string()))?;

        let user = payload.get("user");
        let role = user
            .and_then(|u| u.get("role"))
            .and_then(Value::as_str)
            .map(String::from);

        let subject_id = user
            .and_then(|u| u.get("_id").or_else(|| u.get("id")))
            .or_else(|| payload.get("sub"))
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        Ok(TokenPayload {
            expires_at,
            role,
            subject_id,
        })
    }
}
