//! The reconciliation decision: from a stored credential to a session state.
//!
//! This module only decides. Applying the repair to storage and publishing
//! the state is the monitor's job, so that the decision can be checked
//! without any storage at all.

use chrono::{DateTime, Utc};
use tracing::debug;

use portal_core::events::InvalidationReason;
use portal_core::types::Role;
use portal_storage::Credential;

use crate::jwt::TokenCodec;

use super::state::SessionState;

/// Storage change needed to restore the credential invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRepair {
    /// Storage is already consistent.
    Nothing,
    /// Backfill the role recovered from the token's claims.
    WriteRole(Role),
    /// Drop a role that has no token.
    ClearRole,
    /// Drop both fields.
    ClearAll,
}

/// Outcome of one reconciliation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    /// State to publish once the repair is applied.
    pub state: SessionState,
    /// Why the state is anonymous, when it is because of a bad credential.
    pub reason: Option<InvalidationReason>,
    /// Storage repair to apply first.
    pub repair: StoreRepair,
}

impl Plan {
    fn authenticated(role: Role, repair: StoreRepair) -> Self {
        Self {
            state: SessionState::Authenticated(role),
            reason: None,
            repair,
        }
    }

    fn anonymous(reason: Option<InvalidationReason>, repair: StoreRepair) -> Self {
        Self {
            state: SessionState::Anonymous,
            reason,
            repair,
        }
    }

    /// Plan used when the store cannot be read at all.
    pub fn storage_unavailable() -> Self {
        Self::anonymous(
            Some(InvalidationReason::StorageUnavailable),
            StoreRepair::Nothing,
        )
    }
}

/// Decides the session state for `credential` at `now`.
///
/// A persisted role that is a member of [`Role`] wins over the token's
/// claim; the claim is only used, and then written back, when no usable
/// role is persisted.
pub fn plan(credential: &Credential, codec: &TokenCodec, now: DateTime<Utc>) -> Plan {
    let token = match (&credential.token, &credential.role) {
        (None, None) => return Plan::anonymous(None, StoreRepair::Nothing),
        (None, Some(_)) => {
            return Plan::anonymous(
                Some(InvalidationReason::OrphanRole),
                StoreRepair::ClearRole,
            );
        }
        (Some(token), _) => token,
    };

    let payload = match codec.inspect(token) {
        Ok(payload) => payload,
        Err(e) => {
            debug!(error = %e, "Stored token does not decode");
            return Plan::anonymous(Some(InvalidationReason::Malformed), StoreRepair::ClearAll);
        }
    };

    if payload.is_expired_at(now) {
        return Plan::anonymous(Some(InvalidationReason::Expired), StoreRepair::ClearAll);
    }

    let persisted_role = credential.role.as_deref().and_then(Role::parse);
    let claimed_role = payload.role.as_deref().and_then(Role::parse);

    match (persisted_role, claimed_role) {
        (Some(role), _) => Plan::authenticated(role, StoreRepair::Nothing),
        (None, Some(role)) => Plan::authenticated(role, StoreRepair::WriteRole(role)),
        (None, None) => {
            let reason = if credential.role.is_none() && payload.role.is_none() {
                InvalidationReason::MissingRole
            } else {
                InvalidationReason::UnknownRole
            };
            Plan::anonymous(Some(reason), StoreRepair::ClearAll)
        }
    }
}
