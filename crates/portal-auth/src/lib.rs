//! # portal-auth
//!
//! Client-side session and authorization state for the campus portal.
//!
//! ## Modules
//!
//! - `jwt`: local, unverified decoding of the signed credential, plus a
//!   development encoder for fixtures
//! - `session`: the session monitor state machine, its reconciliation
//!   triggers, and the subscriber handle consumers read from
//! - `guard`: the route table and the synchronous navigation guard
//!
//! Data flows one way: credential store → token codec → session monitor →
//! (route guard, subscribers). The monitor is the only component that
//! repairs or clears the credential store.

pub mod guard;
pub mod jwt;
pub mod session;

pub use guard::{Denial, GuardDecision, RouteGuard, RouteTable};
pub use jwt::{DecodeError, DecodedClaims, TokenCodec, TokenEncoder};
pub use session::{SessionDriver, SessionHandle, SessionMonitor, SessionState, SessionSubscriber};
