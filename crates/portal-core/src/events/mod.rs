//! Events emitted by the storage layer and the session monitor.
//!
//! Storage events model the platform's cross-window change notification;
//! session notices are the transient, user-facing messages ("session
//! expired", "logged out") that UI regions may surface.

pub mod session;
pub mod storage;

pub use session::{InvalidationReason, SessionNotice};
pub use storage::StorageEvent;
