//! # portal-storage
//!
//! Persisted key-value storage for the campus portal session subsystem.
//! Supports three backends:
//!
//! - **memory**: an in-process storage area shared by any number of tab
//!   handles, with cross-tab change notification
//! - **file**: a JSON object on disk that survives restarts
//! - **disabled**: storage blocked by policy; every call fails
//!
//! The backend is selected at runtime based on configuration. Session code
//! never touches a backend directly; it goes through [`CredentialStore`].

pub mod credential;
pub mod disabled;
#[cfg(feature = "file")]
pub mod file;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use credential::{Credential, CredentialStore};
pub use keys::CredentialKeys;
pub use provider::StorageManager;
