//! # portal-core
//!
//! Core crate for the campus portal session subsystem. Contains the
//! configuration schema, the closed role enumeration, session and storage
//! events, the storage and clock traits, and the unified error system.
//!
//! This crate has **no** internal dependencies on other portal crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
pub use types::Role;
