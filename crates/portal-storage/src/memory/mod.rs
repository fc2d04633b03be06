//! In-memory storage areas with cross-tab notification.

pub mod store;

pub use store::{MemoryStorage, StorageArea};
