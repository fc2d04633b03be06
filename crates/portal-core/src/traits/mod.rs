//! Core traits shared across portal crates.

pub mod clock;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::KeyValueStorage;
