//! Session state: reconciliation, triggers, and consumers.

pub mod driver;
pub mod monitor;
pub mod reconcile;
pub mod state;
pub mod subscriber;

pub use driver::{SessionDriver, SessionHandle};
pub use monitor::{Reconciliation, SessionMonitor, Trigger};
pub use reconcile::{Plan, StoreRepair, plan};
pub use state::{SessionSnapshot, SessionState};
pub use subscriber::SessionSubscriber;
