//! Route guard: which roles a route needs, and where to send visitors who
//! do not qualify.

pub mod enforcer;
pub mod table;

pub use enforcer::{Denial, GuardDecision, RouteGuard};
pub use table::RouteTable;
