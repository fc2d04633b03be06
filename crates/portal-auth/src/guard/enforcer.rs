//! Navigation guard: allow, or redirect with the reason.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use portal_core::config::AppConfig;
use portal_core::types::Role;

use crate::session::{SessionMonitor, SessionState, Trigger};

use super::table::RouteTable;

/// Why a navigation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Denial {
    /// No valid session.
    Unauthenticated,
    /// A valid session whose role is not allowed on the route.
    RoleMismatch { role: Role },
}

/// Outcome of a guarded navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Render the route.
    Allow,
    /// Replace the navigation with `path`.
    RedirectTo { path: String, denial: Denial },
}

impl GuardDecision {
    /// Whether the navigation may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Redirect target, if any.
    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::RedirectTo { path, .. } => Some(path),
        }
    }
}

/// Gates navigation on the session state.
///
/// The guard never reads the credential store itself. When it needs fresh
/// state it asks the monitor to reconcile, then decides from the published
/// state.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    monitor: Arc<SessionMonitor>,
    table: RouteTable,
    revalidate_on_navigate: bool,
}

impl RouteGuard {
    /// Creates a guard over `monitor` using `table`.
    pub fn new(monitor: Arc<SessionMonitor>, table: RouteTable, revalidate_on_navigate: bool) -> Self {
        Self {
            monitor,
            table,
            revalidate_on_navigate,
        }
    }

    /// Creates a guard from the routes and session configuration.
    pub fn from_config(monitor: Arc<SessionMonitor>, config: &AppConfig) -> Self {
        Self::new(
            monitor,
            RouteTable::from_config(&config.routes),
            config.session.revalidate_on_navigate,
        )
    }

    /// The route table decisions are made against.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decides a navigation to a route that admits `allowed_roles`.
    ///
    /// Reconciles first when configured to, and always while the state is
    /// still [`SessionState::Unknown`], so a decision is never made from an
    /// unreconciled state. A pass already running in another thread is
    /// waited for rather than joined.
    pub fn authorize(&self, allowed_roles: &[Role]) -> GuardDecision {
        let state = self.current_state();
        let decision = match state {
            SessionState::Authenticated(role) if allowed_roles.contains(&role) => GuardDecision::Allow,
            SessionState::Authenticated(role) => GuardDecision::RedirectTo {
                path: self.table.home_path().to_string(),
                denial: Denial::RoleMismatch { role },
            },
            SessionState::Unknown | SessionState::Anonymous => GuardDecision::RedirectTo {
                path: self.table.login_path().to_string(),
                denial: Denial::Unauthenticated,
            },
        };
        debug!(state = %state, ?allowed_roles, ?decision, "Route guard decision");
        decision
    }

    /// Decides a navigation to `path` using the route table.
    ///
    /// Paths with no matching rule are public and always allowed.
    pub fn authorize_path(&self, path: &str) -> GuardDecision {
        match self.table.required_roles(path) {
            Some(roles) => self.authorize(roles),
            None => GuardDecision::Allow,
        }
    }

    fn current_state(&self) -> SessionState {
        if self.revalidate_on_navigate || self.monitor.state() == SessionState::Unknown {
            return self.monitor.reconcile_now(Trigger::Navigation).state;
        }
        self.monitor.state()
    }
}
