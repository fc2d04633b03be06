//! Route-to-role table configuration.

use serde::{Deserialize, Serialize};

use crate::types::Role;

/// Routing table consumed by the route guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Where unauthenticated visitors are sent.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Where authenticated visitors without the required role are sent.
    #[serde(default = "default_home_path")]
    pub home_path: String,
    /// Protected route prefixes and the roles allowed on each.
    #[serde(default = "default_rules")]
    pub rules: Vec<RouteRule>,
    /// Landing dashboard per role.
    #[serde(default)]
    pub dashboards: DashboardPaths,
}

/// One protected route prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Path prefix, matched on whole segments (`/admin` covers `/admin/users`).
    pub prefix: String,
    /// Roles allowed under the prefix.
    pub roles: Vec<Role>,
}

/// Landing dashboard path for each role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardPaths {
    /// Student dashboard.
    #[serde(default = "default_student_path")]
    pub student: String,
    /// Faculty dashboard.
    #[serde(default = "default_faculty_path")]
    pub faculty: String,
    /// Admin dashboard.
    #[serde(default = "default_admin_path")]
    pub admin: String,
}

impl DashboardPaths {
    /// Returns the dashboard path configured for a role.
    pub fn for_role(&self, role: Role) -> &str {
        match role {
            Role::Student => &self.student,
            Role::Faculty => &self.faculty,
            Role::Admin => &self.admin,
        }
    }
}

impl Default for DashboardPaths {
    fn default() -> Self {
        Self {
            student: default_student_path(),
            faculty: default_faculty_path(),
            admin: default_admin_path(),
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            home_path: default_home_path(),
            rules: default_rules(),
            dashboards: DashboardPaths::default(),
        }
    }
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_home_path() -> String {
    "/".to_string()
}

fn default_student_path() -> String {
    "/student".to_string()
}

fn default_faculty_path() -> String {
    "/faculty".to_string()
}

fn default_admin_path() -> String {
    "/admin".to_string()
}

fn default_rules() -> Vec<RouteRule> {
    Role::ALL
        .iter()
        .map(|role| RouteRule {
            prefix: format!("/{}", role.as_str()),
            roles: vec![*role],
        })
        .collect()
}
