//! Route-to-role lookup.

use portal_core::config::{DashboardPaths, RouteRule, RoutesConfig};
use portal_core::types::Role;

/// Resolved routing table.
///
/// Rules are kept longest-prefix first so the most specific rule wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    login_path: String,
    home_path: String,
    rules: Vec<RouteRule>,
    dashboards: DashboardPaths,
}

impl RouteTable {
    /// Builds the table from configuration.
    pub fn from_config(config: &RoutesConfig) -> Self {
        let mut rules: Vec<RouteRule> = config
            .rules
            .iter()
            .map(|rule| RouteRule {
                prefix: normalize(&rule.prefix).to_string(),
                roles: rule.roles.clone(),
            })
            .collect();
        rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        Self {
            login_path: config.login_path.clone(),
            home_path: config.home_path.clone(),
            rules,
            dashboards: config.dashboards.clone(),
        }
    }

    /// Roles allowed on `path`, or `None` when the path is public.
    pub fn required_roles(&self, path: &str) -> Option<&[Role]> {
        let path = normalize(path);
        self.rules
            .iter()
            .find(|rule| covers(&rule.prefix, path))
            .map(|rule| rule.roles.as_slice())
    }

    /// Landing dashboard for a role.
    pub fn landing_for(&self, role: Role) -> &str {
        self.dashboards.for_role(role)
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Rules in match order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::from_config(&RoutesConfig::default())
    }
}

/// Strips query, fragment, and trailing slashes. The root stays `/`.
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Whole-segment prefix match: `/admin` covers `/admin/users` but not `/administer`.
fn covers(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let table = RouteTable::default();
        assert_eq!(table.required_roles("/admin"), Some(&[Role::Admin][..]));
        assert_eq!(
            table.required_roles("/student/courses/42"),
            Some(&[Role::Student][..])
        );
        assert_eq!(table.required_roles("/"), None);
        assert_eq!(table.required_roles("/login"), None);
    }

    #[test]
    fn test_segment_boundaries() {
        let table = RouteTable::default();
        assert_eq!(table.required_roles("/administer"), None);
        assert_eq!(table.required_roles("/admin/"), Some(&[Role::Admin][..]));
        assert_eq!(
            table.required_roles("/faculty?tab=grades#top"),
            Some(&[Role::Faculty][..])
        );
    }

    #[test]
    fn test_longest_prefix_wins() {
        let config = RoutesConfig {
            rules: vec![
                RouteRule {
                    prefix: "/courses".into(),
                    roles: vec![Role::Student, Role::Faculty, Role::Admin],
                },
                RouteRule {
                    prefix: "/courses/grading/".into(),
                    roles: vec![Role::Faculty],
                },
            ],
            ..RoutesConfig::default()
        };
        let table = RouteTable::from_config(&config);
        assert_eq!(
            table.required_roles("/courses/grading/7"),
            Some(&[Role::Faculty][..])
        );
        assert_eq!(table.required_roles("/courses/7").map(<[Role]>::len), Some(3));
    }

    #[test]
    fn test_landing_pages() {
        let table = RouteTable::default();
        assert_eq!(table.landing_for(Role::Faculty), "/faculty");
        assert_eq!(table.login_path(), "/login");
        assert_eq!(table.home_path(), "/");
    }
}
