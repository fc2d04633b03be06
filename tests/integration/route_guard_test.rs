//! Integration tests for guarded navigation.

mod helpers;

use chrono::Duration;

use portal_auth::{Denial, GuardDecision, RouteGuard, RouteTable, SessionState};
use portal_core::config::AppConfig;
use portal_core::types::Role;

use helpers::{TestBrowser, TestTab};

fn guard(tab: &TestTab) -> RouteGuard {
    RouteGuard::from_config(tab.monitor.clone(), &AppConfig::default())
}

#[test]
fn test_admin_route_without_token_goes_to_login() {
    let browser = TestBrowser::new();
    let tab = browser.open_tab();

    assert_eq!(
        guard(&tab).authorize_path("/admin"),
        GuardDecision::RedirectTo {
            path: "/login".to_string(),
            denial: Denial::Unauthenticated,
        }
    );
}

#[test]
fn test_student_on_admin_route_goes_home() {
    let browser = TestBrowser::new();
    browser.seed(Some(&browser.token("student")), Some("student"));
    let tab = browser.open_tab();

    assert_eq!(
        guard(&tab).authorize(&[Role::Admin]),
        GuardDecision::RedirectTo {
            path: "/".to_string(),
            denial: Denial::RoleMismatch {
                role: Role::Student
            },
        }
    );
}

#[test]
fn test_admin_on_admin_route_is_allowed() {
    let browser = TestBrowser::new();
    browser.seed(Some(&browser.token("admin")), Some("admin"));
    let tab = browser.open_tab();

    assert_eq!(guard(&tab).authorize_path("/admin/reports"), GuardDecision::Allow);
}

#[test]
fn test_guard_reflects_role_backfill() {
    let browser = TestBrowser::new();
    browser.seed(Some(&browser.token("faculty")), None);
    let tab = browser.open_tab();

    assert!(guard(&tab).authorize_path("/faculty").is_allowed());
    assert_eq!(tab.stored().1, Some("faculty".to_string()));
}

#[test]
fn test_expired_session_is_sent_to_login_on_navigation() {
    let browser = TestBrowser::new();
    browser.seed(Some(&browser.token("student")), Some("student"));
    let tab = browser.open_tab();
    let guard = guard(&tab);
    assert!(guard.authorize_path("/student").is_allowed());

    browser.clock.advance(Duration::hours(1));
    assert_eq!(guard.authorize_path("/student").redirect_path(), Some("/login"));
    assert_eq!(tab.monitor.state(), SessionState::Anonymous);
}

#[test]
fn test_landing_pages_per_role() {
    let table = RouteTable::default();
    let browser = TestBrowser::new();
    let tab = browser.open_tab();
    let guard = guard(&tab);

    for role in Role::ALL {
        let landing = table.landing_for(role);
        assert_eq!(guard.table().required_roles(landing), Some(&[role][..]));
    }
}
