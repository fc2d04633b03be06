//! Integration tests for sign-in, repair, and expiry through the monitor.

mod helpers;

use std::sync::Arc;

use chrono::Duration;

use portal_auth::SessionState;
use portal_auth::session::Trigger;
use portal_core::events::{InvalidationReason, SessionNotice};
use portal_core::types::Role;
use portal_storage::disabled::DisabledStorage;
use portal_storage::{CredentialKeys, CredentialStore};

use helpers::TestBrowser;

#[test]
fn test_sign_in_persists_both_fields() {
    let browser = TestBrowser::new();
    let tab = browser.open_tab();
    tab.monitor.reconcile(Trigger::Mount);

    let token = browser.token("student");
    assert_eq!(tab.monitor.sign_in(&token, Some(Role::Student)), Ok(Role::Student));
    assert_eq!(
        tab.stored(),
        (Some(token), Some("student".to_string()))
    );
    assert_eq!(tab.monitor.state(), SessionState::Authenticated(Role::Student));
}

#[test]
fn test_sign_in_without_role_recovers_it_from_claims() {
    let browser = TestBrowser::new();
    let tab = browser.open_tab();

    let role = tab.monitor.sign_in(&browser.token("faculty"), None).unwrap();
    assert_eq!(role, Role::Faculty);
    assert_eq!(tab.stored().1, Some("faculty".to_string()));
}

#[test]
fn test_orphan_role_is_removed_on_mount() {
    let browser = TestBrowser::new();
    browser.seed(None, Some("admin"));
    let tab = browser.open_tab();

    let outcome = tab.monitor.reconcile(Trigger::Mount).unwrap();
    assert_eq!(outcome.state, SessionState::Anonymous);
    assert_eq!(outcome.reason, Some(InvalidationReason::OrphanRole));
    assert_eq!(tab.stored(), (None, None));
}

#[test]
fn test_persisted_role_overrides_claim() {
    let browser = TestBrowser::new();
    browser.seed(Some(&browser.token("student")), Some("admin"));
    let tab = browser.open_tab();

    tab.monitor.reconcile(Trigger::Mount);
    assert_eq!(tab.monitor.state(), SessionState::Authenticated(Role::Admin));
    assert_eq!(tab.stored().1, Some("admin".to_string()));
}

#[test]
fn test_unknown_roles_everywhere_clear_the_session() {
    let browser = TestBrowser::new();
    browser.seed(Some(&browser.token("registrar")), Some("superuser"));
    let tab = browser.open_tab();

    tab.monitor.reconcile(Trigger::Mount);
    assert_eq!(tab.monitor.state(), SessionState::Anonymous);
    assert_eq!(tab.monitor.last_invalidation(), Some(InvalidationReason::UnknownRole));
    assert_eq!(tab.stored(), (None, None));
}

#[test]
fn test_missing_role_claim_falls_back_to_persisted_role() {
    let browser = TestBrowser::new();
    browser.seed(Some(&browser.token_without_role()), Some("student"));
    let tab = browser.open_tab();

    tab.monitor.reconcile(Trigger::Mount);
    assert_eq!(tab.monitor.state(), SessionState::Authenticated(Role::Student));
}

#[test]
fn test_malformed_token_is_cleared() {
    let browser = TestBrowser::new();
    browser.seed(Some("abc.def"), Some("admin"));
    let tab = browser.open_tab();

    tab.monitor.reconcile(Trigger::Mount);
    assert_eq!(tab.monitor.state(), SessionState::Anonymous);
    assert_eq!(tab.monitor.last_invalidation(), Some(InvalidationReason::Malformed));
    assert_eq!(tab.stored(), (None, None));
}

#[test]
fn test_expiry_is_detected_on_next_pass() {
    let browser = TestBrowser::new();
    let tab = browser.open_tab();
    tab.monitor.reconcile(Trigger::Mount);
    let mut notices = tab.monitor.notices();

    let token = browser.token_expiring("admin", browser.now() + Duration::seconds(30));
    tab.monitor.sign_in(&token, Some(Role::Admin)).unwrap();
    assert_eq!(
        notices.try_recv().unwrap(),
        SessionNotice::SignedIn { role: Role::Admin }
    );

    browser.clock.advance(Duration::seconds(30));
    tab.monitor.reconcile(Trigger::Timer);

    assert_eq!(tab.monitor.state(), SessionState::Anonymous);
    assert_eq!(notices.try_recv().unwrap(), SessionNotice::Expired);
    assert_eq!(tab.stored(), (None, None));
}

#[test]
fn test_restoring_an_expired_session_is_silent() {
    let browser = TestBrowser::new();
    browser.seed(
        Some(&browser.token_expiring("student", browser.now() - Duration::minutes(5))),
        Some("student"),
    );
    let tab = browser.open_tab();
    let mut notices = tab.monitor.notices();

    tab.monitor.reconcile(Trigger::Mount);
    assert_eq!(tab.monitor.state(), SessionState::Anonymous);
    assert!(notices.try_recv().is_err());
}

#[test]
fn test_every_pass_leaves_storage_consistent() {
    let browser = TestBrowser::new();
    let valid = browser.token("faculty");
    let expired = browser.token_expiring("faculty", browser.now() - Duration::seconds(1));
    let roleless = browser.token_without_role();

    let cases: Vec<(Option<&str>, Option<&str>)> = vec![
        (None, None),
        (None, Some("faculty")),
        (Some(&valid), None),
        (Some(&valid), Some("faculty")),
        (Some(&valid), Some("bogus")),
        (Some(&expired), Some("faculty")),
        (Some(&roleless), None),
        (Some("x.y.z"), Some("admin")),
    ];

    for (token, role) in cases {
        let area_browser = TestBrowser::new();
        area_browser.seed(token, role);
        let tab = area_browser.open_tab();
        tab.monitor.reconcile(Trigger::Mount);

        let (stored_token, stored_role) = tab.stored();
        assert_eq!(
            stored_token.is_some(),
            stored_role.is_some(),
            "inconsistent storage after {token:?}/{role:?}"
        );
        assert_eq!(
            tab.monitor.state().is_authenticated(),
            stored_token.is_some(),
            "state disagrees with storage after {token:?}/{role:?}"
        );
    }
}

#[test]
fn test_unavailable_storage_is_anonymous() {
    let store = CredentialStore::new(Arc::new(DisabledStorage::new()), CredentialKeys::default());
    let monitor = portal_auth::SessionMonitor::new(
        store,
        Arc::new(portal_core::traits::SystemClock),
        4,
    );

    monitor.reconcile(Trigger::Mount);
    assert_eq!(monitor.state(), SessionState::Anonymous);
    assert_eq!(
        monitor.sign_in("a.b.c", Some(Role::Admin)),
        Err(InvalidationReason::StorageUnavailable)
    );
}
