//! Integration tests for keeping several windows on one shared storage area
//! in agreement.

mod helpers;

use std::time::Duration;

use portal_auth::{SessionDriver, SessionState};
use portal_core::events::SessionNotice;
use portal_core::types::Role;

use helpers::{TestBrowser, wait_for_state};

// Long enough that only storage notifications can explain a change.
const QUIET_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn test_logout_in_one_tab_signs_out_the_other() {
    let browser = TestBrowser::new();
    browser.seed(Some(&browser.token("student")), Some("student"));

    let tab_a = browser.open_tab();
    let tab_b = browser.open_tab();
    let mut notices_a = tab_a.monitor.notices();
    let handle_a = SessionDriver::new(tab_a.monitor.clone(), QUIET_INTERVAL)
        .spawn()
        .unwrap();
    let handle_b = SessionDriver::new(tab_b.monitor.clone(), QUIET_INTERVAL)
        .spawn()
        .unwrap();
    assert_eq!(tab_a.monitor.state(), SessionState::Authenticated(Role::Student));

    let mut subscriber_a = handle_a.subscribe();
    tab_b.monitor.sign_out();

    wait_for_state(&mut subscriber_a, SessionState::Anonymous).await;
    assert_eq!(notices_a.recv().await.unwrap(), SessionNotice::SignedOut);
    assert_eq!(tab_a.stored(), (None, None));

    handle_a.shutdown().await;
    handle_b.shutdown().await;
}

#[tokio::test]
async fn test_login_in_one_tab_signs_in_the_other() {
    let browser = TestBrowser::new();
    let tab_a = browser.open_tab();
    let tab_b = browser.open_tab();
    let handle_a = SessionDriver::new(tab_a.monitor.clone(), QUIET_INTERVAL)
        .spawn()
        .unwrap();
    assert_eq!(tab_a.monitor.state(), SessionState::Anonymous);

    let mut subscriber_a = handle_a.subscribe();
    tab_b
        .monitor
        .sign_in(&browser.token("faculty"), Some(Role::Faculty))
        .unwrap();

    wait_for_state(&mut subscriber_a, SessionState::Authenticated(Role::Faculty)).await;
    handle_a.shutdown().await;
}

#[tokio::test]
async fn test_external_clear_is_noticed() {
    let browser = TestBrowser::new();
    browser.seed(Some(&browser.token("admin")), Some("admin"));
    let tab = browser.open_tab();
    let handle = SessionDriver::new(tab.monitor.clone(), QUIET_INTERVAL)
        .spawn()
        .unwrap();
    let mut subscriber = handle.subscribe();

    browser.area.open_tab().clear_all().unwrap();

    wait_for_state(&mut subscriber, SessionState::Anonymous).await;
    handle.shutdown().await;
}

#[tokio::test]
async fn test_external_orphan_role_is_repaired() {
    let browser = TestBrowser::new();
    let tab = browser.open_tab();
    let handle = SessionDriver::new(tab.monitor.clone(), QUIET_INTERVAL)
        .spawn()
        .unwrap();

    browser.seed(None, Some("admin"));
    tokio::time::timeout(Duration::from_secs(1), async {
        while tab.stored().1.is_some() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("orphan role should be removed");

    assert_eq!(tab.monitor.state(), SessionState::Anonymous);
    handle.shutdown().await;
}

#[tokio::test]
async fn test_role_change_elsewhere_switches_role() {
    let browser = TestBrowser::new();
    browser.seed(Some(&browser.token("student")), Some("student"));
    let tab = browser.open_tab();
    let handle = SessionDriver::new(tab.monitor.clone(), QUIET_INTERVAL)
        .spawn()
        .unwrap();
    let mut subscriber = handle.subscribe();

    browser.seed(None, Some("faculty"));

    wait_for_state(&mut subscriber, SessionState::Authenticated(Role::Faculty)).await;
    handle.shutdown().await;
}
