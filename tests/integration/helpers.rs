//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use portal_auth::{SessionMonitor, SessionState, SessionSubscriber, TokenEncoder};
use portal_core::traits::{Clock, KeyValueStorage, ManualClock};
use portal_storage::memory::{MemoryStorage, StorageArea};
use portal_storage::{CredentialKeys, CredentialStore};

pub const SECRET: &str = "integration-secret";

/// One storage area shared by several windows, on a controllable clock.
pub struct TestBrowser {
    pub area: StorageArea,
    pub clock: Arc<ManualClock>,
    encoder: TokenEncoder,
}

/// A window: its own storage handle and its own monitor.
pub struct TestTab {
    pub storage: MemoryStorage,
    pub monitor: Arc<SessionMonitor>,
}

impl TestBrowser {
    pub fn new() -> Self {
        Self {
            area: StorageArea::new(64),
            clock: Arc::new(ManualClock::new(Utc::now())),
            encoder: TokenEncoder::new(SECRET),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Opens a window with an unmounted monitor.
    pub fn open_tab(&self) -> TestTab {
        let storage = self.area.open_tab();
        let store = CredentialStore::new(Arc::new(storage.clone()), CredentialKeys::default());
        let monitor = Arc::new(SessionMonitor::new(store, self.clock.clone(), 16));
        TestTab { storage, monitor }
    }

    /// Token valid for an hour with `role` at `user.role`.
    pub fn token(&self, role: &str) -> String {
        self.token_expiring(role, self.now() + Duration::hours(1))
    }

    pub fn token_expiring(&self, role: &str, expires_at: DateTime<Utc>) -> String {
        self.encoder
            .issue("user-1", role, expires_at)
            .expect("token should encode")
    }

    /// Token with no `user.role`.
    pub fn token_without_role(&self) -> String {
        self.encoder
            .sign(&serde_json::json!({
                "exp": (self.now() + Duration::hours(1)).timestamp(),
                "user": { "_id": "user-1" },
            }))
            .expect("token should encode")
    }

    /// Writes raw values straight into the shared area, as another program would.
    pub fn seed(&self, token: Option<&str>, role: Option<&str>) {
        let writer = self.area.open_tab();
        if let Some(token) = token {
            writer.set("token", token).expect("seed token");
        }
        if let Some(role) = role {
            writer.set("role", role).expect("seed role");
        }
    }
}

impl TestTab {
    /// Current `(token, role)` as seen through this window.
    pub fn stored(&self) -> (Option<String>, Option<String>) {
        (
            self.storage.get("token").expect("read token"),
            self.storage.get("role").expect("read role"),
        )
    }
}

/// Waits up to a second for `subscriber` to reach `expected`.
pub async fn wait_for_state(subscriber: &mut SessionSubscriber, expected: SessionState) {
    tokio::time::timeout(StdDuration::from_secs(1), subscriber.wait_for(|s| *s == expected))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {expected}"))
        .expect("monitor still alive");
}
