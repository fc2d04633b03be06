//! Read-only handle for UI regions that render from the session state.

use tokio::sync::watch;

use portal_core::error::AppError;
use portal_core::types::Role;

use super::state::{SessionSnapshot, SessionState};

/// A consumer's view of the session.
///
/// Navigation bars, dashboards and anything else that needs the role hold
/// one of these instead of reading the credential store. All subscribers of
/// one monitor observe the same sequence of complete states.
#[derive(Debug, Clone)]
pub struct SessionSubscriber {
    rx: watch::Receiver<SessionState>,
}

impl SessionSubscriber {
    pub(crate) fn new(rx: watch::Receiver<SessionState>) -> Self {
        Self { rx }
    }

    /// Latest published state.
    pub fn current(&self) -> SessionState {
        *self.rx.borrow()
    }

    /// Latest published state as `{authenticated, role}`.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.current().snapshot()
    }

    /// Role of the current session, if authenticated.
    pub fn role(&self) -> Option<Role> {
        self.current().role()
    }

    /// Waits for the next published change and returns it.
    ///
    /// Fails once the monitor has been dropped.
    pub async fn changed(&mut self) -> Result<SessionState, AppError> {
        self.rx
            .changed()
            .await
            .map_err(|_| AppError::session("session monitor has shut down"))?;
        Ok(*self.rx.borrow_and_update())
    }

    /// Waits until the state satisfies `predicate`, returning that state.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&SessionState) -> bool,
    ) -> Result<SessionState, AppError> {
        let state = self
            .rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| AppError::session("session monitor has shut down"))?;
        Ok(*state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_changed_and_wait_for() {
        let (tx, rx) = watch::channel(SessionState::Unknown);
        let mut subscriber = SessionSubscriber::new(rx);
        assert_eq!(subscriber.current(), SessionState::Unknown);

        tx.send(SessionState::Authenticated(Role::Student)).unwrap();
        assert_eq!(
            subscriber.changed().await.unwrap(),
            SessionState::Authenticated(Role::Student)
        );
        assert_eq!(subscriber.role(), Some(Role::Student));

        tx.send(SessionState::Anonymous).unwrap();
        let state = subscriber
            .wait_for(|s| !s.is_authenticated())
            .await
            .unwrap();
        assert_eq!(state, SessionState::Anonymous);
        assert!(!subscriber.snapshot().authenticated);
    }

    #[tokio::test]
    async fn test_changed_fails_after_monitor_drop() {
        let (tx, rx) = watch::channel(SessionState::Anonymous);
        let mut subscriber = SessionSubscriber::new(rx);
        drop(tx);
        assert!(subscriber.changed().await.is_err());
    }
}
