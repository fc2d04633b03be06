//! The session monitor: single owner of the authoritative session state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError};

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use portal_core::config::SessionConfig;
use portal_core::events::{InvalidationReason, SessionNotice};
use portal_core::traits::{Clock, SystemClock};
use portal_core::types::Role;
use portal_storage::{Credential, CredentialStore};

use crate::jwt::TokenCodec;

use super::reconcile::{Plan, StoreRepair, plan};
use super::state::SessionState;
use super::subscriber::SessionSubscriber;

/// What caused a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Subsystem start.
    Mount,
    /// Periodic revalidation tick.
    Timer,
    /// Another window changed a credential key.
    StorageChange,
    /// Explicit sign-in in this window.
    SignIn,
    /// Explicit sign-out in this window.
    SignOut,
    /// A route guard check.
    Navigation,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Mount => write!(f, "mount"),
            Trigger::Timer => write!(f, "timer"),
            Trigger::StorageChange => write!(f, "storage_change"),
            Trigger::SignIn => write!(f, "sign_in"),
            Trigger::SignOut => write!(f, "sign_out"),
            Trigger::Navigation => write!(f, "navigation"),
        }
    }
}

/// Result of a completed reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// State published by the pass.
    pub state: SessionState,
    /// Why the state is anonymous, if a credential was rejected.
    pub reason: Option<InvalidationReason>,
    /// Storage repair that was applied.
    pub repair: StoreRepair,
}

/// Reconciles the credential store into one [`SessionState`] and publishes
/// it to subscribers.
///
/// Every trigger funnels into [`reconcile`](Self::reconcile). Passes never
/// overlap: a trigger that arrives while a pass is running is folded into
/// one more pass by the running caller. Subscribers only ever observe the
/// state at the end of a pass, after its storage repair has been written.
pub struct SessionMonitor {
    /// Persisted credential; the monitor is its only steady-state writer.
    store: CredentialStore,
    /// Local claims decoder.
    codec: TokenCodec,
    /// Time source for expiry checks.
    clock: Arc<dyn Clock>,
    /// Authoritative state.
    state: watch::Sender<SessionState>,
    /// Transient notices for UI toasts.
    notices: broadcast::Sender<SessionNotice>,
    /// Reason recorded by the most recent pass.
    last_reason: Mutex<Option<InvalidationReason>>,
    /// Held for the duration of a pass.
    gate: Mutex<()>,
    /// Set when a trigger was coalesced into the running pass.
    rerun: AtomicBool,
}

impl std::fmt::Debug for SessionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMonitor")
            .field("state", &*self.state.borrow())
            .field("store", &self.store)
            .finish()
    }
}

impl SessionMonitor {
    /// Creates a monitor in the [`SessionState::Unknown`] state.
    pub fn new(store: CredentialStore, clock: Arc<dyn Clock>, notice_buffer: usize) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        let (notices, _) = broadcast::channel(notice_buffer.max(1));
        Self {
            store,
            codec: TokenCodec::new(),
            clock,
            state,
            notices,
            last_reason: Mutex::new(None),
            gate: Mutex::new(()),
            rerun: AtomicBool::new(false),
        }
    }

    /// Creates a monitor on the system clock using session configuration.
    pub fn from_config(store: CredentialStore, config: &SessionConfig) -> Self {
        Self::new(store, Arc::new(SystemClock), config.notice_buffer)
    }

    /// Current session state. Never blocks.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Reason recorded by the most recent pass, if it rejected a credential.
    pub fn last_invalidation(&self) -> Option<InvalidationReason> {
        *self.last_reason.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> SessionSubscriber {
        SessionSubscriber::new(self.state.subscribe())
    }

    /// Subscribe to transient notices.
    pub fn notices(&self) -> broadcast::Receiver<SessionNotice> {
        self.notices.subscribe()
    }

    /// The credential store this monitor reconciles.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Runs one reconciliation pass.
    ///
    /// Returns `None` when another pass was already running. That caller
    /// sees the flag this one leaves behind and runs again after releasing
    /// the gate, so the trigger is not lost.
    pub fn reconcile(&self, trigger: Trigger) -> Option<Reconciliation> {
        let mut outcome = None;
        let mut flagged = false;
        loop {
            let guard = match self.gate.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::WouldBlock) => {
                    if flagged {
                        debug!(trigger = %trigger, "Reconciliation already running; coalesced");
                        return outcome;
                    }
                    // Flag first, then retry: either the retry wins the gate
                    // or the holder has yet to check the flag.
                    self.rerun.store(true, Ordering::SeqCst);
                    flagged = true;
                    continue;
                }
                Err(TryLockError::Poisoned(e)) => e.into_inner(),
            };

            self.rerun.store(false, Ordering::SeqCst);
            outcome = Some(self.pass(trigger));
            drop(guard);

            if !self.rerun.load(Ordering::SeqCst) {
                return outcome;
            }
            flagged = false;
        }
    }

    /// Runs a reconciliation pass, waiting for a running one to finish
    /// instead of coalescing into it.
    ///
    /// The returned outcome always reflects storage as it was after the
    /// call began.
    pub fn reconcile_now(&self, trigger: Trigger) -> Reconciliation {
        let guard = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        self.rerun.store(false, Ordering::SeqCst);
        let outcome = self.pass(trigger);
        drop(guard);

        if self.rerun.load(Ordering::SeqCst) {
            return self.reconcile(trigger).unwrap_or(outcome);
        }
        outcome
    }

    /// Stores a freshly issued credential and reconciles.
    ///
    /// `role` is the role the login response named; without it the role is
    /// recovered from the token's claims.
    pub fn sign_in(&self, token: &str, role: Option<Role>) -> Result<Role, InvalidationReason> {
        self.store.write(&Credential {
            token: Some(token.to_string()),
            role: role.map(|r| r.as_str().to_string()),
        });
        let outcome = self.reconcile_now(Trigger::SignIn);
        match outcome.state {
            SessionState::Authenticated(role) => Ok(role),
            _ => Err(outcome
                .reason
                .unwrap_or(InvalidationReason::StorageUnavailable)),
        }
    }

    /// Clears the credential and reconciles.
    pub fn sign_out(&self) -> SessionState {
        self.store.clear();
        self.reconcile_now(Trigger::SignOut).state
    }

    fn pass(&self, trigger: Trigger) -> Reconciliation {
        let credential = self.store.read();
        let mut plan = if self.store.is_available() {
            plan(&credential, &self.codec, self.clock.now())
        } else {
            Plan::storage_unavailable()
        };

        self.apply(plan.repair);

        // A repair write can be what discovers the store is unusable.
        if !self.store.is_available() {
            plan = Plan {
                repair: plan.repair,
                ..Plan::storage_unavailable()
            };
        }

        self.publish(trigger, &plan);
        Reconciliation {
            state: plan.state,
            reason: plan.reason,
            repair: plan.repair,
        }
    }

    fn apply(&self, repair: StoreRepair) {
        match repair {
            StoreRepair::Nothing => {}
            StoreRepair::WriteRole(role) => {
                info!(role = %role, "Restoring missing role from token claims");
                self.store.write_role(role.as_str());
            }
            StoreRepair::ClearRole => {
                warn!("Clearing role persisted without a token");
                self.store.clear_role();
            }
            StoreRepair::ClearAll => {
                self.store.clear();
            }
        }
    }

    fn publish(&self, trigger: Trigger, plan: &Plan) {
        *self.last_reason.lock().unwrap_or_else(|e| e.into_inner()) = plan.reason;

        let previous = self.state();
        let next = plan.state;
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });

        if previous == next {
            debug!(trigger = %trigger, state = %next, "Session state unchanged");
            return;
        }

        match plan.reason {
            Some(reason) => warn!(
                trigger = %trigger,
                from = %previous,
                to = %next,
                reason = %reason,
                "Session invalidated"
            ),
            None => info!(trigger = %trigger, from = %previous, to = %next, "Session state changed"),
        }

        if let Some(notice) = notice_for(previous, next, plan.reason) {
            // Nobody listening is fine.
            let _ = self.notices.send(notice);
        }
    }
}

/// Notice to emit for a transition, if any. The first pass after mount is
/// silent: it restores a session rather than starting one.
fn notice_for(
    previous: SessionState,
    next: SessionState,
    reason: Option<InvalidationReason>,
) -> Option<SessionNotice> {
    match (previous, next) {
        (SessionState::Unknown, _) => None,
        (SessionState::Authenticated(_), SessionState::Anonymous) => Some(
            SessionNotice::for_reason(reason.unwrap_or(InvalidationReason::SignedOut)),
        ),
        (SessionState::Authenticated(a), SessionState::Authenticated(b)) if a != b => {
            Some(SessionNotice::SignedIn { role: b })
        }
        (SessionState::Anonymous, SessionState::Authenticated(role)) => {
            Some(SessionNotice::SignedIn { role })
        }
        _ => None,
    }
}
