//! Wires the monitor to its three triggers: mount, timer, storage change.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use portal_core::config::SessionConfig;
use portal_core::error::AppError;
use portal_core::events::StorageEvent;

use super::monitor::{SessionMonitor, Trigger};
use super::subscriber::SessionSubscriber;

/// Mounts a [`SessionMonitor`]: reconciles once, then keeps reconciling on
/// a fixed interval and whenever another window changes a credential key.
#[derive(Debug)]
pub struct SessionDriver {
    monitor: Arc<SessionMonitor>,
    interval: Duration,
}

impl SessionDriver {
    /// Creates a driver revalidating every `interval`.
    pub fn new(monitor: Arc<SessionMonitor>, interval: Duration) -> Self {
        Self { monitor, interval }
    }

    /// Creates a driver from session configuration.
    pub fn from_config(monitor: Arc<SessionMonitor>, config: &SessionConfig) -> Self {
        Self::new(
            monitor,
            Duration::from_secs(config.revalidate_interval_seconds),
        )
    }

    /// Runs the mount reconciliation and starts the trigger loop.
    ///
    /// The mount pass completes before this returns, so the state is never
    /// [`Unknown`](super::SessionState::Unknown) afterwards. Must be called
    /// from within a Tokio runtime, with a non-zero interval.
    pub fn spawn(self) -> Result<SessionHandle, AppError> {
        if self.interval.is_zero() {
            return Err(AppError::configuration(
                "Session revalidation interval must be greater than zero",
            ));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::internal(format!("Session driver needs a runtime: {e}")))?;

        let store = self.monitor.store();
        let origin = store.origin();
        let watched = store.keys().clone();
        // Subscribe before mounting so no change slips between the two.
        let events = store.subscribe();

        self.monitor.reconcile_now(Trigger::Mount);

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let monitor = Arc::clone(&self.monitor);
        let interval = self.interval;

        let task = runtime.spawn(async move {
            run_loop(monitor, interval, events, origin, watched, cancel_rx).await;
        });

        info!(
            interval_secs = self.interval.as_secs(),
            "Session monitor mounted"
        );

        Ok(SessionHandle {
            monitor: self.monitor,
            cancel: cancel_tx,
            task: Some(task),
        })
    }
}

async fn run_loop(
    monitor: Arc<SessionMonitor>,
    period: Duration,
    events: broadcast::Receiver<StorageEvent>,
    origin: uuid::Uuid,
    keys: portal_storage::CredentialKeys,
    mut cancel: watch::Receiver<bool>,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut events = Some(events);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                trace!("Session revalidation tick");
                monitor.reconcile(Trigger::Timer);
            }
            received = recv_event(&mut events) => match received {
                Ok(event) => {
                    if event.origin != origin && event.touches(&keys.watched()) {
                        debug!(key = ?event.key, "Credential changed in another window");
                        monitor.reconcile(Trigger::StorageChange);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Storage notifications lagged; reconciling");
                    monitor.reconcile(Trigger::StorageChange);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Storage notifications closed; relying on timer");
                    events = None;
                }
            },
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    break;
                }
            }
        }
    }

    info!("Session monitor unmounted");
}

/// Receives from the storage channel, or waits forever once it is gone.
async fn recv_event(
    events: &mut Option<broadcast::Receiver<StorageEvent>>,
) -> Result<StorageEvent, broadcast::error::RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// A mounted session. Dropping it stops the timer and the storage listener.
#[derive(Debug)]
pub struct SessionHandle {
    monitor: Arc<SessionMonitor>,
    cancel: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// The mounted monitor.
    pub fn monitor(&self) -> &Arc<SessionMonitor> {
        &self.monitor
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> SessionSubscriber {
        self.monitor.subscribe()
    }

    /// Whether the trigger loop has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Stops the trigger loop and waits for it to exit.
    pub async fn shutdown(mut self) {
        let _ = self.cancel.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Session trigger loop ended abnormally");
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.cancel.send(true);
        }
    }
}
