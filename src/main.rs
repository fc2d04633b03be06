//! Campus portal session agent.
//!
//! Mounts the session monitor over the configured credential store and keeps
//! it reconciled until a shutdown signal arrives, logging every state change
//! and user-facing notice.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, fmt};

use portal_auth::{RouteTable, SessionDriver, SessionMonitor};
use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_storage::{CredentialKeys, CredentialStore, StorageManager};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Session agent error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("PORTAL_CONFIG").unwrap_or_else(|_| "config/portal.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting portal session agent v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageManager::new(&config.storage)?;
    let store = CredentialStore::new(
        storage.backend(),
        CredentialKeys::from_config(&config.storage),
    );
    let monitor = Arc::new(SessionMonitor::from_config(store, &config.session));
    let routes = RouteTable::from_config(&config.routes);
    let mut notices = monitor.notices();

    let handle = SessionDriver::from_config(Arc::clone(&monitor), &config.session).spawn()?;
    let mut subscriber = handle.subscribe();
    tracing::info!(state = %subscriber.current(), "Session mounted");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = subscriber.changed() => {
                let state = changed?;
                match state.role() {
                    Some(role) => tracing::info!(
                        state = %state,
                        landing = routes.landing_for(role),
                        "Session state changed"
                    ),
                    None => tracing::info!(state = %state, "Session state changed"),
                }
            }
            notice = notices.recv() => match notice {
                Ok(notice) => tracing::info!(notice = ?notice, "{}", notice.message()),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session notices lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    handle.shutdown().await;
    tracing::info!("Session agent stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
