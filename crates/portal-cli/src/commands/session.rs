//! Session CLI commands.

use std::time::Duration;

use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::debug;

use crate::output::{self, OutputFormat};
use portal_auth::session::Trigger;
use portal_auth::{SessionDriver, SessionState};
use portal_core::error::AppError;
use portal_core::types::Role;

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Store a credential returned by the login endpoint
    Login {
        /// Signed token
        token: String,
        /// Role named by the login response
        #[arg(long)]
        role: Option<Role>,
    },
    /// Clear the stored credential
    Logout,
    /// Reconcile and show the session state
    Status,
    /// Keep the session mounted and print every change
    Watch {
        /// Revalidation interval in seconds (defaults to configuration)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
}

/// Status display record
#[derive(Debug, Serialize)]
struct StatusRecord {
    status: SessionState,
    authenticated: bool,
    role: Option<Role>,
    reason: Option<String>,
    expires_at: Option<String>,
    remaining_seconds: Option<u64>,
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let monitor = super::open_monitor(&config)?;

    match &args.command {
        SessionCommand::Login { token, role } => match monitor.sign_in(token, *role) {
            Ok(role) => {
                output::print_success(&format!(
                    "Signed in as {role}; landing page {}",
                    config.routes.dashboards.for_role(role)
                ));
                Ok(())
            }
            Err(reason) => Err(AppError::authorization(format!(
                "Credential rejected: {reason}"
            ))),
        },
        SessionCommand::Logout => {
            monitor.sign_out();
            output::print_success("Signed out");
            Ok(())
        }
        SessionCommand::Status => {
            let outcome = monitor.reconcile_now(Trigger::Mount);
            let state = outcome.state;
            let claims = monitor
                .store()
                .read()
                .token
                .and_then(|t| portal_auth::TokenCodec::new().decode(&t).ok());
            let now = chrono::Utc::now();

            let record = StatusRecord {
                status: state,
                authenticated: state.is_authenticated(),
                role: state.role(),
                reason: outcome.reason.map(|r| r.to_string()),
                expires_at: claims
                    .as_ref()
                    .and_then(|c| c.expires_at_utc())
                    .map(|t| t.to_rfc3339()),
                remaining_seconds: claims.as_ref().map(|c| c.remaining_seconds_at(now)),
            };
            output::print_record(&record, format);
            Ok(())
        }
        SessionCommand::Watch { interval } => {
            let period = interval
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(config.session.revalidate_interval_seconds));
            let mut notices = monitor.notices();
            let handle = SessionDriver::new(monitor, period).spawn()?;
            let mut subscriber = handle.subscribe();
            output::print_kv("state", &subscriber.current().to_string());

            loop {
                tokio::select! {
                    changed = subscriber.changed() => {
                        output::print_kv("state", &changed?.to_string());
                    }
                    Ok(notice) = notices.recv() => {
                        debug!(?notice, "Session notice");
                        output::print_warning(&notice.message());
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            handle.shutdown().await;
            Ok(())
        }
    }
}
