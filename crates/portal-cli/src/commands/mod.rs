//! CLI command definitions and dispatch.

pub mod route;
pub mod session;
pub mod token;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, info};

use crate::output::{self, OutputFormat};
use portal_auth::SessionMonitor;
use portal_core::config::{AppConfig, StorageBackendKind};
use portal_core::error::AppError;
use portal_storage::{CredentialKeys, CredentialStore, StorageManager};

/// Campus portal session tool
#[derive(Debug, Parser)]
#[command(name = "portal-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/portal.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in, sign out, and inspect the stored session
    Session(session::SessionArgs),
    /// Check navigation against the route guard
    Route(route::RouteArgs),
    /// Decode or issue credentials
    Token(token::TokenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Session(args) => session::execute(args, &self.config, self.format).await,
            Commands::Route(args) => route::execute(args, &self.config, self.format).await,
            Commands::Token(args) => token::execute(args, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    let config = AppConfig::load(config_path)?;
    debug!(path = config_path, backend = %config.storage.backend, "Configuration loaded");
    Ok(config)
}

/// Helper: build a monitor over the configured credential store.
///
/// An in-memory store would vanish when the command exits, so the CLI
/// falls back to the file store in that case.
pub fn open_monitor(config: &AppConfig) -> Result<Arc<SessionMonitor>, AppError> {
    let mut storage = config.storage.clone();
    if storage.backend == StorageBackendKind::Memory {
        output::print_warning(&format!(
            "Memory storage does not persist between commands; using {}",
            storage.path
        ));
        storage.backend = StorageBackendKind::File;
    }

    info!(backend = %storage.backend, path = %storage.path, "Opening credential store");
    let manager = StorageManager::new(&storage)?;
    let store = CredentialStore::new(manager.backend(), CredentialKeys::from_config(&storage));
    Ok(Arc::new(SessionMonitor::from_config(store, &config.session)))
}
