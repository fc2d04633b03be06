//! Route guard CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use portal_auth::{GuardDecision, RouteGuard, RouteTable};
use portal_core::error::AppError;

/// Arguments for route commands
#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Route subcommand
    #[command(subcommand)]
    pub command: RouteCommand,
}

/// Route subcommands
#[derive(Debug, Subcommand)]
pub enum RouteCommand {
    /// Decide a navigation to PATH with the stored session
    Check {
        /// Route path, e.g. /admin/users
        path: String,
    },
    /// List protected routes
    List,
}

/// Route rule display row
#[derive(Debug, Serialize, Tabled)]
struct RuleRow {
    /// Prefix
    prefix: String,
    /// Roles
    roles: String,
}

/// Execute route commands
pub async fn execute(
    args: &RouteArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    match &args.command {
        RouteCommand::Check { path } => {
            let monitor = super::open_monitor(&config)?;
            let guard = RouteGuard::from_config(monitor, &config);
            let decision = guard.authorize_path(path);
            match format {
                OutputFormat::Json => output::print_record(&decision, format),
                OutputFormat::Table => match &decision {
                    GuardDecision::Allow => output::print_success(&format!("{path}: allowed")),
                    GuardDecision::RedirectTo { path: target, denial } => {
                        output::print_warning(&format!("{path}: redirect to {target} ({denial:?})"))
                    }
                },
            }
            Ok(())
        }
        RouteCommand::List => {
            let table = RouteTable::from_config(&config.routes);
            let rows: Vec<RuleRow> = table
                .rules()
                .iter()
                .map(|rule| RuleRow {
                    prefix: rule.prefix.clone(),
                    roles: rule
                        .roles
                        .iter()
                        .map(|r| r.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect();
            output::print_list(&rows, format);
            Ok(())
        }
    }
}
