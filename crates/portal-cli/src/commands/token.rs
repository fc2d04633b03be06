//! Token CLI commands.

use chrono::{Duration, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::output::{self, OutputFormat};
use portal_auth::{TokenCodec, TokenEncoder};
use portal_core::error::AppError;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Decode a token's payload without verifying it
    Decode {
        /// Signed token
        token: String,
    },
    /// Issue a development token
    Issue {
        /// Subject identifier
        #[arg(long, default_value = "dev-user")]
        subject: String,
        /// Role claim, written verbatim
        #[arg(long)]
        role: String,
        /// Lifetime in seconds
        #[arg(long, default_value_t = 3600)]
        ttl: i64,
        /// HMAC secret
        #[arg(long, default_value = "dev-secret")]
        secret: String,
    },
}

/// Decoded token display record
#[derive(Debug, Serialize)]
struct DecodedRecord {
    subject_id: Option<String>,
    role: Option<String>,
    recognized_role: bool,
    expires_at: Option<String>,
    expired: bool,
}

/// Execute token commands
pub async fn execute(args: &TokenArgs, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        TokenCommand::Decode { token } => {
            let payload = TokenCodec::new()
                .inspect(token)
                .map_err(|e| AppError::decode(e.to_string()))?;
            let now = Utc::now();
            let record = DecodedRecord {
                expired: payload.is_expired_at(now),
                expires_at: chrono::DateTime::from_timestamp(payload.expires_at, 0)
                    .map(|t| t.to_rfc3339()),
                recognized_role: payload
                    .role
                    .as_deref()
                    .and_then(portal_core::types::Role::parse)
                    .is_some(),
                role: payload.role,
                subject_id: payload.subject_id,
            };
            output::print_record(&record, format);
            Ok(())
        }
        TokenCommand::Issue {
            subject,
            role,
            ttl,
            secret,
        } => {
            let token = TokenEncoder::new(secret).issue_for(subject, role, Duration::seconds(*ttl))?;
            println!("{token}");
            Ok(())
        }
    }
}
