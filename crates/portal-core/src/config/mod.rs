//! Application configuration schemas.
//!
//! All configuration structs are deserialized from an optional TOML file
//! merged with `PORTAL__`-prefixed environment variables via the `config`
//! crate. Each sub-module represents a logical configuration section.

pub mod logging;
pub mod routes;
pub mod session;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::routes::{DashboardPaths, RouteRule, RoutesConfig};
pub use self::session::SessionConfig;
pub use self::storage::{StorageBackendKind, StorageConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session revalidation settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Credential storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Route guard table.
    #[serde(default)]
    pub routes: RoutesConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional; environment variables such as
    /// `PORTAL__SESSION__REVALIDATE_INTERVAL_SECONDS=30` override it.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("PORTAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the session subsystem cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.session.revalidate_interval_seconds == 0 {
            return Err(AppError::configuration(
                "session.revalidate_interval_seconds must be greater than zero",
            ));
        }

        let storage = &self.storage;
        if storage.token_key.is_empty() || storage.role_key.is_empty() {
            return Err(AppError::configuration("storage keys must not be empty"));
        }
        if storage.token_key == storage.role_key {
            return Err(AppError::configuration(format!(
                "storage.token_key and storage.role_key must differ (both '{}')",
                storage.token_key
            )));
        }

        let routes = &self.routes;
        let mut paths = vec![&routes.login_path, &routes.home_path];
        paths.extend(routes.rules.iter().map(|r| &r.prefix));
        paths.extend([
            &routes.dashboards.student,
            &routes.dashboards.faculty,
            &routes.dashboards.admin,
        ]);
        if let Some(bad) = paths.into_iter().find(|p| !p.starts_with('/')) {
            return Err(AppError::configuration(format!(
                "route path '{bad}' must start with '/'"
            )));
        }

        if let Some(rule) = routes.rules.iter().find(|r| r.roles.is_empty()) {
            return Err(AppError::configuration(format!(
                "route rule '{}' lists no roles",
                rule.prefix
            )));
        }

        Ok(())
    }
}
