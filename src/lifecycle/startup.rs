//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Read secrets from the environment
//!
//! # Design Decisions
//! - Without a config file every section takes its defaults
//! - Missing consumer credentials are fatal
//! - Configuration is loaded before logging so the level can be honored

use std::path::Path;

use crate::config::{load_config, AppConfig, ConfigError, Secrets};

/// Everything the server needs before it binds.
#[derive(Debug)]
pub struct Prepared {
    pub config: AppConfig,
    pub secrets: Secrets,
}

/// Load configuration from `path`, or defaults when none is given.
pub fn load_configuration(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(AppConfig::default()),
    }
}

/// Pair `config` with secrets read from the environment.
pub fn prepare(config: AppConfig) -> Result<Prepared, ConfigError> {
    let secrets = Secrets::from_env()?;

    tracing::info!(
        bind_address = %config.server.bind_address,
        api_base_url = %config.provider.api_base_url,
        min_interval_ms = config.throttle.min_interval_ms,
        max_attempts = config.retries.max_attempts,
        default_session = secrets.default_session.is_some(),
        "Configuration loaded"
    );

    Ok(Prepared { config, secrets })
}
