//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.
//! Secrets are never part of the file; see [`crate::config::loader`].

use serde::{Deserialize, Serialize};

/// Root configuration for the TripIt MCP server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Inbound HTTP server settings.
    pub server: ServerConfig,

    /// TripIt API endpoints and transport settings.
    pub provider: ProviderConfig,

    /// Minimum spacing between outbound provider requests.
    pub throttle: ThrottleConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// OAuth web flow settings.
    pub oauth: OAuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Inbound server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8787").
    pub bind_address: String,

    /// Externally reachable base URL, used to build the OAuth callback.
    pub public_url: String,

    /// Total time allowed for one inbound request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            public_url: "http://127.0.0.1:8787".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// TripIt endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the v1 REST API.
    pub api_base_url: String,

    /// OAuth request-token endpoint.
    pub request_token_url: String,

    /// OAuth access-token endpoint.
    pub access_token_url: String,

    /// User-facing authorization page.
    pub authorize_url: String,

    /// Per-attempt transport timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.tripit.com/v1".to_string(),
            request_token_url: "https://api.tripit.com/oauth/request_token".to_string(),
            access_token_url: "https://api.tripit.com/oauth/access_token".to_string(),
            authorize_url: "https://www.tripit.com/oauth/authorize".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Throttle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Minimum interval between two outbound attempts in milliseconds.
    pub min_interval_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 400,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per logical call (including the first).
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

/// OAuth web flow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// How long a pending request token is kept while the user authorizes.
    pub request_token_ttl_secs: u64,
    /// How often expired entries are swept from the in-memory token store.
    pub sweep_interval_secs: u64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            request_token_ttl_secs: 600,
            sweep_interval_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
