//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::oauth::{ConsumerSecret, CredentialPair};

/// Environment variable holding the application's consumer key.
pub const CONSUMER_KEY_ENV_VAR: &str = "TRIPIT_CONSUMER_KEY";
/// Environment variable holding the application's consumer secret.
pub const CONSUMER_SECRET_ENV_VAR: &str = "TRIPIT_CONSUMER_SECRET";
/// Optional default access token used when a caller has no stored session.
pub const ACCESS_TOKEN_ENV_VAR: &str = "TRIPIT_ACCESS_TOKEN";
/// Secret paired with [`ACCESS_TOKEN_ENV_VAR`].
pub const ACCESS_TOKEN_SECRET_ENV_VAR: &str = "TRIPIT_ACCESS_TOKEN_SECRET";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    MissingEnv(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::MissingEnv(name) => write!(f, "Environment variable {} not set", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Credentials that only ever come from the environment.
#[derive(Debug, Clone)]
pub struct Secrets {
    /// The application's own key pair.
    pub consumer: ConsumerSecret,
    /// Session used when the caller has none stored.
    pub default_session: Option<CredentialPair>,
}

impl Secrets {
    /// Read secrets from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read secrets through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let key = non_empty(CONSUMER_KEY_ENV_VAR)
            .ok_or(ConfigError::MissingEnv(CONSUMER_KEY_ENV_VAR))?;
        let secret = non_empty(CONSUMER_SECRET_ENV_VAR)
            .ok_or(ConfigError::MissingEnv(CONSUMER_SECRET_ENV_VAR))?;

        let default_session = match (
            non_empty(ACCESS_TOKEN_ENV_VAR),
            non_empty(ACCESS_TOKEN_SECRET_ENV_VAR),
        ) {
            (Some(token), Some(token_secret)) => Some(CredentialPair::new(token, token_secret)),
            (Some(_), None) => {
                tracing::warn!(
                    "{} set without {}; ignoring default session",
                    ACCESS_TOKEN_ENV_VAR,
                    ACCESS_TOKEN_SECRET_ENV_VAR
                );
                None
            }
            _ => None,
        };

        Ok(Self {
            consumer: ConsumerSecret::new(key, secret),
            default_session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_parse_invalid_config_reports_validation() {
        let err = parse_config("[retries]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("retries.max_attempts"));
    }

    #[test]
    fn test_parse_syntax_error() {
        let err = parse_config("[retries\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_secrets_require_consumer_pair() {
        let err = Secrets::from_lookup(lookup(&[(CONSUMER_KEY_ENV_VAR, "key")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(CONSUMER_SECRET_ENV_VAR)));
    }

    #[test]
    fn test_secrets_with_default_session() {
        let secrets = Secrets::from_lookup(lookup(&[
            (CONSUMER_KEY_ENV_VAR, "key"),
            (CONSUMER_SECRET_ENV_VAR, "secret"),
            (ACCESS_TOKEN_ENV_VAR, "tok"),
            (ACCESS_TOKEN_SECRET_ENV_VAR, "toksecret"),
        ]))
        .unwrap();
        assert_eq!(secrets.consumer.key(), "key");
        assert_eq!(secrets.default_session.unwrap().token(), "tok");
    }

    #[test]
    fn test_half_session_is_ignored() {
        let secrets = Secrets::from_lookup(lookup(&[
            (CONSUMER_KEY_ENV_VAR, "key"),
            (CONSUMER_SECRET_ENV_VAR, "secret"),
            (ACCESS_TOKEN_ENV_VAR, "tok"),
        ]))
        .unwrap();
        assert!(secrets.default_session.is_none());
    }
}
