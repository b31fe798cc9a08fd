//! Provider error taxonomy.

use thiserror::Error;

/// Errors that can occur while talking to TripIt.
///
/// Every variant can report the HTTP status it was derived from (if any)
/// through [`TripItError::status`].
#[derive(Debug, Clone, Error)]
pub enum TripItError {
    /// Credential invalid, expired or revoked (HTTP 401).
    #[error("Authentication failed - token may be expired or revoked")]
    Authentication,

    /// Target resource absent (HTTP 404).
    #[error("Resource not found")]
    NotFound,

    /// Any other non-success status, with the raw body.
    #[error("API error ({status}): {body}")]
    Provider { status: u16, body: String },

    /// Feature gated behind a TripIt Pro subscription.
    #[error("{0}")]
    ProRequired(String),

    /// No response obtained.
    #[error("Network error: {0}")]
    Transport(String),

    /// A response arrived but could not be understood.
    #[error("Invalid provider response: {0}")]
    Protocol(String),

    /// All attempts were used without a recorded cause.
    #[error("Request failed after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// Caller input the provider cannot accept; rejected before any I/O.
    #[error("{0}")]
    InvalidInput(String),

    /// The request could not be signed or addressed.
    #[error("Request could not be built: {0}")]
    InvalidRequest(String),
}

impl TripItError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            TripItError::Authentication => Some(401),
            TripItError::NotFound => Some(404),
            TripItError::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TripItError::Provider { status, .. } => *status == 429 || *status >= 500,
            TripItError::Transport(_) => true,
            _ => false,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TripItError::Authentication => "authentication",
            TripItError::NotFound => "not_found",
            TripItError::Provider { .. } => "provider",
            TripItError::ProRequired(_) => "pro_required",
            TripItError::Transport(_) => "transport",
            TripItError::Protocol(_) => "protocol",
            TripItError::Exhausted { .. } => "exhausted",
            TripItError::InvalidInput(_) => "invalid_input",
            TripItError::InvalidRequest(_) => "invalid_request",
        }
    }
}

/// Result type for provider operations.
pub type TripItResult<T> = Result<T, TripItError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(TripItError::Authentication.status(), Some(401));
        assert_eq!(TripItError::NotFound.status(), Some(404));
        assert_eq!(
            TripItError::Provider { status: 422, body: String::new() }.status(),
            Some(422)
        );
        assert_eq!(TripItError::Transport("x".into()).status(), None);
    }

    #[test]
    fn test_retryable_policy() {
        let provider = |status| TripItError::Provider { status, body: String::new() };
        assert!(provider(429).is_retryable());
        assert!(provider(500).is_retryable());
        assert!(provider(503).is_retryable());
        assert!(!provider(400).is_retryable());
        assert!(!provider(403).is_retryable());
        assert!(TripItError::Transport("timeout".into()).is_retryable());
        assert!(!TripItError::Authentication.is_retryable());
        assert!(!TripItError::NotFound.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = TripItError::Provider { status: 400, body: "bad trip".into() };
        assert_eq!(err.to_string(), "API error (400): bad trip");
        assert_eq!(
            TripItError::Exhausted { attempts: 3 }.to_string(),
            "Request failed after 3 attempts"
        );
    }
}
