//! Retry policy and attempt classification.
//!
//! # Responsibilities
//! - Classify one attempt as success, retryable failure or fatal failure
//! - Compute the wait before the next attempt
//!
//! # Design Decisions
//! - 401 and 404 are terminal; they never consume further attempts
//! - 429 and 5xx are retried, any other non-success status is terminal
//! - Transport failures (no response) are always retried
//! - The retry loop interprets an explicit tag instead of unwinding

use std::time::Duration;

use crate::client::transport::{RawResponse, TransportFailure};
use crate::client::TripItError;
use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Outcome of a single attempt.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Success(T),
    Retryable(TripItError),
    Fatal(TripItError),
}

impl<T> AttemptOutcome<T> {
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success(_) => "success",
            AttemptOutcome::Retryable(_) => "retryable",
            AttemptOutcome::Fatal(_) => "fatal",
        }
    }
}

/// Classify an HTTP response by status code. Success carries the raw body.
pub fn classify_response(response: RawResponse) -> AttemptOutcome<String> {
    match response.status {
        200..=299 => AttemptOutcome::Success(response.body),
        401 => AttemptOutcome::Fatal(TripItError::Authentication),
        404 => AttemptOutcome::Fatal(TripItError::NotFound),
        status => {
            let error = TripItError::Provider {
                status,
                body: response.body,
            };
            if error.is_retryable() {
                AttemptOutcome::Retryable(error)
            } else {
                AttemptOutcome::Fatal(error)
            }
        }
    }
}

/// A failed exchange with no response is always worth another try.
pub fn classify_transport<T>(failure: TransportFailure) -> AttemptOutcome<T> {
    AttemptOutcome::Retryable(TripItError::Transport(failure.0))
}

/// Bounded exponential-backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Wait after the failed attempt with zero-based index `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }

    /// Whether another attempt follows the one with index `attempt`.
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}
