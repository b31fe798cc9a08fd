//! Exponential backoff.

use std::time::Duration;

/// Delay to wait after the failed attempt with zero-based index `attempt`.
///
/// `base_ms * 2^attempt`, capped at `max_ms`. No jitter: waits must be
/// exactly predictable for a single logical call.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let exponential_base = 2u64.saturating_pow(attempt);
    let delay_ms = base_ms.saturating_mul(exponential_base);

    Duration::from_millis(delay_ms.min(max_ms))
}
