//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Logical call to provider:
//!     → throttle.rs (wait out the minimum interval, record send time)
//!     → [sign + send one attempt]
//!     → retries.rs (classify: success / retryable / fatal)
//!     → On retryable: backoff.rs (base * 2^attempt), then next attempt
//! ```
//!
//! # Design Decisions
//! - Throttle state belongs to one client instance, never to the module
//! - Terminal failures return immediately with no wait
//! - No wait after the final attempt

pub mod backoff;
pub mod retries;
pub mod throttle;

pub use retries::{AttemptOutcome, RetryPolicy};
pub use throttle::Throttle;
