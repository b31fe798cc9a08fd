//! Minimum-interval throttle for outbound attempts.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Enforces a minimum gap between consecutive attempts.
///
/// The lock is held across the wait, so concurrent callers are served one
/// at a time and every pair of recorded send times is at least
/// `min_interval` apart.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the window since the previous attempt has elapsed, then
    /// record and return the new attempt time.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::trace!(wait_ms = wait.as_millis() as u64, "Throttling outbound request");
                sleep(wait).await;
            }
        }

        let now = Instant::now();
        *last = Some(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_does_not_wait() {
        let throttle = Throttle::new(Duration::from_millis(400));
        let start = Instant::now();
        throttle.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_gap_is_at_least_window() {
        let throttle = Throttle::new(Duration::from_millis(400));
        let a = throttle.acquire().await;
        let b = throttle.acquire().await;
        let c = throttle.acquire().await;
        assert!(b - a >= Duration::from_millis(400));
        assert!(c - b >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_window_elapsed() {
        let throttle = Throttle::new(Duration::from_millis(400));
        throttle.acquire().await;
        sleep(Duration::from_millis(500)).await;

        let before = Instant::now();
        throttle.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_are_spaced() {
        let throttle = Arc::new(Throttle::new(Duration::from_millis(400)));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let throttle = throttle.clone();
                tokio::spawn(async move { throttle.acquire().await })
            })
            .collect();

        let mut times = Vec::new();
        for handle in handles {
            times.push(handle.await.unwrap());
        }
        times.sort();
        assert!(times.windows(2).all(|w| w[1] - w[0] >= Duration::from_millis(400)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_throttles_do_not_interfere() {
        let first = Throttle::new(Duration::from_millis(400));
        let second = Throttle::new(Duration::from_millis(400));
        first.acquire().await;

        let before = Instant::now();
        second.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
