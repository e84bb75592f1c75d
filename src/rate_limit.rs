//! Minimum-interval spacing for fetch operations.
//!
//! Each [`RateLimiter`] instance owns its own last-execution timestamp, so two
//! limiters over the same underlying operation are fully independent. The
//! orchestrator gives each extraction strategy its own limiter.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Spaces successive executions by at least a minimum interval.
///
/// The first call proceeds immediately. The last-execution timestamp is
/// taken *after* any wait, so the guarantee is between actual execution
/// starts, not between call requests. Errors from whatever runs after
/// [`RateLimiter::throttle`] are none of the limiter's business; it only
/// governs timing.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_run: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_run: Mutex::new(None),
        }
    }

    /// Suspend the caller until at least `min_interval` has elapsed since the
    /// previous execution gated by this limiter, then stamp the new execution.
    ///
    /// The lock is held across the wait so concurrent callers serialize and
    /// each one gets its own full interval.
    pub async fn throttle(&self) {
        let mut last_run = self.last_run.lock().await;
        if let Some(previous) = *last_run {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last_run = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_call_proceeds_immediately() {
        let limiter = RateLimiter::new(Duration::from_millis(1000));
        let t0 = Instant::now();
        limiter.throttle().await;
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_executions_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(1000));
        let t0 = Instant::now();
        limiter.throttle().await;
        limiter.throttle().await;
        assert!(t0.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_remaining_time_is_waited() {
        let limiter = RateLimiter::new(Duration::from_millis(1000));
        limiter.throttle().await;
        sleep(Duration::from_millis(400)).await;
        let t0 = Instant::now();
        limiter.throttle().await;
        assert_eq!(t0.elapsed(), Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn no_wait_after_interval_has_passed() {
        let limiter = RateLimiter::new(Duration::from_millis(1000));
        limiter.throttle().await;
        sleep(Duration::from_millis(1500)).await;
        let t0 = Instant::now();
        limiter.throttle().await;
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn instances_are_independent() {
        let a = RateLimiter::new(Duration::from_millis(1000));
        let b = RateLimiter::new(Duration::from_millis(1000));
        a.throttle().await;
        // b has never run, so its first call must not wait.
        let t0 = Instant::now();
        b.throttle().await;
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }
}
