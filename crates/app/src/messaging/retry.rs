//! Retry policy for failed deliveries.

use std::time::Duration;

/// Exponential backoff with a bounded number of retries.
///
/// The first delivery is not a retry, so a message is delivered at most
/// `max_retries + 1` times before it is moved to the failed state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryStrategy {
    pub max_retries: u32,
    pub delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryStrategy {
    /// Whether a message that just failed its `attempts`-th delivery gets another one.
    #[must_use]
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts <= self.max_retries
    }

    /// Wait before the next delivery after the `attempts`-th one failed.
    #[must_use]
    pub fn delay_for(&self, attempts: u32) -> Duration {
        if self.delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempts.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.multiplier.max(1.0).powi(exponent);
        let seconds = self.delay.as_secs_f64() * factor;

        Duration::try_from_secs_f64(seconds)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}
