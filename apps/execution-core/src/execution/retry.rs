//! Exponential backoff with jitter for broker HTTP calls.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Backoff calculator for one request's retry budget.
#[derive(Debug)]
pub struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
    backoff_multiplier: f64,
    jitter_factor: f64,
}

impl ExponentialBackoff {
    /// Calculator from the configured retry policy.
    #[must_use]
    pub const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            initial_backoff_ms: config.initial_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
            backoff_multiplier: config.backoff_multiplier,
            jitter_factor: config.jitter_factor,
        }
    }

    /// Next backoff duration with jitter, or `None` when the retry
    /// budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }

        let base_ms = self.base_backoff_ms();
        let jittered_ms = self.apply_jitter(base_ms).min(self.max_backoff_ms);
        self.attempt += 1;

        Some(Duration::from_millis(jittered_ms))
    }

    /// Attempts consumed so far.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    fn base_backoff_ms(&self) -> u64 {
        let multiplier = self.backoff_multiplier.powi(self.attempt as i32);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let backoff = (self.initial_backoff_ms as f64 * multiplier) as u64;
        backoff.min(self.max_backoff_ms)
    }

    /// Random value in [backoff * (1 - jitter), backoff * (1 + jitter)].
    fn apply_jitter(&self, backoff_ms: u64) -> u64 {
        let mut rng = rand::rng();
        let jitter_range = backoff_ms as f64 * self.jitter_factor;
        let min = (backoff_ms as f64 - jitter_range).max(0.0);
        let max = backoff_ms as f64 + jitter_range;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let jittered = rng.random_range(min..=max) as u64;
        jittered
    }
}

/// Whether an HTTP status code warrants an automatic retry.
///
/// 429 and 5xx are transient; 408 is a server-side request timeout.
/// Other 4xx codes (including 401) are never retried.
#[must_use]
pub fn is_retryable_status(status_code: u16) -> bool {
    matches!(status_code, 408 | 429) || (500..600).contains(&status_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_backoff_ms: 100,
            max_backoff_ms: 1_000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        }
    }

    #[test]
    fn backoff_doubles_until_capped() {
        let mut backoff = ExponentialBackoff::new(&policy(5));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(400)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(800)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(1_000)));
        assert_eq!(backoff.next_backoff(), None);
    }

    #[test]
    fn zero_attempts_never_retries() {
        let mut backoff = ExponentialBackoff::new(&policy(0));
        assert_eq!(backoff.next_backoff(), None);
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let config = RetryConfig {
            jitter_factor: 0.2,
            ..policy(10)
        };
        let mut backoff = ExponentialBackoff::new(&config);
        let first = backoff.next_backoff().unwrap().as_millis() as u64;
        assert!((80..=120).contains(&first));
    }

    #[test]
    fn retryable_statuses() {
        for status in [408, 429, 500, 502, 503, 504, 599] {
            assert!(is_retryable_status(status), "{status} should retry");
        }
        for status in [200, 400, 401, 403, 404, 422] {
            assert!(!is_retryable_status(status), "{status} should not retry");
        }
    }
}
