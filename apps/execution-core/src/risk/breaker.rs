//! Circuit breaker gating live order submission.
//!
//! The breaker trips open after a run of consecutive transport errors or
//! realized losses and stays open for a cooldown window. Expiry is lazy:
//! the state only transitions back to closed when [`CircuitBreaker::allow`]
//! observes that the window has elapsed.

use std::time::{Duration, Instant};

use tracing::{info, warn};

/// Point-in-time view of the breaker, for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    /// Whether new submissions are currently blocked.
    pub open: bool,
    /// Consecutive transport errors since the last success or reset.
    pub error_count: u32,
    /// Consecutive realized losses since the last win or reset.
    pub loss_count: u32,
}

/// Consecutive-failure circuit breaker.
///
/// Owned by the orchestrator and driven single-threaded, so all state
/// transitions go through `&mut self`.
#[derive(Debug)]
pub struct CircuitBreaker {
    max_errors: u32,
    max_losses: u32,
    cooldown: Duration,
    error_count: u32,
    loss_count: u32,
    opened_at: Option<Instant>,
}

impl CircuitBreaker {
    /// Breaker with explicit thresholds and cooldown window.
    #[must_use]
    pub fn new(max_errors: u32, max_losses: u32, cooldown: Duration) -> Self {
        Self {
            max_errors,
            max_losses,
            cooldown,
            error_count: 0,
            loss_count: 0,
            opened_at: None,
        }
    }

    /// Whether a new submission may proceed.
    ///
    /// Transitions open -> closed (clearing both counters) when the
    /// cooldown has expired.
    pub fn allow(&mut self) -> bool {
        if let Some(opened_at) = self.opened_at {
            if opened_at.elapsed() >= self.cooldown {
                info!("circuit breaker cooldown expired, closing");
                self.reset();
                return true;
            }
            return false;
        }
        true
    }

    /// Record a transport or broker error; trips when the threshold is hit.
    pub fn record_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
        if self.error_count >= self.max_errors {
            self.trip("consecutive errors");
        }
    }

    /// Record a realized losing trade; trips when the threshold is hit.
    pub fn record_loss(&mut self) {
        self.loss_count = self.loss_count.saturating_add(1);
        if self.loss_count >= self.max_losses {
            self.trip("consecutive losses");
        }
    }

    /// Record a success on the given dimension, clearing its counter.
    pub fn record_success(&mut self) {
        self.error_count = 0;
    }

    /// Record a winning trade, clearing the loss counter.
    pub fn record_win(&mut self) {
        self.loss_count = 0;
    }

    /// Close the breaker immediately and clear all counters.
    pub fn reset(&mut self) {
        self.error_count = 0;
        self.loss_count = 0;
        self.opened_at = None;
    }

    /// Current state without mutating it (an expired cooldown still
    /// reports open until the next `allow` call).
    #[must_use]
    pub fn snapshot(&self) -> BreakerSnapshot {
        BreakerSnapshot {
            open: self.opened_at.is_some(),
            error_count: self.error_count,
            loss_count: self.loss_count,
        }
    }

    fn trip(&mut self, cause: &str) {
        // Re-tripping while already open must not extend the window.
        if self.opened_at.is_some() {
            return;
        }
        warn!(
            cause,
            error_count = self.error_count,
            loss_count = self.loss_count,
            cooldown_secs = self.cooldown.as_secs(),
            "circuit breaker opened"
        );
        self.opened_at = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(5, 3, Duration::from_secs(3600))
    }

    #[test]
    fn closed_breaker_allows() {
        let mut cb = breaker();
        assert!(cb.allow());
        assert!(!cb.snapshot().open);
    }

    #[test]
    fn trips_after_consecutive_errors() {
        let mut cb = breaker();
        for _ in 0..4 {
            cb.record_error();
            assert!(cb.allow());
        }
        cb.record_error();
        assert!(!cb.allow());
        assert!(cb.snapshot().open);
    }

    #[test]
    fn trips_after_consecutive_losses() {
        let mut cb = breaker();
        cb.record_loss();
        cb.record_loss();
        assert!(cb.allow());
        cb.record_loss();
        assert!(!cb.allow());
    }

    #[test]
    fn success_clears_error_streak() {
        let mut cb = breaker();
        for _ in 0..4 {
            cb.record_error();
        }
        cb.record_success();
        cb.record_error();
        assert!(cb.allow());
        assert_eq!(cb.snapshot().error_count, 1);
    }

    #[test]
    fn retrip_while_open_does_not_extend_window() {
        let mut cb = CircuitBreaker::new(1, 3, Duration::from_millis(50));
        cb.record_error();
        let first = cb.opened_at;
        std::thread::sleep(Duration::from_millis(10));
        cb.record_error();
        assert_eq!(cb.opened_at, first);
    }

    #[test]
    fn cooldown_expiry_closes_and_clears() {
        let mut cb = CircuitBreaker::new(2, 3, Duration::from_millis(20));
        cb.record_error();
        cb.record_error();
        assert!(!cb.allow());
        std::thread::sleep(Duration::from_millis(30));
        assert!(cb.allow());
        let snap = cb.snapshot();
        assert!(!snap.open);
        assert_eq!(snap.error_count, 0);
        assert_eq!(snap.loss_count, 0);
    }

    #[test]
    fn manual_reset_closes_immediately() {
        let mut cb = CircuitBreaker::new(1, 1, Duration::from_secs(3600));
        cb.record_loss();
        assert!(!cb.allow());
        cb.reset();
        assert!(cb.allow());
    }
}
