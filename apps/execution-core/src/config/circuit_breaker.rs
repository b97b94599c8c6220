//! Circuit breaker thresholds.

use serde::{Deserialize, Serialize};

/// Circuit breaker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive errors that trip the breaker.
    #[serde(default = "default_n_errors")]
    pub n_errors: u32,
    /// Consecutive losses that trip the breaker.
    #[serde(default = "default_n_losses")]
    pub n_losses: u32,
    /// How long the breaker stays open, in seconds.
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            n_errors: default_n_errors(),
            n_losses: default_n_losses(),
            cooldown_seconds: default_cooldown_seconds(),
        }
    }
}

fn default_n_errors() -> u32 {
    5
}

fn default_n_losses() -> u32 {
    3
}

fn default_cooldown_seconds() -> u64 {
    3600
}
