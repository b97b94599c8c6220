//! Execution mode, guards and HTTP retry policy.

use serde::{Deserialize, Serialize};

/// How orders are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Never touch a broker; return synthetic receipts.
    #[default]
    Simulate,
    /// Dispatch to paper-trading endpoints.
    Paper,
    /// Dispatch to live endpoints.
    Live,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulate => write!(f, "simulate"),
            Self::Paper => write!(f, "paper"),
            Self::Live => write!(f, "live"),
        }
    }
}

/// Retry policy for broker HTTP calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum retry attempts after the initial call.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Initial backoff in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff ceiling in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Exponential growth factor.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Jitter factor (0.2 = ±20%).
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

/// Execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Dispatch mode.
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Explicit opt-in for paper/live dispatch. Off by default so a
    /// misconfigured mode cannot send orders.
    #[serde(default)]
    pub paper_execute: bool,
    /// Hard per-order quantity ceiling. `None` disables the cap.
    #[serde(default)]
    pub max_qty_cap: Option<u64>,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Broker used when the plan states no preference.
    #[serde(default = "default_broker")]
    pub default_broker: String,
    /// Retry policy for broker calls.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            paper_execute: false,
            max_qty_cap: None,
            http_timeout_secs: default_http_timeout_secs(),
            default_broker: default_broker(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_jitter_factor() -> f64 {
    0.2
}

fn default_http_timeout_secs() -> u64 {
    20
}

fn default_broker() -> String {
    "ibkr".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_lowercase() {
        let mode: ExecutionMode = serde_yaml_bw::from_str("paper").unwrap();
        assert_eq!(mode, ExecutionMode::Paper);
    }

    #[test]
    fn defaults_are_safe() {
        let cfg = ExecutionConfig::default();
        assert_eq!(cfg.mode, ExecutionMode::Simulate);
        assert!(!cfg.paper_execute);
        assert!(cfg.max_qty_cap.is_none());
        assert_eq!(cfg.default_broker, "ibkr");
    }
}
