//! Configuration loading, validation and environment variable
//! interpolation for all execution-core components.
//!
//! ```rust,ignore
//! use execution_core::config::load_config;
//!
//! let config = load_config(None)?; // config.yaml
//! println!("mode: {}", config.execution.mode);
//! ```

mod brokers;
mod circuit_breaker;
mod execution;
mod observability;
mod scanner;
mod validation;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use brokers::{AlpacaConfig, BrokersConfig, IbkrConfig, OandaConfig, TradierConfig};
pub use circuit_breaker::CircuitBreakerConfig;
pub use execution::{ExecutionConfig, ExecutionMode, RetryConfig};
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use scanner::ScannerConfig;
pub use validation::ValidationConfig;

use crate::models::AccountInfo;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Execution mode, guards and retry policy.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Per-broker endpoints and credentials.
    #[serde(default)]
    pub brokers: BrokersConfig,
    /// Circuit breaker thresholds.
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
    /// Trade-plan validation thresholds.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Scan loop settings.
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// Account parameters for position sizing.
    #[serde(default)]
    pub account: AccountInfo,
    /// Logging settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Load configuration from a YAML file with environment variable
/// interpolation.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or
/// validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let mut result = input.to_string();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    for cap in re.captures_iter(input) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let Some(var_match) = cap.get(1) else {
            continue;
        };
        let full_match = full_match.as_str();
        let var_name = var_match.as_str();
        let default_value = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        };

        result = result.replace(full_match, &value);
    }

    result
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.account.account_size < 0.0 {
        return Err(ConfigError::ValidationError(
            "account.account_size must not be negative".to_string(),
        ));
    }

    let risk = config.account.max_risk_per_trade;
    if risk <= 0.0 || risk > 1.0 {
        return Err(ConfigError::ValidationError(
            "account.max_risk_per_trade must be in (0.0, 1.0]".to_string(),
        ));
    }

    if config.validation.max_entry_deviation <= 0.0 || config.validation.max_stop_distance <= 0.0 {
        return Err(ConfigError::ValidationError(
            "validation thresholds must be positive".to_string(),
        ));
    }

    if config.circuit_breaker.n_errors == 0 || config.circuit_breaker.n_losses == 0 {
        return Err(ConfigError::ValidationError(
            "circuit_breaker thresholds must be at least 1".to_string(),
        ));
    }

    if config.scanner.analysis_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "scanner.analysis_concurrency must be at least 1".to_string(),
        ));
    }

    if config.execution.http_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "execution.http_timeout_secs must be at least 1".to_string(),
        ));
    }

    let known_brokers = ["ibkr", "oanda", "alpaca", "tradier", "simulate"];
    if !known_brokers.contains(&config.execution.default_broker.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "execution.default_broker must be one of: {known_brokers:?}"
        )));
    }

    Ok(())
}
