//! Scan loop configuration.

use serde::{Deserialize, Serialize};

/// Scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Symbols scanned per pass, in order.
    #[serde(default)]
    pub watchlist: Vec<String>,
    /// Concurrent analysis calls per symbol.
    #[serde(default = "default_analysis_concurrency")]
    pub analysis_concurrency: usize,
    /// Per-analysis-call timeout in seconds.
    #[serde(default = "default_analysis_timeout_secs")]
    pub analysis_timeout_secs: u64,
    /// Chart timeframe requested from the data collaborator.
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            watchlist: Vec::new(),
            analysis_concurrency: default_analysis_concurrency(),
            analysis_timeout_secs: default_analysis_timeout_secs(),
            timeframe: default_timeframe(),
        }
    }
}

fn default_analysis_concurrency() -> usize {
    3
}

fn default_analysis_timeout_secs() -> u64 {
    20
}

fn default_timeframe() -> String {
    "1D".to_string()
}
