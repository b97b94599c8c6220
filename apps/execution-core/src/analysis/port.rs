//! Async traits for the reasoning and market-data collaborators.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::MarketData;

/// Errors from analysis or market-data calls.
#[derive(Debug, Error, Clone)]
pub enum AnalysisError {
    /// The collaborator call failed.
    #[error("analysis call '{agent}' failed: {detail}")]
    Call {
        /// Agent that was called.
        agent: String,
        /// Failure detail.
        detail: String,
    },

    /// The call ran past its per-call timeout.
    #[error("analysis call '{agent}' timed out after {seconds}s")]
    Timeout {
        /// Agent that was called.
        agent: String,
        /// Timeout that elapsed.
        seconds: u64,
    },

    /// Market data could not be fetched.
    #[error("market data unavailable for {symbol}: {detail}")]
    MarketData {
        /// Symbol requested.
        symbol: String,
        /// Failure detail.
        detail: String,
    },
}

/// Opaque reasoning collaborator.
///
/// The core does not interpret the payloads beyond the trade-plan field
/// contract; agents are addressed by name.
#[async_trait]
pub trait AnalysisPort: Send + Sync {
    /// Call the named agent with a JSON payload.
    async fn call(&self, agent: &str, payload: Value) -> Result<Value, AnalysisError>;
}

/// Market-data collaborator supplying candles for one symbol.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Fetch candles for a symbol at the given bar size and lookback.
    async fn fetch(
        &self,
        symbol: &str,
        bar_size: &str,
        lookback_days: u32,
    ) -> Result<MarketData, AnalysisError>;
}
