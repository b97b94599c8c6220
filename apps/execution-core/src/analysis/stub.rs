//! Canned collaborators for tests and dry runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use super::port::{AnalysisError, AnalysisPort, MarketDataPort};
use crate::models::{Candle, MarketData};

/// Analysis stub returning canned responses per agent name.
///
/// Agents without a canned response get a neutral acknowledgement, so a
/// dry run never produces an accidental trade.
#[derive(Debug, Default)]
pub struct StubAnalysis {
    responses: HashMap<String, Value>,
}

impl StubAnalysis {
    /// Empty stub; every agent answers neutrally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the response for one agent.
    #[must_use]
    pub fn with_response(mut self, agent: &str, response: Value) -> Self {
        self.responses.insert(agent.to_string(), response);
        self
    }
}

#[async_trait]
impl AnalysisPort for StubAnalysis {
    async fn call(&self, agent: &str, _payload: Value) -> Result<Value, AnalysisError> {
        Ok(self
            .responses
            .get(agent)
            .cloned()
            .unwrap_or_else(|| json!({"agent": agent, "assessment": "neutral"})))
    }
}

/// Market-data stub generating a flat candle series around a base price.
#[derive(Debug)]
pub struct StubMarketData {
    base_price: f64,
    candle_count: usize,
}

impl StubMarketData {
    /// Stub producing `candle_count` candles closing at `base_price`.
    #[must_use]
    pub const fn new(base_price: f64, candle_count: usize) -> Self {
        Self {
            base_price,
            candle_count,
        }
    }
}

#[async_trait]
impl MarketDataPort for StubMarketData {
    async fn fetch(
        &self,
        _symbol: &str,
        _bar_size: &str,
        _lookback_days: u32,
    ) -> Result<MarketData, AnalysisError> {
        let now = Utc::now();
        let candles = (0..self.candle_count)
            .map(|i| {
                let age = (self.candle_count - i) as i64;
                Candle {
                    timestamp: now - Duration::days(age),
                    open: self.base_price - 0.5,
                    high: self.base_price + 1.0,
                    low: self.base_price - 1.0,
                    close: self.base_price,
                    volume: 10_000.0,
                }
            })
            .collect();

        Ok(MarketData {
            candles,
            meta: Value::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_returns_canned_response() {
        let stub = StubAnalysis::new().with_response("regime_agent", json!({"regime": "bull"}));
        let out = stub.call("regime_agent", json!({})).await.unwrap();
        assert_eq!(out["regime"], "bull");
        let neutral = stub.call("momentum_agent", json!({})).await.unwrap();
        assert_eq!(neutral["assessment"], "neutral");
    }

    #[tokio::test]
    async fn stub_market_data_has_last_close() {
        let stub = StubMarketData::new(100.0, 30);
        let data = stub.fetch("AAPL", "1 day", 180).await.unwrap();
        assert_eq!(data.candles.len(), 30);
        assert!((data.candles.last().unwrap().close - 100.0).abs() < f64::EPSILON);
    }
}
