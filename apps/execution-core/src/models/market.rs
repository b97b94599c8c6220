//! Market data snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single OHLCV candle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// Candle timestamp.
    pub timestamp: DateTime<Utc>,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    #[serde(default)]
    pub volume: f64,
}

/// Market data returned by the data collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketData {
    /// Historical candles, oldest first.
    #[serde(default)]
    pub candles: Vec<Candle>,
    /// Provider metadata, passed through untouched.
    #[serde(default)]
    pub meta: Value,
}

/// Snapshot of the most recent candle, used as a sanity reference only -
/// this is not a live price feed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MarketMeta {
    /// Last close price.
    pub last_close: Option<f64>,
    /// Last open price.
    pub last_open: Option<f64>,
    /// Last high price.
    pub last_high: Option<f64>,
    /// Last low price.
    pub last_low: Option<f64>,
}

impl MarketMeta {
    /// Derive the snapshot from the most recent candle.
    #[must_use]
    pub fn from_candles(candles: &[Candle]) -> Self {
        candles.last().map_or_else(Self::default, |last| Self {
            last_close: Some(last.close),
            last_open: Some(last.open),
            last_high: Some(last.high),
            last_low: Some(last.low),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(close: f64) -> Candle {
        Candle {
            timestamp: Utc::now(),
            open: close - 1.0,
            high: close + 0.5,
            low: close - 1.5,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn meta_from_last_candle() {
        let candles = vec![candle(100.0), candle(102.0)];
        let meta = MarketMeta::from_candles(&candles);
        assert_eq!(meta.last_close, Some(102.0));
        assert_eq!(meta.last_open, Some(101.0));
    }

    #[test]
    fn meta_from_empty_candles_is_all_none() {
        let meta = MarketMeta::from_candles(&[]);
        assert!(meta.last_close.is_none());
        assert!(meta.last_low.is_none());
    }
}
