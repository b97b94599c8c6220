//! Account information supplied by the caller.

use serde::{Deserialize, Serialize};

/// Intended holding period of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    /// Same day.
    Intraday,
    /// A few days.
    Swing,
    /// Weeks.
    Position,
}

/// Account parameters driving position sizing and broker selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Total account equity.
    #[serde(default)]
    pub account_size: f64,
    /// Fraction of equity risked per trade, in (0, 1].
    #[serde(default = "default_max_risk_per_trade")]
    pub max_risk_per_trade: f64,
    /// Intended holding period, if known.
    #[serde(default)]
    pub time_horizon: Option<TimeHorizon>,
    /// Preferred broker name (ibkr, oanda, alpaca, tradier, simulate).
    #[serde(default)]
    pub broker_preference: Option<String>,
}

impl Default for AccountInfo {
    fn default() -> Self {
        Self {
            account_size: 0.0,
            max_risk_per_trade: default_max_risk_per_trade(),
            time_horizon: None,
            broker_preference: None,
        }
    }
}

fn default_max_risk_per_trade() -> f64 {
    0.01
}
