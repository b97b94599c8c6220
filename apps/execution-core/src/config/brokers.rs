//! Per-broker base URLs and credentials.

use serde::{Deserialize, Serialize};

/// Broker configuration for order routing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BrokersConfig {
    /// IBKR Client Portal configuration.
    #[serde(default)]
    pub ibkr: IbkrConfig,
    /// OANDA v20 configuration.
    #[serde(default)]
    pub oanda: OandaConfig,
    /// Alpaca trading API configuration.
    #[serde(default)]
    pub alpaca: AlpacaConfig,
    /// Tradier brokerage API configuration.
    #[serde(default)]
    pub tradier: TradierConfig,
}

/// IBKR Client Portal gateway configuration. Auth is the gateway's
/// session cookie, so no credentials are stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbkrConfig {
    /// Gateway base URL.
    #[serde(default = "default_ibkr_base_url")]
    pub base_url: String,
    /// Account id; discovered via the accounts endpoint when empty.
    #[serde(default)]
    pub account_id: String,
    /// Accept the gateway's self-signed certificate.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for IbkrConfig {
    fn default() -> Self {
        Self {
            base_url: default_ibkr_base_url(),
            account_id: String::new(),
            accept_invalid_certs: false,
        }
    }
}

/// OANDA v20 configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OandaConfig {
    /// API base URL.
    #[serde(default = "default_oanda_base_url")]
    pub base_url: String,
    /// Account id.
    #[serde(default)]
    pub account_id: String,
    /// Bearer token.
    #[serde(default)]
    pub api_token: String,
}

impl Default for OandaConfig {
    fn default() -> Self {
        Self {
            base_url: default_oanda_base_url(),
            account_id: String::new(),
            api_token: String::new(),
        }
    }
}

/// Alpaca trading API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlpacaConfig {
    /// API base URL.
    #[serde(default = "default_alpaca_base_url")]
    pub base_url: String,
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API secret.
    #[serde(default)]
    pub api_secret: String,
}

impl Default for AlpacaConfig {
    fn default() -> Self {
        Self {
            base_url: default_alpaca_base_url(),
            api_key: String::new(),
            api_secret: String::new(),
        }
    }
}

/// Tradier brokerage API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradierConfig {
    /// API base URL.
    #[serde(default = "default_tradier_base_url")]
    pub base_url: String,
    /// Account id.
    #[serde(default)]
    pub account_id: String,
    /// Bearer token.
    #[serde(default)]
    pub access_token: String,
}

impl Default for TradierConfig {
    fn default() -> Self {
        Self {
            base_url: default_tradier_base_url(),
            account_id: String::new(),
            access_token: String::new(),
        }
    }
}

fn default_ibkr_base_url() -> String {
    "https://localhost:5000/v1/api".to_string()
}

fn default_oanda_base_url() -> String {
    "https://api-fxpractice.oanda.com".to_string()
}

fn default_alpaca_base_url() -> String {
    "https://paper-api.alpaca.markets".to_string()
}

fn default_tradier_base_url() -> String {
    "https://sandbox.tradier.com/v1".to_string()
}
