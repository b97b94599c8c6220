//! Broker adapters behind a common order-placement port.

mod alpaca;
mod ibkr;
mod oanda;
mod tradier;

use async_trait::async_trait;
use serde_json::Value;

pub use alpaca::AlpacaBroker;
pub use ibkr::IbkrBroker;
pub use oanda::OandaBroker;
pub use tradier::TradierBroker;

use crate::execution::error::ExecutionError;

/// Order side derived from the plan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Buy to open (long) or to close a short.
    Buy,
    /// Sell to open (short) or to close a long.
    Sell,
}

impl Side {
    /// Canonical uppercase form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }

    /// Lowercase form, used by brokers with lowercase wire enums.
    #[must_use]
    pub const fn as_lowercase(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

/// A concrete order ready for dispatch, produced by the router after
/// validation, capping and side derivation.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    /// Instrument symbol.
    pub symbol: String,
    /// Order side.
    pub side: Side,
    /// Quantity after any cap was applied.
    pub quantity: u64,
    /// Order type (MKT, LMT).
    pub order_type: String,
    /// Limit price, required for limit orders.
    pub limit_price: Option<f64>,
    /// Instrument type (stock, option, future, fx).
    pub instrument_type: String,
    /// Client-side order id for audit and idempotency.
    pub client_order_id: String,
}

impl OrderRequest {
    /// Whether this is a limit-style order.
    #[must_use]
    pub fn is_limit(&self) -> bool {
        matches!(
            self.order_type.to_uppercase().as_str(),
            "LMT" | "LIMIT" | "STOP_LIMIT"
        )
    }
}

/// Order-placement port implemented by each broker adapter.
#[async_trait]
pub trait BrokerAdapter: Send + Sync {
    /// Broker name as recorded on receipts.
    fn name(&self) -> &'static str;

    /// Place the order, returning the broker's raw JSON response.
    async fn place_order(&self, order: &OrderRequest) -> Result<Value, ExecutionError>;
}

/// IBKR security-type code for an instrument type.
#[must_use]
pub fn sec_type_for(instrument_type: &str) -> &'static str {
    match instrument_type.to_lowercase().as_str() {
        "option" | "options" => "OPT",
        "future" | "futures" => "FUT",
        "fx" | "forex" => "CASH",
        _ => "STK",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sec_type_mapping() {
        assert_eq!(sec_type_for("stock"), "STK");
        assert_eq!(sec_type_for("equity"), "STK");
        assert_eq!(sec_type_for("Option"), "OPT");
        assert_eq!(sec_type_for("future"), "FUT");
        assert_eq!(sec_type_for("forex"), "CASH");
        assert_eq!(sec_type_for(""), "STK");
    }

    #[test]
    fn limit_detection() {
        let mut order = OrderRequest {
            symbol: "AAPL".to_string(),
            side: Side::Buy,
            quantity: 10,
            order_type: "MKT".to_string(),
            limit_price: None,
            instrument_type: "stock".to_string(),
            client_order_id: "test-order".to_string(),
        };
        assert!(!order.is_limit());
        order.order_type = "LMT".to_string();
        assert!(order.is_limit());
    }
}
