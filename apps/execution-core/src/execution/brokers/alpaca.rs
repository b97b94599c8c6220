//! Alpaca trading API adapter.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::AlpacaConfig;
use crate::execution::brokers::{BrokerAdapter, OrderRequest};
use crate::execution::error::ExecutionError;
use crate::execution::http::BrokerHttpClient;

/// Alpaca broker; key/secret header auth.
pub struct AlpacaBroker {
    http: BrokerHttpClient,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl AlpacaBroker {
    /// Adapter from config and a shared HTTP client.
    #[must_use]
    pub fn new(config: &AlpacaConfig, http: BrokerHttpClient) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }
}

/// Alpaca order type for a plan order type.
fn order_type_for(order: &OrderRequest) -> &'static str {
    match order.order_type.to_uppercase().as_str() {
        "LMT" | "LIMIT" => "limit",
        "STOP" | "STP" => "stop",
        "STOP_LIMIT" => "stop_limit",
        _ => "market",
    }
}

#[async_trait]
impl BrokerAdapter for AlpacaBroker {
    fn name(&self) -> &'static str {
        "alpaca"
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<Value, ExecutionError> {
        if self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(ExecutionError::MissingCredentials {
                broker: "alpaca",
                detail: "api_key/api_secret".to_string(),
            });
        }

        let order_type = order_type_for(order);
        let mut payload = json!({
            "symbol": order.symbol,
            "side": order.side.as_lowercase(),
            "type": order_type,
            "qty": order.quantity.to_string(),
            "time_in_force": "day",
            "client_order_id": order.client_order_id,
        });
        if matches!(order_type, "limit" | "stop_limit") {
            if let Some(limit) = order.limit_price {
                payload["limit_price"] = json!(limit.to_string());
            }
        }

        let url = format!("{}/v2/orders", self.base_url);
        self.http
            .send_with_retry(|c| {
                c.post(&url)
                    .header("APCA-API-KEY-ID", &self.api_key)
                    .header("APCA-API-SECRET-KEY", &self.api_secret)
                    .json(&payload)
            })
            .await
    }
}
