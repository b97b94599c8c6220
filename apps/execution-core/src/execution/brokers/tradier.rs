//! Tradier brokerage API adapter.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::TradierConfig;
use crate::execution::brokers::{BrokerAdapter, OrderRequest};
use crate::execution::error::ExecutionError;
use crate::execution::http::BrokerHttpClient;

/// Tradier broker; bearer-token auth, form-encoded order bodies.
pub struct TradierBroker {
    http: BrokerHttpClient,
    base_url: String,
    account_id: String,
    access_token: String,
}

impl TradierBroker {
    /// Adapter from config and a shared HTTP client.
    #[must_use]
    pub fn new(config: &TradierConfig, http: BrokerHttpClient) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
            access_token: config.access_token.clone(),
        }
    }
}

#[async_trait]
impl BrokerAdapter for TradierBroker {
    fn name(&self) -> &'static str {
        "tradier"
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<Value, ExecutionError> {
        if self.access_token.is_empty() {
            return Err(ExecutionError::MissingCredentials {
                broker: "tradier",
                detail: "access_token".to_string(),
            });
        }
        if self.account_id.is_empty() {
            return Err(ExecutionError::MissingCredentials {
                broker: "tradier",
                detail: "account_id".to_string(),
            });
        }

        let order_type = if order.is_limit() { "limit" } else { "market" };
        let mut form = vec![
            ("class".to_string(), "equity".to_string()),
            ("symbol".to_string(), order.symbol.clone()),
            ("side".to_string(), order.side.as_lowercase().to_string()),
            ("quantity".to_string(), order.quantity.to_string()),
            ("type".to_string(), order_type.to_string()),
            ("duration".to_string(), "day".to_string()),
            ("tag".to_string(), order.client_order_id.clone()),
        ];
        if order.is_limit() {
            if let Some(limit) = order.limit_price {
                form.push(("price".to_string(), limit.to_string()));
            }
        }

        let url = format!("{}/accounts/{}/orders", self.base_url, self.account_id);
        self.http
            .send_with_retry(|c| {
                c.post(&url)
                    .bearer_auth(&self.access_token)
                    .header("Accept", "application/json")
                    .form(&form)
            })
            .await
    }
}
