//! OANDA v20 adapter for FX orders.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::OandaConfig;
use crate::execution::brokers::{BrokerAdapter, OrderRequest, Side};
use crate::execution::error::ExecutionError;
use crate::execution::http::BrokerHttpClient;

/// OANDA v20 broker; bearer-token auth, signed units instead of a side
/// field.
pub struct OandaBroker {
    http: BrokerHttpClient,
    base_url: String,
    account_id: String,
    api_token: String,
}

impl OandaBroker {
    /// Adapter from config and a shared HTTP client.
    #[must_use]
    pub fn new(config: &OandaConfig, http: BrokerHttpClient) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
            api_token: config.api_token.clone(),
        }
    }
}

#[async_trait]
impl BrokerAdapter for OandaBroker {
    fn name(&self) -> &'static str {
        "oanda"
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<Value, ExecutionError> {
        if self.api_token.is_empty() {
            return Err(ExecutionError::MissingCredentials {
                broker: "oanda",
                detail: "api_token".to_string(),
            });
        }
        if self.account_id.is_empty() {
            return Err(ExecutionError::MissingCredentials {
                broker: "oanda",
                detail: "account_id".to_string(),
            });
        }

        // v20 encodes the side in the sign of the units string.
        let units = match order.side {
            Side::Buy => format!("{}", order.quantity),
            Side::Sell => format!("-{}", order.quantity),
        };

        let payload = json!({
            "order": {
                "instrument": order.symbol,
                "units": units,
                "type": "MARKET",
                "timeInForce": "FOK",
                "positionFill": "DEFAULT",
                "clientExtensions": {"id": order.client_order_id},
            }
        });

        let url = format!("{}/v3/accounts/{}/orders", self.base_url, self.account_id);
        self.http
            .send_with_retry(|c| c.post(&url).bearer_auth(&self.api_token).json(&payload))
            .await
    }
}
