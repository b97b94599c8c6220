//! IBKR Client Portal adapter.
//!
//! The gateway is session-cookie authenticated; a 401 means the session
//! needs to be re-established out of band. Contract ids are resolved
//! through the secdef search endpoint and cached for the process
//! lifetime.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::IbkrConfig;
use crate::execution::brokers::{sec_type_for, BrokerAdapter, OrderRequest, Side};
use crate::execution::error::ExecutionError;
use crate::execution::http::BrokerHttpClient;

/// IBKR Client Portal broker.
pub struct IbkrBroker {
    http: BrokerHttpClient,
    base_url: String,
    configured_account: String,
    // Discovered account id and conid cache; writes serialized so a
    // cache miss is looked up once.
    account_id: Mutex<Option<String>>,
    conid_cache: Mutex<HashMap<String, i64>>,
}

impl IbkrBroker {
    /// Adapter from config and a shared HTTP client.
    #[must_use]
    pub fn new(config: &IbkrConfig, http: BrokerHttpClient) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            configured_account: config.account_id.clone(),
            account_id: Mutex::new(None),
            conid_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Account id, from config or discovered via `GET /iserver/accounts`.
    async fn resolve_account(&self) -> Result<String, ExecutionError> {
        if !self.configured_account.is_empty() {
            return Ok(self.configured_account.clone());
        }

        let mut cached = self.account_id.lock().await;
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let url = format!("{}/iserver/accounts", self.base_url);
        let body = self.http.send_with_retry(|c| c.get(&url)).await?;

        let id = body
            .get("selectedAccount")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                body.get("accounts")
                    .and_then(Value::as_array)
                    .and_then(|a| a.first())
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .ok_or_else(|| ExecutionError::Api {
                status: 200,
                body: "no account in /iserver/accounts response".to_string(),
            })?;

        debug!(account = %id, "discovered ibkr account");
        *cached = Some(id.clone());
        Ok(id)
    }

    /// Contract id for symbol + security type, cached after first lookup.
    async fn resolve_conid(&self, symbol: &str, sec_type: &str) -> Result<i64, ExecutionError> {
        let key = format!("{symbol}_{sec_type}");

        let mut cache = self.conid_cache.lock().await;
        if let Some(conid) = cache.get(&key) {
            return Ok(*conid);
        }

        let url = format!("{}/iserver/secdef/search", self.base_url);
        let body = self
            .http
            .send_with_retry(|c| {
                c.post(&url)
                    .json(&json!({"symbol": symbol, "secType": sec_type}))
            })
            .await?;

        let conid = body
            .as_array()
            .and_then(|results| results.first())
            .and_then(|first| first.get("conid"))
            .and_then(|c| {
                // The gateway returns conid as either number or string.
                c.as_i64()
                    .or_else(|| c.as_str().and_then(|s| s.parse().ok()))
            })
            .ok_or_else(|| ExecutionError::ContractNotFound {
                symbol: symbol.to_string(),
                sec_type: sec_type.to_string(),
            })?;

        cache.insert(key, conid);
        Ok(conid)
    }

    /// Buying power from the account summary; `None` when the lookup
    /// fails (a warning, not fatal).
    async fn buying_power(&self, account: &str) -> Option<f64> {
        let url = format!("{}/iserver/account/{account}/summary", self.base_url);
        match self.http.send_with_retry(|c| c.get(&url)).await {
            Ok(body) => parse_buying_power(&body),
            Err(e) => {
                warn!(error = %e, "buying power lookup failed, skipping guard");
                None
            }
        }
    }
}

/// Buying power from the `/iserver/account/{id}/summary` response. The
/// gateway reports it as an `accountSummary` array of tag/value items;
/// older builds return a flat map keyed by tag.
fn parse_buying_power(body: &Value) -> Option<f64> {
    if let Some(items) = body.get("accountSummary").and_then(Value::as_array) {
        return items
            .iter()
            .find(|item| item.get("tag").and_then(Value::as_str) == Some("BuyingPower"))
            .and_then(|item| item.get("value"))
            .and_then(number_or_numeric_str);
    }
    body.get("BuyingPower")
        .or_else(|| body.get("buyingpower"))
        .and_then(|bp| bp.get("amount").or(Some(bp)))
        .and_then(number_or_numeric_str)
}

fn number_or_numeric_str(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
}

#[async_trait]
impl BrokerAdapter for IbkrBroker {
    fn name(&self) -> &'static str {
        "ibkr"
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<Value, ExecutionError> {
        let account = self.resolve_account().await?;
        let sec_type = sec_type_for(&order.instrument_type);
        let conid = self.resolve_conid(&order.symbol, sec_type).await?;

        // Pre-trade guard: estimated cost against buying power, only
        // when a limit price makes the estimate meaningful.
        if order.side == Side::Buy {
            if let Some(limit) = order.limit_price {
                let required = order.quantity as f64 * limit;
                if let Some(available) = self.buying_power(&account).await {
                    if required > available {
                        return Err(ExecutionError::InsufficientBuyingPower {
                            required,
                            available,
                        });
                    }
                }
            }
        }

        let mut payload = json!({
            "account": account,
            "conid": conid,
            "orderType": order.order_type.to_uppercase(),
            "side": order.side.as_lowercase(),
            "tif": "DAY",
            "quantity": order.quantity,
            "outsideRTH": false,
            "cOID": order.client_order_id,
        });
        if order.is_limit() {
            if let Some(limit) = order.limit_price {
                payload["price"] = json!(limit);
            }
        }

        let url = format!("{}/iserver/account/{account}/orders", self.base_url);
        self.http
            .send_with_retry(|c| c.post(&url).json(&json!({"orders": [payload.clone()]})))
            .await
    }
}
