//! Scan loop: analysis fan-out, validation, breaker gate and execution.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::analysis::{AnalysisPort, MarketDataPort};
use crate::config::Config;
use crate::execution::{ExecutionError, ExecutionRouter};
use crate::models::{AccountInfo, MarketMeta, OrderReceipt, TradePlan};
use crate::risk::{CircuitBreaker, TradePlanValidator, ValidationProfile};

/// Independent per-symbol analysis agents, fanned out concurrently.
pub const ANALYSIS_AGENTS: [&str; 7] = [
    "regime_agent",
    "trend_dow_agent",
    "sr_formations_agent",
    "momentum_agent",
    "volume_oi_agent",
    "candlestick_agent",
    "intermarket_agent",
];

const SYNTHESIS_AGENT: &str = "synthese_agent";
const SIGNAL_AGENT: &str = "signal_scanner_agent";
const PLAN_AGENT: &str = "handels_agent";

/// Chart bar size and lookback window for a timeframe label.
#[must_use]
pub fn map_timeframe(timeframe: &str) -> (String, u32) {
    match timeframe {
        "1D" => ("1 day".to_string(), 180),
        "1H" => ("1 hour".to_string(), 60),
        "5m" => ("5 mins".to_string(), 10),
        other => (other.to_string(), 120),
    }
}

/// Result of one symbol's pipeline run.
#[derive(Debug)]
pub struct SymbolOutcome {
    /// Symbol processed.
    pub symbol: String,
    /// Plan after validation and sizing.
    pub plan: TradePlan,
    /// Terminal execution receipt.
    pub receipt: OrderReceipt,
}

/// Sequences analysis, validation, the breaker gate and execution for a
/// watchlist.
///
/// Owns the circuit breaker; one orchestrator per scanning session.
pub struct Orchestrator {
    analysis: Arc<dyn AnalysisPort>,
    market_data: Arc<dyn MarketDataPort>,
    router: ExecutionRouter,
    breaker: CircuitBreaker,
    account: AccountInfo,
    watchlist: Vec<String>,
    timeframe: String,
    analysis_concurrency: usize,
    analysis_timeout: Duration,
    scan_validator: TradePlanValidator,
    strict_validator: TradePlanValidator,
}

impl Orchestrator {
    /// Build the orchestrator and its router from config.
    ///
    /// # Errors
    ///
    /// Returns an `ExecutionError` if the router cannot be built.
    pub fn new(
        config: &Config,
        analysis: Arc<dyn AnalysisPort>,
        market_data: Arc<dyn MarketDataPort>,
    ) -> Result<Self, ExecutionError> {
        let router = ExecutionRouter::new(config)?;
        let breaker = CircuitBreaker::new(
            config.circuit_breaker.n_errors,
            config.circuit_breaker.n_losses,
            Duration::from_secs(config.circuit_breaker.cooldown_seconds),
        );
        let thresholds = (
            config.validation.max_entry_deviation,
            config.validation.max_stop_distance,
        );

        Ok(Self {
            analysis,
            market_data,
            router,
            breaker,
            account: config.account.clone(),
            watchlist: config.scanner.watchlist.clone(),
            timeframe: config.scanner.timeframe.clone(),
            analysis_concurrency: config.scanner.analysis_concurrency,
            analysis_timeout: Duration::from_secs(config.scanner.analysis_timeout_secs),
            scan_validator: TradePlanValidator::new(config.validation.profile)
                .with_thresholds(thresholds.0, thresholds.1),
            strict_validator: TradePlanValidator::new(ValidationProfile::Strict)
                .with_thresholds(thresholds.0, thresholds.1),
        })
    }

    /// Breaker state, for diagnostics.
    #[must_use]
    pub fn breaker_snapshot(&self) -> crate::risk::BreakerSnapshot {
        self.breaker.snapshot()
    }

    /// Record a realized trade result on the breaker.
    pub fn record_trade_result(&mut self, won: bool) {
        if won {
            self.breaker.record_win();
        } else {
            self.breaker.record_loss();
        }
    }

    /// One sequential pass over the watchlist.
    pub async fn scan(&mut self) -> Vec<SymbolOutcome> {
        let symbols = self.watchlist.clone();
        let validator = self.scan_validator;
        let mut outcomes = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            let outcome = self.run_pipeline(symbol, validator).await;
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Run one symbol through the full pipeline with strict validation.
    pub async fn run_symbol(&mut self, symbol: &str) -> SymbolOutcome {
        let validator = self.strict_validator;
        self.run_pipeline(symbol, validator).await
    }

    async fn run_pipeline(
        &mut self,
        symbol: &str,
        validator: TradePlanValidator,
    ) -> SymbolOutcome {
        let (bar_size, lookback_days) = map_timeframe(&self.timeframe);

        let data = match self.market_data.fetch(symbol, &bar_size, lookback_days).await {
            Ok(data) => data,
            Err(e) => {
                warn!(symbol, error = %e, "market data fetch failed");
                self.breaker.record_error();
                return SymbolOutcome {
                    symbol: symbol.to_string(),
                    plan: TradePlan::default(),
                    receipt: OrderReceipt::error(e.to_string()),
                };
            }
        };
        let meta = MarketMeta::from_candles(&data.candles);

        let analyses = self.gather_analyses(symbol, &data.candles, &bar_size).await;

        let plan_value = self.plan_from_analyses(symbol, &analyses).await;
        let mut plan = TradePlan::from_value(plan_value);
        if plan.symbol.is_empty() {
            plan.symbol = symbol.to_string();
        }

        plan = validator.validate_and_size(plan, &self.account, &meta);

        // Gate every execution attempt on the breaker.
        if !self.breaker.allow() {
            info!(symbol, "circuit breaker open, skipping execution");
            return SymbolOutcome {
                symbol: symbol.to_string(),
                plan,
                receipt: OrderReceipt::blocked("circuit breaker open"),
            };
        }

        let preference = self.account.broker_preference.clone();
        let receipt = self
            .router
            .execute_trade_plan(&mut plan, preference.as_deref())
            .await;

        match receipt.status {
            crate::models::ReceiptStatus::Error => self.breaker.record_error(),
            crate::models::ReceiptStatus::Sent | crate::models::ReceiptStatus::Simulated => {
                self.breaker.record_success();
            }
            _ => {}
        }

        SymbolOutcome {
            symbol: symbol.to_string(),
            plan,
            receipt,
        }
    }

    /// Fan the independent agents out under the concurrency ceiling.
    ///
    /// A timed-out or failed call yields an error placeholder without
    /// aborting its siblings.
    async fn gather_analyses(
        &self,
        symbol: &str,
        candles: &[crate::models::Candle],
        bar_size: &str,
    ) -> Map<String, Value> {
        let payload = json!({
            "symbol": symbol,
            "timeframe": bar_size,
            "candles": candles,
        });

        let results: Vec<(&str, Value)> = stream::iter(ANALYSIS_AGENTS)
            .map(|agent| {
                let analysis = Arc::clone(&self.analysis);
                let payload = payload.clone();
                let timeout = self.analysis_timeout;
                async move {
                    let result =
                        tokio::time::timeout(timeout, analysis.call(agent, payload)).await;
                    let value = match result {
                        Ok(Ok(value)) => value,
                        Ok(Err(e)) => {
                            warn!(agent, error = %e, "analysis call failed");
                            json!({"agent": agent, "error": e.to_string()})
                        }
                        Err(_) => {
                            warn!(agent, timeout_secs = timeout.as_secs(), "analysis call timed out");
                            json!({
                                "agent": agent,
                                "error": format!("timed out after {}s", timeout.as_secs()),
                            })
                        }
                    };
                    (agent, value)
                }
            })
            .buffered(self.analysis_concurrency)
            .collect()
            .await;

        let mut map = Map::new();
        for (agent, value) in results {
            map.insert(agent.to_string(), value);
        }
        map
    }

    /// Synthesis, signal and trade-plan calls, strictly sequential.
    async fn plan_from_analyses(&self, symbol: &str, analyses: &Map<String, Value>) -> Value {
        let synthesis = self
            .call_or_placeholder(
                SYNTHESIS_AGENT,
                json!({"symbol": symbol, "analyses": analyses}),
            )
            .await;

        let signal = self
            .call_or_placeholder(
                SIGNAL_AGENT,
                json!({"symbol": symbol, "synthesis": synthesis}),
            )
            .await;

        self.call_or_placeholder(
            PLAN_AGENT,
            json!({
                "symbol": symbol,
                "signal": signal,
                "account": self.account,
            }),
        )
        .await
    }

    async fn call_or_placeholder(&self, agent: &str, payload: Value) -> Value {
        let result = tokio::time::timeout(self.analysis_timeout, self.analysis.call(agent, payload))
            .await;
        match result {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!(agent, error = %e, "analysis call failed");
                json!({"action": "no_trade", "reason": format!("{agent} failed: {e}")})
            }
            Err(_) => {
                warn!(agent, "analysis call timed out");
                json!({
                    "action": "no_trade",
                    "reason": format!("{agent} timed out after {}s", self.analysis_timeout.as_secs()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_mapping() {
        assert_eq!(map_timeframe("1D"), ("1 day".to_string(), 180));
        assert_eq!(map_timeframe("1H"), ("1 hour".to_string(), 60));
        assert_eq!(map_timeframe("5m"), ("5 mins".to_string(), 10));
        assert_eq!(map_timeframe("15m"), ("15m".to_string(), 120));
    }
}
