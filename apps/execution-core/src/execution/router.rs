//! Routes validated trade plans to broker adapters.

use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{Config, ExecutionMode};
use crate::execution::brokers::{
    AlpacaBroker, BrokerAdapter, IbkrBroker, OandaBroker, OrderRequest, Side, TradierBroker,
};
use crate::execution::error::ExecutionError;
use crate::execution::http::BrokerHttpClient;
use crate::models::{Action, Direction, OrderReceipt, TradePlan};

/// Maps a validated plan to a concrete order request, enforces the
/// quantity cap and paper/live guard, dispatches over HTTP and
/// normalizes the result into a receipt.
///
/// Every expected failure mode comes back as a receipt status; callers
/// branch on `ReceiptStatus`, not on errors.
pub struct ExecutionRouter {
    mode: ExecutionMode,
    paper_execute: bool,
    max_qty_cap: Option<u64>,
    default_broker: String,
    ibkr: IbkrBroker,
    oanda: OandaBroker,
    alpaca: AlpacaBroker,
    tradier: TradierBroker,
}

impl ExecutionRouter {
    /// Build the router and its broker adapters from config.
    ///
    /// # Errors
    ///
    /// Returns an `ExecutionError` if an HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ExecutionError> {
        let timeout = Duration::from_secs(config.execution.http_timeout_secs);
        let retry = &config.execution.retry;

        let http = BrokerHttpClient::new(timeout, retry.clone(), false)?;
        // The IBKR gateway typically runs locally with a self-signed cert.
        let ibkr_http = BrokerHttpClient::new(
            timeout,
            retry.clone(),
            config.brokers.ibkr.accept_invalid_certs,
        )?;

        Ok(Self {
            mode: config.execution.mode,
            paper_execute: config.execution.paper_execute,
            max_qty_cap: config.execution.max_qty_cap,
            default_broker: config.execution.default_broker.clone(),
            ibkr: IbkrBroker::new(&config.brokers.ibkr, ibkr_http),
            oanda: OandaBroker::new(&config.brokers.oanda, http.clone()),
            alpaca: AlpacaBroker::new(&config.brokers.alpaca, http.clone()),
            tradier: TradierBroker::new(&config.brokers.tradier, http),
        })
    }

    /// Execute a validated plan, returning a terminal receipt.
    ///
    /// The plan is taken mutably so the quantity-cap annotation lands on
    /// the caller's copy.
    pub async fn execute_trade_plan(
        &self,
        plan: &mut TradePlan,
        broker_preference: Option<&str>,
    ) -> OrderReceipt {
        if plan.action != Action::OpenPosition {
            let reason = plan
                .reason
                .clone()
                .unwrap_or_else(|| "plan does not request a position".to_string());
            return OrderReceipt::no_trade(reason);
        }
        if plan.symbol.is_empty() {
            return OrderReceipt::no_trade("plan has no symbol");
        }

        let requested_qty = plan.sized_quantity();
        if requested_qty == 0 {
            return OrderReceipt::no_trade("sized quantity is zero");
        }

        let broker = self.resolve_broker(plan, broker_preference);

        if self.mode == ExecutionMode::Simulate || broker == "simulate" {
            info!(symbol = %plan.symbol, qty = requested_qty, "simulated execution");
            return OrderReceipt::simulated(json!({
                "symbol": plan.symbol,
                "side": side_for(plan).as_str(),
                "quantity": requested_qty,
                "order_type": plan.order_type.clone().unwrap_or_else(|| "MKT".to_string()),
                "limit_price": plan.limit_price,
                "broker": broker,
            }));
        }

        if !self.paper_execute {
            return OrderReceipt::blocked(
                "paper/live execution guard disabled (execution.paper_execute=false)",
            );
        }

        let quantity = self.apply_qty_cap(plan, requested_qty);
        let order = OrderRequest {
            symbol: plan.symbol.clone(),
            side: side_for(plan),
            quantity,
            order_type: plan.order_type.clone().unwrap_or_else(|| "MKT".to_string()),
            limit_price: plan.limit_price,
            instrument_type: plan
                .instrument_type
                .clone()
                .unwrap_or_else(|| "stock".to_string()),
            client_order_id: Uuid::new_v4().to_string(),
        };

        let adapter: &dyn BrokerAdapter = match broker.as_str() {
            "ibkr" => &self.ibkr,
            "oanda" => &self.oanda,
            "alpaca" => &self.alpaca,
            "tradier" => &self.tradier,
            other => return OrderReceipt::error(format!("unknown broker: {other}")),
        };

        info!(
            symbol = %order.symbol,
            broker = adapter.name(),
            side = order.side.as_str(),
            qty = order.quantity,
            "dispatching order"
        );

        match adapter.place_order(&order).await {
            Ok(raw) => OrderReceipt::sent(adapter.name(), raw),
            Err(e) => {
                warn!(symbol = %order.symbol, broker = adapter.name(), error = %e, "order failed");
                OrderReceipt::error(e.to_string())
            }
        }
    }

    /// Broker name for this plan. A `simulate` preference (or default)
    /// wins outright so a requested dry run stays a dry run; after
    /// that, FX instruments always go to OANDA regardless of
    /// preference.
    fn resolve_broker(&self, plan: &TradePlan, preference: Option<&str>) -> String {
        let preferred = preference
            .map(str::to_lowercase)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.default_broker.clone());
        if preferred == "simulate" {
            return preferred;
        }
        let instrument = plan
            .instrument_type
            .as_deref()
            .unwrap_or("stock")
            .to_lowercase();
        if matches!(instrument.as_str(), "fx" | "forex") {
            return "oanda".to_string();
        }
        preferred
    }

    /// Clamp to the configured cap and annotate the sizing block.
    fn apply_qty_cap(&self, plan: &mut TradePlan, requested: u64) -> u64 {
        match self.max_qty_cap {
            Some(cap) if requested > cap => {
                warn!(
                    symbol = %plan.symbol,
                    requested,
                    cap,
                    "quantity capped"
                );
                let sizing = plan.position_sizing.get_or_insert_with(Default::default);
                sizing.capped = Some(true);
                sizing.requested_qty = Some(requested);
                sizing.used_qty = Some(cap);
                cap
            }
            _ => requested,
        }
    }
}

/// Order side for a plan: short sells, everything else buys.
const fn side_for(plan: &TradePlan) -> Side {
    match plan.direction {
        Some(Direction::Short) => Side::Sell,
        _ => Side::Buy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PositionSizing;

    fn router(mode: ExecutionMode, paper_execute: bool, cap: Option<u64>) -> ExecutionRouter {
        let mut config = Config::default();
        config.execution.mode = mode;
        config.execution.paper_execute = paper_execute;
        config.execution.max_qty_cap = cap;
        match ExecutionRouter::new(&config) {
            Ok(r) => r,
            Err(e) => panic!("router should build: {e}"),
        }
    }

    fn sized_plan(qty: u64) -> TradePlan {
        TradePlan {
            symbol: "AAPL".to_string(),
            action: Action::OpenPosition,
            direction: Some(Direction::Long),
            position_sizing: Some(PositionSizing {
                contracts_or_shares: qty,
                ..PositionSizing::default()
            }),
            ..TradePlan::default()
        }
    }

    #[tokio::test]
    async fn no_trade_plan_short_circuits() {
        let router = router(ExecutionMode::Simulate, false, None);
        let mut plan = TradePlan::default();
        let receipt = router.execute_trade_plan(&mut plan, None).await;
        assert_eq!(receipt.status, crate::models::ReceiptStatus::NoTrade);
    }

    #[tokio::test]
    async fn zero_quantity_short_circuits() {
        let router = router(ExecutionMode::Simulate, false, None);
        let mut plan = sized_plan(0);
        let receipt = router.execute_trade_plan(&mut plan, None).await;
        assert_eq!(receipt.status, crate::models::ReceiptStatus::NoTrade);
        assert!(receipt.reason.is_some());
    }

    #[tokio::test]
    async fn simulate_mode_returns_synthetic_receipt() {
        let router = router(ExecutionMode::Simulate, false, None);
        let mut plan = sized_plan(10);
        let receipt = router.execute_trade_plan(&mut plan, Some("alpaca")).await;
        assert_eq!(receipt.status, crate::models::ReceiptStatus::Simulated);
        let raw = receipt.raw.unwrap();
        assert_eq!(raw["quantity"], 10);
        assert_eq!(raw["side"], "BUY");
    }

    #[tokio::test]
    async fn guard_blocks_paper_dispatch() {
        let router = router(ExecutionMode::Paper, false, None);
        let mut plan = sized_plan(10);
        let receipt = router.execute_trade_plan(&mut plan, Some("alpaca")).await;
        assert_eq!(receipt.status, crate::models::ReceiptStatus::Blocked);
        assert!(receipt
            .reason
            .as_deref()
            .is_some_and(|r| r.contains("paper_execute")));
    }

    #[tokio::test]
    async fn short_direction_sells() {
        let router = router(ExecutionMode::Simulate, false, None);
        let mut plan = sized_plan(10);
        plan.direction = Some(Direction::Short);
        let receipt = router.execute_trade_plan(&mut plan, None).await;
        let raw = receipt.raw.unwrap();
        assert_eq!(raw["side"], "SELL");
    }

    #[tokio::test]
    async fn fx_routes_to_oanda_regardless_of_preference() {
        let router = router(ExecutionMode::Simulate, false, None);
        let mut plan = sized_plan(10);
        plan.instrument_type = Some("forex".to_string());
        let receipt = router.execute_trade_plan(&mut plan, Some("tradier")).await;
        let raw = receipt.raw.unwrap();
        assert_eq!(raw["broker"], "oanda");
    }

    #[tokio::test]
    async fn simulate_preference_beats_fx_override() {
        let router = router(ExecutionMode::Paper, true, None);
        let mut plan = sized_plan(10);
        plan.instrument_type = Some("fx".to_string());
        let receipt = router.execute_trade_plan(&mut plan, Some("simulate")).await;
        assert_eq!(receipt.status, crate::models::ReceiptStatus::Simulated);
        let raw = receipt.raw.unwrap();
        assert_eq!(raw["broker"], "simulate");
    }

    #[test]
    fn cap_annotates_plan() {
        let router = router(ExecutionMode::Paper, true, Some(100));
        let mut plan = sized_plan(250);
        let used = router.apply_qty_cap(&mut plan, 250);
        assert_eq!(used, 100);
        let sizing = plan.position_sizing.unwrap();
        assert_eq!(sizing.capped, Some(true));
        assert_eq!(sizing.requested_qty, Some(250));
        assert_eq!(sizing.used_qty, Some(100));
    }

    #[test]
    fn cap_is_inert_below_threshold() {
        let router = router(ExecutionMode::Paper, true, Some(100));
        let mut plan = sized_plan(50);
        let used = router.apply_qty_cap(&mut plan, 50);
        assert_eq!(used, 50);
        let sizing = plan.position_sizing.unwrap();
        assert!(sizing.capped.is_none());
    }
}
