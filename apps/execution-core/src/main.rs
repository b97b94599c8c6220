//! Execution core binary.
//!
//! Reads a trade-plan JSON document from stdin, validates and sizes it
//! against the configured account, executes it through the router and
//! prints the receipt as JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! echo '{"symbol":"AAPL","action":"open_position",...}' | \
//!     execution-core --config config.yaml
//! ```
//!
//! Pass `--scan` to run a watchlist scanning pass with the stub
//! collaborators instead (a dry run; real collaborators are wired in by
//! the embedding service).

use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use execution_core::analysis::{StubAnalysis, StubMarketData};
use execution_core::config::load_config;
use execution_core::logging::init_logging;
use execution_core::models::{MarketMeta, TradePlan};
use execution_core::risk::{TradePlanValidator, ValidationProfile};
use execution_core::scanner::Orchestrator;
use execution_core::ExecutionRouter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str);

    let config = load_config(config_path).context("loading configuration")?;
    init_logging(&config.observability.logging);

    if args.iter().any(|a| a == "--scan") {
        let mut orchestrator = Orchestrator::new(
            &config,
            Arc::new(StubAnalysis::new()),
            Arc::new(StubMarketData::new(100.0, 30)),
        )
        .context("building orchestrator")?;

        let outcomes = orchestrator.scan().await;
        for outcome in &outcomes {
            info!(
                symbol = %outcome.symbol,
                status = %outcome.receipt.status,
                "scan outcome"
            );
        }
        println!(
            "{}",
            serde_json::to_string_pretty(
                &outcomes
                    .iter()
                    .map(|o| &o.receipt)
                    .collect::<Vec<_>>()
            )?
        );
        return Ok(());
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("reading trade plan from stdin")?;
    let value: serde_json::Value =
        serde_json::from_str(&input).context("parsing trade plan JSON")?;

    // Accept either a bare plan or an envelope with plan + market meta.
    let plan_value = if value.get("trade_plan").is_some() {
        value["trade_plan"].clone()
    } else {
        value.clone()
    };
    let plan = TradePlan::from_value(plan_value);
    let meta: MarketMeta = value
        .get("market_meta")
        .cloned()
        .and_then(|m| serde_json::from_value(m).ok())
        .unwrap_or_default();

    let validator = TradePlanValidator::new(ValidationProfile::Strict)
        .with_thresholds(
            config.validation.max_entry_deviation,
            config.validation.max_stop_distance,
        );
    let mut plan = validator.validate_and_size(plan, &config.account, &meta);

    let router = ExecutionRouter::new(&config).context("building execution router")?;
    let receipt = router
        .execute_trade_plan(&mut plan, config.account.broker_preference.as_deref())
        .await;

    info!(symbol = %plan.symbol, status = %receipt.status, "execution finished");
    println!("{}", serde_json::to_string_pretty(&receipt)?);

    Ok(())
}
