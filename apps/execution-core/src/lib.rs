// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Execution-and-risk core for the Skipper trading system.
//!
//! Takes trade plans produced by an external reasoning step, sizes them
//! against a fixed risk budget, sanity-checks them against the last
//! known price, and routes survivors to a broker order endpoint behind
//! a circuit breaker and paper/live guards.
//!
//! # Modules
//!
//! - [`models`]: trade plans, receipts, account and market snapshots
//! - [`risk`]: position sizer, circuit breaker, plan validator
//! - [`execution`]: retry policy, broker adapters, the router
//! - [`analysis`]: ports to the reasoning and market-data collaborators
//! - [`scanner`]: the watchlist scan loop tying it all together
//! - [`config`]: YAML configuration with env interpolation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Ports to the analysis and market-data collaborators.
pub mod analysis;

/// Configuration loading and validation.
pub mod config;

/// Order execution and broker adapters.
pub mod execution;

/// Structured logging setup.
pub mod logging;

/// Core data types.
pub mod models;

/// Position sizing, circuit breaker and plan validation.
pub mod risk;

/// Watchlist scan loop.
pub mod scanner;

pub use config::{load_config, Config};
pub use execution::ExecutionRouter;
pub use models::{AccountInfo, MarketMeta, OrderReceipt, ReceiptStatus, TradePlan};
pub use risk::{compute_position_size, CircuitBreaker, TradePlanValidator, ValidationProfile};
pub use scanner::Orchestrator;
