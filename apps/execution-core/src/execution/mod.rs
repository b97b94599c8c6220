//! Order execution: retry policy, broker HTTP plumbing, adapters and
//! the routing layer that turns validated plans into receipts.

pub mod brokers;
mod error;
mod http;
mod retry;
mod router;

pub use error::ExecutionError;
pub use http::BrokerHttpClient;
pub use retry::{is_retryable_status, ExponentialBackoff};
pub use router::ExecutionRouter;
