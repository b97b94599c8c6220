//! Execution-layer error types.

use thiserror::Error;

/// Errors from broker dispatch.
///
/// These never escape the router: every variant is converted into an
/// `Error` receipt whose reason is the `Display` form.
#[derive(Debug, Error, Clone)]
pub enum ExecutionError {
    /// Credentials required for the chosen broker are not configured.
    #[error("missing credentials for {broker}: {detail}")]
    MissingCredentials {
        /// Broker name.
        broker: &'static str,
        /// Which credential is missing.
        detail: String,
    },

    /// Broker returned 401; re-authentication is required.
    #[error("session not authenticated")]
    NotAuthenticated,

    /// Network-level failure (timeout, connection reset, DNS).
    #[error("transport error: {0}")]
    Transport(String),

    /// Broker returned a non-retryable error response.
    #[error("broker API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// Retry budget exhausted on a retryable failure.
    #[error("max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// Estimated order cost exceeds available buying power.
    #[error("insufficient buying power: need {required:.2}, have {available:.2}")]
    InsufficientBuyingPower {
        /// Estimated cost of the order.
        required: f64,
        /// Buying power reported by the broker.
        available: f64,
    },

    /// Contract id lookup returned no match.
    #[error("no contract found for {symbol} ({sec_type})")]
    ContractNotFound {
        /// Symbol searched for.
        symbol: String,
        /// Security type used in the search.
        sec_type: String,
    },

    /// Broker response was not valid JSON.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),
}
