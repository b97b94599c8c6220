//! Shared broker HTTP client with bounded timeouts and retry.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::warn;

use crate::config::RetryConfig;
use crate::execution::error::ExecutionError;
use crate::execution::retry::{is_retryable_status, ExponentialBackoff};

/// HTTP client shared by the broker adapters.
///
/// Wraps `reqwest` with the configured timeout, cookie store (IBKR's
/// gateway is session-cookie authenticated) and retry policy.
#[derive(Debug, Clone)]
pub struct BrokerHttpClient {
    client: Client,
    retry: RetryConfig,
}

impl BrokerHttpClient {
    /// Build a client with the given timeout and retry policy.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::Transport` if the TLS backend cannot be
    /// initialized.
    pub fn new(
        timeout: Duration,
        retry: RetryConfig,
        accept_invalid_certs: bool,
    ) -> Result<Self, ExecutionError> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| ExecutionError::Transport(e.to_string()))?;

        Ok(Self { client, retry })
    }

    /// The underlying `reqwest` client, for building requests.
    #[must_use]
    pub const fn inner(&self) -> &Client {
        &self.client
    }

    /// Send a request, retrying 408/429/5xx responses and transport
    /// failures with exponential backoff.
    ///
    /// `build` is called once per attempt to produce a fresh request.
    /// A 401 maps to `NotAuthenticated` and is never retried.
    ///
    /// # Errors
    ///
    /// Returns an `ExecutionError` describing the terminal failure.
    pub async fn send_with_retry<F>(&self, build: F) -> Result<Value, ExecutionError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut backoff = ExponentialBackoff::new(&self.retry);

        loop {
            let response = match build(&self.client).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if let Some(delay) = backoff.next_backoff() {
                        warn!(
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt(),
                            "transport error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(ExecutionError::Transport(e.to_string()));
                }
            };

            let status = response.status();

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| ExecutionError::Transport(e.to_string()))?;
                if text.is_empty() {
                    return Ok(Value::Null);
                }
                return serde_json::from_str(&text)
                    .map_err(|e| ExecutionError::JsonParse(e.to_string()));
            }

            if status.as_u16() == 401 {
                // Retrying without re-authenticating will not help.
                return Err(ExecutionError::NotAuthenticated);
            }

            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();

            if is_retryable_status(status_code) {
                if let Some(delay) = backoff.next_backoff() {
                    warn!(
                        status = status_code,
                        delay_ms = delay.as_millis(),
                        attempt = backoff.attempt(),
                        "retryable broker response, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(ExecutionError::MaxRetriesExceeded {
                    attempts: backoff.attempt(),
                });
            }

            return Err(ExecutionError::Api {
                status: status_code,
                body,
            });
        }
    }
}
