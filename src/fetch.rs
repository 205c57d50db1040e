//! Fetch-With-Retry
//!
//! Every outbound request of the navigation core goes through [`Fetcher`], which
//! bounds each attempt with a timeout and retries transient failures a fixed
//! number of times with a fixed backoff. The wire itself sits behind the
//! [`HttpTransport`] trait so tests can script responses.

use crate::error::NavError;
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Raw GET transport used by [`Fetcher`]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetch the body of `url`. Non-success statuses must map to `NavError::HttpStatus`.
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, NavError>;
}

/// reqwest-backed transport
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, NavError> {
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| NavError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| NavError::Transport {
            url: url.to_string(),
            source: e,
        })?;
        Ok(body.to_vec())
    }
}

fn default_attempts() -> u32 {
    2
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_backoff_ms() -> u64 {
    300
}

/// Retry configuration shared by every tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one (minimum 1)
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            timeout_ms: default_timeout_ms(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Transport plus retry policy
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch `url`, retrying transient failures.
    ///
    /// A successful response is returned as-is even when its body describes an
    /// application-level error; detecting that is the caller's job.
    pub async fn fetch_with_retry(&self, url: &Url) -> Result<Vec<u8>, NavError> {
        let attempts = self.policy.attempts.max(1);
        let mut attempt = 1;
        loop {
            let result = match timeout(self.policy.timeout(), self.transport.get_bytes(url)).await {
                Ok(result) => result,
                Err(_) => Err(NavError::Timeout {
                    url: url.to_string(),
                    timeout_ms: self.policy.timeout_ms,
                }),
            };

            match result {
                Ok(body) => {
                    debug!(url = %url, attempt, bytes = body.len(), "Fetched");
                    return Ok(body);
                }
                Err(err) if attempt < attempts && err.is_retryable() => {
                    warn!(
                        url = %url,
                        attempt,
                        max_attempts = attempts,
                        error = %err,
                        "Request failed, retrying"
                    );
                    sleep(self.policy.backoff()).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Fetch and decode a JSON payload
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, NavError> {
        let body = self.fetch_with_retry(url).await?;
        serde_json::from_slice(&body).map_err(|e| NavError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
