//! Network retrieval seam
//!
//! The pipeline never talks to the network directly; it calls a
//! [`Transport`]. [`HttpTransport`] is the production implementation.

use crate::config::FetcherConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;

/// A completed retrieval, whatever its status
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header as sent by the server (informational only)
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one GET-equivalent retrieval
///
/// Implementations return `Ok` whenever the exchange completes, including
/// non-success statuses; status checking belongs to the caller.
///
/// # Errors
///
/// Implementations return [`Error::Transport`] when the exchange cannot
/// complete (connection refused, timeout, truncated body).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Retrieve `location`
    async fn get(&self, location: &str) -> Result<TransportResponse>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// [`Transport`] backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client using the timeout and user agent from `config`
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {e}"),
                key: None,
            })?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, location: &str) -> Result<TransportResponse> {
        let response = self.client.get(location).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("request timed out: {e}")
            } else if e.is_connect() {
                format!("connection failed: {e}")
            } else {
                e.to_string()
            };
            Error::Transport {
                location: location.to_string(),
                message,
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| Error::Transport {
            location: location.to_string(),
            message: format!("failed to read response body: {e}"),
        })?;

        Ok(TransportResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
