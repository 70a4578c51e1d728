//! Configuration types for image-fetcher

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime settings for an [`ImageFetcher`](crate::ImageFetcher)
///
/// Every field has a serde default, so a partial JSON document (or `{}`)
/// deserializes into a usable configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Maximum simultaneous fetch/save tasks per batch (default: 4)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout applied by the HTTP transport to each request (default: 30s)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// JPEG encoder quality, 1-100 (default: 90)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl FetcherConfig {
    /// Check that every setting is usable
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending key when the
    /// concurrency ceiling or request timeout is zero, or the JPEG quality
    /// is outside 1-100.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::config(
                "concurrency",
                "concurrency ceiling must be at least 1",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::config(
                "request_timeout",
                "request timeout must be greater than zero",
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::config(
                "jpeg_quality",
                format!("JPEG quality must be 1-100, got {}", self.jpeg_quality),
            ));
        }
        Ok(())
    }

    /// Parse a JSON document and validate the result
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("image-fetcher/{}", env!("CARGO_PKG_VERSION"))
}

fn default_jpeg_quality() -> u8 {
    90
}
