//! Network fetch adapter for remote source images
//!
//! The cache and the pipeline never talk HTTP directly; they go through
//! [`ImageFetcher`] so tests and alternative transports can be swapped in.

use crate::constants::{DEFAULT_NETWORK_TIMEOUT_MS, MAX_SOURCE_BYTES};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// An image pulled from the network
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub url: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Pulls image bytes from a URL
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage>;
}

/// Run a fetch under a per-item deadline
pub async fn fetch_with_timeout(
    fetcher: &dyn ImageFetcher,
    url: &str,
    timeout: Duration,
) -> Result<FetchedImage> {
    match tokio::time::timeout(timeout, fetcher.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            operation: format!("fetch {url}"),
            duration: timeout,
        }),
    }
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_millis(DEFAULT_NETWORK_TIMEOUT_MS))
    }

    /// Build a fetcher whose underlying client also enforces `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("imgcache/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            max_bytes: MAX_SOURCE_BYTES,
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        let parsed = url::Url::parse(url).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl {
                url: url.to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        tracing::debug!(url, "Fetching image");
        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(url, format!("unexpected status {status}")));
        }

        if let Some(length) = response.content_length() {
            if length as usize > self.max_bytes {
                return Err(Error::ResponseTooLarge {
                    endpoint: url.to_string(),
                    actual: length as usize,
                    limit: self.max_bytes,
                });
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let data = response.bytes().await?;
        if data.len() > self.max_bytes {
            return Err(Error::ResponseTooLarge {
                endpoint: url.to_string(),
                actual: data.len(),
                limit: self.max_bytes,
            });
        }

        Ok(FetchedImage {
            url: url.to_string(),
            content_type,
            data,
        })
    }
}
