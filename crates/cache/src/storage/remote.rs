//! HTTP object-store adapter
//!
//! Entries live at `{endpoint}/{sha256(key)}` as the same binary envelope the
//! local adapter writes to disk.

use super::format::{decode_entry, encode_entry};
use super::traits::{StorageAdapter, TransportOptions};
use crate::entry::CacheEntry;
use crate::errors::{CacheError, RecoveryHint, Result, StoreType};
use crate::keys::hash_key;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct RemoteAdapter {
    client: Client,
    endpoint: Url,
    transport: TransportOptions,
}

impl RemoteAdapter {
    pub fn new(endpoint: &str, timeout: Duration, transport: TransportOptions) -> Result<Self> {
        let mut endpoint = Url::parse(endpoint).map_err(|e| {
            CacheError::configuration(format!("invalid remote endpoint '{endpoint}': {e}"))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(CacheError::configuration(format!(
                "remote endpoint must be http or https, got '{}'",
                endpoint.scheme()
            )));
        }
        // Url::join replaces the last segment unless the path ends with '/'
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CacheError::from)?;

        Ok(Self {
            client,
            endpoint,
            transport,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn object_url(&self, key: &str) -> Result<Url> {
        self.endpoint.join(&hash_key(key)).map_err(|e| {
            CacheError::configuration(format!("cannot build object URL for '{key}': {e}"))
        })
    }

    fn status_error(&self, url: &Url, operation: &'static str, status: StatusCode) -> CacheError {
        let endpoint = url.to_string();
        let recovery_hint = if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            RecoveryHint::Retry {
                after: Duration::from_secs(1),
            }
        } else {
            RecoveryHint::CheckNetwork {
                endpoint: endpoint.clone(),
            }
        };
        CacheError::StoreUnavailable {
            store_type: self.store_type(),
            reason: format!("{operation} {endpoint} returned {status}"),
            recovery_hint,
        }
    }
}

#[async_trait]
impl StorageAdapter for RemoteAdapter {
    fn store_type(&self) -> StoreType {
        StoreType::Remote {
            endpoint: self.endpoint.to_string(),
        }
    }

    async fn persist(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let url = self.object_url(key)?;
        let body = encode_entry(entry, &self.transport)?;
        let len = body.len();

        let response = self
            .client
            .put(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.status_error(&url, "PUT", response.status()));
        }
        tracing::debug!(key, %url, bytes = len, "Uploaded entry");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        let url = self.object_url(key)?;
        let response = self.client.get(url.clone()).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::trace!(key, "Remote miss");
                Ok(None)
            }
            status if status.is_success() => {
                let bytes = response.bytes().await?;
                decode_entry(key, &bytes, &self.transport).map(Some)
            }
            status => Err(self.status_error(&url, "GET", status)),
        }
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let url = self.object_url(key)?;
        let response = self.client.delete(url.clone()).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(self.status_error(&url, "DELETE", status)),
        }
    }

    async fn clear(&self) -> Result<()> {
        let response = self.client.delete(self.endpoint.clone()).send().await?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(self.status_error(&self.endpoint, "DELETE", status))
        }
    }
}
