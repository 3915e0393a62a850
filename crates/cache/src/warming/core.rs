//! Prefetch and warm

use super::types::{ItemOutcome, PrefetchFailure, PrefetchReport};
use crate::core::CacheEngine;
use crate::errors::{CacheError, Result};
use crate::keys::image_key;
use futures::stream::{self, StreamExt};
use imgcache_core::fetch_with_timeout;

impl CacheEngine {
    /// Fetch and cache every URL
    pub async fn prefetch_images<U: AsRef<str>>(&self, urls: &[U]) -> PrefetchReport {
        self.run_prefetch(urls, false).await
    }

    /// Like [`prefetch_images`](Self::prefetch_images), skipping URLs that are already cached
    pub async fn warm_cache<U: AsRef<str>>(&self, urls: &[U]) -> PrefetchReport {
        self.run_prefetch(urls, true).await
    }

    async fn run_prefetch<U: AsRef<str>>(&self, urls: &[U], skip_cached: bool) -> PrefetchReport {
        let concurrency = self.config().prefetch_concurrency.max(1);

        let outcomes: Vec<(String, ItemOutcome)> = stream::iter(urls.iter().map(|u| u.as_ref()))
            .map(|url| async move {
                let outcome = self.prefetch_one(url, skip_cached).await;
                (url.to_string(), outcome)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut report = PrefetchReport {
            requested: urls.len(),
            ..PrefetchReport::default()
        };
        for (url, outcome) in outcomes {
            match outcome {
                ItemOutcome::Cached(key) => report.cached.push(key),
                ItemOutcome::Skipped => report.skipped.push(url),
                ItemOutcome::Failed(failure) => report.failed.push(failure),
            }
        }

        tracing::info!(
            requested = report.requested,
            cached = report.cached.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Prefetch finished"
        );
        report
    }

    async fn prefetch_one(&self, url: &str, skip_cached: bool) -> ItemOutcome {
        if skip_cached {
            match self.has(&image_key(url, None, None)).await {
                Ok(true) => {
                    tracing::debug!(url, "Already cached");
                    return ItemOutcome::Skipped;
                }
                Ok(false) => {}
                Err(e) => return failure(url, e),
            }
        }

        match self.fetch_and_store(url).await {
            Ok(key) => ItemOutcome::Cached(key),
            Err(e) => failure(url, e),
        }
    }

    async fn fetch_and_store(&self, url: &str) -> Result<String> {
        let image = fetch_with_timeout(self.fetcher(), url, self.config().network_timeout).await?;
        self.cache_image(url, image.data.to_vec(), None, None).await
    }
}

fn failure(url: &str, error: CacheError) -> ItemOutcome {
    tracing::warn!(url, error = %error, "Prefetch item failed");
    ItemOutcome::Failed(PrefetchFailure {
        url: url.to_string(),
        reason: error.to_string(),
        transient: error.is_transient(),
    })
}
