//! Cache operations module
//!
//! Operations are implemented directly on `CacheEngine`, one file per verb.

mod batch;
mod get;
mod image;
mod remove;
mod set;

use super::types::CacheEngine;
use crate::stats::CacheStats;

impl CacheEngine {
    pub fn get_stats(&self) -> CacheStats {
        let (entries, bytes) = {
            let state = self.inner.state.lock();
            (state.entries.len(), state.total_size_bytes)
        };
        self.inner.stats.snapshot(entries, bytes)
    }

    pub fn entry_count(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.inner.state.lock().total_size_bytes
    }

    /// Remove evicted or expired keys from the adapter
    ///
    /// Every key must already be pending removal in the engine state; each
    /// one is released once its adapter copy is gone. Failures here only
    /// leave stale adapter copies behind, which expire or get overwritten.
    pub(super) async fn purge_from_adapter(&self, keys: &[String], reason: &'static str) {
        for key in keys {
            if let Err(e) = self.inner.adapter.remove(key).await {
                tracing::warn!(key = %key, reason, error = %e, "Adapter purge failed");
            }
            self.inner.state.lock().finish_removal(key);
        }
    }
}
