//! Expired-entry sweeps

use std::sync::Arc;
use std::time::Duration;

use super::types::CacheEngine;

impl CacheEngine {
    /// Remove expired in-memory entries and their adapter copies
    ///
    /// Adapter-only entries are left alone; `get` notices their expiry.
    pub async fn cleanup(&self) -> usize {
        let now = self.inner.clock.now();

        let expired: Vec<String> = {
            let mut state = self.inner.state.lock();
            let keys: Vec<String> = state
                .entries
                .values()
                .filter(|slot| slot.entry.is_expired_at(now))
                .map(|slot| slot.entry.key.clone())
                .collect();
            for key in &keys {
                state.remove_pending(key);
            }
            keys
        };

        if !expired.is_empty() {
            self.inner.stats.record_expired(expired.len() as u64);
            self.purge_from_adapter(&expired, "expired").await;
            tracing::debug!(removed = expired.len(), "Swept expired entries");
        }
        expired.len()
    }

    /// Run [`cleanup`](Self::cleanup) every `interval` until the engine is dropped
    ///
    /// Replaces any sweep started earlier.
    pub fn spawn_cleanup(&self, interval: Duration) {
        let weak = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let engine = CacheEngine { inner };
                let removed = engine.cleanup().await;
                if removed > 0 {
                    tracing::info!(removed, "Background cleanup");
                }
            }
        });

        if let Some(previous) = self.inner.cleanup_handle.lock().replace(handle) {
            previous.abort();
        }
    }
}
