//! Cache set operation

use crate::entry::{CacheEntry, Payload, SetOptions};
use crate::errors::Result;
use crate::keys::validate_key;

use super::super::types::CacheEngine;

impl CacheEngine {
    /// Store `payload` under `key` with the configured TTL
    pub async fn set(&self, key: &str, payload: impl Into<Payload>) -> Result<()> {
        self.set_with(key, payload, SetOptions::default()).await
    }

    /// Store with per-entry overrides
    ///
    /// When the new entry does not fit, the coldest entries are evicted
    /// until it does. An entry larger than `max_size_bytes` on its own is
    /// stored anyway after everything else has been evicted.
    pub async fn set_with(
        &self,
        key: &str,
        payload: impl Into<Payload>,
        options: SetOptions,
    ) -> Result<()> {
        validate_key(key)?;

        let inner = &self.inner;
        let now = inner.clock.now();
        let ttl = options.ttl.unwrap_or(inner.config.ttl);
        let mut entry = CacheEntry::new(key, payload.into(), ttl, now);
        if let Some(content_type) = options.content_type {
            entry = entry.with_content_type(content_type);
        }
        let size = entry.size();
        let max = inner.config.max_size_bytes;

        let (revision, victims) = {
            let mut state = inner.state.lock();
            // A re-set replaces the old entry, so its bytes do not count twice
            state.remove(key);
            let victims = state.make_room(inner.eviction_policy.as_ref(), size, max);
            let revision = state.insert(entry.clone());
            (revision, victims)
        };

        if !victims.is_empty() {
            inner.stats.record_evictions(victims.len() as u64);
            tracing::debug!(key, evicted = victims.len(), "Evicted entries to make room");
        }
        if size > max {
            tracing::warn!(
                key,
                size,
                max_size_bytes = max,
                "Entry exceeds the whole cache budget; stored anyway"
            );
        }
        self.purge_from_adapter(&victims, "evicted").await;

        if let Err(e) = inner.adapter.persist(key, &entry).await {
            {
                let mut state = inner.state.lock();
                if state.revision_of(key) == Some(revision) {
                    state.remove(key);
                }
            }
            tracing::warn!(key, error = %e, "Persist failed; rolled back");
            return Err(e.in_adapter(key, "persist", inner.adapter.store_type()));
        }

        inner.stats.record_write();
        tracing::debug!(key, size, "Stored entry");
        Ok(())
    }
}
