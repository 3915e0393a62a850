//! Cache get and has operations

use crate::entry::CacheEntry;
use crate::errors::Result;
use crate::keys::validate_key;
use std::time::Instant;

use super::super::types::CacheEngine;

enum MemoryLookup {
    Hit(CacheEntry),
    Expired,
    /// Carries the removal epoch seen before the adapter is consulted
    Absent(u64),
}

impl CacheEngine {
    /// Fetch a live entry, recording exactly one hit or miss
    ///
    /// Looks in memory first, then the adapter. Expired entries are removed
    /// and reported absent. Adapter failures count as misses.
    pub async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        validate_key(key)?;

        let started = Instant::now();
        let found = self.lookup(key).await;
        self.inner
            .stats
            .record_access(key, found.is_some(), started.elapsed());

        match &found {
            Some(_) => tracing::debug!(key, "Cache hit"),
            None => tracing::debug!(key, "Cache miss"),
        }
        Ok(found)
    }

    /// True when `key` resolves to a live entry; touches nothing
    pub async fn has(&self, key: &str) -> Result<bool> {
        validate_key(key)?;

        let now = self.inner.clock.now();
        let in_memory = {
            let state = self.inner.state.lock();
            state
                .entries
                .get(key)
                .map(|slot| !slot.entry.is_expired_at(now))
        };
        if let Some(live) = in_memory {
            return Ok(live);
        }

        match self.inner.adapter.load(key).await {
            Ok(found) => Ok(found.is_some_and(|entry| !entry.is_expired_at(now))),
            Err(e) => {
                tracing::debug!(key, error = %e, "Adapter check failed");
                Ok(false)
            }
        }
    }

    async fn lookup(&self, key: &str) -> Option<CacheEntry> {
        let inner = &self.inner;
        let now = inner.clock.now();

        let memory = {
            let mut state = inner.state.lock();
            let expired = state.entries.get(key).map(|slot| slot.entry.is_expired_at(now));
            match expired {
                Some(true) => {
                    state.remove_pending(key);
                    MemoryLookup::Expired
                }
                Some(false) => match state.entries.get_mut(key) {
                    Some(slot) => {
                        slot.entry.touch(now);
                        MemoryLookup::Hit(slot.entry.clone())
                    }
                    None => MemoryLookup::Absent(state.removal_epoch()),
                },
                None => MemoryLookup::Absent(state.removal_epoch()),
            }
        };

        let epoch = match memory {
            MemoryLookup::Hit(entry) => return Some(entry),
            MemoryLookup::Expired => {
                self.drop_expired(key).await;
                return None;
            }
            MemoryLookup::Absent(epoch) => epoch,
        };

        let loaded = match inner.adapter.load(key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                let e = e.in_adapter(key, "load", inner.adapter.store_type());
                tracing::warn!(key, error = %e, "Adapter load failed; treating as miss");
                return None;
            }
        };

        if loaded.is_expired_at(now) {
            inner.state.lock().begin_removal(key);
            self.drop_expired(key).await;
            return None;
        }

        self.promote(loaded, now, epoch).await
    }

    /// Bring an adapter-only entry into memory under capacity accounting
    ///
    /// `epoch` is the removal epoch observed before the load. A copy that a
    /// delete, eviction or clear may have raced with is never re-inserted.
    async fn promote(
        &self,
        mut loaded: CacheEntry,
        now: chrono::DateTime<chrono::Utc>,
        epoch: u64,
    ) -> Option<CacheEntry> {
        let inner = &self.inner;
        let key = loaded.key.clone();

        let (found, victims) = {
            let mut state = inner.state.lock();
            // A set that landed while we were loading is newer; keep it
            if let Some(slot) = state.entries.get_mut(&key) {
                slot.entry.touch(now);
                (slot.entry.clone(), Vec::new())
            } else if state.is_removing(&key) {
                tracing::trace!(key = %key, "Adapter copy is being removed");
                return None;
            } else if state.removal_epoch() != epoch {
                // Some removal ran while loading; serve what was read
                // without bringing it back
                loaded.touch(now);
                return Some(loaded);
            } else {
                loaded.touch(now);
                let victims = state.make_room(
                    inner.eviction_policy.as_ref(),
                    loaded.size(),
                    inner.config.max_size_bytes,
                );
                state.insert(loaded.clone());
                (loaded, victims)
            }
        };

        if !victims.is_empty() {
            inner.stats.record_evictions(victims.len() as u64);
            self.purge_from_adapter(&victims, "evicted").await;
        }
        tracing::trace!(key = %key, "Promoted entry from adapter");
        Some(found)
    }

    async fn drop_expired(&self, key: &str) {
        self.inner.stats.record_expired(1);
        self.purge_from_adapter(&[key.to_string()], "expired").await;
    }
}
