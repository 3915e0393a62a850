//! Core engine types and structures

use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::eviction::{EvictionCandidate, EvictionPolicy};
use crate::stats::StatsTracker;
use crate::storage::StorageAdapter;
use imgcache_core::{ImageFetcher, SharedClock};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle to a cache engine
///
/// Cloning is cheap and every clone talks to the same entries.
#[derive(Clone)]
pub struct CacheEngine {
    pub(super) inner: Arc<EngineInner>,
}

pub(super) struct EngineInner {
    pub config: CacheConfig,
    pub adapter: Arc<dyn StorageAdapter>,
    pub eviction_policy: Box<dyn EvictionPolicy>,
    pub stats: StatsTracker,
    pub clock: SharedClock,
    /// Used by prefetch and warm
    pub fetcher: Arc<dyn ImageFetcher>,
    pub state: Mutex<EngineState>,
    pub cleanup_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        if let Some(handle) = self.cleanup_handle.get_mut().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for CacheEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("CacheEngine")
            .field("store", &self.inner.adapter.store_type())
            .field("policy", &self.inner.eviction_policy.name())
            .field("entries", &state.entries.len())
            .field("total_size_bytes", &state.total_size_bytes)
            .finish()
    }
}

/// An entry plus the revision of the `set` that produced it
///
/// A failed persist only rolls back its own revision, never a newer write.
#[derive(Debug)]
pub(super) struct Slot {
    pub entry: CacheEntry,
    pub revision: u64,
}

/// Everything guarded by the engine mutex
#[derive(Debug, Default)]
pub(super) struct EngineState {
    /// Insertion order doubles as the eviction tie-breaker
    pub entries: IndexMap<String, Slot>,
    pub total_size_bytes: u64,
    next_revision: u64,
    /// Keys dropped from memory whose adapter copy is still being removed
    pending_removals: HashMap<String, usize>,
    pending_clears: usize,
    /// Bumped whenever a removal starts
    removal_epoch: u64,
}

impl EngineState {
    /// Insert at the back of the order; returns the new revision
    pub fn insert(&mut self, entry: CacheEntry) -> u64 {
        self.remove(&entry.key);
        self.next_revision += 1;
        let revision = self.next_revision;
        self.total_size_bytes += entry.size();
        self.entries
            .insert(entry.key.clone(), Slot { entry, revision });
        revision
    }

    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let slot = self.entries.shift_remove(key)?;
        self.total_size_bytes = self.total_size_bytes.saturating_sub(slot.entry.size());
        Some(slot.entry)
    }

    /// Drop `key` and hold it back from promotion until
    /// [`finish_removal`](Self::finish_removal)
    pub fn remove_pending(&mut self, key: &str) -> Option<CacheEntry> {
        self.begin_removal(key);
        self.remove(key)
    }

    pub fn begin_removal(&mut self, key: &str) {
        self.removal_epoch += 1;
        *self.pending_removals.entry(key.to_string()).or_default() += 1;
    }

    pub fn finish_removal(&mut self, key: &str) {
        if let Some(count) = self.pending_removals.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                self.pending_removals.remove(key);
            }
        }
    }

    pub fn begin_clear(&mut self) {
        self.removal_epoch += 1;
        self.pending_clears += 1;
        self.clear();
    }

    pub fn finish_clear(&mut self) {
        self.pending_clears = self.pending_clears.saturating_sub(1);
    }

    pub fn removal_epoch(&self) -> u64 {
        self.removal_epoch
    }

    /// True while an adapter copy of `key` may be mid-removal
    pub fn is_removing(&self, key: &str) -> bool {
        self.pending_clears > 0 || self.pending_removals.contains_key(key)
    }

    pub fn revision_of(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|slot| slot.revision)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_size_bytes = 0;
    }

    pub fn candidates(&self) -> Vec<EvictionCandidate> {
        self.entries
            .values()
            .map(|slot| EvictionCandidate {
                key: slot.entry.key.clone(),
                size_bytes: slot.entry.size(),
                last_accessed_at: slot.entry.metadata.last_accessed_at,
                access_count: slot.entry.metadata.access_count,
            })
            .collect()
    }

    /// Evict until `incoming` more bytes fit under `max_size_bytes`
    ///
    /// Victims stay pending removal until the caller purges them from the
    /// adapter. Frees exactly the overflow. When nothing is left to evict the caller
    /// still inserts; an entry larger than the whole budget is kept.
    pub fn make_room(
        &mut self,
        policy: &dyn EvictionPolicy,
        incoming: u64,
        max_size_bytes: u64,
    ) -> Vec<String> {
        let needed = self
            .total_size_bytes
            .saturating_add(incoming)
            .saturating_sub(max_size_bytes);
        if needed == 0 {
            return Vec::new();
        }

        let victims = policy.select_for_eviction(&self.candidates(), needed);
        for key in &victims {
            self.remove_pending(key);
        }
        victims
    }
}
