//! Proactive trimming
//!
//! Distinct from the reactive eviction in `set`: this keeps the entry count
//! near what the byte budget holds at an assumed average entry size, even
//! while the byte cap itself is not reached.

use serde::{Deserialize, Serialize};

use super::types::CacheEngine;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeReport {
    pub target_entries: usize,
    pub evicted: Vec<String>,
    pub remaining: usize,
}

impl CacheEngine {
    pub async fn optimize(&self) -> OptimizeReport {
        let config = &self.inner.config;
        let target = usize::try_from(config.max_size_bytes / config.assumed_entry_size)
            .unwrap_or(usize::MAX)
            .max(1);

        let (evicted, remaining) = {
            let mut state = self.inner.state.lock();
            let excess = state.entries.len().saturating_sub(target);
            let evicted: Vec<String> = if excess == 0 {
                Vec::new()
            } else {
                let candidates = state.candidates();
                self.inner
                    .eviction_policy
                    .rank(&candidates)
                    .into_iter()
                    .take(excess)
                    .map(|index| candidates[index].key.clone())
                    .collect()
            };
            for key in &evicted {
                state.remove_pending(key);
            }
            (evicted, state.entries.len())
        };

        if !evicted.is_empty() {
            self.inner.stats.record_evictions(evicted.len() as u64);
            self.purge_from_adapter(&evicted, "optimized").await;
        }
        tracing::info!(
            target,
            evicted = evicted.len(),
            remaining,
            "Optimized cache"
        );

        OptimizeReport {
            target_entries: target,
            evicted,
            remaining,
        }
    }
}
