//! LRU (Least Recently Used) eviction policy implementation

use crate::eviction::traits::{EvictionCandidate, EvictionPolicy};

/// LRU (Least Recently Used) eviction policy
#[derive(Debug, Default, Clone, Copy)]
pub struct LruPolicy;

impl LruPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl EvictionPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn rank(&self, candidates: &[EvictionCandidate]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        // sort_by_key is stable: equal timestamps keep insertion order
        order.sort_by_key(|&i| candidates[i].last_accessed_at);
        order
    }
}
