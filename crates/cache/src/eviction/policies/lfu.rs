//! LFU (Least Frequently Used) eviction policy implementation

use crate::eviction::traits::{EvictionCandidate, EvictionPolicy};

/// LFU (Least Frequently Used) eviction policy
///
/// Equal access counts fall back to recency, then insertion order.
#[derive(Debug, Default, Clone, Copy)]
pub struct LfuPolicy;

impl LfuPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl EvictionPolicy for LfuPolicy {
    fn name(&self) -> &'static str {
        "lfu"
    }

    fn rank(&self, candidates: &[EvictionCandidate]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by_key(|&i| (candidates[i].access_count, candidates[i].last_accessed_at));
        order
    }
}
