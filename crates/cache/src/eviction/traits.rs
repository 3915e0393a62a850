//! Core eviction policy trait definition

use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Snapshot of the fields an eviction policy may look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionCandidate {
    pub key: String,
    pub size_bytes: u64,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
}

/// Eviction policy trait
///
/// Candidates are always supplied in insertion order, so a stable sort in
/// `rank` breaks ties deterministically.
pub trait EvictionPolicy: Send + Sync + Debug {
    /// Name used in configuration
    fn name(&self) -> &'static str;

    /// Indices into `candidates`, coldest first
    fn rank(&self, candidates: &[EvictionCandidate]) -> Vec<usize>;

    /// Keys to remove, in removal order, until their combined size covers `bytes_needed`
    ///
    /// Returns every candidate when even that is not enough.
    fn select_for_eviction(&self, candidates: &[EvictionCandidate], bytes_needed: u64) -> Vec<String> {
        if bytes_needed == 0 {
            return Vec::new();
        }

        let mut freed = 0u64;
        let mut victims = Vec::new();
        for index in self.rank(candidates) {
            let candidate = &candidates[index];
            victims.push(candidate.key.clone());
            freed = freed.saturating_add(candidate.size_bytes);
            if freed >= bytes_needed {
                break;
            }
        }
        victims
    }
}
