//! Types reported by prefetch and warm

use serde::{Deserialize, Serialize};

/// One URL that could not be cached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchFailure {
    pub url: String,
    pub reason: String,
    /// Timeouts and connection problems; worth retrying later
    pub transient: bool,
}

/// Outcome of a prefetch or warm run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchReport {
    pub requested: usize,
    /// Keys of newly cached images, in completion order
    pub cached: Vec<String>,
    /// URLs already present (warm only)
    pub skipped: Vec<String>,
    pub failed: Vec<PrefetchFailure>,
}

impl PrefetchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub(super) enum ItemOutcome {
    Cached(String),
    Skipped,
    Failed(PrefetchFailure),
}
