//! Hit/miss accounting
//!
//! Rates and latency come from a bounded window of recent `get` events.
//! Lifetime counters live alongside and survive `clear`.

use imgcache_core::constants::STATS_WINDOW;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// One recorded `get`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvent {
    pub key: String,
    pub hit: bool,
    pub latency: Duration,
}

/// Point-in-time view of the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_size_bytes: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub evictions: u64,
    pub average_access_latency_ms: f64,
    /// Engine-lifetime counters
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub expired_removals: u64,
}

#[derive(Debug)]
pub struct StatsTracker {
    window: Mutex<VecDeque<AccessEvent>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    writes: AtomicU64,
    expired_removals: AtomicU64,
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::with_capacity(STATS_WINDOW)
    }
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            expired_removals: AtomicU64::new(0),
        }
    }

    pub fn record_access(&self, key: &str, hit: bool, latency: Duration) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }

        let mut window = self.window.lock();
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(AccessEvent {
            key: key.to_string(),
            hit,
            latency,
        });
    }

    pub fn record_evictions(&self, count: u64) {
        self.evictions.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired(&self, count: u64) {
        self.expired_removals.fetch_add(count, Ordering::Relaxed);
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Events currently in the window, oldest first
    pub fn recent_events(&self) -> Vec<AccessEvent> {
        self.window.lock().iter().cloned().collect()
    }

    pub fn snapshot(&self, total_entries: usize, total_size_bytes: u64) -> CacheStats {
        let (window_hits, total, latency_sum) = {
            let window = self.window.lock();
            let hits = window.iter().filter(|e| e.hit).count();
            let latency: Duration = window.iter().map(|e| e.latency).sum();
            (hits, window.len(), latency)
        };

        let (hit_rate, miss_rate, average_access_latency_ms) = if total == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let total_f = total as f64;
            (
                window_hits as f64 / total_f,
                (total - window_hits) as f64 / total_f,
                latency_sum.as_secs_f64() * 1000.0 / total_f,
            )
        };

        CacheStats {
            total_entries,
            total_size_bytes,
            hit_rate,
            miss_rate,
            evictions: self.evictions(),
            average_access_latency_ms,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            expired_removals: self.expired_removals.load(Ordering::Relaxed),
        }
    }
}
