//! Engine tests

mod advanced;
mod basic;
mod concurrency;

use crate::config::CacheConfig;
use crate::core::CacheEngine;
use imgcache_core::ManualClock;
use std::sync::Arc;
use std::time::Duration;

pub(super) const TTL: Duration = Duration::from_secs(60);

/// Memory-backed engine on a manual clock
pub(super) async fn engine(max_size_bytes: u64) -> (CacheEngine, ManualClock) {
    let config = CacheConfig::builder()
        .max_size_bytes(max_size_bytes)
        .ttl(TTL)
        .build()
        .unwrap();
    engine_with_config(config).await
}

pub(super) async fn engine_with_config(config: CacheConfig) -> (CacheEngine, ManualClock) {
    let clock = ManualClock::starting_now();
    let engine = CacheEngine::builder(config)
        .with_clock(Arc::new(clock.clone()))
        .build()
        .await
        .unwrap();
    (engine, clock)
}

pub(super) fn bytes(n: usize) -> Vec<u8> {
    vec![0xAB; n]
}
