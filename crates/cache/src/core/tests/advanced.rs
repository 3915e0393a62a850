//! Eviction, maintenance, adapters and batches

use super::{bytes, engine, engine_with_config, TTL};
use crate::config::{CacheConfig, StorageStrategy};
use crate::core::CacheEngine;
use crate::entry::CacheEntry;
use crate::errors::{CacheError, RecoveryHint, Result, StoreType};
use crate::storage::{MemoryAdapter, StorageAdapter};
use async_trait::async_trait;
use imgcache_core::{ImageFormat, ManualClock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Memory adapter whose writes and reads can be made to fail
#[derive(Debug, Default)]
struct FlakyAdapter {
    inner: MemoryAdapter,
    fail_persist: AtomicBool,
    fail_load: AtomicBool,
}

impl FlakyAdapter {
    fn outage(&self) -> CacheError {
        CacheError::StoreUnavailable {
            store_type: StoreType::Memory,
            reason: "simulated outage".to_string(),
            recovery_hint: RecoveryHint::Retry {
                after: Duration::from_millis(10),
            },
        }
    }
}

#[async_trait]
impl StorageAdapter for FlakyAdapter {
    fn store_type(&self) -> StoreType {
        StoreType::Memory
    }

    async fn persist(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(self.outage());
        }
        self.inner.persist(key, entry).await
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(self.outage());
        }
        self.inner.load(key).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        self.inner.remove(key).await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }
}

async fn flaky_engine() -> (CacheEngine, Arc<FlakyAdapter>) {
    let adapter = Arc::new(FlakyAdapter::default());
    let engine = CacheEngine::builder(CacheConfig::default())
        .with_adapter(adapter.clone())
        .build()
        .await
        .unwrap();
    (engine, adapter)
}

#[tokio::test]
async fn test_least_recently_used_goes_first() {
    let (engine, clock) = engine(1000).await;

    engine.set("a", bytes(300)).await.unwrap();
    clock.advance(Duration::from_secs(1));
    engine.set("b", bytes(300)).await.unwrap();
    clock.advance(Duration::from_secs(1));
    engine.set("c", bytes(300)).await.unwrap();

    // Reading "a" makes "b" the coldest
    clock.advance(Duration::from_secs(1));
    engine.get("a").await.unwrap();

    clock.advance(Duration::from_secs(1));
    engine.set("d", bytes(300)).await.unwrap();

    assert!(!engine.has("b").await.unwrap());
    assert!(engine.has("a").await.unwrap());
    assert!(engine.has("c").await.unwrap());
    assert!(engine.has("d").await.unwrap());
    assert_eq!(engine.total_size_bytes(), 900);
}

#[tokio::test]
async fn test_oversized_entry_is_stored_after_evicting_everything() {
    let (engine, _) = engine(1000).await;
    engine.set("a", bytes(200)).await.unwrap();
    engine.set("b", bytes(200)).await.unwrap();

    engine.set("huge", bytes(5000)).await.unwrap();

    assert_eq!(engine.entry_count(), 1);
    assert_eq!(engine.total_size_bytes(), 5000);
    assert_eq!(engine.get_stats().evictions, 2);
    assert!(engine.get("huge").await.unwrap().is_some());
}

#[tokio::test]
async fn test_lfu_policy_keeps_popular_entries() {
    let config = CacheConfig::builder()
        .max_size_bytes(1000)
        .eviction_policy("lfu")
        .build()
        .unwrap();
    let (engine, clock) = engine_with_config(config).await;

    engine.set("popular", bytes(400)).await.unwrap();
    engine.set("rare", bytes(400)).await.unwrap();
    for _ in 0..3 {
        clock.advance(Duration::from_millis(10));
        engine.get("popular").await.unwrap();
    }
    clock.advance(Duration::from_millis(10));
    engine.get("rare").await.unwrap();

    engine.set("new", bytes(400)).await.unwrap();
    assert!(engine.has("popular").await.unwrap());
    assert!(!engine.has("rare").await.unwrap());
}

#[tokio::test]
async fn test_cleanup_removes_only_expired() {
    let (engine, clock) = engine(1 << 20).await;
    engine.set("old", "v").await.unwrap();
    clock.advance(TTL / 2);
    engine.set("young", "v").await.unwrap();
    clock.advance(TTL / 2);

    assert_eq!(engine.cleanup().await, 1);
    assert_eq!(engine.cleanup().await, 0);
    assert!(engine.has("young").await.unwrap());
    assert_eq!(engine.get_stats().expired_removals, 1);
}

#[tokio::test(start_paused = true)]
async fn test_background_cleanup() {
    let (engine, clock) = engine(1 << 20).await;
    engine.set("k", "v").await.unwrap();
    engine.spawn_cleanup(Duration::from_secs(10));

    clock.advance(TTL);
    tokio::time::sleep(Duration::from_secs(25)).await;

    assert_eq!(engine.entry_count(), 0);
}

#[tokio::test]
async fn test_optimize_trims_to_target_count() {
    let config = CacheConfig::builder()
        .max_size_bytes(1000)
        .assumed_entry_size(250)
        .build()
        .unwrap();
    let (engine, clock) = engine_with_config(config).await;

    for key in ["a", "b", "c", "d", "e", "f"] {
        engine.set(key, bytes(10)).await.unwrap();
        clock.advance(Duration::from_secs(1));
    }
    engine.get("a").await.unwrap();

    let report = engine.optimize().await;
    assert_eq!(report.target_entries, 4);
    assert_eq!(report.evicted, vec!["b".to_string(), "c".to_string()]);
    assert_eq!(report.remaining, 4);
    assert_eq!(engine.get_stats().evictions, 2);

    let again = engine.optimize().await;
    assert!(again.evicted.is_empty());
}

#[tokio::test]
async fn test_batch_preserves_order_and_isolates_failures() {
    let (engine, _) = engine(1 << 20).await;

    let results = engine
        .set_multiple(vec![("one", "1"), ("", "bad"), ("three", "3")])
        .await;
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());

    let got = engine.get_multiple(&["three", "missing", "one"]).await;
    let payloads: Vec<Option<Vec<u8>>> = got
        .into_iter()
        .map(|r| r.unwrap().map(|e| e.payload.into_bytes()))
        .collect();
    assert_eq!(
        payloads,
        vec![Some(b"3".to_vec()), None, Some(b"1".to_vec())]
    );
}

#[tokio::test]
async fn test_persist_failure_is_surfaced_and_rolled_back() {
    let (engine, adapter) = flaky_engine().await;
    adapter.fail_persist.store(true, Ordering::SeqCst);

    let err = engine.set("k", bytes(10)).await.unwrap_err();
    assert!(err.is_adapter());
    assert!(err.is_transient());
    match &err {
        CacheError::Adapter { key, operation, .. } => {
            assert_eq!(key, "k");
            assert_eq!(*operation, "persist");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(engine.entry_count(), 0);
    assert_eq!(engine.total_size_bytes(), 0);
    assert_eq!(engine.get_stats().writes, 0);
}

#[tokio::test]
async fn test_load_failure_is_a_miss() {
    let (engine, adapter) = flaky_engine().await;
    adapter.fail_load.store(true, Ordering::SeqCst);

    assert!(engine.get("k").await.unwrap().is_none());
    assert!(!engine.has("k").await.unwrap());
    assert_eq!(engine.get_stats().misses, 1);
}

#[tokio::test]
async fn test_adapter_entries_are_promoted() {
    let adapter = Arc::new(MemoryAdapter::new());
    let clock = ManualClock::starting_now();
    let seeded = CacheEntry::new("seeded", bytes(100).into(), TTL, clock_now(&clock));
    adapter.persist("seeded", &seeded).await.unwrap();

    let engine = CacheEngine::builder(CacheConfig::default())
        .with_adapter(adapter)
        .with_clock(Arc::new(clock.clone()))
        .build()
        .await
        .unwrap();

    assert_eq!(engine.entry_count(), 0);
    let entry = engine.get("seeded").await.unwrap().unwrap();
    assert_eq!(entry.metadata.access_count, 1);
    assert_eq!(engine.entry_count(), 1);
    assert_eq!(engine.total_size_bytes(), 100);

    // Adapter-only expiry is found lazily
    engine.clear().await.unwrap();
    let stale = CacheEntry::new("stale", bytes(1).into(), TTL, clock_now(&clock));
    engine.inner.adapter.persist("stale", &stale).await.unwrap();
    clock.advance(TTL);
    assert_eq!(engine.cleanup().await, 0);
    assert!(engine.get("stale").await.unwrap().is_none());
    assert!(engine.inner.adapter.load("stale").await.unwrap().is_none());
}

#[tokio::test]
async fn test_local_strategy_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let config = CacheConfig {
        strategy: StorageStrategy::Local {
            base_dir: temp_dir.path().to_path_buf(),
        },
        compression: true,
        ..CacheConfig::default()
    };

    {
        let engine = CacheEngine::new(config.clone()).await.unwrap();
        engine.set("thumb", bytes(64)).await.unwrap();
    }

    let engine = CacheEngine::new(config).await.unwrap();
    let entry = engine.get("thumb").await.unwrap().unwrap();
    assert_eq!(entry.payload.len(), 64);
}

#[tokio::test]
async fn test_image_helpers() {
    let (engine, _) = engine(1 << 20).await;
    let url = "https://shop.example.com/p/42.png";

    let key = engine
        .cache_image(url, bytes(32), Some(80), Some(ImageFormat::Webp))
        .await
        .unwrap();
    assert!(key.starts_with("img:"));

    let entry = engine
        .get_cached_image(url, Some(80), Some(ImageFormat::Webp))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.metadata.content_type.as_deref(), Some("image/webp"));

    // Different parameters are a different asset
    assert!(engine
        .get_cached_image(url, Some(60), Some(ImageFormat::Webp))
        .await
        .unwrap()
        .is_none());

    assert!(engine
        .invalidate_image(url, Some(80), Some(ImageFormat::Webp))
        .await
        .unwrap());
    assert!(!engine.has(&key).await.unwrap());
}

fn clock_now(clock: &ManualClock) -> chrono::DateTime<chrono::Utc> {
    use imgcache_core::Clock;
    clock.now()
}
