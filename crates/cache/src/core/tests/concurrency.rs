//! Removals racing reads and writes

use super::bytes;
use crate::config::CacheConfig;
use crate::core::CacheEngine;
use crate::entry::CacheEntry;
use crate::errors::{Result, StoreType};
use crate::storage::{MemoryAdapter, StorageAdapter};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Memory adapter whose removals stall after announcing themselves
#[derive(Debug, Default)]
struct SlowRemoveAdapter {
    inner: MemoryAdapter,
    removing: Notify,
    delay: Duration,
}

#[async_trait]
impl StorageAdapter for SlowRemoveAdapter {
    fn store_type(&self) -> StoreType {
        StoreType::Memory
    }

    async fn persist(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        self.inner.persist(key, entry).await
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        self.inner.load(key).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        self.removing.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.remove(key).await
    }

    async fn clear(&self) -> Result<()> {
        self.inner.clear().await
    }
}

async fn slow_engine(
    max_size_bytes: u64,
    delay: Duration,
) -> (CacheEngine, Arc<SlowRemoveAdapter>) {
    let adapter = Arc::new(SlowRemoveAdapter {
        delay,
        ..SlowRemoveAdapter::default()
    });
    let config = CacheConfig::builder()
        .max_size_bytes(max_size_bytes)
        .build()
        .unwrap();
    let engine = CacheEngine::builder(config)
        .with_adapter(adapter.clone())
        .build()
        .await
        .unwrap();
    (engine, adapter)
}

/// Running total against the entries actually held
fn assert_accounting(engine: &CacheEngine, max_size_bytes: u64) {
    let state = engine.inner.state.lock();
    let live: u64 = state.entries.values().map(|slot| slot.entry.size()).sum();
    assert_eq!(state.total_size_bytes, live);
    assert!(state.total_size_bytes <= max_size_bytes);
    for key in state.entries.keys() {
        assert!(!state.is_removing(key), "{key} still pending removal");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_get_during_delete_does_not_bring_entry_back() {
    let (engine, adapter) = slow_engine(10_000, Duration::from_millis(50)).await;
    engine.set("k", bytes(64)).await.unwrap();

    let deleting = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.delete("k").await })
    };
    adapter.removing.notified().await;

    assert!(engine.get("k").await.unwrap().is_none());
    assert!(deleting.await.unwrap().unwrap());
    assert!(engine.get("k").await.unwrap().is_none());
    assert!(!engine.has("k").await.unwrap());
    assert_eq!(engine.entry_count(), 0);
    assert_eq!(engine.total_size_bytes(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_get_during_eviction_does_not_displace_new_entry() {
    let (engine, adapter) = slow_engine(100, Duration::from_millis(50)).await;
    engine.set("old", bytes(60)).await.unwrap();

    let writing = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.set("new", bytes(60)).await })
    };
    adapter.removing.notified().await;

    assert!(engine.get("old").await.unwrap().is_none());
    writing.await.unwrap().unwrap();

    assert!(engine.get("old").await.unwrap().is_none());
    assert!(engine.get("new").await.unwrap().is_some());
    assert_eq!(engine.total_size_bytes(), 60);
    assert_accounting(&engine, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_writers_keep_totals_consistent() {
    const MAX: u64 = 1_000;
    let (engine, _) = slow_engine(MAX, Duration::from_millis(1)).await;

    let workers: Vec<_> = (0..8u64)
        .map(|worker| {
            let engine = engine.clone();
            tokio::spawn(async move {
                for step in 0..150u64 {
                    let key = format!("k{}", (worker * 7 + step) % 12);
                    match (worker + step) % 4 {
                        0 | 1 => {
                            let size = 20 + ((worker * 31 + step * 17) % 180) as usize;
                            engine.set(&key, bytes(size)).await.unwrap();
                        }
                        2 => {
                            engine.delete(&key).await.unwrap();
                        }
                        _ => {
                            engine.get(&key).await.unwrap();
                        }
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.await.unwrap();
    }

    assert_accounting(&engine, MAX);

    let stats = engine.get_stats();
    assert_eq!(stats.total_size_bytes, engine.total_size_bytes());
    assert_eq!(stats.total_entries, engine.entry_count());
}
