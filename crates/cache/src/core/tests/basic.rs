//! Basic engine behavior

use super::{bytes, engine, TTL};
use crate::entry::{Payload, SetOptions};
use crate::errors::CacheError;
use std::time::Duration;

#[tokio::test]
async fn test_round_trip() {
    let (engine, _) = engine(1 << 20).await;

    engine.set("bin", vec![1u8, 2, 3, 255]).await.unwrap();
    engine.set("text", "héllo").await.unwrap();

    let bin = engine.get("bin").await.unwrap().unwrap();
    assert_eq!(bin.payload.as_bytes(), &[1, 2, 3, 255]);

    let text = engine.get("text").await.unwrap().unwrap();
    assert_eq!(text.payload, Payload::Text("héllo".to_string()));
    assert_eq!(text.size(), "héllo".len() as u64);
}

#[tokio::test]
async fn test_second_write_evicts_first_when_over_budget() {
    let (engine, _) = engine(1000).await;

    engine.set("a", bytes(600)).await.unwrap();
    engine.set("b", bytes(600)).await.unwrap();

    assert!(engine.get("a").await.unwrap().is_none());
    let b = engine.get("b").await.unwrap().unwrap();
    assert_eq!(b.payload.len(), 600);

    let stats = engine.get_stats();
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.total_size_bytes, 600);
}

#[tokio::test]
async fn test_reset_replaces_without_double_counting() {
    let (engine, _) = engine(1000).await;

    engine.set("a", bytes(400)).await.unwrap();
    engine.set("a", bytes(700)).await.unwrap();

    assert_eq!(engine.total_size_bytes(), 700);
    assert_eq!(engine.entry_count(), 1);
    assert_eq!(engine.get_stats().evictions, 0);
}

#[tokio::test]
async fn test_ttl_expiry() {
    let (engine, clock) = engine(1 << 20).await;
    engine.set("k", "v").await.unwrap();

    clock.advance(TTL - Duration::from_millis(1));
    assert!(engine.get("k").await.unwrap().is_some());

    clock.advance(Duration::from_millis(1));
    assert!(engine.get("k").await.unwrap().is_none());
    assert!(engine.get("k").await.unwrap().is_none());
    assert_eq!(engine.entry_count(), 0);

    let stats = engine.get_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.expired_removals, 1);
}

#[tokio::test]
async fn test_per_entry_overrides() {
    let (engine, clock) = engine(1 << 20).await;
    engine
        .set_with(
            "short",
            "v",
            SetOptions::ttl(Duration::from_secs(1)).content_type("text/plain"),
        )
        .await
        .unwrap();
    engine.set("default", "v").await.unwrap();

    let entry = engine.get("short").await.unwrap().unwrap();
    assert_eq!(entry.metadata.content_type.as_deref(), Some("text/plain"));
    assert_eq!(
        entry.metadata.expires_at - entry.metadata.created_at,
        chrono::Duration::seconds(1)
    );

    clock.advance(Duration::from_secs(2));
    assert!(engine.get("short").await.unwrap().is_none());
    assert!(engine.get("default").await.unwrap().is_some());
}

#[tokio::test]
async fn test_get_updates_access_metadata() {
    let (engine, clock) = engine(1 << 20).await;
    engine.set("k", "v").await.unwrap();

    clock.advance(Duration::from_secs(5));
    let first = engine.get("k").await.unwrap().unwrap();
    clock.advance(Duration::from_secs(5));
    let second = engine.get("k").await.unwrap().unwrap();

    assert_eq!(first.metadata.access_count, 1);
    assert_eq!(second.metadata.access_count, 2);
    assert!(second.metadata.last_accessed_at > first.metadata.last_accessed_at);
    assert_eq!(second.metadata.created_at, first.metadata.created_at);
}

#[tokio::test]
async fn test_has_is_read_only() {
    let (engine, clock) = engine(1 << 20).await;
    engine.set("k", "v").await.unwrap();

    assert!(engine.has("k").await.unwrap());
    assert!(!engine.has("missing").await.unwrap());

    let stats = engine.get_stats();
    assert_eq!(stats.hits + stats.misses, 0);
    let entry = engine.get("k").await.unwrap().unwrap();
    assert_eq!(entry.metadata.access_count, 1);

    clock.advance(TTL);
    assert!(!engine.has("k").await.unwrap());
    // Expired but still resident until a get or cleanup
    assert_eq!(engine.entry_count(), 1);
}

#[tokio::test]
async fn test_delete() {
    let (engine, _) = engine(1 << 20).await;
    engine.set("k", bytes(10)).await.unwrap();

    assert!(engine.delete("k").await.unwrap());
    assert!(!engine.delete("k").await.unwrap());
    assert_eq!(engine.total_size_bytes(), 0);
    assert!(engine.get("k").await.unwrap().is_none());
}

#[tokio::test]
async fn test_clear_resets_content_but_not_history() {
    let (engine, _) = engine(1 << 20).await;
    engine.set("a", bytes(10)).await.unwrap();
    engine.set("b", bytes(20)).await.unwrap();
    engine.get("a").await.unwrap();
    engine.get("zzz").await.unwrap();

    engine.clear().await.unwrap();
    engine.clear().await.unwrap();

    let stats = engine.get_stats();
    assert_eq!(stats.total_entries, 0);
    assert_eq!(stats.total_size_bytes, 0);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert!(engine.get("a").await.unwrap().is_none());
}

#[tokio::test]
async fn test_hit_and_miss_rates() {
    let (engine, _) = engine(1 << 20).await;
    engine.set("present", "v").await.unwrap();

    for _ in 0..3 {
        engine.get("present").await.unwrap();
    }
    engine.get("absent").await.unwrap();

    let stats = engine.get_stats();
    assert_eq!(stats.hit_rate, 0.75);
    assert_eq!(stats.miss_rate, 0.25);
    assert!(stats.average_access_latency_ms >= 0.0);
}

#[tokio::test]
async fn test_invalid_keys_touch_nothing() {
    let (engine, _) = engine(1 << 20).await;

    let err = engine.set("", "v").await.unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(err, CacheError::InvalidKey { .. }));

    assert!(engine.get("bad\u{0}key").await.is_err());
    assert!(engine.has("").await.is_err());
    assert!(engine.delete("").await.is_err());

    let stats = engine.get_stats();
    assert_eq!(stats.hits + stats.misses, 0);
    assert_eq!(stats.writes, 0);
}
