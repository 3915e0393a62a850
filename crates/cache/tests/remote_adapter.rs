//! HTTP object-store adapter against a mock server

use chrono::Utc;
use imgcache_cache::keys::hash_key;
use imgcache_cache::storage::encode_entry;
use imgcache_cache::{
    CacheConfig, CacheEngine, CacheEntry, CacheError, Payload, RemoteAdapter, StorageAdapter,
    StorageStrategy, TransportOptions,
};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter(server: &MockServer) -> RemoteAdapter {
    RemoteAdapter::new(
        &format!("{}/objects", server.uri()),
        Duration::from_secs(2),
        TransportOptions::default(),
    )
    .unwrap()
}

fn entry(key: &str) -> CacheEntry {
    CacheEntry::new(
        key,
        Payload::from(b"remote pixels".to_vec()),
        Duration::from_secs(600),
        Utc::now(),
    )
}

#[tokio::test]
async fn test_put_targets_hashed_key() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/objects/{}", hash_key("thumb/1"))))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    adapter(&server)
        .persist("thumb/1", &entry("thumb/1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_decodes_envelope_and_404_is_absent() {
    let server = MockServer::start().await;
    let stored = entry("thumb/1");
    let body = encode_entry(&stored, &TransportOptions::default()).unwrap();

    Mock::given(method("GET"))
        .and(path(format!("/objects/{}", hash_key("thumb/1"))))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let adapter = adapter(&server);
    assert_eq!(adapter.load("thumb/1").await.unwrap(), Some(stored));
    assert_eq!(adapter.load("thumb/2").await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_reports_presence() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/objects/{}", hash_key("gone"))))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/objects/{}", hash_key("here"))))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/objects/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server);
    assert!(adapter.remove("here").await.unwrap());
    assert!(!adapter.remove("gone").await.unwrap());
    adapter.clear().await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = adapter(&server)
        .persist("k", &entry("k"))
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::StoreUnavailable { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_engine_over_remote_store() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = CacheConfig {
        strategy: StorageStrategy::Remote {
            endpoint: format!("{}/objects", server.uri()),
        },
        ..CacheConfig::default()
    };
    let engine = CacheEngine::new(config).await.unwrap();

    engine.set("k", "v").await.unwrap();
    assert!(engine.get("k").await.unwrap().is_some());

    // Remote read failures degrade to misses
    assert!(engine.get("other").await.unwrap().is_none());
    assert_eq!(engine.get_stats().misses, 1);
}
