//! Tests for the storage adapters and the binary envelope

use super::*;
use crate::config::{CacheConfig, StorageStrategy};
use crate::entry::{CacheEntry, Payload};
use crate::errors::{CacheError, StoreType};
use chrono::Utc;
use std::time::Duration;
use tempfile::TempDir;

fn entry(key: &str, bytes: &[u8]) -> CacheEntry {
    CacheEntry::new(
        key,
        Payload::from(bytes),
        Duration::from_secs(60),
        Utc::now(),
    )
    .with_content_type("image/png")
}

/// Toy cipher: XOR with a fixed byte
#[derive(Debug)]
struct XorCipher(u8);

impl PayloadCipher for XorCipher {
    fn seal(&self, plaintext: &[u8]) -> crate::Result<Vec<u8>> {
        Ok(plaintext.iter().map(|b| b ^ self.0).collect())
    }

    fn open(&self, ciphertext: &[u8]) -> crate::Result<Vec<u8>> {
        self.seal(ciphertext)
    }
}

#[test]
fn test_envelope_plain_and_compressed() {
    let original = entry("k", &vec![7u8; 4096]);

    for compression in [false, true] {
        let transport = TransportOptions {
            compression,
            ..TransportOptions::default()
        };
        let bytes = encode_entry(&original, &transport).unwrap();
        assert_eq!(&bytes[..4], &CACHE_MAGIC.to_le_bytes());
        let decoded = decode_entry("k", &bytes, &transport).unwrap();
        assert_eq!(decoded, original);
    }
}

#[test]
fn test_compression_shrinks_repetitive_payload() {
    let original = entry("k", &vec![0u8; 64 * 1024]);
    let plain = encode_entry(&original, &TransportOptions::default()).unwrap();
    let packed = encode_entry(
        &original,
        &TransportOptions {
            compression: true,
            ..TransportOptions::default()
        },
    )
    .unwrap();
    assert!(packed.len() < plain.len() / 10);
}

#[test]
fn test_envelope_detects_corruption() {
    let transport = TransportOptions::default();
    let mut bytes = encode_entry(&entry("k", b"payload"), &transport).unwrap();

    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    let err = decode_entry("k", &bytes, &transport).unwrap_err();
    assert!(matches!(err, CacheError::Corruption { .. }));

    let err = decode_entry("k", &bytes[..10], &transport).unwrap_err();
    assert!(matches!(err, CacheError::Corruption { .. }));
}

#[test]
fn test_envelope_rejects_foreign_key() {
    let transport = TransportOptions::default();
    let bytes = encode_entry(&entry("a", b"payload"), &transport).unwrap();
    let err = decode_entry("b", &bytes, &transport).unwrap_err();
    assert!(matches!(err, CacheError::Corruption { .. }));
}

#[test]
fn test_envelope_with_cipher() {
    let transport = TransportOptions {
        compression: true,
        cipher: Some(std::sync::Arc::new(XorCipher(0x5A))),
        ..TransportOptions::default()
    };
    let original = entry("k", b"secret pixels");
    let bytes = encode_entry(&original, &transport).unwrap();
    assert_eq!(decode_entry("k", &bytes, &transport).unwrap(), original);

    // Without the cipher the entry cannot be opened
    let err = decode_entry("k", &bytes, &TransportOptions::default()).unwrap_err();
    assert!(matches!(err, CacheError::Encryption { .. }));
}

#[tokio::test]
async fn test_memory_adapter_operations() {
    let adapter = MemoryAdapter::new();
    assert!(adapter.load("a").await.unwrap().is_none());

    adapter.persist("a", &entry("a", b"1")).await.unwrap();
    assert_eq!(adapter.len(), 1);
    assert!(adapter.load("a").await.unwrap().is_some());

    assert!(adapter.remove("a").await.unwrap());
    assert!(!adapter.remove("a").await.unwrap());

    adapter.persist("b", &entry("b", b"2")).await.unwrap();
    adapter.clear().await.unwrap();
    assert!(adapter.is_empty());
}

#[tokio::test]
async fn test_local_adapter_falls_back_to_disk() {
    let temp_dir = TempDir::new().unwrap();
    let adapter = LocalAdapter::new(temp_dir.path().to_path_buf(), TransportOptions::default())
        .await
        .unwrap();

    let original = entry("products/1/thumb", b"jpeg bytes");
    adapter.persist("products/1/thumb", &original).await.unwrap();

    let path = adapter.object_path("products/1/thumb");
    assert!(path.exists());
    assert!(path.starts_with(temp_dir.path().join("objects")));

    adapter.forget_hot("products/1/thumb");
    let loaded = adapter.load("products/1/thumb").await.unwrap();
    assert_eq!(loaded, Some(original));
}

#[tokio::test]
async fn test_local_adapter_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let transport = TransportOptions {
        compression: true,
        ..TransportOptions::default()
    };

    {
        let adapter = LocalAdapter::new(temp_dir.path().to_path_buf(), transport.clone())
            .await
            .unwrap();
        adapter.persist("k", &entry("k", b"durable")).await.unwrap();
    }

    let reopened = LocalAdapter::new(temp_dir.path().to_path_buf(), transport)
        .await
        .unwrap();
    let loaded = reopened.load("k").await.unwrap().unwrap();
    assert_eq!(loaded.payload.as_bytes(), b"durable");
}

#[tokio::test]
async fn test_local_adapter_remove_and_clear() {
    let temp_dir = TempDir::new().unwrap();
    let adapter = LocalAdapter::new(temp_dir.path().to_path_buf(), TransportOptions::default())
        .await
        .unwrap();

    adapter.persist("a", &entry("a", b"1")).await.unwrap();
    adapter.persist("b", &entry("b", b"2")).await.unwrap();

    assert!(adapter.remove("a").await.unwrap());
    assert!(!adapter.remove("a").await.unwrap());
    assert!(!adapter.object_path("a").exists());

    adapter.clear().await.unwrap();
    assert!(adapter.load("b").await.unwrap().is_none());
    assert!(temp_dir.path().join("objects").is_dir());
}

#[tokio::test]
async fn test_local_adapter_reports_corrupt_file() {
    let temp_dir = TempDir::new().unwrap();
    let adapter = LocalAdapter::new(temp_dir.path().to_path_buf(), TransportOptions::default())
        .await
        .unwrap();

    adapter.persist("k", &entry("k", b"data")).await.unwrap();
    adapter.forget_hot("k");
    std::fs::write(adapter.object_path("k"), b"garbage that is long enough to parse").unwrap();

    assert!(adapter.load("k").await.is_err());
}

#[tokio::test]
async fn test_build_adapter_selects_strategy() {
    let memory = build_adapter(&CacheConfig::default(), None).await.unwrap();
    assert_eq!(memory.store_type(), StoreType::Memory);

    let temp_dir = TempDir::new().unwrap();
    let config = CacheConfig {
        strategy: StorageStrategy::Local {
            base_dir: temp_dir.path().to_path_buf(),
        },
        ..CacheConfig::default()
    };
    let local = build_adapter(&config, None).await.unwrap();
    assert!(matches!(local.store_type(), StoreType::Local { .. }));
}

#[tokio::test]
async fn test_build_adapter_requires_cipher_for_encryption() {
    let config = CacheConfig {
        encryption: true,
        ..CacheConfig::default()
    };
    let err = build_adapter(&config, None).await.unwrap_err();
    assert!(matches!(err, CacheError::Configuration { .. }));

    let cipher: std::sync::Arc<dyn PayloadCipher> = std::sync::Arc::new(XorCipher(1));
    assert!(build_adapter(&config, Some(cipher)).await.is_ok());
}

#[test]
fn test_remote_adapter_rejects_bad_endpoint() {
    let err = RemoteAdapter::new(
        "ftp://example.com/cache",
        Duration::from_secs(1),
        TransportOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CacheError::Configuration { .. }));

    let ok = RemoteAdapter::new(
        "http://example.com/cache",
        Duration::from_secs(1),
        TransportOptions::default(),
    )
    .unwrap();
    assert_eq!(ok.endpoint().as_str(), "http://example.com/cache/");
}
