//! Cache key validation and deterministic key derivation
//!
//! Image keys are SHA-256 digests of the tuple that produced the asset, so
//! the same source and transformation map to the same key across restarts.

use crate::errors::{CacheError, Result};
use imgcache_core::ImageFormat;
use sha2::{Digest, Sha256};

/// Longest key accepted by the engine, in bytes
pub const MAX_KEY_LEN: usize = 1024;

const IMAGE_KEY_PREFIX: &str = "img:";
const VARIANT_KEY_PREFIX: &str = "variant:";

/// Reject keys the adapters cannot address safely
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::invalid_key(key, "key is empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(CacheError::invalid_key(
            key_prefix(key),
            format!("key is {} bytes, limit is {MAX_KEY_LEN}", key.len()),
        ));
    }
    if key.chars().any(char::is_control) {
        return Err(CacheError::invalid_key(key, "key contains control characters"));
    }
    Ok(())
}

/// Hash a cache key using SHA-256
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Key for a cached image identified by source URL, quality and output format
pub fn image_key(source_url: &str, quality: Option<u8>, format: Option<ImageFormat>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_url.as_bytes());
    hasher.update([0u8]);
    hasher.update(quality.map(|q| q.to_string()).unwrap_or_default().as_bytes());
    hasher.update([0u8]);
    hasher.update(format.map(ImageFormat::as_str).unwrap_or_default().as_bytes());
    format!("{IMAGE_KEY_PREFIX}{}", hex::encode(hasher.finalize()))
}

/// Key for a pipeline variant identified by source, format and size label
pub fn variant_key(source_id: &str, format: ImageFormat, label: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(format.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(label.as_bytes());
    format!("{VARIANT_KEY_PREFIX}{}", hex::encode(hasher.finalize()))
}

// First 64 bytes of an oversized key, cut on a char boundary
fn key_prefix(key: &str) -> &str {
    let mut end = key.len().min(64);
    while !key.is_char_boundary(end) {
        end -= 1;
    }
    &key[..end]
}
