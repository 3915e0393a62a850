//! Store pipeline output in a [`CacheEngine`]
//!
//! Variants go through `set` like any other entry, so they count against
//! the cache's size budget and TTL.

use crate::errors::Result;
use crate::source::{OptimizationResult, Variant};
use imgcache_cache::{variant_key, CacheEngine, SetOptions};
use tracing::debug;

/// Key under which `cache_result` stores a variant
pub fn variant_cache_key(source_name: &str, variant: &Variant) -> String {
    variant_key(source_name, variant.format, &variant.label)
}

/// Key under which `cache_result` stores a thumbnail
pub fn thumbnail_cache_key(source_name: &str, thumbnail: &Variant) -> String {
    variant_key(source_name, thumbnail.format, &format!("thumb:{}", thumbnail.label))
}

/// Cache every variant and thumbnail; returns the keys written, variants first
///
/// Stops at the first failed `set`.
pub async fn cache_result(engine: &CacheEngine, result: &OptimizationResult) -> Result<Vec<String>> {
    let mut keys = Vec::with_capacity(result.variants.len() + result.thumbnails.len());

    let variants = result
        .variants
        .iter()
        .map(|v| (variant_cache_key(&result.source_name, v), v));
    let thumbnails = result
        .thumbnails
        .iter()
        .map(|t| (thumbnail_cache_key(&result.source_name, t), t));

    for (key, artifact) in variants.chain(thumbnails) {
        engine
            .set_with(
                &key,
                artifact.data.to_vec(),
                SetOptions::default().content_type(artifact.format.mime_type()),
            )
            .await?;
        debug!(key = %key, path = %artifact.path, bytes = artifact.size_bytes, "Cached artifact");
        keys.push(key);
    }

    Ok(keys)
}
