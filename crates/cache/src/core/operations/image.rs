//! Image convenience wrappers
//!
//! Keys come from [`image_key`], a hash of `(source_url, quality, format)`.

use crate::entry::{CacheEntry, SetOptions};
use crate::errors::Result;
use crate::keys::image_key;
use imgcache_core::ImageFormat;

use super::super::types::CacheEngine;

impl CacheEngine {
    /// Cache encoded image bytes for a source URL; returns the derived key
    pub async fn cache_image(
        &self,
        source_url: &str,
        data: impl Into<Vec<u8>>,
        quality: Option<u8>,
        format: Option<ImageFormat>,
    ) -> Result<String> {
        let key = image_key(source_url, quality, format);
        let mut options = SetOptions::default();
        if let Some(format) = format.or_else(|| ImageFormat::from_path(source_url)) {
            options = options.content_type(format.mime_type());
        }

        let bytes: Vec<u8> = data.into();
        self.set_with(&key, bytes, options).await?;
        Ok(key)
    }

    pub async fn get_cached_image(
        &self,
        source_url: &str,
        quality: Option<u8>,
        format: Option<ImageFormat>,
    ) -> Result<Option<CacheEntry>> {
        self.get(&image_key(source_url, quality, format)).await
    }

    pub async fn invalidate_image(
        &self,
        source_url: &str,
        quality: Option<u8>,
        format: Option<ImageFormat>,
    ) -> Result<bool> {
        self.delete(&image_key(source_url, quality, format)).await
    }
}
