//! CDN URL construction
//!
//! The URL shape is `{base}/{segment}/{image_id}` with a segment such as
//! `w_800,h_600,q_85,f_webp`. Image tags depend on this exact layout, so
//! parameters always appear in the order width, height, quality, format,
//! crop.

use crate::core::CacheEngine;
use imgcache_core::ImageFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformations {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
    pub format: Option<ImageFormat>,
    /// Provider crop mode, e.g. `fill` or `fit`
    pub crop: Option<String>,
}

impl Transformations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn crop(mut self, mode: impl Into<String>) -> Self {
        self.crop = Some(mode.into());
        self
    }

    /// Comma-joined segment, `None` when nothing is set
    pub fn segment(&self) -> Option<String> {
        let mut parts = Vec::with_capacity(5);
        if let Some(w) = self.width {
            parts.push(format!("w_{w}"));
        }
        if let Some(h) = self.height {
            parts.push(format!("h_{h}"));
        }
        if let Some(q) = self.quality {
            parts.push(format!("q_{q}"));
        }
        if let Some(f) = self.format {
            parts.push(format!("f_{}", f.as_str()));
        }
        if let Some(c) = self.crop.as_deref().filter(|c| !c.is_empty()) {
            parts.push(format!("c_{c}"));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(","))
        }
    }
}

pub fn build_cdn_url(base_url: &str, image_id: &str, transformations: Option<&Transformations>) -> String {
    let base = base_url.trim_end_matches('/');
    let id = image_id.trim_start_matches('/');

    match transformations.and_then(Transformations::segment) {
        Some(segment) => format!("{base}/{segment}/{id}"),
        None => format!("{base}/{id}"),
    }
}

impl CacheEngine {
    /// CDN URL for `image_id` under the configured base URL
    pub fn cdn_url(&self, image_id: &str, transformations: Option<&Transformations>) -> String {
        build_cdn_url(&self.config().cdn_base_url, image_id, transformations)
    }
}
