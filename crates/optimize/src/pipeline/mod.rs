//! Optimization pipeline
//!
//! Each request runs Validate, Decode, Derive (format x size), Collect
//! thumbnails and Summarize. Decode and encode are CPU-bound, so every
//! entry point moves that work onto the blocking pool and stays cheap on
//! the async side. The pipeline holds no cache state; callers that want
//! the artifacts cached hand the result to [`crate::bridge::cache_result`].

mod derive;
mod transform;


use crate::codec::{EncodeSettings, ImageCodec, StandardCodec};
use crate::errors::{OptimizeError, Result};
use crate::options::{OptimizationOptions, SizeVariant};
use crate::source::{compression_ratio, SourceImage, Variant};
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use imgcache_core::{ImageFormat, MAX_SOURCE_BYTES};
use std::sync::Arc;
use tokio::task::spawn_blocking;

const RESIZE_FILTER: FilterType = FilterType::Triangle;

#[derive(Debug, Clone)]
pub struct OptimizationPipeline {
    codec: Arc<dyn ImageCodec>,
    max_source_bytes: usize,
}

impl Default for OptimizationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationPipeline {
    /// Pipeline over the `image` crate codec
    pub fn new() -> Self {
        Self::with_codec(Arc::new(StandardCodec))
    }

    pub fn with_codec(codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            codec,
            max_source_bytes: MAX_SOURCE_BYTES,
        }
    }

    pub fn with_max_source_bytes(mut self, max_source_bytes: usize) -> Self {
        self.max_source_bytes = max_source_bytes;
        self
    }

    pub fn max_source_bytes(&self) -> usize {
        self.max_source_bytes
    }

    /// Check size and extension before any decode work
    ///
    /// Returns the format implied by the source name.
    pub fn validate(&self, source: &SourceImage) -> Result<ImageFormat> {
        if source.is_empty() {
            return Err(OptimizeError::validation(&source.name, "image is empty"));
        }
        if source.len() > self.max_source_bytes {
            return Err(OptimizeError::validation(
                &source.name,
                format!(
                    "image is {} bytes, limit is {} bytes",
                    source.len(),
                    self.max_source_bytes
                ),
            ));
        }
        source.format().ok_or_else(|| {
            OptimizeError::validation(
                &source.name,
                "unsupported file type; expected jpeg, jpg, png, webp or avif",
            )
        })
    }

    // Run CPU-bound work on the blocking pool with this pipeline's codec
    async fn run_blocking<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&dyn ImageCodec) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let codec = Arc::clone(&self.codec);
        spawn_blocking(move || work(codec.as_ref())).await?
    }
}

fn validate_options(source: &SourceImage, options: &OptimizationOptions) -> Result<()> {
    if options.formats.is_empty() {
        return Err(OptimizeError::validation(
            &source.name,
            "no output formats requested",
        ));
    }
    validate_sizes(source, &options.sizes)
}

fn validate_sizes(source: &SourceImage, sizes: &[SizeVariant]) -> Result<()> {
    for size in sizes {
        if size.width == 0 || size.height == 0 {
            return Err(OptimizeError::validation(
                &source.name,
                format!("size '{}' has a zero dimension", size.label),
            ));
        }
        if !size.has_safe_label() {
            return Err(OptimizeError::validation(
                &source.name,
                format!(
                    "size label '{}' must be letters, digits, '-', '_' or '.'",
                    size.label
                ),
            ));
        }
    }
    Ok(())
}

fn decode(codec: &dyn ImageCodec, source: &SourceImage) -> Result<DynamicImage> {
    codec.decode(&source.data).map_err(|e| OptimizeError::Decode {
        name: source.name.clone(),
        message: e.0,
    })
}

/// Scale to the target box; cover-crop when the aspect ratio is kept
fn resize(image: &DynamicImage, size: &SizeVariant, maintain_aspect_ratio: bool) -> DynamicImage {
    if image.dimensions() == (size.width, size.height) {
        return image.clone();
    }
    if maintain_aspect_ratio {
        image.resize_to_fill(size.width, size.height, RESIZE_FILTER)
    } else {
        image.resize_exact(size.width, size.height, RESIZE_FILTER)
    }
}

fn encode_variant(
    codec: &dyn ImageCodec,
    image: &DynamicImage,
    format: ImageFormat,
    settings: EncodeSettings,
    label: &str,
    path: String,
    original_size: u64,
) -> Result<Variant> {
    let data = codec
        .encode(image, format, settings)
        .map_err(|e| OptimizeError::Derivation {
            format,
            label: label.to_string(),
            message: e.0,
        })?;
    let size_bytes = data.len() as u64;
    let (width, height) = image.dimensions();
    Ok(Variant {
        format,
        label: label.to_string(),
        path,
        size_bytes,
        width,
        height,
        compression_ratio: compression_ratio(size_bytes, original_size),
        data: Bytes::from(data),
    })
}
