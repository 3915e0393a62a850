//! Responsive variants and thumbnails

use super::{
    decode, encode_variant, resize, validate_options, validate_sizes, OptimizationPipeline,
};
use crate::codec::{EncodeSettings, ImageCodec};
use crate::errors::{OptimizeError, Result};
use crate::options::{FailureMode, OptimizationOptions, SizeVariant};
use crate::source::{DerivationFailure, OptimizationResult, SourceImage, Variant};
use image::{DynamicImage, GenericImageView};
use imgcache_core::{fetch_with_timeout, ImageFetcher, ImageFormat};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

impl OptimizationPipeline {
    /// Derive every (format, size) variant plus thumbnails, failing fast
    pub async fn process_image(
        &self,
        source: &SourceImage,
        options: &OptimizationOptions,
        cancel: &CancellationToken,
    ) -> Result<OptimizationResult> {
        self.process_image_with(source, options, FailureMode::FailFast, cancel)
            .await
    }

    /// Like [`process_image`](Self::process_image), but a failed derivation
    /// is reported in `omitted` instead of aborting the request
    pub async fn generate_responsive_images(
        &self,
        source: &SourceImage,
        options: &OptimizationOptions,
        cancel: &CancellationToken,
    ) -> Result<OptimizationResult> {
        self.process_image_with(source, options, FailureMode::FailSoft, cancel)
            .await
    }

    #[instrument(skip(self, source, options, cancel), fields(image = %source.name))]
    pub async fn process_image_with(
        &self,
        source: &SourceImage,
        options: &OptimizationOptions,
        mode: FailureMode,
        cancel: &CancellationToken,
    ) -> Result<OptimizationResult> {
        let format = self.validate(source)?;
        validate_options(source, options)?;

        let job = DeriveJob {
            source: source.clone(),
            format,
            options: options.clone(),
            mode,
            cancel: cancel.clone(),
        };
        let result = self.run_blocking(move |codec| job.run(codec)).await?;

        info!(
            variants = result.variants.len(),
            thumbnails = result.thumbnails.len(),
            omitted = result.omitted.len(),
            savings = result.total_savings,
            elapsed_ms = result.processing_time_ms,
            "Optimized image"
        );
        Ok(result)
    }

    /// JPEG thumbnails at each of `sizes`
    pub async fn create_thumbnails(
        &self,
        source: &SourceImage,
        sizes: &[SizeVariant],
        quality: u8,
        maintain_aspect_ratio: bool,
    ) -> Result<Vec<Variant>> {
        self.validate(source)?;
        validate_sizes(source, sizes)?;

        let source = source.clone();
        let sizes = sizes.to_vec();
        self.run_blocking(move |codec| {
            let image = decode(codec, &source)?;
            let original_size = source.len() as u64;
            sizes
                .iter()
                .map(|size| {
                    let resized = resize(&image, size, maintain_aspect_ratio);
                    thumbnail(codec, &resized, &source, size, quality, original_size)
                })
                .collect()
        })
        .await
    }

    /// Fetch a remote source and run [`process_image`](Self::process_image) on it
    pub async fn process_url(
        &self,
        fetcher: &dyn ImageFetcher,
        url: &str,
        options: &OptimizationOptions,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<OptimizationResult> {
        if cancel.is_cancelled() {
            return Err(OptimizeError::Cancelled);
        }
        let fetched = tokio::select! {
            fetched = fetch_with_timeout(fetcher, url, timeout) => fetched?,
            _ = cancel.cancelled() => return Err(OptimizeError::Cancelled),
        };

        let name = source_name(url, fetched.content_type.as_deref());
        debug!(url, name = %name, bytes = fetched.data.len(), "Fetched source image");
        let source = SourceImage::new(name, fetched.data);
        self.process_image(&source, options, cancel).await
    }
}

struct DeriveJob {
    source: SourceImage,
    format: ImageFormat,
    options: OptimizationOptions,
    mode: FailureMode,
    cancel: CancellationToken,
}

impl DeriveJob {
    fn run(self, codec: &dyn ImageCodec) -> Result<OptimizationResult> {
        let started = Instant::now();
        let image = decode(codec, &self.source)?;
        let (original_width, original_height) = image.dimensions();
        let original_size = self.source.len() as u64;
        let stem = self.source.stem();
        let options = &self.options;

        // One resize per size, shared by every format and the thumbnail
        let mut resized: Vec<Option<DynamicImage>> = vec![None; options.sizes.len()];
        let mut variants = Vec::with_capacity(options.formats.len() * options.sizes.len());
        let mut omitted = Vec::new();

        for &format in &options.formats {
            let settings = EncodeSettings {
                quality: options.quality.for_format(format).clamp(1, 100),
                progressive: options.progressive,
            };
            for (idx, size) in options.sizes.iter().enumerate() {
                self.check_cancelled()?;
                let scaled = resized[idx]
                    .get_or_insert_with(|| resize(&image, size, options.maintain_aspect_ratio));
                let path = format!("{stem}_{}.{}", size.label, format.extension());
                let derived =
                    encode_variant(codec, scaled, format, settings, &size.label, path, original_size);
                match derived {
                    Ok(variant) => {
                        debug!(
                            format = %format,
                            label = %size.label,
                            bytes = variant.size_bytes,
                            "Derived variant"
                        );
                        variants.push(variant);
                    }
                    Err(error) => self.absorb(error, &mut omitted)?,
                }
            }
        }

        let mut thumbnails = Vec::new();
        for (idx, size) in options.thumbnail_sizes().iter().enumerate() {
            self.check_cancelled()?;
            let scaled = resized[idx]
                .get_or_insert_with(|| resize(&image, size, options.maintain_aspect_ratio));
            let quality = options.quality.jpeg;
            match thumbnail(codec, scaled, &self.source, size, quality, original_size) {
                Ok(thumb) => thumbnails.push(thumb),
                Err(error) => self.absorb(error, &mut omitted)?,
            }
        }

        let derived: u64 = variants.iter().map(|v| v.size_bytes).sum();
        Ok(OptimizationResult {
            source_name: self.source.name.clone(),
            original_format: self.format,
            original_width,
            original_height,
            original_size_bytes: original_size,
            variants,
            thumbnails,
            processing_time_ms: started.elapsed().as_millis() as u64,
            total_savings: original_size as i64 - derived as i64,
            omitted,
        })
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(OptimizeError::Cancelled);
        }
        Ok(())
    }

    fn absorb(&self, error: OptimizeError, omitted: &mut Vec<DerivationFailure>) -> Result<()> {
        match (self.mode, error) {
            (FailureMode::FailSoft, OptimizeError::Derivation { format, label, message }) => {
                warn!(
                    source = %self.source.name,
                    format = %format,
                    label = %label,
                    error = %message,
                    "Derivation failed, omitting variant"
                );
                omitted.push(DerivationFailure {
                    format,
                    label,
                    reason: message,
                });
                Ok(())
            }
            (_, error) => Err(error),
        }
    }
}

fn thumbnail(
    codec: &dyn ImageCodec,
    scaled: &DynamicImage,
    source: &SourceImage,
    size: &SizeVariant,
    quality: u8,
    original_size: u64,
) -> Result<Variant> {
    let path = format!("{}_thumb_{}.jpg", source.stem(), size.label);
    encode_variant(
        codec,
        scaled,
        ImageFormat::Jpeg,
        EncodeSettings::quality(quality),
        &size.label,
        path,
        original_size,
    )
}

// Name a fetched image so its extension reflects its format
fn source_name(url: &str, content_type: Option<&str>) -> String {
    if ImageFormat::from_path(url).is_some() {
        return url.to_string();
    }
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .unwrap_or_default();
    match ImageFormat::ALL.into_iter().find(|f| f.mime_type() == mime) {
        Some(format) => {
            let base = url.split(['?', '#']).next().unwrap_or(url);
            format!("{base}.{}", format.extension())
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::source_name;

    #[test]
    fn test_source_name_from_content_type() {
        assert_eq!(
            source_name("https://img.example.com/a.png", Some("image/webp")),
            "https://img.example.com/a.png"
        );
        assert_eq!(
            source_name("https://img.example.com/a?id=3", Some("image/webp; q=1")),
            "https://img.example.com/a.webp"
        );
        assert_eq!(
            source_name("https://img.example.com/a", None),
            "https://img.example.com/a"
        );
    }
}
