//! Single-output transforms and advisory reports

use super::{decode, encode_variant, OptimizationPipeline};
use crate::analysis::{analyze, assess, ImageAnalysis, QualityAssessment};
use crate::codec::EncodeSettings;
use crate::errors::{OptimizeError, Result};
use crate::options::{CropRect, QualitySettings, WatermarkOptions, WatermarkPosition};
use crate::source::{SourceImage, Variant};
use image::{imageops, DynamicImage, GenericImageView, RgbaImage};
use imgcache_core::ImageFormat;
use tracing::debug;

impl OptimizationPipeline {
    /// Re-encode at full size in another format
    pub async fn convert_format(
        &self,
        source: &SourceImage,
        target: ImageFormat,
        quality: Option<u8>,
    ) -> Result<Variant> {
        self.validate(source)?;
        let quality = quality.unwrap_or_else(|| QualitySettings::default().for_format(target));
        let source = source.clone();
        self.run_blocking(move |codec| {
            let image = decode(codec, &source)?;
            let path = format!("{}.{}", source.stem(), target.extension());
            encode_variant(
                codec,
                &image,
                target,
                EncodeSettings::quality(quality),
                "converted",
                path,
                source.len() as u64,
            )
        })
        .await
    }

    /// Re-encode in the source's own format at `quality`
    pub async fn compress_image(&self, source: &SourceImage, quality: u8) -> Result<Variant> {
        let format = self.validate(source)?;
        let source = source.clone();
        self.run_blocking(move |codec| {
            let image = decode(codec, &source)?;
            let path = format!("{}_compressed.{}", source.stem(), format.extension());
            encode_variant(
                codec,
                &image,
                format,
                EncodeSettings::quality(quality),
                "compressed",
                path,
                source.len() as u64,
            )
        })
        .await
    }

    /// Overlay a watermark and re-encode in the source's format
    pub async fn add_watermark(
        &self,
        source: &SourceImage,
        watermark: &WatermarkOptions,
    ) -> Result<Variant> {
        let format = self.validate(source)?;
        let source = source.clone();
        let watermark = watermark.clone();
        self.run_blocking(move |codec| {
            let base = decode(codec, &source)?;
            let mark = codec
                .decode(&watermark.image)
                .map_err(|e| OptimizeError::validation(&source.name, format!("watermark: {e}")))?;
            let composed = compose(&base, &mark, &watermark);
            let path = format!("{}_watermarked.{}", source.stem(), format.extension());
            encode_variant(
                codec,
                &composed,
                format,
                EncodeSettings::quality(QualitySettings::default().for_format(format)),
                "watermarked",
                path,
                source.len() as u64,
            )
        })
        .await
    }

    /// Cut `rect` out of the source; `format` defaults to the source's
    pub async fn crop_image(
        &self,
        source: &SourceImage,
        rect: CropRect,
        format: Option<ImageFormat>,
    ) -> Result<Variant> {
        let source_format = self.validate(source)?;
        let format = format.unwrap_or(source_format);
        let source = source.clone();
        self.run_blocking(move |codec| {
            let image = decode(codec, &source)?;
            let (width, height) = image.dimensions();
            if !rect.fits_within(width, height) {
                return Err(OptimizeError::validation(
                    &source.name,
                    format!(
                        "crop {}x{} at ({}, {}) is outside the {width}x{height} image",
                        rect.width, rect.height, rect.x, rect.y
                    ),
                ));
            }
            let cropped = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
            let path = format!(
                "{}_crop_{}x{}.{}",
                source.stem(),
                rect.width,
                rect.height,
                format.extension()
            );
            encode_variant(
                codec,
                &cropped,
                format,
                EncodeSettings::quality(QualitySettings::default().for_format(format)),
                "crop",
                path,
                source.len() as u64,
            )
        })
        .await
    }

    pub async fn analyze_image(&self, source: &SourceImage) -> Result<ImageAnalysis> {
        let format = self.validate(source)?;
        let source = source.clone();
        self.run_blocking(move |codec| {
            let image = decode(codec, &source)?;
            let report = analyze(&image, format, source.len() as u64);
            debug!(
                source = %source.name,
                recommendations = report.recommendations.len(),
                "Analyzed image"
            );
            Ok(report)
        })
        .await
    }

    pub async fn assess_image_quality(&self, source: &SourceImage) -> Result<QualityAssessment> {
        self.validate(source)?;
        let source = source.clone();
        self.run_blocking(move |codec| {
            let image = decode(codec, &source)?;
            Ok(assess(&image, source.len() as u64))
        })
        .await
    }
}

fn compose(base: &DynamicImage, mark: &DynamicImage, options: &WatermarkOptions) -> DynamicImage {
    let (base_w, base_h) = base.dimensions();

    let mark = match options.scale {
        Some(scale) if scale > 0.0 => {
            let target_w = ((base_w as f32 * scale).round() as u32).max(1);
            mark.resize(target_w, base_h.max(1), imageops::FilterType::Triangle)
        }
        _ => mark.clone(),
    };
    let mut mark: RgbaImage = mark.to_rgba8();
    let opacity = options.opacity.clamp(0.0, 1.0);
    for pixel in mark.pixels_mut() {
        pixel.0[3] = (f32::from(pixel.0[3]) * opacity).round() as u8;
    }

    let (mark_w, mark_h) = mark.dimensions();
    let margin = i64::from(options.margin);
    let right = i64::from(base_w) - i64::from(mark_w) - margin;
    let bottom = i64::from(base_h) - i64::from(mark_h) - margin;
    let (x, y) = match options.position {
        WatermarkPosition::TopLeft => (margin, margin),
        WatermarkPosition::TopRight => (right, margin),
        WatermarkPosition::BottomLeft => (margin, bottom),
        WatermarkPosition::BottomRight => (right, bottom),
        WatermarkPosition::Center => (
            (i64::from(base_w) - i64::from(mark_w)) / 2,
            (i64::from(base_h) - i64::from(mark_h)) / 2,
        ),
    };

    let mut canvas = base.to_rgba8();
    imageops::overlay(&mut canvas, &mark, x, y);
    DynamicImage::ImageRgba8(canvas)
}
