//! Codec seam
//!
//! The pipeline owns geometry (resize, crop, overlay) and leaves byte-level
//! decode and encode to an [`ImageCodec`].

use crate::errors::CodecError;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, GenericImageView, ImageReader};
use imgcache_core::ImageFormat;
use std::fmt::Debug;
use std::io::Cursor;

/// Per-encode knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSettings {
    /// 1-100; ignored by lossless encoders
    pub quality: u8,
    /// A hint; codecs without progressive output ignore it
    pub progressive: bool,
}

impl EncodeSettings {
    pub fn quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            progressive: false,
        }
    }
}

pub trait ImageCodec: Send + Sync + Debug {
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, CodecError>;

    fn encode(
        &self,
        image: &DynamicImage,
        format: ImageFormat,
        settings: EncodeSettings,
    ) -> Result<Vec<u8>, CodecError>;

    /// Pixel dimensions without a full decode where the codec allows it
    fn dimensions(&self, data: &[u8]) -> Result<(u32, u32), CodecError> {
        self.decode(data).map(|image| image.dimensions())
    }
}

/// Codec backed by the `image` crate
///
/// JPEG, WebP (lossy, via libwebp) and AVIF honor quality; PNG is lossless
/// and quality picks its compression effort. Progressive JPEG is not
/// available from this encoder. Encoders write pixels only, so metadata is
/// always stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

const AVIF_SPEED: u8 = 8;

impl ImageCodec for StandardCodec {
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, CodecError> {
        Ok(image::load_from_memory(data)?)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: ImageFormat,
        settings: EncodeSettings,
    ) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        match format {
            ImageFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, settings.quality))?;
            }
            ImageFormat::Png => {
                let compression = if settings.quality >= 90 {
                    CompressionType::Best
                } else if settings.quality >= 50 {
                    CompressionType::Default
                } else {
                    CompressionType::Fast
                };
                image.write_with_encoder(PngEncoder::new_with_quality(
                    &mut buf,
                    compression,
                    PngFilter::Adaptive,
                ))?;
            }
            ImageFormat::Webp => {
                let rgba = image.to_rgba8();
                let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
                    .encode_simple(false, f32::from(settings.quality))
                    .map_err(|e| CodecError(format!("webp encode failed: {e:?}")))?;
                buf.extend_from_slice(&encoded);
            }
            ImageFormat::Avif => {
                let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
                rgba.write_with_encoder(AvifEncoder::new_with_speed_quality(
                    &mut buf,
                    AVIF_SPEED,
                    settings.quality,
                ))?;
            }
        }
        Ok(buf)
    }

    fn dimensions(&self, data: &[u8]) -> Result<(u32, u32), CodecError> {
        Ok(ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_dimensions()?)
    }
}
