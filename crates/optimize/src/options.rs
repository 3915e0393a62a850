//! Optimization request options

use bytes::Bytes;
use imgcache_core::ImageFormat;
use serde::{Deserialize, Serialize};

/// One responsive size target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeVariant {
    pub width: u32,
    pub height: u32,
    /// Becomes part of output file names
    pub label: String,
}

impl SizeVariant {
    pub fn new(width: u32, height: u32, label: impl Into<String>) -> Self {
        Self {
            width,
            height,
            label: label.into(),
        }
    }

    /// ASCII letters, digits, `-`, `_` and single dots only, so the label
    /// cannot leave the output directory
    pub fn has_safe_label(&self) -> bool {
        !self.label.is_empty()
            && !self.label.contains("..")
            && self
                .label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    }
}

/// Encoder quality per output format, 1-100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySettings {
    pub jpeg: u8,
    pub webp: u8,
    pub avif: u8,
    pub png: u8,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            jpeg: 85,
            webp: 85,
            avif: 80,
            png: 90,
        }
    }
}

impl QualitySettings {
    pub fn for_format(&self, format: ImageFormat) -> u8 {
        match format {
            ImageFormat::Jpeg => self.jpeg,
            ImageFormat::Webp => self.webp,
            ImageFormat::Avif => self.avif,
            ImageFormat::Png => self.png,
        }
    }
}

/// Pipeline options for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationOptions {
    pub formats: Vec<ImageFormat>,
    pub sizes: Vec<SizeVariant>,
    pub quality: QualitySettings,
    /// Cover-crop to the target box instead of stretching
    pub maintain_aspect_ratio: bool,
    /// Advisory: [`StandardCodec`](crate::StandardCodec) never writes
    /// metadata, so outputs are stripped either way
    pub strip_metadata: bool,
    /// Advisory: passed to the codec, which may not support progressive
    /// encoding ([`StandardCodec`](crate::StandardCodec) does not)
    pub progressive: bool,
    /// Leading entries of `sizes` that also get a JPEG thumbnail
    pub thumbnail_count: usize,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self {
            formats: vec![ImageFormat::Webp, ImageFormat::Jpeg],
            sizes: default_sizes(),
            quality: QualitySettings::default(),
            maintain_aspect_ratio: true,
            strip_metadata: true,
            progressive: true,
            thumbnail_count: 3,
        }
    }
}

impl OptimizationOptions {
    pub fn with_formats(mut self, formats: impl IntoIterator<Item = ImageFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }

    pub fn with_sizes(mut self, sizes: impl IntoIterator<Item = SizeVariant>) -> Self {
        self.sizes = sizes.into_iter().collect();
        self
    }

    pub fn with_quality(mut self, quality: QualitySettings) -> Self {
        self.quality = quality;
        self
    }

    pub fn thumbnail_sizes(&self) -> &[SizeVariant] {
        let count = self.thumbnail_count.min(self.sizes.len());
        &self.sizes[..count]
    }
}

pub fn default_sizes() -> Vec<SizeVariant> {
    vec![
        SizeVariant::new(150, 150, "thumbnail"),
        SizeVariant::new(480, 360, "mobile"),
        SizeVariant::new(800, 600, "tablet"),
        SizeVariant::new(1200, 900, "desktop"),
        SizeVariant::new(1920, 1080, "large"),
    ]
}

/// How a multi-derivation call reacts to one failed derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureMode {
    /// Abort on the first failure
    FailFast,
    /// Record the failure and keep going
    FailSoft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

/// Overlay applied by `add_watermark`
#[derive(Debug, Clone)]
pub struct WatermarkOptions {
    /// Encoded watermark image in any supported format
    pub image: Bytes,
    pub position: WatermarkPosition,
    /// 0.0 (invisible) to 1.0 (opaque)
    pub opacity: f32,
    /// Distance from the chosen edges, in pixels
    pub margin: u32,
    /// Watermark width as a fraction of the base width; `None` keeps its size
    pub scale: Option<f32>,
}

impl WatermarkOptions {
    pub fn new(image: impl Into<Bytes>) -> Self {
        Self {
            image: image.into(),
            position: WatermarkPosition::default(),
            opacity: 0.5,
            margin: 16,
            scale: Some(0.2),
        }
    }

    pub fn position(mut self, position: WatermarkPosition) -> Self {
        self.position = position;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    pub fn scale(mut self, scale: Option<f32>) -> Self {
        self.scale = scale;
        self
    }
}

/// Pixel rectangle for `crop_image`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }
}
