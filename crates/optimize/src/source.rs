//! Source images and derived artifacts

use bytes::Bytes;
use imgcache_core::ImageFormat;
use serde::Serialize;

/// An input image: a name (file name or URL) plus its encoded bytes
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub data: Bytes,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Format implied by the name's extension
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_path(&self.name)
    }

    /// File stem used to name derived files
    pub fn stem(&self) -> &str {
        let path = self.name.split(['?', '#']).next().unwrap_or(&self.name);
        let file = path.rsplit('/').next().unwrap_or(path);
        match file.rfind('.') {
            Some(idx) if idx > 0 => &file[..idx],
            _ => file,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One derived artifact
#[derive(Debug, Clone, Serialize)]
pub struct Variant {
    pub format: ImageFormat,
    pub label: String,
    pub path: String,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
    /// Derived size over original size
    pub compression_ratio: f64,
    #[serde(skip)]
    pub data: Bytes,
}

/// A derivation that fail-soft mode left out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivationFailure {
    pub format: ImageFormat,
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub source_name: String,
    pub original_format: ImageFormat,
    pub original_width: u32,
    pub original_height: u32,
    pub original_size_bytes: u64,
    pub variants: Vec<Variant>,
    pub thumbnails: Vec<Variant>,
    pub processing_time_ms: u64,
    /// Original size minus the summed variant sizes; negative when the
    /// variants outweigh the source. Thumbnails are not counted.
    pub total_savings: i64,
    pub omitted: Vec<DerivationFailure>,
}

impl OptimizationResult {
    pub fn variant(&self, format: ImageFormat, label: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|v| v.format == format && v.label == label)
    }
}

pub(crate) fn compression_ratio(derived: u64, original: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    derived as f64 / original as f64
}
