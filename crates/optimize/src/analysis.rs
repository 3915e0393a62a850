//! Advisory analysis and quality heuristics
//!
//! Everything here is read-only: a decoded image in, a report out.

use image::{ColorType, DynamicImage, GenericImageView};
use imgcache_core::ImageFormat;
use serde::Serialize;

/// Longest edge sampled for the pixel statistics
const SAMPLE_EDGE: u32 = 512;
const WIDE_EDGE: u32 = 2560;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageAnalysis {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    pub color_profile: String,
    /// True only when some pixel is actually translucent
    pub has_alpha: bool,
    pub aspect_ratio: f64,
    pub bytes_per_pixel: f64,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityAssessment {
    /// 0-100, higher is better
    pub score: u8,
    /// Mean absolute luma gradient
    pub sharpness: f64,
    /// Standard deviation of luma
    pub contrast: f64,
    pub bytes_per_pixel: f64,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

pub fn analyze(image: &DynamicImage, format: ImageFormat, size_bytes: u64) -> ImageAnalysis {
    let (width, height) = image.dimensions();
    let has_alpha = uses_alpha(image);
    let bytes_per_pixel = bytes_per_pixel(size_bytes, width, height);

    let mut recommendations = Vec::new();
    if matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        recommendations.push("serve webp or avif variants for smaller transfers".to_string());
    }
    if format == ImageFormat::Png && !has_alpha {
        recommendations.push("no transparency in use; a lossy format would be much smaller".to_string());
    }
    if width.max(height) > WIDE_EDGE {
        recommendations.push(format!(
            "longest edge is {}px; generate responsive sizes instead of serving the original",
            width.max(height)
        ));
    }
    if format != ImageFormat::Png && bytes_per_pixel > 1.0 {
        recommendations.push(format!(
            "{bytes_per_pixel:.2} bytes per pixel; lower the encoder quality"
        ));
    }

    ImageAnalysis {
        format,
        width,
        height,
        size_bytes,
        color_profile: color_profile(image.color()).to_string(),
        has_alpha,
        aspect_ratio: aspect_ratio(width, height),
        bytes_per_pixel,
        recommendations,
    }
}

pub fn assess(image: &DynamicImage, size_bytes: u64) -> QualityAssessment {
    let (width, height) = image.dimensions();
    let (sharpness, contrast) = luma_statistics(image);
    let bytes_per_pixel = bytes_per_pixel(size_bytes, width, height);

    let mut score: i32 = 100;
    let mut issues = Vec::new();
    let mut suggestions = Vec::new();

    let short_edge = width.min(height);
    if short_edge < 300 {
        score -= 25;
        issues.push(format!("low resolution ({width}x{height})"));
        suggestions.push("use a source at least 800px on its short edge".to_string());
    } else if short_edge < 800 {
        score -= 10;
        issues.push(format!("limited resolution ({width}x{height}) for large displays"));
    }

    if bytes_per_pixel < 0.05 {
        score -= 15;
        issues.push("heavily compressed; artifacts are likely".to_string());
        suggestions.push("re-export from the original at a higher quality".to_string());
    } else if bytes_per_pixel > 4.0 {
        score -= 5;
        suggestions.push("file is large for its dimensions; compress it".to_string());
    }

    if sharpness < 2.0 {
        score -= 20;
        issues.push("image appears blurry".to_string());
        suggestions.push("apply light sharpening or use a sharper source".to_string());
    }

    if contrast < 20.0 {
        score -= 15;
        issues.push("low contrast".to_string());
        suggestions.push("adjust levels to widen the tonal range".to_string());
    }

    let ratio = aspect_ratio(width, height);
    if !(1.0 / 3.0..=3.0).contains(&ratio) {
        score -= 5;
        issues.push(format!("unusual aspect ratio {ratio:.2}"));
    }

    QualityAssessment {
        score: score.clamp(0, 100) as u8,
        sharpness,
        contrast,
        bytes_per_pixel,
        issues,
        suggestions,
    }
}

fn color_profile(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "grayscale-8",
        ColorType::La8 => "grayscale-alpha-8",
        ColorType::Rgb8 => "rgb-8",
        ColorType::Rgba8 => "rgba-8",
        ColorType::L16 => "grayscale-16",
        ColorType::La16 => "grayscale-alpha-16",
        ColorType::Rgb16 => "rgb-16",
        ColorType::Rgba16 => "rgba-16",
        ColorType::Rgb32F => "rgb-32f",
        ColorType::Rgba32F => "rgba-32f",
        _ => "unknown",
    }
}

fn uses_alpha(image: &DynamicImage) -> bool {
    if !image.color().has_alpha() {
        return false;
    }
    image.to_rgba8().pixels().any(|p| p.0[3] < u8::MAX)
}

fn aspect_ratio(width: u32, height: u32) -> f64 {
    if height == 0 {
        return 0.0;
    }
    f64::from(width) / f64::from(height)
}

fn bytes_per_pixel(size_bytes: u64, width: u32, height: u32) -> f64 {
    let pixels = u64::from(width) * u64::from(height);
    if pixels == 0 {
        return 0.0;
    }
    size_bytes as f64 / pixels as f64
}

// (mean absolute gradient, luma standard deviation) on a bounded sample
fn luma_statistics(image: &DynamicImage) -> (f64, f64) {
    let (width, height) = image.dimensions();
    let sample = if width.max(height) > SAMPLE_EDGE {
        image.thumbnail(SAMPLE_EDGE, SAMPLE_EDGE)
    } else {
        image.clone()
    };
    let luma = sample.to_luma8();
    let (w, h) = luma.dimensions();
    if w == 0 || h == 0 {
        return (0.0, 0.0);
    }

    let count = f64::from(w) * f64::from(h);
    let mean = luma.pixels().map(|p| f64::from(p.0[0])).sum::<f64>() / count;
    let variance = luma
        .pixels()
        .map(|p| (f64::from(p.0[0]) - mean).powi(2))
        .sum::<f64>()
        / count;

    let mut gradient = 0.0;
    let mut samples = 0u64;
    for y in 0..h {
        for x in 0..w {
            let here = i32::from(luma.get_pixel(x, y).0[0]);
            if x + 1 < w {
                gradient += f64::from((here - i32::from(luma.get_pixel(x + 1, y).0[0])).abs());
                samples += 1;
            }
            if y + 1 < h {
                gradient += f64::from((here - i32::from(luma.get_pixel(x, y + 1).0[0])).abs());
                samples += 1;
            }
        }
    }
    let sharpness = if samples == 0 {
        0.0
    } else {
        gradient / samples as f64
    };

    (sharpness, variance.sqrt())
}
