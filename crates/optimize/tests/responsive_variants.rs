//! End-to-end derivation with the `image` crate codec

use image::{DynamicImage, Rgb, RgbImage};
use imgcache_core::ImageFormat;
use imgcache_optimize::{
    CancellationToken, EncodeSettings, ImageCodec, OptimizationOptions, OptimizationPipeline,
    QualitySettings, SizeVariant, SourceImage, StandardCodec,
};

/// Smooth gradient with sensor-like noise, saved the way a camera would
fn photo(width: u32, height: u32) -> SourceImage {
    let mut rng = fastrand::Rng::with_seed(7);
    let image = RgbImage::from_fn(width, height, |x, y| {
        let noise = rng.u8(0..24);
        Rgb([
            ((x * 200 / width) as u8).saturating_add(noise),
            ((y * 200 / height) as u8).saturating_add(noise / 2),
            (((x + y) * 120 / (width + height)) as u8).saturating_add(noise),
        ])
    });
    let bytes = StandardCodec
        .encode(
            &DynamicImage::ImageRgb8(image),
            ImageFormat::Jpeg,
            EncodeSettings::quality(85),
        )
        .unwrap();
    SourceImage::new("lookbook/hero.jpg", bytes)
}

#[tokio::test]
async fn test_full_hd_source_to_tablet_webp() {
    let source = photo(1920, 1080);
    let options = OptimizationOptions::default()
        .with_formats([ImageFormat::Webp])
        .with_sizes([SizeVariant::new(800, 600, "tablet")]);

    let result = OptimizationPipeline::new()
        .process_image(&source, &options, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!((result.original_width, result.original_height), (1920, 1080));
    assert_eq!(result.variants.len(), 1);

    let variant = &result.variants[0];
    assert_eq!(variant.format, ImageFormat::Webp);
    assert_eq!((variant.width, variant.height), (800, 600));
    assert_eq!(variant.path, "hero_tablet.webp");
    assert!(variant.compression_ratio > 0.0 && variant.compression_ratio < 1.0);
    assert!(result.total_savings > 0);

    assert_eq!(
        StandardCodec.dimensions(&variant.data).unwrap(),
        (800, 600)
    );
    assert_eq!(result.thumbnails.len(), 1);
}

#[tokio::test]
async fn test_default_options_cover_every_size_and_format() {
    let source = photo(640, 480);
    let result = OptimizationPipeline::new()
        .process_image(&source, &OptimizationOptions::default(), &CancellationToken::new())
        .await
        .unwrap();

    // webp and jpeg at five sizes, thumbnails for the first three
    assert_eq!(result.variants.len(), 10);
    assert_eq!(result.thumbnails.len(), 3);
    let json = serde_json::to_value(&result).unwrap();
    assert!(json["variants"][0].get("data").is_none());
    assert_eq!(json["original_format"], "jpeg");
}

#[tokio::test]
async fn test_lower_webp_quality_gives_smaller_variant() {
    let source = photo(1024, 768);
    let pipeline = OptimizationPipeline::new();
    let webp_at = |quality: u8| {
        OptimizationOptions::default()
            .with_formats([ImageFormat::Webp])
            .with_sizes([SizeVariant::new(800, 600, "tablet")])
            .with_quality(QualitySettings {
                webp: quality,
                ..QualitySettings::default()
            })
    };

    let cancel = CancellationToken::new();
    let low = pipeline
        .process_image(&source, &webp_at(10), &cancel)
        .await
        .unwrap();
    let high = pipeline
        .process_image(&source, &webp_at(90), &cancel)
        .await
        .unwrap();

    let low = low.variant(ImageFormat::Webp, "tablet").unwrap();
    let high = high.variant(ImageFormat::Webp, "tablet").unwrap();
    assert!(
        low.size_bytes < high.size_bytes,
        "{} vs {}",
        low.size_bytes,
        high.size_bytes
    );
}
