//! Image optimization pipeline
//!
//! Derives responsive variants, thumbnails, format conversions and crops
//! from a source image. The pipeline is independent of caching; use
//! [`bridge::cache_result`] to store its output in an
//! [`imgcache_cache::CacheEngine`].

pub mod analysis;
pub mod batch;
pub mod bridge;
pub mod codec;
pub mod errors;
pub mod options;
pub mod pipeline;
pub mod source;

pub use analysis::{ImageAnalysis, QualityAssessment};
pub use batch::{BatchCoordinator, BatchFailure, BatchOutcome};
pub use bridge::{cache_result, thumbnail_cache_key, variant_cache_key};
pub use codec::{EncodeSettings, ImageCodec, StandardCodec};
pub use errors::{CodecError, OptimizeError, Result};
pub use options::{
    CropRect, FailureMode, OptimizationOptions, QualitySettings, SizeVariant, WatermarkOptions,
    WatermarkPosition,
};
pub use pipeline::OptimizationPipeline;
pub use source::{DerivationFailure, OptimizationResult, SourceImage, Variant};
pub use tokio_util::sync::CancellationToken;
