//! Cache warming and preloading
//!
//! Pulls source images through the engine's [`ImageFetcher`] and stores
//! them with [`CacheEngine::cache_image`]. Every URL gets its own timeout;
//! network failures are per-item and never abort the batch.
//!
//! [`ImageFetcher`]: imgcache_core::ImageFetcher
//! [`CacheEngine::cache_image`]: crate::CacheEngine::cache_image

mod core;
mod types;

pub use types::{PrefetchFailure, PrefetchReport};
