//! Bounded, TTL-aware cache for derived image assets
//!
//! This crate provides:
//! - [`CacheEngine`], which owns the capacity and expiry invariants
//! - Pluggable storage adapters (memory, local files, HTTP object store)
//! - LRU and LFU eviction policies
//! - Hit/miss statistics over a bounded access window
//! - Deterministic image keys, CDN URLs, prefetch and warm

pub mod cdn;
pub mod config;
pub mod core;
pub mod entry;
pub mod errors;
pub mod eviction;
pub mod keys;
pub mod stats;
pub mod storage;
pub mod warming;

pub use cdn::{build_cdn_url, Transformations};
pub use config::{
    CacheConfig, CacheConfigBuilder, CacheConfigLoader, ConfigSource, LoadedConfig,
    StorageStrategy,
};
pub use core::{CacheEngine, CacheEngineBuilder, OptimizeReport};
pub use entry::{CacheEntry, EntryMetadata, Payload, SetOptions};
pub use errors::{CacheError, Error, RecoveryHint, Result, StoreType};
pub use eviction::{
    create_eviction_policy, EvictionCandidate, EvictionPolicy, LfuPolicy, LruPolicy,
};
pub use keys::{image_key, validate_key, variant_key, MAX_KEY_LEN};
pub use stats::{CacheStats, StatsTracker};
pub use storage::{
    build_adapter, LocalAdapter, MemoryAdapter, PayloadCipher, RemoteAdapter, StorageAdapter,
    TransportOptions,
};
pub use warming::{PrefetchFailure, PrefetchReport};
