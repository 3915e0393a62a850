//! Core error types for the cache engine

use std::path::PathBuf;
use std::time::Duration;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

pub use CacheError as Error;

/// Error type for cache operations
#[derive(Debug)]
pub enum CacheError {
    /// Malformed cache key
    InvalidKey {
        key: String,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// A storage adapter failed while serving a key
    Adapter {
        key: String,
        operation: &'static str,
        store_type: StoreType,
        source: Box<CacheError>,
    },

    /// I/O errors inside the local adapter
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// Serialization/deserialization errors
    Serialization {
        key: String,
        operation: SerializationOp,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },

    /// Stored bytes failed validation
    Corruption {
        key: String,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Compression/decompression error
    Compression {
        operation: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },

    /// Payload cipher failure
    Encryption {
        operation: &'static str,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Network error (remote adapter, prefetch)
    Network {
        endpoint: String,
        operation: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },

    /// Timeout during a bounded operation
    Timeout {
        operation: String,
        duration: Duration,
        recovery_hint: RecoveryHint,
    },

    /// Store cannot currently serve requests
    StoreUnavailable {
        store_type: StoreType,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Configuration error
    Configuration {
        message: String,
        recovery_hint: RecoveryHint,
    },
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryHint {
    /// Retry the operation
    Retry { after: Duration },

    /// Retry the operation after a growing delay
    RetryWithBackoff {
        initial_delay_ms: u64,
        max_retries: u32,
        backoff_multiplier: f64,
    },

    /// Clear the cache and retry
    ClearAndRetry,

    /// Check file permissions
    CheckPermissions { path: PathBuf },

    /// Verify network connectivity
    CheckNetwork { endpoint: String },

    /// Check disk space and clean up if needed
    CheckDiskSpace,

    /// Fall back to the original, unoptimized image
    UseFallback,

    /// Use a default value
    UseDefault { value: String },

    /// Fix the cache configuration
    UpdateConfiguration,

    /// Correct the input and call again
    FixInput { instructions: String },

    /// Operation can be safely ignored
    Ignore,

    /// No automated recovery possible
    Manual { instructions: String },
}

/// Serialization operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationOp {
    Serialize,
    Deserialize,
}

/// Storage backend kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreType {
    Memory,
    Local { base_dir: PathBuf },
    Remote { endpoint: String },
}
