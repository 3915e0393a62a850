//! Storage adapter seam

use super::format::DEFAULT_COMPRESSION_LEVEL;
use crate::entry::CacheEntry;
use crate::errors::{Result, StoreType};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Pluggable persistence backend
///
/// Each operation can fail independently. Implementations must tolerate
/// concurrent calls for the same key; the last completed write wins.
#[async_trait]
pub trait StorageAdapter: Send + Sync + Debug {
    fn store_type(&self) -> StoreType;

    async fn persist(&self, key: &str, entry: &CacheEntry) -> Result<()>;

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Returns whether anything was removed
    async fn remove(&self, key: &str) -> Result<bool>;

    async fn clear(&self) -> Result<()>;
}

/// Symmetric payload encryption supplied by the embedding application
pub trait PayloadCipher: Send + Sync + Debug {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>>;
    fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// Transport-level settings handed to adapters that serialize entries
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub compression: bool,
    pub compression_level: i32,
    pub cipher: Option<Arc<dyn PayloadCipher>>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            compression: false,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            cipher: None,
        }
    }
}
