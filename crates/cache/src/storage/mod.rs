//! Storage adapters
//!
//! The engine talks to persistence only through [`StorageAdapter`]. One
//! concrete adapter per strategy is chosen once, at construction, by
//! [`build_adapter`].

mod format;
mod local;
mod memory;
mod remote;
mod traits;

#[cfg(test)]
mod tests;

pub use format::{
    decode_entry, encode_entry, StorageHeader, CACHE_MAGIC, DEFAULT_COMPRESSION_LEVEL, HEADER_LEN,
    STORAGE_VERSION,
};
pub use local::LocalAdapter;
pub use memory::MemoryAdapter;
pub use remote::RemoteAdapter;
pub use traits::{PayloadCipher, StorageAdapter, TransportOptions};

use crate::config::{CacheConfig, StorageStrategy};
use crate::errors::{CacheError, Result};
use std::sync::Arc;

/// Select and construct the adapter named by `config.strategy`
///
/// `encryption` requires a cipher; none is fabricated.
pub async fn build_adapter(
    config: &CacheConfig,
    cipher: Option<Arc<dyn PayloadCipher>>,
) -> Result<Arc<dyn StorageAdapter>> {
    if config.encryption && cipher.is_none() {
        return Err(CacheError::configuration(
            "encryption is enabled but no PayloadCipher was supplied",
        ));
    }

    let transport = TransportOptions {
        compression: config.compression,
        compression_level: DEFAULT_COMPRESSION_LEVEL,
        cipher: if config.encryption { cipher } else { None },
    };

    let adapter: Arc<dyn StorageAdapter> = match &config.strategy {
        StorageStrategy::Memory => Arc::new(MemoryAdapter::new()),
        StorageStrategy::Local { base_dir } => {
            Arc::new(LocalAdapter::new(base_dir.clone(), transport).await?)
        }
        StorageStrategy::Remote { endpoint } => Arc::new(RemoteAdapter::new(
            endpoint,
            config.network_timeout,
            transport,
        )?),
    };

    tracing::debug!(store = %adapter.store_type(), "Storage adapter ready");
    Ok(adapter)
}
