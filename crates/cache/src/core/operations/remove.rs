//! Cache delete and clear operations

use crate::errors::Result;
use crate::keys::validate_key;

use super::super::types::CacheEngine;

impl CacheEngine {
    /// Remove `key` from memory and the adapter
    ///
    /// Returns whether anything was removed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;

        let removed_from_memory = self.inner.state.lock().remove_pending(key).is_some();

        let adapter_result = self.inner.adapter.remove(key).await;
        self.inner.state.lock().finish_removal(key);
        let removed_from_adapter = adapter_result
            .map_err(|e| e.in_adapter(key, "remove", self.inner.adapter.store_type()))?;

        let removed = removed_from_memory || removed_from_adapter;
        tracing::debug!(key, removed, "Deleted entry");
        Ok(removed)
    }

    /// Drop every entry; lifetime hit/miss counters are kept
    pub async fn clear(&self) -> Result<()> {
        let dropped = {
            let mut state = self.inner.state.lock();
            let dropped = state.entries.len();
            state.begin_clear();
            dropped
        };

        let adapter_result = self.inner.adapter.clear().await;
        self.inner.state.lock().finish_clear();
        adapter_result.map_err(|e| e.in_adapter("*", "clear", self.inner.adapter.store_type()))?;

        tracing::info!(dropped, "Cache cleared");
        Ok(())
    }
}
