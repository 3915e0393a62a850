//! In-memory reference adapter

use super::traits::StorageAdapter;
use crate::entry::CacheEntry;
use crate::errors::{Result, StoreType};
use async_trait::async_trait;
use dashmap::DashMap;

/// Adapter backed by a concurrent map
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl StorageAdapter for MemoryAdapter {
    fn store_type(&self) -> StoreType {
        StoreType::Memory
    }

    async fn persist(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        self.entries.insert(key.to_string(), entry.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
