//! Batch operations
//!
//! Each key runs the single-key operation independently; one failure never
//! aborts the rest, and results come back in input order.

use crate::entry::{CacheEntry, Payload};
use crate::errors::Result;
use futures::future::join_all;

use super::super::types::CacheEngine;

impl CacheEngine {
    pub async fn set_multiple<K, P>(&self, items: Vec<(K, P)>) -> Vec<Result<()>>
    where
        K: AsRef<str>,
        P: Into<Payload>,
    {
        let writes = items
            .into_iter()
            .map(|(key, payload)| {
                let payload: Payload = payload.into();
                async move { self.set(key.as_ref(), payload).await }
            });
        let results = join_all(writes).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!(failed, total = results.len(), "Some batch writes failed");
        }
        results
    }

    pub async fn get_multiple<K>(&self, keys: &[K]) -> Vec<Result<Option<CacheEntry>>>
    where
        K: AsRef<str>,
    {
        join_all(keys.iter().map(|key| self.get(key.as_ref()))).await
    }
}
