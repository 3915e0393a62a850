//! Local persistent adapter
//!
//! Keeps a hot in-memory map as the fast path and mirrors every write to a
//! file under `base_dir/objects`, sharded by the SHA-256 of the key.

use super::format::{decode_entry, encode_entry};
use super::traits::{StorageAdapter, TransportOptions};
use crate::entry::CacheEntry;
use crate::errors::{CacheError, RecoveryHint, Result, StoreType};
use crate::keys::hash_key;
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::fs;
use tokio::sync::Semaphore;

/// Adapter that survives process restarts
#[derive(Debug)]
pub struct LocalAdapter {
    base_dir: PathBuf,
    hot: DashMap<String, CacheEntry>,
    transport: TransportOptions,
    io_semaphore: Semaphore,
    tmp_counter: AtomicU64,
}

impl LocalAdapter {
    pub async fn new(base_dir: PathBuf, transport: TransportOptions) -> Result<Self> {
        let objects_dir = base_dir.join("objects");
        fs::create_dir_all(&objects_dir)
            .await
            .map_err(|e| CacheError::Io {
                path: objects_dir.clone(),
                operation: "create objects directory",
                source: e,
                recovery_hint: RecoveryHint::CheckPermissions { path: objects_dir },
            })?;

        Ok(Self {
            base_dir,
            hot: DashMap::new(),
            transport,
            io_semaphore: Semaphore::new(64),
            tmp_counter: AtomicU64::new(0),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the durable copy for `key`
    pub fn object_path(&self, key: &str) -> PathBuf {
        let hash = hash_key(key);
        self.base_dir
            .join("objects")
            .join(&hash[..2])
            .join(&hash[2..4])
            .join(format!("{hash}.entry"))
    }

    /// Drop the in-memory copy only; the next `load` must go to disk
    pub fn forget_hot(&self, key: &str) {
        self.hot.remove(key);
    }

    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>> {
        self.io_semaphore
            .acquire()
            .await
            .map_err(|_| CacheError::StoreUnavailable {
                store_type: self.store_type(),
                reason: "I/O semaphore closed".to_string(),
                recovery_hint: RecoveryHint::Retry {
                    after: Duration::from_millis(100),
                },
            })
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                operation: "create shard directory",
                source: e,
                recovery_hint: RecoveryHint::CheckPermissions {
                    path: parent.to_path_buf(),
                },
            })?;
        }

        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("tmp.{}.{n}", std::process::id()));
        fs::write(&tmp, bytes).await.map_err(|e| CacheError::Io {
            path: tmp.clone(),
            operation: "write cache entry",
            source: e,
            recovery_hint: RecoveryHint::CheckDiskSpace,
        })?;

        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                operation: "rename cache entry into place",
                source: e,
                recovery_hint: RecoveryHint::Retry {
                    after: Duration::from_millis(100),
                },
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for LocalAdapter {
    fn store_type(&self) -> StoreType {
        StoreType::Local {
            base_dir: self.base_dir.clone(),
        }
    }

    async fn persist(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let bytes = encode_entry(entry, &self.transport)?;
        let path = self.object_path(key);
        {
            let _permit = self.acquire().await?;
            self.write_atomic(&path, &bytes).await?;
        }
        tracing::debug!(key, path = %path.display(), bytes = bytes.len(), "Persisted entry");
        self.hot.insert(key.to_string(), entry.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        if let Some(entry) = self.hot.get(key) {
            return Ok(Some(entry.value().clone()));
        }

        let path = self.object_path(key);
        let bytes = {
            let _permit = self.acquire().await?;
            match fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::trace!(key, "No durable copy");
                    return Ok(None);
                }
                Err(e) => {
                    return Err(CacheError::Io {
                        path,
                        operation: "read cache entry",
                        source: e,
                        recovery_hint: RecoveryHint::Retry {
                            after: Duration::from_millis(100),
                        },
                    })
                }
            }
        };

        let entry = decode_entry(key, &bytes, &self.transport)?;
        tracing::debug!(key, "Loaded entry from disk");
        self.hot.insert(key.to_string(), entry.clone());
        Ok(Some(entry))
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut removed = self.hot.remove(key).is_some();

        let path = self.object_path(key);
        let _permit = self.acquire().await?;
        match fs::remove_file(&path).await {
            Ok(()) => removed = true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(CacheError::Io {
                    path,
                    operation: "remove cache entry",
                    source: e,
                    recovery_hint: RecoveryHint::Retry {
                        after: Duration::from_millis(100),
                    },
                })
            }
        }
        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        self.hot.clear();

        let objects_dir = self.base_dir.join("objects");
        let _permit = self.acquire().await?;
        match fs::remove_dir_all(&objects_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(CacheError::Io {
                    path: objects_dir.clone(),
                    operation: "clear cache directory",
                    source: e,
                    recovery_hint: RecoveryHint::CheckPermissions { path: objects_dir },
                })
            }
        }

        fs::create_dir_all(&objects_dir)
            .await
            .map_err(|e| CacheError::Io {
                path: objects_dir.clone(),
                operation: "recreate cache directory",
                source: e,
                recovery_hint: RecoveryHint::CheckPermissions { path: objects_dir },
            })
    }
}
