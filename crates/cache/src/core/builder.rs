//! Engine builder and initialization

use crate::config::CacheConfig;
use crate::errors::{CacheError, Result};
use crate::eviction::create_eviction_policy;
use crate::stats::StatsTracker;
use crate::storage::{build_adapter, PayloadCipher, StorageAdapter};
use imgcache_core::{HttpFetcher, ImageFetcher, SharedClock, SystemClock};
use parking_lot::Mutex;
use std::sync::Arc;

use super::types::{CacheEngine, EngineInner, EngineState};

/// Assembles a [`CacheEngine`] with optional injected collaborators
pub struct CacheEngineBuilder {
    config: CacheConfig,
    adapter: Option<Arc<dyn StorageAdapter>>,
    cipher: Option<Arc<dyn PayloadCipher>>,
    clock: Option<SharedClock>,
    fetcher: Option<Arc<dyn ImageFetcher>>,
}

impl CacheEngineBuilder {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            adapter: None,
            cipher: None,
            clock: None,
            fetcher: None,
        }
    }

    /// Use this adapter instead of the one named by `config.strategy`
    pub fn with_adapter(mut self, adapter: Arc<dyn StorageAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn with_cipher(mut self, cipher: Arc<dyn PayloadCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub async fn build(self) -> Result<CacheEngine> {
        self.config.validate()?;

        let eviction_policy = create_eviction_policy(&self.config.eviction_policy)?;

        let adapter = match self.adapter {
            Some(adapter) => adapter,
            None => build_adapter(&self.config, self.cipher).await?,
        };

        let fetcher: Arc<dyn ImageFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(
                HttpFetcher::with_timeout(self.config.network_timeout).map_err(CacheError::from)?,
            ),
        };

        let cleanup_interval = self.config.cleanup_interval;
        let engine = CacheEngine {
            inner: Arc::new(EngineInner {
                config: self.config,
                adapter,
                eviction_policy,
                stats: StatsTracker::new(),
                clock: self
                    .clock
                    .unwrap_or_else(|| Arc::new(SystemClock) as SharedClock),
                fetcher,
                state: Mutex::new(EngineState::default()),
                cleanup_handle: Mutex::new(None),
            }),
        };

        if let Some(interval) = cleanup_interval {
            engine.spawn_cleanup(interval);
        }

        tracing::debug!(?engine, "Cache engine ready");
        Ok(engine)
    }
}

impl CacheEngine {
    /// Engine with the adapter named by `config.strategy` and the system clock
    pub async fn new(config: CacheConfig) -> Result<Self> {
        CacheEngineBuilder::new(config).build().await
    }

    pub fn builder(config: CacheConfig) -> CacheEngineBuilder {
        CacheEngineBuilder::new(config)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    pub(crate) fn fetcher(&self) -> &dyn ImageFetcher {
        self.inner.fetcher.as_ref()
    }
}
