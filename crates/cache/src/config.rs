//! Cache configuration management with precedence and validation
use crate::errors::{CacheError, RecoveryHint, Result, SerializationOp};
use imgcache_core::constants::{
    DEFAULT_NETWORK_TIMEOUT_MS, IMGCACHE_BASE_DIR_VAR, IMGCACHE_CDN_BASE_URL_VAR,
    IMGCACHE_MAX_SIZE_VAR, IMGCACHE_REMOTE_ENDPOINT_VAR, IMGCACHE_STRATEGY_VAR,
    IMGCACHE_TTL_MS_VAR,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which storage adapter backs the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StorageStrategy {
    #[default]
    Memory,
    Local { base_dir: PathBuf },
    Remote { endpoint: String },
}

/// Engine configuration, fixed for the engine's lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub strategy: StorageStrategy,
    /// Default time-to-live for new entries
    #[serde(with = "duration_ms", rename = "ttl_ms")]
    pub ttl: Duration,
    /// Total payload-byte budget
    pub max_size_bytes: u64,
    pub compression: bool,
    pub encryption: bool,
    /// "lru" or "lfu"
    pub eviction_policy: String,
    /// Average entry size assumed by `optimize` when computing its target
    pub assumed_entry_size: u64,
    pub cdn_base_url: String,
    #[serde(with = "duration_ms", rename = "network_timeout_ms")]
    pub network_timeout: Duration,
    pub prefetch_concurrency: usize,
    /// Background sweep period; no sweep when unset
    #[serde(with = "opt_duration_ms", rename = "cleanup_interval_ms")]
    pub cleanup_interval: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            strategy: StorageStrategy::Memory,
            ttl: Duration::from_secs(60 * 60),
            max_size_bytes: 50 * 1024 * 1024, // 50MB
            compression: false,
            encryption: false,
            eviction_policy: "lru".to_string(),
            assumed_entry_size: 100 * 1024, // 100KB
            cdn_base_url: "https://cdn.example.com/image/upload".to_string(),
            network_timeout: Duration::from_millis(DEFAULT_NETWORK_TIMEOUT_MS),
            prefetch_concurrency: 4,
            cleanup_interval: None,
        }
    }
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }

    /// Reject settings the engine cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_size_bytes == 0 {
            return Err(CacheError::configuration("max_size_bytes must be positive"));
        }
        if self.ttl.is_zero() {
            return Err(CacheError::configuration("ttl must be positive"));
        }
        if self.assumed_entry_size == 0 {
            return Err(CacheError::configuration(
                "assumed_entry_size must be positive",
            ));
        }
        if self.prefetch_concurrency == 0 {
            return Err(CacheError::configuration(
                "prefetch_concurrency must be at least 1",
            ));
        }
        if self.network_timeout.is_zero() {
            return Err(CacheError::configuration("network_timeout must be positive"));
        }
        if matches!(self.cleanup_interval, Some(d) if d.is_zero()) {
            return Err(CacheError::configuration(
                "cleanup_interval must be positive when set",
            ));
        }
        if self.cdn_base_url.trim().is_empty() {
            return Err(CacheError::configuration("cdn_base_url must not be empty"));
        }
        match self.eviction_policy.to_ascii_lowercase().as_str() {
            "lru" | "lfu" => {}
            other => {
                return Err(CacheError::Configuration {
                    message: format!("unknown eviction policy '{other}'"),
                    recovery_hint: RecoveryHint::UseDefault {
                        value: "lru".to_string(),
                    },
                })
            }
        }
        if let StorageStrategy::Remote { endpoint } = &self.strategy {
            if endpoint.trim().is_empty() {
                return Err(CacheError::configuration("remote endpoint must not be empty"));
            }
        }
        Ok(())
    }
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    Default,
    ConfigFile(PathBuf),
    EnvironmentVariable(String),
}

/// Fluent construction of a [`CacheConfig`]
#[derive(Debug, Clone, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: StorageStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = ttl;
        self
    }

    pub fn max_size_bytes(mut self, max: u64) -> Self {
        self.config.max_size_bytes = max;
        self
    }

    pub fn compression(mut self, enabled: bool) -> Self {
        self.config.compression = enabled;
        self
    }

    pub fn encryption(mut self, enabled: bool) -> Self {
        self.config.encryption = enabled;
        self
    }

    pub fn eviction_policy(mut self, name: impl Into<String>) -> Self {
        self.config.eviction_policy = name.into();
        self
    }

    pub fn assumed_entry_size(mut self, bytes: u64) -> Self {
        self.config.assumed_entry_size = bytes;
        self
    }

    pub fn cdn_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.cdn_base_url = url.into();
        self
    }

    pub fn network_timeout(mut self, timeout: Duration) -> Self {
        self.config.network_timeout = timeout;
        self
    }

    pub fn prefetch_concurrency(mut self, n: usize) -> Self {
        self.config.prefetch_concurrency = n;
        self
    }

    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.cleanup_interval = Some(interval);
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<CacheConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Loaded configuration plus where the last override came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CacheConfig,
    pub source: ConfigSource,
}

/// Configuration loader that handles precedence: defaults, then a JSON file,
/// then `IMGCACHE_*` environment variables
pub struct CacheConfigLoader;

impl CacheConfigLoader {
    /// Load configuration with full precedence handling
    pub fn load(config_file: Option<&Path>) -> Result<LoadedConfig> {
        Self::load_with_env(config_file, |name| std::env::var(name).ok())
    }

    /// Same as [`load`](Self::load) with an injectable environment lookup
    pub fn load_with_env<F>(config_file: Option<&Path>, env: F) -> Result<LoadedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut loaded = LoadedConfig {
            config: CacheConfig::default(),
            source: ConfigSource::Default,
        };

        if let Some(path) = config_file {
            loaded.config = Self::load_from_file(path)?;
            loaded.source = ConfigSource::ConfigFile(path.to_path_buf());
        }

        if let Some(var) = Self::apply_env(&mut loaded.config, env)? {
            loaded.source = ConfigSource::EnvironmentVariable(var);
        }

        loaded.config.validate()?;
        tracing::debug!(source = ?loaded.source, "Loaded cache configuration");
        Ok(loaded)
    }

    fn load_from_file(path: &Path) -> Result<CacheConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            operation: "read config file",
            source: e,
            recovery_hint: RecoveryHint::CheckPermissions {
                path: path.to_path_buf(),
            },
        })?;

        serde_json::from_str(&content).map_err(|e| CacheError::Serialization {
            key: path.display().to_string(),
            operation: SerializationOp::Deserialize,
            source: Box::new(e),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Check config file syntax".to_string(),
            },
        })
    }

    /// Apply environment overrides; returns the last variable applied
    fn apply_env<F>(config: &mut CacheConfig, env: F) -> Result<Option<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut last = None;

        if let Some(ttl) = env(IMGCACHE_TTL_MS_VAR) {
            let millis = parse_number(IMGCACHE_TTL_MS_VAR, &ttl)?;
            config.ttl = Duration::from_millis(millis);
            last = Some(IMGCACHE_TTL_MS_VAR.to_string());
        }

        if let Some(max) = env(IMGCACHE_MAX_SIZE_VAR) {
            config.max_size_bytes = parse_number(IMGCACHE_MAX_SIZE_VAR, &max)?;
            last = Some(IMGCACHE_MAX_SIZE_VAR.to_string());
        }

        if let Some(url) = env(IMGCACHE_CDN_BASE_URL_VAR) {
            config.cdn_base_url = url;
            last = Some(IMGCACHE_CDN_BASE_URL_VAR.to_string());
        }

        // The strategy variable picks the adapter; the location variables
        // fill in (or replace) its parameters
        if let Some(strategy) = env(IMGCACHE_STRATEGY_VAR) {
            config.strategy = match strategy.to_ascii_lowercase().as_str() {
                "memory" => StorageStrategy::Memory,
                "local" => StorageStrategy::Local {
                    base_dir: env(IMGCACHE_BASE_DIR_VAR)
                        .map(PathBuf::from)
                        .unwrap_or_else(|| std::env::temp_dir().join("imgcache")),
                },
                "remote" => StorageStrategy::Remote {
                    endpoint: env(IMGCACHE_REMOTE_ENDPOINT_VAR).ok_or_else(|| {
                        CacheError::configuration(format!(
                            "{IMGCACHE_STRATEGY_VAR}=remote requires {IMGCACHE_REMOTE_ENDPOINT_VAR}"
                        ))
                    })?,
                },
                other => {
                    return Err(CacheError::Configuration {
                        message: format!("{IMGCACHE_STRATEGY_VAR} has unknown value '{other}'"),
                        recovery_hint: RecoveryHint::UseDefault {
                            value: "memory".to_string(),
                        },
                    })
                }
            };
            last = Some(IMGCACHE_STRATEGY_VAR.to_string());
        } else {
            match &mut config.strategy {
                StorageStrategy::Local { base_dir } => {
                    if let Some(dir) = env(IMGCACHE_BASE_DIR_VAR) {
                        *base_dir = PathBuf::from(dir);
                        last = Some(IMGCACHE_BASE_DIR_VAR.to_string());
                    }
                }
                StorageStrategy::Remote { endpoint } => {
                    if let Some(url) = env(IMGCACHE_REMOTE_ENDPOINT_VAR) {
                        *endpoint = url;
                        last = Some(IMGCACHE_REMOTE_ENDPOINT_VAR.to_string());
                    }
                }
                StorageStrategy::Memory => {}
            }
        }

        Ok(last)
    }
}

fn parse_number(var: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|e| CacheError::Configuration {
        message: format!("{var} must be a non-negative integer, got '{value}': {e}"),
        recovery_hint: RecoveryHint::FixInput {
            instructions: format!("Set {var} to a whole number"),
        },
    })
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().min(u128::from(u64::MAX)) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod opt_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&(d.as_millis().min(u128::from(u64::MAX)) as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|ms| ms.map(Duration::from_millis))
    }
}
