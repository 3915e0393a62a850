/// Constants shared across the imgcache crates

// Source images larger than this are rejected before decoding
pub const MAX_SOURCE_BYTES: usize = 10 * 1024 * 1024;

// Default per-item timeout for network fetches
pub const DEFAULT_NETWORK_TIMEOUT_MS: u64 = 10_000;

// Number of access events retained for hit-rate and latency statistics
pub const STATS_WINDOW: usize = 1000;

// Environment variable names read by the config loader
pub const IMGCACHE_STRATEGY_VAR: &str = "IMGCACHE_STRATEGY";
pub const IMGCACHE_TTL_MS_VAR: &str = "IMGCACHE_TTL_MS";
pub const IMGCACHE_MAX_SIZE_VAR: &str = "IMGCACHE_MAX_SIZE";
pub const IMGCACHE_BASE_DIR_VAR: &str = "IMGCACHE_BASE_DIR";
pub const IMGCACHE_REMOTE_ENDPOINT_VAR: &str = "IMGCACHE_REMOTE_ENDPOINT";
pub const IMGCACHE_CDN_BASE_URL_VAR: &str = "IMGCACHE_CDN_BASE_URL";
