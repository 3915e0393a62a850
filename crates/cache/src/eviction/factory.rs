//! Factory for creating eviction policies

use crate::errors::{CacheError, RecoveryHint, Result};

use super::policies::{LfuPolicy, LruPolicy};
use super::traits::EvictionPolicy;

/// Eviction policy factory
pub fn create_eviction_policy(policy_type: &str) -> Result<Box<dyn EvictionPolicy>> {
    match policy_type.to_lowercase().as_str() {
        "lru" => Ok(Box::new(LruPolicy::new())),
        "lfu" => Ok(Box::new(LfuPolicy::new())),
        _ => Err(CacheError::Configuration {
            message: format!("Unknown eviction policy: {policy_type}"),
            recovery_hint: RecoveryHint::UseDefault {
                value: "lru".to_string(),
            },
        }),
    }
}
