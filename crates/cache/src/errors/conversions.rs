//! Error conversion utilities

use super::types::{CacheError, RecoveryHint, SerializationOp};
use std::path::PathBuf;

impl From<std::io::Error> for CacheError {
    fn from(error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let recovery_hint = match error.kind() {
            ErrorKind::PermissionDenied => RecoveryHint::CheckPermissions {
                path: PathBuf::from("."),
            },
            ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted => {
                RecoveryHint::RetryWithBackoff {
                    initial_delay_ms: 100,
                    max_retries: 3,
                    backoff_multiplier: 2.0,
                }
            }
            _ => RecoveryHint::Manual {
                instructions: "Inspect the cache directory".to_string(),
            },
        };

        Self::Io {
            path: PathBuf::from("."),
            operation: "unknown",
            source: error,
            recovery_hint,
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            key: String::new(),
            operation: SerializationOp::Deserialize,
            source: Box::new(error),
            recovery_hint: RecoveryHint::FixInput {
                instructions: "Check JSON format and field types".to_string(),
            },
        }
    }
}

impl From<imgcache_core::Error> for CacheError {
    fn from(error: imgcache_core::Error) -> Self {
        use imgcache_core::Error as CoreError;

        match error {
            CoreError::Timeout {
                operation,
                duration,
            } => Self::Timeout {
                operation,
                duration,
                recovery_hint: RecoveryHint::Retry { after: duration },
            },
            CoreError::Network { ref endpoint, .. } => {
                let endpoint = endpoint.clone();
                Self::Network {
                    endpoint: endpoint.clone(),
                    operation: "fetch",
                    source: Box::new(error),
                    recovery_hint: RecoveryHint::CheckNetwork { endpoint },
                }
            }
            other => Self::Network {
                endpoint: String::new(),
                operation: "fetch",
                source: Box::new(other),
                recovery_hint: RecoveryHint::UseFallback,
            },
        }
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(error: reqwest::Error) -> Self {
        let endpoint = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_default();
        Self::Network {
            endpoint: endpoint.clone(),
            operation: "request",
            source: Box::new(error),
            recovery_hint: RecoveryHint::CheckNetwork { endpoint },
        }
    }
}
