//! Display implementations for cache errors

use super::types::{CacheError, StoreType};
use std::fmt;

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey { key, reason, .. } => {
                write!(f, "Invalid cache key '{key}': {reason}")
            }
            Self::Adapter {
                key,
                operation,
                store_type,
                source,
            } => write!(
                f,
                "{store_type} adapter failed to {operation} '{key}': {source}"
            ),
            Self::Io {
                path,
                operation,
                source,
                ..
            } => write!(
                f,
                "I/O error during {} on '{}': {}",
                operation,
                path.display(),
                source
            ),
            Self::Serialization {
                key,
                operation,
                source,
                ..
            } => write!(f, "Failed to {operation:?} cache entry '{key}': {source}"),
            Self::Corruption { key, reason, .. } => {
                write!(f, "Cache corruption detected for key '{key}': {reason}")
            }
            Self::Compression {
                operation, source, ..
            } => write!(f, "Compression error during {operation}: {source}"),
            Self::Encryption {
                operation, reason, ..
            } => write!(f, "Encryption error during {operation}: {reason}"),
            Self::Network {
                endpoint,
                operation,
                source,
                ..
            } => write!(
                f,
                "Network error during {operation} with '{endpoint}': {source}"
            ),
            Self::Timeout {
                operation,
                duration,
                ..
            } => write!(f, "Operation '{operation}' timed out after {duration:?}"),
            Self::StoreUnavailable {
                store_type, reason, ..
            } => write!(f, "Cache store {store_type} unavailable: {reason}"),
            Self::Configuration { message, .. } => {
                write!(f, "Cache configuration error: {message}")
            }
        }
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreType::Memory => f.write_str("memory"),
            StoreType::Local { base_dir } => write!(f, "local({})", base_dir.display()),
            StoreType::Remote { endpoint } => write!(f, "remote({endpoint})"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Adapter { source, .. } => Some(source.as_ref()),
            Self::Io { source, .. } => Some(source),
            Self::Serialization { source, .. }
            | Self::Compression { source, .. }
            | Self::Network { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
