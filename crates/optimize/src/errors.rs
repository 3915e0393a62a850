//! Error types for the optimization pipeline

use imgcache_core::ImageFormat;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OptimizeError>;

#[derive(Error, Debug)]
pub enum OptimizeError {
    /// Bad input; raised before any decode work
    #[error("invalid source '{name}': {reason}")]
    Validation { name: String, reason: String },

    #[error("failed to decode '{name}': {message}")]
    Decode { name: String, message: String },

    /// One (format, size) pair could not be produced
    #[error("failed to derive {format} variant '{label}': {message}")]
    Derivation {
        format: ImageFormat,
        label: String,
        message: String,
    },

    #[error(transparent)]
    Network(#[from] imgcache_core::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("worker task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Cache(#[from] imgcache_cache::CacheError),
}

impl OptimizeError {
    pub(crate) fn validation(name: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    #[must_use]
    pub fn is_derivation(&self) -> bool {
        matches!(self, Self::Derivation { .. })
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<tokio::task::JoinError> for OptimizeError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Task(error.to_string())
    }
}

/// Failure reported by an [`ImageCodec`](crate::codec::ImageCodec)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CodecError(pub String);

impl From<image::ImageError> for CodecError {
    fn from(error: image::ImageError) -> Self {
        Self(error.to_string())
    }
}

impl From<std::io::Error> for CodecError {
    fn from(error: std::io::Error) -> Self {
        Self(error.to_string())
    }
}
