use std::time::Duration;

/// Result type alias for imgcache core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the shared building blocks
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The URL could not be parsed or uses an unsupported scheme
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Network-related errors
    #[error("network error for '{endpoint}': {message}")]
    Network {
        endpoint: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Response body exceeded the configured limit
    #[error("response from '{endpoint}' is {actual} bytes, limit is {limit}")]
    ResponseTooLarge {
        endpoint: String,
        actual: usize,
        limit: usize,
    },

    /// Operation timeout errors
    #[error("operation '{operation}' timed out after {duration:?}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Format name or extension not in the supported set
    #[error("unsupported image format '{value}'")]
    UnsupportedFormat { value: String },
}

impl Error {
    /// Build a network error without an underlying source
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Network {
            endpoint: endpoint.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Whether retrying later could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network { .. } | Error::Timeout { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        let endpoint = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Error::Network {
            endpoint,
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }
}
