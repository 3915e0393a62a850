//! Recovery and classification helpers for cache errors

use super::types::{CacheError, RecoveryHint, StoreType};

impl CacheError {
    /// Get the recovery hint for this error
    #[must_use]
    pub fn recovery_hint(&self) -> &RecoveryHint {
        match self {
            Self::Adapter { source, .. } => source.recovery_hint(),
            Self::InvalidKey { recovery_hint, .. }
            | Self::Io { recovery_hint, .. }
            | Self::Serialization { recovery_hint, .. }
            | Self::Corruption { recovery_hint, .. }
            | Self::Compression { recovery_hint, .. }
            | Self::Encryption { recovery_hint, .. }
            | Self::Network { recovery_hint, .. }
            | Self::Timeout { recovery_hint, .. }
            | Self::StoreUnavailable { recovery_hint, .. }
            | Self::Configuration { recovery_hint, .. } => recovery_hint,
        }
    }

    /// Check if this error is transient and can be retried
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self.recovery_hint(),
            RecoveryHint::Retry { .. }
                | RecoveryHint::RetryWithBackoff { .. }
                | RecoveryHint::CheckNetwork { .. }
        )
    }

    /// Bad input from the caller; never retried automatically
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidKey { .. })
    }

    /// The underlying storage failed to persist, load or delete
    #[must_use]
    pub fn is_adapter(&self) -> bool {
        matches!(
            self,
            Self::Adapter { .. }
                | Self::Io { .. }
                | Self::Serialization { .. }
                | Self::Corruption { .. }
                | Self::Compression { .. }
                | Self::Encryption { .. }
                | Self::StoreUnavailable { .. }
        )
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Adapter { source, .. } => source.is_network(),
            _ => false,
        }
    }

    /// Attach the key and operation an adapter was serving when it failed
    #[must_use]
    pub fn in_adapter(self, key: &str, operation: &'static str, store_type: StoreType) -> Self {
        match self {
            already @ Self::Adapter { .. } => already,
            other => Self::Adapter {
                key: key.to_string(),
                operation,
                store_type,
                source: Box::new(other),
            },
        }
    }

    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
            recovery_hint: RecoveryHint::FixInput {
                instructions: "Use a non-empty key without control characters".to_string(),
            },
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            recovery_hint: RecoveryHint::UpdateConfiguration,
        }
    }
}
