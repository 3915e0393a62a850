//! Cache entry model

use chrono::{DateTime, Utc};
use imgcache_core::clock::add_duration;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stored value: image bytes in practice, text for small descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    Binary(Vec<u8>),
    Text(String),
}

impl Payload {
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Binary(bytes) => bytes,
            Payload::Text(text) => text.as_bytes(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Binary(bytes) => bytes,
            Payload::Text(text) => text.into_bytes(),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Binary(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Binary(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

/// Entry metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Fixed at creation; only a new `set` moves it
    pub expires_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
}

/// The unit of storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Payload,
    pub metadata: EntryMetadata,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, payload: Payload, ttl: Duration, now: DateTime<Utc>) -> Self {
        let size_bytes = payload.len() as u64;
        Self {
            key: key.into(),
            payload,
            metadata: EntryMetadata {
                size_bytes,
                content_type: None,
                created_at: now,
                expires_at: add_duration(now, ttl),
                last_accessed_at: now,
                access_count: 0,
            },
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.metadata.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> u64 {
        self.metadata.size_bytes
    }

    /// Entries are live strictly before `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.metadata.expires_at
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.metadata.last_accessed_at = now;
        self.metadata.access_count += 1;
    }
}

/// Per-call overrides for `set`
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    pub ttl: Option<Duration>,
    pub content_type: Option<String>,
}

impl SetOptions {
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
