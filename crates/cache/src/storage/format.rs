//! Binary envelope used by the local and remote adapters
//!
//! Layout: a fixed 24-byte bincode header followed by the body. The body is
//! the bincode-encoded entry, optionally zstd-compressed, optionally sealed
//! by a [`PayloadCipher`](super::PayloadCipher).

use super::traits::TransportOptions;
use crate::entry::CacheEntry;
use crate::errors::{CacheError, RecoveryHint, Result, SerializationOp};
use crc32c::crc32c;
use serde::{Deserialize, Serialize};

/// Magic number for cache files: "IMGC"
pub const CACHE_MAGIC: u32 = 0x494D_4743;

/// Current storage format version
pub const STORAGE_VERSION: u16 = 1;

/// Default zstd compression level (3 = fast with good compression)
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Encoded header size: u32 + u16 + u16 + u32 + u64 + u32 with bincode's fixed-width encoding
pub const HEADER_LEN: usize = 24;

/// Binary storage header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageHeader {
    magic: u32,
    version: u16,
    /// bit 0: compressed, bit 1: encrypted
    flags: u16,
    /// CRC32C of the header with this field zeroed
    header_crc: u32,
    body_len: u64,
    body_crc: u32,
}

impl StorageHeader {
    const FLAG_COMPRESSED: u16 = 1 << 0;
    const FLAG_ENCRYPTED: u16 = 1 << 1;

    fn new(body: &[u8], compressed: bool, encrypted: bool) -> Self {
        let mut flags = 0;
        if compressed {
            flags |= Self::FLAG_COMPRESSED;
        }
        if encrypted {
            flags |= Self::FLAG_ENCRYPTED;
        }

        let mut header = Self {
            magic: CACHE_MAGIC,
            version: STORAGE_VERSION,
            flags,
            header_crc: 0,
            body_len: body.len() as u64,
            body_crc: crc32c(body),
        };
        header.header_crc = header.calculate_crc();
        header
    }

    fn calculate_crc(&self) -> u32 {
        let mut temp = *self;
        temp.header_crc = 0;

        match bincode::serialize(&temp) {
            Ok(bytes) => crc32c(&bytes),
            Err(_) => 0,
        }
    }

    fn validate(&self, key: &str) -> Result<()> {
        if self.magic != CACHE_MAGIC {
            return Err(corruption(
                key,
                format!(
                    "Invalid magic number: expected {:08x}, got {:08x}",
                    CACHE_MAGIC, self.magic
                ),
            ));
        }

        if self.version > STORAGE_VERSION {
            return Err(corruption(
                key,
                format!("Unsupported storage version: {}", self.version),
            ));
        }

        let expected_crc = self.calculate_crc();
        if self.header_crc != expected_crc {
            return Err(corruption(
                key,
                format!(
                    "Header CRC mismatch: expected {:08x}, got {:08x}",
                    expected_crc, self.header_crc
                ),
            ));
        }

        Ok(())
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & Self::FLAG_COMPRESSED != 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & Self::FLAG_ENCRYPTED != 0
    }
}

/// Serialize an entry into the on-disk / on-wire envelope
pub fn encode_entry(entry: &CacheEntry, transport: &TransportOptions) -> Result<Vec<u8>> {
    let mut body = bincode::serialize(entry).map_err(|e| CacheError::Serialization {
        key: entry.key.clone(),
        operation: SerializationOp::Serialize,
        source: e,
        recovery_hint: RecoveryHint::Manual {
            instructions: "Entry could not be serialized".to_string(),
        },
    })?;

    if transport.compression {
        body = zstd::stream::encode_all(body.as_slice(), transport.compression_level).map_err(
            |e| CacheError::Compression {
                operation: "compress",
                source: Box::new(e),
                recovery_hint: RecoveryHint::Manual {
                    instructions: "Check compression settings".to_string(),
                },
            },
        )?;
    }

    let encrypted = match &transport.cipher {
        Some(cipher) => {
            body = cipher.seal(&body)?;
            true
        }
        None => false,
    };

    let header = StorageHeader::new(&body, transport.compression, encrypted);
    let mut out = bincode::serialize(&header).map_err(|e| CacheError::Serialization {
        key: entry.key.clone(),
        operation: SerializationOp::Serialize,
        source: e,
        recovery_hint: RecoveryHint::Ignore,
    })?;
    debug_assert_eq!(out.len(), HEADER_LEN);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Parse and verify an envelope produced by [`encode_entry`]
pub fn decode_entry(key: &str, bytes: &[u8], transport: &TransportOptions) -> Result<CacheEntry> {
    if bytes.len() < HEADER_LEN {
        return Err(corruption(
            key,
            format!("Envelope truncated: {} bytes", bytes.len()),
        ));
    }

    let header: StorageHeader =
        bincode::deserialize(&bytes[..HEADER_LEN]).map_err(|e| CacheError::Serialization {
            key: key.to_string(),
            operation: SerializationOp::Deserialize,
            source: e,
            recovery_hint: RecoveryHint::ClearAndRetry,
        })?;
    header.validate(key)?;

    let body = &bytes[HEADER_LEN..];
    if body.len() as u64 != header.body_len {
        return Err(corruption(
            key,
            format!(
                "Body length mismatch: header says {}, found {}",
                header.body_len,
                body.len()
            ),
        ));
    }
    if crc32c(body) != header.body_crc {
        return Err(corruption(key, "Body CRC mismatch".to_string()));
    }

    let mut plain = if header.is_encrypted() {
        match &transport.cipher {
            Some(cipher) => cipher.open(body)?,
            None => {
                return Err(CacheError::Encryption {
                    operation: "open",
                    reason: format!("entry '{key}' is encrypted but no cipher is configured"),
                    recovery_hint: RecoveryHint::UpdateConfiguration,
                })
            }
        }
    } else {
        body.to_vec()
    };

    if header.is_compressed() {
        plain = zstd::stream::decode_all(plain.as_slice()).map_err(|e| CacheError::Compression {
            operation: "decompress",
            source: Box::new(e),
            recovery_hint: RecoveryHint::ClearAndRetry,
        })?;
    }

    let entry: CacheEntry =
        bincode::deserialize(&plain).map_err(|e| CacheError::Serialization {
            key: key.to_string(),
            operation: SerializationOp::Deserialize,
            source: e,
            recovery_hint: RecoveryHint::ClearAndRetry,
        })?;

    if entry.key != key {
        return Err(corruption(
            key,
            format!("Stored entry belongs to key '{}'", entry.key),
        ));
    }
    Ok(entry)
}

fn corruption(key: &str, reason: String) -> CacheError {
    CacheError::Corruption {
        key: key.to_string(),
        reason,
        recovery_hint: RecoveryHint::ClearAndRetry,
    }
}
