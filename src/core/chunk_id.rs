//! Deterministic chunk identifiers.
//!
//! A chunk id must derive only from `(document_content_hash, chunker_version,
//! position)` so that re-ingesting unchanged content reproduces identical
//! ids and the dual-index writer can detect true duplicates versus content
//! drift under the same id. `core::buffer::compute_hash` used a fast
//! non-cryptographic hash for cache-key purposes; chunk ids are a
//! correctness invariant here; a collision between differing content must
//! be detectable, so this uses SHA-256 truncated to 128 bits.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A content-addressed, deterministic chunk identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkId([u8; 16]);

impl ChunkId {
    /// Derives a chunk id from the document content hash, the chunker
    /// version that produced the chunk, and the chunk's position within the
    /// document.
    #[must_use]
    pub fn derive(document_content_hash: &str, chunker_version: &str, position: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(document_content_hash.as_bytes());
        hasher.update(b"\0");
        hasher.update(chunker_version.as_bytes());
        hasher.update(b"\0");
        hasher.update(position.to_le_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0_u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self(bytes)
    }

    /// Returns the identifier as a lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parses a hex-encoded chunk id previously produced by [`to_hex`](Self::to_hex).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 32 {
            return None;
        }
        let mut bytes = [0_u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Computes the SHA-256 content hash of a document's normalised bytes.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        let a = ChunkId::derive("abc123", "text-v1", 0);
        let b = ChunkId::derive("abc123", "text-v1", 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_position_changes_id() {
        let a = ChunkId::derive("abc123", "text-v1", 0);
        let b = ChunkId::derive("abc123", "text-v1", 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_chunker_version_changes_id() {
        let a = ChunkId::derive("abc123", "text-v1", 0);
        let b = ChunkId::derive("abc123", "text-v2", 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_content_change_changes_id() {
        let a = ChunkId::derive("abc123", "text-v1", 0);
        let b = ChunkId::derive("def456", "text-v1", 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hex_round_trip() {
        let id = ChunkId::derive("abc123", "text-v1", 7);
        let hex = id.to_hex();
        assert_eq!(hex.len(), 32);
        let parsed = ChunkId::from_hex(&hex).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_from_hex_rejects_bad_length() {
        assert!(ChunkId::from_hex("too-short").is_none());
    }

    #[test]
    fn test_content_hash_deterministic() {
        let a = content_hash(b"hello world");
        let b = content_hash(b"hello world");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
