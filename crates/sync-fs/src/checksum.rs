//! SHA-256 content hashing for change detection
//!
//! The settings store keeps the hash of the last bytes it read from or wrote
//! to disk and compares it on reload, so an unchanged document never triggers
//! a reparse or a backend rebuild. Hashes use a single canonical format,
//! `sha256:<hex>`.

use sha2::{Digest, Sha256};

/// Prefix for all hashes produced by this module
const PREFIX: &str = "sha256:";

/// Digest of a serialized document's raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash raw bytes into the canonical `sha256:<hex>` format.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{}{:x}", PREFIX, hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
