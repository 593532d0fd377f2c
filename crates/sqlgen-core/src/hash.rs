//! Content-based hashing for change detection

use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 based content hash for detecting changes.
///
/// Used to decide whether a cached value derived from some text (such as the
/// catalog built from a dataset's CREATE statements) is still current.
#[derive(Clone, Copy, Hash, Eq, PartialEq)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Compute a hash from bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        Self(result.into())
    }

    /// Compute a hash from a string
    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// Compute a hash over an ordered list of strings.
    ///
    /// Every part is length-prefixed, so `["ab", "c"]` and `["a", "bc"]`
    /// hash differently.
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((parts.len() as u64).to_le_bytes());
        for part in parts {
            let bytes = part.as_ref().as_bytes();
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        Self(hasher.finalize().into())
    }

    /// Get the hash as a hex string
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistent_hashing() {
        let h1 = ContentHash::from_str("hello");
        let h2 = ContentHash::from_str("hello");
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_different_content_different_hash() {
        let h1 = ContentHash::from_str("hello");
        let h2 = ContentHash::from_str("world");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_hex_output() {
        let h = ContentHash::from_str("hello");
        assert_eq!(h.to_hex().len(), 64);
    }

    #[test]
    fn test_parts_are_framed() {
        let h1 = ContentHash::from_parts(&["ab", "c"]);
        let h2 = ContentHash::from_parts(&["a", "bc"]);
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_parts_compare_by_value() {
        let owned = vec!["CREATE TABLE a(id INT)".to_string()];
        let borrowed = ["CREATE TABLE a(id INT)"];
        assert_eq!(ContentHash::from_parts(&owned), ContentHash::from_parts(&borrowed));
    }
}
