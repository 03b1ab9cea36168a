//! Cache Key Module
//!
//! Opaque, validated identifier for the keys whose TTLs are predicted.

use std::fmt;
use std::sync::Arc;

use crate::error::{PredictorError, Result};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

// == Cache Key ==
/// Immutable cache key. Cloning is a reference-count bump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(Arc<str>);

impl CacheKey {
    // == Constructor ==
    /// Validates and wraps a raw key.
    ///
    /// Rejects empty keys, keys longer than [`MAX_KEY_LENGTH`] bytes and keys
    /// containing control characters.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(PredictorError::InvalidKey("Key cannot be empty".to_string()));
        }
        if raw.len() > MAX_KEY_LENGTH {
            return Err(PredictorError::InvalidKey(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if raw.chars().any(char::is_control) {
            return Err(PredictorError::InvalidKey(
                "Key contains control characters".to_string(),
            ));
        }
        Ok(Self(Arc::from(raw)))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_key() {
        let key = CacheKey::new("user:42").unwrap();
        assert_eq!(key.as_str(), "user:42");
        assert_eq!(key.to_string(), "user:42");
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(CacheKey::new(""), Err(PredictorError::InvalidKey(_))));
    }

    #[test]
    fn test_key_length_boundary() {
        assert!(CacheKey::new("x".repeat(MAX_KEY_LENGTH)).is_ok());
        assert!(CacheKey::new("x".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_control_characters_rejected() {
        assert!(CacheKey::new("bad\nkey").is_err());
        assert!(CacheKey::new("tab\tkey").is_err());
    }

    #[test]
    fn test_clone_shares_storage() {
        let a = CacheKey::new("shared").unwrap();
        let b = a.clone();
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }
}
