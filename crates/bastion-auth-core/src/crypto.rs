//! Cryptographic utilities for secure operations
//!
//! Key material handling and comparisons that must not leak timing
//! information.

use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};
use subtle::ConstantTimeEq;

/// Pre-validated HMAC key for token signing and verification.
///
/// Holds both halves jsonwebtoken needs so they are derived once at startup.
/// Cloning shares the key material.
#[derive(Clone)]
pub struct SigningKey {
    inner: Arc<KeyPair>,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    len: usize,
}

impl SigningKey {
    /// Minimum allowed key length in bytes (256 bits)
    pub const MIN_KEY_LENGTH: usize = 32;

    /// Create a new signing key from bytes.
    ///
    /// # Errors
    /// Returns error if key is too short (less than 32 bytes).
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, SigningKeyError> {
        let key_bytes = key.as_ref();
        if key_bytes.len() < Self::MIN_KEY_LENGTH {
            return Err(SigningKeyError::KeyTooShort {
                actual: key_bytes.len(),
                minimum: Self::MIN_KEY_LENGTH,
            });
        }
        Ok(Self {
            inner: Arc::new(KeyPair {
                encoding: EncodingKey::from_secret(key_bytes),
                decoding: DecodingKey::from_secret(key_bytes),
                len: key_bytes.len(),
            }),
        })
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.inner.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.inner.decoding
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_length", &self.inner.len)
            .finish_non_exhaustive()
    }
}

/// Errors that can occur when creating a signing key
#[derive(Debug, Clone, thiserror::Error)]
pub enum SigningKeyError {
    #[error("signing key too short: got {actual} bytes, need at least {minimum}")]
    KeyTooShort { actual: usize, minimum: usize },
}

/// Constant-time string comparison.
///
/// Length is not treated as secret; contents are.
#[inline]
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_str_eq() {
        assert!(constant_time_str_eq("bastion", "bastion"));
        assert!(!constant_time_str_eq("bastion", "bastioN"));
        assert!(!constant_time_str_eq("bastion", "bastion-api"));
        assert!(constant_time_str_eq("", ""));
    }

    #[test]
    fn test_signing_key_too_short() {
        let result = SigningKey::new("short");
        assert!(matches!(
            result,
            Err(SigningKeyError::KeyTooShort { actual: 5, minimum: 32 })
        ));
    }

    #[test]
    fn test_signing_key_valid() {
        let key = "k".repeat(32);
        assert!(SigningKey::new(key).is_ok());
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = SigningKey::new("super-secret-value-that-is-long-enough").unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("key_length"));
    }
}
