//! Secret digest used for signup and login
//!
//! The digest is an HMAC-SHA512 of the secret keyed by the server-wide
//! `HASH_SECRET`, hex encoded. It is deterministic: the same secret always
//! yields the same digest, which lets the user directory compare by equality.
//!
//! # Example
//!
//! ```
//! use taskmatrix_shared::auth::digest::SecretDigester;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let digester = SecretDigester::new("a-long-server-side-key")?;
//! let first = digester.digest("hunter2");
//! assert_eq!(first, digester.digest("hunter2"));
//! assert_eq!(first.len(), 128); // SHA-512 hex is 128 chars
//! # Ok(())
//! # }
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Minimum accepted key length in bytes
pub const MIN_KEY_LEN: usize = 16;

/// Error type for digest construction
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("Digest key must be at least 16 bytes, got {0}")]
    KeyTooShort(usize),

    #[error("Invalid digest key: {0}")]
    InvalidKey(String),
}

/// Keyed digest function, cheap to clone
#[derive(Clone)]
pub struct SecretDigester {
    mac: HmacSha512,
}

impl std::fmt::Debug for SecretDigester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretDigester").finish_non_exhaustive()
    }
}

impl SecretDigester {
    pub fn new(key: &str) -> Result<Self, DigestError> {
        if key.len() < MIN_KEY_LEN {
            return Err(DigestError::KeyTooShort(key.len()));
        }

        let mac = HmacSha512::new_from_slice(key.as_bytes())
            .map_err(|e| DigestError::InvalidKey(e.to_string()))?;

        Ok(Self { mac })
    }

    /// Hex digest of `secret`
    pub fn digest(&self, secret: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(secret.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// One-shot digest with an explicit key
pub fn digest_secret(secret: &str, key: &str) -> Result<String, DigestError> {
    Ok(SecretDigester::new(key)?.digest(secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "test-hash-secret-0123456789";

    #[test]
    fn test_digest_is_deterministic() {
        let digester = SecretDigester::new(KEY).unwrap();
        assert_eq!(digester.digest("password123"), digester.digest("password123"));
        assert_eq!(digester.digest("password123"), digest_secret("password123", KEY).unwrap());
    }

    #[test]
    fn test_digest_depends_on_secret_and_key() {
        let a = SecretDigester::new(KEY).unwrap();
        let b = SecretDigester::new("another-key-abcdefghijkl").unwrap();
        assert_ne!(a.digest("password123"), a.digest("password124"));
        assert_ne!(a.digest("password123"), b.digest("password123"));
    }

    #[test]
    fn test_digest_is_hex() {
        let d = digest_secret("x", KEY).unwrap();
        assert_eq!(d.len(), 128);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_short_key_rejected() {
        assert!(matches!(SecretDigester::new("short"), Err(DigestError::KeyTooShort(5))));
    }

    #[test]
    fn test_debug_hides_key() {
        let digester = SecretDigester::new(KEY).unwrap();
        assert!(!format!("{:?}", digester).contains(KEY));
    }
}
