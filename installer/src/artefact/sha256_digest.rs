//! SHA-256 digest newtype for artefact verification.
//!
//! Digests are only ever produced by hashing, so the value is always 64
//! lowercase hexadecimal characters.

use std::fmt;

/// A lowercase hex-encoded SHA-256 digest computed over local bytes.
///
/// # Examples
///
/// ```
/// use zetten_installer::artefact::sha256_digest::Sha256Digest;
///
/// let digest = Sha256Digest::from_bytes([0xab; 32]);
/// assert_eq!(digest.as_str().len(), 64);
/// assert!(digest.matches(&"AB".repeat(32)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Build a digest from the raw 32-byte hash output.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a published token, ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        self.0.eq_ignore_ascii_case(token)
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
