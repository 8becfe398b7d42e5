//! Integrity verification of downloaded artefacts.
//!
//! A staged binary is only ever published after [`verify`] accepts it. The
//! expected digest comes from a sidecar in the usual digest-utility format
//! (`<hex digest>  <file name>`).
//!
//! Sidecar parsing is lenient in a fixed way: a leading UTF-8 byte order mark
//! and blank lines are skipped, and only the first whitespace-delimited token
//! of the first non-blank line is used. Anything after that token is ignored.

use super::sha256_digest::Sha256Digest;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Block size used when hashing files.
const READ_BLOCK: usize = 64 * 1024;

/// UTF-8 byte order mark some tools prepend to text files.
const BOM: char = '\u{feff}';

/// The computed digest disagrees with the published checksum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("checksum mismatch: expected {expected}, actual {actual}")]
pub struct IntegrityError {
    /// The digest token published in the sidecar.
    pub expected: String,
    /// The digest computed over the downloaded file.
    pub actual: String,
}

/// The sidecar could not be interpreted as a checksum record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecksumError {
    /// The sidecar holds no token at all.
    #[error("checksum sidecar is empty")]
    Empty,
}

/// Failure of [`verify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The sidecar could not be parsed.
    #[error(transparent)]
    Checksum(#[from] ChecksumError),

    /// The digests differ.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

/// The expected digest published for an artefact.
///
/// # Examples
///
/// ```
/// use zetten_installer::artefact::verification::ChecksumRecord;
///
/// let record = ChecksumRecord::parse("ABC123  zetten-linux-x86_64\n").unwrap();
/// assert_eq!(record.expected(), "ABC123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumRecord {
    expected: String,
}

impl ChecksumRecord {
    /// Extract the first whitespace-delimited token from sidecar content.
    ///
    /// # Errors
    ///
    /// Returns [`ChecksumError::Empty`] when the content holds no token.
    pub fn parse(contents: &str) -> Result<Self, ChecksumError> {
        contents
            .trim_start_matches(BOM)
            .split_whitespace()
            .next()
            .map(|token| Self {
                expected: token.to_owned(),
            })
            .ok_or(ChecksumError::Empty)
    }

    /// The published digest token, exactly as it appeared in the sidecar.
    #[must_use]
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Check `actual` against the published token, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError`] carrying both values when they differ.
    pub fn check(&self, actual: &Sha256Digest) -> Result<(), IntegrityError> {
        if actual.matches(&self.expected) {
            Ok(())
        } else {
            Err(IntegrityError {
                expected: self.expected.clone(),
                actual: actual.to_string(),
            })
        }
    }
}

/// Compute the SHA-256 digest of the file at `path`.
///
/// The file is read in fixed-size blocks so memory use does not depend on
/// its size.
///
/// # Errors
///
/// Returns any I/O error raised while opening or reading the file.
pub fn digest_of(path: &Path) -> std::io::Result<Sha256Digest> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0_u8; READ_BLOCK];
    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(Sha256Digest::from_bytes(hasher.finalize().into()))
}

/// Verify `actual` against the first token of `sidecar_contents`.
///
/// # Errors
///
/// Returns [`VerifyError::Checksum`] when the sidecar holds no token and
/// [`VerifyError::Integrity`] when the token differs from `actual`.
pub fn verify(actual: &Sha256Digest, sidecar_contents: &str) -> Result<(), VerifyError> {
    let record = ChecksumRecord::parse(sidecar_contents)?;
    record.check(actual)?;
    Ok(())
}
