//! Release artefact resolution, retrieval, and verification.
//!
//! # Sub-modules
//!
//! - [`platform`] - Host platform to artefact name mapping (`ArtifactName`).
//! - [`release`] - Release asset URLs (`ReleaseLocation`).
//! - [`download`] - Fetcher trait and `ureq`-backed HTTP implementation.
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`verification`] - File hashing and checksum sidecar verification.

pub mod download;
pub mod platform;
pub mod release;
pub mod sha256_digest;
pub mod verification;
