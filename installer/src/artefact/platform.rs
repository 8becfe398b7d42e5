//! Host platform resolution for prebuilt zetten artefacts.
//!
//! Only three operating system families have published binaries. Any other
//! identifier is rejected with [`UnsupportedPlatformError`] before the
//! installer touches the network or the filesystem.

use std::fmt;
use thiserror::Error;

/// Binary name shared by every published artefact.
pub const BINARY_STEM: &str = "zetten";

/// The host operating system is not covered by the release matrix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported platform \"{platform}\"; expected one of: {expected}")]
pub struct UnsupportedPlatformError {
    /// The raw identifier reported for the host.
    pub platform: String,
    /// Comma-separated list of accepted identifiers.
    pub expected: String,
}

/// Operating system families that have a published artefact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux on `x86_64`.
    Linux,
    /// macOS on Apple silicon.
    MacOs,
    /// Windows on `x86_64`.
    Windows,
}

impl Platform {
    /// Identifiers accepted by [`Platform::parse`].
    pub const ACCEPTED: &'static [&'static str] = &["linux", "darwin", "macos", "windows"];

    /// Parse an operating system identifier such as `std::env::consts::OS`.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPlatformError`] carrying the raw identifier when
    /// the family is not in the release matrix.
    ///
    /// # Examples
    ///
    /// ```
    /// use zetten_installer::artefact::platform::Platform;
    ///
    /// assert_eq!(Platform::parse("Darwin"), Ok(Platform::MacOs));
    /// assert!(Platform::parse("plan9").is_err());
    /// ```
    pub fn parse(os: &str) -> Result<Self, UnsupportedPlatformError> {
        match os.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "darwin" | "macos" => Ok(Self::MacOs),
            "windows" => Ok(Self::Windows),
            _ => Err(UnsupportedPlatformError {
                platform: os.to_owned(),
                expected: Self::ACCEPTED.join(", "),
            }),
        }
    }

    /// Return the release artefact name for this platform.
    #[must_use]
    pub fn artifact_name(self) -> ArtifactName {
        let token = match self {
            Self::Linux => "zetten-linux-x86_64",
            Self::MacOs => "zetten-macos-arm64",
            Self::Windows => "zetten-windows-x86_64.exe",
        };
        ArtifactName(token)
    }

    /// Whether binaries for this platform follow Windows layout conventions.
    #[must_use]
    pub fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
        };
        f.write_str(name)
    }
}

/// The platform-specific file name of a published release artefact.
///
/// Values only come from [`Platform::artifact_name`], so every instance is
/// one of the published tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactName(&'static str);

impl ArtifactName {
    /// Return the artefact name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Return the operating system identifier of the running host.
#[must_use]
pub fn host_os() -> &'static str {
    std::env::consts::OS
}

/// Map an operating system identifier to its release artefact name.
///
/// Only the OS family is consulted. Each family publishes a single build,
/// so a Linux host on any CPU (aarch64 included) gets the x86_64 artefact
/// and every macOS host gets the arm64 one.
///
/// # Errors
///
/// Returns [`UnsupportedPlatformError`] for identifiers outside the release
/// matrix.
pub fn resolve_artifact_name(os: &str) -> Result<ArtifactName, UnsupportedPlatformError> {
    Platform::parse(os).map(Platform::artifact_name)
}
