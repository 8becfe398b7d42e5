//! Release asset URL construction.
//!
//! The release host serves each artefact next to a `.sha256` sidecar, so the
//! checksum URL is always the binary URL plus [`CHECKSUM_SUFFIX`].

use super::platform::ArtifactName;

/// Default release host for zetten binaries.
pub const DEFAULT_BASE_URL: &str = "https://github.com/amit-devb/zetten/releases";

/// Suffix appended to an artefact URL to locate its checksum sidecar.
pub const CHECKSUM_SUFFIX: &str = ".sha256";

/// The pair of URLs needed to fetch and verify one artefact.
///
/// # Examples
///
/// ```
/// use zetten_installer::artefact::platform::Platform;
/// use zetten_installer::artefact::release::ReleaseLocation;
///
/// let name = Platform::Linux.artifact_name();
/// let location = ReleaseLocation::latest("https://example.test/releases/", name);
/// assert_eq!(
///     location.binary_url(),
///     "https://example.test/releases/latest/download/zetten-linux-x86_64"
/// );
/// assert_eq!(
///     location.checksum_url(),
///     "https://example.test/releases/latest/download/zetten-linux-x86_64.sha256"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLocation {
    binary_url: String,
    checksum_url: String,
}

impl ReleaseLocation {
    /// Locate `artifact` in the most recent release under `base`.
    #[must_use]
    pub fn latest(base: &str, artifact: ArtifactName) -> Self {
        Self::from_binary_url(format!("{}/latest/download/{artifact}", trim_base(base)))
    }

    /// Locate `artifact` in the release tagged `tag` under `base`.
    #[must_use]
    pub fn tagged(base: &str, tag: &str, artifact: ArtifactName) -> Self {
        Self::from_binary_url(format!(
            "{}/download/{}/{artifact}",
            trim_base(base),
            tag.trim_matches('/')
        ))
    }

    /// Locate `artifact` in `tag` when one is given, otherwise the latest release.
    #[must_use]
    pub fn for_release(base: &str, tag: Option<&str>, artifact: ArtifactName) -> Self {
        match tag {
            Some(tag) => Self::tagged(base, tag, artifact),
            None => Self::latest(base, artifact),
        }
    }

    fn from_binary_url(binary_url: String) -> Self {
        let checksum_url = format!("{binary_url}{CHECKSUM_SUFFIX}");
        Self {
            binary_url,
            checksum_url,
        }
    }

    /// URL of the executable artefact.
    #[must_use]
    pub fn binary_url(&self) -> &str {
        &self.binary_url
    }

    /// URL of the checksum sidecar.
    #[must_use]
    pub fn checksum_url(&self) -> &str {
        &self.checksum_url
    }
}

fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artefact::platform::Platform;

    #[test]
    fn checksum_url_is_binary_url_with_suffix() {
        let location = ReleaseLocation::latest(DEFAULT_BASE_URL, Platform::MacOs.artifact_name());
        assert_eq!(
            location.checksum_url(),
            format!("{}{CHECKSUM_SUFFIX}", location.binary_url())
        );
        assert!(location.binary_url().ends_with("/zetten-macos-arm64"));
    }

    #[test]
    fn latest_uses_latest_download_path() {
        let location = ReleaseLocation::latest(DEFAULT_BASE_URL, Platform::Linux.artifact_name());
        assert_eq!(
            location.binary_url(),
            "https://github.com/amit-devb/zetten/releases/latest/download/zetten-linux-x86_64"
        );
    }

    #[test]
    fn tagged_uses_tag_download_path() {
        let location =
            ReleaseLocation::tagged(DEFAULT_BASE_URL, "v1.0.1", Platform::Windows.artifact_name());
        assert_eq!(
            location.binary_url(),
            "https://github.com/amit-devb/zetten/releases/download/v1.0.1/zetten-windows-x86_64.exe"
        );
    }

    #[test]
    fn trailing_slashes_on_base_are_ignored() {
        let artifact = Platform::Linux.artifact_name();
        assert_eq!(
            ReleaseLocation::latest("https://example.test//", artifact),
            ReleaseLocation::latest("https://example.test", artifact)
        );
    }

    #[test]
    fn for_release_selects_constructor() {
        let artifact = Platform::Linux.artifact_name();
        assert_eq!(
            ReleaseLocation::for_release(DEFAULT_BASE_URL, None, artifact),
            ReleaseLocation::latest(DEFAULT_BASE_URL, artifact)
        );
        assert_eq!(
            ReleaseLocation::for_release(DEFAULT_BASE_URL, Some("v2.0.0"), artifact),
            ReleaseLocation::tagged(DEFAULT_BASE_URL, "v2.0.0", artifact)
        );
    }
}
