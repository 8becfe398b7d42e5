//! Install orchestration: resolve, fetch, verify, publish.
//!
//! One call to [`install_with`] walks the stages in [`InstallStage`] order
//! and stops at the first failure. Each staging file is an individual
//! [`StagingFile`] guard, so every early return removes whatever was staged:
//! the checksum sidecar is always removed, and the binary is removed unless
//! it was renamed onto the install target.
//!
//! The target is only ever replaced by renaming a verified staging file in
//! the same directory. Concurrent installs into one directory serialize the
//! rename behind an advisory lock; the last publisher wins.

use crate::artefact::download::{DownloadError, Fetcher, HttpFetcher};
use crate::artefact::platform::{ArtifactName, Platform, UnsupportedPlatformError, host_os};
use crate::artefact::release::ReleaseLocation;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::artefact::verification::{ChecksumError, IntegrityError, VerifyError, digest_of, verify};
use crate::config::InstallConfig;
use crate::install_target::InstallTarget;
use crate::output::write_stderr_line;
use crate::staging::StagingFile;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use thiserror::Error;

/// Name of the advisory lock file held while publishing.
pub const LOCK_FILE_NAME: &str = ".zetten-install.lock";

/// Stages of one install, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallStage {
    /// Mapping the host to an artefact name.
    Resolving,
    /// Downloading the executable into staging.
    FetchingBinary,
    /// Downloading the checksum sidecar into staging.
    FetchingChecksum,
    /// Comparing the staged binary against the sidecar.
    Verifying,
    /// Moving the verified binary onto the install target.
    Publishing,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolving => "resolving platform",
            Self::FetchingBinary => "fetching binary",
            Self::FetchingChecksum => "fetching checksum",
            Self::Verifying => "verifying",
            Self::Publishing => "publishing",
        };
        f.write_str(name)
    }
}

/// Failure of the final publish step.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The install directory could not be created.
    #[error("failed to create install directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The advisory publish lock could not be taken.
    #[error("failed to lock {path}: {source}")]
    Lock {
        /// Lock file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Executable permission bits could not be applied.
    #[error("failed to mark {path} executable: {source}")]
    Permissions {
        /// Staged file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The atomic rename onto the target failed.
    #[error("failed to move verified binary onto {path}: {source}")]
    Rename {
        /// Install target path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort an install.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The host platform has no published artefact.
    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatformError),

    /// A release asset could not be downloaded.
    #[error("{source}")]
    Download {
        /// Stage in which the download failed.
        stage: InstallStage,
        /// Underlying download failure.
        #[source]
        source: DownloadError,
    },

    /// Local I/O on a staging file failed.
    #[error("could not use staging path {path}: {source}")]
    Staging {
        /// Stage in which the failure happened.
        stage: InstallStage,
        /// Staging path involved.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The checksum sidecar could not be parsed.
    #[error("{0}")]
    Checksum(#[source] ChecksumError),

    /// The downloaded binary does not match its published checksum.
    #[error("{0}")]
    Integrity(#[source] IntegrityError),

    /// The verified binary could not be published.
    #[error("{0}")]
    Publish(#[from] PublishError),
}

impl InstallError {
    /// The stage at which the install stopped.
    #[must_use]
    pub fn stage(&self) -> InstallStage {
        match self {
            Self::UnsupportedPlatform(_) => InstallStage::Resolving,
            Self::Download { stage, .. } | Self::Staging { stage, .. } => *stage,
            Self::Checksum(_) | Self::Integrity(_) => InstallStage::Verifying,
            Self::Publish(_) => InstallStage::Publishing,
        }
    }

    /// Advice shown to the user alongside the error, when any applies.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Download { source, .. } if source.is_not_found() => Some(
                "The release artefact may not be published yet. Try again in a few minutes.",
            ),
            Self::UnsupportedPlatform(_) => {
                Some("Prebuilt binaries exist for linux, macos, and windows only.")
            }
            Self::Integrity(_) => {
                Some("The download did not match its published checksum; nothing was installed.")
            }
            _ => None,
        }
    }
}

impl From<VerifyError> for InstallError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Checksum(e) => Self::Checksum(e),
            VerifyError::Integrity(e) => Self::Integrity(e),
        }
    }
}

/// Everything decided before the first network request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    /// Platform the artefact is selected for.
    pub platform: Platform,
    /// Release artefact name.
    pub artifact: ArtifactName,
    /// URLs of the artefact and its sidecar.
    pub location: ReleaseLocation,
    /// Final path of the executable.
    pub target: InstallTarget,
}

/// Outcome of a completed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Path of the installed executable.
    pub target: Utf8PathBuf,
    /// Release artefact that was installed.
    pub artifact: ArtifactName,
    /// Verified digest of the installed file.
    pub digest: Sha256Digest,
    /// URL the executable was fetched from.
    pub binary_url: String,
}

/// Resolve the platform, URLs, and install target for `config`.
///
/// Performs no network or filesystem access.
///
/// # Errors
///
/// Returns [`InstallError::UnsupportedPlatform`] when the configured or host
/// platform has no published artefact.
pub fn plan(config: &InstallConfig) -> Result<InstallPlan, InstallError> {
    let os = match config.platform.as_deref() {
        Some(os) => os,
        None => host_os(),
    };
    let platform = Platform::parse(os)?;
    let artifact = platform.artifact_name();
    let location =
        ReleaseLocation::for_release(&config.base_url, config.release.as_deref(), artifact);
    let target = InstallTarget::new(&config.prefix, platform);
    Ok(InstallPlan {
        platform,
        artifact,
        location,
        target,
    })
}

/// Install using the production HTTP fetcher.
///
/// # Errors
///
/// See [`install_with`].
pub fn install(
    config: &InstallConfig,
    progress: &mut dyn Write,
) -> Result<InstallReport, InstallError> {
    let fetcher = HttpFetcher::new(config.timeout);
    install_with(config, &fetcher, progress)
}

/// Run one install with an injected fetcher.
///
/// Progress lines are written to `progress`; pass [`std::io::sink`] to
/// suppress them.
///
/// # Errors
///
/// Returns the first failure; nothing is left in staging and the install
/// target is untouched unless the final rename succeeded.
pub fn install_with(
    config: &InstallConfig,
    fetcher: &dyn Fetcher,
    progress: &mut dyn Write,
) -> Result<InstallReport, InstallError> {
    enter(InstallStage::Resolving);
    let plan = plan(config)?;
    log::info!("resolved {} artefact {}", plan.platform, plan.artifact);

    enter(InstallStage::FetchingBinary);
    let install_dir = plan.target.install_dir();
    ensure_install_dir(install_dir).map_err(|source| InstallError::Staging {
        stage: InstallStage::FetchingBinary,
        path: install_dir.to_owned(),
        source,
    })?;
    write_stderr_line(
        progress,
        format!("Downloading {}", plan.location.binary_url()),
    );
    let binary = stage_download(
        fetcher,
        plan.location.binary_url(),
        install_dir,
        "bin",
        InstallStage::FetchingBinary,
    )?;

    enter(InstallStage::FetchingChecksum);
    let sidecar = stage_download(
        fetcher,
        plan.location.checksum_url(),
        install_dir,
        "sha256",
        InstallStage::FetchingChecksum,
    )?;

    enter(InstallStage::Verifying);
    write_stderr_line(progress, "Verifying checksum...");
    let digest = verify_staged(&binary, &sidecar)?;
    drop(sidecar);

    enter(InstallStage::Publishing);
    publish(binary, &plan.target, plan.platform)?;
    log::info!("installed {} at {}", plan.artifact, plan.target.path());

    Ok(InstallReport {
        target: plan.target.path().to_owned(),
        artifact: plan.artifact,
        digest,
        binary_url: plan.location.binary_url().to_owned(),
    })
}

fn enter(stage: InstallStage) {
    log::debug!("stage: {stage}");
}

fn ensure_install_dir(dir: &Utf8Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// Fetch `url` into a fresh staging file in `dir`.
fn stage_download(
    fetcher: &dyn Fetcher,
    url: &str,
    dir: &Utf8Path,
    kind: &str,
    stage: InstallStage,
) -> Result<StagingFile, InstallError> {
    let staged = StagingFile::create_in(dir, kind).map_err(|source| InstallError::Staging {
        stage,
        path: dir.to_owned(),
        source,
    })?;
    fetcher
        .fetch(url, staged.path().as_std_path())
        .map_err(|source| InstallError::Download { stage, source })?;
    Ok(staged)
}

/// Hash the staged binary and compare it with the staged sidecar.
fn verify_staged(
    binary: &StagingFile,
    sidecar: &StagingFile,
) -> Result<Sha256Digest, InstallError> {
    let staging_error = |path: &Utf8Path, source| InstallError::Staging {
        stage: InstallStage::Verifying,
        path: path.to_owned(),
        source,
    };
    let digest = digest_of(binary.path().as_std_path())
        .map_err(|e| staging_error(binary.path(), e))?;
    let raw = std::fs::read(sidecar.path()).map_err(|e| staging_error(sidecar.path(), e))?;
    let contents = String::from_utf8_lossy(&raw);
    verify(&digest, &contents)?;
    log::debug!("checksum verified: {digest}");
    Ok(digest)
}

/// Move a verified staging file onto the install target.
///
/// Executable bits are only applied for non-Windows targets, whatever the
/// host.
fn publish(
    binary: StagingFile,
    target: &InstallTarget,
    platform: Platform,
) -> Result<(), PublishError> {
    let dir = target.install_dir();
    std::fs::create_dir_all(dir).map_err(|source| PublishError::CreateDir {
        path: dir.to_owned(),
        source,
    })?;
    let _lock = PublishLock::acquire(dir)?;
    if !platform.is_windows() {
        set_executable(binary.path()).map_err(|source| PublishError::Permissions {
            path: binary.path().to_owned(),
            source,
        })?;
    }
    binary
        .persist(target.path())
        .map_err(|source| PublishError::Rename {
            path: target.path().to_owned(),
            source,
        })
}

#[cfg(unix)]
fn set_executable(path: &Utf8Path) -> std::io::Result<()> {
    use crate::install_target::EXECUTABLE_MODE;
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(EXECUTABLE_MODE))
}

#[cfg(not(unix))]
fn set_executable(_path: &Utf8Path) -> std::io::Result<()> {
    Ok(())
}

/// Exclusive advisory lock held for the duration of a publish.
struct PublishLock {
    file: File,
}

impl PublishLock {
    fn acquire(dir: &Utf8Path) -> Result<Self, PublishError> {
        let path = dir.join(LOCK_FILE_NAME);
        let lock_error = |source| PublishError::Lock {
            path: path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(lock_error)?;
        fs2::FileExt::lock_exclusive(&file).map_err(lock_error)?;
        log::debug!("acquired publish lock {path}");
        Ok(Self { file })
    }
}

impl Drop for PublishLock {
    fn drop(&mut self) {
        if let Err(err) = fs2::FileExt::unlock(&self.file) {
            log::warn!("could not release publish lock: {err}");
        }
    }
}

#[cfg(test)]
#[path = "install_flow_tests.rs"]
mod tests;
