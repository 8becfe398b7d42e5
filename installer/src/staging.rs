//! Scoped staging files for in-progress downloads.
//!
//! Each [`StagingFile`] owns one temporary file in the install directory.
//! Dropping it deletes the file; [`StagingFile::persist`] instead renames it
//! onto its final path, transferring ownership. Because staging files live
//! next to the install target, the final rename never crosses a filesystem
//! boundary.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempPath;

/// Prefix shared by every staging file name.
pub const STAGING_PREFIX: &str = ".zetten-";

/// Suffix marking a file as an incomplete download.
pub const STAGING_SUFFIX: &str = ".partial";

/// A temporary file removed on drop unless persisted.
#[derive(Debug)]
pub struct StagingFile {
    path: Utf8PathBuf,
    guard: Option<TempPath>,
}

impl StagingFile {
    /// Create an empty staging file in `dir` with a fresh random name.
    ///
    /// `kind` is folded into the name (for example `bin` or `sha256`) so
    /// orphaned files are recognisable.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while creating the file.
    pub fn create_in(dir: &Utf8Path, kind: &str) -> std::io::Result<Self> {
        let suffix = format!(".{kind}{STAGING_SUFFIX}");
        let file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(&suffix)
            .tempfile_in(dir)?;
        let guard = file.into_temp_path();
        // The name is built from ASCII parts inside a UTF-8 directory.
        let path = Utf8PathBuf::from_path_buf(guard.to_path_buf()).map_err(|path| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("staging path {} is not valid UTF-8", path.display()),
            )
        })?;
        Ok(Self {
            path,
            guard: Some(guard),
        })
    }

    /// Path of the staging file on disk.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Atomically rename the staging file onto `target`, replacing any
    /// existing file there.
    ///
    /// On failure the staging file is still removed when `self` drops.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised by the rename.
    pub fn persist(mut self, target: &Utf8Path) -> std::io::Result<()> {
        let Some(guard) = self.guard.take() else {
            return Ok(());
        };
        match guard.persist(target) {
            Ok(()) => {
                log::debug!("published {} to {target}", self.path);
                Ok(())
            }
            Err(err) => {
                self.guard = Some(err.path);
                Err(err.error)
            }
        }
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        let Some(guard) = self.guard.take() else {
            return;
        };
        match guard.close() {
            Ok(()) => log::debug!("removed staging file {}", self.path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => log::warn!("could not remove staging file {}: {err}", self.path),
        }
    }
}

/// Return whether `name` looks like a staging file created by this module.
#[must_use]
pub fn is_staging_name(name: &str) -> bool {
    name.starts_with(STAGING_PREFIX) && name.ends_with(STAGING_SUFFIX)
}
