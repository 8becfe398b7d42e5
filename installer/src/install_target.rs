//! Final install location of the zetten executable.
//!
//! Layout follows the environment conventions of each platform family:
//! `<prefix>/Scripts/zetten.exe` on Windows and `<prefix>/bin/zetten`
//! elsewhere.

use crate::artefact::platform::{BINARY_STEM, Platform};
use camino::{Utf8Path, Utf8PathBuf};

/// Permission bits applied to the executable on Unix-like hosts.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// The path an installed executable must end up at.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use zetten_installer::artefact::platform::Platform;
/// use zetten_installer::install_target::InstallTarget;
///
/// let target = InstallTarget::new(Utf8Path::new("/opt/venv"), Platform::Linux);
/// assert!(target.path().ends_with("bin/zetten"));
/// assert!(target.install_dir().ends_with("venv/bin"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    install_dir: Utf8PathBuf,
    path: Utf8PathBuf,
}

impl InstallTarget {
    /// Lay out the target under `prefix` for `platform`.
    #[must_use]
    pub fn new(prefix: &Utf8Path, platform: Platform) -> Self {
        let (dir_name, file_name) = if platform.is_windows() {
            ("Scripts", format!("{BINARY_STEM}.exe"))
        } else {
            ("bin", BINARY_STEM.to_owned())
        };
        let install_dir = prefix.join(dir_name);
        let path = install_dir.join(file_name);
        Self { install_dir, path }
    }

    /// Full path of the installed executable.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Directory holding the executable and its staging files.
    #[must_use]
    pub fn install_dir(&self) -> &Utf8Path {
        &self.install_dir
    }
}
