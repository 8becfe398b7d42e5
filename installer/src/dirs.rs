//! Directory resolution abstraction for platform-specific paths.
//!
//! Production code uses [`SystemBaseDirs`]; tests inject their own
//! [`BaseDirs`] so defaults never depend on the machine running them.

use camino::Utf8PathBuf;

/// Environment variable naming the active Python virtual environment.
pub const VIRTUAL_ENV_VAR: &str = "VIRTUAL_ENV";

/// Source of the base directories the installer derives defaults from.
pub trait BaseDirs {
    /// The current user's home directory.
    fn home_dir(&self) -> Option<Utf8PathBuf>;

    /// Per-user configuration directory for zetten.
    fn config_dir(&self) -> Option<Utf8PathBuf>;

    /// Root of the active virtual environment, if one is activated.
    fn virtual_env(&self) -> Option<Utf8PathBuf>;
}

/// [`BaseDirs`] backed by `directories-next` and the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn home_dir(&self) -> Option<Utf8PathBuf> {
        directories_next::BaseDirs::new()
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.home_dir().to_path_buf()).ok())
    }

    fn config_dir(&self) -> Option<Utf8PathBuf> {
        directories_next::ProjectDirs::from("", "", "zetten")
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok())
    }

    fn virtual_env(&self) -> Option<Utf8PathBuf> {
        std::env::var(VIRTUAL_ENV_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(Utf8PathBuf::from)
    }
}

/// Default install prefix: the active virtual environment, else `~/.local`.
#[must_use]
pub fn default_prefix(dirs: &dyn BaseDirs) -> Option<Utf8PathBuf> {
    dirs.virtual_env()
        .or_else(|| dirs.home_dir().map(|home| home.join(".local")))
}

/// Location of the optional installer configuration file.
#[must_use]
pub fn default_config_file(dirs: &dyn BaseDirs) -> Option<Utf8PathBuf> {
    dirs.config_dir().map(|dir| dir.join("installer.toml"))
}
