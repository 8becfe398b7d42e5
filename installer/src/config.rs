//! Installer configuration.
//!
//! [`InstallConfig`] is the only input the install flow reads. It is built
//! from three layers, later layers winning: built-in defaults, an optional
//! TOML file, and command-line overrides.
//!
//! ```toml
//! base-url = "https://github.com/amit-devb/zetten/releases"
//! prefix = "/opt/zetten"
//! release = "v1.0.1"
//! platform = "linux"
//! timeout-secs = 60
//! ```

use crate::artefact::release::DEFAULT_BASE_URL;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Explicit settings for one install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    /// Release host base URL.
    pub base_url: String,
    /// Absolute install prefix; the binary lands in `bin/` or `Scripts/` below it.
    pub prefix: Utf8PathBuf,
    /// Platform identifier overriding host detection.
    pub platform: Option<String>,
    /// Release tag to install instead of the latest release.
    pub release: Option<String>,
    /// Per-request network timeout; `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl InstallConfig {
    /// Defaults for `prefix`: latest release from the default host.
    #[must_use]
    pub fn new(prefix: Utf8PathBuf) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            prefix,
            platform: None,
            release: None,
            timeout: None,
        }
    }
}

/// Errors raised while assembling an [`InstallConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path of the file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid config file {path}: {reason}")]
    Parse {
        /// Path of the file.
        path: Utf8PathBuf,
        /// Parser message.
        reason: String,
    },

    /// No prefix was configured and none could be derived.
    #[error("could not determine an install prefix; pass --prefix or activate a virtual environment")]
    MissingPrefix,

    /// The prefix could not be made absolute.
    #[error("invalid install prefix {path}: {reason}")]
    InvalidPrefix {
        /// The configured prefix.
        path: Utf8PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// The base URL is not an HTTP(S) URL.
    #[error("invalid base URL \"{url}\": expected http:// or https://")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
    },
}

/// Settings read from a TOML configuration file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ConfigFile {
    /// Release host base URL.
    pub base_url: Option<String>,
    /// Install prefix.
    pub prefix: Option<String>,
    /// Platform override.
    pub platform: Option<String>,
    /// Release tag.
    pub release: Option<String>,
    /// Network timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Parse TOML `contents` read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn parse(path: &Utf8Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Load a configuration file that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, or
    /// [`ConfigError::Parse`] when it is invalid.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    /// Load a configuration file, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// As [`ConfigFile::load`], except for a missing file.
    pub fn load_optional(path: &Utf8Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::debug!("no config file at {path}");
                Ok(Self::default())
            }
            other => other,
        }
    }
}

/// Values supplied on the command line. `None` keeps the lower layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Release host base URL.
    pub base_url: Option<String>,
    /// Install prefix.
    pub prefix: Option<Utf8PathBuf>,
    /// Platform override.
    pub platform: Option<String>,
    /// Release tag.
    pub release: Option<String>,
    /// Network timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Merge defaults, `file`, and `overrides` into an [`InstallConfig`].
///
/// `default_prefix` is used only when neither layer names a prefix. The
/// resulting prefix is made absolute against the current directory.
///
/// # Errors
///
/// Returns [`ConfigError::MissingPrefix`] when no prefix is available,
/// [`ConfigError::InvalidPrefix`] when it cannot be made absolute, and
/// [`ConfigError::InvalidBaseUrl`] for a non-HTTP base URL.
pub fn resolve_config(
    file: ConfigFile,
    overrides: ConfigOverrides,
    default_prefix: Option<Utf8PathBuf>,
) -> Result<InstallConfig, ConfigError> {
    let prefix = overrides
        .prefix
        .or_else(|| file.prefix.map(Utf8PathBuf::from))
        .or(default_prefix)
        .ok_or(ConfigError::MissingPrefix)?;
    let base_url = overrides
        .base_url
        .or(file.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        return Err(ConfigError::InvalidBaseUrl { url: base_url });
    }

    Ok(InstallConfig {
        base_url,
        prefix: absolute_prefix(prefix)?,
        platform: overrides.platform.or(file.platform),
        release: overrides.release.or(file.release),
        timeout: overrides
            .timeout_secs
            .or(file.timeout_secs)
            .map(Duration::from_secs),
    })
}

fn absolute_prefix(prefix: Utf8PathBuf) -> Result<Utf8PathBuf, ConfigError> {
    if prefix.is_absolute() {
        return Ok(prefix);
    }
    let absolute =
        std::path::absolute(prefix.as_std_path()).map_err(|e| ConfigError::InvalidPrefix {
            path: prefix.clone(),
            reason: e.to_string(),
        })?;
    Utf8PathBuf::from_path_buf(absolute).map_err(|p| ConfigError::InvalidPrefix {
        path: prefix,
        reason: format!("{} is not valid UTF-8", p.display()),
    })
}
