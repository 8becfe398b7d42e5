//! Error types for the zetten installer CLI.
//!
//! Wraps the per-stage errors so the binary can report one diagnostic, plus
//! a recovery hint where one applies, and exit non-zero.

use crate::config::ConfigError;
use crate::install_flow::InstallError;
use thiserror::Error;

/// Errors that can end an installer run.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// Configuration could not be assembled.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The install itself failed.
    #[error("install failed while {}: {source}", .source.stage())]
    Install {
        /// The underlying install failure.
        #[from]
        source: InstallError,
    },

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl InstallerError {
    /// Recovery advice for the user, when any applies.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Install { source } => source.hint(),
            Self::Config(ConfigError::MissingPrefix) => {
                Some("Set `prefix` in the config file or pass --prefix <DIR>.")
            }
            Self::Config(_) | Self::WriteFailed { .. } => None,
        }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
