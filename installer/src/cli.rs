//! CLI argument definitions for the zetten installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::config::ConfigOverrides;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Install the prebuilt zetten binary.
#[derive(Parser, Debug)]
#[command(name = "zetten-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install the prebuilt zetten binary.\n\n",
    "The installer picks the release artefact for this platform, downloads it ",
    "together with its .sha256 checksum, verifies the SHA-256 digest, and only ",
    "then moves the binary into place with a single atomic rename. A failed ",
    "run never leaves a partial or unverified executable behind.\n\n",
    "The binary is installed to <prefix>/bin/zetten, or <prefix>\\Scripts\\zetten.exe ",
    "on Windows. The prefix defaults to the active virtual environment, then ~/.local.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install the latest release:\n",
    "    $ zetten-installer\n\n",
    "  Install a pinned release into a custom prefix:\n",
    "    $ zetten-installer --release v1.0.1 --prefix /opt/zetten\n\n",
    "  Show what would be downloaded:\n",
    "    $ zetten-installer --dry-run\n\n",
    "  Print the install path:\n",
    "    $ zetten-installer path\n\n",
    "For more information, see: https://github.com/amit-devb/zetten",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Install arguments (used when no subcommand is given).
    #[command(flatten)]
    pub install: InstallArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Download, verify, and install the binary (default).
    Install(InstallArgs),

    /// Print the path the binary is (or would be) installed at.
    Path(PathArgs),
}

/// Arguments for the install command.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Installation prefix [default: $VIRTUAL_ENV, then ~/.local].
    #[arg(short, long, value_name = "DIR")]
    pub prefix: Option<Utf8PathBuf>,

    /// Release host base URL.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Install a tagged release instead of the latest one.
    #[arg(short, long, value_name = "TAG")]
    pub release: Option<String>,

    /// Override the detected operating system (linux, macos, windows).
    #[arg(long, value_name = "OS")]
    pub platform: Option<String>,

    /// Network timeout per request, in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Configuration file [default: platform config directory].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Show the resolved artefact and paths without downloading.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase diagnostic output (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Arguments for the path command.
#[derive(Parser, Debug, Clone, Default)]
pub struct PathArgs {
    /// Installation prefix [default: $VIRTUAL_ENV, then ~/.local].
    #[arg(short, long, value_name = "DIR")]
    pub prefix: Option<Utf8PathBuf>,

    /// Override the detected operating system (linux, macos, windows).
    #[arg(long, value_name = "OS")]
    pub platform: Option<String>,

    /// Configuration file [default: platform config directory].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,
}

impl InstallArgs {
    /// Command-line values that override the configuration file.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            prefix: self.prefix.clone(),
            platform: self.platform.clone(),
            release: self.release.clone(),
            timeout_secs: self.timeout,
        }
    }
}

impl PathArgs {
    /// Command-line values that override the configuration file.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            prefix: self.prefix.clone(),
            platform: self.platform.clone(),
            ..ConfigOverrides::default()
        }
    }
}

impl Cli {
    /// Returns the effective install arguments.
    ///
    /// If an `Install` subcommand was provided, returns those arguments.
    /// Otherwise returns the flattened install arguments.
    #[must_use]
    pub fn install_args(&self) -> &InstallArgs {
        match &self.command {
            Some(Command::Install(args)) => args,
            Some(Command::Path(_)) | None => &self.install,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
