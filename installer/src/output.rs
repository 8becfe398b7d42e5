//! Output formatting for the installer CLI.
//!
//! User-facing progress is written as plain lines to stderr. This module
//! also builds the shell snippets shown when the install directory is not on
//! `PATH`, and the dry-run summary.

use crate::install_flow::{InstallPlan, InstallReport};
use camino::Utf8Path;
use std::ffi::OsStr;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Shell configuration snippets that add a directory to `PATH`.
#[derive(Debug, Clone)]
pub struct PathSnippet {
    /// Export line for bash/zsh.
    pub bash: String,
    /// Line for fish shell.
    pub fish: String,
    /// Line for PowerShell.
    pub powershell: String,
}

impl PathSnippet {
    /// Create snippets for `bin_dir`.
    ///
    /// # Example
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use zetten_installer::output::PathSnippet;
    ///
    /// let snippet = PathSnippet::new(&Utf8PathBuf::from("/home/user/.local/bin"));
    /// assert!(snippet.bash.contains("PATH"));
    /// ```
    #[must_use]
    pub fn new(bin_dir: &Utf8Path) -> Self {
        Self {
            bash: format!("export PATH=\"{bin_dir}:$PATH\""),
            fish: format!("fish_add_path \"{bin_dir}\""),
            powershell: format!("$env:Path = \"{bin_dir};$env:Path\""),
        }
    }

    /// Format the snippet for display to the user.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!(
            concat!(
                "Add the install directory to your PATH:\n\n",
                "  # bash/zsh (~/.bashrc, ~/.zshrc)\n",
                "  {}\n\n",
                "  # fish (~/.config/fish/config.fish)\n",
                "  {}\n\n",
                "  # PowerShell ($PROFILE)\n",
                "  {}"
            ),
            self.bash, self.fish, self.powershell
        )
    }
}

/// Return whether `dir` appears in the `PATH`-style list `path_var`.
#[must_use]
pub fn is_on_path(dir: &Utf8Path, path_var: Option<&OsStr>) -> bool {
    path_var.is_some_and(|paths| {
        std::env::split_paths(paths).any(|entry| entry.as_path() == dir.as_std_path())
    })
}

/// Format the success message after installation.
#[must_use]
pub fn success_message(report: &InstallReport) -> String {
    format!(
        "Installed {} to {} (sha256 {})",
        report.artifact, report.target, report.digest
    )
}

/// Format the dry-run summary for a resolved plan.
#[must_use]
pub fn dry_run_text(plan: &InstallPlan) -> String {
    [
        "Dry run - no files will be modified".to_owned(),
        String::new(),
        format!("Platform: {}", plan.platform),
        format!("Artifact: {}", plan.artifact),
        format!("Binary URL: {}", plan.location.binary_url()),
        format!("Checksum URL: {}", plan.location.checksum_url()),
        format!("Install target: {}", plan.target.path()),
    ]
    .join("\n")
}
