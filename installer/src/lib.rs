//! Zetten installer library.
//!
//! This crate downloads the prebuilt zetten executable for the host platform,
//! verifies it against its published SHA-256 checksum, and installs it with a
//! single atomic rename. It is used by the `zetten-installer` CLI binary and
//! can be consumed programmatically, for example by a benchmark harness that
//! needs a verified binary on disk.
//!
//! # Modules
//!
//! - [`artefact`] - Release artefact naming, download, and verification
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Layered installer configuration
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Top-level error type with recovery hints
//! - [`install_flow`] - Install orchestration from platform to published binary
//! - [`install_target`] - Final location of the installed executable
//! - [`logging`] - Diagnostic logging to stderr
//! - [`output`] - User-facing progress and shell snippet formatting
//! - [`staging`] - Scoped staging files beside the install target

pub mod artefact;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod install_flow;
pub mod install_target;
pub mod logging;
pub mod output;
pub mod staging;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
