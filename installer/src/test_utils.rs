//! Shared test utilities for the installer crate.

use crate::artefact::download::{DownloadError, Fetcher};
use crate::staging::is_staging_name;
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

/// Canned reply for one URL.
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// Serve these bytes.
    Body(Vec<u8>),
    /// Answer with HTTP 404.
    NotFound,
    /// Answer with another HTTP status.
    Status(u16),
}

/// A stub implementation of `Fetcher` for testing.
///
/// Serves canned responses keyed by URL and records every request, so tests
/// can assert which assets were fetched and in which order. Unknown URLs
/// answer with 404.
#[derive(Debug, Default)]
pub struct StubFetcher {
    responses: HashMap<String, StubResponse>,
    requested: RefCell<Vec<String>>,
}

impl StubFetcher {
    /// Creates a stub with no responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the response for `url`.
    #[must_use]
    pub fn with(mut self, url: impl Into<String>, response: StubResponse) -> Self {
        self.responses.insert(url.into(), response);
        self
    }

    /// Registers `body` as the content served for `url`.
    #[must_use]
    pub fn with_body(self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.with(url, StubResponse::Body(body.into()))
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Fetcher for StubFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), DownloadError> {
        self.requested.borrow_mut().push(url.to_owned());
        match self.responses.get(url) {
            Some(StubResponse::Body(bytes)) => {
                std::fs::write(destination, bytes).map_err(|source| DownloadError::Io {
                    url: url.to_owned(),
                    source,
                })
            }
            Some(StubResponse::Status(status)) => Err(DownloadError::Status {
                url: url.to_owned(),
                status: *status,
            }),
            Some(StubResponse::NotFound) | None => Err(DownloadError::NotFound {
                url: url.to_owned(),
            }),
        }
    }
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Names of staging files left in `dir`. A missing directory has none.
///
/// # Panics
///
/// Panics if `dir` exists but cannot be listed.
#[must_use]
pub fn staging_leftovers(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        if dir.exists() {
            panic!("could not list {}", dir.display());
        }
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_staging_name(name))
        .collect()
}
