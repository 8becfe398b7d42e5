//! HTTP retrieval of release assets into local staging files.
//!
//! Provides a trait-based abstraction over the transport so the install flow
//! can be exercised in tests without network access.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

/// Identifying `User-Agent` sent with every request.
///
/// Some release hosts answer anonymous clients with spurious 403/404
/// responses, so the header is mandatory.
pub const USER_AGENT: &str = concat!("zetten-installer/", env!("CARGO_PKG_VERSION"));

/// Size of each chunk copied from the response body to disk.
const CHUNK_SIZE: usize = 64 * 1024;

/// Trait for fetching a remote resource into a local file.
///
/// # Examples
///
/// ```
/// use zetten_installer::artefact::download::HttpFetcher;
///
/// let fetcher = HttpFetcher::new(None);
/// // Use fetcher.fetch(url, staging_path) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait Fetcher {
    /// Download `url` into `destination`, creating or truncating the file.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-2xx response, transport failure, or I/O
    /// failure while writing.
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from fetching a release asset.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The host answered 404.
    #[error("artefact not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The host answered with another non-success status.
    #[error("download failed for {url}: HTTP status {status}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code received.
        status: u16,
    },

    /// The request failed before a status was received, or the body stream
    /// broke off.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// Writing the response body to disk failed.
    #[error("I/O error writing download from {url}: {source}")]
    Io {
        /// The URL being written.
        url: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// The URL the failed request targeted.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::NotFound { url }
            | Self::Status { url, .. }
            | Self::Http { url, .. }
            | Self::Io { url, .. } => url,
        }
    }

    /// Whether the failure looks like an artefact that is not published yet.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// HTTP fetcher backed by a `ureq` agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Build a fetcher with an optional overall per-request timeout.
    ///
    /// `None` leaves requests unbounded.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), DownloadError> {
        log::debug!("GET {url} -> {}", destination.display());
        let response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut body = response.into_body();
        let written = stream_to_file(url, &mut body.as_reader(), destination)?;
        log::debug!("fetched {written} bytes from {url}");
        Ok(())
    }
}

/// Copy `reader` into `destination` in bounded chunks and flush to disk.
fn stream_to_file(
    url: &str,
    reader: &mut dyn Read,
    destination: &Path,
) -> Result<u64, DownloadError> {
    let io_error = |source| DownloadError::Io {
        url: url.to_owned(),
        source,
    };
    let mut file = File::create(destination).map_err(io_error)?;
    let mut buffer = vec![0_u8; CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(DownloadError::Http {
                    url: url.to_owned(),
                    reason: format!("response body interrupted: {e}"),
                });
            }
        };
        let chunk = buffer.get(..read).unwrap_or_default();
        file.write_all(chunk).map_err(io_error)?;
        total = total.saturating_add(read as u64);
    }
    file.flush().map_err(io_error)?;
    file.sync_all().map_err(io_error)?;
    Ok(total)
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::StatusCode(status) => DownloadError::Status {
            url: url.to_owned(),
            status: *status,
        },
        other => DownloadError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
