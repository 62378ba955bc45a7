//! HTTP download capability for WAR sources and repository JARs.
//!
//! Provides a trait-based abstraction over the two network fetches the
//! patcher performs, so the pipeline can be exercised with fixtures instead
//! of real network access.

use crate::coordinate::LibraryCoordinate;
use crate::repository::RepositoryUrl;
use log::debug;
use std::path::Path;
use std::time::Duration;

/// Default network timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Network timeout applied to every request unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Trait for fetching remote files onto local disk.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use warpatch::download::HttpDownloader;
/// use warpatch::repository::RepositoryUrl;
///
/// let downloader = HttpDownloader::new(RepositoryUrl::default(), Duration::from_secs(30));
/// // Use downloader.download_library(&coordinate, dest) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait Downloader {
    /// Download the WAR at `url` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file cannot be written.
    fn download_war(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;

    /// Download the JAR identified by `coordinate` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file cannot be written.
    fn download_library(
        &self,
        coordinate: &LibraryCoordinate,
        dest: &Path,
    ) -> Result<(), DownloadError>;
}

/// Errors arising from download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested file was not found (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based downloader using `ureq`.
pub struct HttpDownloader {
    agent: ureq::Agent,
    repository: RepositoryUrl,
}

impl HttpDownloader {
    /// Create a downloader resolving libraries against `repository`.
    #[must_use]
    pub fn new(repository: RepositoryUrl, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            repository,
        }
    }

    /// Download a URL and write the body to a file.
    fn download_to_file(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        debug!("GET {url} -> {}", dest.display());
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        let written = std::io::copy(&mut response.into_body().as_reader(), &mut file)
            .map_err(DownloadError::Io)?;
        debug!("wrote {written} bytes to {}", dest.display());
        Ok(())
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new(RepositoryUrl::default(), DEFAULT_TIMEOUT)
    }
}

impl Downloader for HttpDownloader {
    fn download_war(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        self.download_to_file(url, dest)
    }

    fn download_library(
        &self,
        coordinate: &LibraryCoordinate,
        dest: &Path,
    ) -> Result<(), DownloadError> {
        let url = coordinate.artifact_url(&self.repository);
        self.download_to_file(&url, dest)
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
