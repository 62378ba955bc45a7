//! WAR source acquisition.
//!
//! A source is either an HTTP(S) URL or a local path. Either way, the bytes
//! end up at the output path, written through a sibling temporary file so an
//! interrupted download never leaves a partial WAR behind.

use crate::download::{DownloadError, Downloader};
use crate::repack::sibling_temp_file;
use log::info;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Prefix that marks a source as remote.
const REMOTE_PREFIX: &str = "http";

/// Where the WAR to patch comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarSource {
    /// Fetched over HTTP(S).
    Remote(String),
    /// Copied from the local filesystem.
    Local(PathBuf),
}

impl WarSource {
    /// Classify a command-line source argument.
    ///
    /// Anything starting with `http` is treated as a URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use warpatch::source::WarSource;
    ///
    /// assert!(matches!(WarSource::parse("https://host/app.war"), WarSource::Remote(_)));
    /// assert!(matches!(WarSource::parse("target/app.war"), WarSource::Local(_)));
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.starts_with(REMOTE_PREFIX) {
            Self::Remote(value.to_owned())
        } else {
            Self::Local(PathBuf::from(value))
        }
    }
}

impl fmt::Display for WarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Errors arising while acquiring the WAR.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    /// The remote WAR could not be downloaded.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The local WAR could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// The local source path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The acquired copy could not be written.
    #[error("cannot write {path}: {source}")]
    Write {
        /// The output path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Copy or download `source` to `output`, returning the output path.
///
/// # Errors
///
/// Returns [`AcquisitionError`] when the download, the read of the local
/// file, or the write of the copy fails.
pub fn acquire_war(
    source: &WarSource,
    output: &Path,
    downloader: &dyn Downloader,
) -> Result<PathBuf, AcquisitionError> {
    let write_error = |err: std::io::Error| AcquisitionError::Write {
        path: output.to_path_buf(),
        source: err,
    };

    let mut temp = sibling_temp_file(output).map_err(write_error)?;
    match source {
        WarSource::Remote(url) => {
            info!("downloading WAR from {url}");
            downloader.download_war(url, temp.path())?;
        }
        WarSource::Local(path) => {
            info!("copying WAR from {}", path.display());
            let read_error = |err: std::io::Error| AcquisitionError::Read {
                path: path.clone(),
                source: err,
            };
            let mut input = File::open(path).map_err(read_error)?;
            if !input.metadata().map_err(read_error)?.is_file() {
                return Err(read_error(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a regular file",
                )));
            }
            std::io::copy(&mut input, temp.as_file_mut()).map_err(write_error)?;
        }
    }

    temp.persist(output).map_err(|e| write_error(e.error))?;
    Ok(output.to_path_buf())
}
