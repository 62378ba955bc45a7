//! Error types for a patch run.
//!
//! Each pipeline stage has its own error enum; [`PatchError`] wraps them and
//! names the stage that failed so the CLI can report
//! `Error <stage>: <message>`.

use crate::extraction::ExtractionError;
use crate::library::LibraryError;
use crate::repack::RepackError;
use crate::source::AcquisitionError;
use std::fmt;
use thiserror::Error;

/// The pipeline stage an error occurred in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Downloading or copying the WAR.
    Acquisition,
    /// Extracting the WAR.
    Unpack,
    /// Placing the library with the given coordinate string.
    Library(String),
    /// Rebuilding the WAR.
    Repack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquisition => f.write_str("handling WAR file"),
            Self::Unpack => f.write_str("unzipping WAR file"),
            Self::Library(coordinate) => write!(f, "processing library '{coordinate}'"),
            Self::Repack => f.write_str("rezipping WAR file"),
        }
    }
}

/// Errors that can end a patch run.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The WAR could not be acquired.
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    /// The WAR could not be unpacked.
    #[error(transparent)]
    Unpack(#[from] ExtractionError),

    /// A library could not be placed.
    #[error("{source}")]
    Library {
        /// The coordinate string as given on the command line.
        coordinate: String,
        /// The underlying failure.
        #[source]
        source: LibraryError,
    },

    /// The WAR could not be rebuilt.
    #[error(transparent)]
    Repack(#[from] RepackError),
}

impl PatchError {
    /// Return the stage this error occurred in.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Acquisition(_) => Stage::Acquisition,
            Self::Unpack(_) => Stage::Unpack,
            Self::Library { coordinate, .. } => Stage::Library(coordinate.clone()),
            Self::Repack(_) => Stage::Repack,
        }
    }
}

/// Result type alias using [`PatchError`].
pub type Result<T> = std::result::Result<T, PatchError>;
