//! Library replacement inside an extracted WAR.
//!
//! Each coordinate's JAR is downloaded to a private scratch directory, then
//! copied to `WEB-INF/lib/<artifact>-<version>.jar`, overwriting a file of
//! the same name. Older versions of the artifact stay in place unless
//! pruning is requested.

use crate::coordinate::{CoordinateError, LibraryCoordinate};
use crate::download::{DownloadError, Downloader};
use log::{debug, info};
use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

/// Library directory of a WAR, relative to its root.
pub const LIBRARY_DIR: &str = "WEB-INF/lib";

/// Errors arising while replacing a single library.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// The coordinate string is malformed.
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),

    /// The JAR could not be downloaded.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The derived JAR filename is not a single path component.
    #[error("unsafe library filename \"{name}\"")]
    UnsafeFileName {
        /// The rejected filename.
        name: String,
    },

    /// The scratch directory could not be created.
    #[error("cannot create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    /// The JAR could not be written into the library directory.
    #[error("cannot write {path}: {source}")]
    Write {
        /// The destination path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An older version could not be removed.
    #[error("cannot remove {path}: {source}")]
    Prune {
        /// The file that could not be removed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Options controlling how a library is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOptions {
    /// Remove other versions of the same artifact from the library directory.
    pub prune_old: bool,
}

/// The outcome of placing one library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacedLibrary {
    /// The coordinate that was placed.
    pub coordinate: LibraryCoordinate,
    /// Where the JAR now lives inside the extraction directory.
    pub destination: PathBuf,
    /// Whether a file of the same name was overwritten.
    pub overwritten: bool,
    /// Filenames of older versions removed by pruning.
    pub pruned: Vec<String>,
}

/// A downloaded JAR that is deleted, with its directory, when dropped.
struct ScratchJar {
    _dir: TempDir,
    path: PathBuf,
}

impl ScratchJar {
    fn fetch(
        coordinate: &LibraryCoordinate,
        file_name: &str,
        downloader: &dyn Downloader,
    ) -> Result<Self, LibraryError> {
        let dir = tempfile::Builder::new()
            .prefix("warpatch-")
            .tempdir()
            .map_err(LibraryError::Scratch)?;
        let path = dir.path().join(file_name);
        downloader.download_library(coordinate, &path)?;
        Ok(Self { _dir: dir, path })
    }
}

/// Download `coordinate` and place it in the library directory below `root`.
///
/// # Errors
///
/// Returns [`LibraryError`] if the filename is unsafe, the download fails,
/// pruning fails, or the JAR cannot be written.
pub fn replace_library(
    root: &Path,
    coordinate: &LibraryCoordinate,
    downloader: &dyn Downloader,
    options: ReplaceOptions,
) -> Result<ReplacedLibrary, LibraryError> {
    let file_name = coordinate.jar_filename();
    validate_file_name(&file_name)?;

    let scratch = ScratchJar::fetch(coordinate, &file_name, downloader)?;

    let lib_dir = root.join(LIBRARY_DIR);
    fs::create_dir_all(&lib_dir).map_err(|e| LibraryError::Write {
        path: lib_dir.clone(),
        source: e,
    })?;

    let pruned = if options.prune_old {
        prune_old_versions(&lib_dir, coordinate.artifact(), &file_name)?
    } else {
        Vec::new()
    };

    let destination = lib_dir.join(&file_name);
    let overwritten = destination.exists();
    copy_jar(&scratch.path, &destination)?;
    drop(scratch);

    if overwritten {
        info!("replaced {}", destination.display());
    } else {
        info!("added {}", destination.display());
    }

    Ok(ReplacedLibrary {
        coordinate: coordinate.clone(),
        destination,
        overwritten,
        pruned,
    })
}

fn copy_jar(source: &Path, destination: &Path) -> Result<(), LibraryError> {
    let write_error = |err: std::io::Error| LibraryError::Write {
        path: destination.to_path_buf(),
        source: err,
    };
    let mut input = File::open(source).map_err(write_error)?;
    let mut output = File::create(destination).map_err(write_error)?;
    let copied = std::io::copy(&mut input, &mut output).map_err(write_error)?;
    debug!("copied {copied} bytes to {}", destination.display());
    Ok(())
}

/// Reject filenames that would resolve outside the library directory.
fn validate_file_name(name: &str) -> Result<(), LibraryError> {
    let mut components = Path::new(name).components();
    let first = components.next();
    let rest = components.next();
    if !matches!((first, rest), (Some(Component::Normal(_)), None)) || name.contains('\\') {
        return Err(LibraryError::UnsafeFileName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Remove `<artifact>-<version>.jar` files other than `keep`.
///
/// Only names whose version part starts with a digit match, so
/// `lib-utils-1.0.jar` is not mistaken for a version of `lib`.
fn prune_old_versions(
    lib_dir: &Path,
    artifact: &str,
    keep: &str,
) -> Result<Vec<String>, LibraryError> {
    let read_error = |err: std::io::Error| LibraryError::Prune {
        path: lib_dir.to_path_buf(),
        source: err,
    };

    let mut pruned = Vec::new();
    for entry in fs::read_dir(lib_dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if name == keep || !is_version_of(&name, artifact) {
            continue;
        }
        let path = entry.path();
        fs::remove_file(&path).map_err(|e| LibraryError::Prune {
            path: path.clone(),
            source: e,
        })?;
        info!("pruned {}", path.display());
        pruned.push(name);
    }
    pruned.sort();
    Ok(pruned)
}

fn is_version_of(file_name: &str, artifact: &str) -> bool {
    file_name
        .strip_prefix(artifact)
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|rest| rest.strip_suffix(".jar"))
        .and_then(|version| version.chars().next())
        .is_some_and(|first| first.is_ascii_digit())
}
