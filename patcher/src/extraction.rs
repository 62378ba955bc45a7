//! WAR extraction into a private temporary directory.
//!
//! Unpacks the zip container entry by entry, preserving declared unix modes,
//! with path traversal protection to prevent zip-slip attacks.

use log::{debug, trace};
use std::fs::{self, File, OpenOptions};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

/// Prefix of every extraction directory.
const EXTRACTION_PREFIX: &str = "unzipped-war-";

/// Errors arising from WAR extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is not a readable zip archive.
    #[error("malformed archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: String,
    },
}

/// An unpacked WAR whose directory is removed on drop.
#[derive(Debug)]
pub struct ExtractedWar {
    dir: TempDir,
    entries: usize,
}

impl ExtractedWar {
    /// Return the extraction root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Return the number of archive entries that were unpacked.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.entries
    }
}

/// Unpack the WAR at `war_path` into a fresh temporary directory.
///
/// # Errors
///
/// Returns [`ExtractionError`] if the archive is malformed, an entry escapes
/// the extraction root, or a file cannot be written. Anything already
/// extracted is removed with the directory.
pub fn unpack_war(war_path: &Path) -> Result<ExtractedWar, ExtractionError> {
    let dir = tempfile::Builder::new()
        .prefix(EXTRACTION_PREFIX)
        .tempdir()?;
    let entries = extract_into(war_path, dir.path())?;
    debug!(
        "unpacked {entries} entries from {} into {}",
        war_path.display(),
        dir.path().display()
    );
    Ok(ExtractedWar { dir, entries })
}

/// Extract every entry of the zip at `archive_path` below `dest_dir`.
///
/// Returns the number of entries processed.
///
/// # Errors
///
/// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
/// escape `dest_dir`, [`ExtractionError::Zip`] for malformed archives and
/// [`ExtractionError::Io`] on I/O failures.
pub fn extract_into(archive_path: &Path, dest_dir: &Path) -> Result<usize, ExtractionError> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let entry_path = validate_entry_path(entry.name())?;
        let dest_path = dest_dir.join(&entry_path);

        if entry.is_dir() {
            trace!("creating directory {}", entry_path.display());
            fs::create_dir_all(&dest_path)?;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }
        trace!("extracting {}", entry_path.display());
        let mut out = create_with_mode(&dest_path, entry.unix_mode())?;
        std::io::copy(&mut entry, &mut out)?;
    }

    Ok(archive.len())
}

/// Create (or truncate) `path`, applying the entry's declared mode.
fn create_with_mode(path: &Path, mode: Option<u32>) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    apply_mode(&mut options, mode);
    options.open(path)
}

#[cfg(unix)]
fn apply_mode(options: &mut OpenOptions, mode: Option<u32>) {
    use std::os::unix::fs::OpenOptionsExt;

    if let Some(mode) = mode {
        // Owner write stays set so a later stage can overwrite the file.
        options.mode((mode & 0o7777) | 0o200);
    }
}

#[cfg(not(unix))]
fn apply_mode(_options: &mut OpenOptions, _mode: Option<u32>) {}

/// Validate that an entry name does not escape the destination directory
/// via `..` components, absolute paths or drive prefixes.
fn validate_entry_path(name: &str) -> Result<PathBuf, ExtractionError> {
    let path = Path::new(name);
    let escapes = path.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || name.starts_with('/') || name.starts_with('\\') {
        return Err(ExtractionError::PathTraversal {
            path: name.to_owned(),
        });
    }
    Ok(path.to_path_buf())
}
