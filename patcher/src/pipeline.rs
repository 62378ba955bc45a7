//! Patch pipeline orchestration.
//!
//! Runs acquire → unpack → replace → repack strictly in order, stopping at
//! the first failure. The extraction directory is removed when the run ends,
//! whichever way it ends.

use crate::coordinate::LibraryCoordinate;
use crate::download::{Downloader, HttpDownloader};
use crate::error::{PatchError, Result};
use crate::extraction::unpack_war;
use crate::library::{LibraryError, ReplaceOptions, ReplacedLibrary, replace_library};
use crate::output::{success_message, write_stderr_line};
use crate::repack::repack_war;
use crate::repository::RepositoryUrl;
use crate::source::{WarSource, acquire_war};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default output path of the patched WAR.
pub const DEFAULT_OUTPUT: &str = "new.war";

/// Configuration for one patch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchConfig {
    /// Where the WAR comes from.
    pub source: WarSource,
    /// Coordinate strings, in the order they are applied.
    pub libraries: Vec<String>,
    /// Path the acquired and patched WAR is written to.
    pub output: PathBuf,
    /// Repository coordinates are resolved against.
    pub repository: RepositoryUrl,
    /// Timeout applied to each HTTP request.
    pub timeout: Duration,
    /// Library placement options.
    pub replace: ReplaceOptions,
    /// When true, suppress progress output.
    pub quiet: bool,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    /// Path of the patched WAR.
    pub output: PathBuf,
    /// Number of entries read from the original WAR.
    pub unpacked_entries: usize,
    /// Libraries placed, in order.
    pub libraries: Vec<ReplacedLibrary>,
    /// Number of entries written to the patched WAR.
    pub repacked_entries: usize,
}

/// Run the pipeline with the production HTTP downloader.
///
/// # Errors
///
/// Returns the first [`PatchError`] raised by any stage.
pub fn patch_war(config: &PatchConfig, stderr: &mut dyn Write) -> Result<PatchReport> {
    let downloader = HttpDownloader::new(config.repository.clone(), config.timeout);
    run_pipeline(config, &downloader, stderr)
}

/// Testable inner function with an injected downloader.
///
/// [`patch_war`] delegates here with the HTTP implementation; tests inject
/// fixtures. The repository and timeout in `config` are the downloader's
/// concern and are not read here.
///
/// # Errors
///
/// Returns the first [`PatchError`] raised by any stage.
pub fn run_pipeline(
    config: &PatchConfig,
    downloader: &dyn Downloader,
    stderr: &mut dyn Write,
) -> Result<PatchReport> {
    // Step 1: Acquire the WAR.
    let message = format!("Fetching WAR from {}...", config.source);
    progress(config, stderr, message);
    let war_path = acquire_war(&config.source, &config.output, downloader)?;

    // Step 2: Unpack into a private directory, removed on drop.
    let message = format!("Unpacking {}...", war_path.display());
    progress(config, stderr, message);
    let extracted = unpack_war(&war_path)?;

    // Step 3: Place each library, stopping at the first failure.
    let mut libraries = Vec::with_capacity(config.libraries.len());
    for raw in &config.libraries {
        let placed = place_library(config, extracted.root(), raw, downloader, stderr);
        libraries.push(placed.map_err(|source| PatchError::Library {
            coordinate: raw.clone(),
            source,
        })?);
    }

    // Step 4: Rebuild the WAR over the output path.
    let message = format!("Repacking {}...", war_path.display());
    progress(config, stderr, message);
    let repacked_entries = repack_war(extracted.root(), &war_path)?;
    let unpacked_entries = extracted.entries();
    drop(extracted);

    info!(
        "patched {} with {} libraries ({unpacked_entries} entries in, {repacked_entries} out)",
        war_path.display(),
        libraries.len()
    );
    progress(config, stderr, success_message(libraries.len(), &war_path));

    Ok(PatchReport {
        output: war_path,
        unpacked_entries,
        libraries,
        repacked_entries,
    })
}

fn place_library(
    config: &PatchConfig,
    root: &Path,
    raw: &str,
    downloader: &dyn Downloader,
    stderr: &mut dyn Write,
) -> std::result::Result<ReplacedLibrary, LibraryError> {
    let coordinate = LibraryCoordinate::try_from(raw)?;
    progress(config, stderr, format!("Downloading {coordinate}..."));
    replace_library(root, &coordinate, downloader, config.replace)
}

fn progress(config: &PatchConfig, stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if !config.quiet {
        write_stderr_line(stderr, message);
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
