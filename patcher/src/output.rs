//! Output formatting for the patcher CLI.
//!
//! Progress and failure lines go to stderr; nothing here is machine-readable.

use crate::error::PatchError;
use std::io::Write;
use std::path::Path;

/// Write a line to stderr, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Format the one-line report for a failed run.
///
/// # Example
///
/// ```
/// use warpatch::error::PatchError;
/// use warpatch::output::failure_message;
/// use warpatch::repack::RepackError;
///
/// let err = PatchError::from(RepackError::Io(std::io::Error::other("disk full")));
/// assert_eq!(
///     failure_message(&err),
///     "Error rezipping WAR file: repack I/O error: disk full"
/// );
/// ```
#[must_use]
pub fn failure_message(err: &PatchError) -> String {
    format!("Error {}: {err}", err.stage())
}

/// Format the success message shown after the WAR has been rebuilt.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use warpatch::output::success_message;
///
/// let msg = success_message(2, Path::new("new.war"));
/// assert!(msg.contains("2 libraries"));
/// ```
#[must_use]
pub fn success_message(library_count: usize, output: &Path) -> String {
    let noun = if library_count == 1 {
        "library"
    } else {
        "libraries"
    };
    format!("Patched {library_count} {noun} into {}", output.display())
}
