//! WAR patcher library.
//!
//! This crate replaces or adds library JARs inside a WAR package. The WAR is
//! taken from a local file or an HTTP(S) URL, unpacked into a private
//! directory, patched with JARs resolved from a Maven repository, and repacked
//! over the output path. It is used by the `warpatch` CLI binary and can be
//! consumed programmatically for testing or custom patching workflows.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`coordinate`] - Maven `group:artifact:version` coordinates
//! - [`download`] - HTTP downloads behind a mockable trait
//! - [`error`] - Pipeline error types tagged with their stage
//! - [`extraction`] - WAR unpacking with path traversal checks
//! - [`library`] - JAR placement inside `WEB-INF/lib`
//! - [`output`] - Progress and failure message formatting
//! - [`pipeline`] - Acquire, unpack, replace and repack orchestration
//! - [`repack`] - Atomic WAR rebuilding from an extracted tree
//! - [`repository`] - Artifact repository base URLs
//! - [`source`] - WAR source resolution and acquisition

pub mod cli;
pub mod coordinate;
pub mod download;
pub mod error;
pub mod extraction;
pub mod library;
pub mod output;
pub mod pipeline;
pub mod repack;
pub mod repository;
pub mod source;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
