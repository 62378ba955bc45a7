//! Rebuild the WAR from its extraction directory.
//!
//! The new container is written to a temporary file beside the output path
//! and renamed over it only once the zip writer has finished, so a failed
//! repack leaves the previous WAR intact.

use log::{debug, trace};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Errors arising while rebuilding the WAR.
#[derive(Debug, thiserror::Error)]
pub enum RepackError {
    /// I/O error reading an extracted file or writing the archive.
    #[error("repack I/O error: {0}")]
    Io(#[from] io::Error),

    /// The zip writer rejected an entry.
    #[error("zip write failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The extraction directory could not be traversed.
    #[error("cannot walk extraction directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A file name cannot be represented as a zip entry name.
    #[error("path {path} is not valid UTF-8")]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// A walked path does not lie below the extraction root.
    #[error("path {path} lies outside the extraction root")]
    OutsideRoot {
        /// The offending path.
        path: PathBuf,
    },

    /// The finished archive could not replace the output path.
    #[error("cannot replace {path}: {source}")]
    Persist {
        /// The output path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Create a temporary file in the same directory as `path`.
///
/// Persisting the result over `path` is then a same-filesystem rename. The
/// file takes the mode of an existing `path`, otherwise the mode a plain
/// `File::create` would give it.
///
/// # Errors
///
/// Returns an I/O error if the temporary file cannot be created or its
/// permissions cannot be set.
pub fn sibling_temp_file(path: &Path) -> io::Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(".warpatch-").suffix(".tmp");
    with_create_mode(&mut builder);
    let temp = builder.tempfile_in(parent)?;
    inherit_mode(temp.as_file(), path)?;
    Ok(temp)
}

#[cfg(unix)]
fn with_create_mode(builder: &mut tempfile::Builder<'_, '_>) {
    use std::os::unix::fs::PermissionsExt;

    // Reduced by the umask at open time.
    builder.permissions(fs::Permissions::from_mode(0o666));
}

#[cfg(not(unix))]
fn with_create_mode(_builder: &mut tempfile::Builder<'_, '_>) {}

#[cfg(unix)]
fn inherit_mode(file: &File, path: &Path) -> io::Result<()> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => file.set_permissions(metadata.permissions()),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(not(unix))]
fn inherit_mode(_file: &File, _path: &Path) -> io::Result<()> {
    Ok(())
}

/// Rebuild a zip at `output` from every regular file below `root`.
///
/// Files are visited depth-first in lexical file-name order and stored with
/// deflate compression under their `/`-separated path relative to `root`.
/// Directories produce no entries. Returns the number of entries written.
///
/// # Errors
///
/// Returns [`RepackError`] on any traversal, read, or zip failure; the
/// output path is only replaced after the archive has been fully written.
pub fn repack_war(root: &Path, output: &Path) -> Result<usize, RepackError> {
    let mut temp = sibling_temp_file(output)?;
    let written = write_archive(root, temp.as_file_mut())?;
    temp.as_file().sync_all()?;
    temp.persist(output).map_err(|e| RepackError::Persist {
        path: output.to_path_buf(),
        source: e.error,
    })?;
    debug!("repacked {written} entries into {}", output.display());
    Ok(written)
}

fn write_archive(root: &Path, file: &mut File) -> Result<usize, RepackError> {
    let mut writer = zip::ZipWriter::new(file);
    let mut written = 0;

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let name = entry_name(root, path)?;
        let metadata = entry.metadata()?;
        let options = entry_options(&metadata);

        trace!("adding {name}");
        writer.start_file(name, options)?;
        io::copy(&mut File::open(path)?, &mut writer)?;
        written += 1;
    }

    writer.finish()?;
    Ok(written)
}

/// Build the `/`-separated entry name of `path` relative to `root`.
fn entry_name(root: &Path, path: &Path) -> Result<String, RepackError> {
    let relative = path.strip_prefix(root).map_err(|_| RepackError::OutsideRoot {
        path: path.to_path_buf(),
    })?;
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| RepackError::NonUtf8Path {
                path: path.to_path_buf(),
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}

/// Header options for one file: deflate always, unix mode where known.
fn entry_options(metadata: &std::fs::Metadata) -> SimpleFileOptions {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() >= u64::from(u32::MAX));
    with_permissions(options, metadata)
}

#[cfg(unix)]
fn with_permissions(
    options: SimpleFileOptions,
    metadata: &std::fs::Metadata,
) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;

    options.unix_permissions(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn with_permissions(
    options: SimpleFileOptions,
    _metadata: &std::fs::Metadata,
) -> SimpleFileOptions {
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::unpack_war;
    use crate::test_utils::{read_war_entries, write_war};

    const MANIFEST: &[u8] = b"Manifest-Version: 1.0\n";

    fn populate(root: &Path, files: &[(&str, &str)]) {
        for (name, contents) in files {
            let path = root.join(name);
            fs::create_dir_all(path.parent().expect("has parent")).expect("create parent");
            fs::write(path, contents).expect("write file");
        }
    }

    #[test]
    fn repack_writes_relative_entry_names() {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = temp.path().join("root");
        populate(
            &root,
            &[
                ("index.jsp", "<html/>"),
                ("WEB-INF/web.xml", "<web-app/>"),
                ("WEB-INF/lib/lib-1.0.jar", "jar"),
            ],
        );
        let output = temp.path().join("new.war");

        let count = repack_war(&root, &output).expect("repack");

        assert_eq!(count, 3);
        let entries = read_war_entries(&output);
        let names: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["WEB-INF/lib/lib-1.0.jar", "WEB-INF/web.xml", "index.jsp"]
        );
        assert_eq!(entries["WEB-INF/lib/lib-1.0.jar"], b"jar");
    }

    #[test]
    fn directories_produce_no_entries() {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = temp.path().join("root");
        fs::create_dir_all(root.join("WEB-INF/classes/empty")).expect("create dirs");
        populate(&root, &[("a.txt", "a")]);
        let output = temp.path().join("new.war");

        assert_eq!(repack_war(&root, &output).expect("repack"), 1);
        let entries = read_war_entries(&output);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn entries_are_deflated_in_lexical_order() {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = temp.path().join("root");
        populate(&root, &[("b/2.txt", "2"), ("a.txt", "a"), ("b/1.txt", "1")]);
        let output = temp.path().join("new.war");

        repack_war(&root, &output).expect("repack");

        let mut archive =
            zip::ZipArchive::new(File::open(&output).expect("open")).expect("zip");
        let mut order = Vec::new();
        for index in 0..archive.len() {
            let entry = archive.by_index(index).expect("entry");
            assert_eq!(entry.compression(), CompressionMethod::Deflated);
            order.push(entry.name().to_owned());
        }
        assert_eq!(order, vec!["a.txt", "b/1.txt", "b/2.txt"]);
    }

    #[test]
    fn unpack_then_repack_preserves_contents() {
        let temp = tempfile::tempdir().expect("temp dir");
        let original = temp.path().join("app.war");
        write_war(
            &original,
            &[
                ("META-INF/MANIFEST.MF", MANIFEST),
                ("WEB-INF/classes/App.class", b"\xca\xfe\xba\xbe".as_slice()),
                ("WEB-INF/lib/old-1.0.jar", b"old jar".as_slice()),
                ("index.jsp", b"<html/>".as_slice()),
            ],
        );
        let output = temp.path().join("new.war");

        let extracted = unpack_war(&original).expect("unpack");
        repack_war(extracted.root(), &output).expect("repack");

        assert_eq!(read_war_entries(&original), read_war_entries(&output));
    }

    #[test]
    fn failed_repack_leaves_output_untouched() {
        let temp = tempfile::tempdir().expect("temp dir");
        let output = temp.path().join("new.war");
        fs::write(&output, b"previous war").expect("seed output");

        let result = repack_war(&temp.path().join("missing-root"), &output);

        assert!(matches!(result, Err(RepackError::Walk(_))));
        assert_eq!(fs::read(&output).expect("read output"), b"previous war");
    }

    #[test]
    fn sibling_temp_file_handles_bare_file_names() {
        let temp = sibling_temp_file(Path::new("new.war")).expect("temp file");
        let parent = temp.path().parent().expect("has parent");
        assert_eq!(
            fs::canonicalize(parent).expect("canonical parent"),
            fs::canonicalize(".").expect("canonical cwd")
        );
    }

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;

        fs::metadata(path).expect("metadata").permissions().mode() & 0o7777
    }

    #[cfg(unix)]
    #[test]
    fn repack_keeps_existing_output_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("temp dir");
        let root = temp.path().join("root");
        populate(&root, &[("index.jsp", "<html/>")]);
        let output = temp.path().join("new.war");
        fs::write(&output, b"previous war").expect("seed output");
        fs::set_permissions(&output, fs::Permissions::from_mode(0o640)).expect("chmod");

        repack_war(&root, &output).expect("repack");

        assert_eq!(mode_of(&output), 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn repack_gives_new_output_the_create_mode() {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = temp.path().join("root");
        populate(&root, &[("index.jsp", "<html/>")]);
        let reference = temp.path().join("reference");
        File::create(&reference).expect("create reference");
        let output = temp.path().join("new.war");

        repack_war(&root, &output).expect("repack");

        assert_eq!(mode_of(&output), mode_of(&reference));
    }

    #[test]
    fn entry_name_uses_forward_slashes() {
        let root = Path::new("root");
        let path = root.join("WEB-INF").join("lib").join("a.jar");
        assert_eq!(entry_name(root, &path).expect("name"), "WEB-INF/lib/a.jar");
    }
}
