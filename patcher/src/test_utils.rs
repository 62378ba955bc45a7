//! Shared test utilities for building and inspecting WAR fixtures.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// Writes a zip container at `path` holding `entries` in the given order.
///
/// Entries are stored uncompressed so fixtures differ from repacked output
/// in compression method only.
///
/// # Panics
///
/// Panics if the fixture cannot be written.
pub fn write_war(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).expect("create fixture WAR");
    let mut writer = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options).expect("start fixture entry");
        writer.write_all(contents).expect("write fixture entry");
    }
    writer.finish().expect("finish fixture WAR");
}

/// Reads every file entry of the zip at `path`, keyed by entry name.
///
/// # Panics
///
/// Panics if the archive cannot be read.
pub fn read_war_entries(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = File::open(path).expect("open WAR");
    let mut archive = zip::ZipArchive::new(file).expect("read WAR");
    let mut entries = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).expect("read WAR entry");
        if entry.is_dir() {
            continue;
        }
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).expect("read entry contents");
        entries.insert(entry.name().to_owned(), contents);
    }
    entries
}
