//! Unit tests for patch pipeline orchestration.

use super::*;
use crate::download::{DownloadError, MockDownloader};
use crate::error::Stage;
use crate::test_utils::{read_war_entries, write_war};
use rstest::rstest;
use tempfile::TempDir;

const OLD_JAR: &[u8] = b"old jar bytes";
const NEW_JAR: &[u8] = b"new jar bytes";
const MANIFEST: &[u8] = b"Manifest-Version: 1.0\n";

struct Fixture {
    _temp: TempDir,
    source: PathBuf,
    output: PathBuf,
}

fn fixture_war() -> Fixture {
    let temp = tempfile::tempdir().expect("temp dir");
    let source = temp.path().join("app.war");
    write_war(
        &source,
        &[
            ("META-INF/MANIFEST.MF", MANIFEST),
            ("WEB-INF/web.xml", b"<web-app/>".as_slice()),
            ("WEB-INF/lib/old-1.0.jar", OLD_JAR),
            ("index.jsp", b"<html/>".as_slice()),
        ],
    );
    let output = temp.path().join("new.war");
    Fixture {
        _temp: temp,
        source,
        output,
    }
}

fn config(fixture: &Fixture, libraries: &[&str]) -> PatchConfig {
    PatchConfig {
        source: WarSource::Local(fixture.source.clone()),
        libraries: libraries.iter().map(|lib| (*lib).to_owned()).collect(),
        output: fixture.output.clone(),
        repository: RepositoryUrl::default(),
        timeout: crate::download::DEFAULT_TIMEOUT,
        replace: ReplaceOptions::default(),
        quiet: true,
    }
}

fn serving_new_jar() -> MockDownloader {
    let mut downloader = MockDownloader::new();
    downloader
        .expect_download_library()
        .returning(|_, dest| std::fs::write(dest, NEW_JAR).map_err(DownloadError::Io));
    downloader
}

#[test]
fn replaces_library_with_matching_filename() {
    let fixture = fixture_war();
    let config = config(&fixture, &["com.example:old:1.0"]);

    let mut stderr = Vec::new();
    let report = run_pipeline(&config, &serving_new_jar(), &mut stderr).expect("patch");

    assert_eq!(report.output, fixture.output);
    assert_eq!(report.unpacked_entries, 4);
    assert_eq!(report.repacked_entries, 4);
    let entries = read_war_entries(&fixture.output);
    assert_eq!(entries["WEB-INF/lib/old-1.0.jar"], NEW_JAR);
    assert_eq!(entries["index.jsp"], b"<html/>");
}

#[test]
fn adds_library_when_no_filename_matches() {
    let fixture = fixture_war();
    let config = config(&fixture, &["com.example:fresh:2.0"]);

    let mut stderr = Vec::new();
    let report = run_pipeline(&config, &serving_new_jar(), &mut stderr).expect("patch");

    assert_eq!(report.repacked_entries, 5);
    let entries = read_war_entries(&fixture.output);
    assert_eq!(entries["WEB-INF/lib/fresh-2.0.jar"], NEW_JAR);
    assert_eq!(entries["WEB-INF/lib/old-1.0.jar"], OLD_JAR);
}

#[test]
fn source_war_is_never_modified() {
    let fixture = fixture_war();
    let before = std::fs::read(&fixture.source).expect("read source");
    let config = config(&fixture, &["com.example:old:1.0"]);

    let mut stderr = Vec::new();
    run_pipeline(&config, &serving_new_jar(), &mut stderr).expect("patch");

    assert_eq!(std::fs::read(&fixture.source).expect("read source"), before);
}

#[test]
fn malformed_coordinate_aborts_before_download_and_repack() {
    let fixture = fixture_war();
    let config = config(&fixture, &["org.example:lib"]);
    let mut downloader = MockDownloader::new();
    downloader.expect_download_library().times(0);

    let mut stderr = Vec::new();
    let err = run_pipeline(&config, &downloader, &mut stderr).expect_err("invalid coordinate");

    assert_eq!(err.stage(), Stage::Library("org.example:lib".to_owned()));
    assert!(matches!(
        err,
        PatchError::Library {
            source: LibraryError::InvalidCoordinate(_),
            ..
        }
    ));
    // The output still holds the untouched acquired copy.
    assert_eq!(
        std::fs::read(&fixture.output).expect("read output"),
        std::fs::read(&fixture.source).expect("read source")
    );
}

#[test]
fn stops_at_first_failing_library() {
    let fixture = fixture_war();
    let config = config(
        &fixture,
        &["com.example:first:1.0", "broken", "com.example:third:1.0"],
    );
    let mut downloader = MockDownloader::new();
    downloader
        .expect_download_library()
        .withf(|coordinate, _| coordinate.artifact() == "first")
        .times(1)
        .returning(|_, dest| std::fs::write(dest, NEW_JAR).map_err(DownloadError::Io));

    let mut stderr = Vec::new();
    let err = run_pipeline(&config, &downloader, &mut stderr).expect_err("second fails");

    assert_eq!(err.stage(), Stage::Library("broken".to_owned()));
}

#[test]
fn library_download_failure_names_the_coordinate() {
    let fixture = fixture_war();
    let config = config(&fixture, &["com.example:missing:9.9"]);
    let mut downloader = MockDownloader::new();
    downloader.expect_download_library().returning(|coordinate, _| {
        Err(DownloadError::NotFound {
            url: coordinate.artifact_url(&RepositoryUrl::default()),
        })
    });

    let mut stderr = Vec::new();
    let err = run_pipeline(&config, &downloader, &mut stderr).expect_err("not found");

    assert_eq!(
        crate::output::failure_message(&err),
        "Error processing library 'com.example:missing:9.9': not found: \
         https://repo1.maven.org/maven2/com/example/missing/9.9/missing-9.9.jar"
    );
}

#[test]
fn remote_source_is_downloaded_before_unpacking() {
    let fixture = fixture_war();
    let war_bytes = std::fs::read(&fixture.source).expect("read source");
    let mut config = config(&fixture, &["com.example:old:1.0"]);
    config.source = WarSource::parse("https://example.test/app.war");

    let mut downloader = serving_new_jar();
    downloader
        .expect_download_war()
        .times(1)
        .returning(move |_, dest| std::fs::write(dest, &war_bytes).map_err(DownloadError::Io));

    let mut stderr = Vec::new();
    run_pipeline(&config, &downloader, &mut stderr).expect("patch");

    let entries = read_war_entries(&fixture.output);
    assert_eq!(entries["WEB-INF/lib/old-1.0.jar"], NEW_JAR);
}

#[test]
fn corrupt_war_fails_in_unpack_stage() {
    let fixture = fixture_war();
    std::fs::write(&fixture.source, b"not a zip").expect("corrupt source");
    let config = config(&fixture, &["com.example:old:1.0"]);
    let mut downloader = MockDownloader::new();
    downloader.expect_download_library().times(0);

    let mut stderr = Vec::new();
    let err = run_pipeline(&config, &downloader, &mut stderr).expect_err("corrupt");

    assert_eq!(err.stage(), Stage::Unpack);
}

#[test]
fn missing_source_fails_in_acquisition_stage() {
    let fixture = fixture_war();
    let mut config = config(&fixture, &["com.example:old:1.0"]);
    config.source = WarSource::Local(fixture.source.with_file_name("absent.war"));

    let mut stderr = Vec::new();
    let err =
        run_pipeline(&config, &MockDownloader::new(), &mut stderr).expect_err("missing source");

    assert_eq!(err.stage(), Stage::Acquisition);
    let message = crate::output::failure_message(&err);
    assert!(message.starts_with("Error handling WAR file: "));
}

#[test]
fn prune_option_removes_older_versions() {
    let fixture = fixture_war();
    let mut config = config(&fixture, &["com.example:old:2.0"]);
    config.replace = ReplaceOptions { prune_old: true };

    let mut stderr = Vec::new();
    let report = run_pipeline(&config, &serving_new_jar(), &mut stderr).expect("patch");

    let placed = report.libraries.first().expect("one library placed");
    assert_eq!(placed.pruned, vec!["old-1.0.jar"]);
    let entries = read_war_entries(&fixture.output);
    assert!(!entries.contains_key("WEB-INF/lib/old-1.0.jar"));
    assert_eq!(entries["WEB-INF/lib/old-2.0.jar"], NEW_JAR);
}

#[rstest]
#[case::quiet(true, false)]
#[case::verbose(false, true)]
fn progress_output_respects_quiet(#[case] quiet: bool, #[case] expect_output: bool) {
    let fixture = fixture_war();
    let mut config = config(&fixture, &["com.example:old:1.0"]);
    config.quiet = quiet;

    let mut stderr = Vec::new();
    run_pipeline(&config, &serving_new_jar(), &mut stderr).expect("patch");

    let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
    assert_eq!(!text.is_empty(), expect_output);
    if expect_output {
        assert!(text.contains("Downloading com.example:old:1.0..."));
        assert!(text.contains("Patched 1 library into"));
    }
}
