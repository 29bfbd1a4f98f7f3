use super::*;
use crate::bridge::{CodecBridge, StubMode, StubNative};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::ffi::OsString;
use tempfile::TempDir;

// Test Helpers

/// A scratch fixture directory with the default file names.
fn fixture_dir(contents: Option<&[u8]>) -> (TempDir, HarnessPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = HarnessPaths::in_dir(dir.path(), &HarnessConfig::default());
    if let Some(bytes) = contents {
        fs::write(&paths.fixture, bytes).unwrap();
    }
    (dir, paths)
}

fn listing(dir: &Path) -> BTreeSet<OsString> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect()
}

fn sample_text() -> Vec<u8> {
    b"It was the best of times, it was the worst of times.\n".repeat(64)
}

//==================================================================================
// Scenarios
//==================================================================================

#[test]
fn test_scenario_a_success_removes_artifacts() {
    let (dir, paths) = fixture_dir(Some(&sample_text()));
    let before = listing(dir.path());
    let bridge = CodecBridge::new(StubNative::transcoding());

    let report = RoundTripHarness::new(&bridge, paths.clone()).run();

    assert!(report.is_success(), "{report}");
    assert!(report.compress_ok());
    assert!(report.decompress_ok());
    assert!(report.contents_identical());
    assert_eq!(report.aborted_at(), None);
    assert!(report.timings.compress.is_some());

    let cleanup = report.cleanup.as_ref().unwrap();
    assert_eq!(cleanup.removed, vec![paths.compressed.clone(), paths.restored.clone()]);
    assert_eq!(listing(dir.path()), before);
}

#[test]
fn test_scenario_b_compress_failure_skips_decompress() {
    let (dir, paths) = fixture_dir(Some(&sample_text()));
    let before = listing(dir.path());
    let bridge = CodecBridge::new(
        StubNative::transcoding()
            .with_compress_status(-1)
            .leaving_partial_output(),
    );

    let report = RoundTripHarness::new(&bridge, paths.clone()).run();

    assert!(!report.is_success());
    assert_eq!(report.aborted_at(), Some(Stage::Compress));
    assert_eq!(report.compress.map(|r| r.status()), Some(-1));
    assert_eq!(report.decompress, None);
    assert_eq!(report.verification, None);
    assert_eq!(bridge.native().calls_to("api_decompress_file"), 0);

    // The partial compressed file was still removed.
    assert_eq!(report.cleanup.as_ref().unwrap().removed, vec![paths.compressed]);
    assert_eq!(listing(dir.path()), before);
}

#[test]
fn test_scenario_c_missing_fixture_makes_no_calls() {
    let (dir, paths) = fixture_dir(None);
    let bridge = CodecBridge::new(StubNative::transcoding());

    let report = RoundTripHarness::new(&bridge, paths).run();

    assert!(!report.is_success());
    assert_eq!(report.aborted_at(), Some(Stage::PreconditionCheck));
    assert!(report.abort.as_ref().unwrap().reason.contains("fixture not found"));
    assert_eq!(report.cleanup, None);
    assert_eq!(bridge.native().call_count(), 0);
    assert!(listing(dir.path()).is_empty());
}

#[test]
fn test_scenario_d_mismatch_is_verification_failure() {
    let (dir, paths) = fixture_dir(Some(&sample_text()));
    let before = listing(dir.path());
    let bridge = CodecBridge::new(StubNative::new(StubMode::CorruptRestore));

    let report = RoundTripHarness::new(&bridge, paths).run();

    assert!(report.compress_ok() && report.decompress_ok());
    assert_eq!(report.verification, Some(Verification::Differ));
    assert_eq!(report.abort, None);
    assert!(!report.is_success());
    assert_eq!(report.cleanup.as_ref().unwrap().removed.len(), 2);
    assert_eq!(listing(dir.path()), before);
}

//==================================================================================
// Other failure paths
//==================================================================================

#[test]
fn test_decompress_failure_cleans_compressed_file() {
    let (dir, paths) = fixture_dir(Some(&sample_text()));
    let before = listing(dir.path());
    let bridge = CodecBridge::new(StubNative::transcoding().with_decompress_status(3));

    let report = RoundTripHarness::new(&bridge, paths.clone()).run();

    assert_eq!(report.aborted_at(), Some(Stage::Decompress));
    assert!(report.compress_ok());
    assert!(!report.decompress_ok());
    assert_eq!(report.cleanup.as_ref().unwrap().removed, vec![paths.compressed]);
    assert_eq!(listing(dir.path()), before);
}

#[test]
fn test_successful_calls_without_output_report_restored_missing() {
    let (dir, paths) = fixture_dir(Some(&sample_text()));
    let before = listing(dir.path());
    let bridge = CodecBridge::new(StubNative::new(StubMode::NoOutput));

    let report = RoundTripHarness::new(&bridge, paths).run();

    assert_eq!(report.verification, Some(Verification::RestoredMissing));
    assert!(!report.is_success());
    assert_eq!(report.cleanup.as_ref().unwrap().removed, Vec::<PathBuf>::new());
    assert_eq!(listing(dir.path()), before);
}

#[cfg(unix)]
#[test]
fn test_unencodable_artifact_path_aborts_compress_stage() {
    use std::os::unix::ffi::OsStrExt;

    let (dir, mut paths) = fixture_dir(Some(&sample_text()));
    paths.compressed = dir.path().join(std::ffi::OsStr::from_bytes(b"bad\xff.huff"));
    let bridge = CodecBridge::new(StubNative::transcoding());

    let report = RoundTripHarness::new(&bridge, paths).run();

    assert_eq!(report.aborted_at(), Some(Stage::Compress));
    assert_eq!(report.compress, None);
    assert_eq!(bridge.native().call_count(), 0);
    assert!(report.cleanup.is_some());
}

#[test]
fn test_artifact_aliasing_fixture_is_rejected() {
    let (_dir, mut paths) = fixture_dir(Some(&sample_text()));
    paths.restored = paths.fixture.clone();
    let bridge = CodecBridge::new(StubNative::transcoding());

    let report = RoundTripHarness::new(&bridge, paths.clone()).run();

    assert_eq!(report.aborted_at(), Some(Stage::PreconditionCheck));
    assert_eq!(bridge.native().call_count(), 0);
    assert!(paths.fixture.exists());
}

/// Runs the harness on `paths` and checks that it stopped before any native
/// call, leaving the fixture and the directory untouched.
fn assert_rejected_untouched(dir: &Path, paths: HarnessPaths, fixture: &Path) {
    let original = fs::read(fixture).unwrap();
    let before = listing(dir);
    let bridge = CodecBridge::new(StubNative::new(StubMode::Copy));

    let report = RoundTripHarness::new(&bridge, paths).run();

    assert_eq!(report.aborted_at(), Some(Stage::PreconditionCheck), "{report}");
    assert!(report.abort.as_ref().unwrap().reason.contains("resolve"));
    assert_eq!(report.cleanup, None);
    assert_eq!(bridge.native().call_count(), 0);
    assert_eq!(fs::read(fixture).unwrap(), original);
    assert_eq!(listing(dir), before);
}

#[test]
fn test_dotdot_alias_of_fixture_is_rejected() {
    let (dir, mut paths) = fixture_dir(Some(&sample_text()));
    let name = dir.path().file_name().unwrap();
    paths.restored = dir.path().join("..").join(name).join("sample.txt");
    assert_ne!(paths.restored, paths.fixture);

    assert_rejected_untouched(dir.path(), paths.clone(), &paths.fixture);
}

#[test]
fn test_dotdot_alias_between_artifacts_is_rejected() {
    let (dir, mut paths) = fixture_dir(Some(&sample_text()));
    let name = dir.path().file_name().unwrap();
    paths.compressed = dir.path().join("..").join(name).join("restored_rs.txt");
    assert_ne!(paths.compressed, paths.restored);

    let fixture = paths.fixture.clone();
    assert_rejected_untouched(dir.path(), paths, &fixture);
}

#[cfg(unix)]
#[test]
fn test_symlink_to_fixture_is_rejected() {
    let (dir, mut paths) = fixture_dir(Some(&sample_text()));
    let link = dir.path().join("link_to_sample.txt");
    std::os::unix::fs::symlink(&paths.fixture, &link).unwrap();
    paths.compressed = link;

    let fixture = paths.fixture.clone();
    assert_rejected_untouched(dir.path(), paths, &fixture);
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_alias_is_rejected() {
    let (dir, mut paths) = fixture_dir(Some(&sample_text()));
    let elsewhere = tempfile::tempdir().unwrap();
    let alias = elsewhere.path().join("fixtures");
    std::os::unix::fs::symlink(dir.path(), &alias).unwrap();
    paths.restored = alias.join("sample.txt");

    let fixture = paths.fixture.clone();
    assert_rejected_untouched(dir.path(), paths, &fixture);
}

#[test]
fn test_distinct_artifacts_in_another_directory_are_accepted() {
    let (dir, mut paths) = fixture_dir(Some(&sample_text()));
    let out = tempfile::tempdir().unwrap();
    paths.compressed = out.path().join("sample.txt");
    paths.restored = out.path().join("restored.txt");
    let before = listing(dir.path());
    let bridge = CodecBridge::new(StubNative::transcoding());

    let report = RoundTripHarness::new(&bridge, paths).run();

    assert!(report.is_success(), "{report}");
    assert_eq!(listing(dir.path()), before);
    assert!(listing(out.path()).is_empty());
}

#[test]
fn test_harness_accepts_trait_object() {
    let (_dir, paths) = fixture_dir(Some(b"dyn dispatch"));
    let bridge = CodecBridge::new(StubNative::new(StubMode::Copy));
    let codec: &dyn Codec = &bridge;

    assert!(RoundTripHarness::new(codec, paths).run().is_success());
}

//==================================================================================
// Properties and reporting
//==================================================================================

#[test]
fn test_round_trip_idempotence_on_random_fixtures() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for size in [0usize, 1, 255, 4096, 100_000] {
        let mut data = vec![0u8; size];
        rng.fill(&mut data[..]);
        let (dir, paths) = fixture_dir(Some(&data));
        let before = listing(dir.path());
        let bridge = CodecBridge::new(StubNative::transcoding());

        let report = RoundTripHarness::new(&bridge, paths.clone()).run();

        assert!(report.is_success(), "size {size}: {report}");
        assert_eq!(fs::read(&paths.fixture).unwrap(), data);
        assert_eq!(listing(dir.path()), before);
    }
}

#[test]
fn test_paths_from_config_use_base_dir() {
    let config = BridgeConfig {
        library: crate::config::LibraryConfig {
            base_dir: Some(PathBuf::from("/srv/huff/python")),
            ..Default::default()
        },
        ..Default::default()
    };
    let paths = HarnessPaths::from_config(&config).unwrap();
    let dir = Path::new("/srv/huff/python").join("..").join("test_files");
    assert_eq!(paths.fixture, dir.join("sample.txt"));
    assert_eq!(paths.compressed, dir.join("sample_rs.huff"));
    assert_eq!(paths.restored, dir.join("restored_rs.txt"));
}

#[test]
fn test_report_summary_text() {
    let (_dir, paths) = fixture_dir(Some(&sample_text()));
    let bridge = CodecBridge::new(StubNative::transcoding());
    let summary = RoundTripHarness::new(&bridge, paths).run().to_string();
    assert!(summary.contains(": PASS"));
    assert!(summary.contains("contents identical"));
    assert!(summary.contains("removed 2 file(s)"));

    let (_dir, paths) = fixture_dir(Some(&sample_text()));
    let bridge = CodecBridge::new(StubNative::transcoding().with_compress_status(-1));
    let summary = RoundTripHarness::new(&bridge, paths).run().to_string();
    assert!(summary.contains(": FAIL (aborted at compress: native compress failure (status -1))"));
    assert!(summary.contains("decompress:  not run"));
}
