// In: src/harness/mod.rs

//! The round-trip harness: compress a fixture, decompress it again, compare
//! the result byte for byte and remove the transient files.
//!
//! Stages run strictly in order:
//!
//! ```text
//! Start -> PreconditionCheck -> Compress -> Decompress -> Verify -> Cleanup -> End
//!                 |                 |            |
//!                 `-----------------+------------+--> Abort
//! ```
//!
//! An abort at `PreconditionCheck` happens before any file is created, so
//! cleanup is skipped. Every later abort still goes through `Cleanup`.
//! Nothing in a run returns an error: every outcome ends up in the
//! [`RoundTripReport`].

pub mod report;
pub mod verify;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::bridge::{Codec, OperationResult};
use crate::config::{BridgeConfig, HarnessConfig};
use crate::error::BridgeError;

pub use report::{Abort, CleanupOutcome, RoundTripReport, Stage};
pub use verify::Verification;

//==================================================================================
// I. Paths
//==================================================================================

/// The fixture and the two transient artifacts of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessPaths {
    pub fixture: PathBuf,
    pub compressed: PathBuf,
    pub restored: PathBuf,
}

impl HarnessPaths {
    /// Places the configured file names in `dir`.
    pub fn in_dir(dir: &Path, config: &HarnessConfig) -> Self {
        Self {
            fixture: dir.join(&config.fixture_name),
            compressed: dir.join(&config.compressed_name),
            restored: dir.join(&config.restored_name),
        }
    }

    /// Resolves the fixture directory against the config's base directory.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let dir = config.base_dir()?.join(&config.harness.fixture_dir);
        Ok(Self::in_dir(&dir, &config.harness))
    }

    /// The artifacts must not alias the fixture or each other, or cleanup
    /// would delete the wrong file. Paths are compared after resolving `..`
    /// segments and symlinks, not textually.
    fn overlap(&self) -> Option<&'static str> {
        let fixture = resolve(&self.fixture);
        let compressed = resolve(&self.compressed);
        let restored = resolve(&self.restored);
        if compressed == fixture || restored == fixture {
            Some("an artifact path resolves to the fixture path")
        } else if compressed == restored {
            Some("the compressed and restored paths resolve to the same file")
        } else {
            None
        }
    }
}

/// The canonical form of `path`. For a file that does not exist yet, the
/// parent directory is canonicalized and the file name joined back on.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(real) = fs::canonicalize(path) {
        return real;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            fs::canonicalize(parent)
                .map(|dir| dir.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

//==================================================================================
// II. The Harness
//==================================================================================

/// Runs round trips through any [`Codec`], normally a `CodecBridge`.
pub struct RoundTripHarness<'a, C: Codec + ?Sized> {
    codec: &'a C,
    paths: HarnessPaths,
}

impl<'a, C: Codec + ?Sized> RoundTripHarness<'a, C> {
    pub fn new(codec: &'a C, paths: HarnessPaths) -> Self {
        Self { codec, paths }
    }

    pub fn paths(&self) -> &HarnessPaths {
        &self.paths
    }

    pub fn run(&self) -> RoundTripReport {
        let mut report = RoundTripReport::new(self.paths.clone());
        log::info!("--- Running round-trip check on '{}' ---", self.paths.fixture.display());

        // --- PreconditionCheck ---
        if let Some(abort) = self.check_preconditions() {
            log::error!("[harness] {}", abort);
            report.abort = Some(abort);
            return report;
        }

        // --- Compress -> Decompress -> Verify ---
        if let Err(abort) = self.run_stages(&mut report) {
            log::error!("[harness] {}", abort);
            report.abort = Some(abort);
        }

        // --- Cleanup ---
        report.cleanup = Some(self.cleanup());
        report
    }

    fn check_preconditions(&self) -> Option<Abort> {
        if let Some(reason) = self.paths.overlap() {
            return Some(Abort::new(Stage::PreconditionCheck, reason));
        }
        if !self.paths.fixture.is_file() {
            return Some(Abort::new(
                Stage::PreconditionCheck,
                format!("fixture not found: '{}'", self.paths.fixture.display()),
            ));
        }
        None
    }

    fn run_stages(&self, report: &mut RoundTripReport) -> Result<(), Abort> {
        let paths = &self.paths;

        let (compress, elapsed) = timed(|| self.codec.compress(&paths.fixture, &paths.compressed));
        let compress = settle(Stage::Compress, compress)?;
        report.compress = Some(compress);
        report.timings.compress = Some(elapsed);
        log_metric!("event" = "stage", "stage" = Stage::Compress, "elapsed" = format!("{:.2?}", elapsed));
        if !compress.is_success() {
            return Err(Abort::operation_failed(Stage::Compress, compress));
        }

        let (decompress, elapsed) =
            timed(|| self.codec.decompress(&paths.compressed, &paths.restored));
        let decompress = settle(Stage::Decompress, decompress)?;
        report.decompress = Some(decompress);
        report.timings.decompress = Some(elapsed);
        log_metric!("event" = "stage", "stage" = Stage::Decompress, "elapsed" = format!("{:.2?}", elapsed));
        if !decompress.is_success() {
            return Err(Abort::operation_failed(Stage::Decompress, decompress));
        }

        log::info!("[harness] Verifying integrity of '{}'...", paths.restored.display());
        let verification = verify::compare_files(&paths.fixture, &paths.restored);
        if verification.is_identical() {
            log::info!("[harness] Restored file is identical to the original.");
        } else {
            log::warn!("[harness] Verification failed: {}.", verification);
        }
        report.verification = Some(verification);
        Ok(())
    }

    fn cleanup(&self) -> CleanupOutcome {
        log::info!("[harness] Cleaning up round-trip files...");
        let mut outcome = CleanupOutcome::default();
        for path in [&self.paths.compressed, &self.paths.restored] {
            match fs::remove_file(path) {
                Ok(()) => outcome.removed.push(path.clone()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    log::warn!("[harness] Could not remove '{}': {}", path.display(), e);
                    outcome.failed.push((path.clone(), e.to_string()));
                }
            }
        }
        outcome
    }
}

/// A marshaling error counts as a failure of the stage that raised it.
fn settle(
    stage: Stage,
    result: Result<OperationResult, BridgeError>,
) -> Result<OperationResult, Abort> {
    result.map_err(|e| Abort::new(stage, e.to_string()))
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, std::time::Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}

#[cfg(test)]
mod tests;
