// In: src/harness/report.rs

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::bridge::OperationResult;
use crate::harness::verify::Verification;
use crate::harness::HarnessPaths;

/// The steps of a round trip, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    PreconditionCheck,
    Compress,
    Decompress,
    Verify,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::PreconditionCheck => "precondition check",
            Stage::Compress => "compress",
            Stage::Decompress => "decompress",
            Stage::Verify => "verify",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Why and where a run stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort {
    pub stage: Stage,
    pub reason: String,
}

impl Abort {
    pub fn new(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }

    pub(crate) fn operation_failed(stage: Stage, result: OperationResult) -> Self {
        Self::new(stage, format!("native {} {}", stage, result))
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aborted at {}: {}", self.stage, self.reason)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub removed: Vec<PathBuf>,
    /// Files that existed but could not be deleted, with the OS error.
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupOutcome {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub compress: Option<Duration>,
    pub decompress: Option<Duration>,
}

/// Everything one harness run observed. `None` means the step never ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTripReport {
    pub paths: HarnessPaths,
    pub compress: Option<OperationResult>,
    pub decompress: Option<OperationResult>,
    pub verification: Option<Verification>,
    pub abort: Option<Abort>,
    pub cleanup: Option<CleanupOutcome>,
    pub timings: StageTimings,
}

impl RoundTripReport {
    pub(crate) fn new(paths: HarnessPaths) -> Self {
        Self {
            paths,
            compress: None,
            decompress: None,
            verification: None,
            abort: None,
            cleanup: None,
            timings: StageTimings::default(),
        }
    }

    pub fn compress_ok(&self) -> bool {
        self.compress.map_or(false, |r| r.is_success())
    }

    pub fn decompress_ok(&self) -> bool {
        self.decompress.map_or(false, |r| r.is_success())
    }

    pub fn contents_identical(&self) -> bool {
        self.verification
            .as_ref()
            .map_or(false, Verification::is_identical)
    }

    /// The stage the run stopped at, if it aborted.
    pub fn aborted_at(&self) -> Option<Stage> {
        self.abort.as_ref().map(|a| a.stage)
    }

    /// True only when both calls succeeded and the contents match.
    /// Cleanup problems are reported but do not fail the check.
    pub fn is_success(&self) -> bool {
        self.compress_ok() && self.decompress_ok() && self.contents_identical()
    }
}

fn step(result: &Option<OperationResult>, elapsed: Option<Duration>) -> String {
    match (result, elapsed) {
        (Some(r), Some(t)) => format!("{} in {:.2?}", r, t),
        (Some(r), None) => r.to_string(),
        (None, _) => "not run".to_string(),
    }
}

impl fmt::Display for RoundTripReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.is_success() { "PASS" } else { "FAIL" };
        write!(f, "Round trip of '{}': {}", self.paths.fixture.display(), verdict)?;
        if let Some(abort) = &self.abort {
            write!(f, " ({})", abort)?;
        }
        writeln!(f)?;
        writeln!(f, "  compress:    {}", step(&self.compress, self.timings.compress))?;
        writeln!(f, "  decompress:  {}", step(&self.decompress, self.timings.decompress))?;
        match &self.verification {
            Some(v) => writeln!(f, "  verify:      {}", v)?,
            None => writeln!(f, "  verify:      not run")?,
        }
        match &self.cleanup {
            None => write!(f, "  cleanup:     not needed"),
            Some(c) if c.is_clean() => write!(f, "  cleanup:     removed {} file(s)", c.removed.len()),
            Some(c) => {
                write!(f, "  cleanup:     {} file(s) could not be removed", c.failed.len())?;
                for (path, error) in &c.failed {
                    write!(f, "\n    {}: {}", path.display(), error)?;
                }
                Ok(())
            }
        }
    }
}
