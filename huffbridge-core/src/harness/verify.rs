// In: src/harness/verify.rs

//! Byte-exact file comparison for the `Verify` stage.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BLOCK_SIZE: usize = 64 * 1024;

/// Result of comparing the original fixture with the restored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Identical,
    Differ,
    /// The decompress call reported success but left no file behind.
    RestoredMissing,
    /// Either file could not be read for a reason other than absence.
    Unreadable(String),
}

impl Verification {
    pub fn is_identical(&self) -> bool {
        *self == Verification::Identical
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verification::Identical => f.write_str("contents identical"),
            Verification::Differ => f.write_str("contents differ"),
            Verification::RestoredMissing => f.write_str("restored file missing"),
            Verification::Unreadable(reason) => write!(f, "comparison failed: {}", reason),
        }
    }
}

/// Compares two files by content.
///
/// Sizes are compared first only to skip reading files that cannot match;
/// equal sizes always lead to a full content comparison.
pub fn compare_files(original: &Path, restored: &Path) -> Verification {
    let mut restored_file = match File::open(restored) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Verification::RestoredMissing,
        Err(e) => return Verification::Unreadable(format!("{}: {}", restored.display(), e)),
    };
    let mut original_file = match File::open(original) {
        Ok(file) => file,
        Err(e) => return Verification::Unreadable(format!("{}: {}", original.display(), e)),
    };

    match same_contents(&mut original_file, &mut restored_file) {
        Ok(true) => Verification::Identical,
        Ok(false) => Verification::Differ,
        Err(e) => Verification::Unreadable(e.to_string()),
    }
}

fn same_contents(a: &mut File, b: &mut File) -> io::Result<bool> {
    if a.metadata()?.len() != b.metadata()?.len() {
        return Ok(false);
    }
    streams_equal(a, b)
}

/// Reads both streams in lockstep blocks until a mismatch or joint EOF.
pub fn streams_equal<A: Read, B: Read>(a: &mut A, b: &mut B) -> io::Result<bool> {
    let mut buf_a = vec![0u8; BLOCK_SIZE];
    let mut buf_b = vec![0u8; BLOCK_SIZE];
    loop {
        let n_a = fill(a, &mut buf_a)?;
        let n_b = fill(b, &mut buf_b)?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Like `read_exact`, but a short count at EOF is not an error.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
