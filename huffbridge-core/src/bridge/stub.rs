// In: src/bridge/stub.rs

//! A stand-in for the native codec library, for tests and benchmarks.
//!
//! `StubNative` sits behind the same `NativeCodec` seam as `NativeLibrary`, so
//! the bridge's marshaling and status interpretation run unchanged against it.
//! It records every call and lets a test choose the status codes and what
//! happens to the destination file.

use std::cell::RefCell;
use std::ffi::CStr;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use libc::c_int;

use crate::bridge::contract::{COMPRESS_CONTRACT, DECOMPRESS_CONTRACT};
use crate::bridge::NativeCodec;

/// Status the stub returns when its own file work fails, matching the
/// native library's `-1` convention.
const STUB_IO_FAILURE: c_int = -1;

const ZSTD_LEVEL: i32 = 3;

/// What the stub does with the files on a call that reports success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubMode {
    /// Real compression with zstd, so a round trip is byte-exact.
    Transcode,
    /// Copies the source to the destination in both directions.
    Copy,
    /// Transcodes, but flips the first byte of every decompressed output.
    CorruptRestore,
    /// Reports the configured status without touching any file.
    NoOutput,
}

/// One recorded foreign call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubCall {
    pub entry: &'static str,
    pub input: String,
    pub output: String,
}

#[derive(Debug)]
pub struct StubNative {
    mode: StubMode,
    compress_status: c_int,
    decompress_status: c_int,
    partial_output_on_failure: bool,
    calls: RefCell<Vec<StubCall>>,
}

impl StubNative {
    pub fn new(mode: StubMode) -> Self {
        Self {
            mode,
            compress_status: 0,
            decompress_status: 0,
            partial_output_on_failure: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn transcoding() -> Self {
        Self::new(StubMode::Transcode)
    }

    /// Makes `api_compress_file` return `status`. A nonzero status skips the file work.
    pub fn with_compress_status(mut self, status: c_int) -> Self {
        self.compress_status = status;
        self
    }

    /// Makes `api_decompress_file` return `status`. A nonzero status skips the file work.
    pub fn with_decompress_status(mut self, status: c_int) -> Self {
        self.decompress_status = status;
        self
    }

    /// On a failing call, leave a truncated destination file behind.
    pub fn leaving_partial_output(mut self) -> Self {
        self.partial_output_on_failure = true;
        self
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls_to(&self, entry: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.entry == entry).count()
    }

    fn record(&self, entry: &'static str, input: &CStr, output: &CStr) {
        self.calls.borrow_mut().push(StubCall {
            entry,
            input: input.to_string_lossy().into_owned(),
            output: output.to_string_lossy().into_owned(),
        });
    }

    fn run(
        &self,
        status: c_int,
        input: &CStr,
        output: &CStr,
        work: impl FnOnce(&Path, &Path) -> io::Result<()>,
    ) -> c_int {
        let (Ok(input), Ok(output)) = (input.to_str(), output.to_str()) else {
            return STUB_IO_FAILURE;
        };
        let (input, output) = (Path::new(input), Path::new(output));

        if status != 0 {
            if self.partial_output_on_failure {
                let _ = fs::write(output, b"\x00partial");
            }
            return status;
        }
        if self.mode == StubMode::NoOutput {
            return status;
        }
        match work(input, output) {
            Ok(()) => status,
            Err(_) => STUB_IO_FAILURE,
        }
    }
}

impl NativeCodec for StubNative {
    fn compress_raw(&self, input: &CStr, output: &CStr) -> c_int {
        self.record(COMPRESS_CONTRACT.name, input, output);
        let mode = self.mode;
        self.run(self.compress_status, input, output, |src, dst| match mode {
            StubMode::Copy => fs::copy(src, dst).map(drop),
            _ => zstd_encode_file(src, dst),
        })
    }

    fn decompress_raw(&self, input: &CStr, output: &CStr) -> c_int {
        self.record(DECOMPRESS_CONTRACT.name, input, output);
        let mode = self.mode;
        self.run(self.decompress_status, input, output, |src, dst| match mode {
            StubMode::Copy => fs::copy(src, dst).map(drop),
            StubMode::CorruptRestore => {
                zstd_decode_file(src, dst)?;
                flip_first_byte(dst)
            }
            _ => zstd_decode_file(src, dst),
        })
    }
}

fn zstd_encode_file(src: &Path, dst: &Path) -> io::Result<()> {
    let reader = BufReader::new(File::open(src)?);
    let mut writer = BufWriter::new(File::create(dst)?);
    zstd::stream::copy_encode(reader, &mut writer, ZSTD_LEVEL)?;
    writer.flush()
}

fn zstd_decode_file(src: &Path, dst: &Path) -> io::Result<()> {
    let reader = BufReader::new(File::open(src)?);
    let mut writer = BufWriter::new(File::create(dst)?);
    zstd::stream::copy_decode(reader, &mut writer)?;
    writer.flush()
}

fn flip_first_byte(path: &Path) -> io::Result<()> {
    let mut bytes = fs::read(path)?;
    match bytes.first_mut() {
        Some(first) => *first ^= 0xFF,
        None => bytes.push(0xFF),
    }
    fs::write(path, bytes)
}
