// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the only code that talks to the native huffman library. It
// turns two raw C entry points into a typed, path-based API.
//
// Call Flow (compress; decompress is symmetric):
//
//   1. [Codec::compress(&Path, &Path)]           -> implemented by `CodecBridge`
//         |
//         `-> a. `contract::encode_path` -> NUL-terminated UTF-8 (or PathEncoding error)
//         |
//   2. [NativeCodec::compress_raw(&CStr, &CStr)] -> returns the raw `c_int`
//         |
//         |-- `native::NativeLibrary`  (libloading, the real library)
//         `-- `stub::StubNative`       (tests and benches)
//         |
//   3. [OperationResult]                          -> `0` is success, anything else failure
//
// The library is opened once by the caller and injected; nothing here keeps
// global state.
// ====================================================================================
pub mod contract;
pub mod native;
pub mod platform;
pub mod stub;

use std::ffi::CStr;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use libc::c_int;

use crate::error::BridgeError;

pub use contract::{CallContract, COMPRESS_CONTRACT, DECOMPRESS_CONTRACT};
pub use native::{LibraryLocator, NativeLibrary};
pub use platform::Platform;
pub use stub::{StubMode, StubNative};

//==================================================================================
// I. Seams
//==================================================================================

/// The raw native boundary. Arguments are already marshaled; the return value
/// is the untouched status code.
pub trait NativeCodec {
    fn compress_raw(&self, input: &CStr, output: &CStr) -> c_int;
    fn decompress_raw(&self, input: &CStr, output: &CStr) -> c_int;
}

/// The two file operations, as the harness and other callers see them.
pub trait Codec {
    fn compress(&self, input: &Path, output: &Path) -> Result<OperationResult, BridgeError>;
    fn decompress(&self, input: &Path, output: &Path) -> Result<OperationResult, BridgeError>;
}

//==================================================================================
// II. Operation Result
//==================================================================================

/// The outcome of one native call.
///
/// Only `0` means success. The raw status is kept for diagnostics; nonzero
/// values carry no further guaranteed meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationResult {
    status: c_int,
}

impl OperationResult {
    pub fn from_status(status: c_int) -> Self {
        Self { status }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    pub fn status(&self) -> c_int {
        self.status
    }
}

impl From<OperationResult> for bool {
    fn from(result: OperationResult) -> bool {
        result.is_success()
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            f.write_str("success")
        } else {
            write!(f, "failure (status {})", self.status)
        }
    }
}

//==================================================================================
// III. The Bridge
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Compress,
    Decompress,
}

/// Marshals paths and interprets status codes on top of a [`NativeCodec`].
#[derive(Debug)]
pub struct CodecBridge<N> {
    native: N,
}

impl CodecBridge<NativeLibrary> {
    /// Opens the real native library and wraps it.
    pub fn open(config: &crate::config::LibraryConfig) -> Result<Self, BridgeError> {
        Ok(Self::new(NativeLibrary::open(config)?))
    }
}

impl<N: NativeCodec> CodecBridge<N> {
    pub fn new(native: N) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    pub fn into_native(self) -> N {
        self.native
    }

    fn call(
        &self,
        direction: Direction,
        input: &Path,
        output: &Path,
    ) -> Result<OperationResult, BridgeError> {
        // Marshal both paths before touching the native side.
        let c_input = contract::encode_path(input)?;
        let c_output = contract::encode_path(output)?;

        let (entry, verb) = match direction {
            Direction::Compress => (COMPRESS_CONTRACT.name, "compress"),
            Direction::Decompress => (DECOMPRESS_CONTRACT.name, "decompress"),
        };
        log::info!("[bridge] Calling {} to {} '{}'...", entry, verb, input.display());

        let start = Instant::now();
        let status = match direction {
            Direction::Compress => self.native.compress_raw(&c_input, &c_output),
            Direction::Decompress => self.native.decompress_raw(&c_input, &c_output),
        };
        log::debug!("[bridge] {} returned {} after {:.2?}", entry, status, start.elapsed());
        log_metric!("event" = "native_call", "entry" = entry, "status" = status);

        let result = OperationResult::from_status(status);
        if result.is_success() {
            log::info!("[bridge] Native {} successful.", verb);
        } else {
            log::warn!("[bridge] Native {} failed with status {}.", verb, status);
        }
        Ok(result)
    }
}

impl<N: NativeCodec> Codec for CodecBridge<N> {
    fn compress(&self, input: &Path, output: &Path) -> Result<OperationResult, BridgeError> {
        self.call(Direction::Compress, input, output)
    }

    fn decompress(&self, input: &Path, output: &Path) -> Result<OperationResult, BridgeError> {
        self.call(Direction::Decompress, input, output)
    }
}
