// In: src/bridge/contract.rs

//! Static call contracts for the two native entry points, and the path
//! marshaling that every call goes through.
//!
//! Both entry points share the C prototype
//! `int f(const char* inputPath, const char* outputPath)`, represented in Rust
//! by [`CodecEntryFn`]. A contract is checked against that prototype before a
//! symbol is bound, so a contract and a function-pointer type can never drift
//! apart silently.

use std::ffi::CString;
use std::path::Path;

use libc::{c_char, c_int};

use crate::error::BridgeError;

/// The Rust view of `int f(const char*, const char*)`.
pub type CodecEntryFn = unsafe extern "C" fn(*const c_char, *const c_char) -> c_int;

/// How a single argument crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A filesystem path, UTF-8 encoded and NUL-terminated.
    CPath,
}

/// How the return value crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// A signed `int`; `0` means success.
    Status,
}

/// Describes one foreign entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContract {
    pub name: &'static str,
    pub params: &'static [ParamKind],
    pub returns: ReturnKind,
}

/// The parameter list [`CodecEntryFn`] was written for: (source, destination).
const CODEC_ENTRY_PARAMS: &[ParamKind] = &[ParamKind::CPath, ParamKind::CPath];

pub const COMPRESS_CONTRACT: CallContract = CallContract {
    name: "api_compress_file",
    params: CODEC_ENTRY_PARAMS,
    returns: ReturnKind::Status,
};

pub const DECOMPRESS_CONTRACT: CallContract = CallContract {
    name: "api_decompress_file",
    params: CODEC_ENTRY_PARAMS,
    returns: ReturnKind::Status,
};

impl CallContract {
    /// Confirms this contract describes exactly the [`CodecEntryFn`] prototype.
    pub fn check_codec_entry(&self) -> Result<(), BridgeError> {
        let name_ok = !self.name.is_empty() && !self.name.as_bytes().contains(&0);
        if name_ok && self.params == CODEC_ENTRY_PARAMS && self.returns == ReturnKind::Status {
            Ok(())
        } else {
            Err(BridgeError::ContractMismatch(self.name))
        }
    }
}

/// Encodes a path as the NUL-terminated UTF-8 string the native side expects.
///
/// Fails for paths that are not valid UTF-8 or that contain a NUL byte, so
/// nothing malformed ever reaches the foreign call.
pub fn encode_path(path: &Path) -> Result<CString, BridgeError> {
    let text = path.to_str().ok_or_else(|| BridgeError::PathEncoding {
        path: path.to_string_lossy().into_owned(),
        reason: "not valid UTF-8",
    })?;
    CString::new(text).map_err(|_| BridgeError::PathEncoding {
        path: text.replace('\0', "\\0"),
        reason: "contains an interior NUL byte",
    })
}
