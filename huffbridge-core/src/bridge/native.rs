// In: src/bridge/native.rs

//! The real native codec: locate, verify, load and bind the shared library.
//!
//! `NativeLibrary::open` is the only place a `libloading::Library` is created.
//! Every step fails fast with a `BridgeError`; there is no partially
//! initialised `NativeLibrary`.

use std::ffi::CStr;
use std::path::{Path, PathBuf};

use libc::c_int;
use libloading::Library;

use crate::bridge::contract::{CallContract, CodecEntryFn, COMPRESS_CONTRACT, DECOMPRESS_CONTRACT};
use crate::bridge::platform::Platform;
use crate::bridge::NativeCodec;
use crate::config::LibraryConfig;
use crate::error::BridgeError;

//==================================================================================
// I. Library Location
//==================================================================================

/// Resolves where the native library is expected to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLocator {
    pub platform: Platform,
    pub stem: String,
    pub base_dir: PathBuf,
    pub relative_dir: PathBuf,
}

impl LibraryLocator {
    /// Builds a locator for the current platform.
    pub fn from_config(config: &LibraryConfig) -> Result<Self, BridgeError> {
        let base_dir = match &config.base_dir {
            Some(dir) => dir.clone(),
            None => crate::config::install_dir()?,
        };
        Ok(Self {
            platform: Platform::current()?,
            stem: config.stem.clone(),
            base_dir,
            relative_dir: config.relative_dir.clone(),
        })
    }

    pub fn file_name(&self) -> Result<String, BridgeError> {
        self.platform.library_file_name(&self.stem)
    }

    /// `<base_dir>/<relative_dir>/<file_name>`.
    pub fn library_path(&self) -> Result<PathBuf, BridgeError> {
        Ok(self.base_dir.join(&self.relative_dir).join(self.file_name()?))
    }
}

//==================================================================================
// II. The Loaded Library
//==================================================================================

/// A loaded native codec with both entry points bound.
///
/// The function pointers are only valid while `_library` is loaded; both live
/// and die together in this struct.
pub struct NativeLibrary {
    path: PathBuf,
    compress_fn: CodecEntryFn,
    decompress_fn: CodecEntryFn,
    _library: Library,
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary").field("path", &self.path).finish()
    }
}

impl NativeLibrary {
    /// Resolves, verifies, loads and binds the library described by `config`.
    pub fn open(config: &LibraryConfig) -> Result<Self, BridgeError> {
        let locator = LibraryLocator::from_config(config)?;
        let path = locator.library_path()?;
        log::debug!(
            "Resolved native library for {} at '{}'",
            locator.platform,
            path.display()
        );
        Self::open_path(&path)
    }

    /// Verifies, loads and binds the library at an explicit path.
    pub fn open_path(path: &Path) -> Result<Self, BridgeError> {
        if !path.is_file() {
            return Err(BridgeError::LibraryNotFound {
                path: path.to_path_buf(),
            });
        }

        // SAFETY: loading runs the library's initialisers. The codec library
        // has none with preconditions beyond a normal process environment.
        let library = unsafe { Library::new(path) }.map_err(|source| BridgeError::LibraryLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let compress_fn = bind(&library, &COMPRESS_CONTRACT)?;
        let decompress_fn = bind(&library, &DECOMPRESS_CONTRACT)?;

        log::info!("Loaded native codec library '{}'", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            compress_fn,
            decompress_fn,
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Looks up `contract.name` and types it as a [`CodecEntryFn`].
fn bind(library: &Library, contract: &CallContract) -> Result<CodecEntryFn, BridgeError> {
    contract.check_codec_entry()?;

    // SAFETY: the contract check above guarantees the symbol is declared with
    // the `int (const char*, const char*)` prototype `CodecEntryFn` models.
    let symbol = unsafe { library.get::<CodecEntryFn>(contract.name.as_bytes()) }.map_err(
        |source| BridgeError::SymbolMissing {
            name: contract.name,
            source,
        },
    )?;
    Ok(*symbol)
}

impl NativeCodec for NativeLibrary {
    fn compress_raw(&self, input: &CStr, output: &CStr) -> c_int {
        // SAFETY: both pointers are valid NUL-terminated strings for the
        // duration of the call and the library is still loaded.
        unsafe { (self.compress_fn)(input.as_ptr(), output.as_ptr()) }
    }

    fn decompress_raw(&self, input: &CStr, output: &CStr) -> c_int {
        // SAFETY: as in `compress_raw`.
        unsafe { (self.decompress_fn)(input.as_ptr(), output.as_ptr()) }
    }
}
