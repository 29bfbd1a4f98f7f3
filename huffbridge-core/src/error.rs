// In: src/error.rs

//! This module defines the single, unified error type for the huffbridge library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Only bridge *initialisation* and path marshaling produce errors. A nonzero
//! status from the native codec is not an error here: it is surfaced as a
//! failed `OperationResult`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    // =========================================================================
    // === Environment Errors (fatal to bridge initialisation)
    // =========================================================================
    #[error("Unsupported platform '{0}': expected a Linux, Windows or macOS identifier")]
    UnsupportedPlatform(String),

    #[error("Native library stem must not be empty")]
    EmptyLibraryStem,

    #[error("Could not determine the bridge install location: {0}")]
    InstallLocation(#[source] std::io::Error),

    #[error("Native library not found at '{}'. Build the huffman shared library first.", .path.display())]
    LibraryNotFound { path: PathBuf },

    #[error("Failed to load native library '{}': {source}", .path.display())]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Native library does not export '{name}': {source}")]
    SymbolMissing {
        name: &'static str,
        #[source]
        source: libloading::Error,
    },

    /// A call contract disagrees with the function-pointer type it is bound to.
    /// This is a bug in the bridge, never a property of the loaded library.
    #[error("Call contract for '{0}' does not match the bound signature (this is a bug)")]
    ContractMismatch(&'static str),

    // =========================================================================
    // === Marshaling Errors (raised before any foreign call)
    // =========================================================================
    #[error("Path '{path}' cannot be passed to the native codec: {reason}")]
    PathEncoding { path: String, reason: &'static str },

    // =========================================================================
    // === Configuration Errors
    // =========================================================================
    #[error("Invalid log level '{0}'")]
    InvalidLogLevel(String),

    /// An error from the Serde JSON library while reading a `BridgeConfig`.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// True for the error kinds that leave no usable bridge behind.
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            BridgeError::UnsupportedPlatform(_)
                | BridgeError::EmptyLibraryStem
                | BridgeError::InstallLocation(_)
                | BridgeError::LibraryNotFound { .. }
                | BridgeError::LibraryLoad { .. }
                | BridgeError::SymbolMissing { .. }
                | BridgeError::ContractMismatch(_)
        )
    }
}
