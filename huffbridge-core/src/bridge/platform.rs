// In: src/bridge/platform.rs

//! Maps a platform identifier to the file name of the native codec library.
//!
//! Identifiers are matched by prefix so both Rust's `std::env::consts::OS`
//! values (`linux`, `windows`, `macos`) and the longer system identifiers
//! (`linux2`, `win32`, `cygwin`, `darwin`) are recognised. Anything else is an
//! error; there is no fallback family.

use std::fmt;

use crate::error::BridgeError;

/// The three platform families the native library is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    Windows,
    MacOs,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Linux, Platform::Windows, Platform::MacOs];

    /// The platform this binary was compiled for.
    pub fn current() -> Result<Platform, BridgeError> {
        Platform::from_identifier(std::env::consts::OS)
    }

    pub fn from_identifier(identifier: &str) -> Result<Platform, BridgeError> {
        let id = identifier.trim().to_ascii_lowercase();
        if id.starts_with("linux") {
            Ok(Platform::Linux)
        } else if id.starts_with("win") || id.starts_with("cygwin") || id.starts_with("msys") {
            Ok(Platform::Windows)
        } else if id.starts_with("darwin") || id == "macos" {
            Ok(Platform::MacOs)
        } else {
            Err(BridgeError::UnsupportedPlatform(identifier.to_string()))
        }
    }

    pub fn library_prefix(self) -> &'static str {
        // The native build emits `lib`-prefixed artifacts on every platform.
        "lib"
    }

    pub fn library_suffix(self) -> &'static str {
        match self {
            Platform::Linux => "so",
            Platform::Windows => "dll",
            Platform::MacOs => "dylib",
        }
    }

    /// `lib<stem>.<suffix>` for this platform.
    pub fn library_file_name(self, stem: &str) -> Result<String, BridgeError> {
        let stem = stem.trim();
        if stem.is_empty() {
            return Err(BridgeError::EmptyLibraryStem);
        }
        Ok(format!(
            "{}{}.{}",
            self.library_prefix(),
            stem,
            self.library_suffix()
        ))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
        };
        f.write_str(name)
    }
}
