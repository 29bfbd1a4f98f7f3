// In: src/config.rs

//! The single source of truth for all huffbridge configuration.
//!
//! `BridgeConfig` is created once at the application boundary (from defaults or
//! a JSON file) and then handed to the pieces that need it: the library
//! locator, the round-trip harness and the logger. Every field has a default,
//! so an empty JSON object `{}` is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

//==================================================================================
// I. Section Structs
//==================================================================================

/// Where the native codec library lives and what it is called.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LibraryConfig {
    /// Logical library name. The platform decides prefix and suffix,
    /// e.g. `huffman` becomes `libhuffman.so` on Linux.
    #[serde(default = "default_stem")]
    pub stem: String,

    /// Directory of the library, relative to the base directory.
    #[serde(default = "default_library_dir")]
    pub relative_dir: PathBuf,

    /// Overrides the base directory. When `None` the directory holding the
    /// running executable is used, never the current working directory.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            stem: default_stem(),
            relative_dir: default_library_dir(),
            base_dir: None,
        }
    }
}

/// File names used by a round-trip harness run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct HarnessConfig {
    /// Directory holding the fixture and the transient artifacts,
    /// relative to the base directory (or absolute).
    #[serde(default = "default_fixture_dir")]
    pub fixture_dir: PathBuf,

    #[serde(default = "default_fixture_name")]
    pub fixture_name: String,

    #[serde(default = "default_compressed_name")]
    pub compressed_name: String,

    #[serde(default = "default_restored_name")]
    pub restored_name: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            fixture_dir: default_fixture_dir(),
            fixture_name: default_fixture_name(),
            compressed_name: default_compressed_name(),
            restored_name: default_restored_name(),
        }
    }
}

/// Defines settings for logging.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// When set, log lines are appended to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_file: None,
        }
    }
}

//==================================================================================
// II. The Unified BridgeConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct BridgeConfig {
    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub harness: HarnessConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, BridgeError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// The directory every relative path in this config is resolved against.
    pub fn base_dir(&self) -> Result<PathBuf, BridgeError> {
        match &self.library.base_dir {
            Some(dir) => Ok(dir.clone()),
            None => install_dir(),
        }
    }
}

/// Directory of the running executable.
pub fn install_dir() -> Result<PathBuf, BridgeError> {
    let exe = std::env::current_exe().map_err(BridgeError::InstallLocation)?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        BridgeError::InstallLocation(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "executable path has no parent directory",
        ))
    })
}

//==================================================================================
// III. Serde Defaults
//==================================================================================

fn default_stem() -> String {
    "huffman".to_string()
}

fn default_library_dir() -> PathBuf {
    Path::new("..").join("bin")
}

fn default_fixture_dir() -> PathBuf {
    Path::new("..").join("test_files")
}

fn default_fixture_name() -> String {
    "sample.txt".to_string()
}

fn default_compressed_name() -> String {
    "sample_rs.huff".to_string()
}

fn default_restored_name() -> String {
    "restored_rs.txt".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_yields_defaults() {
        let config = BridgeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.library.stem, "huffman");
        assert_eq!(config.harness.fixture_name, "sample.txt");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let json = r#"{
            "library": { "base_dir": "/opt/huff", "relative_dir": "lib" },
            "harness": { "restored_name": "out.txt" }
        }"#;
        let config = BridgeConfig::from_json_str(json).unwrap();

        assert_eq!(config.library.stem, "huffman");
        assert_eq!(config.library.relative_dir, PathBuf::from("lib"));
        assert_eq!(config.base_dir().unwrap(), PathBuf::from("/opt/huff"));
        assert_eq!(config.harness.restored_name, "out.txt");
        assert_eq!(config.harness.compressed_name, "sample_rs.huff");
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = BridgeConfig::from_json_str("{ \"library\": 3 }").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BridgeConfig::from_json_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }

    #[test]
    fn test_default_base_dir_is_executable_dir() {
        let config = BridgeConfig::default();
        let exe = std::env::current_exe().unwrap();
        assert_eq!(config.base_dir().unwrap(), exe.parent().unwrap());
    }
}
