//! This file is the root of the `huffbridge` Rust crate.
//!
//! The crate loads the native huffman codec library at runtime and exposes its
//! two file operations through a typed bridge (`bridge`), plus a round-trip
//! harness (`harness`) that checks compress/decompress against each other.
//!
//! Typical startup: build a [`config::BridgeConfig`], call
//! [`observability::init_logging`], open one [`bridge::CodecBridge`] and hand a
//! reference to every component that needs it.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod error;
pub mod harness;

//==================================================================================
// 2. Re-exports
//==================================================================================
pub use bridge::{Codec, CodecBridge, NativeCodec, NativeLibrary, OperationResult};
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use harness::{HarnessPaths, RoundTripHarness, RoundTripReport};
