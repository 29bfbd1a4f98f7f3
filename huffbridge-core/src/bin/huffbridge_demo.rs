// In: src/bin/huffbridge_demo.rs

//! Round-trip demo against the real native huffman library.
//!
//! Takes no arguments. Set `HUFFBRIDGE_CONFIG` to a JSON file to override the
//! defaults: library at `<exe dir>/../bin/libhuffman.<ext>`, fixture at
//! `<exe dir>/../test_files/sample.txt`.

use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;

use huffbridge::config::BridgeConfig;
use huffbridge::observability;
use huffbridge::{BridgeError, CodecBridge, HarnessPaths, RoundTripHarness};

const CONFIG_ENV: &str = "HUFFBRIDGE_CONFIG";

fn load_config() -> Result<BridgeConfig, BridgeError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => BridgeConfig::from_json_file(&PathBuf::from(path)),
        None => Ok(BridgeConfig::default()),
    }
}

fn run() -> Result<bool, BridgeError> {
    let config = load_config()?;
    observability::init_logging(&config.logging)?;
    log::info!("huffbridge {} round-trip demo", huffbridge::VERSION);

    // The one and only library handle for this process.
    let bridge = CodecBridge::open(&config.library)?;
    let paths = HarnessPaths::from_config(&config)?;

    let report = RoundTripHarness::new(&bridge, paths).run();
    let summary = report.to_string();
    if report.is_success() {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.red());
    }
    Ok(report.is_success())
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            if let BridgeError::LibraryNotFound { .. } = err {
                eprintln!("Compile the native library (e.g. `make lib`) and try again.");
            }
            ExitCode::FAILURE
        }
    }
}
