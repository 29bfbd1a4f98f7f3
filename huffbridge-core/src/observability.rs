//! Logging setup and structured diagnostics for the bridge and the harness.
//!
//! Progress messages go through the `log` facade. `init_logging` installs an
//! `env_logger` backend once per process; later calls are ignored. The
//! `log_metric!` macro emits structured key-value events at debug level and is
//! compiled out of release builds.

use std::fs::OpenOptions;
use std::str::FromStr;
use std::sync::Once;

use log::LevelFilter;

use crate::config::LoggingConfig;
use crate::error::BridgeError;

/// Logs a structured key-value metric line, only in debug builds.
///
/// # Example
/// ```
/// use huffbridge::log_metric;
/// let status = 0;
/// log_metric!("event" = "native_call", "entry" = "api_compress_file", "status" = &status);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            log::debug!("HUFFBRIDGE_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Parses a configured level name (`info`, `debug`, ...), case-insensitively.
pub fn parse_level(level: &str) -> Result<LevelFilter, BridgeError> {
    LevelFilter::from_str(level.trim()).map_err(|_| BridgeError::InvalidLogLevel(level.to_string()))
}

/// Installs the process-wide logger described by `config`.
///
/// The level and the log file are validated on every call so a bad config is
/// reported even when a logger is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), BridgeError> {
    let level = parse_level(&config.level)?;
    let file = match &config.log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);

        // Just the level and the message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
