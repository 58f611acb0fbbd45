//! Subscriber setup for the binary

use clusterdeck_core::config::LoggingConfig;
use clusterdeck_core::{ClusterDeckError, ClusterDeckResult};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set, otherwise `clusterdeck=<level>`
///
/// Target matching is by prefix, so the directive also covers `clusterdeck_core`.
pub fn build_filter(config: &LoggingConfig) -> ClusterDeckResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(format!("clusterdeck={}", config.level)).map_err(|e| {
        ClusterDeckError::configuration("logging.level", format!("Invalid log directive: {}", e))
    })
}

/// Install the global subscriber
///
/// Command-line runs log to stderr so stdout stays clean for command output.
/// The dashboard owns the terminal, so interactive runs log to
/// `logging.file` or nowhere.
pub fn init_logging(config: &LoggingConfig, interactive: bool) -> ClusterDeckResult<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match (&config.file, interactive) {
        (Some(path), _) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        (None, true) => builder.with_writer(std::io::sink).try_init(),
        (None, false) => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| ClusterDeckError::internal(format!("Failed to install subscriber: {}", e)))
}
