//! Diagnostic logging setup.
//!
//! Log lines go to stderr so they never interleave with frames on stdout.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogConfig, LogFormat};

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured filter. Calling this more than once is harmless.
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    match config.format {
        LogFormat::Compact => builder.compact().try_init().ok(),
        LogFormat::Json => builder.json().try_init().ok(),
    };
}
