//! Tracing subscriber setup for the binary.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable overriding the verbosity-derived filter.
pub const LOG_ENV_VAR: &str = "SPLITMAP_LOG";

/// Map CLI verbosity (`-v` count) to a default filter directive.
#[must_use]
pub fn filter_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "splitmap=debug,info",
        _ => "splitmap=trace,debug",
    }
}

/// Install a stderr subscriber.
///
/// `SPLITMAP_LOG` wins over the verbosity-derived default. Calling this twice
/// is harmless; the second installation is ignored.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(filter_for_verbosity(verbosity)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
