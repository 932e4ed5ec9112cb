//! Diagnostic logging setup for the binary
//!
//! Diagnostics go to stderr through `tracing`. The stage report itself is
//! printed to stdout and is not affected by the filter.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Env var holding a filter directive for bmk only
pub const LOG_ENV: &str = "BMK_LOG";

/// Filter precedence: `BMK_LOG`, then `RUST_LOG`, then the verbosity flag.
pub fn env_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "warn" };

    for var in [LOG_ENV, "RUST_LOG"] {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => match EnvFilter::try_new(&value) {
                Ok(filter) => return filter,
                Err(e) => eprintln!("ignoring invalid {var} value '{value}': {e}"),
            },
            _ => {}
        }
    }

    EnvFilter::new(fallback)
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
