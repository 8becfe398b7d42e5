//! Diagnostic logging to stderr.
//!
//! The library reports stage transitions and cleanup problems through the
//! `log` facade. The binary routes those records into a `tracing-subscriber`
//! formatter on stderr, with the level derived from `-v`/`-q`. `RUST_LOG`
//! overrides the flags when set. Without [`init`] the records are discarded.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Map CLI verbosity flags to a level filter.
///
/// Quiet runs keep errors only; the default shows warnings, and each `-v`
/// adds one level up to `trace`.
#[must_use]
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Build the event filter: `RUST_LOG` when set and valid, else `level`.
fn filter_for(level: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

/// Install the stderr subscriber and bridge `log` records into it.
///
/// Calling this more than once keeps the first subscriber.
pub fn init(level: LevelFilter) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
    if let Err(err) = result {
        log::debug!("logger already installed: {err}");
    }
}
