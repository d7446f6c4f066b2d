//! Diagnostic output setup

use tracing::level_filters::LevelFilter;

/// Level selected by the `--quiet` and `-v` flags
///
/// Quiet keeps errors only; otherwise each `-v` raises the level one step
/// from `INFO`.
pub const fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global stderr subscriber
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(verbosity: u8, quiet: bool) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level_for(verbosity, quiet))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
