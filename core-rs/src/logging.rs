//! Log output for the `cellar` binary
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the binary (or to a test that wants to see the events).

use tracing::Level;

/// Map `-v` occurrences to a level: none → warn, one → info, more → debug.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Install a stderr fmt subscriber. Returns `false` if one was already set.
pub fn init(verbosity: u8) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level_for(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
