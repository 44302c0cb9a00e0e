//! Logging setup for the binary.

use tracing::Level;
use tracing_subscriber::EnvFilter;

const LEVELS: [Level; 5] = [Level::TRACE, Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR];
const DEFAULT_INDEX: i32 = 2;

/// Level for the given `-v`/`-q` counts.
///
/// Starts at INFO; every `-v` lowers it one step and every `-q` raises it
/// one step, clamped between TRACE and ERROR.
pub fn level_for(verbose: u8, quiet: u8) -> Level {
    let index = (DEFAULT_INDEX + i32::from(quiet) - i32::from(verbose)).clamp(0, LEVELS.len() as i32 - 1);
    LEVELS[index as usize]
}

/// Install the stderr subscriber. `RUST_LOG` wins over the flags.
pub fn init(verbose: u8, quiet: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet).as_str().to_lowercase()));

    // A subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
