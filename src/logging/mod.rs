//! Diagnostic logging
//!
//! Everything is written to stderr with timestamps so stdout only carries
//! results. `RUST_LOG` overrides the level picked from the command line.

use tracing_subscriber::EnvFilter;

/// Level for this crate's own events
pub fn level_for(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

fn default_filter(verbose: bool, quiet: bool) -> String {
    format!("warn,k8analysis={}", level_for(verbose, quiet))
}

/// Install the global subscriber. Calling it again is a no-op.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
