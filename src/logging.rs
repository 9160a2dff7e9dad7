//! Logging setup for the command-line tool
//!
//! Logs go to stderr so that stdout carries only the extraction result.
//! `RUST_LOG` takes precedence over the defaults chosen here.

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Crate log level for the given verbosity
pub fn default_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

/// Install the global subscriber. Calls after the first are ignored.
pub fn init(verbose: bool, json: bool) {
    INIT.call_once(|| {
        let directive = format!("{}={}", env!("CARGO_CRATE_NAME"), default_level(verbose));
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(directive));

        let registry = tracing_subscriber::registry().with(filter);
        let result = if json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("Failed to initialize logging: {e}");
        }
    });
}
