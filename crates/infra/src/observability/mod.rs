//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; binaries and test harnesses call
//! [`init_tracing`] once to route them to stderr. `RUST_LOG` takes precedence
//! over the level derived from the debug flag.

use apilink_domain::ConnectionConfig;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(debug: bool) -> bool {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
}

/// Install a global fmt subscriber at the level the configuration asks for.
pub fn init_tracing_for(config: &ConnectionConfig) -> bool {
    init_tracing(config.is_debug())
}
