//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (e.g. `"info"` or
/// `"bookshelf=debug,tower_http=info"`) is used.
pub fn init(default_filter: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| format!("invalid log filter '{}': {}", default_filter, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| format!("failed to install tracing subscriber: {}", e))
}
