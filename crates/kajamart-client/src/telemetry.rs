//! Tracing setup for binaries embedding the client.

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kajamart_client=trace` - Trace the client crate only
/// - Default: `info`, with `debug` for kajamart crates
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kajamart=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
