//! Subscriber setup.
//!
//! Stdout belongs to the native messaging protocol, so every event goes to
//! stderr.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a stderr subscriber filtered by `RUST_LOG`, falling back to `info`.
///
/// Returns false if a global subscriber was already set.
pub fn init() -> bool {
    init_with_default("info")
}

pub fn init_with_default(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
