//! Tracing setup for hosts.

use tracing_subscriber::{EnvFilter, fmt};

/// Installs a fmt subscriber filtered by `RUST_LOG`, defaulting to
/// `info`.
///
/// Does nothing if a global subscriber is already set, so it is safe to
/// call from every test and every entry point.
pub fn init() {
    init_with_default("info");
}

/// Like [`init`], with a different default filter when `RUST_LOG` is
/// unset.
pub fn init_with_default(directives: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    fmt().with_env_filter(filter).with_target(false).try_init().ok();
}
