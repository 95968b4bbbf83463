#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Simple logging utilities for the generator.
//!
//! Everything is routed through `tracing`; binaries call [`init`] once and
//! libraries only emit events.

use tracing_subscriber::EnvFilter;

/// Installs a formatted subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `level` when it is set. Calling this more
/// than once is harmless: later calls leave the first subscriber in place.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Emits a trace event tagged with the module it came from.
pub fn trace(module: &str, msg: &str) {
    tracing::trace!(module = module, "{}", msg);
}

/// Emits a debug event tagged with the module it came from.
pub fn debug(module: &str, msg: &str) {
    tracing::debug!(module = module, "{}", msg);
}
