//! Diagnostic tracing for the harness.
//!
//! Tracing goes to stderr and is filtered by `RUST_LOG`. Report lines are
//! written to stdout separately and never depend on the log level.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "warn";

/// Install a compact stderr subscriber filtered by `RUST_LOG`.
///
/// Timeouts, truncation and per-case faults surface at `warn`/`error`, so the
/// default filter shows them without extra configuration.
///
/// # Example
/// ```bash
/// RUST_LOG=golden=debug golden --fixtures-dir tests
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}
