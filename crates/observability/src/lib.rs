//! Process-wide tracing setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Install JSON logging filtered by `RUST_LOG`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Like [`init`] with a caller-chosen fallback filter.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_with_default(fallback: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_target(false)
        .try_init()
        .is_ok()
}
