//! Development-time tracing for debugging bazelize.
//!
//! Product output (progress lines, skip notices, `Running: ...`) goes to
//! stdout via `println!` and is always printed. Tracing is dev diagnostics
//! only, controlled by `RUST_LOG`, written to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber for development logging.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=bazelize=debug cargo run -- --skip-initialize
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
