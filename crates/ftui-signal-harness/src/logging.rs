#![forbid(unsafe_code)]

//! Test logging setup.
//!
//! Filter with `RUST_LOG` (for example `RUST_LOG=ftui_signal=trace`).
//! Without it only warnings are shown.

use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once per process. Later calls are no-ops.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
