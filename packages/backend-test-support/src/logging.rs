//! One-time tracing subscriber for integration test binaries.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Filter used when neither `TEST_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_TEST_FILTER: &str = "warn";

/// Resolve the filter directive: `TEST_LOG`, then `RUST_LOG`, then the default.
pub fn filter_directive() -> String {
    std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_TEST_FILTER.to_string())
}

/// Install the test subscriber. Safe to call from every test and every
/// `ctor` hook; only the first call has an effect.
///
/// ```bash
/// TEST_LOG=spyster_backend=debug cargo test -p spyster-backend
/// ```
pub fn init() {
    INITIALIZED.get_or_init(|| {
        fmt()
            .with_env_filter(EnvFilter::new(filter_directive()))
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
