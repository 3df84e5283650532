//! Shared helpers for the showrunner test suites: tracing setup, a
//! timeout guard for driver tests, fake hosts, and scenario builders.

pub mod builders;
pub mod fakes;

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests. Idempotent across tests in one binary.
///
/// Uses `with_test_writer()`, so output is captured per-test and only
/// printed for failing tests (unless run with `-- --nocapture`). Levels
/// come from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await a future with a 5-second cap, panicking instead of hanging the
/// suite if a driver wedges.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("test timed out after 5 seconds")
}
