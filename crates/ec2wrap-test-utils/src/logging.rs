//! Tracing setup for tests

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a fmt subscriber that writes through the test harness.
///
/// Honors `RUST_LOG` and defaults to `debug` for the ec2wrap crates. Safe to
/// call from every test; only the first call has any effect.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ec2wrap=debug"));

        // Another harness may already own the global subscriber
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
