//! Shared test utilities for ec2wrap
//!
//! Helpers used by the integration tests of several crates.
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection and test run ID generation
//! - [`logging`]: One-time tracing setup that writes through the test harness

pub mod aws;
pub mod logging;

// Re-export commonly used items
pub use aws::{get_test_region, test_run_id};
pub use logging::init_test_tracing;
