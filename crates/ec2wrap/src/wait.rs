//! Bounded fixed-interval polling.
//!
//! Provides a generic wait for a resource to reach a state, checking at a
//! constant interval for at most `max_attempts` checks.

use crate::error::{ResourceError, Result};
use backon::{BackoffBuilder, ConstantBuilder};
use ec2wrap_common::defaults::{DEFAULT_BOOT_MAX_ATTEMPTS, DEFAULT_BOOT_POLL_SECS};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for bounded polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    /// Delay between checks
    pub interval: Duration,
    /// Maximum number of checks before giving up
    pub max_attempts: u32,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_BOOT_POLL_SECS),
            max_attempts: DEFAULT_BOOT_MAX_ATTEMPTS,
        }
    }
}

impl WaitConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Poll `check` until it returns `Ok(Some(value))`.
///
/// # Returns
/// * `Ok(value)` - condition met, with the value the last check produced
/// * `Err(ResourceError::Timeout)` - `max_attempts` checks all returned `Ok(None)`
/// * `Err` - the check itself failed
pub async fn wait_until<T, F, Fut>(config: &WaitConfig, what: &str, mut check: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let mut delays = ConstantBuilder::default()
        .with_delay(config.interval)
        .with_max_times(config.max_attempts.saturating_sub(1) as usize)
        .build();

    let mut attempts = 0u32;
    while attempts < config.max_attempts {
        attempts += 1;

        match check().await {
            Ok(Some(value)) => {
                debug!(resource = %what, attempts, "Condition met");
                return Ok(value);
            }
            Ok(None) => {
                if let Some(delay) = delays.next() {
                    debug!(
                        resource = %what,
                        attempt = attempts,
                        delay_ms = delay.as_millis(),
                        "Not ready, polling again"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => {
                warn!(resource = %what, error = %e, "Check failed while waiting");
                return Err(e);
            }
        }
    }

    warn!(resource = %what, attempts, "Gave up waiting");
    Err(ResourceError::Timeout {
        what: what.to_string(),
        attempts,
    })
}
