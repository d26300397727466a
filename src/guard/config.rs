use crate::error::{Result, StockError};
use std::time::Duration;

pub const DEFAULT_WARNING_THRESHOLD_SECS: u64 = 60;
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_RENEWAL_TIMEOUT_SECS: u64 = 15;

/// Timing knobs for [`SessionGuard`](super::SessionGuard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Total idle time allowed before the session expires.
    pub idle_timeout: Duration,
    /// How long before expiry the warning appears.
    pub warning_threshold: Duration,
    /// Period of the idle check.
    pub check_interval: Duration,
    /// Upper bound on a single refresh call.
    pub renewal_timeout: Duration,
}

impl GuardConfig {
    pub fn new(idle_timeout: Duration, warning_threshold: Duration) -> Self {
        Self {
            idle_timeout,
            warning_threshold,
            ..Self::default()
        }
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn with_renewal_timeout(mut self, timeout: Duration) -> Self {
        self.renewal_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout.is_zero() {
            return Err(StockError::Config(
                "idle timeout must be greater than zero".to_string(),
            ));
        }
        if self.warning_threshold > self.idle_timeout {
            return Err(StockError::Config(format!(
                "warning threshold ({}s) exceeds idle timeout ({}s)",
                self.warning_threshold.as_secs(),
                self.idle_timeout.as_secs()
            )));
        }
        if self.check_interval.is_zero() {
            return Err(StockError::Config(
                "check interval must be greater than zero".to_string(),
            ));
        }
        if self.renewal_timeout.is_zero() {
            return Err(StockError::Config(
                "renewal timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(300),
            warning_threshold: Duration::from_secs(DEFAULT_WARNING_THRESHOLD_SECS),
            check_interval: Duration::from_millis(DEFAULT_CHECK_INTERVAL_MS),
            renewal_timeout: Duration::from_secs(DEFAULT_RENEWAL_TIMEOUT_SECS),
        }
    }
}
