//! Configuration for the notification service.

use std::time::Duration;

use backoff::RetryPolicy;
use core_config::{ConfigError, FromEnv, env_parsed};

/// Notification service settings, loaded from the environment at the edge
/// and passed in by the composition root.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Interval between expiry sweeps. Default: hourly.
    pub sweep_interval: Duration,
    /// Retry policy for repository calls.
    pub retry: RetryPolicy,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(3600),
            retry: RetryPolicy::default(),
        }
    }
}

impl FromEnv for NotificationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let sweep_secs = env_parsed("NOTIFICATION_SWEEP_INTERVAL_SECS", 3600u64)?;
        let max_attempts = env_parsed("NOTIFICATION_RETRY_MAX_ATTEMPTS", 3u32)?;
        let base_ms = env_parsed("NOTIFICATION_RETRY_BASE_MS", 1000u64)?;

        Ok(Self {
            sweep_interval: Duration::from_secs(sweep_secs),
            retry: RetryPolicy::new(max_attempts, Duration::from_millis(base_ms)),
        })
    }
}
