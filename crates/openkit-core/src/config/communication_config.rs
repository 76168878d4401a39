//! Timing and retry settings of the beacon sending worker.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const ONE_SECOND_MS: u64 = 1000;
const TWO_HOURS_MS: u64 = 2 * 60 * 60 * 1000;

/// Configuration for the background transmission worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunicationConfig {
    /// Sleep between two iterations of the capture states. Default: 1s.
    pub default_sleep_ms: u64,
    /// Interval between status requests while capture is off. Default: 2h.
    pub status_check_interval_ms: u64,
    /// Interval after which a successful time sync is repeated. Default: 2h.
    pub time_sync_interval_ms: u64,
    /// Sleep after a failed time sync before retrying. Default: 2h.
    pub time_sync_retry_interval_ms: u64,
    /// Number of status requests attempted during init. Default: 5.
    pub max_init_retries: u32,
    /// Sleep after the first failed init attempt; doubled on every retry. Default: 1s.
    pub initial_retry_sleep_ms: u64,
    /// Number of time sync requests needed for one offset estimate. Default: 5.
    pub required_time_sync_requests: u32,
    /// Timeout of a single HTTP request. Default: 30s.
    pub http_timeout_ms: u64,
}

impl Default for CommunicationConfig {
    fn default() -> Self {
        Self {
            default_sleep_ms: ONE_SECOND_MS,
            status_check_interval_ms: TWO_HOURS_MS,
            time_sync_interval_ms: TWO_HOURS_MS,
            time_sync_retry_interval_ms: TWO_HOURS_MS,
            max_init_retries: 5,
            initial_retry_sleep_ms: ONE_SECOND_MS,
            required_time_sync_requests: 5,
            http_timeout_ms: 30 * ONE_SECOND_MS,
        }
    }
}

impl CommunicationConfig {
    pub fn default_sleep(&self) -> Duration {
        Duration::from_millis(self.default_sleep_ms)
    }

    pub fn status_check_interval(&self) -> Duration {
        Duration::from_millis(self.status_check_interval_ms)
    }

    pub fn time_sync_interval(&self) -> Duration {
        Duration::from_millis(self.time_sync_interval_ms)
    }

    pub fn time_sync_retry_interval(&self) -> Duration {
        Duration::from_millis(self.time_sync_retry_interval_ms)
    }

    pub fn initial_retry_sleep(&self) -> Duration {
        Duration::from_millis(self.initial_retry_sleep_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}
