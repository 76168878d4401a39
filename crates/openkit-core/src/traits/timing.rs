//! Clock abstraction and cluster time conversion.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use super::ShutdownToken;

pub trait TimingProvider: Send + Sync {
    /// Current local time in milliseconds since the epoch.
    fn provide_timestamp_in_millis(&self) -> i64;

    /// Sleep for `duration` unless shutdown is requested first.
    /// Returns `true` if the sleep was cut short by shutdown.
    fn sleep(&self, duration: Duration, shutdown: &ShutdownToken) -> bool;

    /// Store the result of a time sync.
    fn initialize(&self, cluster_time_offset: i64, time_sync_supported: bool);

    fn is_time_sync_supported(&self) -> bool;

    /// Convert a local timestamp to backend cluster time.
    fn convert_to_cluster_time(&self, timestamp: i64) -> i64;
}

/// Wall clock backed provider.
#[derive(Debug)]
pub struct DefaultTimingProvider {
    cluster_time_offset: AtomicI64,
    time_sync_supported: AtomicBool,
}

impl Default for DefaultTimingProvider {
    fn default() -> Self {
        Self {
            cluster_time_offset: AtomicI64::new(0),
            time_sync_supported: AtomicBool::new(true),
        }
    }
}

impl DefaultTimingProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimingProvider for DefaultTimingProvider {
    fn provide_timestamp_in_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn sleep(&self, duration: Duration, shutdown: &ShutdownToken) -> bool {
        shutdown.wait_timeout(duration)
    }

    fn initialize(&self, cluster_time_offset: i64, time_sync_supported: bool) {
        self.time_sync_supported
            .store(time_sync_supported, Ordering::SeqCst);
        let offset = if time_sync_supported {
            cluster_time_offset
        } else {
            0
        };
        self.cluster_time_offset.store(offset, Ordering::SeqCst);
    }

    fn is_time_sync_supported(&self) -> bool {
        self.time_sync_supported.load(Ordering::SeqCst)
    }

    fn convert_to_cluster_time(&self, timestamp: i64) -> i64 {
        timestamp + self.cluster_time_offset.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_ignored_when_unsupported() {
        let provider = DefaultTimingProvider::new();
        provider.initialize(500, false);
        assert!(!provider.is_time_sync_supported());
        assert_eq!(provider.convert_to_cluster_time(1000), 1000);

        provider.initialize(500, true);
        assert_eq!(provider.convert_to_cluster_time(1000), 1500);
    }
}
