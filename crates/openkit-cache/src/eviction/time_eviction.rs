use openkit_core::config::BeaconCacheConfig;

use super::EvictionStrategy;
use crate::BeaconCache;

/// Drops pending records older than the configured maximum age.
#[derive(Debug, Clone)]
pub struct TimeEvictionStrategy {
    config: BeaconCacheConfig,
}

impl TimeEvictionStrategy {
    pub fn new(config: &BeaconCacheConfig) -> Self {
        Self { config: *config }
    }
}

impl EvictionStrategy for TimeEvictionStrategy {
    fn name(&self) -> &'static str {
        "time"
    }

    fn is_disabled(&self) -> bool {
        !self.config.is_age_eviction_enabled()
    }

    fn execute(&self, cache: &BeaconCache, now: i64) -> usize {
        cache.evict_records_older_than(now.saturating_sub(self.config.max_record_age_ms))
    }
}
