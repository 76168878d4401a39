use openkit_core::config::BeaconCacheConfig;

use super::EvictionStrategy;
use crate::BeaconCache;

/// Once the cache grows above the upper boundary, drops the globally oldest
/// pending records until it is back at or below the lower boundary.
#[derive(Debug, Clone)]
pub struct SpaceEvictionStrategy {
    config: BeaconCacheConfig,
}

impl SpaceEvictionStrategy {
    pub fn new(config: &BeaconCacheConfig) -> Self {
        Self { config: *config }
    }
}

impl EvictionStrategy for SpaceEvictionStrategy {
    fn name(&self) -> &'static str {
        "space"
    }

    fn is_disabled(&self) -> bool {
        !self.config.is_space_eviction_enabled()
    }

    fn execute(&self, cache: &BeaconCache, _now: i64) -> usize {
        if cache.num_bytes_in_cache() <= self.config.upper_memory_boundary_bytes {
            return 0;
        }

        let mut removed = 0;
        while cache.num_bytes_in_cache() > self.config.lower_memory_boundary_bytes {
            if !cache.evict_oldest_record() {
                // Only in-flight data left.
                break;
            }
            removed += 1;
        }
        removed
    }
}
