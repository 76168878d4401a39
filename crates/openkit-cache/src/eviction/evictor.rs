use openkit_core::config::BeaconCacheConfig;
use openkit_core::tracing_setup::events;

use super::{EvictionStrategy, SpaceEvictionStrategy, TimeEvictionStrategy};
use crate::BeaconCache;

/// Runs every enabled strategy, age first.
pub struct BeaconCacheEvictor {
    strategies: Vec<Box<dyn EvictionStrategy>>,
}

impl BeaconCacheEvictor {
    pub fn new(config: &BeaconCacheConfig) -> Self {
        Self::with_strategies(vec![
            Box::new(TimeEvictionStrategy::new(config)),
            Box::new(SpaceEvictionStrategy::new(config)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn EvictionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Run one eviction check. Returns the total number of records removed.
    pub fn evict(&self, cache: &BeaconCache, now: i64) -> usize {
        let mut total = 0;
        for strategy in self.strategies.iter().filter(|s| !s.is_disabled()) {
            let removed = strategy.execute(cache, now);
            if removed > 0 {
                events::cache_eviction(strategy.name(), removed, cache.num_bytes_in_cache());
            }
            total += removed;
        }
        total
    }

    /// True if no strategy would ever run.
    pub fn is_disabled(&self) -> bool {
        self.strategies.iter().all(|s| s.is_disabled())
    }
}

impl std::fmt::Debug for BeaconCacheEvictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("BeaconCacheEvictor")
            .field("strategies", &names)
            .finish()
    }
}
