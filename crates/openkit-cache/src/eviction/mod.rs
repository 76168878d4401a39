//! Eviction strategies bounding the memory held by unsent records.

pub mod evictor;
pub mod space_eviction;
pub mod time_eviction;

pub use evictor::BeaconCacheEvictor;
pub use space_eviction::SpaceEvictionStrategy;
pub use time_eviction::TimeEvictionStrategy;

use crate::BeaconCache;

/// One eviction pass over the cache.
pub trait EvictionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Disabled strategies are skipped by the evictor.
    fn is_disabled(&self) -> bool;

    /// Run once at time `now` (ms since epoch). Returns records removed.
    fn execute(&self, cache: &BeaconCache, now: i64) -> usize;
}
