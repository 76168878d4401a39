//! Beacon cache eviction bounds.

use serde::{Deserialize, Serialize};

/// Records older than 1h 45min are evicted by default.
pub const DEFAULT_MAX_RECORD_AGE_MS: i64 = 105 * 60 * 1000;
/// Size eviction stops once the cache is below 80 MiB.
pub const DEFAULT_LOWER_MEMORY_BOUNDARY_BYTES: i64 = 80 * 1024 * 1024;
/// Size eviction starts once the cache exceeds 100 MiB.
pub const DEFAULT_UPPER_MEMORY_BOUNDARY_BYTES: i64 = 100 * 1024 * 1024;

/// Configuration for the in-memory beacon cache.
///
/// A negative value disables the corresponding eviction strategy. Size
/// eviction is also disabled unless `lower < upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconCacheConfig {
    /// Maximum age of a pending record in milliseconds.
    pub max_record_age_ms: i64,
    /// Size eviction drains the cache down to this many bytes.
    pub lower_memory_boundary_bytes: i64,
    /// Size eviction is triggered above this many bytes.
    pub upper_memory_boundary_bytes: i64,
}

impl Default for BeaconCacheConfig {
    fn default() -> Self {
        Self {
            max_record_age_ms: DEFAULT_MAX_RECORD_AGE_MS,
            lower_memory_boundary_bytes: DEFAULT_LOWER_MEMORY_BOUNDARY_BYTES,
            upper_memory_boundary_bytes: DEFAULT_UPPER_MEMORY_BOUNDARY_BYTES,
        }
    }
}

impl BeaconCacheConfig {
    pub fn new(max_record_age_ms: i64, lower: i64, upper: i64) -> Self {
        Self {
            max_record_age_ms,
            lower_memory_boundary_bytes: lower,
            upper_memory_boundary_bytes: upper,
        }
    }

    /// Whether age based eviction runs at all.
    pub fn is_age_eviction_enabled(&self) -> bool {
        self.max_record_age_ms >= 0
    }

    /// Whether size based eviction runs at all.
    pub fn is_space_eviction_enabled(&self) -> bool {
        self.lower_memory_boundary_bytes >= 0
            && self.upper_memory_boundary_bytes >= 0
            && self.lower_memory_boundary_bytes < self.upper_memory_boundary_bytes
    }
}
