//! # openkit-cache
//!
//! In-memory store of serialized beacon records, keyed by session number.
//!
//! Producers append records from any thread; the sending worker takes chunks
//! out, acknowledges or re-queues them, and periodically runs eviction to
//! bound the memory held by unsent data.

pub mod cache;
pub mod entry;
pub mod eviction;
pub mod record;

pub use cache::BeaconCache;
pub use eviction::{BeaconCacheEvictor, EvictionStrategy, SpaceEvictionStrategy, TimeEvictionStrategy};
pub use record::BeaconCacheRecord;
