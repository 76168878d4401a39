//! BeaconCache: concurrent per-session record buffers via DashMap.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;

use crate::entry::BeaconCacheEntry;
use crate::record::BeaconCacheRecord;

/// Thread-safe beacon cache keyed by session number.
///
/// The total size is the sum of all pending and in-flight record sizes and
/// is kept in an atomic so eviction can check it without walking the map.
#[derive(Debug, Default)]
pub struct BeaconCache {
    entries: DashMap<i32, BeaconCacheEntry>,
    total_size: AtomicI64,
}

impl BeaconCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a serialized record for `session_key`.
    pub fn add_record(&self, session_key: i32, timestamp: i64, data: String) {
        let record = BeaconCacheRecord::new(timestamp, data);
        let size = record.size();
        self.entries.entry(session_key).or_default().add(record);
        self.total_size.fetch_add(size, Ordering::SeqCst);
    }

    /// Move pending records of `session_key` into the in-flight set, up to
    /// `max_size` bytes, and return every in-flight record's data.
    /// `record_overhead` is the separator size the payload adds per record.
    ///
    /// Returns `None` if the session has nothing to send.
    pub fn get_next_beacon_chunk(
        &self,
        session_key: i32,
        max_size: i64,
        record_overhead: i64,
    ) -> Option<Vec<String>> {
        self.entries
            .get_mut(&session_key)
            .and_then(|mut entry| entry.take_chunk(max_size, record_overhead))
    }

    /// Acknowledge the in-flight chunk: its records are dropped.
    pub fn remove_chunked_data(&self, session_key: i32) {
        if let Some(mut entry) = self.entries.get_mut(&session_key) {
            let released = entry.acknowledge();
            self.total_size.fetch_sub(released, Ordering::SeqCst);
        }
    }

    /// Re-queue the in-flight chunk in front of the pending records.
    pub fn reset_chunked_data(&self, session_key: i32) {
        if let Some(mut entry) = self.entries.get_mut(&session_key) {
            entry.reset();
        }
    }

    /// Drop all records of `session_key`.
    pub fn delete_cache_entry(&self, session_key: i32) {
        if let Some((_, entry)) = self.entries.remove(&session_key) {
            self.total_size
                .fetch_sub(entry.total_size(), Ordering::SeqCst);
        }
    }

    /// True if the session has neither pending nor in-flight records.
    pub fn is_empty(&self, session_key: i32) -> bool {
        self.entries
            .get(&session_key)
            .map(|e| e.is_empty())
            .unwrap_or(true)
    }

    pub fn num_bytes_in_cache(&self) -> i64 {
        self.total_size.load(Ordering::SeqCst)
    }

    pub fn session_keys(&self) -> Vec<i32> {
        self.entries.iter().map(|r| *r.key()).collect()
    }

    /// Number of pending plus in-flight records of `session_key`.
    pub fn record_count(&self, session_key: i32) -> usize {
        self.entries
            .get(&session_key)
            .map(|e| e.pending_count() + e.in_flight_count())
            .unwrap_or(0)
    }

    /// Data of the pending records of `session_key`, oldest first.
    pub fn pending_records(&self, session_key: i32) -> Vec<String> {
        self.entries
            .get(&session_key)
            .map(|e| e.pending_data())
            .unwrap_or_default()
    }

    /// Remove pending records created before `min_timestamp`, in every session.
    /// Returns the number of records removed.
    pub fn evict_records_older_than(&self, min_timestamp: i64) -> usize {
        let mut removed = 0;
        for mut entry in self.entries.iter_mut() {
            let (count, released) = entry.remove_older_than(min_timestamp);
            removed += count;
            self.total_size.fetch_sub(released, Ordering::SeqCst);
        }
        removed
    }

    /// Remove the single oldest pending record across all sessions.
    /// Returns `false` if no pending record exists.
    pub fn evict_oldest_record(&self) -> bool {
        // Find first, then lock one shard: holding an iterator guard while
        // calling `get_mut` on the same map can deadlock.
        let oldest = self
            .entries
            .iter()
            .filter_map(|r| r.oldest_pending_timestamp().map(|ts| (ts, *r.key())))
            .min();

        let Some((_, key)) = oldest else {
            return false;
        };

        match self
            .entries
            .get_mut(&key)
            .and_then(|mut entry| entry.remove_oldest_pending())
        {
            Some(released) => {
                self.total_size.fetch_sub(released, Ordering::SeqCst);
                true
            }
            // Raced with a sender taking the record in flight; caller retries.
            None => true,
        }
    }
}
