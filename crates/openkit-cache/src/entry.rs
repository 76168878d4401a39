//! Records of one session.

use std::collections::VecDeque;

use crate::record::BeaconCacheRecord;

/// Pending records wait to be sent; in-flight records belong to the chunk
/// currently being transmitted and are either acknowledged or re-queued.
#[derive(Debug, Default)]
pub struct BeaconCacheEntry {
    pending: VecDeque<BeaconCacheRecord>,
    in_flight: Vec<BeaconCacheRecord>,
}

impl BeaconCacheEntry {
    pub fn add(&mut self, record: BeaconCacheRecord) {
        self.pending.push_back(record);
    }

    /// Move pending records into the in-flight set until `max_size` bytes are
    /// reached and return the data of every in-flight record. Each record
    /// counts `record_overhead` bytes on top of its own size.
    ///
    /// At least one record is moved when the in-flight set is empty, even if
    /// it exceeds `max_size` on its own.
    pub fn take_chunk(&mut self, max_size: i64, record_overhead: i64) -> Option<Vec<String>> {
        let cost = |r: &BeaconCacheRecord| r.size() + record_overhead;
        let mut chunk_size: i64 = self.in_flight.iter().map(cost).sum();

        while let Some(front) = self.pending.front() {
            if !self.in_flight.is_empty() && chunk_size + cost(front) > max_size {
                break;
            }
            if let Some(record) = self.pending.pop_front() {
                chunk_size += cost(&record);
                self.in_flight.push(record);
            }
        }

        if self.in_flight.is_empty() {
            return None;
        }
        Some(self.in_flight.iter().map(|r| r.data().to_string()).collect())
    }

    /// Drop acknowledged records. Returns the bytes released.
    pub fn acknowledge(&mut self) -> i64 {
        self.in_flight.drain(..).map(|r| r.size()).sum()
    }

    /// Put in-flight records back in front of the pending ones, preserving order.
    pub fn reset(&mut self) {
        for record in self.in_flight.drain(..).rev() {
            self.pending.push_front(record);
        }
    }

    /// Remove pending records created before `min_timestamp`. Returns
    /// `(records removed, bytes released)`.
    pub fn remove_older_than(&mut self, min_timestamp: i64) -> (usize, i64) {
        let before = self.pending.len();
        let mut released = 0;
        self.pending.retain(|r| {
            let keep = r.timestamp() >= min_timestamp;
            if !keep {
                released += r.size();
            }
            keep
        });
        (before - self.pending.len(), released)
    }

    /// Timestamp of the oldest pending record.
    pub fn oldest_pending_timestamp(&self) -> Option<i64> {
        self.pending.iter().map(BeaconCacheRecord::timestamp).min()
    }

    /// Remove the oldest pending record. Returns the bytes released.
    pub fn remove_oldest_pending(&mut self) -> Option<i64> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| r.timestamp())
            .map(|(i, _)| i)?;
        self.pending.remove(index).map(|r| r.size())
    }

    pub fn total_size(&self) -> i64 {
        self.pending
            .iter()
            .chain(self.in_flight.iter())
            .map(BeaconCacheRecord::size)
            .sum()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }

    pub fn pending_data(&self) -> Vec<String> {
        self.pending.iter().map(|r| r.data().to_string()).collect()
    }
}
