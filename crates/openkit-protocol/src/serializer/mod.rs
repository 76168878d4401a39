//! Wire serializers for beacon records.

pub mod json;
pub mod key_value;

pub use json::JsonSerializer;
pub use key_value::KeyValueSerializer;

use std::sync::Arc;

use openkit_core::config::SerializationFormat;

use crate::event::{BeaconEvent, BeaconHeader};

/// Encodes single records when they are captured and assembles cached
/// records into an upload payload when they are sent.
pub trait BeaconSerializer: Send + Sync {
    fn format(&self) -> SerializationFormat;

    /// Encode one record. `None` means the record cannot be encoded and is
    /// skipped.
    fn encode_event(&self, event: &BeaconEvent) -> Option<String>;

    /// Build the payload for one chunk of previously encoded records.
    fn assemble(&self, header: &BeaconHeader, records: &[String]) -> Vec<u8>;

    /// Bytes `assemble` adds per record on top of the record itself.
    fn record_overhead(&self) -> usize;
}

/// Serializer for the configured wire format.
pub fn serializer_for(format: SerializationFormat) -> Arc<dyn BeaconSerializer> {
    match format {
        SerializationFormat::KeyValue => Arc::new(KeyValueSerializer),
        SerializationFormat::Json => Arc::new(JsonSerializer),
    }
}
