//! JSON wire format: one document per chunk.

use openkit_core::config::SerializationFormat;

use super::BeaconSerializer;
use crate::event::{BeaconEvent, BeaconHeader};

/// Serializes each record as a JSON object tagged with its event code, and
/// wraps a chunk as `{"header": {...}, "events": [...]}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl BeaconSerializer for JsonSerializer {
    fn format(&self) -> SerializationFormat {
        SerializationFormat::Json
    }

    fn encode_event(&self, event: &BeaconEvent) -> Option<String> {
        let mut value = match serde_json::to_value(event) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode beacon event, skipped");
                return None;
            }
        };
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "et".to_string(),
                serde_json::Value::from(event.event_type().protocol_value()),
            );
        }
        Some(value.to_string())
    }

    fn assemble(&self, header: &BeaconHeader, records: &[String]) -> Vec<u8> {
        let header = serde_json::to_string(header).unwrap_or_else(|_| "{}".to_string());
        format!("{{\"header\":{header},\"events\":[{}]}}", records.join(",")).into_bytes()
    }

    fn record_overhead(&self) -> usize {
        1
    }
}
