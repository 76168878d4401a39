//! Wire-level models shared between the encoder, the connector and the
//! sending worker.

pub mod event_type;
pub mod status_response;
pub mod time_sync_response;

pub use event_type::EventType;
pub use status_response::StatusResponse;
pub use time_sync_response::TimeSyncResponse;

/// Parse an `&`-delimited `key=value` body into pairs.
///
/// Empty segments are skipped; a segment without `=` fails the whole body.
pub(crate) fn parse_key_values(body: &str) -> Result<Vec<(&str, &str)>, String> {
    body.trim()
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .split_once('=')
                .ok_or_else(|| format!("segment '{segment}' has no value"))
        })
        .collect()
}
