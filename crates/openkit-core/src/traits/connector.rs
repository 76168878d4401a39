//! Connection to the monitoring backend.

use crate::errors::TransportError;
use crate::models::{StatusResponse, TimeSyncResponse};

/// Sends requests to exactly one monitoring backend.
///
/// An `Err` means no HTTP response was received at all. Responses with a
/// non-2xx code are returned as `Ok` and judged by the caller.
pub trait Connector: Send + Sync {
    /// Ask the backend for its current capture policy.
    fn send_status_request(&self) -> Result<StatusResponse, TransportError>;

    /// Upload one serialized beacon chunk on behalf of `client_ip`.
    fn send_beacon_request(
        &self,
        client_ip: &str,
        payload: &[u8],
    ) -> Result<StatusResponse, TransportError>;

    /// One round trip of the cluster time synchronization.
    fn send_time_sync_request(&self) -> Result<TimeSyncResponse, TransportError>;
}
