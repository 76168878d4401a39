//! Span definitions for the sending worker and beacon uploads.

/// Create a span around one state machine step.
#[macro_export]
macro_rules! state_span {
    ($state:expr) => {
        tracing::debug_span!("openkit.state", state = %$state)
    };
}

/// Create a span around the upload of one session's beacon.
#[macro_export]
macro_rules! beacon_send_span {
    ($session_number:expr) => {
        tracing::debug_span!("openkit.beacon_send", session_number = $session_number)
    };
}

/// Create a span around a time sync round.
#[macro_export]
macro_rules! time_sync_span {
    ($requests:expr) => {
        tracing::debug_span!("openkit.time_sync", requests = $requests)
    };
}
