//! Structured log events for key pipeline operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log a state machine transition.
pub fn state_transition(from: &str, to: &str) {
    tracing::debug!(
        event = "state_transition",
        from = %from,
        to = %to,
        "state transition"
    );
}

/// Log the outcome of the init phase.
pub fn init_completed(success: bool, attempts: u32) {
    if success {
        tracing::info!(event = "init_completed", attempts = attempts, "init completed");
    } else {
        tracing::warn!(event = "init_failed", attempts = attempts, "init failed");
    }
}

pub fn session_started(session_number: i32) {
    tracing::debug!(
        event = "session_started",
        session_number = session_number,
        "session started"
    );
}

pub fn session_finished(session_number: i32) {
    tracing::debug!(
        event = "session_finished",
        session_number = session_number,
        "session finished"
    );
}

/// Log records dropped by cache eviction.
pub fn cache_eviction(strategy: &str, records_removed: usize, bytes_in_cache: i64) {
    tracing::info!(
        event = "cache_eviction",
        strategy = %strategy,
        records_removed = records_removed,
        bytes_in_cache = bytes_in_cache,
        "beacon cache eviction"
    );
}

pub fn capture_disabled(cleared_sessions: usize) {
    tracing::info!(
        event = "capture_disabled",
        cleared_sessions = cleared_sessions,
        "capture disabled, session data cleared"
    );
}

pub fn time_sync_completed(cluster_time_offset: i64) {
    tracing::info!(
        event = "time_sync_completed",
        cluster_time_offset = cluster_time_offset,
        "time sync completed"
    );
}

pub fn time_sync_unsupported() {
    tracing::info!(
        event = "time_sync_unsupported",
        "backend does not support time sync, disabled"
    );
}

/// Log a failed beacon upload that will be retried.
pub fn beacon_send_failed(session_number: i32, reason: &str) {
    tracing::warn!(
        event = "beacon_send_failed",
        session_number = session_number,
        reason = %reason,
        "beacon send failed, data kept for retry"
    );
}
