//! Capture is on: upload finished sessions every iteration and open
//! sessions once per send interval.

use openkit_core::tracing_setup::events;
use openkit_core::StatusResponse;

use super::{capture_state, BeaconSendingState};
use crate::context::BeaconSendingContext;

pub(super) fn execute(ctx: &BeaconSendingContext) -> BeaconSendingState {
    if is_time_sync_required(ctx) {
        return BeaconSendingState::TimeSync;
    }

    if ctx.sleep() {
        return BeaconSendingState::CaptureOn;
    }

    ctx.evict_cache();

    let mut last_response = send_finished_sessions(ctx);
    if let Some(response) = send_open_sessions(ctx) {
        last_response = Some(response);
    }

    match last_response {
        Some(response) => {
            ctx.handle_status_response(&response);
            capture_state(ctx)
        }
        None => BeaconSendingState::CaptureOn,
    }
}

fn is_time_sync_required(ctx: &BeaconSendingContext) -> bool {
    if !ctx.is_time_sync_supported() {
        return false;
    }
    let last = ctx.last_time_sync_time();
    let interval = ctx
        .configuration()
        .settings()
        .communication
        .time_sync_interval_ms as i64;
    last < 0 || ctx.current_timestamp() - last > interval
}

/// Upload finished sessions until one fails; that one goes back into the
/// queue and the rest waits for the next iteration.
fn send_finished_sessions(ctx: &BeaconSendingContext) -> Option<StatusResponse> {
    let mut last_response = None;

    while let Some(session) = ctx.get_next_finished_session() {
        match session.send_beacon(ctx.connector()) {
            Ok(Some(response)) if !response.is_success() => {
                events::beacon_send_failed(
                    session.session_number(),
                    &format!("HTTP {}", response.response_code),
                );
                ctx.push_back_finished_session(session);
                return Some(response);
            }
            Ok(response) => {
                session.clear_captured_data();
                if response.is_some() {
                    last_response = response;
                }
            }
            Err(e) => {
                events::beacon_send_failed(session.session_number(), &e.to_string());
                ctx.push_back_finished_session(session);
                break;
            }
        }
    }

    last_response
}

fn send_open_sessions(ctx: &BeaconSendingContext) -> Option<StatusResponse> {
    let now = ctx.current_timestamp();
    if now <= ctx.last_open_session_send_time() + ctx.send_interval_ms() {
        return None;
    }

    let mut last_response = None;
    for session in ctx.get_all_open_sessions() {
        match session.send_beacon(ctx.connector()) {
            Ok(Some(response)) => {
                let failed = !response.is_success();
                last_response = Some(response);
                if failed {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                events::beacon_send_failed(session.session_number(), &e.to_string());
            }
        }
    }

    ctx.set_last_open_session_send_time(now);
    last_response
}
