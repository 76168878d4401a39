//! Shutdown: end every open session and upload what is left.

use openkit_core::tracing_setup::events;

use super::BeaconSendingState;
use crate::context::BeaconSendingContext;

pub(super) fn execute(ctx: &BeaconSendingContext) -> BeaconSendingState {
    for session in ctx.get_all_open_sessions() {
        session.end();
    }

    while let Some(session) = ctx.get_next_finished_session() {
        if ctx.is_capture_on() {
            if let Err(e) = session.send_beacon(ctx.connector()) {
                events::beacon_send_failed(session.session_number(), &e.to_string());
            }
        }
        session.clear_captured_data();
    }

    BeaconSendingState::Terminal
}
