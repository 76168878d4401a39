//! Capture is off: wait out the status check interval, then ask again.

use std::time::Duration;

use super::{capture_state, BeaconSendingState};
use crate::context::BeaconSendingContext;

pub(super) fn execute(ctx: &BeaconSendingContext) -> BeaconSendingState {
    ctx.disable_capture();

    if ctx.is_time_sync_supported() && !ctx.is_time_synced() {
        return BeaconSendingState::TimeSync;
    }

    let interval = ctx
        .configuration()
        .settings()
        .communication
        .status_check_interval_ms as i64;
    let remaining = interval - (ctx.current_timestamp() - ctx.last_status_check_time());
    if remaining > 0 && ctx.sleep_for(Duration::from_millis(remaining as u64)) {
        return BeaconSendingState::CaptureOff;
    }

    let response = ctx.connector().send_status_request();
    ctx.set_last_status_check_time(ctx.current_timestamp());

    match response {
        Ok(response) => {
            ctx.handle_status_response(&response);
            capture_state(ctx)
        }
        Err(e) => {
            tracing::debug!(error = %e, "capture off: status request failed");
            BeaconSendingState::CaptureOff
        }
    }
}
