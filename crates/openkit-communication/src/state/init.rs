//! Initial status request, retried with doubling backoff.

use openkit_core::tracing_setup::events;

use super::{capture_state, BeaconSendingState};
use crate::context::BeaconSendingContext;

pub(super) fn execute(ctx: &BeaconSendingContext) -> BeaconSendingState {
    let communication = &ctx.configuration().settings().communication;
    let max_retries = communication.max_init_retries;
    let mut backoff = communication.initial_retry_sleep();

    let now = ctx.current_timestamp();
    ctx.set_last_open_session_send_time(now);
    ctx.set_last_status_check_time(now);

    for attempt in 0..=max_retries {
        if attempt > 0 {
            tracing::debug!(
                "init: retry attempt {}/{} after {:?}",
                attempt,
                max_retries,
                backoff
            );
            if ctx.sleep_for(backoff) {
                break;
            }
            backoff *= 2;
        }
        if ctx.is_shutdown_requested() {
            break;
        }

        match ctx.connector().send_status_request() {
            Ok(response) if response.is_success() => {
                ctx.handle_status_response(&response);
                ctx.set_last_status_check_time(ctx.current_timestamp());
                ctx.init_completed(true);
                events::init_completed(true, attempt + 1);
                return capture_state(ctx);
            }
            Ok(response) => {
                tracing::debug!(code = response.response_code, "init: status request rejected");
            }
            Err(e) => {
                tracing::debug!(error = %e, "init: status request failed");
            }
        }
    }

    ctx.init_completed(false);
    events::init_completed(false, max_retries + 1);
    BeaconSendingState::Terminal
}
