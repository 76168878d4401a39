//! Cluster time offset estimation.
//!
//! Each round trip yields `offset = ((t1 - t0) + (t2 - t3)) / 2`, where `t0`
//! and `t3` are the local send and receive times and `t1` and `t2` the
//! server's receive and send times. The median of the configured number of
//! round trips becomes the cluster time offset.

use openkit_core::tracing_setup::events;

use super::{capture_state, BeaconSendingState};
use crate::context::BeaconSendingContext;

pub(super) fn execute(ctx: &BeaconSendingContext) -> BeaconSendingState {
    let communication = &ctx.configuration().settings().communication;
    let required = (communication.required_time_sync_requests as usize).max(1);
    let _span = openkit_core::time_sync_span!(required).entered();

    let mut offsets = Vec::with_capacity(required);
    while offsets.len() < required {
        if ctx.is_shutdown_requested() {
            return BeaconSendingState::TimeSync;
        }

        let request_send_time = ctx.current_timestamp();
        let response = match ctx.connector().send_time_sync_request() {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "time sync request failed");
                break;
            }
        };
        let response_receive_time = ctx.current_timestamp();

        if response.is_time_sync_unsupported() {
            ctx.disable_time_sync_support();
            events::time_sync_unsupported();
            return capture_state(ctx);
        }
        if !response.is_success() || !response.has_valid_timestamps() {
            tracing::debug!(code = response.response_code, "time sync response unusable");
            break;
        }

        offsets.push(
            ((response.request_receive_time - request_send_time)
                + (response.response_send_time - response_receive_time))
                / 2,
        );
    }

    match median_offset(&mut offsets) {
        Some(offset) if offsets.len() >= required => {
            ctx.initialize_time_sync(offset, true);
            ctx.set_last_time_sync_time(ctx.current_timestamp());
            events::time_sync_completed(offset);
            capture_state(ctx)
        }
        _ => {
            ctx.sleep_for(communication.time_sync_retry_interval());
            BeaconSendingState::TimeSync
        }
    }
}

/// Median of `offsets` (upper median for an even count). Sorts in place.
pub fn median_offset(offsets: &mut [i64]) -> Option<i64> {
    if offsets.is_empty() {
        return None;
    }
    offsets.sort_unstable();
    Some(offsets[offsets.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_and_even_counts() {
        assert_eq!(median_offset(&mut [5, 1, 3]), Some(3));
        assert_eq!(median_offset(&mut [4, 1, 3, 2]), Some(3));
        assert_eq!(median_offset(&mut []), None);
    }
}
