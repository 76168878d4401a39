//! Response of a time sync request.

use serde::{Deserialize, Serialize};

use super::parse_key_values;
use crate::constants::UNSET;

const KEY_REQUEST_RECEIVE_TIME: &str = "t1";
const KEY_RESPONSE_SEND_TIME: &str = "t2";

/// Server side timestamps of one time sync round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSyncResponse {
    /// Server time the request was received (`t1`), `-1` if missing.
    pub request_receive_time: i64,
    /// Server time the response was sent (`t2`), `-1` if missing.
    pub response_send_time: i64,
    pub response_code: u16,
}

/// Servers without time sync support answer with this code.
pub const TIME_SYNC_UNSUPPORTED_CODE: u16 = 400;

impl TimeSyncResponse {
    pub fn with_code(response_code: u16) -> Self {
        Self {
            request_receive_time: UNSET,
            response_send_time: UNSET,
            response_code,
        }
    }

    /// Parse a `t1=...&t2=...` body. Unparsable bodies leave both times unset.
    pub fn parse(body: &str, response_code: u16) -> Self {
        let mut response = Self::with_code(response_code);
        let Ok(pairs) = parse_key_values(body) else {
            return response;
        };
        for (key, value) in pairs {
            let parsed = value.trim().parse::<i64>().ok();
            match (key, parsed) {
                (KEY_REQUEST_RECEIVE_TIME, Some(v)) => response.request_receive_time = v,
                (KEY_RESPONSE_SEND_TIME, Some(v)) => response.response_send_time = v,
                _ => {}
            }
        }
        response
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.response_code)
    }

    pub fn is_time_sync_unsupported(&self) -> bool {
        self.response_code == TIME_SYNC_UNSUPPORTED_CODE
    }

    /// Both server timestamps are present and ordered.
    pub fn has_valid_timestamps(&self) -> bool {
        self.request_receive_time > UNSET
            && self.response_send_time > UNSET
            && self.request_receive_time <= self.response_send_time
    }
}
