//! Status response sent by the backend for status and beacon requests.

use serde::{Deserialize, Serialize};

use super::parse_key_values;
use crate::constants::UNSET;

const KEY_CAPTURE: &str = "cp";
const KEY_SEND_INTERVAL: &str = "si";
const KEY_MONITOR_NAME: &str = "bn";
const KEY_SERVER_ID: &str = "id";
const KEY_MAX_BEACON_SIZE: &str = "bl";
const KEY_CAPTURE_ERRORS: &str = "er";
const KEY_CAPTURE_CRASHES: &str = "cr";

/// Server controlled capture policy.
///
/// Numeric fields are `-1` when the server did not send them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub capture: bool,
    /// Send interval in milliseconds (`si` is sent in seconds).
    pub send_interval_ms: i64,
    pub monitor_name: Option<String>,
    pub server_id: i32,
    /// Maximum beacon size in bytes (`bl` is sent in kilobytes).
    pub max_beacon_size_bytes: i64,
    pub capture_errors: bool,
    pub capture_crashes: bool,
    pub response_code: u16,
}

impl StatusResponse {
    /// A response carrying only defaults and the given code.
    pub fn with_code(response_code: u16) -> Self {
        Self {
            capture: true,
            send_interval_ms: UNSET,
            monitor_name: None,
            server_id: UNSET as i32,
            max_beacon_size_bytes: UNSET,
            capture_errors: true,
            capture_crashes: true,
            response_code,
        }
    }

    /// Parse a `key=value&...` body.
    ///
    /// Unknown keys are ignored. If any value fails to parse, every field
    /// falls back to its default.
    pub fn parse(body: &str, response_code: u16) -> Self {
        let mut response = Self::with_code(response_code);
        match response.apply(body) {
            Ok(()) => response,
            Err(reason) => {
                tracing::warn!(%reason, "unparsable status response, using defaults");
                Self::with_code(response_code)
            }
        }
    }

    fn apply(&mut self, body: &str) -> Result<(), String> {
        for (key, value) in parse_key_values(body)? {
            match key {
                KEY_CAPTURE => self.capture = parse_num::<i64>(key, value)? == 1,
                KEY_SEND_INTERVAL => {
                    self.send_interval_ms = parse_num::<i64>(key, value)?.saturating_mul(1000)
                }
                KEY_MONITOR_NAME => self.monitor_name = Some(value.to_string()),
                KEY_SERVER_ID => self.server_id = parse_num::<i32>(key, value)?,
                KEY_MAX_BEACON_SIZE => {
                    self.max_beacon_size_bytes =
                        parse_num::<i64>(key, value)?.saturating_mul(1024)
                }
                KEY_CAPTURE_ERRORS => self.capture_errors = parse_num::<i64>(key, value)? != 0,
                KEY_CAPTURE_CRASHES => self.capture_crashes = parse_num::<i64>(key, value)? != 0,
                _ => {}
            }
        }
        Ok(())
    }

    /// 2xx response codes are successful; everything else disables capture.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.response_code)
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| format!("invalid value '{value}' for '{key}'"))
}
