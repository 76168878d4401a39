//! Typed beacon records before serialization.
//!
//! All times are milliseconds relative to the session start unless noted.

use openkit_core::EventType;
use serde::Serialize;

/// Fields shared by point-in-time events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventBase {
    pub name: String,
    pub thread_id: i32,
    pub parent_action_id: i32,
    pub sequence_no: i32,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    pub name: String,
    pub thread_id: i32,
    pub action_id: i32,
    pub parent_action_id: i32,
    pub start_sequence_no: i32,
    pub start_time: i64,
    pub end_sequence_no: i32,
    /// Duration of the action.
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebRequestRecord {
    pub url: String,
    pub thread_id: i32,
    pub parent_action_id: i32,
    pub start_sequence_no: i32,
    pub start_time: i64,
    pub end_sequence_no: i32,
    /// Duration of the request.
    pub duration: i64,
    pub response_code: i32,
    pub bytes_sent: i64,
    pub bytes_received: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportedValue {
    Int(i64),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BeaconEvent {
    Action(ActionRecord),
    SessionEnd {
        thread_id: i32,
        sequence_no: i32,
        time: i64,
    },
    NamedEvent(EventBase),
    Value {
        #[serde(flatten)]
        base: EventBase,
        value: ReportedValue,
    },
    Error {
        #[serde(flatten)]
        base: EventBase,
        error_code: i32,
        reason: String,
    },
    Crash {
        #[serde(flatten)]
        base: EventBase,
        reason: String,
        stacktrace: String,
    },
    WebRequest(WebRequestRecord),
    IdentifyUser(EventBase),
}

impl BeaconEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Action(_) => EventType::Action,
            Self::SessionEnd { .. } => EventType::SessionEnd,
            Self::NamedEvent(_) => EventType::NamedEvent,
            Self::Value { value, .. } => match value {
                ReportedValue::Int(_) => EventType::ValueInt,
                ReportedValue::Double(_) => EventType::ValueDouble,
                ReportedValue::String(_) => EventType::ValueString,
            },
            Self::Error { .. } => EventType::Error,
            Self::Crash { .. } => EventType::Crash,
            Self::WebRequest(_) => EventType::WebRequest,
            Self::IdentifyUser(_) => EventType::IdentifyUser,
        }
    }
}

/// Per-session data prefixed to every uploaded chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeaconHeader {
    pub protocol_version: u32,
    pub openkit_version: String,
    pub platform_type: u32,
    pub agent_technology_type: String,
    pub visitor_id: i64,
    pub session_number: i32,
    pub client_ip: String,
    /// Absolute session start, local clock.
    pub session_start_time: i64,
    /// Absolute session start, cluster clock.
    pub time_sync_time: i64,
    pub application_id: String,
    pub application_name: String,
    pub application_version: String,
    pub operating_system: String,
    pub manufacturer: String,
    pub model_id: String,
}
