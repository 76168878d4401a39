use serde::{Deserialize, Serialize};

/// Kind of a beacon record, sent as `et`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Action,
    NamedEvent,
    ValueString,
    ValueInt,
    ValueDouble,
    SessionEnd,
    WebRequest,
    Error,
    Crash,
    IdentifyUser,
}

impl EventType {
    /// Numeric code used on the wire.
    pub fn protocol_value(self) -> u32 {
        match self {
            Self::Action => 1,
            Self::NamedEvent => 10,
            Self::ValueString => 11,
            Self::ValueInt => 12,
            Self::ValueDouble => 13,
            Self::SessionEnd => 19,
            Self::WebRequest => 30,
            Self::Error => 40,
            Self::Crash => 50,
            Self::IdentifyUser => 60,
        }
    }

    pub fn from_protocol_value(value: u32) -> Option<Self> {
        Some(match value {
            1 => Self::Action,
            10 => Self::NamedEvent,
            11 => Self::ValueString,
            12 => Self::ValueInt,
            13 => Self::ValueDouble,
            19 => Self::SessionEnd,
            30 => Self::WebRequest,
            40 => Self::Error,
            50 => Self::Crash,
            60 => Self::IdentifyUser,
            _ => return None,
        })
    }
}
