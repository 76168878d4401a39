//! Wire format selection.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_NAME_LEN;

/// Serialization format of beacon payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializationFormat {
    /// `&`-delimited, URL-encoded mobile protocol v3.
    #[default]
    KeyValue,
    /// One JSON document per beacon chunk.
    Json,
}

impl SerializationFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::KeyValue => "key_value",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for SerializationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "key_value" | "keyvalue" | "kv" => Ok(Self::KeyValue),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown serialization format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub format: SerializationFormat,
    /// Names are trimmed and cut to this many characters. Default: 250.
    pub max_name_length: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            format: SerializationFormat::default(),
            max_name_length: MAX_NAME_LEN,
        }
    }
}
