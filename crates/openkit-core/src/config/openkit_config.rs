//! Top-level OpenKit configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{BeaconCacheConfig, CommunicationConfig, ProtocolConfig, SerializationFormat};
use crate::constants::{
    DEFAULT_APPLICATION_VERSION, DEFAULT_MANUFACTURER, DEFAULT_MODEL_ID, DEFAULT_OPERATING_SYSTEM,
};
use crate::errors::ConfigError;

/// Environment variables read by [`OpenKitConfig::apply_env_overrides`].
pub const ENV_VARS: &[&str] = &[
    "OPENKIT_ENDPOINT_URL",
    "OPENKIT_APPLICATION_ID",
    "OPENKIT_APPLICATION_NAME",
    "OPENKIT_DEVICE_ID",
    "OPENKIT_CACHE_MAX_RECORD_AGE_MS",
    "OPENKIT_CACHE_LOWER_BOUNDARY_BYTES",
    "OPENKIT_CACHE_UPPER_BOUNDARY_BYTES",
    "OPENKIT_DEFAULT_SLEEP_MS",
    "OPENKIT_MAX_INIT_RETRIES",
    "OPENKIT_PROTOCOL_FORMAT",
];

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`OPENKIT_*`)
/// 2. Config file passed to [`OpenKitConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenKitConfig {
    /// Base URL of the monitoring backend.
    pub endpoint_url: String,
    pub application_id: String,
    pub application_name: String,
    pub application_version: String,
    /// Visitor id reported as `vi`.
    pub device_id: i64,
    pub operating_system: String,
    pub manufacturer: String,
    pub model_id: String,
    pub beacon_cache: BeaconCacheConfig,
    pub communication: CommunicationConfig,
    pub protocol: ProtocolConfig,
}

impl Default for OpenKitConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            application_id: String::new(),
            application_name: String::new(),
            application_version: DEFAULT_APPLICATION_VERSION.to_string(),
            device_id: 0,
            operating_system: DEFAULT_OPERATING_SYSTEM.to_string(),
            manufacturer: DEFAULT_MANUFACTURER.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            beacon_cache: BeaconCacheConfig::default(),
            communication: CommunicationConfig::default(),
            protocol: ProtocolConfig::default(),
        }
    }
}

impl OpenKitConfig {
    /// Configuration with the three mandatory identity values set and
    /// everything else defaulted.
    pub fn new(
        endpoint_url: impl Into<String>,
        application_id: impl Into<String>,
        device_id: i64,
    ) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            application_id: application_id.into(),
            device_id,
            ..Self::default()
        }
    }

    /// Load configuration with layered resolution.
    ///
    /// A `path` that does not exist is an error; pass `None` to skip the file
    /// layer entirely.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };

        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;

        tracing::debug!(
            endpoint = %config.endpoint_url,
            application_id = %config.application_id,
            format = config.protocol.format.name(),
            "openkit config resolved"
        );
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialize>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &OpenKitConfig) -> Result<(), ConfigError> {
        if config.endpoint_url.trim().is_empty() {
            return Err(invalid("endpoint_url", "must not be empty"));
        }
        if config.application_id.trim().is_empty() {
            return Err(invalid("application_id", "must not be empty"));
        }
        if config.device_id < 0 {
            return Err(invalid("device_id", "must not be negative"));
        }
        if config.communication.max_init_retries == 0 {
            return Err(invalid(
                "communication.max_init_retries",
                "must be greater than 0",
            ));
        }
        if config.communication.required_time_sync_requests == 0 {
            return Err(invalid(
                "communication.required_time_sync_requests",
                "must be greater than 0",
            ));
        }
        if config.protocol.max_name_length == 0 {
            return Err(invalid("protocol.max_name_length", "must be greater than 0"));
        }
        Ok(())
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply environment variable overrides. Unparsable values are ignored.
    fn apply_env_overrides(config: &mut OpenKitConfig) {
        if let Ok(val) = std::env::var("OPENKIT_ENDPOINT_URL") {
            config.endpoint_url = val;
        }
        if let Ok(val) = std::env::var("OPENKIT_APPLICATION_ID") {
            config.application_id = val;
        }
        if let Ok(val) = std::env::var("OPENKIT_APPLICATION_NAME") {
            config.application_name = val;
        }
        if let Ok(val) = std::env::var("OPENKIT_DEVICE_ID") {
            if let Ok(v) = val.parse::<i64>() {
                config.device_id = v;
            }
        }
        if let Ok(val) = std::env::var("OPENKIT_CACHE_MAX_RECORD_AGE_MS") {
            if let Ok(v) = val.parse::<i64>() {
                config.beacon_cache.max_record_age_ms = v;
            }
        }
        if let Ok(val) = std::env::var("OPENKIT_CACHE_LOWER_BOUNDARY_BYTES") {
            if let Ok(v) = val.parse::<i64>() {
                config.beacon_cache.lower_memory_boundary_bytes = v;
            }
        }
        if let Ok(val) = std::env::var("OPENKIT_CACHE_UPPER_BOUNDARY_BYTES") {
            if let Ok(v) = val.parse::<i64>() {
                config.beacon_cache.upper_memory_boundary_bytes = v;
            }
        }
        if let Ok(val) = std::env::var("OPENKIT_DEFAULT_SLEEP_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.communication.default_sleep_ms = v;
            }
        }
        if let Ok(val) = std::env::var("OPENKIT_MAX_INIT_RETRIES") {
            if let Ok(v) = val.parse::<u32>() {
                config.communication.max_init_retries = v;
            }
        }
        if let Ok(val) = std::env::var("OPENKIT_PROTOCOL_FORMAT") {
            if let Ok(v) = val.parse::<SerializationFormat>() {
                config.protocol.format = v;
            }
        }
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
