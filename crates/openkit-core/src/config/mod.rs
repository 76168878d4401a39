//! Configuration system for OpenKit.
//! TOML-based, 3-layer resolution: env > file > defaults.
//!
//! [`OpenKitConfig`] is the immutable, user-supplied part. [`Configuration`]
//! wraps it together with the capture policy the server controls at runtime.

pub mod beacon_cache_config;
pub mod communication_config;
pub mod configuration;
pub mod openkit_config;
pub mod protocol_config;

pub use beacon_cache_config::BeaconCacheConfig;
pub use communication_config::CommunicationConfig;
pub use configuration::Configuration;
pub use openkit_config::OpenKitConfig;
pub use protocol_config::{ProtocolConfig, SerializationFormat};
