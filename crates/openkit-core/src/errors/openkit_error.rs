//! Top-level error aggregating subsystem errors via `From` conversions.

use super::{ConfigError, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum OpenKitError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn beacon sending worker: {reason}")]
    WorkerSpawn { reason: String },

    #[error("OpenKit is already initialized")]
    AlreadyInitialized,
}

pub type OpenKitResult<T> = Result<T, OpenKitError>;
