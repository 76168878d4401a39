//! Error handling for OpenKit.
//! One error enum per subsystem, `thiserror` only.
//!
//! Misuse of the application API (empty names, calls on ended sessions) is
//! never an error: it is logged and ignored.

pub mod config_error;
pub mod openkit_error;
pub mod transport_error;

pub use config_error::ConfigError;
pub use openkit_error::{OpenKitError, OpenKitResult};
pub use transport_error::TransportError;
