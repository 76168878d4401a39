//! # openkit-core
//!
//! Foundation crate for the OpenKit beacon pipeline.
//! Defines the shared types, provider traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod sync;
pub mod tracing_setup;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{Configuration, OpenKitConfig};
pub use errors::{OpenKitError, OpenKitResult, TransportError};
pub use models::{EventType, StatusResponse, TimeSyncResponse};
pub use sync::SynchronizedQueue;
pub use traits::{Connector, ShutdownToken, ThreadIdProvider, TimingProvider};
