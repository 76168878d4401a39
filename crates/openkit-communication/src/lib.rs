//! # openkit-communication
//!
//! The background side of the pipeline. [`BeaconSendingContext`] tracks open
//! and finished sessions and the worker's timing bookkeeping;
//! [`BeaconSendingState`] is the state machine it drives; [`BeaconSender`]
//! owns the worker thread that runs the machine until it turns terminal.

pub mod context;
pub mod init_signal;
pub mod sender;
pub mod state;

pub use context::BeaconSendingContext;
pub use init_signal::InitSignal;
pub use sender::BeaconSender;
pub use state::BeaconSendingState;
