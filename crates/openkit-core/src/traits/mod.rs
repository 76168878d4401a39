//! Seams between the pipeline and its environment: the backend connection,
//! the clock, thread identity and cooperative shutdown.

pub mod connector;
pub mod shutdown;
pub mod thread_id;
pub mod timing;

pub use connector::Connector;
pub use shutdown::ShutdownToken;
pub use thread_id::{DefaultThreadIdProvider, ThreadIdProvider};
pub use timing::{DefaultTimingProvider, TimingProvider};
