//! # openkit
//!
//! Entry point of the beacon pipeline. Build an [`OpenKit`] from an
//! [`OpenKitConfig`], call [`OpenKit::initialize`] to start the sending
//! worker, and record user activity through the [`Session`]s it creates.
//!
//! ```no_run
//! use openkit::{OpenKit, OpenKitConfig};
//!
//! openkit::init_tracing();
//! let config = OpenKitConfig::load(None)?;
//! let openkit = OpenKit::from_config(config)?;
//! openkit.initialize()?;
//! openkit.wait_for_init();
//!
//! let session = openkit.create_session("10.0.0.1");
//! if let Some(action) = session.enter_action("checkout") {
//!     action.report_value_int("items", 3);
//!     action.leave_action();
//! }
//! session.end();
//! openkit.shutdown();
//! # Ok::<(), openkit::OpenKitError>(())
//! ```

pub mod openkit;

pub use crate::openkit::OpenKit;
pub use openkit_core::tracing_setup::init_tracing;
pub use openkit_core::{Connector, OpenKitConfig, OpenKitError, OpenKitResult};
pub use openkit_session::{Action, RootAction, Session, WebRequestTracer};
