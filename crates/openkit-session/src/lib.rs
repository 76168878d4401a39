//! # openkit-session
//!
//! The application facing recording API: a [`Session`] owns open
//! [`RootAction`]s, a root action owns open child [`Action`]s, and both
//! action kinds can trace web requests. Every call validates its input,
//! becomes a no-op once its target has ended, and otherwise forwards to the
//! session's beacon.

pub mod action;
pub mod registry;
pub mod session;
pub mod web_request_tracer;

pub use action::{Action, RootAction};
pub use registry::SessionRegistry;
pub use session::Session;
pub use web_request_tracer::WebRequestTracer;

/// Reject an empty argument with a warning. Returns `true` if `value` is usable.
pub(crate) fn require_non_empty(operation: &str, argument: &str, value: &str) -> bool {
    if value.is_empty() {
        tracing::warn!(operation, argument, "{operation}: {argument} must not be empty");
        return false;
    }
    true
}
