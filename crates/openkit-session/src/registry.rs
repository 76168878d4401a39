use std::sync::Arc;

use crate::Session;

/// Receives session lifecycle notifications. Implemented by the
/// transmission context, which tracks open and finished sessions.
pub trait SessionRegistry: Send + Sync {
    /// A new session was created. Returns `false` if the registry no
    /// longer accepts sessions; the session then starts out ended.
    fn start_session(&self, session: Arc<Session>) -> bool;

    /// A session ended. Must be a no-op for sessions that are not open.
    fn finish_session(&self, session: &Arc<Session>);
}
