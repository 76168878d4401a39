//! Cooperative shutdown token with wake-ups for sleeping waiters.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct ShutdownState {
    requested: Mutex<bool>,
    wakeup: Condvar,
}

/// Shared shutdown flag.
///
/// Unlike a bare `AtomicBool`, waiters blocked in [`ShutdownToken::wait_timeout`]
/// return as soon as shutdown is requested.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    state: Arc<ShutdownState>,
}

impl ShutdownToken {
    /// Create a new token (shutdown not requested).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_shutdown_requested(&self) -> bool {
        *self
            .state
            .requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Request shutdown and wake every waiter. Idempotent.
    pub fn request_shutdown(&self) {
        let mut requested = self
            .state
            .requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *requested = true;
        self.state.wakeup.notify_all();
    }

    /// Block for up to `timeout` or until shutdown is requested.
    ///
    /// Returns `true` if shutdown has been requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut requested = self
            .state
            .requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        while !*requested {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let (guard, _) = self
                .state
                .wakeup
                .wait_timeout(requested, remaining)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            requested = guard;
        }
        *requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn wait_returns_false_after_timeout() {
        let token = ShutdownToken::new();
        assert!(!token.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn request_wakes_a_long_wait() {
        let token = ShutdownToken::new();
        let waiter = token.clone();
        let handle = thread::spawn(move || {
            let start = Instant::now();
            let interrupted = waiter.wait_timeout(Duration::from_secs(60));
            (interrupted, start.elapsed())
        });
        thread::sleep(Duration::from_millis(20));
        token.request_shutdown();
        let (interrupted, elapsed) = handle.join().unwrap();
        assert!(interrupted);
        assert!(elapsed < Duration::from_secs(10));
    }

    #[test]
    fn clones_share_state() {
        let token = ShutdownToken::new();
        let clone = token.clone();
        clone.request_shutdown();
        assert!(token.is_shutdown_requested());
        assert!(token.wait_timeout(Duration::from_secs(60)));
    }
}
