//! One-shot completion signal for the init phase.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use openkit_core::ShutdownToken;

/// Set once by the worker when init finished, successfully or not.
/// Waiters are also released when shutdown is requested.
#[derive(Debug, Default)]
pub struct InitSignal {
    result: Mutex<Option<bool>>,
    changed: Condvar,
}

impl InitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<bool>> {
        self.result.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the init outcome. Only the first call has any effect.
    pub fn complete(&self, success: bool) -> bool {
        let mut result = self.lock();
        if result.is_some() {
            return false;
        }
        *result = Some(success);
        self.changed.notify_all();
        true
    }

    /// `None` while init is still running.
    pub fn result(&self) -> Option<bool> {
        *self.lock()
    }

    /// Wake every waiter so it can observe a shutdown request.
    pub fn interrupt(&self) {
        let _guard = self.lock();
        self.changed.notify_all();
    }

    /// Block until init completed or shutdown was requested.
    pub fn wait(&self, shutdown: &ShutdownToken) -> bool {
        let mut result = self.lock();
        loop {
            if let Some(success) = *result {
                return success;
            }
            if shutdown.is_shutdown_requested() {
                return false;
            }
            result = self
                .changed
                .wait(result)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`InitSignal::wait`], giving up with `false` after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration, shutdown: &ShutdownToken) -> bool {
        let deadline = Instant::now() + timeout;
        let mut result = self.lock();
        loop {
            if let Some(success) = *result {
                return success;
            }
            if shutdown.is_shutdown_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            result = self
                .changed
                .wait_timeout(result, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}
