//! A monitored user session.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use openkit_core::constants::UNSET;
use openkit_core::{Connector, StatusResponse, SynchronizedQueue, TransportError};
use openkit_protocol::Beacon;

use crate::action::RootAction;
use crate::registry::SessionRegistry;
use crate::require_non_empty;

/// One session of the host application.
///
/// Created open and registered with its [`SessionRegistry`]. `end` is
/// decided by a compare-and-set on the end time, so concurrent calls
/// produce exactly one end-of-session record.
///
/// Reports hold `end_gate` for reading; `end` takes it for writing to set
/// the end time, so a report either lands before the end record or is
/// dropped.
pub struct Session {
    beacon: Arc<Beacon>,
    registry: Weak<dyn SessionRegistry>,
    end_gate: RwLock<()>,
    end_time: AtomicI64,
    open_root_actions: Arc<SynchronizedQueue<Arc<RootAction>>>,
}

impl Session {
    /// Create a session and register it as open. A session the registry
    /// refuses is ended from the start and records nothing.
    pub fn new(beacon: Beacon, registry: Weak<dyn SessionRegistry>) -> Arc<Self> {
        let session = Arc::new(Self {
            beacon: Arc::new(beacon),
            registry,
            end_gate: RwLock::new(()),
            end_time: AtomicI64::new(UNSET),
            open_root_actions: Arc::new(SynchronizedQueue::new()),
        });
        if let Some(registry) = session.registry.upgrade() {
            if !registry.start_session(Arc::clone(&session)) {
                let now = session.beacon.current_timestamp();
                session.end_time.store(now, Ordering::SeqCst);
            }
        }
        session
    }

    pub fn beacon(&self) -> &Beacon {
        &self.beacon
    }

    pub fn session_number(&self) -> i32 {
        self.beacon.session_number()
    }

    /// `-1` while the session is open.
    pub fn end_time(&self) -> i64 {
        self.end_time.load(Ordering::SeqCst)
    }

    pub fn is_ended(&self) -> bool {
        self.end_time() != UNSET
    }

    pub fn open_root_action_count(&self) -> usize {
        self.open_root_actions.len()
    }

    /// Run `f` unless the session has ended. `end` cannot pass while `f` runs.
    fn while_open<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let _gate = self.end_gate.read().unwrap_or_else(PoisonError::into_inner);
        if self.is_ended() {
            return None;
        }
        Some(f())
    }

    /// Open a root action. `None` for an empty name or an ended session.
    pub fn enter_action(&self, name: &str) -> Option<Arc<RootAction>> {
        if !require_non_empty("Session.enterAction", "actionName", name) {
            return None;
        }

        self.while_open(|| {
            let action = Arc::new(RootAction::new(
                Arc::clone(&self.beacon),
                name,
                Arc::downgrade(&self.open_root_actions),
            ));
            self.open_root_actions.put(Arc::clone(&action));
            action
        })
    }

    /// Tag this session with a user identifier.
    pub fn identify_user(&self, user_tag: &str) {
        if !require_non_empty("Session.identifyUser", "userTag", user_tag) {
            return;
        }
        self.while_open(|| self.beacon.identify_user(user_tag));
    }

    pub fn report_crash(&self, error_name: &str, reason: &str, stacktrace: &str) {
        if !require_non_empty("Session.reportCrash", "errorName", error_name) {
            return;
        }
        self.while_open(|| self.beacon.report_crash(error_name, reason, stacktrace));
    }

    pub fn report_event(&self, name: &str) {
        if !require_non_empty("Session.reportEvent", "eventName", name) {
            return;
        }
        self.while_open(|| self.beacon.report_event(0, name));
    }

    pub fn report_value_int(&self, name: &str, value: i64) {
        if !require_non_empty("Session.reportValue", "valueName", name) {
            return;
        }
        self.while_open(|| self.beacon.report_value_int(0, name, value));
    }

    pub fn report_value_double(&self, name: &str, value: f64) {
        if !require_non_empty("Session.reportValue", "valueName", name) {
            return;
        }
        self.while_open(|| self.beacon.report_value_double(0, name, value));
    }

    pub fn report_value_string(&self, name: &str, value: &str) {
        if !require_non_empty("Session.reportValue", "valueName", name) {
            return;
        }
        self.while_open(|| self.beacon.report_value_string(0, name, value));
    }

    pub fn report_error(&self, name: &str, error_code: i32, reason: &str) {
        if !require_non_empty("Session.reportError", "errorName", name) {
            return;
        }
        self.while_open(|| self.beacon.report_error(0, name, error_code, reason));
    }

    /// End the session: leave open root actions, record the end, and hand
    /// the session over to the registry's finished set. Only the first call
    /// has any effect.
    pub fn end(self: &Arc<Self>) {
        let now = self.beacon.current_timestamp();
        {
            let _gate = self.end_gate.write().unwrap_or_else(PoisonError::into_inner);
            if self
                .end_time
                .compare_exchange(UNSET, now, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return;
            }
        }

        while let Some(action) = self.open_root_actions.get() {
            action.leave_action();
        }

        self.beacon.end_session();

        if let Some(registry) = self.registry.upgrade() {
            registry.finish_session(self);
        }
    }

    /// Upload this session's cached records.
    pub fn send_beacon(
        &self,
        connector: &dyn Connector,
    ) -> Result<Option<StatusResponse>, TransportError> {
        self.beacon.send(connector)
    }

    /// Drop every cached record of this session.
    pub fn clear_captured_data(&self) {
        self.beacon.clear_data();
    }

    /// No cached records left.
    pub fn is_empty(&self) -> bool {
        self.beacon.is_empty()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("session_number", &self.session_number())
            .field("end_time", &self.end_time())
            .field("open_root_actions", &self.open_root_action_count())
            .finish()
    }
}
