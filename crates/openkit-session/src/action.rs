//! Root actions and their child actions.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use openkit_core::constants::UNSET;
use openkit_core::SynchronizedQueue;
use openkit_protocol::{ActionData, Beacon};

use crate::web_request_tracer::WebRequestTracer;
use crate::require_non_empty;

/// State shared by both action kinds.
#[derive(Debug)]
struct ActionCore {
    id: i32,
    parent_id: i32,
    name: String,
    start_time: i64,
    start_sequence_no: i32,
    /// Set by the first `leave_action`, under `leave_lock`.
    left: AtomicBool,
    /// Held while leaving and while reporting, so no record of this action
    /// is written after its action record and a second `leave_action`
    /// returns only once the first one has written that record.
    leave_lock: Mutex<()>,
    end_time: AtomicI64,
    end_sequence_no: AtomicI32,
    beacon: Arc<Beacon>,
}

impl ActionCore {
    fn new(beacon: Arc<Beacon>, name: &str, parent_id: i32) -> Self {
        Self {
            id: beacon.create_id(),
            parent_id,
            name: name.to_string(),
            start_time: beacon.current_timestamp(),
            start_sequence_no: beacon.create_sequence_number(),
            left: AtomicBool::new(false),
            leave_lock: Mutex::new(()),
            end_time: AtomicI64::new(UNSET),
            end_sequence_no: AtomicI32::new(UNSET as i32),
            beacon,
        }
    }

    fn is_left(&self) -> bool {
        self.left.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.leave_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the leave lock unless the action was left.
    fn while_open<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let _guard = self.lock();
        if self.is_left() {
            return None;
        }
        Some(f())
    }

    /// Mark the action left. Only the first caller gets `true`; callers must
    /// hold `leave_lock`.
    fn mark_left(&self) -> bool {
        !self.left.swap(true, Ordering::SeqCst)
    }

    /// Stamp end time and sequence number, then emit the action record.
    fn finish(&self) {
        let end_time = self.beacon.current_timestamp();
        let end_sequence_no = self.beacon.create_sequence_number();
        self.end_time.store(end_time, Ordering::SeqCst);
        self.end_sequence_no.store(end_sequence_no, Ordering::SeqCst);

        self.beacon.add_action(&ActionData {
            id: self.id,
            parent_id: self.parent_id,
            name: &self.name,
            start_time: self.start_time,
            start_sequence_no: self.start_sequence_no,
            end_time,
            end_sequence_no,
        });
    }

    fn report_event(&self, operation: &str, name: &str) {
        if !require_non_empty(operation, "eventName", name) {
            return;
        }
        self.while_open(|| self.beacon.report_event(self.id, name));
    }

    fn report_value_int(&self, operation: &str, name: &str, value: i64) {
        if !require_non_empty(operation, "valueName", name) {
            return;
        }
        self.while_open(|| self.beacon.report_value_int(self.id, name, value));
    }

    fn report_value_double(&self, operation: &str, name: &str, value: f64) {
        if !require_non_empty(operation, "valueName", name) {
            return;
        }
        self.while_open(|| self.beacon.report_value_double(self.id, name, value));
    }

    fn report_value_string(&self, operation: &str, name: &str, value: &str) {
        if !require_non_empty(operation, "valueName", name) {
            return;
        }
        self.while_open(|| self.beacon.report_value_string(self.id, name, value));
    }

    fn report_error(&self, operation: &str, name: &str, error_code: i32, reason: &str) {
        if !require_non_empty(operation, "errorName", name) {
            return;
        }
        self.while_open(|| self.beacon.report_error(self.id, name, error_code, reason));
    }

    fn trace_web_request(&self, operation: &str, url: &str) -> Option<WebRequestTracer> {
        if !require_non_empty(operation, "url", url) {
            return None;
        }
        self.while_open(|| WebRequestTracer::new(Arc::clone(&self.beacon), self.id, url))
            .flatten()
    }
}

/// A top-level action of a session.
///
/// Leaving a root action first leaves every child that is still open, so
/// children always end before their parent.
#[derive(Debug)]
pub struct RootAction {
    core: ActionCore,
    children: Arc<SynchronizedQueue<Arc<Action>>>,
    parent_queue: Weak<SynchronizedQueue<Arc<RootAction>>>,
}

impl RootAction {
    pub(crate) fn new(
        beacon: Arc<Beacon>,
        name: &str,
        parent_queue: Weak<SynchronizedQueue<Arc<RootAction>>>,
    ) -> Self {
        Self {
            core: ActionCore::new(beacon, name, 0),
            children: Arc::new(SynchronizedQueue::new()),
            parent_queue,
        }
    }

    pub fn id(&self) -> i32 {
        self.core.id
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn start_time(&self) -> i64 {
        self.core.start_time
    }

    pub fn start_sequence_no(&self) -> i32 {
        self.core.start_sequence_no
    }

    /// `-1` until the action has been left.
    pub fn end_time(&self) -> i64 {
        self.core.end_time.load(Ordering::SeqCst)
    }

    pub fn end_sequence_no(&self) -> i32 {
        self.core.end_sequence_no.load(Ordering::SeqCst)
    }

    pub fn is_left(&self) -> bool {
        self.core.is_left()
    }

    pub fn open_child_count(&self) -> usize {
        self.children.len()
    }

    /// Open a child action. `None` for an empty name or a left root action.
    pub fn enter_action(self: &Arc<Self>, name: &str) -> Option<Arc<Action>> {
        if !require_non_empty("RootAction.enterAction", "actionName", name) {
            return None;
        }

        self.core.while_open(|| {
            let child = Arc::new(Action::new(
                Arc::clone(&self.core.beacon),
                name,
                self.core.id,
                Arc::downgrade(self),
            ));
            self.children.put(Arc::clone(&child));
            child
        })
    }

    pub fn report_event(&self, name: &str) -> &Self {
        self.core.report_event("RootAction.reportEvent", name);
        self
    }

    pub fn report_value_int(&self, name: &str, value: i64) -> &Self {
        self.core.report_value_int("RootAction.reportValue", name, value);
        self
    }

    pub fn report_value_double(&self, name: &str, value: f64) -> &Self {
        self.core
            .report_value_double("RootAction.reportValue", name, value);
        self
    }

    pub fn report_value_string(&self, name: &str, value: &str) -> &Self {
        self.core
            .report_value_string("RootAction.reportValue", name, value);
        self
    }

    pub fn report_error(&self, name: &str, error_code: i32, reason: &str) -> &Self {
        self.core
            .report_error("RootAction.reportError", name, error_code, reason);
        self
    }

    pub fn trace_web_request(&self, url: &str) -> Option<WebRequestTracer> {
        self.core.trace_web_request("RootAction.traceWebRequest", url)
    }

    /// Leave this action: close open children, record it, and drop it from
    /// the session's open set. If another thread is leaving it already,
    /// waits until that thread has written the action record.
    pub fn leave_action(&self) {
        let _guard = self.core.lock();
        if !self.core.mark_left() {
            return;
        }

        while let Some(child) = self.children.get() {
            child.leave_action();
        }

        self.core.finish();

        if let Some(queue) = self.parent_queue.upgrade() {
            queue.remove_where(|a| a.id() == self.core.id);
        }
    }
}

/// A child of a [`RootAction`].
#[derive(Debug)]
pub struct Action {
    core: ActionCore,
    parent: Weak<RootAction>,
}

impl Action {
    fn new(beacon: Arc<Beacon>, name: &str, parent_id: i32, parent: Weak<RootAction>) -> Self {
        Self {
            core: ActionCore::new(beacon, name, parent_id),
            parent,
        }
    }

    pub fn id(&self) -> i32 {
        self.core.id
    }

    pub fn parent_id(&self) -> i32 {
        self.core.parent_id
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn start_sequence_no(&self) -> i32 {
        self.core.start_sequence_no
    }

    /// `-1` until the action has been left.
    pub fn end_time(&self) -> i64 {
        self.core.end_time.load(Ordering::SeqCst)
    }

    pub fn end_sequence_no(&self) -> i32 {
        self.core.end_sequence_no.load(Ordering::SeqCst)
    }

    pub fn is_left(&self) -> bool {
        self.core.is_left()
    }

    pub fn report_event(&self, name: &str) -> &Self {
        self.core.report_event("Action.reportEvent", name);
        self
    }

    pub fn report_value_int(&self, name: &str, value: i64) -> &Self {
        self.core.report_value_int("Action.reportValue", name, value);
        self
    }

    pub fn report_value_double(&self, name: &str, value: f64) -> &Self {
        self.core.report_value_double("Action.reportValue", name, value);
        self
    }

    pub fn report_value_string(&self, name: &str, value: &str) -> &Self {
        self.core.report_value_string("Action.reportValue", name, value);
        self
    }

    pub fn report_error(&self, name: &str, error_code: i32, reason: &str) -> &Self {
        self.core
            .report_error("Action.reportError", name, error_code, reason);
        self
    }

    pub fn trace_web_request(&self, url: &str) -> Option<WebRequestTracer> {
        self.core.trace_web_request("Action.traceWebRequest", url)
    }

    /// Leave this action and return its parent. Leaving twice records once.
    pub fn leave_action(&self) -> Option<Arc<RootAction>> {
        let parent = self.parent.upgrade();
        let _guard = self.core.lock();
        if !self.core.mark_left() {
            return parent;
        }

        self.core.finish();

        if let Some(root) = &parent {
            root.children.remove_where(|a| a.id() == self.core.id);
        }
        parent
    }
}
