//! Shared state between the application threads and the sending worker.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use openkit_cache::{BeaconCache, BeaconCacheEvictor};
use openkit_core::constants::UNSET;
use openkit_core::tracing_setup::events;
use openkit_core::{
    Configuration, Connector, ShutdownToken, StatusResponse, SynchronizedQueue, TimingProvider,
};
use openkit_session::{Session, SessionRegistry};

use crate::init_signal::InitSignal;
use crate::state::BeaconSendingState;

/// Open and finished sessions, the current worker state, and the timing
/// bookkeeping the states read and write.
///
/// Application threads only touch the session queues (through
/// [`SessionRegistry`]) and the init and shutdown signals. Everything else
/// is driven by the worker via [`BeaconSendingContext::execute_current_state`].
pub struct BeaconSendingContext {
    configuration: Arc<Configuration>,
    connector: Arc<dyn Connector>,
    timing: Arc<dyn TimingProvider>,
    cache: Arc<BeaconCache>,
    evictor: BeaconCacheEvictor,

    open_sessions: SynchronizedQueue<Arc<Session>>,
    finished_sessions: SynchronizedQueue<Arc<Session>>,

    current_state: Mutex<BeaconSendingState>,
    /// Cleared by `request_shutdown`; guards registration of new sessions.
    accepting_sessions: Mutex<bool>,
    shutdown: ShutdownToken,
    init: InitSignal,

    last_open_session_send_time: AtomicI64,
    last_status_check_time: AtomicI64,
    last_time_sync_time: AtomicI64,
    time_sync_supported: AtomicBool,
}

impl BeaconSendingContext {
    pub fn new(
        configuration: Arc<Configuration>,
        connector: Arc<dyn Connector>,
        timing: Arc<dyn TimingProvider>,
        cache: Arc<BeaconCache>,
    ) -> Self {
        let evictor = BeaconCacheEvictor::new(&configuration.settings().beacon_cache);
        Self {
            configuration,
            connector,
            timing,
            cache,
            evictor,
            open_sessions: SynchronizedQueue::new(),
            finished_sessions: SynchronizedQueue::new(),
            current_state: Mutex::new(BeaconSendingState::Init),
            accepting_sessions: Mutex::new(true),
            shutdown: ShutdownToken::new(),
            init: InitSignal::new(),
            last_open_session_send_time: AtomicI64::new(UNSET),
            last_status_check_time: AtomicI64::new(UNSET),
            last_time_sync_time: AtomicI64::new(UNSET),
            time_sync_supported: AtomicBool::new(true),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn connector(&self) -> &dyn Connector {
        self.connector.as_ref()
    }

    pub fn shutdown_token(&self) -> &ShutdownToken {
        &self.shutdown
    }

    // ---- state machine ----

    pub fn current_state(&self) -> BeaconSendingState {
        *self
            .current_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_in_terminal_state(&self) -> bool {
        self.current_state().is_terminal()
    }

    /// Run one step of the current state and move to the state it returns.
    /// Worker thread only.
    pub fn execute_current_state(&self) {
        let current = self.current_state();
        let next = current.execute(self);

        if next != current {
            events::state_transition(current.name(), next.name());
            *self
                .current_state
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = next;
        }

        if next.is_terminal() {
            self.request_shutdown();
        }
    }

    // ---- shutdown and init ----

    /// Stop accepting sessions and wake everything waiting on shutdown.
    /// Sessions registered before this call are still flushed.
    pub fn request_shutdown(&self) {
        *self
            .accepting_sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = false;
        self.shutdown.request_shutdown();
        self.init.interrupt();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.is_shutdown_requested()
    }

    pub(crate) fn init_completed(&self, success: bool) {
        self.init.complete(success);
    }

    /// Block until init finished. `false` if init failed or shutdown came first.
    pub fn wait_for_init(&self) -> bool {
        self.init.wait(&self.shutdown)
    }

    /// Like [`Self::wait_for_init`], also giving up after `timeout`.
    pub fn wait_for_init_timeout(&self, timeout: Duration) -> bool {
        self.init.wait_timeout(timeout, &self.shutdown)
    }

    pub fn is_initialized(&self) -> bool {
        self.init.result() == Some(true)
    }

    // ---- capture policy ----

    pub fn is_capture_on(&self) -> bool {
        self.configuration.is_capture_on()
    }

    /// Turn capture off, then drop everything captured so far.
    pub fn disable_capture(&self) {
        self.configuration.disable_capture();
        self.clear_all_session_data();
    }

    /// Apply the server settings of `response`; a response that leaves
    /// capture off also clears all captured data.
    pub fn handle_status_response(&self, response: &StatusResponse) {
        self.configuration.update_settings(Some(response));
        if !self.is_capture_on() {
            self.clear_all_session_data();
        }
    }

    fn clear_all_session_data(&self) {
        let finished = self.finished_sessions.drain_all();
        for session in &finished {
            session.clear_captured_data();
        }

        let open = self.open_sessions.to_vec();
        for session in &open {
            session.clear_captured_data();
        }

        if !finished.is_empty() || !open.is_empty() {
            events::capture_disabled(finished.len() + open.len());
        }
    }

    /// Open sessions are re-sent at most once per this interval.
    pub fn send_interval_ms(&self) -> i64 {
        self.configuration.send_interval_ms()
    }

    // ---- sessions ----

    pub fn get_next_finished_session(&self) -> Option<Arc<Session>> {
        self.finished_sessions.get()
    }

    /// Return a session taken with [`Self::get_next_finished_session`]
    /// whose data could not be sent.
    pub fn push_back_finished_session(&self, session: Arc<Session>) {
        self.finished_sessions.put(session);
    }

    pub fn get_all_open_sessions(&self) -> Vec<Arc<Session>> {
        self.open_sessions.to_vec()
    }

    pub fn get_all_finished_sessions(&self) -> Vec<Arc<Session>> {
        self.finished_sessions.to_vec()
    }

    // ---- time ----

    pub fn current_timestamp(&self) -> i64 {
        self.timing.provide_timestamp_in_millis()
    }

    /// Sleep the configured default interval. `true` if cut short by shutdown.
    pub fn sleep(&self) -> bool {
        self.sleep_for(self.configuration.settings().communication.default_sleep())
    }

    pub fn sleep_for(&self, duration: Duration) -> bool {
        self.timing.sleep(duration, &self.shutdown)
    }

    pub fn last_open_session_send_time(&self) -> i64 {
        self.last_open_session_send_time.load(Ordering::SeqCst)
    }

    pub fn set_last_open_session_send_time(&self, timestamp: i64) {
        self.last_open_session_send_time
            .store(timestamp, Ordering::SeqCst);
    }

    pub fn last_status_check_time(&self) -> i64 {
        self.last_status_check_time.load(Ordering::SeqCst)
    }

    pub fn set_last_status_check_time(&self, timestamp: i64) {
        self.last_status_check_time.store(timestamp, Ordering::SeqCst);
    }

    /// `-1` if time was never synced.
    pub fn last_time_sync_time(&self) -> i64 {
        self.last_time_sync_time.load(Ordering::SeqCst)
    }

    pub fn set_last_time_sync_time(&self, timestamp: i64) {
        self.last_time_sync_time.store(timestamp, Ordering::SeqCst);
    }

    pub fn is_time_sync_supported(&self) -> bool {
        self.time_sync_supported.load(Ordering::SeqCst)
    }

    /// The backend rejected time sync; never try again in this process.
    pub fn disable_time_sync_support(&self) {
        self.time_sync_supported.store(false, Ordering::SeqCst);
        self.timing.initialize(0, false);
    }

    /// Synced at least once, or no sync possible at all.
    pub fn is_time_synced(&self) -> bool {
        !self.is_time_sync_supported() || self.last_time_sync_time() >= 0
    }

    pub fn initialize_time_sync(&self, cluster_time_offset: i64, supported: bool) {
        self.timing.initialize(cluster_time_offset, supported);
    }

    // ---- cache ----

    /// Run cache eviction. Returns the number of records removed.
    pub fn evict_cache(&self) -> usize {
        self.evictor.evict(&self.cache, self.current_timestamp())
    }
}

impl SessionRegistry for BeaconSendingContext {
    fn start_session(&self, session: Arc<Session>) -> bool {
        let accepting = self
            .accepting_sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !*accepting {
            tracing::debug!(
                session_number = session.session_number(),
                "session refused after shutdown"
            );
            return false;
        }
        events::session_started(session.session_number());
        self.open_sessions.put(session);
        true
    }

    fn finish_session(&self, session: &Arc<Session>) {
        if self
            .open_sessions
            .remove_where(|s| Arc::ptr_eq(s, session))
            .is_some()
        {
            events::session_finished(session.session_number());
            self.finished_sessions.put(Arc::clone(session));
        }
    }
}

impl std::fmt::Debug for BeaconSendingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeaconSendingContext")
            .field("state", &self.current_state())
            .field("open_sessions", &self.open_sessions.len())
            .field("finished_sessions", &self.finished_sessions.len())
            .field("shutdown", &self.is_shutdown_requested())
            .finish()
    }
}
