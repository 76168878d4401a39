//! Test doubles shared across the OpenKit workspace.
//!
//! - [`FakeTimingProvider`]: manual clock; sleeps advance it and are recorded
//! - [`ScriptedConnector`]: replays queued responses and records every request
//! - [`FixedThreadIdProvider`]: constant thread id
//! - config helpers producing a valid configuration with fast timings

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use openkit_core::{
    Configuration, Connector, OpenKitConfig, ShutdownToken, StatusResponse, ThreadIdProvider,
    TimeSyncResponse, TimingProvider, TransportError,
};

/// Endpoint used by every fixture configuration.
pub const TEST_ENDPOINT: &str = "https://monitor.test/mbeacon";
pub const TEST_APPLICATION_ID: &str = "test-app";
pub const TEST_DEVICE_ID: i64 = 42;

/// Valid configuration with millisecond-scale worker timings.
pub fn test_config() -> OpenKitConfig {
    let mut config = OpenKitConfig::new(TEST_ENDPOINT, TEST_APPLICATION_ID, TEST_DEVICE_ID);
    config.application_name = "Test Application".to_string();
    config.communication.default_sleep_ms = 5;
    config.communication.initial_retry_sleep_ms = 1;
    config.communication.time_sync_retry_interval_ms = 5;
    config.communication.status_check_interval_ms = 20;
    config
}

pub fn test_configuration() -> Arc<Configuration> {
    Arc::new(Configuration::new(test_config()))
}

/// Successful status response with the given body.
pub fn status_ok(body: &str) -> StatusResponse {
    StatusResponse::parse(body, 200)
}

/// Time sync response whose server timestamps are `t1` and `t2`.
pub fn time_sync_ok(t1: i64, t2: i64) -> TimeSyncResponse {
    TimeSyncResponse::parse(&format!("t1={t1}&t2={t2}"), 200)
}

pub fn network_error() -> TransportError {
    TransportError::NetworkError {
        reason: "connection refused".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Manual clock. `sleep` records the requested duration, advances the clock
/// by it, and returns immediately.
#[derive(Debug)]
pub struct FakeTimingProvider {
    now: AtomicI64,
    step_per_read: AtomicI64,
    offset: AtomicI64,
    time_sync_supported: AtomicBool,
    sleeps: Mutex<Vec<Duration>>,
    stall: Mutex<Option<(String, Duration)>>,
}

impl FakeTimingProvider {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
            step_per_read: AtomicI64::new(0),
            offset: AtomicI64::new(0),
            time_sync_supported: AtomicBool::new(true),
            sleeps: Mutex::new(Vec::new()),
            stall: Mutex::new(None),
        }
    }

    /// Block every timestamp read made on the thread named `thread_name`
    /// for `delay` of real time.
    pub fn stall_reads_on(&self, thread_name: &str, delay: Duration) {
        *self.stall.lock().unwrap() = Some((thread_name.to_string(), delay));
    }

    pub fn set_now(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Advance the clock by `millis` after every timestamp read.
    pub fn set_step_per_read(&self, millis: i64) {
        self.step_per_read.store(millis, Ordering::SeqCst);
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn cluster_time_offset(&self) -> i64 {
        self.offset.load(Ordering::SeqCst)
    }
}

impl TimingProvider for FakeTimingProvider {
    fn provide_timestamp_in_millis(&self) -> i64 {
        let stall = self.stall.lock().unwrap().clone();
        if let Some((name, delay)) = stall {
            if std::thread::current().name() == Some(name.as_str()) {
                std::thread::sleep(delay);
            }
        }
        let step = self.step_per_read.load(Ordering::SeqCst);
        self.now.fetch_add(step, Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration, shutdown: &ShutdownToken) -> bool {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration.as_millis() as i64);
        std::thread::yield_now();
        shutdown.is_shutdown_requested()
    }

    fn initialize(&self, cluster_time_offset: i64, time_sync_supported: bool) {
        self.offset.store(
            if time_sync_supported { cluster_time_offset } else { 0 },
            Ordering::SeqCst,
        );
        self.time_sync_supported
            .store(time_sync_supported, Ordering::SeqCst);
    }

    fn is_time_sync_supported(&self) -> bool {
        self.time_sync_supported.load(Ordering::SeqCst)
    }

    fn convert_to_cluster_time(&self, timestamp: i64) -> i64 {
        timestamp + self.offset.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedThreadIdProvider(pub i32);

impl ThreadIdProvider for FixedThreadIdProvider {
    fn thread_id(&self) -> i32 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// Connector replaying queued results.
///
/// When a queue runs dry the defaults apply: status and beacon requests
/// succeed with an empty 200 body, time sync answers 400 (unsupported).
#[derive(Debug, Default)]
pub struct ScriptedConnector {
    status: Mutex<VecDeque<Result<StatusResponse, TransportError>>>,
    beacon: Mutex<VecDeque<Result<StatusResponse, TransportError>>>,
    time_sync: Mutex<VecDeque<Result<TimeSyncResponse, TransportError>>>,
    status_calls: AtomicUsize,
    time_sync_calls: AtomicUsize,
    beacon_requests: Mutex<Vec<(String, Vec<u8>)>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_status(&self, result: Result<StatusResponse, TransportError>) -> &Self {
        self.status.lock().unwrap().push_back(result);
        self
    }

    pub fn push_beacon(&self, result: Result<StatusResponse, TransportError>) -> &Self {
        self.beacon.lock().unwrap().push_back(result);
        self
    }

    pub fn push_time_sync(&self, result: Result<TimeSyncResponse, TransportError>) -> &Self {
        self.time_sync.lock().unwrap().push_back(result);
        self
    }

    pub fn status_request_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn time_sync_request_count(&self) -> usize {
        self.time_sync_calls.load(Ordering::SeqCst)
    }

    pub fn beacon_request_count(&self) -> usize {
        self.beacon_requests.lock().unwrap().len()
    }

    /// Payloads of every beacon request, decoded as UTF-8.
    pub fn beacon_payloads(&self) -> Vec<String> {
        self.beacon_requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, payload)| String::from_utf8_lossy(payload).into_owned())
            .collect()
    }

    /// Client IPs of every beacon request.
    pub fn beacon_client_ips(&self) -> Vec<String> {
        self.beacon_requests
            .lock()
            .unwrap()
            .iter()
            .map(|(ip, _)| ip.clone())
            .collect()
    }
}

impl Connector for ScriptedConnector {
    fn send_status_request(&self) -> Result<StatusResponse, TransportError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(status_ok("")))
    }

    fn send_beacon_request(
        &self,
        client_ip: &str,
        payload: &[u8],
    ) -> Result<StatusResponse, TransportError> {
        self.beacon_requests
            .lock()
            .unwrap()
            .push((client_ip.to_string(), payload.to_vec()));
        self.beacon
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(status_ok("")))
    }

    fn send_time_sync_request(&self) -> Result<TimeSyncResponse, TransportError> {
        self.time_sync_calls.fetch_add(1, Ordering::SeqCst);
        self.time_sync
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TimeSyncResponse::with_code(400)))
    }
}
