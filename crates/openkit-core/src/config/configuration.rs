//! Runtime configuration shared by every session and the sending worker.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, Ordering};
use std::sync::Mutex;

use super::OpenKitConfig;
use crate::constants::{
    DEFAULT_MAX_BEACON_SIZE_BYTES, DEFAULT_SEND_INTERVAL_MS, DEFAULT_SERVER_ID, UNSET,
};
use crate::models::StatusResponse;

/// User configuration plus the capture policy the server controls.
///
/// Read concurrently by producers (capture flags) and written by the sending
/// worker when a status response arrives.
#[derive(Debug)]
pub struct Configuration {
    settings: OpenKitConfig,
    capture: AtomicBool,
    capture_errors: AtomicBool,
    capture_crashes: AtomicBool,
    send_interval_ms: AtomicI64,
    max_beacon_size_bytes: AtomicI64,
    server_id: AtomicI32,
    monitor_name: Mutex<Option<String>>,
    next_session_number: AtomicI32,
}

impl Configuration {
    pub fn new(settings: OpenKitConfig) -> Self {
        Self {
            settings,
            capture: AtomicBool::new(true),
            capture_errors: AtomicBool::new(true),
            capture_crashes: AtomicBool::new(true),
            send_interval_ms: AtomicI64::new(DEFAULT_SEND_INTERVAL_MS),
            max_beacon_size_bytes: AtomicI64::new(DEFAULT_MAX_BEACON_SIZE_BYTES),
            server_id: AtomicI32::new(DEFAULT_SERVER_ID),
            monitor_name: Mutex::new(None),
            next_session_number: AtomicI32::new(0),
        }
    }

    /// The immutable user supplied configuration.
    pub fn settings(&self) -> &OpenKitConfig {
        &self.settings
    }

    /// Apply the settings carried by a status response.
    ///
    /// A missing or erroneous response turns capture off and leaves every
    /// other setting untouched.
    pub fn update_settings(&self, response: Option<&StatusResponse>) {
        let response = match response {
            Some(r) if r.is_success() => r,
            Some(r) => {
                tracing::debug!(code = r.response_code, "erroneous status response, capture off");
                self.disable_capture();
                return;
            }
            None => {
                self.disable_capture();
                return;
            }
        };

        self.capture.store(response.capture, Ordering::SeqCst);

        if response.server_id != UNSET as i32 {
            self.server_id.store(response.server_id, Ordering::SeqCst);
        }
        if response.send_interval_ms != UNSET {
            self.send_interval_ms
                .store(response.send_interval_ms, Ordering::SeqCst);
        }
        if response.max_beacon_size_bytes != UNSET {
            self.max_beacon_size_bytes
                .store(response.max_beacon_size_bytes, Ordering::SeqCst);
        }
        if let Some(name) = &response.monitor_name {
            if let Ok(mut guard) = self.monitor_name.lock() {
                *guard = Some(name.clone());
            }
        }

        self.capture_errors
            .store(response.capture_errors, Ordering::SeqCst);
        self.capture_crashes
            .store(response.capture_crashes, Ordering::SeqCst);
    }

    pub fn is_capture_on(&self) -> bool {
        self.capture.load(Ordering::SeqCst)
    }

    pub fn disable_capture(&self) {
        self.capture.store(false, Ordering::SeqCst);
    }

    pub fn is_capture_errors_on(&self) -> bool {
        self.capture_errors.load(Ordering::SeqCst)
    }

    pub fn is_capture_crashes_on(&self) -> bool {
        self.capture_crashes.load(Ordering::SeqCst)
    }

    pub fn send_interval_ms(&self) -> i64 {
        self.send_interval_ms.load(Ordering::SeqCst)
    }

    pub fn max_beacon_size_bytes(&self) -> i64 {
        self.max_beacon_size_bytes.load(Ordering::SeqCst)
    }

    pub fn server_id(&self) -> i32 {
        self.server_id.load(Ordering::SeqCst)
    }

    pub fn monitor_name(&self) -> Option<String> {
        self.monitor_name.lock().ok().and_then(|g| g.clone())
    }

    /// Issue the next session number. The first session gets 1.
    pub fn create_session_number(&self) -> i32 {
        self.next_session_number.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn application_id(&self) -> &str {
        &self.settings.application_id
    }

    pub fn device_id(&self) -> i64 {
        self.settings.device_id
    }
}
