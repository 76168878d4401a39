//! Per-session beacon encoder.
//!
//! A [`Beacon`] issues the action ids and sequence numbers of one session,
//! turns reported activity into serialized records in the shared
//! [`BeaconCache`], and later uploads those records chunk by chunk.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use openkit_cache::BeaconCache;
use openkit_core::constants::{
    AGENT_TECHNOLOGY_TYPE, OPENKIT_VERSION, PLATFORM_TYPE_OPENKIT, PROTOCOL_VERSION,
    WEB_REQUEST_TAG_PREFIX,
};
use openkit_core::{
    Configuration, Connector, StatusResponse, ThreadIdProvider, TimingProvider, TransportError,
};

use crate::event::{ActionRecord, BeaconEvent, BeaconHeader, EventBase, ReportedValue, WebRequestRecord};
use crate::serializer::BeaconSerializer;

/// Everything a beacon needs besides its own session state.
#[derive(Clone)]
pub struct BeaconProviders {
    pub configuration: Arc<Configuration>,
    pub cache: Arc<BeaconCache>,
    pub timing: Arc<dyn TimingProvider>,
    pub thread_ids: Arc<dyn ThreadIdProvider>,
    pub serializer: Arc<dyn BeaconSerializer>,
}

/// A finished action, in absolute local time.
#[derive(Debug, Clone, Copy)]
pub struct ActionData<'a> {
    pub id: i32,
    pub parent_id: i32,
    pub name: &'a str,
    pub start_time: i64,
    pub start_sequence_no: i32,
    pub end_time: i64,
    pub end_sequence_no: i32,
}

/// A stopped web request, in absolute local time.
///
/// Negative code and byte counts mean "not reported".
#[derive(Debug, Clone, Copy)]
pub struct WebRequestData<'a> {
    pub url: &'a str,
    pub start_time: i64,
    pub start_sequence_no: i32,
    pub end_time: i64,
    pub end_sequence_no: i32,
    pub response_code: i32,
    pub bytes_sent: i64,
    pub bytes_received: i64,
}

pub struct Beacon {
    providers: BeaconProviders,
    session_number: i32,
    session_start_time: i64,
    client_ip: String,
    next_id: AtomicI32,
    next_sequence_number: AtomicI32,
    /// Held while a record is encoded and appended, so records enter the
    /// cache in the order they were serialized.
    record_lock: Mutex<()>,
}

impl Beacon {
    /// Create the beacon of a new session. Draws the next session number and
    /// takes the current time as session start.
    pub fn new(providers: BeaconProviders, client_ip: impl Into<String>) -> Self {
        let session_number = providers.configuration.create_session_number();
        let session_start_time = providers.timing.provide_timestamp_in_millis();
        Self {
            providers,
            session_number,
            session_start_time,
            client_ip: client_ip.into(),
            next_id: AtomicI32::new(0),
            next_sequence_number: AtomicI32::new(0),
            record_lock: Mutex::new(()),
        }
    }

    /// Next action id of this session. The first id is 1.
    pub fn create_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Next sequence number of this session. The first number is 1.
    pub fn create_sequence_number(&self) -> i32 {
        self.next_sequence_number.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_timestamp(&self) -> i64 {
        self.providers.timing.provide_timestamp_in_millis()
    }

    pub fn session_number(&self) -> i32 {
        self.session_number
    }

    pub fn session_start_time(&self) -> i64 {
        self.session_start_time
    }

    pub fn client_ip(&self) -> &str {
        &self.client_ip
    }

    pub fn configuration(&self) -> &Configuration {
        &self.providers.configuration
    }

    /// Tag correlating a traced web request with this session:
    /// `MT_<protocol>_<server id>_<device id>_<session>_<app id>_<action id>_<thread id>_<sequence>`.
    pub fn create_tag(&self, parent_action_id: i32, sequence_no: i32) -> String {
        let config = &self.providers.configuration;
        format!(
            "{WEB_REQUEST_TAG_PREFIX}_{PROTOCOL_VERSION}_{}_{}_{}_{}_{}_{}_{}",
            config.server_id(),
            config.device_id(),
            self.session_number,
            urlencoding::encode(config.application_id()),
            parent_action_id,
            self.providers.thread_ids.thread_id(),
            sequence_no,
        )
    }

    pub fn add_action(&self, action: &ActionData<'_>) {
        if !self.is_capturing() {
            return;
        }
        let event = BeaconEvent::Action(ActionRecord {
            name: self.truncate(action.name),
            thread_id: self.thread_id(),
            action_id: action.id,
            parent_action_id: action.parent_id,
            start_sequence_no: action.start_sequence_no,
            start_time: self.relative(action.start_time),
            end_sequence_no: action.end_sequence_no,
            duration: action.end_time - action.start_time,
        });
        self.add_record(action.start_time, &event);
    }

    /// Record the end of the session. This is the last record a session emits.
    pub fn end_session(&self) {
        if !self.is_capturing() {
            return;
        }
        let now = self.current_timestamp();
        let event = BeaconEvent::SessionEnd {
            thread_id: self.thread_id(),
            sequence_no: self.create_sequence_number(),
            time: self.relative(now),
        };
        self.add_record(now, &event);
    }

    pub fn report_value_int(&self, parent_action_id: i32, name: &str, value: i64) {
        self.report_value(parent_action_id, name, ReportedValue::Int(value));
    }

    pub fn report_value_double(&self, parent_action_id: i32, name: &str, value: f64) {
        self.report_value(parent_action_id, name, ReportedValue::Double(value));
    }

    pub fn report_value_string(&self, parent_action_id: i32, name: &str, value: &str) {
        let value = ReportedValue::String(self.truncate(value));
        self.report_value(parent_action_id, name, value);
    }

    fn report_value(&self, parent_action_id: i32, name: &str, value: ReportedValue) {
        if !self.is_capturing() {
            return;
        }
        let (now, base) = self.event_base(parent_action_id, name);
        self.add_record(now, &BeaconEvent::Value { base, value });
    }

    pub fn report_event(&self, parent_action_id: i32, name: &str) {
        if !self.is_capturing() {
            return;
        }
        let (now, base) = self.event_base(parent_action_id, name);
        self.add_record(now, &BeaconEvent::NamedEvent(base));
    }

    pub fn report_error(&self, parent_action_id: i32, name: &str, error_code: i32, reason: &str) {
        if !self.is_capturing() || !self.providers.configuration.is_capture_errors_on() {
            return;
        }
        let (now, base) = self.event_base(parent_action_id, name);
        let event = BeaconEvent::Error {
            base,
            error_code,
            reason: self.truncate(reason),
        };
        self.add_record(now, &event);
    }

    pub fn report_crash(&self, name: &str, reason: &str, stacktrace: &str) {
        if !self.is_capturing() || !self.providers.configuration.is_capture_crashes_on() {
            return;
        }
        let (now, base) = self.event_base(0, name);
        let event = BeaconEvent::Crash {
            base,
            reason: self.truncate(reason),
            stacktrace: stacktrace.to_string(),
        };
        self.add_record(now, &event);
    }

    pub fn add_web_request(&self, parent_action_id: i32, request: &WebRequestData<'_>) {
        if !self.is_capturing() {
            return;
        }
        let event = BeaconEvent::WebRequest(WebRequestRecord {
            url: self.truncate(request.url),
            thread_id: self.thread_id(),
            parent_action_id,
            start_sequence_no: request.start_sequence_no,
            start_time: self.relative(request.start_time),
            end_sequence_no: request.end_sequence_no,
            duration: request.end_time - request.start_time,
            response_code: request.response_code,
            bytes_sent: request.bytes_sent,
            bytes_received: request.bytes_received,
        });
        self.add_record(request.start_time, &event);
    }

    pub fn identify_user(&self, user_tag: &str) {
        if !self.is_capturing() {
            return;
        }
        let (now, base) = self.event_base(0, user_tag);
        self.add_record(now, &BeaconEvent::IdentifyUser(base));
    }

    /// Upload every cached record of this session, chunk by chunk.
    ///
    /// A chunk is acknowledged only on a 2xx response. On a non-2xx response
    /// or a transport error the chunk is re-queued unchanged and sending
    /// stops. Returns the last response received, `None` if there was
    /// nothing to send.
    pub fn send(
        &self,
        connector: &dyn Connector,
    ) -> Result<Option<StatusResponse>, TransportError> {
        let _span = openkit_core::beacon_send_span!(self.session_number).entered();
        let cache = &self.providers.cache;
        let header = self.header();
        let max_chunk_size = self.max_chunk_size(&header);
        let record_overhead = self.providers.serializer.record_overhead() as i64;
        let mut last_response = None;

        while let Some(chunk) =
            cache.get_next_beacon_chunk(self.session_number, max_chunk_size, record_overhead)
        {
            let payload = self.providers.serializer.assemble(&header, &chunk);

            match connector.send_beacon_request(&self.client_ip, &payload) {
                Ok(response) if response.is_success() => {
                    cache.remove_chunked_data(self.session_number);
                    last_response = Some(response);
                }
                Ok(response) => {
                    tracing::debug!(
                        session_number = self.session_number,
                        code = response.response_code,
                        "beacon chunk rejected, re-queued"
                    );
                    cache.reset_chunked_data(self.session_number);
                    return Ok(Some(response));
                }
                Err(e) => {
                    cache.reset_chunked_data(self.session_number);
                    return Err(e);
                }
            }
        }

        Ok(last_response)
    }

    /// Drop everything this session has cached.
    pub fn clear_data(&self) {
        let _guard = self.lock_records();
        self.providers.cache.delete_cache_entry(self.session_number);
    }

    /// No pending and no in-flight records.
    pub fn is_empty(&self) -> bool {
        self.providers.cache.is_empty(self.session_number)
    }

    /// Header for the upload of this session's records.
    pub fn header(&self) -> BeaconHeader {
        let settings = self.providers.configuration.settings();
        BeaconHeader {
            protocol_version: PROTOCOL_VERSION,
            openkit_version: OPENKIT_VERSION.to_string(),
            platform_type: PLATFORM_TYPE_OPENKIT,
            agent_technology_type: AGENT_TECHNOLOGY_TYPE.to_string(),
            visitor_id: settings.device_id,
            session_number: self.session_number,
            client_ip: self.client_ip.clone(),
            session_start_time: self.session_start_time,
            time_sync_time: self
                .providers
                .timing
                .convert_to_cluster_time(self.session_start_time),
            application_id: settings.application_id.clone(),
            application_name: settings.application_name.clone(),
            application_version: settings.application_version.clone(),
            operating_system: settings.operating_system.clone(),
            manufacturer: settings.manufacturer.clone(),
            model_id: settings.model_id.clone(),
        }
    }

    fn max_chunk_size(&self, header: &BeaconHeader) -> i64 {
        let overhead = self.providers.serializer.assemble(header, &[]).len() as i64;
        (self.providers.configuration.max_beacon_size_bytes() - overhead).max(1)
    }

    fn add_record(&self, timestamp: i64, event: &BeaconEvent) {
        let _guard = self.lock_records();
        match self.providers.serializer.encode_event(event) {
            Some(data) => self
                .providers
                .cache
                .add_record(self.session_number, timestamp, data),
            None => tracing::warn!(
                session_number = self.session_number,
                event_type = ?event.event_type(),
                "record could not be encoded, skipped"
            ),
        }
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, ()> {
        self.record_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn event_base(&self, parent_action_id: i32, name: &str) -> (i64, EventBase) {
        let now = self.current_timestamp();
        let base = EventBase {
            name: self.truncate(name),
            thread_id: self.thread_id(),
            parent_action_id,
            sequence_no: self.create_sequence_number(),
            time: self.relative(now),
        };
        (now, base)
    }

    fn is_capturing(&self) -> bool {
        self.providers.configuration.is_capture_on()
    }

    fn thread_id(&self) -> i32 {
        self.providers.thread_ids.thread_id()
    }

    fn relative(&self, timestamp: i64) -> i64 {
        timestamp - self.session_start_time
    }

    /// Trim and cut to the configured maximum number of characters.
    fn truncate(&self, value: &str) -> String {
        let max = self.providers.configuration.settings().protocol.max_name_length;
        value.trim().chars().take(max).collect()
    }
}

impl std::fmt::Debug for Beacon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Beacon")
            .field("session_number", &self.session_number)
            .field("session_start_time", &self.session_start_time)
            .field("client_ip", &self.client_ip)
            .finish()
    }
}
