//! Tracing of outgoing HTTP requests issued by the host application.

use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};
use std::sync::Arc;

use openkit_core::constants::UNSET;
use openkit_protocol::{Beacon, WebRequestData};

/// Measures one web request. Attach [`WebRequestTracer::tag`] to the request
/// so the backend can correlate it with this session.
///
/// Setters are ignored once the tracer is stopped; `stop` records once.
#[derive(Debug)]
pub struct WebRequestTracer {
    beacon: Arc<Beacon>,
    parent_action_id: i32,
    url: String,
    tag: String,
    start_time: AtomicI64,
    start_sequence_no: i32,
    end_time: AtomicI64,
    end_sequence_no: AtomicI32,
    response_code: AtomicI32,
    bytes_sent: AtomicI64,
    bytes_received: AtomicI64,
}

impl WebRequestTracer {
    /// `None` if `url` is not an absolute URL with a scheme.
    pub(crate) fn new(beacon: Arc<Beacon>, parent_action_id: i32, url: &str) -> Option<Self> {
        if !is_valid_url(url) {
            tracing::warn!(url, "traceWebRequest: url is not a valid absolute URL");
            return None;
        }

        let start_sequence_no = beacon.create_sequence_number();
        let tag = beacon.create_tag(parent_action_id, start_sequence_no);
        let start_time = beacon.current_timestamp();

        Some(Self {
            parent_action_id,
            url: strip_query(url).to_string(),
            tag,
            start_time: AtomicI64::new(start_time),
            start_sequence_no,
            end_time: AtomicI64::new(UNSET),
            end_sequence_no: AtomicI32::new(UNSET as i32),
            response_code: AtomicI32::new(UNSET as i32),
            bytes_sent: AtomicI64::new(UNSET),
            bytes_received: AtomicI64::new(UNSET),
            beacon,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// URL without its query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn start_sequence_no(&self) -> i32 {
        self.start_sequence_no
    }

    pub fn end_sequence_no(&self) -> i32 {
        self.end_sequence_no.load(Ordering::SeqCst)
    }

    pub fn response_code(&self) -> i32 {
        self.response_code.load(Ordering::SeqCst)
    }

    pub fn bytes_sent(&self) -> i64 {
        self.bytes_sent.load(Ordering::SeqCst)
    }

    pub fn bytes_received(&self) -> i64 {
        self.bytes_received.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.end_time.load(Ordering::SeqCst) != UNSET
    }

    /// Restart the timing, e.g. when the tracer was created ahead of the request.
    pub fn start(&self) -> &Self {
        if !self.is_stopped() {
            self.start_time
                .store(self.beacon.current_timestamp(), Ordering::SeqCst);
        }
        self
    }

    pub fn set_response_code(&self, code: i32) -> &Self {
        if !self.is_stopped() {
            self.response_code.store(code, Ordering::SeqCst);
        }
        self
    }

    pub fn set_bytes_sent(&self, bytes: i64) -> &Self {
        if !self.is_stopped() {
            self.bytes_sent.store(bytes, Ordering::SeqCst);
        }
        self
    }

    pub fn set_bytes_received(&self, bytes: i64) -> &Self {
        if !self.is_stopped() {
            self.bytes_received.store(bytes, Ordering::SeqCst);
        }
        self
    }

    /// Stop timing and record the request. Later calls do nothing.
    pub fn stop(&self) {
        let now = self.beacon.current_timestamp();
        if self
            .end_time
            .compare_exchange(UNSET, now, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        let end_sequence_no = self.beacon.create_sequence_number();
        self.end_sequence_no
            .store(end_sequence_no, Ordering::SeqCst);

        self.beacon.add_web_request(
            self.parent_action_id,
            &WebRequestData {
                url: &self.url,
                start_time: self.start_time.load(Ordering::SeqCst),
                start_sequence_no: self.start_sequence_no,
                end_time: now,
                end_sequence_no,
                response_code: self.response_code(),
                bytes_sent: self.bytes_sent(),
                bytes_received: self.bytes_received(),
            },
        );
    }
}

/// `scheme://rest`, where the scheme starts with a letter and continues with
/// letters, digits, `+`, `-` or `.`.
fn is_valid_url(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_with_letter
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
}

fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
