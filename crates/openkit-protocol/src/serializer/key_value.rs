//! Mobile protocol v3: `&`-delimited `key=value` pairs with URL-encoded
//! string values.

use std::fmt::Display;

use openkit_core::config::SerializationFormat;

use super::BeaconSerializer;
use crate::event::{ActionRecord, BeaconEvent, BeaconHeader, EventBase, ReportedValue, WebRequestRecord};

const DELIMITER: char = '&';

// header
const KEY_PROTOCOL_VERSION: &str = "vv";
const KEY_OPENKIT_VERSION: &str = "va";
const KEY_PLATFORM_TYPE: &str = "pt";
const KEY_AGENT_TECHNOLOGY_TYPE: &str = "tt";
const KEY_VISITOR_ID: &str = "vi";
const KEY_SESSION_NUMBER: &str = "sn";
const KEY_CLIENT_IP_ADDRESS: &str = "ip";
const KEY_SESSION_START_TIME: &str = "tv";
const KEY_TIMESYNC_TIME: &str = "ts";

// records
const KEY_EVENT_TYPE: &str = "et";
const KEY_NAME: &str = "na";
const KEY_THREAD_ID: &str = "it";
const KEY_ACTION_ID: &str = "ca";
const KEY_PARENT_ACTION_ID: &str = "pa";
const KEY_START_SEQUENCE_NUMBER: &str = "s0";
const KEY_TIME_0: &str = "t0";
const KEY_END_SEQUENCE_NUMBER: &str = "s1";
const KEY_TIME_1: &str = "t1";
const KEY_VALUE: &str = "vl";
const KEY_ERROR_CODE: &str = "ev";
const KEY_ERROR_REASON: &str = "rs";
const KEY_ERROR_STACKTRACE: &str = "st";
const KEY_RESPONSE_CODE: &str = "rc";
const KEY_BYTES_SENT: &str = "bs";
const KEY_BYTES_RECEIVED: &str = "br";

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueSerializer;

/// Appends pairs, inserting the delimiter between them.
#[derive(Default)]
struct PairWriter {
    out: String,
}

impl PairWriter {
    fn key(&mut self, key: &str) {
        if !self.out.is_empty() {
            self.out.push(DELIMITER);
        }
        self.out.push_str(key);
        self.out.push('=');
    }

    fn num(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.key(key);
        self.out.push_str(&value.to_string());
        self
    }

    fn text(&mut self, key: &str, value: &str) -> &mut Self {
        self.key(key);
        self.out.push_str(&urlencoding::encode(value));
        self
    }

    fn finish(self) -> String {
        self.out
    }
}

impl KeyValueSerializer {
    pub fn encode_header(&self, header: &BeaconHeader) -> String {
        let mut w = PairWriter::default();
        w.num(KEY_PROTOCOL_VERSION, header.protocol_version)
            .text(KEY_OPENKIT_VERSION, &header.openkit_version)
            .num(KEY_PLATFORM_TYPE, header.platform_type)
            .text(KEY_AGENT_TECHNOLOGY_TYPE, &header.agent_technology_type)
            .num(KEY_VISITOR_ID, header.visitor_id)
            .num(KEY_SESSION_NUMBER, header.session_number)
            .text(KEY_CLIENT_IP_ADDRESS, &header.client_ip)
            .num(KEY_SESSION_START_TIME, header.session_start_time)
            .num(KEY_TIMESYNC_TIME, header.time_sync_time);
        w.finish()
    }

    fn basic(w: &mut PairWriter, event: &BeaconEvent, name: Option<&str>, thread_id: i32) {
        w.num(KEY_EVENT_TYPE, event.event_type().protocol_value());
        if let Some(name) = name {
            w.text(KEY_NAME, name);
        }
        w.num(KEY_THREAD_ID, thread_id);
    }

    fn point(w: &mut PairWriter, event: &BeaconEvent, base: &EventBase) {
        Self::basic(w, event, Some(&base.name), base.thread_id);
        w.num(KEY_PARENT_ACTION_ID, base.parent_action_id)
            .num(KEY_START_SEQUENCE_NUMBER, base.sequence_no)
            .num(KEY_TIME_0, base.time);
    }

    fn action(w: &mut PairWriter, event: &BeaconEvent, a: &ActionRecord) {
        Self::basic(w, event, Some(&a.name), a.thread_id);
        w.num(KEY_ACTION_ID, a.action_id)
            .num(KEY_PARENT_ACTION_ID, a.parent_action_id)
            .num(KEY_START_SEQUENCE_NUMBER, a.start_sequence_no)
            .num(KEY_TIME_0, a.start_time)
            .num(KEY_END_SEQUENCE_NUMBER, a.end_sequence_no)
            .num(KEY_TIME_1, a.duration);
    }

    fn web_request(w: &mut PairWriter, event: &BeaconEvent, r: &WebRequestRecord) {
        Self::basic(w, event, Some(&r.url), r.thread_id);
        w.num(KEY_PARENT_ACTION_ID, r.parent_action_id)
            .num(KEY_START_SEQUENCE_NUMBER, r.start_sequence_no)
            .num(KEY_TIME_0, r.start_time)
            .num(KEY_END_SEQUENCE_NUMBER, r.end_sequence_no)
            .num(KEY_TIME_1, r.duration);
        if r.response_code >= 0 {
            w.num(KEY_RESPONSE_CODE, r.response_code);
        }
        if r.bytes_sent >= 0 {
            w.num(KEY_BYTES_SENT, r.bytes_sent);
        }
        if r.bytes_received >= 0 {
            w.num(KEY_BYTES_RECEIVED, r.bytes_received);
        }
    }
}

impl BeaconSerializer for KeyValueSerializer {
    fn format(&self) -> SerializationFormat {
        SerializationFormat::KeyValue
    }

    fn encode_event(&self, event: &BeaconEvent) -> Option<String> {
        let mut w = PairWriter::default();
        match event {
            BeaconEvent::Action(a) => Self::action(&mut w, event, a),
            BeaconEvent::SessionEnd {
                thread_id,
                sequence_no,
                time,
            } => {
                Self::basic(&mut w, event, None, *thread_id);
                w.num(KEY_PARENT_ACTION_ID, 0)
                    .num(KEY_START_SEQUENCE_NUMBER, sequence_no)
                    .num(KEY_TIME_0, time);
            }
            BeaconEvent::NamedEvent(base) | BeaconEvent::IdentifyUser(base) => {
                Self::point(&mut w, event, base)
            }
            BeaconEvent::Value { base, value } => {
                Self::point(&mut w, event, base);
                match value {
                    ReportedValue::Int(v) => w.num(KEY_VALUE, v),
                    ReportedValue::Double(v) => w.num(KEY_VALUE, v),
                    ReportedValue::String(v) => w.text(KEY_VALUE, v),
                };
            }
            BeaconEvent::Error {
                base,
                error_code,
                reason,
            } => {
                Self::point(&mut w, event, base);
                w.num(KEY_ERROR_CODE, error_code)
                    .text(KEY_ERROR_REASON, reason);
            }
            BeaconEvent::Crash {
                base,
                reason,
                stacktrace,
            } => {
                Self::point(&mut w, event, base);
                w.text(KEY_ERROR_REASON, reason)
                    .text(KEY_ERROR_STACKTRACE, stacktrace);
            }
            BeaconEvent::WebRequest(r) => Self::web_request(&mut w, event, r),
        }
        Some(w.finish())
    }

    fn assemble(&self, header: &BeaconHeader, records: &[String]) -> Vec<u8> {
        let mut payload = self.encode_header(header);
        for record in records {
            payload.push(DELIMITER);
            payload.push_str(record);
        }
        payload.into_bytes()
    }

    fn record_overhead(&self) -> usize {
        DELIMITER.len_utf8()
    }
}
