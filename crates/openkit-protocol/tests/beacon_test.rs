use std::sync::Arc;

use openkit_cache::BeaconCache;
use openkit_core::config::SerializationFormat;
use openkit_core::{Configuration, TransportError};
use openkit_protocol::{serializer_for, ActionData, Beacon, BeaconProviders, WebRequestData};
use test_fixtures::{
    network_error, status_ok, test_config, FakeTimingProvider, FixedThreadIdProvider,
    ScriptedConnector,
};

struct Harness {
    configuration: Arc<Configuration>,
    cache: Arc<BeaconCache>,
    timing: Arc<FakeTimingProvider>,
    providers: BeaconProviders,
}

fn harness_with(format: SerializationFormat) -> Harness {
    let mut settings = test_config();
    settings.protocol.format = format;
    let configuration = Arc::new(Configuration::new(settings));
    let cache = Arc::new(BeaconCache::new());
    let timing = Arc::new(FakeTimingProvider::new(1_000));
    let providers = BeaconProviders {
        configuration: Arc::clone(&configuration),
        cache: Arc::clone(&cache),
        timing: timing.clone(),
        thread_ids: Arc::new(FixedThreadIdProvider(7)),
        serializer: serializer_for(format),
    };
    Harness {
        configuration,
        cache,
        timing,
        providers,
    }
}

fn harness() -> Harness {
    harness_with(SerializationFormat::KeyValue)
}

#[test]
fn ids_and_sequence_numbers_start_at_one_and_increase() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "10.0.0.1");
    assert_eq!(beacon.create_id(), 1);
    assert_eq!(beacon.create_id(), 2);
    assert_eq!(beacon.create_sequence_number(), 1);
    assert_eq!(beacon.create_sequence_number(), 2);

    let other = Beacon::new(h.providers.clone(), "10.0.0.1");
    assert_eq!(other.create_id(), 1, "counters are per session");
    assert_eq!(other.session_number(), beacon.session_number() + 1);
}

#[test]
fn tag_has_documented_layout() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "10.0.0.1");
    assert_eq!(
        beacon.create_tag(3, 9),
        format!("MT_3_1_42_{}_test-app_3_7_9", beacon.session_number())
    );
}

#[test]
fn action_record_uses_relative_times() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "10.0.0.1");
    beacon.add_action(&ActionData {
        id: 1,
        parent_id: 0,
        name: "  checkout  ",
        start_time: 1_100,
        start_sequence_no: 1,
        end_time: 1_350,
        end_sequence_no: 2,
    });

    let records = h.cache.pending_records(beacon.session_number());
    assert_eq!(
        records,
        vec!["et=1&na=checkout&it=7&ca=1&pa=0&s0=1&t0=100&s1=2&t1=250".to_string()]
    );
}

#[test]
fn names_are_truncated_to_max_length() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "");
    let long = "x".repeat(300);
    beacon.report_event(0, &long);

    let record = &h.cache.pending_records(beacon.session_number())[0];
    let name = record
        .split('&')
        .find_map(|kv| kv.strip_prefix("na="))
        .unwrap();
    assert_eq!(name.len(), 250);
}

#[test]
fn nothing_is_recorded_while_capture_is_off() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "");
    h.configuration.disable_capture();

    beacon.report_event(0, "ev");
    beacon.report_value_int(0, "v", 1);
    beacon.identify_user("alice");
    beacon.end_session();

    assert!(beacon.is_empty());
}

#[test]
fn errors_and_crashes_honor_their_own_flags() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "");
    h.configuration
        .update_settings(Some(&status_ok("cp=1&er=0&cr=0")));

    beacon.report_error(1, "err", 500, "boom");
    beacon.report_crash("crash", "npe", "trace");
    assert!(beacon.is_empty());

    beacon.report_event(1, "still captured");
    assert!(!beacon.is_empty());
}

#[test]
fn every_event_kind_gets_its_type_code() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "");
    beacon.report_event(1, "e");
    beacon.report_value_int(1, "i", 5);
    beacon.report_value_double(1, "d", 2.5);
    beacon.report_value_string(1, "s", "v");
    beacon.report_error(1, "err", 3, "why");
    beacon.report_crash("c", "r", "st");
    beacon.identify_user("u");
    beacon.add_web_request(
        1,
        &WebRequestData {
            url: "https://a.io",
            start_time: 1_000,
            start_sequence_no: 1,
            end_time: 1_010,
            end_sequence_no: 2,
            response_code: 200,
            bytes_sent: 10,
            bytes_received: 20,
        },
    );
    beacon.end_session();

    let codes: Vec<String> = h
        .cache
        .pending_records(beacon.session_number())
        .iter()
        .map(|r| r.split('&').next().unwrap().to_string())
        .collect();
    assert_eq!(
        codes,
        vec!["et=10", "et=12", "et=13", "et=11", "et=40", "et=50", "et=60", "et=30", "et=19"]
    );
}

#[test]
fn send_prefixes_header_and_acknowledges_on_success() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "192.168.0.9");
    beacon.report_event(0, "hello");
    let connector = ScriptedConnector::new();

    let response = beacon.send(&connector).unwrap();

    assert!(response.unwrap().is_success());
    assert!(beacon.is_empty());
    let payloads = connector.beacon_payloads();
    assert_eq!(payloads.len(), 1);
    assert!(payloads[0].starts_with(&format!(
        "vv=3&va=7.0.0000&pt=1&tt=okrust&vi=42&sn={}&ip=192.168.0.9&tv=1000&ts=1000&et=10",
        beacon.session_number()
    )));
    assert_eq!(connector.beacon_client_ips(), vec!["192.168.0.9".to_string()]);
}

#[test]
fn send_with_nothing_cached_returns_none() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "");
    let connector = ScriptedConnector::new();
    assert!(beacon.send(&connector).unwrap().is_none());
    assert_eq!(connector.beacon_request_count(), 0);
}

#[test]
fn transport_error_requeues_and_retry_sends_same_bytes() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "");
    beacon.report_event(0, "a");
    beacon.report_event(0, "b");

    let connector = ScriptedConnector::new();
    connector.push_beacon(Err(network_error()));

    let err = beacon.send(&connector).unwrap_err();
    assert!(matches!(err, TransportError::NetworkError { .. }));
    assert!(!beacon.is_empty());

    beacon.send(&connector).unwrap();
    let payloads = connector.beacon_payloads();
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0], payloads[1]);
    assert!(beacon.is_empty());
}

#[test]
fn non_success_response_requeues_and_is_returned() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "");
    beacon.report_event(0, "a");

    let connector = ScriptedConnector::new();
    connector.push_beacon(Ok(openkit_core::StatusResponse::with_code(503)));

    let response = beacon.send(&connector).unwrap().unwrap();
    assert_eq!(response.response_code, 503);
    assert!(!beacon.is_empty());
}

#[test]
fn large_beacons_are_split_into_chunks() {
    let h = harness();
    h.configuration.update_settings(Some(&status_ok("bl=1")));
    let beacon = Beacon::new(h.providers.clone(), "");
    for i in 0..40 {
        beacon.report_value_string(0, "payload", &format!("{i:0>60}"));
    }

    let connector = ScriptedConnector::new();
    beacon.send(&connector).unwrap();

    assert!(connector.beacon_request_count() > 1);
    assert!(beacon.is_empty());
    let total_records: usize = connector
        .beacon_payloads()
        .iter()
        .map(|p| p.matches("et=11").count())
        .sum();
    assert_eq!(total_records, 40);
}

fn assert_payloads_within_beacon_size(format: SerializationFormat) {
    let h = harness_with(format);
    h.configuration.update_settings(Some(&status_ok("bl=1")));
    let max = h.configuration.max_beacon_size_bytes();
    let beacon = Beacon::new(h.providers.clone(), "10.0.0.1");
    for i in 0..200 {
        beacon.report_event(0, &format!("event number {i}"));
    }

    let connector = ScriptedConnector::new();
    beacon.send(&connector).unwrap();

    let payloads = connector.beacon_payloads();
    assert!(payloads.len() > 1);
    for payload in &payloads {
        assert!(
            payload.len() as i64 <= max,
            "payload of {} bytes exceeds {max}",
            payload.len()
        );
    }
    assert!(beacon.is_empty());
}

#[test]
fn key_value_chunks_stay_within_max_beacon_size() {
    assert_payloads_within_beacon_size(SerializationFormat::KeyValue);
}

#[test]
fn json_chunks_stay_within_max_beacon_size() {
    assert_payloads_within_beacon_size(SerializationFormat::Json);
}

#[test]
fn header_time_sync_uses_cluster_time() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "");
    h.providers.timing.initialize(250, true);
    let header = beacon.header();
    assert_eq!(header.session_start_time, 1_000);
    assert_eq!(header.time_sync_time, 1_250);
    assert_eq!(h.timing.cluster_time_offset(), 250);
}

#[test]
fn clear_data_drops_everything() {
    let h = harness();
    let beacon = Beacon::new(h.providers.clone(), "");
    beacon.report_event(0, "a");
    beacon.clear_data();
    assert!(beacon.is_empty());
    assert_eq!(h.cache.num_bytes_in_cache(), 0);
}

#[test]
fn json_format_sends_a_json_document() {
    let h = harness_with(SerializationFormat::Json);
    let beacon = Beacon::new(h.providers.clone(), "1.2.3.4");
    beacon.report_value_int(0, "count", 3);

    let connector = ScriptedConnector::new();
    beacon.send(&connector).unwrap();

    let payload = &connector.beacon_payloads()[0];
    assert!(payload.starts_with("{\"header\":"));
    assert!(payload.contains("\"et\":12"));
    assert!(payload.contains("\"client_ip\":\"1.2.3.4\""));
}
