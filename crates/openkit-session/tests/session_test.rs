use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;

use openkit_cache::BeaconCache;
use openkit_core::config::SerializationFormat;
use openkit_core::Configuration;
use openkit_protocol::{serializer_for, Beacon, BeaconProviders};
use openkit_session::{Session, SessionRegistry};
use test_fixtures::{test_config, FakeTimingProvider, FixedThreadIdProvider, ScriptedConnector};

/// Registry that only remembers what it was told.
#[derive(Default)]
struct RecordingRegistry {
    started: Mutex<Vec<i32>>,
    finished: Mutex<Vec<i32>>,
    closed: AtomicBool,
}

impl SessionRegistry for RecordingRegistry {
    fn start_session(&self, session: Arc<Session>) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        self.started.lock().unwrap().push(session.session_number());
        true
    }

    fn finish_session(&self, session: &Arc<Session>) {
        self.finished.lock().unwrap().push(session.session_number());
    }
}

struct Harness {
    cache: Arc<BeaconCache>,
    timing: Arc<FakeTimingProvider>,
    providers: BeaconProviders,
    registry: Arc<RecordingRegistry>,
}

impl Harness {
    fn new() -> Self {
        let configuration = Arc::new(Configuration::new(test_config()));
        let cache = Arc::new(BeaconCache::new());
        let timing = Arc::new(FakeTimingProvider::new(1_000));
        let providers = BeaconProviders {
            configuration,
            cache: Arc::clone(&cache),
            timing: timing.clone(),
            thread_ids: Arc::new(FixedThreadIdProvider(7)),
            serializer: serializer_for(SerializationFormat::KeyValue),
        };
        Self {
            cache,
            timing,
            providers,
            registry: Arc::new(RecordingRegistry::default()),
        }
    }

    fn session(&self) -> Arc<Session> {
        let registry: Arc<dyn SessionRegistry> = self.registry.clone();
        let weak: Weak<dyn SessionRegistry> = Arc::downgrade(&registry);
        Session::new(Beacon::new(self.providers.clone(), "10.0.0.1"), weak)
    }

    fn record_types(&self, session: &Session) -> Vec<String> {
        self.cache
            .pending_records(session.session_number())
            .iter()
            .map(|r| r.split('&').next().unwrap().to_string())
            .collect()
    }
}

fn field<'a>(record: &'a str, key: &str) -> &'a str {
    record
        .split('&')
        .find_map(|kv| kv.strip_prefix(&format!("{key}=")))
        .unwrap()
}

#[test]
fn new_session_is_registered_as_open() {
    let h = Harness::new();
    let session = h.session();
    assert_eq!(*h.registry.started.lock().unwrap(), vec![session.session_number()]);
    assert!(!session.is_ended());
    assert_eq!(session.end_time(), -1);
}

#[test]
fn end_closes_actions_innermost_first_and_records_session_end() {
    let h = Harness::new();
    let session = h.session();
    let root = session.enter_action("root").unwrap();
    let child = root.enter_action("child").unwrap();

    h.timing.advance(50);
    session.end();

    assert!(root.is_left());
    assert!(child.is_left());
    assert_eq!(session.open_root_action_count(), 0);
    assert_eq!(h.record_types(&session), vec!["et=1", "et=1", "et=19"]);

    let records = h.cache.pending_records(session.session_number());
    assert_eq!(field(&records[0], "na"), "child");
    assert_eq!(field(&records[1], "na"), "root");
    assert_eq!(*h.registry.finished.lock().unwrap(), vec![session.session_number()]);
}

#[test]
fn end_is_idempotent() {
    let h = Harness::new();
    let session = h.session();
    session.end();
    let end_time = session.end_time();
    h.timing.advance(100);
    session.end();

    assert_eq!(session.end_time(), end_time);
    assert_eq!(h.record_types(&session), vec!["et=19"]);
    assert_eq!(h.registry.finished.lock().unwrap().len(), 1);
}

#[test]
fn concurrent_end_records_exactly_once() {
    let h = Harness::new();
    let session = h.session();
    session.enter_action("a").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let s = Arc::clone(&session);
            thread::spawn(move || s.end())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(h.record_types(&session), vec!["et=1", "et=19"]);
    assert_eq!(h.registry.finished.lock().unwrap().len(), 1);
}

fn spawn_app_thread<F: FnOnce() + Send + 'static>(f: F) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("app".to_string())
        .spawn(f)
        .unwrap()
}

#[test]
fn end_waits_for_leave_in_progress_on_another_thread() {
    let h = Harness::new();
    let session = h.session();
    let root = session.enter_action("checkout").unwrap();
    h.timing.stall_reads_on("app", Duration::from_millis(150));

    let leaving = Arc::clone(&root);
    let app = spawn_app_thread(move || leaving.leave_action());
    thread::sleep(Duration::from_millis(30));
    session.end();
    app.join().unwrap();

    assert!(root.is_left());
    assert_eq!(h.record_types(&session), vec!["et=1", "et=19"]);
}

#[test]
fn report_in_progress_lands_before_end_record() {
    let h = Harness::new();
    let session = h.session();
    h.timing.stall_reads_on("app", Duration::from_millis(150));

    let reporting = Arc::clone(&session);
    let app = spawn_app_thread(move || reporting.report_event("late"));
    thread::sleep(Duration::from_millis(30));
    session.end();
    app.join().unwrap();

    let types = h.record_types(&session);
    assert_eq!(types.len(), 2);
    assert_eq!(types.last().map(String::as_str), Some("et=19"));
}

#[test]
fn concurrent_child_leave_and_end_keep_record_order() {
    for _ in 0..50 {
        let h = Harness::new();
        let session = h.session();
        let root = session.enter_action("root").unwrap();
        let child = root.enter_action("child").unwrap();

        let leaving = Arc::clone(&child);
        let app = thread::spawn(move || {
            leaving.leave_action();
        });
        session.end();
        app.join().unwrap();

        let records = h.cache.pending_records(session.session_number());
        assert_eq!(h.record_types(&session), vec!["et=1", "et=1", "et=19"]);
        assert_eq!(field(&records[0], "na"), "child");
        assert_eq!(field(&records[1], "na"), "root");
    }
}

#[test]
fn refused_session_starts_ended_and_records_nothing() {
    let h = Harness::new();
    h.registry.closed.store(true, Ordering::SeqCst);
    let session = h.session();

    assert!(session.is_ended());
    assert!(session.enter_action("late").is_none());
    session.report_event("late");
    session.end();
    assert!(session.is_empty());
    assert!(h.registry.started.lock().unwrap().is_empty());
    assert!(h.registry.finished.lock().unwrap().is_empty());
}

#[test]
fn ended_session_ignores_calls() {
    let h = Harness::new();
    let session = h.session();
    session.end();

    assert!(session.enter_action("late").is_none());
    session.report_event("late");
    session.report_value_int("late", 1);
    session.identify_user("late");
    session.report_crash("late", "r", "s");

    assert_eq!(h.record_types(&session), vec!["et=19"]);
}

#[test]
fn empty_names_are_rejected() {
    let h = Harness::new();
    let session = h.session();

    assert!(session.enter_action("").is_none());
    session.report_event("");
    session.report_value_double("", 1.0);
    session.report_error("", 1, "r");
    session.identify_user("");

    assert!(session.is_empty());
}

#[test]
fn session_level_reports_have_no_parent() {
    let h = Harness::new();
    let session = h.session();
    session.report_value_string("build", "debug");
    session.identify_user("alice");

    let records = h.cache.pending_records(session.session_number());
    assert_eq!(field(&records[0], "pa"), "0");
    assert_eq!(field(&records[1], "et"), "60");
    assert_eq!(field(&records[1], "na"), "alice");
}

#[test]
fn leaving_child_returns_parent_and_removes_it_from_open_set() {
    let h = Harness::new();
    let session = h.session();
    let root = session.enter_action("root").unwrap();
    let child = root.enter_action("child").unwrap();
    assert_eq!(child.parent_id(), root.id());
    assert_eq!(root.open_child_count(), 1);

    let parent = child.leave_action().unwrap();
    assert!(Arc::ptr_eq(&parent, &root));
    assert_eq!(root.open_child_count(), 0);

    root.leave_action();
    assert_eq!(session.open_root_action_count(), 0);
}

#[test]
fn action_leave_records_once() {
    let h = Harness::new();
    let session = h.session();
    let root = session.enter_action("root").unwrap();
    root.leave_action();
    root.leave_action();
    assert_eq!(h.record_types(&session), vec!["et=1"]);
    assert!(root.end_sequence_no() > root.start_sequence_no());
}

#[test]
fn left_action_ignores_reports_and_children() {
    let h = Harness::new();
    let session = h.session();
    let root = session.enter_action("root").unwrap();
    root.leave_action();

    root.report_event("late").report_value_int("late", 1);
    assert!(root.enter_action("late child").is_none());
    assert!(root.trace_web_request("https://a.io").is_none());
    assert_eq!(h.record_types(&session), vec!["et=1"]);
}

#[test]
fn action_reports_carry_action_id_as_parent() {
    let h = Harness::new();
    let session = h.session();
    let root = session.enter_action("root").unwrap();
    root.report_event("clicked").report_error("failed", 42, "timeout");

    let records = h.cache.pending_records(session.session_number());
    assert_eq!(field(&records[0], "pa"), root.id().to_string());
    assert_eq!(field(&records[1], "ev"), "42");
}

#[test]
fn web_request_tracer_records_on_stop() {
    let h = Harness::new();
    let session = h.session();
    let root = session.enter_action("root").unwrap();
    let tracer = root
        .trace_web_request("https://api.example.com/items?token=secret")
        .unwrap();

    assert_eq!(tracer.url(), "https://api.example.com/items");
    assert!(tracer.tag().starts_with("MT_3_1_42_"));

    h.timing.advance(30);
    tracer
        .set_response_code(200)
        .set_bytes_sent(100)
        .set_bytes_received(2_048);
    tracer.stop();
    tracer.set_response_code(500);
    tracer.stop();

    assert!(tracer.is_stopped());
    assert_eq!(tracer.response_code(), 200);
    let records = h.cache.pending_records(session.session_number());
    assert_eq!(records.len(), 1);
    assert_eq!(field(&records[0], "et"), "30");
    assert_eq!(field(&records[0], "rc"), "200");
    assert_eq!(field(&records[0], "br"), "2048");
}

#[test]
fn invalid_url_yields_no_tracer() {
    let h = Harness::new();
    let session = h.session();
    let root = session.enter_action("root").unwrap();
    assert!(root.trace_web_request("not a url").is_none());
    assert!(root.trace_web_request("").is_none());
}

#[test]
fn send_beacon_uploads_and_clears() {
    let h = Harness::new();
    let session = h.session();
    session.report_event("hello");
    let connector = ScriptedConnector::new();

    session.send_beacon(&connector).unwrap();
    assert!(session.is_empty());
    assert_eq!(connector.beacon_request_count(), 1);
}

#[test]
fn clear_captured_data_drops_records() {
    let h = Harness::new();
    let session = h.session();
    session.report_event("hello");
    session.clear_captured_data();
    assert!(session.is_empty());
}

#[test]
fn session_without_registry_still_works() {
    let h = Harness::new();
    let weak: Weak<dyn SessionRegistry> = Weak::<RecordingRegistry>::new();
    let session = Session::new(Beacon::new(h.providers.clone(), ""), weak);
    session.report_event("x");
    session.end();
    assert!(session.is_ended());
}
