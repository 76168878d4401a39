use std::sync::{Arc, Weak};

use openkit_cache::BeaconCache;
use openkit_core::config::SerializationFormat;
use openkit_core::Configuration;
use openkit_protocol::{serializer_for, Beacon, BeaconProviders};
use openkit_session::{Action, RootAction, Session, SessionRegistry};
use proptest::prelude::*;
use test_fixtures::{test_config, FakeTimingProvider, FixedThreadIdProvider};

struct Detached;

impl SessionRegistry for Detached {
    fn start_session(&self, _session: Arc<Session>) -> bool {
        true
    }

    fn finish_session(&self, _session: &Arc<Session>) {}
}

#[derive(Debug, Clone)]
enum Op {
    EnterRoot,
    EnterChild(usize),
    LeaveRoot(usize),
    LeaveChild(usize),
    End,
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        3 => Just(Op::EnterRoot),
        3 => any::<usize>().prop_map(Op::EnterChild),
        2 => any::<usize>().prop_map(Op::LeaveRoot),
        2 => any::<usize>().prop_map(Op::LeaveChild),
        1 => Just(Op::End),
    ];
    prop::collection::vec(op, 0..60)
}

fn record_types(cache: &BeaconCache, session: &Session) -> Vec<String> {
    cache
        .pending_records(session.session_number())
        .iter()
        .filter_map(|r| r.split('&').next().map(str::to_string))
        .collect()
}

proptest! {
    #[test]
    fn action_records_match_closed_actions(ops in ops()) {
        let cache = Arc::new(BeaconCache::new());
        let providers = BeaconProviders {
            configuration: Arc::new(Configuration::new(test_config())),
            cache: Arc::clone(&cache),
            timing: Arc::new(FakeTimingProvider::new(1_000)),
            thread_ids: Arc::new(FixedThreadIdProvider(1)),
            serializer: serializer_for(SerializationFormat::KeyValue),
        };
        let registry: Weak<dyn SessionRegistry> = Weak::<Detached>::new();
        let session = Session::new(Beacon::new(providers, ""), registry);

        let mut roots: Vec<Arc<RootAction>> = Vec::new();
        let mut children: Vec<Arc<Action>> = Vec::new();
        for op in ops {
            match op {
                Op::EnterRoot => roots.extend(session.enter_action("root")),
                Op::EnterChild(i) if !roots.is_empty() => {
                    children.extend(roots[i % roots.len()].enter_action("child"));
                }
                Op::LeaveRoot(i) if !roots.is_empty() => roots[i % roots.len()].leave_action(),
                Op::LeaveChild(i) if !children.is_empty() => {
                    children[i % children.len()].leave_action();
                }
                Op::End => session.end(),
                _ => {}
            }
        }

        let created = roots.len() + children.len();
        let closed = roots.iter().filter(|a| a.is_left()).count()
            + children.iter().filter(|a| a.is_left()).count();
        let types = record_types(&cache, &session);
        let action_records = types.iter().filter(|t| *t == "et=1").count();

        prop_assert_eq!(action_records, closed);
        prop_assert!(action_records <= created);
        if session.is_ended() {
            prop_assert_eq!(action_records, created);
            prop_assert_eq!(types.last().map(String::as_str), Some("et=19"));
            prop_assert_eq!(types.iter().filter(|t| *t == "et=19").count(), 1);
        }
    }
}
