use openkit_protocol::{BeaconEvent, BeaconSerializer, EventBase, KeyValueSerializer, ReportedValue};
use proptest::prelude::*;

fn event(name: String, value: String) -> BeaconEvent {
    BeaconEvent::Value {
        base: EventBase {
            name,
            thread_id: 1,
            parent_action_id: 0,
            sequence_no: 1,
            time: 0,
        },
        value: ReportedValue::String(value),
    }
}

proptest! {
    #[test]
    fn user_text_never_breaks_pair_structure(name in ".{0,64}", value in ".{0,64}") {
        let encoded = KeyValueSerializer.encode_event(&event(name, value)).unwrap();
        let pairs: Vec<&str> = encoded.split('&').collect();
        prop_assert_eq!(pairs.len(), 7);
        for pair in pairs {
            prop_assert_eq!(pair.matches('=').count(), 1);
        }
    }

    #[test]
    fn encoded_values_decode_back(value in ".{0,64}") {
        let encoded = KeyValueSerializer.encode_event(&event("n".into(), value.clone())).unwrap();
        let raw = encoded.rsplit('&').next().unwrap().strip_prefix("vl=").unwrap();
        let decoded = urlencoding::decode(raw).unwrap();
        prop_assert_eq!(decoded.as_ref(), value.as_str());
    }
}
