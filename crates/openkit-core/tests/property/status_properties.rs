use openkit_core::models::StatusResponse;
use proptest::prelude::*;

proptest! {
    #[test]
    fn parse_never_panics(body in ".{0,200}", code in 100u16..600) {
        let response = StatusResponse::parse(&body, code);
        prop_assert_eq!(response.response_code, code);
    }

    #[test]
    fn send_interval_is_scaled_to_millis(seconds in 0i64..1_000_000) {
        let response = StatusResponse::parse(&format!("si={seconds}"), 200);
        prop_assert_eq!(response.send_interval_ms, seconds * 1000);
    }

    #[test]
    fn beacon_size_is_scaled_to_bytes(kb in 0i64..1_000_000) {
        let response = StatusResponse::parse(&format!("bl={kb}&cp=1"), 200);
        prop_assert_eq!(response.max_beacon_size_bytes, kb * 1024);
        prop_assert!(response.capture);
    }
}
