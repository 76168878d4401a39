use openkit_communication::state::median_offset;
use proptest::prelude::*;

proptest! {
    #[test]
    fn median_is_one_of_the_offsets(offsets in prop::collection::vec(-10_000i64..10_000, 1..20)) {
        let mut sorted = offsets.clone();
        let median = median_offset(&mut sorted).unwrap();
        prop_assert!(offsets.contains(&median));
    }

    #[test]
    fn median_splits_the_offsets(offsets in prop::collection::vec(-10_000i64..10_000, 1..20)) {
        let mut work = offsets.clone();
        let median = median_offset(&mut work).unwrap();
        let below = offsets.iter().filter(|&&o| o < median).count();
        let above = offsets.iter().filter(|&&o| o > median).count();
        prop_assert!(below <= offsets.len() / 2);
        prop_assert!(above <= offsets.len() / 2);
    }

    #[test]
    fn median_ignores_input_order(mut offsets in prop::collection::vec(-10_000i64..10_000, 1..20)) {
        let mut reversed: Vec<i64> = offsets.iter().rev().copied().collect();
        prop_assert_eq!(median_offset(&mut offsets), median_offset(&mut reversed));
    }
}
