use openkit_cache::{BeaconCache, BeaconCacheEvictor};
use openkit_core::config::BeaconCacheConfig;
use proptest::prelude::*;

fn records() -> impl Strategy<Value = Vec<(i32, i64, String)>> {
    prop::collection::vec((0i32..5, 0i64..10_000, "[a-z]{1,40}"), 0..80)
}

fn fill(cache: &BeaconCache, records: &[(i32, i64, String)]) {
    // Timestamps within one session increase with insertion order.
    let mut clock = 0;
    for (session, delta, data) in records {
        clock += delta % 50;
        cache.add_record(*session, clock, data.clone());
    }
}

proptest! {
    #[test]
    fn total_size_matches_sum_of_records(records in records()) {
        let cache = BeaconCache::new();
        fill(&cache, &records);
        let expected: i64 = records.iter().map(|(_, _, d)| d.len() as i64).sum();
        prop_assert_eq!(cache.num_bytes_in_cache(), expected);
    }

    #[test]
    fn space_eviction_ends_at_or_below_lower_bound(
        records in records(),
        lower in 0i64..500,
        span in 1i64..500,
    ) {
        let cache = BeaconCache::new();
        fill(&cache, &records);
        let upper = lower + span;
        let before = cache.num_bytes_in_cache();

        BeaconCacheEvictor::new(&BeaconCacheConfig::new(-1, lower, upper)).evict(&cache, 0);

        if before > upper {
            prop_assert!(cache.num_bytes_in_cache() <= lower);
        } else {
            prop_assert_eq!(cache.num_bytes_in_cache(), before);
        }
    }

    #[test]
    fn eviction_preserves_relative_order(records in records(), max_age in 0i64..2_000) {
        let cache = BeaconCache::new();
        fill(&cache, &records);
        let before: Vec<Vec<String>> = (0..5).map(|s| cache.pending_records(s)).collect();

        BeaconCacheEvictor::new(&BeaconCacheConfig::new(max_age, 10, 200)).evict(&cache, 2_500);

        for session in 0..5 {
            let after = cache.pending_records(session);
            // `after` must be a subsequence of `before`.
            let mut it = before[session as usize].iter();
            for record in &after {
                prop_assert!(it.any(|r| r == record));
            }
        }
    }

    #[test]
    fn chunk_then_reset_is_lossless(records in records(), max_size in 1i64..200) {
        let cache = BeaconCache::new();
        fill(&cache, &records);
        for session in 0..5 {
            let before = cache.pending_records(session);
            if cache.get_next_beacon_chunk(session, max_size, 0).is_some() {
                cache.reset_chunked_data(session);
            }
            prop_assert_eq!(cache.pending_records(session), before);
        }
    }
}
