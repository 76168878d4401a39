//! Criterion benchmarks for openkit-cache.

use criterion::{criterion_group, criterion_main, Criterion};

use openkit_cache::{BeaconCache, BeaconCacheEvictor};
use openkit_core::config::BeaconCacheConfig;

fn filled_cache(sessions: i32, per_session: i64) -> BeaconCache {
    let cache = BeaconCache::new();
    for session in 0..sessions {
        for i in 0..per_session {
            cache.add_record(session, i, format!("et=1&na=action{i}&it=1&ca={i}&pa=0"));
        }
    }
    cache
}

fn bench_add_record(c: &mut Criterion) {
    let cache = BeaconCache::new();
    let mut ts = 0;
    c.bench_function("add_record", |b| {
        b.iter(|| {
            ts += 1;
            cache.add_record((ts % 16) as i32, ts, "et=10&na=event&it=1&pa=0&s0=1&t0=0".into());
        })
    });
}

fn bench_space_eviction(c: &mut Criterion) {
    let config = BeaconCacheConfig::new(-1, 50_000, 100_000);
    let evictor = BeaconCacheEvictor::new(&config);
    c.bench_function("space_eviction_50_sessions", |b| {
        b.iter_batched(
            || filled_cache(50, 100),
            |cache| evictor.evict(&cache, 0),
            criterion::BatchSize::LargeInput,
        )
    });
}

fn bench_chunking(c: &mut Criterion) {
    c.bench_function("chunk_and_ack", |b| {
        b.iter_batched(
            || filled_cache(1, 1_000),
            |cache| {
                while cache.get_next_beacon_chunk(0, 30 * 1024, 1).is_some() {
                    cache.remove_chunked_data(0);
                }
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_add_record, bench_space_eviction, bench_chunking);
criterion_main!(benches);
