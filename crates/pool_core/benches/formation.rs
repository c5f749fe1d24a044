use chrono::Duration;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pool_core::config::MatchmakingConfig;
use pool_core::domain::TripRequest;
use pool_core::geo::GeoPoint;
use pool_core::matching::{form_groups, CompatibilityEvaluator};
use pool_core::test_helpers::{at, fixture_request};

/// A slot's worth of requests scattered over one 2-hour window, with
/// pickup jitter so only some pairs are compatible.
fn build_pool(size: usize) -> Vec<TripRequest> {
    (0..size)
        .map(|i| {
            let mut request = fixture_request(i as u64 + 1, at(8, 0));
            request.requested_pickup_time += Duration::minutes((i as i64 * 7) % 110);
            request.pickup = GeoPoint::new(
                57.70 + (i % 13) as f64 * 0.004,
                11.97 + (i % 7) as f64 * 0.006,
            );
            request.needs_wheelchair_access = i % 9 == 0;
            request
        })
        .collect()
}

fn formation_benchmark(c: &mut Criterion) {
    let config = MatchmakingConfig::default();
    let mut group = c.benchmark_group("group_formation");

    for size in [50_usize, 200, 800] {
        let pool = build_pool(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &pool, |b, pool| {
            b.iter(|| {
                let evaluator = CompatibilityEvaluator::new(&config);
                form_groups(pool.clone(), &evaluator, 4)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, formation_benchmark);
criterion_main!(benches);
