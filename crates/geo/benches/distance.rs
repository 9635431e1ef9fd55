//! Benchmarks for geo crate distance and circle calculations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use voyage_geo::{accuracy_circle, distance_between, haversine_distance_meters, Coordinate, LocationFix};

fn bench_single_distance(c: &mut Criterion) {
    let berlin = Coordinate::new(52.5200, 13.4050);
    let paris = Coordinate::new(48.8566, 2.3522);

    c.bench_function("haversine_single", |b| {
        b.iter(|| haversine_distance_meters(black_box(&berlin), black_box(&paris)))
    });
}

fn bench_fix_distance(c: &mut Criterion) {
    let a = LocationFix::new(52.5200, 13.4050, 10.0, 0);
    let b_fix = LocationFix::new(48.8566, 2.3522, 10.0, 60_000);

    c.bench_function("distance_between_fixes", |b| {
        b.iter(|| distance_between(black_box(&a), black_box(&b_fix)))
    });
}

fn bench_accuracy_circle(c: &mut Criterion) {
    let fix = LocationFix::new(52.5200, 13.4050, 25.0, 0);

    let mut group = c.benchmark_group("accuracy_circle");
    for points in [8, 32, 128].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(points), points, |b, &points| {
            b.iter(|| accuracy_circle(black_box(&fix), black_box(points)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_single_distance,
    bench_fix_distance,
    bench_accuracy_circle
);
criterion_main!(benches);
