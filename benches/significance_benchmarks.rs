//! Significance calculation benchmarks
//!
//! - Pooled two-proportion z statistic
//! - Confidence banding
//!
//! Toyota Way: Measure before optimizing (Genchi Genbutsu)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trueno_ab::significance::{z_score, Confidence};

/// Benchmark z-score over growing sample sizes
fn bench_z_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("z_score");

    for n in [100_u64, 10_000, 1_000_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter(|| black_box(z_score(black_box(0.105), n, black_box(0.100), n)));
        });
    }

    group.finish();
}

/// Benchmark the N/A guard path
fn bench_z_score_not_applicable(c: &mut Criterion) {
    c.bench_function("z_score_not_applicable", |b| {
        b.iter(|| black_box(z_score(black_box(1.5), 1000, black_box(0.1), 1000)));
    });
}

/// Benchmark confidence banding
fn bench_confidence(c: &mut Criterion) {
    c.bench_function("confidence_from_z", |b| {
        b.iter(|| black_box(Confidence::from_z(black_box(1.9596))));
    });
}

criterion_group!(
    benches,
    bench_z_score,
    bench_z_score_not_applicable,
    bench_confidence
);
criterion_main!(benches);
