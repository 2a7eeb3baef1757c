//! Counter store and variant benchmarks
//!
//! - Atomic increments on a hot record
//! - Conversion rate reads
//! - Recorded info read-modify-write
//!
//! Toyota Way: Measure before optimizing (Genchi Genbutsu)

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;
use trueno_ab::experiment::{ExperimentRecord, MemoryCatalog, NameSpec, Variant};
use trueno_ab::kv::{CounterStore, MemoryCounterStore};

fn variant(goals: usize) -> Variant<MemoryCounterStore, MemoryCatalog> {
    let catalog = MemoryCatalog::new();
    catalog.insert(
        ExperimentRecord::builder("bench", vec![NameSpec::plain("a"), NameSpec::plain("b")])
            .goals((0..goals).map(|i| format!("goal_{i}")))
            .build()
            .unwrap(),
    );
    Variant::new(
        NameSpec::plain("b"),
        "bench",
        Arc::new(MemoryCounterStore::new()),
        Arc::new(catalog),
    )
}

/// Benchmark raw store increments
fn bench_store_increment(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = MemoryCounterStore::new();

    c.bench_function("store_hash_increment_by", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(
                store
                    .hash_increment_by("bench:b", "participant_count", 1)
                    .await
                    .unwrap(),
            );
        });
    });
}

/// Benchmark variant participation increments
fn bench_increment_participation(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let variant = variant(0);

    c.bench_function("increment_participation", |b| {
        b.to_async(&rt)
            .iter(|| async { variant.increment_participation().await.unwrap() });
    });
}

/// Benchmark all_completed_count as the number of goals grows
fn bench_all_completed_count(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("all_completed_count");

    for goals in [0_usize, 4, 16].iter() {
        let variant = variant(*goals);
        group.bench_with_input(BenchmarkId::from_parameter(goals), goals, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(variant.all_completed_count().await.unwrap()) });
        });
    }

    group.finish();
}

/// Benchmark recorded info updates
fn bench_record_extra_info(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let variant = variant(0);

    c.bench_function("record_extra_info", |b| {
        b.to_async(&rt)
            .iter(|| async { variant.record_extra_info("clicks", 1).await.unwrap() });
    });
}

criterion_group!(
    benches,
    bench_store_increment,
    bench_increment_participation,
    bench_all_completed_count,
    bench_record_extra_info
);
criterion_main!(benches);
