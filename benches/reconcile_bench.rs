//! Presence cache reconciliation benchmarks.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench reconcile_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tagwatch_core::{TagId, TagRecord, Timestamp};
use tagwatch_presence::PresenceCache;
use tagwatch_protocol::Batch;

fn batch(first: u8, count: u8, ms: u32) -> Batch {
    let mut batch = Batch::new();
    for n in first..first + count {
        let id = TagId::new(&[0xE2, 0x00, 0x34, 0x12, 0x01, n]).unwrap();
        batch.enqueue(TagRecord::new(id, Timestamp::from_millis(ms))).unwrap();
    }
    batch
}

/// Steady state: every tag in the batch is already cached.
fn bench_all_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_matches");

    for count in [1u8, 5, 15] {
        let mut cache: PresenceCache = PresenceCache::with_default_expiry();
        cache.reconcile(&batch(0, count, 0), Timestamp::from_millis(0));
        let incoming = batch(0, count, 100);

        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::from_parameter(count), &incoming, |b, incoming| {
            b.iter(|| {
                let report = cache.reconcile(black_box(incoming), Timestamp::from_millis(100));
                black_box(report);
            });
        });
    }

    group.finish();
}

/// Worst case: a full cache with no stale entries and only unknown tags.
fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_churn");
    group.throughput(Throughput::Elements(15));

    let mut seed: PresenceCache = PresenceCache::with_default_expiry();
    seed.reconcile(&batch(0, 15, 0), Timestamp::from_millis(0));
    seed.reconcile(&batch(15, 10, 0), Timestamp::from_millis(0));
    let incoming = batch(100, 15, 10);

    group.bench_function("full_cache_fifo_eviction", |b| {
        b.iter(|| {
            let mut cache = seed.clone();
            black_box(cache.reconcile(black_box(&incoming), Timestamp::from_millis(10)));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_all_matches, bench_churn);
criterion_main!(benches);
