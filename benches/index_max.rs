//! Benchmarks for the argmax kernel.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use iqkern::{index_max, index_max_scalar};
use rand::prelude::*;

fn random_samples(n: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn bench_index_max(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_max");

    for points in [64, 256, 1024, 4096, 16384, 65535] {
        let v = random_samples(points);

        group.throughput(Throughput::Elements(points as u64));
        group.bench_with_input(BenchmarkId::new("dispatched", points), &points, |bench, _| {
            bench.iter(|| index_max(black_box(&v)))
        });
        group.bench_with_input(BenchmarkId::new("scalar", points), &points, |bench, _| {
            bench.iter(|| index_max_scalar(black_box(&v)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_index_max);
criterion_main!(benches);
