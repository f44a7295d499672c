//! Benchmarks for the deinterleave-and-scale kernel.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use iqkern::{deinterleave_scale, deinterleave_scale_scalar};
use num_complex::Complex;
use rand::prelude::*;

fn random_iq(n: usize) -> Vec<Complex<i8>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| Complex::new(rng.gen(), rng.gen())).collect()
}

fn bench_deinterleave(c: &mut Criterion) {
    let mut group = c.benchmark_group("deinterleave_scale");

    for points in [64, 256, 1024, 4096, 16384] {
        let iq = random_iq(points);
        let mut i_out = vec![0.0_f32; points];
        let mut q_out = vec![0.0_f32; points];

        group.throughput(Throughput::Elements(points as u64));
        group.bench_with_input(BenchmarkId::new("dispatched", points), &points, |bench, _| {
            bench.iter(|| {
                deinterleave_scale(black_box(&mut i_out), black_box(&mut q_out), &iq, 128.0)
            })
        });
        group.bench_with_input(BenchmarkId::new("scalar", points), &points, |bench, _| {
            bench.iter(|| {
                deinterleave_scale_scalar(black_box(&mut i_out), black_box(&mut q_out), &iq, 128.0)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_deinterleave);
criterion_main!(benches);
