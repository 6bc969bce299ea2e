//! Benchmarks for the SVD-precoded MIMO link
//!
//! Run with: cargo bench -p mimo-core --bench link_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mimo_core::prelude::*;
use mimo_core::svd::SvdEngine;
use std::time::Duration;

const CONFIGS: [(usize, usize); 5] = [(2, 4), (4, 8), (32, 16), (32, 64), (128, 256)];

// ============================================================================
// SVD
// ============================================================================

fn bench_svd(c: &mut Criterion) {
    let mut group = c.benchmark_group("svd");
    let engine = SvdEngine::new();

    for &(nr, nt) in CONFIGS.iter() {
        let mut model = ChannelModel::with_seed(1.0, 1).unwrap();
        let h = model.generate_channel(nr, nt).unwrap();
        let label = format!("{}x{}", nr, nt);

        group.bench_with_input(BenchmarkId::new("decompose", &label), &h, |b, h| {
            b.iter(|| {
                if nr >= nt {
                    engine.decompose_square_or_tall(black_box(h))
                } else {
                    engine.decompose_transposed(black_box(&h.transpose()))
                }
            })
        });
    }

    group.finish();
}

// ============================================================================
// Per-vector pipeline
// ============================================================================

fn bench_transmit_vector(c: &mut Criterion) {
    let mut group = c.benchmark_group("transmit_vector");

    for &(nr, nt) in CONFIGS.iter() {
        let mut model = ChannelModel::with_seed(1.0, 2).unwrap();
        let link = MimoLink::generate(
            &mut model,
            nr,
            nt,
            NoiseLevel::Low,
            ZeroSingularValuePolicy::default(),
        )
        .unwrap();
        let n = link.n_streams();
        let x = ComplexMatrix::from_column(&vec![Complex::new(1.0, -1.0); n]).unwrap();

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(
            BenchmarkId::new("chain", format!("{}x{}", nr, nt)),
            &x,
            |b, x| b.iter(|| link.transmit_vector(black_box(x), &mut model)),
        );
    }

    group.finish();
}

// ============================================================================
// Whole payload
// ============================================================================

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("link_run");
    group.measurement_time(Duration::from_secs(5));

    let payload = vec![0xA5u8; 1024];
    let symbols = bytes_to_symbols(&payload);
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for &(nr, nt) in &[(4, 8), (32, 16)] {
        let mut model = ChannelModel::with_seed(1.0, 3).unwrap();
        let link = MimoLink::generate(
            &mut model,
            nr,
            nt,
            NoiseLevel::Medium,
            ZeroSingularValuePolicy::default(),
        )
        .unwrap();

        group.bench_function(BenchmarkId::new("sequential", format!("{}x{}", nr, nt)), |b| {
            b.iter(|| link.run(black_box(&symbols), &mut model))
        });

        #[cfg(feature = "parallel")]
        group.bench_function(BenchmarkId::new("parallel", format!("{}x{}", nr, nt)), |b| {
            b.iter(|| link.run_parallel(black_box(&symbols), &model))
        });
    }

    group.finish();
}

criterion_group!(svd_benches, bench_svd);
criterion_group!(pipeline_benches, bench_transmit_vector, bench_run);
criterion_main!(svd_benches, pipeline_benches);
