//! Benchmarks for setup and the per-step solve.
//!
//! Run with: `cargo bench --bench step_bench`
//!
//! The per-step solve through the cached factorization is the model's
//! single hot path; setup (operator assembly plus the one-time LU
//! factorization) is measured separately to show the amortization.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rgswm::{Engine, ModelConfig};

fn config(n: usize) -> ModelConfig {
    ModelConfig {
        nx: n,
        ny: n,
        ..ModelConfig::default()
    }
}

/// Benchmark engine setup, dominated by the sparse LU factorization.
fn bench_initialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("initialize");
    for n in [21, 51] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| Engine::new(config(n)).unwrap());
        });
    }
    group.finish();
}

/// Benchmark the factorized per-step solve.
fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    for n in [21, 51, 101] {
        let mut engine = Engine::new(config(n)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| engine.step().unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_initialize, bench_step);
criterion_main!(benches);
