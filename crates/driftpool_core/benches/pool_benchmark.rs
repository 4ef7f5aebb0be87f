//! # Entity Pool Benchmark
//!
//! REQUIREMENTS:
//! - acquire/release stay flat regardless of churn
//! - integration and active iteration allocate nothing
//!
//! Run with: `cargo bench --package driftpool_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use driftpool_core::{EntityPool, SpawnState, Vec2};

/// Pool sizes seen in practice (8-50) plus a large one for scaling.
const CAPACITIES: [usize; 3] = [8, 50, 10_000];

fn filled_pool(capacity: usize) -> EntityPool {
    let mut pool = EntityPool::new(capacity);
    for i in 0..capacity {
        let f = i as f64;
        let _ = pool.acquire_with(&SpawnState::new(Vec2::new(f, -20.0), Vec2::new(0.0, 200.0)));
    }
    pool
}

/// Benchmark: saturate the pool, then drain it.
fn bench_acquire_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("acquire_release");

    for capacity in CAPACITIES {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let mut pool = EntityPool::new(capacity);
                let mut handles = Vec::with_capacity(capacity);
                b.iter(|| {
                    while let Some(h) = pool.acquire() {
                        handles.push(h);
                    }
                    for h in handles.drain(..) {
                        black_box(pool.release(h));
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: one integration step over a full pool.
fn bench_integrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate");

    for capacity in CAPACITIES {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let mut pool = filled_pool(capacity);
                b.iter(|| pool.integrate(black_box(1.0 / 60.0)));
            },
        );
    }

    group.finish();
}

/// Benchmark: walk the active set of a half-full pool.
fn bench_iterate_active(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate_active");

    for capacity in CAPACITIES {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let mut pool = filled_pool(capacity);
                let handles: Vec<_> = pool.iterate_active().step_by(2).collect();
                for h in handles {
                    pool.release(h);
                }
                b.iter(|| black_box(pool.iterate_active().count()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_acquire_release, bench_integrate, bench_iterate_active);
criterion_main!(benches);
