//! # Coalesce Benchmark
//!
//! Measures:
//! 1. Request cost when the handle is already pending (the common case)
//! 2. Full request + drain cycle for N distinct handles
//!
//! Steady state should not allocate: the drain recycles its snapshot buffer.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use framelatch_core::{FrameAction, FrameCoalescer};

fn bench_duplicate_request(c: &mut Criterion) {
    let coalescer = FrameCoalescer::default();
    let action = FrameAction::new(|| {});
    coalescer.request_once_per_frame(&action);

    c.bench_function("request_duplicate", |b| {
        b.iter(|| coalescer.request_once_per_frame(black_box(&action)));
    });
}

fn bench_request_and_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_and_drain");

    for count in [10, 100, 1_000] {
        let coalescer = FrameCoalescer::default();
        let actions: Vec<FrameAction> = (0..count)
            .map(|_| FrameAction::new(|| black_box(())))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                for action in &actions {
                    coalescer.request_once_per_frame(action);
                    coalescer.request_once_per_frame(action);
                }
                black_box(coalescer.drain_pending())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_duplicate_request, bench_request_and_drain);
criterion_main!(benches);
