//! Benchmarks for write propagation through the signal graph
//!
//! Run with: cargo bench -p sigdom-core --bench signal_graph

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sigdom_core::binder::{Binder, Props};
use sigdom_core::dom::MemoryDom;
use sigdom_core::reactive::Runtime;

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    for width in [1_usize, 10, 100, 1000] {
        let runtime = Runtime::new();
        let source = runtime.signal(0_u64);
        let handles: Vec<_> = (0..width)
            .map(|_| {
                let s = source.clone();
                runtime.effect(move || {
                    black_box(s.get());
                })
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| source.update(|v| v + 1));
        });
        drop(handles);
    }

    group.finish();
}

fn bench_computed_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("computed_chain");

    for depth in [1_usize, 10, 100] {
        let runtime = Runtime::new();
        let source = runtime.signal(0_u64);

        let mut chain = Vec::with_capacity(depth);
        let s = source.clone();
        chain.push(runtime.computed(move || s.get() + 1));
        for _ in 1..depth {
            let previous = chain[chain.len() - 1].clone();
            chain.push(runtime.computed(move || previous.get() + 1));
        }
        let last = chain[depth - 1].clone();
        runtime.effect(move || {
            black_box(last.get());
        });

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| source.update(|v| v + 1));
        });
    }

    group.finish();
}

fn bench_reactive_text(c: &mut Criterion) {
    let runtime = Runtime::new();
    let binder = Binder::new(MemoryDom::new()).with_runtime(runtime.clone());
    let label = runtime.signal(String::new());
    let node = binder
        .build("span", Props::new().with("text", label.clone()), None)
        .expect("build span");

    let mut n = 0_u64;
    c.bench_function("reactive_text_update", |b| {
        b.iter(|| {
            n += 1;
            label.set(n.to_string());
        });
    });
    black_box(node);
}

criterion_group!(benches, bench_fan_out, bench_computed_chain, bench_reactive_text);
criterion_main!(benches);
