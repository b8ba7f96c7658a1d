//! Criterion benchmarks for logfanout

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use logfanout::core::framer::frame;
use logfanout::prelude::*;
use std::io;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Framing Benchmarks
// ============================================================================

fn bench_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");
    group.throughput(Throughput::Elements(1));

    let single = b"GET /api/v1/users 200 3ms\n";
    let multi = b"panic: index out of range\n  at handler.rs:42\n  at server.rs:118\n";

    group.bench_function("single_line", |b| {
        b.iter(|| frame(black_box("2bfbea1e-10c3"), black_box("api"), black_box(single)));
    });

    group.bench_function("multi_line", |b| {
        b.iter(|| frame(black_box("2bfbea1e-10c3"), black_box("api"), black_box(multi)));
    });

    group.finish();
}

// ============================================================================
// Synchronous Fanout Benchmarks
// ============================================================================

fn bench_sync_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_fanout");
    group.throughput(Throughput::Elements(1));

    for sinks in [1usize, 4] {
        let logger = Logger::builder().prefix_generator(prefix::empty()).build();
        for _ in 0..sinks {
            logger
                .add_sink(Arc::new(WriterSink::new(io::sink())))
                .expect("no cycle");
        }

        group.bench_function(format!("{sinks}_sinks"), |b| {
            b.iter(|| logger.write(black_box(b"request handled\n")));
        });
    }

    let root = Logger::builder().prefix_generator(prefix::empty()).build();
    root.add_sink(Arc::new(WriterSink::new(io::sink())))
        .expect("no cycle");
    let child = root.child(["req=1", "GET"]);

    group.bench_function("child_to_parent", |b| {
        b.iter(|| child.write(black_box(b"request handled\n")));
    });

    let stamped = Logger::builder()
        .sink(WriterSink::new(io::sink()))
        .build();

    group.bench_function("timestamp_prefix", |b| {
        b.iter(|| stamped.write(black_box(b"request handled\n")));
    });

    group.finish();
}

// ============================================================================
// Async Benchmarks
// ============================================================================

fn bench_async_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("async_print");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder()
        .prefix_generator(prefix::empty())
        .queue_capacity(65_536)
        .overflow_policy(OverflowPolicy::Block)
        .sink(WriterSink::new(io::sink()))
        .build();

    group.bench_function("print", |b| {
        b.iter(|| logger.print(black_box("request handled\n")));
    });

    group.bench_function("println_display", |b| {
        b.iter(|| logger.println(black_box(42)));
    });

    logger.drain(Duration::from_secs(10));
    group.finish();
}

criterion_group!(benches, bench_framing, bench_sync_fanout, bench_async_print);
criterion_main!(benches);
