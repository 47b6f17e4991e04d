//! Frame allocator benchmarks
//!
//! Measures the block alloc/free cycle and the O(1) frame release against
//! the equivalent sequence of individual frees.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use framestack::{FrameAllocator, FrameConfig};
use std::hint::black_box;

fn bench_block_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_cycle");

    group.bench_function("alloc_free_64b", |b| {
        let mut allocator = FrameAllocator::with_config(1024 * 1024, FrameConfig::production())
            .unwrap();

        b.iter(|| {
            let block = allocator.allocate_block(64).unwrap();
            black_box(block);
            allocator.free_block().unwrap();
        });
    });

    group.bench_function("alloc_free_4kb", |b| {
        let mut allocator = FrameAllocator::with_config(1024 * 1024, FrameConfig::production())
            .unwrap();

        b.iter(|| {
            let block = allocator.allocate_block(4096).unwrap();
            black_box(block);
            allocator.free_block().unwrap();
        });
    });

    group.finish();
}

fn bench_frame_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_release");
    group.throughput(Throughput::Elements(100));

    // One restore collapsing 100 blocks
    group.bench_function("restore_100x64b", |b| {
        let mut allocator = FrameAllocator::with_config(1024 * 1024, FrameConfig::production())
            .unwrap();

        b.iter(|| {
            let mark = allocator.mark();
            for _ in 0..100 {
                black_box(allocator.allocate_block(64).unwrap());
            }
            allocator.restore(mark).unwrap();
        });
    });

    // The same unwind as 100 individual frees
    group.bench_function("free_block_100x64b", |b| {
        let mut allocator = FrameAllocator::with_config(1024 * 1024, FrameConfig::production())
            .unwrap();

        b.iter(|| {
            for _ in 0..100 {
                black_box(allocator.allocate_block(64).unwrap());
            }
            for _ in 0..100 {
                allocator.free_block().unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_block_cycle, bench_frame_release);
criterion_main!(benches);
