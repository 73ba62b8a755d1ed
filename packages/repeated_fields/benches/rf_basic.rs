//! Basic benchmarks for the `repeated_fields` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use repeated_fields::{PointerSequence, ValueSequence};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = u64;
const TEST_VALUE: TestItem = 1024;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("rf_value");

    let allocs_op = allocs.operation("value_add_inline");
    group.bench_function("value_add_inline", |b| {
        b.iter_custom(|iters| {
            let mut fields = iter::repeat_with(ValueSequence::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for field in &mut fields {
                field.add(black_box(TEST_VALUE));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("value_add_spill");
    group.bench_function("value_add_spill", |b| {
        b.iter_custom(|iters| {
            let mut fields = iter::repeat_with(ValueSequence::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            // Fill the inline storage so the next add moves to the heap.
            for field in &mut fields {
                while field.len() < field.capacity() {
                    field.add(TEST_VALUE);
                }
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for field in &mut fields {
                field.add(black_box(TEST_VALUE));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("value_get");
    group.bench_function("value_get", |b| {
        b.iter_custom(|iters| {
            let field = (0..100).collect::<ValueSequence<TestItem>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(field.get(black_box(50)));
            }

            start.elapsed()
        });
    });

    group.finish();

    let mut group = c.benchmark_group("rf_pointer");

    let allocs_op = allocs.operation("pointer_add_fresh");
    group.bench_function("pointer_add_fresh", |b| {
        b.iter_custom(|iters| {
            let mut fields = iter::repeat_with(PointerSequence::<String>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for field in &mut fields {
                field.add().push_str(black_box("value"));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("pointer_add_recycled");
    group.bench_function("pointer_add_recycled", |b| {
        b.iter_custom(|iters| {
            let mut fields = iter::repeat_with(PointerSequence::<String>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            // Pre-warm each field with one cleared string that has room for the value.
            for field in &mut fields {
                field.add().push_str("value");
                field.clear();
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for field in &mut fields {
                field.add().push_str(black_box("value"));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("pointer_clear_refill_10");
    group.bench_function("pointer_clear_refill_10", |b| {
        b.iter_custom(|iters| {
            let mut field = PointerSequence::<String>::new();
            for _ in 0..10 {
                field.add().push_str("value");
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                field.clear();

                for _ in 0..10 {
                    field.add().push_str(black_box("value"));
                }
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
