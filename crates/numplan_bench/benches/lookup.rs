//! Range index benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use numplan_bench::{random_numbers, random_table, PER_PREFIX};
use numplan_core::{NumberLayout, RangeIndex};

/// Benchmark building the index.
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    let layout = NumberLayout::default();

    for rows in [1_000usize, 50_000].iter() {
        let table = random_table(layout, *rows);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            b.iter(|| {
                let index = RangeIndex::build(layout, table.clone()).unwrap();
                black_box(index);
            });
        });
    }
    group.finish();
}

/// Benchmark point and batch lookups.
fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate");
    let layout = NumberLayout::default();

    for rows in [1_000usize, 50_000].iter() {
        let table = random_table(layout, *rows);
        let prefixes = rows.div_ceil(PER_PREFIX / 2) as u64;
        let index = RangeIndex::build(layout, table).unwrap();
        let numbers = random_numbers(layout, 1_000, prefixes);

        group.throughput(Throughput::Elements(numbers.len() as u64));
        group.bench_with_input(BenchmarkId::new("single", rows), &numbers, |b, numbers| {
            b.iter(|| {
                for number in numbers {
                    black_box(index.locate(black_box(number)).unwrap());
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("batch", rows), &numbers, |b, numbers| {
            b.iter(|| {
                black_box(index.locate_many(numbers.iter()));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_locate);
criterion_main!(benches);
