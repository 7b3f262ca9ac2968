use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use memtable::Memtable;
use sstable::SegmentBuilder;
use tempfile::tempdir;

const N_KEYS: usize = 10_000;
const VALUE_SIZE: usize = 100;
const SPARSE_OFFSET: usize = 100;

fn build_memtable() -> Memtable {
    let mut mem = Memtable::new();
    for i in 0..N_KEYS {
        mem.put(format!("key{:08}", i).into_bytes(), vec![b'x'; VALUE_SIZE]);
    }
    mem
}

fn sstable_write_benchmark(c: &mut Criterion) {
    c.bench_function("segment_write_10k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let path = dir.path().join("bench.dat");
                let mem = build_memtable();
                (dir, path, mem)
            },
            |(_dir, path, mem)| {
                let mut builder = SegmentBuilder::new_persistent(&path, SPARSE_OFFSET).unwrap();
                for (key, value) in mem.iter_sorted() {
                    builder.add_entry(key, value).unwrap();
                }
                builder.finish().unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

fn sstable_search_hit_benchmark(c: &mut Criterion) {
    c.bench_function("segment_search_hit_10k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let path = dir.path().join("bench.dat");

                let mem = build_memtable();
                let mut builder = SegmentBuilder::new_persistent(&path, SPARSE_OFFSET).unwrap();
                for (key, value) in mem.iter_sorted() {
                    builder.add_entry(key, value).unwrap();
                }
                let segment = builder.finish().unwrap();
                (dir, segment)
            },
            |(_dir, segment)| {
                for i in 0..N_KEYS {
                    let key = format!("key{:08}", i).into_bytes();
                    let outcome = segment.search(&key).unwrap();
                    assert!(matches!(outcome, sstable::SearchOutcome::Found(_)));
                }
            },
            BatchSize::LargeInput,
        );
    });
}

fn sstable_search_miss_benchmark(c: &mut Criterion) {
    c.bench_function("segment_search_miss_10k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let path = dir.path().join("bench.dat");

                let mem = build_memtable();
                let mut builder = SegmentBuilder::new_persistent(&path, SPARSE_OFFSET).unwrap();
                for (key, value) in mem.iter_sorted() {
                    builder.add_entry(key, value).unwrap();
                }
                let segment = builder.finish().unwrap();
                (dir, segment)
            },
            |(_dir, segment)| {
                for i in 0..N_KEYS {
                    let key = format!("missing{:08}", i).into_bytes();
                    let outcome = segment.search(&key).unwrap();
                    assert!(matches!(outcome, sstable::SearchOutcome::NotFound));
                }
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    sstable_write_benchmark,
    sstable_search_hit_benchmark,
    sstable_search_miss_benchmark
);
criterion_main!(benches);
