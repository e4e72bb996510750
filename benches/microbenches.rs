//! Criterion microbenches for seqlabel table codec and validation.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Generic-seq CSV parsing (validation + reconstruction)
//! - Generic-seq CSV writing (flattening + validation + rendering)
//! - Schema validation alone

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use seqlabel::ir::io_generic_seq::{from_generic_seq_csv_str, to_generic_seq_csv_string};
use seqlabel::ir::{Annotation, Segment, Sequence};
use seqlabel::table::io_csv::table_from_csv_slice;
use seqlabel::validation::validate;

// Include test fixtures at compile time (no file I/O during benchmark)
const BOTH_UNITS_FIXTURE: &str = include_str!("../tests/fixtures/both_units.csv");

/// A larger synthetic collection: 50 files x 2 sequences x 40 segments.
fn synthetic_annotations() -> Vec<Annotation> {
    (0..50)
        .map(|file| {
            let seqs = (0..2)
                .map(|seq| {
                    let segments = (0..40u64)
                        .map(|i| {
                            let onset = (seq * 40 + i) * 800;
                            Segment::from_samples(format!("syl{}", i % 7), onset, onset + 640)
                                .expect("valid segment")
                        })
                        .collect();
                    Sequence::new(segments).expect("valid sequence")
                })
                .collect();
            Annotation::with_seqs(format!("bird{}/song{}.wav.csv", file % 5, file), seqs)
                .expect("non-empty")
        })
        .collect()
}

/// Benchmark parsing the small fixture.
fn bench_parse_fixture(c: &mut Criterion) {
    let mut group = c.benchmark_group("generic_seq_parse");
    group.throughput(Throughput::Bytes(BOTH_UNITS_FIXTURE.len() as u64));

    group.bench_function("fixture", |b| {
        b.iter(|| {
            let annots = from_generic_seq_csv_str(black_box(BOTH_UNITS_FIXTURE)).unwrap();
            black_box(annots)
        })
    });

    group.finish();
}

/// Benchmark parsing and writing the synthetic collection.
fn bench_synthetic(c: &mut Criterion) {
    let annots = synthetic_annotations();
    let csv = to_generic_seq_csv_string(&annots, false).expect("serialize synthetic");
    let rows: usize = annots.iter().map(Annotation::segment_count).sum();

    let mut group = c.benchmark_group("generic_seq_synthetic");
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_function("from_generic_seq_csv_str", |b| {
        b.iter(|| {
            let restored = from_generic_seq_csv_str(black_box(&csv)).unwrap();
            black_box(restored)
        })
    });

    group.bench_function("to_generic_seq_csv_string", |b| {
        b.iter(|| {
            let out = to_generic_seq_csv_string(black_box(&annots), false).unwrap();
            black_box(out)
        })
    });

    group.bench_function("validate", |b| {
        b.iter(|| {
            let table = table_from_csv_slice(black_box(csv.as_bytes())).unwrap();
            black_box(validate(table).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse_fixture, bench_synthetic);
criterion_main!(benches);
