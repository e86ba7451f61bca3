//! Lookup and load benchmarks for the hashed dictionary.
//!
//! Run with: cargo bench --bench lookup_benchmark

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use hashdict_core::{
    AttributeDescriptor, Block, Column, DictionaryLifetime, DictionaryStructure, HashedDictionary,
    MemorySource, ValueType,
};

fn structure() -> DictionaryStructure {
    DictionaryStructure::new()
        .with_key("region", ValueType::String)
        .with_key("sku", ValueType::UInt64)
        .with_attribute(AttributeDescriptor::new("price", ValueType::Float64, "0"))
        .with_attribute(AttributeDescriptor::new("title", ValueType::String, ""))
}

fn region(i: u64) -> String {
    format!("region-{}", i % 16)
}

fn source_block(rows: u64) -> Block {
    let skus: Vec<u64> = (0..rows).collect();
    Block::new(vec![
        Column::from(skus.iter().map(|&i| region(i)).collect::<Vec<_>>()),
        Column::from(skus.clone()),
        Column::from(skus.iter().map(|&i| i as f64 * 0.5).collect::<Vec<_>>()),
        Column::from(skus.iter().map(|&i| format!("item #{i}")).collect::<Vec<_>>()),
    ])
    .expect("block")
}

fn load(rows: u64) -> HashedDictionary {
    let source = MemorySource::new(structure().column_types());
    source.push(source_block(rows)).expect("push");
    HashedDictionary::new(
        "catalog",
        structure(),
        Box::new(source),
        DictionaryLifetime::never(),
        false,
        None,
    )
    .expect("load")
}

/// 1024 probe keys, half of them absent.
fn probe(rows: u64) -> Vec<Column> {
    let skus: Vec<u64> = (0..1024u64).map(|i| (i * 7_919) % (rows * 2)).collect();
    vec![
        Column::from(skus.iter().map(|&i| region(i)).collect::<Vec<_>>()),
        Column::from(skus),
    ]
}

// ========== Lookups ==========

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1024));

    for rows in [1_000u64, 100_000] {
        let dictionary = load(rows);
        let keys = probe(rows);

        group.bench_with_input(BenchmarkId::new("f64", rows), &keys, |b, keys| {
            b.iter(|| black_box(dictionary.get::<f64>("price", keys).expect("get")));
        });
        group.bench_with_input(BenchmarkId::new("string", rows), &keys, |b, keys| {
            b.iter(|| black_box(dictionary.get::<String>("title", keys).expect("get")));
        });
        group.bench_with_input(BenchmarkId::new("has", rows), &keys, |b, keys| {
            b.iter(|| black_box(dictionary.has(keys).expect("has")));
        });
    }

    group.finish();
}

// ========== Loading ==========

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    group.sample_size(20);

    for rows in [10_000u64, 100_000] {
        group.throughput(Throughput::Elements(rows));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| black_box(load(rows).element_count()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_get, bench_load);
criterion_main!(benches);
