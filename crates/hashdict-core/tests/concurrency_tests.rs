//! Concurrent readers against shared and reloaded dictionaries.
//!
//! Uses a finite number of operations per thread so the tests terminate
//! deterministically.

#![allow(clippy::cast_precision_loss)]

use std::sync::Arc;
use std::thread;

use hashdict_core::{
    AttributeDescriptor, Block, Column, DictionaryHandle, DictionaryLifetime, DictionaryStructure,
    HashedDictionary, MemorySource, ValueType,
};

const ROWS: u64 = 2_000;

fn structure() -> DictionaryStructure {
    DictionaryStructure::new()
        .with_key("shard", ValueType::UInt8)
        .with_key("id", ValueType::UInt64)
        .with_attribute(AttributeDescriptor::new("price", ValueType::Float64, "-1"))
}

/// Every row of generation `g` has `price = id * g`.
fn generation(g: u64) -> Block {
    let ids: Vec<u64> = (0..ROWS).collect();
    let shards: Vec<u8> = ids.iter().map(|id| (id % 7) as u8).collect();
    let prices: Vec<f64> = ids.iter().map(|id| (id * g) as f64).collect();
    Block::new(vec![Column::from(shards), Column::from(ids), Column::from(prices)])
        .expect("block")
}

fn probe(ids: &[u64]) -> Vec<Column> {
    vec![
        Column::from(ids.iter().map(|id| (id % 7) as u8).collect::<Vec<_>>()),
        Column::from(ids.to_vec()),
    ]
}

#[test]
fn test_shared_dictionary_concurrent_reads() {
    let source = MemorySource::new(structure().column_types()).with_batch_size(256);
    source.push(generation(1)).expect("push");
    let dictionary = Arc::new(
        HashedDictionary::new(
            "prices",
            structure(),
            Box::new(source),
            DictionaryLifetime::never(),
            true,
            None,
        )
        .expect("load"),
    );
    let before = dictionary.stats();

    let threads = 8;
    let per_thread = 50;
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let dictionary = Arc::clone(&dictionary);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let ids: Vec<u64> = (0..10).map(|k| (t * 131 + i * 17 + k) % (ROWS + 5)).collect();
                    let prices = dictionary.get::<f64>("price", &probe(&ids)).expect("get");
                    for (id, price) in ids.iter().zip(prices) {
                        let expected = if *id < ROWS { *id as f64 } else { -1.0 };
                        assert!((price - expected).abs() < f64::EPSILON);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("reader thread panicked");
    }

    let after = dictionary.stats();
    assert_eq!(after.query_count, before.query_count + threads * per_thread * 10);
    assert_eq!(after.element_count, before.element_count);
    assert_eq!(after.bytes_allocated, before.bytes_allocated);
    assert_eq!(after.bucket_count, before.bucket_count);
}

#[test]
fn test_readers_see_whole_generations_during_reloads() {
    let source = MemorySource::new(structure().column_types());
    source.push(generation(1)).expect("push");
    let handle = Arc::new(DictionaryHandle::new(
        HashedDictionary::new(
            "prices",
            structure(),
            Box::new(source.clone()),
            DictionaryLifetime::new(1, 2),
            true,
            None,
        )
        .expect("load"),
    ));

    let readers: Vec<_> = (0..4)
        .map(|t| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                for i in 0..200u64 {
                    let snapshot = handle.current();
                    let ids = [1 + (t + i) % (ROWS - 1), ROWS - 1];
                    let prices = snapshot.get::<f64>("price", &probe(&ids)).expect("get");
                    let g0 = prices[0] / ids[0] as f64;
                    let g1 = prices[1] / ids[1] as f64;
                    assert!((g0 - g1).abs() < f64::EPSILON, "mixed generations in one snapshot");
                }
            })
        })
        .collect();

    for g in 2..=6 {
        source.replace(vec![generation(g)]).expect("replace");
        let fresh = handle.reload().expect("reload");
        assert_eq!(fresh.element_count(), ROWS as usize);
    }

    for reader in readers {
        reader.join().expect("reader thread panicked");
    }

    let last = handle.current();
    let price = last.get::<f64>("price", &probe(&[10])).expect("get");
    assert!((price[0] - 60.0).abs() < f64::EPSILON);
}
