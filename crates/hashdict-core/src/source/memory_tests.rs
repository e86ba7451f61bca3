//! Tests for the shared in-memory source.

use super::*;
use crate::column::Column;
use crate::types::ValueType;

fn types() -> Vec<ValueType> {
    vec![ValueType::String, ValueType::UInt32]
}

fn block(keys: Vec<&str>, values: Vec<u32>) -> Block {
    Block::new(vec![Column::from(keys), Column::from(values)]).unwrap()
}

fn drain(stream: BlockStream) -> Vec<Block> {
    stream.collect::<Result<Vec<_>>>().expect("blocks")
}

#[test]
fn test_push_and_load_all() {
    let mut source = MemorySource::new(types());
    source.push(block(vec!["a", "b"], vec![1, 2])).unwrap();
    source.push(block(vec!["c"], vec![3])).unwrap();

    assert!(source.is_modified());
    let blocks = drain(source.load_all().unwrap());

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].row_count(), 3);
    assert!(!source.is_modified());
    assert_eq!(source.estimated_rows(), Some(3));
}

#[test]
fn test_batch_size_splits_blocks() {
    let mut source = MemorySource::new(types()).with_batch_size(2);
    source
        .push(block(vec!["a", "b", "c", "d", "e"], vec![1, 2, 3, 4, 5]))
        .unwrap();

    let sizes: Vec<usize> = drain(source.load_all().unwrap())
        .iter()
        .map(Block::row_count)
        .collect();

    assert_eq!(sizes, vec![2, 2, 1]);
}

#[test]
fn test_rejects_foreign_layout() {
    let source = MemorySource::new(types());
    let wrong = Block::new(vec![Column::from(vec![1u8])]).unwrap();

    assert!(matches!(source.push(wrong.clone()), Err(Error::MalformedBlock(_))));
    assert!(matches!(source.queue_update(wrong), Err(Error::MalformedBlock(_))));
    assert!(!source.is_modified());
}

#[test]
fn test_updates_are_drained_once() {
    let mut source = MemorySource::new(types()).with_selective_load(true);
    source.queue_update(block(vec!["a"], vec![10])).unwrap();
    source.queue_update(block(vec!["b"], vec![20])).unwrap();
    assert_eq!(source.pending_updates(), 2);

    let first = drain(source.load_updated_all().unwrap());
    let second = drain(source.load_updated_all().unwrap());

    assert_eq!(first.len(), 2);
    assert!(second.is_empty());
    assert_eq!(source.pending_updates(), 0);
    assert!(source.supports_selective_load());
}

#[test]
fn test_clones_share_state() {
    let source = MemorySource::new(types());
    let mut copy = source.clone_box();

    source.push(block(vec!["a"], vec![1])).unwrap();

    assert!(copy.is_modified());
    assert_eq!(drain(copy.load_all().unwrap())[0].row_count(), 1);
    assert!(!source.is_modified());
}

#[test]
fn test_unavailable_source_fails_loads() {
    let mut source = MemorySource::new(types());
    source.set_unavailable(Some("connection refused".to_string()));

    let err = source.load_all().err().expect("load must fail");
    assert_eq!(err.code(), "HDICT-007");
    assert!(err.is_recoverable());
    assert!(source.load_updated_all().is_err());

    source.set_unavailable(None);
    assert!(source.load_all().is_ok());
}

#[test]
fn test_replace_swaps_content() {
    let mut source = MemorySource::new(types());
    source.push(block(vec!["a", "b"], vec![1, 2])).unwrap();
    source.replace(vec![block(vec!["z"], vec![26])]).unwrap();

    let blocks = drain(source.load_all().unwrap());
    assert_eq!(blocks[0].column(0), Some(&Column::from(vec!["z"])));
    assert_eq!(source.row_count(), 1);
}

#[test]
fn test_updates_need_selective_load() {
    let mut source = MemorySource::new(types());
    source.queue_update(block(vec!["a"], vec![10])).unwrap();

    let err = source.load_updated_all().err().expect("not selective");

    assert!(matches!(err, Error::Unsupported(_)));
    assert_eq!(source.pending_updates(), 1);
}

#[test]
fn test_load_all_stays_modified_while_updates_are_queued() {
    let mut source = MemorySource::new(types()).with_selective_load(true);
    source.push(block(vec!["a"], vec![1])).unwrap();
    source.queue_update(block(vec!["a"], vec![2])).unwrap();

    drain(source.load_all().unwrap());
    assert!(source.is_modified());

    drain(source.load_updated_all().unwrap());
    assert!(!source.is_modified());
}
