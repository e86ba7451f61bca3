//! Tests for the key arena.

use crate::arena::*;

#[test]
fn test_arena_starts_empty() {
    let arena = Arena::new();
    assert_eq!(arena.allocated_bytes(), 0);
    assert_eq!(arena.used_bytes(), 0);
    assert_eq!(arena.chunk_count(), 0);
    assert_eq!(arena.chunk_size(), DEFAULT_CHUNK_SIZE);
}

#[test]
fn test_insert_returns_stable_handles() {
    let mut arena = Arena::with_chunk_size(64);
    let a = arena.insert(b"alpha");
    let b = arena.insert(b"beta");

    assert_eq!(&a[..], b"alpha");
    assert_eq!(&b[..], b"beta");
    assert_eq!(arena.used_bytes(), 9);
    assert_eq!(arena.chunk_count(), 1);
}

#[test]
fn test_handles_outlive_arena() {
    let handle = {
        let mut arena = Arena::new();
        arena.insert(b"kept")
    };
    assert_eq!(&handle[..], b"kept");
}

#[test]
fn test_grows_new_chunk_when_full() {
    let mut arena = Arena::with_chunk_size(64);
    for _ in 0..5 {
        arena.insert(&[7u8; 20]);
    }
    assert!(arena.chunk_count() >= 2);
    assert!(arena.allocated_bytes() >= arena.used_bytes());
    assert_eq!(arena.used_bytes(), 100);
}

#[test]
fn test_oversized_write_gets_own_chunk() {
    let mut arena = Arena::with_chunk_size(64);
    let big = arena.insert(&[1u8; 500]);
    assert_eq!(big.len(), 500);
    assert!(arena.allocated_bytes() >= 500);
}

#[test]
fn test_chunk_size_has_floor() {
    assert_eq!(Arena::with_chunk_size(1).chunk_size(), 64);
}
