//! Tests for the composite key codec.

use proptest::prelude::*;

use crate::arena::Arena;
use crate::column::Column;
use crate::key::*;
use crate::types::{Decimal64, Value, ValueType};

fn pack_row(columns: &[Column], row: usize) -> PackedKey {
    let mut arena = Arena::new();
    pack_key(columns, row, &mut arena)
}

#[test]
fn test_string_boundaries_are_unambiguous() {
    let left = [Column::from(vec!["ab"]), Column::from(vec!["c"])];
    let right = [Column::from(vec!["a"]), Column::from(vec!["bc"])];

    assert_ne!(pack_row(&left, 0), pack_row(&right, 0));
}

#[test]
fn test_layout_is_length_prefixed_little_endian() {
    let columns = [
        Column::from(vec!["ab"]),
        Column::from(vec![7u32]),
        Column::from(vec!["c"]),
    ];
    let key = pack_row(&columns, 0);

    assert_eq!(key.as_bytes(), &[2, b'a', b'b', 7, 0, 0, 0, 1, b'c']);
    assert_eq!(encoded_len(&columns, 0), key.len());
}

#[test]
fn test_long_strings_use_multibyte_length() {
    let long = "x".repeat(300);
    let columns = [Column::from(vec![long.as_str()])];
    let key = pack_row(&columns, 0);

    assert_eq!(key.len(), 302);
    assert_eq!(&key.as_bytes()[..2], &[0xac, 0x02]);
    assert_eq!(
        unpack_key(key.as_bytes(), &[ValueType::String]).unwrap(),
        vec![Value::String(long)]
    );
}

#[test]
fn test_equal_tuples_pack_equal_in_different_arenas() {
    let columns = [Column::from(vec!["fr", "fr"]), Column::from(vec![1u16, 1])];
    let mut first = Arena::new();
    let mut second = Arena::with_chunk_size(128);

    let a = pack_key(&columns, 0, &mut first);
    let b = pack_key(&columns, 1, &mut second);

    assert_eq!(a, b);
    assert_eq!(a.saved_hash(), b.saved_hash());
}

#[test]
fn test_promote_keeps_hash_and_bytes() {
    let columns = [Column::from(vec![42u64])];
    let mut scratch = Arena::new();
    let mut keys = Arena::new();
    let probe = pack_key(&columns, 0, &mut scratch);

    let stored = promote_key(&probe, &mut keys);

    assert_eq!(stored, probe);
    assert_eq!(stored.saved_hash(), probe.saved_hash());
    assert_eq!(keys.used_bytes(), 8);
}

#[test]
fn test_unpack_decimal_and_float_keys() {
    let columns = [
        Column::Decimal64 {
            scale: 2,
            values: vec![Decimal64(-150)],
        },
        Column::from(vec![f32::NAN]),
    ];
    let key = pack_row(&columns, 0);
    let values = unpack_key(key.as_bytes(), &[ValueType::Decimal64(2), ValueType::Float32]).unwrap();

    assert_eq!(values[0], Value::Decimal64(Decimal64(-150), 2));
    assert!(matches!(values[1], Value::Float32(f) if f.is_nan()));
}

#[test]
fn test_unpack_rejects_truncated_and_trailing_bytes() {
    let types = [ValueType::String, ValueType::UInt32];
    assert!(unpack_key(&[2, b'a'], &types).is_err());
    assert!(unpack_key(&[1, b'a', 1, 0], &types).is_err());
    assert!(unpack_key(&[1, b'a', 1, 0, 0, 0, 9], &types).is_err());
    assert!(unpack_key(&[0x80], &[ValueType::String]).is_err());
}

proptest! {
    #[test]
    fn prop_distinct_tuples_never_compare_equal(
        a in (".{0,12}", any::<u32>(), ".{0,12}"),
        b in (".{0,12}", any::<u32>(), ".{0,12}"),
    ) {
        let columns = [
            Column::from(vec![a.0.as_str(), b.0.as_str()]),
            Column::from(vec![a.1, b.1]),
            Column::from(vec![a.2.as_str(), b.2.as_str()]),
        ];
        let mut arena = Arena::new();
        let ka = pack_key(&columns, 0, &mut arena);
        let kb = pack_key(&columns, 1, &mut arena);

        prop_assert_eq!(ka == kb, a == b);
    }

    #[test]
    fn prop_unpack_inverts_pack(s in ".{0,40}", n in any::<i64>(), u in any::<u128>()) {
        let columns = [
            Column::from(vec![s.as_str()]),
            Column::from(vec![n]),
            Column::from(vec![u]),
        ];
        let key = pack_row(&columns, 0);
        let types = [ValueType::String, ValueType::Int64, ValueType::UInt128];

        prop_assert_eq!(
            unpack_key(key.as_bytes(), &types).unwrap(),
            vec![Value::String(s.clone()), Value::Int64(n), Value::UInt128(u)]
        );
    }
}
