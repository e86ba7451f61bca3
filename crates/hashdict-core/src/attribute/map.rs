//! Per-type hash map instantiations behind one type tag.

use bytes::Bytes;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::mem::size_of;

use crate::key::PackedKey;
use crate::types::{Decimal128, Decimal32, Decimal64, ValueType};

/// Hash map from a packed key handle to one attribute value.
pub type ValueMap<V> = FxHashMap<PackedKey, V>;

/// The map backing one attribute, selected by the attribute type.
///
/// String values are handles into the attribute's private arena.
#[derive(Debug)]
pub enum AttributeMap {
    /// `UInt8` values.
    UInt8(ValueMap<u8>),
    /// `UInt16` values.
    UInt16(ValueMap<u16>),
    /// `UInt32` values.
    UInt32(ValueMap<u32>),
    /// `UInt64` values.
    UInt64(ValueMap<u64>),
    /// `UInt128` values.
    UInt128(ValueMap<u128>),
    /// `Int8` values.
    Int8(ValueMap<i8>),
    /// `Int16` values.
    Int16(ValueMap<i16>),
    /// `Int32` values.
    Int32(ValueMap<i32>),
    /// `Int64` values.
    Int64(ValueMap<i64>),
    /// `Float32` values.
    Float32(ValueMap<f32>),
    /// `Float64` values.
    Float64(ValueMap<f64>),
    /// `Decimal32` raw values.
    Decimal32(ValueMap<Decimal32>),
    /// `Decimal64` raw values.
    Decimal64(ValueMap<Decimal64>),
    /// `Decimal128` raw values.
    Decimal128(ValueMap<Decimal128>),
    /// `String` values.
    String(ValueMap<Bytes>),
}

/// Runs `$body` with `$map` bound to the inner `ValueMap`.
macro_rules! with_map {
    ($attribute_map:expr, $map:ident => $body:expr) => {
        match $attribute_map {
            AttributeMap::UInt8($map) => $body,
            AttributeMap::UInt16($map) => $body,
            AttributeMap::UInt32($map) => $body,
            AttributeMap::UInt64($map) => $body,
            AttributeMap::UInt128($map) => $body,
            AttributeMap::Int8($map) => $body,
            AttributeMap::Int16($map) => $body,
            AttributeMap::Int32($map) => $body,
            AttributeMap::Int64($map) => $body,
            AttributeMap::Float32($map) => $body,
            AttributeMap::Float64($map) => $body,
            AttributeMap::Decimal32($map) => $body,
            AttributeMap::Decimal64($map) => $body,
            AttributeMap::Decimal128($map) => $body,
            AttributeMap::String($map) => $body,
        }
    };
}

fn sized<V>(capacity: usize) -> ValueMap<V> {
    FxHashMap::with_capacity_and_hasher(capacity, Default::default())
}

impl AttributeMap {
    /// Creates the map instantiation for `value_type`.
    #[must_use]
    pub fn for_type(value_type: ValueType, capacity: usize) -> Self {
        match value_type {
            ValueType::UInt8 => Self::UInt8(sized(capacity)),
            ValueType::UInt16 => Self::UInt16(sized(capacity)),
            ValueType::UInt32 => Self::UInt32(sized(capacity)),
            ValueType::UInt64 => Self::UInt64(sized(capacity)),
            ValueType::UInt128 => Self::UInt128(sized(capacity)),
            ValueType::Int8 => Self::Int8(sized(capacity)),
            ValueType::Int16 => Self::Int16(sized(capacity)),
            ValueType::Int32 => Self::Int32(sized(capacity)),
            ValueType::Int64 => Self::Int64(sized(capacity)),
            ValueType::Float32 => Self::Float32(sized(capacity)),
            ValueType::Float64 => Self::Float64(sized(capacity)),
            ValueType::Decimal32(_) => Self::Decimal32(sized(capacity)),
            ValueType::Decimal64(_) => Self::Decimal64(sized(capacity)),
            ValueType::Decimal128(_) => Self::Decimal128(sized(capacity)),
            ValueType::String => Self::String(sized(capacity)),
        }
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        with_map!(self, m => m.len())
    }

    /// True if no key is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots available before the table grows.
    #[must_use]
    pub fn capacity(&self) -> usize {
        with_map!(self, m => m.capacity())
    }

    /// True if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &PackedKey) -> bool {
        with_map!(self, m => m.contains_key(key))
    }

    /// Reserves room for `additional` keys.
    pub fn reserve(&mut self, additional: usize) {
        with_map!(self, m => m.reserve(additional));
    }

    /// Footprint of the table itself: one (key, value) slot plus one
    /// control byte per slot. String payloads are accounted by the arena.
    #[must_use]
    pub fn table_bytes(&self) -> usize {
        with_map!(self, m => table_bytes(m))
    }

    /// Iterates the stored key handles.
    pub fn keys(&self) -> Box<dyn Iterator<Item = &PackedKey> + '_> {
        with_map!(self, m => Box::new(m.keys()))
    }
}

fn table_bytes<V>(map: &ValueMap<V>) -> usize {
    map.capacity() * (size_of::<(PackedKey, V)>() + 1)
}

/// Inserts unless the key is present; returns whether it inserted.
pub(crate) fn insert_new<V>(map: &mut ValueMap<V>, key: &PackedKey, make: impl FnOnce() -> V) -> bool {
    match map.entry(key.clone()) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(make());
            true
        }
    }
}

/// Inserts or overwrites; returns whether the key was new.
///
/// An existing key keeps its original handle, only the value changes.
pub(crate) fn overwrite<V>(map: &mut ValueMap<V>, key: &PackedKey, make: impl FnOnce() -> V) -> bool {
    match map.entry(key.clone()) {
        Entry::Occupied(mut slot) => {
            slot.insert(make());
            false
        }
        Entry::Vacant(slot) => {
            slot.insert(make());
            true
        }
    }
}
