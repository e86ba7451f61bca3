//! Attribute stores: one typed hash map per declared attribute.
//!
//! # Architecture
//!
//! ```text
//! AttributeStore "country_name"
//! ├── value_type: String
//! ├── null_value: ""
//! ├── map: AttributeMap::String(FxHashMap<PackedKey, Bytes>)
//! │         keys are handles into the dictionary key arena
//! └── string_arena: Some(Arena)   value bytes, private to this store
//! ```
//!
//! The store's type tag picks one [`AttributeMap`] instantiation at creation
//! time; every per-row write and read goes through a single `match` on that
//! tag, never through a shared boxed value.

mod map;
mod value;


pub use map::{AttributeMap, ValueMap};
pub use value::AttributeValue;

use bytes::Bytes;

use crate::arena::Arena;
use crate::column::Column;
use crate::error::{Error, Result};
use crate::key::PackedKey;
use crate::structure::AttributeDescriptor;
use crate::types::{Value, ValueType};
use map::{insert_new, overwrite};

/// Applies `$apply` (`insert_new` or `overwrite`) for one row of a column
/// whose variant matches the map.
macro_rules! apply_row {
    ($map:expr, $arena:expr, $key:expr, $column:expr, $row:expr, $apply:ident) => {
        match ($map, $column) {
            (AttributeMap::UInt8(m), Column::UInt8(v)) => Some($apply(m, $key, || v[$row])),
            (AttributeMap::UInt16(m), Column::UInt16(v)) => Some($apply(m, $key, || v[$row])),
            (AttributeMap::UInt32(m), Column::UInt32(v)) => Some($apply(m, $key, || v[$row])),
            (AttributeMap::UInt64(m), Column::UInt64(v)) => Some($apply(m, $key, || v[$row])),
            (AttributeMap::UInt128(m), Column::UInt128(v)) => Some($apply(m, $key, || v[$row])),
            (AttributeMap::Int8(m), Column::Int8(v)) => Some($apply(m, $key, || v[$row])),
            (AttributeMap::Int16(m), Column::Int16(v)) => Some($apply(m, $key, || v[$row])),
            (AttributeMap::Int32(m), Column::Int32(v)) => Some($apply(m, $key, || v[$row])),
            (AttributeMap::Int64(m), Column::Int64(v)) => Some($apply(m, $key, || v[$row])),
            (AttributeMap::Float32(m), Column::Float32(v)) => Some($apply(m, $key, || v[$row])),
            (AttributeMap::Float64(m), Column::Float64(v)) => Some($apply(m, $key, || v[$row])),
            (AttributeMap::Decimal32(m), Column::Decimal32 { values, .. }) => {
                Some($apply(m, $key, || values[$row]))
            }
            (AttributeMap::Decimal64(m), Column::Decimal64 { values, .. }) => {
                Some($apply(m, $key, || values[$row]))
            }
            (AttributeMap::Decimal128(m), Column::Decimal128 { values, .. }) => {
                Some($apply(m, $key, || values[$row]))
            }
            (AttributeMap::String(m), Column::String(v)) => Some($apply(m, $key, || {
                $arena
                    .get_or_insert_with(Arena::new)
                    .insert(v[$row].as_bytes())
            })),
            _ => None,
        }
    };
}

/// Storage for one attribute.
#[derive(Debug)]
pub struct AttributeStore {
    name: String,
    value_type: ValueType,
    null_value: Value,
    injective: bool,
    map: AttributeMap,
    string_arena: Option<Arena>,
}

impl AttributeStore {
    /// Creates the store described by `descriptor`, pre-sized for
    /// `capacity` keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLiteral`] if the null-default literal does not
    /// fit the attribute type.
    pub fn new(descriptor: &AttributeDescriptor, capacity: usize, arena_chunk_size: usize) -> Result<Self> {
        let null_value = descriptor.parse_null_value()?;
        let string_arena = (descriptor.value_type == ValueType::String)
            .then(|| Arena::with_chunk_size(arena_chunk_size));
        Ok(Self {
            name: descriptor.name.clone(),
            value_type: descriptor.value_type,
            null_value,
            injective: descriptor.injective,
            map: AttributeMap::for_type(descriptor.value_type, capacity),
            string_arena,
        })
    }

    /// Attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute type.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Configured null-default value.
    #[must_use]
    pub fn null_value(&self) -> &Value {
        &self.null_value
    }

    /// Whether the attribute was declared injective.
    #[must_use]
    pub fn is_injective(&self) -> bool {
        self.injective
    }

    /// The backing map.
    #[must_use]
    pub fn map(&self) -> &AttributeMap {
        &self.map
    }

    fn check_column(&self, column: &Column) -> Result<()> {
        if column.value_type() == self.value_type {
            Ok(())
        } else {
            Err(Error::MalformedBlock(format!(
                "attribute '{}' is {}, source column is {}",
                self.name,
                self.value_type,
                column.value_type()
            )))
        }
    }

    /// First-wins insert of `column[row]` under `key`.
    ///
    /// Returns `false` without touching the store if `key` is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] if the column type differs from the
    /// attribute type.
    pub fn try_insert_row(&mut self, key: &PackedKey, column: &Column, row: usize) -> Result<bool> {
        self.check_column(column)?;
        apply_row!(&mut self.map, self.string_arena, key, column, row, insert_new)
            .ok_or_else(|| Error::Internal("attribute map and column disagree".to_string()))
    }

    /// Overwrites or inserts `column[row]` under `key`; returns whether the
    /// key was new.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] if the column type differs from the
    /// attribute type.
    pub fn upsert_row(&mut self, key: &PackedKey, column: &Column, row: usize) -> Result<bool> {
        self.check_column(column)?;
        apply_row!(&mut self.map, self.string_arena, key, column, row, overwrite)
            .ok_or_else(|| Error::Internal("attribute map and column disagree".to_string()))
    }

    fn single_row(&self, value: &Value) -> Result<Column> {
        let mut column = Column::with_capacity(self.value_type, 1);
        column.push(value.clone()).map_err(|_| Error::TypeMismatch {
            attribute: self.name.clone(),
            expected: self.value_type,
            requested: type_name_of(value),
        })?;
        Ok(column)
    }

    /// First-wins insert of a dynamic value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `value` is not of the attribute type.
    pub fn try_insert(&mut self, key: &PackedKey, value: &Value) -> Result<bool> {
        let column = self.single_row(value)?;
        self.try_insert_row(key, &column, 0)
    }

    /// Insert-or-overwrite of a dynamic value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `value` is not of the attribute type.
    pub fn upsert(&mut self, key: &PackedKey, value: &Value) -> Result<()> {
        let column = self.single_row(value)?;
        self.upsert_row(key, &column, 0).map(|_| ())
    }

    /// Stored value for `key`, as a dynamic value.
    #[must_use]
    pub fn value_at(&self, key: &PackedKey) -> Option<Value> {
        Some(match &self.map {
            AttributeMap::UInt8(m) => Value::UInt8(*m.get(key)?),
            AttributeMap::UInt16(m) => Value::UInt16(*m.get(key)?),
            AttributeMap::UInt32(m) => Value::UInt32(*m.get(key)?),
            AttributeMap::UInt64(m) => Value::UInt64(*m.get(key)?),
            AttributeMap::UInt128(m) => Value::UInt128(*m.get(key)?),
            AttributeMap::Int8(m) => Value::Int8(*m.get(key)?),
            AttributeMap::Int16(m) => Value::Int16(*m.get(key)?),
            AttributeMap::Int32(m) => Value::Int32(*m.get(key)?),
            AttributeMap::Int64(m) => Value::Int64(*m.get(key)?),
            AttributeMap::Float32(m) => Value::Float32(*m.get(key)?),
            AttributeMap::Float64(m) => Value::Float64(*m.get(key)?),
            AttributeMap::Decimal32(m) => Value::Decimal32(*m.get(key)?, self.scale()),
            AttributeMap::Decimal64(m) => Value::Decimal64(*m.get(key)?, self.scale()),
            AttributeMap::Decimal128(m) => Value::Decimal128(*m.get(key)?, self.scale()),
            AttributeMap::String(m) => Value::String(decode_string(m.get(key)?)),
        })
    }

    fn scale(&self) -> u8 {
        self.value_type.decimal_scale().unwrap_or(0)
    }

    /// Typed view of the map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `T` does not match the attribute type.
    pub fn typed_map<T: AttributeValue>(&self) -> Result<&ValueMap<T::Stored>> {
        T::map(&self.map).ok_or_else(|| Error::TypeMismatch {
            attribute: self.name.clone(),
            expected: self.value_type,
            requested: T::TYPE_NAME,
        })
    }

    /// The null-default value as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `T` does not match the attribute type.
    pub fn null_value_as<T: AttributeValue>(&self) -> Result<T> {
        T::from_value(&self.null_value).ok_or_else(|| Error::TypeMismatch {
            attribute: self.name.clone(),
            expected: self.value_type,
            requested: T::TYPE_NAME,
        })
    }

    /// True if `key` is stored.
    #[must_use]
    pub fn contains(&self, key: &PackedKey) -> bool {
        self.map.contains(key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn distinct_key_count(&self) -> usize {
        self.map.len()
    }

    /// Slots of the hash table.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.map.capacity()
    }

    /// Reserves room for `additional` keys.
    pub fn reserve(&mut self, additional: usize) {
        self.map.reserve(additional);
    }

    /// Table footprint plus the private string arena.
    #[must_use]
    pub fn estimate_bytes(&self) -> usize {
        self.map.table_bytes()
            + self
                .string_arena
                .as_ref()
                .map_or(0, Arena::allocated_bytes)
    }

    /// Stored key handles.
    pub fn keys(&self) -> Box<dyn Iterator<Item = &PackedKey> + '_> {
        self.map.keys()
    }
}

fn decode_string(bytes: &Bytes) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn type_name_of(value: &Value) -> &'static str {
    match value {
        Value::UInt8(_) => "UInt8",
        Value::UInt16(_) => "UInt16",
        Value::UInt32(_) => "UInt32",
        Value::UInt64(_) => "UInt64",
        Value::UInt128(_) => "UInt128",
        Value::Int8(_) => "Int8",
        Value::Int16(_) => "Int16",
        Value::Int32(_) => "Int32",
        Value::Int64(_) => "Int64",
        Value::Float32(_) => "Float32",
        Value::Float64(_) => "Float64",
        Value::Decimal32(..) => "Decimal32",
        Value::Decimal64(..) => "Decimal64",
        Value::Decimal128(..) => "Decimal128",
        Value::String(_) => "String",
    }
}
