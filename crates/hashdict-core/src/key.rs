//! Composite key codec.
//!
//! A row's key columns are concatenated positionally into one byte string:
//!
//! ```text
//! ("ab", 7u32, "c")  ->  [02 'a' 'b'] [07 00 00 00] [01 'c']
//!                         len-prefix   raw LE bits   len-prefix
//! ```
//!
//! Fixed-width values are written as their little-endian bit pattern,
//! strings as a LEB128 length followed by their bytes. The encoding is not
//! self-describing: it is only unambiguous for a fixed sequence of column
//! types, which every key of one dictionary shares.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

use crate::arena::Arena;
use crate::column::Column;
use crate::error::{Error, Result};
use crate::types::{Decimal128, Decimal32, Decimal64, Value, ValueType};

/// Handle to one packed composite key, with its hash computed once.
#[derive(Debug, Clone)]
pub struct PackedKey {
    hash: u64,
    bytes: Bytes,
}

impl PackedKey {
    /// Wraps already-encoded bytes.
    #[must_use]
    pub fn new(bytes: Bytes) -> Self {
        Self {
            hash: hash_bytes(&bytes),
            bytes,
        }
    }

    /// Saved hash.
    #[inline]
    #[must_use]
    pub fn saved_hash(&self) -> u64 {
        self.hash
    }

    /// Encoded key bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the encoded bytes.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Encoded length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for the empty encoding (a key without columns).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Hash for PackedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialEq for PackedKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.bytes == other.bytes
    }
}

impl Eq for PackedKey {}

fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    hasher.write_usize(bytes.len());
    hasher.finish()
}

fn varint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

fn put_varint(buf: &mut BytesMut, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

fn get_varint(input: &mut &[u8]) -> Option<u64> {
    let mut value = 0u64;
    for shift in (0..64).step_by(7) {
        if !input.has_remaining() {
            return None;
        }
        let byte = input.get_u8();
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Some(value);
        }
    }
    None
}

/// Encoded length of one row's key.
#[must_use]
pub fn encoded_len(key_columns: &[Column], row: usize) -> usize {
    key_columns
        .iter()
        .map(|column| match column {
            Column::String(values) => {
                let len = values[row].len();
                varint_len(len as u64) + len
            }
            other => other.value_type().fixed_width().unwrap_or(0),
        })
        .sum()
}

fn write_value(buf: &mut BytesMut, column: &Column, row: usize) {
    match column {
        Column::UInt8(v) => buf.put_u8(v[row]),
        Column::UInt16(v) => buf.put_u16_le(v[row]),
        Column::UInt32(v) => buf.put_u32_le(v[row]),
        Column::UInt64(v) => buf.put_u64_le(v[row]),
        Column::UInt128(v) => buf.put_u128_le(v[row]),
        Column::Int8(v) => buf.put_i8(v[row]),
        Column::Int16(v) => buf.put_i16_le(v[row]),
        Column::Int32(v) => buf.put_i32_le(v[row]),
        Column::Int64(v) => buf.put_i64_le(v[row]),
        Column::Float32(v) => buf.put_u32_le(v[row].to_bits()),
        Column::Float64(v) => buf.put_u64_le(v[row].to_bits()),
        Column::Decimal32 { values, .. } => buf.put_i32_le(values[row].0),
        Column::Decimal64 { values, .. } => buf.put_i64_le(values[row].0),
        Column::Decimal128 { values, .. } => buf.put_i128_le(values[row].0),
        Column::String(v) => {
            let s = v[row].as_bytes();
            put_varint(buf, s.len() as u64);
            buf.put_slice(s);
        }
    }
}

/// Packs the key of `row` into `arena` and returns its handle.
///
/// The caller guarantees that `row` is in range for every key column.
pub fn pack_key(key_columns: &[Column], row: usize, arena: &mut Arena) -> PackedKey {
    let len = encoded_len(key_columns, row);
    let bytes = arena.alloc(len, |buf| {
        for column in key_columns {
            write_value(buf, column, row);
        }
    });
    PackedKey::new(bytes)
}

/// Copies a key packed elsewhere (e.g. in a scratch arena) into `arena`.
pub fn promote_key(key: &PackedKey, arena: &mut Arena) -> PackedKey {
    PackedKey {
        hash: key.hash,
        bytes: arena.insert(key.as_bytes()),
    }
}

/// Decodes a packed key back into its column values.
///
/// # Errors
///
/// Returns [`Error::Internal`] if the bytes are truncated or have trailing
/// data for the given type sequence.
pub fn unpack_key(bytes: &[u8], key_types: &[ValueType]) -> Result<Vec<Value>> {
    let mut input = bytes;
    let truncated = || Error::Internal("truncated packed key".to_string());
    let mut values = Vec::with_capacity(key_types.len());

    for &value_type in key_types {
        if let Some(width) = value_type.fixed_width() {
            if input.remaining() < width {
                return Err(truncated());
            }
        }
        let value = match value_type {
            ValueType::UInt8 => Value::UInt8(input.get_u8()),
            ValueType::UInt16 => Value::UInt16(input.get_u16_le()),
            ValueType::UInt32 => Value::UInt32(input.get_u32_le()),
            ValueType::UInt64 => Value::UInt64(input.get_u64_le()),
            ValueType::UInt128 => Value::UInt128(input.get_u128_le()),
            ValueType::Int8 => Value::Int8(input.get_i8()),
            ValueType::Int16 => Value::Int16(input.get_i16_le()),
            ValueType::Int32 => Value::Int32(input.get_i32_le()),
            ValueType::Int64 => Value::Int64(input.get_i64_le()),
            ValueType::Float32 => Value::Float32(f32::from_bits(input.get_u32_le())),
            ValueType::Float64 => Value::Float64(f64::from_bits(input.get_u64_le())),
            ValueType::Decimal32(s) => Value::Decimal32(Decimal32(input.get_i32_le()), s),
            ValueType::Decimal64(s) => Value::Decimal64(Decimal64(input.get_i64_le()), s),
            ValueType::Decimal128(s) => Value::Decimal128(Decimal128(input.get_i128_le()), s),
            ValueType::String => {
                let len = get_varint(&mut input).ok_or_else(truncated)?;
                let len = usize::try_from(len).map_err(|_| truncated())?;
                if input.remaining() < len {
                    return Err(truncated());
                }
                let text = String::from_utf8_lossy(&input[..len]).into_owned();
                input.advance(len);
                Value::String(text)
            }
        };
        values.push(value);
    }

    if input.has_remaining() {
        return Err(Error::Internal(format!(
            "{} trailing bytes after packed key",
            input.remaining()
        )));
    }
    Ok(values)
}
