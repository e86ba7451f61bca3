//! Column batches exchanged with sources and callers.
//!
//! ```text
//! Block
//! ├── Column::String(["de", "fr", ...])      key column 0
//! ├── Column::UInt32([2024, 2024, ...])      key column 1
//! └── Column::Float64([0.19, 0.2, ...])      attribute "vat_rate"
//! ```
//!
//! A block produced by a source lists key columns first, then attribute
//! columns, both in declared order.

use crate::error::{Error, Result};
use crate::types::{Decimal128, Decimal32, Decimal64, Value, ValueType};

/// A typed column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// `UInt8` column.
    UInt8(Vec<u8>),
    /// `UInt16` column.
    UInt16(Vec<u16>),
    /// `UInt32` column.
    UInt32(Vec<u32>),
    /// `UInt64` column.
    UInt64(Vec<u64>),
    /// `UInt128` column.
    UInt128(Vec<u128>),
    /// `Int8` column.
    Int8(Vec<i8>),
    /// `Int16` column.
    Int16(Vec<i16>),
    /// `Int32` column.
    Int32(Vec<i32>),
    /// `Int64` column.
    Int64(Vec<i64>),
    /// `Float32` column.
    Float32(Vec<f32>),
    /// `Float64` column.
    Float64(Vec<f64>),
    /// `Decimal32(scale)` column.
    Decimal32 {
        /// Decimal scale.
        scale: u8,
        /// Raw scaled values.
        values: Vec<Decimal32>,
    },
    /// `Decimal64(scale)` column.
    Decimal64 {
        /// Decimal scale.
        scale: u8,
        /// Raw scaled values.
        values: Vec<Decimal64>,
    },
    /// `Decimal128(scale)` column.
    Decimal128 {
        /// Decimal scale.
        scale: u8,
        /// Raw scaled values.
        values: Vec<Decimal128>,
    },
    /// `String` column.
    String(Vec<String>),
}

/// Runs `$body` with `$values` bound to the column's inner `Vec`.
macro_rules! with_values {
    ($column:expr, $values:ident => $body:expr) => {
        match $column {
            Column::UInt8($values) => $body,
            Column::UInt16($values) => $body,
            Column::UInt32($values) => $body,
            Column::UInt64($values) => $body,
            Column::UInt128($values) => $body,
            Column::Int8($values) => $body,
            Column::Int16($values) => $body,
            Column::Int32($values) => $body,
            Column::Int64($values) => $body,
            Column::Float32($values) => $body,
            Column::Float64($values) => $body,
            Column::Decimal32 { values: $values, .. } => $body,
            Column::Decimal64 { values: $values, .. } => $body,
            Column::Decimal128 { values: $values, .. } => $body,
            Column::String($values) => $body,
        }
    };
}

/// Runs `$body` with both inner `Vec`s bound when the variants agree.
macro_rules! zip_values {
    ($left:expr, $right:expr, $a:ident, $b:ident => $body:expr, $mismatch:expr) => {
        match ($left, $right) {
            (Column::UInt8($a), Column::UInt8($b)) => $body,
            (Column::UInt16($a), Column::UInt16($b)) => $body,
            (Column::UInt32($a), Column::UInt32($b)) => $body,
            (Column::UInt64($a), Column::UInt64($b)) => $body,
            (Column::UInt128($a), Column::UInt128($b)) => $body,
            (Column::Int8($a), Column::Int8($b)) => $body,
            (Column::Int16($a), Column::Int16($b)) => $body,
            (Column::Int32($a), Column::Int32($b)) => $body,
            (Column::Int64($a), Column::Int64($b)) => $body,
            (Column::Float32($a), Column::Float32($b)) => $body,
            (Column::Float64($a), Column::Float64($b)) => $body,
            (Column::Decimal32 { values: $a, .. }, Column::Decimal32 { values: $b, .. }) => $body,
            (Column::Decimal64 { values: $a, .. }, Column::Decimal64 { values: $b, .. }) => $body,
            (Column::Decimal128 { values: $a, .. }, Column::Decimal128 { values: $b, .. }) => $body,
            (Column::String($a), Column::String($b)) => $body,
            _ => $mismatch,
        }
    };
}

impl Column {
    /// Creates an empty column of `value_type` with room for `capacity` rows.
    #[must_use]
    pub fn with_capacity(value_type: ValueType, capacity: usize) -> Self {
        match value_type {
            ValueType::UInt8 => Self::UInt8(Vec::with_capacity(capacity)),
            ValueType::UInt16 => Self::UInt16(Vec::with_capacity(capacity)),
            ValueType::UInt32 => Self::UInt32(Vec::with_capacity(capacity)),
            ValueType::UInt64 => Self::UInt64(Vec::with_capacity(capacity)),
            ValueType::UInt128 => Self::UInt128(Vec::with_capacity(capacity)),
            ValueType::Int8 => Self::Int8(Vec::with_capacity(capacity)),
            ValueType::Int16 => Self::Int16(Vec::with_capacity(capacity)),
            ValueType::Int32 => Self::Int32(Vec::with_capacity(capacity)),
            ValueType::Int64 => Self::Int64(Vec::with_capacity(capacity)),
            ValueType::Float32 => Self::Float32(Vec::with_capacity(capacity)),
            ValueType::Float64 => Self::Float64(Vec::with_capacity(capacity)),
            ValueType::Decimal32(scale) => Self::Decimal32 {
                scale,
                values: Vec::with_capacity(capacity),
            },
            ValueType::Decimal64(scale) => Self::Decimal64 {
                scale,
                values: Vec::with_capacity(capacity),
            },
            ValueType::Decimal128(scale) => Self::Decimal128 {
                scale,
                values: Vec::with_capacity(capacity),
            },
            ValueType::String => Self::String(Vec::with_capacity(capacity)),
        }
    }

    /// Type tag of the column.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::UInt8(_) => ValueType::UInt8,
            Self::UInt16(_) => ValueType::UInt16,
            Self::UInt32(_) => ValueType::UInt32,
            Self::UInt64(_) => ValueType::UInt64,
            Self::UInt128(_) => ValueType::UInt128,
            Self::Int8(_) => ValueType::Int8,
            Self::Int16(_) => ValueType::Int16,
            Self::Int32(_) => ValueType::Int32,
            Self::Int64(_) => ValueType::Int64,
            Self::Float32(_) => ValueType::Float32,
            Self::Float64(_) => ValueType::Float64,
            Self::Decimal32 { scale, .. } => ValueType::Decimal32(*scale),
            Self::Decimal64 { scale, .. } => ValueType::Decimal64(*scale),
            Self::Decimal128 { scale, .. } => ValueType::Decimal128(*scale),
            Self::String(_) => ValueType::String,
        }
    }

    /// Returns the number of values in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    /// Returns true if the column is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value at `row`, or `None` past the end.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<Value> {
        Some(match self {
            Self::UInt8(v) => Value::UInt8(*v.get(row)?),
            Self::UInt16(v) => Value::UInt16(*v.get(row)?),
            Self::UInt32(v) => Value::UInt32(*v.get(row)?),
            Self::UInt64(v) => Value::UInt64(*v.get(row)?),
            Self::UInt128(v) => Value::UInt128(*v.get(row)?),
            Self::Int8(v) => Value::Int8(*v.get(row)?),
            Self::Int16(v) => Value::Int16(*v.get(row)?),
            Self::Int32(v) => Value::Int32(*v.get(row)?),
            Self::Int64(v) => Value::Int64(*v.get(row)?),
            Self::Float32(v) => Value::Float32(*v.get(row)?),
            Self::Float64(v) => Value::Float64(*v.get(row)?),
            Self::Decimal32 { scale, values } => Value::Decimal32(*values.get(row)?, *scale),
            Self::Decimal64 { scale, values } => Value::Decimal64(*values.get(row)?, *scale),
            Self::Decimal128 { scale, values } => Value::Decimal128(*values.get(row)?, *scale),
            Self::String(v) => Value::String(v.get(row)?.clone()),
        })
    }

    /// Appends a value of exactly the column's type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] on a type mismatch; use
    /// [`Value::convert_to`] first when a conversion is intended.
    pub fn push(&mut self, value: Value) -> Result<()> {
        let expected = self.value_type();
        match (self, value) {
            (Self::UInt8(v), Value::UInt8(x)) => v.push(x),
            (Self::UInt16(v), Value::UInt16(x)) => v.push(x),
            (Self::UInt32(v), Value::UInt32(x)) => v.push(x),
            (Self::UInt64(v), Value::UInt64(x)) => v.push(x),
            (Self::UInt128(v), Value::UInt128(x)) => v.push(x),
            (Self::Int8(v), Value::Int8(x)) => v.push(x),
            (Self::Int16(v), Value::Int16(x)) => v.push(x),
            (Self::Int32(v), Value::Int32(x)) => v.push(x),
            (Self::Int64(v), Value::Int64(x)) => v.push(x),
            (Self::Float32(v), Value::Float32(x)) => v.push(x),
            (Self::Float64(v), Value::Float64(x)) => v.push(x),
            (Self::Decimal32 { scale, values }, Value::Decimal32(x, s)) if *scale == s => {
                values.push(x);
            }
            (Self::Decimal64 { scale, values }, Value::Decimal64(x, s)) if *scale == s => {
                values.push(x);
            }
            (Self::Decimal128 { scale, values }, Value::Decimal128(x, s)) if *scale == s => {
                values.push(x);
            }
            (Self::String(v), Value::String(x)) => v.push(x),
            (_, other) => {
                return Err(Error::MalformedBlock(format!(
                    "cannot push {} value into {} column",
                    other.value_type(),
                    expected
                )))
            }
        }
        Ok(())
    }

    /// Appends the given rows of `other`, which must have the same type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] on a type mismatch or an
    /// out-of-range row.
    pub fn extend_from(&mut self, other: &Column, rows: &[usize]) -> Result<()> {
        if self.value_type() != other.value_type() {
            return Err(Error::MalformedBlock(format!(
                "cannot append {} rows to {} column",
                other.value_type(),
                self.value_type()
            )));
        }
        let source_len = other.len();
        if let Some(&bad) = rows.iter().find(|&&r| r >= source_len) {
            return Err(Error::MalformedBlock(format!(
                "row {bad} out of range for column of {source_len} rows"
            )));
        }
        zip_values!(
            self,
            other,
            dst,
            src => dst.extend(rows.iter().map(|&r| src[r].clone())),
            return Err(Error::Internal("column variants diverged from their types".to_string()))
        );
        Ok(())
    }
}

macro_rules! column_from_vec {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for Column {
                fn from(values: Vec<$ty>) -> Self {
                    Self::$variant(values)
                }
            }
        )*
    };
}

column_from_vec!(
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    u128 => UInt128,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => String,
);

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Self::String(values.into_iter().map(str::to_string).collect())
    }
}

/// An ordered set of equal-length columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    columns: Vec<Column>,
    rows: usize,
}

impl Block {
    /// Creates a block, checking that every column has the same length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] for ragged columns.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map_or(0, Column::len);
        if let Some((index, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != rows)
        {
            return Err(Error::MalformedBlock(format!(
                "column {index} has {} rows, expected {rows}",
                column.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Creates an empty block with the given column types.
    #[must_use]
    pub fn empty(types: &[ValueType]) -> Self {
        Self {
            columns: types.iter().map(|t| Column::with_capacity(*t, 0)).collect(),
            rows: 0,
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Returns true if the block has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns all columns.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns one column.
    #[must_use]
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Consumes the block, returning its columns.
    #[must_use]
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Column types in order.
    #[must_use]
    pub fn types(&self) -> Vec<ValueType> {
        self.columns.iter().map(Column::value_type).collect()
    }

    /// Splits the columns into the first `n` and the rest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] if the block has fewer than `n` columns.
    pub fn split_at(&self, n: usize) -> Result<(&[Column], &[Column])> {
        if n > self.columns.len() {
            return Err(Error::MalformedBlock(format!(
                "block has {} columns, cannot split at {n}",
                self.columns.len()
            )));
        }
        Ok(self.columns.split_at(n))
    }

    /// New block holding only the given rows, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] for an out-of-range row.
    pub fn select_rows(&self, rows: &[usize]) -> Result<Self> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let mut selected = Column::with_capacity(column.value_type(), rows.len());
            selected.extend_from(column, rows)?;
            columns.push(selected);
        }
        Ok(Self {
            columns,
            rows: rows.len(),
        })
    }

    /// New block holding the rows whose `mask` entry is true.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] if the mask length differs from the
    /// row count.
    pub fn filter(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.rows {
            return Err(Error::MalformedBlock(format!(
                "filter mask has {} entries for {} rows",
                mask.len(),
                self.rows
            )));
        }
        let rows: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(row, &keep)| keep.then_some(row))
            .collect();
        self.select_rows(&rows)
    }

    /// Appends every row of `other`, which must have the same column types.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] if the layouts differ.
    pub fn append(&mut self, other: &Block) -> Result<()> {
        if self.types() != other.types() {
            return Err(Error::MalformedBlock(format!(
                "cannot append block of {:?} to block of {:?}",
                other.types(),
                self.types()
            )));
        }
        let all_rows: Vec<usize> = (0..other.rows).collect();
        for (dst, src) in self.columns.iter_mut().zip(&other.columns) {
            dst.extend_from(src, &all_rows)?;
        }
        self.rows += other.rows;
        Ok(())
    }
}
