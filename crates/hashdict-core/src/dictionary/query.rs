//! Point lookups.
//!
//! Every query packs the caller's key rows into a scratch arena that lives
//! for the duration of the call, probes one attribute map per row and
//! resolves misses with a policy chosen by the method:
//!
//! | Method          | Value for a missing key                  |
//! |-----------------|------------------------------------------|
//! | `get`           | the attribute's configured null value    |
//! | `get_or`        | one caller-supplied scalar               |
//! | `get_or_each`   | the caller's default for that row        |
//! | `get_column`    | null value, as a dynamically typed column |
//! | `get_column_or` | one [`Value`], converted to the attribute |

use super::HashedDictionary;
use crate::arena::Arena;
use crate::attribute::{AttributeStore, AttributeValue};
use crate::column::Column;
use crate::error::{Error, Result};
use crate::key::pack_key;
use crate::types::Value;

impl HashedDictionary {
    /// Checks the caller's key columns against the declared key and returns
    /// the row count.
    fn check_keys(&self, keys: &[Column]) -> Result<usize> {
        let key_types: Vec<_> = keys.iter().map(Column::value_type).collect();
        self.structure.validate_key_types(&key_types)?;

        let rows = keys.first().map_or(0, Column::len);
        if let Some((position, column)) = keys
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != rows)
        {
            return Err(Error::MalformedBlock(format!(
                "key column {position} has {} rows, expected {rows}",
                column.len()
            )));
        }
        Ok(rows)
    }

    fn scratch_arena(&self) -> Arena {
        Arena::with_chunk_size(self.chunk_size)
    }

    /// Probes `rows` already-validated key rows.
    fn fetch<T, D>(&self, store: &AttributeStore, keys: &[Column], rows: usize, mut default: D) -> Result<Vec<T>>
    where
        T: AttributeValue,
        D: FnMut(usize) -> T,
    {
        let map = store.typed_map::<T>()?;
        let mut scratch = self.scratch_arena();

        let mut out = Vec::with_capacity(rows);
        for row in 0..rows {
            let key = pack_key(keys, row, &mut scratch);
            out.push(match map.get(&key) {
                Some(stored) => T::from_stored(stored),
                None => default(row),
            });
        }
        self.count_queries(rows);
        Ok(out)
    }

    /// Values of `attribute` for each key row; missing keys get the
    /// attribute's null value.
    ///
    /// `T` must be the Rust type of the attribute exactly (`u32` for
    /// `UInt32`, [`Decimal64`](crate::types::Decimal64) for `Decimal64(s)`,
    /// `String` for `String`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAttribute`], [`Error::KeyArityMismatch`],
    /// [`Error::KeyTypeMismatch`] or [`Error::TypeMismatch`].
    pub fn get<T: AttributeValue>(&self, attribute: &str, keys: &[Column]) -> Result<Vec<T>> {
        let store = self.attribute(attribute)?;
        let rows = self.check_keys(keys)?;
        let null_value = store.null_value_as::<T>()?;
        self.fetch(store, keys, rows, |_| null_value.clone())
    }

    /// Values of `attribute` for each key row; missing keys get `default`.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_or<T: AttributeValue>(&self, attribute: &str, keys: &[Column], default: T) -> Result<Vec<T>> {
        let store = self.attribute(attribute)?;
        let rows = self.check_keys(keys)?;
        self.fetch(store, keys, rows, |_| default.clone())
    }

    /// Values of `attribute` for each key row; a missing key at row `i`
    /// gets `defaults[i]`.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get), plus [`Error::DefaultsLengthMismatch`]
    /// if `defaults` does not have one entry per key row.
    pub fn get_or_each<T: AttributeValue>(
        &self,
        attribute: &str,
        keys: &[Column],
        defaults: &[T],
    ) -> Result<Vec<T>> {
        let store = self.attribute(attribute)?;
        let rows = self.check_keys(keys)?;
        if defaults.len() != rows {
            return Err(Error::DefaultsLengthMismatch {
                expected: rows,
                actual: defaults.len(),
            });
        }
        self.fetch(store, keys, rows, |row| defaults[row].clone())
    }

    /// Values of `attribute` as a column of the attribute's own type;
    /// missing keys get the null value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAttribute`], [`Error::KeyArityMismatch`] or
    /// [`Error::KeyTypeMismatch`].
    pub fn get_column(&self, attribute: &str, keys: &[Column]) -> Result<Column> {
        let store = self.attribute(attribute)?;
        let rows = self.check_keys(keys)?;
        self.column_with(store, keys, rows, store.null_value())
    }

    /// Like [`get_column`](Self::get_column), with `default` for missing
    /// keys. The default is converted to the attribute type first.
    ///
    /// # Errors
    ///
    /// Same as [`get_column`](Self::get_column), plus
    /// [`Error::InvalidLiteral`] if `default` does not fit the attribute.
    pub fn get_column_or(&self, attribute: &str, keys: &[Column], default: &Value) -> Result<Column> {
        let store = self.attribute(attribute)?;
        let rows = self.check_keys(keys)?;
        let default = default.convert_to(store.value_type())?;
        self.column_with(store, keys, rows, &default)
    }

    fn column_with(&self, store: &AttributeStore, keys: &[Column], rows: usize, default: &Value) -> Result<Column> {
        let mut scratch = self.scratch_arena();

        let mut out = Column::with_capacity(store.value_type(), rows);
        for row in 0..rows {
            let key = pack_key(keys, row, &mut scratch);
            out.push(store.value_at(&key).unwrap_or_else(|| default.clone()))?;
        }
        self.count_queries(rows);
        Ok(out)
    }

    /// Membership of each key row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyArityMismatch`] or [`Error::KeyTypeMismatch`].
    pub fn has(&self, keys: &[Column]) -> Result<Vec<bool>> {
        let rows = self.check_keys(keys)?;
        let representative = self.representative()?;
        let mut scratch = self.scratch_arena();

        let out = (0..rows)
            .map(|row| representative.contains(&pack_key(keys, row, &mut scratch)))
            .collect();
        self.count_queries(rows);
        Ok(out)
    }
}
