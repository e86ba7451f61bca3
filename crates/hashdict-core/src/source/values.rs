//! Static table built from literal tuples.

use crate::column::{Block, Column};
use crate::error::{Error, Result};
use crate::types::{Value, ValueType};

use super::{stream_of, BlockStream, DictionarySource};

/// Parses a column list such as `"id UInt64, name String, price Decimal64(2)"`.
///
/// # Errors
///
/// Returns [`Error::InvalidStructure`] for an empty list, a missing type or
/// an unknown type name.
pub fn parse_columns_list(structure: &str) -> Result<Vec<(String, ValueType)>> {
    let mut columns = Vec::new();
    for entry in structure.split(',') {
        let entry = entry.trim();
        let (name, type_name) = entry
            .split_once(char::is_whitespace)
            .ok_or_else(|| Error::InvalidStructure(format!("expected '<name> <type>', got '{entry}'")))?;
        let value_type = type_name
            .trim()
            .parse::<ValueType>()
            .map_err(Error::InvalidStructure)?;
        columns.push((name.to_string(), value_type));
    }
    if columns.is_empty() {
        return Err(Error::InvalidStructure("empty column list".to_string()));
    }
    Ok(columns)
}

/// A table whose rows are given inline, like a `VALUES` construct.
///
/// Every value is converted to its column type on construction; the source
/// never changes afterwards.
#[derive(Debug, Clone)]
pub struct ValuesSource {
    names: Vec<String>,
    block: Block,
}

impl ValuesSource {
    /// Builds the table from tuples, one per row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValuesSizeMismatch`] if a tuple does not have one
    /// value per column, or [`Error::InvalidLiteral`] if a value cannot be
    /// converted to its column type.
    pub fn new(columns: Vec<(String, ValueType)>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut data: Vec<Column> = columns
            .iter()
            .map(|(_, value_type)| Column::with_capacity(*value_type, rows.len()))
            .collect();

        for row in rows {
            if row.len() != columns.len() {
                return Err(Error::ValuesSizeMismatch {
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
            for ((column, (_, value_type)), value) in data.iter_mut().zip(&columns).zip(row) {
                column.push(value.convert_to(*value_type)?)?;
            }
        }

        Ok(Self {
            names: columns.into_iter().map(|(name, _)| name).collect(),
            block: Block::new(data)?,
        })
    }

    /// Builds a one-column table; each value is one row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLiteral`] if a value cannot be converted.
    pub fn single_column(name: impl Into<String>, value_type: ValueType, values: Vec<Value>) -> Result<Self> {
        Self::new(
            vec![(name.into(), value_type)],
            values.into_iter().map(|v| vec![v]).collect(),
        )
    }

    /// Parses the column list, then builds the table.
    ///
    /// # Errors
    ///
    /// See [`parse_columns_list`] and [`ValuesSource::new`].
    pub fn from_structure(structure: &str, rows: Vec<Vec<Value>>) -> Result<Self> {
        Self::new(parse_columns_list(structure)?, rows)
    }

    /// Column names in order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// The materialised rows.
    #[must_use]
    pub fn block(&self) -> &Block {
        &self.block
    }
}

impl DictionarySource for ValuesSource {
    fn load_all(&mut self) -> Result<BlockStream> {
        Ok(stream_of(vec![self.block.clone()]))
    }

    fn is_modified(&self) -> bool {
        false
    }

    fn estimated_rows(&self) -> Option<usize> {
        Some(self.block.row_count())
    }

    fn clone_box(&self) -> Box<dyn DictionarySource> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("values({} rows)", self.block.row_count())
    }
}
