//! Full-content iteration.

use super::HashedDictionary;
use crate::column::{Block, Column};
use crate::error::Result;
use crate::key::{unpack_key, PackedKey};
use crate::types::ValueType;

/// Lazy sequence of blocks holding every key and attribute value.
///
/// Columns are the key columns followed by the attributes, in declared
/// order. Keys come in hash table order. Call
/// [`rewind`](DictionaryBlocks::rewind) to start over.
pub struct DictionaryBlocks<'a> {
    dictionary: &'a HashedDictionary,
    keys: Box<dyn Iterator<Item = &'a PackedKey> + 'a>,
    key_types: Vec<ValueType>,
    max_block_size: usize,
}

impl<'a> DictionaryBlocks<'a> {
    fn new(dictionary: &'a HashedDictionary, max_block_size: usize) -> Self {
        Self {
            dictionary,
            keys: Self::key_iter(dictionary),
            key_types: dictionary.structure.key_types(),
            max_block_size: max_block_size.max(1),
        }
    }

    fn key_iter(dictionary: &'a HashedDictionary) -> Box<dyn Iterator<Item = &'a PackedKey> + 'a> {
        match dictionary.attributes.first() {
            Some(representative) => representative.keys(),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Key column names, then attribute names.
    #[must_use]
    pub fn column_names(&self) -> Vec<&'a str> {
        let structure = &self.dictionary.structure;
        structure
            .key
            .iter()
            .map(|k| k.name.as_str())
            .chain(structure.attributes.iter().map(|a| a.name.as_str()))
            .collect()
    }

    /// Restarts the iteration from the first key.
    pub fn rewind(&mut self) {
        self.keys = Self::key_iter(self.dictionary);
    }

    fn build(&self, batch: &[&PackedKey]) -> Result<Block> {
        let mut columns: Vec<Column> = self
            .key_types
            .iter()
            .map(|t| Column::with_capacity(*t, batch.len()))
            .collect();
        for key in batch {
            let values = unpack_key(key.as_bytes(), &self.key_types)?;
            for (column, value) in columns.iter_mut().zip(values) {
                column.push(value)?;
            }
        }

        for attribute in &self.dictionary.attributes {
            let mut column = Column::with_capacity(attribute.value_type(), batch.len());
            for key in batch {
                let value = attribute
                    .value_at(key)
                    .unwrap_or_else(|| attribute.null_value().clone());
                column.push(value)?;
            }
            columns.push(column);
        }
        Block::new(columns)
    }
}

impl Iterator for DictionaryBlocks<'_> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<&PackedKey> = self.keys.by_ref().take(self.max_block_size).collect();
        if batch.is_empty() {
            return None;
        }
        Some(self.build(&batch))
    }
}

impl HashedDictionary {
    /// Iterates the whole dictionary in blocks of at most `max_block_size`
    /// rows.
    #[must_use]
    pub fn iterate_all(&self, max_block_size: usize) -> DictionaryBlocks<'_> {
        DictionaryBlocks::new(self, max_block_size)
    }
}
