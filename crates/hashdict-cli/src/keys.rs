//! Key tuples given on the command line.
//!
//! Each `--key` argument is one tuple written as a CSV record, so
//! `--key 'FR,1'` and `--key '"Paris, FR",1'` both work.

use anyhow::{bail, Context, Result};
use hashdict_core::{Column, DictionaryStructure, Value};

/// Splits one tuple into its fields.
pub fn split_tuple(tuple: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(tuple.as_bytes());
    let mut record = csv::StringRecord::new();
    if !reader
        .read_record(&mut record)
        .with_context(|| format!("invalid key tuple '{tuple}'"))?
    {
        // An empty argument is a one-field tuple holding the empty string.
        return Ok(vec![String::new()]);
    }
    Ok(record.iter().map(str::to_string).collect())
}

/// Parses key tuples into one column per key column.
pub fn parse_keys(tuples: &[String], structure: &DictionaryStructure) -> Result<Vec<Column>> {
    let mut columns: Vec<Column> = structure
        .key
        .iter()
        .map(|k| Column::with_capacity(k.value_type, tuples.len()))
        .collect();

    for tuple in tuples {
        let fields = split_tuple(tuple)?;
        if fields.len() != structure.key.len() {
            bail!(
                "key '{tuple}' has {} fields, the dictionary key {} has {}",
                fields.len(),
                structure.key_description(),
                structure.key.len()
            );
        }
        for ((column, key), field) in columns.iter_mut().zip(&structure.key).zip(&fields) {
            let value = Value::parse_literal(key.value_type, field)
                .with_context(|| format!("key column '{}' of '{tuple}'", key.name))?;
            column.push(value)?;
        }
    }
    Ok(columns)
}
