//! Tests for command-line key parsing.

use hashdict_core::{AttributeDescriptor, Column, DictionaryStructure, ValueType};

use crate::keys::{parse_keys, split_tuple};

fn structure() -> DictionaryStructure {
    DictionaryStructure::new()
        .with_key("city", ValueType::String)
        .with_key("year", ValueType::UInt16)
        .with_attribute(AttributeDescriptor::new("population", ValueType::UInt64, ""))
}

#[test]
fn test_split_tuple_handles_quotes() {
    assert_eq!(split_tuple("FR,1").unwrap(), vec!["FR", "1"]);
    assert_eq!(split_tuple("\"Paris, FR\",2024").unwrap(), vec!["Paris, FR", "2024"]);
    assert_eq!(split_tuple("").unwrap(), vec![""]);
}

#[test]
fn test_parse_keys_builds_one_column_per_key() {
    let tuples = vec!["Lyon,2020".to_string(), "\"Saint-Denis, RE\",2021".to_string()];

    let columns = parse_keys(&tuples, &structure()).unwrap();

    assert_eq!(
        columns,
        vec![
            Column::from(vec!["Lyon", "Saint-Denis, RE"]),
            Column::from(vec![2020u16, 2021]),
        ]
    );
}

#[test]
fn test_parse_keys_rejects_wrong_arity() {
    let err = parse_keys(&["Lyon".to_string()], &structure()).unwrap_err();
    assert!(err.to_string().contains("has 1 fields"));
}

#[test]
fn test_parse_keys_rejects_bad_literal() {
    let err = parse_keys(&["Lyon,70000".to_string()], &structure()).unwrap_err();
    assert!(format!("{err:#}").contains("key column 'year'"));
}
