//! Dictionary structure: the declared key columns and attributes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::types::{Value, ValueType};

/// One key column of the composite key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyColumn {
    /// Column name, used when iterating the dictionary contents.
    pub name: String,
    /// Column type.
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

/// One attribute: a named, typed value stored for every key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Attribute name.
    pub name: String,
    /// Attribute type.
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Literal returned for missing keys; empty means zero / empty string.
    #[serde(default)]
    pub null_value: String,
    /// Whether distinct keys map to distinct values.
    #[serde(default)]
    pub injective: bool,
}

impl AttributeDescriptor {
    /// Creates a non-injective attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ValueType, null_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type,
            null_value: null_value.into(),
            injective: false,
        }
    }

    /// Marks the attribute as injective.
    #[must_use]
    pub fn injective(mut self) -> Self {
        self.injective = true;
        self
    }

    /// Parses the null-default literal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLiteral`] if the literal does not fit the type.
    pub fn parse_null_value(&self) -> Result<Value> {
        Value::parse_literal(self.value_type, &self.null_value)
    }
}

/// Declared layout of a dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DictionaryStructure {
    /// Key columns in order.
    #[serde(default)]
    pub key: Vec<KeyColumn>,
    /// Attributes in order.
    #[serde(default, rename = "attribute")]
    pub attributes: Vec<AttributeDescriptor>,
}

impl DictionaryStructure {
    /// Creates an empty structure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key column.
    #[must_use]
    pub fn with_key(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.key.push(KeyColumn {
            name: name.into(),
            value_type,
        });
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeDescriptor) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Checks the structure is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStructure`] for an empty key, no attributes or
    /// duplicate names, and [`Error::InvalidLiteral`] for a bad null value.
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(Error::InvalidStructure(
                "a complex key needs at least one key column".to_string(),
            ));
        }
        if self.attributes.is_empty() {
            return Err(Error::InvalidStructure(
                "at least one attribute is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let names = self
            .key
            .iter()
            .map(|k| k.name.as_str())
            .chain(self.attributes.iter().map(|a| a.name.as_str()));
        for name in names {
            if name.is_empty() {
                return Err(Error::InvalidStructure("empty column name".to_string()));
            }
            if !seen.insert(name) {
                return Err(Error::InvalidStructure(format!("duplicate column name '{name}'")));
            }
        }

        for attribute in &self.attributes {
            attribute.parse_null_value()?;
        }
        Ok(())
    }

    /// Key column types in order.
    #[must_use]
    pub fn key_types(&self) -> Vec<ValueType> {
        self.key.iter().map(|k| k.value_type).collect()
    }

    /// Key types then attribute types: the layout of a source block.
    #[must_use]
    pub fn column_types(&self) -> Vec<ValueType> {
        self.key
            .iter()
            .map(|k| k.value_type)
            .chain(self.attributes.iter().map(|a| a.value_type))
            .collect()
    }

    /// Human-readable key shape, e.g. `(String, UInt32)`.
    #[must_use]
    pub fn key_description(&self) -> String {
        let types: Vec<String> = self.key.iter().map(|k| k.value_type.to_string()).collect();
        format!("({})", types.join(", "))
    }

    /// Checks caller-supplied key types against the declared key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyArityMismatch`] or [`Error::KeyTypeMismatch`].
    pub fn validate_key_types(&self, key_types: &[ValueType]) -> Result<()> {
        if key_types.len() != self.key.len() {
            return Err(Error::KeyArityMismatch {
                expected: self.key.len(),
                actual: key_types.len(),
            });
        }
        for (position, (declared, given)) in self.key.iter().zip(key_types).enumerate() {
            if declared.value_type != *given {
                return Err(Error::KeyTypeMismatch {
                    position,
                    expected: declared.value_type,
                    actual: *given,
                });
            }
        }
        Ok(())
    }
}
