//! # `hashdict` Core
//!
//! In-memory dictionaries keyed by composite keys.
//!
//! A dictionary maps a tuple of key columns (for example `(region, sku)`)
//! to one or more typed attributes. It is loaded from a
//! [`DictionarySource`], queried in column batches, and replaced by
//! building a fresh instance and swapping it in through a
//! [`DictionaryHandle`].
//!
//! ## Features
//!
//! - **Packed keys**: each key tuple is serialized once into a contiguous
//!   byte string held in an arena, shared by every attribute table
//! - **Typed attribute stores**: one hash map per attribute, specialised by
//!   value type, with first-wins loading
//! - **Miss policies**: null value, scalar default or per-row defaults
//! - **Incremental updates**: selective sources feed changed rows that are
//!   upserted in place and merged into a saved copy of the source data
//! - **Clone-and-swap reload**: readers never block on a reload
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hashdict_core::{Column, DictionaryConfig, HashedDictionary, ValuesSource};
//!
//! let config = DictionaryConfig::load_from_path("vat_rates.toml")?;
//! let source = ValuesSource::from_structure(
//!     "country String, category UInt32, rate Float64",
//!     rows,
//! )?;
//! let dictionary = HashedDictionary::from_config(&config, Box::new(source))?;
//!
//! let rates: Vec<f64> = dictionary.get_or(
//!     "rate",
//!     &[Column::from(vec!["FR", "DE"]), Column::from(vec![1u32, 1])],
//!     0.0,
//! )?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// Counters and size estimates convert between usize, u64 and f64.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::derive_partial_eq_without_eq)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::use_self)]

pub mod arena;
#[cfg(test)]
mod arena_tests;
pub mod attribute;
pub mod column;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod key;
#[cfg(test)]
mod key_tests;
pub mod lifetime;
#[cfg(test)]
mod lifetime_tests;
pub mod reload;
pub mod source;
pub mod structure;
pub mod types;
#[cfg(test)]
mod types_tests;

pub use attribute::{AttributeStore, AttributeValue};
pub use column::{Block, Column};
pub use config::{ArenaConfig, ConfigError, DictionaryConfig, LoggingConfig};
pub use dictionary::{
    DictionaryBlocks, DictionaryState, DictionaryStats, HashedDictionary, UpdateSummary,
};
pub use error::{Error, ErrorKind, Result};
pub use key::PackedKey;
pub use lifetime::DictionaryLifetime;
pub use reload::DictionaryHandle;
pub use source::{parse_columns_list, DictionarySource, MemorySource, ValuesSource};
pub use structure::{AttributeDescriptor, DictionaryStructure, KeyColumn};
pub use types::{Decimal128, Decimal32, Decimal64, Value, ValueType};
