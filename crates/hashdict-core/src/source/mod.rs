//! Data sources feeding a dictionary.
//!
//! A source hands out row batches as [`Block`]s whose first columns are the
//! key columns and whose remaining columns are the attributes, both in
//! declared order. The dictionary only consumes this iteration contract;
//! file, database or network readers live outside the core.
//!
//! Two in-memory sources ship with the crate:
//!
//! - [`ValuesSource`]: a static table built from literal tuples.
//! - [`MemorySource`]: a shared, mutable source with queued updates.

mod memory;
#[cfg(test)]
mod memory_tests;
mod values;

pub use memory::MemorySource;
pub use values::{parse_columns_list, ValuesSource};

use std::fmt;

use crate::column::Block;
use crate::error::{Error, Result};

/// Lazily produced row batches.
pub type BlockStream = Box<dyn Iterator<Item = Result<Block>> + Send>;

/// Iteration contract of a dictionary source.
pub trait DictionarySource: Send + Sync + fmt::Debug {
    /// Every row of the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn load_all(&mut self) -> Result<BlockStream>;

    /// Rows changed since the previous call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for sources without incremental
    /// loading, or an error if the source cannot be read.
    fn load_updated_all(&mut self) -> Result<BlockStream> {
        Err(Error::Unsupported(format!(
            "{} does not support incremental loading",
            self.describe()
        )))
    }

    /// True if the data changed since it was last read.
    fn is_modified(&self) -> bool;

    /// True if [`load_updated_all`](Self::load_updated_all) is available.
    fn supports_selective_load(&self) -> bool {
        false
    }

    /// Row count hint used to pre-size the hash tables.
    fn estimated_rows(&self) -> Option<usize> {
        None
    }

    /// Independent copy used by a cloned dictionary.
    fn clone_box(&self) -> Box<dyn DictionarySource>;

    /// Short description for logs and errors.
    fn describe(&self) -> String;
}

impl Clone for Box<dyn DictionarySource> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Stream over already materialised blocks.
pub(crate) fn stream_of(blocks: Vec<Block>) -> BlockStream {
    Box::new(blocks.into_iter().map(Ok))
}
