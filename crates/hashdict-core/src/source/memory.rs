//! Shared in-memory source.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::column::Block;
use crate::error::{Error, Result};
use crate::types::ValueType;

use super::{stream_of, BlockStream, DictionarySource};

/// Default number of rows per produced block.
pub const DEFAULT_BATCH_SIZE: usize = 8192;

#[derive(Debug, Default)]
struct MemoryState {
    blocks: Vec<Block>,
    updates: VecDeque<Block>,
    modified: bool,
    unavailable: Option<String>,
}

/// In-memory source whose clones share the same data.
///
/// Full content is served by `load_all`, queued update blocks are drained
/// by `load_updated_all`, which is only available once
/// [`with_selective_load`](Self::with_selective_load) is set. Writing
/// through any clone marks the source as modified for all of them, and the
/// source stays modified while updates are queued.
#[derive(Debug, Clone)]
pub struct MemorySource {
    types: Vec<ValueType>,
    state: Arc<Mutex<MemoryState>>,
    selective: bool,
    batch_size: usize,
}

impl MemorySource {
    /// Creates an empty source for blocks of the given column types.
    #[must_use]
    pub fn new(types: Vec<ValueType>) -> Self {
        Self {
            types,
            state: Arc::new(Mutex::new(MemoryState::default())),
            selective: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Advertises incremental loading, so dictionaries keep a saved block
    /// and merge updates into it.
    #[must_use]
    pub fn with_selective_load(mut self, selective: bool) -> Self {
        self.selective = selective;
        self
    }

    /// Caps the number of rows per block produced by `load_all`.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn check(&self, block: &Block) -> Result<()> {
        if block.types() == self.types {
            Ok(())
        } else {
            Err(Error::MalformedBlock(format!(
                "block of {:?} does not fit source of {:?}",
                block.types(),
                self.types
            )))
        }
    }

    /// Appends rows to the full content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] if the column types differ.
    pub fn push(&self, block: Block) -> Result<()> {
        self.check(&block)?;
        let mut state = self.state.lock();
        state.blocks.push(block);
        state.modified = true;
        Ok(())
    }

    /// Replaces the full content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] if any block has other column types.
    pub fn replace(&self, blocks: Vec<Block>) -> Result<()> {
        for block in &blocks {
            self.check(block)?;
        }
        let mut state = self.state.lock();
        state.blocks = blocks;
        state.modified = true;
        Ok(())
    }

    /// Queues changed rows for the next `load_updated_all`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] if the column types differ.
    pub fn queue_update(&self, block: Block) -> Result<()> {
        self.check(&block)?;
        let mut state = self.state.lock();
        state.updates.push_back(block);
        state.modified = true;
        Ok(())
    }

    /// Makes every load fail with `reason` until called with `None`.
    pub fn set_unavailable(&self, reason: Option<String>) {
        self.state.lock().unavailable = reason;
    }

    /// Update blocks not yet drained.
    #[must_use]
    pub fn pending_updates(&self) -> usize {
        self.state.lock().updates.len()
    }

    /// Rows in the full content.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.state.lock().blocks.iter().map(Block::row_count).sum()
    }

    fn rebatch(&self, blocks: &[Block]) -> Result<Vec<Block>> {
        let mut all = Block::empty(&self.types);
        for block in blocks {
            all.append(block)?;
        }
        let rows = all.row_count();
        let mut out = Vec::with_capacity(rows.div_ceil(self.batch_size));
        for start in (0..rows).step_by(self.batch_size) {
            let end = (start + self.batch_size).min(rows);
            let selected: Vec<usize> = (start..end).collect();
            out.push(all.select_rows(&selected)?);
        }
        Ok(out)
    }
}

impl DictionarySource for MemorySource {
    fn load_all(&mut self) -> Result<BlockStream> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.unavailable {
            return Err(Error::Source(reason.clone()));
        }
        let blocks = self.rebatch(&state.blocks)?;
        // Queued updates are only drained by `load_updated_all`.
        state.modified = !state.updates.is_empty();
        Ok(stream_of(blocks))
    }

    fn load_updated_all(&mut self) -> Result<BlockStream> {
        if !self.selective {
            return Err(Error::Unsupported(format!(
                "{} does not support incremental loading",
                self.describe()
            )));
        }
        let mut state = self.state.lock();
        if let Some(reason) = &state.unavailable {
            return Err(Error::Source(reason.clone()));
        }
        let updates: Vec<Block> = state.updates.drain(..).collect();
        state.modified = false;
        Ok(stream_of(updates))
    }

    fn is_modified(&self) -> bool {
        self.state.lock().modified
    }

    fn supports_selective_load(&self) -> bool {
        self.selective
    }

    fn estimated_rows(&self) -> Option<usize> {
        Some(self.row_count())
    }

    fn clone_box(&self) -> Box<dyn DictionarySource> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("memory({} columns)", self.types.len())
    }
}
