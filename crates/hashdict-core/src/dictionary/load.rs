//! Load and update passes.

use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Instant;

use super::HashedDictionary;
use crate::arena::Arena;
use crate::column::Block;
use crate::error::{Error, Result};
use crate::key::{pack_key, promote_key, PackedKey};
use crate::source::BlockStream;

/// Outcome of one [`HashedDictionary::update`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateSummary {
    /// Rows read from the source.
    pub rows: usize,
    /// Rows whose key was new.
    pub inserted: usize,
    /// Rows that overwrote an existing key.
    pub modified: usize,
}

impl HashedDictionary {
    /// Initial load.
    ///
    /// Incremental sources go through the saved block: the first load reads
    /// everything, later instances merge the source's updates into the
    /// block they inherited. Other sources are read in full.
    pub(super) fn load_data(&mut self) -> Result<()> {
        let started = Instant::now();

        if self.source.supports_selective_load() {
            let merged = match self.saved_block.clone() {
                None => {
                    let stream = self.source.load_all()?;
                    self.concat(stream)?
                }
                Some(saved) => {
                    let stream = self.source.load_updated_all()?;
                    let update = self.concat(stream)?;
                    self.merge(&saved, &update)?
                }
            };
            self.block_to_attributes(&merged)?;
            self.saved_block = Some(Arc::new(merged));
        } else {
            let stream = self.source.load_all()?;
            for block in stream {
                let block = block?;
                self.block_to_attributes(&block)?;
            }
        }

        self.recompute_stats();

        if self.require_nonempty && self.element_count == 0 {
            return Err(Error::EmptySource(self.name.clone()));
        }

        tracing::info!(
            dictionary = %self.name,
            source = %self.source.describe(),
            elements = self.element_count,
            bytes = self.bytes_allocated,
            duration_ms = started.elapsed().as_millis() as u64,
            "dictionary loaded"
        );
        Ok(())
    }

    fn check_layout(&self, block: &Block) -> Result<()> {
        let expected = self.structure.column_types();
        let actual = block.types();
        if actual == expected {
            Ok(())
        } else {
            Err(Error::MalformedBlock(format!(
                "source block of {actual:?} does not match dictionary layout {expected:?}"
            )))
        }
    }

    fn concat(&self, stream: BlockStream) -> Result<Block> {
        let mut all = Block::empty(&self.structure.column_types());
        for block in stream {
            let block = block?;
            self.check_layout(&block)?;
            all.append(&block)?;
        }
        Ok(all)
    }

    /// First-wins materialisation of one block.
    ///
    /// Whether a row is new is decided once, on the representative
    /// attribute; the other attributes then receive the same key handle.
    fn block_to_attributes(&mut self, block: &Block) -> Result<()> {
        self.check_layout(block)?;
        let (keys, values) = block.split_at(self.structure.key.len())?;
        let Some((first, rest)) = self.attributes.split_first_mut() else {
            return Err(Error::Internal("dictionary without attributes".to_string()));
        };

        let mut dropped = 0usize;
        for row in 0..block.row_count() {
            let key = pack_key(keys, row, &mut self.key_arena);
            if !first.try_insert_row(&key, &values[0], row)? {
                dropped += 1;
                continue;
            }
            for (attribute, column) in rest.iter_mut().zip(&values[1..]) {
                attribute.try_insert_row(&key, column, row)?;
            }
        }

        if dropped > 0 {
            self.duplicates_dropped += dropped;
            tracing::debug!(
                dictionary = %self.name,
                dropped,
                "duplicate keys dropped, first row wins"
            );
        }
        Ok(())
    }

    /// Replaces rows of `saved` whose key reappears in `update`.
    ///
    /// Within `update` the last row of a key wins, matching what
    /// [`update`](Self::update) leaves in the maps.
    fn merge(&self, saved: &Block, update: &Block) -> Result<Block> {
        if update.is_empty() {
            return Ok(saved.clone());
        }
        let key_len = self.structure.key.len();
        let mut scratch = Arena::with_chunk_size(self.chunk_size);

        let (update_keys, _) = update.split_at(key_len)?;
        let mut last_row: FxHashMap<PackedKey, usize> = FxHashMap::default();
        for row in 0..update.row_count() {
            last_row.insert(pack_key(update_keys, row, &mut scratch), row);
        }

        let (saved_keys, _) = saved.split_at(key_len)?;
        let mut keep = Vec::with_capacity(saved.row_count());
        for row in 0..saved.row_count() {
            let key = pack_key(saved_keys, row, &mut scratch);
            keep.push(!last_row.contains_key(&key));
        }

        let mut merged = saved.filter(&keep)?;
        let mut latest: Vec<usize> = last_row.into_values().collect();
        latest.sort_unstable();
        merged.append(&update.select_rows(&latest)?)?;
        Ok(merged)
    }

    /// Applies the source's changed rows to this instance.
    ///
    /// Rows with a known key overwrite every attribute; rows with a new key
    /// are inserted like in a load. The whole batch is checked against the
    /// dictionary layout before the first row is applied, so each row lands
    /// in all attributes or in none. Cached statistics are recomputed at the
    /// end of the pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the source has no incremental
    /// loading, before anything is read, or the source or layout error of
    /// the batch.
    pub fn update(&mut self) -> Result<UpdateSummary> {
        // Without a saved block a clone could not replay the batch.
        if !self.source.supports_selective_load() {
            return Err(Error::Unsupported(format!(
                "{} does not support incremental loading",
                self.source.describe()
            )));
        }
        let started = Instant::now();
        let stream = self.source.load_updated_all()?;
        let batch = self.concat(stream)?;

        let summary = self.apply_update(&batch)?;

        let saved = match &self.saved_block {
            Some(saved) => self.merge(saved, &batch)?,
            None => batch,
        };
        self.saved_block = Some(Arc::new(saved));

        self.recompute_stats();

        tracing::info!(
            dictionary = %self.name,
            rows = summary.rows,
            inserted = summary.inserted,
            modified = summary.modified,
            elements = self.element_count,
            duration_ms = started.elapsed().as_millis() as u64,
            "dictionary updated"
        );
        Ok(summary)
    }

    fn apply_update(&mut self, batch: &Block) -> Result<UpdateSummary> {
        let (keys, values) = batch.split_at(self.structure.key.len())?;
        let Some((first, rest)) = self.attributes.split_first_mut() else {
            return Err(Error::Internal("dictionary without attributes".to_string()));
        };

        let mut summary = UpdateSummary {
            rows: batch.row_count(),
            ..UpdateSummary::default()
        };
        let mut scratch = Arena::with_chunk_size(self.chunk_size);

        for row in 0..batch.row_count() {
            let probe = pack_key(keys, row, &mut scratch);
            if first.contains(&probe) {
                first.upsert_row(&probe, &values[0], row)?;
                for (attribute, column) in rest.iter_mut().zip(&values[1..]) {
                    attribute.upsert_row(&probe, column, row)?;
                }
                summary.modified += 1;
            } else {
                let key = promote_key(&probe, &mut self.key_arena);
                first.try_insert_row(&key, &values[0], row)?;
                for (attribute, column) in rest.iter_mut().zip(&values[1..]) {
                    attribute.try_insert_row(&key, column, row)?;
                }
                summary.inserted += 1;
            }
        }
        Ok(summary)
    }

    pub(super) fn recompute_stats(&mut self) {
        let representative = self.attributes.first();
        self.element_count = representative.map_or(0, |a| a.distinct_key_count());
        self.bucket_count = representative.map_or(0, |a| a.bucket_count());
        self.bytes_allocated = self.key_arena.allocated_bytes()
            + self
                .attributes
                .iter()
                .map(|a| a.estimate_bytes())
                .sum::<usize>();
    }
}
