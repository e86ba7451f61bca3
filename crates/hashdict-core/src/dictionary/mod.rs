//! The complex-key hashed dictionary.
//!
//! # Architecture
//!
//! ```text
//! HashedDictionary
//! ├── key_arena: Arena              owns every distinct packed key
//! ├── attributes[0]  (representative; membership and iteration)
//! │     map: PackedKey -> value     same key handles in every map
//! ├── attributes[1..]
//! ├── saved_block: Option<Arc<Block>>   for incremental sources
//! └── cached stats + atomic query counter
//! ```
//!
//! # Lifecycle
//!
//! `Uninitialized -> Loading -> Ready`. Construction runs the full load
//! synchronously and returns only a `Ready` instance; a failed load returns
//! the error and the half-built instance is dropped. A `Ready` instance is
//! never reloaded in place: [`HashedDictionary::clone_fresh`] builds a new
//! instance that goes through the same sequence, and
//! [`DictionaryHandle`](crate::reload::DictionaryHandle) publishes it.
//!
//! # Thread-Safety
//!
//! All query methods take `&self` and only touch the atomic query counter,
//! so a `Ready` instance can be shared behind an `Arc` without locks.
//! [`HashedDictionary::update`] takes `&mut self` and therefore cannot
//! overlap with reads of the same instance.

mod load;
mod query;
mod stats;
mod stream;


pub use load::UpdateSummary;
pub use stats::DictionaryStats;
pub use stream::DictionaryBlocks;

use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::arena::{Arena, DEFAULT_CHUNK_SIZE};
use crate::attribute::AttributeStore;
use crate::column::Block;
use crate::config::DictionaryConfig;
use crate::error::{Error, Result};
use crate::lifetime::DictionaryLifetime;
use crate::source::DictionarySource;
use crate::structure::DictionaryStructure;

/// Type name reported in statistics.
pub const TYPE_NAME: &str = "ComplexKeyHashed";

/// Load state of a dictionary instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryState {
    /// Attributes allocated, nothing loaded.
    Uninitialized,
    /// Pulling rows from the source.
    Loading,
    /// Fully loaded and queryable.
    Ready,
    /// Load failed; the instance is discarded.
    Failed,
}

/// In-memory dictionary keyed by a composite key.
#[derive(Debug)]
pub struct HashedDictionary {
    name: String,
    structure: DictionaryStructure,
    source: Box<dyn DictionarySource>,
    lifetime: DictionaryLifetime,
    require_nonempty: bool,
    key_description: String,
    chunk_size: usize,

    attribute_index: FxHashMap<String, usize>,
    attributes: Vec<AttributeStore>,
    key_arena: Arena,
    saved_block: Option<Arc<Block>>,
    state: DictionaryState,

    bytes_allocated: usize,
    element_count: usize,
    bucket_count: usize,
    duplicates_dropped: usize,
    query_count: AtomicU64,
}

impl HashedDictionary {
    /// Creates and fully loads a dictionary.
    ///
    /// `saved_block` seeds the incremental path of sources that support
    /// selective loading; pass `None` for a first load.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid structure, and a load
    /// error if the source fails or is empty while `require_nonempty` is set.
    pub fn new(
        name: impl Into<String>,
        structure: DictionaryStructure,
        source: Box<dyn DictionarySource>,
        lifetime: DictionaryLifetime,
        require_nonempty: bool,
        saved_block: Option<Arc<Block>>,
    ) -> Result<Self> {
        Self::build(
            name.into(),
            structure,
            source,
            lifetime,
            require_nonempty,
            saved_block,
            DEFAULT_CHUNK_SIZE,
        )
    }

    /// Creates and loads a dictionary described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration does not validate, and
    /// any error of [`HashedDictionary::new`].
    pub fn from_config(config: &DictionaryConfig, source: Box<dyn DictionarySource>) -> Result<Self> {
        config.validate()?;
        Self::build(
            config.name.clone(),
            config.structure.clone(),
            source,
            config.lifetime,
            config.require_nonempty,
            None,
            config.arena.chunk_size,
        )
    }

    fn build(
        name: String,
        structure: DictionaryStructure,
        source: Box<dyn DictionarySource>,
        lifetime: DictionaryLifetime,
        require_nonempty: bool,
        saved_block: Option<Arc<Block>>,
        chunk_size: usize,
    ) -> Result<Self> {
        structure.validate()?;

        let mut dictionary = Self {
            key_description: structure.key_description(),
            name,
            structure,
            source,
            lifetime,
            require_nonempty,
            chunk_size,
            attribute_index: FxHashMap::default(),
            attributes: Vec::new(),
            key_arena: Arena::with_chunk_size(chunk_size),
            saved_block,
            state: DictionaryState::Uninitialized,
            bytes_allocated: 0,
            element_count: 0,
            bucket_count: 0,
            duplicates_dropped: 0,
            query_count: AtomicU64::new(0),
        };
        dictionary.create_attributes()?;

        dictionary.transition(DictionaryState::Loading);
        if let Err(err) = dictionary.load_data() {
            dictionary.transition(DictionaryState::Failed);
            tracing::warn!(
                dictionary = %dictionary.name,
                source = %dictionary.source.describe(),
                error = %err,
                "dictionary load failed"
            );
            return Err(err);
        }
        dictionary.transition(DictionaryState::Ready);
        Ok(dictionary)
    }

    fn create_attributes(&mut self) -> Result<()> {
        let capacity = self.source.estimated_rows().unwrap_or(0);
        self.attributes.reserve(self.structure.attributes.len());
        for descriptor in &self.structure.attributes {
            self.attribute_index
                .insert(descriptor.name.clone(), self.attributes.len());
            self.attributes
                .push(AttributeStore::new(descriptor, capacity, self.chunk_size)?);
        }
        Ok(())
    }

    fn transition(&mut self, next: DictionaryState) {
        tracing::debug!(
            dictionary = %self.name,
            from = ?self.state,
            to = ?next,
            "dictionary state transition"
        );
        self.state = next;
    }

    /// Builds a new instance from the same configuration, a cloned source
    /// and the saved block, and runs a full load on it.
    ///
    /// # Errors
    ///
    /// Returns the load error of the new instance; `self` is unaffected.
    pub fn clone_fresh(&self) -> Result<Self> {
        Self::build(
            self.name.clone(),
            self.structure.clone(),
            self.source.clone_box(),
            self.lifetime,
            self.require_nonempty,
            self.saved_block.clone(),
            self.chunk_size,
        )
    }

    /// Dictionary name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Always `"ComplexKeyHashed"`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    /// Key shape, e.g. `(String, UInt32)`.
    #[must_use]
    pub fn key_description(&self) -> &str {
        &self.key_description
    }

    /// Declared structure.
    #[must_use]
    pub fn structure(&self) -> &DictionaryStructure {
        &self.structure
    }

    /// The data source.
    #[must_use]
    pub fn source(&self) -> &dyn DictionarySource {
        self.source.as_ref()
    }

    /// Reload interval.
    #[must_use]
    pub fn lifetime(&self) -> &DictionaryLifetime {
        &self.lifetime
    }

    /// Whether an empty source fails the load.
    #[must_use]
    pub fn require_nonempty(&self) -> bool {
        self.require_nonempty
    }

    /// Current state; `Ready` for every instance handed to callers.
    #[must_use]
    pub fn state(&self) -> DictionaryState {
        self.state
    }

    /// Last materialised block of an incremental source.
    #[must_use]
    pub fn saved_block(&self) -> Option<&Arc<Block>> {
        self.saved_block.as_ref()
    }

    /// Attribute store by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAttribute`] if no attribute has that name.
    pub fn attribute(&self, name: &str) -> Result<&AttributeStore> {
        self.attribute_index
            .get(name)
            .and_then(|&index| self.attributes.get(index))
            .ok_or_else(|| Error::UnknownAttribute(name.to_string()))
    }

    /// All attribute stores in declared order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeStore] {
        &self.attributes
    }

    fn representative(&self) -> Result<&AttributeStore> {
        self.attributes
            .first()
            .ok_or_else(|| Error::Internal("dictionary without attributes".to_string()))
    }

    /// Whether the named attribute was declared injective.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAttribute`] if no attribute has that name.
    pub fn is_injective(&self, attribute: &str) -> Result<bool> {
        self.attribute(attribute).map(AttributeStore::is_injective)
    }

    /// Distinct keys, as of the last load or update.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Hash table slots of the representative attribute.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Estimated memory held by the key arena and every attribute.
    #[must_use]
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    /// `element_count / bucket_count`, or 0 for an empty table.
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        if self.bucket_count == 0 {
            0.0
        } else {
            self.element_count as f64 / self.bucket_count as f64
        }
    }

    /// Key rows probed by queries since construction.
    #[must_use]
    pub fn query_count(&self) -> u64 {
        self.query_count.load(Ordering::Relaxed)
    }

    /// Always 1.0: every key is materialised, so a miss is a true absence.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        1.0
    }

    /// Always false: this is not a capacity-bounded cache.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        false
    }

    /// Rows dropped as duplicates by first-wins since construction.
    #[must_use]
    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    /// Snapshot of the observability counters.
    #[must_use]
    pub fn stats(&self) -> DictionaryStats {
        DictionaryStats {
            name: self.name.clone(),
            type_name: TYPE_NAME.to_string(),
            key_description: self.key_description.clone(),
            attribute_count: self.attributes.len(),
            element_count: self.element_count,
            bucket_count: self.bucket_count,
            bytes_allocated: self.bytes_allocated,
            load_factor: self.load_factor(),
            query_count: self.query_count(),
            hit_rate: self.hit_rate(),
            is_cached: self.is_cached(),
            duplicates_dropped: self.duplicates_dropped,
        }
    }

    fn count_queries(&self, rows: usize) {
        self.query_count.fetch_add(rows as u64, Ordering::Relaxed);
    }
}
