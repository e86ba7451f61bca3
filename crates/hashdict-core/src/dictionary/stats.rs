//! Observability snapshot.

use serde::{Deserialize, Serialize};

/// Counters of one dictionary instance at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryStats {
    /// Dictionary name.
    pub name: String,
    /// Layout name, `ComplexKeyHashed`.
    pub type_name: String,
    /// Key shape, e.g. `(String, UInt32)`.
    pub key_description: String,
    /// Number of attributes.
    pub attribute_count: usize,
    /// Distinct keys.
    pub element_count: usize,
    /// Hash table slots.
    pub bucket_count: usize,
    /// Estimated memory in bytes.
    pub bytes_allocated: usize,
    /// `element_count / bucket_count`.
    pub load_factor: f64,
    /// Key rows probed so far.
    pub query_count: u64,
    /// Always 1.0.
    pub hit_rate: f64,
    /// Always false.
    pub is_cached: bool,
    /// Rows dropped by first-wins.
    pub duplicates_dropped: usize,
}

impl DictionaryStats {
    /// Bytes per stored key, or 0 when empty.
    #[must_use]
    pub fn bytes_per_element(&self) -> f64 {
        if self.element_count == 0 {
            0.0
        } else {
            self.bytes_allocated as f64 / self.element_count as f64
        }
    }
}
