//! Clone-and-swap publishing of dictionary instances.
//!
//! Readers call [`DictionaryHandle::current`] and keep the returned `Arc`
//! for the duration of their query. A reload builds a complete replacement
//! with [`HashedDictionary::clone_fresh`] and publishes it with one atomic
//! store; readers that started earlier finish on the old instance, which is
//! freed when its last `Arc` drops.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::dictionary::HashedDictionary;
use crate::error::Result;

/// Publish point for the current instance of one dictionary.
#[derive(Debug)]
pub struct DictionaryHandle {
    current: ArcSwap<HashedDictionary>,
}

impl DictionaryHandle {
    /// Publishes a loaded dictionary.
    #[must_use]
    pub fn new(dictionary: HashedDictionary) -> Self {
        Self {
            current: ArcSwap::from_pointee(dictionary),
        }
    }

    /// Snapshot of the published instance.
    #[must_use]
    pub fn current(&self) -> Arc<HashedDictionary> {
        self.current.load_full()
    }

    /// Publishes `dictionary`, returning the instance it replaced.
    pub fn publish(&self, dictionary: HashedDictionary) -> Arc<HashedDictionary> {
        self.current.swap(Arc::new(dictionary))
    }

    /// Rebuilds the dictionary from its source and publishes the result.
    ///
    /// # Errors
    ///
    /// Returns the load error; the previous instance stays published.
    pub fn reload(&self) -> Result<Arc<HashedDictionary>> {
        let previous = self.current();
        match previous.clone_fresh() {
            Ok(fresh) => {
                let fresh = Arc::new(fresh);
                self.current.store(Arc::clone(&fresh));
                tracing::info!(
                    dictionary = %fresh.name(),
                    elements = fresh.element_count(),
                    previous_elements = previous.element_count(),
                    "dictionary reloaded"
                );
                Ok(fresh)
            }
            Err(err) => {
                tracing::warn!(
                    dictionary = %previous.name(),
                    error = %err,
                    recoverable = err.is_recoverable(),
                    "dictionary reload failed, keeping previous instance"
                );
                Err(err)
            }
        }
    }

    /// Reloads only if the source reports a change.
    ///
    /// Returns `Ok(None)` when nothing changed.
    ///
    /// # Errors
    ///
    /// Same as [`reload`](Self::reload).
    pub fn reload_if_modified(&self) -> Result<Option<Arc<HashedDictionary>>> {
        if !self.current().source().is_modified() {
            tracing::trace!(dictionary = %self.current().name(), "source unchanged, skipping reload");
            return Ok(None);
        }
        self.reload().map(Some)
    }
}
