//! Reload interval of a dictionary.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum and maximum number of seconds between reloads.
///
/// A scheduler picks a delay in `[min_sec, max_sec]` so that many
/// dictionaries with the same settings do not reload in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryLifetime {
    /// Lower bound in seconds.
    pub min_sec: u64,
    /// Upper bound in seconds.
    pub max_sec: u64,
}

impl DictionaryLifetime {
    /// Creates a lifetime; the bounds are swapped if given in reverse order.
    #[must_use]
    pub fn new(min_sec: u64, max_sec: u64) -> Self {
        Self {
            min_sec: min_sec.min(max_sec),
            max_sec: min_sec.max(max_sec),
        }
    }

    /// A dictionary that is loaded once and never refreshed.
    #[must_use]
    pub fn never() -> Self {
        Self::default()
    }

    /// True when no periodic reload should happen.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.min_sec == 0 && self.max_sec == 0
    }

    /// Delay before the next reload; `jitter` in `[0, 1]` selects a point
    /// between the bounds and is clamped into that range.
    ///
    /// Returns `None` for a static dictionary.
    #[must_use]
    pub fn next_update_delay(&self, jitter: f64) -> Option<Duration> {
        if self.is_static() {
            return None;
        }
        let jitter = if jitter.is_nan() { 0.0 } else { jitter.clamp(0.0, 1.0) };
        let span = self.max_sec.saturating_sub(self.min_sec) as f64;
        Some(Duration::from_secs_f64(self.min_sec as f64 + span * jitter))
    }
}
