//! Probabilistic visited-URL set
//!
//! A Bloom filter sized once for the expected number of distinct URLs. It
//! never reports a false negative, so a URL that was added is always seen
//! as visited; a small, configurable fraction of never-added URLs will also
//! be reported as visited. Memory stays fixed however large the crawl grows.

use crate::RippleError;
use bloomfilter::Bloom;
use std::sync::RwLock;

/// Shared "probably visited" set over canonical URL strings
pub struct VisitedFilter {
    bloom: RwLock<Bloom<str>>,
    capacity: usize,
    false_positive_rate: f64,
}

impl VisitedFilter {
    /// Creates a filter sized for `capacity` distinct URLs at the target
    /// false-positive rate
    ///
    /// # Returns
    ///
    /// * `Ok(VisitedFilter)` - Filter ready for use
    /// * `Err(RippleError::Filter)` - The parameters cannot size a filter
    pub fn new(capacity: usize, false_positive_rate: f64) -> Result<Self, RippleError> {
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(RippleError::Filter(format!(
                "false positive rate must be strictly between 0 and 1, got {}",
                false_positive_rate
            )));
        }

        let bloom = Bloom::new_for_fp_rate(capacity.max(1), false_positive_rate)
            .map_err(|e| RippleError::Filter(e.to_string()))?;

        Ok(Self {
            bloom: RwLock::new(bloom),
            capacity,
            false_positive_rate,
        })
    }

    /// Returns true if the URL was probably added before
    pub fn probably_contains(&self, url: &str) -> bool {
        self.bloom
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .check(url)
    }

    /// Marks a URL as visited
    pub fn add(&self, url: &str) {
        self.bloom
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .set(url);
    }

    /// Expected number of distinct URLs the filter was sized for
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Target false-positive rate the filter was sized for
    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }
}

impl std::fmt::Debug for VisitedFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisitedFilter")
            .field("capacity", &self.capacity)
            .field("false_positive_rate", &self.false_positive_rate)
            .finish()
    }
}
