//! Processing statistics tracking.
//!
//! This module provides thread-safe per-category failure counters shared by
//! all workers of one task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ErrorCategory;

/// Thread-safe failure statistics tracker.
///
/// Every category is initialized to zero on creation, so increments never
/// need to insert and the map itself is never mutated after construction.
///
/// # Thread Safety
///
/// This struct is thread-safe and can be shared across worker threads by
/// reference or through `Arc`.
pub struct ProcessingStats {
    errors: HashMap<ErrorCategory, AtomicUsize>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    pub fn new() -> Self {
        let errors = ErrorCategory::iter()
            .map(|category| (category, AtomicUsize::new(0)))
            .collect();
        ProcessingStats { errors }
    }

    /// Increment a category counter.
    pub fn increment(&self, category: ErrorCategory) {
        if let Some(counter) = self.errors.get(&category) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                category
            );
        }
    }

    /// Get the count for a category.
    pub fn get_count(&self, category: ErrorCategory) -> usize {
        self.errors
            .get(&category)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Get total failure count across all categories.
    pub fn total(&self) -> usize {
        ErrorCategory::iter().map(|c| self.get_count(c)).sum()
    }

    /// Non-zero counters, in declaration order.
    pub fn non_zero(&self) -> Vec<(ErrorCategory, usize)> {
        ErrorCategory::iter()
            .map(|c| (c, self.get_count(c)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}
