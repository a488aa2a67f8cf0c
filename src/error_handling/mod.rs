//! Error handling and processing statistics.
//!
//! This module provides:
//! - The failure taxonomy (`ErrorCategory`, grouped into `ErrorLayer`s)
//! - Categorization of `reqwest` errors and HTTP status codes
//! - Per-category failure statistics shared across workers
//!
//! Failures never propagate out of a worker: they are categorized here and
//! turned into results or log lines by the caller.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, categorize_status};
pub use stats::ProcessingStats;
pub use types::{ErrorCategory, ErrorLayer, InitializationError};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for category in ErrorCategory::iter() {
            assert_eq!(stats.get_count(category), 0);
        }
        assert_eq!(stats.total(), 0);
        assert!(stats.non_zero().is_empty());
    }

    #[test]
    fn test_processing_stats_increment() {
        let stats = ProcessingStats::new();
        stats.increment(ErrorCategory::Timeout);
        stats.increment(ErrorCategory::Timeout);
        stats.increment(ErrorCategory::NotFound);

        assert_eq!(stats.get_count(ErrorCategory::Timeout), 2);
        assert_eq!(stats.get_count(ErrorCategory::NotFound), 1);
        assert_eq!(stats.total(), 3);
        assert_eq!(
            stats.non_zero(),
            vec![(ErrorCategory::Timeout, 2), (ErrorCategory::NotFound, 1)]
        );
    }

    #[test]
    fn test_processing_stats_concurrent_increments() {
        let stats = Arc::new(ProcessingStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.increment(ErrorCategory::ConnectionError);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.get_count(ErrorCategory::ConnectionError), 8000);
    }
}
