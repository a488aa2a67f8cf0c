//! Ordinal ranges and the shared scan cursor.

use std::sync::{Mutex, PoisonError};

use crate::codec::base62;
use crate::pool::WorkSource;

/// Half-open range of suffix ordinals, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    pub start: u64,
    pub end: u64,
}

impl ScanRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Range covering `start_suffix` through `end_suffix`, both included.
    ///
    /// Empty when the end suffix sorts before the start suffix.
    pub fn from_suffixes(start_suffix: &str, end_suffix: &str) -> Self {
        let start = base62::decode(start_suffix);
        let end = base62::decode(end_suffix).saturating_add(1);
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hands out each ordinal of a range exactly once, in ascending order.
#[derive(Debug)]
pub struct OrdinalCursor {
    next: Mutex<u64>,
    range: ScanRange,
}

impl OrdinalCursor {
    pub fn new(range: ScanRange) -> Self {
        Self {
            next: Mutex::new(range.start),
            range,
        }
    }
}

impl WorkSource for OrdinalCursor {
    type Item = u64;

    fn claim(&self) -> Option<u64> {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        if *next >= self.range.end {
            return None;
        }
        let ordinal = *next;
        *next += 1;
        Some(ordinal)
    }

    fn len(&self) -> u64 {
        self.range.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_from_suffixes_includes_end() {
        let range = ScanRange::from_suffixes("AAAAAA", "AAAAAZ");
        assert_eq!(range.len(), 26);
        assert_eq!(range.start, base62::decode("AAAAAA"));

        let single = ScanRange::from_suffixes("aaaaab", "aaaaab");
        assert_eq!(single, ScanRange::new(1, 2));
    }

    #[test]
    fn test_reversed_suffixes_give_empty_range() {
        let range = ScanRange::from_suffixes("aaaaaz", "aaaaaa");
        assert!(range.is_empty());
        assert_eq!(OrdinalCursor::new(range).claim(), None);
    }

    #[test]
    fn test_cursor_claims_each_ordinal_once_across_threads() {
        let cursor = OrdinalCursor::new(ScanRange::new(1_000, 6_000));
        let claimed = Mutex::new(Vec::new());

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let mut local = Vec::new();
                    while let Some(n) = cursor.claim() {
                        local.push(n);
                    }
                    claimed.lock().unwrap().extend(local);
                });
            }
        });

        let claimed = claimed.into_inner().unwrap();
        assert_eq!(claimed.len(), 5_000);
        let unique: HashSet<u64> = claimed.into_iter().collect();
        assert_eq!(unique, (1_000..6_000).collect());
    }
}
