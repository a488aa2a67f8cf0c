//! Work sources shared by pool workers.

use std::sync::{Mutex, PoisonError};

/// A queue of work items claimed one at a time by concurrent workers.
///
/// Each item is handed out at most once.
pub trait WorkSource: Sync {
    type Item: Send;

    /// Takes the next unclaimed item, or `None` when exhausted.
    fn claim(&self) -> Option<Self::Item>;

    /// Total number of items the source started with.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A work source over a fixed list, claimed in order.
#[derive(Debug)]
pub struct VecSource<T> {
    items: Mutex<std::vec::IntoIter<T>>,
    total: u64,
}

impl<T> VecSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self {
            items: Mutex::new(items.into_iter()),
            total,
        }
    }
}

impl<T: Send> WorkSource for VecSource<T> {
    type Item = T;

    fn claim(&self) -> Option<T> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next()
    }

    fn len(&self) -> u64 {
        self.total
    }
}
