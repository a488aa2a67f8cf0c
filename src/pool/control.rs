//! Cooperative pause and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Shared pause/cancel signal for the workers of one task.
///
/// The pause flag lives behind its own mutex and condition variable; no data
/// is protected by that lock. Cancellation is a plain atomic flag so it can be
/// checked without blocking.
#[derive(Debug, Default)]
pub struct TaskControl {
    paused: Mutex<bool>,
    resumed: Condvar,
    cancelled: AtomicBool,
}

impl TaskControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holds workers at their next checkpoint. Returns `false` if already paused.
    pub fn pause(&self) -> bool {
        let mut paused = self.lock_paused();
        let changed = !*paused;
        *paused = true;
        changed
    }

    /// Releases paused workers. Returns `false` if not paused.
    pub fn resume(&self) -> bool {
        let mut paused = self.lock_paused();
        let changed = *paused;
        *paused = false;
        self.resumed.notify_all();
        changed
    }

    /// Stops workers from claiming further items and wakes any paused ones.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _paused = self.lock_paused();
        self.resumed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        *self.lock_paused()
    }

    /// Blocks while paused, then reports whether the worker may continue.
    ///
    /// Returns `false` once the task is cancelled, including when the
    /// cancellation arrives during the pause.
    pub fn checkpoint(&self) -> bool {
        let mut paused = self.lock_paused();
        while *paused && !self.is_cancelled() {
            paused = self
                .resumed
                .wait(paused)
                .unwrap_or_else(PoisonError::into_inner);
        }
        !self.is_cancelled()
    }

    fn lock_paused(&self) -> MutexGuard<'_, bool> {
        // A bool cannot be left half-written, so a poisoned guard is still usable
        self.paused.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
