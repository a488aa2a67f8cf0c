//! Request throttle: pause after every N probes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Counts probes and sleeps on every `every`-th one.
///
/// The sleep happens while the counter lock is held, so other workers block at
/// their next `tick` until it ends. Probes already past their tick keep
/// running; the contract is the number of pauses (`floor(ticks / every)`),
/// not a hard stop of all traffic during a pause.
#[derive(Debug)]
pub struct Throttle {
    every: u64,
    sleep: Duration,
    count: Mutex<u64>,
    fired: AtomicU64,
}

impl Throttle {
    /// A throttle that is disabled when `every` is zero or `sleep` is zero.
    pub fn new(every: u64, sleep: Duration) -> Self {
        Self {
            every,
            sleep,
            count: Mutex::new(0),
            fired: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.every > 0 && !self.sleep.is_zero()
    }

    /// Records one probe; sleeps if it completes an interval.
    pub fn tick(&self) -> bool {
        self.tick_with(|_| {})
    }

    /// Like [`tick`](Self::tick), calling `on_pause(count)` just before sleeping.
    pub fn tick_with<F: FnOnce(u64)>(&self, on_pause: F) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        if *count % self.every != 0 {
            return false;
        }
        self.fired.fetch_add(1, Ordering::SeqCst);
        on_pause(*count);
        std::thread::sleep(self.sleep);
        true
    }

    /// Number of pauses taken so far.
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn sleep(&self) -> Duration {
        self.sleep
    }
}
