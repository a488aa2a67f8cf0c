//! Bounded worker pool with cooperative pause and cancellation.
//!
//! Both the scanner and the analyzers run on `run_pool`: a fixed number of OS
//! threads pull items from a shared `WorkSource` until it is exhausted or the
//! task is cancelled. Every claimed item produces exactly one output, even if
//! its unit of work panics.

mod control;
mod source;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};

pub use control::TaskControl;
pub use source::{VecSource, WorkSource};

/// Summary of one pool run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    /// Items that produced an output
    pub completed: u64,
    /// Items the source started with
    pub total: u64,
    /// Whether the run was cancelled
    pub cancelled: bool,
}

/// Runs `work` over every item of `source` on `workers` threads.
///
/// Each worker loops: pause checkpoint, cancellation check, claim, work,
/// `on_complete(output, completed, total)`. Callbacks fire on worker threads
/// in completion order. A panicking unit of work is caught and its item is
/// passed to `recover` along with the panic message, so the batch continues.
///
/// After `control.cancel()`, items already claimed still complete and report;
/// no new items are claimed.
pub fn run_pool<S, O, W, R, C>(
    source: &S,
    workers: usize,
    control: &TaskControl,
    work: W,
    recover: R,
    on_complete: C,
) -> PoolReport
where
    S: WorkSource,
    W: Fn(&S::Item) -> O + Sync,
    R: Fn(&S::Item, String) -> O + Sync,
    C: Fn(O, u64, u64) + Sync,
{
    let total = source.len();
    let completed = AtomicU64::new(0);
    let threads = workers.max(1).min(usize::try_from(total).unwrap_or(usize::MAX));
    debug!("Starting pool: {} items on {} workers", total, threads);

    std::thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| {
                while control.checkpoint() {
                    let Some(item) = source.claim() else {
                        break;
                    };
                    let output = match catch_unwind(AssertUnwindSafe(|| work(&item))) {
                        Ok(output) => output,
                        Err(payload) => {
                            let message = panic_message(payload.as_ref());
                            warn!("Unit of work panicked: {}", message);
                            recover(&item, message)
                        }
                    };
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    on_complete(output, done, total);
                }
            });
        }
    });

    PoolReport {
        completed: completed.load(Ordering::SeqCst),
        total,
        cancelled: control.is_cancelled(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
