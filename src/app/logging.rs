//! Progress logging utilities.

use log::info;
use std::time::Duration;

/// Logs scan progress: codes probed, links found and the probe rate.
pub fn log_progress(elapsed: Duration, checked: u64, found: u64) {
    let elapsed_secs = elapsed.as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        checked as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Checked {} codes in {:.2} seconds (~{:.2} codes/sec), found {}",
        checked, elapsed_secs, rate, found
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_progress_handles_zero_elapsed() {
        log_progress(Duration::ZERO, 0, 0);
        log_progress(Duration::from_secs(3), 300, 2);
    }
}
