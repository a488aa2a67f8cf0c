//! Ctrl-C handling.

use log::warn;

/// Runs `on_signal` each time Ctrl-C is pressed.
///
/// The handler can only be installed once per process; later calls log a
/// warning and leave the first handler in place.
pub fn on_ctrlc<F>(on_signal: F)
where
    F: Fn() + Send + 'static,
{
    if let Err(e) = ctrlc::set_handler(on_signal) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }
}
