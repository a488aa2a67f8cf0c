//! Main application modules.
//!
//! This module provides link normalization, progress logging, Ctrl-C handling,
//! and statistics printing used by the `scout` binary.

pub mod logging;
pub mod shutdown;
pub mod statistics;
pub mod url;

// Re-export public API
pub use logging::log_progress;
pub use shutdown::on_ctrlc;
pub use statistics::{print_analysis_summary, print_error_statistics, print_scan_summary};
pub use url::normalize_link;
