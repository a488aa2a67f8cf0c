//! giftlink_scout library: short-link discovery and gift / VIP link analysis
//!
//! This library enumerates a base62 short-link identifier space, follows each
//! code's first redirect without fetching the target, and reports codes that
//! land on gift, VIP-invitation or audio-trial pages. Discovered gift links can
//! then be checked against the encrypted gift-status API, and VIP links against
//! the VIP detail endpoints.
//!
//! # Example
//!
//! ```no_run
//! use giftlink_scout::events::LogSink;
//! use giftlink_scout::{ScanConfig, Scanner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig {
//!     start_suffix: "aaaaaa".to_string(),
//!     end_suffix: "aaaabz".to_string(),
//!     worker_count: 50,
//!     ..Default::default()
//! };
//!
//! let scanner = Scanner::from_config(config)?;
//! let report = scanner.run(&LogSink)?;
//! println!("Checked {} codes, found {} links", report.checked, report.found);
//! # Ok(())
//! # }
//! ```
//!
//! All network work is blocking and runs on scoped worker threads; no async
//! runtime is required.

mod app;
pub mod analysis;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error_handling;
pub mod events;
pub mod fetch;
pub mod initialization;
pub mod pool;
mod run;
pub mod scanner;
pub mod storage;
mod utils;

// Re-export public API
pub use analysis::{
    run_analysis, run_routed_analysis, AnalysisReport, AnalysisResult, GiftAnalyzer,
    RoutedReport, StatusFilter, VipChecker,
};
pub use config::{AnalysisConfig, ApiEndpoints, ConfigError, LogFormat, LogLevel, ScanConfig};
pub use events::{ChannelSink, CoreEvent, EventSink, LogSink};
pub use fetch::{LinkKind, LinkResolver};
pub use pool::TaskControl;
pub use run::run_command;
pub use scanner::{DiscoveredLink, ScanError, ScanReport, Scanner};
pub use utils::{format_beijing_time, remaining_days};
