//! Command-line options.
//!
//! This struct is generated by `clap` from the field attributes and converted
//! into the library configuration types by the `scout` binary.
//!
//! ```bash
//! # Sweep G aaaaaa..G aaaabz with 200 threads, pausing 2s every 100 probes
//! scout scan --start aaaaaa --end aaaabz --workers 200
//!
//! # Check claim status of every gift link in a file
//! scout gift links.txt --output results.json
//!
//! # Mixed list; save the still-claimable links
//! scout check links.txt --export-links open.txt --only available
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::analysis::StatusFilter;
use crate::config::constants::*;
use crate::config::types::{LogFormat, LogLevel};

/// Top-level command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "scout",
    about = "Discovers campaign short links and checks gift / VIP invitation status."
)]
pub struct Opt {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT, global = true)]
    pub user_agent: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations exposed by the binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enumerate a suffix range and report gift / VIP / audio links
    Scan {
        /// Code prefix placed before the 6-character suffix
        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,

        /// First suffix of the range
        #[arg(long)]
        start: String,

        /// Last suffix of the range (inclusive)
        #[arg(long)]
        end: String,

        /// Number of worker threads (1-1000)
        #[arg(long, default_value_t = DEFAULT_SCAN_WORKERS)]
        workers: usize,

        /// Pause after every N probes (0 disables throttling)
        #[arg(long, default_value_t = DEFAULT_THROTTLE_EVERY)]
        sleep_every: u64,

        /// Length of each throttle pause in seconds (0 disables throttling)
        #[arg(long, default_value_t = DEFAULT_THROTTLE_SLEEP_SECS)]
        sleep_for: u64,

        /// Short-link host
        #[arg(long, default_value = DEFAULT_SHORT_LINK_BASE)]
        base_url: String,

        /// Per-probe timeout in seconds
        #[arg(long, default_value_t = PROBE_TIMEOUT_SECS)]
        timeout_seconds: u64,

        /// Write discovered links to this file, one per line
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check claim status of gift links listed in a file
    Gift(AnalyzeArgs),

    /// Check validity of VIP invitation / trial links listed in a file
    Vip(AnalyzeArgs),

    /// Check a mixed list: gift links first, VIP links and gift-batch
    /// handoffs through the VIP checker
    Check(AnalyzeArgs),
}

/// Options shared by the link-list analysis commands.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// File with one short link per line
    #[arg(value_parser)]
    pub file: PathBuf,

    /// Number of worker threads (1-20)
    #[arg(long, default_value_t = DEFAULT_ANALYSIS_WORKERS)]
    pub workers: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = API_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Write results as JSON to this file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write the analyzed short links to this file, one per line
    #[arg(long)]
    pub export_links: Option<PathBuf>,

    /// Only export links with these statuses (repeatable or comma-separated)
    #[arg(long, value_enum, value_delimiter = ',', requires = "export_links")]
    pub only: Vec<StatusFilter>,
}
