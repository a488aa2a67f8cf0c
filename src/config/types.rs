//! Configuration types.
//!
//! This module defines the enums and structs used to configure scans and link
//! analysis. They can be constructed programmatically (every struct implements
//! `Default`) or filled in from the command line.

use std::time::Duration;

use clap::ValueEnum;
use thiserror::Error;

use crate::codec::base62;
use crate::config::constants::*;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Configuration rejected by validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The code prefix is empty.
    #[error("Prefix must not be empty")]
    EmptyPrefix,

    /// A suffix is not a 6-character base62 string.
    #[error("Invalid {field} '{value}': expected 6 characters from [a-zA-Z0-9]")]
    InvalidSuffix {
        /// Which setting was rejected (`start_suffix` / `end_suffix`)
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// A worker count falls outside its allowed range.
    #[error("{field} must be between 1 and {max}, got {value}")]
    WorkerCountOutOfRange {
        /// Which setting was rejected
        field: &'static str,
        /// The rejected value
        value: usize,
        /// Upper bound for this setting
        max: usize,
    },

    /// A URL setting does not parse.
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl {
        /// Which setting was rejected
        field: &'static str,
        /// The rejected value
        value: String,
    },
}

/// Settings for an identifier-space scan.
///
/// # Examples
///
/// ```no_run
/// use giftlink_scout::ScanConfig;
///
/// let config = ScanConfig {
///     prefix: "G".to_string(),
///     start_suffix: "aaaaaa".to_string(),
///     end_suffix: "aaaaaz".to_string(),
///     worker_count: 20,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Short-link host, including scheme and trailing slash
    pub base_url: String,

    /// Code prefix placed before the base62 suffix
    pub prefix: String,

    /// First suffix of the range
    pub start_suffix: String,

    /// Last suffix of the range (inclusive)
    pub end_suffix: String,

    /// Number of worker threads (1-1000)
    pub worker_count: usize,

    /// Pause after every N probes (0 disables throttling)
    pub throttle_every: u64,

    /// Length of each throttle pause (zero disables throttling)
    pub throttle_sleep: Duration,

    /// Per-probe timeout in seconds
    pub probe_timeout_secs: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SHORT_LINK_BASE.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            start_suffix: "aaaaaa".to_string(),
            end_suffix: "aaaaaa".to_string(),
            worker_count: DEFAULT_SCAN_WORKERS,
            throttle_every: DEFAULT_THROTTLE_EVERY,
            throttle_sleep: Duration::from_secs(DEFAULT_THROTTLE_SLEEP_SECS),
            probe_timeout_secs: PROBE_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScanConfig {
    /// Checks every field against its allowed range.
    ///
    /// Suffixes are validated strictly here because `base62::decode` skips
    /// unknown characters instead of rejecting them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        for (field, value) in [
            ("start_suffix", &self.start_suffix),
            ("end_suffix", &self.end_suffix),
        ] {
            if !base62::is_valid_suffix(value) {
                return Err(ConfigError::InvalidSuffix {
                    field,
                    value: value.clone(),
                });
            }
        }
        check_worker_count("worker_count", self.worker_count, MAX_SCAN_WORKERS)?;
        check_url("base_url", &self.base_url)?;
        Ok(())
    }

    /// Whether the throttle policy is active.
    pub fn throttle_enabled(&self) -> bool {
        self.throttle_every > 0 && !self.throttle_sleep.is_zero()
    }
}

/// Remote endpoints used by the analyzers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    /// Encrypted gift status endpoint (POST)
    pub gift_status: String,
    /// VIP detail endpoints, probed in order (GET)
    pub vip_detail: Vec<String>,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            gift_status: GIFT_STATUS_ENDPOINT.to_string(),
            vip_detail: VIP_DETAIL_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Settings for gift analysis and VIP validity checks.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Number of worker threads (1-20)
    pub worker_count: usize,

    /// Timeout for redirect resolution and API calls, in seconds
    pub api_timeout_secs: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Remote endpoints
    pub endpoints: ApiEndpoints,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_ANALYSIS_WORKERS,
            api_timeout_secs: API_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoints: ApiEndpoints::default(),
        }
    }
}

impl AnalysisConfig {
    /// Checks the worker count and endpoint URLs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_worker_count("worker_count", self.worker_count, MAX_ANALYSIS_WORKERS)?;
        check_url("gift_status", &self.endpoints.gift_status)?;
        for endpoint in &self.endpoints.vip_detail {
            check_url("vip_detail", endpoint)?;
        }
        Ok(())
    }
}

fn check_worker_count(field: &'static str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::WorkerCountOutOfRange { field, value, max });
    }
    Ok(())
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        })
}
