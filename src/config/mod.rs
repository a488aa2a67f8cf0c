//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (endpoints, markers, timeouts, limits)
//! - Scan and analysis configuration types with validation
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{AnalyzeArgs, Command, Opt};
pub use constants::*;
pub use types::{AnalysisConfig, ApiEndpoints, ConfigError, LogFormat, LogLevel, ScanConfig};
