//! Small shared helpers.
//!
//! This module provides:
//! - Sanitization and truncation of remote-supplied text
//! - Clock access and Beijing-time formatting of API timestamps

pub mod sanitize;
mod time;

pub use sanitize::{sanitize_message, truncate_for_log};
pub use time::{format_beijing_time, now_ms, remaining_days};
