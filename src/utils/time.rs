//! Clock helpers.
//!
//! The remote API reports expiry as milliseconds since the epoch; expiry dates
//! are shown in Beijing time (UTC+8) regardless of the local timezone.

use chrono::{DateTime, FixedOffset, Utc};

use crate::config::MILLIS_PER_DAY;

const BEIJING_OFFSET_SECS: i32 = 8 * 3600;

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Formats an epoch-millisecond timestamp as `YYYY-MM-DD HH:MM:SS (Beijing Time)`.
///
/// Returns `"invalid time"` for timestamps chrono cannot represent.
pub fn format_beijing_time(timestamp_ms: i64) -> String {
    let Some(offset) = FixedOffset::east_opt(BEIJING_OFFSET_SECS) else {
        return "invalid time".to_string();
    };
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(utc) => format!(
            "{} (Beijing Time)",
            utc.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S")
        ),
        None => "invalid time".to_string(),
    }
}

/// Whole days left until `expire_ms`; zero once expired.
pub fn remaining_days(expire_ms: i64, now_ms: i64) -> i64 {
    (expire_ms.saturating_sub(now_ms) / MILLIS_PER_DAY).max(0)
}
