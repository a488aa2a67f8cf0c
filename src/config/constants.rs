//! Configuration constants.
//!
//! This module defines the protocol constants and operational defaults used
//! throughout the application: short-link layout, API endpoints, redirect
//! markers, timeouts and worker limits.

// Short-link layout
/// Host that serves the campaign short links.
pub const DEFAULT_SHORT_LINK_BASE: &str = "http://163cn.tv/";
/// Default code prefix placed in front of the base62 suffix.
pub const DEFAULT_PREFIX: &str = "G";
/// Length of the base62 suffix of every short-link code.
pub const SUFFIX_LENGTH: usize = 6;

// Redirect target markers
/// Path fragment identifying a VIP invitation landing page.
pub const VIP_MARKER: &str = "vip-invite-cashier";
/// Path fragment identifying a trial-audio (quality trial card) landing page.
pub const AUDIO_MARKER: &str = "vip-trialcard";
/// Path fragment identifying a gift card landing page.
pub const GIFT_MARKER: &str = "gift-receive";

// Remote API endpoints
/// Encrypted gift status endpoint.
pub const GIFT_STATUS_ENDPOINT: &str = "https://music.163.com/weapi/vipgift/app/gift/index";
/// VIP invitation detail endpoints, probed in this order.
pub const VIP_DETAIL_ENDPOINTS: [&str; 3] = [
    "https://interface.music.163.com/api/vipactivity/app/vip/invitation/detail/info/get",
    "https://interface.music.163.com/api/vip/invitation/detail",
    "https://music.163.com/api/vip/invitation/detail",
];

// Gift parameter defaults
/// `app_version` sent when the redirect target does not carry one.
pub const DEFAULT_APP_VERSION: &str = "9.1.80";
/// `dlt` sent when the redirect target does not carry one.
pub const DEFAULT_DLT: &str = "0846";

// Network operation timeouts
/// Timeout for a single short-link probe during a scan.
pub const PROBE_TIMEOUT_SECS: u64 = 5;
/// Timeout for redirect resolution and API calls during analysis.
pub const API_TIMEOUT_SECS: u64 = 10;

// Worker limits
/// Default number of scanner worker threads.
pub const DEFAULT_SCAN_WORKERS: usize = 100;
/// Upper bound on scanner worker threads.
pub const MAX_SCAN_WORKERS: usize = 1000;
/// Default number of analysis worker threads.
pub const DEFAULT_ANALYSIS_WORKERS: usize = 10;
/// Upper bound on analysis worker threads.
pub const MAX_ANALYSIS_WORKERS: usize = 20;

// Throttle defaults
/// Default number of probes between two throttle pauses.
pub const DEFAULT_THROTTLE_EVERY: u64 = 100;
/// Default throttle pause in seconds.
pub const DEFAULT_THROTTLE_SLEEP_SECS: u64 = 2;

/// Maximum number of characters of an unrecognized redirect target written to the log.
pub const MAX_LOGGED_TARGET_CHARS: usize = 100;

/// Default User-Agent string for HTTP requests.
///
/// The gift endpoint rejects requests that do not look like they come from a
/// desktop browser, so every client sends this unless overridden.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Referer sent to the remote API.
pub const API_REFERER: &str = "https://music.163.com/";

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_FORBIDDEN: u16 = 403;
pub const HTTP_STATUS_NOT_FOUND: u16 = 404;
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
/// Business code the API uses for success inside the JSON body.
pub const API_SUCCESS_CODE: i64 = 200;

/// Milliseconds in one day, used for remaining-day computation.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Interval between periodic progress lines during a scan.
pub const LOGGING_INTERVAL_SECS: u64 = 5;
