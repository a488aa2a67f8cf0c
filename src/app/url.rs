//! Short-link normalization for user-supplied link lists.

use log::warn;

/// Maximum link length before a warning is logged.
const MAX_URL_LENGTH: usize = 2048;

/// Normalizes a short link from a link list.
///
/// Trims whitespace and adds an `http://` prefix if no scheme is given (the
/// short-link host serves plain HTTP). Links that still do not look like
/// http(s) URLs are logged and returned unchanged otherwise, so the analyzer
/// reports them as classified failures instead of silently dropping them.
pub fn normalize_link(link: &str) -> String {
    let link = link.trim();
    let normalized = if !link.starts_with("http://") && !link.starts_with("https://") {
        format!("http://{link}")
    } else {
        link.to_string()
    };

    if normalized.len() > MAX_URL_LENGTH {
        warn!(
            "Link exceeds maximum length ({} > {}): {}...",
            normalized.len(),
            MAX_URL_LENGTH,
            normalized.chars().take(50).collect::<String>()
        );
        return normalized;
    }

    match url::Url::parse(&normalized) {
        Ok(parsed) if parsed.host_str().is_some() => {}
        Ok(_) => warn!("Link has no host: {link}"),
        Err(_) => warn!("Link does not parse as a URL: {link}"),
    }
    normalized
}
