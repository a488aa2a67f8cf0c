//! Utilities for sanitizing text that ends up in logs and results.
//!
//! Redirect targets and API messages come from the remote side and may carry
//! control characters or be arbitrarily long.

/// Removes control characters, keeping newline, tab and carriage return.
pub fn sanitize_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 // Printable ASCII starts at 0x20 (space)
                || code == 0x09 // Tab
                || code == 0x0A // Newline
                || code == 0x0D // Carriage return
        })
        .filter(|c| *c != '\u{7f}')
        .collect()
}

/// Sanitizes `text` and cuts it to at most `max_chars` characters.
///
/// Truncated output ends in `...`. Counts characters, not bytes, so multi-byte
/// text is never split.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    let sanitized = sanitize_message(text);
    match sanitized.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &sanitized[..byte_index]),
        None => sanitized,
    }
}
