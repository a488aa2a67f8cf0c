//! Base62 conversion between short-link suffixes and integer ordinals.
//!
//! The alphabet order is `a-z`, `A-Z`, `0-9`, so `a` is the zero digit and
//! suffixes sort in the same order the campaign issues them.

use crate::config::SUFFIX_LENGTH;

/// The 62 digit symbols, in digit-value order.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const BASE: u64 = 62;

/// Number of distinct ordinals a 6-character suffix can express (62^6).
pub const SUFFIX_SPACE: u64 = 56_800_235_584;

fn digit_value(c: char) -> Option<u64> {
    match c {
        'a'..='z' => Some(c as u64 - 'a' as u64),
        'A'..='Z' => Some(c as u64 - 'A' as u64 + 26),
        '0'..='9' => Some(c as u64 - '0' as u64 + 52),
        _ => None,
    }
}

/// Converts a base62 string to its ordinal.
///
/// Characters outside the alphabet are skipped rather than rejected, so
/// `decode("ab-c") == decode("abc")`. Callers that accept user input should
/// check it with [`is_valid_suffix`] first. Overflow wraps; only strings of up
/// to 10 digits are meaningful.
pub fn decode(s: &str) -> u64 {
    s.chars()
        .filter_map(digit_value)
        .fold(0u64, |acc, d| acc.wrapping_mul(BASE).wrapping_add(d))
}

/// Converts an ordinal to a base62 string left-padded with `a` to `length`.
///
/// Ordinals that need more than `length` digits are rendered in full, so the
/// result is longer than `length` rather than truncated.
pub fn encode(mut n: u64, length: usize) -> String {
    let mut digits = Vec::with_capacity(length.max(11));
    while n > 0 {
        digits.push(ALPHABET[(n % BASE) as usize]);
        n /= BASE;
    }
    while digits.len() < length {
        digits.push(ALPHABET[0]);
    }
    digits.reverse();
    // ALPHABET is pure ASCII
    digits.into_iter().map(char::from).collect()
}

/// Encodes an ordinal as a standard 6-character suffix.
pub fn encode_suffix(n: u64) -> String {
    encode(n, SUFFIX_LENGTH)
}

/// Whether `s` is exactly 6 characters, all from the alphabet.
pub fn is_valid_suffix(s: &str) -> bool {
    s.len() == SUFFIX_LENGTH && s.chars().all(|c| digit_value(c).is_some())
}
