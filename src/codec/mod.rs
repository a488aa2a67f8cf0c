//! Short-link code conversion.

pub mod base62;
