//! Redirect target inspection.
//!
//! Landing pages are told apart by a path marker, and carry the identifiers the
//! API needs in their query string.

use reqwest::Url;
use serde::Serialize;
use thiserror::Error;

use crate::config::{AUDIO_MARKER, DEFAULT_APP_VERSION, DEFAULT_DLT, GIFT_MARKER, VIP_MARKER};

/// Kind of campaign link, derived from its redirect target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// VIP invitation
    Vip,
    /// Gift card
    Gift,
    /// Audio-quality trial card
    Audio,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Vip => "vip",
            LinkKind::Gift => "gift",
            LinkKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a redirect target by substring match on the known markers.
///
/// Returns `None` for targets that match none of them.
pub fn classify_target(location: &str) -> Option<LinkKind> {
    if location.contains(VIP_MARKER) {
        Some(LinkKind::Vip)
    } else if location.contains(AUDIO_MARKER) {
        Some(LinkKind::Audio)
    } else if location.contains(GIFT_MARKER) {
        Some(LinkKind::Gift)
    } else {
        None
    }
}

/// Failure to pull parameters out of a redirect target.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParamsError {
    /// The redirect target is not a URL.
    #[error("Redirect target is not a valid URL: {0}")]
    InvalidUrl(String),

    /// A VIP target carries neither `token` nor `recordId`.
    #[error("Redirect target carries neither token nor recordId")]
    MissingVipToken,
}

/// Gift card identifiers taken from a `gift-receive` target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GiftParams {
    /// Opaque gift payload
    pub d: String,
    /// Opaque gift signature
    pub p: String,
    /// Sender user id
    pub userid: String,
    pub app_version: String,
    pub dlt: String,
}

impl GiftParams {
    /// Extracts the gift parameters from `location`.
    ///
    /// Absent or blank values fall back to an empty string, or to the protocol
    /// default for `app_version` and `dlt`.
    pub fn from_target(location: &str) -> Result<Self, ParamsError> {
        let url = Url::parse(location).map_err(|_| ParamsError::InvalidUrl(location.to_string()))?;
        let get = |key: &str| query_value(&url, key);

        Ok(Self {
            d: get("d").unwrap_or_default(),
            p: get("p").unwrap_or_default(),
            userid: get("userid").unwrap_or_default(),
            app_version: get("app_version").unwrap_or_else(|| DEFAULT_APP_VERSION.to_string()),
            dlt: get("dlt").unwrap_or_else(|| DEFAULT_DLT.to_string()),
        })
    }
}

/// VIP invitation identifiers; at least one is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VipParams {
    pub token: Option<String>,
    pub record_id: Option<String>,
}

impl VipParams {
    /// Extracts `token` and `recordId` from `location`.
    pub fn from_target(location: &str) -> Result<Self, ParamsError> {
        let url = Url::parse(location).map_err(|_| ParamsError::InvalidUrl(location.to_string()))?;
        let token = query_value(&url, "token");
        let record_id = query_value(&url, "recordId");
        if token.is_none() && record_id.is_none() {
            return Err(ParamsError::MissingVipToken);
        }
        Ok(Self { token, record_id })
    }

    /// Query pairs for the detail endpoints, present values only.
    pub fn query(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(token) = &self.token {
            pairs.push(("token", token.as_str()));
        }
        if let Some(record_id) = &self.record_id {
            pairs.push(("recordId", record_id.as_str()));
        }
        pairs
    }
}

/// First non-blank value of `key` in the query string.
fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.trim().is_empty())
}
