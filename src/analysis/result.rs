//! Analysis result types.
//!
//! One `AnalysisResult` is produced per analyzed link. Each variant carries
//! only the fields relevant to its outcome, plus the short link it belongs to.

use serde::Serialize;

use crate::error_handling::ErrorCategory;
use crate::fetch::LinkKind;

/// Claim state of a gift card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftStatus {
    /// Unclaimed copies remain
    Available,
    /// Every copy has been claimed
    Claimed,
    /// Past its expiry time, whatever the counts
    Expired,
    /// Counts do not allow a decision
    Unknown,
}

impl GiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftStatus::Available => "available",
            GiftStatus::Claimed => "claimed",
            GiftStatus::Expired => "expired",
            GiftStatus::Unknown => "unknown",
        }
    }
}

/// Gift card details returned by the gift status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GiftRecord {
    pub status: GiftStatus,
    /// Human-readable status, e.g. `available (7/10)`
    pub status_text: String,
    pub sender_id: String,
    pub sender_name: String,
    /// The opaque `d` parameter of the landing page
    pub gift_data: String,
    /// `sku.goods`
    pub gift_type: String,
    pub price: f64,
    pub total_count: i64,
    pub used_count: i64,
    /// `max(0, total_count - used_count)`
    pub available_count: i64,
    /// Expiry in epoch milliseconds; zero when the API gave none
    pub expire_time: i64,
    /// Beijing-time rendition of `expire_time`, empty when there is none
    pub expire_date: String,
    pub is_expired: bool,
}

/// VIP invitation or trial card validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VipRecord {
    pub is_valid: bool,
    pub expire_time: i64,
    pub expire_date: String,
    pub remaining_days: i64,
    /// Detail endpoint that produced the answer
    pub source_endpoint: String,
    pub status_text: String,
}

/// Payload of a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SuccessDetail {
    Gift(GiftRecord),
    Vip(VipRecord),
    Audio(VipRecord),
}

impl SuccessDetail {
    pub fn kind(&self) -> LinkKind {
        match self {
            SuccessDetail::Gift(_) => LinkKind::Gift,
            SuccessDetail::Vip(_) => LinkKind::Vip,
            SuccessDetail::Audio(_) => LinkKind::Audio,
        }
    }
}

/// Outcome of analyzing one short link.
///
/// Serialized as a JSON object with a `status` tag, e.g.
/// `{"status": "api_exception", "short_url": ..., "category": "rate_limited", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisResult {
    /// The API answered and the answer was classified.
    Success {
        short_url: String,
        redirect_url: String,
        detail: SuccessDetail,
    },

    /// The link redirects somewhere this analyzer does not handle.
    NotApplicable {
        short_url: String,
        redirect_url: String,
        /// The analyzer that should handle the link instead, if known
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<LinkKind>,
        message: String,
    },

    /// The short link does not redirect to a campaign page.
    Invalid {
        short_url: String,
        category: ErrorCategory,
        message: String,
    },

    /// Network, HTTP or API business failure.
    ApiException {
        short_url: String,
        category: ErrorCategory,
        message: String,
        /// Business code from the API body
        #[serde(skip_serializing_if = "Option::is_none")]
        api_code: Option<i64>,
    },

    /// Local processing failure: parameter extraction, response parsing, or
    /// every VIP detail endpoint failing.
    Error {
        short_url: String,
        category: ErrorCategory,
        message: String,
    },

    /// Anything unanticipated, caught at the per-link boundary.
    SystemException { short_url: String, message: String },
}

impl AnalysisResult {
    /// The short link this result belongs to.
    pub fn short_url(&self) -> &str {
        match self {
            AnalysisResult::Success { short_url, .. }
            | AnalysisResult::NotApplicable { short_url, .. }
            | AnalysisResult::Invalid { short_url, .. }
            | AnalysisResult::ApiException { short_url, .. }
            | AnalysisResult::Error { short_url, .. }
            | AnalysisResult::SystemException { short_url, .. } => short_url,
        }
    }

    /// The `status` tag this result serializes with.
    pub fn status_name(&self) -> &'static str {
        match self {
            AnalysisResult::Success { .. } => "success",
            AnalysisResult::NotApplicable { .. } => "not_applicable",
            AnalysisResult::Invalid { .. } => "invalid",
            AnalysisResult::ApiException { .. } => "api_exception",
            AnalysisResult::Error { .. } => "error",
            AnalysisResult::SystemException { .. } => "system_exception",
        }
    }

    /// Failure category, for the variants that carry one.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            AnalysisResult::Invalid { category, .. }
            | AnalysisResult::ApiException { category, .. }
            | AnalysisResult::Error { category, .. } => Some(*category),
            AnalysisResult::SystemException { .. } => Some(ErrorCategory::Unexpected),
            AnalysisResult::Success { .. } | AnalysisResult::NotApplicable { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success { .. })
    }

    /// One-line summary for logs and progress text.
    pub fn summary(&self) -> String {
        match self {
            AnalysisResult::Success { detail, .. } => match detail {
                SuccessDetail::Gift(gift) => format!("gift: {}", gift.status_text),
                SuccessDetail::Vip(vip) | SuccessDetail::Audio(vip) => {
                    format!("{}: {}", detail.kind(), vip.status_text)
                }
            },
            AnalysisResult::NotApplicable { message, .. }
            | AnalysisResult::Invalid { message, .. }
            | AnalysisResult::ApiException { message, .. }
            | AnalysisResult::Error { message, .. }
            | AnalysisResult::SystemException { message, .. } => {
                format!("{}: {}", self.status_name(), message)
            }
        }
    }

    pub(crate) fn api_exception(short_url: &str, category: ErrorCategory, message: String) -> Self {
        AnalysisResult::ApiException {
            short_url: short_url.to_string(),
            category,
            message,
            api_code: None,
        }
    }

    pub(crate) fn error(short_url: &str, category: ErrorCategory, message: String) -> Self {
        AnalysisResult::Error {
            short_url: short_url.to_string(),
            category,
            message,
        }
    }
}
