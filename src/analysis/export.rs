//! Status filters for exported link lists.

use clap::ValueEnum;

use super::{AnalysisResult, GiftStatus, SuccessDetail};

/// Result bucket a link list can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum StatusFilter {
    /// Gifts with unclaimed copies, VIP links still valid
    Available,
    /// Fully claimed gifts
    Claimed,
    /// Expired gifts and VIP links
    Expired,
    /// Every failed analysis
    Invalid,
}

impl StatusFilter {
    /// The bucket `result` falls into.
    ///
    /// `None` for results no filter selects: gifts in an unknown state and
    /// links the analyzer did not handle.
    pub fn classify(result: &AnalysisResult) -> Option<Self> {
        match result {
            AnalysisResult::Success { detail, .. } => match detail {
                SuccessDetail::Gift(gift) => match gift.status {
                    GiftStatus::Available => Some(StatusFilter::Available),
                    GiftStatus::Claimed => Some(StatusFilter::Claimed),
                    GiftStatus::Expired => Some(StatusFilter::Expired),
                    GiftStatus::Unknown => None,
                },
                SuccessDetail::Vip(record) | SuccessDetail::Audio(record) => {
                    Some(if record.is_valid {
                        StatusFilter::Available
                    } else {
                        StatusFilter::Expired
                    })
                }
            },
            AnalysisResult::NotApplicable { .. } => None,
            AnalysisResult::Invalid { .. }
            | AnalysisResult::ApiException { .. }
            | AnalysisResult::Error { .. }
            | AnalysisResult::SystemException { .. } => Some(StatusFilter::Invalid),
        }
    }
}

/// Short links of the results matching any of `only`, in result order.
///
/// An empty `only` selects every result.
pub fn select_links<'a>(results: &'a [AnalysisResult], only: &[StatusFilter]) -> Vec<&'a str> {
    results
        .iter()
        .filter(|result| {
            only.is_empty()
                || StatusFilter::classify(result).is_some_and(|bucket| only.contains(&bucket))
        })
        .map(AnalysisResult::short_url)
        .collect()
}
