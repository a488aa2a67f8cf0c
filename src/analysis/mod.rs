//! Link analysis: gift card status and VIP validity.
//!
//! Both analyzers share the redirect probe and its failure mapping, and run in
//! batches through `run_analysis`, or together over one mixed list through
//! `run_routed_analysis`.

mod export;
mod gift;
mod result;
mod routing;
mod vip;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::info;
use serde_json::Value;

use crate::config::MAX_ANALYSIS_WORKERS;
use crate::error_handling::{categorize_status, ErrorCategory, ProcessingStats};
use crate::events::EventSink;
use crate::fetch::RedirectOutcome;
use crate::pool::{run_pool, TaskControl, VecSource, WorkSource};

pub use export::{select_links, StatusFilter};
pub use gift::{classify_gift, GiftAnalyzer};
pub use result::{AnalysisResult, GiftRecord, GiftStatus, SuccessDetail, VipRecord};
pub use routing::{is_vip_handoff, run_routed_analysis, split_batches, RoutedReport};
pub use vip::VipChecker;

/// Totals of one analysis batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Links submitted
    pub total: u64,
    /// Links that produced a result
    pub completed: u64,
    pub cancelled: bool,
    /// Result count per `status` tag
    pub by_status: HashMap<&'static str, u64>,
    /// Non-zero failure counts per category
    pub failures: Vec<(ErrorCategory, usize)>,
    pub elapsed: Duration,
}

impl AnalysisReport {
    pub fn count(&self, status: &str) -> u64 {
        self.by_status.get(status).copied().unwrap_or(0)
    }
}

/// Analyzes `links` on a pool of `workers` threads (clamped to 1-20).
///
/// Emits `on_result` then `on_progress(completed, total, summary)` per link,
/// and `on_finished` once at the end. A panic inside `analyze` becomes a
/// `SystemException` result for that link.
pub fn run_analysis<F>(
    links: Vec<String>,
    workers: usize,
    control: &TaskControl,
    sink: &dyn EventSink,
    analyze: F,
) -> AnalysisReport
where
    F: Fn(&str) -> AnalysisResult + Sync,
{
    let start = Instant::now();
    let workers = workers.clamp(1, MAX_ANALYSIS_WORKERS);
    let source = VecSource::new(links);
    let stats = ProcessingStats::new();
    let by_status: Mutex<HashMap<&'static str, u64>> = Mutex::new(HashMap::new());

    info!("Analyzing {} links on {} workers", source.len(), workers);
    let pool = run_pool(
        &source,
        workers,
        control,
        |url| analyze(url),
        |url, message| AnalysisResult::SystemException {
            short_url: url.clone(),
            message: format!("System exception: {}", message),
        },
        |result, completed, total| {
            if let Some(category) = result.category() {
                stats.increment(category);
            }
            *by_status
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(result.status_name())
                .or_insert(0) += 1;
            let summary = result.summary();
            sink.on_result(result);
            sink.on_progress(completed, total, Some(&summary));
        },
    );
    sink.on_finished();

    AnalysisReport {
        total: pool.total,
        completed: pool.completed,
        cancelled: pool.cancelled,
        by_status: by_status.into_inner().unwrap_or_else(PoisonError::into_inner),
        failures: stats.non_zero(),
        elapsed: start.elapsed(),
    }
}

/// Maps a probe that did not redirect to the result both analyzers report.
fn probe_failure(short_url: &str, outcome: RedirectOutcome) -> AnalysisResult {
    let short = short_url.to_string();
    match outcome {
        RedirectOutcome::NotFound => AnalysisResult::Invalid {
            short_url: short,
            category: ErrorCategory::NotFound,
            message: "Link does not exist (404)".to_string(),
        },
        RedirectOutcome::Invalid(status) if status >= 500 => AnalysisResult::api_exception(
            short_url,
            ErrorCategory::ServerError,
            format!("Short-link server error ({})", status),
        ),
        RedirectOutcome::Invalid(status) => AnalysisResult::Invalid {
            short_url: short,
            category: categorize_status(status),
            message: format!("Not a redirecting short link (HTTP {})", status),
        },
        RedirectOutcome::MissingLocation(status) => AnalysisResult::Invalid {
            short_url: short,
            category: ErrorCategory::MissingLocation,
            message: format!("Redirect (HTTP {}) without Location header", status),
        },
        RedirectOutcome::NetworkError(category) => {
            AnalysisResult::api_exception(short_url, category, category.as_str().to_string())
        }
        // Callers handle redirects themselves
        RedirectOutcome::Redirect(location) => AnalysisResult::SystemException {
            short_url: short,
            message: format!("Unhandled redirect to {}", location),
        },
    }
}

/// Reads an integer the API may send as a number, a float, or a numeric string.
fn json_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChannelSink, CoreEvent};
    use serde_json::json;
    use std::sync::mpsc;

    #[test]
    fn test_probe_failure_mapping() {
        let url = "http://163cn.tv/Gx";
        let cases = [
            (RedirectOutcome::NotFound, "invalid", ErrorCategory::NotFound),
            (RedirectOutcome::Invalid(502), "api_exception", ErrorCategory::ServerError),
            (RedirectOutcome::Invalid(200), "invalid", ErrorCategory::HttpError),
            (RedirectOutcome::Invalid(403), "invalid", ErrorCategory::Forbidden),
            (RedirectOutcome::MissingLocation(302), "invalid", ErrorCategory::MissingLocation),
            (
                RedirectOutcome::NetworkError(ErrorCategory::Timeout),
                "api_exception",
                ErrorCategory::Timeout,
            ),
        ];
        for (outcome, status, category) in cases {
            let result = probe_failure(url, outcome.clone());
            assert_eq!(result.status_name(), status, "{:?}", outcome);
            assert_eq!(result.category(), Some(category), "{:?}", outcome);
            assert_eq!(result.short_url(), url);
        }
    }

    #[test]
    fn test_json_i64() {
        assert_eq!(json_i64(&json!(5)), Some(5));
        assert_eq!(json_i64(&json!(5.0)), Some(5));
        assert_eq!(json_i64(&json!(" 12 ")), Some(12));
        assert_eq!(json_i64(&json!("1.5e3")), Some(1500));
        assert_eq!(json_i64(&json!("x")), None);
        assert_eq!(json_i64(&json!(null)), None);
        assert_eq!(json_i64(&json!(true)), None);
    }

    #[test]
    fn test_run_analysis_emits_one_result_per_link() {
        let links: Vec<String> = (0..25).map(|i| format!("http://163cn.tv/G{}", i)).collect();
        let control = TaskControl::new();
        let (tx, rx) = mpsc::channel();

        let report = run_analysis(links, 4, &control, &ChannelSink::new(tx), |url| {
            if url.ends_with('7') {
                panic!("boom");
            }
            probe_failure(url, RedirectOutcome::NotFound)
        });

        assert_eq!(report.total, 25);
        assert_eq!(report.completed, 25);
        assert!(!report.cancelled);
        // G7 and G17
        assert_eq!(report.count("system_exception"), 2);
        assert_eq!(report.count("invalid"), 23);
        assert!(report.failures.contains(&(ErrorCategory::NotFound, 23)));

        let events: Vec<CoreEvent> = rx.iter().collect();
        let results = events
            .iter()
            .filter(|e| matches!(e, CoreEvent::Result(_)))
            .count();
        let progress = events
            .iter()
            .filter(|e| matches!(e, CoreEvent::Progress { .. }))
            .count();
        assert_eq!(results, 25);
        assert_eq!(progress, 25);
        assert_eq!(events.last(), Some(&CoreEvent::Finished));
    }

    #[test]
    fn test_run_analysis_empty_batch_still_finishes() {
        let control = TaskControl::new();
        let (tx, rx) = mpsc::channel();
        let report = run_analysis(Vec::new(), 0, &control, &ChannelSink::new(tx), |url| {
            probe_failure(url, RedirectOutcome::NotFound)
        });
        assert_eq!(report.total, 0);
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec![CoreEvent::Finished]);
    }

    #[test]
    fn test_run_analysis_cancel_reports_partial_batch() {
        let links: Vec<String> = (0..50).map(|i| format!("u{}", i)).collect();
        let control = TaskControl::new();
        let report = run_analysis(links, 1, &control, &crate::events::LogSink, |url| {
            if url == "u9" {
                control.cancel();
            }
            probe_failure(url, RedirectOutcome::NotFound)
        });
        assert!(report.cancelled);
        assert_eq!(report.completed, 10);
        assert_eq!(report.total, 50);
    }
}
