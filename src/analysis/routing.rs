//! Mixed link lists: one list, both analyzers.
//!
//! Links already pointing at a VIP or trial-card page go straight to the VIP
//! checker. Everything else goes through the gift analyzer first, and links
//! it finds redirecting to a VIP page are handed on to the VIP checker, so
//! each submitted link still gets exactly one result.

use std::sync::{Mutex, PoisonError};

use log::info;

use super::{run_analysis, AnalysisReport, AnalysisResult, GiftAnalyzer, VipChecker};
use crate::events::EventSink;
use crate::fetch::{classify_target, LinkKind};
use crate::pool::TaskControl;
use crate::scanner::DiscoveredLink;

/// Totals of a mixed run, one report per analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedReport {
    pub gift: AnalysisReport,
    /// Covers direct VIP links and gift-batch handoffs
    pub vip: AnalysisReport,
    /// Links the gift analyzer passed to the VIP checker
    pub handed_off: u64,
}

/// Splits a mixed list into `(gift batch, VIP batch)` by the markers in each link.
pub fn split_batches(links: Vec<String>) -> (Vec<String>, Vec<String>) {
    links.into_iter().partition(|link| {
        !matches!(
            classify_target(link),
            Some(LinkKind::Vip | LinkKind::Audio)
        )
    })
}

/// Whether a gift result says the link belongs to the VIP checker.
pub fn is_vip_handoff(result: &AnalysisResult) -> bool {
    matches!(
        result,
        AnalysisResult::NotApplicable {
            hint: Some(LinkKind::Vip | LinkKind::Audio),
            ..
        }
    )
}

/// Runs a mixed list through both analyzers, gift batch first.
///
/// `sink` sees one `on_result` per submitted link and a single `on_finished`
/// after the VIP batch. Handed-off links report only their VIP result.
pub fn run_routed_analysis(
    links: Vec<String>,
    workers: usize,
    control: &TaskControl,
    sink: &dyn EventSink,
    gift: &GiftAnalyzer,
    vip: &VipChecker,
) -> RoutedReport {
    let (gift_links, mut vip_links) = split_batches(links);
    info!(
        "Routing {} links to the gift analyzer and {} to the VIP checker",
        gift_links.len(),
        vip_links.len()
    );

    let relay = HandoffSink::new(sink);
    let gift_report = run_analysis(gift_links, workers, control, &relay, |url| {
        gift.analyze(url)
    });

    let handoffs = relay.into_handoffs();
    let handed_off = handoffs.len() as u64;
    if handed_off > 0 {
        info!("Passing {} links on to the VIP checker", handed_off);
    }
    vip_links.extend(handoffs);

    let vip_report = run_analysis(vip_links, workers, control, sink, |url| vip.analyze(url));

    RoutedReport {
        gift: gift_report,
        vip: vip_report,
        handed_off,
    }
}

/// Forwards gift-batch events, holding back VIP handoffs and the batch's
/// `on_finished`.
struct HandoffSink<'a> {
    inner: &'a dyn EventSink,
    handoffs: Mutex<Vec<String>>,
}

impl<'a> HandoffSink<'a> {
    fn new(inner: &'a dyn EventSink) -> Self {
        Self {
            inner,
            handoffs: Mutex::new(Vec::new()),
        }
    }

    fn into_handoffs(self) -> Vec<String> {
        self.handoffs
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for HandoffSink<'_> {
    fn on_log(&self, message: &str) {
        self.inner.on_log(message);
    }

    fn on_discovered(&self, link: DiscoveredLink) {
        self.inner.on_discovered(link);
    }

    fn on_progress(&self, completed: u64, total: u64, status: Option<&str>) {
        self.inner.on_progress(completed, total, status);
    }

    fn on_result(&self, result: AnalysisResult) {
        if is_vip_handoff(&result) {
            self.handoffs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(result.short_url().to_string());
        } else {
            self.inner.on_result(result);
        }
    }
}
