//! End-of-run statistics printing.

use log::info;

use crate::analysis::AnalysisReport;
use crate::error_handling::{ErrorCategory, ProcessingStats};
use crate::fetch::LinkKind;
use crate::scanner::ScanReport;

/// Prints non-zero failure counters of a scan.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    print_failure_counts(&error_stats.non_zero());
}

/// Prints per-category failure counts, grouped under one heading.
fn print_failure_counts(failures: &[(ErrorCategory, usize)]) {
    let total: usize = failures.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return;
    }
    info!("Failure Counts ({} total):", total);
    for (category, count) in failures {
        info!("   {}: {}", category.as_str(), count);
    }
}

/// Prints a one-line scan summary plus per-kind discoveries.
pub fn print_scan_summary(report: &ScanReport) {
    info!(
        "{} {} code{} in {:.1}s (~{:.1}/s), found {} link{}",
        if report.stopped { "⏹️ Stopped after" } else { "✅ Checked" },
        report.checked,
        if report.checked == 1 { "" } else { "s" },
        report.elapsed.as_secs_f64(),
        report.speed(),
        report.found,
        if report.found == 1 { "" } else { "s" },
    );
    for kind in [LinkKind::Gift, LinkKind::Vip, LinkKind::Audio] {
        let count = report.found_by_kind.get(&kind).copied().unwrap_or(0);
        if count > 0 {
            info!("   {}: {}", kind, count);
        }
    }
}

/// Prints a one-line analysis summary plus counts per result status.
pub fn print_analysis_summary(report: &AnalysisReport) {
    info!(
        "✅ Analyzed {} of {} link{} in {:.1}s ({} succeeded){}",
        report.completed,
        report.total,
        if report.total == 1 { "" } else { "s" },
        report.elapsed.as_secs_f64(),
        report.count("success"),
        if report.cancelled { " - cancelled" } else { "" },
    );
    let mut statuses: Vec<_> = report.by_status.iter().collect();
    statuses.sort();
    for (status, count) in statuses {
        info!("   {}: {}", status, count);
    }
    print_failure_counts(&report.failures);
}
