//! Command execution for the `scout` binary.
//!
//! Turns parsed options into library configuration, wires Ctrl-C to the
//! running task, and prints or saves what the task produced.

use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::analysis::{
    run_analysis, run_routed_analysis, select_links, AnalysisResult, GiftAnalyzer, VipChecker,
};
use crate::app::{
    log_progress, normalize_link, on_ctrlc, print_analysis_summary, print_error_statistics,
    print_scan_summary,
};
use crate::config::{AnalysisConfig, AnalyzeArgs, Command, Opt, ScanConfig, LOGGING_INTERVAL_SECS};
use crate::events::EventSink;
use crate::pool::TaskControl;
use crate::scanner::{DiscoveredLink, Scanner};
use crate::storage::{read_link_list, write_json, write_text};

/// Which analyzer a link list goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnalysisKind {
    Gift,
    Vip,
    /// Gift analyzer first, VIP links and handoffs through the VIP checker
    Mixed,
}

/// Runs the subcommand selected in `opt`.
///
/// # Errors
///
/// Returns an error for invalid configuration, unreadable link lists, client
/// setup failures and unwritable output files. Per-link failures are never
/// errors; they are reported as results.
pub fn run_command(opt: Opt) -> Result<()> {
    let user_agent = opt.user_agent;
    match opt.command {
        Command::Scan {
            prefix,
            start,
            end,
            workers,
            sleep_every,
            sleep_for,
            base_url,
            timeout_seconds,
            output,
        } => {
            let config = ScanConfig {
                base_url,
                prefix,
                start_suffix: start,
                end_suffix: end,
                worker_count: workers,
                throttle_every: sleep_every,
                throttle_sleep: Duration::from_secs(sleep_for),
                probe_timeout_secs: timeout_seconds,
                user_agent,
            };
            scan(config, output.as_deref())
        }
        Command::Gift(args) => analyze(AnalysisKind::Gift, args, user_agent),
        Command::Vip(args) => analyze(AnalysisKind::Vip, args, user_agent),
        Command::Check(args) => analyze(AnalysisKind::Mixed, args, user_agent),
    }
}

fn analysis_config(workers: usize, timeout_seconds: u64, user_agent: String) -> AnalysisConfig {
    AnalysisConfig {
        worker_count: workers,
        api_timeout_secs: timeout_seconds,
        user_agent,
        ..Default::default()
    }
}

/// Prints discoveries to stdout and keeps them for the output file.
#[derive(Default)]
struct ScanSink {
    discovered: Mutex<Vec<DiscoveredLink>>,
}

impl EventSink for ScanSink {
    fn on_log(&self, message: &str) {
        debug!("{}", message);
    }

    fn on_discovered(&self, link: DiscoveredLink) {
        println!("{}\t{}", link.kind, link.url);
        self.discovered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(link);
    }
}

fn scan(config: ScanConfig, output: Option<&Path>) -> Result<()> {
    let scanner = Arc::new(Scanner::from_config(config).context("Failed to set up scan")?);
    info!("Scanning {} codes", scanner.range().len());

    let handle = Arc::clone(&scanner);
    on_ctrlc(move || {
        if handle.stop() {
            warn!("Stop requested; waiting for in-flight probes");
        }
    });

    let sink = ScanSink::default();
    let (done_tx, done_rx) = mpsc::channel::<()>();
    let monitor = Arc::clone(&scanner);
    let report = std::thread::scope(|s| {
        s.spawn(move || {
            let interval = Duration::from_secs(LOGGING_INTERVAL_SECS);
            while let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(interval) {
                log_progress(monitor.elapsed(), monitor.checked(), monitor.found());
            }
        });
        let report = scanner.run(&sink);
        drop(done_tx);
        report
    })?;

    print_scan_summary(&report);
    print_error_statistics(scanner.stats());

    if let Some(path) = output {
        let links = sink
            .discovered
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let mut text: String = links
            .iter()
            .map(|link| format!("{}\n", link.url))
            .collect();
        if text.is_empty() {
            text.push('\n');
        }
        write_text(path, &text)
            .with_context(|| format!("Failed to save discovered links to {}", path.display()))?;
        info!("Saved {} links to {}", links.len(), path.display());
    }
    Ok(())
}

/// Logs each result and keeps it for the output file.
#[derive(Default)]
struct ResultSink {
    results: Mutex<Vec<AnalysisResult>>,
}

impl EventSink for ResultSink {
    fn on_result(&self, result: AnalysisResult) {
        info!("{} -> {}", result.short_url(), result.summary());
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    fn on_progress(&self, completed: u64, total: u64, _status: Option<&str>) {
        debug!("Progress: {}/{}", completed, total);
    }
}

fn analyze(kind: AnalysisKind, args: AnalyzeArgs, user_agent: String) -> Result<()> {
    let config = analysis_config(args.workers, args.timeout_seconds, user_agent);
    config.validate().context("Invalid analysis configuration")?;

    // Malformed lines stay in the batch and come back as classified failures
    let links: Vec<String> = read_link_list(&args.file)
        .context("Failed to load link list")?
        .iter()
        .map(|line| normalize_link(line))
        .collect();
    if links.is_empty() {
        warn!("No links in {}", args.file.display());
    }

    let control = Arc::new(TaskControl::new());
    let handle = Arc::clone(&control);
    on_ctrlc(move || {
        warn!("Cancel requested; waiting for in-flight links");
        handle.cancel();
    });

    let sink = ResultSink::default();
    match kind {
        AnalysisKind::Gift => {
            let analyzer =
                GiftAnalyzer::from_config(&config).context("Failed to initialize HTTP clients")?;
            let report = run_analysis(links, config.worker_count, &control, &sink, |url| {
                analyzer.analyze(url)
            });
            print_analysis_summary(&report);
        }
        AnalysisKind::Vip => {
            let checker =
                VipChecker::from_config(&config).context("Failed to initialize HTTP clients")?;
            let report = run_analysis(links, config.worker_count, &control, &sink, |url| {
                checker.analyze(url)
            });
            print_analysis_summary(&report);
        }
        AnalysisKind::Mixed => {
            let analyzer =
                GiftAnalyzer::from_config(&config).context("Failed to initialize HTTP clients")?;
            let checker =
                VipChecker::from_config(&config).context("Failed to initialize HTTP clients")?;
            let report = run_routed_analysis(
                links,
                config.worker_count,
                &control,
                &sink,
                &analyzer,
                &checker,
            );
            info!("Gift links:");
            print_analysis_summary(&report.gift);
            info!(
                "VIP links ({} passed on from gift analysis):",
                report.handed_off
            );
            print_analysis_summary(&report.vip);
        }
    }

    let results = sink
        .results
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(path) = &args.output {
        write_json(path, &results)
            .with_context(|| format!("Failed to save results to {}", path.display()))?;
        info!("Saved {} results to {}", results.len(), path.display());
    }

    if let Some(path) = &args.export_links {
        let links = select_links(&results, &args.only);
        let mut text = links.join("\n");
        text.push('\n');
        write_text(path, &text)
            .with_context(|| format!("Failed to save links to {}", path.display()))?;
        info!("Exported {} links to {}", links.len(), path.display());
    }
    Ok(())
}
