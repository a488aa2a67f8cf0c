//! Identifier-space scanner.
//!
//! Sweeps a range of base62 suffixes, probes `{base_url}{prefix}{suffix}` for
//! each, and reports links whose redirect target carries a campaign marker.
//!
//! State machine: `Idle -> Running <-> Paused -> Stopping -> Finished`, or
//! `Running -> Finished` when the range is exhausted. A `Scanner` runs once.

mod range;
mod throttle;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::codec::base62::encode_suffix;
use crate::config::{ConfigError, ScanConfig, MAX_LOGGED_TARGET_CHARS};
use crate::error_handling::{categorize_status, ErrorCategory, InitializationError, ProcessingStats};
use crate::events::EventSink;
use crate::fetch::{classify_target, LinkKind, LinkResolver, RedirectOutcome};
use crate::initialization::init_redirect_client;
use crate::pool::{run_pool, TaskControl};
use crate::utils::truncate_for_log;

pub use range::{OrdinalCursor, ScanRange};
pub use throttle::Throttle;

/// A short link whose redirect target matched a campaign marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DiscoveredLink {
    pub kind: LinkKind,
    pub url: String,
}

/// Lifecycle state of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Running,
    Paused,
    Stopping,
    Finished,
}

/// Error types for scan setup.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The scan configuration was rejected.
    #[error("Invalid scan configuration: {0}")]
    Config(#[from] ConfigError),

    /// The probe client could not be built.
    #[error(transparent)]
    Client(#[from] InitializationError),

    /// `run` was called on a scanner that is not idle.
    #[error("Scan already started")]
    AlreadyStarted,
}

/// Totals of a finished scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    /// Ordinals probed
    pub checked: u64,
    /// Links discovered
    pub found: u64,
    pub found_by_kind: HashMap<LinkKind, u64>,
    pub elapsed: Duration,
    /// Whether `stop()` ended the scan early
    pub stopped: bool,
}

impl ScanReport {
    /// Probes per second.
    pub fn speed(&self) -> f64 {
        rate(self.checked, self.elapsed)
    }
}

/// Concurrent sweep over a suffix range.
///
/// Control methods (`pause`, `resume`, `stop`) and counters may be used from
/// any thread while `run` blocks on another.
pub struct Scanner {
    config: ScanConfig,
    range: ScanRange,
    resolver: LinkResolver,
    control: TaskControl,
    throttle: Throttle,
    state: Mutex<ScanState>,
    started: Mutex<Option<Instant>>,
    finished_after: Mutex<Option<Duration>>,
    checked: AtomicU64,
    found: AtomicU64,
    found_by_kind: HashMap<LinkKind, AtomicU64>,
    stats: ProcessingStats,
}

impl Scanner {
    /// Validates `config` and prepares a scan using `resolver` for probes.
    pub fn new(config: ScanConfig, resolver: LinkResolver) -> Result<Self, ScanError> {
        config.validate()?;
        let range = ScanRange::from_suffixes(&config.start_suffix, &config.end_suffix);
        let throttle = Throttle::new(config.throttle_every, config.throttle_sleep);
        let found_by_kind = [LinkKind::Vip, LinkKind::Gift, LinkKind::Audio]
            .into_iter()
            .map(|kind| (kind, AtomicU64::new(0)))
            .collect();

        Ok(Self {
            config,
            range,
            resolver,
            control: TaskControl::new(),
            throttle,
            state: Mutex::new(ScanState::Idle),
            started: Mutex::new(None),
            finished_after: Mutex::new(None),
            checked: AtomicU64::new(0),
            found: AtomicU64::new(0),
            found_by_kind,
            stats: ProcessingStats::new(),
        })
    }

    /// Like [`new`](Self::new), building a non-redirecting probe client from `config`.
    pub fn from_config(config: ScanConfig) -> Result<Self, ScanError> {
        let client = init_redirect_client(config.probe_timeout_secs, &config.user_agent)?;
        Self::new(config, LinkResolver::new(client))
    }

    /// Runs the scan to completion or until `stop()`, blocking the caller.
    ///
    /// Discoveries, log lines and `on_progress(completed, total, None)` go to
    /// `sink` from worker threads; `on_finished` fires once at the end.
    pub fn run(&self, sink: &dyn EventSink) -> Result<ScanReport, ScanError> {
        {
            let mut state = self.lock_state();
            if *state != ScanState::Idle {
                return Err(ScanError::AlreadyStarted);
            }
            *state = ScanState::Running;
        }
        let start = Instant::now();
        *self.started.lock().unwrap_or_else(PoisonError::into_inner) = Some(start);

        let prefix = &self.config.prefix;
        sink.on_log(&format!(
            "Scan started: {}{} to {}{} ({} codes)",
            prefix,
            self.config.start_suffix,
            prefix,
            self.config.end_suffix,
            self.range.len()
        ));
        sink.on_log(&format!("Using {} worker threads", self.config.worker_count));
        if self.config.throttle_enabled() {
            sink.on_log(&format!(
                "Throttle: pause {}s every {} requests",
                self.throttle.sleep().as_secs_f64(),
                self.config.throttle_every
            ));
        }

        let cursor = OrdinalCursor::new(self.range);
        let pool_report = run_pool(
            &cursor,
            self.config.worker_count,
            &self.control,
            |ordinal| self.probe(*ordinal, sink),
            |ordinal, message| {
                self.stats.increment(ErrorCategory::Unexpected);
                let url = self.url_for(*ordinal);
                warn!("Probe of {} panicked: {}", url, message);
                sink.on_log(&format!("[error] {} -> {}", url, message));
            },
            |_, completed, total| sink.on_progress(completed, total, None),
        );

        let elapsed = start.elapsed();
        *self
            .finished_after
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(elapsed);
        *self.lock_state() = ScanState::Finished;

        let report = ScanReport {
            checked: self.checked(),
            found: self.found(),
            found_by_kind: self
                .found_by_kind
                .iter()
                .map(|(kind, count)| (*kind, count.load(Ordering::SeqCst)))
                .collect(),
            elapsed,
            stopped: pool_report.cancelled,
        };

        if report.stopped {
            sink.on_log("--- Scan stopped ---");
        } else {
            sink.on_log("--- Scan complete ---");
        }
        info!(
            "Checked {} codes in {:.1}s (~{:.1}/s), found {}",
            report.checked,
            elapsed.as_secs_f64(),
            report.speed(),
            report.found
        );
        sink.on_finished();
        Ok(report)
    }

    /// Holds workers at their next checkpoint. Returns `false` unless running.
    pub fn pause(&self) -> bool {
        let mut state = self.lock_state();
        if *state != ScanState::Running {
            return false;
        }
        *state = ScanState::Paused;
        self.control.pause();
        info!("Scan paused");
        true
    }

    /// Releases paused workers. Returns `false` unless paused.
    pub fn resume(&self) -> bool {
        let mut state = self.lock_state();
        if *state != ScanState::Paused {
            return false;
        }
        *state = ScanState::Running;
        self.control.resume();
        info!("Scan resumed");
        true
    }

    /// Stops claiming new codes; in-flight probes finish.
    ///
    /// Returns `false` if the scan is not running or paused.
    pub fn stop(&self) -> bool {
        let mut state = self.lock_state();
        if !matches!(*state, ScanState::Running | ScanState::Paused) {
            return false;
        }
        *state = ScanState::Stopping;
        self.control.cancel();
        info!("Scan stopping");
        true
    }

    pub fn state(&self) -> ScanState {
        *self.lock_state()
    }

    pub fn range(&self) -> ScanRange {
        self.range
    }

    /// Codes probed so far.
    pub fn checked(&self) -> u64 {
        self.checked.load(Ordering::SeqCst)
    }

    /// Links discovered so far.
    pub fn found(&self) -> u64 {
        self.found.load(Ordering::SeqCst)
    }

    /// Time since `run` started, frozen once it returns.
    pub fn elapsed(&self) -> Duration {
        if let Some(done) = *self
            .finished_after
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
        {
            return done;
        }
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    /// Probes per second since the start.
    pub fn speed(&self) -> f64 {
        rate(self.checked(), self.elapsed())
    }

    /// Number of throttle pauses taken.
    pub fn throttle_pauses(&self) -> u64 {
        self.throttle.fired()
    }

    /// Per-category counts of failed or unmatched probes.
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    fn url_for(&self, ordinal: u64) -> String {
        format!(
            "{}{}{}",
            self.config.base_url,
            self.config.prefix,
            encode_suffix(ordinal)
        )
    }

    fn probe(&self, ordinal: u64, sink: &dyn EventSink) {
        self.throttle.tick_with(|count| {
            sink.on_log(&format!(
                "[throttle] {} requests reached, pausing {}s",
                count,
                self.throttle.sleep().as_secs_f64()
            ));
        });
        self.checked.fetch_add(1, Ordering::SeqCst);
        let url = self.url_for(ordinal);

        match self.resolver.resolve(&url) {
            RedirectOutcome::Redirect(location) => match classify_target(&location) {
                Some(kind) => {
                    self.found.fetch_add(1, Ordering::SeqCst);
                    if let Some(counter) = self.found_by_kind.get(&kind) {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    info!("Found {} link: {}", kind, url);
                    sink.on_log(&format!("[{} link] {}", kind.as_str().to_uppercase(), url));
                    sink.on_discovered(DiscoveredLink { kind, url });
                }
                None => {
                    self.stats.increment(ErrorCategory::UnrecognizedTarget);
                    sink.on_log(&format!(
                        "[redirect mismatch] {} -> {}",
                        url,
                        truncate_for_log(&location, MAX_LOGGED_TARGET_CHARS)
                    ));
                }
            },
            RedirectOutcome::MissingLocation(status) => {
                self.stats.increment(ErrorCategory::MissingLocation);
                sink.on_log(&format!(
                    "[invalid] {} -> status {} without Location",
                    url, status
                ));
            }
            RedirectOutcome::NotFound => {
                self.stats.increment(ErrorCategory::NotFound);
                sink.on_log(&format!("[invalid] {} -> status 404", url));
            }
            RedirectOutcome::Invalid(status) => {
                self.stats.increment(categorize_status(status));
                sink.on_log(&format!("[invalid] {} -> status {}", url, status));
            }
            RedirectOutcome::NetworkError(category) => {
                self.stats.increment(category);
                debug!("Probe of {} failed: {}", url, category);
                sink.on_log(&format!("[network] {} -> {}", url, category));
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ScanState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}
