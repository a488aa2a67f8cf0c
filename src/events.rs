//! Event surface between the core and its front ends.
//!
//! The scanner and the analyzers report through an `EventSink` passed to their
//! `run` methods; they never hold on to a presentation object. Callbacks fire
//! on worker threads, so a consumer tied to one thread (a UI event loop) must
//! forward them, e.g. through `ChannelSink`.

use std::sync::mpsc::Sender;

use log::{debug, info};

use crate::analysis::AnalysisResult;
use crate::scanner::DiscoveredLink;

/// Receiver of core events. Every method defaults to doing nothing.
pub trait EventSink: Sync {
    /// Free-form progress or diagnostic line.
    fn on_log(&self, _message: &str) {}

    /// A scan found a campaign link.
    fn on_discovered(&self, _link: DiscoveredLink) {}

    /// A scanned code or analyzed link finished; `completed` counts up to `total`.
    fn on_progress(&self, _completed: u64, _total: u64, _status: Option<&str>) {}

    /// One analysis result, emitted exactly once per link.
    fn on_result(&self, _result: AnalysisResult) {}

    /// The task ended, naturally or by `stop()`.
    fn on_finished(&self) {}
}

/// Owned form of every `EventSink` callback.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    Log(String),
    Discovered(DiscoveredLink),
    Progress {
        completed: u64,
        total: u64,
        status: Option<String>,
    },
    Result(AnalysisResult),
    Finished,
}

/// Forwards events over a channel to a consumer on another thread.
///
/// Send failures (receiver dropped) are ignored; the task keeps running.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<CoreEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<CoreEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: CoreEvent) {
        let _ = self.sender.send(event);
    }
}

impl EventSink for ChannelSink {
    fn on_log(&self, message: &str) {
        self.send(CoreEvent::Log(message.to_string()));
    }

    fn on_discovered(&self, link: DiscoveredLink) {
        self.send(CoreEvent::Discovered(link));
    }

    fn on_progress(&self, completed: u64, total: u64, status: Option<&str>) {
        self.send(CoreEvent::Progress {
            completed,
            total,
            status: status.map(str::to_string),
        });
    }

    fn on_result(&self, result: AnalysisResult) {
        self.send(CoreEvent::Result(result));
    }

    fn on_finished(&self) {
        self.send(CoreEvent::Finished);
    }
}

/// Writes every event to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn on_log(&self, message: &str) {
        info!("{}", message);
    }

    fn on_discovered(&self, link: DiscoveredLink) {
        info!("Discovered {} link: {}", link.kind, link.url);
    }

    fn on_progress(&self, completed: u64, total: u64, status: Option<&str>) {
        match status {
            Some(status) => debug!("[{}/{}] {}", completed, total, status),
            None => debug!("[{}/{}]", completed, total),
        }
    }

    fn on_result(&self, result: AnalysisResult) {
        info!("{} -> {}", result.short_url(), result.summary());
    }

    fn on_finished(&self) {
        info!("Task finished");
    }
}
