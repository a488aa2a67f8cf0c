//! End-to-end scans against a local short-link server.
//!
//! Every probe is a HEAD request to `<base>/G<suffix>`; the server answers
//! each code exactly as many times as the scan is expected to ask.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use giftlink_scout::scanner::ScanState;
use giftlink_scout::{ChannelSink, CoreEvent, EventSink, LinkKind, ScanConfig, Scanner};
use httptest::{all_of, matchers::*, responders::*, Expectation, Server};

fn scan_config(server: &Server, start: &str, end: &str, workers: usize) -> ScanConfig {
    ScanConfig {
        base_url: server.url_str("/"),
        start_suffix: start.to_string(),
        end_suffix: end.to_string(),
        worker_count: workers,
        throttle_every: 0,
        probe_timeout_secs: 2,
        ..Default::default()
    }
}

#[test]
fn test_scan_finds_single_gift_link() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/Gaaaaab")).respond_with(
            status_code(302).insert_header(
                "Location",
                "https://m.example/st/gift-receive?d=abc&p=1&userid=42",
            ),
        ),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method("HEAD"),
            request::path(not(eq("/Gaaaaab"))),
        ])
        .times(25)
        .respond_with(status_code(404)),
    );

    let scanner = Scanner::from_config(scan_config(&server, "aaaaaa", "aaaaaz", 4)).unwrap();
    let (tx, rx) = mpsc::channel();
    let report = scanner.run(&ChannelSink::new(tx)).unwrap();

    assert_eq!(report.checked, 26);
    assert_eq!(report.found, 1);
    assert!(!report.stopped);
    assert_eq!(report.found_by_kind.get(&LinkKind::Gift), Some(&1));
    assert_eq!(report.found_by_kind.get(&LinkKind::Vip), Some(&0));
    assert_eq!(scanner.state(), ScanState::Finished);

    let events: Vec<CoreEvent> = rx.try_iter().collect();
    let discovered: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            CoreEvent::Discovered(link) => Some(link.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(discovered.len(), 1);
    assert_eq!(discovered[0].kind, LinkKind::Gift);
    assert_eq!(discovered[0].url, server.url_str("/Gaaaaab"));
    assert_eq!(events.last(), Some(&CoreEvent::Finished));

    let progress: Vec<(u64, u64)> = events
        .iter()
        .filter_map(|event| match event {
            CoreEvent::Progress {
                completed, total, ..
            } => Some((*completed, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 26);
    assert!(progress.iter().all(|(_, total)| *total == 26));
    assert_eq!(progress.iter().map(|(done, _)| *done).max(), Some(26));

    // 404s are counted, not reported
    assert_eq!(scanner.stats().total(), 25);
}

#[test]
fn test_scan_classifies_each_link_kind() {
    let server = Server::run();
    for (path, target) in [
        ("/Gaaaaaa", "https://m.example/vip-invite-cashier?token=T1"),
        ("/Gaaaaab", "https://m.example/vip-trialcard?recordId=9"),
        ("/Gaaaaac", "https://m.example/gift-receive?d=1"),
        ("/Gaaaaad", "https://m.example/song?id=1"),
    ] {
        server.expect(
            Expectation::matching(request::method_path("HEAD", path))
                .respond_with(status_code(301).insert_header("Location", target)),
        );
    }

    let scanner = Scanner::from_config(scan_config(&server, "aaaaaa", "aaaaad", 2)).unwrap();
    let report = scanner.run(&giftlink_scout::LogSink).unwrap();

    assert_eq!(report.checked, 4);
    assert_eq!(report.found, 3);
    for kind in [LinkKind::Vip, LinkKind::Audio, LinkKind::Gift] {
        assert_eq!(report.found_by_kind.get(&kind), Some(&1), "{}", kind);
    }
}

struct StopOnDiscovery<'a> {
    scanner: &'a Scanner,
}

impl EventSink for StopOnDiscovery<'_> {
    fn on_discovered(&self, _link: giftlink_scout::DiscoveredLink) {
        assert!(self.scanner.stop());
    }
}

#[test]
fn test_stop_prevents_new_probes() {
    let server = Server::run();
    // Only the first code may be requested.
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/Gaaaaaa"))
            .times(1)
            .respond_with(
                status_code(302).insert_header("Location", "https://m.example/gift-receive?d=1"),
            ),
    );

    let scanner = Scanner::from_config(scan_config(&server, "aaaaaa", "aaaaaz", 1)).unwrap();
    let report = scanner.run(&StopOnDiscovery { scanner: &scanner }).unwrap();

    assert!(report.stopped);
    assert_eq!(report.checked, 1);
    assert_eq!(report.found, 1);
    assert_eq!(scanner.state(), ScanState::Finished);
    assert!(!scanner.stop());
}

struct PauseOnDiscovery<'a> {
    scanner: &'a Scanner,
}

impl EventSink for PauseOnDiscovery<'_> {
    fn on_discovered(&self, _link: giftlink_scout::DiscoveredLink) {
        assert!(self.scanner.pause());
    }
}

#[test]
fn test_pause_holds_workers_until_resume() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/Gaaaaaa")).respond_with(
            status_code(302).insert_header("Location", "https://m.example/gift-receive?d=1"),
        ),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method("HEAD"),
            request::path(not(eq("/Gaaaaaa"))),
        ])
        .times(25)
        .respond_with(status_code(404)),
    );

    let scanner = Scanner::from_config(scan_config(&server, "aaaaaa", "aaaaaz", 1)).unwrap();
    let (paused_state, held, resumed, report) = thread::scope(|s| {
        let handle = s.spawn(|| scanner.run(&PauseOnDiscovery { scanner: &scanner }));

        let deadline = Instant::now() + Duration::from_secs(10);
        while scanner.state() != ScanState::Paused && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        let paused_state = scanner.state();
        let mut held = Vec::new();
        for _ in 0..3 {
            thread::sleep(Duration::from_millis(100));
            held.push(scanner.checked());
        }

        // Resume (or stop) before asserting so a failure cannot leave the run blocked
        let resumed = scanner.resume();
        if !resumed {
            scanner.stop();
        }
        (paused_state, held, resumed, handle.join().unwrap())
    });

    assert_eq!(paused_state, ScanState::Paused);
    assert_eq!(held, vec![1, 1, 1]);
    assert!(resumed);

    let report = report.unwrap();
    assert!(!report.stopped);
    assert_eq!(report.checked, 26);
    assert_eq!(report.found, 1);
    assert_eq!(scanner.state(), ScanState::Finished);
}

#[test]
fn test_control_calls_outside_a_run() {
    let server = Server::run();
    let scanner = Scanner::from_config(scan_config(&server, "aaaaaa", "aaaaaa", 1)).unwrap();
    assert_eq!(scanner.state(), ScanState::Idle);
    assert!(!scanner.pause());
    assert!(!scanner.resume());
    assert!(!scanner.stop());
    assert_eq!(scanner.checked(), 0);
    assert_eq!(scanner.elapsed(), Duration::ZERO);
}

#[test]
fn test_second_run_is_rejected() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/Gaaaaaa"))
            .times(1)
            .respond_with(status_code(404)),
    );
    let scanner = Scanner::from_config(scan_config(&server, "aaaaaa", "aaaaaa", 1)).unwrap();
    scanner.run(&giftlink_scout::LogSink).unwrap();
    assert!(matches!(
        scanner.run(&giftlink_scout::LogSink),
        Err(giftlink_scout::ScanError::AlreadyStarted)
    ));
}

#[test]
fn test_throttle_pauses_once_per_interval() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method("HEAD"))
            .times(10)
            .respond_with(status_code(404)),
    );

    let config = ScanConfig {
        throttle_every: 3,
        throttle_sleep: Duration::from_millis(10),
        ..scan_config(&server, "aaaaaa", "aaaaaj", 4)
    };
    let scanner = Scanner::from_config(config).unwrap();
    let report = scanner.run(&giftlink_scout::LogSink).unwrap();

    assert_eq!(report.checked, 10);
    // floor(10 / 3)
    assert_eq!(scanner.throttle_pauses(), 3);
}

#[test]
fn test_reversed_range_probes_nothing() {
    let server = Server::run();
    let scanner = Scanner::from_config(scan_config(&server, "aaaaab", "aaaaaa", 4)).unwrap();
    let report = scanner.run(&giftlink_scout::LogSink).unwrap();
    assert_eq!(report.checked, 0);
    assert_eq!(report.found, 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ScanConfig {
        start_suffix: "short".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        Scanner::from_config(config),
        Err(giftlink_scout::ScanError::Config(_))
    ));
}
