//! Gift analysis against a local server playing both the short-link host and
//! the encrypted gift-status API.

use giftlink_scout::analysis::{GiftStatus, SuccessDetail};
use giftlink_scout::error_handling::ErrorCategory;
use giftlink_scout::initialization::{init_api_client, init_redirect_client};
use giftlink_scout::{
    run_analysis, run_routed_analysis, AnalysisResult, ApiEndpoints, ChannelSink, CoreEvent,
    GiftAnalyzer, LinkKind, LinkResolver, LogSink, TaskControl, VipChecker,
};
use httptest::{all_of, matchers::*, responders::*, Expectation, Server};
use serde_json::json;
use std::sync::mpsc;

const UA: &str = "giftlink-scout-test";
const FAR_FUTURE_MS: i64 = 4_102_444_800_000;

fn analyzer(server: &Server) -> GiftAnalyzer {
    let endpoints = ApiEndpoints {
        gift_status: server.url_str("/api/gift"),
        vip_detail: Vec::new(),
    };
    GiftAnalyzer::new(
        LinkResolver::new(init_redirect_client(2, UA).unwrap()),
        init_api_client(2, UA).unwrap(),
        endpoints,
    )
}

fn redirect_to(server: &Server, path: &'static str, target: &str) {
    server.expect(
        Expectation::matching(request::method_path("HEAD", path))
            .respond_with(status_code(302).insert_header("Location", target)),
    );
}

fn gift_target(server: &Server) -> String {
    server.url_str("/st/gift-receive?d=abc&p=1&userid=42")
}

fn expect_gift_api(server: &Server, responder: impl httptest::responders::Responder + 'static) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/api/gift"),
            request::body(matches("^params=.+&encSecKey=[0-9a-f]{1,256}$")),
        ])
        .respond_with(responder),
    );
}

#[test]
fn test_available_gift() {
    let server = Server::run();
    redirect_to(&server, "/Gaaaaab", &gift_target(&server));
    expect_gift_api(
        &server,
        json_encoded(json!({
            "code": 200,
            "data": {
                "record": {"expireTime": FAR_FUTURE_MS, "totalCount": 3, "usedCount": 1},
                "sku": {"price": "5.00", "goods": "Black Vinyl"},
                "sender": {"nickName": "alice"}
            }
        })),
    );

    let short = server.url_str("/Gaaaaab");
    match analyzer(&server).analyze(&short) {
        AnalysisResult::Success {
            short_url,
            redirect_url,
            detail: SuccessDetail::Gift(record),
        } => {
            assert_eq!(short_url, short);
            assert_eq!(redirect_url, gift_target(&server));
            assert_eq!(record.status, GiftStatus::Available);
            assert_eq!(record.available_count, 2);
            assert_eq!(record.sender_id, "42");
            assert_eq!(record.sender_name, "alice");
            assert_eq!(record.gift_data, "abc");
            assert_eq!(record.gift_type, "Black Vinyl");
            assert!((record.price - 5.0).abs() < f64::EPSILON);
            assert!(!record.is_expired);
            assert!(record.expire_date.ends_with("(Beijing Time)"));
        }
        other => panic!("expected gift success, got {:?}", other),
    }
}

#[test]
fn test_fully_claimed_gift() {
    let server = Server::run();
    redirect_to(&server, "/Gaaaaab", &gift_target(&server));
    expect_gift_api(
        &server,
        json_encoded(json!({
            "code": 200,
            "data": {"record": {"expireTime": FAR_FUTURE_MS, "totalCount": 2, "usedCount": 2}}
        })),
    );

    match analyzer(&server).analyze(&server.url_str("/Gaaaaab")) {
        AnalysisResult::Success {
            detail: SuccessDetail::Gift(record),
            ..
        } => {
            assert_eq!(record.status, GiftStatus::Claimed);
            assert_eq!(record.available_count, 0);
        }
        other => panic!("expected gift success, got {:?}", other),
    }
}

#[test]
fn test_api_business_error_keeps_code() {
    let server = Server::run();
    redirect_to(&server, "/Gaaaaab", &gift_target(&server));
    expect_gift_api(
        &server,
        json_encoded(json!({"code": 301, "message": "need login"})),
    );

    match analyzer(&server).analyze(&server.url_str("/Gaaaaab")) {
        AnalysisResult::ApiException {
            category,
            api_code,
            message,
            ..
        } => {
            assert_eq!(category, ErrorCategory::BusinessError);
            assert_eq!(api_code, Some(301));
            assert!(message.contains("need login"));
        }
        other => panic!("expected api exception, got {:?}", other),
    }
}

#[test]
fn test_api_http_failures() {
    for (status, expected) in [
        (403, ErrorCategory::Forbidden),
        (429, ErrorCategory::RateLimited),
        (500, ErrorCategory::ServerError),
    ] {
        let server = Server::run();
        redirect_to(&server, "/Gaaaaab", &gift_target(&server));
        expect_gift_api(&server, status_code(status));

        let result = analyzer(&server).analyze(&server.url_str("/Gaaaaab"));
        assert_eq!(result.status_name(), "api_exception", "HTTP {}", status);
        assert_eq!(result.category(), Some(expected), "HTTP {}", status);
    }
}

#[test]
fn test_empty_and_malformed_bodies() {
    for (body, expected) in [
        ("", ErrorCategory::EmptyResponse),
        ("{}", ErrorCategory::EmptyResponse),
        ("not json", ErrorCategory::MalformedJson),
        (r#"{"code": 200}"#, ErrorCategory::MissingData),
    ] {
        let server = Server::run();
        redirect_to(&server, "/Gaaaaab", &gift_target(&server));
        expect_gift_api(&server, status_code(200).body(body));

        let result = analyzer(&server).analyze(&server.url_str("/Gaaaaab"));
        assert_eq!(result.category(), Some(expected), "body {:?}", body);
    }
}

#[test]
fn test_non_gift_link_is_not_applicable() {
    let server = Server::run();
    redirect_to(
        &server,
        "/Gaaaaab",
        "https://m.example/vip-invite-cashier?token=T1",
    );

    match analyzer(&server).analyze(&server.url_str("/Gaaaaab")) {
        AnalysisResult::NotApplicable { hint, .. } => assert_eq!(hint, Some(LinkKind::Vip)),
        other => panic!("expected not applicable, got {:?}", other),
    }
}

#[test]
fn test_dead_short_link() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/Gaaaaab"))
            .respond_with(status_code(404)),
    );

    let result = analyzer(&server).analyze(&server.url_str("/Gaaaaab"));
    assert_eq!(result.status_name(), "invalid");
    assert_eq!(result.category(), Some(ErrorCategory::NotFound));
}

#[test]
fn test_batch_reports_every_link() {
    let server = Server::run();
    redirect_to(&server, "/Gaaaaab", &gift_target(&server));
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/Gaaaaac"))
            .respond_with(status_code(404)),
    );
    expect_gift_api(
        &server,
        json_encoded(json!({
            "code": 200,
            "data": {"record": {"expireTime": 1, "totalCount": 1, "usedCount": 0}}
        })),
    );

    let gift = analyzer(&server);
    let links = vec![server.url_str("/Gaaaaab"), server.url_str("/Gaaaaac")];
    let report = run_analysis(links, 2, &TaskControl::new(), &LogSink, |url| {
        gift.analyze(url)
    });

    assert_eq!(report.total, 2);
    assert_eq!(report.completed, 2);
    assert!(!report.cancelled);
    assert_eq!(report.count("success"), 1);
    assert_eq!(report.count("invalid"), 1);
}

#[test]
fn test_mixed_list_hands_vip_links_to_checker() {
    let server = Server::run();
    redirect_to(&server, "/Gaaaaab", &gift_target(&server));
    // Gift analyzer first, then the VIP checker after the handoff
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/Gaaaaac"))
            .times(2)
            .respond_with(
                status_code(302)
                    .insert_header("Location", "https://m.example/vip-invite-cashier?token=T1"),
            ),
    );
    // Already a VIP landing link, so it skips the gift analyzer
    redirect_to(
        &server,
        "/direct/vip-invite-cashier",
        "https://m.example/vip-invite-cashier?token=T2",
    );
    expect_gift_api(
        &server,
        json_encoded(json!({
            "code": 200,
            "data": {"record": {"expireTime": FAR_FUTURE_MS, "totalCount": 1, "usedCount": 0}}
        })),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/vip/detail"))
            .times(2)
            .respond_with(json_encoded(
                json!({"code": 200, "data": {"expireTime": FAR_FUTURE_MS}}),
            )),
    );

    let gift = analyzer(&server);
    let vip = VipChecker::new(
        LinkResolver::new(init_redirect_client(2, UA).unwrap()),
        init_api_client(2, UA).unwrap(),
        vec![server.url_str("/vip/detail")],
    );
    let links = vec![
        server.url_str("/Gaaaaab"),
        server.url_str("/Gaaaaac"),
        server.url_str("/direct/vip-invite-cashier?token=T2"),
    ];
    let (tx, rx) = mpsc::channel();
    let report = run_routed_analysis(
        links,
        2,
        &TaskControl::new(),
        &ChannelSink::new(tx),
        &gift,
        &vip,
    );

    assert_eq!(report.handed_off, 1);
    assert_eq!(report.gift.total, 2);
    assert_eq!(report.vip.total, 2);
    assert_eq!(report.vip.count("success"), 2);

    let events: Vec<CoreEvent> = rx.try_iter().collect();
    let results: Vec<AnalysisResult> = events
        .iter()
        .filter_map(|event| match event {
            CoreEvent::Result(result) => Some(result.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(AnalysisResult::is_success));
    let handed_off = results
        .iter()
        .find(|r| r.short_url() == server.url_str("/Gaaaaac"))
        .unwrap();
    assert!(matches!(
        handed_off,
        AnalysisResult::Success {
            detail: SuccessDetail::Vip(_),
            ..
        }
    ));
    assert_eq!(
        events.iter().filter(|e| **e == CoreEvent::Finished).count(),
        1
    );
    assert_eq!(events.last(), Some(&CoreEvent::Finished));
}
