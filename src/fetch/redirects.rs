//! Single-hop redirect resolution.
//!
//! A short link answers with 301/302 and a `Location` header pointing at the
//! campaign landing page. Only that first hop matters, so the client used here
//! must have redirects disabled (see `init_redirect_client`).

use log::debug;
use reqwest::blocking::Client;
use reqwest::Url;

use crate::config::HTTP_STATUS_NOT_FOUND;
use crate::error_handling::{categorize_reqwest_error, ErrorCategory};

/// Result of probing one short link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// 301/302 with a `Location` header (absolute URL).
    Redirect(String),
    /// 301/302 without a `Location` header.
    MissingLocation(u16),
    /// 404.
    NotFound,
    /// Any other non-redirect status.
    Invalid(u16),
    /// The request failed before a status was received.
    NetworkError(ErrorCategory),
}

impl RedirectOutcome {
    /// The redirect target, if the probe produced one.
    pub fn location(&self) -> Option<&str> {
        match self {
            RedirectOutcome::Redirect(location) => Some(location),
            _ => None,
        }
    }
}

/// Probes short links with a single HEAD request each.
///
/// Cloning is cheap: the underlying client is reference counted and pools
/// connections across all clones, so one resolver is shared by every worker
/// of a task.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    client: Client,
}

impl LinkResolver {
    /// Wraps a client. The client must not follow redirects.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Probes `url` and reports the first hop.
    ///
    /// Never returns an error: transport failures become
    /// `RedirectOutcome::NetworkError` with their category.
    pub fn resolve(&self, url: &str) -> RedirectOutcome {
        let response = match self.client.head(url).send() {
            Ok(response) => response,
            Err(e) => {
                let category = categorize_reqwest_error(&e);
                debug!("Probe of {} failed ({}): {}", url, category, e);
                return RedirectOutcome::NetworkError(category);
            }
        };

        let status = response.status().as_u16();
        match status {
            301 | 302 => match response.headers().get(reqwest::header::LOCATION) {
                Some(location) => {
                    let location = String::from_utf8_lossy(location.as_bytes());
                    RedirectOutcome::Redirect(absolutize(url, &location))
                }
                None => RedirectOutcome::MissingLocation(status),
            },
            HTTP_STATUS_NOT_FOUND => RedirectOutcome::NotFound,
            _ => RedirectOutcome::Invalid(status),
        }
    }
}

/// Joins a relative `Location` against the probed URL; absolute values pass through.
fn absolutize(base: &str, location: &str) -> String {
    Url::parse(location)
        .or_else(|_| Url::parse(base).and_then(|base| base.join(location)))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| location.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialization::init_redirect_client;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn resolver() -> LinkResolver {
        LinkResolver::new(init_redirect_client(5, "test-agent").expect("client"))
    }

    #[test]
    fn test_redirect_with_location() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/Gaaaaab")).respond_with(
                status_code(302).insert_header(
                    "Location",
                    "https://music.163.com/st/gift-receive?d=abc&p=1",
                ),
            ),
        );

        let outcome = resolver().resolve(&server.url_str("/Gaaaaab"));
        assert_eq!(
            outcome,
            RedirectOutcome::Redirect("https://music.163.com/st/gift-receive?d=abc&p=1".into())
        );
        assert!(outcome.location().is_some());
    }

    #[test]
    fn test_relative_location_is_joined() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/Gaaaaac"))
                .respond_with(status_code(301).insert_header("Location", "/landing/vip-trialcard")),
        );

        let outcome = resolver().resolve(&server.url_str("/Gaaaaac"));
        assert_eq!(
            outcome,
            RedirectOutcome::Redirect(server.url_str("/landing/vip-trialcard"))
        );
    }

    #[test]
    fn test_non_ascii_location_is_kept() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/Gaaaaae")).respond_with(
                status_code(302).insert_header(
                    "Location",
                    "https://music.163.com/st/gift-receive?d=礼物&p=1",
                ),
            ),
        );

        let outcome = resolver().resolve(&server.url_str("/Gaaaaae"));
        let location = outcome.location().expect("redirect").to_string();
        assert!(location.starts_with("https://music.163.com/st/gift-receive?d="));
        assert!(location.ends_with("&p=1"));
        assert_ne!(location, server.url_str("/Gaaaaae"));
    }

    #[test]
    fn test_redirect_without_location() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/Gaaaaad"))
                .respond_with(status_code(302)),
        );

        assert_eq!(
            resolver().resolve(&server.url_str("/Gaaaaad")),
            RedirectOutcome::MissingLocation(302)
        );
    }

    #[test]
    fn test_not_found_and_other_statuses() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/missing"))
                .respond_with(status_code(404)),
        );
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/ok"))
                .respond_with(status_code(200)),
        );
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/temp"))
                .respond_with(status_code(307).insert_header("Location", "/elsewhere")),
        );

        let resolver = resolver();
        assert_eq!(
            resolver.resolve(&server.url_str("/missing")),
            RedirectOutcome::NotFound
        );
        assert_eq!(
            resolver.resolve(&server.url_str("/ok")),
            RedirectOutcome::Invalid(200)
        );
        // Only 301 and 302 count as short-link redirects
        assert_eq!(
            resolver.resolve(&server.url_str("/temp")),
            RedirectOutcome::Invalid(307)
        );
    }

    #[test]
    fn test_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let outcome = resolver().resolve(&format!("http://127.0.0.1:{}/Gaaaaaa", port));
        assert_eq!(
            outcome,
            RedirectOutcome::NetworkError(ErrorCategory::ConnectionError)
        );
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("http://163cn.tv/Gabc", "https://x.y/z?q=1"),
            "https://x.y/z?q=1"
        );
        assert_eq!(
            absolutize("http://163cn.tv/Gabc", "/gift-receive?d=1"),
            "http://163cn.tv/gift-receive?d=1"
        );
    }
}
