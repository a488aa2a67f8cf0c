//! Error categorization.
//!
//! Maps `reqwest` failures and HTTP status codes onto `ErrorCategory`.

use std::error::Error as StdError;

use super::types::ErrorCategory;
use crate::config::{HTTP_STATUS_FORBIDDEN, HTTP_STATUS_NOT_FOUND, HTTP_STATUS_TOO_MANY_REQUESTS};

/// Categorizes a non-success HTTP status code.
pub fn categorize_status(status: u16) -> ErrorCategory {
    match status {
        HTTP_STATUS_FORBIDDEN => ErrorCategory::Forbidden,
        HTTP_STATUS_NOT_FOUND => ErrorCategory::NotFound,
        HTTP_STATUS_TOO_MANY_REQUESTS => ErrorCategory::RateLimited,
        s if s >= 500 => ErrorCategory::ServerError,
        _ => ErrorCategory::HttpError,
    }
}

/// Categorizes a `reqwest::Error` into an `ErrorCategory`.
///
/// Status-carrying errors are mapped by status first. TLS failures surface as
/// connect errors in reqwest, so the source chain is inspected before the
/// generic connect check.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorCategory {
    if let Some(status) = error.status() {
        return categorize_status(status.as_u16());
    }

    if error.is_timeout() {
        ErrorCategory::Timeout
    } else if error.is_redirect() {
        ErrorCategory::TooManyRedirects
    } else if is_tls_failure(error) {
        ErrorCategory::TlsError
    } else if error.is_connect() {
        ErrorCategory::ConnectionError
    } else {
        ErrorCategory::RequestError
    }
}

fn is_tls_failure(error: &reqwest::Error) -> bool {
    let mut source: Option<&dyn StdError> = Some(error);
    while let Some(err) = source {
        let message = err.to_string().to_lowercase();
        if message.contains("certificate") || message.contains("tls") || message.contains("ssl")
        {
            return true;
        }
        source = err.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_status() {
        assert_eq!(categorize_status(403), ErrorCategory::Forbidden);
        assert_eq!(categorize_status(404), ErrorCategory::NotFound);
        assert_eq!(categorize_status(429), ErrorCategory::RateLimited);
        assert_eq!(categorize_status(500), ErrorCategory::ServerError);
        assert_eq!(categorize_status(503), ErrorCategory::ServerError);
        assert_eq!(categorize_status(400), ErrorCategory::HttpError);
        assert_eq!(categorize_status(200), ErrorCategory::HttpError);
    }

    #[test]
    fn test_categorize_connection_refused() {
        // Bind then drop a listener so the port is very likely closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap();
        let error = client
            .get(format!("http://127.0.0.1:{}/", port))
            .send()
            .unwrap_err();
        assert_eq!(categorize_reqwest_error(&error), ErrorCategory::ConnectionError);
    }

    #[test]
    fn test_categorize_builder_error_as_request_error() {
        let client = reqwest::blocking::Client::new();
        let error = client.get("not a url").send().unwrap_err();
        assert_eq!(categorize_reqwest_error(&error), ErrorCategory::RequestError);
    }
}
