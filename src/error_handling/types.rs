//! Error type definitions.
//!
//! This module defines the initialization errors and the failure taxonomy
//! shared by the scanner and both analyzers.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Layer of the stack a failure originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorLayer {
    /// Transport failed before an HTTP status was seen
    Network,
    /// A non-success HTTP status
    Http,
    /// The short link did not behave like a campaign link
    Protocol,
    /// The API answered but the body is unusable
    Business,
    /// Local parameter extraction or response parsing
    Local,
    /// Anything unanticipated, caught at the per-item boundary
    System,
}

/// Categories of failures that can occur while probing or analyzing a link.
///
/// Every failure is reduced to one of these before it reaches a caller, either
/// inside an `AnalysisResult` or as a scan log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    // Network errors
    ConnectionError,
    Timeout,
    TlsError,
    TooManyRedirects,
    RequestError,
    // HTTP status errors
    NotFound,        // 404
    Forbidden,       // 403
    RateLimited,     // 429
    ServerError,     // 5xx
    HttpError,       // any other non-success status
    // Protocol errors
    MissingLocation, // 301/302 without a Location header
    UnrecognizedTarget,
    // API business errors
    EmptyResponse,
    BusinessError,
    MissingData,
    MalformedJson,
    // Local processing errors
    ParameterExtraction,
    ResponseParsing,
    ProbeExhausted,
    // System errors
    Unexpected,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::ConnectionError => "Connection failed",
            ErrorCategory::Timeout => "Request timed out",
            ErrorCategory::TlsError => "TLS/certificate error",
            ErrorCategory::TooManyRedirects => "Too many redirects",
            ErrorCategory::RequestError => "Request error",
            ErrorCategory::NotFound => "Not Found (404)",
            ErrorCategory::Forbidden => "Forbidden (403)",
            ErrorCategory::RateLimited => "Too many requests (429)",
            ErrorCategory::ServerError => "Server error (5xx)",
            ErrorCategory::HttpError => "HTTP error",
            ErrorCategory::MissingLocation => "Redirect without Location header",
            ErrorCategory::UnrecognizedTarget => "Redirect target not recognized",
            ErrorCategory::EmptyResponse => "Empty API response",
            ErrorCategory::BusinessError => "API business error",
            ErrorCategory::MissingData => "API response missing data",
            ErrorCategory::MalformedJson => "Malformed JSON response",
            ErrorCategory::ParameterExtraction => "Parameter extraction failed",
            ErrorCategory::ResponseParsing => "Response parsing failed",
            ErrorCategory::ProbeExhausted => "All detail endpoints failed",
            ErrorCategory::Unexpected => "Unexpected system error",
        }
    }

    /// The layer of the stack this category belongs to.
    pub fn layer(&self) -> ErrorLayer {
        match self {
            ErrorCategory::ConnectionError
            | ErrorCategory::Timeout
            | ErrorCategory::TlsError
            | ErrorCategory::TooManyRedirects
            | ErrorCategory::RequestError => ErrorLayer::Network,
            ErrorCategory::NotFound
            | ErrorCategory::Forbidden
            | ErrorCategory::RateLimited
            | ErrorCategory::ServerError
            | ErrorCategory::HttpError => ErrorLayer::Http,
            ErrorCategory::MissingLocation | ErrorCategory::UnrecognizedTarget => {
                ErrorLayer::Protocol
            }
            ErrorCategory::EmptyResponse
            | ErrorCategory::BusinessError
            | ErrorCategory::MissingData
            | ErrorCategory::MalformedJson => ErrorLayer::Business,
            ErrorCategory::ParameterExtraction
            | ErrorCategory::ResponseParsing
            | ErrorCategory::ProbeExhausted => ErrorLayer::Local,
            ErrorCategory::Unexpected => ErrorLayer::System,
        }
    }
}
