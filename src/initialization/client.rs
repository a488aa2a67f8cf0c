//! HTTP client initialization.
//!
//! This module provides functions to initialize the blocking HTTP clients used
//! by the worker threads. `reqwest::blocking::Client` pools connections
//! internally and is cheap to clone, so one client is built per task and
//! shared by all of its workers.

use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};

use crate::config::API_REFERER;
use crate::error_handling::InitializationError;

/// Initializes a client for short-link probing.
///
/// Redirects are disabled so the `Location` header of the first hop can be
/// inspected directly.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_redirect_client(
    timeout_secs: u64,
    user_agent: &str,
) -> Result<Client, InitializationError> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Initializes a client for the remote API.
///
/// Sends browser-like `Accept`, `Accept-Language` and `Referer` headers on
/// every request; the gift endpoint refuses requests without a Referer from
/// its own origin.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_api_client(
    timeout_secs: u64,
    user_agent: &str,
) -> Result<Client, InitializationError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
    );
    headers.insert(REFERER, HeaderValue::from_static(API_REFERER));

    let client = ClientBuilder::new()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}
