//! Gift card status analysis.
//!
//! Pipeline per link: resolve the short link, check the target is a gift
//! landing page, pull `d`/`p`/`userid` from it, post them encrypted to the
//! gift status endpoint and classify the answer.

use log::debug;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;

use super::result::{AnalysisResult, GiftRecord, GiftStatus, SuccessDetail};
use super::{json_i64, probe_failure};
use crate::config::{AnalysisConfig, ApiEndpoints, API_SUCCESS_CODE, GIFT_MARKER};
use crate::crypto::encrypt_params;
use crate::error_handling::{
    categorize_reqwest_error, categorize_status, ErrorCategory, InitializationError,
};
use crate::fetch::{classify_target, GiftParams, LinkKind, LinkResolver, RedirectOutcome};
use crate::initialization::{init_api_client, init_redirect_client};
use crate::utils::{format_beijing_time, now_ms, sanitize_message};

/// Plaintext body of a gift status request, before encryption.
#[derive(Serialize)]
struct GiftRequest<'a> {
    d: &'a str,
    p: &'a str,
    userid: &'a str,
    app_version: &'a str,
    dlt: &'a str,
    csrf_token: &'a str,
}

impl<'a> From<&'a GiftParams> for GiftRequest<'a> {
    fn from(params: &'a GiftParams) -> Self {
        Self {
            d: &params.d,
            p: &params.p,
            userid: &params.userid,
            app_version: &params.app_version,
            dlt: &params.dlt,
            csrf_token: "",
        }
    }
}

/// Why a 200 response could not be turned into a `GiftRecord`.
#[derive(Debug, Clone, PartialEq)]
enum ResponseFailure {
    /// API business layer: empty body, error code, missing data, bad JSON
    Business {
        category: ErrorCategory,
        message: String,
        api_code: Option<i64>,
    },
    /// The payload is JSON but not shaped as expected
    Parsing(String),
}

impl ResponseFailure {
    fn business(category: ErrorCategory, message: impl Into<String>) -> Self {
        ResponseFailure::Business {
            category,
            message: message.into(),
            api_code: None,
        }
    }

    fn into_result(self, short_url: &str) -> AnalysisResult {
        match self {
            ResponseFailure::Business {
                category,
                message,
                api_code,
            } => AnalysisResult::ApiException {
                short_url: short_url.to_string(),
                category,
                message,
                api_code,
            },
            ResponseFailure::Parsing(message) => AnalysisResult::error(
                short_url,
                ErrorCategory::ResponseParsing,
                format!("Response parsing failed: {}", message),
            ),
        }
    }
}

/// Derives the claim state of a gift.
///
/// Expiry is checked first, so an expired card with copies left is still
/// `Expired`.
pub fn classify_gift(total_count: i64, used_count: i64, expire_time: i64, now_ms: i64) -> GiftStatus {
    if expire_time > 0 && now_ms > expire_time {
        GiftStatus::Expired
    } else if used_count >= total_count {
        GiftStatus::Claimed
    } else if total_count > used_count {
        GiftStatus::Available
    } else {
        GiftStatus::Unknown
    }
}

/// Looks up gift card status through the encrypted gift endpoint.
#[derive(Debug, Clone)]
pub struct GiftAnalyzer {
    resolver: LinkResolver,
    api: Client,
    endpoints: ApiEndpoints,
}

impl GiftAnalyzer {
    /// `resolver` must not follow redirects; `api` carries the API headers.
    pub fn new(resolver: LinkResolver, api: Client, endpoints: ApiEndpoints) -> Self {
        Self {
            resolver,
            api,
            endpoints,
        }
    }

    /// Builds both clients from `config`.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, InitializationError> {
        let probe = init_redirect_client(config.api_timeout_secs, &config.user_agent)?;
        let api = init_api_client(config.api_timeout_secs, &config.user_agent)?;
        Ok(Self::new(
            LinkResolver::new(probe),
            api,
            config.endpoints.clone(),
        ))
    }

    /// Analyzes one short link. Never panics on remote input; every failure
    /// is returned as a classified result.
    pub fn analyze(&self, short_url: &str) -> AnalysisResult {
        let location = match self.resolver.resolve(short_url) {
            RedirectOutcome::Redirect(location) => location,
            other => return probe_failure(short_url, other),
        };

        if !location.contains(GIFT_MARKER) {
            let hint = classify_target(&location).filter(|kind| *kind != LinkKind::Gift);
            let message = match hint {
                Some(kind) => format!("Not a gift link; looks like a {} link", kind),
                None => "Not a gift link".to_string(),
            };
            return AnalysisResult::NotApplicable {
                short_url: short_url.to_string(),
                redirect_url: location,
                hint,
                message,
            };
        }

        let params = match GiftParams::from_target(&location) {
            Ok(params) => params,
            Err(e) => {
                return AnalysisResult::error(
                    short_url,
                    ErrorCategory::ParameterExtraction,
                    e.to_string(),
                )
            }
        };

        match self.query(short_url, &params) {
            Ok(record) => AnalysisResult::Success {
                short_url: short_url.to_string(),
                redirect_url: location,
                detail: SuccessDetail::Gift(record),
            },
            Err(result) => result,
        }
    }

    fn query(&self, short_url: &str, params: &GiftParams) -> Result<GiftRecord, AnalysisResult> {
        let encrypted = encrypt_params(&GiftRequest::from(params)).map_err(|e| {
            AnalysisResult::error(short_url, ErrorCategory::ParameterExtraction, e.to_string())
        })?;

        let response = self
            .api
            .post(&self.endpoints.gift_status)
            .form(&encrypted)
            .send()
            .map_err(|e| {
                let category = categorize_reqwest_error(&e);
                debug!("Gift API request for {} failed: {}", short_url, e);
                AnalysisResult::api_exception(short_url, category, category.as_str().to_string())
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let category = categorize_status(status);
            return Err(AnalysisResult::api_exception(
                short_url,
                category,
                format!("Gift API returned HTTP {}", status),
            ));
        }

        let body = response.text().map_err(|e| {
            let category = categorize_reqwest_error(&e);
            AnalysisResult::api_exception(short_url, category, format!("Reading body failed: {}", e))
        })?;

        parse_gift_response(&body, params, now_ms()).map_err(|f| f.into_result(short_url))
    }
}

/// Business checks and field extraction for a gift status response body.
fn parse_gift_response(body: &str, params: &GiftParams, now_ms: i64) -> Result<GiftRecord, ResponseFailure> {
    if body.trim().is_empty() {
        return Err(ResponseFailure::business(
            ErrorCategory::EmptyResponse,
            "Gift API returned an empty response",
        ));
    }
    let value: Value = serde_json::from_str(body).map_err(|e| {
        ResponseFailure::business(
            ErrorCategory::MalformedJson,
            format!("Gift API returned malformed JSON: {}", e),
        )
    })?;
    let Some(root) = value.as_object().filter(|o| !o.is_empty()) else {
        return Err(ResponseFailure::business(
            ErrorCategory::EmptyResponse,
            "Gift API returned an empty response",
        ));
    };

    if let Some(code) = root.get("code") {
        let code_num = json_i64(code);
        if code_num != Some(API_SUCCESS_CODE) {
            let message = root
                .get("message")
                .and_then(Value::as_str)
                .map(sanitize_message)
                .unwrap_or_else(|| "unknown API error".to_string());
            return Err(ResponseFailure::Business {
                category: ErrorCategory::BusinessError,
                message: format!("API business error ({}): {}", code, message),
                api_code: code_num,
            });
        }
    }

    let Some(data) = root.get("data") else {
        return Err(ResponseFailure::business(
            ErrorCategory::MissingData,
            "Gift API response has no data field",
        ));
    };
    if !data.is_object() {
        return Err(ResponseFailure::Parsing(format!(
            "data is not an object: {}",
            data
        )));
    }

    let record = &data["record"];
    let sku = &data["sku"];
    let sender = &data["sender"];

    let expire_time = number_field(record, "expireTime")?;
    let total_count = number_field(record, "totalCount")?;
    let used_count = number_field(record, "usedCount")?;
    let price = price_field(sku)?;

    let status = classify_gift(total_count, used_count, expire_time, now_ms);
    let available_count = (total_count - used_count).max(0);
    let status_text = match status {
        GiftStatus::Claimed => "fully claimed".to_string(),
        GiftStatus::Available => format!("available ({}/{})", available_count, total_count),
        GiftStatus::Expired | GiftStatus::Unknown => status.as_str().to_string(),
    };

    Ok(GiftRecord {
        status,
        status_text,
        sender_id: params.userid.clone(),
        sender_name: sender["nickName"].as_str().unwrap_or_default().to_string(),
        gift_data: params.d.clone(),
        gift_type: sku["goods"].as_str().unwrap_or_default().to_string(),
        price,
        total_count,
        used_count,
        available_count,
        expire_time,
        expire_date: if expire_time > 0 {
            format_beijing_time(expire_time)
        } else {
            String::new()
        },
        is_expired: expire_time > 0 && now_ms > expire_time,
    })
}

/// Integer field of `parent`; absent or null reads as zero.
fn number_field(parent: &Value, key: &str) -> Result<i64, ResponseFailure> {
    match parent.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => json_i64(value)
            .ok_or_else(|| ResponseFailure::Parsing(format!("{} is not a number: {}", key, value))),
    }
}

/// `sku.price`, sent either as a number or as a numeric string.
fn price_field(sku: &Value) -> Result<f64, ResponseFailure> {
    match sku.get("price") {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or_default()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| ResponseFailure::Parsing(format!("price is not a number: {}", s))),
        Some(other) => Err(ResponseFailure::Parsing(format!(
            "price is not a number: {}",
            other
        ))),
    }
}
