//! VIP invitation and trial card validity checks.
//!
//! The detail lookup has moved between hosts over time, so several endpoints
//! are probed in order and the first usable answer wins.

use log::debug;
use reqwest::blocking::Client;
use serde_json::Value;

use super::result::{AnalysisResult, SuccessDetail, VipRecord};
use super::{json_i64, probe_failure};
use crate::config::AnalysisConfig;
use crate::error_handling::{ErrorCategory, InitializationError};
use crate::fetch::{classify_target, LinkKind, LinkResolver, RedirectOutcome, VipParams};
use crate::initialization::{init_api_client, init_redirect_client};
use crate::utils::{format_beijing_time, now_ms, remaining_days};

/// Checks whether VIP invitation and trial-audio links are still valid.
#[derive(Debug, Clone)]
pub struct VipChecker {
    resolver: LinkResolver,
    api: Client,
    endpoints: Vec<String>,
}

impl VipChecker {
    /// `endpoints` are probed in order.
    pub fn new(resolver: LinkResolver, api: Client, endpoints: Vec<String>) -> Self {
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
            config.endpoints.vip_detail.clone(),
        ))
    }

    pub fn analyze(&self, short_url: &str) -> AnalysisResult {
        let location = match self.resolver.resolve(short_url) {
            RedirectOutcome::Redirect(location) => location,
            other => return probe_failure(short_url, other),
        };

        let kind = match classify_target(&location) {
            Some(kind @ (LinkKind::Vip | LinkKind::Audio)) => kind,
            hint => {
                let message = match hint {
                    Some(kind) => format!("Not a VIP link; looks like a {} link", kind),
                    None => "Not a VIP link".to_string(),
                };
                return AnalysisResult::NotApplicable {
                    short_url: short_url.to_string(),
                    redirect_url: location,
                    hint,
                    message,
                };
            }
        };

        let params = match VipParams::from_target(&location) {
            Ok(params) => params,
            Err(e) => {
                return AnalysisResult::error(
                    short_url,
                    ErrorCategory::ParameterExtraction,
                    e.to_string(),
                )
            }
        };

        for endpoint in &self.endpoints {
            if let Some(expire_time) = self.probe_endpoint(endpoint, &params) {
                let record = vip_record(expire_time, now_ms(), endpoint);
                let detail = match kind {
                    LinkKind::Audio => SuccessDetail::Audio(record),
                    _ => SuccessDetail::Vip(record),
                };
                return AnalysisResult::Success {
                    short_url: short_url.to_string(),
                    redirect_url: location,
                    detail,
                };
            }
        }

        AnalysisResult::error(
            short_url,
            ErrorCategory::ProbeExhausted,
            format!(
                "All {} detail endpoints failed to return an expiry",
                self.endpoints.len()
            ),
        )
    }

    /// Expiry reported by one endpoint, or `None` if it gave nothing usable.
    fn probe_endpoint(&self, endpoint: &str, params: &VipParams) -> Option<i64> {
        let response = match self.api.get(endpoint).query(&params.query()).send() {
            Ok(response) => response,
            Err(e) => {
                debug!("Detail endpoint {} failed: {}", endpoint, e);
                return None;
            }
        };
        let status = response.status().as_u16();
        if status != 200 {
            debug!("Detail endpoint {} returned HTTP {}", endpoint, status);
            return None;
        }
        match response.json::<Value>() {
            Ok(body) => extract_expire_time(&body),
            Err(e) => {
                debug!("Detail endpoint {} returned unreadable JSON: {}", endpoint, e);
                None
            }
        }
    }
}

/// First positive `expireTime` or `tokenExpireTime` in a non-empty `data` object.
fn extract_expire_time(body: &Value) -> Option<i64> {
    let data = body.get("data")?.as_object().filter(|d| !d.is_empty())?;
    ["expireTime", "tokenExpireTime"]
        .iter()
        .filter_map(|key| data.get(*key).and_then(json_i64))
        .find(|t| *t > 0)
}

fn vip_record(expire_time: i64, now_ms: i64, endpoint: &str) -> VipRecord {
    let is_valid = expire_time > now_ms;
    VipRecord {
        is_valid,
        expire_time,
        expire_date: format_beijing_time(expire_time),
        remaining_days: remaining_days(expire_time, now_ms),
        source_endpoint: endpoint.to_string(),
        status_text: if is_valid { "valid" } else { "expired" }.to_string(),
    }
}
