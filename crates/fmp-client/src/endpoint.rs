//! Endpoint profiles: where the metrics live and what the fields are called.
//!
//! The provider has moved both over time, so neither is hardcoded in the client.

use formula_core::{ConfigError, FetchFailure, RawMetrics};
use reqwest::Url;
use serde_json::{Map, Value};

/// How the ticker is passed to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerPlacement {
    /// `/path/{ticker}`
    PathSegment,
    /// `/path?{param}={ticker}`
    QueryParam(String),
}

/// Field names to read from the first element of the response array.
/// Each metric accepts a list of candidates; the first present one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    pub earnings_yield: Vec<String>,
    pub return_on_capital: Vec<String>,
    pub report_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub path: String,
    pub ticker: TickerPlacement,
    pub fields: FieldMap,
}

impl Endpoint {
    pub const KEY_METRICS_TTM: &'static str = "key-metrics-ttm";
    pub const RATIOS_TTM: &'static str = "ratios-ttm";
    pub const CUSTOM: &'static str = "custom";

    /// `key-metrics-ttm?symbol=`, reporting `earningsYieldTTM` and ROIC.
    pub fn key_metrics_ttm() -> Self {
        Self {
            name: Self::KEY_METRICS_TTM.to_string(),
            path: "api/v3/key-metrics-ttm".to_string(),
            ticker: TickerPlacement::QueryParam("symbol".to_string()),
            fields: FieldMap {
                earnings_yield: vec!["earningsYieldTTM".to_string()],
                return_on_capital: vec!["returnOnInvestedCapitalTTM".to_string()],
                report_date: "date".to_string(),
            },
        }
    }

    /// `ratios-ttm/{ticker}`, reporting earnings yield and ROCE.
    pub fn ratios_ttm() -> Self {
        Self {
            name: Self::RATIOS_TTM.to_string(),
            path: "api/v3/ratios-ttm".to_string(),
            ticker: TickerPlacement::PathSegment,
            fields: FieldMap {
                earnings_yield: vec!["earningsYield".to_string(), "earningYield".to_string()],
                return_on_capital: vec!["returnOnCapitalEmployed".to_string()],
                report_date: "date".to_string(),
            },
        }
    }

    pub fn custom(
        path: impl Into<String>,
        ticker_param: Option<String>,
        earnings_yield_field: impl Into<String>,
        return_on_capital_field: impl Into<String>,
    ) -> Self {
        Self {
            name: Self::CUSTOM.to_string(),
            path: path.into(),
            ticker: match ticker_param {
                Some(param) => TickerPlacement::QueryParam(param),
                None => TickerPlacement::PathSegment,
            },
            fields: FieldMap {
                earnings_yield: vec![earnings_yield_field.into()],
                return_on_capital: vec![return_on_capital_field.into()],
                report_date: "date".to_string(),
            },
        }
    }

    /// Resolve one of the built-in profiles by name.
    pub fn from_profile(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            Self::KEY_METRICS_TTM => Ok(Self::key_metrics_ttm()),
            Self::RATIOS_TTM => Ok(Self::ratios_ttm()),
            other => Err(ConfigError::Invalid(format!(
                "unknown endpoint profile '{}' (expected {} or {})",
                other,
                Self::KEY_METRICS_TTM,
                Self::RATIOS_TTM
            ))),
        }
    }

    /// URL without the query string. A path-segment ticker is percent-encoded,
    /// so `BRK#B` is sent as `BRK%23B` rather than truncated.
    pub fn url(&self, base_url: &str, ticker: &str) -> Result<Url, FetchFailure> {
        let invalid = |reason: String| {
            FetchFailure::Network(format!("invalid base URL '{}': {}", base_url, reason))
        };

        let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| invalid("cannot carry a path".to_string()))?;
            segments
                .pop_if_empty()
                .extend(self.path.split('/').filter(|s| !s.is_empty()));
            if self.ticker == TickerPlacement::PathSegment {
                segments.push(ticker);
            }
        }
        Ok(url)
    }

    /// Turn a decoded response body into metrics for `ticker`.
    pub fn extract(&self, ticker: &str, body: Value) -> Result<RawMetrics, FetchFailure> {
        let items = match body {
            Value::Array(items) => items,
            Value::Object(map) => {
                return Err(match provider_message(&map) {
                    Some(msg) => classify_provider_message(msg),
                    None => FetchFailure::Parse("expected a JSON array, got an object".to_string()),
                });
            }
            other => {
                return Err(FetchFailure::Parse(format!(
                    "expected a JSON array, got {}",
                    json_kind(&other)
                )))
            }
        };

        let latest = match items.into_iter().next() {
            Some(Value::Object(obj)) => obj,
            Some(other) => {
                return Err(FetchFailure::Parse(format!(
                    "expected an object as first element, got {}",
                    json_kind(&other)
                )))
            }
            None => return Err(FetchFailure::EmptyResponse),
        };

        let earnings_yield = first_number(&latest, &self.fields.earnings_yield);
        let return_on_capital = first_number(&latest, &self.fields.return_on_capital);

        if earnings_yield.is_none() && return_on_capital.is_none() {
            return Err(FetchFailure::MissingFields(format!(
                "none of [{}] or [{}]",
                self.fields.earnings_yield.join(", "),
                self.fields.return_on_capital.join(", ")
            )));
        }

        Ok(RawMetrics {
            ticker: ticker.to_string(),
            earnings_yield,
            return_on_capital,
            report_date: latest
                .get(&self.fields.report_date)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
    }
}

/// `{"Error Message": "..."}` is how the provider reports failures in-band.
pub(crate) fn provider_message(map: &Map<String, Value>) -> Option<&str> {
    map.get("Error Message")
        .or_else(|| map.get("error"))
        .and_then(|v| v.as_str())
}

pub(crate) fn classify_provider_message(msg: &str) -> FetchFailure {
    let lower = msg.to_ascii_lowercase();
    if lower.contains("api key") || lower.contains("apikey") {
        FetchFailure::Unauthorized(msg.to_string())
    } else {
        FetchFailure::Provider(msg.to_string())
    }
}

fn first_number(obj: &Map<String, Value>, candidates: &[String]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|key| obj.get(key).and_then(|v| v.as_f64()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
