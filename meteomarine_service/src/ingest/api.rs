/// MeteoMarine weather API client
///
/// Retrieves station observations and daily forecasts from the upstream
/// REST service backing the dashboard.
///
/// Endpoints:
///   GET /donnees?limit=N  →  bare array of observation records
///   GET /previsions       →  {"status": "success", "data": [forecast records]}
///
/// The upstream service serializes missing floats as the bare token `NaN`,
/// which is not JSON. Bodies are sanitized (`NaN` → `null`) before parsing.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::logging::{self, DataSource};
use crate::model::{FetchError, ForecastRecord, WeatherRecord};

pub const OBSERVATIONS_PATH: &str = "/donnees";
pub const FORECASTS_PATH: &str = "/previsions";

/// Envelope status value marking a usable payload.
pub const STATUS_SUCCESS: &str = "success";

static NAN_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bNaN\b").expect("NaN token pattern is valid"));

// ============================================================================
// URL construction
// ============================================================================

/// `{base}/donnees`, with `?limit=N` when a limit is set.
pub fn build_observations_url(base_url: &str, limit: Option<u32>) -> String {
    let base = base_url.trim_end_matches('/');
    match limit {
        Some(n) => format!("{}{}?limit={}", base, OBSERVATIONS_PATH, n),
        None => format!("{}{}", base, OBSERVATIONS_PATH),
    }
}

/// `{base}/previsions`.
pub fn build_forecasts_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), FORECASTS_PATH)
}

// ============================================================================
// Body decoding
// ============================================================================

/// Replaces every standalone `NaN` token with `null`.
///
/// Only whole words match: `NaNa` or `xNaN` are left alone.
pub fn sanitize_nan(body: &str) -> Cow<'_, str> {
    NAN_TOKEN.replace_all(body, "null")
}

/// Pulls the record array out of a decoded body.
///
/// Accepts a bare array, or an object whose `status` is `"success"` and
/// whose `data` is an array.
pub fn extract_records(value: Value) -> Result<Vec<Value>, FetchError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut envelope) => {
            match envelope.get("status").and_then(Value::as_str) {
                Some(STATUS_SUCCESS) => {}
                Some(other) => {
                    return Err(FetchError::UnexpectedShape(format!(
                        "envelope status is {:?}",
                        other
                    )));
                }
                None => {
                    return Err(FetchError::UnexpectedShape(
                        "envelope has no status flag".to_string(),
                    ));
                }
            }
            match envelope.remove("data") {
                Some(Value::Array(items)) => Ok(items),
                Some(_) => Err(FetchError::UnexpectedShape(
                    "envelope data is not an array".to_string(),
                )),
                None => Err(FetchError::UnexpectedShape(
                    "envelope has no data array".to_string(),
                )),
            }
        }
        other => Err(FetchError::UnexpectedShape(format!(
            "expected an array or envelope, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Sanitizes, parses and decodes a whole batch. One bad record fails the
/// batch: views never show partial data.
pub fn parse_batch<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, FetchError> {
    let sanitized = sanitize_nan(body);
    let value: Value = serde_json::from_str(&sanitized)?;
    extract_records(value)?
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .map_err(|e| FetchError::Parse(format!("record {}: {}", i, e)))
        })
        .collect()
}

pub fn parse_observations(body: &str) -> Result<Vec<WeatherRecord>, FetchError> {
    parse_batch(body)
}

pub fn parse_forecasts(body: &str) -> Result<Vec<ForecastRecord>, FetchError> {
    parse_batch(body)
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Builds the blocking HTTP client used for every fetch.
pub fn build_client(config: &Config) -> Result<reqwest::blocking::Client, FetchError> {
    reqwest::blocking::Client::builder()
        .timeout(config.http_timeout())
        .user_agent(concat!("meteomarine/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FetchError::Transport(e.to_string()))
}

/// One GET, no retry. Non-2xx statuses are errors.
fn fetch_text(client: &reqwest::blocking::Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    Ok(response.text()?)
}

/// Fetch an observation batch.
///
/// The root view loads the whole batch (`limit = None`) for the map; the
/// Live Data view passes `config.observation_limit`.
pub fn fetch_observations(
    client: &reqwest::blocking::Client,
    config: &Config,
    limit: Option<u32>,
) -> Result<Vec<WeatherRecord>, FetchError> {
    let url = build_observations_url(&config.api_base_url, limit);
    logging::debug(DataSource::Observations, None, &format!("GET {}", url));

    fetch_text(client, &url)
        .and_then(|body| parse_observations(&body))
        .inspect_err(|e| logging::log_fetch_failure(DataSource::Observations, "fetch observations", e))
}

/// Fetch the daily forecasts for the Forecast and Alerts views.
pub fn fetch_forecasts(
    client: &reqwest::blocking::Client,
    config: &Config,
) -> Result<Vec<ForecastRecord>, FetchError> {
    let url = build_forecasts_url(&config.api_base_url);
    logging::debug(DataSource::Forecasts, None, &format!("GET {}", url));

    fetch_text(client, &url)
        .and_then(|body| parse_forecasts(&body))
        .inspect_err(|e| logging::log_fetch_failure(DataSource::Forecasts, "fetch forecasts", e))
}

/// HTTP client and settings bundled for the view loaders, which need an
/// owned, `Send` handle to move onto their worker thread.
#[derive(Debug, Clone)]
pub struct WeatherApi {
    client: reqwest::blocking::Client,
    config: Config,
}

impl WeatherApi {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn observations(&self, limit: Option<u32>) -> Result<Vec<WeatherRecord>, FetchError> {
        fetch_observations(&self.client, &self.config, limit)
    }

    pub fn forecasts(&self) -> Result<Vec<ForecastRecord>, FetchError> {
        fetch_forecasts(&self.client, &self.config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValue;

    #[test]
    fn test_build_urls() {
        assert_eq!(
            build_observations_url("https://api.example.org/", Some(20)),
            "https://api.example.org/donnees?limit=20"
        );
        assert_eq!(
            build_observations_url("https://api.example.org", None),
            "https://api.example.org/donnees"
        );
        assert_eq!(
            build_forecasts_url("https://api.example.org"),
            "https://api.example.org/previsions"
        );
    }

    #[test]
    fn test_sanitize_nan_only_replaces_whole_tokens() {
        assert_eq!(
            sanitize_nan(r#"{"a": NaN, "b": [NaN,1]}"#),
            r#"{"a": null, "b": [null,1]}"#
        );
        assert_eq!(sanitize_nan("NaNa xNaN"), "NaNa xNaN");
        assert!(matches!(sanitize_nan("[1,2]"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_nan_field_parses_as_null() {
        let body = r#"[{"Station": "SM 1", "AIR TEMPERATURE": NaN, "HUMIDITY": 80}]"#;
        let records = parse_observations(body).expect("NaN must be sanitized");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].air_temperature, None);
        assert_eq!(records[0].humidity, Some(FieldValue::Number(80.0)));
    }

    #[test]
    fn test_success_envelope_is_unwrapped() {
        let body = r#"{"status": "success", "data": [{"days": "Lundi", "precipitation_Risk": "10%", "WIND": NaN}]}"#;
        let records = parse_forecasts(body).expect("envelope should decode");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].days.as_deref(), Some("Lundi"));
        assert_eq!(records[0].wind, None);
    }

    #[test]
    fn test_failed_envelope_is_rejected() {
        let body = r#"{"status": "error", "data": []}"#;
        assert!(matches!(
            parse_forecasts(body),
            Err(FetchError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_envelope_without_array_is_rejected() {
        for body in [
            r#"{"status": "success"}"#,
            r#"{"status": "success", "data": {"days": "Lundi"}}"#,
            r#"{"data": []}"#,
            r#""hello""#,
            "null",
        ] {
            assert!(
                matches!(parse_observations(body), Err(FetchError::UnexpectedShape(_))),
                "{body} should be an unexpected shape"
            );
        }
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        assert!(matches!(
            parse_observations("<html>502 Bad Gateway</html>"),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            parse_observations("[{\"Station\": \"SM 1\""),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_one_bad_record_fails_the_batch() {
        let body = r#"[{"Station": "SM 1"}, 42]"#;
        let err = parse_observations(body).expect_err("non-object record");
        assert!(err.to_string().contains("record 1"), "got {err}");
    }

    #[test]
    fn test_empty_array_is_ok() {
        assert!(parse_observations("[]").expect("empty batch").is_empty());
    }
}
