/// WeatherRecord, ForecastRecord, FieldValue, FetchError
/// core data structures and error handling
///
/// Core data types for the MeteoMarine dashboard service.
///
/// This module defines the shared domain model imported by all other modules.
/// Records are deserialized straight from the upstream JSON; every measured
/// field is optional because the upstream service routinely omits values or
/// emits `NaN` (sanitized to `null` before parsing).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Field labels
// ---------------------------------------------------------------------------

/// Upstream label for the station identifier, e.g. "SM 1".
pub const FIELD_STATION: &str = "Station";
pub const FIELD_LATITUDE: &str = "Latitude";
pub const FIELD_LONGITUDE: &str = "Longitude";
pub const FIELD_DATETIME: &str = "DateTime";
pub const FIELD_TIDE_HEIGHT: &str = "TIDE HEIGHT";
pub const FIELD_WIND_SPEED: &str = "WIND SPEED";
pub const FIELD_WIND_DIR: &str = "WIND DIR";
pub const FIELD_AIR_PRESSURE: &str = "AIR PRESSURE";
pub const FIELD_AIR_TEMPERATURE: &str = "AIR TEMPERATURE";
pub const FIELD_DEWPOINT: &str = "DEWPOINT";
pub const FIELD_HUMIDITY: &str = "HUMIDITY";
pub const FIELD_SURGE: &str = "SURGE";

/// Sentinel alert classification meaning "nothing to report".
pub const NO_ALERT: &str = "RAS";

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// A raw upstream value: the API mixes JSON numbers and numeric strings
/// for the same field across records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric interpretation of the value.
    ///
    /// Text is trimmed and must parse completely as a float. `NaN` and
    /// infinities are never returned: they count as unavailable.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// The value as display text, without any numeric reformatting.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// Maps numbers and strings to a `FieldValue`; null, booleans, arrays and
/// objects become `None` rather than failing the whole batch.
fn deserialize_field<'de, D>(deserializer: D) -> Result<Option<FieldValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
        serde_json::Value::String(s) => Some(FieldValue::Text(s)),
        _ => None,
    })
}

/// Same as `deserialize_field` but for labels that are only meaningful as text.
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_field(deserializer)?.map(|v| v.as_text()))
}

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// One timestamped observation from a marine weather station.
///
/// Corresponds to one element of the `/donnees` response array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WeatherRecord {
    #[serde(rename = "_id", default, deserialize_with = "deserialize_text")]
    pub id: Option<String>,
    #[serde(rename = "Station", default, deserialize_with = "deserialize_text")]
    pub station: Option<String>,
    #[serde(rename = "Latitude", default, deserialize_with = "deserialize_field")]
    pub latitude: Option<FieldValue>,
    #[serde(rename = "Longitude", default, deserialize_with = "deserialize_field")]
    pub longitude: Option<FieldValue>,
    #[serde(rename = "DateTime", default, deserialize_with = "deserialize_text")]
    pub datetime: Option<String>,
    #[serde(rename = "AIR TEMPERATURE", default, deserialize_with = "deserialize_field")]
    pub air_temperature: Option<FieldValue>,
    #[serde(rename = "HUMIDITY", default, deserialize_with = "deserialize_field")]
    pub humidity: Option<FieldValue>,
    #[serde(rename = "WIND SPEED", default, deserialize_with = "deserialize_field")]
    pub wind_speed: Option<FieldValue>,
    #[serde(rename = "WIND DIR", default, deserialize_with = "deserialize_field")]
    pub wind_dir: Option<FieldValue>,
    #[serde(rename = "AIR PRESSURE", default, deserialize_with = "deserialize_field")]
    pub air_pressure: Option<FieldValue>,
    #[serde(rename = "DEWPOINT", default, deserialize_with = "deserialize_field")]
    pub dewpoint: Option<FieldValue>,
    #[serde(rename = "TIDE HEIGHT", default, deserialize_with = "deserialize_field")]
    pub tide_height: Option<FieldValue>,
    #[serde(rename = "SURGE", default, deserialize_with = "deserialize_field")]
    pub surge: Option<FieldValue>,
}

impl WeatherRecord {
    /// Parsed observation time, or `None` if absent or unparseable.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.datetime.as_deref().and_then(parse_timestamp)
    }

    /// Position as (latitude, longitude) when both are numeric.
    pub fn position(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.as_ref()?.as_f64()?;
        let lon = self.longitude.as_ref()?.as_f64()?;
        Some((lat, lon))
    }

    /// Looks a field up by its upstream label.
    pub fn field(&self, label: &str) -> Option<FieldValue> {
        match label {
            FIELD_STATION => self.station.as_deref().map(FieldValue::from),
            FIELD_DATETIME => self.datetime.as_deref().map(FieldValue::from),
            FIELD_LATITUDE => self.latitude.clone(),
            FIELD_LONGITUDE => self.longitude.clone(),
            FIELD_AIR_TEMPERATURE => self.air_temperature.clone(),
            FIELD_HUMIDITY => self.humidity.clone(),
            FIELD_WIND_SPEED => self.wind_speed.clone(),
            FIELD_WIND_DIR => self.wind_dir.clone(),
            FIELD_AIR_PRESSURE => self.air_pressure.clone(),
            FIELD_DEWPOINT => self.dewpoint.clone(),
            FIELD_TIDE_HEIGHT => self.tide_height.clone(),
            FIELD_SURGE => self.surge.clone(),
            _ => None,
        }
    }
}

/// One per-day forecast entry from the `/previsions` envelope.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ForecastRecord {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub days: Option<String>,
    #[serde(rename = "AIR TEMPERATURE", default, deserialize_with = "deserialize_field")]
    pub air_temperature: Option<FieldValue>,
    #[serde(rename = "HUMIDITY", default, deserialize_with = "deserialize_field")]
    pub humidity: Option<FieldValue>,
    #[serde(rename = "WIND", default, deserialize_with = "deserialize_field")]
    pub wind: Option<FieldValue>,
    #[serde(rename = "TIDE HEIGHT", default, deserialize_with = "deserialize_field")]
    pub tide_height: Option<FieldValue>,
    /// Textual percentage, e.g. "15%".
    #[serde(rename = "precipitation_Risk", default, deserialize_with = "deserialize_field")]
    pub precipitation_risk: Option<FieldValue>,
    /// Alert classification; `NO_ALERT` when there is nothing to report.
    #[serde(rename = "Alerte", default, deserialize_with = "deserialize_text")]
    pub alert: Option<String>,
    #[serde(rename = "Expert_Analysis", default, deserialize_with = "deserialize_text")]
    pub expert_analysis: Option<String>,
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Parses the upstream `DateTime` field.
///
/// Accepts RFC 3339, RFC 2822 (`Tue, 10 Jun 2025 12:00:00 GMT`) and naive
/// ISO-like forms, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding a batch from the weather API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("Transport error: {0}")]
    Transport(String),
    /// Non-2xx HTTP response.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),
    /// The body is not valid JSON even after `NaN` sanitizing, or a record
    /// could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),
    /// Valid JSON, but not an array or a successful `{status, data}` envelope.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::HttpStatus(status.as_u16()),
            None => FetchError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_field_value_numeric_text_parses() {
        assert_eq!(FieldValue::from(" 27.4 ").as_f64(), Some(27.4));
        assert_eq!(FieldValue::from(12.0).as_f64(), Some(12.0));
    }

    #[test]
    fn test_field_value_rejects_garbage_and_nan() {
        assert_eq!(FieldValue::from("abc").as_f64(), None);
        assert_eq!(FieldValue::from("15%").as_f64(), None);
        assert_eq!(FieldValue::from("NaN").as_f64(), None);
        assert_eq!(FieldValue::Number(f64::INFINITY).as_f64(), None);
    }

    #[test]
    fn test_record_deserializes_mixed_types() {
        let json = r#"{
            "_id": "665f",
            "Station": "SM 1",
            "Latitude": "4.05",
            "Longitude": 9.68,
            "DateTime": "2025-06-10T12:00:00",
            "AIR TEMPERATURE": 27.5,
            "HUMIDITY": null,
            "WIND DIR": true
        }"#;
        let record: WeatherRecord = serde_json::from_str(json).expect("record should decode");
        assert_eq!(record.station.as_deref(), Some("SM 1"));
        assert_eq!(record.position(), Some((4.05, 9.68)));
        assert_eq!(record.air_temperature, Some(FieldValue::Number(27.5)));
        assert_eq!(record.humidity, None, "null is unavailable, never zero");
        assert_eq!(record.wind_dir, None, "booleans are unavailable");
        assert_eq!(record.surge, None, "missing keys are unavailable");
    }

    #[test]
    fn test_numeric_station_code_is_kept_as_text() {
        let record: WeatherRecord =
            serde_json::from_str(r#"{"Station": 4}"#).expect("record should decode");
        assert_eq!(record.station.as_deref(), Some("4"));
    }

    #[test]
    fn test_forecast_record_labels() {
        let json = r#"{
            "days": "Lundi",
            "WIND": 14,
            "precipitation_Risk": "15%",
            "Alerte": "RAS",
            "Expert_Analysis": "Mer calme."
        }"#;
        let record: ForecastRecord = serde_json::from_str(json).expect("forecast should decode");
        assert_eq!(record.days.as_deref(), Some("Lundi"));
        assert_eq!(record.precipitation_risk, Some(FieldValue::from("15%")));
        assert_eq!(record.alert.as_deref(), Some(NO_ALERT));
        assert_eq!(record.expert_analysis.as_deref(), Some("Mer calme."));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-06-10T12:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-06-10T13:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("Tue, 10 Jun 2025 12:00:00 GMT"), Some(expected));
        assert_eq!(parse_timestamp("2025-06-10T12:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2025-06-10 12:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-06-10 12:00"), Some(expected));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::HttpStatus(500).to_string(), "HTTP error: 500");
        assert_eq!(
            FetchError::Parse("eof".to_string()).to_string(),
            "Parse error: eof"
        );
    }
}
