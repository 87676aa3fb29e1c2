//! Forecast alert and precipitation-risk filtering.
//!
//! Both the Forecast and the Alerts views offer a single toggle: off shows
//! every day, on narrows the list to days worth attention.

use crate::model::{FieldValue, ForecastRecord, NO_ALERT};

/// `true` when the record carries a real alert, i.e. a non-empty
/// classification other than `NO_ALERT`.
pub fn has_alert(record: &ForecastRecord) -> bool {
    record
        .alert
        .as_deref()
        .map(str::trim)
        .is_some_and(|a| !a.is_empty() && a != NO_ALERT)
}

/// Every record when `only_alerts` is off, otherwise only alerting days.
pub fn filter_alerts(records: &[ForecastRecord], only_alerts: bool) -> Vec<ForecastRecord> {
    records
        .iter()
        .filter(|r| !only_alerts || has_alert(r))
        .cloned()
        .collect()
}

/// Leading integer percentage of a precipitation risk value.
///
/// `"15%"` gives 15, `"15.7 %"` gives 15, a bare number is truncated.
/// Absent or unparseable values give 0.
pub fn parse_risk_percent(value: Option<&FieldValue>) -> i64 {
    match value {
        Some(FieldValue::Number(n)) if n.is_finite() => n.trunc() as i64,
        Some(FieldValue::Number(_)) | None => 0,
        Some(FieldValue::Text(s)) => leading_integer(&s.replace('%', "")).unwrap_or(0),
    }
}

/// Parses an optional sign followed by digits at the start of `s`
/// (after leading whitespace), ignoring whatever follows.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// `true` when the day has a strictly positive precipitation risk.
pub fn has_precipitation_risk(record: &ForecastRecord) -> bool {
    parse_risk_percent(record.precipitation_risk.as_ref()) > 0
}

/// Every record when `with_risk` is off, otherwise only days with risk > 0%.
pub fn filter_with_risk(records: &[ForecastRecord], with_risk: bool) -> Vec<ForecastRecord> {
    records
        .iter()
        .filter(|r| !with_risk || has_precipitation_risk(r))
        .cloned()
        .collect()
}
