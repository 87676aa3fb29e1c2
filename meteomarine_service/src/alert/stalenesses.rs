/// Observation staleness detection.
///
/// Stations report every 10 minutes under normal conditions. A station
/// whose newest observation is much older than that has likely lost power
/// or its uplink, and the dashboard flags it rather than silently showing
/// old numbers as current.
///
/// # Clock injection
/// All functions accept a `now: DateTime<Utc>` parameter rather than calling
/// `Utc::now()` internally, which keeps the tests deterministic.

use chrono::{DateTime, Utc};

use crate::model::WeatherRecord;

/// Default staleness threshold: three missed 10-minute reports.
pub const DEFAULT_STALE_AFTER_MINUTES: u64 = 30;

// ---------------------------------------------------------------------------
// Staleness check
// ---------------------------------------------------------------------------

/// Returns `true` if the record is older than `max_age_minutes` relative
/// to `now`.
///
/// Staleness is strictly greater than the threshold:
///   age > max_age_minutes  →  stale
///   age == max_age_minutes →  not stale
///
/// Returns an error if the record's timestamp is missing or unparseable.
/// Callers should treat that as stale.
pub fn is_stale_at(
    record: &WeatherRecord,
    max_age_minutes: u64,
    now: DateTime<Utc>,
) -> Result<bool, String> {
    let observed = record.timestamp().ok_or_else(|| {
        format!(
            "unparseable timestamp {:?}",
            record.datetime.as_deref().unwrap_or("")
        )
    })?;
    // Readings from the future (clock skew) count as fresh
    let age_minutes = (now - observed).num_minutes().max(0) as u64;
    Ok(age_minutes > max_age_minutes)
}

/// Station codes whose record in `latest` is stale or undated.
///
/// Expects the output of `analysis::groupings::latest_per_station`.
pub fn stale_stations_at(
    latest: &[WeatherRecord],
    max_age_minutes: u64,
    now: DateTime<Utc>,
) -> Vec<String> {
    latest
        .iter()
        .filter(|r| is_stale_at(r, max_age_minutes, now).unwrap_or(true))
        .filter_map(|r| r.station.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
