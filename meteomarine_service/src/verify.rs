//! Endpoint Verification Module
//!
//! Checks the configured weather API against the station registry: are both
//! endpoints answering, does every registered station appear in the batch,
//! is its newest observation fresh and complete.
//!
//! Run this before pointing the dashboard at a new API deployment.

use std::collections::BTreeSet;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alert::stalenesses::is_stale_at;
use crate::analysis::groupings::latest_per_station;
use crate::ingest::api::{WeatherApi, build_forecasts_url, build_observations_url};
use crate::logging::{self, DataSource};
use crate::model::{FetchError, ForecastRecord, WeatherRecord};
use crate::stations::{STATION_REGISTRY, Station, find_station};

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub api_base_url: String,
    pub observations: EndpointVerification,
    pub forecasts: EndpointVerification,
    pub stations: Vec<StationVerification>,
    /// Station codes present in the batch but absent from the registry.
    pub unregistered_stations: Vec<String>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub endpoints_working: usize,
    pub endpoints_failed: usize,
    pub stations_total: usize,
    pub stations_working: usize,
    pub stations_failed: usize,
    pub overall: VerificationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointVerification {
    pub url: String,
    pub status: VerificationStatus,
    pub record_count: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationVerification {
    pub code: String,
    pub description: String,
    pub status: VerificationStatus,
    pub observation_count: usize,
    pub latest_datetime: Option<String>,
    pub stale: bool,
    pub fields_expected: Vec<String>,
    pub fields_missing: Vec<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl VerificationStatus {
    pub fn is_working(self) -> bool {
        self != VerificationStatus::Failed
    }
}

// ============================================================================
// Endpoint Verification
// ============================================================================

/// An endpoint that answered with an empty batch is only partially working.
pub fn verify_endpoint<T>(url: String, result: &Result<Vec<T>, FetchError>) -> EndpointVerification {
    match result {
        Ok(records) => EndpointVerification {
            url,
            status: if records.is_empty() {
                VerificationStatus::PartialSuccess
            } else {
                VerificationStatus::Success
            },
            record_count: records.len(),
            error_message: None,
        },
        Err(e) => EndpointVerification {
            url,
            status: VerificationStatus::Failed,
            record_count: 0,
            error_message: Some(e.to_string()),
        },
    }
}

// ============================================================================
// Station Verification
// ============================================================================

/// Checks one registered station against a decoded observation batch.
///
/// Failed when the station never appears; PartialSuccess when its newest
/// observation is stale, undated, or missing an expected field.
pub fn verify_station(
    station: &Station,
    records: &[WeatherRecord],
    latest: &[WeatherRecord],
    stale_after_minutes: u64,
    now: DateTime<Utc>,
) -> StationVerification {
    let mut result = StationVerification {
        code: station.code.to_string(),
        description: station.description.to_string(),
        status: VerificationStatus::Failed,
        observation_count: records
            .iter()
            .filter(|r| r.station.as_deref() == Some(station.code))
            .count(),
        latest_datetime: None,
        stale: false,
        fields_expected: station.expected_fields.iter().map(|f| f.to_string()).collect(),
        fields_missing: Vec::new(),
        error_message: None,
    };

    let Some(newest) = latest
        .iter()
        .find(|r| r.station.as_deref() == Some(station.code))
    else {
        result.error_message = Some("No observations in batch".to_string());
        return result;
    };

    result.latest_datetime = newest.datetime.clone();
    match is_stale_at(newest, stale_after_minutes, now) {
        Ok(stale) => result.stale = stale,
        Err(e) => {
            result.stale = true;
            result.error_message = Some(e);
        }
    }

    for field in station.expected_fields {
        let reported = newest.field(field).and_then(|v| v.as_f64()).is_some();
        if !reported {
            result.fields_missing.push(field.to_string());
        }
    }

    result.status = if result.stale || !result.fields_missing.is_empty() {
        VerificationStatus::PartialSuccess
    } else {
        VerificationStatus::Success
    };
    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

/// Assembles a report from already-fetched endpoint results.
pub fn build_report(
    api_base_url: &str,
    observations: Result<Vec<WeatherRecord>, FetchError>,
    forecasts: Result<Vec<ForecastRecord>, FetchError>,
    stale_after_minutes: u64,
    now: DateTime<Utc>,
) -> VerificationReport {
    let observations_check = verify_endpoint(build_observations_url(api_base_url, None), &observations);
    let forecasts_check = verify_endpoint(build_forecasts_url(api_base_url), &forecasts);

    let records = observations.unwrap_or_default();
    let latest = latest_per_station(&records);

    let stations: Vec<StationVerification> = STATION_REGISTRY
        .iter()
        .map(|s| verify_station(s, &records, &latest, stale_after_minutes, now))
        .collect();

    let unregistered_stations: Vec<String> = latest
        .iter()
        .filter_map(|r| r.station.as_deref())
        .filter(|code| find_station(code).is_none())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let endpoints = [&observations_check, &forecasts_check];
    let endpoints_working = endpoints.iter().filter(|e| e.status.is_working()).count();
    let stations_working = stations.iter().filter(|s| s.status.is_working()).count();

    let all_success = endpoints
        .iter()
        .map(|e| e.status)
        .chain(stations.iter().map(|s| s.status))
        .all(|s| s == VerificationStatus::Success);
    let overall = if all_success {
        VerificationStatus::Success
    } else if endpoints_working > 0 {
        VerificationStatus::PartialSuccess
    } else {
        VerificationStatus::Failed
    };

    VerificationReport {
        timestamp: now.to_rfc3339(),
        api_base_url: api_base_url.to_string(),
        summary: VerificationSummary {
            endpoints_working,
            endpoints_failed: endpoints.len() - endpoints_working,
            stations_total: stations.len(),
            stations_working,
            stations_failed: stations.len() - stations_working,
            overall,
        },
        observations: observations_check,
        forecasts: forecasts_check,
        stations,
        unregistered_stations,
    }
}

/// Fetches the full observation batch and the forecasts, then verifies them.
pub fn run_full_verification(api: &WeatherApi) -> VerificationReport {
    let config = api.config();
    logging::info(
        DataSource::System,
        None,
        &format!("Verifying weather API at {}", config.api_base_url),
    );

    let observations = api.observations(None);
    let forecasts = api.forecasts();
    let report = build_report(
        &config.api_base_url,
        observations,
        forecasts,
        config.stale_after_minutes,
        Utc::now(),
    );

    for station in &report.stations {
        match station.status {
            VerificationStatus::Success => logging::debug(
                DataSource::System,
                Some(&station.code),
                &format!("OK ({} observations)", station.observation_count),
            ),
            VerificationStatus::PartialSuccess => logging::warn(
                DataSource::System,
                Some(&station.code),
                &format!(
                    "Partial (stale: {}, missing: {:?})",
                    station.stale, station.fields_missing
                ),
            ),
            VerificationStatus::Failed => logging::error(
                DataSource::System,
                Some(&station.code),
                station.error_message.as_deref().unwrap_or("Unknown"),
            ),
        }
    }
    report
}

pub fn print_summary<W: Write>(report: &VerificationReport, out: &mut W) -> io::Result<()> {
    let summary = &report.summary;
    writeln!(out, "VERIFICATION SUMMARY ({})", report.api_base_url)?;
    writeln!(
        out,
        "Observations: {:?} ({} records)",
        report.observations.status, report.observations.record_count
    )?;
    writeln!(
        out,
        "Forecasts:    {:?} ({} records)",
        report.forecasts.status, report.forecasts.record_count
    )?;
    writeln!(
        out,
        "Stations:     {}/{} working  ({} failed)",
        summary.stations_working, summary.stations_total, summary.stations_failed
    )?;
    if !report.unregistered_stations.is_empty() {
        writeln!(out, "Unregistered: {}", report.unregistered_stations.join(", "))?;
    }
    writeln!(out, "Overall:      {:?}", summary.overall)
}
