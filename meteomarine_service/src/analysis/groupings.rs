/// Grouping and selection over a flat observation batch.
///
/// The upstream API returns one flat array of observations from all
/// stations. The Map view wants one marker per station (the newest reading);
/// the Live Data view wants the newest few readings and a per-station table.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::WeatherRecord;
use crate::stations::StationFilter;

/// Maximum number of rows shown in the Live Data table.
pub const LIVE_TABLE_ROW_LIMIT: usize = 30;

/// Number of summary cards above the Live Data table.
pub const LIVE_SUMMARY_CARDS: usize = 3;

// ---------------------------------------------------------------------------
// Latest record per station
// ---------------------------------------------------------------------------

/// Keeps the newest record of each station.
///
/// Unparseable timestamps rank below every valid one, so they are only
/// selected when a station has nothing better. On equal timestamps the
/// first record seen wins. Output follows the order in which stations first
/// appear. Records without a station identifier are skipped.
pub fn latest_per_station(records: &[WeatherRecord]) -> Vec<WeatherRecord> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut best: Vec<(&WeatherRecord, Option<DateTime<Utc>>)> = Vec::new();

    for record in records {
        let Some(station) = record.station.as_deref() else {
            continue;
        };
        let ts = record.timestamp();
        match slots.get(station) {
            Some(&slot) => {
                // Option ordering puts None below every Some
                if ts > best[slot].1 {
                    best[slot] = (record, ts);
                }
            }
            None => {
                slots.insert(station, best.len());
                best.push((record, ts));
            }
        }
    }

    best.into_iter().map(|(record, _)| record.clone()).collect()
}

// ---------------------------------------------------------------------------
// Live Data helpers
// ---------------------------------------------------------------------------

/// Records belonging to the selected station(s), in batch order.
pub fn filter_by_station(records: &[WeatherRecord], filter: &StationFilter) -> Vec<WeatherRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r.station.as_deref()))
        .cloned()
        .collect()
}

/// The `n` newest records, newest first. Undated records sort last; the
/// sort is stable so equal timestamps keep batch order.
pub fn most_recent(records: &[WeatherRecord], n: usize) -> Vec<WeatherRecord> {
    let mut dated: Vec<(Option<DateTime<Utc>>, &WeatherRecord)> =
        records.iter().map(|r| (r.timestamp(), r)).collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated.into_iter().take(n).map(|(_, r)| r.clone()).collect()
}

/// Records whose UTC date falls within `start..=end`. Undated records are
/// dropped.
pub fn filter_by_date_range(
    records: &[WeatherRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<WeatherRecord> {
    records
        .iter()
        .filter(|r| {
            let Some(date) = r.timestamp().map(|ts| ts.date_naive()) else {
                return false;
            };
            start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
        })
        .cloned()
        .collect()
}

/// A display page of the Live Data table.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    pub rows: Vec<WeatherRecord>,
    /// Number of records that matched before the row cap.
    pub total: usize,
}

impl TablePage {
    pub fn is_truncated(&self) -> bool {
        self.total > self.rows.len()
    }
}

/// Applies the station filter, then caps the rows at `limit`.
pub fn table_page(records: &[WeatherRecord], filter: &StationFilter, limit: usize) -> TablePage {
    let matching = filter_by_station(records, filter);
    let total = matching.len();
    let rows = matching.into_iter().take(limit).collect();
    TablePage { rows, total }
}
