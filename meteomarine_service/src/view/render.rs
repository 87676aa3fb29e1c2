//! Plain-text rendering of the dashboard views.
//!
//! Each `render_*` function takes the data its view owns and returns the
//! text to print. None of them fetch anything.

use std::fmt::Write as _;

use crate::alert::filters::{filter_alerts, filter_with_risk, has_alert};
use crate::analysis::groupings::{
    LIVE_SUMMARY_CARDS, LIVE_TABLE_ROW_LIMIT, most_recent, table_page,
};
use crate::format::{UNAVAILABLE, display_text, format_value, format_with_unit};
use crate::model::{ForecastRecord, WeatherRecord};
use crate::export::EXPORT_FILE_NAME;
use crate::stations::{MAP_CENTER, MAP_TILE_URL, MAP_ZOOM, StationFilter, station_codes};
use crate::view::View;
use crate::view::loader::LoadState;
use crate::view::map::{build_markers, legend};
use crate::wind;

pub const LOADING_MESSAGE: &str = "Loading weather data...";

/// Renders a load in progress or failed, or delegates to `render` once
/// loaded.
pub fn render_state<T>(state: &LoadState<T>, render: impl FnOnce(&T) -> String) -> String {
    match state {
        LoadState::Loading => format!("{}\n", LOADING_MESSAGE),
        LoadState::Loaded(data) => render(data),
        LoadState::Failed(_) => format!(
            "Error: {}\n",
            state.error_message().unwrap_or(UNAVAILABLE)
        ),
    }
}

fn heading(out: &mut String, view: View) {
    let _ = writeln!(out, "== {} ==", view.document_title());
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

pub fn render_home() -> String {
    let mut out = String::new();
    heading(&mut out, View::Home);
    let _ = writeln!(out, "Welcome to MeteoMarinePAD");
    let _ = writeln!(
        out,
        "Forecasts, real-time alerts and expert analysis for the port of Douala.\n"
    );
    for card in View::home_cards() {
        let _ = writeln!(out, "  [{}] {}: {}", card.target.path(), card.title, card.description);
    }
    out
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

pub fn render_map(observations: &[WeatherRecord]) -> String {
    let mut out = String::new();
    heading(&mut out, View::Map);
    let _ = writeln!(
        out,
        "Centre {:.2}, {:.2} (zoom {})",
        MAP_CENTER.0, MAP_CENTER.1, MAP_ZOOM
    );
    let _ = writeln!(out, "Tiles: {}", MAP_TILE_URL);

    let markers = build_markers(observations);
    if markers.is_empty() {
        let _ = writeln!(out, "No station to display.");
    }
    for marker in &markers {
        let rotation = marker
            .rotation_deg
            .map(|r| format!("{:.0}°", r))
            .unwrap_or_else(|| UNAVAILABLE.to_string());
        let _ = writeln!(
            out,
            "\n* {} at {:.4}, {:.4}  arrow {}  {}{}",
            marker.tooltip,
            marker.latitude,
            marker.longitude,
            rotation,
            marker.wind_class.color(),
            if marker.wind_class.pulses() { " (pulsing)" } else { "" }
        );
        for line in &marker.popup {
            let _ = writeln!(out, "    {}", line);
        }
    }

    let _ = writeln!(out, "\nLegend:");
    for row in legend() {
        let _ = writeln!(out, "  {}", row);
    }
    out
}

// ---------------------------------------------------------------------------
// Live Data
// ---------------------------------------------------------------------------

const TABLE_COLUMNS: [&str; 12] = [
    "N°", "Station", "Latitude", "Longitude", "DateTime", "TIDE HEIGHT", "WIND SPEED",
    "WIND DIR", "AIR PRESSURE", "AIR TEMPERATURE", "DEWPOINT", "HUMIDITY",
];

fn summary_card(out: &mut String, record: &WeatherRecord) {
    let station = record.station.as_deref().unwrap_or(UNAVAILABLE);
    let observed = record
        .timestamp()
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| UNAVAILABLE.to_string());
    let _ = writeln!(out, "Station {}", station);
    let _ = writeln!(out, "  Observation: {}", observed);
    let _ = writeln!(out, "  Temperature: {}", format_with_unit(record.air_temperature.as_ref(), 1, "°C"));
    let _ = writeln!(out, "  Humidity: {}", format_with_unit(record.humidity.as_ref(), 0, "%"));
    let _ = writeln!(out, "  Wind: {}", format_with_unit(record.wind_speed.as_ref(), 1, "m/s"));
    let _ = writeln!(out, "  Wind direction: {}", wind::describe_bearing(record.wind_dir.as_ref()));
    let _ = writeln!(out, "  Pressure: {}", format_with_unit(record.air_pressure.as_ref(), 1, "hPa"));
    if record.tide_height.as_ref().and_then(|v| v.as_f64()).is_some() {
        let _ = writeln!(out, "  Tide: {}", format_with_unit(record.tide_height.as_ref(), 2, "m"));
    }
    if record.surge.as_ref().and_then(|v| v.as_f64()).is_some() {
        let _ = writeln!(out, "  Surge: {}", format_with_unit(record.surge.as_ref(), 2, "m"));
    }
}

fn table_row(index: usize, record: &WeatherRecord) -> Vec<String> {
    vec![
        (index + 1).to_string(),
        record.station.clone().unwrap_or_else(|| UNAVAILABLE.to_string()),
        format_value(record.latitude.as_ref(), 4),
        format_value(record.longitude.as_ref(), 4),
        record.datetime.clone().unwrap_or_else(|| UNAVAILABLE.to_string()),
        format_value(record.tide_height.as_ref(), 2),
        format_value(record.wind_speed.as_ref(), 1),
        format_value(record.wind_dir.as_ref(), 0),
        format_value(record.air_pressure.as_ref(), 1),
        format_value(record.air_temperature.as_ref(), 1),
        format_value(record.dewpoint.as_ref(), 1),
        format_value(record.humidity.as_ref(), 0),
    ]
}

pub fn render_live_data(observations: &[WeatherRecord], filter: &StationFilter) -> String {
    let mut out = String::new();
    heading(&mut out, View::LiveData);
    let _ = writeln!(out, "Real-time observations, collected every 10 minutes.\n");

    for record in most_recent(observations, LIVE_SUMMARY_CARDS) {
        summary_card(&mut out, &record);
    }

    let _ = writeln!(
        out,
        "\nFilter: {} (available: {})",
        filter,
        station_codes().join(", ")
    );

    let page = table_page(observations, filter, LIVE_TABLE_ROW_LIMIT);
    if page.rows.is_empty() {
        let _ = writeln!(out, "No data available for this selection.");
        return out;
    }

    let rows: Vec<Vec<String>> = page
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| table_row(i, r))
        .collect();
    let widths: Vec<usize> = TABLE_COLUMNS
        .iter()
        .enumerate()
        .map(|(col, title)| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(title.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = TABLE_COLUMNS
        .iter()
        .zip(&widths)
        .map(|(title, w)| format!("{:<w$}", title, w = *w))
        .collect();
    let _ = writeln!(out, "{}", header.join(" | "));
    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
            .collect();
        let _ = writeln!(out, "{}", cells.join(" | "));
    }

    if page.is_truncated() {
        let _ = writeln!(
            out,
            "\nDisplay limited to {} of {} rows. Use `meteomarine export > {}` for the full data set.",
            page.rows.len(),
            page.total,
            EXPORT_FILE_NAME
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

pub fn render_forecast(forecasts: &[ForecastRecord], with_risk: bool) -> String {
    let mut out = String::new();
    heading(&mut out, View::Forecast);
    if with_risk {
        let _ = writeln!(out, "Showing only days with a precipitation risk.\n");
    }

    let days = filter_with_risk(forecasts, with_risk);
    if days.is_empty() {
        let _ = writeln!(out, "No data to display.");
        return out;
    }
    for day in &days {
        let _ = writeln!(out, "{}", day.days.as_deref().unwrap_or(UNAVAILABLE));
        let _ = writeln!(out, "  Temperature: {}", format_with_unit(day.air_temperature.as_ref(), 1, "°C"));
        let _ = writeln!(out, "  Humidity: {}", format_with_unit(day.humidity.as_ref(), 0, "%"));
        let _ = writeln!(out, "  Wind: {}", format_with_unit(day.wind.as_ref(), 1, "km/h"));
        let _ = writeln!(out, "  Tide: {}", format_with_unit(day.tide_height.as_ref(), 2, "m"));
        let _ = writeln!(out, "  Precipitation risk: {}", display_text(day.precipitation_risk.as_ref()));
        if let Some(analysis) = day.expert_analysis.as_deref().filter(|a| !a.trim().is_empty()) {
            let _ = writeln!(out, "  Expert analysis: {}", analysis);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

pub fn render_alerts(forecasts: &[ForecastRecord], only_alerts: bool) -> String {
    let mut out = String::new();
    heading(&mut out, View::Alerts);

    let days = filter_alerts(forecasts, only_alerts);
    if days.is_empty() {
        let _ = writeln!(out, "No alerts to display.");
        return out;
    }
    for day in &days {
        let marker = if has_alert(day) { "!!" } else { "ok" };
        let _ = writeln!(out, "[{}] {}", marker, day.days.as_deref().unwrap_or(UNAVAILABLE));
        let _ = writeln!(out, "  Alert: {}", day.alert.as_deref().unwrap_or(UNAVAILABLE));
        if let Some(analysis) = day.expert_analysis.as_deref().filter(|a| !a.trim().is_empty()) {
            let _ = writeln!(out, "  {}", analysis);
        }
    }
    out
}

pub fn render_not_found(path: &str) -> String {
    let mut out = String::new();
    heading(&mut out, View::NotFound);
    let _ = writeln!(out, "No page at {:?}. Try one of:", path);
    for view in View::NAVIGATION {
        let _ = writeln!(out, "  {}  {}", view.path(), view.title());
    }
    out
}
