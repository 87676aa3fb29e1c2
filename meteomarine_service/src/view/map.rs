//! Map view markers.
//!
//! The map shows one wind arrow per station, built from the newest
//! observation of each station in the batch handed down by the root view.

use crate::analysis::groupings::latest_per_station;
use crate::format::{UNAVAILABLE, format_with_unit};
use crate::model::WeatherRecord;
use crate::wind::{self, Compass, WindClass};

/// Everything needed to draw and describe one station marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub station: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Rotation of the north-pointing arrow glyph, in degrees. `None` when
    /// the station reported no usable wind direction.
    pub rotation_deg: Option<f64>,
    pub wind_class: WindClass,
    /// Permanent label above the marker.
    pub tooltip: String,
    pub popup: Vec<String>,
}

/// Markers for the newest record of each station. Stations whose record has
/// no usable position are left off the map.
pub fn build_markers(records: &[WeatherRecord]) -> Vec<MapMarker> {
    latest_per_station(records)
        .iter()
        .filter_map(marker_for)
        .collect()
}

fn marker_for(record: &WeatherRecord) -> Option<MapMarker> {
    let station = record.station.clone()?;
    let (latitude, longitude) = record.position()?;
    let bearing = record.wind_dir.as_ref().and_then(|v| v.as_f64());
    let speed = record.wind_speed.as_ref().and_then(|v| v.as_f64());

    Some(MapMarker {
        tooltip: station.clone(),
        popup: popup_lines(record, &station),
        station,
        latitude,
        longitude,
        rotation_deg: bearing.and_then(wind::arrow_rotation),
        wind_class: WindClass::from_speed(speed),
    })
}

fn popup_lines(record: &WeatherRecord, station: &str) -> Vec<String> {
    let date = record
        .timestamp()
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| UNAVAILABLE.to_string());
    let mut lines = vec![
        format!("Station: {}", station),
        format!("Date: {}", date),
        format!("Temperature: {}", format_with_unit(record.air_temperature.as_ref(), 1, "°C")),
        format!(
            "Wind: {} - {}",
            format_with_unit(record.wind_speed.as_ref(), 1, "m/s"),
            wind::describe_bearing(record.wind_dir.as_ref())
        ),
        format!("Humidity: {}", format_with_unit(record.humidity.as_ref(), 0, "%")),
        format!("Pressure: {}", format_with_unit(record.air_pressure.as_ref(), 1, "hPa")),
    ];
    if record.tide_height.as_ref().and_then(|v| v.as_f64()).is_some() {
        lines.push(format!("Tide: {}", format_with_unit(record.tide_height.as_ref(), 2, "m")));
    }
    if record.surge.as_ref().and_then(|v| v.as_f64()).is_some() {
        lines.push(format!("Surge: {}", format_with_unit(record.surge.as_ref(), 2, "m")));
    }
    lines
}

/// Legend rows: wind classes, then the eight arrow orientations.
pub fn legend() -> Vec<String> {
    let mut rows: Vec<String> = [WindClass::Low, WindClass::Moderate, WindClass::Strong]
        .iter()
        .map(|c| format!("{} {}", c.color(), c.legend()))
        .collect();
    rows.extend(
        Compass::ALL
            .iter()
            .map(|c| format!("{:>5.1}° {}", c.bearing(), c.name())),
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValue;

    fn observation(station: &str, datetime: &str, dir: Option<f64>, speed: f64) -> WeatherRecord {
        WeatherRecord {
            station: Some(station.to_string()),
            datetime: Some(datetime.to_string()),
            latitude: Some(FieldValue::from("4.05")),
            longitude: Some(FieldValue::Number(9.7)),
            wind_dir: dir.map(FieldValue::Number),
            wind_speed: Some(FieldValue::Number(speed)),
            air_temperature: Some(FieldValue::Number(27.0)),
            ..Default::default()
        }
    }

    #[test]
    fn test_one_marker_per_station_from_latest() {
        let records = vec![
            observation("SM 1", "2025-06-10T10:00:00Z", Some(90.0), 2.0),
            observation("SM 1", "2025-06-10T11:00:00Z", Some(180.0), 8.0),
            observation("SM 2", "2025-06-10T10:00:00Z", None, 4.0),
        ];
        let markers = build_markers(&records);
        assert_eq!(markers.len(), 2);

        assert_eq!(markers[0].station, "SM 1");
        assert_eq!(markers[0].rotation_deg, Some(180.0));
        assert_eq!(markers[0].wind_class, WindClass::Strong);
        assert!(markers[0].popup.iter().any(|l| l.ends_with("180° (S)")));

        assert_eq!(markers[1].rotation_deg, None);
        assert_eq!(markers[1].wind_class, WindClass::Moderate);
        assert!(markers[1].popup.iter().any(|l| l.ends_with("Unknown")));
    }

    #[test]
    fn test_station_without_position_is_skipped() {
        let mut record = observation("SM 3", "2025-06-10T10:00:00Z", Some(0.0), 1.0);
        record.latitude = Some(FieldValue::from("n/a"));
        assert!(build_markers(&[record]).is_empty());
    }

    #[test]
    fn test_tide_and_surge_only_when_reported() {
        let mut record = observation("SM 1", "2025-06-10T10:00:00Z", Some(0.0), 1.0);
        let popup = build_markers(std::slice::from_ref(&record))[0].popup.clone();
        assert!(!popup.iter().any(|l| l.starts_with("Tide")));

        record.tide_height = Some(FieldValue::from("1.25"));
        let popup = build_markers(&[record])[0].popup.clone();
        assert!(popup.contains(&"Tide: 1.25 m".to_string()));
        assert!(!popup.iter().any(|l| l.starts_with("Surge")));
    }

    #[test]
    fn test_legend_lists_all_orientations() {
        let rows = legend();
        assert_eq!(rows.len(), 3 + 8);
        assert!(rows.iter().any(|r| r.contains("North-West")));
    }
}
