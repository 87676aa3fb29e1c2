//! CSV export of the observation table.
//!
//! Writes the same columns as the Live Data table, with values passed
//! through verbatim (no rounding) so the export can be re-analysed.

use std::io::Write;

use crate::model::{
    FIELD_AIR_PRESSURE, FIELD_AIR_TEMPERATURE, FIELD_DATETIME, FIELD_DEWPOINT, FIELD_HUMIDITY,
    FIELD_LATITUDE, FIELD_LONGITUDE, FIELD_STATION, FIELD_TIDE_HEIGHT, FIELD_WIND_DIR,
    FIELD_WIND_SPEED, WeatherRecord,
};

/// Exported columns, in order.
pub const EXPORT_COLUMNS: [&str; 11] = [
    FIELD_STATION,
    FIELD_LATITUDE,
    FIELD_LONGITUDE,
    FIELD_DATETIME,
    FIELD_TIDE_HEIGHT,
    FIELD_WIND_SPEED,
    FIELD_WIND_DIR,
    FIELD_AIR_PRESSURE,
    FIELD_AIR_TEMPERATURE,
    FIELD_DEWPOINT,
    FIELD_HUMIDITY,
];

/// Suggested file name for a full export.
pub const EXPORT_FILE_NAME: &str = "MeteoMarinePAD.csv";

/// Writes a header row then one row per record. Missing values are empty
/// cells. Returns the number of data rows written.
pub fn write_csv<W: Write>(records: &[WeatherRecord], out: W) -> Result<usize, csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(EXPORT_COLUMNS)?;

    for record in records {
        let row = EXPORT_COLUMNS.iter().map(|label| {
            record
                .field(label)
                .map(|value| value.as_text())
                .unwrap_or_default()
        });
        writer.write_record(row)?;
    }

    writer.flush()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValue;

    #[test]
    fn test_csv_has_header_and_rows() {
        let records = vec![
            WeatherRecord {
                station: Some("SM 1".to_string()),
                datetime: Some("2025-06-10T10:00:00".to_string()),
                air_temperature: Some(FieldValue::Number(27.5)),
                wind_dir: Some(FieldValue::from("180")),
                ..Default::default()
            },
            WeatherRecord {
                station: Some("SM, 2".to_string()),
                ..Default::default()
            },
        ];
        let mut buf = Vec::new();
        let written = write_csv(&records, &mut buf).expect("in-memory write");
        assert_eq!(written, 2);

        let text = String::from_utf8(buf).expect("utf-8 output");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Station,Latitude,Longitude,DateTime,TIDE HEIGHT,WIND SPEED,WIND DIR,AIR PRESSURE,AIR TEMPERATURE,DEWPOINT,HUMIDITY"
        );
        assert_eq!(lines[1], "SM 1,,,2025-06-10T10:00:00,,,180,,27.5,,");
        assert_eq!(lines[2], "\"SM, 2\",,,,,,,,,,");
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let mut buf = Vec::new();
        assert_eq!(write_csv(&[], &mut buf).expect("in-memory write"), 0);
        assert_eq!(String::from_utf8(buf).expect("utf-8").lines().count(), 1);
    }
}
