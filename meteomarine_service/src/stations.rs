/// Station registry for the Douala port marine weather network.
///
/// Defines the stations the dashboard knows how to filter on, and the map
/// framing used by the Map view. Station positions are not stored here:
/// every observation carries its own latitude/longitude, and the map places
/// markers from the records themselves.

use std::fmt;

use crate::model::{
    FIELD_AIR_PRESSURE, FIELD_AIR_TEMPERATURE, FIELD_HUMIDITY, FIELD_WIND_DIR, FIELD_WIND_SPEED,
};

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Metadata for a single marine weather station.
#[derive(Debug)]
pub struct Station {
    /// Short code used by the upstream API, e.g. "SM 1".
    pub code: &'static str,
    /// Human-readable description of the station.
    pub description: &'static str,
    /// Fields this station is expected to report on every observation.
    pub expected_fields: &'static [&'static str],
}

/// Fields every station reports.
const CORE_FIELDS: &[&str] = &[
    FIELD_AIR_TEMPERATURE,
    FIELD_HUMIDITY,
    FIELD_WIND_SPEED,
    FIELD_WIND_DIR,
    FIELD_AIR_PRESSURE,
];

/// All stations of the Port Autonome de Douala network (SM1 to SM4).
pub static STATION_REGISTRY: &[Station] = &[
    Station {
        code: "SM 1",
        description: "Marine weather station 1",
        expected_fields: CORE_FIELDS,
    },
    Station {
        code: "SM 2",
        description: "Marine weather station 2",
        expected_fields: CORE_FIELDS,
    },
    Station {
        code: "SM 3",
        description: "Marine weather station 3",
        expected_fields: CORE_FIELDS,
    },
    Station {
        code: "SM 4",
        description: "Marine weather station 4",
        expected_fields: CORE_FIELDS,
    },
];

// ---------------------------------------------------------------------------
// Map framing
// ---------------------------------------------------------------------------

/// Initial map centre (Douala estuary), WGS84 (latitude, longitude).
pub const MAP_CENTER: (f64, f64) = (4.05, 9.68);

/// Initial map zoom level.
pub const MAP_ZOOM: u8 = 9;

/// Tile URL template for the base map layer.
pub const MAP_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

/// Finds a registry entry by its upstream code.
pub fn find_station(code: &str) -> Option<&'static Station> {
    STATION_REGISTRY.iter().find(|s| s.code == code)
}

/// All registry codes in display order.
pub fn station_codes() -> Vec<&'static str> {
    STATION_REGISTRY.iter().map(|s| s.code).collect()
}

/// Station selection for the Live Data view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StationFilter {
    #[default]
    All,
    Only(String),
}

impl StationFilter {
    /// Parses a user selection. `all` (any case) or an empty string selects
    /// every station; a code without its space ("SM1") is accepted.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return StationFilter::All;
        }
        let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        let code = STATION_REGISTRY
            .iter()
            .find(|s| s.code.replace(' ', "").eq_ignore_ascii_case(&compact))
            .map(|s| s.code.to_string())
            .unwrap_or_else(|| trimmed.to_string());
        StationFilter::Only(code)
    }

    pub fn matches(&self, station: Option<&str>) -> bool {
        match self {
            StationFilter::All => true,
            StationFilter::Only(code) => station == Some(code.as_str()),
        }
    }
}

impl fmt::Display for StationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationFilter::All => write!(f, "all stations"),
            StationFilter::Only(code) => write!(f, "{}", code),
        }
    }
}
