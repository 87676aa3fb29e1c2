//! Wind direction and wind strength classification.
//!
//! # Convention
//! Bearings follow the meteorological convention: degrees clockwise from
//! true north of the direction the wind blows FROM. A bearing of 0 is a
//! northerly wind and resolves to `N`.
//!
//! Map arrows point north at rotation 0 and are rotated by exactly the
//! normalized bearing, so an arrow points toward the wind's source and always
//! agrees with the compass label printed next to it.

use std::fmt;

use crate::model::FieldValue;

/// Label used when the bearing is missing or not numeric.
pub const UNKNOWN_DIRECTION: &str = "Unknown";

/// Width of one compass sector, in degrees.
const SECTOR_DEG: f64 = 45.0;

// ---------------------------------------------------------------------------
// Compass points
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compass {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Compass {
    /// Clockwise from north.
    pub const ALL: [Compass; 8] = [
        Compass::N,
        Compass::NE,
        Compass::E,
        Compass::SE,
        Compass::S,
        Compass::SW,
        Compass::W,
        Compass::NW,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Compass::N => "N",
            Compass::NE => "NE",
            Compass::E => "E",
            Compass::SE => "SE",
            Compass::S => "S",
            Compass::SW => "SW",
            Compass::W => "W",
            Compass::NW => "NW",
        }
    }

    /// Long name used by the map legend.
    pub fn name(self) -> &'static str {
        match self {
            Compass::N => "North",
            Compass::NE => "North-East",
            Compass::E => "East",
            Compass::SE => "South-East",
            Compass::S => "South",
            Compass::SW => "South-West",
            Compass::W => "West",
            Compass::NW => "North-West",
        }
    }

    /// Centre bearing of the sector.
    pub fn bearing(self) -> f64 {
        Compass::ALL
            .iter()
            .position(|c| *c == self)
            .map(|i| i as f64 * SECTOR_DEG)
            .unwrap_or(0.0)
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Wraps any finite bearing into [0, 360).
pub fn normalize_bearing(bearing: f64) -> Option<f64> {
    if !bearing.is_finite() {
        return None;
    }
    let b = bearing.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    Some(if b >= 360.0 { 0.0 } else { b })
}

/// Buckets a bearing into its nearest compass octant: 0° ± 22.5° is `N`.
pub fn resolve(bearing: f64) -> Option<Compass> {
    let b = normalize_bearing(bearing)?;
    let index = ((b + SECTOR_DEG / 2.0) / SECTOR_DEG).floor() as usize % 8;
    Some(Compass::ALL[index])
}

/// Compass label for a raw upstream value, or `UNKNOWN_DIRECTION`.
pub fn direction_label(value: Option<&FieldValue>) -> &'static str {
    value
        .and_then(FieldValue::as_f64)
        .and_then(resolve)
        .map(Compass::label)
        .unwrap_or(UNKNOWN_DIRECTION)
}

/// `"92° (E)"` for a numeric bearing, `UNKNOWN_DIRECTION` otherwise. The
/// degrees shown are normalized to [0, 360) after rounding.
pub fn describe_bearing(value: Option<&FieldValue>) -> String {
    let shown = value
        .and_then(FieldValue::as_f64)
        .and_then(normalize_bearing)
        .map(|b| b.round() % 360.0);
    match shown {
        Some(b) => format!("{:.0}° ({})", b, direction_label(value)),
        None => UNKNOWN_DIRECTION.to_string(),
    }
}

/// Rotation in degrees to apply to a north-pointing arrow glyph.
pub fn arrow_rotation(bearing: f64) -> Option<f64> {
    normalize_bearing(bearing)
}

// ---------------------------------------------------------------------------
// Wind strength
// ---------------------------------------------------------------------------

/// Marker class by wind speed in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindClass {
    /// Below 3 m/s.
    Low,
    /// 3 to 7 m/s inclusive.
    Moderate,
    /// Above 7 m/s.
    Strong,
}

impl WindClass {
    /// Missing speeds are drawn as `Low`.
    pub fn from_speed(speed_ms: Option<f64>) -> Self {
        match speed_ms {
            Some(s) if s > 7.0 => WindClass::Strong,
            Some(s) if s >= 3.0 => WindClass::Moderate,
            _ => WindClass::Low,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            WindClass::Low => "#3b82f6",
            WindClass::Moderate => "#f97316",
            WindClass::Strong => "#000000",
        }
    }

    /// Strong-wind markers are animated.
    pub fn pulses(self) -> bool {
        self == WindClass::Strong
    }

    pub fn legend(self) -> &'static str {
        match self {
            WindClass::Low => "Low (< 3 m/s)",
            WindClass::Moderate => "Moderate (3-7 m/s)",
            WindClass::Strong => "Strong (> 7 m/s)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_points() {
        assert_eq!(resolve(0.0), Some(Compass::N));
        assert_eq!(resolve(90.0), Some(Compass::E));
        assert_eq!(resolve(180.0), Some(Compass::S));
        assert_eq!(resolve(270.0), Some(Compass::W));
        assert_eq!(resolve(45.0), Some(Compass::NE));
        assert_eq!(resolve(315.0), Some(Compass::NW));
    }

    #[test]
    fn test_sector_edges() {
        assert_eq!(resolve(22.4), Some(Compass::N));
        assert_eq!(resolve(22.5), Some(Compass::NE));
        assert_eq!(resolve(337.4), Some(Compass::NW));
        assert_eq!(resolve(337.5), Some(Compass::N));
        assert_eq!(resolve(359.9), Some(Compass::N));
    }

    #[test]
    fn test_every_whole_degree_resolves() {
        for deg in 0..360 {
            let c = resolve(deg as f64).expect("finite bearing must resolve");
            assert!(Compass::ALL.contains(&c));
        }
    }

    #[test]
    fn test_bearings_wrap() {
        assert_eq!(resolve(360.0), Some(Compass::N));
        assert_eq!(resolve(450.0), Some(Compass::E));
        assert_eq!(resolve(-90.0), Some(Compass::W));
        assert_eq!(resolve(-1e-20), Some(Compass::N));
    }

    #[test]
    fn test_non_numeric_bearing_is_unknown() {
        assert_eq!(resolve(f64::NAN), None);
        assert_eq!(direction_label(None), UNKNOWN_DIRECTION);
        assert_eq!(direction_label(Some(&FieldValue::from("calm"))), UNKNOWN_DIRECTION);
        assert_eq!(direction_label(Some(&FieldValue::from("200"))), "S");
    }

    #[test]
    fn test_describe_bearing() {
        assert_eq!(describe_bearing(Some(&FieldValue::Number(92.4))), "92° (E)");
        assert_eq!(describe_bearing(Some(&FieldValue::from("x"))), UNKNOWN_DIRECTION);
        assert_eq!(describe_bearing(Some(&FieldValue::Number(-90.0))), "270° (W)");
        assert_eq!(describe_bearing(Some(&FieldValue::Number(359.6))), "0° (N)");
        assert_eq!(describe_bearing(Some(&FieldValue::from("725"))), "5° (N)");
    }

    #[test]
    fn test_arrow_rotation_agrees_with_label() {
        for c in Compass::ALL {
            let rotation = arrow_rotation(c.bearing()).expect("finite");
            assert_eq!(resolve(rotation), Some(c));
        }
        assert_eq!(arrow_rotation(-45.0), Some(315.0));
    }

    #[test]
    fn test_wind_class_thresholds() {
        assert_eq!(WindClass::from_speed(None), WindClass::Low);
        assert_eq!(WindClass::from_speed(Some(2.9)), WindClass::Low);
        assert_eq!(WindClass::from_speed(Some(3.0)), WindClass::Moderate);
        assert_eq!(WindClass::from_speed(Some(7.0)), WindClass::Moderate);
        assert_eq!(WindClass::from_speed(Some(7.1)), WindClass::Strong);
        assert!(WindClass::Strong.pulses());
        assert!(!WindClass::Moderate.pulses());
    }
}
