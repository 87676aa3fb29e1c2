//! Display formatting for numeric fields.
//!
//! Every card and table cell goes through `format_value`, so a missing or
//! garbled upstream value shows up as `N/A` instead of `0.00` or a panic.

use crate::model::FieldValue;

/// Marker shown in place of a value that is absent or not numeric.
pub const UNAVAILABLE: &str = "N/A";

/// Decimal places used when a caller has no preference.
pub const DEFAULT_PRECISION: usize = 2;

/// Formats `value` with exactly `precision` fractional digits, or returns
/// `UNAVAILABLE`.
pub fn format_value(value: Option<&FieldValue>, precision: usize) -> String {
    match value.and_then(FieldValue::as_f64) {
        Some(n) => format!("{:.*}", precision, n),
        None => UNAVAILABLE.to_string(),
    }
}

/// `format_value` with `DEFAULT_PRECISION`.
pub fn format_default(value: Option<&FieldValue>) -> String {
    format_value(value, DEFAULT_PRECISION)
}

/// Formats `value` followed by a unit, e.g. `"27.5 °C"`. The unit is dropped
/// when the value is unavailable.
pub fn format_with_unit(value: Option<&FieldValue>, precision: usize, unit: &str) -> String {
    match value.and_then(FieldValue::as_f64) {
        Some(n) => format!("{:.*} {}", precision, n, unit),
        None => UNAVAILABLE.to_string(),
    }
}

/// Raw text for fields shown verbatim (e.g. the precipitation risk string).
pub fn display_text(value: Option<&FieldValue>) -> String {
    match value {
        Some(v) => {
            let text = v.as_text();
            if text.trim().is_empty() {
                UNAVAILABLE.to_string()
            } else {
                text
            }
        }
        None => UNAVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fraction_digits(s: &str) -> usize {
        s.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
    }

    #[test]
    fn test_parseable_values_have_requested_precision() {
        let inputs = ["0", "27.456", "-3.1", "1013", " 88.9999 ", "1e3"];
        for input in inputs {
            for precision in 0..=3 {
                let out = format_value(Some(&FieldValue::from(input)), precision);
                assert_ne!(out, UNAVAILABLE, "{input:?} should be numeric");
                assert_eq!(
                    fraction_digits(&out),
                    precision,
                    "{input:?} at precision {precision} gave {out:?}"
                );
            }
        }
    }

    #[test]
    fn test_numbers_are_rounded() {
        assert_eq!(format_value(Some(&FieldValue::Number(27.456)), 1), "27.5");
        assert_eq!(format_value(Some(&FieldValue::Number(27.456)), 0), "27");
        assert_eq!(format_default(Some(&FieldValue::Number(5.0))), "5.00");
    }

    #[test]
    fn test_missing_and_garbage_are_unavailable() {
        assert_eq!(format_default(None), UNAVAILABLE);
        assert_eq!(format_default(Some(&FieldValue::from(""))), UNAVAILABLE);
        assert_eq!(format_default(Some(&FieldValue::from("abc"))), UNAVAILABLE);
        assert_eq!(format_default(Some(&FieldValue::from("NaN"))), UNAVAILABLE);
        assert_eq!(format_default(Some(&FieldValue::Number(f64::NAN))), UNAVAILABLE);
    }

    #[test]
    fn test_unit_is_dropped_when_unavailable() {
        assert_eq!(
            format_with_unit(Some(&FieldValue::from("1.2")), 1, "m"),
            "1.2 m"
        );
        assert_eq!(format_with_unit(None, 1, "m"), UNAVAILABLE);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(display_text(Some(&FieldValue::from("15%"))), "15%");
        assert_eq!(display_text(Some(&FieldValue::from("  "))), UNAVAILABLE);
        assert_eq!(display_text(None), UNAVAILABLE);
    }
}
