//! Field-level validation rules for the unified schema
//!
//! Every check returns a [`ValidationError`] naming the offending field by its
//! dotted document path, e.g. `plane_data.engine_count`.

use std::fmt::Display;
use thiserror::Error;

/// Earliest model year accepted on a record
pub const MIN_YEAR: i32 = 1900;

/// Latest model year accepted on a record
pub const MAX_YEAR: i32 = 2030;

/// Why a record could not be constructed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("required field '{0}' is missing or empty")]
    Missing(&'static str),

    #[error("field '{field}' value {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("field '{field}' value '{value}' is malformed: {reason}")]
    InvalidFormat {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("field '{field}' has unknown value '{value}'")]
    UnknownVariant { field: &'static str, value: String },

    #[error("field '{field}' is '{actual}' but must be '{expected}'")]
    Mismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
}

impl ValidationError {
    pub fn invalid_format(field: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidFormat {
            field,
            value: value.into(),
            reason,
        }
    }

    pub fn mismatch(field: &'static str, expected: impl Display, actual: impl Display) -> Self {
        Self::Mismatch {
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Dotted path of the field that failed
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing(field) => *field,
            Self::OutOfRange { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::UnknownVariant { field, .. }
            | Self::Mismatch { field, .. } => *field,
        }
    }
}

/// Check `min <= value <= max`
pub fn check_range<T>(field: &'static str, value: T, min: T, max: T) -> Result<(), ValidationError>
where
    T: PartialOrd + Display,
{
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// [`check_range`] for optional fields; absent passes
pub fn check_optional_range<T>(
    field: &'static str,
    value: Option<T>,
    min: T,
    max: T,
) -> Result<(), ValidationError>
where
    T: PartialOrd + Display,
{
    match value {
        Some(value) => check_range(field, value, min, max),
        None => Ok(()),
    }
}

/// Non-negative finite float, absent passes
pub fn check_non_negative(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() => Err(ValidationError::invalid_format(
            field,
            v.to_string(),
            "must be a finite number",
        )),
        Some(v) => check_range(field, v, 0.0, f64::MAX),
        None => Ok(()),
    }
}

/// Required string must contain something besides whitespace
pub fn check_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(())
}

/// ISO 3166-1 alpha-2 shape: two uppercase ASCII letters
pub fn check_country_code(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(code) if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_uppercase()) => Err(
            ValidationError::invalid_format(field, code, "expected two uppercase letters"),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_year_accepted_only_inside_range(year in any::<i32>()) {
            let accepted = check_range("year", year, MIN_YEAR, MAX_YEAR).is_ok();
            prop_assert_eq!(accepted, (MIN_YEAR..=MAX_YEAR).contains(&year));
        }

        #[test]
        fn prop_country_code_needs_two_uppercase(code in "[A-Za-z]{1,3}") {
            let accepted = check_country_code("owner.country", Some(&code)).is_ok();
            let expected = code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase());
            prop_assert_eq!(accepted, expected);
        }
    }

    #[test]
    fn test_check_range_bounds_are_inclusive() {
        assert!(check_range("year", MIN_YEAR, MIN_YEAR, MAX_YEAR).is_ok());
        assert!(check_range("year", MAX_YEAR, MIN_YEAR, MAX_YEAR).is_ok());
        assert!(check_range("year", 1850, MIN_YEAR, MAX_YEAR).is_err());
        assert!(check_range("year", 2031, MIN_YEAR, MAX_YEAR).is_err());
    }

    #[test]
    fn test_out_of_range_message_names_field() {
        let err = check_range("year", 1850, MIN_YEAR, MAX_YEAR).unwrap_err();
        assert_eq!(err.field(), "year");
        assert_eq!(err.to_string(), "field 'year' value 1850 is outside 1900..=2030");
    }

    #[test]
    fn test_optional_range_absent_passes() {
        assert!(check_optional_range::<u8>("plane_data.weight_class", None, 1, 4).is_ok());
        assert!(check_optional_range("plane_data.weight_class", Some(5u8), 1, 4).is_err());
    }

    #[test]
    fn test_non_negative() {
        assert!(check_non_negative("battery_kwh", Some(0.0)).is_ok());
        assert!(check_non_negative("battery_kwh", Some(-1.5)).is_err());
        assert!(check_non_negative("battery_kwh", Some(f64::NAN)).is_err());
        assert!(check_non_negative("battery_kwh", None).is_ok());
    }

    #[test]
    fn test_country_code() {
        assert!(check_country_code("owner.country", Some("US")).is_ok());
        assert!(check_country_code("owner.country", None).is_ok());
        assert!(check_country_code("owner.country", Some("us")).is_err());
        assert!(check_country_code("owner.country", Some("USA")).is_err());
    }

    #[test]
    fn test_required() {
        assert!(check_required("model", "172").is_ok());
        assert_eq!(check_required("model", "  ").unwrap_err(), ValidationError::Missing("model"));
    }
}
