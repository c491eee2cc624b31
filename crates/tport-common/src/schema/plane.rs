//! Aircraft payload (FAA registry)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::{AircraftType, AirworthinessClass};
use super::validation::{check_optional_range, check_required, ValidationError};

/// Largest engine count the FAA reference tables carry
pub const MAX_ENGINE_COUNT: u8 = 12;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaneData {
    /// Registration mark, always `N` followed by up to five characters
    pub n_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft_type: Option<AircraftType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_count: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airworthiness_class: Option<AirworthinessClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airworthiness_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_s_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_s_code_hex: Option<String>,
    #[serde(default)]
    pub fractional_ownership: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kit_manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kit_model: Option<String>,
    /// Maximum takeoff weight class, 1 (up to 12,499 lb) through 4 (UAV)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_class: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cruising_speed_mph: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faa_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft_mfr_model_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_mfr_model_code: Option<String>,
}

impl PlaneData {
    pub fn new(n_number: impl Into<String>) -> Self {
        Self {
            n_number: n_number.into(),
            ..Default::default()
        }
    }

    /// Canonical N-number: trimmed, uppercased, `N`-prefixed
    pub fn normalize_n_number(raw: &str) -> String {
        let upper = raw.trim().to_ascii_uppercase();
        if upper.starts_with('N') {
            upper
        } else {
            format!("N{}", upper)
        }
    }

    pub(crate) fn normalize(&mut self) {
        if !self.n_number.trim().is_empty() {
            self.n_number = Self::normalize_n_number(&self.n_number);
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required("plane_data.n_number", &self.n_number)?;
        if self.n_number.len() < 2
            || !self.n_number.starts_with('N')
            || !self.n_number.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(ValidationError::invalid_format(
                "plane_data.n_number",
                &self.n_number,
                "expected 'N' followed by letters or digits",
            ));
        }

        check_optional_range("plane_data.engine_count", self.engine_count, 0, MAX_ENGINE_COUNT)?;
        check_optional_range("plane_data.weight_class", self.weight_class, 1, 4)?;

        if let Some(ref hex) = self.mode_s_code_hex {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ValidationError::invalid_format(
                    "plane_data.mode_s_code_hex",
                    hex,
                    "expected hexadecimal digits",
                ));
            }
        }

        Ok(())
    }
}
