//! Automobile payload (NHTSA vPIC decode)

use serde::{Deserialize, Serialize};

use super::enums::DriveType;
use super::validation::{check_non_negative, check_optional_range, ValidationError};

pub const VIN_LENGTH: usize = 17;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airbags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_restraint_info: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectricInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_kwh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charger_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_miles: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomobileData {
    pub vin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doors: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_rows: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement_l: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement_ci: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_cylinders: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_configuration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_hp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_kw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission_speeds: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<DriveType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brake_system_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gvwr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curb_weight_lb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_market: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncsa_make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncsa_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncsa_body_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety: Option<SafetyFeatures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electric: Option<ElectricInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_vin: Option<String>,
}

impl AutomobileData {
    /// Payload for `vin`, normalized the same way validation expects it
    pub fn new(vin: &str) -> Self {
        Self {
            vin: normalize_vin(vin),
            ..Default::default()
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.vin = normalize_vin(&self.vin);
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_vin(&self.vin)?;

        check_optional_range("automobile_data.doors", self.doors, 0, 6)?;
        check_optional_range("automobile_data.seat_rows", self.seat_rows, 1, 4)?;
        check_optional_range("automobile_data.engine_cylinders", self.engine_cylinders, 0, 16)?;
        check_optional_range("automobile_data.transmission_speeds", self.transmission_speeds, 1, 12)?;
        check_non_negative("automobile_data.displacement_l", self.displacement_l)?;
        check_non_negative("automobile_data.displacement_ci", self.displacement_ci)?;
        check_non_negative("automobile_data.engine_hp", self.engine_hp)?;
        check_non_negative("automobile_data.engine_kw", self.engine_kw)?;

        if let Some(ref electric) = self.electric {
            check_non_negative("automobile_data.electric.battery_kwh", electric.battery_kwh)?;
        }

        Ok(())
    }
}

/// Trim and uppercase a VIN
pub fn normalize_vin(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// A VIN is 17 uppercase ASCII letters or digits, never I, O or Q
pub fn validate_vin(vin: &str) -> Result<(), ValidationError> {
    if vin.is_empty() {
        return Err(ValidationError::Missing("automobile_data.vin"));
    }
    if vin.len() != VIN_LENGTH {
        return Err(ValidationError::invalid_format(
            "automobile_data.vin",
            vin,
            "must be exactly 17 characters",
        ));
    }
    if !vin.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "automobile_data.vin",
            vin,
            "must be uppercase letters and digits",
        ));
    }
    if vin.bytes().any(|b| matches!(b, b'I' | b'O' | b'Q')) {
        return Err(ValidationError::invalid_format(
            "automobile_data.vin",
            vin,
            "letters I, O and Q are not allowed",
        ));
    }
    Ok(())
}
