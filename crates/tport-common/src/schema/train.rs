//! Rail equipment payload

use serde::{Deserialize, Serialize};

use super::validation::{check_optional_range, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainData {
    /// Owner reporting mark, 2 to 4 uppercase letters (e.g. "BNSF")
    pub reporting_mark: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_speed_kmh: Option<u32>,
}

impl TrainData {
    pub fn new(reporting_mark: impl Into<String>) -> Self {
        Self {
            reporting_mark: reporting_mark.into(),
            ..Default::default()
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.reporting_mark = self.reporting_mark.trim().to_ascii_uppercase();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mark = &self.reporting_mark;
        if mark.is_empty() {
            return Err(ValidationError::Missing("train_data.reporting_mark"));
        }
        if !(2..=4).contains(&mark.len()) || !mark.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ValidationError::invalid_format(
                "train_data.reporting_mark",
                mark,
                "expected 2 to 4 uppercase letters",
            ));
        }
        check_optional_range("train_data.max_speed_kmh", self.max_speed_kmh, 0, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporting_mark() {
        assert!(TrainData::new("BNSF").validate().is_ok());
        assert!(TrainData::new("B").validate().is_err());
        assert!(TrainData::new("AMTRK").validate().is_err());
        assert!(TrainData::new("UP1").validate().is_err());
    }

    #[test]
    fn test_max_speed() {
        let mut train = TrainData::new("UP");
        train.max_speed_kmh = Some(320);
        assert!(train.validate().is_ok());
        train.max_speed_kmh = Some(700);
        assert!(train.validate().is_err());
    }
}
