//! Sub-objects shared by every transport type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{DataSource, OwnerType, PowerUnit};
use super::validation::{check_country_code, check_non_negative, check_range, check_required, ValidationError};

/// Latitude/longitude pair, stored as an index geo_point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("location.coordinates.lat", self.lat, -90.0, 90.0)?;
        check_range("location.coordinates.lon", self.lon, -180.0, 180.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
}

impl Location {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_country_code("location.country", self.country.as_deref())?;
        match self.coordinates {
            Some(point) => point.validate(),
            None => Ok(()),
        }
    }
}

/// Lifecycle dates, all optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufactured: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<NaiveDate>,
}

impl Dates {
    pub fn is_empty(&self) -> bool {
        self.manufactured.is_none()
            && self.registered.is_none()
            && self.last_activity.is_none()
            && self.expires.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "type")]
    pub owner_type: OwnerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Owner {
    pub fn new(owner_type: OwnerType) -> Self {
        Self {
            owner_type,
            name: None,
            country: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_country_code("owner.country", self.country.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Power {
    pub value: f64,
    pub unit: PowerUnit,
}

impl Power {
    pub fn hp(value: f64) -> Self {
        Self {
            value,
            unit: PowerUnit::Hp,
        }
    }

    pub fn kw(value: f64) -> Self {
        Self {
            value,
            unit: PowerUnit::Kw,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specifications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    /// Seats or passenger capacity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<Power>,
}

impl Specifications {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_non_negative("specifications.power.value", self.power.map(|p| p.value))
    }
}

/// Provenance of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub source: DataSource,
    /// Provider's natural key (N-number, VIN, reporting mark)
    pub source_id: String,
    #[serde(default = "Utc::now")]
    pub ingest_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Metadata stamped with the current time
    pub fn new(source: DataSource, source_id: impl Into<String>) -> Self {
        Self {
            source,
            source_id: source_id.into(),
            ingest_date: Utc::now(),
            last_updated: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required("metadata.source_id", &self.source_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_bounds() {
        assert!(GeoPoint::new(41.88, -87.63).validate().is_ok());
        assert!(GeoPoint::new(90.0, 180.0).validate().is_ok());
        let err = GeoPoint::new(91.0, 0.0).validate().unwrap_err();
        assert_eq!(err.field(), "location.coordinates.lat");
        let err = GeoPoint::new(0.0, -180.5).validate().unwrap_err();
        assert_eq!(err.field(), "location.coordinates.lon");
    }

    #[test]
    fn test_location_checks_country_and_coordinates() {
        let mut location = Location {
            city: Some("Wichita".to_string()),
            state_province: Some("KS".to_string()),
            country: Some("US".to_string()),
            coordinates: None,
        };
        assert!(location.validate().is_ok());

        location.country = Some("usa".to_string());
        assert!(location.validate().is_err());
    }

    #[test]
    fn test_negative_power_rejected() {
        let specs = Specifications {
            power: Some(Power::hp(-10.0)),
            ..Default::default()
        };
        assert!(specs.validate().is_err());
    }

    #[test]
    fn test_owner_serializes_type_key() {
        let owner = Owner {
            owner_type: OwnerType::Llc,
            name: Some("Skyways LLC".to_string()),
            country: Some("US".to_string()),
        };
        let value = serde_json::to_value(&owner).unwrap();
        assert_eq!(value["type"], "llc");
        assert_eq!(value["name"], "Skyways LLC");
    }

    #[test]
    fn test_metadata_defaults_ingest_date() {
        let metadata: Metadata =
            serde_json::from_str(r#"{"source":"faa","source_id":"N12345"}"#).unwrap();
        assert_eq!(metadata.source, DataSource::Faa);
        assert!(metadata.last_updated.is_none());
        assert!(metadata.validate().is_ok());
    }

    #[test]
    fn test_dates_serialize_iso() {
        let dates = Dates {
            manufactured: NaiveDate::from_ymd_opt(2020, 1, 1),
            ..Default::default()
        };
        let value = serde_json::to_value(&dates).unwrap();
        assert_eq!(value["manufactured"], "2020-01-01");
        assert!(value.get("registered").is_none());
        assert!(!dates.is_empty());
        assert!(Dates::default().is_empty());
    }
}
