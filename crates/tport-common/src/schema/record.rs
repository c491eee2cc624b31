//! The unified transport record
//!
//! A [`UnifiedRecord`] can only be obtained through [`UnifiedRecord::construct`]
//! or by deserializing JSON, and both paths run the full validator. Holding a
//! record therefore means holding a valid one.

use serde::{Deserialize, Serialize};

use super::automobile::{normalize_vin, AutomobileData};
use super::common::{Dates, Location, Metadata, Owner, Specifications};
use super::enums::{DataSource, RegistrationStatus, TransportType};
use super::plane::PlaneData;
use super::train::TrainData;
use super::validation::{check_country_code, check_optional_range, ValidationError, MAX_YEAR, MIN_YEAR};
use crate::error::Result;

/// Type-specific part of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Plane(PlaneData),
    Automobile(AutomobileData),
    Train(TrainData),
}

impl Payload {
    pub fn transport_type(&self) -> TransportType {
        match self {
            Payload::Plane(_) => TransportType::Plane,
            Payload::Automobile(_) => TransportType::Automobile,
            Payload::Train(_) => TransportType::Train,
        }
    }

    /// Registry identifier the record is keyed on
    pub fn natural_key(&self) -> &str {
        match self {
            Payload::Plane(plane) => &plane.n_number,
            Payload::Automobile(car) => &car.vin,
            Payload::Train(train) => &train.reporting_mark,
        }
    }

    /// `raw` in the canonical spelling of this payload's identifier
    fn normalize_key(&self, raw: &str) -> String {
        match self {
            Payload::Plane(_) => PlaneData::normalize_n_number(raw),
            Payload::Automobile(_) => normalize_vin(raw),
            Payload::Train(_) => raw.trim().to_ascii_uppercase(),
        }
    }

    fn normalize(&mut self) {
        match self {
            Payload::Plane(plane) => plane.normalize(),
            Payload::Automobile(car) => car.normalize(),
            Payload::Train(train) => train.normalize(),
        }
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        match self {
            Payload::Plane(plane) => plane.validate(),
            Payload::Automobile(car) => car.validate(),
            Payload::Train(train) => train.validate(),
        }
    }
}

/// Optional descriptive fields passed to [`UnifiedRecord::construct`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFields {
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_country: Option<String>,
    pub model: Option<String>,
    pub model_variant: Option<String>,
    pub year: Option<i32>,
    pub registration_id: Option<String>,
    pub registration_country: Option<String>,
    pub registration_status: Option<RegistrationStatus>,
    pub location: Option<Location>,
    pub dates: Option<Dates>,
    pub owner: Option<Owner>,
    pub specifications: Option<Specifications>,
}

impl RecordFields {
    /// Blank strings become absent
    fn normalize(&mut self) {
        for field in [
            &mut self.category,
            &mut self.manufacturer,
            &mut self.manufacturer_country,
            &mut self.model,
            &mut self.model_variant,
            &mut self.registration_id,
            &mut self.registration_country,
        ] {
            blank_to_none(field);
        }
        if let Some(ref mut location) = self.location {
            blank_to_none(&mut location.city);
            blank_to_none(&mut location.state_province);
            blank_to_none(&mut location.country);
        }
        if let Some(ref mut owner) = self.owner {
            blank_to_none(&mut owner.name);
        }
        if self.dates.as_ref().is_some_and(Dates::is_empty) {
            self.dates = None;
        }
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        check_optional_range("year", self.year, MIN_YEAR, MAX_YEAR)?;
        check_country_code("manufacturer_country", self.manufacturer_country.as_deref())?;
        check_country_code("registration_country", self.registration_country.as_deref())?;
        if let Some(ref location) = self.location {
            location.validate()?;
        }
        if let Some(ref owner) = self.owner {
            owner.validate()?;
        }
        if let Some(ref specs) = self.specifications {
            specs.validate()?;
        }
        Ok(())
    }
}

fn blank_to_none(value: &mut Option<String>) {
    if let Some(text) = value.take() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            *value = Some(if trimmed.len() == text.len() {
                text
            } else {
                trimmed.to_string()
            });
        }
    }
}

/// Idempotency key of a record: `{transport_type}-{source_id}`
pub fn transport_id_for(transport_type: TransportType, source_id: &str) -> String {
    format!("{}-{}", transport_type, source_id.trim())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordDraft", into = "RecordDraft")]
pub struct UnifiedRecord {
    transport_id: String,
    transport_type: TransportType,
    fields: RecordFields,
    metadata: Metadata,
    payload: Payload,
}

impl UnifiedRecord {
    /// Validate and assemble a record.
    ///
    /// `transport_id` is derived from `transport_type` and `metadata.source_id`,
    /// which is stored in the payload identifier's canonical spelling so that
    /// one vehicle always gets one id. Fails if any field is out of range, if
    /// the payload does not match `transport_type`, if `metadata.source` is
    /// not the provider for it, or if `metadata.source_id` names a different
    /// vehicle than the payload.
    pub fn construct(
        transport_type: TransportType,
        mut metadata: Metadata,
        mut fields: RecordFields,
        mut payload: Payload,
    ) -> std::result::Result<Self, ValidationError> {
        metadata.source_id = metadata.source_id.trim().to_string();
        metadata.validate()?;

        let expected_source = transport_type.expected_source();
        if metadata.source != expected_source {
            return Err(ValidationError::mismatch(
                "metadata.source",
                expected_source,
                metadata.source,
            ));
        }

        if payload.transport_type() != transport_type {
            return Err(ValidationError::mismatch(
                "transport_type",
                payload.transport_type(),
                transport_type,
            ));
        }

        payload.normalize();
        payload.validate()?;

        let source_id = payload.normalize_key(&metadata.source_id);
        if source_id != payload.natural_key() {
            return Err(ValidationError::mismatch(
                "metadata.source_id",
                payload.natural_key(),
                &metadata.source_id,
            ));
        }
        metadata.source_id = source_id;

        fields.normalize();
        fields.validate()?;

        Ok(Self {
            transport_id: transport_id_for(transport_type, &metadata.source_id),
            transport_type,
            fields,
            metadata,
            payload,
        })
    }

    /// Parse and validate a stored document
    pub fn from_json(json: &str) -> Result<Self> {
        let draft: RecordDraft = serde_json::from_str(json)?;
        Ok(Self::try_from(draft)?)
    }

    /// Document body as written to the search index
    pub fn to_document(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn transport_id(&self) -> &str {
        &self.transport_id
    }

    pub fn transport_type(&self) -> TransportType {
        self.transport_type
    }

    pub fn source(&self) -> DataSource {
        self.metadata.source
    }

    pub fn category(&self) -> Option<&str> {
        self.fields.category.as_deref()
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.fields.manufacturer.as_deref()
    }

    pub fn manufacturer_country(&self) -> Option<&str> {
        self.fields.manufacturer_country.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.fields.model.as_deref()
    }

    pub fn model_variant(&self) -> Option<&str> {
        self.fields.model_variant.as_deref()
    }

    pub fn year(&self) -> Option<i32> {
        self.fields.year
    }

    pub fn registration_id(&self) -> Option<&str> {
        self.fields.registration_id.as_deref()
    }

    pub fn registration_country(&self) -> Option<&str> {
        self.fields.registration_country.as_deref()
    }

    pub fn registration_status(&self) -> Option<RegistrationStatus> {
        self.fields.registration_status
    }

    pub fn location(&self) -> Option<&Location> {
        self.fields.location.as_ref()
    }

    pub fn dates(&self) -> Option<&Dates> {
        self.fields.dates.as_ref()
    }

    pub fn owner(&self) -> Option<&Owner> {
        self.fields.owner.as_ref()
    }

    pub fn specifications(&self) -> Option<&Specifications> {
        self.fields.specifications.as_ref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn plane_data(&self) -> Option<&PlaneData> {
        match self.payload {
            Payload::Plane(ref plane) => Some(plane),
            _ => None,
        }
    }

    pub fn automobile_data(&self) -> Option<&AutomobileData> {
        match self.payload {
            Payload::Automobile(ref car) => Some(car),
            _ => None,
        }
    }

    pub fn train_data(&self) -> Option<&TrainData> {
        match self.payload {
            Payload::Train(ref train) => Some(train),
            _ => None,
        }
    }
}

/// Wire shape of a record, unchecked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDraft {
    transport_id: String,
    transport_type: TransportType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manufacturer_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registration_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registration_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registration_status: Option<RegistrationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dates: Option<Dates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner: Option<Owner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    specifications: Option<Specifications>,
    metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    plane_data: Option<PlaneData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    automobile_data: Option<AutomobileData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    train_data: Option<TrainData>,
}

impl TryFrom<RecordDraft> for UnifiedRecord {
    type Error = ValidationError;

    fn try_from(draft: RecordDraft) -> std::result::Result<Self, Self::Error> {
        let payload = match (draft.plane_data, draft.automobile_data, draft.train_data) {
            (Some(plane), None, None) => Payload::Plane(plane),
            (None, Some(car), None) => Payload::Automobile(car),
            (None, None, Some(train)) => Payload::Train(train),
            (None, None, None) => {
                let key = match draft.transport_type {
                    TransportType::Plane => "plane_data",
                    TransportType::Automobile => "automobile_data",
                    TransportType::Train => "train_data",
                };
                return Err(ValidationError::Missing(key));
            },
            _ => {
                return Err(ValidationError::invalid_format(
                    "payload",
                    draft.transport_id,
                    "exactly one of plane_data, automobile_data, train_data is allowed",
                ))
            },
        };

        let fields = RecordFields {
            category: draft.category,
            manufacturer: draft.manufacturer,
            manufacturer_country: draft.manufacturer_country,
            model: draft.model,
            model_variant: draft.model_variant,
            year: draft.year,
            registration_id: draft.registration_id,
            registration_country: draft.registration_country,
            registration_status: draft.registration_status,
            location: draft.location,
            dates: draft.dates,
            owner: draft.owner,
            specifications: draft.specifications,
        };

        let record = UnifiedRecord::construct(draft.transport_type, draft.metadata, fields, payload)?;
        if record.transport_id != draft.transport_id {
            return Err(ValidationError::mismatch(
                "transport_id",
                record.transport_id,
                draft.transport_id,
            ));
        }
        Ok(record)
    }
}

impl From<UnifiedRecord> for RecordDraft {
    fn from(record: UnifiedRecord) -> Self {
        let (plane_data, automobile_data, train_data) = match record.payload {
            Payload::Plane(plane) => (Some(plane), None, None),
            Payload::Automobile(car) => (None, Some(car), None),
            Payload::Train(train) => (None, None, Some(train)),
        };
        let fields = record.fields;

        RecordDraft {
            transport_id: record.transport_id,
            transport_type: record.transport_type,
            category: fields.category,
            manufacturer: fields.manufacturer,
            manufacturer_country: fields.manufacturer_country,
            model: fields.model,
            model_variant: fields.model_variant,
            year: fields.year,
            registration_id: fields.registration_id,
            registration_country: fields.registration_country,
            registration_status: fields.registration_status,
            location: fields.location,
            dates: fields.dates,
            owner: fields.owner,
            specifications: fields.specifications,
            metadata: record.metadata,
            plane_data,
            automobile_data,
            train_data,
        }
    }
}
