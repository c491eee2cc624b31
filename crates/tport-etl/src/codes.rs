//! Code dictionaries
//!
//! Static tables from the short codes used in registry files (`"4"`, `"V"`)
//! to the canonical schema vocabulary. Lookups trim the code and never fail:
//! an unknown or blank code resolves to the table default.

use std::fmt;
use std::str::FromStr;

use tport_common::schema::{AircraftType, AirworthinessClass, EngineType, OwnerType, RegistrationStatus};

/// One code table with its fallback value
#[derive(Debug, Clone, Copy)]
pub struct CodeTable<T: 'static> {
    entries: &'static [(&'static str, T)],
    default: T,
}

impl<T: Copy + 'static> CodeTable<T> {
    pub const fn new(entries: &'static [(&'static str, T)], default: T) -> Self {
        Self { entries, default }
    }

    /// Canonical value for `code`, or the table default
    pub fn lookup(&self, code: &str) -> T {
        let code = code.trim();
        self.entries
            .iter()
            .find(|(key, _)| *key == code)
            .map(|(_, value)| *value)
            .unwrap_or(self.default)
    }

    pub fn contains(&self, code: &str) -> bool {
        let code = code.trim();
        self.entries.iter().any(|(key, _)| *key == code)
    }

    pub fn default_value(&self) -> T {
        self.default
    }

    pub fn entries(&self) -> &'static [(&'static str, T)] {
        self.entries
    }
}

/// Names accepted by [`CodeDictionary::lookup`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeTableName {
    AircraftType,
    EngineType,
    RegistrantType,
    RegistrationStatus,
    AirworthinessClass,
}

impl CodeTableName {
    pub const ALL: [CodeTableName; 5] = [
        CodeTableName::AircraftType,
        CodeTableName::EngineType,
        CodeTableName::RegistrantType,
        CodeTableName::RegistrationStatus,
        CodeTableName::AirworthinessClass,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CodeTableName::AircraftType => "aircraft-type",
            CodeTableName::EngineType => "engine-type",
            CodeTableName::RegistrantType => "registrant-type",
            CodeTableName::RegistrationStatus => "registration-status",
            CodeTableName::AirworthinessClass => "airworthiness-class",
        }
    }
}

impl fmt::Display for CodeTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeTableName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown code table: {}", s))
    }
}

// ============================================================================
// FAA Releasable Aircraft tables
// ============================================================================

const FAA_AIRCRAFT_TYPES: &[(&str, AircraftType)] = &[
    ("1", AircraftType::Glider),
    ("2", AircraftType::Balloon),
    ("3", AircraftType::Blimp),
    ("4", AircraftType::FixedWingSingle),
    ("5", AircraftType::FixedWingMulti),
    ("6", AircraftType::Rotorcraft),
    ("7", AircraftType::WeightShiftControl),
    ("8", AircraftType::PoweredParachute),
    ("9", AircraftType::Gyroplane),
    ("H", AircraftType::HybridLift),
    ("O", AircraftType::Other),
];

const FAA_ENGINE_TYPES: &[(&str, EngineType)] = &[
    ("0", EngineType::NoEngine),
    ("1", EngineType::Reciprocating),
    ("2", EngineType::TurboProp),
    ("3", EngineType::TurboShaft),
    ("4", EngineType::TurboJet),
    ("5", EngineType::TurboFan),
    ("6", EngineType::Ramjet),
    ("7", EngineType::TwoCycle),
    ("8", EngineType::FourCycle),
    ("9", EngineType::Unknown),
    ("10", EngineType::Electric),
    ("11", EngineType::Rotary),
];

const FAA_REGISTRANT_TYPES: &[(&str, OwnerType)] = &[
    ("1", OwnerType::Individual),
    ("2", OwnerType::Partnership),
    ("3", OwnerType::Corporation),
    ("4", OwnerType::CoOwned),
    ("5", OwnerType::Government),
    ("7", OwnerType::Llc),
    ("8", OwnerType::NonCitizenCorporation),
    ("9", OwnerType::NonCitizenCoOwned),
];

const FAA_STATUS_CODES: &[(&str, Option<RegistrationStatus>)] = &[
    ("V", Some(RegistrationStatus::Active)),
    ("T", Some(RegistrationStatus::Active)),
    ("M", Some(RegistrationStatus::Active)),
    ("R", Some(RegistrationStatus::Pending)),
    ("N", Some(RegistrationStatus::Pending)),
    ("7", Some(RegistrationStatus::Pending)),
    ("E", Some(RegistrationStatus::Inactive)),
    ("9", Some(RegistrationStatus::Inactive)),
    ("6", Some(RegistrationStatus::Inactive)),
    ("13", Some(RegistrationStatus::Expired)),
];

const FAA_AIRWORTHINESS_CLASSES: &[(&str, Option<AirworthinessClass>)] = &[
    ("1", Some(AirworthinessClass::Standard)),
    ("2", Some(AirworthinessClass::Limited)),
    ("3", Some(AirworthinessClass::Restricted)),
    ("4", Some(AirworthinessClass::Experimental)),
    ("5", Some(AirworthinessClass::Provisional)),
    ("6", Some(AirworthinessClass::Multiple)),
    ("7", Some(AirworthinessClass::Primary)),
    ("8", Some(AirworthinessClass::SpecialFlightPermit)),
    ("9", Some(AirworthinessClass::LightSport)),
];

/// The full set of tables a normalizer translates codes through
#[derive(Debug, Clone, Copy)]
pub struct CodeDictionary {
    aircraft_types: CodeTable<AircraftType>,
    engine_types: CodeTable<EngineType>,
    registrant_types: CodeTable<OwnerType>,
    registration_statuses: CodeTable<Option<RegistrationStatus>>,
    airworthiness_classes: CodeTable<Option<AirworthinessClass>>,
}

impl Default for CodeDictionary {
    fn default() -> Self {
        Self::faa()
    }
}

impl CodeDictionary {
    /// Tables of the FAA Releasable Aircraft database
    pub fn faa() -> Self {
        Self {
            aircraft_types: CodeTable::new(FAA_AIRCRAFT_TYPES, AircraftType::Other),
            engine_types: CodeTable::new(FAA_ENGINE_TYPES, EngineType::Unknown),
            registrant_types: CodeTable::new(FAA_REGISTRANT_TYPES, OwnerType::Other),
            registration_statuses: CodeTable::new(FAA_STATUS_CODES, None),
            airworthiness_classes: CodeTable::new(FAA_AIRWORTHINESS_CLASSES, None),
        }
    }

    pub fn aircraft_type(&self, code: &str) -> AircraftType {
        self.aircraft_types.lookup(code)
    }

    pub fn engine_type(&self, code: &str) -> EngineType {
        self.engine_types.lookup(code)
    }

    pub fn registrant_type(&self, code: &str) -> OwnerType {
        self.registrant_types.lookup(code)
    }

    pub fn registration_status(&self, code: &str) -> Option<RegistrationStatus> {
        self.registration_statuses.lookup(code)
    }

    pub fn airworthiness_class(&self, code: &str) -> Option<AirworthinessClass> {
        self.airworthiness_classes.lookup(code)
    }

    /// Untyped lookup by table name; `None` only for tables whose default is absent
    pub fn lookup(&self, table: CodeTableName, code: &str) -> Option<&'static str> {
        match table {
            CodeTableName::AircraftType => Some(self.aircraft_type(code).as_str()),
            CodeTableName::EngineType => Some(self.engine_type(code).as_str()),
            CodeTableName::RegistrantType => Some(self.registrant_type(code).as_str()),
            CodeTableName::RegistrationStatus => self.registration_status(code).map(|s| s.as_str()),
            CodeTableName::AirworthinessClass => self.airworthiness_class(code).map(|a| a.as_str()),
        }
    }
}
