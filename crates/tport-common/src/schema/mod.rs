//! Unified transport schema
//!
//! One record shape for every vehicle registry. Sub-objects live in
//! [`common`], one payload module per transport type, and every check in
//! [`validation`].

pub mod automobile;
pub mod common;
pub mod enums;
pub mod plane;
mod record;
pub mod train;
pub mod validation;

pub use automobile::{AutomobileData, ElectricInfo, SafetyFeatures};
pub use common::{Dates, GeoPoint, Location, Metadata, Owner, Power, Specifications};
pub use enums::{
    AircraftType, AirworthinessClass, DataSource, DriveType, EngineType, OwnerType, PowerUnit,
    RegistrationStatus, TransportType,
};
pub use plane::PlaneData;
pub use record::{transport_id_for, Payload, RecordFields, UnifiedRecord};
pub use train::TrainData;
pub use validation::ValidationError;
