//! Transport Registry Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the transport registry workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`TportError`] and the [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by [`logging::LogConfig`]
//! - **Schema**: the unified transport record and its validator
//!
//! # Example
//!
//! ```no_run
//! use tport_common::schema::{
//!     DataSource, Metadata, Payload, PlaneData, RecordFields, TransportType, UnifiedRecord,
//! };
//!
//! fn build() -> tport_common::Result<UnifiedRecord> {
//!     let fields = RecordFields {
//!         manufacturer: Some("Cessna".to_string()),
//!         year: Some(2020),
//!         ..Default::default()
//!     };
//!     let record = UnifiedRecord::construct(
//!         TransportType::Plane,
//!         Metadata::new(DataSource::Faa, "N12345"),
//!         fields,
//!         Payload::Plane(PlaneData::new("N12345")),
//!     )?;
//!     Ok(record)
//! }
//! ```

pub mod error;
pub mod logging;
pub mod schema;

// Re-export commonly used types
pub use error::{Result, TportError};
pub use schema::ValidationError;
