//! Reference index
//!
//! Auxiliary lookup files (aircraft models, engine models) loaded once per
//! run into in-memory maps keyed by their join code. The index is read-only
//! after loading and a missing code yields an empty bundle, never an error.
//!
//! # File Format
//! Comma-delimited, first row is a header, first column is the join code.
//! Values are space padded and lines usually end with a trailing comma:
//! ```text
//! CODE,MFR,MODEL,TYPE-ACFT,TYPE-ENG,AC-CAT,BUILD-CERT-IND,NO-ENG,NO-SEATS,AC-WEIGHT,SPEED,
//! 2072738,CESSNA                        ,172S              ,4,1,1,0,01,004,CLASS 1,0124,
//! ```

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{EtlError, Result};

/// Rows narrower than this are skipped
pub const MIN_REFERENCE_COLUMNS: usize = 3;

/// Attribute bundle built from one reference row
pub trait ReferenceRecord: Default {
    /// Human-readable file kind for logs
    const KIND: &'static str;

    /// Build the bundle from all columns of a row (column 0 is the join code)
    fn from_columns(columns: &[String]) -> Self;
}

/// Trimmed column value, absent when blank or out of range
fn column(columns: &[String], index: usize) -> Option<String> {
    columns
        .get(index)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Aircraft make/model reference (ACFTREF)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AircraftRef {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    /// Aircraft type code, see [`crate::codes::CodeDictionary::aircraft_type`]
    pub type_aircraft: Option<String>,
    /// Engine type code, see [`crate::codes::CodeDictionary::engine_type`]
    pub type_engine: Option<String>,
    pub engine_count: Option<String>,
    pub seat_count: Option<String>,
    /// e.g. "CLASS 1"
    pub weight_class: Option<String>,
    /// Average cruising speed in mph
    pub cruising_speed: Option<String>,
}

impl ReferenceRecord for AircraftRef {
    const KIND: &'static str = "aircraft reference";

    fn from_columns(columns: &[String]) -> Self {
        Self {
            manufacturer: column(columns, 1),
            model: column(columns, 2),
            type_aircraft: column(columns, 3),
            type_engine: column(columns, 4),
            engine_count: column(columns, 7),
            seat_count: column(columns, 8),
            weight_class: column(columns, 9),
            cruising_speed: column(columns, 10),
        }
    }
}

/// Engine make/model reference (ENGINE)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineRef {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub engine_type: Option<String>,
    pub horsepower: Option<String>,
}

impl ReferenceRecord for EngineRef {
    const KIND: &'static str = "engine reference";

    fn from_columns(columns: &[String]) -> Self {
        Self {
            manufacturer: column(columns, 1),
            model: column(columns, 2),
            engine_type: column(columns, 3),
            horsepower: column(columns, 4),
        }
    }
}

/// One loaded reference file
#[derive(Debug, Default)]
pub struct ReferenceTable<B> {
    entries: HashMap<String, B>,
    empty: B,
    skipped_rows: usize,
}

impl<B: ReferenceRecord> ReferenceTable<B> {
    /// Load a reference file from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EtlError::SourceFileMissing(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;

        info!(
            kind = B::KIND,
            path = %path.display(),
            entries = table.len(),
            skipped = table.skipped_rows,
            "Loaded reference table"
        );

        Ok(table)
    }

    /// Load from any reader; the first row is treated as a header
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut entries = HashMap::new();
        let mut skipped_rows = 0;
        let mut record = csv::ByteRecord::new();
        let mut line_num = 1;

        loop {
            line_num += 1;
            match csv_reader.read_byte_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {},
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    debug!(kind = B::KIND, line = line_num, error = %e, "Skipping unreadable reference row");
                    skipped_rows += 1;
                    continue;
                },
            }

            if record.len() < MIN_REFERENCE_COLUMNS {
                skipped_rows += 1;
                continue;
            }

            let columns: Vec<String> = record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect();

            let code = columns[0].trim_start_matches('\u{feff}').trim();
            if code.is_empty() {
                skipped_rows += 1;
                continue;
            }

            entries.insert(code.to_string(), B::from_columns(&columns));
        }

        Ok(Self {
            entries,
            empty: B::default(),
            skipped_rows,
        })
    }

    /// Build a table directly from bundles
    pub fn from_entries(entries: impl IntoIterator<Item = (String, B)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            empty: B::default(),
            skipped_rows: 0,
        }
    }

    /// Bundle for `code`; an empty bundle when the code is unknown
    pub fn get(&self, code: &str) -> &B {
        self.entries.get(code.trim()).unwrap_or(&self.empty)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// All reference tables needed to normalize FAA master rows
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    aircraft: ReferenceTable<AircraftRef>,
    engines: ReferenceTable<EngineRef>,
}

impl ReferenceIndex {
    pub fn new(aircraft: ReferenceTable<AircraftRef>, engines: ReferenceTable<EngineRef>) -> Self {
        Self { aircraft, engines }
    }

    /// Load the aircraft and engine reference files
    pub fn load(aircraft_path: &Path, engine_path: &Path) -> Result<Self> {
        Ok(Self {
            aircraft: ReferenceTable::load(aircraft_path)?,
            engines: ReferenceTable::load(engine_path)?,
        })
    }

    pub fn aircraft(&self, code: &str) -> &AircraftRef {
        self.aircraft.get(code)
    }

    pub fn engine(&self, code: &str) -> &EngineRef {
        self.engines.get(code)
    }

    pub fn aircraft_table(&self) -> &ReferenceTable<AircraftRef> {
        &self.aircraft
    }

    pub fn engine_table(&self) -> &ReferenceTable<EngineRef> {
        &self.engines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ACFTREF: &str = "\u{feff}CODE,MFR,MODEL,TYPE-ACFT,TYPE-ENG,AC-CAT,BUILD-CERT-IND,NO-ENG,NO-SEATS,AC-WEIGHT,SPEED,\n\
        2072738,CESSNA                        ,172S              ,4,1,1,0,01,004,CLASS 1,0124,\n\
        A001,BOEING,737-800,5,5,1,0,02,189,CLASS 3,0530,\n\
        BAD,X\n";

    const ENGINE: &str = "CODE,MFR,MODEL,TYPE,HORSEPOWER,THRUST,\n\
        41514,LYCOMING,IO-360-L2A,1,00180,000000,\n\
        E002,GE,CFM56,5,,027300,\n";

    #[test]
    fn test_aircraft_columns() {
        let table = ReferenceTable::<AircraftRef>::from_reader(ACFTREF.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.skipped_rows(), 1);

        let cessna = table.get("2072738");
        assert_eq!(cessna.manufacturer.as_deref(), Some("CESSNA"));
        assert_eq!(cessna.model.as_deref(), Some("172S"));
        assert_eq!(cessna.type_aircraft.as_deref(), Some("4"));
        assert_eq!(cessna.type_engine.as_deref(), Some("1"));
        assert_eq!(cessna.engine_count.as_deref(), Some("01"));
        assert_eq!(cessna.seat_count.as_deref(), Some("004"));
        assert_eq!(cessna.weight_class.as_deref(), Some("CLASS 1"));
        assert_eq!(cessna.cruising_speed.as_deref(), Some("0124"));
    }

    #[test]
    fn test_header_row_is_not_an_entry() {
        let table = ReferenceTable::<AircraftRef>::from_reader(ACFTREF.as_bytes()).unwrap();
        assert!(!table.contains("CODE"));
        assert!(!table.contains("\u{feff}CODE"));
    }

    #[test]
    fn test_engine_columns_blank_is_absent() {
        let table = ReferenceTable::<EngineRef>::from_reader(ENGINE.as_bytes()).unwrap();
        let lycoming = table.get("41514");
        assert_eq!(lycoming.horsepower.as_deref(), Some("00180"));
        assert_eq!(lycoming.engine_type.as_deref(), Some("1"));
        assert!(table.get("E002").horsepower.is_none());
    }

    #[test]
    fn test_missing_code_returns_empty_bundle() {
        let table = ReferenceTable::<EngineRef>::from_reader(ENGINE.as_bytes()).unwrap();
        assert_eq!(table.get("NOPE"), &EngineRef::default());
        assert_eq!(table.get(""), &EngineRef::default());
    }

    #[test]
    fn test_last_duplicate_wins() {
        let data = "CODE,MFR,MODEL\nX1,FIRST,M1\nX1,SECOND,M2\n";
        let table = ReferenceTable::<EngineRef>::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("X1").manufacturer.as_deref(), Some("SECOND"));
    }

    #[test]
    fn test_index_loads_from_files() {
        let mut acft = NamedTempFile::new().unwrap();
        acft.write_all(ACFTREF.as_bytes()).unwrap();
        let mut eng = NamedTempFile::new().unwrap();
        eng.write_all(ENGINE.as_bytes()).unwrap();

        let index = ReferenceIndex::load(acft.path(), eng.path()).unwrap();
        assert_eq!(index.aircraft("A001").model.as_deref(), Some("737-800"));
        assert_eq!(index.engine("41514").manufacturer.as_deref(), Some("LYCOMING"));
        assert_eq!(index.aircraft_table().len(), 2);
        assert_eq!(index.engine_table().len(), 2);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = ReferenceTable::<EngineRef>::load(Path::new("/nonexistent/ENGINE.txt")).unwrap_err();
        assert!(matches!(err, EtlError::SourceFileMissing(_)));
    }
}
