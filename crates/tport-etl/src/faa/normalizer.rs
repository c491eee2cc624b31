//! FAA MASTER row normalizer
//!
//! # Column Layout
//! Core positions always read from a MASTER row:
//!
//! | index | field |
//! |---|---|
//! | 0 | N-number |
//! | 1 | serial number |
//! | 2 | aircraft make/model code (joins ACFTREF) |
//! | 3 | engine make/model code (joins ENGINE) |
//! | 4 | year manufactured |
//! | 5 | registrant type |
//! | 6 | registrant name |
//! | 9 | city |
//! | 10 | state |
//!
//! Everything else is opt-in through [`MasterLayout`].

use chrono::NaiveDate;
use tport_common::schema::{
    AirworthinessClass, DataSource, Dates, Location, Metadata, Owner, Payload, PlaneData, Power,
    RecordFields, RegistrationStatus, Specifications, TransportType, UnifiedRecord,
};

use super::text::{normalize_manufacturer, parse_date, parse_digits, parse_weight_class};
use crate::codes::CodeDictionary;
use crate::normalize::{RecordNormalizer, RejectReason, Rejected};
use crate::reference::ReferenceIndex;

/// Rows narrower than this are rejected
pub const MIN_MASTER_COLUMNS: usize = 20;

/// First cell of the MASTER header row
pub const HEADER_TOKEN: &str = "N-NUMBER";

const COUNTRY_US: &str = "US";
const FUEL_GASOLINE: &str = "gasoline";

/// Optional MASTER columns.
///
/// The default layout reads none of them: status falls back to `active`
/// and airworthiness to `standard`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MasterLayout {
    pub status: Option<usize>,
    /// Certification column; its first character is the airworthiness class code
    pub certification: Option<usize>,
    pub region: Option<usize>,
    pub county: Option<usize>,
    pub mode_s: Option<usize>,
    pub fractional_owner: Option<usize>,
    pub airworthiness_date: Option<usize>,
    pub expiration: Option<usize>,
    pub kit_manufacturer: Option<usize>,
    pub kit_model: Option<usize>,
    pub mode_s_hex: Option<usize>,
}

impl MasterLayout {
    /// Positions documented in the FAA `ardata.pdf` layout
    pub fn extended() -> Self {
        Self {
            status: Some(20),
            certification: Some(17),
            region: Some(12),
            county: Some(13),
            mode_s: Some(21),
            fractional_owner: Some(22),
            airworthiness_date: Some(23),
            expiration: Some(29),
            kit_manufacturer: Some(31),
            kit_model: Some(32),
            mode_s_hex: Some(33),
        }
    }
}

/// Trimmed cell, empty when out of range
fn cell<'r>(row: &[&'r str], index: usize) -> &'r str {
    row.get(index).map(|value| value.trim()).unwrap_or("")
}

/// Trimmed non-empty cell as an owned string
fn text(row: &[&str], index: usize) -> Option<String> {
    Some(cell(row, index))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Like [`text`] for a column the layout may not define
fn optional_text(row: &[&str], index: Option<usize>) -> Option<String> {
    index.and_then(|i| text(row, i))
}

pub struct FaaNormalizer<'a> {
    codes: CodeDictionary,
    references: &'a ReferenceIndex,
    layout: MasterLayout,
}

impl<'a> FaaNormalizer<'a> {
    pub fn new(codes: CodeDictionary, references: &'a ReferenceIndex) -> Self {
        Self {
            codes,
            references,
            layout: MasterLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: MasterLayout) -> Self {
        self.layout = layout;
        self
    }

    fn registration_status(&self, row: &[&str]) -> Option<RegistrationStatus> {
        match self.layout.status {
            Some(index) => self.codes.registration_status(cell(row, index)),
            None => Some(RegistrationStatus::Active),
        }
    }

    fn airworthiness_class(&self, row: &[&str]) -> Option<AirworthinessClass> {
        match self.layout.certification {
            Some(index) => {
                let code = cell(row, index).get(..1).unwrap_or("");
                self.codes.airworthiness_class(code)
            },
            None => Some(AirworthinessClass::Standard),
        }
    }

    fn date_column(&self, row: &[&str], index: Option<usize>) -> Option<NaiveDate> {
        index.and_then(|i| parse_date(cell(row, i)))
    }
}

impl RecordNormalizer for FaaNormalizer<'_> {
    fn source(&self) -> DataSource {
        DataSource::Faa
    }

    fn normalize(&self, row: &[&str]) -> Result<UnifiedRecord, Rejected> {
        if row.len() < MIN_MASTER_COLUMNS {
            return Err(Rejected::new(
                RejectReason::TooFewColumns,
                format!("expected at least {} columns, got {}", MIN_MASTER_COLUMNS, row.len()),
            ));
        }

        let raw_key = cell(row, 0);
        if raw_key.is_empty() {
            return Err(Rejected::new(RejectReason::MissingKey, "blank N-number"));
        }
        if raw_key.eq_ignore_ascii_case(HEADER_TOKEN) {
            return Err(Rejected::new(RejectReason::HeaderRow, raw_key));
        }

        let n_number = PlaneData::normalize_n_number(raw_key);
        let aircraft_code = cell(row, 2);
        let engine_code = cell(row, 3);
        let year_raw = cell(row, 4);

        let aircraft = self.references.aircraft(aircraft_code);
        let engine = self.references.engine(engine_code);

        let aircraft_type = self
            .codes
            .aircraft_type(aircraft.type_aircraft.as_deref().unwrap_or(""));
        let engine_type = self
            .codes
            .engine_type(aircraft.type_engine.as_deref().unwrap_or(""));

        let year: Option<i32> = if year_raw.len() == 4 {
            parse_digits(year_raw)
        } else {
            None
        };

        let dates = Dates {
            manufactured: year.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)),
            registered: None,
            last_activity: None,
            expires: self.date_column(row, self.layout.expiration),
        };

        let owner = Owner {
            owner_type: self.codes.registrant_type(cell(row, 5)),
            name: text(row, 6),
            country: Some(COUNTRY_US.to_string()),
        };

        let location = Location {
            city: text(row, 9),
            state_province: text(row, 10),
            country: Some(COUNTRY_US.to_string()),
            coordinates: None,
        };

        let specifications = Specifications {
            engine_type: Some(engine_type.as_str().to_string()),
            fuel_type: Some(FUEL_GASOLINE.to_string()),
            capacity: aircraft.seat_count.as_deref().and_then(parse_digits),
            power: engine
                .horsepower
                .as_deref()
                .and_then(parse_digits::<u32>)
                .map(|hp| Power::hp(f64::from(hp))),
        };

        let mode_s_code_hex = optional_text(row, self.layout.mode_s_hex)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()));

        let plane = PlaneData {
            n_number: n_number.clone(),
            serial_number: text(row, 1),
            aircraft_type: Some(aircraft_type),
            engine_count: aircraft.engine_count.as_deref().and_then(parse_digits),
            engine_manufacturer: engine.manufacturer.clone(),
            engine_model: engine.model.clone(),
            airworthiness_class: self.airworthiness_class(row),
            airworthiness_date: self.date_column(row, self.layout.airworthiness_date),
            mode_s_code: optional_text(row, self.layout.mode_s),
            mode_s_code_hex,
            fractional_ownership: optional_text(row, self.layout.fractional_owner)
                .is_some_and(|flag| flag.eq_ignore_ascii_case("Y")),
            type_certificate: None,
            kit_manufacturer: optional_text(row, self.layout.kit_manufacturer),
            kit_model: optional_text(row, self.layout.kit_model),
            weight_class: aircraft.weight_class.as_deref().and_then(parse_weight_class),
            cruising_speed_mph: aircraft.cruising_speed.as_deref().and_then(parse_digits),
            faa_region: optional_text(row, self.layout.region),
            county_code: optional_text(row, self.layout.county),
            aircraft_mfr_model_code: Some(aircraft_code.to_string()).filter(|c| !c.is_empty()),
            engine_mfr_model_code: Some(engine_code.to_string()).filter(|c| !c.is_empty()),
        };

        let fields = RecordFields {
            category: Some(aircraft_type.as_str().to_string()),
            manufacturer: aircraft.manufacturer.as_deref().map(normalize_manufacturer),
            manufacturer_country: Some(COUNTRY_US.to_string()),
            model: aircraft.model.clone(),
            model_variant: None,
            year,
            registration_id: Some(n_number.clone()),
            registration_country: Some(COUNTRY_US.to_string()),
            registration_status: self.registration_status(row),
            location: Some(location),
            dates: Some(dates),
            owner: Some(owner),
            specifications: Some(specifications),
        };

        UnifiedRecord::construct(
            TransportType::Plane,
            Metadata::new(DataSource::Faa, n_number),
            fields,
            Payload::Plane(plane),
        )
        .map_err(Rejected::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::reference::{AircraftRef, EngineRef, ReferenceTable};
    use tport_common::schema::{AircraftType, OwnerType, PowerUnit};

    fn references() -> ReferenceIndex {
        let aircraft = ReferenceTable::from_entries([
            (
                "A001".to_string(),
                AircraftRef {
                    manufacturer: Some("CESSNA".to_string()),
                    model: Some("172".to_string()),
                    type_aircraft: Some("4".to_string()),
                    type_engine: Some("1".to_string()),
                    engine_count: Some("01".to_string()),
                    seat_count: Some("004".to_string()),
                    weight_class: Some("CLASS 1".to_string()),
                    cruising_speed: Some("0124".to_string()),
                },
            ),
            (
                "A013".to_string(),
                AircraftRef {
                    manufacturer: Some("ODD".to_string()),
                    engine_count: Some("13".to_string()),
                    ..Default::default()
                },
            ),
        ]);
        let engines = ReferenceTable::from_entries([(
            "E001".to_string(),
            EngineRef {
                manufacturer: Some("LYCOMING".to_string()),
                model: Some("O-360".to_string()),
                engine_type: Some("1".to_string()),
                horsepower: Some("180".to_string()),
            },
        )]);
        ReferenceIndex::new(aircraft, engines)
    }

    /// MASTER row padded to the minimum width
    fn row(cells: &[&'static str]) -> Vec<&'static str> {
        let mut row = cells.to_vec();
        while row.len() < MIN_MASTER_COLUMNS {
            row.push("");
        }
        row
    }

    fn sample_row() -> Vec<&'static str> {
        row(&[
            "N12345", "17272788", "A001", "E001", "2020", "1", "DOE JOHN", "", "", "WICHITA", "KS",
        ])
    }

    #[test]
    fn test_end_to_end_row() {
        let refs = references();
        let normalizer = FaaNormalizer::new(CodeDictionary::faa(), &refs);
        let record = normalizer.normalize(&sample_row()).unwrap();

        assert_eq!(record.transport_id(), "plane-N12345");
        assert_eq!(record.manufacturer(), Some("Cessna"));
        assert_eq!(record.model(), Some("172"));
        assert_eq!(record.category(), Some("fixed_wing_single"));
        assert_eq!(record.year(), Some(2020));
        assert_eq!(record.registration_id(), Some("N12345"));
        assert_eq!(record.registration_status(), Some(RegistrationStatus::Active));

        let power = record.specifications().unwrap().power.unwrap();
        assert_eq!(power.value, 180.0);
        assert_eq!(power.unit, PowerUnit::Hp);
    }

    #[test]
    fn test_derived_fields() {
        let refs = references();
        let normalizer = FaaNormalizer::new(CodeDictionary::faa(), &refs);
        let record = normalizer.normalize(&sample_row()).unwrap();

        let specs = record.specifications().unwrap();
        assert_eq!(specs.engine_type.as_deref(), Some("reciprocating"));
        assert_eq!(specs.fuel_type.as_deref(), Some("gasoline"));
        assert_eq!(specs.capacity, Some(4));

        let dates = record.dates().unwrap();
        assert_eq!(dates.manufactured, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert!(dates.registered.is_none());
        assert!(dates.last_activity.is_none());

        let owner = record.owner().unwrap();
        assert_eq!(owner.owner_type, OwnerType::Individual);
        assert_eq!(owner.name.as_deref(), Some("DOE JOHN"));
        assert_eq!(owner.country.as_deref(), Some("US"));

        let location = record.location().unwrap();
        assert_eq!(location.city.as_deref(), Some("WICHITA"));
        assert_eq!(location.state_province.as_deref(), Some("KS"));

        let plane = record.plane_data().unwrap();
        assert_eq!(plane.serial_number.as_deref(), Some("17272788"));
        assert_eq!(plane.aircraft_type, Some(AircraftType::FixedWingSingle));
        assert_eq!(plane.engine_count, Some(1));
        assert_eq!(plane.engine_manufacturer.as_deref(), Some("LYCOMING"));
        assert_eq!(plane.airworthiness_class, Some(AirworthinessClass::Standard));
        assert_eq!(plane.weight_class, Some(1));
        assert_eq!(plane.cruising_speed_mph, Some(124));
        assert_eq!(plane.aircraft_mfr_model_code.as_deref(), Some("A001"));
        assert!(!plane.fractional_ownership);
        assert_eq!(record.metadata().source_id, "N12345");
    }

    #[test]
    fn test_n_prefix_added() {
        let refs = references();
        let normalizer = FaaNormalizer::new(CodeDictionary::faa(), &refs);
        let record = normalizer.normalize(&row(&["12345 ", "", "A001"])).unwrap();
        assert_eq!(record.transport_id(), "plane-N12345");
        assert_eq!(record.plane_data().unwrap().n_number, "N12345");
    }

    #[test]
    fn test_short_row_rejected() {
        let refs = references();
        let normalizer = FaaNormalizer::new(CodeDictionary::faa(), &refs);
        let err = normalizer.normalize(&["N1", "S1", "A001"]).unwrap_err();
        assert_eq!(err.reason, RejectReason::TooFewColumns);
        assert!(normalizer.normalize(&[]).is_err());
    }

    #[test]
    fn test_header_and_blank_key_rejected() {
        let refs = references();
        let normalizer = FaaNormalizer::new(CodeDictionary::faa(), &refs);
        assert_eq!(
            normalizer.normalize(&row(&["N-NUMBER"])).unwrap_err().reason,
            RejectReason::HeaderRow
        );
        assert_eq!(
            normalizer.normalize(&row(&["  "])).unwrap_err().reason,
            RejectReason::MissingKey
        );
    }

    #[test]
    fn test_reference_miss_degrades() {
        let refs = references();
        let normalizer = FaaNormalizer::new(CodeDictionary::faa(), &refs);
        let record = normalizer
            .normalize(&row(&["N9", "", "ZZZ", "YYY", "19XX"]))
            .unwrap();
        assert!(record.manufacturer().is_none());
        assert!(record.model().is_none());
        assert_eq!(record.category(), Some("other"));
        assert_eq!(
            record.specifications().unwrap().engine_type.as_deref(),
            Some("unknown")
        );
        assert!(record.specifications().unwrap().power.is_none());
        assert!(record.year().is_none());
        assert!(record.dates().is_none());
    }

    #[test]
    fn test_year_out_of_range_rejects_row() {
        let refs = references();
        let normalizer = FaaNormalizer::new(CodeDictionary::faa(), &refs);
        let err = normalizer
            .normalize(&row(&["N1", "", "A001", "E001", "1850"]))
            .unwrap_err();
        assert_eq!(err.reason, RejectReason::Validation);
        assert!(err.detail.contains("year"));
    }

    #[test]
    fn test_engine_count_from_reference_validated() {
        let refs = references();
        let normalizer = FaaNormalizer::new(CodeDictionary::faa(), &refs);
        let err = normalizer.normalize(&row(&["N1", "", "A013"])).unwrap_err();
        assert_eq!(err.reason, RejectReason::Validation);
    }

    #[test]
    fn test_extended_layout() {
        let refs = references();
        let normalizer =
            FaaNormalizer::new(CodeDictionary::faa(), &refs).with_layout(MasterLayout::extended());

        let mut cells = vec![""; 34];
        cells[0] = "N777";
        cells[2] = "A001";
        cells[12] = "4";
        cells[17] = "1N";
        cells[20] = "E";
        cells[21] = "51113051";
        cells[22] = "Y";
        cells[23] = "20150301";
        cells[29] = "20310131";
        cells[33] = "A4D2A8";

        let record = normalizer.normalize(&cells).unwrap();
        assert_eq!(record.registration_status(), Some(RegistrationStatus::Inactive));

        let plane = record.plane_data().unwrap();
        assert_eq!(plane.airworthiness_class, Some(AirworthinessClass::Standard));
        assert_eq!(plane.faa_region.as_deref(), Some("4"));
        assert_eq!(plane.mode_s_code.as_deref(), Some("51113051"));
        assert_eq!(plane.mode_s_code_hex.as_deref(), Some("A4D2A8"));
        assert!(plane.fractional_ownership);
        assert_eq!(plane.airworthiness_date, NaiveDate::from_ymd_opt(2015, 3, 1));
        assert_eq!(
            record.dates().unwrap().expires,
            NaiveDate::from_ymd_opt(2031, 1, 31)
        );
    }

    #[test]
    fn test_extended_layout_unknown_status_is_absent() {
        let refs = references();
        let normalizer =
            FaaNormalizer::new(CodeDictionary::faa(), &refs).with_layout(MasterLayout::extended());
        let mut cells = vec![""; 34];
        cells[0] = "N778";
        cells[20] = "Q";
        let record = normalizer.normalize(&cells).unwrap();
        assert!(record.registration_status().is_none());
        assert!(record.plane_data().unwrap().airworthiness_class.is_none());
    }
}
