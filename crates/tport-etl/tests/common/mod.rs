//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

pub const MASTER_HEADER: &str = "\u{feff}N-NUMBER,SERIAL NUMBER,MFR MDL CODE,ENG MFR MDL,YEAR MFR,TYPE REGISTRANT,NAME,STREET,STREET2,CITY,STATE,ZIP CODE,REGION,COUNTY,COUNTRY,LAST ACTION DATE,CERT ISSUE DATE,CERTIFICATION,TYPE AIRCRAFT,TYPE ENGINE,\n";

/// Two valid planes, one short row, one plane built in 1850
pub const MASTER_ROWS: &str = "\
N12345,17272788,A001,E001,2020,1,DOE JOHN,123 MAIN ST,,WICHITA,KS,67201,3,173,US,20200115,20200115,1N,4,1,\n\
67890,28-7890,A002,E002,1999,3,ACME AIR CORP,,,DENVER,CO,80201,2,031,US,,,1N,5,5,\n\
N55555,SHORT\n\
N18500,OLD,A001,E001,1850,1,HISTORIC,,,DAYTON,OH,45401,2,113,US,,,1N,4,1,\n";

pub const ACFTREF: &str = "CODE,MFR,MODEL,TYPE-ACFT,TYPE-ENG,AC-CAT,BUILD-CERT-IND,NO-ENG,NO-SEATS,AC-WEIGHT,SPEED,\n\
A001,CESSNA                        ,172               ,4,1,1,0,01,004,CLASS 1,0124,\n\
A002,BOEING                        ,737-800           ,5,5,1,0,02,189,CLASS 3,0530,\n";

pub const ENGINE: &str = "CODE,MFR,MODEL,TYPE,HORSEPOWER,THRUST,\n\
E001,LYCOMING  ,O-360     ,1,00180,000000,\n\
E002,CFM INTL  ,CFM56-7B  ,5,     ,027300,\n";

/// Write pre-extracted FAA files with the given MASTER body
pub fn write_faa_files(dir: &Path, master_rows: &str) {
    std::fs::write(dir.join("MASTER.txt"), format!("{}{}", MASTER_HEADER, master_rows)).unwrap();
    std::fs::write(dir.join("ACFTREF.txt"), ACFTREF).unwrap();
    std::fs::write(dir.join("ENGINE.txt"), ENGINE).unwrap();
}

/// Temp data directory holding the standard fixture
pub fn faa_data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_faa_files(dir.path(), MASTER_ROWS);
    dir
}
