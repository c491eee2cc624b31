//! Field-level parsing helpers for FAA registry text

use chrono::NaiveDate;

/// Trailing corporate noise removed from manufacturer names, checked in order
const MANUFACTURER_SUFFIXES: &[&str] = &[
    ", Usa",
    ", Inc.",
    " Corporation",
    " Corp.",
    " Motor Company",
    " Ltd",
];

/// Parse `YYYYMMDD` or `YYYY/MM/DD` (one or two digit month and day).
///
/// Anything else, including impossible calendar dates, is absent.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let year = raw[0..4].parse().ok()?;
        let month = raw[4..6].parse().ok()?;
        let day = raw[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let mut parts = raw.split('/');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || !is_digits(year) || !is_digits(month) || !is_digits(day) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Non-empty and ASCII digits only
pub fn is_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Integer from a pure digit string ("004" -> 4); blank or mixed tokens are absent
pub fn parse_digits<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let raw = raw.trim();
    if is_digits(raw) {
        raw.parse().ok()
    } else {
        None
    }
}

/// Uppercase the first letter of every alphabetic run and lowercase the rest.
///
/// "PIPER AIRCRAFT INC." becomes "Piper Aircraft Inc.", "O'NEILL" becomes "O'Neill".
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for c in raw.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Canonical manufacturer name: trimmed, title-cased, corporate suffixes removed
pub fn normalize_manufacturer(raw: &str) -> String {
    let mut name = title_case(raw.trim());
    for suffix in MANUFACTURER_SUFFIXES {
        if let Some(len) = name.strip_suffix(suffix).map(str::len) {
            name.truncate(len);
        }
    }
    name.trim().to_string()
}

/// Weight class number from "CLASS 3"
pub fn parse_weight_class(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("CLASS")
        .or_else(|| raw.strip_prefix("Class"))
        .unwrap_or(raw);
    parse_digits(digits)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_date_compact() {
        assert_eq!(parse_date("20200115"), NaiveDate::from_ymd_opt(2020, 1, 15));
        assert_eq!(parse_date(" 19991231 "), NaiveDate::from_ymd_opt(1999, 12, 31));
    }

    #[test]
    fn test_parse_date_slashed() {
        assert_eq!(parse_date("2020/01/15"), NaiveDate::from_ymd_opt(2020, 1, 15));
        assert_eq!(parse_date("2020/1/5"), NaiveDate::from_ymd_opt(2020, 1, 5));
    }

    #[test]
    fn test_parse_date_absent() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("garbage"), None);
        assert_eq!(parse_date("2020-01-15"), None);
        assert_eq!(parse_date("2020/01"), None);
        assert_eq!(parse_date("2020/01/15/01"), None);
        assert_eq!(parse_date("20201345"), None);
        assert_eq!(parse_date("2021/02/29"), None);
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits::<u32>("004"), Some(4));
        assert_eq!(parse_digits::<u32>("00180"), Some(180));
        assert_eq!(parse_digits::<u32>(""), None);
        assert_eq!(parse_digits::<u32>("12A"), None);
        assert_eq!(parse_digits::<u32>("-5"), None);
        assert_eq!(parse_digits::<u8>("999"), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("CESSNA AIRCRAFT CO"), "Cessna Aircraft Co");
        assert_eq!(title_case("o'neill"), "O'Neill");
        assert_eq!(title_case("3m company"), "3M Company");
        assert_eq!(title_case("MCDONNELL-DOUGLAS"), "Mcdonnell-Douglas");
    }

    #[test]
    fn test_normalize_manufacturer() {
        assert_eq!(normalize_manufacturer("CESSNA"), "Cessna");
        assert_eq!(normalize_manufacturer("  PIPER AIRCRAFT, INC.  "), "Piper Aircraft");
        assert_eq!(normalize_manufacturer("BOEING CORP."), "Boeing");
        assert_eq!(normalize_manufacturer("TEXTRON AVIATION CORPORATION"), "Textron Aviation");
        assert_eq!(normalize_manufacturer("FORD MOTOR COMPANY"), "Ford");
        assert_eq!(normalize_manufacturer("AIRBUS, USA"), "Airbus");
        assert_eq!(normalize_manufacturer("ROLLS-ROYCE LTD"), "Rolls-Royce");
        assert_eq!(normalize_manufacturer(""), "");
    }

    #[test]
    fn test_suffixes_checked_once_in_order() {
        // ", Inc." is checked before " Corp.", so both come off
        assert_eq!(normalize_manufacturer("ACME CORP., INC."), "Acme");
        // " Ltd" is checked last, so an earlier suffix behind it stays
        assert_eq!(normalize_manufacturer("ACME, INC. LTD"), "Acme, Inc.");
    }

    #[test]
    fn test_weight_class() {
        assert_eq!(parse_weight_class("CLASS 1"), Some(1));
        assert_eq!(parse_weight_class("CLASS 4"), Some(4));
        assert_eq!(parse_weight_class("3"), Some(3));
        assert_eq!(parse_weight_class("HEAVY"), None);
    }

    proptest! {
        #[test]
        fn prop_parse_date_never_panics(raw in ".*") {
            let _ = parse_date(&raw);
        }

        #[test]
        fn prop_valid_compact_dates_parse(y in 1900i32..2030, m in 1u32..=12, d in 1u32..=28) {
            let raw = format!("{:04}{:02}{:02}", y, m, d);
            prop_assert_eq!(parse_date(&raw), NaiveDate::from_ymd_opt(y, m, d));
        }
    }
}
