//! Line level record parsing.
//!
//! Fix (`B`) records use fixed columns:
//!
//! ```notrust
//! 0 123456 7890123 4 56789012 3 4 56789 01234
//! B HHMMSS DDMMmmm N DDDMMmmm E V PPPPP GGGGG
//! ```
//!
//! - `HHMMSS` - UTC time of day
//! - `DDMMmmm`, `DDDMMmmm` - coordinate magnitude, scaled by `1 / 100000`
//! - `N`/`S`, `E`/`W` - hemisphere
//! - `V` - fix validity, not inspected
//! - `PPPPP` - pressure altitude in meters
//! - `GGGGG` - GPS altitude in meters, used when pressure altitude is zero
//!
//! Coordinates are read as the plain integer scaled down, not as degrees and
//! decimal minutes. Summaries built from them match other tools reading the
//! same logs this way.

use std::ops::Range;

use geodesy::Position;
use time::{Date, Time};

use crate::{clock, error::RecordError};

pub const DATE_HEADER_TAG: &str = "HFDTE";
pub const FIX_TAG: char = 'B';

/// Minimum length of a fix record line.
pub const FIX_RECORD_LEN: usize = 35;

const COORDINATE_SCALE: f64 = 100_000.0;

const TIME: Range<usize> = 1..7;
const LATITUDE: Range<usize> = 7..14;
const LATITUDE_HEMISPHERE: Range<usize> = 14..15;
const LONGITUDE: Range<usize> = 15..23;
const LONGITUDE_HEMISPHERE: Range<usize> = 23..24;
const PRESSURE_ALTITUDE: Range<usize> = 25..30;
const GPS_ALTITUDE: Range<usize> = 30..35;

/// One GPS position sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixRecord {
    /// UTC time of day
    pub time: Time,
    /// The `HHMMSS` column read as a plain integer, e.g. `103005`
    pub clock_digits: u32,
    pub position: Position,
    /// Meters, pressure altitude with GPS altitude as fallback
    pub altitude: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    DateHeader(Date),
    Fix(FixRecord),
    /// Any record this crate has no use for
    Other,
}

/// Classify a line by its leading tag and parse the records we care about.
pub fn parse_line(line: &str) -> Result<Record, RecordError> {
    if let Some(rest) = line.strip_prefix(DATE_HEADER_TAG) {
        return parse_date_header(rest).map(Record::DateHeader);
    }

    if line.starts_with(FIX_TAG) {
        return parse_fix(line).map(Record::Fix);
    }

    Ok(Record::Other)
}

/// Accepts `DDMMYY`, `DATE:DDMMYY` and either followed by `,NN` flight number.
fn parse_date_header(rest: &str) -> Result<Date, RecordError> {
    let rest = rest.strip_prefix("DATE:").unwrap_or(rest);
    let digits = rest.split(',').next().unwrap_or_default().trim();

    clock::parse_date(digits)
}

pub fn parse_fix(line: &str) -> Result<FixRecord, RecordError> {
    if line.len() < FIX_RECORD_LEN {
        return Err(RecordError::TooShort {
            len: line.len(),
            required: FIX_RECORD_LEN,
        });
    }

    let time_digits = digits(line, TIME, "time")?;
    let time = clock::parse_time(time_digits)?;
    let clock_digits = integer(time_digits, "time")?;

    let latitude = f64::from(integer(digits(line, LATITUDE, "latitude")?, "latitude")?)
        / COORDINATE_SCALE;
    let latitude = match field(line, LATITUDE_HEMISPHERE, "latitude hemisphere")? {
        "N" => latitude,
        "S" => -latitude,
        other => return Err(RecordError::Hemisphere(other.to_owned())),
    };

    let longitude = f64::from(integer(digits(line, LONGITUDE, "longitude")?, "longitude")?)
        / COORDINATE_SCALE;
    let longitude = match field(line, LONGITUDE_HEMISPHERE, "longitude hemisphere")? {
        "E" => longitude,
        "W" => -longitude,
        other => return Err(RecordError::Hemisphere(other.to_owned())),
    };

    let position = Position::new(latitude, longitude);
    if !position.is_valid() {
        return Err(RecordError::InvalidCoordinate {
            latitude,
            longitude,
        });
    }

    let altitude = match altitude(line, PRESSURE_ALTITUDE, "pressure altitude")? {
        0 => altitude(line, GPS_ALTITUDE, "GPS altitude")?,
        pressure => pressure,
    };

    Ok(FixRecord {
        time,
        clock_digits,
        position,
        altitude,
    })
}

fn field<'a>(line: &'a str, range: Range<usize>, name: &'static str) -> Result<&'a str, RecordError> {
    line.get(range.clone()).ok_or_else(|| RecordError::NonNumeric {
        field: name,
        value: String::from_utf8_lossy(line.as_bytes().get(range).unwrap_or_default()).into_owned(),
    })
}

fn digits<'a>(line: &'a str, range: Range<usize>, name: &'static str) -> Result<&'a str, RecordError> {
    let value = field(line, range, name)?;

    match value.bytes().all(|this| this.is_ascii_digit()) {
        true => Ok(value),
        false => Err(RecordError::NonNumeric {
            field: name,
            value: value.to_owned(),
        }),
    }
}

fn integer(value: &str, name: &'static str) -> Result<u32, RecordError> {
    value.parse().map_err(|_| RecordError::NonNumeric {
        field: name,
        value: value.to_owned(),
    })
}

/// Altitudes may carry a leading minus sign, e.g. `-0012`.
fn altitude(line: &str, range: Range<usize>, name: &'static str) -> Result<i32, RecordError> {
    let value = field(line, range, name)?;

    value.parse().map_err(|_| RecordError::NonNumeric {
        field: name,
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use time::macros::{date, time};

    const TAKEOFF: &str = "B1000004650000N00730000EA0012300000";

    fn fix(line: &str) -> FixRecord {
        match parse_line(line) {
            Ok(Record::Fix(fix)) => fix,
            other => panic!("expected fix record, got {other:?}"),
        }
    }

    #[test]
    fn parses_fix_columns() {
        let record = fix(TAKEOFF);

        assert_eq!(record.time, time!(10:00:00));
        assert_eq!(record.clock_digits, 100000);
        assert_eq!(record.position, Position::new(46.5, 7.3));
        assert_eq!(record.altitude, 123);
    }

    #[test]
    fn coordinates_use_plain_integer_scaling() {
        // 46°51.000' would be 46.85 as degrees and minutes
        let record = fix("B1010004651000N00731000EA0015000000");

        assert_eq!(record.position, Position::new(46.51, 7.31));
    }

    #[test]
    fn southern_and_western_hemispheres_are_negative() {
        let record = fix("B1200003355000S07012345WA0080000810");

        assert_eq!(record.position, Position::new(-33.55, -70.12345));
        assert!(record.position.latitude < 0.0);
        assert!(record.position.longitude < 0.0);
    }

    #[test]
    fn gps_altitude_is_fallback_for_zero_pressure() {
        let record = fix("B1000004650000N00730000EA0000001640");

        assert_eq!(record.altitude, 1640);
    }

    #[test]
    fn pressure_altitude_wins_when_present() {
        let record = fix("B0508182801340N08344054EA0163801639001100023130139");

        assert_eq!(record.altitude, 1638);
        assert_eq!(record.time, time!(05:08:18));
    }

    #[test]
    fn negative_altitude() {
        let record = fix("B1000004650000N00730000EA-001200000");

        assert_eq!(record.altitude, -12);
    }

    #[test]
    fn short_fix_is_malformed() {
        let line = "B1000004650000N00730000E0123400000";

        assert_eq!(
            parse_line(line),
            Err(RecordError::TooShort {
                len: 34,
                required: FIX_RECORD_LEN
            })
        );
        assert!(parse_line("B").is_err());
    }

    #[test]
    fn non_digit_columns_are_malformed() {
        assert_eq!(
            parse_line("B10x0004650000N00730000EA0012300000"),
            Err(RecordError::NonNumeric {
                field: "time",
                value: "10x000".into()
            })
        );
        assert_eq!(
            parse_line("B100000465O000N00730000EA0012300000"),
            Err(RecordError::NonNumeric {
                field: "latitude",
                value: "465O000".into()
            })
        );
        assert!(matches!(
            parse_line("B1000004650000N00730000EA00I2300000"),
            Err(RecordError::NonNumeric {
                field: "pressure altitude",
                ..
            })
        ));
        assert!(matches!(
            parse_line("B1000004650000N00730000EA00000abcde"),
            Err(RecordError::NonNumeric {
                field: "GPS altitude",
                ..
            })
        ));
    }

    #[test]
    fn unknown_hemisphere_is_malformed() {
        assert_eq!(
            parse_line("B1000004650000X00730000EA0012300000"),
            Err(RecordError::Hemisphere("X".into()))
        );
    }

    #[test]
    fn invalid_time_of_day_is_malformed() {
        assert_eq!(
            parse_line("B2561004650000N00730000EA0012300000"),
            Err(RecordError::TimeOfDay("256100".into()))
        );
    }

    #[test]
    fn out_of_range_latitude() {
        assert_eq!(
            parse_line("B1000009500000N00730000EA0012300000"),
            Err(RecordError::InvalidCoordinate {
                latitude: 95.0,
                longitude: 7.3
            })
        );
    }

    #[test]
    fn out_of_range_longitude() {
        assert!(matches!(
            parse_line("B1000004650000N19000000WA0012300000"),
            Err(RecordError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn non_ascii_line_does_not_panic() {
        assert!(parse_line("B1000004650000N0073000ÉEA0012300000").is_err());
    }

    #[test]
    fn date_header_variants() {
        for line in ["HFDTE270722", "HFDTEDATE:270722,01", "HFDTEDATE:270722", "HFDTE270722 "] {
            assert_eq!(
                parse_line(line),
                Ok(Record::DateHeader(date!(2022 - 07 - 27))),
                "{line}"
            );
        }
    }

    #[test]
    fn malformed_date_header() {
        assert_eq!(
            parse_line("HFDTE2707"),
            Err(RecordError::Date("2707".into()))
        );
    }

    #[test]
    fn other_records_are_ignored() {
        for line in [
            "AXXXSOAR",
            "HFPLTPILOTINCHARGE:Someone",
            "I023638FXA3940SIU",
            "LXCT flight",
            "G1234ABCD",
            "",
        ] {
            assert_eq!(parse_line(line), Ok(Record::Other), "{line}");
        }
    }

    #[test]
    fn field_outside_line_or_char_boundary() {
        assert_eq!(
            field("B12", LATITUDE, "latitude"),
            Err(RecordError::NonNumeric {
                field: "latitude",
                value: String::new(),
            })
        );
        assert_eq!(
            field("B10000046\u{f6}", 7..10, "latitude"),
            Err(RecordError::NonNumeric {
                field: "latitude",
                value: "46\u{fffd}".into(),
            })
        );
    }
}
