//! Turning `DDMMYY` and `HHMMSS` digits into timestamps.
//!
//! Recorders log UTC time of day only, so every fix shares the header date.
//! A flight that crosses midnight shows a landing time of day smaller than
//! its takeoff time of day; durations add one day in that case. Flights
//! longer than 24 hours can not be told apart from short ones.

use time::{Date, Duration, Month, PrimitiveDateTime, Time};

use crate::error::RecordError;

pub const DAY_SECONDS: i64 = 86_400;

/// Parse `DDMMYY`. Two-digit years map to `2000 + YY`.
pub fn parse_date(digits: &str) -> Result<Date, RecordError> {
    let invalid = || RecordError::Date(digits.to_owned());

    let [day, month, year] = split_pairs(digits).ok_or_else(invalid)?;

    let month = Month::try_from(month).map_err(|_| invalid())?;

    Date::from_calendar_date(2000 + i32::from(year), month, day).map_err(|_| invalid())
}

/// Parse `HHMMSS`.
pub fn parse_time(digits: &str) -> Result<Time, RecordError> {
    let invalid = || RecordError::TimeOfDay(digits.to_owned());

    let [hour, minute, second] = split_pairs(digits).ok_or_else(invalid)?;

    Time::from_hms(hour, minute, second).map_err(|_| invalid())
}

fn split_pairs(digits: &str) -> Option<[u8; 3]> {
    let bytes = digits.as_bytes();

    if bytes.len() != 6 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }

    let pair = |i: usize| (bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0');

    Some([pair(0), pair(2), pair(4)])
}

#[inline]
pub fn timestamp(date: Date, time: Time) -> PrimitiveDateTime {
    PrimitiveDateTime::new(date, time)
}

/// Time between takeoff and landing on the same recording date, never negative.
pub fn flight_duration(date: Date, takeoff: Time, landing: Time) -> Duration {
    let duration = timestamp(date, landing) - timestamp(date, takeoff);

    match duration.is_negative() {
        true => duration + Duration::seconds(DAY_SECONDS),
        false => duration,
    }
}

/// Whole seconds from `from` to `to`, wrapping past midnight.
pub fn elapsed_seconds(from: Time, to: Time) -> i64 {
    (to - from).whole_seconds().rem_euclid(DAY_SECONDS)
}
