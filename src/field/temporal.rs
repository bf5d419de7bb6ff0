//! Date and time conversions.
//!
//! `date` and `datetime` values are pattern-checked and then normalized the
//! way a calendar overflow would: `2000-02-31` becomes `2000-03-02`.
//! `time` values are only pattern- and hour-checked. `timestamp` accepts epoch
//! seconds or a best-effort parse of common date/time spellings.

use super::error::FieldError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Largest epoch second accepted for `timestamp` columns
pub const TIMESTAMP_MAX: i64 = 2_147_483_647;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([1-9]\d{3})-([01]\d)-([0-3]\d)$").expect("valid date pattern"));

static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([1-9]\d{3})-([01]\d)-([0-3]\d) ([0-2]\d):([0-5]\d):([0-5]\d)$")
        .expect("valid datetime pattern")
});

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-2]\d):([0-5]\d):([0-5]\d)$").expect("valid time pattern"));

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Normalize a `YYYY-MM-DD` string
pub(crate) fn to_date(input: &str) -> Result<String, FieldError> {
    let caps = DATE_RE.captures(input).ok_or(FieldError::InvalidDate)?;
    let stamp = overflow(
        number(&caps[1]),
        number(&caps[2]),
        number(&caps[3]),
        0,
        0,
        0,
    )
    .ok_or(FieldError::InvalidDate)?;
    Ok(stamp.format(DATE_FORMAT).to_string())
}

/// Normalize a `YYYY-MM-DD HH:MM:SS` string
pub(crate) fn to_datetime(input: &str) -> Result<String, FieldError> {
    let caps = DATETIME_RE.captures(input).ok_or(FieldError::InvalidDatetime)?;
    let stamp = overflow(
        number(&caps[1]),
        number(&caps[2]),
        number(&caps[3]),
        number(&caps[4]),
        number(&caps[5]),
        number(&caps[6]),
    )
    .ok_or(FieldError::InvalidDatetime)?;
    Ok(stamp.format(DATETIME_FORMAT).to_string())
}

/// Check a `HH:MM:SS` string; hours above 23 are rejected
pub(crate) fn to_time(input: &str) -> Result<String, FieldError> {
    let caps = TIME_RE.captures(input).ok_or(FieldError::InvalidTime)?;
    if number(&caps[1]) > 23 {
        return Err(FieldError::InvalidTime);
    }
    Ok(input.to_string())
}

/// Render epoch seconds as a UTC `YYYY-MM-DD HH:MM:SS` string
pub(crate) fn timestamp_from_epoch(seconds: f64) -> Result<String, FieldError> {
    if !(0.0..=TIMESTAMP_MAX as f64).contains(&seconds) {
        return Err(FieldError::InvalidTimestamp);
    }
    let stamp = DateTime::from_timestamp(seconds as i64, 0).ok_or(FieldError::InvalidTimestamp)?;
    Ok(stamp.naive_utc().format(DATETIME_FORMAT).to_string())
}

/// Best-effort parse of a free-form date/time string
pub(crate) fn timestamp_from_str(input: &str) -> Result<String, FieldError> {
    parse_loose(input.trim())
        .map(|stamp| stamp.format(DATETIME_FORMAT).to_string())
        .ok_or(FieldError::InvalidTimestamp)
}

fn parse_loose(input: &str) -> Option<NaiveDateTime> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(input) {
        return Some(stamp.naive_utc());
    }
    if let Ok(stamp) = DateTime::parse_from_rfc2822(input) {
        return Some(stamp.naive_utc());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

// Captures are ASCII digits of at most four characters.
fn number(digits: &str) -> i64 {
    digits.parse().unwrap_or(0)
}

/// Build a timestamp letting out-of-range months, days and hours roll over
fn overflow(year: i64, month: i64, day: i64, hour: i64, minute: i64, second: i64) -> Option<NaiveDateTime> {
    let months = year * 12 + (month - 1);
    let first = NaiveDate::from_ymd_opt(
        i32::try_from(months.div_euclid(12)).ok()?,
        u32::try_from(months.rem_euclid(12) + 1).ok()?,
        1,
    )?;
    let offset = TimeDelta::try_days(day - 1)?
        .checked_add(&TimeDelta::try_hours(hour)?)?
        .checked_add(&TimeDelta::try_minutes(minute)?)?
        .checked_add(&TimeDelta::try_seconds(second)?)?;
    first.and_time(NaiveTime::MIN).checked_add_signed(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_canonical() {
        assert_eq!(to_date("2000-01-01").unwrap(), "2000-01-01");
        assert_eq!(to_date(&to_date("2018-08-07").unwrap()).unwrap(), "2018-08-07");
    }

    #[test]
    fn test_date_calendar_overflow() {
        assert_eq!(to_date("2000-02-31").unwrap(), "2000-03-02");
        assert_eq!(to_date("2001-02-29").unwrap(), "2001-03-01");
        assert_eq!(to_date("2000-13-01").unwrap(), "2001-01-01");
        assert_eq!(to_date("2000-00-10").unwrap(), "1999-12-10");
        assert_eq!(to_date("2000-03-00").unwrap(), "2000-02-29");
    }

    #[test]
    fn test_date_pattern_rejections() {
        for input in ["2000-52-31", "0999-01-01", "2000-1-01", "2000-01-41", "2000/01/01", "", "2000-01-01 "] {
            assert_eq!(to_date(input), Err(FieldError::InvalidDate), "input {input:?}");
        }
    }

    #[test]
    fn test_datetime_overflow_and_pattern() {
        assert_eq!(
            to_datetime("2018-08-07 20:06:23").unwrap(),
            "2018-08-07 20:06:23"
        );
        assert_eq!(
            to_datetime("2000-02-31 25:00:00").unwrap(),
            "2000-03-03 01:00:00"
        );
        assert_eq!(
            to_datetime("2000-01-01 30:00:00"),
            Err(FieldError::InvalidDatetime)
        );
        assert_eq!(to_datetime("2000-01-01"), Err(FieldError::InvalidDatetime));
    }

    #[test]
    fn test_time_bounds() {
        assert_eq!(to_time("23:59:59").unwrap(), "23:59:59");
        assert_eq!(to_time("00:00:00").unwrap(), "00:00:00");
        assert_eq!(to_time("24:59:59"), Err(FieldError::InvalidTime));
        assert_eq!(to_time("11:12:60"), Err(FieldError::InvalidTime));
        assert_eq!(to_time("11:60:00"), Err(FieldError::InvalidTime));
        assert_eq!(to_time("1:00:00"), Err(FieldError::InvalidTime));
    }

    #[test]
    fn test_timestamp_from_epoch() {
        assert_eq!(timestamp_from_epoch(0.0).unwrap(), "1970-01-01 00:00:00");
        assert_eq!(
            timestamp_from_epoch(TIMESTAMP_MAX as f64).unwrap(),
            "2038-01-19 03:14:07"
        );
        assert_eq!(timestamp_from_epoch(-1.0), Err(FieldError::InvalidTimestamp));
        assert_eq!(
            timestamp_from_epoch(TIMESTAMP_MAX as f64 + 1.0),
            Err(FieldError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_timestamp_from_str() {
        assert_eq!(
            timestamp_from_str("2018-08-07 20:06:23").unwrap(),
            "2018-08-07 20:06:23"
        );
        assert_eq!(
            timestamp_from_str("2018-08-07T20:06:23+02:00").unwrap(),
            "2018-08-07 18:06:23"
        );
        assert_eq!(
            timestamp_from_str("2018-08-07").unwrap(),
            "2018-08-07 00:00:00"
        );
        assert_eq!(
            timestamp_from_str("not a date"),
            Err(FieldError::InvalidTimestamp)
        );
    }
}
