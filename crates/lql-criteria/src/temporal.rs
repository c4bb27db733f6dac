//! Calendar dates and durations resolved from date literals and unit words

use chrono::{NaiveDate, NaiveTime, Timelike};
use lql_ast::{DateLiteral, DurationUnit, TimeLiteral, UtcOffset};
use lql_diagnostics::{LQL0103, LqlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved calendar date with an optional clock time
///
/// `month` is zero-based (January is `0`), matching the calendar values the
/// evaluation engine has always received. Use [`CalendarDate::month_number`]
/// for the one-based month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    /// Zero-based month, 0-11
    pub month: u32,
    /// Day of month, 1-31
    pub day: u32,
    pub time: Option<NaiveTime>,
    /// Offset from UTC in minutes
    pub utc_offset_minutes: Option<i16>,
}

impl CalendarDate {
    /// Create a date from a zero-based month
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            time: None,
            utc_offset_minutes: None,
        }
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_utc_offset(mut self, minutes: i16) -> Self {
        self.utc_offset_minutes = Some(minutes);
        self
    }

    /// One-based month, 1-12
    pub const fn month_number(&self) -> u32 {
        self.month + 1
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month_number(), self.day)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month_number(), self.day)?;
        let Some(time) = self.time else {
            return Ok(());
        };

        write!(f, "T{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second())?;
        let millis = time.nanosecond() / 1_000_000;
        if millis > 0 {
            write!(f, ".{millis:03}")?;
        }
        match self.utc_offset_minutes {
            Some(0) => f.write_str("Z"),
            Some(minutes) => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let minutes = minutes.unsigned_abs();
                write!(f, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
            }
            None => Ok(()),
        }
    }
}

/// A magnitude in one calendar unit: `30 days`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    pub magnitude: i64,
    pub unit: DurationUnit,
}

impl Duration {
    pub const fn new(magnitude: i64, unit: DurationUnit) -> Self {
        Self { magnitude, unit }
    }
}

/// Negative magnitudes render as `(0 - n)` so the text parses back
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = self.unit.plural();
        if self.magnitude < 0 {
            return write!(f, "(0 - {}) {plural}", self.magnitude.unsigned_abs());
        }
        if self.magnitude == 1 {
            write!(f, "1 {}", &plural[..plural.len() - 1])
        } else {
            write!(f, "{} {plural}", self.magnitude)
        }
    }
}

/// Resolve a date literal into a calendar date
///
/// The month is stored zero-based. Out-of-range parts (month 13, February
/// 30th, hour 24, offset +24:00) are rejected with `LQL0103`.
pub fn parse_calendar_date(literal: &DateLiteral) -> Result<CalendarDate> {
    let year: i32 = number(&literal.year, "year", literal)?;
    let month: u32 = number(&literal.month, "month", literal)?;
    let day: u32 = number(&literal.day, "day", literal)?;

    if !(1..=12).contains(&month) {
        return Err(invalid(literal, format!("month {month} is out of range")));
    }
    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(invalid(literal, format!("day {day} is out of range for {year:04}-{month:02}")));
    }

    let mut date = CalendarDate::new(year, month - 1, day);
    if let Some(time) = &literal.time {
        date = date.with_time(clock_time(time, literal)?);
        if let Some(offset) = &time.offset {
            date = date.with_utc_offset(utc_offset(offset, literal)?);
        }
    }

    log::trace!("resolved date literal {literal} to {date}");
    Ok(date)
}

fn clock_time(time: &TimeLiteral, literal: &DateLiteral) -> Result<NaiveTime> {
    let hour: u32 = number(&time.hour, "hour", literal)?;
    let minute: u32 = number(&time.minute, "minute", literal)?;
    let second: u32 = number(&time.second, "second", literal)?;
    let millis = time.fraction.as_deref().map_or(Ok(0), |fraction| milliseconds(fraction, literal))?;

    NaiveTime::from_hms_milli_opt(hour, minute, second, millis)
        .ok_or_else(|| invalid(literal, format!("{hour:02}:{minute:02}:{second:02} is not a valid time")))
}

/// Fractional seconds truncated to milliseconds: `5` is 500, `12345` is 123
fn milliseconds(fraction: &str, literal: &DateLiteral) -> Result<u32> {
    let digits: String = fraction.chars().chain("000".chars()).take(3).collect();
    number(&digits, "fractional seconds", literal)
}

fn utc_offset(offset: &UtcOffset, literal: &DateLiteral) -> Result<i16> {
    let (negative, hours, minutes) = match offset {
        UtcOffset::Utc => return Ok(0),
        UtcOffset::Fixed {
            negative,
            hours,
            minutes,
        } => (*negative, hours, minutes),
    };

    let hours: i16 = number(hours, "offset hours", literal)?;
    let minutes: i16 = number(minutes, "offset minutes", literal)?;
    if hours > 23 || minutes > 59 {
        return Err(invalid(literal, format!("UTC offset {hours:02}:{minutes:02} is out of range")));
    }

    let total = hours * 60 + minutes;
    Ok(if negative { -total } else { total })
}

fn number<T: std::str::FromStr>(digits: &str, part: &str, literal: &DateLiteral) -> Result<T> {
    digits
        .parse()
        .map_err(|_| invalid(literal, format!("{part} '{digits}' is not a valid number")))
}

fn invalid(literal: &DateLiteral, reason: String) -> LqlError {
    LqlError::semantic(LQL0103, format!("invalid calendar date {literal}: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn date(year: &str, month: &str, day: &str) -> DateLiteral {
        DateLiteral::new(year, month, day)
    }

    #[test]
    fn test_month_is_zero_based() {
        let resolved = parse_calendar_date(&date("2020", "03", "15")).unwrap();
        assert_eq!(resolved.year, 2020);
        assert_eq!(resolved.month, 2);
        assert_eq!(resolved.day, 15);
        assert_eq!(resolved.month_number(), 3);
        assert_eq!(resolved.to_naive_date(), NaiveDate::from_ymd_opt(2020, 3, 15));
    }

    #[test]
    fn test_leap_day() {
        assert!(parse_calendar_date(&date("2020", "02", "29")).is_ok());
        assert!(parse_calendar_date(&date("2019", "02", "29")).is_err());
    }

    #[rstest]
    #[case("2020", "13", "01")]
    #[case("2020", "00", "10")]
    #[case("2020", "04", "31")]
    #[case("2020", "01", "00")]
    #[case("99999999999", "01", "01")]
    fn test_out_of_range(#[case] year: &str, #[case] month: &str, #[case] day: &str) {
        let err = parse_calendar_date(&date(year, month, day)).unwrap_err();
        assert_eq!(err.code(), LQL0103);
        assert!(err.is_semantic());
    }

    #[rstest]
    #[case(None, 0)]
    #[case(Some("5"), 500)]
    #[case(Some("25"), 250)]
    #[case(Some("123"), 123)]
    #[case(Some("123999"), 123)]
    fn test_fraction_to_milliseconds(#[case] fraction: Option<&str>, #[case] millis: u32) {
        let mut time = TimeLiteral::new("10", "30", "00");
        if let Some(fraction) = fraction {
            time = time.with_fraction(fraction);
        }
        let resolved = parse_calendar_date(&date("2020", "01", "01").with_time(time)).unwrap();
        assert_eq!(resolved.time, NaiveTime::from_hms_milli_opt(10, 30, 0, millis));
    }

    #[test]
    fn test_offsets() {
        let zulu = TimeLiteral::new("00", "00", "00").with_offset(UtcOffset::Utc);
        let resolved = parse_calendar_date(&date("2020", "01", "01").with_time(zulu)).unwrap();
        assert_eq!(resolved.utc_offset_minutes, Some(0));

        let fixed = TimeLiteral::new("00", "00", "00").with_offset(UtcOffset::Fixed {
            negative: true,
            hours: "05".to_string(),
            minutes: "30".to_string(),
        });
        let resolved = parse_calendar_date(&date("2020", "01", "01").with_time(fixed)).unwrap();
        assert_eq!(resolved.utc_offset_minutes, Some(-330));
    }

    #[test]
    fn test_invalid_time_and_offset() {
        let late = TimeLiteral::new("24", "00", "00");
        assert!(parse_calendar_date(&date("2020", "01", "01").with_time(late)).is_err());

        let far = TimeLiteral::new("10", "00", "00").with_offset(UtcOffset::Fixed {
            negative: false,
            hours: "24".to_string(),
            minutes: "00".to_string(),
        });
        assert!(parse_calendar_date(&date("2020", "01", "01").with_time(far)).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(CalendarDate::new(2020, 0, 1).to_string(), "2020-01-01");
        let stamped = CalendarDate::new(2020, 11, 31)
            .with_time(NaiveTime::from_hms_milli_opt(8, 5, 9, 250).unwrap())
            .with_utc_offset(-90);
        assert_eq!(stamped.to_string(), "2020-12-31T08:05:09.250-01:30");
        assert_eq!(Duration::new(1, DurationUnit::Day).to_string(), "1 day");
        assert_eq!(Duration::new(30, DurationUnit::Day).to_string(), "30 days");
        assert_eq!(Duration::new(-1, DurationUnit::Day).to_string(), "(0 - 1) days");
        assert_eq!(Duration::new(i64::MIN, DurationUnit::Week).to_string(), "(0 - 9223372036854775808) weeks");
    }
}
