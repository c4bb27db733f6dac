//! Literal AST nodes
//!
//! Numeric and date parts keep their source lexemes. Range checks and
//! conversions happen when the criteria is built, so a literal that parses
//! but does not fit (month `13`, an integer wider than 64 bits) is reported
//! as a semantic error rather than a syntax error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    /// Digit run, as written
    Integer(String),
    /// `whole.fraction`, both digit runs
    Decimal(DecimalLiteral),
    /// `"..."` text (or a legacy `{...}` reference), quotes removed
    String(String),
    /// `'...'` terminology code, quotes removed
    Term(String),
    /// `YYYY-MM-DD[Thh:mm:ss[.fff][Z|+hh:mm|-hh:mm]]`
    Date(DateLiteral),
    /// `TODAY`, the evaluation date
    Today,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalLiteral {
    pub whole: String,
    pub fraction: String,
}

impl DecimalLiteral {
    pub fn new(whole: impl Into<String>, fraction: impl Into<String>) -> Self {
        Self {
            whole: whole.into(),
            fraction: fraction.into(),
        }
    }
}

impl fmt::Display for DecimalLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.whole, self.fraction)
    }
}

/// Date literal components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateLiteral {
    pub year: String,
    /// One-based, as written
    pub month: String,
    pub day: String,
    pub time: Option<TimeLiteral>,
}

impl DateLiteral {
    pub fn new(year: impl Into<String>, month: impl Into<String>, day: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            month: month.into(),
            day: day.into(),
            time: None,
        }
    }

    pub fn with_time(mut self, time: TimeLiteral) -> Self {
        self.time = Some(time);
        self
    }
}

impl fmt::Display for DateLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)?;
        if let Some(time) = &self.time {
            write!(f, "T{time}")?;
        }
        Ok(())
    }
}

/// Clock time following the `T` marker of a date literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLiteral {
    pub hour: String,
    pub minute: String,
    pub second: String,
    /// Digits after the `.` of the seconds
    pub fraction: Option<String>,
    pub offset: Option<UtcOffset>,
}

impl TimeLiteral {
    pub fn new(hour: impl Into<String>, minute: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            hour: hour.into(),
            minute: minute.into(),
            second: second.into(),
            fraction: None,
            offset: None,
        }
    }

    pub fn with_fraction(mut self, fraction: impl Into<String>) -> Self {
        self.fraction = Some(fraction.into());
        self
    }

    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for TimeLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hour, self.minute, self.second)?;
        if let Some(fraction) = &self.fraction {
            write!(f, ".{fraction}")?;
        }
        match &self.offset {
            Some(UtcOffset::Utc) => f.write_str("Z"),
            Some(UtcOffset::Fixed {
                negative,
                hours,
                minutes,
            }) => write!(f, "{}{hours}:{minutes}", if *negative { '-' } else { '+' }),
            None => Ok(()),
        }
    }
}

/// Zone designator of a clock time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtcOffset {
    /// `Z`
    Utc,
    /// `+hh:mm` or `-hh:mm`
    Fixed {
        negative: bool,
        hours: String,
        minutes: String,
    },
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Integer(digits) => f.write_str(digits),
            Self::Decimal(decimal) => write!(f, "{decimal}"),
            Self::String(text) => write!(f, "\"{}\"", text.replace('"', "\"\"")),
            Self::Term(text) => write!(f, "'{}'", text.replace('\'', "''")),
            Self::Date(date) => write!(f, "{date}"),
            Self::Today => f.write_str("TODAY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_date_time_display() {
        let date = DateLiteral::new("2020", "03", "15").with_time(
            TimeLiteral::new("10", "30", "00")
                .with_fraction("25")
                .with_offset(UtcOffset::Fixed {
                    negative: true,
                    hours: "05".into(),
                    minutes: "00".into(),
                }),
        );
        assert_eq!(date.to_string(), "2020-03-15T10:30:00.25-05:00");
    }

    #[test]
    fn test_string_display_escapes_quotes() {
        assert_eq!(Literal::String("say \"hi\"".into()).to_string(), "\"say \"\"hi\"\"\"");
        assert_eq!(Literal::Term("O'Neil".into()).to_string(), "'O''Neil'");
    }
}
