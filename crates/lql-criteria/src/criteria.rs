//! The compiled form of one statement
//!
//! A [`Criteria`] is what downstream evaluators consume: the concept key to
//! fetch, the comparisons each fact must pass, the time window and an
//! optional aggregation over the matching facts.
//!
//! The window is a list of qualifiers that all apply: `BETWEEN a AND b`
//! compiles to `AFTER a` followed by `BEFORE b`.

use crate::temporal::{CalendarDate, Duration};
use lql_ast::Operator;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compiled criteria for one statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    /// Concept being queried, e.g. `CD4 COUNT`
    pub key: String,
    pub comparisons: Vec<Comparison>,
    /// Empty when the facts are not restricted in time
    pub temporal: Vec<TemporalQualifier>,
    pub transform: Option<Transform>,
}

impl Criteria {
    /// Bare existence test on `key`
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            comparisons: Vec::new(),
            temporal: Vec::new(),
            transform: None,
        }
    }

    /// Append a comparison
    pub fn compare(mut self, operator: Operator, operand: impl Into<Operand>) -> Self {
        self.comparisons.push(Comparison {
            operator,
            operand: operand.into(),
        });
        self
    }

    /// Append a qualifier to the window
    pub fn with_temporal(mut self, qualifier: TemporalQualifier) -> Self {
        self.temporal.push(qualifier);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// True when nothing narrows or aggregates the facts for `key`
    pub fn is_existence_test(&self) -> bool {
        self.comparisons.is_empty() && self.temporal.is_empty() && self.transform.is_none()
    }
}

/// Renders the criteria back as a statement
impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(transform) = &self.transform {
            write!(f, "{transform} ")?;
        }
        write!(f, "{}", Operand::Text(self.key.clone()))?;
        for comparison in &self.comparisons {
            write!(f, " {comparison}")?;
        }
        match self.temporal.as_slice() {
            [start, end] if start.operator == Operator::After && end.operator == Operator::Before => {
                match (start.bound, end.bound) {
                    (TemporalBound::Duration(from), TemporalBound::Duration(to)) => {
                        write!(f, " BETWEEN {from} AND {to} AGO")?
                    }
                    (TemporalBound::Duration(_), _) | (_, TemporalBound::Duration(_)) => {
                        write!(f, " {start} {end}")?
                    }
                    (from, to) => write!(f, " BETWEEN {from} AND {to}")?,
                }
            }
            qualifiers => {
                for qualifier in qualifiers {
                    write!(f, " {qualifier}")?;
                }
            }
        }
        f.write_str(";")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// An equality-family operator, or `NotExists`
    pub operator: Operator,
    pub operand: Operand,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::NotExists => write!(f, "<= <> {}", self.operand),
            Operator::In => write!(f, "IS IN {}", self.operand),
            operator => write!(f, "{operator} {}", self.operand),
        }
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Operand {
    Text(String),
    /// Terminology code
    Term(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    Null,
    Date(CalendarDate),
    Duration(Duration),
    List(Vec<Operand>),
}

impl Operand {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Term(_) => "term",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Boolean(_) => "boolean",
            Self::Null => "null",
            Self::Date(_) => "date",
            Self::Duration(_) => "duration",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "\"{}\"", text.replace('"', "\"\"")),
            Self::Term(term) => write!(f, "'{}'", term.replace('\'', "''")),
            Self::Integer(value) if *value < 0 => write!(f, "(0 - {})", value.unsigned_abs()),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) if value.is_sign_negative() && !value.is_zero() => {
                write!(f, "(0 - {})", Self::Decimal(value.abs()))
            }
            Self::Decimal(value) if value.fract().is_zero() => write!(f, "{}.0", value.trunc()),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Null => f.write_str("NULL"),
            Self::Date(date) => write!(f, "{date}"),
            Self::Duration(duration) => write!(f, "{duration}"),
            Self::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Decimal> for Operand {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<CalendarDate> for Operand {
    fn from(value: CalendarDate) -> Self {
        Self::Date(value)
    }
}

impl From<Duration> for Operand {
    fn from(value: Duration) -> Self {
        Self::Duration(value)
    }
}

/// Time window applied to the facts for the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalQualifier {
    /// `Before`, `After` or `WithinPast`
    pub operator: Operator,
    pub bound: TemporalBound,
}

impl TemporalQualifier {
    pub fn before(bound: impl Into<TemporalBound>) -> Self {
        Self {
            operator: Operator::Before,
            bound: bound.into(),
        }
    }

    pub fn after(bound: impl Into<TemporalBound>) -> Self {
        Self {
            operator: Operator::After,
            bound: bound.into(),
        }
    }

    pub fn within_past(duration: Duration) -> Self {
        Self {
            operator: Operator::WithinPast,
            bound: TemporalBound::Duration(duration),
        }
    }
}

impl fmt::Display for TemporalQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.operator, &self.bound) {
            (Operator::WithinPast, bound) => write!(f, "WITHIN PAST {bound}"),
            (operator, TemporalBound::Duration(duration)) => write!(f, "{operator} {duration} AGO"),
            (operator, bound) => write!(f, "{operator} {bound}"),
        }
    }
}

/// A fixed date, or a point resolved at evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalBound {
    Date(CalendarDate),
    /// Measured back from the evaluation date
    Duration(Duration),
    /// The evaluation date itself
    Today,
}

impl From<CalendarDate> for TemporalBound {
    fn from(value: CalendarDate) -> Self {
        Self::Date(value)
    }
}

impl From<Duration> for TemporalBound {
    fn from(value: Duration) -> Self {
        Self::Duration(value)
    }
}

impl fmt::Display for TemporalBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{date}"),
            Self::Duration(duration) => write!(f, "{duration}"),
            Self::Today => f.write_str("TODAY"),
        }
    }
}

/// Aggregation over the matching facts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    /// A transform-family operator
    pub operator: Operator,
    /// How many facts FIRST/LAST/MIN/MAX keep
    pub count: Option<u32>,
}

impl Transform {
    pub const fn new(operator: Operator) -> Self {
        Self { operator, count: None }
    }

    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            Some(count) => write!(f, "{} {count} OF", self.operator),
            None => write!(f, "{} OF", self.operator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lql_ast::DurationUnit;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_existence_test() {
        assert!(Criteria::new("CD4 COUNT").is_existence_test());
        assert!(!Criteria::new("CD4 COUNT").compare(Operator::LessThan, 200_i64).is_existence_test());
        assert!(
            !Criteria::new("CD4 COUNT")
                .with_transform(Transform::new(Operator::Last))
                .is_existence_test()
        );
    }

    #[test]
    fn test_display_renders_statement() {
        let criteria = Criteria::new("CD4 COUNT")
            .compare(Operator::LessThan, 200_i64)
            .with_temporal(TemporalQualifier::within_past(Duration::new(6, DurationUnit::Month)))
            .with_transform(Transform::new(Operator::Last).with_count(2));
        assert_eq!(criteria.to_string(), "LAST 2 OF \"CD4 COUNT\" < 200 WITHIN PAST 6 months;");
    }

    #[test]
    fn test_display_of_relative_and_fixed_bounds() {
        let ago = TemporalQualifier::after(Duration::new(3, DurationUnit::Week));
        assert_eq!(ago.to_string(), "AFTER 3 weeks AGO");

        let fixed = TemporalQualifier::before(CalendarDate::new(2020, 0, 1));
        assert_eq!(fixed.to_string(), "BEFORE 2020-01-01");
    }

    #[test]
    fn test_display_of_operands() {
        let list = Operand::List(vec![Operand::Term("A1".into()), Operand::Null, Operand::Boolean(true)]);
        assert_eq!(list.to_string(), "('A1', NULL, TRUE)");
        assert_eq!(Operand::from("say \"hi\"").to_string(), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_display_of_folded_numbers() {
        assert_eq!(Operand::Integer(-1).to_string(), "(0 - 1)");
        assert_eq!(Operand::Integer(i64::MIN).to_string(), "(0 - 9223372036854775808)");
        assert_eq!(Operand::Decimal(Decimal::new(3, 0)).to_string(), "3.0");
        assert_eq!(Operand::Decimal(Decimal::new(-15, 1)).to_string(), "(0 - 1.5)");
        assert_eq!(Operand::Decimal(Decimal::new(-3, 0)).to_string(), "(0 - 3.0)");
        assert_eq!(Operand::Decimal(Decimal::new(25, 1)).to_string(), "2.5");
        assert_eq!(
            Operand::Duration(Duration::new(-2, DurationUnit::Day)).to_string(),
            "(0 - 2) days"
        );
    }

    #[test]
    fn test_display_collapses_between() {
        let criteria = Criteria::new("x")
            .with_temporal(TemporalQualifier::after(CalendarDate::new(2020, 0, 1)))
            .with_temporal(TemporalQualifier::before(TemporalBound::Today));
        assert_eq!(criteria.to_string(), "\"x\" BETWEEN 2020-01-01 AND TODAY;");

        let relative = Criteria::new("x")
            .with_temporal(TemporalQualifier::after(Duration::new(6, DurationUnit::Month)))
            .with_temporal(TemporalQualifier::before(Duration::new(1, DurationUnit::Month)));
        assert_eq!(relative.to_string(), "\"x\" BETWEEN 6 months AND 1 month AGO;");
        assert!(!relative.is_existence_test());
    }

    #[test]
    fn test_not_exists_renders_compatibility_form() {
        let criteria = Criteria::new("x").compare(Operator::NotExists, 5_i64);
        assert_eq!(criteria.to_string(), "\"x\" <= <> 5;");
    }

    #[test]
    fn test_serializes_tagged_operand() {
        let json = serde_json::to_value(Criteria::new("HGB").compare(Operator::Equals, 12_i64)).unwrap();
        assert_eq!(json["comparisons"][0]["operator"], "Equals");
        assert_eq!(json["comparisons"][0]["operand"]["type"], "integer");
        assert_eq!(json["comparisons"][0]["operand"]["value"], 12);
    }
}
