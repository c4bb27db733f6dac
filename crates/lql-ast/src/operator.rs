//! Operators shared by the syntax tree and the compiled criteria

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator vocabulary of the language
///
/// Operators are plain values. The parser records them on tree nodes and
/// the criteria builder decides what each one means for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    // Equality family
    Equals,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    NotEquals,
    In,

    // Boolean family
    And,
    Or,
    Not,

    // Temporal family
    Before,
    After,
    WithinPast,

    // Transform family
    First,
    Last,
    Exists,
    /// Produced only by the `<=` followed by `<>` form
    NotExists,
    Count,
    Average,
    Sum,
    Median,
    Min,
    Max,

    // Arithmetic family
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Grouping of [`Operator`]s by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorFamily {
    Equality,
    Boolean,
    Temporal,
    Transform,
    Arithmetic,
}

impl Operator {
    pub const fn family(&self) -> OperatorFamily {
        match self {
            Self::Equals
            | Self::LessThan
            | Self::GreaterThan
            | Self::LessThanOrEqual
            | Self::GreaterThanOrEqual
            | Self::NotEquals
            | Self::In => OperatorFamily::Equality,
            Self::And | Self::Or | Self::Not => OperatorFamily::Boolean,
            Self::Before | Self::After | Self::WithinPast => OperatorFamily::Temporal,
            Self::First
            | Self::Last
            | Self::Exists
            | Self::NotExists
            | Self::Count
            | Self::Average
            | Self::Sum
            | Self::Median
            | Self::Min
            | Self::Max => OperatorFamily::Transform,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide => OperatorFamily::Arithmetic,
        }
    }

    pub const fn is_comparison(&self) -> bool {
        matches!(self.family(), OperatorFamily::Equality)
    }

    pub const fn is_transform(&self) -> bool {
        matches!(self.family(), OperatorFamily::Transform)
    }

    /// Surface spelling used when printing criteria back as a query
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThanOrEqual => ">=",
            Self::NotEquals => "<>",
            Self::In => "IN",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::WithinPast => "WITHIN PAST",
            Self::First => "FIRST",
            Self::Last => "LAST",
            Self::Exists => "EXISTS",
            Self::NotExists => "NOT EXISTS",
            Self::Count => "COUNT",
            Self::Average => "AVERAGE",
            Self::Sum => "SUM",
            Self::Median => "MEDIAN",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Operators of the temporal-arithmetic level (`x BEFORE y`, `2 days FROM y`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemporalOp {
    Before,
    After,
    From,
}

impl TemporalOp {
    /// The criteria operator this qualifies with, if any
    pub const fn operator(&self) -> Option<Operator> {
        match self {
            Self::Before => Some(Operator::Before),
            Self::After => Some(Operator::After),
            Self::From => None,
        }
    }
}

/// Infix operator between sortable fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOp {
    Merge,
    Sort(Option<SortKey>),
}

/// Optional `SORT TIME` / `SORT DATA` qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    Time,
    Data,
}

/// Canonical calendar unit of a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl DurationUnit {
    /// Lower-case plural spelling
    pub const fn plural(&self) -> &'static str {
        match self {
            Self::Year => "years",
            Self::Month => "months",
            Self::Week => "weeks",
            Self::Day => "days",
            Self::Hour => "hours",
            Self::Minute => "minutes",
            Self::Second => "seconds",
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}
