//! Expression AST nodes
//!
//! One variant per grammar level, loosest binding first. Every binary node
//! has exactly two children; the operator that produced it is recorded on
//! the node.

use crate::{BoxExpr, DurationUnit, Keyword, Literal, Operator, SortOp, Spanned, TemporalOp};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Expression {
    /// `a, b, c`
    List(Vec<Spanned<Expression>>),
    /// `a MERGE b`, `a SORT TIME b`
    Sort(SortExpr),
    /// `a WHERE b`
    Where(WhereExpr),
    /// `a SEQTO b`
    Range(RangeExpr),
    /// `a AND b`, `a OR b`
    Boolean(BooleanExpr),
    /// `NOT a`
    Not(NotExpr),
    /// `a < b`, `a IS GREATER THAN b`
    Comparison(ComparisonExpr),
    /// `a || b`
    Concat(ConcatExpr),
    /// `a + b`, `a * b`
    Arithmetic(ArithmeticExpr),
    /// `a BEFORE b`, `a AFTER b`, `a FROM b`
    Temporal(TemporalExpr),
    /// `a BETWEEN b AND c`
    Between(BetweenExpr),
    /// `a AGO`
    Ago(AgoExpr),
    /// `30 days`
    Duration(DurationExpr),
    /// `[THE] LAST [OF] a`
    Function(FunctionExpr),
    /// Identifier, possibly a compound name such as `CD4 COUNT`
    Identifier(String),
    Literal(Literal),
}

impl Expression {
    /// Short description for diagnostics
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Sort(_) => "sort/merge expression",
            Self::Where(_) => "WHERE clause",
            Self::Range(_) => "SEQTO range",
            Self::Boolean(BooleanExpr { op: Operator::Or, .. }) => "OR expression",
            Self::Boolean(_) => "AND expression",
            Self::Not(_) => "NOT expression",
            Self::Comparison(_) => "comparison",
            Self::Concat(_) => "concatenation",
            Self::Arithmetic(_) => "arithmetic expression",
            Self::Temporal(_) => "temporal expression",
            Self::Between(_) => "BETWEEN expression",
            Self::Ago(_) => "AGO expression",
            Self::Duration(_) => "duration",
            Self::Function(_) => "function application",
            Self::Identifier(_) => "identifier",
            Self::Literal(Literal::Term(_)) => "term literal",
            Self::Literal(Literal::Date(_)) => "date literal",
            Self::Literal(_) => "literal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortExpr {
    pub left: BoxExpr,
    pub op: SortOp,
    pub right: BoxExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhereExpr {
    pub source: BoxExpr,
    pub condition: BoxExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeExpr {
    pub low: BoxExpr,
    pub high: BoxExpr,
}

/// `op` is [`Operator::And`] or [`Operator::Or`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BooleanExpr {
    pub left: BoxExpr,
    pub op: Operator,
    pub right: BoxExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotExpr {
    pub operand: BoxExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonExpr {
    pub left: BoxExpr,
    /// One of the equality-family operators
    pub op: Operator,
    /// IS/ARE/WAS/WERE when written as a phrase
    pub copula: Option<Keyword>,
    /// `<=` immediately followed by `<>`
    pub not_equal_marker: bool,
    pub right: BoxExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConcatExpr {
    pub left: BoxExpr,
    pub right: BoxExpr,
}

/// `op` is one of the arithmetic-family operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArithmeticExpr {
    pub left: BoxExpr,
    pub op: Operator,
    pub right: BoxExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemporalExpr {
    pub left: BoxExpr,
    pub op: TemporalOp,
    pub right: BoxExpr,
}

/// `subject BETWEEN start AND end`, bounds in the order written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetweenExpr {
    pub subject: BoxExpr,
    pub start: BoxExpr,
    pub end: BoxExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgoExpr {
    pub operand: BoxExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationExpr {
    pub magnitude: BoxExpr,
    pub unit: DurationUnit,
    /// Spelling the unit was written with
    pub keyword: Keyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionExpr {
    /// A transform keyword
    pub keyword: Keyword,
    pub the: bool,
    pub argument: BoxExpr,
}
