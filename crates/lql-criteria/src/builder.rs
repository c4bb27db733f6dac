//! AST to Criteria builder
//!
//! Walks one parsed statement and resolves, in order: the aggregation
//! prefix, the key, the comparison and the temporal qualifier. The walk is
//! bounded by the depth of the tree; nothing is kept between statements.
//!
//! Accepted shapes:
//!
//! ```text
//! [transform] key                                     existence test
//! [transform] key op operand                          comparison
//! [transform] key BEFORE|AFTER date                   fixed window
//! [transform] key AFTER n units AGO                   relative window
//! [transform] key BETWEEN date AND date               closed window
//! [transform] key BETWEEN n units AND m units AGO     relative closed window
//! [transform] key op operand BEFORE|AFTER date        both
//! ... WITHIN [THE] [PAST] n units                     trailing window
//! ```
//!
//! `TODAY` stands in for a date anywhere a window takes one. A statement
//! carries one window; `BETWEEN` is a single window of two qualifiers.

use crate::criteria::{Comparison, Criteria, Operand, TemporalBound, TemporalQualifier, Transform};
use crate::temporal::{Duration, parse_calendar_date};
use lql_ast::{
    AggregationPrefix, AgoExpr, ArithmeticExpr, BetweenExpr, ComparisonExpr, ConcatExpr, DecimalLiteral, DurationExpr,
    Expression, Keyword, Literal, Operator, Query, Spanned, TemporalExpr, TemporalOp, WithinSuffix,
};
use lql_diagnostics::{
    LQL0100, LQL0101, LQL0102, LQL0104, LQL0105, LQL0106, LQL0107, LQL0108, LqlError, Result, Span,
};
use rust_decimal::Decimal;
use std::str::FromStr;

type Node = Spanned<Expression>;

/// Build criteria from a parsed statement
pub fn build(query: &Spanned<Query>) -> Result<Criteria> {
    CriteriaBuilder::new().build(query)
}

/// Single-use walker over one statement
#[derive(Debug, Default)]
pub struct CriteriaBuilder {
    /// Window resolved so far
    temporal: Vec<TemporalQualifier>,
}

/// `BEFORE`/`AFTER`/`BETWEEN` node split into its parts
struct TemporalParts<'a> {
    subject: &'a Node,
    window: Window<'a>,
    ago: bool,
}

enum Window<'a> {
    Single { op: TemporalOp, bound: &'a Node },
    Between { start: &'a Node, end: &'a Node },
}

impl CriteriaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, query: &Spanned<Query>) -> Result<Criteria> {
        let transform = query.transform.as_ref().map(resolve_transform).transpose()?;
        let (key, comparison) = self.convert_body(&query.body)?;

        if let Some(within) = &query.within {
            self.convert_within(within)?;
        }

        let mut criteria = Criteria::new(key);
        if let Some(Comparison { operator, operand }) = comparison {
            criteria = criteria.compare(operator, operand);
        }
        for qualifier in self.temporal {
            criteria = criteria.with_temporal(qualifier);
        }
        if let Some(transform) = transform {
            criteria = criteria.with_transform(transform);
        }

        log::debug!("built criteria {criteria}");
        Ok(criteria)
    }

    fn convert_body(&mut self, body: &Node) -> Result<(String, Option<Comparison>)> {
        let Expression::Comparison(comparison) = &body.inner else {
            return Ok((self.convert_key(body)?, None));
        };

        let key = self.convert_key(&comparison.left)?;
        let operator = comparison_operator(comparison);
        let operand = self.convert_operand(&comparison.right)?;
        let operand = match (operator, operand) {
            (Operator::In, Operand::List(items)) => Operand::List(items),
            (Operator::In, single) => Operand::List(vec![single]),
            (_, operand) => operand,
        };

        Ok((key, Some(Comparison { operator, operand })))
    }

    /// The key, possibly wrapped in a BEFORE/AFTER qualifier
    fn convert_key(&mut self, node: &Node) -> Result<String> {
        match temporal_parts(node) {
            Some(parts) => {
                self.qualify_with(&parts, node.span)?;
                key_of(parts.subject)
            }
            None => key_of(node),
        }
    }

    /// The comparison operand, possibly wrapped in a BEFORE/AFTER qualifier
    fn convert_operand(&mut self, node: &Node) -> Result<Operand> {
        match temporal_parts(node) {
            Some(parts) => {
                self.qualify_with(&parts, node.span)?;
                fold(parts.subject)
            }
            None => fold(node),
        }
    }

    fn convert_within(&mut self, within: &Spanned<WithinSuffix>) -> Result<()> {
        let duration = match fold(&within.operand)? {
            Operand::Duration(duration) => duration,
            other => {
                return Err(LqlError::semantic_at(
                    LQL0104,
                    format!("WITHIN needs a duration such as '30 days', found {}", other.kind_name()),
                    within.operand.span,
                ));
            }
        };
        self.qualify(vec![TemporalQualifier::within_past(duration)], within.span)
    }

    fn qualify_with(&mut self, parts: &TemporalParts<'_>, span: Span) -> Result<()> {
        let qualifiers = match parts.window {
            Window::Single { op, bound } => {
                let Some(operator) = op.operator() else {
                    return Err(LqlError::semantic_at(
                        LQL0101,
                        "FROM cannot qualify a criteria; use BEFORE, AFTER or BETWEEN",
                        span,
                    ));
                };
                let bound = resolve_bound(&operator.to_string(), bound, parts.ago)?;
                vec![TemporalQualifier { operator, bound }]
            }
            Window::Between { start, end } => vec![
                TemporalQualifier::after(resolve_bound("BETWEEN", start, parts.ago)?),
                TemporalQualifier::before(resolve_bound("BETWEEN", end, parts.ago)?),
            ],
        };

        self.qualify(qualifiers, span)
    }

    fn qualify(&mut self, qualifiers: Vec<TemporalQualifier>, span: Span) -> Result<()> {
        if !self.temporal.is_empty() {
            let existing: Vec<String> = self.temporal.iter().map(ToString::to_string).collect();
            return Err(LqlError::semantic_at(
                LQL0106,
                format!("statement is already qualified by '{}'", existing.join(" ")),
                span,
            ));
        }
        for qualifier in &qualifiers {
            log::trace!("temporal qualifier {qualifier}");
        }
        self.temporal = qualifiers;
        Ok(())
    }
}

/// One bound of a window: a date or `TODAY`, or a duration under `AGO`
fn resolve_bound(context: &str, node: &Node, ago: bool) -> Result<TemporalBound> {
    if ago {
        return duration_of(node).map(TemporalBound::Duration);
    }
    match &node.inner {
        Expression::Literal(Literal::Date(date)) => {
            Ok(TemporalBound::Date(parse_calendar_date(date).map_err(|e| e.with_span(node.span))?))
        }
        Expression::Literal(Literal::Today) => Ok(TemporalBound::Today),
        Expression::Duration(_) => Err(LqlError::semantic_at(
            LQL0104,
            format!("relative bound needs AGO: '{context} ... AGO'"),
            node.span,
        )),
        other => Err(LqlError::semantic_at(
            LQL0102,
            format!("{context} needs a date, found {}", other.kind_name()),
            node.span,
        )),
    }
}

fn temporal_parts(node: &Node) -> Option<TemporalParts<'_>> {
    let (qualified, ago) = match &node.inner {
        Expression::Ago(AgoExpr { operand }) => (&**operand, true),
        _ => (node, false),
    };
    let (subject, window) = match &qualified.inner {
        Expression::Temporal(TemporalExpr { left, op, right }) => {
            (&**left, Window::Single { op: *op, bound: &**right })
        }
        Expression::Between(BetweenExpr { subject, start, end }) => {
            (&**subject, Window::Between { start: &**start, end: &**end })
        }
        _ => return None,
    };
    Some(TemporalParts {
        subject,
        window,
        ago,
    })
}

/// `<=` followed by `<>` resolves to NOT EXISTS
///
/// Kept for compatibility with stored rules written against the old
/// grammar; plain `<=` stays LESS THAN OR EQUAL.
fn comparison_operator(comparison: &ComparisonExpr) -> Operator {
    match comparison.op {
        Operator::LessThanOrEqual if comparison.not_equal_marker => {
            log::debug!("'<=' followed by '<>' resolved to NOT EXISTS");
            Operator::NotExists
        }
        op => op,
    }
}

fn resolve_transform(prefix: &Spanned<AggregationPrefix>) -> Result<Transform> {
    let operator = transform_operator(prefix.keyword).ok_or_else(|| {
        LqlError::semantic_at(LQL0101, format!("{} is not a transform", prefix.keyword), prefix.span)
    })?;

    let mut transform = Transform::new(operator);
    if let Some(count) = &prefix.count {
        let parsed = count.inner.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
            LqlError::semantic_at(
                LQL0105,
                format!("{operator} count must be a positive integer, found {}", count.inner),
                count.span,
            )
        })?;
        transform = transform.with_count(parsed);
    }
    Ok(transform)
}

fn transform_operator(keyword: Keyword) -> Option<Operator> {
    let operator = match keyword {
        Keyword::Last | Keyword::Latest => Operator::Last,
        Keyword::First | Keyword::Earliest => Operator::First,
        Keyword::Exist | Keyword::Exists => Operator::Exists,
        Keyword::Count => Operator::Count,
        Keyword::Avg | Keyword::Average => Operator::Average,
        Keyword::Sum => Operator::Sum,
        Keyword::Median => Operator::Median,
        Keyword::Min | Keyword::Minimum => Operator::Min,
        Keyword::Max | Keyword::Maximum => Operator::Max,
        _ => return None,
    };
    Some(operator)
}

fn key_of(node: &Node) -> Result<String> {
    match &node.inner {
        Expression::Identifier(name) => Ok(name.clone()),
        Expression::Literal(Literal::String(text) | Literal::Integer(text)) => Ok(text.clone()),
        Expression::List(_)
        | Expression::Sort(_)
        | Expression::Where(_)
        | Expression::Range(_)
        | Expression::Boolean(_)
        | Expression::Not(_)
        | Expression::Function(_) => Err(LqlError::semantic_at(
            LQL0101,
            format!("{} is not supported in a criteria statement", node.kind_name()),
            node.span,
        )),
        other => Err(LqlError::semantic_at(
            LQL0100,
            format!("{} cannot be used as a criteria key", other.kind_name()),
            node.span,
        )),
    }
}

/// Reduce an operand expression to a value, folding constant arithmetic
fn fold(node: &Node) -> Result<Operand> {
    match &node.inner {
        Expression::Identifier(name) => Ok(Operand::Text(name.clone())),
        Expression::Literal(literal) => literal_operand(literal, node.span),
        Expression::Duration(duration) => duration_operand(duration, node.span),
        Expression::List(items) => items.iter().map(fold).collect::<Result<Vec<_>>>().map(Operand::List),
        Expression::Arithmetic(ArithmeticExpr { left, op, right }) => {
            arithmetic(*op, fold(left)?, fold(right)?, node.span)
        }
        Expression::Concat(ConcatExpr { left, right }) => match (fold(left)?, fold(right)?) {
            (Operand::Text(left), Operand::Text(right)) => Ok(Operand::Text(left + &right)),
            (left, right) => Err(LqlError::semantic_at(
                LQL0102,
                format!("'||' joins text, found {} and {}", left.kind_name(), right.kind_name()),
                node.span,
            )),
        },
        other => Err(LqlError::semantic_at(
            LQL0102,
            format!("{} is not a valid comparison operand", other.kind_name()),
            node.span,
        )),
    }
}

fn literal_operand(literal: &Literal, span: Span) -> Result<Operand> {
    Ok(match literal {
        Literal::Null => Operand::Null,
        Literal::Boolean(value) => Operand::Boolean(*value),
        Literal::String(text) => Operand::Text(text.clone()),
        Literal::Term(term) => Operand::Term(term.clone()),
        Literal::Integer(digits) => Operand::Integer(integer(digits, span)?),
        Literal::Decimal(decimal) => Operand::Decimal(decimal_value(decimal, span)?),
        Literal::Date(date) => Operand::Date(parse_calendar_date(date).map_err(|e| e.with_span(span))?),
        Literal::Today => {
            return Err(LqlError::semantic_at(
                LQL0102,
                "TODAY can only bound a BEFORE, AFTER or BETWEEN window",
                span,
            ));
        }
    })
}

fn integer(digits: &str, span: Span) -> Result<i64> {
    digits
        .parse()
        .map_err(|_| LqlError::semantic_at(LQL0107, format!("integer {digits} does not fit in 64 bits"), span))
}

fn decimal_value(decimal: &DecimalLiteral, span: Span) -> Result<Decimal> {
    Decimal::from_str(&decimal.to_string())
        .map_err(|e| LqlError::semantic_at(LQL0107, format!("decimal {decimal} is out of range: {e}"), span))
}

fn duration_operand(duration: &DurationExpr, span: Span) -> Result<Operand> {
    match fold(&duration.magnitude)? {
        Operand::Integer(magnitude) => Ok(Operand::Duration(Duration::new(magnitude, duration.unit))),
        other => Err(LqlError::semantic_at(
            LQL0104,
            format!("duration magnitude must be an integer, found {}", other.kind_name()),
            span,
        )),
    }
}

fn duration_of(node: &Node) -> Result<Duration> {
    match fold(node)? {
        Operand::Duration(duration) => Ok(duration),
        other => Err(LqlError::semantic_at(
            LQL0104,
            format!("AGO needs a duration such as '3 months', found {}", other.kind_name()),
            node.span,
        )),
    }
}

fn arithmetic(op: Operator, left: Operand, right: Operand, span: Span) -> Result<Operand> {
    let overflow = || LqlError::semantic_at(LQL0107, format!("{left} {op} {right} overflows"), span);

    match (&left, &right) {
        (Operand::Integer(a), Operand::Integer(b)) => match op {
            Operator::Add => a.checked_add(*b).map(Operand::Integer).ok_or_else(overflow),
            Operator::Subtract => a.checked_sub(*b).map(Operand::Integer).ok_or_else(overflow),
            Operator::Multiply => a.checked_mul(*b).map(Operand::Integer).ok_or_else(overflow),
            Operator::Divide if *b == 0 => Err(division_by_zero(span)),
            Operator::Divide if a.checked_rem(*b) == Some(0) => a.checked_div(*b).map(Operand::Integer).ok_or_else(overflow),
            _ => decimal_arithmetic(op, Decimal::from(*a), Decimal::from(*b)).ok_or_else(overflow),
        },
        (Operand::Integer(a), Operand::Decimal(b)) => checked_decimal(op, Decimal::from(*a), *b, span, overflow),
        (Operand::Decimal(a), Operand::Integer(b)) => checked_decimal(op, *a, Decimal::from(*b), span, overflow),
        (Operand::Decimal(a), Operand::Decimal(b)) => checked_decimal(op, *a, *b, span, overflow),
        (Operand::Duration(a), Operand::Duration(b)) if matches!(op, Operator::Add | Operator::Subtract) => {
            if a.unit != b.unit {
                return Err(LqlError::semantic_at(
                    LQL0104,
                    format!("cannot combine {a} and {b}"),
                    span,
                ));
            }
            let magnitude = match op {
                Operator::Add => a.magnitude.checked_add(b.magnitude),
                _ => a.magnitude.checked_sub(b.magnitude),
            };
            magnitude
                .map(|magnitude| Operand::Duration(Duration::new(magnitude, a.unit)))
                .ok_or_else(overflow)
        }
        (Operand::Duration(d), Operand::Integer(n)) | (Operand::Integer(n), Operand::Duration(d))
            if op == Operator::Multiply =>
        {
            d.magnitude
                .checked_mul(*n)
                .map(|magnitude| Operand::Duration(Duration::new(magnitude, d.unit)))
                .ok_or_else(overflow)
        }
        _ => Err(LqlError::semantic_at(
            LQL0102,
            format!("cannot apply '{op}' to {} and {}", left.kind_name(), right.kind_name()),
            span,
        )),
    }
}

fn checked_decimal(
    op: Operator,
    a: Decimal,
    b: Decimal,
    span: Span,
    overflow: impl FnOnce() -> LqlError,
) -> Result<Operand> {
    if op == Operator::Divide && b.is_zero() {
        return Err(division_by_zero(span));
    }
    decimal_arithmetic(op, a, b).ok_or_else(overflow)
}

fn decimal_arithmetic(op: Operator, a: Decimal, b: Decimal) -> Option<Operand> {
    let value = match op {
        Operator::Add => a.checked_add(b),
        Operator::Subtract => a.checked_sub(b),
        Operator::Multiply => a.checked_mul(b),
        Operator::Divide => a.checked_div(b),
        _ => None,
    }?;
    Some(Operand::Decimal(value.normalize()))
}

fn division_by_zero(span: Span) -> LqlError {
    LqlError::semantic_at(LQL0108, "division by zero", span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lql_ast::DurationUnit;

    fn node(expression: Expression) -> Node {
        Spanned::new(expression, Span::new(0, 1))
    }

    fn int(digits: &str) -> Node {
        node(Expression::Literal(Literal::Integer(digits.to_string())))
    }

    fn arith(left: Node, op: Operator, right: Node) -> Node {
        node(Expression::Arithmetic(ArithmeticExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }))
    }

    #[test]
    fn test_transform_aliases() {
        assert_eq!(transform_operator(Keyword::Latest), Some(Operator::Last));
        assert_eq!(transform_operator(Keyword::Earliest), Some(Operator::First));
        assert_eq!(transform_operator(Keyword::Exist), Some(Operator::Exists));
        assert_eq!(transform_operator(Keyword::Minimum), Some(Operator::Min));
        assert_eq!(transform_operator(Keyword::Before), None);
    }

    #[test]
    fn test_integer_folding() {
        assert_eq!(fold(&arith(int("2"), Operator::Multiply, int("21"))).unwrap(), Operand::Integer(42));
        assert_eq!(
            fold(&arith(int("7"), Operator::Divide, int("2"))).unwrap(),
            Operand::Decimal(Decimal::new(35, 1))
        );
    }

    #[test]
    fn test_overflow_and_division_by_zero() {
        let big = arith(int("9223372036854775807"), Operator::Add, int("1"));
        assert_eq!(fold(&big).unwrap_err().code(), LQL0107);

        let zero = arith(int("1"), Operator::Divide, int("0"));
        assert_eq!(fold(&zero).unwrap_err().code(), LQL0108);

        assert_eq!(fold(&int("99999999999999999999")).unwrap_err().code(), LQL0107);
    }

    #[test]
    fn test_decimal_folding() {
        let half = || node(Expression::Literal(Literal::Decimal(DecimalLiteral::new("0", "5"))));
        assert_eq!(
            fold(&arith(int("3"), Operator::Subtract, half())).unwrap(),
            Operand::Decimal(Decimal::new(25, 1))
        );
        assert_eq!(fold(&arith(half(), Operator::Multiply, half())).unwrap(), Operand::Decimal(Decimal::new(25, 2)));

        let zero = node(Expression::Literal(Literal::Decimal(DecimalLiteral::new("0", "0"))));
        assert_eq!(fold(&arith(half(), Operator::Divide, zero)).unwrap_err().code(), LQL0108);
        assert_eq!(fold(&arith(half(), Operator::Divide, int("0"))).unwrap_err().code(), LQL0108);
    }

    #[test]
    fn test_duration_scaling() {
        let days = node(Expression::Duration(DurationExpr {
            magnitude: Box::new(int("3")),
            unit: DurationUnit::Day,
            keyword: Keyword::Days,
        }));
        let scaled = fold(&arith(int("2"), Operator::Multiply, days)).unwrap();
        assert_eq!(scaled, Operand::Duration(Duration::new(6, DurationUnit::Day)));
    }
}
