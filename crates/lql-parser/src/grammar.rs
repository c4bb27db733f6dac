//! Statement grammar, recursive descent with one function per level
//!
//! Levels, loosest binding first:
//!
//! ```text
//! query       := [prefix] expr [WITHIN [THE] [PAST] concat] ';'
//! expr        := sort (',' sort)*
//! sort        := where ((MERGE | SORT [TIME | DATA]) where)*
//! where       := range (WHERE range)*
//! range       := or (SEQTO or)*
//! or          := and (OR and)*
//! and         := not (AND not)*
//! not         := NOT not | comparison
//! comparison  := concat [simple_op concat | copula phrase concat]
//! concat      := additive ('||' additive)*
//! additive    := multiplicative (('+' | '-') multiplicative)*
//! multiplic.  := temporal (('*' | '/') temporal)*
//! temporal    := duration ((BEFORE | AFTER | FROM) duration
//!                         | BETWEEN duration AND duration)* [AGO]
//! duration    := function [unit]
//! function    := [THE] transform [OF] factor | [THE] factor
//! factor      := name | integer | decimal | date | string | term
//!              | TRUE | FALSE | NULL | TODAY | '(' expr ')'
//! ```
//!
//! Decimals and dates are built from integer, `.` and `-` tokens only when
//! they touch, so `2020-01-01` is a date while `2020 - 01 - 01` is
//! arithmetic.

use crate::cursor::{Cursor, PResult};
use crate::token::{Symbol, Token, TokenKind, classify_duration_unit};
use lql_ast::{
    AgoExpr, AggregationPrefix, ArithmeticExpr, BetweenExpr, BooleanExpr, BoxExpr, ComparisonExpr, ConcatExpr,
    DateLiteral, DecimalLiteral, DurationExpr, Expression, FunctionExpr, Keyword, Literal, NotExpr, Operator, Query,
    RangeExpr, SortExpr, SortKey, SortOp, Spanned, TemporalExpr, TemporalOp, TimeLiteral, UtcOffset, WhereExpr,
    WithinSuffix,
};
use lql_diagnostics::{LQL0013, LqlError, Span};

type Node = Spanned<Expression>;

const FACTOR_START: [&str; 9] = [
    "identifier",
    "integer literal",
    "string literal",
    "term literal",
    "'('",
    "TRUE",
    "FALSE",
    "NULL",
    "TODAY",
];

fn join(left: Node, right: Node, build: impl FnOnce(BoxExpr, BoxExpr) -> Expression) -> Node {
    let span = left.span.merge(right.span);
    Spanned::new(build(Box::new(left), Box::new(right)), span)
}

fn leaf(token: &Token, expression: Expression) -> Node {
    Spanned::new(expression, token.span)
}

fn optional_keyword(c: Cursor<'_>, keyword: Keyword) -> (bool, Cursor<'_>) {
    match c.eat_keyword(keyword) {
        Some(next) => (true, next),
        None => (false, c),
    }
}

/// Parse one statement up to and including its `;`
pub fn query(c: Cursor<'_>) -> PResult<'_, Spanned<Query>> {
    let start = c.peek().span;
    let (transform, c) = aggregation_prefix(c)?;
    let (body, c) = expr(c)?;
    let (within, c) = within_suffix(c)?;
    let (semicolon, c) = c.expect_symbol(Symbol::Semicolon)?;

    let query = Query {
        transform,
        body,
        within,
    };
    Ok((Spanned::new(query, start.merge(semicolon.span)), c))
}

/// Leading COUNT/EXISTS/AVG/SUM/MEDIAN [OF] or FIRST/LAST/MIN/MAX [n] [OF|FROM]
fn aggregation_prefix(c: Cursor<'_>) -> PResult<'_, Option<Spanned<AggregationPrefix>>> {
    let token = c.peek();
    let Some(keyword) = token.keyword().filter(Keyword::is_transform) else {
        return Ok((None, c));
    };

    let mut c = c.advance();
    let mut prefix = AggregationPrefix::new(keyword);
    let mut span = token.span;

    if keyword.is_positional_transform() && c.at_kind(TokenKind::Integer) {
        let (count, next) = c.bump();
        prefix = prefix.with_count(Spanned::new(count.lexeme.clone(), count.span));
        span = span.merge(count.span);
        c = next;
    }

    let connective = c.at_keyword(Keyword::Of) || (keyword.is_positional_transform() && c.at_keyword(Keyword::From));
    if connective {
        span = span.merge(c.peek().span);
        c = c.advance();
    }

    Ok((Some(Spanned::new(prefix, span)), c))
}

/// `WITHIN [THE] [PAST] operand`
fn within_suffix(c: Cursor<'_>) -> PResult<'_, Option<Spanned<WithinSuffix>>> {
    let within = c.peek();
    let Some(c) = c.eat_keyword(Keyword::Within) else {
        return Ok((None, c));
    };
    let (the, c) = optional_keyword(c, Keyword::The);
    let (past, c) = optional_keyword(c, Keyword::Past);
    let (operand, c) = concat_expr(c)?;

    let span = within.span.merge(operand.span);
    Ok((Some(Spanned::new(WithinSuffix { the, past, operand }, span)), c))
}

/// Comma-separated fragments
fn expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let (first, mut c) = sort_expr(c)?;
    if !c.at_symbol(Symbol::Comma) {
        return Ok((first, c));
    }

    let mut span = first.span;
    let mut items = vec![first];
    while let Some(next) = c.eat_symbol(Symbol::Comma) {
        let (item, after) = sort_expr(next)?;
        span = span.merge(item.span);
        items.push(item);
        c = after;
    }
    Ok((Spanned::new(Expression::List(items), span), c))
}

/// MERGE / SORT [TIME | DATA]
fn sort_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let (mut left, mut c) = where_expr(c)?;

    loop {
        let (op, next) = if let Some(next) = c.eat_keyword(Keyword::Merge) {
            (SortOp::Merge, next)
        } else if let Some(next) = c.eat_keyword(Keyword::Sort) {
            if let Some(after) = next.eat_keyword(Keyword::Time) {
                (SortOp::Sort(Some(SortKey::Time)), after)
            } else if let Some(after) = next.eat_keyword(Keyword::Data) {
                (SortOp::Sort(Some(SortKey::Data)), after)
            } else {
                (SortOp::Sort(None), next)
            }
        } else {
            break;
        };

        let (right, after) = where_expr(next)?;
        left = join(left, right, |left, right| Expression::Sort(SortExpr { left, op, right }));
        c = after;
    }

    Ok((left, c))
}

fn where_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let (mut left, mut c) = range_expr(c)?;

    while let Some(next) = c.eat_keyword(Keyword::Where) {
        let (condition, after) = range_expr(next)?;
        left = join(left, condition, |source, condition| {
            Expression::Where(WhereExpr { source, condition })
        });
        c = after;
    }

    Ok((left, c))
}

fn range_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let (mut left, mut c) = or_expr(c)?;

    while let Some(next) = c.eat_keyword(Keyword::Seqto) {
        let (high, after) = or_expr(next)?;
        left = join(left, high, |low, high| Expression::Range(RangeExpr { low, high }));
        c = after;
    }

    Ok((left, c))
}

fn or_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let (mut left, mut c) = and_expr(c)?;

    while let Some(next) = c.eat_keyword(Keyword::Or) {
        let (right, after) = and_expr(next)?;
        left = join(left, right, |left, right| {
            Expression::Boolean(BooleanExpr {
                left,
                op: Operator::Or,
                right,
            })
        });
        c = after;
    }

    Ok((left, c))
}

fn and_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let (mut left, mut c) = not_expr(c)?;

    while let Some(next) = c.eat_keyword(Keyword::And) {
        let (right, after) = not_expr(next)?;
        left = join(left, right, |left, right| {
            Expression::Boolean(BooleanExpr {
                left,
                op: Operator::And,
                right,
            })
        });
        c = after;
    }

    Ok((left, c))
}

/// Prefix NOT, binding tighter than AND
fn not_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let token = c.peek();
    let Some(next) = c.eat_keyword(Keyword::Not) else {
        return comparison(c);
    };

    let (operand, after) = not_expr(next.descend()?)?;
    let span = token.span.merge(operand.span);
    let node = Expression::Not(NotExpr {
        operand: Box::new(operand),
    });
    Ok((Spanned::new(node, span), after.ascend()))
}

fn comparison(c: Cursor<'_>) -> PResult<'_, Node> {
    let (left, c) = concat_expr(c)?;

    if let Some((op, next)) = simple_operator(c) {
        let (not_equal_marker, next) = match (op, next.eat_symbol(Symbol::NotEqual)) {
            (Operator::LessThanOrEqual, Some(after)) => (true, after),
            _ => (false, next),
        };
        let (right, after) = concat_expr(next)?;
        let node = join(left, right, |left, right| {
            Expression::Comparison(ComparisonExpr {
                left,
                op,
                copula: None,
                not_equal_marker,
                right,
            })
        });
        return Ok((node, after));
    }

    if let Some(copula) = c.peek().keyword().filter(Keyword::is_copula) {
        let (op, next) = comparison_phrase(c.advance())?;
        let (right, after) = concat_expr(next)?;
        let node = join(left, right, |left, right| {
            Expression::Comparison(ComparisonExpr {
                left,
                op,
                copula: Some(copula),
                not_equal_marker: false,
                right,
            })
        });
        return Ok((node, after));
    }

    Ok((left, c))
}

fn simple_operator(c: Cursor<'_>) -> Option<(Operator, Cursor<'_>)> {
    let op = match c.peek().kind {
        TokenKind::Symbol(Symbol::Equal) | TokenKind::Keyword(Keyword::Eq) => Operator::Equals,
        TokenKind::Symbol(Symbol::Less) | TokenKind::Keyword(Keyword::Lt) => Operator::LessThan,
        TokenKind::Symbol(Symbol::Greater) | TokenKind::Keyword(Keyword::Gt) => Operator::GreaterThan,
        TokenKind::Symbol(Symbol::LessEqual) | TokenKind::Keyword(Keyword::Le) => Operator::LessThanOrEqual,
        TokenKind::Symbol(Symbol::GreaterEqual) | TokenKind::Keyword(Keyword::Ge) => Operator::GreaterThanOrEqual,
        TokenKind::Symbol(Symbol::NotEqual) | TokenKind::Keyword(Keyword::Ne) => Operator::NotEquals,
        _ => return None,
    };
    Some((op, c.advance()))
}

/// `LESS THAN [OR EQUAL [TO]]`, `GREATER THAN [OR EQUAL [TO]]` or `IN`
fn comparison_phrase(c: Cursor<'_>) -> PResult<'_, Operator> {
    let less = match c.peek().keyword() {
        Some(Keyword::Less) => true,
        Some(Keyword::Greater) => false,
        Some(Keyword::In) => return Ok((Operator::In, c.advance())),
        _ => return Err(c.expected(["LESS THAN", "GREATER THAN", "IN"])),
    };

    let c = c.advance();
    let Some(c) = c.eat_keyword(Keyword::Than) else {
        return Err(c.expected(["THAN"]));
    };

    let or_equal = c.at_keyword(Keyword::Or) && c.peek_nth(1).is_keyword(Keyword::Equal);
    if !or_equal {
        let op = if less { Operator::LessThan } else { Operator::GreaterThan };
        return Ok((op, c));
    }

    let c = c.advance_by(2);
    let (_, c) = optional_keyword(c, Keyword::To);
    let op = if less {
        Operator::LessThanOrEqual
    } else {
        Operator::GreaterThanOrEqual
    };
    Ok((op, c))
}

/// `||` string glue
fn concat_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let (mut left, mut c) = additive_expr(c)?;

    while let Some(next) = c.eat_symbol(Symbol::Concat) {
        let (right, after) = additive_expr(next)?;
        left = join(left, right, |left, right| Expression::Concat(ConcatExpr { left, right }));
        c = after;
    }

    Ok((left, c))
}

fn additive_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let (mut left, mut c) = multiplicative_expr(c)?;

    loop {
        let op = match c.peek().kind {
            TokenKind::Symbol(Symbol::Plus) => Operator::Add,
            TokenKind::Symbol(Symbol::Minus) => Operator::Subtract,
            _ => break,
        };
        let (right, after) = multiplicative_expr(c.advance())?;
        left = join(left, right, |left, right| {
            Expression::Arithmetic(ArithmeticExpr { left, op, right })
        });
        c = after;
    }

    Ok((left, c))
}

fn multiplicative_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let (mut left, mut c) = temporal_expr(c)?;

    loop {
        let op = match c.peek().kind {
            TokenKind::Symbol(Symbol::Star) => Operator::Multiply,
            TokenKind::Symbol(Symbol::Slash) => Operator::Divide,
            _ => break,
        };
        let (right, after) = temporal_expr(c.advance())?;
        left = join(left, right, |left, right| {
            Expression::Arithmetic(ArithmeticExpr { left, op, right })
        });
        c = after;
    }

    Ok((left, c))
}

/// BEFORE / AFTER / FROM / BETWEEN chaining with an optional trailing AGO
fn temporal_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let (mut left, mut c) = duration_expr(c)?;

    loop {
        let op = match c.peek().keyword() {
            Some(Keyword::Before) => TemporalOp::Before,
            Some(Keyword::After) => TemporalOp::After,
            Some(Keyword::From) => TemporalOp::From,
            Some(Keyword::Between) => {
                (left, c) = between(left, c.advance())?;
                continue;
            }
            _ => break,
        };
        let (right, after) = duration_expr(c.advance())?;
        left = join(left, right, |left, right| Expression::Temporal(TemporalExpr { left, op, right }));
        c = after;
    }

    if c.at_keyword(Keyword::Ago) {
        let (ago, after) = c.bump();
        let span = left.span.merge(ago.span);
        left = Spanned::new(
            Expression::Ago(AgoExpr {
                operand: Box::new(left),
            }),
            span,
        );
        c = after;
    }

    Ok((left, c))
}

/// The two bounds after `BETWEEN`; the `AND` here never reaches the boolean level
fn between(subject: Node, c: Cursor<'_>) -> PResult<'_, Node> {
    let (start, c) = duration_expr(c)?;
    let Some(c) = c.eat_keyword(Keyword::And) else {
        return Err(c.expected(["AND"]));
    };
    let (end, c) = duration_expr(c)?;

    let span = subject.span.merge(end.span);
    let node = Expression::Between(BetweenExpr {
        subject: Box::new(subject),
        start: Box::new(start),
        end: Box::new(end),
    });
    Ok((Spanned::new(node, span), c))
}

/// Optional trailing unit keyword: `30 days`
fn duration_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let (magnitude, c) = function_expr(c)?;

    let token = c.peek();
    let Some(keyword) = token.keyword().filter(|keyword| keyword.duration_unit().is_some()) else {
        return Ok((magnitude, c));
    };

    let unit = classify_duration_unit(token)?;
    let span = magnitude.span.merge(token.span);
    let node = Expression::Duration(DurationExpr {
        magnitude: Box::new(magnitude),
        unit,
        keyword,
    });
    Ok((Spanned::new(node, span), c.advance()))
}

/// A transform applied to the next factor; anything else falls through
fn function_expr(c: Cursor<'_>) -> PResult<'_, Node> {
    let start = c.peek().span;
    let (the, after_the) = optional_keyword(c, Keyword::The);

    let Some(keyword) = after_the.peek().keyword().filter(Keyword::is_transform) else {
        return factor(after_the);
    };

    let next = after_the.advance();
    let (_, next) = optional_keyword(next, Keyword::Of);
    let (argument, after) = factor(next.descend()?)?;

    let span = start.merge(argument.span);
    let node = Expression::Function(FunctionExpr {
        keyword,
        the,
        argument: Box::new(argument),
    });
    Ok((Spanned::new(node, span), after.ascend()))
}

fn factor(c: Cursor<'_>) -> PResult<'_, Node> {
    let token = c.peek();
    match token.kind {
        TokenKind::Identifier => Ok(compound_name(c)),
        TokenKind::Integer => number_or_date(c),
        TokenKind::StringLiteral => Ok((leaf(token, Expression::Literal(Literal::String(token.lexeme.clone()))), c.advance())),
        TokenKind::TermLiteral => Ok((leaf(token, Expression::Literal(Literal::Term(token.lexeme.clone()))), c.advance())),
        TokenKind::Keyword(Keyword::True) => Ok((leaf(token, Expression::Literal(Literal::Boolean(true))), c.advance())),
        TokenKind::Keyword(Keyword::False) => Ok((leaf(token, Expression::Literal(Literal::Boolean(false))), c.advance())),
        TokenKind::Keyword(Keyword::Null) => Ok((leaf(token, Expression::Literal(Literal::Null)), c.advance())),
        TokenKind::Keyword(Keyword::Today) => Ok((leaf(token, Expression::Literal(Literal::Today)), c.advance())),
        TokenKind::Symbol(Symbol::LeftParen) => parenthesized(c),
        _ if token.is_eof() => Err(c.expected(FACTOR_START)),
        _ => Err(LqlError::expected_expression(FACTOR_START, token.describe(), token.span)),
    }
}

/// An identifier plus any following identifiers or transform words
fn compound_name(c: Cursor<'_>) -> (Node, Cursor<'_>) {
    let (first, mut c) = c.bump();
    let mut name = first.lexeme.clone();
    let mut span = first.span;

    loop {
        let token = c.peek();
        let continues = match token.kind {
            TokenKind::Identifier => true,
            TokenKind::Keyword(keyword) => keyword.is_transform(),
            _ => false,
        };
        if !continues {
            break;
        }
        name.push(' ');
        name.push_str(&token.lexeme);
        span = span.merge(token.span);
        c = c.advance();
    }

    (Spanned::new(Expression::Identifier(name), span), c)
}

fn parenthesized(c: Cursor<'_>) -> PResult<'_, Node> {
    let (open, c) = c.bump();
    let (inner, c) = expr(c.descend()?)?;
    let (close, c) = c.expect_symbol(Symbol::RightParen)?;
    Ok((Spanned::new(inner.inner, open.span.merge(close.span)), c.ascend()))
}

fn number_or_date(c: Cursor<'_>) -> PResult<'_, Node> {
    if starts_date(c) {
        return date_literal(c);
    }

    let (whole, c) = c.bump();
    if c.at_symbol(Symbol::Dot) && c.glued() && c.peek_nth(1).kind == TokenKind::Integer && c.glued_nth(1) {
        let fraction = c.peek_nth(1);
        let literal = Literal::Decimal(DecimalLiteral::new(&whole.lexeme, &fraction.lexeme));
        let span = whole.span.merge(fraction.span);
        return Ok((Spanned::new(Expression::Literal(literal), span), c.advance_by(2)));
    }

    Ok((leaf(whole, Expression::Literal(Literal::Integer(whole.lexeme.clone()))), c))
}

/// `INT-INT-INT` with no whitespace anywhere
fn starts_date(c: Cursor<'_>) -> bool {
    let shape = [
        TokenKind::Integer,
        TokenKind::Symbol(Symbol::Minus),
        TokenKind::Integer,
        TokenKind::Symbol(Symbol::Minus),
        TokenKind::Integer,
    ];
    shape
        .iter()
        .enumerate()
        .all(|(i, kind)| c.peek_nth(i).kind == *kind && (i == 0 || c.glued_nth(i)))
}

fn date_literal(c: Cursor<'_>) -> PResult<'_, Node> {
    let year = c.peek();
    let month = c.peek_nth(2);
    let day = c.peek_nth(4);
    let mut c = c.advance_by(5);
    let mut date = DateLiteral::new(&year.lexeme, &month.lexeme, &day.lexeme);
    let mut end = day.span;

    if c.at_kind(TokenKind::TimeMarker) && c.glued() {
        let ((time, time_end), after) = clock_time(c.advance())?;
        date = date.with_time(time);
        end = time_end;
        c = after;
    }

    Ok((Spanned::new(Expression::Literal(Literal::Date(date)), year.span.merge(end)), c))
}

/// `hh:mm:ss[.fff][Z | +hh:mm | -hh:mm]` after the `T` marker
fn clock_time(c: Cursor<'_>) -> PResult<'_, (TimeLiteral, Span)> {
    let (hour, c) = glued(c, TokenKind::Integer, "hour")?;
    let (_, c) = glued(c, TokenKind::Symbol(Symbol::Colon), "':'")?;
    let (minute, c) = glued(c, TokenKind::Integer, "minutes")?;
    let (_, c) = glued(c, TokenKind::Symbol(Symbol::Colon), "':'")?;
    let (second, mut c) = glued(c, TokenKind::Integer, "seconds")?;

    let mut time = TimeLiteral::new(&hour.lexeme, &minute.lexeme, &second.lexeme);
    let mut end = second.span;

    if c.at_symbol(Symbol::Dot) && c.glued() {
        let (fraction, after) = glued(c.advance(), TokenKind::Integer, "fractional seconds")?;
        time = time.with_fraction(&fraction.lexeme);
        end = fraction.span;
        c = after;
    }

    if c.at_kind(TokenKind::Zulu) && c.glued() {
        let (zulu, after) = c.bump();
        time = time.with_offset(UtcOffset::Utc);
        end = zulu.span;
        c = after;
    } else if (c.at_symbol(Symbol::Plus) || c.at_symbol(Symbol::Minus)) && c.glued() && c.glued_nth(1) {
        let negative = c.at_symbol(Symbol::Minus);
        let (hours, after) = glued(c.advance(), TokenKind::Integer, "offset hours")?;
        let (_, after) = glued(after, TokenKind::Symbol(Symbol::Colon), "':'")?;
        let (minutes, after) = glued(after, TokenKind::Integer, "offset minutes")?;
        time = time.with_offset(UtcOffset::Fixed {
            negative,
            hours: hours.lexeme.clone(),
            minutes: minutes.lexeme.clone(),
        });
        end = minutes.span;
        c = after;
    }

    Ok(((time, end), c))
}

/// Next token must be `kind` and touch the previous one
fn glued<'t>(c: Cursor<'t>, kind: TokenKind, what: &str) -> PResult<'t, &'t Token> {
    if c.at_kind(kind) && c.glued() {
        return Ok(c.bump());
    }
    let token = c.peek();
    Err(LqlError::syntax_with(
        LQL0013,
        format!("malformed date/time literal: expected {what}, found {}", token.describe()),
        token.describe(),
        token.span,
    ))
}
