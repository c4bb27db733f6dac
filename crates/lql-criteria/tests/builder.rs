//! Tests for building criteria from parsed statements
//!
//! Covers:
//! - Existence tests, comparisons, temporal qualifiers and transforms
//! - Operand resolution and constant folding
//! - The `<=` `<>` compatibility rule
//! - Semantic errors for unsupported shapes and invalid values

use lql_ast::{DurationUnit, Operator};
use lql_criteria::{
    CalendarDate, Criteria, Duration, Operand, TemporalBound, TemporalQualifier, Transform, build,
};
use lql_diagnostics::{
    ErrorCode, LQL0100, LQL0101, LQL0102, LQL0103, LQL0104, LQL0105, LQL0106, LQL0108, LqlError,
};
use lql_parser::Parser;
use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;

fn criteria(source: &str) -> Criteria {
    let query = Parser::new()
        .parse(source)
        .unwrap_or_else(|e| panic!("Failed to parse '{}': {:?}", source, e));
    build(&query).unwrap_or_else(|e| panic!("Failed to build '{}': {:?}", source, e))
}

fn build_error(source: &str) -> LqlError {
    let query = Parser::new()
        .parse(source)
        .unwrap_or_else(|e| panic!("Failed to parse '{}': {:?}", source, e));
    match build(&query) {
        Err(err) => err,
        Ok(criteria) => panic!("Expected semantic error for '{}', got: {}", source, criteria),
    }
}

fn single_operand(criteria: &Criteria) -> &Operand {
    assert_eq!(criteria.comparisons.len(), 1, "expected one comparison in {criteria}");
    &criteria.comparisons[0].operand
}

// === Shapes ===

#[test]
fn test_bare_key_is_existence_test() {
    let built = criteria("\"CD4 COUNT\";");
    assert_eq!(built, Criteria::new("CD4 COUNT"));
    assert!(built.is_existence_test());
}

#[rstest]
#[case("\"CD4 COUNT\" < 200;")]
#[case("CD4 COUNT < 200;")]
#[case("{CD4 COUNT} lt 200;")]
#[case("CD4 COUNT is less than 200;")]
fn test_comparison_spellings(#[case] source: &str) {
    assert_eq!(
        criteria(source),
        Criteria::new("CD4 COUNT").compare(Operator::LessThan, 200_i64)
    );
}

#[test]
fn test_last_before_date() {
    let built = criteria("last CD4 COUNT before 2020-01-01;");
    let expected = Criteria::new("CD4 COUNT")
        .with_temporal(TemporalQualifier::before(CalendarDate::new(2020, 0, 1)))
        .with_transform(Transform::new(Operator::Last));
    assert_eq!(built, expected);
}

#[test]
fn test_comparison_then_temporal() {
    let built = criteria("\"WEIGHT\" > 80 after 2019-06-30;");
    assert_eq!(
        built,
        Criteria::new("WEIGHT")
            .compare(Operator::GreaterThan, 80_i64)
            .with_temporal(TemporalQualifier::after(CalendarDate::new(2019, 5, 30)))
    );
}

#[test]
fn test_relative_window_with_ago() {
    let built = criteria("\"VISIT\" after 3 months ago;");
    assert_eq!(
        built.temporal,
        vec![TemporalQualifier::after(Duration::new(3, DurationUnit::Month))]
    );
}

#[test]
fn test_between_dates() {
    let built = criteria("x between 2020-01-01 and 2020-02-01;");
    assert_eq!(
        built,
        Criteria::new("x")
            .with_temporal(TemporalQualifier::after(CalendarDate::new(2020, 0, 1)))
            .with_temporal(TemporalQualifier::before(CalendarDate::new(2020, 1, 1)))
    );
}

#[test]
fn test_between_after_comparison() {
    let built = criteria("last \"WEIGHT\" > 80 between 2019-01-01 and today;");
    assert_eq!(
        built,
        Criteria::new("WEIGHT")
            .compare(Operator::GreaterThan, 80_i64)
            .with_temporal(TemporalQualifier::after(CalendarDate::new(2019, 0, 1)))
            .with_temporal(TemporalQualifier::before(TemporalBound::Today))
            .with_transform(Transform::new(Operator::Last))
    );
}

#[test]
fn test_between_relative_bounds() {
    let built = criteria("\"VISIT\" between 6 months and 3 months ago;");
    assert_eq!(
        built.temporal,
        vec![
            TemporalQualifier::after(Duration::new(6, DurationUnit::Month)),
            TemporalQualifier::before(Duration::new(3, DurationUnit::Month)),
        ]
    );
}

#[rstest]
#[case("x before today;", TemporalQualifier::before(TemporalBound::Today))]
#[case("x after today;", TemporalQualifier::after(TemporalBound::Today))]
#[case("x AFTER TODAY;", TemporalQualifier::after(TemporalBound::Today))]
fn test_today_bound(#[case] source: &str, #[case] expected: TemporalQualifier) {
    assert_eq!(criteria(source).temporal, vec![expected]);
}

#[test]
fn test_within_suffix() {
    let built = criteria("last 2 of \"CD4 COUNT\" < 200 within the past 6 months;");
    assert_eq!(
        built,
        Criteria::new("CD4 COUNT")
            .compare(Operator::LessThan, 200_i64)
            .with_temporal(TemporalQualifier::within_past(Duration::new(6, DurationUnit::Month)))
            .with_transform(Transform::new(Operator::Last).with_count(2))
    );
}

#[test]
fn test_integer_key() {
    assert_eq!(criteria("5089 = 1;").key, "5089");
}

// === Transforms ===

#[rstest]
#[case("last x;", Operator::Last)]
#[case("latest x;", Operator::Last)]
#[case("lastest x;", Operator::Last)]
#[case("first x;", Operator::First)]
#[case("earliest x;", Operator::First)]
#[case("exist x;", Operator::Exists)]
#[case("exists x;", Operator::Exists)]
#[case("count x;", Operator::Count)]
#[case("avg x;", Operator::Average)]
#[case("average x;", Operator::Average)]
#[case("sum x;", Operator::Sum)]
#[case("median x;", Operator::Median)]
#[case("minimum x;", Operator::Min)]
#[case("max x;", Operator::Max)]
fn test_transform_resolution(#[case] source: &str, #[case] expected: Operator) {
    assert_eq!(criteria(source).transform, Some(Transform::new(expected)));
}

#[rstest]
#[case("last 0 of x;")]
#[case("first 99999999999 of x;")]
fn test_invalid_transform_count(#[case] source: &str) {
    assert_eq!(build_error(source).code(), LQL0105);
}

// === Operators ===

#[rstest]
#[case("x = 1;", Operator::Equals)]
#[case("x <> 1;", Operator::NotEquals)]
#[case("x != 1;", Operator::NotEquals)]
#[case("x >= 1;", Operator::GreaterThanOrEqual)]
#[case("x <= 1;", Operator::LessThanOrEqual)]
#[case("x were greater than or equal to 1;", Operator::GreaterThanOrEqual)]
fn test_operator_resolution(#[case] source: &str, #[case] expected: Operator) {
    assert_eq!(criteria(source).comparisons[0].operator, expected);
}

#[test]
fn test_less_equal_with_not_equal_marker_is_not_exists() {
    let built = criteria("x <= <> 5;");
    assert_eq!(built.comparisons[0].operator, Operator::NotExists);
    assert_eq!(built.comparisons[0].operand, Operand::Integer(5));
}

// === Operands ===

#[rstest]
#[case("x = 3.5;", Operand::Decimal(Decimal::new(35, 1)))]
#[case("x = \"POSITIVE\";", Operand::Text("POSITIVE".to_string()))]
#[case("x = POSITIVE;", Operand::Text("POSITIVE".to_string()))]
#[case("x = '24467-3';", Operand::Term("24467-3".to_string()))]
#[case("x = false;", Operand::Boolean(false))]
#[case("x = null;", Operand::Null)]
#[case("x = 2 * (3 + 4);", Operand::Integer(14))]
#[case("x = 1.5 + 1;", Operand::Decimal(Decimal::new(25, 1)))]
#[case("x = \"CD\" || \"4\";", Operand::Text("CD4".to_string()))]
#[case("x = 2 weeks + 1 week;", Operand::Duration(Duration::new(3, DurationUnit::Week)))]
#[case("x = 2020-03-15;", Operand::Date(CalendarDate::new(2020, 2, 15)))]
fn test_operand_resolution(#[case] source: &str, #[case] expected: Operand) {
    assert_eq!(single_operand(&criteria(source)), &expected);
}

#[test]
fn test_in_list() {
    let built = criteria("x is in ('A', 'B');");
    assert_eq!(
        single_operand(&built),
        &Operand::List(vec![Operand::Term("A".into()), Operand::Term("B".into())])
    );

    let built = criteria("x is in 'A';");
    assert_eq!(single_operand(&built), &Operand::List(vec![Operand::Term("A".into())]));
}

#[test]
fn test_date_month_is_zero_based() {
    let built = criteria("x before 2020-03-15;");
    let [TemporalQualifier {
        bound: TemporalBound::Date(date),
        ..
    }] = built.temporal.as_slice()
    else {
        panic!("Expected a date bound, got: {:?}", built.temporal);
    };
    assert_eq!(date.month, 2);
    assert_eq!(date.day, 15);
}

// === Errors ===

#[rstest]
#[case("'24467-3' = 1;", LQL0100)]
#[case("3.5 = 1;", LQL0100)]
#[case("a where b = 1;", LQL0101)]
#[case("a or b;", LQL0101)]
#[case("a, b;", LQL0101)]
#[case("a merge b;", LQL0101)]
#[case("the last x;", LQL0101)]
#[case("x from 2020-01-01;", LQL0101)]
#[case("x = a or b;", LQL0101)]
#[case("x = (a = 1);", LQL0102)]
#[case("x = \"a\" || 1;", LQL0102)]
#[case("x before \"yesterday\";", LQL0102)]
#[case("x before 2020-02-30;", LQL0103)]
#[case("x = 2020-13-01;", LQL0103)]
#[case("x after 3 days;", LQL0104)]
#[case("x within 5;", LQL0104)]
#[case("x = 1 day + 1 week;", LQL0104)]
#[case("x before 2020-01-01 within 3 days;", LQL0106)]
#[case("x between 2020-01-01 and 2020-02-01 within 3 days;", LQL0106)]
#[case("x between 2020-01-01 and 3 days;", LQL0104)]
#[case("x between 2020-01-01 and 2020-02-30;", LQL0103)]
#[case("x between 2020-01-01 and \"later\";", LQL0102)]
#[case("x between 2020-01-01 and today ago;", LQL0104)]
#[case("x = today;", LQL0102)]
#[case("x before today ago;", LQL0102)]
#[case("today;", LQL0100)]
#[case("x = 1 / 0;", LQL0108)]
fn test_semantic_errors(#[case] source: &str, #[case] code: ErrorCode) {
    let err = build_error(source);
    assert!(err.is_semantic(), "expected semantic error, got {err:?}");
    assert_eq!(err.code(), code);
}

#[test]
fn test_semantic_errors_carry_spans() {
    let source = "x before 2020-02-30;";
    let err = build_error(source);
    let span = err.span().expect("span");
    assert_eq!(&source[span.as_range()], "2020-02-30");
}

#[test]
fn test_build_is_idempotent() {
    let query = Parser::new().parse("last 3 of \"HGB\" >= 12.5 within past 1 year;").unwrap();
    assert_eq!(build(&query).unwrap(), build(&query).unwrap());
}

#[test]
fn test_display_round_trips_through_parser() {
    for source in [
        "last CD4 COUNT before 2020-01-01;",
        "\"HGB\" >= 12.5 within past 1 year;",
        "first 2 of x is in ('A', 'B');",
        "\"VISIT\" after 3 months ago;",
        "x between 2020-01-01 and 2020-02-01;",
        "\"VISIT\" between 6 months and 3 months ago;",
        "x > 5 before today;",
        "x = 1 - 2;",
        "x = 1.5 * 2;",
        "x = 4.5 - 7.5;",
        "x = 1 day - 2 days;",
    ] {
        let built = criteria(source);
        assert_eq!(criteria(&built.to_string()), built, "round trip of {source}");
    }
}
