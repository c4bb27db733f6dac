//! End-to-end tests for the compile pipeline
//!
//! Covers:
//! - The reference scenarios from source text to criteria
//! - Batch compilation in fast and analysis modes
//! - Located diagnostics
//! - Idempotence and never-panics properties

use lql::{
    CalendarDate, CompileOptions, Criteria, LqlError, Operator, ParseMode, TemporalBound, TemporalQualifier,
    Transform, compile, compile_batch, compile_with_options,
};
use lql_diagnostics::{LQL0012, LQL0015, LQL0103};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

// === Scenarios ===

#[test]
fn test_scenario_existence() {
    let criteria = compile("\"CD4 COUNT\";").unwrap();
    assert_eq!(criteria, Criteria::new("CD4 COUNT"));
    assert!(criteria.is_existence_test());
}

#[test]
fn test_scenario_comparison() {
    let criteria = compile("\"CD4 COUNT\" < 200;").unwrap();
    assert_eq!(criteria, Criteria::new("CD4 COUNT").compare(Operator::LessThan, 200_i64));
}

#[test]
fn test_scenario_transform_and_date() {
    let criteria = compile("last CD4 COUNT before 2020-01-01;").unwrap();
    assert_eq!(
        criteria,
        Criteria::new("CD4 COUNT")
            .with_temporal(TemporalQualifier::before(CalendarDate::new(2020, 0, 1)))
            .with_transform(Transform::new(Operator::Last))
    );
}

#[test]
fn test_scenario_missing_operand() {
    let err = compile("CD4 COUNT <;").unwrap_err();
    assert!(err.is_syntax(), "expected syntax error, got {err:?}");
    assert_eq!(err.code(), LQL0012);
}

#[test]
fn test_date_month_is_zero_based() {
    let criteria = compile("x after 2020-03-15;").unwrap();
    let [TemporalQualifier {
        bound: TemporalBound::Date(date),
        ..
    }] = criteria.temporal.as_slice()
    else {
        panic!("Expected a date bound, got: {:?}", criteria.temporal);
    };
    assert_eq!((date.year, date.month, date.day), (2020, 2, 15));
}

#[test]
fn test_between_compiles_to_after_then_before() {
    let criteria = compile("count of \"VISIT\" between 2021-01-01 and today;").unwrap();
    assert_eq!(
        criteria,
        Criteria::new("VISIT")
            .with_temporal(TemporalQualifier::after(CalendarDate::new(2021, 0, 1)))
            .with_temporal(TemporalQualifier::before(TemporalBound::Today))
            .with_transform(Transform::new(Operator::Count))
    );
    assert_eq!(criteria.to_string(), "COUNT OF \"VISIT\" BETWEEN 2021-01-01 AND TODAY;");
}

#[test]
fn test_not_exists_compatibility() {
    let criteria = compile("\"HIV VIRAL LOAD\" <= <> 50;").unwrap();
    assert_eq!(criteria.comparisons[0].operator, Operator::NotExists);
}

#[rstest]
#[case("CD4 COUNT <;", 1, 12)]
#[case("\"A\" before\n  2020-02-30;", 2, 3)]
#[case("x = @;", 1, 5)]
fn test_errors_are_located(#[case] source: &str, #[case] line: usize, #[case] column: usize) {
    let err = compile(source).unwrap_err();
    let location = err.location().unwrap_or_else(|| panic!("no location on {err:?}"));
    assert_eq!((location.line, location.column), (line, column));
}

#[test]
fn test_semantic_error_surfaces_as_failure() {
    let err = compile("x before 2020-02-30;").unwrap_err();
    assert!(err.is_semantic());
    assert_eq!(err.code(), LQL0103);
}

#[test]
fn test_max_depth_option() {
    let source = "x = ((((1))));";
    assert!(compile(source).is_ok());

    let shallow = CompileOptions::new().with_max_depth(2);
    let err = compile_with_options(source, &shallow).unwrap_err();
    assert_eq!(err.code(), LQL0015);
}

// === Batches ===

const BATCH: &str = "\
\"CD4 COUNT\";
x before 2020-13-01;
\"WEIGHT\" > ;
count of \"VISIT\" within past 30 days;
";

#[test]
fn test_batch_fast_mode_stops_at_first_failure() {
    let results = compile_batch(BATCH, &CompileOptions::new()).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].as_ref().unwrap_err().is_semantic());
}

#[test]
fn test_batch_analysis_mode_compiles_every_statement() {
    let options = CompileOptions::new().with_mode(ParseMode::Analysis);
    let results = compile_batch(BATCH, &options).unwrap();
    let outcome: Vec<bool> = results.iter().map(Result::is_ok).collect();
    assert_eq!(outcome, vec![true, false, false, true]);

    let syntax = results[2].as_ref().unwrap_err();
    assert!(syntax.is_syntax());
    assert_eq!(syntax.location().map(|l| l.line), Some(3));
}

#[test]
fn test_batch_lex_error_is_outer_error() {
    let err = compile_batch("a;\nb # 1;", &CompileOptions::new()).unwrap_err();
    assert!(matches!(err, LqlError::Lex { .. }));
    assert_eq!(err.location().map(|l| (l.line, l.column)), Some((2, 3)));
}

// === Properties ===

proptest! {
    #[test]
    fn test_compile_is_idempotent(
        key in "[A-Z][A-Z0-9]{0,6}( [A-Z][A-Z0-9]{0,6}){0,2}",
        value in 0_i64..100_000,
        year in 1900_i32..2100,
        month in 1_u32..=12,
        day in 1_u32..=28,
    ) {
        let source = format!("last \"{key}\" >= {value} before {year:04}-{month:02}-{day:02};");
        let first = compile(&source);
        let second = compile(&source);
        prop_assert_eq!(&first, &second);

        let criteria = first.unwrap();
        prop_assert_eq!(criteria.key, key);
        prop_assert_eq!(criteria.transform, Some(Transform::new(Operator::Last)));
        prop_assert_eq!(
            criteria.temporal,
            vec![TemporalQualifier::before(CalendarDate::new(year, month - 1, day))]
        );
    }

    #[test]
    fn test_compile_never_panics(source in "\\PC{0,80}") {
        let _ = compile(&source);
        let _ = compile_batch(&source, &CompileOptions::new().with_mode(ParseMode::Analysis));
    }
}
