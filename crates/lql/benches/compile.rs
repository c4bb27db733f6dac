//! Compiler benchmarks using divan
//!
//! Benchmarks for each pipeline stage and for whole-batch compilation.

use lql::{CompileOptions, ParseMode, compile, compile_batch, tokenize};
use lql_parser::Parser;

fn main() {
    divan::main();
}

const STATEMENTS: &[&str] = &[
    "\"CD4 COUNT\";",
    "\"CD4 COUNT\" < 200;",
    "last CD4 COUNT before 2020-01-01;",
    "last 3 of \"HGB\" >= 12.5 within the past 6 months;",
    "count of \"VISIT\" after 2019-06-30T08:30:00.250+02:00;",
    "x is in ('A1', 'B2', 'C3', 'D4');",
    "\"DOSE\" = 2 * (3 + 4) - 1;",
];

fn batch(copies: usize) -> String {
    STATEMENTS.iter().cycle().take(STATEMENTS.len() * copies).copied().collect::<Vec<_>>().join("\n")
}

// === Stage Benchmarks ===

mod stages {
    use super::*;

    #[divan::bench(args = STATEMENTS)]
    fn lex(source: &str) {
        let _ = tokenize(divan::black_box(source));
    }

    #[divan::bench(args = STATEMENTS)]
    fn parse(bencher: divan::Bencher, source: &str) {
        let tokens = tokenize(source).expect("benchmark statement lexes");
        let parser = Parser::new();
        bencher.bench_local(|| parser.parse_tokens(divan::black_box(&tokens)));
    }

    #[divan::bench(args = STATEMENTS)]
    fn build(bencher: divan::Bencher, source: &str) {
        let query = Parser::new().parse(source).expect("benchmark statement parses");
        bencher.bench_local(|| lql::criteria::build(divan::black_box(&query)));
    }
}

// === End-to-End Benchmarks ===

mod pipeline {
    use super::*;

    #[divan::bench(args = STATEMENTS)]
    fn single(source: &str) {
        let _ = compile(divan::black_box(source));
    }

    #[divan::bench(args = [1, 10, 100])]
    fn batch_analysis(bencher: divan::Bencher, copies: usize) {
        let source = batch(copies);
        let options = CompileOptions::new().with_mode(ParseMode::Analysis);
        bencher.bench_local(|| compile_batch(divan::black_box(&source), &options));
    }
}
