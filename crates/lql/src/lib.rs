//! Logic Query Language (LQL) compiler for Rust
//!
//! This crate ties the compiler stages together:
//! - Lexing and parsing LQL statements into a syntax tree
//! - Building the criteria a clinical decision-support engine evaluates
//! - Diagnostics with codes, spans and line/column locations
//!
//! # Example
//!
//! ```
//! use lql::{Operator, compile};
//!
//! let criteria = compile("last \"CD4 COUNT\" < 200 within the past 30 days;")?;
//! assert_eq!(criteria.key, "CD4 COUNT");
//! assert_eq!(criteria.comparisons[0].operator, Operator::LessThan);
//! # Ok::<(), lql::LqlError>(())
//! ```

mod options;

// Re-export all public APIs from internal crates
pub use lql_ast as ast;
pub use lql_criteria as criteria;
pub use lql_diagnostics as diagnostics;
pub use lql_parser as parser;

// Convenience re-exports
pub use lql_ast::{DurationUnit, Operator, Query};
pub use lql_criteria::{CalendarDate, Comparison, Criteria, Duration, Operand, TemporalBound, TemporalQualifier, Transform};
pub use lql_diagnostics::{LqlError, Result};
pub use lql_parser::{ParseMode, tokenize};
pub use options::CompileOptions;

use lql_parser::Parser;

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;

/// Compile one `;`-terminated statement with the default options
pub fn compile(source: &str) -> Result<Criteria> {
    compile_with_options(source, &CompileOptions::default())
}

/// Compile one statement
///
/// Errors come back with their line/column location resolved against
/// `source`.
pub fn compile_with_options(source: &str, options: &CompileOptions) -> Result<Criteria> {
    let parser = Parser::with_config(options.parser_config());
    let query = parser.parse(source).map_err(|e| e.locate(source))?;
    lql_criteria::build(&query).map_err(|e| e.locate(source))
}

/// Compile every statement in `source`
///
/// The outer error is a lexical failure, which invalidates the whole batch.
/// Otherwise there is one entry per statement. In [`ParseMode::Fast`] the
/// list ends at the first failing statement, whether it failed to parse or
/// to build; [`ParseMode::Analysis`] keeps going.
pub fn compile_batch(source: &str, options: &CompileOptions) -> Result<Vec<Result<Criteria>>> {
    let parser = Parser::with_config(options.parser_config());
    let parsed = parser.parse_batch(source).map_err(|e| e.locate(source))?;

    let mut compiled = Vec::with_capacity(parsed.statements.len());
    for statement in parsed.statements {
        let result = statement
            .and_then(|query| lql_criteria::build(&query))
            .map_err(|e| e.locate(source));
        let failed = result.is_err();
        compiled.push(result);
        if failed && options.mode == ParseMode::Fast {
            break;
        }
    }

    log::debug!("compiled batch of {} statements", compiled.len());
    Ok(compiled)
}
