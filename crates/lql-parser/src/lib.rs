//! LQL parser using Winnow
//!
//! The lexer is built from winnow combinators; the statement grammar is a
//! hand-written recursive descent over the resulting tokens, one function
//! per precedence level.

mod cursor;
mod grammar;
mod lexer;
mod token;

pub use lexer::tokenize;
pub use token::{Symbol, Token, TokenKind, classify_duration_unit};

use cursor::Cursor;
use lql_ast::{Query, Spanned};
use lql_diagnostics::{LqlError, Result};
use serde::{Deserialize, Serialize};

/// Nesting allowed for parentheses, NOT and function application
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Parser mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Fast mode - stop at the first error
    #[default]
    Fast,
    /// Analysis mode - skip to the next `;` after an error and keep going
    Analysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub mode: ParseMode,
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            mode: ParseMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Outcome of parsing a batch of statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// One entry per statement, in source order
    pub statements: Vec<Result<Spanned<Query>>>,
}

impl ParseResult {
    /// Check if every statement parsed
    pub fn is_success(&self) -> bool {
        self.statements.iter().all(Result::is_ok)
    }

    pub fn errors(&self) -> impl Iterator<Item = &LqlError> {
        self.statements.iter().filter_map(|statement| statement.as_ref().err())
    }

    /// Convert to Result, folding several errors into [`LqlError::Multiple`]
    pub fn into_result(self) -> Result<Vec<Spanned<Query>>> {
        let mut queries = Vec::with_capacity(self.statements.len());
        let mut errors = Vec::new();
        for statement in self.statements {
            match statement {
                Ok(query) => queries.push(query),
                Err(err) => errors.push(err),
            }
        }

        match errors.len() {
            0 => Ok(queries),
            1 => Err(errors.remove(0)),
            _ => Err(LqlError::Multiple(errors)),
        }
    }
}

/// Statement parser
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse exactly one statement; anything after its `;` is an error
    pub fn parse(&self, source: &str) -> Result<Spanned<Query>> {
        let tokens = tokenize(source)?;
        self.parse_tokens(&tokens)
    }

    pub fn parse_tokens(&self, tokens: &[Token]) -> Result<Spanned<Query>> {
        let cursor = Cursor::new(tokens, self.config.max_depth);
        let (query, rest) = grammar::query(cursor)?;
        if !rest.is_at_end() {
            return Err(rest.trailing_input());
        }
        log::debug!("parsed statement spanning {}", query.span);
        Ok(query)
    }

    /// Parse every `;`-terminated statement in `source`
    ///
    /// A lexical error aborts the whole batch since token boundaries after
    /// it cannot be trusted.
    pub fn parse_batch(&self, source: &str) -> Result<ParseResult> {
        let tokens = tokenize(source)?;
        Ok(self.parse_statements(&tokens))
    }

    pub fn parse_statements(&self, tokens: &[Token]) -> ParseResult {
        let mut cursor = Cursor::new(tokens, self.config.max_depth);
        let mut statements = Vec::new();

        while !cursor.is_at_end() {
            match grammar::query(cursor) {
                Ok((query, rest)) => {
                    statements.push(Ok(query));
                    cursor = rest;
                }
                Err(err) => {
                    log::debug!("statement {} failed: {err}", statements.len() + 1);
                    statements.push(Err(err));
                    if self.config.mode == ParseMode::Fast {
                        break;
                    }
                    cursor = cursor.skip_statement();
                }
            }
        }

        log::debug!("parsed batch of {} statements", statements.len());
        ParseResult { statements }
    }
}

/// Parse one statement from tokens with the default configuration
pub fn parse(tokens: &[Token]) -> Result<Spanned<Query>> {
    Parser::new().parse_tokens(tokens)
}
