//! Token and syntax tree inspection commands

use super::Input;
use super::output::{self, OutputFormat};
use crate::CompileOptions;
use anyhow::Result;
use lql_parser::{Parser, Token, TokenKind};
use std::path::PathBuf;

/// Configuration for the tokens and ast commands
pub struct InspectConfig {
    pub input: Input,
    pub format: OutputFormat,
    pub options: CompileOptions,
    pub output_file: Option<PathBuf>,
}

/// Print the token stream
pub fn tokens(config: InspectConfig) -> Result<()> {
    let source = config.input.load()?;
    let tokens = crate::tokenize(&source.text).map_err(|e| {
        eprint!("{}", output::format_diagnostics(&e.locate(&source.text), &source));
        anyhow::anyhow!("Failed to tokenize {}", source.name)
    })?;

    let content = match config.format {
        OutputFormat::Json => output::format_json(&tokens, false)?,
        OutputFormat::Pretty => output::format_json(&tokens, true)?,
        OutputFormat::Text => tokens.iter().map(token_line).collect::<Vec<_>>().join("\n"),
    };
    output::write_output(&content, config.output_file.as_deref())
}

/// One token per line: span, kind and lexeme
pub fn token_line(token: &Token) -> String {
    let kind = match token.kind {
        TokenKind::Keyword(keyword) => format!("keyword {keyword}"),
        other => other.describe(),
    };
    format!("{:<10} {kind:<20} {}", token.span.to_string(), token.lexeme)
}

/// Print the parsed statements as JSON
///
/// Text output is the JSON pretty form since the tree has no other
/// rendering.
pub fn ast(config: InspectConfig) -> Result<()> {
    let source = config.input.load()?;
    let parser = Parser::with_config(config.options.parser_config());
    let queries = parser
        .parse_batch(&source.text)
        .and_then(|parsed| parsed.into_result())
        .map_err(|e| {
            eprint!("{}", output::format_diagnostics(&e.locate(&source.text), &source));
            anyhow::anyhow!("Failed to parse {}", source.name)
        })?;

    let content = output::format_json(&queries, config.format != OutputFormat::Json)?;
    output::write_output(&content, config.output_file.as_deref())
}
