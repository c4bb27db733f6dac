//! Output formatting utilities

use super::SourceText;
use crate::LqlError;
use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    #[default]
    Pretty,
    /// LQL text, one statement per line
    Text,
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(io::stdout().is_terminal() && io::stderr().is_terminal()),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {error:#}", "Error:".red().bold())
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Render every diagnostic in `error` against the source it came from
pub fn format_diagnostics(error: &LqlError, source: &SourceText) -> String {
    match error {
        LqlError::Multiple(errors) => errors
            .iter()
            .map(|error| format_diagnostics(error, source))
            .collect::<Vec<_>>()
            .join("\n"),
        single => {
            let rendered = lql_diagnostics::render(&single.to_diagnostic(), &source.text);
            format!("{} {}\n{rendered}", "in".dimmed(), source.name.cyan())
        }
    }
}

/// Serialize a value as compact or indented JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        writeln!(file, "{content}")
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!("{}", format_success(&format!("Output written to {}", path.display())));
    } else {
        println!("{content}");
    }
    Ok(())
}
