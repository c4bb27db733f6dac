//! Compile command implementation

use super::Input;
use super::output::{self, OutputFormat};
use crate::{CompileOptions, Criteria};
use anyhow::Result;
use std::path::PathBuf;

/// Configuration for compile command
pub struct CompileConfig {
    pub input: Input,
    pub format: OutputFormat,
    pub options: CompileOptions,
    pub output_file: Option<PathBuf>,
}

/// Compile every statement and print the resulting criteria
///
/// Nothing is written when a statement fails; its diagnostics go to stderr
/// instead.
pub fn compile(config: CompileConfig) -> Result<()> {
    let source = config.input.load()?;

    let results = crate::compile_batch(&source.text, &config.options).map_err(|e| {
        eprint!("{}", output::format_diagnostics(&e, &source));
        anyhow::anyhow!("Failed to tokenize {}", source.name)
    })?;

    let mut compiled = Vec::with_capacity(results.len());
    let mut failures = 0;
    for result in results {
        match result {
            Ok(criteria) => compiled.push(criteria),
            Err(e) => {
                eprint!("{}", output::format_diagnostics(&e, &source));
                failures += 1;
            }
        }
    }
    if failures > 0 {
        anyhow::bail!("{failures} statement(s) in {} failed to compile", source.name);
    }

    let content = render(&compiled, config.format)?;
    output::write_output(&content, config.output_file.as_deref())
}

/// Render compiled criteria in the requested format
pub fn render(compiled: &[Criteria], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => output::format_json(compiled, false),
        OutputFormat::Pretty => output::format_json(compiled, true),
        OutputFormat::Text => Ok(compiled
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
