//! Check command implementation

use super::{Input, output};
use crate::{CompileOptions, ParseMode};
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Configuration for check command
pub struct CheckConfig {
    pub files: Vec<PathBuf>,
    pub options: CompileOptions,
    pub verbose: bool,
}

/// Totals across every checked file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub files: usize,
    pub statements: usize,
    pub failures: usize,
}

impl CheckReport {
    pub fn is_success(&self) -> bool {
        self.failures == 0
    }
}

/// Compile each file in analysis mode and report every diagnostic
///
/// A file that cannot be read is an error; statements that fail to compile
/// are counted in the report.
pub fn check(config: CheckConfig) -> Result<CheckReport> {
    if config.files.is_empty() {
        anyhow::bail!("No files specified for checking");
    }

    let options = config.options.with_mode(ParseMode::Analysis);
    let mut report = CheckReport::default();

    for file in &config.files {
        if config.verbose {
            eprintln!("Checking: {}", file.display());
        }
        let source = Input::File(file.clone()).load()?;
        report.files += 1;

        let results = match crate::compile_batch(&source.text, &options) {
            Ok(results) => results,
            Err(e) => {
                eprint!("{}", output::format_diagnostics(&e, &source));
                report.failures += 1;
                continue;
            }
        };

        let failed: Vec<_> = results.iter().filter_map(|result| result.as_ref().err()).collect();
        report.statements += results.len();
        report.failures += failed.len();

        if failed.is_empty() {
            println!("{} {} ({} statements)", "ok".green().bold(), source.name, results.len());
        } else {
            for error in failed {
                eprint!("{}", output::format_diagnostics(error, &source));
            }
        }
    }

    println!();
    if report.is_success() {
        println!(
            "{}",
            output::format_success(&format!(
                "{} statement(s) in {} file(s) compiled",
                report.statements, report.files
            ))
        );
    } else {
        eprintln!(
            "{} {} of {} statement(s) failed",
            "Check failed:".red().bold(),
            report.failures,
            report.statements
        );
    }
    Ok(report)
}
