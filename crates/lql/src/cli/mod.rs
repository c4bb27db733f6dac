//! CLI functionality for the LQL tool
//!
//! This module contains all CLI-related functionality including:
//! - Compiling statements to criteria
//! - Checking files and reporting diagnostics
//! - Token and syntax tree inspection
//! - Output formatting

pub mod check;
pub mod compile;
pub mod inspect;
pub mod output;

use crate::CompileOptions;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// LQL text together with a name for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub name: String,
    pub text: String,
}

/// Where a command reads its statements from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Expression(String),
    Stdin,
}

impl Input {
    /// Pick the input from a `FILE` argument and an `-e` expression
    pub fn from_args(file: Option<PathBuf>, expression: Option<String>) -> Result<Self> {
        match (file, expression) {
            (Some(_), Some(_)) => anyhow::bail!("Pass either a file or --expression, not both"),
            (Some(file), None) => Ok(Self::File(file)),
            (None, Some(expression)) => Ok(Self::Expression(expression)),
            (None, None) => Ok(Self::Stdin),
        }
    }

    pub fn load(&self) -> Result<SourceText> {
        match self {
            Self::File(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read LQL file: {}", path.display()))?;
                Ok(SourceText {
                    name: path.display().to_string(),
                    text,
                })
            }
            Self::Expression(text) => Ok(SourceText {
                name: "<expression>".to_string(),
                text: text.clone(),
            }),
            Self::Stdin => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read LQL from stdin")?;
                Ok(SourceText {
                    name: "<stdin>".to_string(),
                    text,
                })
            }
        }
    }
}

/// Load compile options from a JSON file, or the defaults without one
pub fn load_options(path: Option<&Path>) -> Result<CompileOptions> {
    let Some(path) = path else {
        return Ok(CompileOptions::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let options = CompileOptions::from_json(&json)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    log::debug!("loaded options from {}: {options:?}", path.display());
    Ok(options)
}
