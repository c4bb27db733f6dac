//! Compiler options

use lql_parser::{DEFAULT_MAX_DEPTH, ParseMode, ParserConfig};
use serde::{Deserialize, Serialize};

/// Options for [`compile_with_options`](crate::compile_with_options) and
/// [`compile_batch`](crate::compile_batch)
///
/// Missing fields take their defaults when loaded from JSON:
///
/// ```
/// use lql::{CompileOptions, ParseMode};
///
/// let options = CompileOptions::from_json(r#"{ "mode": "analysis" }"#)?;
/// assert_eq!(options.mode, ParseMode::Analysis);
/// assert_eq!(options.max_depth, CompileOptions::default().max_depth);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub mode: ParseMode,
    /// Nesting allowed for parentheses, NOT and function application
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            mode: ParseMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            mode: self.mode,
            max_depth: self.max_depth,
        }
    }
}

impl From<CompileOptions> for ParserConfig {
    fn from(options: CompileOptions) -> Self {
        options.parser_config()
    }
}
