//! LQL error codes following a structured numbering system
//!
//! Error code ranges:
//! - LQL0001-LQL0099: Lexical and syntax errors
//! - LQL0100-LQL0199: Semantic errors (criteria construction, dates)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Registry entry for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Lexical or syntax error (0001-0099)
    pub const fn is_parse_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Semantic error (0100-0199)
    pub const fn is_semantic_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LQL{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub description: &'static str,
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Lexical errors
    map.insert(1, ErrorInfo::new("Unexpected character"));
    map.insert(
        2,
        ErrorInfo::new("Unterminated string literal")
            .with_help("Close the literal with the same quote it was opened with"),
    );
    map.insert(3, ErrorInfo::new("Unterminated term literal"));
    map.insert(4, ErrorInfo::new("Unterminated token reference"));
    map.insert(5, ErrorInfo::new("Unterminated block comment"));

    // Syntax errors
    map.insert(10, ErrorInfo::new("Unexpected token"));
    map.insert(
        11,
        ErrorInfo::new("Unexpected end of input")
            .with_help("Every statement must end with ';'"),
    );
    map.insert(12, ErrorInfo::new("Expected expression"));
    map.insert(13, ErrorInfo::new("Malformed date/time literal"));
    map.insert(
        14,
        ErrorInfo::new("Expected duration unit")
            .with_help("Use YEAR(S), MONTH(S), WEEK(S), DAY(S), HOUR(S), MINUTE(S) or SECOND(S)"),
    );
    map.insert(15, ErrorInfo::new("Expression nested too deeply"));
    map.insert(16, ErrorInfo::new("Trailing input after statement"));

    // Semantic errors
    map.insert(
        100,
        ErrorInfo::new("Invalid criteria key")
            .with_help("A key is an identifier, a quoted string or an integer"),
    );
    map.insert(101, ErrorInfo::new("Unsupported expression in criteria"));
    map.insert(102, ErrorInfo::new("Invalid comparison operand"));
    map.insert(103, ErrorInfo::new("Invalid calendar date"));
    map.insert(104, ErrorInfo::new("Invalid duration"));
    map.insert(
        105,
        ErrorInfo::new("Invalid transform count").with_help("The count must be a positive whole number"),
    );
    map.insert(106, ErrorInfo::new("Conflicting temporal qualifiers"));
    map.insert(107, ErrorInfo::new("Numeric overflow"));
    map.insert(108, ErrorInfo::new("Division by zero"));

    map
});

// Lexical errors
pub const LQL0001: ErrorCode = ErrorCode::new(1);
pub const LQL0002: ErrorCode = ErrorCode::new(2);
pub const LQL0003: ErrorCode = ErrorCode::new(3);
pub const LQL0004: ErrorCode = ErrorCode::new(4);
pub const LQL0005: ErrorCode = ErrorCode::new(5);

// Syntax errors
pub const LQL0010: ErrorCode = ErrorCode::new(10);
pub const LQL0011: ErrorCode = ErrorCode::new(11);
pub const LQL0012: ErrorCode = ErrorCode::new(12);
pub const LQL0013: ErrorCode = ErrorCode::new(13);
pub const LQL0014: ErrorCode = ErrorCode::new(14);
pub const LQL0015: ErrorCode = ErrorCode::new(15);
pub const LQL0016: ErrorCode = ErrorCode::new(16);

// Semantic errors
pub const LQL0100: ErrorCode = ErrorCode::new(100);
pub const LQL0101: ErrorCode = ErrorCode::new(101);
pub const LQL0102: ErrorCode = ErrorCode::new(102);
pub const LQL0103: ErrorCode = ErrorCode::new(103);
pub const LQL0104: ErrorCode = ErrorCode::new(104);
pub const LQL0105: ErrorCode = ErrorCode::new(105);
pub const LQL0106: ErrorCode = ErrorCode::new(106);
pub const LQL0107: ErrorCode = ErrorCode::new(107);
pub const LQL0108: ErrorCode = ErrorCode::new(108);
