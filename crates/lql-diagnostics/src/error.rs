//! LQL error types

use crate::{ErrorCode, LQL0010, LQL0011, LQL0012, SourceLocation, Span};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A diagnostic message with location and help text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} - {}", self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {loc}")?;
        }
        Ok(())
    }
}

/// Main LQL error type
///
/// Every failure of `tokenize`, `parse` or `build` is one of these. Spans
/// are byte offsets into the statement source; [`LqlError::locate`] turns
/// them into line/column locations once the source is at hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LqlError {
    /// Unrecognized character or malformed literal
    #[error("{code}: {message}")]
    Lex {
        code: ErrorCode,
        message: String,
        position: usize,
        unexpected: char,
        location: Option<SourceLocation>,
    },

    /// No grammar alternative matches the lookahead token
    #[error("{code}: {message}")]
    Syntax {
        code: ErrorCode,
        message: String,
        expected: Vec<String>,
        found: String,
        span: Span,
        location: Option<SourceLocation>,
    },

    /// The tree parsed but does not describe a valid criteria
    #[error("{code}: {message}")]
    Semantic {
        code: ErrorCode,
        message: String,
        span: Option<Span>,
        location: Option<SourceLocation>,
    },

    /// Errors collected across a statement batch
    #[error("Multiple errors: {}", .0.len())]
    Multiple(Vec<LqlError>),
}

impl LqlError {
    pub fn lex(code: ErrorCode, message: impl Into<String>, position: usize, unexpected: char) -> Self {
        Self::Lex {
            code,
            message: message.into(),
            position,
            unexpected,
            location: None,
        }
    }

    /// Syntax error listing what would have been accepted
    ///
    /// The message reads `expected X, Y or Z, found W`; the code is
    /// `LQL0011` when the offending token is the end of input.
    pub fn syntax<S: Into<String>>(
        expected: impl IntoIterator<Item = S>,
        found: impl Into<String>,
        span: Span,
        at_end: bool,
    ) -> Self {
        let expected: Vec<String> = expected.into_iter().map(Into::into).collect();
        let found = found.into();
        let code = if at_end { LQL0011 } else { LQL0010 };
        Self::Syntax {
            code,
            message: format!("expected {}, found {found}", join_alternatives(&expected)),
            expected,
            found,
            span,
            location: None,
        }
    }

    /// A token that cannot start an operand
    pub fn expected_expression<S: Into<String>>(
        expected: impl IntoIterator<Item = S>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        let found = found.into();
        Self::Syntax {
            code: LQL0012,
            message: format!("expected expression, found {found}"),
            expected: expected.into_iter().map(Into::into).collect(),
            found,
            span,
            location: None,
        }
    }

    /// Syntax error with a dedicated code and message
    pub fn syntax_with(code: ErrorCode, message: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            code,
            message: message.into(),
            expected: Vec::new(),
            found: found.into(),
            span,
            location: None,
        }
    }

    pub fn semantic(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Semantic {
            code,
            message: message.into(),
            span: None,
            location: None,
        }
    }

    pub fn semantic_at(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self::Semantic {
            code,
            message: message.into(),
            span: Some(span),
            location: None,
        }
    }

    /// Attach a span to a semantic error that was raised without one
    pub fn with_span(self, at: Span) -> Self {
        match self {
            Self::Semantic {
                code,
                message,
                span: None,
                location,
            } => Self::Semantic {
                code,
                message,
                span: Some(at),
                location,
            },
            other => other,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Lex { code, .. } | Self::Syntax { code, .. } | Self::Semantic { code, .. } => *code,
            Self::Multiple(errors) => errors.first().map_or(ErrorCode::new(0), Self::code),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex { position, unexpected, .. } => {
                Some(Span::new(*position, *position + unexpected.len_utf8()))
            }
            Self::Syntax { span, .. } => Some(*span),
            Self::Semantic { span, .. } => *span,
            Self::Multiple(_) => None,
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Lex { location, .. } | Self::Syntax { location, .. } | Self::Semantic { location, .. } => {
                location.as_ref()
            }
            Self::Multiple(_) => None,
        }
    }

    pub fn is_lex(&self) -> bool {
        matches!(self, Self::Lex { .. })
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }

    pub fn is_semantic(&self) -> bool {
        matches!(self, Self::Semantic { .. })
    }

    /// Resolve the span against `source` into a line/column location
    pub fn locate(self, source: &str) -> Self {
        let resolved = self.span().map(|span| SourceLocation::from_span(span, source));
        match self {
            Self::Lex {
                code,
                message,
                position,
                unexpected,
                ..
            } => Self::Lex {
                code,
                message,
                position,
                unexpected,
                location: resolved,
            },
            Self::Syntax {
                code,
                message,
                expected,
                found,
                span,
                ..
            } => Self::Syntax {
                code,
                message,
                expected,
                found,
                span,
                location: resolved,
            },
            Self::Semantic { code, message, span, .. } => Self::Semantic {
                code,
                message,
                span,
                location: resolved,
            },
            Self::Multiple(errors) => Self::Multiple(errors.into_iter().map(|e| e.locate(source)).collect()),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Lex { code, message, location, .. }
            | Self::Syntax { code, message, location, .. }
            | Self::Semantic { code, message, location, .. } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(loc) = location {
                    diag = diag.with_location(loc.clone());
                }
                if let Some(help) = code.info().help {
                    diag = diag.with_help(help);
                }
                diag
            }
            Self::Multiple(errors) => match errors.first() {
                Some(first) => first.to_diagnostic(),
                None => Diagnostic::error(ErrorCode::new(0), "Unknown error"),
            },
        }
    }
}

fn join_alternatives(items: &[String]) -> String {
    match items {
        [] => "nothing".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}
