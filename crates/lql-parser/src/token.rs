//! Tokens produced by the lexer

use lql_ast::{DurationUnit, Keyword};
use lql_diagnostics::{LQL0014, LqlError, Result, Span};
use serde::Serialize;
use std::fmt;

/// Punctuation and operator symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Symbol {
    Semicolon,
    Comma,
    LeftParen,
    RightParen,
    Dot,
    Colon,
    Plus,
    Minus,
    Star,
    Slash,
    /// `=` or `==`
    Equal,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    /// `<>` or `!=`
    NotEqual,
    /// `||`
    Concat,
}

impl Symbol {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::Dot => ".",
            Self::Colon => ":",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Equal => "=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::NotEqual => "<>",
            Self::Concat => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    Integer,
    StringLiteral,
    TermLiteral,
    Symbol(Symbol),
    /// `T` between a date and a clock time
    TimeMarker,
    /// `Z` after a clock time
    Zulu,
    Eof,
}

impl TokenKind {
    /// Human-readable name used in "expected ..." lists
    pub fn describe(&self) -> String {
        match self {
            Self::Keyword(keyword) => keyword.to_string(),
            Self::Identifier => "identifier".to_string(),
            Self::Integer => "integer literal".to_string(),
            Self::StringLiteral => "string literal".to_string(),
            Self::TermLiteral => "term literal".to_string(),
            Self::Symbol(symbol) => format!("'{}'", symbol.as_str()),
            Self::TimeMarker => "'T'".to_string(),
            Self::Zulu => "'Z'".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

/// A lexed token
///
/// `lexeme` is the source text of the token, except for string, term and
/// brace-reference literals where it is the unquoted content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn eof(at: usize) -> Self {
        Self::new(TokenKind::Eof, "", Span::point(at))
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.kind == TokenKind::Symbol(symbol)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// How the token is quoted in "found ..." messages
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::StringLiteral => format!("\"{}\"", self.lexeme),
            TokenKind::TermLiteral => format!("'{}'", self.lexeme),
            _ => format!("'{}'", self.lexeme),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} @ {}", self.kind, self.describe(), self.span)
    }
}

/// Map a duration keyword token to its canonical unit
///
/// Any other token is a syntax error: the grammar only asks for a unit where
/// one is required.
pub fn classify_duration_unit(token: &Token) -> Result<DurationUnit> {
    token.keyword().and_then(|keyword| keyword.duration_unit()).ok_or_else(|| {
        LqlError::syntax_with(
            LQL0014,
            format!("expected duration unit, found {}", token.describe()),
            token.describe(),
            token.span,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn keyword_token(word: &str) -> Token {
        let keyword = Keyword::from_word(word).unwrap_or_else(|| panic!("{word} is not a keyword"));
        Token::new(TokenKind::Keyword(keyword), word, Span::new(0, word.len()))
    }

    #[rstest]
    #[case("YEAR", DurationUnit::Year)]
    #[case("years", DurationUnit::Year)]
    #[case("Months", DurationUnit::Month)]
    #[case("WEEK", DurationUnit::Week)]
    #[case("days", DurationUnit::Day)]
    #[case("hour", DurationUnit::Hour)]
    #[case("HOURS", DurationUnit::Hour)]
    #[case("minute", DurationUnit::Minute)]
    #[case("Minutes", DurationUnit::Minute)]
    #[case("SECOND", DurationUnit::Second)]
    #[case("seconds", DurationUnit::Second)]
    fn test_classify_duration_unit(#[case] word: &str, #[case] expected: DurationUnit) {
        assert_eq!(classify_duration_unit(&keyword_token(word)).ok(), Some(expected));
    }

    #[test]
    fn test_classify_rejects_other_tokens() {
        let err = classify_duration_unit(&keyword_token("before")).unwrap_err();
        assert_eq!(err.code(), LQL0014);

        let ident = Token::new(TokenKind::Identifier, "fortnight", Span::new(3, 12));
        assert!(classify_duration_unit(&ident).unwrap_err().is_syntax());
    }
}
