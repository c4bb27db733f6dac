//! Immutable position in a token stream
//!
//! A `Cursor` is `Copy`. Grammar functions take one by value and hand back a
//! new one with the node they parsed; backing out of an alternative is just
//! reusing the old value.

use crate::token::{Symbol, Token, TokenKind};
use lql_ast::Keyword;
use lql_diagnostics::{LQL0015, LQL0016, LqlError, Result, Span};

static END: Token = Token {
    kind: TokenKind::Eof,
    lexeme: String::new(),
    span: Span::point(0),
};

pub type PResult<'t, T> = Result<(T, Cursor<'t>)>;

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t> Cursor<'t> {
    pub fn new(tokens: &'t [Token], max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    pub fn peek(&self) -> &'t Token {
        self.peek_nth(0)
    }

    /// Token `n` places ahead; reads past the end yield the final token
    pub fn peek_nth(&self, n: usize) -> &'t Token {
        let tokens = self.tokens;
        tokens
            .get(self.pos + n)
            .or_else(|| tokens.last())
            .unwrap_or(&END)
    }

    pub fn advance(self) -> Self {
        Self {
            pos: (self.pos + 1).min(self.tokens.len()),
            ..self
        }
    }

    pub fn advance_by(self, n: usize) -> Self {
        Self {
            pos: (self.pos + n).min(self.tokens.len()),
            ..self
        }
    }

    pub fn bump(self) -> (&'t Token, Self) {
        (self.peek(), self.advance())
    }

    pub fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    pub fn at_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_keyword(keyword)
    }

    pub fn at_symbol(&self, symbol: Symbol) -> bool {
        self.peek().is_symbol(symbol)
    }

    pub fn at_kind(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub fn eat_keyword(self, keyword: Keyword) -> Option<Self> {
        self.at_keyword(keyword).then(|| self.advance())
    }

    pub fn eat_symbol(self, symbol: Symbol) -> Option<Self> {
        self.at_symbol(symbol).then(|| self.advance())
    }

    /// Whether the next token starts exactly where the previous one ended
    pub fn glued(&self) -> bool {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(previous) => previous.span.touches(&self.peek().span),
            None => false,
        }
    }

    /// Whether token `n` ahead starts where token `n - 1` ahead ended
    pub fn glued_nth(&self, n: usize) -> bool {
        match n {
            0 => self.glued(),
            _ => self.peek_nth(n - 1).span.touches(&self.peek_nth(n).span),
        }
    }

    pub fn expect_symbol(self, symbol: Symbol) -> PResult<'t, &'t Token> {
        if self.at_symbol(symbol) {
            Ok(self.bump())
        } else {
            Err(self.expected([format!("'{}'", symbol.as_str())]))
        }
    }

    /// Syntax error at the next token
    pub fn expected<S: Into<String>>(&self, expected: impl IntoIterator<Item = S>) -> LqlError {
        let token = self.peek();
        LqlError::syntax(expected, token.describe(), token.span, token.is_eof())
    }

    pub fn trailing_input(&self) -> LqlError {
        let token = self.peek();
        LqlError::syntax_with(
            LQL0016,
            format!("unexpected {} after end of statement", token.describe()),
            token.describe(),
            token.span,
        )
    }

    /// Enter a nested expression, failing past the configured depth
    pub fn descend(self) -> Result<Self> {
        if self.depth >= self.max_depth {
            let token = self.peek();
            return Err(LqlError::syntax_with(
                LQL0015,
                format!("expression nested deeper than {} levels", self.max_depth),
                token.describe(),
                token.span,
            ));
        }
        Ok(Self {
            depth: self.depth + 1,
            ..self
        })
    }

    pub fn ascend(self) -> Self {
        Self {
            depth: self.depth.saturating_sub(1),
            ..self
        }
    }

    /// Skip past the next `;` (or to the end) to resynchronize a batch
    pub fn skip_statement(self) -> Self {
        let mut cursor = Self { depth: 0, ..self };
        while !cursor.is_at_end() {
            let (token, next) = cursor.bump();
            cursor = next;
            if token.is_symbol(Symbol::Semicolon) {
                break;
            }
        }
        cursor
    }
}
