//! Lexer: statement text to a token stream
//!
//! Scanning is done with winnow parsers over `&str`. Byte offsets are taken
//! from how much input remains, so every token carries an exact span.

use crate::token::{Symbol, Token, TokenKind};
use lql_ast::Keyword;
use lql_diagnostics::{LQL0001, LQL0002, LQL0003, LQL0004, LQL0005, LqlError, Result, Span};
use winnow::ascii::{digit1, multispace1, till_line_ending};
use winnow::combinator::{alt, delimited, repeat};
use winnow::token::{none_of, one_of, take_till, take_until, take_while};
use winnow::{ModalResult, Parser};

type Input<'a> = &'a str;

/// Convert source text into tokens, ending with an end-of-input token
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut input: Input<'_> = source;
    let mut tokens: Vec<Token> = Vec::new();

    loop {
        skip_trivia(&mut input);
        let start = source.len() - input.len();
        if input.is_empty() {
            tokens.push(Token::eof(start));
            break;
        }
        let token = next_token(&mut input, start, tokens.last())?;
        log::trace!("lexed {token}");
        tokens.push(token);
    }

    log::debug!("tokenized {} bytes into {} tokens", source.len(), tokens.len());
    Ok(tokens)
}

fn next_token(input: &mut Input<'_>, start: usize, previous: Option<&Token>) -> Result<Token> {
    let rest: &str = *input;
    let Some(first) = rest.chars().next() else {
        return Ok(Token::eof(start));
    };

    let follows_integer =
        previous.is_some_and(|token| token.kind == TokenKind::Integer && token.span.end == start);
    if follows_integer {
        if let Some(kind) = date_time_marker(rest) {
            *input = &rest[1..];
            return Ok(Token::new(kind, &rest[..1], Span::new(start, start + 1)));
        }
    }

    if rest.starts_with("/*") {
        return Err(LqlError::lex(LQL0005, "unterminated block comment", start, '/'));
    }

    let (kind, lexeme) = match first {
        '"' => {
            let text = string_literal
                .parse_next(input)
                .map_err(|_| LqlError::lex(LQL0002, "unterminated string literal", start, first))?;
            (TokenKind::StringLiteral, text)
        }
        '\'' => {
            let text = term_literal
                .parse_next(input)
                .map_err(|_| LqlError::lex(LQL0003, "unterminated term literal", start, first))?;
            (TokenKind::TermLiteral, text)
        }
        '{' => {
            let text = brace_reference
                .parse_next(input)
                .map_err(|_| LqlError::lex(LQL0004, "unterminated token reference", start, first))?;
            (TokenKind::StringLiteral, text)
        }
        c if c.is_ascii_digit() => {
            let digits = integer.parse_next(input).map_err(|_| unexpected(start, first))?;
            (TokenKind::Integer, digits.to_string())
        }
        c if is_word_start(c) => {
            let text = word.parse_next(input).map_err(|_| unexpected(start, first))?;
            let kind = Keyword::from_word(text).map_or(TokenKind::Identifier, TokenKind::Keyword);
            (kind, text.to_string())
        }
        _ => {
            let symbol = symbol.parse_next(input).map_err(|_| unexpected(start, first))?;
            let consumed = rest.len() - input.len();
            (TokenKind::Symbol(symbol), rest[..consumed].to_string())
        }
    };

    let end = start + (rest.len() - input.len());
    Ok(Token::new(kind, lexeme, Span::new(start, end)))
}

fn unexpected(position: usize, c: char) -> LqlError {
    LqlError::lex(LQL0001, format!("unexpected character '{c}'"), position, c)
}

/// `T` and `Z` are only markers when glued to the integer before them
fn date_time_marker(rest: &str) -> Option<TokenKind> {
    let mut chars = rest.chars();
    let first = chars.next()?;
    let next = chars.next();
    match first {
        'T' | 't' if next.is_some_and(|c| c.is_ascii_digit()) => Some(TokenKind::TimeMarker),
        'Z' | 'z' if !next.is_some_and(is_word_char) => Some(TokenKind::Zulu),
        _ => None,
    }
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn skip_trivia(input: &mut Input<'_>) {
    let _: ModalResult<()> =
        repeat(0.., alt((multispace1.void(), line_comment, block_comment))).parse_next(input);
}

fn line_comment(input: &mut Input<'_>) -> ModalResult<()> {
    ("//", till_line_ending).void().parse_next(input)
}

fn block_comment(input: &mut Input<'_>) -> ModalResult<()> {
    ("/*", take_until(0.., "*/"), "*/").void().parse_next(input)
}

fn integer<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    digit1.parse_next(input)
}

fn word<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    (one_of(is_word_start), take_while(0.., is_word_char))
        .take()
        .parse_next(input)
}

/// `"..."` with `""` standing for one quote
fn string_literal(input: &mut Input<'_>) -> ModalResult<String> {
    delimited('"', repeat(0.., alt(("\"\"".value('"'), none_of('"')))), '"').parse_next(input)
}

/// `'...'` with `''` standing for one quote
fn term_literal(input: &mut Input<'_>) -> ModalResult<String> {
    delimited('\'', repeat(0.., alt(("''".value('\''), none_of('\'')))), '\'').parse_next(input)
}

/// Legacy `{CD4 COUNT}` concept reference
fn brace_reference(input: &mut Input<'_>) -> ModalResult<String> {
    delimited('{', take_till(0.., '}'), '}')
        .map(|text: &str| text.trim().to_string())
        .parse_next(input)
}

fn symbol(input: &mut Input<'_>) -> ModalResult<Symbol> {
    alt((
        alt((
            "<=".value(Symbol::LessEqual),
            ">=".value(Symbol::GreaterEqual),
            "<>".value(Symbol::NotEqual),
            "!=".value(Symbol::NotEqual),
            "==".value(Symbol::Equal),
            "||".value(Symbol::Concat),
        )),
        alt((
            ';'.value(Symbol::Semicolon),
            ','.value(Symbol::Comma),
            '('.value(Symbol::LeftParen),
            ')'.value(Symbol::RightParen),
            '.'.value(Symbol::Dot),
            ':'.value(Symbol::Colon),
            '+'.value(Symbol::Plus),
            '-'.value(Symbol::Minus),
            '*'.value(Symbol::Star),
            '/'.value(Symbol::Slash),
            '='.value(Symbol::Equal),
            '<'.value(Symbol::Less),
            '>'.value(Symbol::Greater),
        )),
    ))
    .parse_next(input)
}
