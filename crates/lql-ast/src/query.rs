//! Statement-level AST nodes

use crate::{Expression, Keyword, Spanned};
use serde::Serialize;

/// One statement: `[prefix] expr [WITHIN ...] ;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    pub transform: Option<Spanned<AggregationPrefix>>,
    pub body: Spanned<Expression>,
    pub within: Option<Spanned<WithinSuffix>>,
}

/// Leading transform such as `LAST 3 OF` or `COUNT`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationPrefix {
    pub keyword: Keyword,
    /// Digit run following a positional transform
    pub count: Option<Spanned<String>>,
}

impl AggregationPrefix {
    pub fn new(keyword: Keyword) -> Self {
        Self { keyword, count: None }
    }

    pub fn with_count(mut self, count: Spanned<String>) -> Self {
        self.count = Some(count);
        self
    }
}

/// `WITHIN [THE] [PAST] operand`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithinSuffix {
    pub the: bool,
    pub past: bool,
    pub operand: Spanned<Expression>,
}
