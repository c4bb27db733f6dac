//! LQL Abstract Syntax Tree definitions
//!
//! The tree produced by the parser for one Logic Query Language statement.
//! Node kinds follow the grammar's precedence levels; leaves keep the lexeme
//! of the token they came from so later stages can validate it.

mod expression;
mod keyword;
mod literal;
mod operator;
mod query;

pub use expression::*;
pub use keyword::*;
pub use literal::*;
pub use operator::*;
pub use query::*;

/// A node with source span information
pub type Spanned<T> = lql_diagnostics::Spanned<T>;

/// Type alias for boxed expressions
pub type BoxExpr = Box<Spanned<Expression>>;
