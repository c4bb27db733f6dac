//! LQL diagnostics and error handling
//!
//! Error codes, source spans and the error type shared by every stage of
//! the compiler, plus a plain-text diagnostic renderer for tools.

mod error;
mod error_code;
mod render;
mod span;

pub use error::*;
pub use error_code::*;
pub use render::render;
pub use span::*;

/// Result type for LQL operations
pub type Result<T> = std::result::Result<T, LqlError>;
