//! Plain-text rendering of diagnostics with a source excerpt

use crate::Diagnostic;
use std::fmt::Write;

/// Render a diagnostic against the source it was produced from
///
/// ```text
/// error[LQL0010]: expected identifier or '(', found ';'
///  --> 1:14
///   |
/// 1 | "CD4 COUNT" <;
///   |               ^
/// ```
pub fn render(diagnostic: &Diagnostic, source: &str) -> String {
    let mut out = String::new();
    let header = format!("error[{}]", diagnostic.code);
    let _ = writeln!(out, "{}: {}", paint_error(&header), diagnostic.message);

    if let Some(location) = &diagnostic.location {
        let line_text = source.lines().nth(location.line.saturating_sub(1)).unwrap_or("");
        let gutter = location.line.to_string().len();
        let pad = " ".repeat(gutter);
        let _ = writeln!(out, "{pad}--> {location}");
        let _ = writeln!(out, "{pad} |");
        let _ = writeln!(out, "{} | {line_text}", location.line);

        let remaining = line_text.chars().count().saturating_sub(location.column.saturating_sub(1));
        let width = location.length.clamp(1, remaining.max(1));
        let carets = "^".repeat(width);
        let indent = " ".repeat(location.column.saturating_sub(1));
        let _ = writeln!(out, "{pad} | {indent}{}", paint_error(&carets));
    }

    if let Some(help) = &diagnostic.help {
        let _ = writeln!(out, "  = help: {help}");
    }
    out
}

#[cfg(feature = "colored")]
fn paint_error(text: &str) -> String {
    use colored::Colorize;
    text.red().bold().to_string()
}

#[cfg(not(feature = "colored"))]
fn paint_error(text: &str) -> String {
    text.to_string()
}

#[cfg(all(test, not(feature = "colored")))]
mod tests {
    use super::*;
    use crate::{LqlError, Span};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_points_at_offending_token() {
        let source = "\"CD4 COUNT\" <;";
        let diag = LqlError::syntax(["identifier", "'('"], "';'", Span::new(13, 14), false)
            .locate(source)
            .to_diagnostic();

        assert_eq!(
            render(&diag, source),
            "error[LQL0010]: expected identifier or '(', found ';'\n \
             --> 1:14\n  |\n1 | \"CD4 COUNT\" <;\n  |               ^\n"
        );
    }

    #[test]
    fn test_render_tolerates_column_zero() {
        let diag = Diagnostic::error(crate::LQL0012, "expected expression")
            .with_location(crate::SourceLocation::new(1, 0, 0, 1));
        let rendered = render(&diag, "ab");
        assert!(rendered.contains("1 | ab\n  | ^\n"), "{rendered}");
    }

    #[test]
    fn test_render_without_location() {
        let diag = LqlError::semantic(crate::LQL0106, "two temporal qualifiers").to_diagnostic();
        assert_eq!(render(&diag, ""), "error[LQL0106]: two temporal qualifiers\n");
    }
}
