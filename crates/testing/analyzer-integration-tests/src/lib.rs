//! Shared helpers for the analyzer integration tests

use me_facts::Unit;
use me_lint::Diagnostic;

/// Fact dump of `a.go`: an overwritten binding, a wrapped return, a blank
/// assignment
pub const MISSING_FIXTURE: &str = include_str!("../tests/fixtures/missing.json");

/// Fact dump of `b.go`: a named error result reassigned before a bare return
pub const NAMED_RESULT_FIXTURE: &str = include_str!("../tests/fixtures/named_result.json");

/// Render a diagnostic as `file:line:col`
///
/// Falls back to the byte offset when the unit has no line table.
pub fn position(unit: &Unit, diagnostic: &Diagnostic) -> String {
    let span = diagnostic.span;
    match unit.file(span.file) {
        Some(file) => match file.line_col(span.span.start) {
            Some((line, column)) => format!("{}:{line}:{column}", file.name),
            None => format!("{}:@{}", file.name, span.span.start),
        },
        None => format!("{}:@{}", span.file, span.span.start),
    }
}
