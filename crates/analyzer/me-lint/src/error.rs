//! Lint configuration errors

use thiserror::Error;

/// Result type for lint operations
pub type LintResult<T> = Result<T, LintError>;

/// Errors that stop a rule from running on a unit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LintError {
    /// A wrapper entry is not of the form `<package>.<name>`
    #[error("invalid flag. wrapper function must be <package>.<name> format: {entry:?}")]
    InvalidWrapper {
        /// The offending entry
        entry: String,
    },
}
