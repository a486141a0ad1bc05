//! Errors raised while loading fact dumps

use me_span::FileId;
use thiserror::Error;

/// Result type for fact loading
pub type FactsResult<T> = Result<T, FactsError>;

/// Errors that can occur while loading a unit's facts
#[derive(Debug, Error)]
pub enum FactsError {
    /// The text is not a well-formed fact dump
    #[error("malformed fact dump: {0}")]
    Decode(#[from] serde_json::Error),

    /// A type id points past the end of the type table
    #[error("{owner} refers to undefined type {id}")]
    DanglingType {
        /// The missing type id
        id: u32,
        /// What holds the reference
        owner: String,
    },

    /// An object id points past the end of the object table
    #[error("{owner} refers to undefined object {id}")]
    DanglingObject {
        /// The missing object id
        id: u32,
        /// What holds the reference
        owner: String,
    },

    /// Two files share an id
    #[error("file `{name}` reuses {file}")]
    DuplicateFile {
        /// The reused id
        file: FileId,
        /// Name of the second file with that id
        name: String,
    },
}
