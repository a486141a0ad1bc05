//! Source file spans and locations
//!
//! Positions are byte offsets inside a file. Spans order by file first and
//! then by offset, which is the order diagnostics are reported in.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A unique identifier for a source file within a unit
#[derive(
    Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
#[display("file#{_0}")]
pub struct FileId(pub u32);

impl FileId {
    /// Create a file id from its raw index
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A byte offset span in a source file
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Span {
    /// First byte of the span
    pub start: u32,
    /// One past the last byte of the span
    pub end: u32,
}

impl Span {
    /// Create a span from its bounds
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`
    #[must_use]
    pub fn cover(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A span with associated file
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FileSpan {
    /// File containing the span
    pub file: FileId,
    /// Location inside the file
    pub span: Span,
}

impl FileSpan {
    /// Create a file span
    #[must_use]
    pub fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }

    /// Smallest span covering both spans; `self`'s file wins when they differ
    #[must_use]
    pub fn cover(self, other: Self) -> Self {
        if self.file == other.file {
            Self::new(self.file, self.span.cover(other.span))
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_span_ordering() {
        let first = FileSpan::new(FileId(0), Span::new(40, 44));
        let second = FileSpan::new(FileId(0), Span::new(90, 92));
        let other_file = FileSpan::new(FileId(1), Span::new(0, 3));

        let mut spans = vec![other_file, second, first];
        spans.sort();

        assert_eq!(spans, vec![first, second, other_file]);
    }

    #[test]
    fn test_cover() {
        let left = FileSpan::new(FileId(2), Span::new(10, 14));
        let right = FileSpan::new(FileId(2), Span::new(20, 31));

        assert_eq!(left.cover(right).span, Span::new(10, 31));
        let elsewhere = FileSpan::new(FileId(5), Span::new(0, 2));
        assert_eq!(left.cover(elsewhere), left);
    }

    #[test]
    fn test_display_file_id() {
        assert_eq!(FileId::new(3).to_string(), "file#3");
    }
}
