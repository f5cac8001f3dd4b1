//! Source spans over the original input string.

use std::fmt::{self, Debug};
use std::ptr;
use std::sync::Arc;

use crate::types::ErrorLocationProvider;

/// Interface for a lexer providing the input string being tokenized.
pub trait LexerInterface {
    /// The original input string, used for span tracking and error messages.
    fn input(&self) -> &str;
}

impl Debug for dyn LexerInterface + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LexerInterface")
    }
}

impl PartialEq for dyn LexerInterface + '_ {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

/// A byte range `[start, end)` into a shared copy of the input string.
///
/// Spans are immutable once created; merging two spans produces a new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    /// Reference-counted input string the span indexes into.
    pub input: Arc<str>,
    /// Zero-based inclusive start byte offset.
    pub start: usize,
    /// Zero-based exclusive end byte offset.
    pub end: usize,
}

impl SourceLocation {
    /// Create a span over an already-shared input string.
    #[must_use]
    pub const fn new(input: Arc<str>, start: usize, end: usize) -> Self {
        Self { input, start, end }
    }

    /// Create a span, copying the input into a fresh `Arc`.
    #[must_use]
    pub fn from_str(input: &str, start: usize, end: usize) -> Self {
        Self::new(Arc::from(input), start, end)
    }

    /// Start byte offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// End byte offset (exclusive).
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// The input string this span indexes into.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Merge two optional spans into one covering both.
    ///
    /// Returns `None` when both are `None` or when the spans reference
    /// different input strings.
    #[must_use]
    pub fn range(first: Option<Self>, second: Option<Self>) -> Option<Self> {
        match (first, second) {
            (Some(fp), None) => Some(fp),
            (None, Some(sp)) => Some(sp),
            (Some(fp), Some(sp)) => {
                if !Arc::ptr_eq(&fp.input, &sp.input) {
                    return None;
                }
                Some(Self {
                    input: Arc::clone(&fp.input),
                    start: fp.start,
                    end: sp.end,
                })
            }
            (None, None) => None,
        }
    }
}

/// Merge two borrowed spans into an owned covering span.
pub trait SourceRangeRef {
    /// Create a covering `SourceLocation` without taking ownership of either
    /// operand.
    #[must_use]
    fn range_ref(self, second: Self) -> Option<SourceLocation>;
}

impl SourceRangeRef for Option<&SourceLocation> {
    fn range_ref(self, second: Self) -> Option<SourceLocation> {
        match (self, second) {
            (Some(fp), None) => Some(fp.clone()),
            (None, Some(sp)) => Some(sp.clone()),
            (Some(fp), Some(sp)) => {
                if !Arc::ptr_eq(&fp.input, &sp.input) {
                    return None;
                }
                Some(SourceLocation {
                    input: Arc::clone(&fp.input),
                    start: fp.start,
                    end: sp.end,
                })
            }
            (None, None) => None,
        }
    }
}

impl ErrorLocationProvider for SourceLocation {
    fn loc(&self) -> Option<&SourceLocation> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_merges_spans_over_same_input() {
        let input: Arc<str> = Arc::from("a+b=c");
        let first = SourceLocation::new(Arc::clone(&input), 0, 1);
        let second = SourceLocation::new(Arc::clone(&input), 2, 3);
        let merged = SourceLocation::range(Some(first), Some(second));
        let merged = merged.as_ref();
        assert_eq!(merged.map(SourceLocation::start), Some(0));
        assert_eq!(merged.map(SourceLocation::end), Some(3));
    }

    #[test]
    fn test_range_rejects_mismatched_inputs() {
        let first = SourceLocation::from_str("x", 0, 1);
        let second = SourceLocation::from_str("y", 0, 1);
        assert!(SourceLocation::range(Some(first), Some(second)).is_none());
    }

    #[test]
    fn test_range_passes_through_single_span() {
        let loc = SourceLocation::from_str("x^2", 1, 2);
        let merged = SourceLocation::range(None, Some(loc.clone()));
        assert_eq!(merged, Some(loc));
    }
}
