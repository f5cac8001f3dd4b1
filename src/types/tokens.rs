//! Tokens produced by the lexer and pushed back by the macro expander.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::types::{ErrorLocationProvider, SourceLocation};

/// Textual payload of a [`Token`].
///
/// Most tokens borrow a slice of the input; tokens synthesized during macro
/// expansion own their text, and fixed control sequences use static strings.
#[derive(Clone, Debug)]
pub enum TokenText {
    /// Borrowed slice of an input string.
    Slice {
        /// Shared reference to the original input.
        source: Arc<str>,
        /// Byte range of the slice within the source.
        range: Range<usize>,
    },
    /// Heap-allocated text produced during expansion.
    Owned(Arc<str>),
    /// Static string literal.
    Static(&'static str),
}

impl TokenText {
    /// Borrow a slice of an input string.
    #[must_use]
    pub const fn slice(source: Arc<str>, start: usize, end: usize) -> Self {
        Self::Slice {
            source,
            range: start..end,
        }
    }

    /// The string slice this payload represents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Slice { source, range } => &source[range.clone()],
            Self::Owned(text) => text,
            Self::Static(text) => text,
        }
    }

    /// Byte length of the payload.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for TokenText {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for TokenText {}

impl From<String> for TokenText {
    fn from(value: String) -> Self {
        Self::Owned(Arc::from(value))
    }
}

impl From<&str> for TokenText {
    fn from(value: &str) -> Self {
        Self::Owned(Arc::from(value))
    }
}

impl From<Arc<str>> for TokenText {
    fn from(value: Arc<str>) -> Self {
        Self::Owned(value)
    }
}

impl fmt::Display for TokenText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TokenText> for String {
    fn from(value: TokenText) -> Self {
        value.as_str().to_owned()
    }
}

impl PartialEq<&str> for TokenText {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<TokenText> for &str {
    fn eq(&self, other: &TokenText) -> bool {
        *self == other.as_str()
    }
}

/// A single lexed or synthesized token.
///
/// Tokens are immutable once produced. The expansion flags are never flipped
/// through shared references; an expander that needs a flagged variant makes
/// a fresh copy with the flag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Raw text of the token, backslash included for control sequences.
    pub text: TokenText,
    /// Where in the input the token came from, when known.
    pub loc: Option<SourceLocation>,
    /// Prevents macro expansion of this token when `Some(true)`.
    pub noexpand: Option<bool>,
    /// Makes the parser treat this token as `\relax` when `Some(true)`.
    pub treat_as_relax: Option<bool>,
}

impl Token {
    /// Create a token with the given text and optional span.
    #[must_use]
    pub fn new<T>(text: T, loc: Option<SourceLocation>) -> Self
    where
        T: Into<TokenText>,
    {
        Self {
            text: text.into(),
            loc,
            noexpand: None,
            treat_as_relax: None,
        }
    }

    /// Create a token borrowing a slice of the shared input.
    #[must_use]
    pub const fn from_slice(
        input: Arc<str>,
        start: usize,
        end: usize,
        loc: Option<SourceLocation>,
    ) -> Self {
        Self {
            text: TokenText::slice(input, start, end),
            loc,
            noexpand: None,
            treat_as_relax: None,
        }
    }

    /// Token text as a string slice.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Replace the token's textual payload.
    pub fn set_text<T>(&mut self, text: T)
    where
        T: Into<TokenText>,
    {
        self.text = text.into();
    }

    /// A new token spanning from this token to `end_token`, carrying `text`.
    ///
    /// Returns `None` when the two spans cannot be merged.
    #[must_use]
    pub fn range<T: Into<TokenText>>(self, end_token: Self, text: T) -> Option<Self> {
        let loc = SourceLocation::range(self.loc, end_token.loc)?;
        Some(Self {
            text: text.into(),
            loc: Some(loc),
            noexpand: None,
            treat_as_relax: None,
        })
    }
}

impl ErrorLocationProvider for Token {
    fn loc(&self) -> Option<&SourceLocation> {
        self.loc.as_ref()
    }
}

impl ErrorLocationProvider for Option<Token> {
    fn loc(&self) -> Option<&SourceLocation> {
        self.as_ref()?.loc.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_token_text() {
        let input: Arc<str> = Arc::from(r"\frac12");
        let token = Token::from_slice(Arc::clone(&input), 0, 5, None);
        assert_eq!(token.text(), r"\frac");
    }

    #[test]
    fn test_range_spans_both_tokens() {
        let input: Arc<str> = Arc::from("a+b");
        let first = Token::from_slice(
            Arc::clone(&input),
            0,
            1,
            Some(SourceLocation::new(Arc::clone(&input), 0, 1)),
        );
        let last = Token::from_slice(
            Arc::clone(&input),
            2,
            3,
            Some(SourceLocation::new(Arc::clone(&input), 2, 3)),
        );
        let merged = first.range(last, "a+b");
        let loc = merged.and_then(|t| t.loc);
        assert_eq!(loc.as_ref().map(SourceLocation::start), Some(0));
        assert_eq!(loc.as_ref().map(SourceLocation::end), Some(3));
    }
}
