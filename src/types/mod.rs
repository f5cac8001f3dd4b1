//! Core type definitions shared across the engine.

use std::fmt;
use std::rc::Rc;

use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, FromRepr};

mod parse_error;
mod settings;
mod source_location;
mod tokens;

pub use parse_error::{ErrorCategory, ErrorLocationProvider, ParseError, ParseErrorKind};
pub use settings::{
    OutputFormat, Settings, StrictFunction, StrictMode, StrictReturn, StrictSetting, TrustContext,
    TrustFunction, TrustSetting,
};
pub use source_location::{LexerInterface, SourceLocation, SourceRangeRef};
pub use tokens::{Token, TokenText};

/// Parsing/rendering mode: math notation or embedded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Mathematical notation.
    Math,
    /// Text content inside `\text{...}` and friends.
    Text,
}

/// CSS property names emitted by the box-tree serializer, in kebab-case.
#[derive(
    EnumIter, Debug, Copy, AsRefStr, PartialEq, Eq, Hash, Clone, Display, EnumCount, FromRepr,
)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
#[allow(missing_docs)]
pub enum CssProperty {
    BorderBottomWidth,
    BorderColor,
    BorderRightStyle,
    BorderRightWidth,
    BorderTopWidth,
    Bottom,
    Color,
    Height,
    Left,
    Margin,
    MarginLeft,
    MarginRight,
    MarginTop,
    MinWidth,
    PaddingLeft,
    Position,
    Top,
    Width,
    VerticalAlign,
}

/// A compact inline-style map keyed by [`CssProperty`].
#[derive(Clone, PartialEq, Eq, Default)]
pub struct CssStyle {
    map: [Option<Rc<str>>; CssProperty::COUNT],
}

impl fmt::Debug for CssStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("CssStyle");
        for (property, value) in self {
            ds.field(property.as_ref(), &value);
        }
        ds.finish()
    }
}

/// Iterator over the populated properties of a [`CssStyle`].
pub struct CssStyleIter<'a> {
    index: usize,
    data: &'a [Option<Rc<str>>; CssProperty::COUNT],
}

impl<'a> Iterator for CssStyleIter<'a> {
    type Item = (CssProperty, &'a str);
    fn next(&mut self) -> Option<Self::Item> {
        while self.index < CssProperty::COUNT {
            let idx = self.index;
            self.index += 1;
            if let Some(v) = &self.data[idx]
                && let Some(prop) = CssProperty::from_repr(idx as u8)
            {
                return Some((prop, v.as_ref()));
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a CssStyle {
    type Item = (CssProperty, &'a str);
    type IntoIter = CssStyleIter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        CssStyleIter {
            index: 0,
            data: &self.map,
        }
    }
}

impl CssStyle {
    /// Insert or replace a property.
    #[inline]
    pub fn insert<T>(&mut self, property: CssProperty, value: T)
    where
        T: Into<Rc<str>>,
    {
        self.map[property as usize] = Some(value.into());
    }

    /// Copy every populated property of `other` over this style.
    pub fn extend(&mut self, other: &Self) {
        for (i, value) in other.map.iter().enumerate() {
            if let Some(value) = value {
                self.map[i] = Some(Rc::clone(value));
            }
        }
    }

    /// Whether the property is set.
    #[must_use]
    pub const fn contains_key(&self, property: CssProperty) -> bool {
        self.map[property as usize].is_some()
    }

    /// Value of a property, if set.
    #[must_use]
    pub fn get(&self, property: CssProperty) -> Option<&str> {
        self.map[property as usize].as_deref()
    }

    /// Whether no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.iter().all(Option::is_none)
    }

    /// Iterate over the populated properties.
    #[must_use]
    pub fn iter(&self) -> CssStyleIter<'_> {
        self.into_iter()
    }
}

/// Declared argument types of registered functions.
///
/// The parser dispatches on these when consuming a function's arguments;
/// each type has its own group-parsing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    /// A color specification (`\color{red}`).
    Color,
    /// A length with unit (`\kern{1em}`).
    Size,
    /// A URL, subject to trust validation.
    Url,
    /// A raw string consumed without expansion.
    Raw,
    /// Parse in whatever mode the parser is currently in.
    Original,
    /// A horizontal box (text-style layout inside math).
    Hbox,
    /// A single primitive token or function (`\sqrt` as `\def` target).
    Primitive,
    /// Parse in the given fixed mode.
    Mode(Mode),
}

/// Tokens that terminate a parsing context.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, AsRefStr)]
pub enum BreakToken {
    /// `]` terminates optional-argument groups.
    #[strum(serialize = "]")]
    RightBracket,
    /// `}` terminates brace groups.
    #[strum(serialize = "}")]
    RightBrace,
    /// `\endgroup` terminates semisimple groups.
    #[strum(serialize = "\\endgroup")]
    EndGroup,
    /// `\\` terminates table rows.
    #[strum(serialize = "\\\\")]
    DoubleBackslash,
    /// `\end` terminates environments.
    #[strum(serialize = "\\end")]
    End,
    /// `\)` terminates inline math opened with `\(`.
    #[strum(serialize = "\\)")]
    RightParen,
    /// `$` terminates inline math opened with `$`.
    #[strum(serialize = "$")]
    Dollar,
    /// End of input.
    #[strum(serialize = "EOF")]
    Eof,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_style_round_trip() {
        let mut style = CssStyle::default();
        assert!(style.is_empty());
        style.insert(CssProperty::Height, "1.2em");
        style.insert(CssProperty::MarginLeft, "-0.1em");
        assert_eq!(style.get(CssProperty::Height), Some("1.2em"));
        assert!(style.contains_key(CssProperty::MarginLeft));
        assert_eq!(style.iter().count(), 2);
    }

    #[test]
    fn test_css_property_serializes_kebab_case() {
        assert_eq!(CssProperty::VerticalAlign.as_ref(), "vertical-align");
        assert_eq!(CssProperty::BorderBottomWidth.as_ref(), "border-bottom-width");
    }
}
