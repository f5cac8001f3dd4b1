//! The rendering context handed down the build recursion.
//!
//! An [`Options`] value carries the current style, size, color, and font.
//! It is immutable; entering a fraction numerator or a `\textbf` group
//! produces a new value through one of the `having_*`/`with_*` transforms.

use std::cmp;
use std::ptr;

use bon::bon;
use strum::Display;

use crate::font_metrics::{FONT_METRICS, FontMetrics, FontSizeIndex};
use crate::style::{Style, TEXT};

/// Font weight requested by `\textbf`/`\textmd`.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FontWeight {
    /// Bold.
    TextBf,
    /// Medium.
    TextMd,
    /// No change.
    #[strum(serialize = "")]
    Empty,
}

/// Font shape requested by `\textit`/`\textup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontShape {
    /// Italic.
    TextIt,
    /// Upright.
    TextUp,
    /// No change.
    Empty,
}

impl FontShape {
    /// The CSS class name of this shape.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TextIt => "textit",
            Self::TextUp => "textup",
            Self::Empty => "",
        }
    }
}

impl From<&str> for FontShape {
    fn from(s: &str) -> Self {
        match s {
            "textit" => Self::TextIt,
            "textup" => Self::TextUp,
            _ => Self::Empty,
        }
    }
}

/// For each user size, the effective size in [textstyle, scriptstyle,
/// scriptscriptstyle]. Taken from TeX with `\normalsize` at 10pt.
const SIZE_STYLE_MAP: [[usize; 3]; 11] = [
    [1, 1, 1],   // size1: [5, 5, 5]              \tiny
    [2, 1, 1],   // size2: [6, 5, 5]
    [3, 1, 1],   // size3: [7, 5, 5]              \scriptsize
    [4, 2, 1],   // size4: [8, 6, 5]              \footnotesize
    [5, 2, 1],   // size5: [9, 6, 5]              \small
    [6, 3, 1],   // size6: [10, 7, 5]             \normalsize
    [7, 4, 2],   // size7: [12, 8, 6]             \large
    [8, 6, 3],   // size8: [14.4, 10, 7]          \Large
    [9, 7, 6],   // size9: [17.28, 12, 10]        \LARGE
    [10, 8, 7],  // size10: [20.74, 14.4, 12]     \huge
    [11, 10, 9], // size11: [24.88, 20.74, 17.28] \HUGE
];

/// Scale factor of each user size relative to `\normalsize`.
pub const SIZE_MULTIPLIERS: [f64; 11] = [
    0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 1.2, 1.44, 1.728, 2.074, 2.488,
];

const fn size_at_style(size: usize, style: &Style) -> usize {
    if style.size < 2 {
        size
    } else {
        SIZE_STYLE_MAP[size - 1][style.size - 1]
    }
}

/// The build-time rendering context.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Current math style.
    pub style: &'static Style,
    /// Current color, if one applies.
    pub color: Option<String>,
    /// Effective size, style applied.
    pub size: usize,
    /// User-selected size, before style adjustment.
    pub text_size: usize,
    /// Inside a `\phantom`; content renders transparent.
    pub phantom: bool,
    /// Specific font, like `mathbf`.
    pub font: String,
    /// Text font family, like `SansSerif`.
    pub font_family: String,
    /// Text font weight.
    pub font_weight: FontWeight,
    /// Text font shape.
    pub font_shape: FontShape,
    /// Scale of the current size relative to `\normalsize`.
    pub size_multiplier: f64,
    /// Ceiling for computed lengths, from the settings.
    pub max_size: f64,
    /// Floor for rule thickness, from the settings.
    pub min_rule_thickness: f64,
}

#[bon]
impl Options {
    /// Create an options value; `size_multiplier` is derived from `size`.
    #[builder]
    pub fn new(
        style: &'static Style,
        color: Option<String>,
        size: Option<usize>,
        text_size: Option<usize>,
        phantom: Option<bool>,
        font: Option<String>,
        font_family: Option<String>,
        font_weight: Option<FontWeight>,
        font_shape: Option<FontShape>,
        max_size: f64,
        min_rule_thickness: f64,
    ) -> Self {
        let size = size.unwrap_or(Self::BASESIZE);
        let multiplier_idx = cmp::min(size, SIZE_MULTIPLIERS.len());
        Self {
            style,
            color,
            size,
            text_size: text_size.unwrap_or(size),
            phantom: phantom.unwrap_or(false),
            font: font.unwrap_or_default(),
            font_family: font_family.unwrap_or_default(),
            font_weight: font_weight.unwrap_or(FontWeight::Empty),
            font_shape: font_shape.unwrap_or(FontShape::Empty),
            size_multiplier: SIZE_MULTIPLIERS[multiplier_idx - 1],
            max_size,
            min_rule_thickness,
        }
    }
}

impl Options {
    /// Size index of `\normalsize`.
    pub const BASESIZE: usize = 6;

    /// This options object at the given style, resizing as needed.
    #[must_use]
    pub fn having_style(&self, style: &'static Style) -> Self {
        if ptr::eq(self.style, style) {
            self.clone()
        } else {
            let size = size_at_style(self.text_size, style);
            let mut next = self.clone();
            next.style = style;
            next.size = size;
            next.size_multiplier = SIZE_MULTIPLIERS[size - 1];
            next
        }
    }

    /// This options object with the cramped variant of the current style.
    #[must_use]
    pub fn having_cramped_style(&self) -> Self {
        self.having_style(self.style.cramp())
    }

    /// This options object at the given size, in at least `\textstyle`.
    #[must_use]
    pub fn having_size(&self, size: usize) -> Self {
        if self.size == size && self.text_size == size {
            self.clone()
        } else {
            let mut next = self.clone();
            next.style = TEXT;
            next.size = size;
            next.text_size = size;
            next.size_multiplier = SIZE_MULTIPLIERS[size - 1];
            next
        }
    }

    /// Like `having_size(BASESIZE)` followed by `having_style(style)`; an
    /// omitted style means at least `\textstyle`.
    #[must_use]
    pub fn having_base_style(&self, style: Option<&'static Style>) -> Self {
        let style = style.unwrap_or_else(|| self.style.text());
        let want_size = size_at_style(Self::BASESIZE, style);

        if self.size == want_size && self.text_size == Self::BASESIZE && self.style == style {
            self.clone()
        } else {
            let mut next = self.clone();
            next.style = style;
            next.size = want_size;
            next.size_multiplier = SIZE_MULTIPLIERS[want_size - 1];
            next
        }
    }

    /// Remove the effect of sizing commands such as `\Huge`, keeping the
    /// effect of the current style such as `\scriptstyle`.
    #[must_use]
    pub fn having_base_sizing(&self) -> Self {
        let size = match self.style.id {
            4 | 5 => 3, // normalsize in scriptstyle
            6 | 7 => 1, // normalsize in scriptscriptstyle
            _ => 6,     // normalsize in textstyle or displaystyle
        };

        let mut next = self.clone();
        next.style = self.style.text();
        next.size = size;
        next.size_multiplier = SIZE_MULTIPLIERS[size - 1];
        next
    }

    /// This options object with the given color.
    #[must_use]
    pub fn with_color(&self, color: String) -> Self {
        let mut next = self.clone();
        next.color = Some(color);
        next
    }

    /// This options object inside a phantom.
    #[must_use]
    pub fn with_phantom(&self) -> Self {
        let mut next = self.clone();
        next.phantom = true;
        next
    }

    /// This options object with the given math font.
    #[must_use]
    pub fn with_font(&self, font: String) -> Self {
        let mut next = self.clone();
        next.font = font;
        next
    }

    /// This options object with the given text font family. Clears any math
    /// font.
    #[must_use]
    pub fn with_text_font_family(&self, font_family: String) -> Self {
        let mut next = self.clone();
        next.font_family = font_family;
        next.font = String::new();
        next
    }

    /// This options object with the given text font weight. Clears any math
    /// font.
    #[must_use]
    pub fn with_text_font_weight(&self, font_weight: FontWeight) -> Self {
        let mut next = self.clone();
        next.font_weight = font_weight;
        next.font = String::new();
        next
    }

    /// This options object with the given text font shape. Clears any math
    /// font.
    #[must_use]
    pub fn with_text_font_shape(&self, font_shape: FontShape) -> Self {
        let mut next = self.clone();
        next.font_shape = font_shape;
        next.font = String::new();
        next
    }

    /// CSS classes switching the font size from `old_options` to `self`.
    #[must_use]
    pub fn sizing_classes(&self, old_options: &Self) -> Vec<String> {
        if old_options.size == self.size {
            vec![]
        } else {
            vec![
                "sizing".to_owned(),
                format!("reset-size{}", old_options.size),
                format!("size{}", self.size),
            ]
        }
    }

    /// CSS classes switching from this size back to the base size.
    #[must_use]
    pub fn base_sizing_classes(&self) -> Vec<String> {
        if self.size == Self::BASESIZE {
            vec![]
        } else {
            vec![
                "sizing".to_owned(),
                format!("reset-size{}", self.size),
                format!("size{}", Self::BASESIZE),
            ]
        }
    }

    /// Effective CSS color; phantom content is transparent.
    #[must_use]
    pub fn get_color(&self) -> Option<String> {
        if self.phantom {
            Some("transparent".to_owned())
        } else {
            self.color.clone()
        }
    }

    /// The global font metrics of the current size class.
    #[must_use]
    pub const fn font_metrics(&self) -> &'static FontMetrics {
        let size_index: FontSizeIndex = if self.size >= 5 {
            0
        } else if self.size >= 3 {
            1
        } else {
            2
        };

        &FONT_METRICS[size_index]
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            style: TEXT,
            color: None,
            size: Self::BASESIZE,
            text_size: Self::BASESIZE,
            phantom: false,
            font: String::new(),
            font_family: String::new(),
            font_weight: FontWeight::Empty,
            font_shape: FontShape::Empty,
            size_multiplier: SIZE_MULTIPLIERS[Self::BASESIZE - 1],
            max_size: 1000.0,
            min_rule_thickness: 0.04,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{DISPLAY, SCRIPT, SCRIPTSCRIPT};

    #[test]
    fn test_size_at_style() {
        assert_eq!(size_at_style(6, DISPLAY), 6);
        assert_eq!(size_at_style(6, SCRIPT), 3);
        assert_eq!(size_at_style(6, SCRIPTSCRIPT), 1);
    }

    #[test]
    fn test_having_style_resizes_scripts() {
        let opts = Options::default();
        let script = opts.having_style(SCRIPT);
        assert_eq!(script.size, 3);
        assert!((script.size_multiplier - 0.7).abs() < 1e-9);
        // text_size is preserved so styles can be undone
        assert_eq!(script.text_size, Options::BASESIZE);
        let back = script.having_style(TEXT);
        assert_eq!(back.size, Options::BASESIZE);
    }

    #[test]
    fn test_having_size_forces_textstyle() {
        let opts = Options::default().having_style(DISPLAY);
        let sized = opts.having_size(8);
        assert_eq!(sized.style, TEXT);
        assert_eq!(sized.size, 8);
        assert!((sized.size_multiplier - 1.44).abs() < 1e-9);
    }

    #[test]
    fn test_sizing_classes() {
        let base = Options::default();
        let large = base.having_size(8);
        assert_eq!(large.sizing_classes(&base), vec![
            "sizing", "reset-size6", "size8"
        ]);
        assert!(base.sizing_classes(&base).is_empty());
        assert_eq!(large.base_sizing_classes(), vec![
            "sizing", "reset-size8", "size6"
        ]);
    }

    #[test]
    fn test_phantom_color_is_transparent() {
        let opts = Options::default().with_color("red".to_owned());
        assert_eq!(opts.get_color(), Some("red".to_owned()));
        assert_eq!(opts.with_phantom().get_color(), Some("transparent".to_owned()));
    }

    #[test]
    fn test_font_metrics_follow_size_class() {
        let opts = Options::default();
        assert!((opts.font_metrics().quad - 1.0).abs() < 1e-9);
        let script = opts.having_style(SCRIPT);
        assert!((script.font_metrics().quad - 1.171).abs() < 1e-9);
    }
}
