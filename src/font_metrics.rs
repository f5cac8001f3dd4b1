//! Font metrics: global layout constants and per-glyph extents.
//!
//! TeX carries three sets of layout constants, one per size class:
//! textstyle (sizes >= 9pt), scriptstyle (7-8pt), and scriptscriptstyle
//! (5-6pt). Those live in [`FONT_METRICS`]. Per-glyph extents come from a
//! compact static table per font family: a handful of exact exceptions
//! (delimiters, big operators, extensible pieces) over class-based
//! defaults, with a runtime override hook for custom fonts.

use phf::phf_map;

use crate::namespace::KeyMap;
use crate::types::{Mode, ParseError, ParseErrorKind};

/// Size-class index: 0 = textstyle, 1 = scriptstyle, 2 = scriptscriptstyle.
pub type FontSizeIndex = usize;

/// The global constants of one size class.
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    /// Slant per point, sigma 1.
    pub slant: f64,
    /// Interword space, sigma 2.
    pub space: f64,
    /// Interword stretch, sigma 3.
    pub stretch: f64,
    /// Interword shrink, sigma 4.
    pub shrink: f64,
    /// Height of a lowercase x, sigma 5.
    pub x_height: f64,
    /// Width of an em quad, sigma 6.
    pub quad: f64,
    /// Extra space after punctuation, sigma 7.
    pub extra_space: f64,
    /// Display-style numerator shift, sigma 8.
    pub num1: f64,
    /// Text-style numerator shift, sigma 9.
    pub num2: f64,
    /// Atop numerator shift, sigma 10.
    pub num3: f64,
    /// Display-style denominator shift, sigma 11.
    pub denom1: f64,
    /// Text-style denominator shift, sigma 12.
    pub denom2: f64,
    /// Display-style superscript shift, sigma 13.
    pub sup1: f64,
    /// Non-display superscript shift, sigma 14.
    pub sup2: f64,
    /// Cramped superscript shift, sigma 15.
    pub sup3: f64,
    /// Subscript shift with no superscript, sigma 16.
    pub sub1: f64,
    /// Subscript shift beside a superscript, sigma 17.
    pub sub2: f64,
    /// Superscript drop from a boxed nucleus, sigma 18.
    pub sup_drop: f64,
    /// Subscript drop from a boxed nucleus, sigma 19.
    pub sub_drop: f64,
    /// Display-style delimiter size, sigma 20.
    pub delim1: f64,
    /// Non-display delimiter size, sigma 21.
    pub delim2: f64,
    /// Height of the fraction axis above the baseline, sigma 22.
    pub axis_height: f64,
    /// Default fraction-bar and overline thickness, xi 8.
    pub default_rule_thickness: f64,
    /// Minimum clearance above a big operator's limit, xi 9.
    pub big_op_spacing1: f64,
    /// Minimum clearance below a big operator's limit, xi 10.
    pub big_op_spacing2: f64,
    /// Minimum baseline distance for limits, xi 11.
    pub big_op_spacing3: f64,
    /// Kern below a lower limit, xi 12.
    pub big_op_spacing4: f64,
    /// Padding above and below displayed limits, xi 13.
    pub big_op_spacing5: f64,
    /// Thickness of the surd rule.
    pub sqrt_rule_thickness: f64,
    /// Points per em at this size class.
    pub pt_per_em: f64,
    /// Space between double rules, as in `\begin{array}{||}`.
    pub double_rule_sep: f64,
    /// Width of an array rule.
    pub array_rule_width: f64,
    /// CSS ems per mu, `quad / 18`.
    pub css_em_per_mu: f64,
}

/// Global constants per size class: textstyle, scriptstyle,
/// scriptscriptstyle. The values come from the cmsy10/cmsy7/cmsy5 and
/// cmex10 font dimension tables.
pub static FONT_METRICS: [FontMetrics; 3] = [
    FontMetrics {
        slant: 0.250,
        space: 0.0,
        stretch: 0.0,
        shrink: 0.0,
        x_height: 0.431,
        quad: 1.000,
        extra_space: 0.0,
        num1: 0.677,
        num2: 0.394,
        num3: 0.444,
        denom1: 0.686,
        denom2: 0.345,
        sup1: 0.413,
        sup2: 0.363,
        sup3: 0.289,
        sub1: 0.150,
        sub2: 0.247,
        sup_drop: 0.386,
        sub_drop: 0.050,
        delim1: 2.390,
        delim2: 1.010,
        axis_height: 0.250,
        default_rule_thickness: 0.040,
        big_op_spacing1: 0.111,
        big_op_spacing2: 0.166,
        big_op_spacing3: 0.200,
        big_op_spacing4: 0.600,
        big_op_spacing5: 0.100,
        sqrt_rule_thickness: 0.040,
        pt_per_em: 10.0,
        double_rule_sep: 0.200,
        array_rule_width: 0.040,
        css_em_per_mu: 1.000 / 18.0,
    },
    FontMetrics {
        slant: 0.250,
        space: 0.0,
        stretch: 0.0,
        shrink: 0.0,
        x_height: 0.431,
        quad: 1.171,
        extra_space: 0.0,
        num1: 0.732,
        num2: 0.384,
        num3: 0.471,
        denom1: 0.752,
        denom2: 0.344,
        sup1: 0.503,
        sup2: 0.431,
        sup3: 0.286,
        sub1: 0.143,
        sub2: 0.286,
        sup_drop: 0.353,
        sub_drop: 0.071,
        delim1: 1.700,
        delim2: 1.157,
        axis_height: 0.250,
        default_rule_thickness: 0.049,
        big_op_spacing1: 0.111,
        big_op_spacing2: 0.166,
        big_op_spacing3: 0.200,
        big_op_spacing4: 0.611,
        big_op_spacing5: 0.143,
        sqrt_rule_thickness: 0.040,
        pt_per_em: 10.0,
        double_rule_sep: 0.200,
        array_rule_width: 0.040,
        css_em_per_mu: 1.171 / 18.0,
    },
    FontMetrics {
        slant: 0.250,
        space: 0.0,
        stretch: 0.0,
        shrink: 0.0,
        x_height: 0.431,
        quad: 1.472,
        extra_space: 0.0,
        num1: 0.925,
        num2: 0.387,
        num3: 0.504,
        denom1: 1.025,
        denom2: 0.532,
        sup1: 0.504,
        sup2: 0.404,
        sup3: 0.294,
        sub1: 0.200,
        sub2: 0.400,
        sup_drop: 0.494,
        sub_drop: 0.100,
        delim1: 1.980,
        delim2: 1.420,
        axis_height: 0.250,
        default_rule_thickness: 0.049,
        big_op_spacing1: 0.111,
        big_op_spacing2: 0.166,
        big_op_spacing3: 0.200,
        big_op_spacing4: 0.611,
        big_op_spacing5: 0.143,
        sqrt_rule_thickness: 0.040,
        pt_per_em: 10.0,
        double_rule_sep: 0.200,
        array_rule_width: 0.040,
        css_em_per_mu: 1.472 / 18.0,
    },
];

/// Extents of one glyph, in ems of its own font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterMetrics {
    /// Depth below the baseline.
    pub depth: f64,
    /// Height above the baseline.
    pub height: f64,
    /// Italic correction.
    pub italic: f64,
    /// Accent skew.
    pub skew: f64,
    /// Advance width.
    pub width: f64,
}

impl CharacterMetrics {
    /// Metrics in TFM order: depth, height, italic, skew, width.
    #[must_use]
    pub const fn new(depth: f64, height: f64, italic: f64, skew: f64, width: f64) -> Self {
        Self {
            depth,
            height,
            italic,
            skew,
            width,
        }
    }
}

/// Per-character metric overrides for one font family.
pub type MetricMap = KeyMap<u32, CharacterMetrics>;

/// Static description of one font family: exact exceptions over
/// class-based defaults.
struct FamilyMetrics {
    exceptions: &'static phf::Map<u32, CharacterMetrics>,
    /// Default height of a full-height glyph (capitals, digits, ascenders).
    ascent: f64,
    /// Default depth of a descender glyph.
    descent: f64,
    /// Default height of an x-height glyph.
    x_height: f64,
    /// Default advance width.
    width: f64,
    /// Default italic correction.
    italic: f64,
}

impl FamilyMetrics {
    /// Default extents of `ch` from its letter class.
    fn default_metric(&self, ch: u32) -> CharacterMetrics {
        let c = char::from_u32(ch);
        let (depth, height) = match c {
            Some('a'..='z') => {
                let depth = if matches!(c, Some('g' | 'j' | 'p' | 'q' | 'y')) {
                    self.descent
                } else {
                    0.0
                };
                let height = if matches!(c, Some('b' | 'd' | 'f' | 'h' | 'k' | 'l' | 't' | 'i')) {
                    self.ascent
                } else {
                    self.x_height
                };
                (depth, height)
            }
            Some('A'..='Z' | '0'..='9') => (0.0, self.ascent),
            Some(',' | ';') => (self.descent, self.x_height * 0.25),
            Some('.') => (0.0, self.x_height * 0.25),
            _ => (self.descent, self.ascent),
        };
        CharacterMetrics::new(depth, height, self.italic, 0.0, self.width)
    }
}

static NO_EXCEPTIONS: phf::Map<u32, CharacterMetrics> = phf_map! {};

/// Codepoints the class-based defaults speak for: ASCII, Latin-1 letters,
/// Greek, the math symbol blocks, and the mathematical alphanumerics.
/// Everything else goes through the substitution fallbacks.
const fn covered_codepoint(cp: u32) -> bool {
    matches!(cp,
        0x0021..=0x007E
        | 0x00A0..=0x00FF
        | 0x0391..=0x03C9
        | 0x03D1..=0x03F5
        | 0x2000..=0x2BFF
        | 0x1D400..=0x1D7FF
    )
}

/// Text-size delimiters and the symmetric binary/relation glyphs whose
/// extents the vertical layout depends on.
static MAIN_EXCEPTIONS: phf::Map<u32, CharacterMetrics> = phf_map! {
    0x28u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.389),   // (
    0x29u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.389),   // )
    0x5Bu32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.278),   // [
    0x5Du32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.278),   // ]
    0x7Bu32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.389),   // {
    0x7Du32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.389),   // }
    0x2Fu32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.5),     // /
    0x5Cu32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.5),     // \
    0x7Cu32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.278),   // |
    0x2016u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.5),   // ‖
    0x27E8u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.389), // ⟨
    0x27E9u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.389), // ⟩
    0x2308u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.444), // ⌈
    0x2309u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.444), // ⌉
    0x230Au32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.444), // ⌊
    0x230Bu32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.444), // ⌋
    0x2191u32 => CharacterMetrics::new(0.194, 0.694, 0.0, 0.0, 0.5), // ↑
    0x2193u32 => CharacterMetrics::new(0.194, 0.694, 0.0, 0.0, 0.5), // ↓
    0x2195u32 => CharacterMetrics::new(0.194, 0.694, 0.0, 0.0, 0.5), // ↕
    0x21D1u32 => CharacterMetrics::new(0.194, 0.694, 0.0, 0.0, 0.611), // ⇑
    0x21D3u32 => CharacterMetrics::new(0.194, 0.694, 0.0, 0.0, 0.611), // ⇓
    0x21D5u32 => CharacterMetrics::new(0.194, 0.694, 0.0, 0.0, 0.611), // ⇕
    0x2Bu32 => CharacterMetrics::new(0.083, 0.583, 0.0, 0.0, 0.778),   // +
    0x3Du32 => CharacterMetrics::new(-0.066, 0.366, 0.0, 0.0, 0.778),  // =
    0x2212u32 => CharacterMetrics::new(0.083, 0.583, 0.0, 0.0, 0.778), // −
    0xB1u32 => CharacterMetrics::new(0.083, 0.583, 0.0, 0.0, 0.778),   // ±
    0xD7u32 => CharacterMetrics::new(0.083, 0.583, 0.0, 0.0, 0.778),   // ×
    0xF7u32 => CharacterMetrics::new(0.083, 0.583, 0.0, 0.0, 0.778),   // ÷
    0x221Au32 => CharacterMetrics::new(0.35, 0.85, 0.0, 0.0, 0.833),   // √
    0x2026u32 => CharacterMetrics::new(0.0, 0.12, 0.0, 0.0, 1.172),    // …
    0x22EFu32 => CharacterMetrics::new(0.0, 0.43, 0.0, 0.0, 1.172),    // ⋯
    0x2032u32 => CharacterMetrics::new(0.0, 0.56, 0.0, 0.0, 0.275),    // ′
};

/// Size1 big operators (textstyle `\sum` and friends).
static SIZE1_EXCEPTIONS: phf::Map<u32, CharacterMetrics> = phf_map! {
    0x2211u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 1.056),   // ∑
    0x220Fu32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.944),   // ∏
    0x2210u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.944),   // ∐
    0x222Bu32 => CharacterMetrics::new(0.806, 1.306, 0.194, 0.0, 0.556), // ∫
    0x222Eu32 => CharacterMetrics::new(0.806, 1.306, 0.194, 0.0, 0.556), // ∮
    0x22C0u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.833),   // ⋀
    0x22C1u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.833),   // ⋁
    0x22C2u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.833),   // ⋂
    0x22C3u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.833),   // ⋃
    0x2A00u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.833),   // ⨀
    0x2A01u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.833),   // ⨁
    0x2A02u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.833),   // ⨂
    0x2A04u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.833),   // ⨄
    0x2A06u32 => CharacterMetrics::new(0.25, 0.75, 0.0, 0.0, 0.833),   // ⨆
    0x221Au32 => CharacterMetrics::new(0.35, 0.85, 0.0, 0.0, 1.0),     // √
};

/// Size2 big operators (displaystyle `\sum` and friends).
static SIZE2_EXCEPTIONS: phf::Map<u32, CharacterMetrics> = phf_map! {
    0x2211u32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.444),
    0x220Fu32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.278),
    0x2210u32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.278),
    0x222Bu32 => CharacterMetrics::new(1.111, 1.611, 0.444, 0.0, 1.056),
    0x222Eu32 => CharacterMetrics::new(1.111, 1.611, 0.444, 0.0, 1.056),
    0x22C0u32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.111),
    0x22C1u32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.111),
    0x22C2u32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.111),
    0x22C3u32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.111),
    0x2A00u32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.111),
    0x2A01u32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.111),
    0x2A02u32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.111),
    0x2A04u32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.111),
    0x2A06u32 => CharacterMetrics::new(0.555, 1.056, 0.0, 0.0, 1.111),
    0x221Au32 => CharacterMetrics::new(0.65, 1.15, 0.0, 0.0, 1.0),
};

/// Size4 extensible delimiter pieces used for stacked delimiters.
static SIZE4_EXCEPTIONS: phf::Map<u32, CharacterMetrics> = phf_map! {
    0x239Bu32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.875), // ⎛
    0x239Cu32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.875), // ⎜
    0x239Du32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.875), // ⎝
    0x239Eu32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.875), // ⎞
    0x239Fu32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.875), // ⎟
    0x23A0u32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.875), // ⎠
    0x23A1u32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.667), // ⎡
    0x23A2u32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.667), // ⎢
    0x23A3u32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.667), // ⎣
    0x23A4u32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.667), // ⎤
    0x23A5u32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.667), // ⎥
    0x23A6u32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.667), // ⎦
    0x23A7u32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.889), // ⎧
    0x23A8u32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.889), // ⎨
    0x23A9u32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.889), // ⎩
    0x23AAu32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.889), // ⎪
    0x23ACu32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.889), // ⎬
    0x23ADu32 => CharacterMetrics::new(0.2, 0.9, 0.0, 0.0, 0.889), // ⎭
    0x2223u32 => CharacterMetrics::new(0.3, 0.6, 0.0, 0.0, 0.333), // ∣
    0x2225u32 => CharacterMetrics::new(0.3, 0.6, 0.0, 0.0, 0.556), // ∥
};

const MAIN_FAMILY: FamilyMetrics = FamilyMetrics {
    exceptions: &MAIN_EXCEPTIONS,
    ascent: 0.683,
    descent: 0.194,
    x_height: 0.431,
    width: 0.5,
    italic: 0.0,
};

const MATH_FAMILY: FamilyMetrics = FamilyMetrics {
    exceptions: &MAIN_EXCEPTIONS,
    ascent: 0.683,
    descent: 0.194,
    x_height: 0.431,
    width: 0.57,
    italic: 0.05,
};

const fn plain_family(ascent: f64, descent: f64, width: f64) -> FamilyMetrics {
    FamilyMetrics {
        exceptions: &NO_EXCEPTIONS,
        ascent,
        descent,
        x_height: 0.431,
        width,
        italic: 0.0,
    }
}

const fn size_family(
    size: usize,
    width: f64,
    exceptions: &'static phf::Map<u32, CharacterMetrics>,
) -> FamilyMetrics {
    let extra = 0.3 * (size as f64 - 1.0);
    FamilyMetrics {
        exceptions,
        ascent: 0.85 + extra,
        descent: 0.35 + extra,
        x_height: 0.431,
        width,
        italic: 0.0,
    }
}

fn family_metrics(font_family: &str) -> Option<&'static FamilyMetrics> {
    static FAMILIES: phf::Map<&'static str, FamilyMetrics> = phf_map! {
        "Main-Regular" => MAIN_FAMILY,
        "Main-Bold" => FamilyMetrics { width: 0.56, ..MAIN_FAMILY },
        "Main-Italic" => FamilyMetrics { italic: 0.06, ..MAIN_FAMILY },
        "Main-BoldItalic" => FamilyMetrics { width: 0.56, italic: 0.06, ..MAIN_FAMILY },
        "Math-Italic" => MATH_FAMILY,
        "Math-BoldItalic" => FamilyMetrics { width: 0.62, ..MATH_FAMILY },
        "AMS-Regular" => plain_family(0.683, 0.194, 0.722),
        "Caligraphic-Regular" => plain_family(0.705, 0.194, 0.6),
        "Fraktur-Regular" => plain_family(0.69, 0.189, 0.53),
        "Script-Regular" => plain_family(0.717, 0.194, 0.65),
        "SansSerif-Regular" => plain_family(0.694, 0.194, 0.5),
        "SansSerif-Bold" => plain_family(0.694, 0.194, 0.55),
        "SansSerif-Italic" => plain_family(0.694, 0.194, 0.5),
        "Typewriter-Regular" => plain_family(0.611, 0.222, 0.525),
        "Size1-Regular" => size_family(1, 0.792, &SIZE1_EXCEPTIONS),
        "Size2-Regular" => size_family(2, 0.917, &SIZE2_EXCEPTIONS),
        "Size3-Regular" => size_family(3, 1.042, &NO_EXCEPTIONS),
        "Size4-Regular" => size_family(4, 1.167, &SIZE4_EXCEPTIONS),
    };
    FAMILIES.get(font_family)
}

/// Per-glyph metric provider: static family tables plus runtime overrides.
#[derive(Default)]
pub struct FontMetricsData {
    /// Custom font metrics added at runtime; consulted before the static
    /// tables so callers can override individual glyphs.
    pub custom: KeyMap<String, MetricMap>,
}

impl FontMetricsData {
    /// Metrics of `char_code` in `font_family`.
    ///
    /// Errors when the family is unknown; an unknown character in a known
    /// family falls back to its letter-class default.
    pub fn get_metric(
        &self,
        font_family: &str,
        char_code: u32,
    ) -> Result<Option<CharacterMetrics>, ParseError> {
        if let Some(custom_metrics) = self.custom.get(font_family) {
            if let Some(metrics) = custom_metrics.get(&char_code) {
                return Ok(Some(*metrics));
            }
        } else if family_metrics(font_family).is_none() {
            return Err(ParseError::new(ParseErrorKind::FontMetricsNotFound {
                font_family: font_family.to_owned(),
            }));
        }

        Ok(family_metrics(font_family).and_then(|family| {
            family.exceptions.get(&char_code).copied().or_else(|| {
                covered_codepoint(char_code).then(|| family.default_metric(char_code))
            })
        }))
    }

    /// Add or override metrics for one character of a font family.
    pub fn add_custom_metrics(
        &mut self,
        font_family: String,
        char_code: u32,
        metrics: CharacterMetrics,
    ) {
        self.custom
            .entry(font_family)
            .or_default()
            .insert(char_code, metrics);
    }
}

/// Substitutes for characters with no metrics of their own: rough Latin
/// look-alikes, preferring ascender forms so rules clear the glyph.
pub const EXTRA_CHARACTER_MAP: phf::Map<char, char> = phf_map! {
    // Latin-1
    '\u{c5}' => 'A',
    '\u{d0}' => 'D',
    '\u{de}' => 'o',
    '\u{e5}' => 'a',
    '\u{f0}' => 'd',
    '\u{fe}' => 'o',

    // Cyrillic
    '\u{410}' => 'A',
    '\u{411}' => 'B',
    '\u{412}' => 'B',
    '\u{413}' => 'F',
    '\u{414}' => 'A',
    '\u{415}' => 'E',
    '\u{416}' => 'K',
    '\u{417}' => '3',
    '\u{418}' => 'N',
    '\u{419}' => 'N',
    '\u{41a}' => 'K',
    '\u{41b}' => 'N',
    '\u{41c}' => 'M',
    '\u{41d}' => 'H',
    '\u{41e}' => 'O',
    '\u{41f}' => 'N',
    '\u{420}' => 'P',
    '\u{421}' => 'C',
    '\u{422}' => 'T',
    '\u{423}' => 'y',
    '\u{424}' => 'O',
    '\u{425}' => 'X',
    '\u{426}' => 'U',
    '\u{427}' => 'h',
    '\u{428}' => 'W',
    '\u{429}' => 'W',
    '\u{42a}' => 'B',
    '\u{42b}' => 'X',
    '\u{42c}' => 'B',
    '\u{42d}' => '3',
    '\u{42e}' => 'X',
    '\u{42f}' => 'R',
    '\u{430}' => 'a',
    '\u{431}' => 'b',
    '\u{432}' => 'a',
    '\u{433}' => 'r',
    '\u{434}' => 'y',
    '\u{435}' => 'e',
    '\u{436}' => 'm',
    '\u{437}' => 'e',
    '\u{438}' => 'n',
    '\u{439}' => 'n',
    '\u{43a}' => 'n',
    '\u{43b}' => 'n',
    '\u{43c}' => 'm',
    '\u{43d}' => 'n',
    '\u{43e}' => 'o',
    '\u{43f}' => 'n',
    '\u{440}' => 'p',
    '\u{441}' => 'c',
    '\u{442}' => 'o',
    '\u{443}' => 'y',
    '\u{444}' => 'b',
    '\u{445}' => 'x',
    '\u{446}' => 'n',
    '\u{447}' => 'n',
    '\u{448}' => 'w',
    '\u{449}' => 'w',
    '\u{44a}' => 'a',
    '\u{44b}' => 'm',
    '\u{44c}' => 'a',
    '\u{44d}' => 'e',
    '\u{44e}' => 'm',
    '\u{44f}' => 'r',
};

/// Look up the metrics of a character in a font, trying the character
/// itself, then its [`EXTRA_CHARACTER_MAP`] substitute, then (in text mode,
/// for supported scripts) the metrics of `M` as a stand-in.
pub fn get_character_metrics(
    ctx: &crate::context::EngineContext,
    character: char,
    font: &str,
    mode: Mode,
) -> Result<Option<CharacterMetrics>, ParseError> {
    let ch = character as u32;

    if let Some(metrics) = ctx.font_metrics.get_metric(font, ch)? {
        return Ok(Some(metrics));
    }

    if let Some(&replacement_char) = EXTRA_CHARACTER_MAP.get(&character)
        && let Some(metrics) = ctx.font_metrics.get_metric(font, replacement_char as u32)?
    {
        return Ok(Some(metrics));
    }

    if mode == Mode::Text && supported_codepoint(ch) {
        return ctx.font_metrics.get_metric(font, 'M' as u32);
    }

    Ok(None)
}

/// Whether a codepoint belongs to a script rendered with fallback metrics
/// in text mode.
#[must_use]
pub const fn supported_codepoint(cp: u32) -> bool {
    matches!(cp,
        0x0400..=0x04FF    // Cyrillic
        | 0x0531..=0x058F  // Armenian
        | 0x0900..=0x109F  // Brahmic scripts
        | 0x10A0..=0x10FF  // Georgian
        | 0x3000..=0x30FF  // CJK punctuation, kana
        | 0x4E00..=0x9FFF  // CJK ideographs
        | 0xAC00..=0xD7A3  // Hangul
        | 0xFF00..=0xFFEF  // Fullwidth forms
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_metrics_per_size_class() {
        assert!((FONT_METRICS[0].quad - 1.0).abs() < 1e-9);
        assert!((FONT_METRICS[1].quad - 1.171).abs() < 1e-9);
        assert!((FONT_METRICS[2].quad - 1.472).abs() < 1e-9);
        for m in &FONT_METRICS {
            assert!((m.css_em_per_mu - m.quad / 18.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_delimiter_exception_metrics() {
        let data = FontMetricsData::default();
        let paren = data.get_metric("Main-Regular", '(' as u32).unwrap().unwrap();
        assert!((paren.height - 0.75).abs() < 1e-9);
        assert!((paren.depth - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_size_fonts_grow_by_step() {
        let data = FontMetricsData::default();
        for (i, family) in ["Size1-Regular", "Size2-Regular", "Size3-Regular"]
            .iter()
            .enumerate()
        {
            let m = data.get_metric(family, '(' as u32).unwrap().unwrap();
            let expected = 0.85 + 0.3 * i as f64;
            assert!((m.height - expected).abs() < 1e-9, "{family}");
        }
    }

    #[test]
    fn test_letter_class_defaults() {
        let data = FontMetricsData::default();
        let x = data.get_metric("Main-Regular", 'x' as u32).unwrap().unwrap();
        assert!((x.height - 0.431).abs() < 1e-9);
        assert!(x.depth.abs() < 1e-9);
        let g = data.get_metric("Main-Regular", 'g' as u32).unwrap().unwrap();
        assert!((g.depth - 0.194).abs() < 1e-9);
    }

    #[test]
    fn test_uncovered_codepoint_has_no_direct_metrics() {
        let data = FontMetricsData::default();
        // Cyrillic goes through EXTRA_CHARACTER_MAP, not the defaults.
        assert!(data.get_metric("Main-Regular", 0x0410).unwrap().is_none());
    }

    #[test]
    fn test_unknown_family_errors() {
        let data = FontMetricsData::default();
        assert!(data.get_metric("Nonexistent-Regular", 65).is_err());
    }

    #[test]
    fn test_custom_metrics_override() {
        let mut data = FontMetricsData::default();
        data.add_custom_metrics(
            "Main-Regular".to_owned(),
            'x' as u32,
            CharacterMetrics::new(0.1, 0.2, 0.0, 0.0, 0.3),
        );
        let m = data.get_metric("Main-Regular", 'x' as u32).unwrap().unwrap();
        assert!((m.height - 0.2).abs() < 1e-9);
    }
}
