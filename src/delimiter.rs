//! Delimiter sizing and construction.
//!
//! Delimiters come in four renditions, tried in order of height: the
//! text-size glyph restyled, the Size1 to Size4 font glyphs, and a stack
//! of extensible pieces from the Size4 font. The surd gets an SVG image
//! instead so its vinculum can extend to any width.

use phf::{Set, phf_set};

use crate::build_common::{
    VListChild, VListElem, VListKern, VListParam, lookup_symbol, make_span, make_svg_span,
    make_symbol, make_v_list,
};
use crate::context::EngineContext;
use crate::dom_tree::{DomSpan, HtmlDomNode, PathNode, SvgChildNode, SvgNode, SymbolNode};
use crate::font_metrics::CharacterMetrics;
use crate::namespace::KeyMap;
use crate::options::Options;
use crate::style::{SCRIPT, SCRIPTSCRIPT, Style, TEXT};
use crate::svg_geometry::sqrt_path;
use crate::types::{CssProperty, Mode, ParseError, ParseErrorKind};
use crate::units::make_em;

const SIZE_TO_MAX_HEIGHT: [f64; 5] = [0.0, 1.2, 1.8, 2.4, 3.0];

/// Tallest expression each `\big`-family size index covers, in ems.
#[must_use]
pub fn size_to_max_height(size: usize) -> f64 {
    SIZE_TO_MAX_HEIGHT[size.min(SIZE_TO_MAX_HEIGHT.len() - 1)]
}

/// Padding above the surd vinculum, in SVG units.
const VB_PAD: f64 = 80.0;

/// Padding above the surd, in ems.
const EM_PAD: f64 = 0.08;

/// Overlap between stacked pieces, in ems.
const LAP_IN_EMS: f64 = 0.008;

/// One rendition a delimiter can take.
#[derive(Debug, Clone)]
pub enum DelimiterType {
    /// Text-size glyph restyled to the given style.
    Small(&'static Style),
    /// Glyph from the Size1 to Size4 fonts.
    Large(usize),
    /// Stack of extensible pieces, for arbitrary heights.
    Stack,
}

/// A sized surd image plus the measurements its caller lays out with.
#[derive(Debug)]
pub struct SqrtImageResult {
    /// The span holding the surd SVG.
    pub span: DomSpan,
    /// Thickness of the vinculum, in ems.
    pub rule_width: f64,
    /// Horizontal advance of the surd glyph, in ems.
    pub advance_width: f64,
}

/// Metrics of a delimiter symbol in a font, after table replacement.
fn get_metrics(
    ctx: &EngineContext,
    symbol: &str,
    font: &str,
    mode: Mode,
) -> Result<CharacterMetrics, ParseError> {
    let replace = ctx
        .symbols
        .get(Mode::Math, symbol)
        .and_then(|info| info.replace);
    let mut buf = [0u8; 4];
    let symbol = replace.map_or(symbol, |ch| ch.encode_utf8(&mut buf));

    if let Some(look_up) = lookup_symbol(ctx, symbol, font, mode)?
        && let Some(metrics) = look_up.metrics
    {
        Ok(metrics)
    } else {
        Err(ParseError::new(ParseErrorKind::UnsupportedSymbolFont {
            symbol: symbol.to_owned(),
            font: font.to_owned(),
        }))
    }
}

/// Puts a delimiter in a given style, scaling its extents accordingly.
fn style_wrap(
    delim: HtmlDomNode,
    to_style: &'static Style,
    options: &Options,
    classes: &[String],
) -> DomSpan {
    let new_options = options.having_base_style(Some(to_style));
    let mut span = make_span(
        classes
            .iter()
            .cloned()
            .chain(new_options.sizing_classes(options))
            .collect::<Vec<_>>(),
        vec![delim],
        Some(options),
        None,
    );

    let multiplier = new_options.size_multiplier / options.size_multiplier;
    span.height *= multiplier;
    span.depth *= multiplier;
    span.max_font_size = new_options.size_multiplier;

    span
}

/// Shifts a delimiter span so it is vertically centered on the axis.
fn center_span(span: &DomSpan, options: &Options, style: &'static Style) -> DomSpan {
    let new_options = options.having_base_style(Some(style));
    let shift = (1.0 - options.size_multiplier / new_options.size_multiplier)
        * options.font_metrics().axis_height;

    let mut span = span.clone();
    span.classes.push("delimcenter".to_owned());
    span.height -= shift;
    span.depth += shift;
    span.style.insert(CssProperty::Top, make_em(shift));
    span
}

/// Makes a delimiter from the Main-Regular glyph, restyled to textstyle,
/// scriptstyle, or scriptscriptstyle.
pub fn make_small_delim(
    ctx: &EngineContext,
    delim: &str,
    style: &'static Style,
    center: bool,
    options: &Options,
    mode: Mode,
    classes: &[String],
) -> Result<DomSpan, ParseError> {
    let text = make_symbol(
        ctx,
        delim,
        "Main-Regular",
        mode,
        Some(options),
        Some(classes),
    )?;
    let mut span = style_wrap(text.into(), style, options, classes);

    if center {
        span = center_span(&span, options, TEXT);
    }

    Ok(span)
}

fn mathrm_size(
    ctx: &EngineContext,
    value: &str,
    size: usize,
    mode: Mode,
    options: &Options,
) -> Result<SymbolNode, ParseError> {
    let font_name = format!("Size{size}-Regular");
    make_symbol(ctx, value, &font_name, mode, Some(options), None)
}

/// Makes a delimiter from the Size1 to Size4 fonts, always in textstyle.
pub fn make_large_delim(
    ctx: &EngineContext,
    delim: &str,
    size: usize,
    center: bool,
    options: &Options,
    mode: Mode,
    classes: &[String],
) -> Result<DomSpan, ParseError> {
    let inner = mathrm_size(ctx, delim, size, mode, options)?;
    let mut span = style_wrap(
        make_span(
            vec!["delimsizing".to_owned(), format!("size{size}")],
            vec![inner.into()],
            Some(options),
            None,
        )
        .into(),
        TEXT,
        options,
        classes,
    );

    if center {
        span = center_span(&span, options, TEXT);
    }

    Ok(span)
}

/// Makes one piece of a stacked delimiter, at its font's natural size.
fn make_glyph_span(
    ctx: &EngineContext,
    symbol: &str,
    font: &str,
    mode: Mode,
) -> Result<VListChild, ParseError> {
    let size_class = if font == "Size1-Regular" {
        "delim-size1"
    } else {
        "delim-size4"
    };

    let corner = make_span(
        vec!["delimsizinginner".to_owned(), size_class.to_owned()],
        vec![
            make_span(
                vec![],
                vec![make_symbol(ctx, symbol, font, mode, None, None)?.into()],
                None,
                None,
            )
            .into(),
        ],
        None,
        None,
    );

    Ok(VListElem::builder().elem(corner.into()).build().into())
}

/// The extensible pieces a delimiter stacks from.
struct StackedParts {
    top: &'static str,
    middle: Option<&'static str>,
    repeat: &'static str,
    bottom: &'static str,
    font: &'static str,
}

fn stacked_parts(delim: &str) -> StackedParts {
    let mut parts = StackedParts {
        top: "",
        middle: None,
        repeat: "",
        bottom: "",
        font: "Size1-Regular",
    };

    match delim {
        "\\uparrow" => {
            parts.top = "\\uparrow";
            parts.repeat = "\u{23d0}";
            parts.bottom = "\u{23d0}";
        }
        "\\Uparrow" => {
            parts.top = "\\Uparrow";
            parts.repeat = "\u{2016}";
            parts.bottom = "\u{2016}";
        }
        "\\downarrow" => {
            parts.top = "\u{23d0}";
            parts.repeat = "\u{23d0}";
            parts.bottom = "\\downarrow";
        }
        "\\Downarrow" => {
            parts.top = "\u{2016}";
            parts.repeat = "\u{2016}";
            parts.bottom = "\\Downarrow";
        }
        "\\updownarrow" => {
            parts.top = "\\uparrow";
            parts.repeat = "\u{23d0}";
            parts.bottom = "\\downarrow";
        }
        "\\Updownarrow" => {
            parts.top = "\\Uparrow";
            parts.repeat = "\u{2016}";
            parts.bottom = "\\Downarrow";
        }
        "|" | "\\lvert" | "\\rvert" | "\\vert" => {
            parts.top = "\u{2223}";
            parts.repeat = "\u{2223}";
            parts.bottom = "\u{2223}";
            parts.font = "Size4-Regular";
        }
        "\\|" | "\\lVert" | "\\rVert" | "\\Vert" => {
            parts.top = "\u{2225}";
            parts.repeat = "\u{2225}";
            parts.bottom = "\u{2225}";
            parts.font = "Size4-Regular";
        }
        "[" | "\\lbrack" => {
            parts.top = "\u{23a1}";
            parts.repeat = "\u{23a2}";
            parts.bottom = "\u{23a3}";
            parts.font = "Size4-Regular";
        }
        "]" | "\\rbrack" => {
            parts.top = "\u{23a4}";
            parts.repeat = "\u{23a5}";
            parts.bottom = "\u{23a6}";
            parts.font = "Size4-Regular";
        }
        "\\lfloor" | "\u{230a}" => {
            parts.top = "\u{23a2}";
            parts.repeat = "\u{23a2}";
            parts.bottom = "\u{23a3}";
            parts.font = "Size4-Regular";
        }
        "\\lceil" | "\u{2308}" => {
            parts.top = "\u{23a1}";
            parts.repeat = "\u{23a2}";
            parts.bottom = "\u{23a2}";
            parts.font = "Size4-Regular";
        }
        "\\rfloor" | "\u{230b}" => {
            parts.top = "\u{23a5}";
            parts.repeat = "\u{23a5}";
            parts.bottom = "\u{23a6}";
            parts.font = "Size4-Regular";
        }
        "\\rceil" | "\u{2309}" => {
            parts.top = "\u{23a4}";
            parts.repeat = "\u{23a5}";
            parts.bottom = "\u{23a5}";
            parts.font = "Size4-Regular";
        }
        "(" | "\\lparen" => {
            parts.top = "\u{239b}";
            parts.repeat = "\u{239c}";
            parts.bottom = "\u{239d}";
            parts.font = "Size4-Regular";
        }
        ")" | "\\rparen" => {
            parts.top = "\u{239e}";
            parts.repeat = "\u{239f}";
            parts.bottom = "\u{23a0}";
            parts.font = "Size4-Regular";
        }
        "\\{" | "\\lbrace" => {
            parts.top = "\u{23a7}";
            parts.middle = Some("\u{23a8}");
            parts.repeat = "\u{23aa}";
            parts.bottom = "\u{23a9}";
            parts.font = "Size4-Regular";
        }
        "\\}" | "\\rbrace" => {
            parts.top = "\u{23ab}";
            parts.middle = Some("\u{23ac}");
            parts.repeat = "\u{23aa}";
            parts.bottom = "\u{23ad}";
            parts.font = "Size4-Regular";
        }
        "\\lgroup" | "\u{27ee}" => {
            parts.top = "\u{23a7}";
            parts.repeat = "\u{23aa}";
            parts.bottom = "\u{23a9}";
            parts.font = "Size4-Regular";
        }
        "\\rgroup" | "\u{27ef}" => {
            parts.top = "\u{23ab}";
            parts.repeat = "\u{23aa}";
            parts.bottom = "\u{23ad}";
            parts.font = "Size4-Regular";
        }
        "\\lmoustache" | "\u{23b0}" => {
            parts.top = "\u{23a7}";
            parts.repeat = "\u{23aa}";
            parts.bottom = "\u{23ad}";
            parts.font = "Size4-Regular";
        }
        "\\rmoustache" | "\u{23b1}" => {
            parts.top = "\u{23ab}";
            parts.repeat = "\u{23aa}";
            parts.bottom = "\u{23a9}";
            parts.font = "Size4-Regular";
        }
        _ => {}
    }

    parts
}

/// Makes a stacked delimiter of at least `height_total` ems out of
/// extensible pieces, following the construction on page 442 of the
/// TeXbook: a top, a bottom, an optional middle, and a repeated section.
pub fn make_stacked_delim(
    ctx: &EngineContext,
    delim: &str,
    height_total: f64,
    center: bool,
    options: &Options,
    mode: Mode,
    classes: &[String],
) -> Result<DomSpan, ParseError> {
    let parts = stacked_parts(delim);
    let top = if parts.top.is_empty() { delim } else { parts.top };
    let repeat = if parts.repeat.is_empty() {
        delim
    } else {
        parts.repeat
    };
    let bottom = if parts.bottom.is_empty() {
        delim
    } else {
        parts.bottom
    };
    let middle = parts.middle;
    let font = parts.font;

    let top_metrics = get_metrics(ctx, top, font, mode)?;
    let top_height_total = top_metrics.height + top_metrics.depth;

    let repeat_metrics = get_metrics(ctx, repeat, font, mode)?;
    let repeat_height_total = repeat_metrics.height + repeat_metrics.depth;

    let bottom_metrics = get_metrics(ctx, bottom, font, mode)?;
    let bottom_height_total = bottom_metrics.height + bottom_metrics.depth;

    let mut middle_height_total = 0.0;
    let middle_factor = if let Some(middle_sym) = middle {
        let middle_metrics = get_metrics(ctx, middle_sym, font, mode)?;
        middle_height_total = middle_metrics.height + middle_metrics.depth;
        // Repeats go symmetrically above and below the middle.
        2.0
    } else {
        1.0
    };

    let minimal_height = top_height_total + bottom_height_total + middle_height_total;

    let delta = (height_total - minimal_height) / (middle_factor * repeat_height_total);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let repeat_count = delta.ceil().max(0.0) as usize;

    let real_height_total =
        (repeat_count as f64 * middle_factor).mul_add(repeat_height_total, minimal_height);

    let axis_height = options.font_metrics().axis_height;
    let adjusted_axis = if center {
        axis_height * options.size_multiplier
    } else {
        axis_height
    };
    let depth = real_height_total / 2.0 - adjusted_axis;

    // Build bottom-up, lapping each piece slightly into the previous one
    // so no hairline gaps show between them.
    let mut stack: Vec<VListChild> = Vec::new();
    stack.push(make_glyph_span(ctx, bottom, font, mode)?);

    if let Some(middle_sym) = middle {
        for _ in 0..repeat_count {
            stack.push(VListChild::Kern(VListKern { size: -LAP_IN_EMS }));
            stack.push(make_glyph_span(ctx, repeat, font, mode)?);
        }
        stack.push(VListChild::Kern(VListKern { size: -LAP_IN_EMS }));
        stack.push(make_glyph_span(ctx, middle_sym, font, mode)?);
        for _ in 0..repeat_count {
            stack.push(VListChild::Kern(VListKern { size: -LAP_IN_EMS }));
            stack.push(make_glyph_span(ctx, repeat, font, mode)?);
        }
    } else {
        for _ in 0..repeat_count {
            stack.push(VListChild::Kern(VListKern { size: -LAP_IN_EMS }));
            stack.push(make_glyph_span(ctx, repeat, font, mode)?);
        }
    }

    stack.push(VListChild::Kern(VListKern { size: -LAP_IN_EMS }));
    stack.push(make_glyph_span(ctx, top, font, mode)?);

    let new_options = options.having_base_style(Some(TEXT));
    let inner = make_v_list(
        VListParam::Bottom {
            position_data: depth,
            children: stack,
        },
        &new_options,
    )?;

    Ok(style_wrap(
        make_span(
            vec!["delimsizing".to_owned(), "mult".to_owned()],
            vec![inner.into()],
            Some(&new_options),
            None,
        )
        .into(),
        TEXT,
        options,
        classes,
    ))
}

/// Makes a surd image covering at least the given height.
pub fn make_sqrt_image(
    ctx: &EngineContext,
    height: f64,
    options: &Options,
) -> Result<SqrtImageResult, ParseError> {
    // Remove the effect of size changes such as \Huge before picking the
    // surd rendition.
    let new_options = options.having_base_sizing();

    let delimiter_type = traverse_sequence(
        ctx,
        "\\surd",
        height * new_options.size_multiplier,
        STACK_LARGE_DELIMITER_SEQUENCE,
        &new_options,
    )?;

    let mut size_multiplier = new_options.size_multiplier;

    // The surd images carry a 0.04em thick vinculum; thicken it when the
    // settings ask for more.
    let extra_vinculum =
        (options.min_rule_thickness - options.font_metrics().sqrt_rule_thickness).max(0.0);

    let span_height;
    let tex_height;
    let view_box_height;
    let advance_width;

    let mut span = match delimiter_type {
        DelimiterType::Small(_style) => {
            // Image derived from glyph U+221A at text size.
            view_box_height = 1000.0f64.mul_add(extra_vinculum, 1000.0) + VB_PAD;
            if height < 1.0 {
                size_multiplier = 1.0; // mimic a \textfont radical
            } else if height < 1.4 {
                size_multiplier = 0.7; // mimic a \scriptfont radical
            }
            span_height = (1.0 + extra_vinculum + EM_PAD) / size_multiplier;
            tex_height = (1.0 + extra_vinculum) / size_multiplier;
            advance_width = 0.833 / size_multiplier; // from the font

            sqrt_svg("sqrtMain", span_height, view_box_height, extra_vinculum, options)
        }
        DelimiterType::Large(size) => {
            view_box_height = (1000.0 + VB_PAD) * SIZE_TO_MAX_HEIGHT[*size];
            tex_height = (SIZE_TO_MAX_HEIGHT[*size] + extra_vinculum) / size_multiplier;
            span_height = (SIZE_TO_MAX_HEIGHT[*size] + extra_vinculum + EM_PAD) / size_multiplier;
            advance_width = 1.0 / size_multiplier; // from the font

            let mut span = sqrt_svg(
                &format!("sqrtSize{size}"),
                span_height,
                view_box_height,
                extra_vinculum,
                options,
            );
            span.style
                .insert(CssProperty::MinWidth, "1.02em".to_owned());
            span
        }
        DelimiterType::Stack => {
            span_height = height + extra_vinculum + EM_PAD;
            tex_height = height + extra_vinculum;
            view_box_height = 1000.0f64.mul_add(height, extra_vinculum).round();
            advance_width = 1.056;

            let mut span = sqrt_svg(
                "sqrtTall",
                span_height,
                view_box_height,
                extra_vinculum,
                options,
            );
            span.style
                .insert(CssProperty::MinWidth, "0.742em".to_owned());
            span
        }
    };

    span.height = tex_height;
    span.style.insert(CssProperty::Height, make_em(span_height));

    Ok(SqrtImageResult {
        span,
        rule_width: (options.font_metrics().sqrt_rule_thickness + extra_vinculum) * size_multiplier,
        advance_width,
    })
}

fn sqrt_svg(
    sqrt_name: &str,
    height: f64,
    view_box_height: f64,
    extra_vinculum: f64,
    options: &Options,
) -> DomSpan {
    let view_box_height = view_box_height.round();
    let path = PathNode {
        path: sqrt_path(sqrt_name, 1000.0 * extra_vinculum, view_box_height),
    };

    let mut svg_attributes = KeyMap::default();
    svg_attributes.extend([
        ("width".to_owned(), "400em".to_owned()),
        ("height".to_owned(), make_em(height)),
        (
            "viewBox".to_owned(),
            format!("0 0 400000 {view_box_height}"),
        ),
        (
            "preserveAspectRatio".to_owned(),
            "xMinYMin slice".to_owned(),
        ),
    ]);
    let svg_node = SvgNode::builder()
        .children(vec![SvgChildNode::Path(path)])
        .attributes(svg_attributes)
        .build();
    let mut svg = make_svg_span(vec!["hide-tail".to_owned()], vec![svg_node], options);

    svg.style
        .insert(CssProperty::MinWidth, "0.853em".to_owned());
    svg.style.insert(CssProperty::Height, make_em(height));

    svg
}

/// Makes a delimiter of a fixed `\big`-family size, 1 through 4.
pub fn sized_delim(
    ctx: &EngineContext,
    delim: &str,
    size: usize,
    options: &Options,
    mode: Mode,
    classes: &[String],
) -> Result<DomSpan, ParseError> {
    // < and > turn into \langle and \rangle in delimiters.
    let delim = match delim {
        "<" | "\\lt" | "\u{27e8}" => "\\langle",
        ">" | "\\gt" | "\u{27e9}" => "\\rangle",
        _ => delim,
    };

    // Sized delimiters are never centered.
    if STACK_LARGE_DELIMITERS.contains(delim) || STACK_NEVER_DELIMITERS.contains(delim) {
        make_large_delim(ctx, delim, size, false, options, mode, classes)
    } else if STACK_ALWAYS_DELIMITERS.contains(delim) {
        make_stacked_delim(
            ctx,
            delim,
            SIZE_TO_MAX_HEIGHT[size],
            false,
            options,
            mode,
            classes,
        )
    } else {
        Err(ParseError::new(ParseErrorKind::IllegalDelimiter {
            delim: delim.to_owned(),
        }))
    }
}

/// Walks a rendition sequence and picks the first tall enough for the
/// given extent.
fn traverse_sequence<'a>(
    ctx: &EngineContext,
    delim: &str,
    height: f64,
    sequence: &'a [DelimiterType],
    options: &Options,
) -> Result<&'a DelimiterType, ParseError> {
    // Smaller styles start later in the sequence: scriptscript at 3-3=0,
    // script at 3-2=1, text at 3-1=2, display clamped to 2.
    let start = (3 - options.style.size).min(2);
    for delim_type in sequence.iter().skip(start) {
        if matches!(delim_type, DelimiterType::Stack) {
            // Always the last entry.
            break;
        }

        let font = delim_type_to_font(delim_type);
        let metrics = get_metrics(ctx, delim, &font, Mode::Math)?;
        let mut height_depth = metrics.height + metrics.depth;

        // Small renditions are scaled-down text glyphs; account for the
        // style's scaling.
        if let DelimiterType::Small(style) = &delim_type {
            let new_options = options.having_base_style(Some(style));
            height_depth *= new_options.size_multiplier;
        }

        if height_depth > height {
            return Ok(delim_type);
        }
    }

    Ok(&sequence[sequence.len() - 1])
}

fn delim_type_to_font(delimiter_type: &DelimiterType) -> String {
    match delimiter_type {
        DelimiterType::Small(_) => "Main-Regular".to_owned(),
        DelimiterType::Large(size) => format!("Size{size}-Regular"),
        DelimiterType::Stack => "Size4-Regular".to_owned(),
    }
}

/// Makes a delimiter of at least the given extent, choosing the rendition
/// from the delimiter's sequence.
pub fn custom_sized_delim(
    ctx: &EngineContext,
    delim: &str,
    height: f64,
    center: bool,
    options: &Options,
    mode: Mode,
    classes: &[String],
) -> Result<DomSpan, ParseError> {
    let delim = match delim {
        "<" | "\\lt" | "\u{27e8}" => "\\langle",
        ">" | "\\gt" | "\u{27e9}" => "\\rangle",
        _ => delim,
    };

    let sequence = if STACK_NEVER_DELIMITERS.contains(delim) {
        STACK_NEVER_DELIMITER_SEQUENCE
    } else if STACK_LARGE_DELIMITERS.contains(delim) {
        STACK_LARGE_DELIMITER_SEQUENCE
    } else {
        STACK_ALWAYS_DELIMITER_SEQUENCE
    };

    let delimiter_type = traverse_sequence(ctx, delim, height, sequence, options)?;

    match delimiter_type {
        DelimiterType::Small(style) => {
            make_small_delim(ctx, delim, style, center, options, mode, classes)
        }
        DelimiterType::Large(size) => {
            make_large_delim(ctx, delim, *size, center, options, mode, classes)
        }
        DelimiterType::Stack => {
            make_stacked_delim(ctx, delim, height, center, options, mode, classes)
        }
    }
}

/// Makes a `\left`/`\right` delimiter for an enclosed expression of the
/// given height and depth. Follows `make_left_right` of tex.web: the
/// delimiter covers at least 901/1000 of the distance from the axis, and
/// never falls more than 5pt short of the full extent.
pub fn left_right_delim(
    ctx: &EngineContext,
    delim: &str,
    height: f64,
    depth: f64,
    options: &Options,
    mode: Mode,
    classes: &[String],
) -> Result<DomSpan, ParseError> {
    // \left/\right delimiters are always centered on the axis.
    let axis_height = options.font_metrics().axis_height * options.size_multiplier;

    let delimiter_factor = 901.0;
    let delimiter_extend = 5.0 / options.font_metrics().pt_per_em;

    let max_dist_from_axis = (height - axis_height).max(depth + axis_height);

    let total_height = (max_dist_from_axis / 500.0 * delimiter_factor)
        .max(2.0f64.mul_add(max_dist_from_axis, -delimiter_extend));

    custom_sized_delim(ctx, delim, total_height, true, options, mode, classes)
}

const STACK_LARGE_DELIMITERS: Set<&str> = phf_set!(
    "(", "\\lparen", ")", "\\rparen", "[", "\\lbrack", "]", "\\rbrack", "\\{", "\\lbrace", "\\}",
    "\\rbrace", "\\lfloor", "\\rfloor", "\u{230a}", "\u{230b}", "\\lceil", "\\rceil", "\u{2308}",
    "\u{2309}", "\\surd",
);

const STACK_ALWAYS_DELIMITERS: Set<&str> = phf_set!(
    "\\uparrow",
    "\\downarrow",
    "\\updownarrow",
    "\\Uparrow",
    "\\Downarrow",
    "\\Updownarrow",
    "|",
    "\\|",
    "\\vert",
    "\\Vert",
    "\\lvert",
    "\\rvert",
    "\\lVert",
    "\\rVert",
    "\\lgroup",
    "\\rgroup",
    "\u{27ee}",
    "\u{27ef}",
    "\\lmoustache",
    "\\rmoustache",
    "\u{23b0}",
    "\u{23b1}",
);

const STACK_NEVER_DELIMITERS: Set<&str> = phf_set!(
    "<",
    ">",
    "\\langle",
    "\\rangle",
    "/",
    "\\backslash",
    "\\lt",
    "\\gt",
);

static STACK_NEVER_DELIMITER_SEQUENCE: &[DelimiterType] = &[
    DelimiterType::Small(SCRIPTSCRIPT),
    DelimiterType::Small(SCRIPT),
    DelimiterType::Small(TEXT),
    DelimiterType::Large(1),
    DelimiterType::Large(2),
    DelimiterType::Large(3),
    DelimiterType::Large(4),
];

static STACK_ALWAYS_DELIMITER_SEQUENCE: &[DelimiterType] = &[
    DelimiterType::Small(SCRIPTSCRIPT),
    DelimiterType::Small(SCRIPT),
    DelimiterType::Small(TEXT),
    DelimiterType::Stack,
];

static STACK_LARGE_DELIMITER_SEQUENCE: &[DelimiterType] = &[
    DelimiterType::Small(SCRIPTSCRIPT),
    DelimiterType::Small(SCRIPT),
    DelimiterType::Small(TEXT),
    DelimiterType::Large(1),
    DelimiterType::Large(2),
    DelimiterType::Large(3),
    DelimiterType::Large(4),
    DelimiterType::Stack,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn text_options() -> Options {
        Options::builder()
            .style(TEXT)
            .max_size(f64::INFINITY)
            .min_rule_thickness(0.0)
            .build()
    }

    #[test]
    fn test_size_to_max_height_clamps() {
        assert!((size_to_max_height(1) - 1.2).abs() < 1e-9);
        assert!((size_to_max_height(4) - 3.0).abs() < 1e-9);
        assert!((size_to_max_height(9) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sized_delim_rejects_unknown() {
        let ctx = EngineContext::default();
        let options = text_options();
        let err = sized_delim(&ctx, "x", 1, &options, Mode::Math, &[]).unwrap_err();
        assert!(err.to_string().contains("Illegal delimiter"), "{err}");
    }

    #[test]
    fn test_small_paren_for_short_content() {
        let ctx = EngineContext::default();
        let options = text_options();
        // An expression well under the text-size glyph extent keeps the
        // Main-Regular rendition.
        let span = custom_sized_delim(&ctx, "(", 0.8, true, &options, Mode::Math, &[]).unwrap();
        assert!(!span.has_class("delimsizing"));
    }

    #[test]
    fn test_tall_paren_stacks() {
        let ctx = EngineContext::default();
        let options = text_options();
        let span = custom_sized_delim(&ctx, "(", 6.0, true, &options, Mode::Math, &[]).unwrap();
        // Past Size4 the delimiter is stacked from extensible pieces, and
        // the stack covers at least the requested extent.
        assert!(span.height + span.depth >= 6.0);
    }

    #[test]
    fn test_sqrt_image_rule_width_tracks_min_thickness() {
        let ctx = EngineContext::default();
        let options = text_options();
        let image = make_sqrt_image(&ctx, 0.9, &options).unwrap();
        assert!((image.rule_width - 0.04).abs() < 1e-9);
        assert!((image.advance_width - 0.833).abs() < 1e-9);

        let thick = Options::builder()
            .style(TEXT)
            .max_size(f64::INFINITY)
            .min_rule_thickness(0.08)
            .build();
        let image = make_sqrt_image(&ctx, 0.9, &thick).unwrap();
        assert!((image.rule_width - 0.08).abs() < 1e-9);
    }

    #[test]
    fn test_left_right_target_height() {
        let ctx = EngineContext::default();
        let options = text_options();
        // A tall expression forces a rendition covering at least 901/500
        // of the larger distance from the axis.
        let span = left_right_delim(&ctx, "(", 2.0, 2.0, &options, Mode::Math, &[]).unwrap();
        assert!(span.height + span.depth > 3.0);
    }
}
