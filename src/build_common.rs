//! Shared box-tree construction helpers.
//!
//! Symbol and span factories used by every HTML builder, plus the VList
//! engine that stacks boxes vertically with exact baseline control.

use bon::bon;
use phf::phf_map;

use crate::context::EngineContext;
use crate::dom_tree::{
    Anchor, DomSpan, HtmlDomFragment, HtmlDomNode, Span, SvgNode, SymbolNode, create_class,
};
use crate::font_metrics::{CharacterMetrics, get_character_metrics};
use crate::namespace::KeyMap;
use crate::options::{FontShape, FontWeight, Options};
use crate::parser::parse_node::AnyParseNode;
use crate::spacing_data::Measurement;
use crate::symbols::{Font, is_ligature};
use crate::tree::DocumentFragment;
use crate::types::{CssProperty, CssStyle, Mode, ParseError, ParseErrorKind};
use crate::units::make_em;

/// Font commands to metric-font names and MathML variants.
pub const FONT_MAP: phf::Map<&str, FontMapEntry> = phf_map! {
    "mathbf" => FontMapEntry {
        variant: "bold",
        font_name: "Main-Bold",
    },
    "mathrm" => FontMapEntry {
        variant: "normal",
        font_name: "Main-Regular",
    },
    "textit" => FontMapEntry {
        variant: "italic",
        font_name: "Main-Italic",
    },
    "mathit" => FontMapEntry {
        variant: "italic",
        font_name: "Main-Italic",
    },
    "mathnormal" => FontMapEntry {
        variant: "italic",
        font_name: "Math-Italic",
    },
    "mathbb" => FontMapEntry {
        variant: "double-struck",
        font_name: "AMS-Regular",
    },
    "mathcal" => FontMapEntry {
        variant: "script",
        font_name: "Caligraphic-Regular",
    },
    "mathscr" => FontMapEntry {
        variant: "script",
        font_name: "Script-Regular",
    },
    "mathfrak" => FontMapEntry {
        variant: "fraktur",
        font_name: "Fraktur-Regular",
    },
    "mathsf" => FontMapEntry {
        variant: "sans-serif",
        font_name: "SansSerif-Regular",
    },
    "mathtt" => FontMapEntry {
        variant: "monospace",
        font_name: "Typewriter-Regular",
    },
    "boldsymbol" => FontMapEntry {
        variant: "bold-italic",
        font_name: "Math-BoldItalic",
    },
};

/// One entry of [`FONT_MAP`].
#[derive(Debug, Clone)]
pub struct FontMapEntry {
    /// MathML `mathvariant` attribute value.
    pub variant: &'static str,
    /// Font name for metric lookup.
    pub font_name: &'static str,
}

/// Result of a symbol lookup: the rendered character (after any
/// replacement) and its metrics.
#[derive(Debug, Clone)]
pub struct SymbolLookup {
    /// The character to render.
    pub value: char,
    /// Its metrics, when the font carries them.
    pub metrics: Option<CharacterMetrics>,
}

/// Element entry of a vertical list.
#[derive(Debug, bon::Builder)]
pub struct VListElem {
    /// The boxed content.
    pub elem: HtmlDomNode,
    /// Shift below the baseline, for individual-shift lists.
    pub shift: Option<f64>,
    /// Left margin applied to the wrapper.
    pub margin_left: Option<String>,
    /// Right margin applied to the wrapper.
    pub margin_right: Option<String>,
    /// Extra classes on the wrapper.
    pub wrapper_classes: Option<Vec<String>>,
    /// Extra styles on the wrapper.
    pub wrapper_style: Option<CssStyle>,
}

/// Kern entry of a vertical list.
#[derive(Debug, Clone)]
pub struct VListKern {
    /// Kern size in ems; negative laps.
    pub size: f64,
}

impl From<f64> for VListKern {
    fn from(size: f64) -> Self {
        Self { size }
    }
}

/// One entry of a vertical list.
#[derive(Debug)]
pub enum VListChild {
    /// Boxed content.
    Elem(Box<VListElem>),
    /// Vertical glue.
    Kern(VListKern),
}

impl From<VListElem> for VListChild {
    fn from(elem: VListElem) -> Self {
        Self::Elem(Box::new(elem))
    }
}

/// Element with a mandatory shift, for individual-shift lists.
#[derive(Debug)]
pub struct VListElemAndShift {
    /// The boxed content.
    pub elem: HtmlDomNode,
    /// Shift below the baseline.
    pub shift: f64,
    /// Left margin applied to the wrapper.
    pub margin_left: Option<String>,
    /// Right margin applied to the wrapper.
    pub margin_right: Option<String>,
    /// Extra classes on the wrapper.
    pub wrapper_classes: Option<Vec<String>>,
    /// Extra styles on the wrapper.
    pub wrapper_style: Option<CssStyle>,
}

#[bon]
impl VListElemAndShift {
    /// Creates a shifted element entry.
    #[builder]
    pub const fn new(
        elem: HtmlDomNode,
        shift: f64,
        margin_left: Option<String>,
        margin_right: Option<String>,
        wrapper_classes: Option<Vec<String>>,
        wrapper_style: Option<CssStyle>,
    ) -> Self {
        Self {
            elem,
            shift,
            margin_left,
            margin_right,
            wrapper_classes,
            wrapper_style,
        }
    }
}

/// Positioning mode of a vertical list.
#[derive(Debug)]
pub enum VListParam {
    /// Every child carries its own shift below the baseline.
    IndividualShift {
        /// The shifted children.
        children: Vec<VListElemAndShift>,
    },
    /// The top of the list sits at `position_data`.
    Top {
        /// Top position relative to the baseline.
        position_data: f64,
        /// The children, bottom first.
        children: Vec<VListChild>,
    },
    /// The bottom of the list sits `position_data` below the baseline.
    Bottom {
        /// Depth below the baseline.
        position_data: f64,
        /// The children, bottom first.
        children: Vec<VListChild>,
    },
    /// The first child's baseline is shifted by `position_data`.
    Shift {
        /// Shift of the first child below the baseline.
        position_data: f64,
        /// The children, bottom first.
        children: Vec<VListChild>,
    },
    /// The first child's baseline is the list's baseline.
    FirstBaseline {
        /// The children, bottom first.
        children: Vec<VListChild>,
    },
}

/// Children plus resolved depth, the normalized VList input.
#[derive(Debug)]
pub struct VListChildrenAndDepth {
    /// The children, bottom first.
    pub children: Vec<VListChild>,
    /// Depth of the list below the baseline.
    pub depth: f64,
}

fn size_element_from_children_dom(node: &mut DomSpan) {
    let mut height = 0.0f64;
    let mut depth = 0.0f64;
    let mut max_font_size = 0.0f64;

    for child in &node.children {
        height = height.max(child.height());
        depth = depth.max(child.depth());
        max_font_size = max_font_size.max(child.max_font_size());
    }

    node.height = height;
    node.depth = depth;
    node.max_font_size = max_font_size;
}

/// Makes a span sized from its children.
#[must_use]
pub fn make_span(
    classes: Vec<String>,
    children: Vec<HtmlDomNode>,
    options: Option<&Options>,
    style: Option<CssStyle>,
) -> DomSpan {
    let mut node = Span::builder()
        .children(children)
        .classes(classes)
        .maybe_style(style)
        .build(options);

    size_element_from_children_dom(&mut node);

    node
}

/// Stacks elements and kerns into a vertically positioned table of spans.
///
/// Each element is wrapped together with a "pstrut", a zero-width strut
/// taller than any list item, so baselines position exactly regardless
/// of font ascents and line heights.
pub fn make_v_list(params: VListParam, _options: &Options) -> Result<DomSpan, ParseError> {
    let VListChildrenAndDepth { children, depth } = get_v_list_children_and_depth(params)?;

    let mut pstrut_size = 0.0f64;
    for child in &children {
        if let VListChild::Elem(elem) = child {
            pstrut_size = pstrut_size
                .max(elem.elem.max_font_size())
                .max(elem.elem.height());
        }
    }
    pstrut_size += 2.0;
    let mut pstrut = make_span(vec!["pstrut".to_owned()], vec![], None, None);
    pstrut
        .style
        .insert(CssProperty::Height, make_em(pstrut_size));

    let mut real_children: Vec<HtmlDomNode> = Vec::new();
    let mut min_pos = depth;
    let mut max_pos = depth;
    let mut curr_pos = depth;

    for child in children {
        match child {
            VListChild::Kern(kern) => {
                curr_pos += kern.size;
            }
            VListChild::Elem(child) => {
                let elem = child.elem;
                let classes = child.wrapper_classes.unwrap_or_default();
                let style = child.wrapper_style.unwrap_or_default();

                let elem_height = elem.height();
                let elem_depth = elem.depth();

                let mut child_wrap = make_span(
                    classes,
                    vec![pstrut.clone().into(), elem],
                    None,
                    Some(style),
                );

                child_wrap.style.insert(
                    CssProperty::Top,
                    make_em(-pstrut_size - curr_pos - elem_depth),
                );

                if let Some(margin_left) = &child.margin_left {
                    child_wrap
                        .style
                        .insert(CssProperty::MarginLeft, margin_left.clone());
                }
                if let Some(margin_right) = &child.margin_right {
                    child_wrap
                        .style
                        .insert(CssProperty::MarginRight, margin_right.clone());
                }

                real_children.push(child_wrap.into());
                curr_pos += elem_height + elem_depth;
            }
        }
        min_pos = min_pos.min(curr_pos);
        max_pos = max_pos.max(curr_pos);
    }

    let mut vlist = make_span(vec!["vlist".to_owned()], real_children, None, None);
    vlist.style.insert(CssProperty::Height, make_em(max_pos));

    // A list reaching below the baseline needs a second table row to keep
    // the container's box model non-negative.
    let rows: Vec<HtmlDomNode> = if min_pos < 0.0 {
        let empty_span = make_span(vec![], vec![], None, None);
        let mut depth_strut = make_span(
            vec!["vlist".to_owned()],
            vec![empty_span.into()],
            None,
            None,
        );
        depth_strut
            .style
            .insert(CssProperty::Height, make_em(-min_pos));

        // Zero-width space keeps the row open in Safari.
        let top_strut = make_span(
            vec!["vlist-s".to_owned()],
            vec![HtmlDomNode::Symbol(
                SymbolNode::builder().text("\u{200b}").build(),
            )],
            None,
            None,
        );

        vec![
            make_span(
                vec!["vlist-r".to_owned()],
                vec![vlist.into(), top_strut.into()],
                None,
                None,
            )
            .into(),
            make_span(
                vec!["vlist-r".to_owned()],
                vec![depth_strut.into()],
                None,
                None,
            )
            .into(),
        ]
    } else {
        vec![make_span(vec!["vlist-r".to_owned()], vec![vlist.into()], None, None).into()]
    };

    let mut vtable_classes = vec!["vlist-t".to_owned()];
    if rows.len() == 2 {
        vtable_classes.push("vlist-t2".to_owned());
    }

    let mut vtable = make_span(vtable_classes, rows, None, None);
    vtable.height = max_pos;
    vtable.depth = -min_pos;

    Ok(vtable)
}

/// Resolves a [`VListParam`] into children and an overall depth.
pub fn get_v_list_children_and_depth(
    params: VListParam,
) -> Result<VListChildrenAndDepth, ParseError> {
    match params {
        VListParam::IndividualShift {
            children: old_children,
        } => {
            let mut children: Vec<VListChild> = Vec::new();

            let Some(first_child) = old_children.first() else {
                return Ok(VListChildrenAndDepth {
                    children,
                    depth: 0.0,
                });
            };
            let first_elem = VListElem {
                elem: first_child.elem.clone(),
                shift: Some(first_child.shift),
                margin_left: first_child.margin_left.clone(),
                margin_right: first_child.margin_right.clone(),
                wrapper_classes: first_child.wrapper_classes.clone(),
                wrapper_style: first_child.wrapper_style.clone(),
            };
            let depth = -first_child.shift - first_child.elem.depth();
            children.push(first_elem.into());
            let mut curr_pos = depth;

            // Interleave kerns that move each element to its own shift.
            for i in 1..old_children.len() {
                let child = &old_children[i];
                let diff = -child.shift - curr_pos - child.elem.depth();
                let size =
                    diff - (old_children[i - 1].elem.height() + old_children[i - 1].elem.depth());

                curr_pos += diff;

                children.push(VListChild::Kern(VListKern { size }));

                let elem = VListElem {
                    elem: child.elem.clone(),
                    shift: Some(child.shift),
                    margin_left: child.margin_left.clone(),
                    margin_right: child.margin_right.clone(),
                    wrapper_classes: child.wrapper_classes.clone(),
                    wrapper_style: child.wrapper_style.clone(),
                };
                children.push(elem.into());
            }

            Ok(VListChildrenAndDepth { children, depth })
        }
        VListParam::Top {
            position_data,
            children: vlist_children,
        } => {
            // Walk down from the top position to find the bottom.
            let mut bottom = position_data;
            for child in &vlist_children {
                bottom -= match child {
                    VListChild::Kern(kern) => kern.size,
                    VListChild::Elem(elem) => elem.elem.height() + elem.elem.depth(),
                };
            }
            Ok(VListChildrenAndDepth {
                children: vlist_children,
                depth: bottom,
            })
        }
        VListParam::Bottom {
            position_data,
            children: vlist_children,
        } => Ok(VListChildrenAndDepth {
            children: vlist_children,
            depth: -position_data,
        }),
        VListParam::Shift {
            position_data,
            children: vlist_children,
        } => {
            let first_elem = vlist_children.iter().find_map(|child| {
                if let VListChild::Elem(elem) = child {
                    Some(elem)
                } else {
                    None
                }
            });

            let depth = first_elem
                .map_or_else(|| -position_data, |elem| -elem.elem.depth() - position_data);

            Ok(VListChildrenAndDepth {
                children: vlist_children,
                depth,
            })
        }
        VListParam::FirstBaseline {
            children: vlist_children,
        } => {
            let first_elem = vlist_children.iter().find_map(|child| {
                if let VListChild::Elem(elem) = child {
                    Some(elem)
                } else {
                    None
                }
            });

            let depth = first_elem.map_or(0.0, |elem| -elem.elem.depth());

            Ok(VListChildrenAndDepth {
                children: vlist_children,
                depth,
            })
        }
    }
}

/// Looks up a symbol's glyph and metrics, applying any table replacement.
pub fn lookup_symbol(
    ctx: &EngineContext,
    value: &str,
    font_name: &str,
    mode: Mode,
) -> Result<Option<SymbolLookup>, ParseError> {
    let query = if let Some(char_info) = ctx.symbols.get(mode, value)
        && let Some(replaced) = char_info.replace
    {
        replaced
    } else if let Some(first) = value.chars().next() {
        first
    } else {
        return Ok(None);
    };

    let metrics = get_character_metrics(ctx, query, font_name, mode)?;
    Ok(Some(SymbolLookup {
        value: query,
        metrics,
    }))
}

/// Makes a symbol node in the given font, with metrics applied.
pub fn make_symbol(
    ctx: &EngineContext,
    value: &str,
    font_name: &str,
    mode: Mode,
    options: Option<&Options>,
    classes: Option<&[String]>,
) -> Result<SymbolNode, ParseError> {
    let (metrics, value) = lookup_symbol(ctx, value, font_name, mode)?.map_or_else(
        || (None, value.to_owned()),
        |lookup| (lookup.metrics, lookup.value.to_string()),
    );

    let (height, depth, italic, skew, width) = metrics.map_or((0.0, 0.0, 0.0, 0.0, 0.0), |m| {
        // No italic correction in text mode or under \mathit.
        let italic = if mode == Mode::Text || options.as_ref().is_some_and(|o| o.font == "mathit") {
            0.0
        } else {
            m.italic
        };

        (m.height, m.depth, italic, m.skew, m.width)
    });

    let mut classes_vec = classes.unwrap_or(&[]).to_vec();
    let mut style = CssStyle::default();

    if let Some(options) = options {
        if options.style.is_tight() {
            classes_vec.push("mtight".to_owned());
        }
        if let Some(color) = options.get_color() {
            style.insert(CssProperty::Color, color);
        }
    }

    let mut symbol = SymbolNode::builder()
        .text(&value)
        .height(height)
        .depth(depth)
        .italic(italic)
        .skew(skew)
        .width(width)
        .classes(classes_vec)
        .style(style)
        .build();

    if let Some(options) = options {
        symbol.max_font_size = options.size_multiplier;
    }
    Ok(symbol)
}

/// Makes a symbol in Main-Regular or AMS-Regular, honoring `\boldsymbol`.
pub fn mathsym(
    ctx: &EngineContext,
    value: &str,
    mode: Mode,
    options: &Options,
    classes: Option<&[String]>,
) -> Result<SymbolNode, ParseError> {
    if options.font == "boldsymbol"
        && lookup_symbol(ctx, value, "Main-Bold", mode)?
            .is_some_and(|lookup| lookup.metrics.is_some())
    {
        let mut combined_classes = classes.unwrap_or(&[]).to_vec();
        combined_classes.push("mathbf".to_owned());
        make_symbol(
            ctx,
            value,
            "Main-Bold",
            mode,
            Some(options),
            Some(&combined_classes),
        )
    } else if value == "\\"
        || ctx
            .symbols
            .get(mode, value)
            .is_some_and(|info| matches!(info.font, Font::Main))
    {
        make_symbol(ctx, value, "Main-Regular", mode, Some(options), classes)
    } else {
        let mut combined_classes = classes.unwrap_or(&[]).to_vec();
        combined_classes.push("amsrm".to_owned());
        make_symbol(
            ctx,
            value,
            "AMS-Regular",
            mode,
            Some(options),
            Some(&combined_classes),
        )
    }
}

/// The metric-font name for a text font family plus weight and shape.
#[must_use]
pub fn retrieve_text_font_name(
    font_family: &str,
    font_weight: &FontWeight,
    font_shape: &FontShape,
) -> String {
    let base_font_name = match font_family {
        "amsrm" => "AMS",
        "textrm" => "Main",
        "textsf" => "SansSerif",
        "texttt" => "Typewriter",
        _ => font_family,
    };

    let font_styles_name = match (font_weight, font_shape) {
        (FontWeight::TextBf, FontShape::TextIt) => "BoldItalic",
        (FontWeight::TextBf, _) => "Bold",
        (_, FontShape::TextIt) => "Italic",
        _ => "Regular",
    };

    format!("{base_font_name}-{font_styles_name}")
}

fn can_combine(prev: &HtmlDomNode, next: &HtmlDomNode) -> bool {
    let HtmlDomNode::Symbol(prev) = prev else {
        return false;
    };
    let HtmlDomNode::Symbol(next) = next else {
        return false;
    };

    if create_class(&prev.classes) != create_class(&next.classes)
        || prev.skew != next.skew
        || prev.max_font_size != next.max_font_size
    {
        return false;
    }

    // Lone mbin/mord classes stay separate so glue insertion sees them.
    if prev.classes.len() == 1 {
        let cls = &prev.classes[0];
        if cls == "mbin" || cls == "mord" {
            return false;
        }
    }

    prev.style == next.style
}

/// Merges runs of compatible symbol nodes into single text nodes.
pub fn try_combine_chars(chars: &mut Vec<HtmlDomNode>) {
    if chars.is_empty() {
        return;
    }
    let mut i = 0;
    while i < chars.len() - 1 {
        if can_combine(&chars[i], &chars[i + 1]) {
            let (next_text, next_height, next_depth, next_italic) = match &chars[i + 1] {
                HtmlDomNode::Symbol(symbol) => (
                    symbol.text.clone(),
                    symbol.height,
                    symbol.depth,
                    symbol.italic,
                ),
                _ => unreachable!(),
            };

            if let HtmlDomNode::Symbol(symbol) = &mut chars[i] {
                symbol.text.push_str(&next_text);
                symbol.height = symbol.height.max(next_height);
                symbol.depth = symbol.depth.max(next_depth);
                // The run ends with the last glyph's italic correction.
                symbol.italic = next_italic;
            }

            chars.remove(i + 1);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
}

impl EngineContext {
    /// Makes a glue (spacing) span of the given measurement.
    pub fn make_glue<T>(
        &self,
        measurement: &Measurement<T>,
        options: &Options,
    ) -> Result<DomSpan, ParseError>
    where
        T: AsRef<str>,
    {
        let mut rule = make_span(vec!["mspace".to_owned()], vec![], Some(options), None);
        let size = self.calculate_size(measurement, options)?;
        rule.style.insert(CssProperty::MarginRight, make_em(size));
        Ok(rule)
    }
}

/// Makes a mathord or textord in the correct font and color.
pub fn make_ord(
    ctx: &EngineContext,
    node: &AnyParseNode,
    options: &Options,
) -> Result<HtmlDomNode, ParseError> {
    let (mode, text, ord_type) = match node {
        AnyParseNode::MathOrd(math_ord) => (math_ord.mode, &math_ord.text, Mode::Math),
        AnyParseNode::TextOrd(text_ord) => (text_ord.mode, &text_ord.text, Mode::Text),
        AnyParseNode::Spacing(spacing) => (spacing.mode, &spacing.text, Mode::Text),
        _ => {
            return Err(ParseError::new(ParseErrorKind::MakeOrdExpectedNode));
        }
    };

    let classes = vec!["mord".to_owned()];

    // \mathbf-style commands apply in math mode, and in text mode when a
    // font override is in effect; text families apply otherwise.
    let is_font = mode == Mode::Math || (mode == Mode::Text && !options.font.is_empty());
    let font_or_family = if is_font {
        if options.font.is_empty() {
            None
        } else {
            Some(&options.font)
        }
    } else if options.font_family.is_empty() {
        None
    } else {
        Some(&options.font_family)
    };

    if let Some(font_or_family) = font_or_family {
        let (font_name, font_classes) = if font_or_family == "boldsymbol" {
            let font_data = bold_symbol(ctx, text, mode, ord_type)?;
            (font_data.font_name, vec![font_data.font_class])
        } else if is_font {
            let font_name: &str = FONT_MAP
                .get(font_or_family)
                .map_or(font_or_family, |entry| entry.font_name);
            (font_name.to_owned(), vec![font_or_family.clone()])
        } else {
            let font_name =
                retrieve_text_font_name(font_or_family, &options.font_weight, &options.font_shape);
            (
                font_name,
                vec![
                    font_or_family.clone(),
                    options.font_weight.to_string(),
                    options.font_shape.as_str().to_owned(),
                ],
            )
        };

        if lookup_symbol(ctx, text, &font_name, mode)?
            .is_some_and(|lookup| lookup.metrics.is_some())
        {
            let mut combined_classes = classes;
            combined_classes.extend(font_classes);
            return Ok(make_symbol(
                ctx,
                text,
                &font_name,
                mode,
                Some(options),
                Some(&combined_classes),
            )?
            .into());
        }

        // Monospace fonts carry no ligature glyphs; render per character.
        if font_name.starts_with("Typewriter") && is_ligature(text) {
            let mut base_classes = classes;
            base_classes.extend(font_classes);

            let mut parts = Vec::new();
            for ch in text.chars() {
                let char_str = ch.to_string();
                let symbol = make_symbol(
                    ctx,
                    &char_str,
                    &font_name,
                    mode,
                    Some(options),
                    Some(&base_classes),
                )?;
                parts.push(symbol.into());
            }
            return Ok(make_fragment(&parts).into());
        }
    }

    match ord_type {
        Mode::Math => {
            let mut combined_classes = classes;
            combined_classes.push("mathnormal".to_owned());
            Ok(make_symbol(
                ctx,
                text,
                "Math-Italic",
                mode,
                Some(options),
                Some(&combined_classes),
            )?
            .into())
        }
        Mode::Text => {
            let font_family = match ctx.symbols.get(mode, text).map(|info| &info.font) {
                Some(Font::Ams) => "amsrm",
                Some(Font::Main) | None => "textrm",
            };
            let font_name =
                retrieve_text_font_name(font_family, &options.font_weight, &options.font_shape);
            let mut combined_classes = classes;
            if font_family == "amsrm" {
                combined_classes.push("amsrm".to_owned());
            }
            combined_classes.push(options.font_weight.to_string());
            combined_classes.push(options.font_shape.as_str().to_owned());
            Ok(make_symbol(
                ctx,
                text,
                &font_name,
                mode,
                Some(options),
                Some(&combined_classes),
            )?
            .into())
        }
    }
}

/// Makes a span holding SVG containers.
pub fn make_svg_span(classes: Vec<String>, svg_node: Vec<SvgNode>, options: &Options) -> DomSpan {
    Span::builder()
        .children(svg_node.into_iter().map(HtmlDomNode::SvgNode).collect())
        .classes(classes)
        .build(Some(options))
}

#[derive(Debug)]
struct FontData {
    font_name: String,
    font_class: String,
}

fn bold_symbol(
    ctx: &EngineContext,
    text: &str,
    mode: Mode,
    ord_type: Mode,
) -> Result<FontData, ParseError> {
    if ord_type != Mode::Text
        && lookup_symbol(ctx, text, "Math-BoldItalic", mode)?
            .is_some_and(|lookup| lookup.metrics.is_some())
    {
        Ok(FontData {
            font_name: "Math-BoldItalic".to_owned(),
            font_class: "boldsymbol".to_owned(),
        })
    } else {
        // Glyphs missing from Math-BoldItalic fall back to Main-Bold.
        Ok(FontData {
            font_name: "Main-Bold".to_owned(),
            font_class: "mathbf".to_owned(),
        })
    }
}

trait HasSizeProperties {
    fn set_height(&mut self, height: f64);
    fn set_depth(&mut self, depth: f64);
    fn set_max_font_size(&mut self, max_font_size: f64);
}

impl HasSizeProperties for Anchor {
    fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    fn set_depth(&mut self, depth: f64) {
        self.depth = depth;
    }

    fn set_max_font_size(&mut self, max_font_size: f64) {
        self.max_font_size = max_font_size;
    }
}

impl HasSizeProperties for DocumentFragment<HtmlDomNode> {
    fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    fn set_depth(&mut self, depth: f64) {
        self.depth = depth;
    }

    fn set_max_font_size(&mut self, max_font_size: f64) {
        self.max_font_size = max_font_size;
    }
}

/// Makes a horizontal-rule span of the given thickness, no thinner than
/// the settings' minimum rule thickness.
#[must_use]
pub fn make_line_span(class_name: &str, options: &Options, thickness: Option<f64>) -> DomSpan {
    let mut line = make_span(vec![class_name.to_owned()], vec![], Some(options), None);

    let default_thickness = options.font_metrics().default_rule_thickness;
    let line_thickness = thickness.unwrap_or(default_thickness);
    line.height = line_thickness.max(options.min_rule_thickness);

    line.style
        .insert(CssProperty::BorderBottomWidth, make_em(line.height));

    line.max_font_size = 1.0;

    line
}

/// Makes an anchor element sized from its children.
#[must_use]
pub fn make_anchor(
    href: &str,
    classes: &[String],
    children: &[HtmlDomNode],
    options: &Options,
) -> Anchor {
    let mut attributes = KeyMap::default();
    attributes.insert("href".to_owned(), href.to_owned());

    let mut anchor = Anchor::builder()
        .children(children.to_owned())
        .attributes(attributes)
        .classes(classes.to_vec())
        .height(0.0)
        .depth(0.0)
        .max_font_size(options.size_multiplier)
        .build(Some(options));

    size_element_from_children(&mut anchor, children);

    anchor
}

/// Makes a fragment sized from its children.
#[must_use]
pub fn make_fragment(children: &[HtmlDomNode]) -> HtmlDomFragment {
    let mut fragment = DocumentFragment::new(children.to_owned());

    size_element_from_children(&mut fragment, children);

    fragment
}

/// Wraps a fragment in a span so classes and styles can apply; other
/// nodes pass through.
#[must_use]
pub fn wrap_fragment(group: HtmlDomNode, options: &Options) -> HtmlDomNode {
    match group {
        HtmlDomNode::Fragment(fragment) => {
            let span = make_span(
                vec![],
                vec![HtmlDomNode::Fragment(fragment)],
                Some(options),
                None,
            );
            HtmlDomNode::DomSpan(span)
        }
        _ => group,
    }
}

fn size_element_from_children<T>(elem: &mut T, children: &[HtmlDomNode])
where
    T: HasSizeProperties,
{
    let mut height = 0.0;
    let mut depth = 0.0;
    let mut max_font_size = 0.0;

    for child in children {
        if child.height() > height {
            height = child.height();
        }
        if child.depth() > depth {
            depth = child.depth();
        }
        if child.max_font_size() > max_font_size {
            max_font_size = child.max_font_size();
        }
    }

    elem.set_height(height);
    elem.set_depth(depth);
    elem.set_max_font_size(max_font_size);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(height: f64, depth: f64) -> HtmlDomNode {
        let mut span = make_span(vec![], vec![], None, None);
        span.height = height;
        span.depth = depth;
        span.into()
    }

    #[test]
    fn test_v_list_individual_shift_extents() {
        let children = vec![
            VListElemAndShift::builder().elem(boxed(0.7, 0.1)).shift(0.0).build(),
            VListElemAndShift::builder().elem(boxed(0.5, 0.2)).shift(-1.0).build(),
        ];
        let options_style = crate::style::TEXT;
        let options = Options::builder()
            .style(options_style)
            .max_size(f64::INFINITY)
            .min_rule_thickness(0.0)
            .build();
        let vtable = make_v_list(VListParam::IndividualShift { children }, &options).unwrap();
        // The second element sits 1em above the baseline: top reaches
        // 1 + 0.5, bottom reaches -0.1.
        assert!((vtable.height - 1.5).abs() < 1e-9, "{}", vtable.height);
        assert!((vtable.depth - 0.1).abs() < 1e-9, "{}", vtable.depth);
    }

    #[test]
    fn test_v_list_bottom_sets_depth() {
        let children = vec![
            VListElem::builder().elem(boxed(0.4, 0.1)).build().into(),
            VListChild::Kern(VListKern { size: 0.2 }),
            VListElem::builder().elem(boxed(0.4, 0.1)).build().into(),
        ];
        let options = Options::builder()
            .style(crate::style::TEXT)
            .max_size(f64::INFINITY)
            .min_rule_thickness(0.0)
            .build();
        let vtable = make_v_list(
            VListParam::Bottom {
                position_data: 0.3,
                children,
            },
            &options,
        )
        .unwrap();
        assert!((vtable.depth - 0.3).abs() < 1e-9, "{}", vtable.depth);
        // 0.5 + 0.2 + 0.5 of content starting 0.3 below the baseline.
        assert!((vtable.height - 0.9).abs() < 1e-9, "{}", vtable.height);
    }

    #[test]
    fn test_try_combine_chars_merges_compatible_runs() {
        let a = SymbolNode::builder()
            .text("s")
            .classes(vec!["mathnormal".to_owned()])
            .build();
        let b = SymbolNode::builder()
            .text("in")
            .classes(vec!["mathnormal".to_owned()])
            .build();
        let mut chars: Vec<HtmlDomNode> = vec![a.into(), b.into()];
        try_combine_chars(&mut chars);
        assert_eq!(chars.len(), 1);
        let HtmlDomNode::Symbol(merged) = &chars[0] else {
            panic!("expected symbol");
        };
        assert_eq!(merged.text, "sin");
    }

    #[test]
    fn test_lone_mord_symbols_stay_separate() {
        let a = SymbolNode::builder()
            .text("1")
            .classes(vec!["mord".to_owned()])
            .build();
        let b = SymbolNode::builder()
            .text("2")
            .classes(vec!["mord".to_owned()])
            .build();
        let mut chars: Vec<HtmlDomNode> = vec![a.into(), b.into()];
        try_combine_chars(&mut chars);
        assert_eq!(chars.len(), 2);
    }

    #[test]
    fn test_text_font_name_resolution() {
        assert_eq!(
            retrieve_text_font_name("textrm", &FontWeight::Empty, &FontShape::Empty),
            "Main-Regular"
        );
        assert_eq!(
            retrieve_text_font_name("textsf", &FontWeight::TextBf, &FontShape::TextIt),
            "SansSerif-BoldItalic"
        );
        assert_eq!(
            retrieve_text_font_name("texttt", &FontWeight::Empty, &FontShape::TextIt),
            "Typewriter-Italic"
        );
    }
}
