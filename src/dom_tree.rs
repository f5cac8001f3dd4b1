//! Box-tree node types for HTML output.
//!
//! These hold the data of the elements the renderer emits, plus the
//! layout dimensions the VList engine works with. They serialize to
//! markup through [`VirtualNode`].

use core::fmt::{self, Write as _};

use bon::bon;
use phf::phf_map;

use crate::mathml_tree::MathNode;
use crate::namespace::KeyMap;
use crate::options::Options;
use crate::tree::{DocumentFragment, VirtualNode};
use crate::types::{CssProperty, CssStyle, ParseError, ParseErrorKind};
use crate::unicode::script_from_codepoint;
use crate::units::make_em;
use crate::utils::escape_into;

/// Span wrapping other nodes, generic over the child type.
#[derive(Debug, Clone, PartialEq)]
pub struct Span<T> {
    /// Child nodes.
    pub children: Vec<T>,
    /// HTML attributes.
    pub attributes: KeyMap<String, String>,
    /// CSS classes.
    pub classes: Vec<String>,
    /// Extent above the baseline, in ems.
    pub height: f64,
    /// Extent below the baseline, in ems.
    pub depth: f64,
    /// Explicit width, when layout computed one.
    pub width: Option<f64>,
    /// Largest font size used inside.
    pub max_font_size: f64,
    /// Inline styles.
    pub style: CssStyle,
    /// Delimiter text and options of a `\middle` span, consumed when the
    /// surrounding `\left`/`\right` pair is sized.
    pub is_middle: Option<(String, Options)>,
    /// Italic correction, read back by the op and supsub builders.
    pub italic: Option<f64>,
}

#[bon]
impl<T> Span<T> {
    /// Create a new span.
    #[builder]
    #[expect(clippy::option_option)]
    pub fn new(
        /// Options the span inherits tightness and color from.
        #[builder(finish_fn)]
        options: Option<&Options>,
        children: Vec<T>,
        attributes: Option<KeyMap<String, String>>,
        classes: Option<Vec<String>>,
        height: Option<f64>,
        depth: Option<f64>,
        width: Option<Option<f64>>,
        max_font_size: Option<f64>,
        style: Option<CssStyle>,
        is_middle: Option<(String, Options)>,
    ) -> Self {
        let mut span = Self {
            children,
            attributes: attributes.unwrap_or_default(),
            classes: classes.unwrap_or_default(),
            height: height.unwrap_or_default(),
            depth: depth.unwrap_or_default(),
            width: width.unwrap_or(None),
            max_font_size: max_font_size.unwrap_or_default(),
            style: style.unwrap_or_default(),
            is_middle,
            italic: None,
        };

        if let Some(options) = options {
            init_node(&mut span.classes, &mut span.style, options);
        }

        span
    }
}

impl<T> Span<T> {
    /// Whether the span carries the given class.
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes.iter().any(|cls| cls == class_name)
    }
}

/// Anchor (`<a>`) element carrying a hyperlink.
#[derive(Debug, Clone)]
pub struct Anchor {
    /// Child nodes.
    pub children: Vec<HtmlDomNode>,
    /// HTML attributes, including `href`.
    pub attributes: KeyMap<String, String>,
    /// CSS classes.
    pub classes: Vec<String>,
    /// Extent above the baseline, in ems.
    pub height: f64,
    /// Extent below the baseline, in ems.
    pub depth: f64,
    /// Largest font size used inside.
    pub max_font_size: f64,
    /// Inline styles.
    pub style: CssStyle,
}

impl From<Anchor> for HtmlDomNode {
    fn from(anchor: Anchor) -> Self {
        Self::Anchor(anchor)
    }
}

#[bon]
impl Anchor {
    /// Create a new anchor.
    #[builder]
    pub fn new(
        /// Options the anchor inherits tightness and color from.
        #[builder(finish_fn)]
        options: Option<&Options>,
        children: Option<Vec<HtmlDomNode>>,
        attributes: Option<KeyMap<String, String>>,
        classes: Option<Vec<String>>,
        height: Option<f64>,
        depth: Option<f64>,
        max_font_size: Option<f64>,
        style: Option<CssStyle>,
    ) -> Self {
        let mut anchor = Self {
            children: children.unwrap_or_default(),
            attributes: attributes.unwrap_or_default(),
            classes: classes.unwrap_or_default(),
            height: height.unwrap_or_default(),
            depth: depth.unwrap_or_default(),
            max_font_size: max_font_size.unwrap_or_default(),
            style: style.unwrap_or_default(),
        };

        if let Some(options) = options {
            init_node(&mut anchor.classes, &mut anchor.style, options);
        }

        anchor
    }
}

/// A single glyph with its metrics.
#[derive(Debug, Clone)]
pub struct SymbolNode {
    /// The rendered text.
    pub text: String,
    /// Extent above the baseline, in ems.
    pub height: f64,
    /// Extent below the baseline, in ems.
    pub depth: f64,
    /// Italic correction.
    pub italic: f64,
    /// Accent skew.
    pub skew: f64,
    /// Glyph advance width.
    pub width: f64,
    /// Largest font size used.
    pub max_font_size: f64,
    /// CSS classes.
    pub classes: Vec<String>,
    /// Inline styles.
    pub style: CssStyle,
}

impl From<SymbolNode> for HtmlDomNode {
    fn from(symbol: SymbolNode) -> Self {
        Self::Symbol(symbol)
    }
}

// Accented dotless-i forms the fonts carry as combining pairs.
const I_COMBINATIONS: phf::Map<&str, &str> = phf_map! {
    "\u{ee}" => "\u{0131}\u{0302}",
    "\u{ef}" => "\u{0131}\u{0308}",
    "\u{ed}" => "\u{0131}\u{0301}",
    "\u{ec}" => "\u{0131}\u{0300}",
};

#[bon]
impl SymbolNode {
    /// Create a new symbol node.
    #[builder]
    pub fn new(
        text: &str,
        height: Option<f64>,
        depth: Option<f64>,
        italic: Option<f64>,
        skew: Option<f64>,
        width: Option<f64>,
        max_font_size: Option<f64>,
        classes: Option<Vec<String>>,
        style: Option<CssStyle>,
    ) -> Self {
        let mut classes = classes.unwrap_or_default();

        // Tag non-Latin scripts so the stylesheet can pick a font that
        // actually has the glyphs.
        if let Some(first_ch) = text.chars().next()
            && let Some(script) = script_from_codepoint(first_ch as u32)
        {
            classes.push(format!("{script}_fallback"));
        }

        let text = I_COMBINATIONS
            .get(text)
            .map_or_else(|| text.to_owned(), ToString::to_string);

        Self {
            text,
            height: height.unwrap_or_default(),
            depth: depth.unwrap_or_default(),
            italic: italic.unwrap_or_default(),
            skew: skew.unwrap_or_default(),
            width: width.unwrap_or_default(),
            max_font_size: max_font_size.unwrap_or_default(),
            classes,
            style: style.unwrap_or_default(),
        }
    }
}

/// Span holding box-tree children.
pub type DomSpan = Span<HtmlDomNode>;

/// Any node of the box tree.
#[derive(Debug, Clone)]
pub enum HtmlDomNode {
    /// Span wrapping other nodes.
    DomSpan(Span<HtmlDomNode>),
    /// Anchor element with hyperlink.
    Anchor(Anchor),
    /// A single glyph.
    Symbol(SymbolNode),
    /// SVG container for drawn shapes such as surds.
    SvgNode(SvgNode),
    /// Embedded MathML, for combined output.
    MathML(MathNode),
    /// Fragment of sibling nodes with no element of its own.
    Fragment(HtmlDomFragment),
}

impl From<Span<Self>> for HtmlDomNode {
    fn from(span: Span<Self>) -> Self {
        Self::DomSpan(span)
    }
}

/// Children an SVG container can hold.
#[derive(Debug, Clone)]
pub enum SvgChildNode {
    /// Path element.
    Path(PathNode),
    /// Line element.
    Line(LineNode),
}

impl SvgChildNode {
    /// Renders this child into markup.
    pub fn to_markup(&self) -> Result<String, ParseError> {
        match self {
            Self::Path(path_node) => path_node.to_markup(),
            Self::Line(line_node) => line_node.to_markup(),
        }
    }
}

/// Fragment of box-tree nodes.
pub type HtmlDomFragment = DocumentFragment<HtmlDomNode>;

impl From<HtmlDomFragment> for HtmlDomNode {
    fn from(fragment: HtmlDomFragment) -> Self {
        Self::Fragment(fragment)
    }
}

/// SVG container element.
#[derive(Debug, Clone)]
pub struct SvgNode {
    /// Contained shapes.
    pub children: Vec<SvgChildNode>,
    /// SVG attributes.
    pub attributes: KeyMap<String, String>,
}

#[bon]
impl SvgNode {
    /// Create a new SVG container.
    #[builder]
    pub fn new(
        children: Vec<SvgChildNode>,
        attributes: Option<KeyMap<String, String>>,
    ) -> Self {
        Self {
            children,
            attributes: attributes.unwrap_or_default(),
        }
    }
}

/// Joins classes into a `class` attribute value, dropping empty entries.
pub fn create_class(classes: &[String]) -> String {
    classes
        .iter()
        .filter(|cls| !cls.is_empty())
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join(" ")
}

#[inline]
fn init_node(classes: &mut Vec<String>, style: &mut CssStyle, options: &Options) {
    if options.style.is_tight() {
        classes.push("mtight".to_owned());
    }
    if let Some(color) = options.get_color() {
        style.insert(CssProperty::Color, color);
    }
}

/// Renders a box-tree node into markup.
pub fn to_markup(node: &HtmlDomNode) -> Result<String, ParseError> {
    node.to_markup()
}

fn fmt_error() -> ParseError {
    ParseError::new(ParseErrorKind::MarkupWriteFailure)
}

fn map_fmt(result: fmt::Result) -> Result<(), ParseError> {
    result.map_err(|_| fmt_error())
}

fn write_node_class<W: fmt::Write>(writer: &mut W, classes: &[String]) -> fmt::Result {
    if classes.is_empty() {
        return Ok(());
    }

    writer.write_str(" class=\"")?;
    escape_into(writer, &create_class(classes))?;
    writer.write_char('"')
}

fn write_node_style<W: fmt::Write>(writer: &mut W, style: &CssStyle) -> fmt::Result {
    if style.is_empty() {
        return Ok(());
    }

    writer.write_str(" style=\"")?;
    for (key, value) in style {
        writer.write_str(key.as_ref())?;
        writer.write_char(':')?;
        escape_into(writer, value)?;
        writer.write_char(';')?;
    }
    writer.write_char('"')
}

impl<T: VirtualNode> VirtualNode for Span<T> {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        map_fmt(fmt.write_str("<span"))?;
        map_fmt(write_node_class(fmt, &self.classes))?;
        map_fmt(write_node_style(fmt, &self.style))?;
        node_attributes_to_markup(fmt, &self.attributes)?;
        map_fmt(fmt.write_char('>'))?;

        for child in &self.children {
            child.write_markup(fmt)?;
        }

        map_fmt(fmt.write_str("</span>"))?;
        Ok(())
    }
}

impl VirtualNode for Anchor {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        map_fmt(fmt.write_str("<a"))?;
        map_fmt(write_node_class(fmt, &self.classes))?;
        map_fmt(write_node_style(fmt, &self.style))?;
        node_attributes_to_markup(fmt, &self.attributes)?;
        map_fmt(fmt.write_char('>'))?;

        for child in &self.children {
            child.write_markup(fmt)?;
        }

        map_fmt(fmt.write_str("</a>"))?;
        Ok(())
    }
}

fn write_symbol_style<W: fmt::Write>(writer: &mut W, italic: f64, style: &CssStyle) -> fmt::Result {
    if italic <= 0.0 && style.is_empty() {
        return Ok(());
    }

    writer.write_str(" style=\"")?;
    if italic > 0.0 {
        writer.write_str("margin-right:")?;
        writer.write_str(&make_em(italic))?;
        writer.write_char(';')?;
    }
    for (key, value) in style {
        writer.write_str(key.as_ref())?;
        writer.write_char(':')?;
        escape_into(writer, value)?;
        writer.write_char(';')?;
    }
    writer.write_char('"')
}

impl VirtualNode for SymbolNode {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        // An italic correction or styling forces a wrapper span; bare
        // glyphs stay as text.
        let needs_span = self.italic > 0.0 || !self.classes.is_empty() || !self.style.is_empty();

        if needs_span {
            map_fmt(fmt.write_str("<span"))?;
            map_fmt(write_node_class(fmt, &self.classes))?;
            map_fmt(write_symbol_style(fmt, self.italic, &self.style))?;
            map_fmt(fmt.write_char('>'))?;
            map_fmt(escape_into(fmt, &self.text))?;
            map_fmt(fmt.write_str("</span>"))?;
        } else {
            map_fmt(escape_into(fmt, &self.text))?;
        }

        Ok(())
    }
}

impl VirtualNode for SvgNode {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        map_fmt(fmt.write_str("<svg xmlns=\"http://www.w3.org/2000/svg\""))?;
        node_attributes_to_markup(fmt, &self.attributes)?;
        map_fmt(fmt.write_char('>'))?;

        for child in &self.children {
            match child {
                SvgChildNode::Path(path) => path.write_markup(fmt)?,
                SvgChildNode::Line(line) => line.write_markup(fmt)?,
            }
        }

        map_fmt(fmt.write_str("</svg>"))?;
        Ok(())
    }
}

impl VirtualNode for HtmlDomNode {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        match self {
            Self::DomSpan(span) => span.write_markup(fmt),
            Self::Anchor(anchor) => anchor.write_markup(fmt),
            Self::Symbol(symbol) => symbol.write_markup(fmt),
            Self::SvgNode(svg_node) => svg_node.write_markup(fmt),
            Self::MathML(math_node) => math_node.write_markup(fmt),
            Self::Fragment(fragment) => fragment.write_markup(fmt),
        }
    }
}

/// Uniform accessors over the node kinds.
///
/// SVG and embedded MathML nodes have no classes or layout dimensions;
/// the accessors answer with empty or zero values for them, and the
/// `_mut` variants with `None`.
impl HtmlDomNode {
    /// The node's CSS classes.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        match self {
            Self::DomSpan(span) => &span.classes,
            Self::Anchor(anchor) => &anchor.classes,
            Self::Symbol(symbol) => &symbol.classes,
            Self::SvgNode(_) | Self::MathML { .. } => &[],
            Self::Fragment(fragment) => &fragment.classes,
        }
    }

    /// Mutable access to the node's CSS classes, where it has any.
    pub const fn classes_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Self::DomSpan(span) => Some(&mut span.classes),
            Self::Anchor(anchor) => Some(&mut anchor.classes),
            Self::Symbol(symbol) => Some(&mut symbol.classes),
            Self::SvgNode(_) | Self::MathML { .. } => None,
            Self::Fragment(fragment) => Some(&mut fragment.classes),
        }
    }

    /// Extent above the baseline, in ems.
    #[must_use]
    pub const fn height(&self) -> f64 {
        match self {
            Self::DomSpan(span) => span.height,
            Self::Anchor(anchor) => anchor.height,
            Self::Symbol(symbol) => symbol.height,
            Self::SvgNode(_) | Self::MathML { .. } => 0.0,
            Self::Fragment(fragment) => fragment.height,
        }
    }

    /// Mutable access to the height, where the node has one.
    pub const fn height_mut(&mut self) -> Option<&mut f64> {
        match self {
            Self::DomSpan(span) => Some(&mut span.height),
            Self::Anchor(anchor) => Some(&mut anchor.height),
            Self::Symbol(symbol) => Some(&mut symbol.height),
            Self::SvgNode(_) | Self::MathML { .. } => None,
            Self::Fragment(fragment) => Some(&mut fragment.height),
        }
    }

    /// Extent below the baseline, in ems.
    #[must_use]
    pub const fn depth(&self) -> f64 {
        match self {
            Self::DomSpan(span) => span.depth,
            Self::Anchor(anchor) => anchor.depth,
            Self::Symbol(symbol) => symbol.depth,
            Self::SvgNode(_) | Self::MathML { .. } => 0.0,
            Self::Fragment(fragment) => fragment.depth,
        }
    }

    /// Mutable access to the depth, where the node has one.
    pub const fn depth_mut(&mut self) -> Option<&mut f64> {
        match self {
            Self::DomSpan(span) => Some(&mut span.depth),
            Self::Anchor(anchor) => Some(&mut anchor.depth),
            Self::Symbol(symbol) => Some(&mut symbol.depth),
            Self::SvgNode(_) | Self::MathML { .. } => None,
            Self::Fragment(fragment) => Some(&mut fragment.depth),
        }
    }

    /// Largest font size used inside.
    #[must_use]
    pub const fn max_font_size(&self) -> f64 {
        match self {
            Self::DomSpan(span) => span.max_font_size,
            Self::Anchor(anchor) => anchor.max_font_size,
            Self::Symbol(symbol) => symbol.max_font_size,
            Self::SvgNode(_) | Self::MathML { .. } => 0.0,
            Self::Fragment(fragment) => fragment.max_font_size,
        }
    }

    /// Mutable access to the maximum font size, where the node has one.
    pub const fn max_font_size_mut(&mut self) -> Option<&mut f64> {
        match self {
            Self::DomSpan(span) => Some(&mut span.max_font_size),
            Self::Anchor(anchor) => Some(&mut anchor.max_font_size),
            Self::Symbol(symbol) => Some(&mut symbol.max_font_size),
            Self::SvgNode(_) | Self::MathML { .. } => None,
            Self::Fragment(fragment) => Some(&mut fragment.max_font_size),
        }
    }

    /// Explicit width, where layout recorded one.
    #[must_use]
    pub const fn width(&self) -> Option<f64> {
        match self {
            Self::DomSpan(span) => span.width,
            Self::Anchor(_) | Self::SvgNode(_) | Self::MathML { .. } | Self::Fragment(_) => None,
            Self::Symbol(symbol) => Some(symbol.width),
        }
    }

    /// Inline styles, where the node supports them.
    #[must_use]
    pub const fn style(&self) -> Option<&CssStyle> {
        match self {
            Self::DomSpan(span) => Some(&span.style),
            Self::Anchor(anchor) => Some(&anchor.style),
            Self::Symbol(symbol) => Some(&symbol.style),
            Self::Fragment(fragment) => Some(&fragment.style),
            Self::SvgNode(_) | Self::MathML { .. } => None,
        }
    }

    /// Mutable access to the inline styles, where the node supports them.
    pub const fn style_mut(&mut self) -> Option<&mut CssStyle> {
        match self {
            Self::DomSpan(span) => Some(&mut span.style),
            Self::Anchor(anchor) => Some(&mut anchor.style),
            Self::Symbol(symbol) => Some(&mut symbol.style),
            Self::SvgNode(_) | Self::MathML { .. } => None,
            Self::Fragment(fragment) => Some(&mut fragment.style),
        }
    }

    /// Whether the node carries the given class.
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes().iter().any(|cls| cls == class_name)
    }

    /// The node's attribute map, where it has one.
    #[must_use]
    pub const fn attributes(&self) -> Option<&KeyMap<String, String>> {
        match self {
            Self::DomSpan(span) => Some(&span.attributes),
            Self::Anchor(anchor) => Some(&anchor.attributes),
            Self::Symbol(_) | Self::Fragment(_) => None,
            Self::SvgNode(svg_node) => Some(&svg_node.attributes),
            Self::MathML(mathml) => Some(&mathml.attributes),
        }
    }
}

/// SVG path element holding computed path data (surds).
#[derive(Debug, Clone)]
pub struct PathNode {
    /// The path data.
    pub path: String,
}

impl VirtualNode for PathNode {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        map_fmt(fmt.write_str("<path d=\""))?;
        map_fmt(escape_into(fmt, &self.path))?;
        map_fmt(fmt.write_str("\"/>"))?;
        Ok(())
    }
}

/// SVG line element.
#[derive(Debug, Clone)]
pub struct LineNode {
    /// SVG attributes describing the endpoints.
    pub attributes: KeyMap<String, String>,
}

fn node_attributes_to_markup<W: fmt::Write>(
    writer: &mut W,
    attributes: &KeyMap<String, String>,
) -> Result<(), ParseError> {
    for (attr, value) in attributes {
        if !attr.is_empty() {
            if attr.contains(|c: char| {
                c.is_whitespace() || "\"'>/=".contains(c) || ('\x00'..='\x1f').contains(&c)
            }) {
                return Err(ParseError::new(ParseErrorKind::InvalidAttributeName {
                    attr: attr.clone(),
                }));
            }
            map_fmt(write!(writer, " {attr}=\""))?;
            map_fmt(escape_into(writer, value))?;
            map_fmt(writer.write_char('"'))?;
        }
    }
    Ok(())
}

impl VirtualNode for LineNode {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        map_fmt(fmt.write_str("<line"))?;
        node_attributes_to_markup(fmt, &self.attributes)?;
        map_fmt(fmt.write_str("/"))?;
        map_fmt(fmt.write_char('>'))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_class_drops_empty_entries() {
        let classes = vec![
            "mord".to_owned(),
            String::new(),
            "mathnormal".to_owned(),
        ];
        assert_eq!(create_class(&classes), "mord mathnormal");
    }

    #[test]
    fn test_symbol_markup_escapes_text() {
        let symbol = SymbolNode::builder().text("<").build();
        assert_eq!(symbol.to_markup().unwrap(), "&lt;");
    }

    #[test]
    fn test_symbol_with_italic_gets_wrapper_span() {
        let mut symbol = SymbolNode::builder().text("f").build();
        symbol.italic = 0.1;
        let markup = symbol.to_markup().unwrap();
        assert!(markup.starts_with("<span style=\"margin-right:"), "{markup}");
        assert!(markup.ends_with("</span>"), "{markup}");
    }

    #[test]
    fn test_span_markup_includes_classes_and_children() {
        let symbol: HtmlDomNode = SymbolNode::builder().text("x").build().into();
        let span: DomSpan = Span::builder()
            .children(vec![symbol])
            .classes(vec!["mord".to_owned()])
            .build(None);
        assert_eq!(span.to_markup().unwrap(), "<span class=\"mord\">x</span>");
    }

    #[test]
    fn test_attribute_name_validation() {
        let mut attributes = KeyMap::default();
        attributes.insert("bad attr".to_owned(), "v".to_owned());
        let span: DomSpan = Span::builder()
            .children(vec![])
            .attributes(attributes)
            .build(None);
        assert!(span.to_markup().is_err());
    }
}
