//! MathML tree node types.
//!
//! The MathML counterpart of `dom_tree`. MathML renderers do their own
//! layout, so these nodes carry no dimensions, only structure and
//! attributes.

use core::fmt::{self, Debug, Write as _};

use bon::bon;
use strum::AsRefStr;

use crate::namespace::KeyMap;
use crate::tree::{DocumentFragment, VirtualNode};
use crate::types::{CssStyle, ParseError, ParseErrorKind};
use crate::units::make_em;
use crate::utils::escape_into;

fn map_fmt(result: fmt::Result) -> Result<(), ParseError> {
    result.map_err(|_| ParseError::new(ParseErrorKind::MarkupWriteFailure))
}

/// MathML element names the builders emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum MathNodeType {
    /// `<math>` element
    Math,
    /// `<annotation>` element
    Annotation,
    /// `<semantics>` element
    Semantics,
    /// `<mtext>` element
    Mtext,
    /// `<mn>` element
    Mn,
    /// `<mo>` element
    Mo,
    /// `<mi>` element
    Mi,
    /// `<mspace>` element
    Mspace,
    /// `<mover>` element
    Mover,
    /// `<munder>` element
    Munder,
    /// `<munderover>` element
    Munderover,
    /// `<msup>` element
    Msup,
    /// `<msub>` element
    Msub,
    /// `<msubsup>` element
    Msubsup,
    /// `<mfrac>` element
    Mfrac,
    /// `<mroot>` element
    Mroot,
    /// `<msqrt>` element
    Msqrt,
    /// `<mtable>` element
    Mtable,
    /// `<mtr>` element
    Mtr,
    /// `<mtd>` element
    Mtd,
    /// `<mlabeledtr>` element
    Mlabeledtr,
    /// `<mrow>` element
    Mrow,
    /// `<mstyle>` element
    Mstyle,
    /// `<mpadded>` element
    Mpadded,
    /// `<menclose>` element
    Menclose,
    /// `<mphantom>` element
    Mphantom,
}

/// The Unicode space character matching a width, when one matches.
///
/// MathML space elements render inconsistently; known widths map to the
/// dedicated space characters instead. Negative widths pair the space
/// with an invisible separator.
#[must_use]
pub fn get_space_character(width: f64) -> Option<String> {
    if (0.05555..=0.05556).contains(&width) {
        Some("\u{200a}".to_owned())
    } else if (0.1666..=0.1667).contains(&width) {
        Some("\u{2009}".to_owned())
    } else if (0.2222..=0.2223).contains(&width) {
        Some("\u{2005}".to_owned())
    } else if (0.2777..=0.2778).contains(&width) {
        Some("\u{2005}\u{200a}".to_owned())
    } else if (-0.05556..=-0.05555).contains(&width) {
        Some("\u{200a}\u{2063}".to_owned())
    } else if (-0.1667..=-0.1666).contains(&width) {
        Some("\u{2009}\u{2063}".to_owned())
    } else if (-0.2223..=-0.2222).contains(&width) {
        Some("\u{205f}\u{2063}".to_owned())
    } else if (-0.2778..=-0.2777).contains(&width) {
        Some("\u{2005}\u{2063}".to_owned())
    } else {
        None
    }
}

/// Any node of the MathML tree.
#[derive(Clone)]
pub enum MathDomNode {
    /// Element node.
    Math(MathNode),
    /// Text content.
    Text(TextNode),
    /// Space, rendered as a character or an `<mspace>`.
    Space(SpaceNode),
    /// Fragment of sibling nodes.
    Fragment(Box<MathDomFragment>),
}

impl Debug for MathDomNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Math(node) => node.fmt(f),
            Self::Text(node) => node.fmt(f),
            Self::Space(node) => node.fmt(f),
            Self::Fragment(fragment) => f
                .debug_struct("MathDomFragment")
                .field(
                    "children",
                    &format_args!("{} children", fragment.children.len()),
                )
                .finish(),
        }
    }
}

/// Fragment of MathML nodes.
pub type MathDomFragment = DocumentFragment<MathDomNode>;

/// Wraps children in a dimensionless MathML fragment.
#[must_use]
pub fn make_fragment(children: Vec<MathDomNode>) -> MathDomFragment {
    MathDomFragment {
        children,
        classes: vec![],
        depth: 0.0,
        height: 0.0,
        max_font_size: 0.0,
        style: CssStyle::default(),
    }
}

/// A MathML element of any type.
#[derive(Clone)]
pub struct MathNode {
    /// Element name.
    pub node_type: MathNodeType,
    /// Element attributes.
    pub attributes: KeyMap<String, String>,
    /// Child nodes.
    pub children: Vec<MathDomNode>,
    /// CSS classes.
    pub classes: Vec<String>,
}

impl Debug for MathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MathNode")
            .field("node_type", &self.node_type)
            .field("attributes", &self.attributes)
            .field(
                "children",
                &format_args!("{} children", self.children.len()),
            )
            .field("classes", &self.classes)
            .finish()
    }
}

#[bon]
impl MathNode {
    /// Create a new element.
    #[builder]
    pub fn new(
        node_type: MathNodeType,
        attributes: Option<KeyMap<String, String>>,
        children: Option<Vec<MathDomNode>>,
        classes: Option<Vec<String>>,
    ) -> Self {
        Self {
            node_type,
            attributes: attributes.unwrap_or_default(),
            children: children.unwrap_or_default(),
            classes: classes.unwrap_or_default(),
        }
    }

    /// Create an element with children and nothing else.
    #[must_use]
    pub fn with_children(node_type: MathNodeType, children: Vec<MathDomNode>) -> Self {
        Self {
            node_type,
            attributes: KeyMap::default(),
            children,
            classes: Vec::new(),
        }
    }

    /// Append a child.
    pub fn add_child(&mut self, child: MathDomNode) {
        self.children.push(child);
    }

    /// Set an attribute.
    pub fn set_attribute<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a CSS class.
    pub fn add_class(&mut self, class: String) {
        self.classes.push(class);
    }

    fn to_text(&self) -> String {
        self.children.iter().map(MathDomNode::to_text).collect()
    }
}

impl VirtualNode for MathNode {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        map_fmt(write!(fmt, "<{}", self.node_type.as_ref()))?;

        if !self.classes.is_empty() {
            map_fmt(fmt.write_str(" class=\""))?;
            let mut first = true;
            for class in &self.classes {
                if !first {
                    map_fmt(fmt.write_char(' '))?;
                }
                first = false;
                map_fmt(escape_into(fmt, class))?;
            }
            map_fmt(fmt.write_char('"'))?;
        }

        for (key, value) in &self.attributes {
            map_fmt(write!(fmt, " {key}=\""))?;
            map_fmt(escape_into(fmt, value))?;
            map_fmt(fmt.write_char('"'))?;
        }

        map_fmt(fmt.write_char('>'))?;

        for child in &self.children {
            child.write_markup(fmt)?;
        }

        map_fmt(write!(fmt, "</{}>", self.node_type.as_ref()))?;
        Ok(())
    }
}

/// MathML text content.
#[derive(Debug, Clone)]
pub struct TextNode {
    /// The text.
    pub text: String,
}

impl TextNode {
    fn to_text(&self) -> String {
        self.text.clone()
    }
}

impl VirtualNode for TextNode {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        map_fmt(escape_into(fmt, &self.text))?;
        Ok(())
    }
}

/// A space of known width.
#[derive(Debug, Clone)]
pub struct SpaceNode {
    /// Width in ems.
    pub width: f64,
    /// Character rendition, when the width has one.
    pub character: Option<String>,
}

impl SpaceNode {
    /// Create a space of the given width.
    #[must_use]
    pub fn new(width: f64) -> Self {
        let character = get_space_character(width);
        Self { width, character }
    }

    fn to_text(&self) -> String {
        self.character.clone().unwrap_or_else(|| " ".to_owned())
    }
}

impl VirtualNode for SpaceNode {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        if let Some(character) = &self.character {
            map_fmt(fmt.write_str("<mtext>"))?;
            map_fmt(escape_into(fmt, character))?;
            map_fmt(fmt.write_str("</mtext>"))?;
        } else {
            let width = make_em(self.width);
            map_fmt(fmt.write_str("<mspace width=\""))?;
            map_fmt(fmt.write_str(&width))?;
            map_fmt(fmt.write_str("\"/>"))?;
        }
        Ok(())
    }
}

impl MathDomNode {
    /// The plain-text content of the subtree.
    pub fn to_text(&self) -> String {
        match self {
            Self::Math(node) => node.to_text(),
            Self::Text(node) => node.to_text(),
            Self::Space(node) => node.to_text(),
            Self::Fragment(fragment) => fragment.children.iter().map(Self::to_text).collect(),
        }
    }

    /// The element variant, if this is one.
    #[must_use]
    pub const fn as_math_node(&self) -> Option<&MathNode> {
        match self {
            Self::Math(node) => Some(node),
            _ => None,
        }
    }

    /// The text variant, if this is one.
    #[must_use]
    pub const fn as_text_node(&self) -> Option<&TextNode> {
        match self {
            Self::Text(node) => Some(node),
            _ => None,
        }
    }

    /// Mutable access to the element variant, if this is one.
    pub const fn as_math_node_mut(&mut self) -> Option<&mut MathNode> {
        match self {
            Self::Math(node) => Some(node),
            _ => None,
        }
    }

    /// The fragment variant, if this is one.
    #[must_use]
    pub const fn as_fragment(&self) -> Option<&MathDomFragment> {
        match self {
            Self::Fragment(fragment) => Some(fragment),
            _ => None,
        }
    }
}

impl VirtualNode for MathDomNode {
    fn write_markup(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), ParseError> {
        match self {
            Self::Math(node) => node.write_markup(fmt),
            Self::Text(node) => node.write_markup(fmt),
            Self::Space(node) => node.write_markup(fmt),
            Self::Fragment(fragment) => fragment.write_markup(fmt),
        }
    }
}

impl From<MathNode> for MathDomNode {
    fn from(node: MathNode) -> Self {
        Self::Math(node)
    }
}

impl From<TextNode> for MathDomNode {
    fn from(node: TextNode) -> Self {
        Self::Text(node)
    }
}

impl From<SpaceNode> for MathDomNode {
    fn from(node: SpaceNode) -> Self {
        Self::Space(node)
    }
}

impl From<MathDomFragment> for MathDomNode {
    fn from(fragment: MathDomFragment) -> Self {
        Self::Fragment(Box::new(fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_markup_with_attribute() {
        let mut mo = MathNode::with_children(
            MathNodeType::Mo,
            vec![TextNode {
                text: "+".to_owned(),
            }
            .into()],
        );
        mo.set_attribute("stretchy", "false");
        assert_eq!(
            mo.to_markup().unwrap(),
            "<mo stretchy=\"false\">+</mo>"
        );
    }

    #[test]
    fn test_space_node_uses_character_for_thin_space() {
        let space = SpaceNode::new(3.0 / 18.0);
        assert_eq!(space.to_markup().unwrap(), "<mtext>\u{2009}</mtext>");
    }

    #[test]
    fn test_space_node_falls_back_to_mspace() {
        let space = SpaceNode::new(0.5);
        assert_eq!(space.to_markup().unwrap(), "<mspace width=\"0.5em\"/>");
    }

    #[test]
    fn test_to_text_flattens_subtree() {
        let mi = MathNode::with_children(
            MathNodeType::Mi,
            vec![TextNode {
                text: "x".to_owned(),
            }
            .into()],
        );
        let mrow = MathNode::with_children(MathNodeType::Mrow, vec![mi.into()]);
        assert_eq!(mrow.to_text(), "x");
    }

    #[test]
    fn test_text_is_escaped() {
        let text = TextNode {
            text: "a<b".to_owned(),
        };
        assert_eq!(text.to_markup().unwrap(), "a&lt;b");
    }
}
