//! Parse tree node definitions.
//!
//! The parser produces a tree of [`AnyParseNode`] values; the HTML and
//! MathML builders dispatch on the [`NodeType`] discriminant.

use crate::namespace::KeyMap;
use crate::spacing_data::MeasurementOwned;
use crate::style::Style;
use crate::symbols::Atom;
use crate::types::{ErrorLocationProvider, Mode, SourceLocation, Token};

use strum::{AsRefStr, Display, EnumDiscriminants};
use thiserror::Error;

/// Column separation flavor of an array-like environment.
///
/// Chosen by the environment handler; the array builder keys gap and rule
/// decisions on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColSeparationType {
    /// `aligned` and friends: alternating right/left column pairs.
    Align,
    /// `alignat`: like `Align` but with no inter-pair spacing.
    Alignat,
    /// `gather`: single centered column.
    Gather,
    /// `smallmatrix`: compact spacing.
    Small,
    /// Commutative diagrams.
    CD,
}

/// Per-column alignment and spacing of an array environment.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignSpec {
    /// A rule or other separator between columns (e.g. `|`).
    Separator {
        /// The separator text.
        separator: String,
    },
    /// An aligned column with optional explicit gaps in ems.
    Align {
        /// `"l"`, `"c"`, or `"r"`.
        align: String,
        /// Space before the column.
        pregap: Option<f64>,
        /// Space after the column.
        postgap: Option<f64>,
    },
}

/// A node of the parse tree.
///
/// Each variant carries its mode and source location; most also carry the
/// child nodes or the data its builder pair needs. The [`NodeType`]
/// discriminant doubles as the registry key for group builders, so its
/// serialized names must stay in sync with the function definitions.
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(vis(pub))]
#[strum_discriminants(doc = "Discriminant of [`AnyParseNode`], used as the builder registry key")]
#[strum_discriminants(derive(Display, Hash, AsRefStr), strum(serialize_all = "lowercase"))]
#[strum_discriminants(name(NodeType))]
pub enum AnyParseNode {
    /// Array/matrix environment body.
    Array(ParseNodeArray),
    /// Braced group.
    OrdGroup(ParseNodeOrdGroup),
    /// Base with superscript and/or subscript.
    SupSub(ParseNodeSupSub),
    /// Generalized fraction.
    Genfrac(Box<ParseNodeGenfrac>),
    /// `\left`...`\right` pair with its body.
    LeftRight(ParseNodeLeftRight),
    /// The `\right` delimiter while the pair is being parsed.
    #[strum_discriminants(strum(serialize = "leftright-right"))]
    LeftRightRight(ParseNodeLeftRightRight),
    /// Radical with optional index.
    Sqrt(Box<ParseNodeSqrt>),

    /// Symbol with an atom spacing family.
    Atom(ParseNodeAtom),
    /// Ordinary math symbol.
    MathOrd(ParseNodeMathOrd),
    /// Large operator, as a symbol or with a body.
    Op(ParseNodeOp),
    /// Explicit spacing command.
    Spacing(ParseNodeSpacing),
    /// Ordinary text symbol.
    TextOrd(ParseNodeTextOrd),
    /// Accent base glyph.
    #[strum_discriminants(strum(serialize = "accent-token"))]
    AccentToken(ParseNodeAccentToken),
    /// Operator glyph token.
    #[strum_discriminants(strum(serialize = "op-token"))]
    OpToken(ParseNodeOpToken),

    /// Text-mode content inside math.
    Text(ParseNodeText),
    /// Explicit style change (`\displaystyle` etc.).
    Styling(ParseNodeStyling),
    /// Font change applied to a group.
    Font(ParseNodeFont),
    /// Colored subexpression.
    Color(ParseNodeColor),
    /// Sizing command (`\tiny`...`\Huge`).
    Sizing(ParseNodeSizing),

    /// Accent above a base.
    Accent(Box<ParseNodeAccent>),
    /// Line above a group.
    Overline(ParseNodeOverline),
    /// Line below a group.
    Underline(ParseNodeUnderline),

    /// Invisible box with the dimensions of its content.
    Phantom(ParseNodePhantom),
    /// Phantom keeping only width.
    Hphantom(ParseNodeHphantom),
    /// Phantom keeping only height and depth.
    Vphantom(ParseNodeVphantom),

    /// Solid rule of explicit dimensions.
    Rule(ParseNodeRule),
    /// Horizontal kern.
    Kern(ParseNodeKern),
    /// Row terminator (`\\`) inside environments, or a line break.
    Cr(ParseNodeCr),
    /// `\hbox` contents, unbreakable.
    Hbox(ParseNodeHbox),
    /// Forced math class (`\mathbin` etc.).
    Mclass(ParseNodeMclass),
    /// `\middle` delimiter inside a left/right pair.
    Middle(ParseNodeMiddle),
    /// Explicitly sized delimiter (`\bigl` family).
    Delimsizing(ParseNodeDelimsizing),
    /// Infix fraction command (`\over` family) before rewriting.
    Infix(ParseNodeInfix),
    /// Node produced by assignments; renders to nothing.
    Internal(ParseNodeInternal),
    /// `\operatorname` body.
    OperatorName(ParseNodeOperatorName),

    /// `\begin`/`\end` marker.
    Environment(Box<ParseNodeEnvironment>),
    /// Commutative-diagram arrow label.
    CdLabel(ParseNodeCdLabel),
    /// Wrapper holding a CD label fragment.
    CdLabelParent(ParseNodeCdLabelParent),

    /// Color literal argument.
    #[strum_discriminants(strum(serialize = "color-token"))]
    ColorToken(ParseNodeColorToken),
    /// Raw string argument.
    Raw(ParseNodeRaw),
    /// Size argument.
    Size(ParseNodeSize),
    /// Tagged equation.
    Tag(ParseNodeTag),
    /// `\url` argument.
    Url(ParseNodeUrl),
    /// `\href` link with body.
    Href(ParseNodeHref),
    /// Verbatim text.
    Verb(ParseNodeVerb),
}

impl AnyParseNode {
    /// TeXbook algorithms often reference "character boxes": groups whose
    /// innermost element is a single character.
    pub fn is_character_box(&self) -> Result<bool, ParseNodeError> {
        let base_elem = self.to_base_elem()?;
        Ok(matches!(
            base_elem,
            Self::MathOrd { .. } | Self::TextOrd { .. } | Self::Atom { .. }
        ))
    }

    /// The innermost element of a group: single-element ordgroups and
    /// colors are unwrapped, fonts are looked through.
    pub fn to_base_elem(&self) -> Result<&Self, ParseNodeError> {
        match self {
            Self::OrdGroup(ord) => {
                if ord.body.len() == 1 {
                    ord.body[0].to_base_elem()
                } else {
                    Ok(self)
                }
            }
            Self::Color(color) => {
                if color.body.len() == 1 {
                    color.body[0].to_base_elem()
                } else {
                    Ok(self)
                }
            }
            Self::Font(font) => font.body.to_base_elem(),
            _ => Ok(self),
        }
    }

    /// The mode this node was parsed in.
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Self::Array(node) => node.mode,
            Self::OrdGroup(node) => node.mode,
            Self::SupSub(node) => node.mode,
            Self::Genfrac(node) => node.mode,
            Self::LeftRight(node) => node.mode,
            Self::LeftRightRight(node) => node.mode,
            Self::Sqrt(node) => node.mode,
            Self::Atom(node) => node.mode,
            Self::MathOrd(node) => node.mode,
            Self::Op(op) => match op {
                ParseNodeOp::Symbol { mode, .. } | ParseNodeOp::Body { mode, .. } => *mode,
            },
            Self::Spacing(node) => node.mode,
            Self::TextOrd(node) => node.mode,
            Self::AccentToken(node) => node.mode,
            Self::OpToken(node) => node.mode,
            Self::Text(node) => node.mode,
            Self::Styling(node) => node.mode,
            Self::Font(node) => node.mode,
            Self::Color(node) => node.mode,
            Self::Sizing(node) => node.mode,
            Self::Accent(node) => node.mode,
            Self::Overline(node) => node.mode,
            Self::Underline(node) => node.mode,
            Self::Phantom(node) => node.mode,
            Self::Hphantom(node) => node.mode,
            Self::Vphantom(node) => node.mode,
            Self::Rule(node) => node.mode,
            Self::Kern(node) => node.mode,
            Self::Cr(node) => node.mode,
            Self::Hbox(node) => node.mode,
            Self::Mclass(node) => node.mode,
            Self::Middle(node) => node.mode,
            Self::Delimsizing(node) => node.mode,
            Self::Infix(node) => node.mode,
            Self::Internal(node) => node.mode,
            Self::OperatorName(node) => node.mode,
            Self::Environment(node) => node.mode,
            Self::CdLabel(node) => node.mode,
            Self::CdLabelParent(node) => node.mode,
            Self::ColorToken(node) => node.mode,
            Self::Raw(node) => node.mode,
            Self::Size(node) => node.mode,
            Self::Tag(node) => node.mode,
            Self::Url(node) => node.mode,
            Self::Href(node) => node.mode,
            Self::Verb(node) => node.mode,
        }
    }

    /// The text of a symbol node; `None` for anything that is not a
    /// symbol.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Atom(node) => Some(&node.text),
            Self::AccentToken(node) => Some(&node.text),
            Self::MathOrd(node) => Some(&node.text),
            Self::OpToken(node) => Some(&node.text),
            Self::Spacing(node) => Some(&node.text),
            Self::TextOrd(node) => Some(&node.text),
            _ => None,
        }
    }

    /// The label of an accent node, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Accent(acc) => Some(&acc.label),
            _ => None,
        }
    }
}

impl ErrorLocationProvider for AnyParseNode {
    fn loc(&self) -> Option<&SourceLocation> {
        match self {
            Self::Array(node) => node.loc.as_ref(),
            Self::OrdGroup(node) => node.loc.as_ref(),
            Self::SupSub(node) => node.loc.as_ref(),
            Self::Genfrac(node) => node.loc.as_ref(),
            Self::LeftRight(node) => node.loc.as_ref(),
            Self::LeftRightRight(node) => node.loc.as_ref(),
            Self::Sqrt(node) => node.loc.as_ref(),
            Self::Atom(node) => node.loc.as_ref(),
            Self::MathOrd(node) => node.loc.as_ref(),
            Self::Op(node) => match node {
                ParseNodeOp::Symbol { loc, .. } | ParseNodeOp::Body { loc, .. } => loc.as_ref(),
            },
            Self::Spacing(node) => node.loc.as_ref(),
            Self::TextOrd(node) => node.loc.as_ref(),
            Self::AccentToken(node) => node.loc.as_ref(),
            Self::OpToken(node) => node.loc.as_ref(),
            Self::Text(node) => node.loc.as_ref(),
            Self::Styling(node) => node.loc.as_ref(),
            Self::Font(node) => node.loc.as_ref(),
            Self::Color(node) => node.loc.as_ref(),
            Self::Sizing(node) => node.loc.as_ref(),
            Self::Accent(node) => node.loc.as_ref(),
            Self::Overline(node) => node.loc.as_ref(),
            Self::Underline(node) => node.loc.as_ref(),
            Self::Phantom(node) => node.loc.as_ref(),
            Self::Hphantom(node) => node.loc.as_ref(),
            Self::Vphantom(node) => node.loc.as_ref(),
            Self::Rule(node) => node.loc.as_ref(),
            Self::Kern(node) => node.loc.as_ref(),
            Self::Cr(node) => node.loc.as_ref(),
            Self::Hbox(node) => node.loc.as_ref(),
            Self::Mclass(node) => node.loc.as_ref(),
            Self::Middle(node) => node.loc.as_ref(),
            Self::Delimsizing(node) => node.loc.as_ref(),
            Self::Infix(node) => node.loc.as_ref(),
            Self::Internal(node) => node.loc.as_ref(),
            Self::OperatorName(node) => node.loc.as_ref(),
            Self::Environment(node) => node.loc.as_ref(),
            Self::CdLabel(node) => node.loc.as_ref(),
            Self::CdLabelParent(node) => node.loc.as_ref(),
            Self::ColorToken(node) => node.loc.as_ref(),
            Self::Raw(node) => node.loc.as_ref(),
            Self::Size(node) => node.loc.as_ref(),
            Self::Tag(node) => node.loc.as_ref(),
            Self::Url(node) => node.loc.as_ref(),
            Self::Href(node) => node.loc.as_ref(),
            Self::Verb(node) => node.loc.as_ref(),
        }
    }
}

impl ErrorLocationProvider for Option<AnyParseNode> {
    fn loc(&self) -> Option<&SourceLocation> {
        self.as_ref()?.loc()
    }
}

/// One entry of an array's equation-tag list.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseNodeArrayTag {
    /// `true` for an automatic number, `false` for `\nonumber`.
    Bool(bool),
    /// Explicit `\tag` content.
    Nodes(Vec<AnyParseNode>),
}

impl From<Vec<AnyParseNode>> for ParseNodeArrayTag {
    fn from(nodes: Vec<AnyParseNode>) -> Self {
        Self::Nodes(nodes)
    }
}

impl From<bool> for ParseNodeArrayTag {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl ParseNodeArrayTag {
    /// Whether the row gets a number or tag at all.
    #[must_use]
    pub fn is_true(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Nodes(_) => true,
        }
    }
}

/// Body of an array-like environment: a grid of cells with row and
/// column decoration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeArray {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Column separation flavor.
    pub col_separation_type: Option<ColSeparationType>,
    /// Pad the array with `\arraycolsep` on both sides.
    pub hskip_before_and_after: Option<bool>,
    /// Add `\jot` to each row gap.
    pub add_jot: Option<bool>,
    /// Column specs; `None` means all centered.
    pub cols: Option<Vec<AlignSpec>>,
    /// Row height multiplier.
    pub arraystretch: f64,
    /// Cells, row-major.
    pub body: Vec<Vec<AnyParseNode>>,
    /// Extra space after each row, from `\\[dim]`.
    pub row_gaps: Vec<Option<MeasurementOwned>>,
    /// Horizontal rules before each row (one extra entry for the bottom).
    pub h_lines_before_row: Vec<Vec<bool>>,
    /// Equation tags per row, for alignment environments.
    pub tags: Option<Vec<ParseNodeArrayTag>>,
    /// Put tags on the left.
    pub leqno: Option<bool>,
    /// Rendered as a commutative diagram.
    pub is_cd: Option<bool>,
}

/// Label on a commutative-diagram arrow.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeCdLabel {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Which side of the arrow the label sits on.
    pub side: String,
    /// The label content.
    pub label: Box<AnyParseNode>,
}

/// Wrapper around a fragment that carries CD labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeCdLabelParent {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The labeled fragment.
    pub fragment: Box<AnyParseNode>,
}

/// Colored subexpression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeColor {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// CSS color value.
    pub color: String,
    /// The colored content.
    pub body: Vec<AnyParseNode>,
}

impl From<ParseNodeColor> for AnyParseNode {
    fn from(node: ParseNodeColor) -> Self {
        Self::Color(node)
    }
}

/// A color literal consumed as an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeColorToken {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// CSS color value.
    pub color: String,
}

/// Large operator: either a single glyph (`\sum`) or arbitrary content
/// (`\mathop`, `\operatorname` internals).
#[derive(Debug, Clone, PartialEq)]
pub enum ParseNodeOp {
    /// A named operator glyph.
    Symbol {
        /// Parsing mode.
        mode: Mode,
        /// Source span.
        loc: Option<SourceLocation>,
        /// Render limits above/below instead of as scripts.
        limits: bool,
        /// Scripts must be handled by the op builder even without limits.
        always_handle_sup_sub: Option<bool>,
        /// Do not center the glyph on the axis.
        suppress_base_shift: Option<bool>,
        /// Set when a sup/sub node adopts this op as its base.
        parent_is_sup_sub: bool,
        /// Command name, e.g. `\sum`.
        name: String,
        /// Whether the name maps to a single symbol glyph.
        symbol: bool,
    },
    /// An operator built from a list of nodes.
    Body {
        /// Parsing mode.
        mode: Mode,
        /// Source span.
        loc: Option<SourceLocation>,
        /// Render limits above/below instead of as scripts.
        limits: bool,
        /// Scripts must be handled by the op builder even without limits.
        always_handle_sup_sub: Option<bool>,
        /// Do not center the content on the axis.
        suppress_base_shift: Option<bool>,
        /// Set when a sup/sub node adopts this op as its base.
        parent_is_sup_sub: bool,
        /// The operator content.
        body: Vec<AnyParseNode>,
    },
}

impl ParseNodeOp {
    /// Whether limits render above/below.
    #[must_use]
    pub const fn limits(&self) -> bool {
        match self {
            Self::Symbol { limits, .. } | Self::Body { limits, .. } => *limits,
        }
    }

    /// Mutable access to the limits flag, for `\limits`/`\nolimits`.
    #[must_use]
    pub const fn limits_mut(&mut self) -> &mut bool {
        match self {
            Self::Symbol { limits, .. } | Self::Body { limits, .. } => limits,
        }
    }

    /// Whether the op builder must handle adjacent scripts itself.
    #[must_use]
    pub fn always_handle_sup_sub(&self) -> bool {
        match self {
            Self::Symbol {
                always_handle_sup_sub,
                ..
            }
            | Self::Body {
                always_handle_sup_sub,
                ..
            } => always_handle_sup_sub.unwrap_or(false),
        }
    }

    /// Mutable access to the sup/sub handling flag.
    #[must_use]
    pub const fn always_handle_sup_sub_mut(&mut self) -> &mut Option<bool> {
        match self {
            Self::Symbol {
                always_handle_sup_sub,
                ..
            }
            | Self::Body {
                always_handle_sup_sub,
                ..
            } => always_handle_sup_sub,
        }
    }

    /// The command name of a symbol op.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Symbol { name, .. } => Some(name),
            Self::Body { .. } => None,
        }
    }
}

/// Braced group.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeOrdGroup {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The grouped content.
    pub body: Vec<AnyParseNode>,
    /// Group created implicitly, without braces in the source.
    pub semisimple: Option<bool>,
}

/// Raw string captured as an argument (e.g. a URL or verbatim size).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeRaw {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The raw text.
    pub string: String,
}

/// Size argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeSize {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The measurement.
    pub value: MeasurementOwned,
    /// An optional size argument that was left empty.
    pub is_blank: bool,
}

/// Explicit style change applied to trailing content.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeStyling {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The style to switch to.
    pub style: &'static Style,
    /// The styled content.
    pub body: Vec<AnyParseNode>,
}

/// Base with attached scripts.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeSupSub {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The base; `None` for a bare script.
    pub base: Option<Box<AnyParseNode>>,
    /// Superscript.
    pub sup: Option<Box<AnyParseNode>>,
    /// Subscript.
    pub sub: Option<Box<AnyParseNode>>,
}

/// Tagged equation produced by `\tag`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeTag {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The tagged expression.
    pub body: Vec<AnyParseNode>,
    /// The tag content.
    pub tag: Vec<AnyParseNode>,
}

/// Text-mode content inside math.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeText {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The text content, parsed in text mode.
    pub body: Vec<AnyParseNode>,
    /// Font command that produced this node, if any.
    pub font: Option<String>,
}

/// `\url` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeUrl {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The link target.
    pub url: String,
}

/// `\href` link.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeHref {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The link target.
    pub href: String,
    /// The visible content.
    pub body: Vec<AnyParseNode>,
}

/// Verbatim text from `\verb`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeVerb {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The literal text.
    pub body: String,
    /// Starred form: show spaces as open boxes.
    pub star: bool,
}

/// Symbol carrying an atom spacing family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeAtom {
    /// Spacing family.
    pub family: Atom,
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Symbol text.
    pub text: String,
}

/// Ordinary math symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeMathOrd {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Symbol text.
    pub text: String,
}

/// Explicit spacing symbol such as `\;` or `\nobreakspace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeSpacing {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The spacing command.
    pub text: String,
}

/// Ordinary text symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeTextOrd {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Symbol text.
    pub text: String,
}

/// Accent glyph used as a base symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeAccentToken {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Symbol text.
    pub text: String,
}

/// Operator glyph used as a base symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeOpToken {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Symbol text.
    pub text: String,
}

/// Accent above a base.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeAccent {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The accent command, e.g. `\hat`.
    pub label: String,
    /// Accent stretches to the width of the base.
    pub is_stretchy: Option<bool>,
    /// Accent follows the skew of the base character.
    pub is_shifty: Option<bool>,
    /// The accented content.
    pub base: AnyParseNode,
}

/// Row terminator or forced line break.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeCr {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Break a line outside an environment.
    pub new_line: bool,
    /// Extra vertical space from `\\[dim]`.
    pub size: Option<MeasurementOwned>,
}

/// Explicitly sized delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeDelimsizing {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Size level, 1 through 4.
    pub size: u8,
    /// Math class the delimiter takes on.
    pub mclass: String,
    /// The delimiter symbol.
    pub delim: String,
}

/// `\begin`/`\end` marker node.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeEnvironment {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Environment name.
    pub name: String,
    /// The name as it was parsed, for error reporting.
    pub name_group: Box<AnyParseNode>,
}

impl From<ParseNodeEnvironment> for AnyParseNode {
    fn from(value: ParseNodeEnvironment) -> Self {
        Self::Environment(Box::new(value))
    }
}

/// Font change applied to a group.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeFont {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Font name, e.g. `mathbf`.
    pub font: String,
    /// The content in that font.
    pub body: Box<AnyParseNode>,
}

/// Generalized fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeGenfrac {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Continued fraction (`\cfrac`): numerator stays full-size.
    pub continued: bool,
    /// Numerator.
    pub numer: Box<AnyParseNode>,
    /// Denominator.
    pub denom: Box<AnyParseNode>,
    /// Draw the fraction bar.
    pub has_bar_line: bool,
    /// Left delimiter, for binomial-style commands.
    pub left_delim: Option<String>,
    /// Right delimiter, for binomial-style commands.
    pub right_delim: Option<String>,
    /// Forced display style; `None` picks automatically.
    pub size: Option<&'static Style>,
    /// Explicit bar thickness.
    pub bar_size: Option<MeasurementOwned>,
}

/// Unbreakable horizontal box.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeHbox {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The box content.
    pub body: Vec<AnyParseNode>,
}

/// Infix fraction command before expression rewriting.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeInfix {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The prefix command the infix rewrites to, e.g. `\\frac`.
    pub replace_with: String,
    /// Bar size for `\above`.
    pub size: Option<MeasurementOwned>,
    /// The token that produced this infix, for error reporting.
    pub token: Option<Token>,
}

/// Node left behind by assignments and other side-effecting commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeInternal {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
}

/// Horizontal kern.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeKern {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Kern amount.
    pub dimension: MeasurementOwned,
}

/// `\left`...`\right` pair with its body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeLeftRight {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The enclosed content.
    pub body: Vec<AnyParseNode>,
    /// Left delimiter.
    pub left: String,
    /// Right delimiter.
    pub right: String,
    /// Color of the right delimiter, for `\cfrac` internals.
    pub right_color: Option<String>,
}

/// The `\right` half of a delimiter pair, before it is folded into
/// [`ParseNodeLeftRight`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeLeftRightRight {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The delimiter.
    pub delim: String,
    /// Delimiter color.
    pub color: Option<String>,
}

/// `\middle` delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeMiddle {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The delimiter.
    pub delim: String,
}

/// Group with a forced math class.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeMclass {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The class, e.g. `"mbin"`.
    pub mclass: String,
    /// The classed content.
    pub body: Vec<AnyParseNode>,
    /// Content is a single character box.
    pub is_character_box: bool,
}

/// `\operatorname` content.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeOperatorName {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The operator name content.
    pub body: Vec<AnyParseNode>,
    /// Scripts must be handled by the builder.
    pub always_handle_sup_sub: bool,
    /// Render limits above/below.
    pub limits: bool,
    /// Set when a sup/sub node adopts this as its base.
    pub parent_is_sup_sub: bool,
}

/// Line above a group.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeOverline {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The content under the line.
    pub body: Box<AnyParseNode>,
}

/// Line below a group.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeUnderline {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The content above the line.
    pub body: Box<AnyParseNode>,
}

/// Invisible content keeping full dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodePhantom {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The hidden content.
    pub body: Vec<AnyParseNode>,
}

/// Invisible content keeping only width.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeHphantom {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The hidden content.
    pub body: Box<AnyParseNode>,
}

/// Invisible content keeping only height and depth.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeVphantom {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The hidden content.
    pub body: Box<AnyParseNode>,
}

/// Solid rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeRule {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Vertical offset of the baseline.
    pub shift: Option<MeasurementOwned>,
    /// Rule width.
    pub width: MeasurementOwned,
    /// Rule height.
    pub height: MeasurementOwned,
}

/// Sizing command applied to trailing content.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeSizing {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// Size index, 1 (`\tiny`) through 11 (`\HUGE`).
    pub size: usize,
    /// The sized content.
    pub body: Vec<AnyParseNode>,
}

/// Radical.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNodeSqrt {
    /// Parsing mode.
    pub mode: Mode,
    /// Source span.
    pub loc: Option<SourceLocation>,
    /// The radicand.
    pub body: AnyParseNode,
    /// Optional root index.
    pub index: Option<AnyParseNode>,
}

/// Errors from node-shape assertions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseNodeError {
    /// A node had a different type than the caller required.
    #[error("Expected node of type {expected}, but got {actual}")]
    TypeMismatch {
        /// The required type.
        expected: NodeType,
        /// The actual type, or `"null"`.
        actual: String,
    },
    /// A node was required to be a symbol node but was not.
    #[error("Expected node of symbol group type, but got {actual}")]
    NotSymbolNode {
        /// The actual type, or `"null"`.
        actual: String,
    },
}

/// Asserts that `node` is present and has the given type.
pub fn assert_node_type(
    node: Option<&AnyParseNode>,
    expected_type: NodeType,
) -> Result<NodeType, ParseNodeError> {
    let node = node.ok_or_else(|| ParseNodeError::TypeMismatch {
        expected: expected_type,
        actual: "null".to_owned(),
    })?;
    let actual_type = NodeType::from(node);
    if actual_type == expected_type {
        Ok(actual_type)
    } else {
        Err(ParseNodeError::TypeMismatch {
            expected: expected_type,
            actual: actual_type.to_string(),
        })
    }
}

/// The type of `node` if it is one of the six symbol node kinds.
#[must_use]
pub fn check_symbol_node_type(node: Option<&AnyParseNode>) -> Option<NodeType> {
    match node? {
        node @ (AnyParseNode::Atom(_)
        | AnyParseNode::MathOrd(_)
        | AnyParseNode::Spacing(_)
        | AnyParseNode::TextOrd(_)
        | AnyParseNode::AccentToken(_)
        | AnyParseNode::OpToken(_)) => Some(NodeType::from(node)),
        _ => None,
    }
}

/// Asserts that `node` is a symbol node.
pub fn assert_symbol_node_type(node: Option<&AnyParseNode>) -> Result<NodeType, ParseNodeError> {
    check_symbol_node_type(node).ok_or_else(|| {
        let actual = node.map_or_else(|| "null".to_owned(), |n| NodeType::from(n).to_string());
        ParseNodeError::NotSymbolNode { actual }
    })
}

/// A mapping from node types to values, used for the builder registries.
pub type NodeTypeMap<V> = KeyMap<NodeType, V>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Atom;

    fn plus_atom() -> AnyParseNode {
        AnyParseNode::Atom(ParseNodeAtom {
            family: Atom::Bin,
            mode: Mode::Math,
            loc: None,
            text: "+".to_owned(),
        })
    }

    #[test]
    fn test_node_type_serialization() {
        assert_eq!(NodeType::OrdGroup.to_string(), "ordgroup");
        assert_eq!(NodeType::SupSub.to_string(), "supsub");
        assert_eq!(NodeType::LeftRightRight.to_string(), "leftright-right");
        assert_eq!(NodeType::ColorToken.to_string(), "color-token");
        assert_eq!(NodeType::AccentToken.to_string(), "accent-token");
        assert_eq!(NodeType::OpToken.to_string(), "op-token");
        assert_eq!(NodeType::OperatorName.to_string(), "operatorname");
    }

    #[test]
    fn test_assert_node_type() {
        let node = plus_atom();
        assert_eq!(
            assert_node_type(Some(&node), NodeType::Atom),
            Ok(NodeType::Atom)
        );
        assert_eq!(
            assert_node_type(Some(&node), NodeType::MathOrd),
            Err(ParseNodeError::TypeMismatch {
                expected: NodeType::MathOrd,
                actual: "atom".to_owned(),
            })
        );
        assert_eq!(
            assert_node_type(None, NodeType::Atom),
            Err(ParseNodeError::TypeMismatch {
                expected: NodeType::Atom,
                actual: "null".to_owned(),
            })
        );
    }

    #[test]
    fn test_symbol_node_checks() {
        let atom = plus_atom();
        assert_eq!(check_symbol_node_type(Some(&atom)), Some(NodeType::Atom));

        let group = AnyParseNode::OrdGroup(ParseNodeOrdGroup {
            mode: Mode::Math,
            loc: None,
            body: vec![],
            semisimple: None,
        });
        assert_eq!(check_symbol_node_type(Some(&group)), None);
        assert_eq!(
            assert_symbol_node_type(Some(&group)),
            Err(ParseNodeError::NotSymbolNode {
                actual: "ordgroup".to_owned(),
            })
        );
    }

    #[test]
    fn test_to_base_elem_unwraps_singleton_groups() {
        let atom = plus_atom();
        let wrapped = AnyParseNode::OrdGroup(ParseNodeOrdGroup {
            mode: Mode::Math,
            loc: None,
            body: vec![AnyParseNode::Color(ParseNodeColor {
                mode: Mode::Math,
                loc: None,
                color: "red".to_owned(),
                body: vec![atom.clone()],
            })],
            semisimple: None,
        });
        assert_eq!(wrapped.to_base_elem(), Ok(&atom));
        assert_eq!(wrapped.is_character_box(), Ok(true));
    }

    #[test]
    fn test_text_accessor() {
        assert_eq!(plus_atom().text(), Some("+"));
        let kern = AnyParseNode::Kern(ParseNodeKern {
            mode: Mode::Math,
            loc: None,
            dimension: MeasurementOwned {
                number: 1.0,
                unit: "em".to_owned(),
            },
        });
        assert_eq!(kern.text(), None);
    }
}
