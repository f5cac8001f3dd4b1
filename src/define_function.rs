//! Registration types for command handlers and their builder pairs.
//!
//! Every supported command is described by a [`FunctionDefSpec`]: its
//! names, parsing properties, a handler that turns consumed arguments
//! into a parse node, and the HTML/MathML builders for the node type it
//! produces.

use crate::context::EngineContext;
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::MathDomNode;
use crate::options::Options;
use crate::parser::Parser;
use crate::parser::parse_node::{AnyParseNode, NodeType};
use crate::types::{ArgType, BreakToken, ErrorLocationProvider as _, SourceLocation};
use crate::types::{ParseError, Token};

/// What a handler gets to see while it runs: the parser, the name the
/// command was invoked under, and the token that named it.
pub struct FunctionContext<'a, 'b> {
    /// The command name, including the backslash.
    pub func_name: String,
    /// The parser, for handlers that consume further input themselves.
    pub parser: &'a mut Parser<'b>,
    /// The token that invoked the command.
    pub token: Option<&'a Token>,
    /// The token text the surrounding expression stops at, if any.
    pub break_on_token_text: Option<&'a BreakToken>,
}

impl FunctionContext<'_, '_> {
    /// Source span of the invoking token, if known.
    #[must_use]
    pub fn loc(&self) -> Option<SourceLocation> {
        self.token?.loc().cloned()
    }
}

/// Handler invoked once the parser has consumed a command's arguments.
pub type FunctionHandler = fn(
    context: FunctionContext,
    args: Vec<AnyParseNode>,
    opt_args: Vec<Option<AnyParseNode>>,
) -> Result<AnyParseNode, ParseError>;

/// Builds the box-tree rendering of one node type.
pub type HtmlBuilder = fn(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError>;

/// Builds the MathML rendering of one node type.
pub type MathMLBuilder = fn(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError>;

/// Parsing properties of a command.
#[derive(Debug, Clone)]
pub struct FunctionPropSpec {
    /// Number of required arguments.
    pub num_args: usize,
    /// Per-argument parse types; `None` parses every argument as an
    /// ordinary group.
    pub arg_types: Option<Vec<ArgType>>,
    /// May appear where a single token is expected, without braces.
    pub allowed_in_argument: bool,
    /// Usable in text mode.
    pub allowed_in_text: bool,
    /// Usable in math mode.
    pub allowed_in_math: bool,
    /// Number of optional `[...]` arguments.
    pub num_optional_args: usize,
    /// Infix command that splits the current expression (`\over` family).
    pub infix: bool,
    /// TeX primitive; survives `\expandafter` and friends unexpanded.
    pub primitive: bool,
}

impl Default for FunctionPropSpec {
    fn default() -> Self {
        Self {
            num_args: 0,
            arg_types: None,
            allowed_in_argument: false,
            allowed_in_text: false,
            allowed_in_math: true,
            num_optional_args: 0,
            infix: false,
            primitive: false,
        }
    }
}

/// A command definition as passed to
/// [`EngineContext::define_function`].
pub struct FunctionDefSpec<'b> {
    /// The node type the handler produces; registers the builders under
    /// this key. `None` for handler-less or builder-less registrations.
    pub node_type: Option<NodeType>,
    /// The names the command answers to.
    pub names: &'b [&'b str],
    /// Parsing properties.
    pub props: FunctionPropSpec,
    /// The handler; `None` for commands the parser treats specially.
    pub handler: Option<FunctionHandler>,
    /// Box-tree builder for the produced node type.
    pub html_builder: Option<HtmlBuilder>,
    /// MathML builder for the produced node type.
    pub mathml_builder: Option<MathMLBuilder>,
}

/// The per-name record the parser consults, flattened from a
/// [`FunctionDefSpec`].
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    /// The node type the handler produces.
    pub node_type: Option<NodeType>,
    /// Number of required arguments.
    pub num_args: usize,
    /// Per-argument parse types.
    pub arg_types: Option<Vec<ArgType>>,
    /// May appear where a single token is expected.
    pub allowed_in_argument: bool,
    /// Usable in text mode.
    pub allowed_in_text: bool,
    /// Usable in math mode.
    pub allowed_in_math: bool,
    /// Number of optional arguments.
    pub num_optional_args: usize,
    /// Infix command.
    pub infix: bool,
    /// TeX primitive.
    pub primitive: bool,
    /// The handler.
    pub handler: Option<FunctionHandler>,
}

/// Argument-consumption interface shared by functions and environments.
///
/// The parser reads these through a trait object so
/// [`Parser::parse_arguments`](crate::parser::Parser::parse_arguments)
/// serves both registries.
pub trait Spec {
    /// Number of required arguments.
    fn num_args(&self) -> usize;
    /// Number of optional `[...]` arguments.
    fn num_optional_args(&self) -> usize;
    /// Per-argument parse types, if any are overridden.
    fn arg_types(&self) -> Option<&Vec<ArgType>>;
    /// Whether this is a TeX primitive.
    fn primitive(&self) -> bool;
    /// The node type produced, when fixed.
    fn node_type(&self) -> Option<&NodeType>;
}

impl Spec for FunctionSpec {
    fn num_args(&self) -> usize {
        self.num_args
    }

    fn num_optional_args(&self) -> usize {
        self.num_optional_args
    }

    fn arg_types(&self) -> Option<&Vec<ArgType>> {
        self.arg_types.as_ref()
    }

    fn primitive(&self) -> bool {
        self.primitive
    }

    fn node_type(&self) -> Option<&NodeType> {
        self.node_type.as_ref()
    }
}

/// Unwraps a single-element ordgroup argument.
#[must_use]
pub fn normalize_argument(arg: &AnyParseNode) -> &AnyParseNode {
    if let AnyParseNode::OrdGroup(ord) = arg
        && ord.body.len() == 1
    {
        return &ord.body[0];
    }
    arg
}

/// Flattens an argument into the list of nodes a builder iterates over.
#[must_use]
pub fn ord_argument(arg: &AnyParseNode) -> Vec<AnyParseNode> {
    if let AnyParseNode::OrdGroup(ord) = arg {
        return ord.body.clone();
    }
    vec![arg.clone()]
}
