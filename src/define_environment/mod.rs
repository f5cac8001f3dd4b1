//! Registration types for `\begin`/`\end` environments.
//!
//! Environments share the argument-consumption machinery with ordinary
//! commands through the [`Spec`] trait, but their handlers receive the
//! parser positioned just after `\begin{name}` and its arguments, and
//! consume the body up to the matching `\end` themselves.

mod array;
mod cd;

pub use array::{define_array, parse_array};
pub use cd::{define_cd, parse_cd};

use crate::define_function::{HtmlBuilder, MathMLBuilder, Spec};
use crate::parser::Parser;
use crate::parser::parse_node::{AnyParseNode, NodeType};
use crate::types::{ArgType, Mode, ParseError};

/// What an environment handler gets to see while it runs.
pub struct EnvContext<'a, 'b> {
    /// Mode at the `\begin`.
    pub mode: Mode,
    /// The environment name, without braces.
    pub env_name: String,
    /// The parser, positioned at the start of the body.
    pub parser: &'a mut Parser<'b>,
}

/// Handler invoked once the parser has consumed an environment's
/// arguments. It must leave the parser just before the `\end`.
pub type EnvHandler = fn(
    context: EnvContext,
    args: Vec<AnyParseNode>,
    opt_args: Vec<Option<AnyParseNode>>,
) -> Result<AnyParseNode, ParseError>;

/// Parsing properties of an environment.
#[derive(Debug, Clone, Default)]
pub struct EnvProps {
    /// Number of required arguments after `\begin{name}`.
    pub num_args: usize,
    /// Per-argument parse types.
    pub arg_types: Option<Vec<ArgType>>,
    /// Usable in text mode.
    pub allowed_in_text: bool,
    /// Number of optional `[...]` arguments.
    pub num_optional_args: usize,
}

/// An environment definition as passed to
/// [`EngineContext::define_environment`](crate::context::EngineContext::define_environment).
pub struct EnvDefSpec<'b> {
    /// The node type the handler produces; registers the builders under
    /// this key.
    pub node_type: NodeType,
    /// The names the environment answers to.
    pub names: &'b [&'b str],
    /// Parsing properties.
    pub props: EnvProps,
    /// The handler.
    pub handler: EnvHandler,
    /// Box-tree builder for the produced node type.
    pub html_builder: Option<HtmlBuilder>,
    /// MathML builder for the produced node type.
    pub mathml_builder: Option<MathMLBuilder>,
}

/// The per-name record the parser consults, flattened from an
/// [`EnvDefSpec`].
#[derive(Debug, Clone)]
pub struct EnvSpec {
    /// The node type the handler produces.
    pub node_type: NodeType,
    /// Number of required arguments.
    pub num_args: usize,
    /// Per-argument parse types.
    pub arg_types: Option<Vec<ArgType>>,
    /// Usable in text mode.
    pub allowed_in_text: bool,
    /// Number of optional arguments.
    pub num_optional_args: usize,
    /// The handler.
    pub handler: EnvHandler,
}

impl Spec for EnvSpec {
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
        false
    }

    fn node_type(&self) -> Option<&NodeType> {
        Some(&self.node_type)
    }
}
