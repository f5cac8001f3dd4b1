//! Macro definitions and the context interface their expansion runs under.

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::context::EngineContext;
use crate::namespace::{KeyMap, Namespace};
use crate::types::{Mode, ParseError, Token};

pub mod builtins;

/// Mutable macro table seeded from [`crate::types::Settings`].
pub type MacroMap = KeyMap<String, MacroDefinition>;

/// One consumed macro argument: its tokens plus the boundary tokens, kept
/// for span-accurate error reporting.
#[derive(Debug, Clone)]
pub struct MacroArg {
    /// Argument content in reverse order, ready for the stack.
    pub tokens: Vec<Token>,
    /// Token that opened the argument (`{` or the first content token).
    pub start: Token,
    /// Token that closed it.
    pub end: Token,
}

/// A macro body after resolution: replacement tokens plus the parameter
/// signature needed to consume its arguments.
#[derive(Debug, Clone, Default)]
pub struct MacroExpansion {
    /// Replacement tokens in reverse order for stack pushing.
    pub tokens: Vec<Token>,
    /// How many `#n` parameters the body references.
    pub num_args: usize,
    /// Delimiter token lists for delimited parameters, `num_args + 1`
    /// entries when present (leading delimiter included).
    pub delimiters: Option<Vec<Vec<String>>>,
    /// Set for `\let`-style aliases that must not expand further.
    pub unexpandable: Option<bool>,
}

/// Callback form of a macro body.
pub type MacroFunction = Arc<
    dyn Fn(&mut dyn MacroContextInterface) -> Result<MacroExpansionResult, ParseError>
        + Send
        + Sync,
>;

/// Plain-fn form usable in static tables.
pub type StaticMacroFunction =
    fn(&mut dyn MacroContextInterface) -> Result<MacroExpansionResult, ParseError>;

/// How a macro is defined.
#[derive(Clone)]
pub enum MacroDefinition {
    /// Replacement text, re-lexed on use.
    String(String),
    /// Replacement text as a static string.
    StaticStr(&'static str),
    /// Pre-tokenized body with an explicit signature.
    Expansion(MacroExpansion),
    /// Callback that computes the expansion from context.
    Function(MacroFunction),
    /// Callback as a plain fn, for the builtin table.
    StaticFunction(StaticMacroFunction),
}

impl MacroDefinition {
    /// The replacement text, for the two string forms.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::StaticStr(s) => Some(s),
            _ => None,
        }
    }
}

impl Debug for MacroDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::StaticStr(s) => f.debug_tuple("StaticStr").field(s).finish(),
            Self::Expansion(e) => f.debug_tuple("Expansion").field(e).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
            Self::StaticFunction(_) => f.write_str("StaticFunction(..)"),
        }
    }
}

/// What a callback macro produced.
#[derive(Debug, Clone)]
pub enum MacroExpansionResult {
    /// Replacement text, re-lexed on use.
    String(String),
    /// A ready expansion.
    Expansion(MacroExpansion),
    /// Nothing; the macro vanishes from the stream.
    Empty,
}

/// Context handed to callback macros: mode, namespaces, and the token
/// stream operations of the expander.
///
/// Implemented by [`crate::macro_expander::MacroExpander`]; the trait seam
/// keeps macro bodies independent of the concrete expander type.
pub trait MacroContextInterface<'a> {
    /// Current parsing mode.
    fn mode(&self) -> Mode;

    /// The engine registry (functions, symbols, metrics).
    fn context(&self) -> &EngineContext;

    /// The macro namespace, read-only.
    fn macros<'s>(&'s self) -> &'s Namespace<'a, MacroDefinition>;

    /// The macro namespace, for defining and redefining.
    fn macros_mut<'s>(&'s mut self) -> &'s mut Namespace<'a, MacroDefinition>;

    /// Next token without consuming it.
    fn future_mut(&mut self) -> Result<Token, ParseError>;

    /// Consume and return the next token, unexpanded.
    fn pop_token(&mut self) -> Result<Token, ParseError>;

    /// Discard consecutive whitespace tokens without expanding.
    fn consume_spaces(&mut self) -> Result<(), ParseError>;

    /// Expand the next token once if possible.
    ///
    /// Returns the change in stack length, or `None` when the token was
    /// not expandable. With `expandable_only`, tokens protected by
    /// `\noexpand` or `\let` stay put.
    fn expand_once(&mut self, expandable_only: Option<bool>) -> Result<Option<isize>, ParseError>;

    /// Expand the next token once, then peek, as in
    /// `\expandafter\futurelet`.
    fn expand_after_future(&mut self) -> Result<Token, ParseError>;

    /// Expand until the next token is unexpandable, and consume it.
    fn expand_next_token(&mut self) -> Result<Token, ParseError>;

    /// Fully expand the named macro to forward-order tokens, or `None`
    /// when it is not defined.
    fn expand_macro(&mut self, name: &str) -> Result<Option<Vec<Token>>, ParseError>;

    /// Like [`Self::expand_macro`] but concatenated to a string.
    fn expand_macro_as_text(&mut self, name: &str) -> Result<Option<String>, ParseError>;

    /// Fully expand a token list (given in reverse order) to forward-order
    /// tokens.
    fn expand_tokens(&mut self, tokens: Vec<Token>) -> Result<Vec<Token>, ParseError>;

    /// Consume one argument, braced or delimited.
    fn consume_arg(&mut self, delims: Option<&Vec<String>>) -> Result<MacroArg, ParseError>;

    /// Consume `num_args` braced arguments.
    fn consume_args(&mut self, num_args: usize) -> Result<Vec<Vec<Token>>, ParseError>;

    /// Whether `name` means anything: macro, function, symbol, or
    /// implicit command.
    fn is_defined(&self, name: &str) -> bool;

    /// Whether `name` would expand (macros yes, functions and symbols no).
    fn is_expandable(&self, name: &str) -> bool;

    /// Open a macro-namespace group.
    fn begin_group(&mut self);

    /// Close the innermost macro-namespace group.
    fn end_group(&mut self) -> Result<(), ParseError>;
}
