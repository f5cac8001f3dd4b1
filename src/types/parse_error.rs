//! Structured errors for lexing, expansion, parsing and building.
//!
//! Every failure surfaces as a single [`ParseError`] carrying a categorised
//! kind and, when a token or parse node was at hand, the offending source
//! span rendered as an underlined context snippet.

use std::fmt;
use thiserror::Error;

use crate::parser::parse_node::NodeType;
use crate::types::{Mode, SourceLocation};

/// Main error type returned by the engine when an expression is rejected.
#[derive(Debug, Error)]
#[error("math parse error: {kind}{context}")]
pub struct ParseError {
    /// Categorised reason for the failure.
    #[source]
    pub kind: Box<ParseErrorKind>,
    /// Start byte offset of the offending text, when known.
    pub position: Option<usize>,
    /// Byte length of the offending text, when known.
    pub length: Option<usize>,
    context: ParseErrorContext,
}

impl ParseError {
    /// Create an error without source context.
    pub fn new<T: Into<ParseErrorKind>>(kind: T) -> Self {
        Self::from_kind(kind.into(), ParseErrorContext::None, None, None)
    }

    /// Create an error located at the given token or parse node.
    pub fn with_token<T: Into<ParseErrorKind>>(kind: T, token: &dyn ErrorLocationProvider) -> Self {
        let mut position = None;
        let mut length = None;
        let context = token.loc().filter(|loc| loc.start() <= loc.end()).map_or(
            ParseErrorContext::None,
            |loc| {
                position = Some(loc.start());
                length = Some(loc.end().saturating_sub(loc.start()));
                ParseErrorContext::Location(loc.clone())
            },
        );
        Self::from_kind(kind.into(), context, position, length)
    }

    fn from_kind(
        kind: ParseErrorKind,
        context: ParseErrorContext,
        position: Option<usize>,
        length: Option<usize>,
    ) -> Self {
        Self {
            kind: Box::new(kind),
            position,
            length,
            context,
        }
    }

    /// The high-level taxonomy bucket of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl From<fmt::Error> for ParseError {
    fn from(_: fmt::Error) -> Self {
        Self::new(ParseErrorKind::MarkupWriteFailure)
    }
}

impl From<strum::ParseError> for ParseError {
    fn from(err: strum::ParseError) -> Self {
        Self::new(ParseErrorKind::EnumParse(err))
    }
}

/// Coarse error taxonomy: which stage rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed raw input.
    Lex,
    /// Macro expansion failure (ceiling, arguments, placeholders).
    MacroExpansion,
    /// Structural parse or build failure.
    Parse,
    /// Untrusted URL or resource rejected.
    Trust,
}

/// Specific reason for a [`ParseError`].
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    // Lexer
    #[error("Unexpected character: '{character}'")]
    UnexpectedCharacter { character: String },
    #[error(r"\verb ended by end of line instead of matching delimiter")]
    VerbMissingDelimiter,
    #[error(r"\verb assertion failed -- please report what input caused this bug")]
    VerbAssertionFailed,

    // Macro expansion
    #[error("Too many expansions: infinite loop or need to increase maxExpand setting")]
    MacroTooManyExpansions,
    #[error("Incomplete placeholder at end of macro body")]
    MacroIncompletePlaceholder,
    #[error("Not a valid argument number: #{value}")]
    InvalidMacroArgumentNumber { value: String },
    #[error("Use of the macro doesn't match its definition")]
    MacroDefinitionMismatch,
    #[error("The length of delimiters doesn't match the number of args!")]
    MacroDelimiterLengthMismatch,
    #[error("Unexpected end of input in a macro argument, expected '{expected}'")]
    UnexpectedEndOfMacroArgument { expected: String },
    #[error("Internal error: stack unexpectedly empty during token expansion")]
    MacroStackUnexpectedlyEmpty,
    #[error("Expected a control sequence")]
    ExpectedControlSequence,
    #[error("Expected a macro definition")]
    ExpectedMacroDefinition,
    #[error("Invalid token after macro prefix: {token}")]
    InvalidTokenAfterMacroPrefix { token: String },
    #[error("Expected #{expected} but found #{found}")]
    ExpectedMacroParameter { expected: usize, found: usize },
    #[error(r"\newcommand{{{name}}} attempting to redefine {name}; use \renewcommand")]
    NewcommandRedefinition { name: String },
    #[error(r"\renewcommand{{{name}}} when {name} does not yet exist; use \newcommand")]
    RenewcommandNonexistent { name: String },
    #[error(r"Invalid number of arguments in \newcommand")]
    InvalidNewcommandArgumentCount,
    #[error("Expected function after prefix")]
    ExpectedFunctionAfterPrefix,
    #[error(r"\@char has non-numeric argument {value}")]
    CharNonNumericArgument { value: String },
    #[error(r"\@char with invalid code point {code}")]
    InvalidCharCodePoint { code: String },

    // Parser
    #[error("Undefined control sequence: {name}")]
    UndefinedControlSequence { name: String },
    #[error("Expected '{expected}', got '{found}'")]
    ExpectedToken { expected: String, found: String },
    #[error("Extra }}")]
    ExtraCloseBrace,
    #[error("Double superscript")]
    DoubleSuperscript,
    #[error("Double subscript")]
    DoubleSubscript,
    #[error(r"\limits must follow a base")]
    LimitsMustFollowBase,
    #[error("Only one infix operator per group")]
    MultipleInfixOperators,
    #[error(r"\middle without preceding \left")]
    MiddleWithoutPrecedingLeft,
    #[error(r"Expected \right after \left")]
    ExpectedRightAfterLeft,
    #[error("Group nesting too deep: maximum depth {max} exceeded")]
    GroupNestingTooDeep { max: usize },
    #[error("Got function '{func}' with no arguments as {context}")]
    FunctionMissingArguments { func: String, context: String },
    #[error("No function handler for '{name}'")]
    NoFunctionHandler { name: String },
    #[error("Invalid attribute name '{attr}'")]
    InvalidAttributeName { attr: String },
    #[error("Can't use function '{func}' in {mode} mode")]
    FunctionDisallowedInMode { func: String, mode: Mode },
    #[error("Invalid size: '{size}'")]
    InvalidSize { size: String },
    #[error("Invalid unit: '{unit}'")]
    InvalidUnit { unit: String },
    #[error("Invalid color: '{color}'")]
    InvalidColor { color: String },
    #[error("Invalid argument '{value}' to {context}")]
    InvalidValue { context: String, value: String },
    #[error("Expected group as {context}")]
    ExpectedGroupAs { context: String },
    #[error("Expected group after '{symbol}'")]
    ExpectedGroupAfterSymbol { symbol: String },
    #[error("A primitive argument cannot be optional")]
    PrimitiveArgumentCannotBeOptional,
    #[error("Illegal delimiter: '{delim}'")]
    IllegalDelimiter { delim: String },
    #[error("Unsupported symbol '{symbol}' and font size '{font}'")]
    UnsupportedSymbolFont { symbol: String, font: String },
    #[error("Invalid delimiter '{delimiter}' after '{function}'")]
    InvalidDelimiterAfter { delimiter: String, function: String },
    #[error("Invalid delimiter type after '{function}'")]
    InvalidDelimiterTypeAfter { function: String },
    #[error("No such environment: {name}")]
    NoSuchEnvironment { name: String },
    #[error(r"Expected environment name after \begin, got {found}")]
    InvalidEnvironmentName { found: String },
    #[error(r"Expected environment after \end, got {found}")]
    ExpectedEnvironmentAfterEnd { found: String },
    #[error(r"Mismatched: \begin{{{begin}}} matched by \end{{{end}}}")]
    MismatchedEnvironmentEnd { begin: String, end: String },
    #[error(r"Expected & or \\ or \cr or \end, found {found}")]
    ExpectedArrayDelimiter { found: String },
    #[error("Too many tab characters: &")]
    TooManyTabCharacters,
    #[error("Unknown column alignment: {alignment}")]
    UnknownColumnAlignment { alignment: String },
    #[error(r"{func} valid only within array environment")]
    FunctionOnlyInArray { func: String },
    #[error("{env} can be used only in display mode.")]
    DisplayModeOnly { env: String },
    #[error(r"Invalid \arraystretch: {stretch}")]
    InvalidArrayStretch { stretch: String },
    #[error("Invalid separator type: {separator}")]
    InvalidSeparatorType { separator: String },
    #[error("Too many math in a row: expected {expected}, but got {actual}")]
    TooManyMathInRow { expected: usize, actual: usize },
    #[error("Expected ], got {found}")]
    ExpectedClosingBracket { found: String },
    #[error("Expected l or c or r, got {found}")]
    ExpectedMatrixAlignment { found: String },
    #[error("Expected column alignment character")]
    ExpectedColumnAlignment,
    #[error("{{subarray}} can contain only one column")]
    SubarraySingleColumn,
    #[error(r"Expected \ or \cr or \end, got {found}")]
    ExpectedCdDelimiter { found: String },
    #[error("Expected one of \"<>AV=|.\" after @, got {found}")]
    InvalidCdArrowSpecifier { found: String },
    #[error("Missing arrow character after @")]
    MissingArrowCharacterAfterAt,
    #[error("Missing a {arrow} character to complete a CD arrow.")]
    MissingCdArrowChar { arrow: String },
    #[error("Unrecognized genfrac command: {command}")]
    UnrecognizedGenfracCommand { command: String },
    #[error("Unrecognized infix genfrac command: {command}")]
    UnrecognizedInfixGenfracCommand { command: String },
    #[error(r"Invalid style level for \genfrac: {level}")]
    InvalidGenfracStyle { level: String },
    #[error(r"\above argument must be a size")]
    AboveArgumentMustBeSize,
    #[error("Unknown accent '{accent}'")]
    UnknownAccent { accent: String },
    #[error("Accent {accent} unsupported in {mode} mode")]
    UnsupportedAccentInMode { accent: String, mode: Mode },
    #[error("LaTeX-incompatible input and strict mode is set to 'error': {message} [{code}]")]
    StrictModeError { message: String, code: String },
    #[error("Multiple \\tag")]
    MultipleTag,
    #[error(r"\tag works only in display equations")]
    TagNotAllowedInInlineMode,
    #[error("{context} must be a URL")]
    ArgumentMustBeUrl { context: &'static str },
    #[error("Mismatched {what}")]
    Mismatched { what: String },

    // Builders
    #[error("Got group of unknown type: {group_type}")]
    UnknownGroupType { group_type: NodeType },
    #[error("Expected {node} node")]
    ExpectedNode { node: NodeType },
    #[error("supsub must have either sup or sub.")]
    SupSubMissingSupOrSub,
    #[error("Expected base in SupSub node")]
    ExpectedBaseInSupSub,
    #[error("make_ord: expected MathOrd, TextOrd or Spacing node")]
    MakeOrdExpectedNode,
    #[error("Accent glyph did not render to a symbol")]
    AccentExpectedSymbol,
    #[error("Unknown type of space: {name}")]
    UnknownSpaceType { name: String },
    #[error("newline node should be the last pushed element")]
    NewlineNodeNotFound,
    #[error("Failed to write markup")]
    MarkupWriteFailure,
    #[error(
        "Unbalanced namespace destruction: attempt to pop global namespace; please report this as a bug"
    )]
    UnbalancedNamespaceDestruction,
    #[error("Font metrics not found for font: {font_family}.")]
    FontMetricsNotFound { font_family: String },
    #[error("Enum parse error: {0}")]
    EnumParse(strum::ParseError),

    // Trust
    #[error("Command {name} not trusted")]
    CommandNotTrusted { name: &'static str },
}

impl ParseErrorKind {
    /// Which stage of the pipeline this kind belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnexpectedCharacter { .. }
            | Self::VerbMissingDelimiter
            | Self::VerbAssertionFailed => ErrorCategory::Lex,
            Self::MacroTooManyExpansions
            | Self::MacroIncompletePlaceholder
            | Self::InvalidMacroArgumentNumber { .. }
            | Self::MacroDefinitionMismatch
            | Self::MacroDelimiterLengthMismatch
            | Self::UnexpectedEndOfMacroArgument { .. }
            | Self::MacroStackUnexpectedlyEmpty
            | Self::ExpectedControlSequence
            | Self::ExpectedMacroDefinition
            | Self::InvalidTokenAfterMacroPrefix { .. }
            | Self::ExpectedMacroParameter { .. }
            | Self::NewcommandRedefinition { .. }
            | Self::RenewcommandNonexistent { .. }
            | Self::InvalidNewcommandArgumentCount
            | Self::ExpectedFunctionAfterPrefix => ErrorCategory::MacroExpansion,
            Self::CommandNotTrusted { .. } => ErrorCategory::Trust,
            _ => ErrorCategory::Parse,
        }
    }
}

#[derive(Debug)]
enum ParseErrorContext {
    None,
    Location(SourceLocation),
}

impl fmt::Display for ParseErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Location(SourceLocation { input, start, end }) => {
                let input_len = input.len();
                if *start == input_len {
                    write!(f, " at end of input: ")?;
                } else {
                    write!(f, " at position {}: ", start + 1)?;
                }

                let mut prefix_start = start.saturating_sub(15);
                prefix_start = adjust_char_boundary(input, prefix_start, false);
                if prefix_start > 0 {
                    write!(f, "\u{2026}")?;
                }
                write!(f, "{}", &input[prefix_start..*start])?;
                if end > start {
                    // Underline the offending range with combining low lines.
                    for c in input[*start..*end].chars() {
                        write!(f, "{c}\u{0332}")?;
                    }
                }
                let mut suffix_end = (*end + 15).min(input_len);
                suffix_end = adjust_char_boundary(input, suffix_end, true);
                if suffix_end < input_len {
                    write!(f, "{}\u{2026}", &input[*end..suffix_end])
                } else {
                    write!(f, "{}", &input[*end..])
                }
            }
        }
    }
}

const fn adjust_char_boundary(input: &str, mut index: usize, forward: bool) -> usize {
    if forward {
        while index < input.len() && !input.is_char_boundary(index) {
            index += 1;
        }
    } else {
        while index > 0 && !input.is_char_boundary(index) {
            index -= 1;
        }
    }
    index
}

/// Types that can locate themselves in the original input.
pub trait ErrorLocationProvider {
    /// The source span, if one is known.
    fn loc(&self) -> Option<&SourceLocation>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Token;
    use std::sync::Arc;

    #[test]
    fn test_plain_error_message() {
        let err = ParseError::new(ParseErrorKind::DoubleSuperscript);
        assert_eq!(err.to_string(), "math parse error: Double superscript");
    }

    #[test]
    fn test_located_error_underlines_range() {
        let input: Arc<str> = Arc::from("x^2^3");
        let token = Token::from_slice(
            Arc::clone(&input),
            3,
            4,
            Some(SourceLocation::new(Arc::clone(&input), 3, 4)),
        );
        let err = ParseError::with_token(ParseErrorKind::DoubleSuperscript, &token);
        let msg = err.to_string();
        assert!(msg.contains("at position 4"));
        assert!(msg.contains("^\u{0332}"));
        assert_eq!(err.position, Some(3));
        assert_eq!(err.length, Some(1));
    }

    #[test]
    fn test_long_input_is_clipped_with_ellipses() {
        let input: Arc<str> = Arc::from("a".repeat(60));
        let token = Token::from_slice(
            Arc::clone(&input),
            30,
            31,
            Some(SourceLocation::new(Arc::clone(&input), 30, 31)),
        );
        let err = ParseError::with_token(
            ParseErrorKind::UnexpectedCharacter {
                character: "a".to_owned(),
            },
            &token,
        );
        let msg = err.to_string();
        assert!(msg.contains('\u{2026}'));
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ParseError::new(ParseErrorKind::MacroTooManyExpansions).category(),
            ErrorCategory::MacroExpansion
        );
        assert_eq!(
            ParseError::new(ParseErrorKind::UnexpectedCharacter {
                character: "\u{7}".to_owned()
            })
            .category(),
            ErrorCategory::Lex
        );
        assert_eq!(
            ParseError::new(ParseErrorKind::CommandNotTrusted { name: "\\href" }).category(),
            ErrorCategory::Trust
        );
        assert_eq!(
            ParseError::new(ParseErrorKind::ExtraCloseBrace).category(),
            ErrorCategory::Parse
        );
    }
}
