//! Top-level parse entry point.

use crate::context::EngineContext;
use crate::macros::MacroContextInterface as _;
use crate::parser::Parser;
use crate::parser::parse_node::{AnyParseNode, ParseNodeTag};
use crate::types::{Mode, ParseError, ParseErrorKind, Settings, Token};

/// Parses an expression into a parse tree.
///
/// If the input used `\tag`, the whole tree is wrapped in a tag node
/// whose label is parsed from the `\df@tag` macro the `\tag` expansion
/// left behind.
pub fn parse_tree(
    ctx: &EngineContext,
    expr: &str,
    settings: &Settings,
) -> Result<Vec<AnyParseNode>, ParseError> {
    let mut parser = Parser::new(expr, settings, ctx);
    // Blank out any \df@tag left over from a previous parse so it does
    // not trip the duplicate-\tag check.
    parser.gullet.macros_mut().purge("\\df@tag");
    let tree = parser.parse()?;
    // A color switch must not persist into the next call either.
    parser.gullet.macros_mut().purge("\\current@color");
    parser.gullet.macros_mut().purge("\\color");

    if parser.gullet.macros().get("\\df@tag").is_some() {
        if !settings.display_mode {
            return Err(ParseError::new(ParseErrorKind::TagNotAllowedInInlineMode));
        }
        return Ok(vec![AnyParseNode::Tag(ParseNodeTag {
            mode: Mode::Text,
            loc: None,
            body: tree,
            tag: parser.subparse(vec![Token::new("\\df@tag", None)])?,
        })]);
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_node::NodeType;

    #[test]
    fn test_parses_simple_expression() {
        let ctx = EngineContext::default();
        let settings = Settings::default();
        let tree = parse_tree(&ctx, "a+b", &settings).unwrap();
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_tag_wraps_tree_in_display_mode() {
        let ctx = EngineContext::default();
        let settings = Settings::builder().display_mode(true).build();
        let tree = parse_tree(&ctx, r"\tag{7} x=y", &settings).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(NodeType::from(&tree[0]), NodeType::Tag);
    }

    #[test]
    fn test_tag_rejected_inline() {
        let ctx = EngineContext::default();
        let settings = Settings::default();
        assert!(parse_tree(&ctx, r"\tag{7} x=y", &settings).is_err());
    }
}
