//! Mode-switch delimiters: `$` and `\(` re-enter math from text mode,
//! `\)` and `\]` outside a matching opener are errors.

use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeStyling};
use crate::style::TEXT;
use crate::types::{BreakToken, Mode, ParseError, ParseErrorKind};

/// Registers the math-mode delimiters.
pub fn define_math(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Styling),
        names: &["\\(", "$"],
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            allowed_in_math: false,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            let outer_mode = context.parser.mode;
            context.parser.switch_mode(Mode::Math);
            let close_token = if context.func_name == "\\(" {
                BreakToken::RightParen
            } else {
                BreakToken::Dollar
            };
            let body = context.parser.parse_expression(false, Some(&close_token))?;
            let token = context.parser.fetch()?;
            if token.text != close_token.as_ref() {
                return Err(ParseError::new(ParseErrorKind::ExpectedToken {
                    expected: close_token.as_ref().to_owned(),
                    found: token.text.as_str().to_owned(),
                }));
            }
            context.parser.consume();
            context.parser.switch_mode(outer_mode);
            Ok(AnyParseNode::Styling(ParseNodeStyling {
                mode: context.parser.mode,
                loc: context.loc(),
                style: TEXT,
                body,
            }))
        }),
        html_builder: None,
        mathml_builder: None,
    });

    // A closer with no matching opener
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Text),
        names: &["\\)", "\\]"],
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            allowed_in_math: false,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            Err(ParseError::new(ParseErrorKind::Mismatched {
                what: context.func_name,
            }))
        }),
        html_builder: None,
        mathml_builder: None,
    });
}
