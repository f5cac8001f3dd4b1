//! `\@char`, the code-point escape behind the `\char` macro.

use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeTextOrd};
use crate::types::{ParseError, ParseErrorKind};

/// Registers `\@char`.
pub fn define_char(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::TextOrd),
        names: &["\\@char"],
        props: FunctionPropSpec {
            num_args: 1,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let AnyParseNode::OrdGroup(ordgroup) = &args[0] else {
                return Err(ParseError::new(ParseErrorKind::ExpectedGroupAs {
                    context: "\\@char".to_owned(),
                }));
            };

            // The argument is a decimal code point spelled out in ord nodes.
            let mut number_str = String::new();
            for node in &ordgroup.body {
                match node {
                    AnyParseNode::TextOrd(textord) => number_str.push_str(&textord.text),
                    AnyParseNode::MathOrd(mathord) => number_str.push_str(&mathord.text),
                    _ => {
                        return Err(ParseError::new(ParseErrorKind::CharNonNumericArgument {
                            value: number_str,
                        }));
                    }
                }
            }

            let code_point: u32 = number_str.parse().map_err(|_| {
                ParseError::new(ParseErrorKind::CharNonNumericArgument {
                    value: number_str.clone(),
                })
            })?;

            let text = char::from_u32(code_point).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidCharCodePoint {
                    code: number_str.clone(),
                })
            })?;

            Ok(AnyParseNode::TextOrd(ParseNodeTextOrd {
                mode: context.parser.mode,
                loc: context.loc(),
                text: text.to_string(),
            }))
        }),
        html_builder: None,
        mathml_builder: None,
    });
}
