//! The `\\` line break command.

use crate::build_common::make_span;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::dom_tree::HtmlDomNode;
use crate::macros::MacroContextInterface as _;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeCr};
use crate::types::{CssProperty, ParseError, ParseErrorKind};
use crate::units::make_em;

/// Registers `\\`.
pub fn define_cr(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Cr),
        names: &["\\\\"],
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            let size = if context.parser.gullet.future_mut()?.text == "[" {
                context
                    .parser
                    .parse_size_group(true)?
                    .as_ref()
                    .map(|s| s.value.clone())
            } else {
                None
            };

            // In a tabular environment the array builder consumes the cr
            // node; outside one it breaks the line unless strict mode
            // matches LaTeX, where \\ does nothing in display math.
            let new_line = !context.parser.settings.display_mode
                || !context.parser.settings.use_strict_behavior(
                    "newLineInDisplayMode",
                    "In LaTeX, \\\\ or \\newline does nothing in display mode",
                    None,
                );

            Ok(AnyParseNode::Cr(ParseNodeCr {
                mode: context.parser.mode,
                loc: context.loc(),
                new_line,
                size,
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });
}

fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Cr(cr_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Cr,
        }));
    };

    let mut span = make_span(vec!["mspace".to_owned()], vec![], Some(options), None);
    if cr_node.new_line {
        span.classes.push("newline".to_owned());
        if let Some(size) = &cr_node.size {
            span.style.insert(
                CssProperty::MarginTop,
                make_em(ctx.calculate_size(size, options)?),
            );
        }
    }

    Ok(span.into())
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Cr(cr_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Cr,
        }));
    };

    let mut math_node = MathNode::with_children(MathNodeType::Mspace, vec![]);
    if cr_node.new_line {
        math_node.set_attribute("linebreak", "newline".to_owned());
        if let Some(size) = &cr_node.size {
            math_node.set_attribute("height", make_em(ctx.calculate_size(size, options)?));
        }
    }

    Ok(MathDomNode::Math(math_node))
}
