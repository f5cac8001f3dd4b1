//! `\textcolor` and `\color`.

use crate::build_common::make_fragment;
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::dom_tree::HtmlDomNode;
use crate::macros::{MacroContextInterface as _, MacroDefinition};
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeColor};
use crate::types::{ArgType, ParseError, ParseErrorKind};

/// Registers the color commands.
pub fn define_color(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Color),
        names: &["\\textcolor"],
        props: FunctionPropSpec {
            num_args: 2,
            allowed_in_text: true,
            arg_types: Some(vec![ArgType::Color, ArgType::Original]),
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let AnyParseNode::ColorToken(token) = &args[0] else {
                return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                    node: NodeType::ColorToken,
                }));
            };
            let color = token.color.clone();

            let body = match args.into_iter().nth(1) {
                Some(AnyParseNode::OrdGroup(group)) => group.body,
                Some(other) => vec![other],
                None => vec![],
            };

            Ok(AnyParseNode::Color(ParseNodeColor {
                mode: context.parser.mode,
                loc: context.loc(),
                color,
                body,
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    // \color runs to the end of the group, like the color package's.
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Color),
        names: &["\\color"],
        props: FunctionPropSpec {
            num_args: 1,
            allowed_in_text: true,
            arg_types: Some(vec![ArgType::Color]),
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let AnyParseNode::ColorToken(token) = &args[0] else {
                return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                    node: NodeType::ColorToken,
                }));
            };
            let color = token.color.clone();

            // \right reads \current@color to color the closing fence.
            context.parser.gullet.macros_mut().set(
                "\\current@color",
                Some(MacroDefinition::String(color.clone())),
                false,
            );

            let body = context
                .parser
                .parse_expression(true, context.break_on_token_text)?;

            Ok(AnyParseNode::Color(ParseNodeColor {
                mode: context.parser.mode,
                loc: context.loc(),
                color,
                body,
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
    let AnyParseNode::Color(color_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Color,
        }));
    };

    let colored_options = options.with_color(color_node.color.clone());
    let elements = build_html::build_expression(
        ctx,
        &color_node.body,
        &colored_options,
        build_html::GroupType::False,
        (None, None),
    )?;

    // A fragment keeps the inner atoms spacing against their
    // neighbors: `\color{red}{2 +} 3` spaces like `2 + 3`.
    Ok(make_fragment(&elements).into())
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Color(color_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Color,
        }));
    };

    let inner = build_mathml::build_expression(
        ctx,
        &color_node.body,
        &options.with_color(color_node.color.clone()),
        None,
    )?;

    let mut node = MathNode::with_children(MathNodeType::Mstyle, inner);
    node.set_attribute("mathcolor", color_node.color.clone());

    Ok(node.into())
}
