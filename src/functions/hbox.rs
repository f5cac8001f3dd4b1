//! `\hbox`, the box `\vcenter` acts on. On its own it only prevents a
//! soft line break.

use crate::build_common::make_fragment;
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeHbox};
use crate::types::{ArgType, Mode, ParseError, ParseErrorKind};

/// Registers `\hbox`.
pub fn define_hbox(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Hbox),
        names: &["\\hbox"],
        props: FunctionPropSpec {
            num_args: 1,
            arg_types: Some(vec![ArgType::Mode(Mode::Text)]),
            allowed_in_text: true,
            primitive: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            Ok(AnyParseNode::Hbox(ParseNodeHbox {
                mode: context.parser.mode,
                loc: context.loc(),
                body: vec![args[0].clone()],
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
    let AnyParseNode::Hbox(hbox_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Hbox,
        }));
    };

    let elements = build_html::build_expression(
        ctx,
        &hbox_node.body,
        options,
        build_html::GroupType::False,
        (None, None),
    )?;

    Ok(make_fragment(&elements).into())
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Hbox(hbox_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Hbox,
        }));
    };

    let children = build_mathml::build_expression(ctx, &hbox_node.body, options, None)?;
    Ok(MathDomNode::Math(MathNode::with_children(
        MathNodeType::Mrow,
        children,
    )))
}
