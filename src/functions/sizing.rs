//! Size switching commands, `\tiny` through `\Huge`.

use crate::build_common::make_fragment;
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeSizing};
use crate::types::{ParseError, ParseErrorKind};
use crate::units::make_em;

const SIZE_FUNCS: &[&str] = &[
    "\\tiny",
    "\\sixptsize",
    "\\scriptsize",
    "\\footnotesize",
    "\\small",
    "\\normalsize",
    "\\large",
    "\\Large",
    "\\LARGE",
    "\\huge",
    "\\Huge",
];

/// Builds a sized expression, rescaling each element and attaching the
/// size-resetting classes nested size changes need.
pub fn sizing_group(
    ctx: &EngineContext,
    value: &[AnyParseNode],
    options: &Options,
    base_options: &Options,
) -> Result<HtmlDomNode, ParseError> {
    let mut inner = build_html::build_expression(
        ctx,
        value,
        options,
        build_html::GroupType::False,
        (None, None),
    )?;
    let multiplier = options.size_multiplier / base_options.size_multiplier;

    for item in &mut inner {
        let Some(classes) = item.classes_mut() else {
            continue;
        };
        let pos = classes.iter().position(|c| c == "sizing");

        if let Some(pos) = pos {
            if classes.get(pos + 1) == Some(&format!("reset-size{}", options.size)) {
                // A nested size change: the inner command already reset the
                // size, so only the reset class needs replacing.
                classes[pos + 1] = format!("reset-size{}", base_options.size);
            }
        } else {
            classes.extend(options.sizing_classes(base_options));
        }

        if let Some(h) = item.height_mut() {
            *h *= multiplier;
        }
        if let Some(d) = item.depth_mut() {
            *d *= multiplier;
        }
    }

    Ok(make_fragment(&inner).into())
}

fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Sizing(sizing_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Sizing,
        }));
    };

    let new_options = options.having_size(sizing_node.size);
    sizing_group(ctx, &sizing_node.body, &new_options, options)
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Sizing(sizing_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Sizing,
        }));
    };

    let new_options = options.having_size(sizing_node.size);
    let inner = build_mathml::build_expression(ctx, &sizing_node.body, &new_options, None)?;

    let mut node = MathNode::with_children(MathNodeType::Mstyle, inner);
    node.set_attribute("mathsize", make_em(new_options.size_multiplier));

    Ok(MathDomNode::Math(node))
}

/// Registers the sizing commands.
pub fn define_sizing(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Sizing),
        names: SIZE_FUNCS,
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            let body = context
                .parser
                .parse_expression(false, context.break_on_token_text)?;

            Ok(AnyParseNode::Sizing(ParseNodeSizing {
                mode: context.parser.mode,
                loc: context.loc(),
                size: SIZE_FUNCS
                    .iter()
                    .position(|&s| s == context.func_name)
                    .unwrap_or(5)
                    + 1,
                body,
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });
}
