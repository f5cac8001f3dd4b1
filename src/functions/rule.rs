//! `\rule`: filled rectangles with explicit width, height, and lift.

use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::dom_tree::{HtmlDomNode, Span};
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeRule};
use crate::types::{ArgType, CssProperty, CssStyle, ParseError, ParseErrorKind};
use crate::units::make_em;

/// Registers `\rule`.
pub fn define_rule(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Rule),
        names: &["\\rule"],
        props: FunctionPropSpec {
            num_args: 2,
            arg_types: Some(vec![ArgType::Size, ArgType::Size, ArgType::Size]),
            num_optional_args: 1,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, opt_args| {
            let AnyParseNode::Size(width_node) = &args[0] else {
                return Err(ParseError::new(ParseErrorKind::ExpectedGroupAs {
                    context: "width".to_owned(),
                }));
            };
            let AnyParseNode::Size(height_node) = &args[1] else {
                return Err(ParseError::new(ParseErrorKind::ExpectedGroupAs {
                    context: "height".to_owned(),
                }));
            };

            let shift = match &opt_args[0] {
                Some(AnyParseNode::Size(shift_node)) => Some(shift_node.value.clone()),
                Some(_) => {
                    return Err(ParseError::new(ParseErrorKind::ExpectedGroupAs {
                        context: "shift".to_owned(),
                    }));
                }
                None => None,
            };

            Ok(AnyParseNode::Rule(ParseNodeRule {
                mode: context.parser.mode,
                loc: context.loc(),
                shift,
                width: width_node.value.clone(),
                height: height_node.value.clone(),
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
    let AnyParseNode::Rule(rule_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Rule,
        }));
    };

    let width = ctx.calculate_size(&rule_node.width, options)?;
    let height = ctx.calculate_size(&rule_node.height, options)?;
    let shift = match &rule_node.shift {
        Some(shift_measurement) => ctx.calculate_size(shift_measurement, options)?,
        None => 0.0,
    };

    // The rule is drawn entirely with borders.
    let mut style = CssStyle::default();
    style.insert(CssProperty::BorderRightWidth, make_em(width));
    style.insert(CssProperty::BorderTopWidth, make_em(height));
    style.insert(CssProperty::Bottom, make_em(shift));

    Ok(HtmlDomNode::DomSpan(
        Span::builder()
            .children(vec![])
            .classes(vec!["mord".to_owned(), "rule".to_owned()])
            .height(height + shift)
            .depth(-shift)
            .width(Some(width))
            .max_font_size(height * 1.125 * options.size_multiplier)
            .style(style)
            .build(Some(options)),
    ))
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Rule(rule_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Rule,
        }));
    };

    let width = ctx.calculate_size(&rule_node.width, options)?;
    let height = ctx.calculate_size(&rule_node.height, options)?;
    let shift = match &rule_node.shift {
        Some(shift_measurement) => ctx.calculate_size(shift_measurement, options)?,
        None => 0.0,
    };

    let color = options
        .color
        .clone()
        .unwrap_or_else(|| "black".to_owned());

    let mut rule = MathNode::with_children(MathNodeType::Mspace, vec![]);
    rule.set_attribute("width", make_em(width));
    rule.set_attribute("height", make_em(height));
    rule.set_attribute("mathbackground", color);

    let mut wrapper =
        MathNode::with_children(MathNodeType::Mpadded, vec![MathDomNode::Math(rule)]);
    wrapper.set_attribute("height", make_em(shift));
    wrapper.set_attribute("voffset", make_em(shift));
    if shift < 0.0 {
        wrapper.set_attribute("depth", make_em(-shift));
    }

    Ok(MathDomNode::Math(wrapper))
}
