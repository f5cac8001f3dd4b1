//! Square and nth roots.

use crate::build_common::{self, VListChild, VListElem, VListKern, VListParam, make_span, make_v_list};
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::delimiter::make_sqrt_image;
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeSqrt};
use crate::style::{SCRIPTSCRIPT, TEXT};
use crate::types::{CssProperty, ParseError, ParseErrorKind};
use crate::units::make_em;

/// Registers `\sqrt`.
pub fn define_sqrt(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Sqrt),
        names: &["\\sqrt"],
        props: FunctionPropSpec {
            num_args: 1,
            num_optional_args: 1,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, opt_args| {
            Ok(AnyParseNode::Sqrt(Box::new(ParseNodeSqrt {
                mode: context.parser.mode,
                loc: context.loc(),
                body: args[0].clone(),
                index: opt_args[0].clone(),
            })))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });
}

// Square roots follow the TeXbook pg. 443, rule 11.
fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Sqrt(sqrt_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Sqrt,
        }));
    };

    let mut inner =
        build_html::build_group(ctx, &sqrt_node.body, &options.having_cramped_style(), None)?;
    if let Some(height) = inner.height_mut()
        && *height == 0.0
    {
        // A zero-height radicand still wants a reasonable surd.
        *height = options.font_metrics().x_height;
    }

    inner = build_common::wrap_fragment(inner, options);

    let theta = options.font_metrics().default_rule_thickness;
    let phi = if options.style.id < TEXT.id {
        options.font_metrics().x_height
    } else {
        theta
    };

    // Clearance between the radicand and the vinculum.
    let line_clearance = theta + phi / 4.0;

    let min_delimiter_height = inner.height() + inner.depth() + line_clearance + theta;

    let sqrt_result = make_sqrt_image(ctx, min_delimiter_height, options)?;

    let delim_depth = sqrt_result.span.height - sqrt_result.rule_width;

    // A taller-than-needed surd distributes the extra space evenly.
    let line_clearance = if delim_depth > inner.height() + inner.depth() + line_clearance {
        (line_clearance + delim_depth - inner.height() - inner.depth()) / 2.0
    } else {
        line_clearance
    };

    let img_shift =
        sqrt_result.span.height - inner.height() - line_clearance - sqrt_result.rule_width;

    if let HtmlDomNode::DomSpan(span) = &mut inner {
        span.style
            .insert(CssProperty::PaddingLeft, make_em(sqrt_result.advance_width));
    }

    let inner_height = inner.height();

    let body = make_v_list(
        VListParam::FirstBaseline {
            children: vec![
                VListChild::Elem(Box::new(VListElem {
                    elem: inner,
                    shift: None,
                    margin_left: None,
                    margin_right: None,
                    wrapper_classes: Some(vec!["svg-align".to_owned()]),
                    wrapper_style: None,
                })),
                VListChild::Kern(VListKern {
                    size: -(inner_height + img_shift),
                }),
                VListChild::Elem(Box::new(VListElem {
                    elem: HtmlDomNode::DomSpan(sqrt_result.span),
                    shift: None,
                    margin_left: None,
                    margin_right: None,
                    wrapper_classes: None,
                    wrapper_style: None,
                })),
                VListChild::Kern(VListKern {
                    size: sqrt_result.rule_width,
                }),
            ],
        },
        options,
    )?;

    let Some(sqrt_index) = &sqrt_node.index else {
        return Ok(make_span(
            vec!["mord".to_owned(), "sqrt".to_owned()],
            vec![body.into()],
            Some(options),
            None,
        )
        .into());
    };

    // The index always sits in scriptscript style, raised by the amount
    // TeX's \r@@t uses.
    let new_options = options.having_style(SCRIPTSCRIPT);
    let rootm = build_html::build_group(ctx, sqrt_index, &new_options, Some(options))?;

    let to_shift = 0.6 * (body.height - body.depth);

    let root_v_list = make_v_list(
        VListParam::Shift {
            position_data: -to_shift,
            children: vec![VListChild::Elem(Box::new(VListElem {
                elem: rootm,
                shift: None,
                margin_left: None,
                margin_right: None,
                wrapper_classes: None,
                wrapper_style: None,
            }))],
        },
        options,
    )?;

    // The .root class gets the index kerning from CSS.
    let root_v_list_wrap = make_span(
        vec!["root".to_owned()],
        vec![root_v_list.into()],
        Some(options),
        None,
    );

    Ok(make_span(
        vec!["mord".to_owned(), "sqrt".to_owned()],
        vec![root_v_list_wrap.into(), body.into()],
        Some(options),
        None,
    )
    .into())
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Sqrt(sqrt_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Sqrt,
        }));
    };

    let body_group = build_mathml::build_group(ctx, &sqrt_node.body, options)?;

    if let Some(index) = &sqrt_node.index {
        let index_group = build_mathml::build_group(ctx, index, options)?;
        Ok(MathNode::with_children(MathNodeType::Mroot, vec![body_group, index_group]).into())
    } else {
        Ok(MathNode::with_children(MathNodeType::Msqrt, vec![body_group]).into())
    }
}
