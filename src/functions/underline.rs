//! `\underline`.

use crate::build_common::{
    VListChild, VListElem, VListKern, VListParam, make_line_span, make_span, make_v_list,
};
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType, TextNode};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeUnderline};
use crate::types::{ParseError, ParseErrorKind};

/// Registers `\underline`.
pub fn define_underline(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Underline),
        names: &["\\underline"],
        props: FunctionPropSpec {
            num_args: 1,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            Ok(AnyParseNode::Underline(ParseNodeUnderline {
                mode: context.parser.mode,
                loc: context.loc(),
                body: Box::new(args[0].clone()),
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
    let AnyParseNode::Underline(underline_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Underline,
        }));
    };

    let inner_group = build_html::build_group(ctx, &underline_node.body, options, None)?;
    let inner_height = inner_group.height();

    let line = make_line_span("underline-line", options, None);

    let default_rule_thickness = options.font_metrics().default_rule_thickness;
    let vlist = make_v_list(
        VListParam::Top {
            position_data: inner_height,
            children: vec![
                VListChild::Kern(VListKern {
                    size: default_rule_thickness,
                }),
                VListChild::Elem(Box::new(VListElem {
                    elem: line.into(),
                    shift: None,
                    margin_left: None,
                    margin_right: None,
                    wrapper_classes: None,
                    wrapper_style: None,
                })),
                VListChild::Kern(VListKern {
                    size: 3.0 * default_rule_thickness,
                }),
                VListChild::Elem(Box::new(VListElem {
                    elem: inner_group,
                    shift: None,
                    margin_left: None,
                    margin_right: None,
                    wrapper_classes: None,
                    wrapper_style: None,
                })),
            ],
        },
        options,
    )?;

    Ok(make_span(
        vec!["mord".to_owned(), "underline".to_owned()],
        vec![vlist.into()],
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
    let AnyParseNode::Underline(underline_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Underline,
        }));
    };

    let mut operator = MathNode::with_children(
        MathNodeType::Mo,
        vec![MathDomNode::Text(TextNode {
            text: "\u{203e}".to_owned(),
        })],
    );
    operator.set_attribute("stretchy", "true".to_owned());

    let mut munder = MathNode::with_children(
        MathNodeType::Munder,
        vec![
            build_mathml::build_group(ctx, &underline_node.body, options)?,
            MathDomNode::Math(operator),
        ],
    );
    munder.set_attribute("accentunder", "true".to_owned());

    Ok(MathDomNode::Math(munder))
}
