//! `\phantom`, `\hphantom`, and `\vphantom`.

use crate::build_common::{
    VListChild, VListElem, VListParam, make_fragment, make_span, make_v_list,
};
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec, ord_argument};
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{
    AnyParseNode, NodeType, ParseNodeHphantom, ParseNodePhantom, ParseNodeVphantom,
};
use crate::types::{ParseError, ParseErrorKind};

/// Registers the phantom commands.
pub fn define_phantom(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Phantom),
        names: &["\\phantom"],
        props: FunctionPropSpec {
            num_args: 1,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            Ok(AnyParseNode::Phantom(ParseNodePhantom {
                mode: context.parser.mode,
                loc: context.loc(),
                body: ord_argument(&args[0]),
            }))
        }),
        html_builder: Some(html_builder_phantom),
        mathml_builder: Some(mathml_builder_phantom),
    });

    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Hphantom),
        names: &["\\hphantom"],
        props: FunctionPropSpec {
            num_args: 1,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            Ok(AnyParseNode::Hphantom(ParseNodeHphantom {
                mode: context.parser.mode,
                loc: context.loc(),
                body: Box::new(args[0].clone()),
            }))
        }),
        html_builder: Some(html_builder_hphantom),
        mathml_builder: Some(mathml_builder_hphantom),
    });

    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Vphantom),
        names: &["\\vphantom"],
        props: FunctionPropSpec {
            num_args: 1,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            Ok(AnyParseNode::Vphantom(ParseNodeVphantom {
                mode: context.parser.mode,
                loc: context.loc(),
                body: Box::new(args[0].clone()),
            }))
        }),
        html_builder: Some(html_builder_vphantom),
        mathml_builder: Some(mathml_builder_vphantom),
    });
}

fn html_builder_phantom(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Phantom(phantom_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Phantom,
        }));
    };

    let elements = build_html::build_expression(
        ctx,
        &phantom_node.body,
        &options.with_phantom(),
        build_html::GroupType::False,
        (None, None),
    )?;

    // The contents keep their own spacing classes, like a color group.
    Ok(make_fragment(&elements).into())
}

fn html_builder_hphantom(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Hphantom(hphantom_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Hphantom,
        }));
    };

    let inner = build_html::build_group(ctx, &hphantom_node.body, &options.with_phantom(), None)?;
    let mut node_span = make_span(vec![], vec![inner], None, None);
    node_span.height = 0.0;
    node_span.depth = 0.0;

    for child in &mut node_span.children {
        if let Some(h) = child.height_mut() {
            *h = 0.0;
        }
        if let Some(d) = child.depth_mut() {
            *d = 0.0;
        }
    }

    let vlist = make_v_list(
        VListParam::FirstBaseline {
            children: vec![VListChild::Elem(Box::new(VListElem {
                elem: node_span.into(),
                shift: None,
                margin_left: None,
                margin_right: None,
                wrapper_classes: None,
                wrapper_style: None,
            }))],
        },
        options,
    )?;

    // Spacing-wise \hphantom is an ordinary group.
    Ok(make_span(
        vec!["mord".to_owned()],
        vec![vlist.into()],
        Some(options),
        None,
    )
    .into())
}

fn html_builder_vphantom(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Vphantom(vphantom_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Vphantom,
        }));
    };

    let inner = build_html::build_group(ctx, &vphantom_node.body, &options.with_phantom(), None)?;
    let inner_span = make_span(vec!["inner".to_owned()], vec![inner], None, None);
    let fix = make_span(vec!["fix".to_owned()], vec![], None, None);

    Ok(make_span(
        vec!["mord".to_owned(), "rlap".to_owned()],
        vec![inner_span.into(), fix.into()],
        Some(options),
        None,
    )
    .into())
}

fn mathml_builder_phantom(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Phantom(phantom_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Phantom,
        }));
    };

    let inner = build_mathml::build_expression(ctx, &phantom_node.body, options, None)?;
    Ok(MathNode::with_children(MathNodeType::Mphantom, inner).into())
}

fn mathml_builder_hphantom(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Hphantom(hphantom_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Hphantom,
        }));
    };

    let inner =
        build_mathml::build_expression(ctx, &ord_argument(&hphantom_node.body), options, None)?;
    let phantom = MathNode::with_children(MathNodeType::Mphantom, inner);

    let mut node =
        MathNode::with_children(MathNodeType::Mpadded, vec![MathDomNode::Math(phantom)]);
    node.set_attribute("height", "0px".to_owned());
    node.set_attribute("depth", "0px".to_owned());

    Ok(MathDomNode::Math(node))
}

fn mathml_builder_vphantom(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Vphantom(vphantom_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Vphantom,
        }));
    };

    let inner =
        build_mathml::build_expression(ctx, &ord_argument(&vphantom_node.body), options, None)?;
    let phantom = MathNode::with_children(MathNodeType::Mphantom, inner);

    let mut node =
        MathNode::with_children(MathNodeType::Mpadded, vec![MathDomNode::Math(phantom)]);
    node.set_attribute("width", "0px".to_owned());

    Ok(MathDomNode::Math(node))
}
