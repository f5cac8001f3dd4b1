//! Explicit atom classes: `\mathbin`, `\mathrel` and friends, plus the
//! stacking commands `\stackrel`, `\overset`, and `\underset`.

use crate::build_common::make_span;
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec, ord_argument};
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{
    AnyParseNode, NodeType, ParseNodeMclass, ParseNodeOp, ParseNodeSupSub,
};
use crate::symbols::Atom;
use crate::types::{ParseError, ParseErrorKind};

/// The spacing class the `\binrel@` trick would assign to `arg`: `mbin` or
/// `mrel` when its leading atom is one, `mord` otherwise.
pub fn binrel_class(arg: &AnyParseNode) -> String {
    let atom = match arg {
        AnyParseNode::OrdGroup(ord) if !ord.body.is_empty() => &ord.body[0],
        _ => arg,
    };

    match atom {
        AnyParseNode::Atom(atom_node)
            if atom_node.family == Atom::Bin || atom_node.family == Atom::Rel =>
        {
            format!("m{}", atom_node.family.as_ref())
        }
        _ => "mord".to_owned(),
    }
}

fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Mclass(mclass_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Mclass,
        }));
    };

    let elements = build_html::build_expression(
        ctx,
        &mclass_node.body,
        options,
        build_html::GroupType::True,
        (None, None),
    )?;

    Ok(make_span(
        vec![mclass_node.mclass.clone()],
        elements,
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
    let AnyParseNode::Mclass(mclass_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Mclass,
        }));
    };

    let inner = build_mathml::build_expression(ctx, &mclass_node.body, options, None)?;

    if mclass_node.mclass == "minner" {
        let mut node = MathNode::with_children(MathNodeType::Mpadded, inner);
        // 1 mu on each side, the most likely inner spacing.
        node.set_attribute("lspace", "0.0556em".to_owned());
        node.set_attribute("width", "+0.1111em".to_owned());
        return Ok(node.into());
    }

    if mclass_node.mclass == "mord" {
        // A single character box passes through unwrapped.
        if mclass_node.is_character_box
            && let Some(first) = inner.first()
        {
            return Ok(first.clone());
        }
        return Ok(MathNode::with_children(MathNodeType::Mi, inner).into());
    }

    let mut node = if mclass_node.is_character_box && !inner.is_empty() {
        inner[0].clone()
    } else {
        MathNode::with_children(MathNodeType::Mo, inner).into()
    };

    // Spacing for the most likely adjacent atom types, TeXbook p. 170.
    // A MathML <mo> defaults to 5/18 em, so mrel needs no override.
    if let MathDomNode::Math(math_node) = &mut node {
        match mclass_node.mclass.as_str() {
            "mbin" => {
                math_node.set_attribute("lspace", "0.22em".to_owned());
                math_node.set_attribute("rspace", "0.22em".to_owned());
            }
            "mpunct" => {
                math_node.set_attribute("lspace", "0em".to_owned());
                math_node.set_attribute("rspace", "0.17em".to_owned());
            }
            "mopen" | "mclose" => {
                math_node.set_attribute("lspace", "0em".to_owned());
                math_node.set_attribute("rspace", "0em".to_owned());
            }
            _ => {}
        }
    }

    Ok(node)
}

/// Registers the math class commands.
pub fn define_mclass(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Mclass),
        names: &[
            "\\mathord",
            "\\mathbin",
            "\\mathrel",
            "\\mathopen",
            "\\mathclose",
            "\\mathpunct",
            "\\mathinner",
        ],
        props: FunctionPropSpec {
            num_args: 1,
            primitive: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let body = &args[0];
            let mclass = match context.func_name.as_str() {
                "\\mathbin" => "mbin",
                "\\mathrel" => "mrel",
                "\\mathopen" => "mopen",
                "\\mathclose" => "mclose",
                "\\mathpunct" => "mpunct",
                "\\mathinner" => "minner",
                _ => "mord",
            };

            Ok(AnyParseNode::Mclass(ParseNodeMclass {
                mode: context.parser.mode,
                loc: context.loc(),
                mclass: mclass.to_owned(),
                body: ord_argument(body),
                is_character_box: body.is_character_box().unwrap_or(false),
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    // \@binrel{x}{y} renders y spaced like x's atom class.
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Mclass),
        names: &["\\@binrel"],
        props: FunctionPropSpec {
            num_args: 2,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let mclass = binrel_class(&args[0]);

            Ok(AnyParseNode::Mclass(ParseNodeMclass {
                mode: context.parser.mode,
                loc: context.loc(),
                mclass,
                body: ord_argument(&args[1]),
                is_character_box: args[1].is_character_box().unwrap_or(false),
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    // Stack one symbol over or under another by routing through an op
    // with limits.
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Mclass),
        names: &["\\stackrel", "\\overset", "\\underset"],
        props: FunctionPropSpec {
            num_args: 2,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let base_arg = &args[1];
            let shifted_arg = &args[0];
            let func_name = context.func_name.as_str();

            let mclass = if func_name == "\\stackrel" {
                "mrel".to_owned()
            } else {
                // LaTeX applies \binrel spacing to \overset and \underset.
                binrel_class(base_arg)
            };

            let base_op = ParseNodeOp::Body {
                mode: base_arg.mode(),
                loc: context.loc(),
                limits: true,
                always_handle_sup_sub: Some(true),
                suppress_base_shift: Some(func_name != "\\stackrel"),
                parent_is_sup_sub: false,
                body: ord_argument(base_arg),
            };

            let supsub = AnyParseNode::SupSub(ParseNodeSupSub {
                mode: shifted_arg.mode(),
                loc: context.loc(),
                base: Some(Box::new(AnyParseNode::Op(base_op))),
                sup: (func_name != "\\underset").then(|| Box::new(shifted_arg.clone())),
                sub: (func_name == "\\underset").then(|| Box::new(shifted_arg.clone())),
            });

            Ok(AnyParseNode::Mclass(ParseNodeMclass {
                mode: context.parser.mode,
                loc: context.loc(),
                mclass,
                is_character_box: supsub.is_character_box().unwrap_or(false),
                body: vec![supsub],
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });
}
