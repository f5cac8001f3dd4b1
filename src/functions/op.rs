//! Big operators, integrals, and named text operators.
//!
//! Symbol operators follow the TeXbook's rule 13: they grow a size in
//! display style and get recentered on the math axis. Limits layout is
//! delegated here by the supsub builder.

use crate::build_common::{make_span, make_symbol, mathsym};
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec, ord_argument};
use crate::dom_tree::HtmlDomNode;
use crate::functions::utils::assemble_sup_sub;
use crate::mathml_tree::{self, MathDomNode, MathNode, MathNodeType, TextNode};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeOp};
use crate::style::DISPLAY;
use crate::types::{CssProperty, Mode, ParseError, ParseErrorKind};
use crate::units::make_em;

/// `\smallint` stays small even in display style.
fn no_successor(name: &str) -> bool {
    matches!(name, "\\smallint")
}

pub(crate) fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    // A supsub whose base is an op with limits hands the whole group to
    // us; pull the scripts out and keep the op as the base.
    let (op_node, super_group, sub_group, has_limits) = match node {
        AnyParseNode::SupSub(supsub) => {
            let Some(AnyParseNode::Op(op_node)) = supsub.base.as_deref() else {
                return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                    node: NodeType::Op,
                }));
            };
            (op_node, supsub.sup.as_deref(), supsub.sub.as_deref(), true)
        }
        AnyParseNode::Op(op_node) => (op_node, None, None, false),
        _ => {
            return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                node: NodeType::Op,
            }));
        }
    };

    let (symbol, name, body, suppress_base_shift, mode) = match op_node {
        ParseNodeOp::Symbol {
            name,
            suppress_base_shift,
            mode,
            symbol,
            ..
        } => (
            *symbol,
            Some(name.as_str()),
            &[][..],
            *suppress_base_shift,
            *mode,
        ),
        ParseNodeOp::Body {
            body,
            suppress_base_shift,
            mode,
            ..
        } => (false, None, body.as_slice(), *suppress_base_shift, *mode),
    };

    let style = options.style;

    let large = style.size == DISPLAY.size && name.is_some_and(|name| !no_successor(name));

    let base = if let Some(name) = name {
        if symbol {
            let font_name = if large { "Size2-Regular" } else { "Size1-Regular" };

            // The contour variants have no dedicated glyph, so fall
            // back to the plain multiple integral.
            let symbol_name = match name {
                "\\oiint" => "\\iint",
                "\\oiiint" => "\\iiint",
                _ => name,
            };

            let mut base_classes = vec!["mop".to_owned(), "op-symbol".to_owned()];
            base_classes.push(if large { "large-op" } else { "small-op" }.to_owned());

            make_symbol(
                ctx,
                symbol_name,
                font_name,
                Mode::Math,
                Some(options),
                Some(&base_classes),
            )?
            .into()
        } else {
            // Text operator: render the name without its backslash.
            let mut output = Vec::new();
            for ch in name.chars().skip(1) {
                output.push(mathsym(ctx, &ch.to_string(), mode, options, None)?.into());
            }
            make_span(vec!["mop".to_owned()], output, Some(options), None).into()
        }
    } else {
        let inner = build_html::build_expression(
            ctx,
            body,
            options,
            build_html::GroupType::True,
            (None, None),
        )?;
        if inner.len() == 1
            && let HtmlDomNode::Symbol(sym) = &inner[0]
        {
            let mut sym = sym.clone();
            // Replace the spacing class the symbol came with.
            "mop".clone_into(&mut sym.classes[0]);
            sym.into()
        } else {
            make_span(vec!["mop".to_owned()], inner, Some(options), None).into()
        }
    };

    // Center symbol operators on the math axis, and note their italic
    // correction so limits can be slanted to match.
    let mut base_shift = 0.0;
    let mut slant = 0.0;
    if suppress_base_shift.is_none()
        && let HtmlDomNode::Symbol(sym) = &base
    {
        base_shift = (sym.height - sym.depth) / 2.0 - options.font_metrics().axis_height;
        slant = sym.italic;
    }

    if has_limits {
        assemble_sup_sub(
            ctx, base, super_group, sub_group, options, style, slant, base_shift,
        )
    } else {
        let mut base = base;
        if base_shift != 0.0
            && let Some(style) = base.style_mut()
        {
            style.insert(CssProperty::Position, "relative".to_owned());
            style.insert(CssProperty::Top, make_em(base_shift));
        }
        Ok(base)
    }
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Op(op_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Op,
        }));
    };

    match op_node {
        ParseNodeOp::Symbol { name, symbol, .. } if *symbol => {
            let mut mo = MathNode::with_children(
                MathNodeType::Mo,
                vec![TextNode { text: name.clone() }.into()],
            );
            if no_successor(name) {
                mo.set_attribute("largeop", "false");
            }
            Ok(mo.into())
        }
        ParseNodeOp::Body { body, .. } => {
            let inner = build_mathml::build_expression(ctx, body, options, None)?;
            Ok(MathNode::with_children(MathNodeType::Mo, inner).into())
        }
        ParseNodeOp::Symbol {
            name,
            parent_is_sup_sub,
            ..
        } => {
            // Text operator: the name plus an invisible apply-function
            // operator.
            let text = name.get(1..).unwrap_or(name).to_owned();
            let mi = MathNode::with_children(MathNodeType::Mi, vec![TextNode { text }.into()]);
            let operator = MathNode::with_children(
                MathNodeType::Mo,
                vec![
                    TextNode {
                        text: "\u{2061}".to_owned(),
                    }
                    .into(),
                ],
            );

            if *parent_is_sup_sub {
                Ok(MathNode::with_children(MathNodeType::Mrow, vec![mi.into(), operator.into()])
                    .into())
            } else {
                Ok(mathml_tree::make_fragment(vec![mi.into(), operator.into()]).into())
            }
        }
    }
}

/// Remaps Unicode big-operator codepoints onto their command names.
fn canonical_op_name(func_name: &str) -> String {
    match func_name {
        "\u{220F}" => "\\prod",
        "\u{2210}" => "\\coprod",
        "\u{2211}" => "\\sum",
        "\u{22c0}" => "\\bigwedge",
        "\u{22c1}" => "\\bigvee",
        "\u{22c2}" => "\\bigcap",
        "\u{22c3}" => "\\bigcup",
        "\u{2a00}" => "\\bigodot",
        "\u{2a01}" => "\\bigoplus",
        "\u{2a02}" => "\\bigotimes",
        "\u{2a04}" => "\\biguplus",
        "\u{2a06}" => "\\bigsqcup",
        "\u{222b}" => "\\int",
        "\u{222c}" => "\\iint",
        "\u{222d}" => "\\iiint",
        "\u{222e}" => "\\oint",
        "\u{222f}" => "\\oiint",
        "\u{2230}" => "\\oiiint",
        other => other,
    }
    .to_owned()
}

/// Registers the operator functions.
pub fn define_op(ctx: &mut EngineContext) {
    // Big operators with limits.
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Op),
        names: &[
            "\\coprod",
            "\\bigvee",
            "\\bigwedge",
            "\\biguplus",
            "\\bigcap",
            "\\bigcup",
            "\\intop",
            "\\prod",
            "\\sum",
            "\\bigotimes",
            "\\bigoplus",
            "\\bigodot",
            "\\bigsqcup",
            "\\smallint",
            "\u{220F}",
            "\u{2210}",
            "\u{2211}",
            "\u{22c0}",
            "\u{22c1}",
            "\u{22c2}",
            "\u{22c3}",
            "\u{2a00}",
            "\u{2a01}",
            "\u{2a02}",
            "\u{2a04}",
            "\u{2a06}",
        ],
        props: FunctionPropSpec {
            num_args: 0,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            Ok(AnyParseNode::Op(ParseNodeOp::Symbol {
                mode: context.parser.mode,
                loc: context.loc(),
                limits: true,
                always_handle_sup_sub: None,
                suppress_base_shift: None,
                parent_is_sup_sub: false,
                name: canonical_op_name(&context.func_name),
                symbol: true,
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Op),
        names: &["\\mathop"],
        props: FunctionPropSpec {
            num_args: 1,
            primitive: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            Ok(AnyParseNode::Op(ParseNodeOp::Body {
                mode: context.parser.mode,
                loc: context.loc(),
                limits: false,
                always_handle_sup_sub: None,
                suppress_base_shift: None,
                parent_is_sup_sub: false,
                body: ord_argument(&args[0]),
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    // Text operators without limits.
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Op),
        names: &[
            "\\arcsin", "\\arccos", "\\arctan", "\\arctg", "\\arcctg", "\\arg", "\\ch", "\\cos",
            "\\cosec", "\\cosh", "\\cot", "\\cotg", "\\coth", "\\csc", "\\ctg", "\\cth", "\\deg",
            "\\dim", "\\exp", "\\hom", "\\ker", "\\lg", "\\ln", "\\log", "\\sec", "\\sin",
            "\\sinh", "\\sh", "\\tan", "\\tanh", "\\tg", "\\th",
        ],
        props: FunctionPropSpec {
            num_args: 0,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            Ok(AnyParseNode::Op(ParseNodeOp::Symbol {
                mode: context.parser.mode,
                loc: context.loc(),
                limits: false,
                always_handle_sup_sub: None,
                suppress_base_shift: None,
                parent_is_sup_sub: false,
                name: context.func_name,
                symbol: false,
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    // Text operators that take limits.
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Op),
        names: &[
            "\\det", "\\gcd", "\\inf", "\\lim", "\\max", "\\min", "\\Pr", "\\sup",
        ],
        props: FunctionPropSpec {
            num_args: 0,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            Ok(AnyParseNode::Op(ParseNodeOp::Symbol {
                mode: context.parser.mode,
                loc: context.loc(),
                limits: true,
                always_handle_sup_sub: None,
                suppress_base_shift: None,
                parent_is_sup_sub: false,
                name: context.func_name,
                symbol: false,
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    // Integrals place their scripts beside the symbol.
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Op),
        names: &[
            "\\int", "\\iint", "\\iiint", "\\oint", "\\oiint", "\\oiiint", "\u{222b}", "\u{222c}",
            "\u{222d}", "\u{222e}", "\u{222f}", "\u{2230}",
        ],
        props: FunctionPropSpec {
            num_args: 0,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            Ok(AnyParseNode::Op(ParseNodeOp::Symbol {
                mode: context.parser.mode,
                loc: context.loc(),
                limits: false,
                always_handle_sup_sub: None,
                suppress_base_shift: None,
                parent_is_sup_sub: false,
                name: canonical_op_name(&context.func_name),
                symbol: true,
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });
}
