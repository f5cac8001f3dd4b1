//! `\operatorname` and its limits-taking variant.

use crate::build_common::make_span;
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec, ord_argument};
use crate::dom_tree::HtmlDomNode;
use crate::functions::utils::assemble_sup_sub;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType, TextNode, make_fragment};
use crate::options::Options;
use crate::parser::parse_node::{
    AnyParseNode, NodeType, ParseNodeOperatorName, ParseNodeTextOrd,
};
use crate::types::ErrorLocationProvider as _;
use crate::types::{ParseError, ParseErrorKind};

/// The name is typeset in upright roman, so Unicode minus and asterisk
/// read wrong; swap them for their ASCII forms.
fn normalize_symbol_text(node: &mut HtmlDomNode) {
    match node {
        HtmlDomNode::Symbol(symbol) => {
            let replaced = symbol
                .text
                .replace('\u{2212}', "-")
                .replace('\u{2217}', "*");
            if symbol.text != replaced {
                symbol.text = replaced;
            }
        }
        HtmlDomNode::DomSpan(span) => {
            for child in &mut span.children {
                normalize_symbol_text(child);
            }
        }
        HtmlDomNode::Anchor(anchor) => {
            for child in &mut anchor.children {
                normalize_symbol_text(child);
            }
        }
        HtmlDomNode::Fragment(fragment) => {
            for child in &mut fragment.children {
                normalize_symbol_text(child);
            }
        }
        _ => {}
    }
}

/// Builds both bare operatorname nodes and, for the starred form, the
/// supsub group that wraps one.
pub(crate) fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let (operatorname_node, super_group, sub_group, has_limits) = match node {
        AnyParseNode::SupSub(supsub) => {
            let Some(AnyParseNode::OperatorName(op_node)) = supsub.base.as_deref() else {
                return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                    node: NodeType::OperatorName,
                }));
            };
            (op_node, supsub.sup.as_deref(), supsub.sub.as_deref(), true)
        }
        AnyParseNode::OperatorName(op_node) => (op_node, None, None, false),
        _ => {
            return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                node: NodeType::OperatorName,
            }));
        }
    };

    // Flatten symbol children down to textords so the roman font
    // applies uniformly.
    let body: Vec<AnyParseNode> = operatorname_node
        .body
        .iter()
        .map(|child| {
            child.text().map_or_else(
                || child.clone(),
                |text| {
                    AnyParseNode::TextOrd(ParseNodeTextOrd {
                        mode: child.mode(),
                        loc: child.loc().cloned(),
                        text: text.to_owned(),
                    })
                },
            )
        })
        .collect();

    let base = if body.is_empty() {
        make_span(vec!["mop".to_owned()], vec![], Some(options), None)
    } else {
        let mut expression = build_html::build_expression(
            ctx,
            &body,
            &options.with_font("mathrm".to_owned()),
            build_html::GroupType::True,
            (None, None),
        )?;

        for node in &mut expression {
            normalize_symbol_text(node);
        }

        make_span(vec!["mop".to_owned()], expression, Some(options), None)
    };

    if has_limits {
        assemble_sup_sub(
            ctx,
            base.into(),
            super_group,
            sub_group,
            options,
            options.style,
            0.0,
            0.0,
        )
    } else {
        Ok(base.into())
    }
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::OperatorName(operatorname_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::OperatorName,
        }));
    };

    let mut expression = build_mathml::build_expression(
        ctx,
        &operatorname_node.body,
        &options.with_font("mathrm".to_owned()),
        None,
    )?;

    // When the name is plain text we collapse it to one text node so
    // screen readers see a single word.
    let mut is_all_string = true;
    for node in &mut expression {
        match node {
            MathDomNode::Space(_) => {}
            MathDomNode::Math(math_node) => match math_node.node_type {
                MathNodeType::Mi
                | MathNodeType::Mn
                | MathNodeType::Mspace
                | MathNodeType::Mtext => {}
                MathNodeType::Mo => {
                    if let [MathDomNode::Text(text_node)] = &mut math_node.children[..] {
                        let replaced = text_node
                            .text
                            .replace('\u{2212}', "-")
                            .replace('\u{2217}', "*");
                        if text_node.text != replaced {
                            text_node.text = replaced;
                        }
                    } else {
                        is_all_string = false;
                    }
                }
                _ => {
                    is_all_string = false;
                }
            },
            _ => {
                is_all_string = false;
            }
        }
    }

    if is_all_string {
        let word: String = expression.iter().map(MathDomNode::to_text).collect();
        expression = vec![TextNode { text: word }.into()];
    }

    let mut identifier = MathNode::with_children(MathNodeType::Mi, expression);
    identifier.set_attribute("mathvariant", "normal");

    let operator = MathNode::with_children(
        MathNodeType::Mo,
        vec![
            TextNode {
                text: "\u{2061}".to_owned(),
            }
            .into(),
        ],
    );

    if operatorname_node.parent_is_sup_sub {
        Ok(
            MathNode::with_children(MathNodeType::Mrow, vec![identifier.into(), operator.into()])
                .into(),
        )
    } else {
        Ok(make_fragment(vec![identifier.into(), operator.into()]).into())
    }
}

/// Registers `\operatorname@` and `\operatornamewithlimits`.
pub fn define_operatorname(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::OperatorName),
        names: &["\\operatorname@", "\\operatornamewithlimits"],
        props: FunctionPropSpec {
            num_args: 1,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            Ok(AnyParseNode::OperatorName(ParseNodeOperatorName {
                mode: context.parser.mode,
                loc: context.loc(),
                body: ord_argument(&args[0]),
                always_handle_sup_sub: context.func_name == "\\operatornamewithlimits",
                limits: false,
                parent_is_sup_sub: false,
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });
}
