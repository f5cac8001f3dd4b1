//! `\href` and `\url`, gated by the trust settings.

use crate::build_common::make_anchor;
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{
    AnyParseNode, NodeType, ParseNodeHref, ParseNodeText, ParseNodeTextOrd,
};
use crate::types::{ArgType, ParseError, ParseErrorKind, TrustContext};

/// Registers `\href` and `\url`.
pub fn define_href(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Href),
        names: &["\\href"],
        props: FunctionPropSpec {
            num_args: 2,
            arg_types: Some(vec![ArgType::Url, ArgType::Original]),
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let AnyParseNode::Url(url_node) = &args[0] else {
                return Err(ParseError::new(ParseErrorKind::ArgumentMustBeUrl {
                    context: r"\href",
                }));
            };
            let href = url_node.url.clone();

            let mut trust_ctx = TrustContext {
                command: "\\href".to_owned(),
                url: Some(href.clone()),
                ..Default::default()
            };
            if !context.parser.settings.is_trusted(&mut trust_ctx) {
                return Err(ParseError::new(ParseErrorKind::CommandNotTrusted {
                    name: r"\href",
                }));
            }

            Ok(AnyParseNode::Href(ParseNodeHref {
                mode: context.parser.mode,
                loc: context.loc(),
                href,
                body: vec![args[1].clone()],
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Href),
        names: &["\\url"],
        props: FunctionPropSpec {
            num_args: 1,
            arg_types: Some(vec![ArgType::Url]),
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let AnyParseNode::Url(url_node) = &args[0] else {
                return Err(ParseError::new(ParseErrorKind::ArgumentMustBeUrl {
                    context: r"\url",
                }));
            };
            let href = url_node.url.clone();

            let mut trust_ctx = TrustContext {
                command: "\\url".to_owned(),
                url: Some(href.clone()),
                ..Default::default()
            };
            if !context.parser.settings.is_trusted(&mut trust_ctx) {
                return Err(ParseError::new(ParseErrorKind::CommandNotTrusted {
                    name: r"\url",
                }));
            }

            // The link text is the URL itself, set in typewriter type
            // with ~ spelled out.
            let mut chars = Vec::new();
            for ch in href.chars() {
                if ch == '~' {
                    chars.push(AnyParseNode::Text(ParseNodeText {
                        mode: context.parser.mode,
                        loc: context.loc(),
                        body: vec![AnyParseNode::TextOrd(ParseNodeTextOrd {
                            mode: context.parser.mode,
                            loc: context.loc(),
                            text: "\\textasciitilde".to_owned(),
                        })],
                        font: None,
                    }));
                } else {
                    chars.push(AnyParseNode::TextOrd(ParseNodeTextOrd {
                        mode: context.parser.mode,
                        loc: context.loc(),
                        text: ch.to_string(),
                    }));
                }
            }

            let body = AnyParseNode::Text(ParseNodeText {
                mode: context.parser.mode,
                loc: context.loc(),
                body: chars,
                font: Some("\\texttt".to_owned()),
            });

            Ok(AnyParseNode::Href(ParseNodeHref {
                mode: context.parser.mode,
                loc: context.loc(),
                href,
                body: vec![body],
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
    let AnyParseNode::Href(href_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Href,
        }));
    };

    let elements = build_html::build_expression(
        ctx,
        &href_node.body,
        options,
        build_html::GroupType::False,
        (None, None),
    )?;

    Ok(make_anchor(&href_node.href, &[], &elements, options).into())
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Href(href_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Href,
        }));
    };

    let children = build_mathml::build_expression(ctx, &href_node.body, options, None)?;
    let mut math_node = if children.len() == 1
        && let MathDomNode::Math(math) = &children[0]
    {
        math.clone()
    } else {
        MathNode::with_children(MathNodeType::Mrow, children)
    };
    math_node.set_attribute("href", href_node.href.clone());

    Ok(MathDomNode::Math(math_node))
}
