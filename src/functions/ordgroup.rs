//! Braced groups.

use crate::build_common::{make_fragment, make_span};
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::MathDomNode;
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType};
use crate::types::{ParseError, ParseErrorKind};

/// Registers the ordgroup builders.
pub fn define_ordgroup(ctx: &mut EngineContext) {
    ctx.define_function_builders(NodeType::OrdGroup, Some(html_builder), Some(mathml_builder));
}

fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::OrdGroup(group) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::OrdGroup,
        }));
    };

    if group.semisimple.unwrap_or(false) {
        let body = build_html::build_expression(
            ctx,
            &group.body,
            options,
            build_html::GroupType::False,
            (None, None),
        )?;
        Ok(make_fragment(&body).into())
    } else {
        let body = build_html::build_expression(
            ctx,
            &group.body,
            options,
            build_html::GroupType::True,
            (None, None),
        )?;
        Ok(make_span(vec!["mord".to_owned()], body, Some(options), None).into())
    }
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::OrdGroup(group) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::OrdGroup,
        }));
    };

    build_mathml::build_expression_row(ctx, &group.body, options, Some(true))
}
