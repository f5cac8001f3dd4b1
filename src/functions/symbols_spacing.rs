//! Spacing symbols: `\ `, `~`, `\nobreak`, `\allowbreak`.

use phf::phf_map;

use crate::build_common::{make_ord, make_span, mathsym};
use crate::context::EngineContext;
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType, TextNode};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType};
use crate::types::{Mode, ParseError, ParseErrorKind};

/// Spacing commands rendered purely through CSS classes.
static CSS_SPACE: phf::Map<&'static str, &'static str> = phf_map! {
    "\\nobreak" => "nobreak",
    "\\allowbreak" => "allowbreak",
};

/// Spacing commands rendered as an actual space glyph, with an optional
/// extra class.
static REGULAR_SPACE: phf::Map<&'static str, Option<&'static str>> = phf_map! {
    " " => None,
    "\\ " => None,
    "~" => Some("nobreak"),
    "\\space" => None,
    "\\nobreakspace" => Some("nobreak"),
};

/// Registers the spacing builders.
pub fn define_spacing(ctx: &mut EngineContext) {
    ctx.define_function_builders(NodeType::Spacing, Some(html_builder), Some(mathml_builder));
}

fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Spacing(spacing) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Spacing,
        }));
    };

    if let Some(class_name) = REGULAR_SPACE.get(spacing.text.as_str()) {
        let class_name = class_name.unwrap_or("").to_owned();

        if spacing.mode == Mode::Text {
            let mut ord = make_ord(ctx, node, options)?;
            if let Some(classes) = ord.classes_mut() {
                classes.push(class_name);
            }
            Ok(ord)
        } else {
            let symbol = mathsym(ctx, &spacing.text, Mode::Math, options, None)?;
            Ok(make_span(
                vec!["mspace".to_owned(), class_name],
                vec![symbol.into()],
                Some(options),
                None,
            )
            .into())
        }
    } else if let Some(class_name) = CSS_SPACE.get(spacing.text.as_str()) {
        Ok(make_span(
            vec!["mspace".to_owned(), (*class_name).to_owned()],
            vec![],
            Some(options),
            None,
        )
        .into())
    } else {
        Err(ParseError::new(ParseErrorKind::UnknownSpaceType {
            name: spacing.text.clone(),
        }))
    }
}

fn mathml_builder(
    node: &AnyParseNode,
    _options: &Options,
    _ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Spacing(spacing) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Spacing,
        }));
    };

    if REGULAR_SPACE.contains_key(spacing.text.as_str()) {
        Ok(MathNode::with_children(
            MathNodeType::Mtext,
            vec![
                TextNode {
                    text: "\u{a0}".to_owned(),
                }
                .into(),
            ],
        )
        .into())
    } else if CSS_SPACE.contains_key(spacing.text.as_str()) {
        Ok(MathNode::with_children(MathNodeType::Mspace, vec![]).into())
    } else {
        Err(ParseError::new(ParseErrorKind::UnknownSpaceType {
            name: spacing.text.clone(),
        }))
    }
}
