//! `\verb` and `\verb*`.
//!
//! The lexer matches the delimited form directly; the registered handler
//! only fires when the closing delimiter was missing.

use crate::build_common::{make_span, make_symbol, try_combine_chars};
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType, TextNode};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeVerb};
use crate::style::TEXT;
use crate::types::{ParseError, ParseErrorKind};

/// Registers `\verb`.
pub fn define_verb(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Verb),
        names: &["\\verb"],
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|_context: FunctionContext, _args, _opt_args| {
            Err(ParseError::new(ParseErrorKind::VerbMissingDelimiter))
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
    let AnyParseNode::Verb(verb_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Verb,
        }));
    };

    let text = make_verb(verb_node);
    let mut body: Vec<HtmlDomNode> = Vec::new();

    // \verb enters text mode, so it is sized like \textstyle.
    let new_options = options.having_style(TEXT);

    for ch in text.chars() {
        let c = if ch == '~' {
            "\\textasciitilde".to_owned()
        } else {
            ch.to_string()
        };

        let symbol = make_symbol(
            ctx,
            &c,
            "Typewriter-Regular",
            verb_node.mode,
            Some(&new_options),
            Some(&["mord".to_owned(), "texttt".to_owned()]),
        )?;
        body.push(symbol.into());
    }

    try_combine_chars(&mut body);

    let mut classes = vec!["mord".to_owned(), "text".to_owned()];
    classes.extend(new_options.sizing_classes(options));

    Ok(make_span(classes, body, Some(&new_options), None).into())
}

fn mathml_builder(
    node: &AnyParseNode,
    _options: &Options,
    _ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Verb(verb_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Verb,
        }));
    };

    let mut mtext = MathNode::with_children(
        MathNodeType::Mtext,
        vec![MathDomNode::Text(TextNode {
            text: make_verb(verb_node),
        })],
    );
    mtext.set_attribute("mathvariant", "monospace".to_owned());

    Ok(MathDomNode::Math(mtext))
}

/// The rendered text: `\verb*` shows spaces as open boxes, `\verb` keeps
/// them as no-break spaces.
fn make_verb(group: &ParseNodeVerb) -> String {
    group
        .body
        .replace(' ', if group.star { "\u{2423}" } else { "\u{a0}" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mode;

    #[test]
    fn test_make_verb_replaces_spaces() {
        let verb_node = ParseNodeVerb {
            mode: Mode::Text,
            loc: None,
            body: "hello world".to_owned(),
            star: false,
        };
        assert_eq!(make_verb(&verb_node), "hello\u{a0}world");
    }

    #[test]
    fn test_make_verb_star_uses_open_box() {
        let verb_node = ParseNodeVerb {
            mode: Mode::Text,
            loc: None,
            body: "hello world".to_owned(),
            star: true,
        };
        assert_eq!(make_verb(&verb_node), "hello\u{2423}world");
    }
}
