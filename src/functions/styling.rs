//! Style switching commands, `\displaystyle` through `\scriptscriptstyle`.

use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::dom_tree::HtmlDomNode;
use crate::functions::sizing::sizing_group;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeStyling};
use crate::style::{DISPLAY, SCRIPT, SCRIPTSCRIPT, Style, TEXT};
use crate::types::{ParseError, ParseErrorKind};

fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Styling(styling_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Styling,
        }));
    };

    // Style changes follow the TeXbook pg. 442, rule 3.
    let new_options = options
        .having_style(styling_node.style)
        .with_font(String::new());
    sizing_group(ctx, &styling_node.body, &new_options, options)
}

const STYLE_ATTRIBUTES: [(&Style, u8, bool); 4] = [
    (DISPLAY, 0, true),
    (TEXT, 0, false),
    (SCRIPT, 1, false),
    (SCRIPTSCRIPT, 2, false),
];

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Styling(styling_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Styling,
        }));
    };

    let new_options = options.having_style(styling_node.style);
    let inner = build_mathml::build_expression(ctx, &styling_node.body, &new_options, None)?;

    let mut node = MathNode::with_children(MathNodeType::Mstyle, inner);
    for (style, script_level, display) in STYLE_ATTRIBUTES {
        if styling_node.style == style {
            node.set_attribute("scriptlevel", script_level.to_string());
            node.set_attribute("displaystyle", display.to_string());
            break;
        }
    }

    Ok(MathDomNode::Math(node))
}

/// Registers the style commands.
pub fn define_styling(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Styling),
        names: &[
            "\\displaystyle",
            "\\textstyle",
            "\\scriptstyle",
            "\\scriptscriptstyle",
        ],
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            primitive: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            // The style applies to the rest of the group.
            let body = context
                .parser
                .parse_expression(true, context.break_on_token_text)?;

            let style = match context.func_name.as_str() {
                "\\displaystyle" => DISPLAY,
                "\\scriptstyle" => SCRIPT,
                "\\scriptscriptstyle" => SCRIPTSCRIPT,
                _ => TEXT,
            };

            Ok(AnyParseNode::Styling(ParseNodeStyling {
                mode: context.parser.mode,
                loc: context.loc(),
                style,
                body,
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });
}
