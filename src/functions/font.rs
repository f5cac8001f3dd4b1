//! Font switching commands, both the modern `\mathbf{...}` family and the
//! old-style `\bf ...` declarations.

use phf::phf_map;

use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{
    FunctionContext, FunctionDefSpec, FunctionPropSpec, normalize_argument,
};
use crate::dom_tree::HtmlDomNode;
use crate::functions::mclass::binrel_class;
use crate::mathml_tree::MathDomNode;
use crate::options::Options;
use crate::parser::parse_node::{
    AnyParseNode, NodeType, ParseNodeFont, ParseNodeMclass, ParseNodeOrdGroup,
};
use crate::types::{ParseError, ParseErrorKind};

fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Font(font_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Font,
        }));
    };

    let new_options = options.with_font(font_node.font.clone());
    build_html::build_group(ctx, &font_node.body, &new_options, None)
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Font(font_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Font,
        }));
    };

    let new_options = options.with_font(font_node.font.clone());
    build_mathml::build_group(ctx, &font_node.body, &new_options)
}

const FONT_ALIASES: phf::Map<&str, &str> = phf_map!(
    "\\Bbb" => "\\mathbb",
    "\\bold" => "\\mathbf",
    "\\frak" => "\\mathfrak",
    "\\bm" => "\\boldsymbol",
);

const FONT_NAMES: &[&str] = &[
    // styles, except \boldsymbol defined below
    "\\mathrm",
    "\\mathit",
    "\\mathbf",
    "\\mathnormal",
    "\\mathsfit",
    // families
    "\\mathbb",
    "\\mathcal",
    "\\mathfrak",
    "\\mathscr",
    "\\mathsf",
    "\\mathtt",
    // aliases, except \bm defined below
    "\\Bbb",
    "\\bold",
    "\\frak",
];

/// Registers the font commands.
pub fn define_font(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Font),
        names: FONT_NAMES,
        props: FunctionPropSpec {
            num_args: 1,
            allowed_in_argument: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let body = normalize_argument(&args[0]);
            let func = FONT_ALIASES
                .get(context.func_name.as_str())
                .copied()
                .unwrap_or(context.func_name.as_str());

            // Strip the backslash for the font name.
            let font = func.get(1..).unwrap_or(func).to_owned();

            Ok(AnyParseNode::Font(ParseNodeFont {
                mode: context.parser.mode,
                loc: context.loc(),
                font,
                body: Box::new(body.clone()),
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    // \boldsymbol inherits its atom class from its argument, so it wraps
    // the font node in an mclass node.
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Mclass),
        names: &["\\boldsymbol", "\\bm"],
        props: FunctionPropSpec {
            num_args: 1,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let body = &args[0];
            let is_character_box = body.is_character_box().unwrap_or(false);

            let font_node = AnyParseNode::Font(ParseNodeFont {
                mode: context.parser.mode,
                loc: context.loc(),
                font: "boldsymbol".to_owned(),
                body: Box::new(body.clone()),
            });

            Ok(AnyParseNode::Mclass(ParseNodeMclass {
                mode: context.parser.mode,
                loc: context.loc(),
                mclass: binrel_class(body),
                body: vec![font_node],
                is_character_box,
            }))
        }),
        html_builder: None,
        mathml_builder: None,
    });

    // Old-style font declarations run to the end of the group.
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Font),
        names: &["\\rm", "\\sf", "\\tt", "\\bf", "\\it", "\\cal"],
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            let style = format!(
                "math{}",
                context.func_name.get(1..).unwrap_or(&context.func_name)
            );

            let body = context
                .parser
                .parse_expression(true, context.break_on_token_text)?;

            let ordgroup = AnyParseNode::OrdGroup(ParseNodeOrdGroup {
                mode: context.parser.mode,
                loc: context.loc(),
                body,
                semisimple: None,
            });

            Ok(AnyParseNode::Font(ParseNodeFont {
                mode: context.parser.mode,
                loc: context.loc(),
                font: style,
                body: Box::new(ordgroup),
            }))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });
}
