//! Explicit horizontal spacing: `\kern`, `\mkern`, `\hskip`, `\mskip`.

use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, SpaceNode};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeKern};
use crate::types::{ArgType, ErrorLocationProvider, Mode, ParseError, ParseErrorKind};

/// Registers the kerning commands.
pub fn define_kern(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Kern),
        names: &["\\kern", "\\mkern", "\\hskip", "\\mskip"],
        props: FunctionPropSpec {
            num_args: 1,
            arg_types: Some(vec![ArgType::Size]),
            primitive: true,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let AnyParseNode::Size(size_node) = &args[0] else {
                return Err(ParseError::new(ParseErrorKind::ExpectedGroupAs {
                    context: "size".to_owned(),
                }));
            };

            // \mkern/\mskip take mu; \kern/\hskip take anything else.
            let func_name = &context.func_name;
            let math_function = func_name.chars().nth(1) == Some('m');
            let mu_unit = size_node.value.unit == "mu";

            if math_function {
                if !mu_unit {
                    context.parser.settings.report_nonstrict(
                        "mathVsTextUnits",
                        &format!(
                            "LaTeX's {} supports only mu units, not {} units",
                            func_name, size_node.value.unit
                        ),
                        context.token.map(|t| t as &dyn ErrorLocationProvider),
                    )?;
                }
                if context.parser.mode != Mode::Math {
                    context.parser.settings.report_nonstrict(
                        "mathVsTextUnits",
                        &format!("LaTeX's {func_name} works only in math mode"),
                        context.token.map(|t| t as &dyn ErrorLocationProvider),
                    )?;
                }
            } else if mu_unit {
                context.parser.settings.report_nonstrict(
                    "mathVsTextUnits",
                    &format!("LaTeX's {func_name} doesn't support mu units"),
                    context.token.map(|t| t as &dyn ErrorLocationProvider),
                )?;
            }

            Ok(AnyParseNode::Kern(ParseNodeKern {
                mode: context.parser.mode,
                loc: context.loc(),
                dimension: size_node.value.clone(),
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
    let AnyParseNode::Kern(kern_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Kern,
        }));
    };

    Ok(ctx.make_glue(&kern_node.dimension, options)?.into())
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Kern(kern_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Kern,
        }));
    };

    let width = ctx.calculate_size(&kern_node.dimension, options)?;
    Ok(MathDomNode::Space(SpaceNode::new(width)))
}
