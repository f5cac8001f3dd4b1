//! Generalized fractions: `\frac`, `\binom`, `\genfrac`, and the infix
//! forms `\over`, `\choose`, `\atop`, `\above`.
//!
//! Placement follows the TeXbook's rules 15a-e; the infix commands are
//! rewritten by the parser into the prefix spellings registered here.

use phf::phf_map;

use crate::build_common::{VListElemAndShift, VListParam, make_line_span, make_span, make_v_list};
use crate::build_html::{self, make_null_delimiter};
use crate::build_mathml::{self, make_row};
use crate::context::EngineContext;
use crate::define_function::{
    FunctionContext, FunctionDefSpec, FunctionPropSpec, normalize_argument,
};
use crate::delimiter::custom_sized_delim;
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType, TextNode};
use crate::options::Options;
use crate::parser::parse_node::{
    AnyParseNode, NodeType, ParseNodeGenfrac, ParseNodeInfix,
};
use crate::style::{DISPLAY, SCRIPT, SCRIPTSCRIPT, Style, TEXT};
use crate::symbols::Atom;
use crate::types::{ArgType, Mode, ParseError, ParseErrorKind};
use crate::units::make_em;

fn delim_from_value(delim: &str) -> Option<String> {
    if delim.is_empty() || delim == "." {
        None
    } else {
        Some(delim.to_owned())
    }
}

static INFIX_REPLACE: phf::Map<&'static str, &'static str> = phf_map! {
    "\\over" => "\\frac",
    "\\choose" => "\\binom",
    "\\atop" => r"\\atopfrac",
    "\\brace" => r"\\bracefrac",
    "\\brack" => r"\\brackfrac",
};

/// Resolves the forced fraction style against the incoming one.
fn adjust_style(
    size: Option<&'static Style>,
    original_style: &'static Style,
) -> &'static Style {
    let mut style = original_style;
    if let Some(size) = size {
        if size.id == DISPLAY.id {
            // Inside scripts, \dfrac means "one step back up", not full
            // display style.
            style = if style.id >= SCRIPT.id {
                style.text()
            } else {
                DISPLAY
            };
        } else if size.id == TEXT.id && style.size == DISPLAY.size {
            style = TEXT;
        } else if size.id == SCRIPT.id {
            style = SCRIPT;
        } else if size.id == SCRIPTSCRIPT.id {
            style = SCRIPTSCRIPT;
        }
    }
    style
}

pub(crate) fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Genfrac(group) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Genfrac,
        }));
    };

    let style = adjust_style(group.size, options.style);

    let numer_options = options.having_style(style.frac_num());
    let denom_options = options.having_style(style.frac_den());

    let mut numer = build_html::build_group(ctx, &group.numer, &numer_options, Some(options))?;
    if group.continued {
        // \cfrac numerators carry a \strut (TeXbook pg. 353).
        let h_strut = 8.5 / options.font_metrics().pt_per_em;
        let d_strut = 3.5 / options.font_metrics().pt_per_em;
        if let Some(height) = numer.height_mut() {
            *height = height.max(h_strut);
        }
        if let Some(depth) = numer.depth_mut() {
            *depth = depth.max(d_strut);
        }
    }
    let denom = build_html::build_group(ctx, &group.denom, &denom_options, Some(options))?;

    let fm = options.font_metrics();
    let axis_height = fm.axis_height;

    let (rule, rule_width, rule_spacing) = if group.has_bar_line {
        let rule = if let Some(bar_size) = &group.bar_size {
            let rule_width = ctx.calculate_size(bar_size, options)?;
            make_line_span("frac-line", options, Some(rule_width))
        } else {
            make_line_span("frac-line", options, None)
        };
        let rule_height = rule.height;
        (Some(rule), rule_height, rule_height)
    } else {
        (None, 0.0, fm.default_rule_thickness)
    };

    // Rule 15b: style-dependent starting shifts and clearance.
    let (mut num_shift, mut denom_shift, clearance) =
        if style.id == DISPLAY.id || group.size.is_some_and(|size| size.id == DISPLAY.id) {
            let clearance = if rule_width > 0.0 {
                3.0 * rule_spacing
            } else {
                7.0 * rule_spacing
            };
            (fm.num1, fm.denom1, clearance)
        } else {
            let (num_shift, clearance) = if rule_width > 0.0 {
                (fm.num2, rule_spacing)
            } else {
                (fm.num3, 3.0 * rule_spacing)
            };
            (num_shift, fm.denom2, clearance)
        };

    if group.has_bar_line {
        // Rule 15d.
        if (num_shift - numer.depth()) - 0.5f64.mul_add(rule_width, axis_height) < clearance {
            num_shift +=
                clearance - ((num_shift - numer.depth()) - 0.5f64.mul_add(rule_width, axis_height));
        }
        if 0.5f64.mul_add(-rule_width, axis_height) - (denom.height() - denom_shift) < clearance {
            denom_shift += clearance
                - (0.5f64.mul_add(-rule_width, axis_height) - (denom.height() - denom_shift));
        }
    } else {
        // Rule 15c.
        let candidate_clearance = (num_shift - numer.depth()) - (denom.height() - denom_shift);
        if candidate_clearance < clearance {
            let adjustment = 0.5 * (clearance - candidate_clearance);
            num_shift += adjustment;
            denom_shift += adjustment;
        }
    }

    let mut children = vec![
        VListElemAndShift::builder()
            .elem(denom)
            .shift(denom_shift)
            .build(),
    ];
    if let Some(rule) = rule {
        let mid_shift = -0.5f64.mul_add(-rule_width, axis_height);
        children.push(
            VListElemAndShift::builder()
                .elem(rule.into())
                .shift(mid_shift)
                .build(),
        );
    }
    children.push(
        VListElemAndShift::builder()
            .elem(numer)
            .shift(-num_shift)
            .build(),
    );

    let mut frac = make_v_list(VListParam::IndividualShift { children }, options)?;

    // The style change may also change the size; rescale the extents.
    let new_options = options.having_style(style);
    frac.height *= new_options.size_multiplier / options.size_multiplier;
    frac.depth *= new_options.size_multiplier / options.size_multiplier;

    // Rule 15e: delimiter size for the surrounding fences.
    let delim_size = if style.size == DISPLAY.size {
        fm.delim1
    } else if style.size == SCRIPTSCRIPT.size {
        options.having_style(SCRIPT).font_metrics().delim2
    } else {
        fm.delim2
    };

    let left_delim_span = if let Some(left_delim) = &group.left_delim {
        custom_sized_delim(
            ctx,
            left_delim,
            delim_size,
            true,
            &options.having_style(style),
            group.mode,
            &[String::from("mopen")],
        )?
    } else {
        make_null_delimiter(options, &[String::from("mopen")])
    };
    let right_delim_span = if group.continued {
        make_span(vec![], vec![], None, None)
    } else if let Some(right_delim) = &group.right_delim {
        custom_sized_delim(
            ctx,
            right_delim,
            delim_size,
            true,
            &options.having_style(style),
            group.mode,
            &[String::from("mclose")],
        )?
    } else {
        make_null_delimiter(options, &[String::from("mclose")])
    };

    let frac_span = make_span(vec![String::from("mfrac")], vec![frac.into()], None, None);

    let classes: Vec<String> = std::iter::once(String::from("mord"))
        .chain(new_options.sizing_classes(options))
        .collect();
    Ok(make_span(
        classes,
        vec![
            left_delim_span.into(),
            frac_span.into(),
            right_delim_span.into(),
        ],
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
    let AnyParseNode::Genfrac(group) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Genfrac,
        }));
    };

    let style = adjust_style(group.size, options.style);

    let numer = build_mathml::build_group(ctx, &group.numer, &options.having_style(style.frac_num()))?;
    let denom = build_mathml::build_group(ctx, &group.denom, &options.having_style(style.frac_den()))?;

    let mut mfrac = MathNode::with_children(MathNodeType::Mfrac, vec![numer, denom]);
    if !group.has_bar_line {
        mfrac.set_attribute("linethickness", "0px");
    } else if let Some(bar_size) = &group.bar_size {
        let size = ctx.calculate_size(bar_size, options)?;
        mfrac.set_attribute("linethickness", make_em(size));
    }

    let mut final_node = mfrac;
    if style.size != options.style.size {
        let mut mstyle =
            MathNode::with_children(MathNodeType::Mstyle, vec![final_node.into()]);
        mstyle.set_attribute(
            "displaystyle",
            if style.size == DISPLAY.size { "true" } else { "false" },
        );
        mstyle.set_attribute("scriptlevel", "0");
        final_node = mstyle;
    }

    if group.left_delim.is_some() || group.right_delim.is_some() {
        let mut children = Vec::new();

        if let Some(left_delim) = &group.left_delim {
            let mut left_op = MathNode::with_children(
                MathNodeType::Mo,
                vec![
                    TextNode {
                        text: left_delim.replace('\\', ""),
                    }
                    .into(),
                ],
            );
            left_op.set_attribute("fence", "true");
            children.push(left_op.into());
        }

        children.push(final_node.into());

        if let Some(right_delim) = &group.right_delim {
            let mut right_op = MathNode::with_children(
                MathNodeType::Mo,
                vec![
                    TextNode {
                        text: right_delim.replace('\\', ""),
                    }
                    .into(),
                ],
            );
            right_op.set_attribute("fence", "true");
            children.push(right_op.into());
        }

        Ok(make_row(&children))
    } else {
        Ok(final_node.into())
    }
}

/// Registers the fraction commands, the infix forms included.
pub fn define_genfrac(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Genfrac),
        names: &[
            r"\dfrac",
            r"\frac",
            r"\tfrac",
            r"\dbinom",
            r"\binom",
            r"\tbinom",
            // Spellable only through the infix rewrites.
            r"\\atopfrac",
            r"\\bracefrac",
            r"\\brackfrac",
        ],
        props: FunctionPropSpec {
            num_args: 2,
            allowed_in_argument: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let (left_delim, right_delim, has_bar_line) = match context.func_name.as_str() {
                "\\dfrac" | "\\frac" | "\\tfrac" => (None, None, true),
                "\\dbinom" | "\\binom" | "\\tbinom" => {
                    (Some("(".to_owned()), Some(")".to_owned()), false)
                }
                "\\\\atopfrac" => (None, None, false),
                "\\\\bracefrac" => (Some(r"\{".to_owned()), Some(r"\}".to_owned()), false),
                "\\\\brackfrac" => (Some("[".to_owned()), Some("]".to_owned()), false),
                _ => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnrecognizedGenfracCommand {
                            command: context.func_name.clone(),
                        },
                    ));
                }
            };

            let size = match context.func_name.as_str() {
                "\\dfrac" | "\\dbinom" => Some(DISPLAY),
                "\\tfrac" | "\\tbinom" => Some(TEXT),
                _ => None,
            };

            Ok(AnyParseNode::Genfrac(Box::new(ParseNodeGenfrac {
                mode: context.parser.mode,
                loc: context.loc(),
                continued: false,
                numer: Box::new(args[0].clone()),
                denom: Box::new(args[1].clone()),
                has_bar_line,
                left_delim,
                right_delim,
                size,
                bar_size: None,
            })))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Genfrac),
        names: &["\\cfrac"],
        props: FunctionPropSpec {
            num_args: 2,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            Ok(AnyParseNode::Genfrac(Box::new(ParseNodeGenfrac {
                mode: context.parser.mode,
                loc: context.loc(),
                continued: true,
                numer: Box::new(args[0].clone()),
                denom: Box::new(args[1].clone()),
                has_bar_line: true,
                left_delim: None,
                right_delim: None,
                size: Some(DISPLAY),
                bar_size: None,
            })))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    // Infix primitives; the parser rewrites them to the prefix forms.
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Infix),
        names: &["\\over", "\\choose", "\\atop", "\\brace", "\\brack"],
        props: FunctionPropSpec {
            infix: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            if let Some(replace_with) = INFIX_REPLACE.get(context.func_name.as_str()) {
                Ok(AnyParseNode::Infix(ParseNodeInfix {
                    mode: context.parser.mode,
                    loc: context.loc(),
                    replace_with: (*replace_with).to_owned(),
                    size: None,
                    token: None,
                }))
            } else {
                let kind = ParseErrorKind::UnrecognizedInfixGenfracCommand {
                    command: context.func_name.clone(),
                };
                match context.token {
                    Some(token) => Err(ParseError::with_token(kind, token)),
                    None => Err(ParseError::new(kind)),
                }
            }
        }),
        html_builder: None,
        mathml_builder: None,
    });

    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Infix),
        names: &["\\above"],
        props: FunctionPropSpec {
            num_args: 1,
            arg_types: Some(vec![ArgType::Size]),
            infix: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let AnyParseNode::Size(size) = &args[0] else {
                return Err(ParseError::new(ParseErrorKind::AboveArgumentMustBeSize));
            };
            Ok(AnyParseNode::Infix(ParseNodeInfix {
                mode: context.parser.mode,
                loc: context.loc(),
                replace_with: "\\\\abovefrac".to_owned(),
                size: Some(size.value.clone()),
                token: None,
            }))
        }),
        html_builder: None,
        mathml_builder: None,
    });

    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Genfrac),
        names: &["\\\\abovefrac"],
        props: FunctionPropSpec {
            num_args: 3,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let AnyParseNode::Infix(infix) = &args[1] else {
                return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                    node: NodeType::Infix,
                }));
            };
            let bar_size = infix.size.clone();
            let has_bar_line = bar_size
                .as_ref()
                .is_some_and(|measurement| measurement.number > 0.0);

            Ok(AnyParseNode::Genfrac(Box::new(ParseNodeGenfrac {
                mode: context.parser.mode,
                loc: context.loc(),
                continued: false,
                numer: Box::new(args[0].clone()),
                denom: Box::new(args[2].clone()),
                has_bar_line,
                left_delim: None,
                right_delim: None,
                size: None,
                bar_size,
            })))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Genfrac),
        names: &["\\genfrac"],
        props: FunctionPropSpec {
            num_args: 6,
            arg_types: Some(vec![
                ArgType::Mode(Mode::Math),
                ArgType::Mode(Mode::Math),
                ArgType::Size,
                ArgType::Mode(Mode::Text),
                ArgType::Mode(Mode::Math),
                ArgType::Mode(Mode::Math),
            ]),
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let left_delim = match normalize_argument(&args[0]) {
                AnyParseNode::Atom(node) if node.family == Atom::Open => {
                    delim_from_value(&node.text)
                }
                _ => None,
            };
            let right_delim = match normalize_argument(&args[1]) {
                AnyParseNode::Atom(node) if node.family == Atom::Close => {
                    delim_from_value(&node.text)
                }
                _ => None,
            };

            let mut has_bar_line = true;
            let bar_size = if let AnyParseNode::Size(size_node) = &args[2] {
                if size_node.is_blank {
                    None
                } else {
                    has_bar_line = size_node.value.number > 0.0;
                    Some(size_node.value.clone())
                }
            } else {
                None
            };

            let convert_style = |text: &str| {
                let level = text.parse::<u8>().map_err(|_| {
                    ParseError::new(ParseErrorKind::InvalidGenfracStyle {
                        level: text.to_owned(),
                    })
                })?;
                match level {
                    0 => Ok(DISPLAY),
                    1 => Ok(TEXT),
                    2 => Ok(SCRIPT),
                    3 => Ok(SCRIPTSCRIPT),
                    _ => Err(ParseError::new(ParseErrorKind::InvalidGenfracStyle {
                        level: level.to_string(),
                    })),
                }
            };

            let mut size = None;
            match &args[3] {
                AnyParseNode::OrdGroup(ord_group) => {
                    if let Some(AnyParseNode::TextOrd(text_ord)) = ord_group.body.first() {
                        size = Some(convert_style(&text_ord.text)?);
                    }
                }
                AnyParseNode::TextOrd(text_ord) => {
                    size = Some(convert_style(&text_ord.text)?);
                }
                _ => {}
            }

            Ok(AnyParseNode::Genfrac(Box::new(ParseNodeGenfrac {
                mode: context.parser.mode,
                loc: context.loc(),
                continued: false,
                numer: Box::new(args[4].clone()),
                denom: Box::new(args[5].clone()),
                has_bar_line,
                left_delim,
                right_delim,
                size,
                bar_size,
            })))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dfrac_forces_display_from_script() {
        assert_eq!(adjust_style(Some(DISPLAY), SCRIPT).id, SCRIPT.text().id);
        assert_eq!(adjust_style(Some(DISPLAY), TEXT).id, DISPLAY.id);
    }

    #[test]
    fn test_tfrac_downgrades_display() {
        assert_eq!(adjust_style(Some(TEXT), DISPLAY).id, TEXT.id);
        assert_eq!(adjust_style(Some(TEXT), SCRIPT).id, SCRIPT.id);
    }

    #[test]
    fn test_no_size_keeps_style() {
        assert_eq!(adjust_style(None, SCRIPTSCRIPT).id, SCRIPTSCRIPT.id);
    }
}
