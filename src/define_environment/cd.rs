//! The `CD` commutative-diagram environment.
//!
//! Rows alternate between object rows (cells separated by horizontal
//! arrows) and arrow rows (vertical arrows over empty cells). Arrows are
//! drawn with long arrow glyphs; their labels ride above/below via an
//! op-with-limits, or beside vertical arrows via the `\\cdleft` and
//! `\\cdright` helper commands.

use crate::build_common::wrap_fragment;
use crate::build_html::build_group;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::macros::{MacroContextInterface as _, MacroDefinition};
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::parser::Parser;
use crate::parser::parse_node::{
    AlignSpec, AnyParseNode, ColSeparationType, NodeType, ParseNodeArray, ParseNodeAtom,
    ParseNodeCdLabel, ParseNodeCdLabelParent, ParseNodeOp, ParseNodeOrdGroup, ParseNodeStyling,
    ParseNodeSupSub, ParseNodeTextOrd,
};
use crate::style::DISPLAY;
use crate::symbols::Atom;
use crate::types::{BreakToken, CssProperty, Mode, ParseError, ParseErrorKind};
use crate::units::make_em;
use crate::utils::push_and_get_mut;

/// An empty display-style cell.
fn new_cell() -> AnyParseNode {
    AnyParseNode::Styling(ParseNodeStyling {
        mode: Mode::Math,
        loc: None,
        style: DISPLAY,
        body: vec![],
    })
}

/// Whether a node is the `@` that starts an arrow specifier.
fn is_start_of_arrow(node: &AnyParseNode) -> bool {
    matches!(node, AnyParseNode::TextOrd(text_ord) if text_ord.text == "@")
}

/// Whether a node closes the current arrow label.
fn is_label_end(node: &AnyParseNode, end_char: &str) -> bool {
    match node {
        AnyParseNode::MathOrd(math_ord) => math_ord.text == end_char,
        AnyParseNode::Atom(atom) => atom.text == end_char,
        _ => false,
    }
}

fn label_is_empty(label: &AnyParseNode) -> bool {
    matches!(label, AnyParseNode::OrdGroup(ord) if ord.body.is_empty())
}

/// A long horizontal arrow glyph with the labels stacked above and below
/// through an op with limits.
fn horizontal_arrow(glyph: &str, labels: &[AnyParseNode; 2]) -> AnyParseNode {
    let base_op = ParseNodeOp::Body {
        mode: Mode::Math,
        loc: None,
        limits: true,
        always_handle_sup_sub: Some(true),
        suppress_base_shift: Some(true),
        parent_is_sup_sub: false,
        body: vec![AnyParseNode::Atom(ParseNodeAtom {
            family: Atom::Rel,
            mode: Mode::Math,
            loc: None,
            text: glyph.to_owned(),
        })],
    };

    let sup = (!label_is_empty(&labels[0])).then(|| Box::new(labels[0].clone()));
    let sub = (!label_is_empty(&labels[1])).then(|| Box::new(labels[1].clone()));
    if sup.is_none() && sub.is_none() {
        return AnyParseNode::Op(base_op);
    }

    AnyParseNode::SupSub(ParseNodeSupSub {
        mode: Mode::Math,
        loc: None,
        base: Some(Box::new(AnyParseNode::Op(base_op))),
        sup,
        sub,
    })
}

/// Builds the node for one arrow specifier with its two labels.
fn cd_arrow(
    arrow_char: &str,
    labels: &[AnyParseNode; 2],
    parser: &mut Parser,
) -> Result<AnyParseNode, ParseError> {
    match arrow_char {
        ">" => Ok(horizontal_arrow("\\longrightarrow", labels)),
        "<" => Ok(horizontal_arrow("\\longleftarrow", labels)),
        "A" | "V" => {
            let glyph = if arrow_char == "A" {
                "\\uparrow"
            } else {
                "\\downarrow"
            };
            let left_label =
                parser.call_function("\\\\cdleft", vec![labels[0].clone()], vec![], None, None)?;
            let bare_arrow = AnyParseNode::Atom(ParseNodeAtom {
                family: Atom::Rel,
                mode: Mode::Math,
                loc: None,
                text: glyph.to_owned(),
            });
            let sized_arrow = parser.call_function("\\Big", vec![bare_arrow], vec![], None, None)?;
            let right_label =
                parser.call_function("\\\\cdright", vec![labels[1].clone()], vec![], None, None)?;
            let arrow_group = AnyParseNode::OrdGroup(ParseNodeOrdGroup {
                mode: Mode::Math,
                loc: None,
                body: vec![left_label, sized_arrow, right_label],
                semisimple: None,
            });
            parser.call_function("\\\\cdparent", vec![arrow_group], vec![], None, None)
        }
        "=" => Ok(AnyParseNode::Atom(ParseNodeAtom {
            family: Atom::Rel,
            mode: Mode::Math,
            loc: None,
            text: "=".to_owned(),
        })),
        "|" => {
            let arrow = AnyParseNode::TextOrd(ParseNodeTextOrd {
                mode: Mode::Math,
                loc: None,
                text: "\\Vert".to_owned(),
            });
            parser.call_function("\\Big", vec![arrow], vec![], None, None)
        }
        _ => Ok(AnyParseNode::TextOrd(ParseNodeTextOrd {
            mode: Mode::Math,
            loc: None,
            text: " ".to_owned(),
        })),
    }
}

/// Parses the body of a `CD` environment into an array node.
pub fn parse_cd(parser: &mut Parser) -> Result<AnyParseNode, ParseError> {
    let mut parsed_rows: Vec<Vec<AnyParseNode>> = Vec::new();

    parser.gullet.begin_group();
    parser.gullet.macros_mut().set(
        "\\cr",
        Some(MacroDefinition::StaticStr("\\\\\\relax")),
        false,
    );
    parser.gullet.begin_group();

    loop {
        let row_nodes = parser.parse_expression(false, Some(&BreakToken::DoubleBackslash))?;
        parsed_rows.push(row_nodes);
        parser.gullet.end_group()?;
        parser.gullet.begin_group();

        let next_text = parser.fetch()?.text.as_str().to_owned();
        if next_text == "&" || next_text == "\\\\" {
            parser.consume();
        } else if next_text == "\\end" {
            if parsed_rows.last().is_some_and(Vec::is_empty) {
                parsed_rows.pop();
            }
            break;
        } else {
            return Err(ParseError::new(ParseErrorKind::ExpectedCdDelimiter {
                found: next_text,
            }));
        }
    }

    let mut body = vec![Vec::new()];
    let mut row = &mut body[0];

    for (i, row_nodes) in parsed_rows.iter().enumerate() {
        let mut cell = new_cell();
        let mut j = 0;
        while j < row_nodes.len() {
            let node = &row_nodes[j];
            if is_start_of_arrow(node) {
                row.push(cell);

                j += 1;
                if j >= row_nodes.len() {
                    return Err(ParseError::new(ParseErrorKind::MissingArrowCharacterAfterAt));
                }
                let Some(arrow_char) = row_nodes[j].text() else {
                    return Err(ParseError::new(ParseErrorKind::InvalidCdArrowSpecifier {
                        found: "end of arrow specifier".to_owned(),
                    }));
                };
                let arrow_char = arrow_char.to_owned();

                let mut labels = [
                    AnyParseNode::OrdGroup(ParseNodeOrdGroup {
                        mode: Mode::Math,
                        loc: None,
                        body: vec![],
                        semisimple: None,
                    }),
                    AnyParseNode::OrdGroup(ParseNodeOrdGroup {
                        mode: Mode::Math,
                        loc: None,
                        body: vec![],
                        semisimple: None,
                    }),
                ];

                if "=|.".contains(arrow_char.as_str()) {
                    // These arrows take no labels.
                } else if "<>AV".contains(arrow_char.as_str()) {
                    // Each label runs to the next occurrence of the
                    // arrow character.
                    for label in &mut labels {
                        let mut in_label = true;
                        let mut k = j + 1;
                        while k < row_nodes.len() {
                            if is_label_end(&row_nodes[k], &arrow_char) {
                                in_label = false;
                                j = k;
                                break;
                            }
                            if is_start_of_arrow(&row_nodes[k]) {
                                return Err(ParseError::new(
                                    ParseErrorKind::MissingCdArrowChar {
                                        arrow: arrow_char.clone(),
                                    },
                                ));
                            }
                            if let AnyParseNode::OrdGroup(ord_group) = label {
                                ord_group.body.push(row_nodes[k].clone());
                            }
                            k += 1;
                        }
                        if in_label {
                            return Err(ParseError::new(ParseErrorKind::MissingCdArrowChar {
                                arrow: arrow_char.clone(),
                            }));
                        }
                    }
                } else {
                    return Err(ParseError::new(ParseErrorKind::InvalidCdArrowSpecifier {
                        found: arrow_char.clone(),
                    }));
                }

                let arrow = cd_arrow(&arrow_char, &labels, parser)?;
                row.push(AnyParseNode::Styling(ParseNodeStyling {
                    mode: Mode::Math,
                    loc: None,
                    style: DISPLAY,
                    body: vec![arrow],
                }));

                cell = new_cell();
            } else if let AnyParseNode::Styling(styling) = &mut cell {
                styling.body.push(node.clone());
            }

            j += 1;
        }

        if i % 2 == 0 {
            // Even rows: cell, arrow, cell, ..., cell
            row.push(cell);
        } else {
            // Odd rows hold only vertical arrows; drop the leading empty
            // cell so arrows land between the object columns.
            if !row.is_empty() {
                row.remove(0);
            }
        }

        row = push_and_get_mut(&mut body, Vec::new());
    }

    // Drop the trailing row started after the last \\
    if body.last().is_some_and(Vec::is_empty) {
        body.pop();
    }

    // End row group, then the group defining \cr
    parser.gullet.end_group()?;
    parser.gullet.end_group()?;

    let cols = vec![
        AlignSpec::Align {
            align: "c".to_owned(),
            pregap: Some(0.25),
            postgap: Some(0.25),
        };
        body.first().map_or(0, Vec::len)
    ];

    let body_len = body.len();

    Ok(AnyParseNode::Array(ParseNodeArray {
        mode: Mode::Math,
        loc: None,
        col_separation_type: Some(ColSeparationType::CD),
        hskip_before_and_after: None,
        add_jot: Some(true),
        cols: Some(cols),
        arraystretch: 1.0,
        body,
        row_gaps: vec![None; body_len],
        h_lines_before_row: vec![vec![]; body_len + 1],
        tags: None,
        leqno: None,
        is_cd: Some(true),
    }))
}

/// Registers the vertical-arrow label helpers `\\cdleft`, `\\cdright`
/// and `\\cdparent`.
pub fn define_cd(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::CdLabel),
        names: &["\\\\cdleft", "\\\\cdright"],
        props: FunctionPropSpec {
            num_args: 1,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            Ok(AnyParseNode::CdLabel(ParseNodeCdLabel {
                mode: context.parser.mode,
                loc: None,
                side: context.func_name[4..].to_owned(),
                label: Box::new(args[0].clone()),
            }))
        }),
        html_builder: Some(|node, options, ctx| {
            let AnyParseNode::CdLabel(group) = node else {
                return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                    node: NodeType::CdLabel,
                }));
            };
            let new_options = options.having_style(options.style.sup());
            let mut label = wrap_fragment(
                build_group(ctx, &group.label, &new_options, Some(options))?,
                options,
            );
            if let Some(classes) = label.classes_mut() {
                classes.push(format!("cd-label-{}", group.side));
            }
            let depth = label.depth();
            if let Some(style) = label.style_mut() {
                style.insert(CssProperty::Bottom, make_em(0.8 - depth));
            }
            if let Some(height) = label.height_mut() {
                *height = 0.0;
            }
            if let Some(depth) = label.depth_mut() {
                *depth = 0.0;
            }
            Ok(label)
        }),
        mathml_builder: Some(|node, options, ctx| {
            let AnyParseNode::CdLabel(group) = node else {
                return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                    node: NodeType::CdLabel,
                }));
            };
            let row = MathNode::with_children(
                MathNodeType::Mrow,
                vec![build_mathml::build_group(ctx, &group.label, options)?],
            );
            let mut padded =
                MathNode::with_children(MathNodeType::Mpadded, vec![MathDomNode::Math(row)]);
            if group.side == "left" {
                padded.set_attribute("width", "-1width");
            }
            padded.set_attribute("voffset", "0.7em");
            let mut styled =
                MathNode::with_children(MathNodeType::Mstyle, vec![MathDomNode::Math(padded)]);
            styled.set_attribute("displaystyle", "false");
            styled.set_attribute("scriptlevel", "1");
            Ok(MathDomNode::Math(styled))
        }),
    });

    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::CdLabelParent),
        names: &["\\\\cdparent"],
        props: FunctionPropSpec {
            num_args: 1,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            Ok(AnyParseNode::CdLabelParent(ParseNodeCdLabelParent {
                mode: context.parser.mode,
                loc: None,
                fragment: Box::new(args[0].clone()),
            }))
        }),
        html_builder: Some(|node, options, ctx| {
            let AnyParseNode::CdLabelParent(group) = node else {
                return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                    node: NodeType::CdLabelParent,
                }));
            };
            let mut parent =
                wrap_fragment(build_group(ctx, &group.fragment, options, None)?, options);
            if let Some(classes) = parent.classes_mut() {
                classes.push("cd-vert-arrow".to_owned());
            }
            Ok(parent)
        }),
        mathml_builder: Some(|node, options, ctx| {
            let AnyParseNode::CdLabelParent(group) = node else {
                return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                    node: NodeType::CdLabelParent,
                }));
            };
            Ok(MathDomNode::Math(MathNode::with_children(
                MathNodeType::Mrow,
                vec![build_mathml::build_group(ctx, &group.fragment, options)?],
            )))
        }),
    });
}
