//! Superscripts and subscripts.
//!
//! Script positioning follows the TeXbook's rules 18(a-f): shifts start
//! from the base's extents, get clamped to the style's minima, and a
//! joint sup/sub pair is pushed apart until four rule thicknesses of
//! clearance separate the scripts.

use crate::build_common::{
    VListChild, VListElem, VListElemAndShift, VListParam, make_span, make_v_list,
};
use crate::build_html::{self, DomType, Side};
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::HtmlBuilder;
use crate::dom_tree::HtmlDomNode;
use crate::functions::{accent, op, operatorname};
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeSupSub};
use crate::style::DISPLAY;
use crate::types::{ParseError, ParseErrorKind};
use crate::units::make_em;

/// Some bases take over script layout entirely: operators with limits,
/// `\operatorname*`, and accents over character boxes. Returns the
/// builder to delegate to in those cases.
fn html_builder_delegate(group: &ParseNodeSupSub, options: &Options) -> Option<HtmlBuilder> {
    let base = group.base.as_deref()?;

    match base {
        AnyParseNode::Op(op_node) => {
            let delegate = op_node.limits()
                && (options.style.size == DISPLAY.size || op_node.always_handle_sup_sub());
            if delegate {
                return Some(op::html_builder);
            }
        }
        AnyParseNode::OperatorName(op_name) => {
            let delegate = op_name.always_handle_sup_sub
                && (op_name.limits || options.style.size == DISPLAY.size);
            if delegate {
                return Some(operatorname::html_builder);
            }
        }
        AnyParseNode::Accent(acc) => {
            if acc.base.is_character_box().unwrap_or(false) {
                return Some(accent::html_builder);
            }
        }
        _ => {}
    }

    None
}

pub(crate) fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::SupSub(group) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::SupSub,
        }));
    };

    if let Some(delegate_builder) = html_builder_delegate(group, options) {
        return delegate_builder(node, options, ctx);
    }

    let value_base = group.base.as_deref();
    let value_super = group.sup.as_deref();
    let value_sub = group.sub.as_deref();

    let base_html = if let Some(base) = value_base {
        build_html::build_group(ctx, base, options, None)?
    } else {
        make_span(vec![], vec![], Some(options), None).into()
    };

    let mut super_m = None;
    let mut sub_m = None;

    let metrics = options.font_metrics();

    // Rule 18a: initial shifts from the base's extents.
    let mut super_shift = 0.0;
    let mut sub_shift = 0.0;

    let is_character_box = value_base.is_some_and(|b| b.is_character_box().unwrap_or(false));

    if let Some(sup_group) = value_super {
        let new_options = options.having_style(options.style.sup());
        super_m = Some(build_html::build_group(
            ctx,
            sup_group,
            &new_options,
            Some(options),
        )?);
        if !is_character_box {
            super_shift = base_html.height()
                - new_options.font_metrics().sup_drop * new_options.size_multiplier
                    / options.size_multiplier;
        }
    }

    if let Some(sub_group) = value_sub {
        let new_options = options.having_style(options.style.sub());
        sub_m = Some(build_html::build_group(
            ctx,
            sub_group,
            &new_options,
            Some(options),
        )?);
        if !is_character_box {
            sub_shift = base_html.depth()
                + new_options.font_metrics().sub_drop * new_options.size_multiplier
                    / options.size_multiplier;
        }
    }

    // Rule 18c: style minimum for the superscript shift.
    let min_sup_shift = if options.style.size == DISPLAY.size {
        metrics.sup1
    } else if options.style.cramped {
        metrics.sup3
    } else {
        metrics.sup2
    };

    // Scriptspace is font-size-independent, so undo the current scale.
    let multiplier = options.size_multiplier;
    let margin_right = make_em((0.5 / metrics.pt_per_em) / multiplier);

    // Subscripts are not shifted by the base's italic correction; back
    // them up when the base is a single symbol.
    let mut margin_left = None;
    if sub_m.is_some() {
        let is_oiint = if let Some(AnyParseNode::Op(op_node)) = value_base
            && let Some(name) = op_node.name()
        {
            matches!(name, "\\oiint" | "\\oiiint")
        } else {
            false
        };

        if matches!(base_html, HtmlDomNode::Symbol(_)) || is_oiint {
            match &base_html {
                HtmlDomNode::Symbol(sym) => {
                    margin_left = Some(make_em(-sym.italic));
                }
                HtmlDomNode::DomSpan(span) => {
                    if let Some(italic) = span.italic {
                        margin_left = Some(make_em(-italic));
                    }
                }
                _ => {}
            }
        }
    }

    let supsub = if let (Some(sup_elem), Some(sub_elem)) = (&super_m, &sub_m) {
        super_shift = super_shift
            .max(min_sup_shift)
            .max(0.25f64.mul_add(metrics.x_height, sup_elem.depth()));
        sub_shift = sub_shift.max(metrics.sub2);

        let rule_width = metrics.default_rule_thickness;

        // Rule 18e: enforce clearance between the scripts.
        let max_width = 4.0 * rule_width;
        if (super_shift - sup_elem.depth()) - (sub_elem.height() - sub_shift) < max_width {
            sub_shift = max_width - (super_shift - sup_elem.depth()) + sub_elem.height();
            let psi = 0.8f64.mul_add(metrics.x_height, -(super_shift - sup_elem.depth()));
            if psi > 0.0 {
                super_shift += psi;
                sub_shift -= psi;
            }
        }

        make_v_list(
            VListParam::IndividualShift {
                children: vec![
                    VListElemAndShift {
                        elem: sub_elem.clone(),
                        shift: sub_shift,
                        margin_left,
                        margin_right: Some(margin_right.clone()),
                        wrapper_classes: None,
                        wrapper_style: None,
                    },
                    VListElemAndShift {
                        elem: sup_elem.clone(),
                        shift: -super_shift,
                        margin_left: None,
                        margin_right: Some(margin_right),
                        wrapper_classes: None,
                        wrapper_style: None,
                    },
                ],
            },
            options,
        )?
    } else if let Some(sub_elem) = &sub_m {
        // Rule 18b.
        sub_shift = sub_shift
            .max(metrics.sub1)
            .max(0.8f64.mul_add(-metrics.x_height, sub_elem.height()));

        make_v_list(
            VListParam::Shift {
                position_data: sub_shift,
                children: vec![VListChild::Elem(Box::new(VListElem {
                    elem: sub_elem.clone(),
                    shift: None,
                    margin_left,
                    margin_right: Some(margin_right),
                    wrapper_classes: None,
                    wrapper_style: None,
                }))],
            },
            options,
        )?
    } else if let Some(sup_elem) = &super_m {
        // Rules 18c and 18d.
        super_shift = super_shift
            .max(min_sup_shift)
            .max(0.25f64.mul_add(metrics.x_height, sup_elem.depth()));

        make_v_list(
            VListParam::Shift {
                position_data: -super_shift,
                children: vec![VListChild::Elem(Box::new(VListElem {
                    elem: sup_elem.clone(),
                    shift: None,
                    margin_left: None,
                    margin_right: Some(margin_right),
                    wrapper_classes: None,
                    wrapper_style: None,
                }))],
            },
            options,
        )?
    } else {
        return Err(ParseError::new(ParseErrorKind::SupSubMissingSupOrSub));
    };

    // Wrap the script vlist in a span.msupsub to reset text-align; the
    // outer span takes the base's spacing class.
    let mclass =
        build_html::get_type_of_dom_tree(&base_html, Some(Side::Right)).unwrap_or(DomType::Mord);
    Ok(make_span(
        vec![mclass.as_ref().to_owned()],
        vec![
            base_html,
            make_span(vec!["msupsub".to_owned()], vec![supsub.into()], None, None).into(),
        ],
        Some(options),
        None,
    )
    .into())
}

/// Whether an op/operatorname base renders its scripts above and below.
fn base_uses_limits(base: Option<&AnyParseNode>, options: &Options) -> bool {
    match base {
        Some(AnyParseNode::Op(op_node)) => {
            op_node.limits()
                && (options.style.size == DISPLAY.size || op_node.always_handle_sup_sub())
        }
        Some(AnyParseNode::OperatorName(op_name)) => {
            op_name.always_handle_sup_sub
                && (op_name.limits || options.style.size == DISPLAY.size)
        }
        _ => false,
    }
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::SupSub(group) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::SupSub,
        }));
    };

    let mut children = if let Some(base) = group.base.as_deref() {
        vec![build_mathml::build_group(ctx, base, options)?]
    } else {
        vec![MathNode::with_children(MathNodeType::Mrow, vec![]).into()]
    };

    if let Some(sub) = &group.sub {
        children.push(build_mathml::build_group(ctx, sub, options)?);
    }

    if let Some(sup) = &group.sup {
        children.push(build_mathml::build_group(ctx, sup, options)?);
    }

    let uses_limits = base_uses_limits(group.base.as_deref(), options);
    let node_type = if group.sub.is_none() {
        if uses_limits {
            MathNodeType::Mover
        } else {
            MathNodeType::Msup
        }
    } else if group.sup.is_none() {
        if uses_limits {
            MathNodeType::Munder
        } else {
            MathNodeType::Msub
        }
    } else {
        // With both scripts, a symbol op moves them above and below only
        // in display style.
        let both_use_limits = match group.base.as_deref() {
            Some(AnyParseNode::Op(op_node)) => {
                op_node.limits() && options.style.size == DISPLAY.size
            }
            _ => uses_limits,
        };
        if both_use_limits {
            MathNodeType::Munderover
        } else {
            MathNodeType::Msubsup
        }
    };

    Ok(MathNode::with_children(node_type, children).into())
}

/// Registers the supsub builders.
pub fn define_supsub(ctx: &mut EngineContext) {
    ctx.define_function_builders(NodeType::SupSub, Some(html_builder), Some(mathml_builder));
}
