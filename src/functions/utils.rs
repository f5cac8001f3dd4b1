//! Shared layout helper for limits-style scripts.

use crate::build_common::{VListChild, VListElem, VListKern, VListParam, make_span, make_v_list};
use crate::build_html;
use crate::context::EngineContext;
use crate::dom_tree::HtmlDomNode;
use crate::options::Options;
use crate::parser::parse_node::AnyParseNode;
use crate::style::Style;
use crate::types::{CssProperty, ParseError};
use crate::units::make_em;

struct ScriptElem {
    elem: HtmlDomNode,
    kern: f64,
}

/// Stacks scripts above and below a base, as for a big operator with
/// `\limits`. `slant` skews the scripts by the base's italic
/// correction; `base_shift` is the vertical centering already applied
/// to the base.
#[expect(clippy::too_many_arguments)]
pub fn assemble_sup_sub(
    ctx: &EngineContext,
    base: HtmlDomNode,
    super_group: Option<&AnyParseNode>,
    sub_group: Option<&AnyParseNode>,
    options: &Options,
    style: &'static Style,
    slant: f64,
    base_shift: f64,
) -> Result<HtmlDomNode, ParseError> {
    let base = HtmlDomNode::from(make_span(vec![], vec![base], Some(options), None));
    let base_height = base.height();
    let base_depth = base.depth();

    let sub_is_single_character =
        sub_group.is_some_and(|sub| sub.is_character_box().unwrap_or(false));

    let metrics = options.font_metrics();

    let sup = if let Some(sup_group) = super_group {
        let elem = build_html::build_group(
            ctx,
            sup_group,
            &options.having_style(style.sup()),
            Some(options),
        )?;
        let kern = metrics
            .big_op_spacing1
            .max(metrics.big_op_spacing3 - elem.depth());
        Some(ScriptElem { elem, kern })
    } else {
        None
    };

    let sub = if let Some(sub_group) = sub_group {
        let elem = build_html::build_group(
            ctx,
            sub_group,
            &options.having_style(style.sub()),
            Some(options),
        )?;
        let kern = metrics
            .big_op_spacing2
            .max(metrics.big_op_spacing4 - elem.height());
        Some(ScriptElem { elem, kern })
    } else {
        None
    };

    let has_sub = sub.is_some();

    let final_group = match (sup, sub) {
        (Some(sup), Some(sub)) => {
            let bottom = metrics.big_op_spacing5
                + sub.elem.height()
                + sub.elem.depth()
                + sub.kern
                + base_depth
                + base_shift;

            make_v_list(
                VListParam::Bottom {
                    position_data: bottom,
                    children: vec![
                        VListChild::Kern(VListKern {
                            size: metrics.big_op_spacing5,
                        }),
                        VListChild::Elem(Box::new(VListElem {
                            elem: sub.elem,
                            shift: None,
                            margin_left: Some(make_em(-slant)),
                            margin_right: None,
                            wrapper_classes: None,
                            wrapper_style: None,
                        })),
                        VListChild::Kern(VListKern { size: sub.kern }),
                        VListChild::Elem(Box::new(VListElem {
                            elem: base,
                            shift: None,
                            margin_left: None,
                            margin_right: None,
                            wrapper_classes: None,
                            wrapper_style: None,
                        })),
                        VListChild::Kern(VListKern { size: sup.kern }),
                        VListChild::Elem(Box::new(VListElem {
                            elem: sup.elem,
                            shift: None,
                            margin_left: Some(make_em(slant)),
                            margin_right: None,
                            wrapper_classes: None,
                            wrapper_style: None,
                        })),
                        VListChild::Kern(VListKern {
                            size: metrics.big_op_spacing5,
                        }),
                    ],
                },
                options,
            )?
        }
        (None, Some(sub)) => {
            let top = base_height - base_shift;

            make_v_list(
                VListParam::Top {
                    position_data: top,
                    children: vec![
                        VListChild::Kern(VListKern {
                            size: metrics.big_op_spacing5,
                        }),
                        VListChild::Elem(Box::new(VListElem {
                            elem: sub.elem,
                            shift: None,
                            margin_left: Some(make_em(-slant)),
                            margin_right: None,
                            wrapper_classes: None,
                            wrapper_style: None,
                        })),
                        VListChild::Kern(VListKern { size: sub.kern }),
                        VListChild::Elem(Box::new(VListElem {
                            elem: base,
                            shift: None,
                            margin_left: None,
                            margin_right: None,
                            wrapper_classes: None,
                            wrapper_style: None,
                        })),
                    ],
                },
                options,
            )?
        }
        (Some(sup), None) => {
            let bottom = base_depth + base_shift;

            make_v_list(
                VListParam::Bottom {
                    position_data: bottom,
                    children: vec![
                        VListChild::Elem(Box::new(VListElem {
                            elem: base,
                            shift: None,
                            margin_left: None,
                            margin_right: None,
                            wrapper_classes: None,
                            wrapper_style: None,
                        })),
                        VListChild::Kern(VListKern { size: sup.kern }),
                        VListChild::Elem(Box::new(VListElem {
                            elem: sup.elem,
                            shift: None,
                            margin_left: Some(make_em(slant)),
                            margin_right: None,
                            wrapper_classes: None,
                            wrapper_style: None,
                        })),
                        VListChild::Kern(VListKern {
                            size: metrics.big_op_spacing5,
                        }),
                    ],
                },
                options,
            )?
        }
        (None, None) => return Ok(base),
    };

    let mut parts: Vec<HtmlDomNode> = vec![final_group.into()];
    if has_sub && slant != 0.0 && !sub_is_single_character {
        // The subscript was skewed left; pad the whole box back out so
        // it does not overlap whatever precedes it.
        let mut spacer = make_span(vec!["mspace".to_owned()], vec![], Some(options), None);
        spacer.style.insert(CssProperty::MarginRight, make_em(slant));
        parts.insert(0, spacer.into());
    }

    Ok(make_span(
        vec!["mop".to_owned(), "op-limits".to_owned()],
        parts,
        Some(options),
        None,
    )
    .into())
}
