//! Accents above a base: `\hat`, `\vec`, text-mode diacritics.
//!
//! Every accent renders as a font glyph positioned over the base
//! (TeXbook pg. 443, rule 12); the wide variants keep the same glyph
//! and simply report themselves stretchy to the accessibility tree.

use phf::phf_set;

use crate::build_common::{self, VListChild, VListElem, VListKern, VListParam, make_span, make_v_list};
use crate::build_html;
use crate::build_mathml::{self, make_text};
use crate::context::EngineContext;
use crate::define_function::{
    FunctionContext, FunctionDefSpec, FunctionPropSpec, normalize_argument,
};
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{
    AnyParseNode, NodeType, ParseNodeAccent, ParseNodeTextOrd,
};
use crate::types::{
    ArgType, CssProperty, ErrorLocationProvider, Mode, ParseError, ParseErrorKind,
};
use crate::units::make_em;

/// Accents that widen with their base.
static STRETCHY_ACCENTS: phf::Set<&'static str> = phf_set! {
    "\\widehat", "\\widetilde",
};

const MATH_ACCENTS: &[&str] = &[
    "\\acute",
    "\\grave",
    "\\ddot",
    "\\tilde",
    "\\bar",
    "\\breve",
    "\\check",
    "\\hat",
    "\\vec",
    "\\dot",
    "\\mathring",
    "\\widehat",
    "\\widetilde",
];

const TEXT_ACCENTS: &[&str] = &[
    "\\'", "\\`", "\\^", "\\~", "\\=", "\\u", "\\.", "\\\"", "\\r", "\\H", "\\v",
];

/// Builds accent nodes and the supsub groups that defer to them when
/// the accent sits on a lone character.
pub(crate) fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let (group, base, supsub_group) = match node {
        AnyParseNode::Accent(accent_node) => (accent_node.as_ref(), &accent_node.base, None),
        AnyParseNode::SupSub(supsub) => {
            // Scripts on an accented character attach to the character
            // itself, not the accent, so rebuild the supsub with the
            // accent's base swapped in and overlay the accent after.
            let Some(AnyParseNode::Accent(accent)) = supsub.base.as_deref() else {
                return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                    node: NodeType::Accent,
                }));
            };

            let mut rebased = supsub.clone();
            rebased.base = Some(Box::new(accent.base.clone()));
            let supsub_group =
                build_html::build_group(ctx, &AnyParseNode::SupSub(rebased), options, None)?;

            (accent.as_ref(), &accent.base, Some(supsub_group))
        }
        _ => {
            return Err(ParseError::new(ParseErrorKind::ExpectedNode {
                node: NodeType::Accent,
            }));
        }
    };

    let body = build_html::build_group(ctx, base, options, Some(&options.having_cramped_style()))?;

    let must_shift =
        group.is_shifty.unwrap_or(false) && base.is_character_box().unwrap_or(false);

    // "If the nucleus is not a single character, let s = 0; otherwise
    // set s to the kern amount for the nucleus followed by the
    // \skewchar of its font." Our skew metric is exactly that kern.
    let skew = if must_shift {
        let base_char = base.to_base_elem().unwrap_or(base);
        let base_group =
            build_html::build_group(ctx, base_char, &options.having_cramped_style(), None)?;
        let HtmlDomNode::Symbol(symbol) = base_group else {
            return Err(ParseError::new(ParseErrorKind::AccentExpectedSymbol));
        };
        symbol.skew
    } else {
        0.0
    };

    let clearance = body.height().min(options.font_metrics().x_height);

    let ord = AnyParseNode::TextOrd(ParseNodeTextOrd {
        mode: group.mode,
        loc: group.loc.clone(),
        text: group.label.clone(),
    });
    let HtmlDomNode::Symbol(mut accent) = build_common::make_ord(ctx, &ord, options)? else {
        return Err(ParseError::new(ParseErrorKind::AccentExpectedSymbol));
    };

    // The accent's italic correction only shifts it somewhere we don't
    // want.
    accent.italic = 0.0;
    let width = accent.width;

    let mut accent_body = make_span(
        vec!["accent-body".to_owned()],
        vec![accent.into()],
        None,
        None,
    );

    // The accent body is zero-width in CSS; recenter it over the base
    // and apply the skew.
    let left = skew - width / 2.0;
    accent_body.style.insert(CssProperty::Left, make_em(left));

    let accent_vlist = make_v_list(
        VListParam::FirstBaseline {
            children: vec![
                VListChild::Elem(Box::new(VListElem {
                    elem: body,
                    shift: None,
                    margin_left: None,
                    margin_right: None,
                    wrapper_classes: None,
                    wrapper_style: None,
                })),
                VListChild::Kern(VListKern { size: -clearance }),
                VListChild::Elem(Box::new(VListElem {
                    elem: accent_body.into(),
                    shift: None,
                    margin_left: None,
                    margin_right: None,
                    wrapper_classes: None,
                    wrapper_style: None,
                })),
            ],
        },
        options,
    )?;

    let accent_wrap: HtmlDomNode = make_span(
        vec!["mord".to_owned(), "accent".to_owned()],
        vec![accent_vlist.into()],
        Some(options),
        None,
    )
    .into();

    if let Some(mut supsub_group) = supsub_group {
        let accent_wrap_height = accent_wrap.height();

        if let HtmlDomNode::DomSpan(span) = &mut supsub_group {
            if !span.children.is_empty() {
                span.children[0] = accent_wrap;
            }
            // The span's extents were computed for the bare base.
            span.height = span.height.max(accent_wrap_height);

            // Accents are always ords, whatever their innards.
            if !span.classes.is_empty() {
                "mord".clone_into(&mut span.classes[0]);
            }
        }
        Ok(supsub_group)
    } else {
        Ok(accent_wrap)
    }
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Accent(group) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Accent,
        }));
    };

    let text = make_text(&group.label, group.mode, None, &ctx.symbols);
    let mut accent_node = MathNode::with_children(MathNodeType::Mo, vec![text.into()]);
    if group.is_stretchy.unwrap_or(false) {
        accent_node.set_attribute("stretchy", "true");
    }

    let base_group = build_mathml::build_group(ctx, &group.base, options)?;

    let mut mover =
        MathNode::with_children(MathNodeType::Mover, vec![base_group, accent_node.into()]);
    mover.set_attribute("accent", "true");

    Ok(mover.into())
}

/// Registers math- and text-mode accents.
pub fn define_accent(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Accent),
        names: MATH_ACCENTS,
        props: FunctionPropSpec {
            num_args: 1,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let base = normalize_argument(&args[0]);
            let is_stretchy = STRETCHY_ACCENTS.contains(context.func_name.as_str());

            Ok(AnyParseNode::Accent(Box::new(ParseNodeAccent {
                mode: context.parser.mode,
                loc: context.loc(),
                label: context.func_name,
                is_stretchy: Some(is_stretchy),
                is_shifty: Some(true),
                base: base.clone(),
            })))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Accent),
        names: TEXT_ACCENTS,
        props: FunctionPropSpec {
            num_args: 1,
            allowed_in_text: true,
            allowed_in_math: true,
            arg_types: Some(vec![ArgType::Primitive]),
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let base = args[0].clone();

            // These diacritics belong to text mode; accept them in math
            // mode only under a nonstrict setting.
            let mode = if context.parser.mode == Mode::Math {
                context.parser.settings.report_nonstrict(
                    "mathVsTextAccents",
                    &format!(
                        "LaTeX's accent {} works only in text mode",
                        context.func_name
                    ),
                    context.token.map(|t| t as &dyn ErrorLocationProvider),
                )?;
                Mode::Text
            } else {
                context.parser.mode
            };

            Ok(AnyParseNode::Accent(Box::new(ParseNodeAccent {
                mode,
                loc: context.loc(),
                label: context.func_name,
                is_stretchy: Some(false),
                is_shifty: Some(true),
                base,
            })))
        }),
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });
}
