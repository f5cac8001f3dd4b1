//! Accessibility-tree (MathML) builder.
//!
//! Converts a parse tree into MathML elements, merging adjacent nodes
//! where a single element reads better, and wraps the result in
//! `<semantics>` with the TeX source as an annotation.

use strum::IntoDiscriminant as _;

use crate::build_common::{FONT_MAP, make_span};
use crate::context::EngineContext;
use crate::dom_tree::{DomSpan, HtmlDomNode};
use crate::font_metrics::get_character_metrics;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType, TextNode};
use crate::options::{FontShape, FontWeight, Options};
use crate::parser::parse_node::AnyParseNode;
use crate::symbols::{Symbols, is_ligature};
use crate::types::{Mode, ParseError, ParseErrorKind};

/// Makes a MathML text node, applying the symbol table's character
/// replacement unless the glyph should render as typed: ligatures under
/// typewriter fonts, and the mathematical alphanumerics block.
#[must_use]
pub fn make_text(text: &str, mode: Mode, options: Option<&Options>, symbols: &Symbols) -> TextNode {
    let replace = symbols.get(mode, text).and_then(|info| info.replace);

    if let Some(replace) = replace {
        let char_code = text.chars().next().unwrap_or('\0') as u32;
        if !(0x1D400..=0x1D7FF).contains(&char_code) {
            let is_tt_font = options.is_some_and(|opts| {
                opts.font_family.get(4..6) == Some("tt") || opts.font.get(4..6) == Some("tt")
            });
            if !(is_ligature(text) && is_tt_font) {
                return TextNode {
                    text: replace.to_string(),
                };
            }
        }
    }

    TextNode {
        text: text.to_owned(),
    }
}

/// Wraps multiple nodes in an `<mrow>`; a single node passes through.
#[must_use]
pub fn make_row(body: &[MathDomNode]) -> MathDomNode {
    if let [single] = body {
        single.clone()
    } else {
        MathNode::builder()
            .node_type(MathNodeType::Mrow)
            .children(body.to_vec())
            .build()
            .into()
    }
}

/// The MathML `mathvariant` for a symbol under the current font options,
/// or `None` for the default italic math font.
///
/// MathML allows only a fixed list of variant names; see
/// <https://www.w3.org/TR/MathML3/chapter3.html#presm.commatt>.
pub fn get_variant(
    ctx: &EngineContext,
    group: &AnyParseNode,
    options: &Options,
) -> Result<Option<&'static str>, ParseError> {
    let Some(text) = group.text() else {
        return Ok(None);
    };

    // Dotless i and j keep the default variant in every font.
    if text == "\\imath" || text == "\\jmath" {
        return Ok(None);
    }

    if options.font_family == "texttt" {
        return Ok(Some("monospace"));
    } else if options.font_family == "textsf" {
        return Ok(Some(match (&options.font_shape, &options.font_weight) {
            (FontShape::TextIt, FontWeight::TextBf) => "sans-serif-bold-italic",
            (FontShape::TextIt, _) => "sans-serif-italic",
            (_, FontWeight::TextBf) => "bold-sans-serif",
            _ => "sans-serif",
        }));
    } else if options.font_shape == FontShape::TextIt && options.font_weight == FontWeight::TextBf {
        return Ok(Some("bold-italic"));
    } else if options.font_shape == FontShape::TextIt {
        return Ok(Some("italic"));
    } else if options.font_weight == FontWeight::TextBf {
        return Ok(Some("bold"));
    }

    let font = &options.font;
    if font.is_empty() || font == "mathnormal" {
        return Ok(None);
    }

    let mode = group.mode();

    if let Some(result) = match font.as_str() {
        "mathit" => Some("italic"),
        "boldsymbol" => match group {
            AnyParseNode::TextOrd(_) => Some("bold"),
            _ => Some("bold-italic"),
        },
        "mathbf" => Some("bold"),
        "mathbb" => Some("double-struck"),
        "mathfrak" => Some("fraktur"),
        // MathML makes no distinction between script and calligraphic.
        "mathscr" | "mathcal" => Some("script"),
        "mathsf" => Some("sans-serif"),
        "mathtt" => Some("monospace"),
        _ => None,
    } {
        return Ok(Some(result));
    }

    let final_char = ctx
        .symbols
        .get(mode, text)
        .and_then(|info| info.replace)
        .or_else(|| text.chars().next());

    if let Some(font_entry) = FONT_MAP.get(font.as_str())
        && let Some(final_char) = final_char
        && get_character_metrics(ctx, final_char, font_entry.font_name, mode)?.is_some()
    {
        return Ok(Some(font_entry.variant));
    }

    Ok(None)
}

/// Whether a node is number punctuation: a decimal dot, or a comma
/// rendered as a zero-spaced separator.
fn is_number_punctuation(node: &MathNode) -> bool {
    let single_text = |node: &MathNode| -> Option<String> {
        if let [MathDomNode::Text(text_node)] = node.children.as_slice() {
            Some(text_node.text.clone())
        } else {
            None
        }
    };

    match node.node_type {
        MathNodeType::Mi => single_text(node).as_deref() == Some("."),
        MathNodeType::Mo => {
            node.attributes.get("separator").is_some_and(|v| v == "true")
                && node.attributes.get("lspace").is_some_and(|v| v == "0em")
                && node.attributes.get("rspace").is_some_and(|v| v == "0em")
                && single_text(node).as_deref() == Some(",")
        }
        _ => false,
    }
}

/// Merges `current` into the run ending with the last node of `groups`,
/// when one of the concatenation rules applies. Returns the node back
/// when none does.
fn try_merge(groups: &mut Vec<MathDomNode>, current: MathNode) -> Option<MathNode> {
    let Some(MathDomNode::Math(last)) = groups.last_mut() else {
        return Some(current);
    };

    // Adjacent <mtext> with equal mathvariant merge.
    if current.node_type == MathNodeType::Mtext
        && last.node_type == MathNodeType::Mtext
        && current.attributes.get("mathvariant") == last.attributes.get("mathvariant")
    {
        last.children.extend(current.children);
        return None;
    }

    // Adjacent <mn>, and <mn> followed by number punctuation, merge.
    if last.node_type == MathNodeType::Mn
        && (current.node_type == MathNodeType::Mn || is_number_punctuation(&current))
    {
        last.children.extend(current.children);
        return None;
    }

    // Number punctuation followed by <mn> merges into the number.
    if current.node_type == MathNodeType::Mn && is_number_punctuation(last) {
        let mut merged = current;
        merged.children = last
            .children
            .iter()
            .cloned()
            .chain(merged.children)
            .collect();
        *last = merged;
        return None;
    }

    // A script over a number run absorbs the run into its base.
    if matches!(current.node_type, MathNodeType::Msup | MathNodeType::Msub)
        && (last.node_type == MathNodeType::Mn || is_number_punctuation(last))
        && let Some(MathDomNode::Math(base)) = current.children.first()
        && base.node_type == MathNodeType::Mn
    {
        let mut merged = current;
        if let Some(MathDomNode::Math(base)) = merged.children.first_mut() {
            base.children = last
                .children
                .iter()
                .cloned()
                .chain(base.children.drain(..))
                .collect();
        }
        *last = merged;
        return None;
    }

    // \not (combining long solidus) attaches to the next symbol.
    let last_is_solidus = last.node_type == MathNodeType::Mi
        && matches!(
            last.children.as_slice(),
            [MathDomNode::Text(text_node)] if text_node.text == "\u{0338}"
        );
    if last_is_solidus
        && matches!(
            current.node_type,
            MathNodeType::Mo | MathNodeType::Mi | MathNodeType::Mn
        )
        && let Some(MathDomNode::Text(text_node)) = current.children.first()
        && let Some(first_char) = text_node.text.chars().next()
    {
        let mut merged = current;
        if let Some(MathDomNode::Text(text_node)) = merged.children.first_mut() {
            text_node.text.insert(first_char.len_utf8(), '\u{0338}');
        }
        *last = merged;
        return None;
    }

    Some(current)
}

/// Builds a list of MathML nodes from parse nodes, merging adjacent
/// nodes per the concatenation rules. Operators inside an ordgroup get
/// their spacing suppressed.
pub fn build_expression(
    ctx: &EngineContext,
    expression: &[AnyParseNode],
    options: &Options,
    is_ordgroup: Option<bool>,
) -> Result<Vec<MathDomNode>, ParseError> {
    if expression.is_empty() {
        return Ok(Vec::new());
    }

    if let [node] = expression {
        let group = build_group(ctx, node, options)?;
        if let MathDomNode::Math(math_node) = &group
            && is_ordgroup.unwrap_or(false)
            && math_node.node_type == MathNodeType::Mo
        {
            let mut new_node = math_node.clone();
            new_node
                .attributes
                .insert("lspace".to_owned(), "0em".to_owned());
            new_node
                .attributes
                .insert("rspace".to_owned(), "0em".to_owned());
            return Ok(vec![new_node.into()]);
        }
        return Ok(vec![group]);
    }

    let mut groups: Vec<MathDomNode> = Vec::new();
    for node in expression {
        match build_group(ctx, node, options)? {
            MathDomNode::Math(math_node) => {
                if let Some(unmerged) = try_merge(&mut groups, math_node) {
                    groups.push(unmerged.into());
                }
            }
            other => groups.push(other),
        }
    }

    Ok(groups)
}

/// Builds parse nodes into a single MathML node, wrapped in `<mrow>` if
/// there are several.
pub fn build_expression_row(
    ctx: &EngineContext,
    expression: &[AnyParseNode],
    options: &Options,
    is_ordgroup: Option<bool>,
) -> Result<MathDomNode, ParseError> {
    let body = build_expression(ctx, expression, options, is_ordgroup)?;
    Ok(make_row(&body))
}

/// Builds one parse node through its registered MathML builder.
pub fn build_group(
    ctx: &EngineContext,
    group: &AnyParseNode,
    options: &Options,
) -> Result<MathDomNode, ParseError> {
    let group_type = group.discriminant();
    ctx.mathml_group_builders.get(&group_type).map_or_else(
        || {
            Err(ParseError::new(ParseErrorKind::UnknownGroupType {
                group_type,
            }))
        },
        |builder| builder(group, options, ctx),
    )
}

/// Builds a whole parse tree into a `<math>` element wrapped in a span,
/// with the TeX source attached as a `<semantics>` annotation.
pub fn build_mathml(
    ctx: &EngineContext,
    tree: &[AnyParseNode],
    tex_expression: &str,
    options: &Options,
    is_display_mode: bool,
    for_mathml_only: bool,
) -> Result<DomSpan, ParseError> {
    let expression = build_expression(ctx, tree, options, None)?;

    // An mrow or mtable can be the top level on its own; anything else
    // gets an mrow wrapper.
    let wrapper = match expression.as_slice() {
        [MathDomNode::Math(math_node)]
            if matches!(
                math_node.node_type,
                MathNodeType::Mrow | MathNodeType::Mtable
            ) =>
        {
            expression[0].clone()
        }
        _ => MathNode::builder()
            .node_type(MathNodeType::Mrow)
            .children(expression)
            .build()
            .into(),
    };

    let mut annotation = MathNode::builder()
        .node_type(MathNodeType::Annotation)
        .children(vec![
            TextNode {
                text: tex_expression.to_owned(),
            }
            .into(),
        ])
        .build();
    annotation.set_attribute("encoding", "application/x-tex");

    let semantics = MathNode::builder()
        .node_type(MathNodeType::Semantics)
        .children(vec![wrapper, annotation.into()])
        .build();

    let mut math = MathNode::builder()
        .node_type(MathNodeType::Math)
        .children(vec![semantics.into()])
        .build();
    math.set_attribute("xmlns", "http://www.w3.org/1998/Math/MathML");
    if is_display_mode {
        math.set_attribute("display", "block");
    }

    let wrapper_class = if for_mathml_only {
        "mathsmith"
    } else {
        "mathsmith-mathml"
    };

    Ok(make_span(
        vec![wrapper_class.to_owned()],
        vec![HtmlDomNode::MathML(math)],
        None,
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::KeyMap;

    fn math(node_type: MathNodeType, text: &str) -> MathNode {
        MathNode::builder()
            .node_type(node_type)
            .children(vec![
                TextNode {
                    text: text.to_owned(),
                }
                .into(),
            ])
            .build()
    }

    fn flatten(node: &MathDomNode) -> String {
        node.to_text()
    }

    #[test]
    fn test_adjacent_numbers_merge() {
        let mut groups: Vec<MathDomNode> = vec![math(MathNodeType::Mn, "1").into()];
        assert!(try_merge(&mut groups, math(MathNodeType::Mn, "2")).is_none());
        assert_eq!(groups.len(), 1);
        assert_eq!(flatten(&groups[0]), "12");
    }

    #[test]
    fn test_number_absorbs_decimal_point() {
        let mut groups: Vec<MathDomNode> = vec![math(MathNodeType::Mn, "3").into()];
        assert!(try_merge(&mut groups, math(MathNodeType::Mi, ".")).is_none());
        assert!(try_merge(&mut groups, math(MathNodeType::Mn, "14")).is_none());
        assert_eq!(groups.len(), 1);
        assert_eq!(flatten(&groups[0]), "3.14");
    }

    #[test]
    fn test_mtext_merges_only_with_matching_variant() {
        let mut groups: Vec<MathDomNode> = vec![math(MathNodeType::Mtext, "ab").into()];
        assert!(try_merge(&mut groups, math(MathNodeType::Mtext, "cd")).is_none());
        assert_eq!(groups.len(), 1);

        let mut bold = math(MathNodeType::Mtext, "ef");
        bold.set_attribute("mathvariant", "bold");
        assert!(try_merge(&mut groups, bold).is_some());
    }

    #[test]
    fn test_not_combines_with_operator() {
        let mut groups: Vec<MathDomNode> = vec![math(MathNodeType::Mi, "\u{0338}").into()];
        assert!(try_merge(&mut groups, math(MathNodeType::Mo, "=")).is_none());
        assert_eq!(groups.len(), 1);
        assert_eq!(flatten(&groups[0]), "=\u{0338}");
    }

    #[test]
    fn test_make_row_wraps_multiple() {
        let nodes: Vec<MathDomNode> = vec![
            math(MathNodeType::Mi, "x").into(),
            math(MathNodeType::Mo, "+").into(),
        ];
        let MathDomNode::Math(row) = make_row(&nodes) else {
            panic!("expected element");
        };
        assert_eq!(row.node_type, MathNodeType::Mrow);
        assert_eq!(row.children.len(), 2);

        let single: Vec<MathDomNode> = vec![math(MathNodeType::Mi, "x").into()];
        let MathDomNode::Math(kept) = make_row(&single) else {
            panic!("expected element");
        };
        assert_eq!(kept.node_type, MathNodeType::Mi);
    }

    #[test]
    fn test_separator_comma_is_number_punctuation() {
        let mut comma = math(MathNodeType::Mo, ",");
        let attrs: KeyMap<String, String> = [
            ("separator".to_owned(), "true".to_owned()),
            ("lspace".to_owned(), "0em".to_owned()),
            ("rspace".to_owned(), "0em".to_owned()),
        ]
        .into_iter()
        .collect();
        comma.attributes = attrs;
        assert!(is_number_punctuation(&comma));

        let bare_comma = math(MathNodeType::Mo, ",");
        assert!(!is_number_punctuation(&bare_comma));
    }
}
