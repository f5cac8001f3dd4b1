//! Atom symbols: binary operators, relations, delimiters, punctuation.

use crate::build_common::mathsym;
use crate::build_mathml::{get_variant, make_text};
use crate::context::EngineContext;
use crate::dom_tree::HtmlDomNode;
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType};
use crate::symbols::Atom;
use crate::types::{ParseError, ParseErrorKind};

/// Registers the atom builders.
pub fn define_symbols_op(ctx: &mut EngineContext) {
    ctx.define_function_builders(NodeType::Atom, Some(html_builder), Some(mathml_builder));
}

fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Atom(atom) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Atom,
        }));
    };

    let classes = vec![format!("m{}", atom.family.as_ref())];
    Ok(mathsym(ctx, &atom.text, atom.mode, options, Some(&classes))?.into())
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Atom(atom) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Atom,
        }));
    };

    let text = make_text(&atom.text, atom.mode, Some(options), &ctx.symbols);
    let mut mo = MathNode::with_children(MathNodeType::Mo, vec![text.into()]);

    match atom.family {
        Atom::Bin => {
            if let Some(variant) = get_variant(ctx, node, options)?
                && variant == "bold-italic"
            {
                mo.set_attribute("mathvariant", variant);
            }
        }
        Atom::Punct => {
            mo.set_attribute("separator", "true");
        }
        Atom::Open | Atom::Close => {
            // Delimiters would otherwise stretch with the content.
            mo.set_attribute("stretchy", "false");
        }
        _ => {}
    }

    Ok(mo.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_node::ParseNodeAtom;
    use crate::style;
    use crate::types::Mode;

    fn atom(text: &str, family: Atom) -> AnyParseNode {
        AnyParseNode::Atom(ParseNodeAtom {
            family,
            mode: Mode::Math,
            loc: None,
            text: text.to_owned(),
        })
    }

    fn test_options() -> Options {
        Options::builder()
            .style(style::TEXT)
            .max_size(f64::INFINITY)
            .min_rule_thickness(0.0)
            .build()
    }

    #[test]
    fn test_punct_atom_becomes_separator_mo() {
        let ctx = EngineContext::default();
        let MathDomNode::Math(mo) =
            mathml_builder(&atom(",", Atom::Punct), &test_options(), &ctx).unwrap()
        else {
            panic!("expected element");
        };
        assert_eq!(mo.node_type, MathNodeType::Mo);
        assert_eq!(mo.attributes.get("separator").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_open_atom_is_not_stretchy() {
        let ctx = EngineContext::default();
        let MathDomNode::Math(mo) =
            mathml_builder(&atom("(", Atom::Open), &test_options(), &ctx).unwrap()
        else {
            panic!("expected element");
        };
        assert_eq!(mo.attributes.get("stretchy").map(String::as_str), Some("false"));
    }

    #[test]
    fn test_bin_atom_html_is_symbol_with_class() {
        let ctx = EngineContext::default();
        let built = html_builder(&atom("+", Atom::Bin), &test_options(), &ctx).unwrap();
        let HtmlDomNode::Symbol(symbol) = built else {
            panic!("expected symbol");
        };
        assert!(symbol.classes.contains(&"mbin".to_owned()));
    }
}
