//! Main entry points and the non-throwing error fallback.

use crate::build_common::make_span;
use crate::build_tree::{build_html_tree, build_tree};
use crate::context::EngineContext;
use crate::dom_tree::{DomSpan, SymbolNode};
use crate::parse_tree::parse_tree;
use crate::parser::parse_node::AnyParseNode;
use crate::tree::VirtualNode as _;
use crate::types::{CssProperty, ParseError, Settings};

/// Renders the raw source as a colored error span, or rethrows when the
/// settings say errors are fatal.
fn render_error(
    error: ParseError,
    expression: &str,
    settings: &Settings,
) -> Result<DomSpan, ParseError> {
    if settings.throw_on_error {
        return Err(error);
    }

    let mut node = make_span(
        vec!["mathsmith-error".to_owned()],
        vec![SymbolNode::builder().text(expression).build().into()],
        None,
        None,
    );
    node.attributes
        .insert("title".to_owned(), error.to_string());
    node.style
        .insert(CssProperty::Color, settings.error_color.clone());

    Ok(node)
}

/// Parses and builds an expression, returning HTML markup.
pub fn render_to_string(
    ctx: &EngineContext,
    expression: &str,
    settings: &Settings,
) -> Result<String, ParseError> {
    render_to_dom_tree(ctx, expression, settings)?.to_markup()
}

/// Parses an expression and returns the raw parse tree.
pub fn parse(
    ctx: &EngineContext,
    expression: &str,
    settings: &Settings,
) -> Result<Vec<AnyParseNode>, ParseError> {
    parse_tree(ctx, expression, settings)
}

/// Parses and builds an expression, returning the DOM tree.
pub fn render_to_dom_tree(
    ctx: &EngineContext,
    expression: &str,
    settings: &Settings,
) -> Result<DomSpan, ParseError> {
    match parse_tree(ctx, expression, settings)
        .and_then(|tree| build_tree(ctx, &tree, expression, settings))
    {
        Ok(dom) => Ok(dom),
        Err(e) => render_error(e, expression, settings),
    }
}

/// Parses and builds an expression, returning the box tree only, with
/// no accessibility tree regardless of the configured output format.
pub fn render_to_html_tree(
    ctx: &EngineContext,
    expression: &str,
    settings: &Settings,
) -> Result<DomSpan, ParseError> {
    match parse_tree(ctx, expression, settings)
        .and_then(|tree| build_html_tree(ctx, &tree, settings))
    {
        Ok(dom) => Ok(dom),
        Err(e) => render_error(e, expression, settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_to_string_produces_markup() {
        let ctx = EngineContext::default();
        let settings = Settings::default();
        let html = render_to_string(&ctx, r"x = \frac{a}{b}", &settings).unwrap();
        assert!(html.contains("mathsmith"));
        assert!(html.contains("mfrac") || html.contains("frac-line"));
    }

    #[test]
    fn test_errors_are_fatal_by_default() {
        let ctx = EngineContext::default();
        let settings = Settings::default();
        assert!(render_to_string(&ctx, r"\frac{a}{", &settings).is_err());
    }

    #[test]
    fn test_error_fallback_span() {
        let ctx = EngineContext::default();
        let settings = Settings::builder()
            .throw_on_error(false)
            .error_color("#aa0000".to_owned())
            .build();
        let html = render_to_string(&ctx, r"\frac{a}{", &settings).unwrap();
        assert!(html.contains("mathsmith-error"));
        assert!(html.contains("title="));
        assert!(html.contains("#aa0000"));
    }
}
