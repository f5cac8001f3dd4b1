//! Final output assembly.
//!
//! Ties the box-tree and accessibility-tree builders together according
//! to the requested output format and display mode.

use crate::build_common::make_span;
use crate::build_html::build_html;
use crate::build_mathml::build_mathml;
use crate::context::EngineContext;
use crate::dom_tree::DomSpan;
use crate::options::Options;
use crate::parser::parse_node::AnyParseNode;
use crate::style;
use crate::types::{OutputFormat, ParseError, Settings};

fn options_from_settings(settings: &Settings) -> Options {
    let style = if settings.display_mode {
        style::DISPLAY
    } else {
        style::TEXT
    };

    let mut options = Options::builder()
        .style(style)
        .maybe_color(settings.color.clone())
        .max_size(settings.max_size)
        .min_rule_thickness(settings.min_rule_thickness)
        .build();
    options.size_multiplier = settings.size_multiplier;
    options
}

/// Wraps display-mode output in a block-layout span.
fn display_wrap(node: DomSpan, settings: &Settings) -> DomSpan {
    if settings.display_mode {
        let mut classes = vec!["mathsmith-display".to_owned()];
        if settings.leqno {
            classes.push("leqno".to_owned());
        }
        if settings.fleqn {
            classes.push("fleqn".to_owned());
        }
        make_span(classes, vec![node.into()], None, None)
    } else {
        node
    }
}

/// Builds the final DOM tree from a parse tree, emitting the tree(s)
/// the settings ask for. With both outputs, the accessibility tree
/// comes first so screen readers find it.
pub fn build_tree(
    ctx: &EngineContext,
    tree: &[AnyParseNode],
    expression: &str,
    settings: &Settings,
) -> Result<DomSpan, ParseError> {
    let options = options_from_settings(settings);

    let node = match settings.output {
        OutputFormat::Mathml => {
            build_mathml(ctx, tree, expression, &options, settings.display_mode, true)?
        }
        OutputFormat::Html => {
            let html_node = build_html(ctx, tree, &options)?;
            make_span(vec!["mathsmith".to_owned()], vec![html_node], None, None)
        }
        OutputFormat::HtmlAndMathml => {
            let mathml_node =
                build_mathml(ctx, tree, expression, &options, settings.display_mode, false)?;
            let html_node = build_html(ctx, tree, &options)?;
            make_span(
                vec!["mathsmith".to_owned()],
                vec![mathml_node.into(), html_node],
                None,
                None,
            )
        }
    };

    Ok(display_wrap(node, settings))
}

/// Builds HTML-only output regardless of the settings' output format.
pub fn build_html_tree(
    ctx: &EngineContext,
    tree: &[AnyParseNode],
    settings: &Settings,
) -> Result<DomSpan, ParseError> {
    let options = options_from_settings(settings);
    let html_node = build_html(ctx, tree, &options)?;
    let node = make_span(vec!["mathsmith".to_owned()], vec![html_node], None, None);
    Ok(display_wrap(node, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::VirtualNode as _;

    #[test]
    fn test_options_follow_display_mode() {
        let inline = options_from_settings(&Settings::default());
        assert!(core::ptr::eq(inline.style, style::TEXT));

        let display =
            options_from_settings(&Settings::builder().display_mode(true).build());
        assert!(core::ptr::eq(display.style, style::DISPLAY));
        assert_eq!(display.size, Options::BASESIZE);
    }

    #[test]
    fn test_display_wrap_adds_block_classes() {
        let inner = make_span(vec!["mathsmith".to_owned()], vec![], None, None);
        let settings = Settings::builder().display_mode(true).fleqn(true).build();
        let wrapped = display_wrap(inner, &settings);
        let markup = wrapped.to_markup().unwrap();
        assert!(markup.contains("mathsmith-display"));
        assert!(markup.contains("fleqn"));
        assert!(!markup.contains("leqno"));
    }

    #[test]
    fn test_inline_output_is_not_wrapped() {
        let inner = make_span(vec!["mathsmith".to_owned()], vec![], None, None);
        let wrapped = display_wrap(inner, &Settings::default());
        assert_eq!(wrapped.classes, vec!["mathsmith".to_owned()]);
    }
}
