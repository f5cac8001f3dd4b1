//! End-to-end properties of the typesetting pipeline, exercised through
//! the public API.

use std::sync::OnceLock;

use mathsmith::delimiter;
use mathsmith::options::Options;
use mathsmith::spacing_data::{MEDIUMSPACE, SPACINGS, THICKSPACE, THINSPACE, TIGHT_SPACINGS};
use mathsmith::style;
use mathsmith::types::Mode;
use mathsmith::{EngineContext, Settings, parse, render_to_dom_tree, render_to_string};

static DEFAULT_CONTEXT: OnceLock<EngineContext> = OnceLock::new();

fn ctx() -> &'static EngineContext {
    DEFAULT_CONTEXT.get_or_init(EngineContext::default)
}

fn text_options() -> Options {
    Options::builder()
        .style(style::TEXT)
        .max_size(f64::INFINITY)
        .min_rule_thickness(0.0)
        .build()
}

#[test]
fn renders_terminate_with_finite_extents() {
    let settings = Settings::default();
    for expr in [
        "a+b",
        r"x^2_i",
        r"\frac{1}{1+\frac{1}{x}}",
        r"\sum_{i=1}^n i^2",
        r"\left(\frac{a}{b}\right)",
        r"\sqrt[3]{x+y}",
        r"\begin{pmatrix}a&b\\c&d\end{pmatrix}",
        r"\text{if } x > 0",
        r"\color{red} x \quad y",
        r"\operatorname*{argmax}_x f(x)",
    ] {
        let span = render_to_dom_tree(ctx(), expr, &settings)
            .unwrap_or_else(|e| panic!("{expr}: {e}"));
        assert!(span.height.is_finite(), "{expr}");
        assert!(span.depth.is_finite(), "{expr}");
    }
}

#[test]
fn self_referential_macro_hits_expansion_ceiling() {
    let settings = Settings::default();
    let err = render_to_string(ctx(), r"\def\foo{\foo}\foo", &settings).unwrap_err();
    assert!(err.to_string().contains("expansion"), "{err}");
}

#[test]
fn expansion_ceiling_is_configurable() {
    let settings = Settings::builder().max_expand(4).build();
    assert!(render_to_string(ctx(), r"\def\a{xxx}\a\a\a\a\a", &settings).is_err());
    let settings = Settings::default();
    assert!(render_to_string(ctx(), r"\def\a{xxx}\a\a\a\a\a", &settings).is_ok());
}

#[test]
fn spacing_tables_follow_the_texbook() {
    let mord = SPACINGS.get("mord").unwrap();
    assert_eq!(mord.get("mop"), Some(&THINSPACE));
    assert_eq!(mord.get("mbin"), Some(&MEDIUMSPACE));
    assert_eq!(mord.get("mrel"), Some(&THICKSPACE));
    assert_eq!(mord.get("mord"), None);

    // Script styles keep operator spacing but drop bin/rel spacing.
    let tight_mord = TIGHT_SPACINGS.get("mord").unwrap();
    assert_eq!(tight_mord.get("mop"), Some(&THINSPACE));
    assert_eq!(tight_mord.get("mbin"), None);
    assert!(TIGHT_SPACINGS.get("mbin").unwrap().is_empty());
}

#[test]
fn double_superscript_is_fatal() {
    let settings = Settings::default();
    assert!(parse(ctx(), "x^2^3", &settings).is_err());
    assert!(parse(ctx(), "x_i_j", &settings).is_err());
}

#[test]
fn mixed_scripts_are_legal() {
    let settings = Settings::default();
    let tree = parse(ctx(), "x^2_i", &settings).unwrap();
    assert_eq!(tree.len(), 1);
}

#[test]
fn display_fraction_rule_respects_min_thickness() {
    let thin = Settings::builder().display_mode(true).build();
    let thick = Settings::builder()
        .display_mode(true)
        .min_rule_thickness(0.25)
        .build();
    let html_thin = render_to_string(ctx(), r"\frac{a}{b}", &thin).unwrap();
    let html_thick = render_to_string(ctx(), r"\frac{a}{b}", &thick).unwrap();
    assert!(html_thin.contains("frac-line"));
    assert_ne!(html_thin, html_thick);
    assert!(html_thick.contains("0.25em"));
}

#[test]
fn sqrt_clears_its_radicand() {
    let settings = Settings::builder().display_mode(true).build();
    let span = render_to_dom_tree(ctx(), r"\sqrt{x}", &settings).unwrap();
    // The surd must reach above the x-height plus the rule and its
    // clearance.
    assert!(span.height > 0.5, "{}", span.height);
}

#[test]
fn left_right_at_zero_extent_uses_smallest_variant() {
    let settings = Settings::default();
    let html = render_to_string(ctx(), r"\left(\right)", &settings).unwrap();
    assert!(!html.contains("delimsizing"), "{html}");

    // Tall content forces a sized variant.
    let html = render_to_string(
        ctx(),
        r"\left(\dfrac{\dfrac{a}{b}}{\dfrac{c}{d}}\right)",
        &settings,
    )
    .unwrap();
    assert!(html.contains("delimsizing"), "{html}");
}

#[test]
fn sized_delimiter_covers_the_requested_extent() {
    let options = text_options();
    for height in [1.0, 2.0, 4.0] {
        let span =
            delimiter::custom_sized_delim(ctx(), "(", height, false, &options, Mode::Math, &[])
                .unwrap();
        let total = span.height + span.depth;
        assert!(total >= 0.8 * height, "requested {height}, got {total}");
    }
}

#[test]
fn environments_match_their_delimiters() {
    let settings = Settings::default();
    assert!(render_to_string(
        ctx(),
        r"\begin{pmatrix}a&b\\c&d\end{pmatrix}",
        &settings
    )
    .is_ok());
    assert!(render_to_string(
        ctx(),
        r"\begin{pmatrix}a&b\\c&d\end{bmatrix}",
        &settings
    )
    .is_err());
    assert!(render_to_string(ctx(), r"\begin{nonsense}x\end{nonsense}", &settings).is_err());
}

#[test]
fn unbalanced_groups_are_fatal() {
    let settings = Settings::default();
    assert!(render_to_string(ctx(), r"{a+b", &settings).is_err());
    assert!(render_to_string(ctx(), r"a+b}", &settings).is_err());
    assert!(render_to_string(ctx(), r"\left(a", &settings).is_err());
}

#[test]
fn user_macros_expand() {
    let settings = Settings::default();
    let html =
        render_to_string(ctx(), r"\def\half{\frac{1}{2}}\half + \half", &settings).unwrap();
    assert!(html.contains("frac-line"));
}

#[test]
fn output_format_controls_emitted_trees() {
    use mathsmith::OutputFormat;
    let both = Settings::default();
    let html_only = Settings::builder().output(OutputFormat::Html).build();
    let mathml_only = Settings::builder().output(OutputFormat::Mathml).build();

    let markup_both = render_to_string(ctx(), "x+y", &both).unwrap();
    assert!(markup_both.contains("<math"));
    assert!(markup_both.contains("mord"));

    let markup_html = render_to_string(ctx(), "x+y", &html_only).unwrap();
    assert!(!markup_html.contains("<math"));

    let markup_mathml = render_to_string(ctx(), "x+y", &mathml_only).unwrap();
    assert!(markup_mathml.contains("<math"));
    assert!(!markup_mathml.contains("mord"));
}
