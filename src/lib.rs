//! TeX-compatible math typesetting.
//!
//! `mathsmith` parses a TeX math expression into a tree of parse
//! nodes, lays the tree out with TeXbook spacing and sizing rules, and
//! emits an HTML box tree plus a MathML accessibility tree as markup.
//!
//! The pipeline is: the [`lexer`] turns source into catcoded tokens,
//! the [`macro_expander`] (the "gullet") expands macros over them, the
//! [`parser`] builds parse nodes by dispatching on the function and
//! environment registries of an [`EngineContext`], and the
//! [`build_html`] / [`build_mathml`] builders render the tree under
//! the style and sizing rules in [`options`] and [`style`].
//!
//! ```
//! use mathsmith::{EngineContext, Settings, render_to_string};
//!
//! let ctx = EngineContext::default();
//! let settings = Settings::default();
//! let html = render_to_string(&ctx, r"x = \frac{-b \pm \sqrt{b^2 - 4ac}}{2a}", &settings)?;
//! assert!(html.contains("sqrt"));
//! # Ok::<(), mathsmith::ParseError>(())
//! ```

pub mod build_common;
pub mod build_html;
pub mod build_mathml;
pub mod build_tree;
pub mod context;
pub mod core;
pub mod define_environment;
pub mod define_function;
pub mod delimiter;
pub mod dom_tree;
pub mod font_metrics;
pub mod functions;
pub mod lexer;
pub mod macro_expander;
pub mod macros;
pub mod mathml_tree;
pub mod namespace;
pub mod options;
pub mod parse_tree;
pub mod parser;
pub mod spacing_data;
pub mod style;
pub mod svg_geometry;
pub mod symbols;
pub mod tree;
pub mod types;
pub mod unicode;
pub mod units;
pub mod utils;

pub use crate::context::EngineContext;
pub use crate::core::{parse, render_to_dom_tree, render_to_html_tree, render_to_string};
pub use crate::font_metrics::{CharacterMetrics, FontMetricsData, get_character_metrics};
pub use crate::types::{
    OutputFormat, ParseError, Settings, StrictFunction, StrictMode, StrictReturn, StrictSetting,
    TrustContext, TrustFunction, TrustSetting,
};

/// Crate version, for embedders that surface it.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
