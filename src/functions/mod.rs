//! Registered function implementations.
//!
//! Each submodule defines one family of commands and exposes a
//! `define_*` registration function that installs its parse handlers
//! and output builders into an [`crate::context::EngineContext`]. The
//! default context calls every one of them, so a fresh engine already
//! knows the full command set; embedders composing a custom context can
//! pick and choose.
//!
//! The split mirrors the command surface rather than the node types:
//! symbol atoms, spacing commands, scripts, operators, fractions,
//! radicals, delimiters, color and font switches, text mode, boxes,
//! environments, and the mode-switch and hyperlink commands.

pub(crate) mod accent;
mod char;
mod color;
mod cr;
mod def;
mod delimsizing;
mod environment;
mod font;
mod genfrac;
mod hbox;
mod href;
mod kern;
mod math;
pub(crate) mod mclass;
pub(crate) mod op;
pub(crate) mod operatorname;
mod ordgroup;
mod overline;
mod phantom;
mod relax;
mod rule;
pub(crate) mod sizing;
mod sqrt;
mod styling;
mod supsub;
mod symbols_op;
mod symbols_ord;
mod symbols_spacing;
mod tag;
mod text;
mod underline;
pub mod utils;
mod verb;

pub use accent::define_accent;
pub use char::define_char;
pub use color::define_color;
pub use cr::define_cr;
pub use def::define_def;
pub use delimsizing::{define_delimsizing, define_leftright, define_middle};
pub use environment::define_environment_delimiters;
pub use font::define_font;
pub use genfrac::define_genfrac;
pub use hbox::define_hbox;
pub use href::define_href;
pub use kern::define_kern;
pub use math::define_math;
pub use mclass::{binrel_class, define_mclass};
pub use op::define_op;
pub use operatorname::define_operatorname;
pub use ordgroup::define_ordgroup;
pub use overline::define_overline;
pub use phantom::define_phantom;
pub use relax::define_relax;
pub use rule::define_rule;
pub use sizing::define_sizing;
pub use sqrt::define_sqrt;
pub use styling::define_styling;
pub use supsub::define_supsub;
pub use symbols_op::define_symbols_op;
pub use symbols_ord::define_symbols_ord;
pub use symbols_spacing::define_spacing;
pub use tag::define_tag;
pub use text::define_text;
pub use underline::define_underline;
pub use verb::define_verb;
