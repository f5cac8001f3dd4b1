//! The engine's central registry.
//!
//! An [`EngineContext`] owns everything the parser and the builders
//! look up at runtime: the function table, the per-node-type HTML and
//! MathML builders, the symbol table, the environment table, and the
//! font metric data. [`EngineContext::default`] registers the complete
//! built-in command set; a context built by hand can carry a subset.

use crate::define_environment;
use crate::define_environment::{EnvDefSpec, EnvSpec};
use crate::define_function::{FunctionDefSpec, FunctionSpec, HtmlBuilder, MathMLBuilder};
use crate::font_metrics::{
    FONT_METRICS, FontMetrics, FontMetricsData, FontSizeIndex, MetricMap,
};
use crate::functions;
use crate::namespace::KeyMap;
use crate::parser::parse_node::NodeType;
use crate::symbols::{Symbols, create_symbols};

/// Registry of functions, builders, symbols, environments, and metrics.
pub struct EngineContext {
    /// Registered functions, keyed by command name.
    pub functions: KeyMap<String, FunctionSpec>,
    /// HTML builders, keyed by the node type a handler produces.
    pub html_group_builders: KeyMap<NodeType, HtmlBuilder>,
    /// MathML builders, keyed by the node type a handler produces.
    pub mathml_group_builders: KeyMap<NodeType, MathMLBuilder>,
    /// The symbol table, keyed by mode and symbol name.
    pub symbols: Symbols,
    /// Registered environments, keyed by environment name.
    pub environments: KeyMap<String, EnvSpec>,
    /// Per-glyph font metric data.
    pub font_metrics: FontMetricsData,
}

impl EngineContext {
    /// Registers a function under each of its names, and its builders
    /// under its node type.
    pub fn define_function(&mut self, spec: FunctionDefSpec) {
        let data = FunctionSpec {
            node_type: spec.node_type,
            num_args: spec.props.num_args,
            arg_types: spec.props.arg_types,
            allowed_in_argument: spec.props.allowed_in_argument,
            allowed_in_text: spec.props.allowed_in_text,
            allowed_in_math: spec.props.allowed_in_math,
            num_optional_args: spec.props.num_optional_args,
            infix: spec.props.infix,
            primitive: spec.props.primitive,
            handler: spec.handler,
        };

        for name in spec.names {
            self.functions.insert((*name).to_owned(), data.clone());
        }

        if let Some(node_type) = spec.node_type {
            self.define_function_builders(node_type, spec.html_builder, spec.mathml_builder);
        }
    }

    /// Registers only the output builders for a node type. Used for
    /// nodes the parser produces without a handler, like superscripts.
    pub fn define_function_builders(
        &mut self,
        node_type: NodeType,
        html_builder: Option<HtmlBuilder>,
        mathml_builder: Option<MathMLBuilder>,
    ) {
        if let Some(builder) = html_builder {
            self.html_group_builders.insert(node_type, builder);
        }
        if let Some(builder) = mathml_builder {
            self.mathml_group_builders.insert(node_type, builder);
        }
    }

    /// Registers an environment under each of its names, and its
    /// builders under its node type.
    pub fn define_environment(&mut self, spec: EnvDefSpec) {
        let data = EnvSpec {
            node_type: spec.node_type,
            num_args: spec.props.num_args,
            arg_types: spec.props.arg_types.clone(),
            allowed_in_text: spec.props.allowed_in_text,
            num_optional_args: spec.props.num_optional_args,
            handler: spec.handler,
        };

        for name in spec.names {
            self.environments.insert((*name).to_owned(), data.clone());
        }

        self.define_function_builders(spec.node_type, spec.html_builder, spec.mathml_builder);
    }

    /// Global font metrics for a size-multiplier bucket.
    #[must_use]
    pub fn get_global_metrics(&self, size: f64) -> &FontMetrics {
        let size_index: FontSizeIndex = if size >= 5.0 {
            0
        } else if size >= 3.0 {
            1
        } else {
            2
        };

        &FONT_METRICS[size_index]
    }

    /// Installs or overrides the metric map for a font family.
    pub fn set_font_metrics(&mut self, font_name: &str, metrics: MetricMap) {
        self.font_metrics
            .custom
            .insert(font_name.to_owned(), metrics);
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        let mut ctx = Self {
            functions: KeyMap::default(),
            html_group_builders: KeyMap::default(),
            mathml_group_builders: KeyMap::default(),
            symbols: create_symbols(),
            environments: KeyMap::default(),
            font_metrics: FontMetricsData::default(),
        };

        functions::define_accent(&mut ctx);
        functions::define_char(&mut ctx);
        functions::define_color(&mut ctx);
        functions::define_cr(&mut ctx);
        functions::define_def(&mut ctx);
        functions::define_delimsizing(&mut ctx);
        functions::define_environment_delimiters(&mut ctx);
        functions::define_font(&mut ctx);
        functions::define_genfrac(&mut ctx);
        functions::define_hbox(&mut ctx);
        functions::define_href(&mut ctx);
        functions::define_kern(&mut ctx);
        functions::define_leftright(&mut ctx);
        functions::define_math(&mut ctx);
        functions::define_mclass(&mut ctx);
        functions::define_middle(&mut ctx);
        functions::define_op(&mut ctx);
        functions::define_operatorname(&mut ctx);
        functions::define_ordgroup(&mut ctx);
        functions::define_overline(&mut ctx);
        functions::define_phantom(&mut ctx);
        functions::define_relax(&mut ctx);
        functions::define_rule(&mut ctx);
        functions::define_sizing(&mut ctx);
        functions::define_spacing(&mut ctx);
        functions::define_sqrt(&mut ctx);
        functions::define_styling(&mut ctx);
        functions::define_supsub(&mut ctx);
        functions::define_symbols_op(&mut ctx);
        functions::define_symbols_ord(&mut ctx);
        functions::define_tag(&mut ctx);
        functions::define_text(&mut ctx);
        functions::define_underline(&mut ctx);
        functions::define_verb(&mut ctx);

        define_environment::define_array(&mut ctx);
        define_environment::define_cd(&mut ctx);

        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_knows_core_commands() {
        let ctx = EngineContext::default();
        for name in ["\\frac", "\\sqrt", "\\left", "\\begin", "\\operatornamewithlimits"] {
            assert!(ctx.functions.get(name).is_some(), "missing {name}");
        }
        for env in ["matrix", "pmatrix", "cases", "aligned", "array", "CD"] {
            assert!(ctx.environments.get(env).is_some(), "missing {env}");
        }
    }

    #[test]
    fn test_global_metrics_buckets() {
        let ctx = EngineContext::default();
        assert!((ctx.get_global_metrics(6.0).quad - 1.0).abs() < 1e-9);
        assert!((ctx.get_global_metrics(4.0).quad - 1.171).abs() < 1e-9);
        assert!((ctx.get_global_metrics(1.0).quad - 1.472).abs() < 1e-9);
    }
}
