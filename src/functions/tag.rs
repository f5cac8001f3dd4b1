//! MathML rendering of tagged display equations.
//!
//! `\tag` itself is a macro that stores its argument in `\df@tag`; the
//! top-level parse collects it into a tag node. Only the MathML builder
//! is registered here, since the HTML side lays tags out with the array
//! machinery.

use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_function::{FunctionDefSpec, FunctionPropSpec};
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::parse_node::{AnyParseNode, NodeType};
use crate::types::{ParseError, ParseErrorKind};

/// Registers the tag-node builder.
pub fn define_tag(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Tag),
        names: &["\\tag"],
        props: FunctionPropSpec::default(),
        handler: None,
        html_builder: None,
        mathml_builder: Some(mathml_builder),
    });
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Tag(group) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Tag,
        }));
    };

    let mut pad = MathNode::with_children(MathNodeType::Mtd, vec![]);
    pad.set_attribute("width", "50%");

    let body = build_mathml::build_expression_row(ctx, &group.body, options, None)?;
    let tag = build_mathml::build_expression_row(ctx, &group.tag, options, None)?;

    let body_cell = MathNode::with_children(MathNodeType::Mtd, vec![body]);
    let tag_cell = MathNode::with_children(MathNodeType::Mtd, vec![tag]);

    let row = MathNode::with_children(
        MathNodeType::Mtr,
        vec![
            MathDomNode::Math(pad.clone()),
            MathDomNode::Math(body_cell),
            MathDomNode::Math(pad),
            MathDomNode::Math(tag_cell),
        ],
    );

    let mut table = MathNode::with_children(MathNodeType::Mtable, vec![MathDomNode::Math(row)]);
    table.set_attribute("width", "100%");

    Ok(MathDomNode::Math(table))
}
