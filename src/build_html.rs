//! Box-tree (HTML) builder.
//!
//! Turns a parse tree into spans and symbols: builds each node through
//! the registered group builders, applies the TeXbook's mbin/mord
//! reclassification, inserts inter-atom glue, and splits the result into
//! unbreakable chunks around allowed line breaks.

use core::str::FromStr as _;

use phf::phf_set;
use strum::{AsRefStr, EnumString, IntoDiscriminant as _};

use crate::build_common::{make_span, try_combine_chars};
use crate::context::EngineContext;
use crate::dom_tree::{DomSpan, HtmlDomNode};
use crate::options::Options;
use crate::parser::parse_node::AnyParseNode;
use crate::spacing_data::{MeasurementStatic, SPACINGS, TIGHT_SPACINGS};
use crate::types::{CssProperty, ParseError, ParseErrorKind};
use crate::units::make_em;

// Binary atoms (first class `mbin`) change into ordinary atoms (`mord`)
// depending on their surroundings. See TeXbook pg. 442-446, Rules 5 and 6,
// and the text before Rule 19.
const BIN_LEFT_CANCELLER: phf::Set<&str> =
    phf_set!("leftmost", "mbin", "mopen", "mrel", "mop", "mpunct");
const BIN_RIGHT_CANCELLER: phf::Set<&str> = phf_set!("rightmost", "mrel", "mclose", "mpunct");

/// The eight atom classes of the spacing tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DomType {
    /// Ordinary symbol.
    Mord,
    /// Large operator.
    Mop,
    /// Binary operator.
    Mbin,
    /// Relation.
    Mrel,
    /// Opening delimiter.
    Mopen,
    /// Closing delimiter.
    Mclose,
    /// Punctuation.
    Mpunct,
    /// Inner expression.
    Minner,
}

/// How an expression participates in spacing around it.
///
/// Partial groups (created by `\color` and similar wrappers) leave glue
/// and bin cancellation to the parent so the same pair is never processed
/// twice; real groups handle them, and the root additionally resets
/// spacing at explicit newlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    /// Partial group; the parent handles spacing.
    False,
    /// Real group; full spacing rules apply.
    True,
    /// Top-level expression.
    Root,
}

impl GroupType {
    /// Whether spacing rules apply here.
    #[must_use]
    pub const fn is_real(&self) -> bool {
        matches!(self, Self::True | Self::Root)
    }
}

/// Which end of an expression to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Leftmost node.
    Left,
    /// Rightmost node.
    Right,
}

/// Makes the invisible placeholder span standing in for an omitted
/// delimiter, so spacing and alignment stay consistent.
#[must_use]
pub fn make_null_delimiter(options: &Options, classes: &[String]) -> DomSpan {
    let mut combined_classes =
        Vec::with_capacity(classes.len() + 1 + options.base_sizing_classes().len());
    combined_classes.extend_from_slice(classes);
    combined_classes.push(String::from("nulldelimiter"));
    combined_classes.extend(options.base_sizing_classes());
    make_span(combined_classes, vec![], None, None)
}

/// Children of a partial group, i.e. a node that does not affect spacing
/// around itself.
fn partial_group_children(node: &HtmlDomNode) -> Option<&Vec<HtmlDomNode>> {
    match node {
        HtmlDomNode::Fragment(fragment) => Some(&fragment.children),
        HtmlDomNode::Anchor(anchor) => Some(&anchor.children),
        HtmlDomNode::DomSpan(span) if span.classes.contains(&"enclosing".to_owned()) => {
            Some(&span.children)
        }
        _ => None,
    }
}

fn partial_group_children_mut(node: &mut HtmlDomNode) -> Option<&mut Vec<HtmlDomNode>> {
    match node {
        HtmlDomNode::Fragment(fragment) => Some(&mut fragment.children),
        HtmlDomNode::Anchor(anchor) => Some(&mut anchor.children),
        HtmlDomNode::DomSpan(span) if span.classes.contains(&"enclosing".to_owned()) => {
            Some(&mut span.children)
        }
        _ => None,
    }
}

/// The outermost node of a box tree, descending through partial groups.
fn get_outermost_node(node: &HtmlDomNode, side: Side) -> &HtmlDomNode {
    if let Some(children) = partial_group_children(node)
        && !children.is_empty()
    {
        if side == Side::Right {
            return get_outermost_node(&children[children.len() - 1], Side::Right);
        }
        return get_outermost_node(&children[0], Side::Left);
    }
    node
}

/// Atom class of a box-tree node, read off its first CSS class. With a
/// side, descends through partial groups to the outermost node on that
/// side first.
#[must_use]
pub fn get_type_of_dom_tree(node: &HtmlDomNode, side: Option<Side>) -> Option<DomType> {
    let node = side.map_or(node, |side| get_outermost_node(node, side));
    DomType::from_str(node.classes().first()?).ok()
}

fn node_at<'a>(nodes: &'a [HtmlDomNode], path: &[usize]) -> Option<&'a HtmlDomNode> {
    let (&first, rest) = path.split_first()?;
    let node = nodes.get(first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at(partial_group_children(node)?, rest)
    }
}

fn node_at_mut<'a>(nodes: &'a mut [HtmlDomNode], path: &[usize]) -> Option<&'a mut HtmlDomNode> {
    let (&first, rest) = path.split_first()?;
    let node = nodes.get_mut(first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at_mut(partial_group_children_mut(node)?, rest)
    }
}

fn container_at_mut<'a>(
    nodes: &'a mut Vec<HtmlDomNode>,
    path: &[usize],
) -> Option<&'a mut Vec<HtmlDomNode>> {
    let Some((&first, rest)) = path.split_first() else {
        return Some(nodes);
    };
    container_at_mut(partial_group_children_mut(nodes.get_mut(first)?)?, rest)
}

/// One stop of the spacing traversal, in document order.
enum TraversalEntry {
    /// A spacing-relevant node, addressed by its path through partial
    /// groups.
    Atom(Vec<usize>),
    /// A top-level explicit newline; spacing restarts after it.
    Newline,
}

/// Collects the traversal order: descends into partial groups, skips
/// glue, and records top-level newlines when walking the root.
fn collect_traversal(
    nodes: &[HtmlDomNode],
    path: &mut Vec<usize>,
    out: &mut Vec<TraversalEntry>,
    is_root: bool,
) {
    for (idx, node) in nodes.iter().enumerate() {
        path.push(idx);
        if let Some(children) = partial_group_children(node) {
            collect_traversal(children, path, out, false);
        } else if node.has_class("mspace") {
            if is_root && node.has_class("newline") {
                out.push(TraversalEntry::Newline);
            }
        } else {
            out.push(TraversalEntry::Atom(path.clone()));
        }
        path.pop();
    }
}

/// The node before an atom in traversal order: a real node, or a dummy
/// standing in for the surrounding context.
enum PrevAtom<'a> {
    Dummy(&'a str),
    Node(Vec<usize>),
}

/// Applies the two TeXbook reclassification rules in traversal order,
/// with dummies carrying the surrounding atom classes at both ends.
fn cancel_binary_operators(
    groups: &mut [HtmlDomNode],
    entries: &[TraversalEntry],
    left_class: &str,
    right_class: &str,
) {
    let mut prev = PrevAtom::Dummy(left_class);

    let set_first_class = |groups: &mut [HtmlDomNode], path: &[usize]| {
        if let Some(node) = node_at_mut(groups, path)
            && let Some(classes) = node.classes_mut()
            && !classes.is_empty()
        {
            "mord".clone_into(&mut classes[0]);
        }
    };

    let first_class = |groups: &[HtmlDomNode], path: &[usize]| -> Option<String> {
        node_at(groups, path)?.classes().first().cloned()
    };

    for entry in entries {
        match entry {
            TraversalEntry::Newline => prev = PrevAtom::Dummy("leftmost"),
            TraversalEntry::Atom(path) => {
                let Some(current_class) = first_class(groups, path) else {
                    prev = PrevAtom::Node(path.clone());
                    continue;
                };
                let prev_class = match &prev {
                    PrevAtom::Dummy(class) => Some((*class).to_owned()),
                    PrevAtom::Node(prev_path) => first_class(groups, prev_path),
                };
                if let Some(prev_class) = prev_class {
                    if prev_class == "mbin" && BIN_RIGHT_CANCELLER.contains(current_class.as_str())
                    {
                        if let PrevAtom::Node(prev_path) = &prev {
                            set_first_class(groups, prev_path);
                        }
                    } else if current_class == "mbin"
                        && BIN_LEFT_CANCELLER.contains(prev_class.as_str())
                    {
                        set_first_class(groups, path);
                    }
                }
                prev = PrevAtom::Node(path.clone());
            }
        }
    }

    // The trailing context acts as one more "current" atom.
    if let PrevAtom::Node(prev_path) = &prev
        && BIN_RIGHT_CANCELLER.contains(right_class)
        && first_class(groups, prev_path).as_deref() == Some("mbin")
    {
        set_first_class(groups, prev_path);
    }
}

/// A pending glue insertion: the container to insert into, the index
/// within it, and the spacing to apply.
struct GlueInsertion {
    container: Vec<usize>,
    index: usize,
    space: MeasurementStatic,
}

/// Plans the glue between adjacent atoms from the spacing tables. Glue
/// lands right after the left atom of each pair, or at the start of the
/// right atom's container when the left side is surrounding context.
fn plan_spacings(
    groups: &[HtmlDomNode],
    entries: &[TraversalEntry],
    left_type: Option<DomType>,
) -> Vec<GlueInsertion> {
    let mut insertions = Vec::new();
    let mut prev: Option<(Option<Vec<usize>>, DomType)> = left_type.map(|ty| (None, ty));

    for entry in entries {
        match entry {
            TraversalEntry::Newline => prev = None,
            TraversalEntry::Atom(path) => {
                let Some(node) = node_at(groups, path) else {
                    continue;
                };
                let current_type = get_type_of_dom_tree(node, None);
                if let (Some((prev_path, prev_type)), Some(current_type)) = (&prev, current_type) {
                    let table = if node.has_class("mtight") {
                        &TIGHT_SPACINGS
                    } else {
                        &SPACINGS
                    };
                    let space = table
                        .get(prev_type.as_ref())
                        .and_then(|inner| inner.get(current_type.as_ref()));

                    if let Some(space) = space {
                        let (container, index) = prev_path.as_ref().map_or_else(
                            || (path[..path.len() - 1].to_vec(), path[path.len() - 1]),
                            |prev_path| {
                                (
                                    prev_path[..prev_path.len() - 1].to_vec(),
                                    prev_path[prev_path.len() - 1] + 1,
                                )
                            },
                        );
                        insertions.push(GlueInsertion {
                            container,
                            index,
                            space: space.clone(),
                        });
                    }
                }
                prev = current_type.map(|ty| (Some(path.clone()), ty));
            }
        }
    }

    insertions
}

/// Take a list of parse nodes, build them in order, and return the built
/// box-tree nodes.
///
/// Fragments are flattened, so the result contains none. For real groups
/// this also runs bin cancellation and inserts inter-atom glue;
/// `surrounding` names the atom classes flanking the expression, used at
/// both steps in place of missing neighbors.
pub fn build_expression(
    ctx: &EngineContext,
    expression: &[AnyParseNode],
    options: &Options,
    is_real_group: GroupType,
    surrounding: (Option<DomType>, Option<DomType>),
) -> Result<Vec<HtmlDomNode>, ParseError> {
    let mut groups: Vec<HtmlDomNode> = Vec::new();

    for node in expression {
        let output = build_group(ctx, node, options, None)?;
        if let HtmlDomNode::Fragment(fragment) = output {
            groups.extend(fragment.children);
        } else {
            groups.push(output);
        }
    }

    // Merge runs of compatible symbol nodes.
    try_combine_chars(&mut groups);

    // A partial group leaves spacing to the parent so no pair is
    // processed twice.
    if !is_real_group.is_real() {
        return Ok(groups);
    }

    // A lone sizing or styling group spaces at its inner size.
    let glue_options = if let [node] = expression {
        match node {
            AnyParseNode::Sizing(sizing) => options.having_size(sizing.size),
            AnyParseNode::Styling(styling) => options.having_style(styling.style),
            _ => options.clone(),
        }
    } else {
        options.clone()
    };

    let left_class = surrounding
        .0
        .map_or_else(|| "leftmost".to_owned(), |side| side.as_ref().to_owned());
    let right_class = surrounding
        .1
        .map_or_else(|| "rightmost".to_owned(), |side| side.as_ref().to_owned());

    let is_root = is_real_group == GroupType::Root;
    let mut entries = Vec::new();
    collect_traversal(&groups, &mut Vec::new(), &mut entries, is_root);

    cancel_binary_operators(&mut groups, &entries, &left_class, &right_class);

    // Classes may have changed; the positions have not.
    let mut insertions = plan_spacings(&groups, &entries, surrounding.0);

    // Apply rear-most first so earlier positions stay valid.
    insertions.sort_by(|a, b| {
        let key_a = a.container.iter().chain(core::iter::once(&a.index));
        let key_b = b.container.iter().chain(core::iter::once(&b.index));
        key_b.cmp(key_a)
    });
    for insertion in insertions {
        let glue = ctx.make_glue(&insertion.space, &glue_options)?;
        if let Some(container) = container_at_mut(&mut groups, &insertion.container) {
            let index = insertion.index.min(container.len());
            container.insert(index, glue.into());
        }
    }

    Ok(groups)
}

/// Builds a single parse node through its registered builder. With
/// `base_options` at a different size, the result is wrapped in a sizing
/// span and its extents rescaled.
pub fn build_group(
    ctx: &EngineContext,
    group: &AnyParseNode,
    options: &Options,
    base_options: Option<&Options>,
) -> Result<HtmlDomNode, ParseError> {
    let group_type = group.discriminant();

    let group_node = if let Some(builder) = ctx.html_group_builders.get(&group_type) {
        builder(group, options, ctx)?
    } else {
        return Err(ParseError::new(ParseErrorKind::UnknownGroupType {
            group_type,
        }));
    };

    if let Some(base_options) = base_options
        && options.size != base_options.size
    {
        let mut group_node = make_span(
            options.sizing_classes(base_options),
            vec![group_node],
            Some(options),
            None,
        );
        let multiplier = options.size_multiplier / base_options.size_multiplier;
        group_node.height *= multiplier;
        group_node.depth *= multiplier;
        Ok(group_node.into())
    } else {
        Ok(group_node)
    }
}

/// Combines box-tree nodes into an unbreakable chunk of class `.base`,
/// with a strut pinning the chunk's height and depth.
fn build_html_unbreakable(children: Vec<HtmlDomNode>, options: &Options) -> HtmlDomNode {
    let mut body = make_span(vec!["base".to_owned()], children, Some(options), None);

    let mut strut = make_span(vec!["strut".to_owned()], vec![], Some(options), None);
    strut
        .style
        .insert(CssProperty::Height, make_em(body.height + body.depth));
    if body.depth > 0.0 {
        strut
            .style
            .insert(CssProperty::VerticalAlign, make_em(-body.depth));
    }

    body.children.insert(0, strut.into());
    HtmlDomNode::DomSpan(body)
}

/// Builds a whole parse tree into the aria-hidden box-tree container.
///
/// The expression is split into unbreakable chunks between allowed line
/// breaks, per the TeXbook p.173: a break may follow a relation or binary
/// operator at the outer level, with post-operator glue kept on the same
/// line and `\nobreak` vetoing the break.
pub fn build_html(
    ctx: &EngineContext,
    tree: &[AnyParseNode],
    options: &Options,
) -> Result<HtmlDomNode, ParseError> {
    // Strip off an outer tag wrapper for processing below.
    let mut tag = None;
    let mut tree = tree;

    if let [AnyParseNode::Tag(tag_node)] = tree {
        tag = Some(&tag_node.tag);
        tree = &tag_node.body;
    }

    let mut expression = build_expression(ctx, tree, options, GroupType::Root, (None, None))?;

    let eqn_num = if expression.len() == 2
        && expression
            .get(1)
            .is_some_and(|second| second.has_class("tag"))
    {
        // An environment with automatic equation numbers, e.g. {gather}.
        expression.pop()
    } else {
        None
    };

    let mut children = Vec::new();
    let mut parts = Vec::new();
    let mut iter = expression.into_iter().peekable();
    while let Some(node) = iter.next() {
        let is_break_candidate =
            node.has_class("mbin") || node.has_class("mrel") || node.has_class("allowbreak");
        let is_newline = node.has_class("newline");

        parts.push(node);

        if is_break_candidate {
            // Keep post-operator glue on the operator's line, watching
            // for \nobreak along the way.
            let mut nobreak = false;
            while let Some(next) =
                iter.next_if(|n| n.has_class("mspace") && !n.has_class("newline"))
            {
                if next.has_class("nobreak") {
                    nobreak = true;
                }
                parts.push(next);
            }
            if !nobreak {
                let mut chunk = Vec::with_capacity(parts.len());
                chunk.append(&mut parts);
                children.push(build_html_unbreakable(chunk, options));
            }
        } else if is_newline {
            // Close the line, then put the newline at the top level.
            let newline = parts
                .pop()
                .ok_or_else(|| ParseError::new(ParseErrorKind::NewlineNodeNotFound))?;
            if !parts.is_empty() {
                let mut chunk = Vec::with_capacity(parts.len());
                chunk.append(&mut parts);
                children.push(build_html_unbreakable(chunk, options));
            }
            children.push(newline);
        }
    }

    if !parts.is_empty() {
        let mut chunk = Vec::with_capacity(parts.len());
        chunk.append(&mut parts);
        children.push(build_html_unbreakable(chunk, options));
    }

    // The tag, if any, becomes a final child of its own.
    let tag_child_index = if let Some(tag_ref) = tag {
        let tag_html = build_expression(ctx, tag_ref, options, GroupType::True, (None, None))?;
        let mut unbreakable = build_html_unbreakable(tag_html, options);
        if let HtmlDomNode::DomSpan(span) = &mut unbreakable {
            span.classes = vec!["tag".to_owned()];
        }
        children.push(unbreakable);
        Some(children.len() - 1)
    } else {
        if let Some(eqn_num) = eqn_num {
            children.push(eqn_num);
        }
        None
    };

    let mut span = make_span(
        vec!["mathsmith-html".to_owned()],
        children,
        Some(options),
        None,
    );
    span.attributes
        .insert("aria-hidden".to_owned(), "true".to_owned());

    // Stretch the tag's strut to the full height of the line so the tag
    // aligns with the equation.
    if let Some(index) = tag_child_index
        && let Some(HtmlDomNode::DomSpan(tag_span)) = span.children.get_mut(index)
        && let Some(HtmlDomNode::DomSpan(strut_span)) = tag_span.children.first_mut()
    {
        let total_height = span.height + span.depth;
        if total_height > 0.0 {
            strut_span
                .style
                .insert(CssProperty::Height, make_em(total_height));
        }
        if span.depth > 0.0 {
            strut_span
                .style
                .insert(CssProperty::VerticalAlign, make_em(-span.depth));
        }
    }

    Ok(span.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_common::make_fragment;
    use crate::style::TEXT;

    fn atom(class: &str) -> HtmlDomNode {
        make_span(vec![class.to_owned()], vec![], None, None).into()
    }

    fn first_classes(nodes: &[HtmlDomNode]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|node| node.classes().first().cloned())
            .collect()
    }

    #[test]
    fn test_get_type_of_dom_tree() {
        assert_eq!(get_type_of_dom_tree(&atom("mbin"), None), Some(DomType::Mbin));
        assert_eq!(get_type_of_dom_tree(&atom("strut"), None), None);

        // A fragment is transparent; the side picks the outer child.
        let fragment = make_fragment(&[atom("mopen"), atom("mclose")]).into();
        assert_eq!(
            get_type_of_dom_tree(&fragment, Some(Side::Left)),
            Some(DomType::Mopen)
        );
        assert_eq!(
            get_type_of_dom_tree(&fragment, Some(Side::Right)),
            Some(DomType::Mclose)
        );
    }

    #[test]
    fn test_leading_binary_operator_becomes_ordinary() {
        let mut groups = vec![atom("mbin"), atom("mord")];
        let mut entries = Vec::new();
        collect_traversal(&groups, &mut Vec::new(), &mut entries, true);
        cancel_binary_operators(&mut groups, &entries, "leftmost", "rightmost");
        assert_eq!(first_classes(&groups), vec!["mord", "mord"]);
    }

    #[test]
    fn test_trailing_binary_operator_becomes_ordinary() {
        let mut groups = vec![atom("mord"), atom("mbin")];
        let mut entries = Vec::new();
        collect_traversal(&groups, &mut Vec::new(), &mut entries, true);
        cancel_binary_operators(&mut groups, &entries, "leftmost", "rightmost");
        assert_eq!(first_classes(&groups), vec!["mord", "mord"]);
    }

    #[test]
    fn test_interior_binary_operator_survives() {
        let mut groups = vec![atom("mord"), atom("mbin"), atom("mord")];
        let mut entries = Vec::new();
        collect_traversal(&groups, &mut Vec::new(), &mut entries, true);
        cancel_binary_operators(&mut groups, &entries, "leftmost", "rightmost");
        assert_eq!(first_classes(&groups), vec!["mord", "mbin", "mord"]);
    }

    #[test]
    fn test_consecutive_binary_operators_cancel() {
        // In "a + - b" the second operator reads as a sign.
        let mut groups = vec![atom("mord"), atom("mbin"), atom("mbin"), atom("mord")];
        let mut entries = Vec::new();
        collect_traversal(&groups, &mut Vec::new(), &mut entries, true);
        cancel_binary_operators(&mut groups, &entries, "leftmost", "rightmost");
        assert_eq!(first_classes(&groups), vec!["mord", "mbin", "mord", "mord"]);
    }

    #[test]
    fn test_spacing_planned_between_ord_and_bin() {
        let groups = vec![atom("mord"), atom("mbin"), atom("mord")];
        let mut entries = Vec::new();
        collect_traversal(&groups, &mut Vec::new(), &mut entries, true);
        let insertions = plan_spacings(&groups, &entries, None);
        // Medium space on each side of the binary operator.
        assert_eq!(insertions.len(), 2);
        for insertion in &insertions {
            assert_eq!(insertion.space.unit, "mu");
            assert!((insertion.space.number - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_null_delimiter_classes() {
        let options = Options::builder()
            .style(TEXT)
            .max_size(f64::INFINITY)
            .min_rule_thickness(0.0)
            .build();
        let span = make_null_delimiter(&options, &["mopen".to_owned()]);
        assert!(span.has_class("nulldelimiter"));
        assert!(span.has_class("mopen"));
    }
}
