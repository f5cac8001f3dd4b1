//! The `array` environment family: arrays, matrices, `cases`, the AMS
//! alignment environments and the shared row/column parsing they build on.

use crate::build_common::{
    VListElemAndShift, VListParam, make_fragment, make_line_span, make_span, make_v_list,
};
use crate::build_html;
use crate::build_mathml;
use crate::context::EngineContext;
use crate::define_environment::cd::parse_cd;
use crate::define_environment::{EnvContext, EnvDefSpec, EnvHandler, EnvProps};
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::dom_tree::HtmlDomNode;
use crate::macros::{MacroContextInterface as _, MacroDefinition};
use crate::mathml_tree::{MathDomNode, MathNode, MathNodeType};
use crate::options::Options;
use crate::parser::Parser;
use crate::parser::parse_node::{
    AlignSpec, AnyParseNode, ColSeparationType, NodeType, ParseNodeArray, ParseNodeArrayTag,
    ParseNodeLeftRight, ParseNodeOrdGroup, ParseNodeStyling, check_symbol_node_type,
};
use crate::spacing_data::Measurement;
use crate::style::{DISPLAY, SCRIPT, Style, TEXT};
use crate::types::{BreakToken, CssProperty, ParseError, ParseErrorKind, Token};
use crate::units;
use core::iter::repeat_n;

/// Collects `\hline` and `\hdashline` commands at the current position.
/// Each entry tells whether the line is dashed.
fn get_hlines(parser: &mut Parser) -> Result<Vec<bool>, ParseError> {
    let mut hline_info = Vec::new();
    parser.gullet.consume_spaces()?;

    let mut nxt = parser.fetch()?.text.as_str().to_owned();
    if nxt == "\\relax" {
        // \relax is an artifact of the \cr macro below
        parser.consume();
        parser.gullet.consume_spaces()?;
        nxt = parser.fetch()?.text.as_str().to_owned();
    }

    while nxt == "\\hline" || nxt == "\\hdashline" {
        parser.consume();
        hline_info.push(nxt == "\\hdashline");
        parser.gullet.consume_spaces()?;
        nxt = parser.fetch()?.text.as_str().to_owned();
    }

    Ok(hline_info)
}

/// The AMS display environments reject inline mode.
fn validate_ams_environment_context(context: &EnvContext) -> Result<(), ParseError> {
    if !context.parser.settings.display_mode {
        return Err(ParseError::new(ParseErrorKind::DisplayModeOnly {
            env: context.env_name.clone(),
        }));
    }
    Ok(())
}

/// Auto-numbering per environment name: the `-ed` variants never number,
/// starred variants suppress numbering, the rest number every row.
fn get_auto_tag(name: &str) -> Option<bool> {
    if name.contains("ed") {
        None
    } else {
        Some(!name.contains('*'))
    }
}

/// Whether a cell (already wrapped in styling and ordgroup) is empty.
fn cell_is_empty(cell: &AnyParseNode) -> bool {
    if let AnyParseNode::Styling(styling) = cell
        && styling.body.len() == 1
        && let AnyParseNode::OrdGroup(ordgroup) = &styling.body[0]
    {
        return ordgroup.body.is_empty();
    }
    false
}

/// Parse the body of an environment, with rows delimited by `\\` and
/// columns delimited by `&`, into a row-major grid with one group per
/// cell.
pub fn parse_array(
    parser: &mut Parser,
    config: ArrayParseConfig,
    style: &'static Style,
) -> Result<ParseNodeArray, ParseError> {
    parser.gullet.begin_group();

    if !config.single_row {
        // \cr is equivalent to \\ without the optional size argument
        parser.gullet.macros_mut().set(
            "\\cr",
            Some(MacroDefinition::StaticStr("\\\\\\relax")),
            false,
        );
    }

    let arraystretch = if let Some(stretch) = config.arraystretch {
        stretch
    } else if let Some(stretch) = parser.gullet.expand_macro_as_text("\\arraystretch")? {
        let stretch_val = stretch.parse::<f64>().map_err(|_| {
            ParseError::new(ParseErrorKind::InvalidArrayStretch {
                stretch: stretch.clone(),
            })
        })?;
        if stretch_val <= 0.0 {
            return Err(ParseError::new(ParseErrorKind::InvalidArrayStretch {
                stretch,
            }));
        }
        stretch_val
    } else {
        // Default \arraystretch from lttab.dtx
        1.0
    };

    // Group for the first cell
    parser.gullet.begin_group();

    let mut body: Vec<Vec<AnyParseNode>> = vec![Vec::new()];
    let mut row_gaps = Vec::new();
    let mut h_lines_before_row = Vec::new();

    let mut tags = config
        .auto_tag
        .is_some()
        .then(Vec::<ParseNodeArrayTag>::new);

    // amsmath flags numbered rows with \global\@eqnswtrue; simulated here
    // with a \@eqnsw macro set to 1 or 0.
    let begin_row = |parser: &mut Parser| {
        if config.auto_tag == Some(true) {
            parser
                .gullet
                .macros_mut()
                .set("\\@eqnsw", Some(MacroDefinition::StaticStr("1")), true);
        }
    };

    let mut end_row = |parser: &mut Parser| -> Result<(), ParseError> {
        if let Some(tags) = &mut tags {
            if parser.gullet.macros().get("\\df@tag").is_some() {
                let nodes = parser.subparse(vec![Token::new("\\df@tag", None)])?;
                tags.push(nodes.into());
                parser.gullet.macros_mut().set("\\df@tag", None, true);
            } else {
                let flag = parser
                    .gullet
                    .macros()
                    .get("\\@eqnsw")
                    .is_some_and(|definition| definition.as_str() == Some("1"));
                tags.push((config.auto_tag.unwrap_or(false) && flag).into());
            }
        }
        Ok(())
    };

    begin_row(parser);

    // \hline(s) at the top of the array
    h_lines_before_row.push(get_hlines(parser)?);

    loop {
        // Each cell parses in its own group
        let break_token = if config.single_row {
            Some(&BreakToken::End)
        } else {
            Some(&BreakToken::DoubleBackslash)
        };
        let cell_body = parser.parse_expression(false, break_token)?;
        parser.gullet.end_group()?;
        parser.gullet.begin_group();

        let cell = AnyParseNode::Styling(ParseNodeStyling {
            mode: parser.mode,
            loc: None,
            style,
            body: vec![AnyParseNode::OrdGroup(ParseNodeOrdGroup {
                mode: parser.mode,
                loc: None,
                body: cell_body,
                semisimple: None,
            })],
        });

        if let Some(row) = body.last_mut() {
            row.push(cell);
        }
        let next = parser.fetch()?.text.as_str().to_owned();

        match next.as_str() {
            "&" => {
                if let Some(max_num_cols) = config.max_num_cols
                    && body.last().is_some_and(|row| row.len() == max_num_cols)
                {
                    if config.single_row || config.col_separation_type.is_some() {
                        // {equation} or {split}
                        return Err(ParseError::new(ParseErrorKind::TooManyTabCharacters));
                    }
                    // {array} environment
                    parser.settings.report_nonstrict(
                        "textEnv",
                        "Too few columns specified in the {array} column argument.",
                        None,
                    )?;
                }
                parser.consume();
            }
            "\\end" => {
                end_row(parser)?;
                // Arrays terminate newlines with \crcr, which drops a
                // trailing empty row. AMS environments keep the empty row
                // when it is the only one.
                let drop_last = body.last().is_some_and(|row| {
                    row.len() == 1
                        && cell_is_empty(&row[0])
                        && (body.len() > 1 || !config.empty_single_row.unwrap_or(false))
                });
                if drop_last {
                    body.pop();
                }
                if h_lines_before_row.len() < body.len() + 1 {
                    h_lines_before_row.push(vec![]);
                }
                break;
            }
            "\\\\" => {
                parser.consume();
                // The \cr macro's \relax guards against consuming the
                // optional size group from the following cell.
                let size = if parser.gullet.future_mut()?.text == " " {
                    None
                } else {
                    parser.parse_size_group(true)?
                };
                row_gaps.push(size.map(|s| s.value));
                end_row(parser)?;

                h_lines_before_row.push(get_hlines(parser)?);

                body.push(Vec::new());
                begin_row(parser);
            }
            _ => {
                return Err(ParseError::new(ParseErrorKind::ExpectedArrayDelimiter {
                    found: next,
                }));
            }
        }
    }

    // End cell group, then the array group defining \cr
    parser.gullet.end_group()?;
    parser.gullet.end_group()?;

    Ok(ParseNodeArray {
        mode: parser.mode,
        loc: None,
        add_jot: config.add_jot,
        arraystretch,
        body,
        cols: config.cols,
        row_gaps,
        hskip_before_and_after: config.hskip_before_and_after,
        h_lines_before_row,
        col_separation_type: config.col_separation_type,
        tags,
        leqno: config.leqno,
        is_cd: None,
    })
}

/// How a specific environment configures [`parse_array`].
#[derive(Debug, Clone, Default)]
pub struct ArrayParseConfig {
    /// Pad the array with `\arraycolsep` on both sides.
    pub hskip_before_and_after: Option<bool>,
    /// Add `\jot` to each row gap.
    pub add_jot: Option<bool>,
    /// Column specs.
    pub cols: Option<Vec<AlignSpec>>,
    /// Fixed row height multiplier; `None` reads `\arraystretch`.
    pub arraystretch: Option<f64>,
    /// Column separation flavor.
    pub col_separation_type: Option<ColSeparationType>,
    /// Auto-numbering behavior.
    pub auto_tag: Option<bool>,
    /// The body is a single row terminated by `\end`.
    pub single_row: bool,
    /// Keep an empty row when it is the only one.
    pub empty_single_row: Option<bool>,
    /// Column limit, where the environment has one.
    pub max_num_cols: Option<usize>,
    /// Put equation numbers on the left.
    pub leqno: Option<bool>,
}

/// Cell style by environment name: a leading `d` means display style.
fn d_cell_style(env_name: &str) -> &'static Style {
    if env_name.starts_with('d') { DISPLAY } else { TEXT }
}

/// One laid-out row of the grid.
#[derive(Debug, Clone)]
struct Outrow {
    elements: Vec<HtmlDomNode>,
    height: f64,
    depth: f64,
    pos: f64,
}

/// A horizontal rule at a fixed vertical position.
#[derive(Debug, Clone)]
struct Hline {
    pos: f64,
    is_dashed: bool,
}

/// Records positions for the `\hline`(s) in one row gap, spacing
/// consecutive lines 0.25em apart.
fn set_hline_pos(hlines: &mut Vec<Hline>, total_height: &mut f64, hlines_in_gap: &[bool]) {
    for (i, &is_dashed) in hlines_in_gap.iter().enumerate() {
        if i > 0 {
            *total_height += 0.25;
        }
        hlines.push(Hline {
            pos: *total_height,
            is_dashed,
        });
    }
}

fn html_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<HtmlDomNode, ParseError> {
    let AnyParseNode::Array(array_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Array,
        }));
    };

    let nr = array_node.body.len();
    let h_lines_before_row = &array_node.h_lines_before_row;
    let mut nc = 0;

    let mut body = Vec::with_capacity(nr);
    let mut hlines = Vec::new();

    let rule_thickness = options
        .font_metrics()
        .array_rule_width
        .max(options.min_rule_thickness);

    // Horizontal spacing
    let pt = 1.0 / options.font_metrics().pt_per_em;

    let arraycolsep = if array_node.col_separation_type == Some(ColSeparationType::Small) {
        // {smallmatrix} columns default to \thickspace, i.e. 5/18em, per
        // amsmath. The scriptstyle applies only inside each cell here, so
        // scale the gap by hand.
        let local_multiplier = options.having_style(SCRIPT).size_multiplier;
        0.2778 * (local_multiplier / options.size_multiplier)
    } else {
        // \arraycolsep in article.cls
        5.0 * pt
    };

    // Vertical spacing
    let baselineskip = if array_node.col_separation_type == Some(ColSeparationType::CD) {
        ctx.calculate_size(
            &Measurement {
                number: 3.0,
                unit: "ex",
            },
            options,
        )?
    } else {
        // see size10.clo
        12.0 * pt
    };
    // Default \jot from ltmath.dtx
    let jot = 3.0 * pt;
    let arrayskip = array_node.arraystretch * baselineskip;
    // \strutbox in ltfsstrc.dtx and \@arstrutbox in lttab.dtx
    let arstrut_height = 0.7 * arrayskip;
    let arstrut_depth = 0.3 * arrayskip;

    let mut total_height = 0.0;

    set_hline_pos(&mut hlines, &mut total_height, &h_lines_before_row[0]);

    for r in 0..array_node.body.len() {
        let inrow = &array_node.body[r];
        // \@array adds an \@arstrut to each row via the template
        let mut height = arstrut_height;
        let mut depth = arstrut_depth;

        if nc < inrow.len() {
            nc = inrow.len();
        }

        let mut outrow: Vec<HtmlDomNode> = Vec::with_capacity(inrow.len());
        for group in inrow {
            let elt = build_html::build_group(ctx, group, options, None)?;
            depth = depth.max(elt.depth());
            height = height.max(elt.height());
            outrow.push(elt);
        }

        let mut gap = 0.0;
        if let Some(Some(gap_val)) = array_node.row_gaps.get(r) {
            gap = ctx.calculate_size(gap_val, options)?;
            if gap > 0.0 {
                // \@argarraycr
                gap += arstrut_depth;
                if depth < gap {
                    // \@xargarraycr
                    depth = gap;
                }
                gap = 0.0;
            }
        }
        // Multiline AMS environments add \jot to the \baselineskip via
        // \openup.
        if array_node.add_jot.unwrap_or(false) {
            depth += jot;
        }

        body.push(Outrow {
            elements: outrow,
            height,
            depth,
            pos: total_height + height,
        });

        total_height += height;
        // \@yargarraycr
        total_height += depth + gap;

        if r + 1 < h_lines_before_row.len() {
            set_hline_pos(&mut hlines, &mut total_height, &h_lines_before_row[r + 1]);
        }
    }

    let offset = total_height / 2.0 + options.font_metrics().axis_height;
    let col_descriptions = array_node.cols.as_deref().unwrap_or_default();
    let mut cols = Vec::new();
    let mut col_sep;

    let mut tag_spans = Vec::new();
    if let Some(tags) = &array_node.tags
        && tags.iter().any(ParseNodeArrayTag::is_true)
    {
        // Manual tags and/or automatic equation numbers. The eqn-num
        // spans trigger a CSS counter increment.
        for r in 0..nr {
            let rw = &body[r];
            let shift = rw.pos - offset;
            let mut tag_span = match &tags[r] {
                ParseNodeArrayTag::Bool(true) => {
                    make_span(vec!["eqn-num".to_owned()], vec![], Some(options), None)
                }
                ParseNodeArrayTag::Bool(false) => make_span(vec![], vec![], Some(options), None),
                ParseNodeArrayTag::Nodes(nodes) => {
                    let tag_expr = build_html::build_expression(
                        ctx,
                        nodes,
                        options,
                        build_html::GroupType::True,
                        (None, None),
                    )?;
                    make_span(vec![], tag_expr, Some(options), None)
                }
            };

            tag_span.depth = rw.depth;
            tag_span.height = rw.height;

            tag_spans.push(
                VListElemAndShift::builder()
                    .elem(tag_span.into())
                    .shift(shift)
                    .build(),
            );
        }
    }

    let mut c = 0;
    let mut col_descr_num = 0;
    while c < nc || col_descr_num < col_descriptions.len() {
        let mut first_separator = true;
        loop {
            let Some(separator) = col_descriptions
                .get(col_descr_num)
                .and_then(|spec| match spec {
                    AlignSpec::Separator { separator } => Some(separator.as_str()),
                    AlignSpec::Align { .. } => None,
                })
            else {
                break;
            };

            if !first_separator {
                col_sep = make_span(vec!["arraycolsep".to_owned()], vec![], None, None);
                col_sep.style.insert(
                    CssProperty::Width,
                    units::make_em(options.font_metrics().double_rule_sep),
                );
                cols.push(col_sep.into());
            }

            if separator == "|" || separator == ":" {
                let line_type = if separator == "|" { "solid" } else { "dashed" };
                let mut separator_span = make_span(
                    vec!["vertical-separator".to_owned()],
                    vec![],
                    Some(options),
                    None,
                );
                separator_span
                    .style
                    .insert(CssProperty::Height, units::make_em(total_height));
                separator_span.style.insert(
                    CssProperty::BorderRightWidth,
                    units::make_em(rule_thickness),
                );
                separator_span
                    .style
                    .insert(CssProperty::BorderRightStyle, line_type.to_owned());
                separator_span.style.insert(
                    CssProperty::Margin,
                    format!("0 {}", units::make_em(-rule_thickness / 2.0)),
                );
                let shift = total_height - offset;
                if shift != 0.0 {
                    separator_span
                        .style
                        .insert(CssProperty::VerticalAlign, units::make_em(-shift));
                }

                cols.push(separator_span.into());
            } else {
                return Err(ParseError::new(ParseErrorKind::InvalidSeparatorType {
                    separator: separator.to_owned(),
                }));
            }

            col_descr_num += 1;
            first_separator = false;
        }

        if c >= nc {
            c += 1;
            col_descr_num += 1;
            continue;
        }

        let col_descr = col_descriptions.get(col_descr_num);

        let mut sepwidth = if c > 0 || array_node.hskip_before_and_after.unwrap_or(false) {
            col_descr
                .and_then(|cd| match cd {
                    AlignSpec::Align { pregap, .. } => *pregap,
                    AlignSpec::Separator { .. } => None,
                })
                .unwrap_or(arraycolsep)
        } else {
            0.0
        };

        if sepwidth != 0.0 {
            col_sep = make_span(vec!["arraycolsep".to_owned()], vec![], None, None);
            col_sep
                .style
                .insert(CssProperty::Width, units::make_em(sepwidth));
            cols.push(col_sep.into());
        }

        let mut col_elements = Vec::new();
        for row in body.iter().take(nr) {
            if let Some(elem) = row.elements.get(c) {
                let shift = row.pos - offset;
                let mut elem = elem.clone();
                if let Some(height_mut) = elem.height_mut() {
                    *height_mut = row.height;
                }
                if let Some(depth_mut) = elem.depth_mut() {
                    *depth_mut = row.depth;
                }
                col_elements.push(VListElemAndShift::builder().elem(elem).shift(shift).build());
            }
        }

        let col_vlist = make_v_list(
            VListParam::IndividualShift {
                children: col_elements,
            },
            options,
        )?;

        let col_align = col_descr
            .and_then(|cd| match cd {
                AlignSpec::Align { align, .. } => Some(align.as_str()),
                AlignSpec::Separator { .. } => None,
            })
            .unwrap_or("c");

        let col_span = make_span(
            vec![format!("col-align-{col_align}")],
            vec![col_vlist.into()],
            None,
            None,
        );
        cols.push(col_span.into());

        if c < nc - 1 || array_node.hskip_before_and_after.unwrap_or(false) {
            sepwidth = col_descr
                .and_then(|cd| match cd {
                    AlignSpec::Align { postgap, .. } => *postgap,
                    AlignSpec::Separator { .. } => None,
                })
                .unwrap_or(arraycolsep);

            if sepwidth != 0.0 {
                col_sep = make_span(vec!["arraycolsep".to_owned()], vec![], None, None);
                col_sep
                    .style
                    .insert(CssProperty::Width, units::make_em(sepwidth));
                cols.push(col_sep.into());
            }
        }

        c += 1;
        col_descr_num += 1;
    }

    let mut mtable = make_span(vec!["mtable".to_owned()], cols, None, None);

    if !hlines.is_empty() {
        let line = make_line_span("hline", options, Some(rule_thickness));
        let dashes = make_line_span("hdashline", options, Some(rule_thickness));
        let mut v_list_elems = vec![
            VListElemAndShift::builder()
                .elem(mtable.into())
                .shift(0.0)
                .build(),
        ];

        while let Some(hline) = hlines.pop() {
            let line_shift = hline.pos - offset;
            let line_elem = if hline.is_dashed {
                dashes.clone()
            } else {
                line.clone()
            };
            v_list_elems.push(
                VListElemAndShift::builder()
                    .elem(line_elem.into())
                    .shift(line_shift)
                    .build(),
            );
        }

        mtable = make_v_list(
            VListParam::IndividualShift {
                children: v_list_elems,
            },
            options,
        )?;
    }

    if tag_spans.is_empty() {
        Ok(make_span(
            vec!["mord".to_owned()],
            vec![mtable.into()],
            Some(options),
            None,
        )
        .into())
    } else {
        let eqn_num_col = make_v_list(
            VListParam::IndividualShift {
                children: tag_spans,
            },
            options,
        )?;
        let tag_span = make_span(
            vec!["tag".to_owned()],
            vec![eqn_num_col.into()],
            Some(options),
            None,
        );
        Ok(make_fragment(&[mtable.into(), tag_span.into()]).into())
    }
}

fn mathml_builder(
    node: &AnyParseNode,
    options: &Options,
    ctx: &EngineContext,
) -> Result<MathDomNode, ParseError> {
    let AnyParseNode::Array(array_node) = node else {
        return Err(ParseError::new(ParseErrorKind::ExpectedNode {
            node: NodeType::Array,
        }));
    };

    let mut glue = MathNode::with_children(MathNodeType::Mtd, vec![]);
    glue.classes.push("mtr-glue".to_owned());
    let mut tag_cell = MathNode::with_children(MathNodeType::Mtd, vec![]);
    tag_cell.classes.push("mml-eqn-num".to_owned());

    let mut tbl = Vec::new();
    for (i, rw) in array_node.body.iter().enumerate() {
        let mut row = Vec::new();
        for group in rw {
            row.push(MathNode::with_children(
                MathNodeType::Mtd,
                vec![build_mathml::build_group(ctx, group, options)?],
            ));
        }

        if let Some(tags) = &array_node.tags
            && tags[i].is_true()
        {
            row.insert(0, glue.clone());
            row.push(glue.clone());
            if array_node.leqno.unwrap_or(false) {
                row.insert(0, tag_cell.clone());
            } else {
                row.push(tag_cell.clone());
            }
        }

        tbl.push(MathDomNode::Math(MathNode::with_children(
            MathNodeType::Mtr,
            row.into_iter().map(MathDomNode::Math).collect(),
        )));
    }

    let mut table = MathNode::with_children(MathNodeType::Mtable, tbl);

    // Row spacing. MathML takes a gap distance, and cell height already
    // tracks the content, so \arraystretch becomes extra gap. The 0.16
    // and 0.09 constants were found empirically; they approximate LaTeX
    // without content touching the \hlines.
    let gap = if array_node.arraystretch == 0.5 {
        // {smallmatrix}, {subarray}
        0.1
    } else {
        0.16 + array_node.arraystretch - 1.0
            + if array_node.add_jot.unwrap_or(false) {
                0.09
            } else {
                0.0
            }
    };
    table.set_attribute("rowspacing", units::make_em(gap));

    // MathML table lines go only between cells; edge lines need an
    // <menclose> wrapper.
    let mut menclose = String::new();
    let mut align = String::new();

    if let Some(cols) = &array_node.cols
        && !cols.is_empty()
    {
        let mut i_start = 0;

        if let Some(first_col) = cols.first()
            && matches!(first_col, AlignSpec::Separator { .. })
        {
            menclose.push_str("top ");
            i_start = 1;
        }

        if let Some(last_col) = cols.last()
            && matches!(last_col, AlignSpec::Separator { .. })
        {
            menclose.push_str("bottom ");
        }

        for col in cols.iter().skip(i_start) {
            if let AlignSpec::Align {
                align: col_align, ..
            } = col
            {
                align.push_str(col_align);
                align.push(' ');
            }
        }

        table.set_attribute("columnalign", align.trim().to_owned());
    }

    // Column spacing.
    match array_node.col_separation_type {
        Some(ColSeparationType::Align) => {
            if let Some(cols) = &array_node.cols {
                let mut spacing = String::new();
                for i in 1..cols.len() {
                    spacing.push_str(if i % 2 == 1 { "0em " } else { "1em " });
                }
                table.set_attribute("columnspacing", spacing.trim().to_owned());
            }
        }
        Some(ColSeparationType::Alignat | ColSeparationType::Gather) => {
            table.set_attribute("columnspacing", "0em");
        }
        Some(ColSeparationType::Small) => {
            table.set_attribute("columnspacing", "0.2778em");
        }
        Some(ColSeparationType::CD) => {
            table.set_attribute("columnspacing", "0.5em");
        }
        None => {
            table.set_attribute("columnspacing", "1em");
        }
    }

    // \hline and \hdashline
    let mut row_lines = String::new();
    let hlines = &array_node.h_lines_before_row;

    if hlines.first().is_some_and(|h| !h.is_empty()) {
        menclose.push_str("left ");
    }
    if hlines.last().is_some_and(|h| !h.is_empty()) {
        menclose.push_str("right ");
    }

    for hline in hlines.iter().take(hlines.len().saturating_sub(1)).skip(1) {
        row_lines.push_str(if hline.is_empty() {
            "none "
        } else if hline[0] {
            "dashed "
        } else {
            "solid "
        });
    }

    if row_lines.contains('s') || row_lines.contains('d') {
        table.set_attribute("rowlines", row_lines.trim().to_owned());
    }

    let mut result = MathDomNode::Math(table);

    if !menclose.trim().is_empty() {
        let mut enclosed = MathNode::with_children(MathNodeType::Menclose, vec![result]);
        enclosed.set_attribute("notation", menclose.trim().to_owned());
        result = MathDomNode::Math(enclosed);
    }

    if array_node.arraystretch < 1.0 {
        // A small array. Wrap in scriptstyle so the row gap is not too
        // large.
        let mut styled = MathNode::with_children(MathNodeType::Mstyle, vec![result]);
        styled.set_attribute("scriptlevel", "1");
        result = MathDomNode::Math(styled);
    }

    Ok(result)
}

/// Converts column-spec nodes (`l`, `c`, `r`, `|`, `:`) into
/// [`AlignSpec`]s, restricted to the characters in `allowed`.
fn parse_col_specs(args: &[AnyParseNode], allowed: &str) -> Result<Vec<AlignSpec>, ParseError> {
    // The argument is either an ordgroup wrapping symbol nodes or a bare
    // symbol node.
    let colalign: Vec<AnyParseNode> = if check_symbol_node_type(args.first()).is_some() {
        vec![args[0].clone()]
    } else if let Some(AnyParseNode::OrdGroup(ord)) = args.first() {
        ord.body.clone()
    } else {
        return Err(ParseError::new(ParseErrorKind::ExpectedGroupAs {
            context: "array column specification".to_owned(),
        }));
    };

    colalign
        .into_iter()
        .map(|node| {
            let Some(ca) = node.text() else {
                return Err(ParseError::new(ParseErrorKind::ExpectedColumnAlignment));
            };

            if ca == "|" || ca == ":" {
                if allowed.contains(ca) {
                    Ok(AlignSpec::Separator {
                        separator: ca.to_owned(),
                    })
                } else {
                    Err(ParseError::new(ParseErrorKind::UnknownColumnAlignment {
                        alignment: ca.to_owned(),
                    }))
                }
            } else if allowed.contains(ca) {
                Ok(AlignSpec::Align {
                    align: ca.to_owned(),
                    pregap: None,
                    postgap: None,
                })
            } else {
                Err(ParseError::new(ParseErrorKind::UnknownColumnAlignment {
                    alignment: ca.to_owned(),
                }))
            }
        })
        .collect()
}

/// Handler shared by `align`, `align*`, `aligned`, the `alignat` family
/// and `split`.
const ALIGNED_HANDLER: EnvHandler = |context, args, _opt_args| {
    if !context.env_name.contains("ed") {
        validate_ams_environment_context(&context)?;
    }

    let separation_type = if context.env_name.contains("at") {
        ColSeparationType::Alignat
    } else {
        ColSeparationType::Align
    };
    let is_split = context.env_name == "split";

    let mut res = parse_array(
        context.parser,
        ArrayParseConfig {
            cols: Some(Vec::new()),
            add_jot: Some(true),
            auto_tag: if is_split {
                None
            } else {
                get_auto_tag(&context.env_name)
            },
            empty_single_row: Some(true),
            col_separation_type: Some(separation_type),
            max_num_cols: is_split.then_some(2),
            leqno: Some(context.parser.settings.leqno),
            ..Default::default()
        },
        DISPLAY,
    )?;

    // Column count: {alignat} passes it as the first argument and every
    // row must fit; otherwise it is the widest row ("aligned" mode).
    //
    // Either way, an empty group {} is prepended to every second cell so
    // its leading operator parses as binary, per amsmath's
    // \start@aligned.
    let mut num_maths = 0;
    let mut num_cols = 0;
    let empty_group = AnyParseNode::OrdGroup(ParseNodeOrdGroup {
        mode: context.mode,
        loc: None,
        body: vec![],
        semisimple: None,
    });

    if let Some(AnyParseNode::OrdGroup(ord)) = args.first() {
        let mut num_str = String::new();
        for node in &ord.body {
            if let AnyParseNode::TextOrd(text) = node {
                num_str.push_str(&text.text);
            }
        }
        num_maths = num_str.parse::<usize>().map_err(|_| {
            ParseError::new(ParseErrorKind::InvalidValue {
                context: "column count".to_owned(),
                value: num_str.clone(),
            })
        })?;
        num_cols = num_maths * 2;
    }

    let is_aligned = num_cols == 0;

    for row in &mut res.body {
        for i in (1..row.len()).step_by(2) {
            // The ordgroup sits inside the cell's styling node
            if let AnyParseNode::Styling(styling) = &mut row[i]
                && let Some(AnyParseNode::OrdGroup(ordgroup)) = styling.body.first_mut()
            {
                ordgroup.body.insert(0, empty_group.clone());
            }
        }
        if !is_aligned {
            let cur_maths = row.len() / 2;
            if num_maths < cur_maths {
                return Err(ParseError::new(ParseErrorKind::TooManyMathInRow {
                    expected: num_maths,
                    actual: cur_maths,
                }));
            }
        } else if num_cols < row.len() {
            num_cols = row.len();
        }
    }

    // In aligned mode each pair of columns gets one \quad between them;
    // otherwise nothing.
    let mut new_cols = Vec::with_capacity(num_cols);
    for i in 0..num_cols {
        let mut align = "r";
        let mut pregap = 0.0;
        if i % 2 == 1 {
            align = "l";
        } else if i > 0 && is_aligned {
            pregap = 1.0;
        }
        new_cols.push(AlignSpec::Align {
            align: align.to_owned(),
            pregap: Some(pregap),
            postgap: Some(0.0),
        });
    }
    res.cols = Some(new_cols);
    res.col_separation_type = Some(if is_aligned {
        ColSeparationType::Align
    } else {
        ColSeparationType::Alignat
    });

    Ok(AnyParseNode::Array(res))
};

/// Registers the array environment family.
pub fn define_array(ctx: &mut EngineContext) {
    // {array} is part of LaTeX proper, defined in lttab.dtx. {darray} is
    // an {array} whose cells are set in \displaystyle, from nccmath.sty.
    ctx.define_environment(EnvDefSpec {
        node_type: NodeType::Array,
        names: &["array", "darray"],
        props: EnvProps {
            num_args: 1,
            ..Default::default()
        },
        handler: |context, args, _opt_args| {
            let cols = parse_col_specs(&args, "lcr|:")?;

            let res = parse_array(
                context.parser,
                ArrayParseConfig {
                    max_num_cols: Some(cols.len()),
                    cols: Some(cols),
                    // \@preamble in lttab.dtx
                    hskip_before_and_after: Some(true),
                    ..Default::default()
                },
                d_cell_style(&context.env_name),
            )?;

            Ok(AnyParseNode::Array(res))
        },
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    // The amsmath matrix environments build on {array}. The mathtools
    // starred versions take an optional [l|c|r] justification.
    ctx.define_environment(EnvDefSpec {
        node_type: NodeType::Array,
        names: &[
            "matrix", "pmatrix", "bmatrix", "Bmatrix", "vmatrix", "Vmatrix", "matrix*",
            "pmatrix*", "bmatrix*", "Bmatrix*", "vmatrix*", "Vmatrix*",
        ],
        props: EnvProps::default(),
        handler: |context, _args, _opt_args| {
            let delimiters = match context.env_name.trim_end_matches('*') {
                "pmatrix" => Some(("(", ")")),
                "bmatrix" => Some(("[", "]")),
                "Bmatrix" => Some(("\\{", "\\}")),
                "vmatrix" => Some(("|", "|")),
                "Vmatrix" => Some(("\\Vert", "\\Vert")),
                _ => None,
            };

            let mut col_align = "c".to_owned();
            if context.env_name.ends_with('*') {
                // mathtools starred variant; look for [l], [c] or [r].
                context.parser.gullet.consume_spaces()?;
                if context.parser.fetch()?.text == "[" {
                    context.parser.consume();
                    context.parser.gullet.consume_spaces()?;
                    col_align = context.parser.fetch()?.text.as_str().to_owned();
                    if !["l", "c", "r"].contains(&col_align.as_str()) {
                        return Err(ParseError::new(ParseErrorKind::ExpectedMatrixAlignment {
                            found: col_align,
                        }));
                    }
                    context.parser.consume();
                    context.parser.gullet.consume_spaces()?;
                    let next = context.parser.fetch()?;
                    if next.text != "]" {
                        return Err(ParseError::new(ParseErrorKind::ExpectedClosingBracket {
                            found: next.text.as_str().to_owned(),
                        }));
                    }
                    context.parser.consume();
                }
            }

            let payload = ArrayParseConfig {
                // \hskip -\arraycolsep in amsmath
                hskip_before_and_after: Some(false),
                ..Default::default()
            };
            let mut res = parse_array(context.parser, payload, d_cell_style(&context.env_name))?;

            // One alignment spec per column, all with the same alignment.
            let num_cols = res.body.iter().map(Vec::len).max().unwrap_or(0);
            res.cols = Some(
                repeat_n(
                    AlignSpec::Align {
                        align: col_align,
                        pregap: None,
                        postgap: None,
                    },
                    num_cols,
                )
                .collect(),
            );

            Ok(if let Some((left, right)) = delimiters {
                AnyParseNode::LeftRight(ParseNodeLeftRight {
                    mode: context.mode,
                    loc: None,
                    body: vec![AnyParseNode::Array(res)],
                    left: left.to_owned(),
                    right: right.to_owned(),
                    right_color: None,
                })
            } else {
                AnyParseNode::Array(res)
            })
        },
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_environment(EnvDefSpec {
        node_type: NodeType::Array,
        names: &["smallmatrix"],
        props: EnvProps::default(),
        handler: |context, _args, _opt_args| {
            let mut res = parse_array(
                context.parser,
                ArrayParseConfig {
                    arraystretch: Some(0.5),
                    ..Default::default()
                },
                SCRIPT,
            )?;
            res.col_separation_type = Some(ColSeparationType::Small);
            Ok(AnyParseNode::Array(res))
        },
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_environment(EnvDefSpec {
        node_type: NodeType::Array,
        names: &["subarray"],
        props: EnvProps {
            num_args: 1,
            ..Default::default()
        },
        handler: |context, args, _opt_args| {
            // {subarray} recognizes only "l" and "c", and one column
            let cols = parse_col_specs(&args, "lc")?;
            if cols.len() > 1 {
                return Err(ParseError::new(ParseErrorKind::SubarraySingleColumn));
            }

            let res = parse_array(
                context.parser,
                ArrayParseConfig {
                    cols: Some(cols),
                    hskip_before_and_after: Some(false),
                    arraystretch: Some(0.5),
                    ..Default::default()
                },
                SCRIPT,
            )?;

            if res.body.first().is_some_and(|row| row.len() > 1) {
                return Err(ParseError::new(ParseErrorKind::SubarraySingleColumn));
            }

            Ok(AnyParseNode::Array(res))
        },
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_environment(EnvDefSpec {
        node_type: NodeType::Array,
        names: &["cases", "dcases", "rcases", "drcases"],
        props: EnvProps::default(),
        handler: |context, _args, _opt_args| {
            let res = parse_array(
                context.parser,
                ArrayParseConfig {
                    arraystretch: Some(1.2),
                    cols: Some(vec![
                        AlignSpec::Align {
                            align: "l".to_owned(),
                            pregap: Some(0.0),
                            // 1em quad before the condition column
                            postgap: Some(1.0),
                        },
                        AlignSpec::Align {
                            align: "l".to_owned(),
                            pregap: Some(0.0),
                            postgap: Some(0.0),
                        },
                    ]),
                    ..Default::default()
                },
                d_cell_style(&context.env_name),
            )?;

            let (left, right) = if context.env_name.contains('r') {
                (".", "\\}")
            } else {
                ("\\{", ".")
            };

            Ok(AnyParseNode::LeftRight(ParseNodeLeftRight {
                mode: context.mode,
                loc: None,
                body: vec![AnyParseNode::Array(res)],
                left: left.to_owned(),
                right: right.to_owned(),
                right_color: None,
            }))
        },
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_environment(EnvDefSpec {
        node_type: NodeType::Array,
        names: &["gathered", "gather", "gather*"],
        props: EnvProps::default(),
        handler: |context, _args, _opt_args| {
            if ["gather", "gather*"].contains(&context.env_name.as_str()) {
                validate_ams_environment_context(&context)?;
            }

            let res = parse_array(
                context.parser,
                ArrayParseConfig {
                    cols: Some(vec![AlignSpec::Align {
                        align: "c".to_owned(),
                        pregap: None,
                        postgap: None,
                    }]),
                    add_jot: Some(true),
                    col_separation_type: Some(ColSeparationType::Gather),
                    auto_tag: get_auto_tag(&context.env_name),
                    empty_single_row: Some(true),
                    leqno: Some(context.parser.settings.leqno),
                    ..Default::default()
                },
                DISPLAY,
            )?;

            Ok(AnyParseNode::Array(res))
        },
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_environment(EnvDefSpec {
        node_type: NodeType::Array,
        names: &["align", "align*", "aligned", "split"],
        props: EnvProps::default(),
        handler: ALIGNED_HANDLER,
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_environment(EnvDefSpec {
        node_type: NodeType::Array,
        names: &["alignat", "alignat*", "alignedat"],
        props: EnvProps {
            num_args: 1,
            ..Default::default()
        },
        handler: ALIGNED_HANDLER,
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_environment(EnvDefSpec {
        node_type: NodeType::Array,
        names: &["equation", "equation*"],
        props: EnvProps::default(),
        handler: |context, _args, _opt_args| {
            validate_ams_environment_context(&context)?;

            let res = parse_array(
                context.parser,
                ArrayParseConfig {
                    auto_tag: get_auto_tag(&context.env_name),
                    empty_single_row: Some(true),
                    single_row: true,
                    max_num_cols: Some(1),
                    leqno: Some(context.parser.settings.leqno),
                    ..Default::default()
                },
                DISPLAY,
            )?;

            Ok(AnyParseNode::Array(res))
        },
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    ctx.define_environment(EnvDefSpec {
        node_type: NodeType::Array,
        names: &["CD"],
        props: EnvProps::default(),
        handler: |context, _args, _opt_args| {
            validate_ams_environment_context(&context)?;
            parse_cd(context.parser)
        },
        html_builder: Some(html_builder),
        mathml_builder: Some(mathml_builder),
    });

    // Catch \hline outside any array environment
    ctx.define_function(FunctionDefSpec {
        node_type: None,
        names: &["\\hline", "\\hdashline"],
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            allowed_in_math: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            Err(ParseError::new(ParseErrorKind::FunctionOnlyInArray {
                func: context.func_name,
            }))
        }),
        html_builder: None,
        mathml_builder: None,
    });
}
