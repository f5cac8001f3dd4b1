//! The recursive-descent parser.
//!
//! [`Parser`] pulls expanded tokens from the gullet one at a time and
//! builds the parse tree: expressions are sequences of atoms, atoms are a
//! base group with attached scripts, and bases are functions, symbols, or
//! braced subexpressions. Infix commands such as `\over` are rewritten
//! into their prefix forms after the surrounding expression is complete.

use core::iter;

use crate::context::EngineContext;
use crate::define_function::{FunctionContext, Spec};
use crate::font_metrics::supported_codepoint;
use crate::lexer::last_non_combining_mark_index;
use crate::macro_expander::{IMPLICIT_COMMANDS, MacroExpander};
use crate::macros::MacroContextInterface as _;
use crate::spacing_data::MeasurementOwned;
use crate::style::TEXT;
use crate::symbols::{Group, NonAtom};
use crate::types::{
    ArgType, BreakToken, ErrorLocationProvider, Mode, ParseError, ParseErrorKind, Settings,
    SourceRangeRef as _, Token,
};
use crate::unicode::{U_SUBS_AND_SUPS, UNICODE_SYMBOLS, get_accent_mapping, is_unicode_subscript};
use crate::units::valid_unit;
use phf::phf_set;

pub mod parse_node;
use parse_node::{AnyParseNode, NodeType, ParseNodeSize};
pub use parse_node::ParseNodeError;

/// Tokens that always terminate an expression.
const END_OF_EXPRESSION: phf::Set<&'static str> = phf_set! {
    "}",
    "\\endgroup",
    "\\end",
    "\\right",
    "&",
};

/// Brace-group nesting ceiling. Deeply nested input fails with a parse
/// error before it can exhaust the host stack.
const MAX_GROUP_NESTING: usize = 64;

#[inline]
fn wrap_ordgroup(mut nodes: Vec<AnyParseNode>, mode: Mode) -> AnyParseNode {
    if nodes.len() == 1
        && let AnyParseNode::OrdGroup(_) = nodes[0]
    {
        return nodes.remove(0);
    }
    AnyParseNode::OrdGroup(parse_node::ParseNodeOrdGroup {
        mode,
        loc: None,
        body: nodes,
        semisimple: None,
    })
}

/// Splits `"1.5 em"`-shaped text into a number and a two-letter unit.
#[inline]
fn parse_size_with_unit(s: &str) -> Option<(f64, String)> {
    let mut chars = s.chars().peekable();

    let mut sign = 1.0;
    if let Some(&c) = chars.peek() {
        if c == '+' {
            chars.next();
        } else if c == '-' {
            sign = -1.0;
            chars.next();
        }
    }

    while matches!(chars.peek(), Some(' ')) {
        chars.next();
    }

    let mut number_str = String::new();
    let mut saw_digit_before_dot = false;
    while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
        saw_digit_before_dot = true;
        number_str.push(chars.next()?);
    }
    if matches!(chars.peek(), Some('.')) {
        number_str.push('.');
        chars.next();
        let mut digit_after_dot = false;
        while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
            digit_after_dot = true;
            number_str.push(chars.next()?);
        }
        if !saw_digit_before_dot && !digit_after_dot {
            return None;
        }
    } else if !saw_digit_before_dot {
        return None;
    }

    while matches!(chars.peek(), Some(' ')) {
        chars.next();
    }

    let mut unit = String::new();
    for _ in 0..2 {
        let c = chars.next()?;
        if c.is_ascii_lowercase() {
            unit.push(c);
        } else {
            return None;
        }
    }

    let number_val: f64 = number_str.parse().ok()?;
    Some((sign * number_val, unit))
}

/// The parser proper: TeX's "stomach", fed by the gullet.
pub struct Parser<'a> {
    /// Current parsing mode.
    pub mode: Mode,
    /// Token source: macro expander over the lexer.
    pub gullet: MacroExpander<'a>,
    /// Render/parse configuration.
    pub settings: &'a Settings,
    /// Nesting depth of `\left`/`\right` pairs, for `\middle` validation.
    pub leftright_depth: usize,
    /// Single cached lookahead token.
    pub next_token: Option<Token>,
    /// Function, symbol, and environment registries.
    pub ctx: &'a EngineContext,
    /// Current brace-group nesting depth.
    group_nesting_depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `input`, starting in math mode.
    #[must_use]
    pub fn new(input: &'a str, settings: &'a Settings, ctx: &'a EngineContext) -> Self {
        let mode = Mode::Math;
        let gullet = MacroExpander::new(input, settings, mode, ctx);

        Self {
            mode,
            gullet,
            settings,
            leftright_depth: 0,
            next_token: None,
            ctx,
            group_nesting_depth: 0,
        }
    }

    /// Checks that the current token is `text`, optionally consuming it.
    pub fn expect(&mut self, text: &str, consume: bool) -> Result<(), ParseError> {
        let token = self.fetch()?;
        if token.text != text {
            return Err(ParseError::with_token(
                ParseErrorKind::ExpectedToken {
                    expected: text.to_owned(),
                    found: token.text.to_string(),
                },
                token,
            ));
        }
        if consume {
            self.consume();
        }
        Ok(())
    }

    /// Discards the lookahead token.
    pub fn consume(&mut self) {
        self.next_token = None;
    }

    /// The current lookahead token, expanding a new one if needed.
    pub fn fetch(&mut self) -> Result<&Token, ParseError> {
        match &mut self.next_token {
            Some(next_token) => Ok(next_token),
            next_token => {
                let token = self.gullet.expand_next_token()?;
                Ok(next_token.get_or_insert(token))
            }
        }
    }

    /// Switches between math and text mode, in lockstep with the gullet.
    pub const fn switch_mode(&mut self, new_mode: Mode) {
        self.mode = new_mode;
        self.gullet.switch_mode(new_mode);
    }

    /// Parses the whole input into a list of top-level nodes.
    ///
    /// Opens a namespace group around the expression (unless
    /// `global_group` is set), requires the input to end cleanly at EOF,
    /// and unwinds any groups left open by a failing parse.
    pub fn parse(&mut self) -> Result<Vec<AnyParseNode>, ParseError> {
        if !self.settings.global_group {
            // LaTeX opens a group for every $...$ and \[...\].
            self.gullet.begin_group();
        }

        let body = match self.parse_expression(false, None) {
            Ok(b) => b,
            Err(e) => {
                self.gullet.end_all_groups();
                return Err(e);
            }
        };

        if let Err(e) = self.expect("EOF", true) {
            self.gullet.end_all_groups();
            return Err(e);
        }

        if !self.settings.global_group
            && let Err(e) = self.gullet.end_group()
        {
            self.gullet.end_all_groups();
            return Err(e);
        }

        self.gullet.end_all_groups();
        Ok(body)
    }

    /// Parses a sequence of atoms until an end condition.
    ///
    /// Stops at EOF, an end-of-expression token, the given break token,
    /// or (when `break_on_infix` is set) the next infix command. Infix
    /// nodes found in the result are rewritten into their prefix form;
    /// text mode additionally forms dash and quote ligatures.
    pub fn parse_expression(
        &mut self,
        break_on_infix: bool,
        break_on_token_text: Option<&BreakToken>,
    ) -> Result<Vec<AnyParseNode>, ParseError> {
        let mut body: Vec<AnyParseNode> = Vec::new();

        loop {
            // Spaces carry no meaning in math mode.
            if self.mode == Mode::Math {
                self.consume_spaces()?;
            }

            let lex_text = self.fetch()?.text.to_string();

            if END_OF_EXPRESSION.contains(lex_text.as_str()) {
                break;
            }

            if let Some(break_tok) = break_on_token_text
                && lex_text == break_tok.as_ref()
            {
                break;
            }

            if break_on_infix
                && let Some(func) = self.ctx.functions.get(&lex_text)
                && func.infix
            {
                break;
            }

            if let Some(atom) = self.parse_atom(break_on_token_text)? {
                // Internal nodes never appear in the tree.
                if let AnyParseNode::Internal(_) = atom {
                    continue;
                }
                body.push(atom);
            } else {
                break;
            }
        }

        if self.mode == Mode::Text {
            form_ligatures(&mut body);
        }

        self.handle_infix_nodes(body)
    }

    /// Skips space tokens, leaving a non-space token as the lookahead.
    pub fn consume_spaces(&mut self) -> Result<(), ParseError> {
        while self.fetch()?.text == " " {
            self.consume();
        }
        Ok(())
    }

    /// Parses a base group and the chain of scripts attached to it.
    fn parse_atom(
        &mut self,
        break_on_token_text: Option<&BreakToken>,
    ) -> Result<Option<AnyParseNode>, ParseError> {
        let mut base_opt = self.parse_group("atom", break_on_token_text)?;

        if let Some(base) = &base_opt
            && matches!(base, AnyParseNode::Internal(_))
        {
            // \relax and friends take no scripts; a following script
            // starts a fresh atom with an empty base.
            return Ok(base_opt);
        }

        if self.mode == Mode::Text {
            return Ok(base_opt);
        }

        let mut superscript = None;
        let mut subscript = None;

        loop {
            self.consume_spaces()?;
            let lex = self.fetch()?.clone();
            match lex.text.as_str() {
                "\\limits" | "\\nolimits" => {
                    let limits = lex.text == "\\limits";
                    if let Some(AnyParseNode::Op(base)) = &mut base_opt {
                        *base.limits_mut() = limits;
                        *base.always_handle_sup_sub_mut() = Some(true);
                    } else if let Some(AnyParseNode::OperatorName(base)) = &mut base_opt
                        && base.always_handle_sup_sub
                    {
                        base.limits = limits;
                    } else {
                        return Err(ParseError::with_token(
                            ParseErrorKind::LimitsMustFollowBase,
                            &lex,
                        ));
                    }
                    self.consume();
                }
                "^" => {
                    if superscript.is_some() {
                        return Err(ParseError::with_token(
                            ParseErrorKind::DoubleSuperscript,
                            &lex,
                        ));
                    }
                    superscript = Some(self.handle_sup_subscript("superscript")?);
                }
                "_" => {
                    if subscript.is_some() {
                        return Err(ParseError::with_token(ParseErrorKind::DoubleSubscript, &lex));
                    }
                    subscript = Some(self.handle_sup_subscript("subscript")?);
                }
                "'" => {
                    if superscript.is_some() {
                        return Err(ParseError::with_token(
                            ParseErrorKind::DoubleSuperscript,
                            &lex,
                        ));
                    }
                    let mut n = 1;
                    self.consume();
                    while self.fetch()?.text == "'" {
                        n += 1;
                        self.consume();
                    }
                    let mut primes = iter::repeat_n(
                        AnyParseNode::TextOrd(parse_node::ParseNodeTextOrd {
                            text: "\\prime".into(),
                            mode: self.mode,
                            loc: None,
                        }),
                        n,
                    )
                    .collect::<Vec<AnyParseNode>>();
                    if self.fetch()?.text == "^" {
                        primes.push(self.handle_sup_subscript("superscript")?);
                    }
                    superscript = Some(AnyParseNode::OrdGroup(parse_node::ParseNodeOrdGroup {
                        mode: self.mode,
                        loc: None,
                        body: primes,
                        semisimple: None,
                    }));
                }
                text => {
                    if let Some(ch) = text.chars().next()
                        && let Some(&mapped) = U_SUBS_AND_SUPS.get(&ch)
                    {
                        // A run of Unicode script characters becomes one
                        // script group, parsed as a separate job.
                        let is_sub = is_unicode_subscript(ch);
                        let mut subsup_tokens = vec![Token::new(mapped, None)];
                        self.consume();
                        loop {
                            let token = self.fetch()?.text.to_string();
                            if let Some(c) = token.chars().next()
                                && let Some(&mapped) = U_SUBS_AND_SUPS.get(&c)
                                && is_sub == is_unicode_subscript(c)
                            {
                                subsup_tokens.push(Token::new(mapped, None));
                                self.consume();
                            } else {
                                break;
                            }
                        }
                        subsup_tokens.reverse();
                        let body = self.subparse(subsup_tokens)?;
                        let group = AnyParseNode::OrdGroup(parse_node::ParseNodeOrdGroup {
                            mode: Mode::Math,
                            loc: None,
                            body,
                            semisimple: None,
                        });
                        if is_sub {
                            subscript = Some(group);
                        } else {
                            superscript = Some(group);
                        }
                    } else {
                        break;
                    }
                }
            }
        }

        if superscript.is_some() || subscript.is_some() {
            return Ok(Some(AnyParseNode::SupSub(parse_node::ParseNodeSupSub {
                base: base_opt.map(Box::new),
                sup: superscript.map(Box::new),
                sub: subscript.map(Box::new),
                mode: self.mode,
                loc: None,
            })));
        }

        Ok(base_opt)
    }

    /// Rewrites an infix command (`\over`, `\choose`, `\above`) into a
    /// call of its prefix replacement, with the nodes before it as the
    /// first argument and the nodes after it as the last.
    fn handle_infix_nodes(
        &mut self,
        mut body: Vec<AnyParseNode>,
    ) -> Result<Vec<AnyParseNode>, ParseError> {
        let mut infix_pos: Option<usize> = None;
        let mut func_name: Option<String> = None;
        for (i, node) in body.iter().enumerate() {
            if let AnyParseNode::Infix(n) = node {
                if infix_pos.is_some() {
                    return Err(ParseError::with_token(
                        ParseErrorKind::MultipleInfixOperators,
                        &n.token,
                    ));
                }
                infix_pos = Some(i);
                func_name = Some(n.replace_with.clone());
            }
        }

        let (Some(over_idx), Some(func_name)) = (infix_pos, func_name) else {
            return Ok(body);
        };

        let mut denom_body = body.split_off(over_idx);
        let infix_node = denom_body.remove(0);
        let numer_body = body;

        let numer_node = wrap_ordgroup(numer_body, self.mode);
        let denom_node = wrap_ordgroup(denom_body, self.mode);

        let node = if func_name == "\\\\abovefrac" {
            self.call_function(
                &func_name,
                vec![numer_node, infix_node, denom_node],
                vec![],
                None,
                None,
            )?
        } else {
            self.call_function(&func_name, vec![numer_node, denom_node], vec![], None, None)?
        };
        Ok(vec![node])
    }

    /// Parses a run of characters validated incrementally by `validator`,
    /// returning them as one combined token.
    fn parse_regex_group<F>(
        &mut self,
        mode_name: &str,
        mut validator: F,
    ) -> Result<Token, ParseError>
    where
        F: FnMut(&str) -> bool,
    {
        let first_token = self.fetch()?.clone();
        let mut last_token = first_token.clone();

        let mut str = String::new();

        loop {
            let next_token = self.fetch()?;
            if next_token.text == "EOF" {
                break;
            }
            let test_str = format!("{}{}", str, next_token.text);
            if !validator(&test_str) {
                break;
            }
            last_token = next_token.clone();
            str = test_str;
            self.consume();
        }

        if str.is_empty() {
            return Err(ParseError::with_token(
                ParseErrorKind::InvalidValue {
                    context: mode_name.to_owned(),
                    value: first_token.text.to_string(),
                },
                &first_token,
            ));
        }

        Ok(first_token
            .clone()
            .range(last_token, str.clone())
            .unwrap_or_else(|| Token::new(str, None)))
    }

    /// Scans one argument and concatenates its token texts into a single
    /// token.
    fn parse_string_group(&mut self, optional: bool) -> Result<Option<Token>, ParseError> {
        let Some(mut arg_token) = self.gullet.scan_argument(optional)? else {
            return Ok(None);
        };
        let mut s = String::new();
        loop {
            let next = self.fetch()?.clone();
            if next.text == "EOF" {
                break;
            }
            s.push_str(next.text.as_str());
            self.consume();
        }
        // The EOF marker closing the argument.
        self.consume();
        arg_token.set_text(s);
        Ok(Some(arg_token))
    }

    /// Parses a color argument into a color-token node.
    fn parse_color_group(&mut self, optional: bool) -> Result<Option<AnyParseNode>, ParseError> {
        let Some(tok) = self.parse_string_group(optional)? else {
            return Ok(None);
        };
        let mut text = tok.text.to_string();
        let is_letters = !text.is_empty() && text.chars().all(|c| c.is_ascii_alphabetic());
        let is_hash3 = text.starts_with('#')
            && text.len() == 4
            && text.chars().skip(1).all(|c| c.is_ascii_hexdigit());
        let is_hash6 = text.starts_with('#')
            && text.len() == 7
            && text.chars().skip(1).all(|c| c.is_ascii_hexdigit());
        let is_6hex = text.len() == 6 && text.chars().all(|c| c.is_ascii_hexdigit());
        if !(is_letters || is_hash3 || is_hash6 || is_6hex) {
            return Err(ParseError::with_token(
                ParseErrorKind::InvalidColor { color: text },
                &tok,
            ));
        }
        if is_6hex {
            text = format!("#{text}");
        }
        Ok(Some(AnyParseNode::ColorToken(
            parse_node::ParseNodeColorToken {
                mode: self.mode,
                loc: None,
                color: text,
            },
        )))
    }

    /// Parses a size argument.
    ///
    /// Required size arguments may appear without braces (`\kern1em`), in
    /// which case the characters are validated incrementally; an empty
    /// required argument yields a blank `0pt` size.
    pub fn parse_size_group(
        &mut self,
        optional: bool,
    ) -> Result<Option<ParseNodeSize>, ParseError> {
        self.gullet.consume_spaces()?;
        let res = if !optional && self.gullet.future_mut()?.text != "{" {
            Some(self.parse_regex_group("size", |s| {
                // Prefix of: optional sign, spaces, decimal number,
                // spaces, up to two lowercase unit letters.
                let t = s.trim();
                let rest = if t.starts_with('+') || t.starts_with('-') {
                    &t[1..]
                } else {
                    t
                };
                let rest = rest.trim_start();
                if rest.is_empty() {
                    return true;
                }
                let bytes = rest.as_bytes();
                let mut i = 0;
                let mut saw_digit = false;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    saw_digit = true;
                    i += 1;
                }
                if i < bytes.len() && bytes[i] == b'.' {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                } else if !saw_digit {
                    return false;
                }
                let after_num = rest[i..].trim_start();
                let mut j = 0;
                while j < 2 && j < after_num.len() && after_num.as_bytes()[j].is_ascii_lowercase() {
                    j += 1;
                }
                after_num[j..].trim().is_empty()
            })?)
        } else {
            self.parse_string_group(optional)?
        };

        let Some(mut res) = res else { return Ok(None) };
        let is_blank = if !optional && res.text.is_empty() {
            res.set_text("0pt");
            true
        } else {
            false
        };

        let Some((number, unit)) = parse_size_with_unit(res.text.as_str()) else {
            return Err(ParseError::with_token(
                ParseErrorKind::InvalidSize {
                    size: res.text.to_string(),
                },
                &res,
            ));
        };

        let data = MeasurementOwned { number, unit };
        if !valid_unit(&data) {
            return Err(ParseError::new(ParseErrorKind::InvalidUnit {
                unit: data.unit,
            }));
        }
        Ok(Some(ParseNodeSize {
            mode: self.mode,
            loc: None,
            value: data,
            is_blank,
        }))
    }

    /// Parses a URL argument, undoing backslash escapes of special
    /// characters.
    fn parse_url_group(&mut self, optional: bool) -> Result<Option<AnyParseNode>, ParseError> {
        // hyperref semantics: % loses its comment meaning, ~ its active
        // meaning, for the duration of the argument.
        self.gullet.set_catcode('%', 13);
        self.gullet.set_catcode('~', 12);

        let res = self.parse_string_group(optional);

        self.gullet.set_catcode('%', 14);
        self.gullet.set_catcode('~', 13);

        let Some(tok) = res? else { return Ok(None) };
        let mut url = String::new();
        let mut chars = tok.text.as_str().chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\\'
                && let Some(&n) = chars.peek()
                && matches!(n, '#' | '$' | '%' | '&' | '~' | '_' | '^' | '{' | '}')
            {
                url.push(n);
                chars.next();
                continue;
            }
            url.push(c);
        }
        Ok(Some(AnyParseNode::Url(parse_node::ParseNodeUrl {
            mode: self.mode,
            loc: None,
            url,
        })))
    }

    /// Parses an argument as a full expression, optionally in a different
    /// mode, wrapped in an ordgroup.
    fn parse_argument_group(
        &mut self,
        optional: bool,
        mode: Option<Mode>,
    ) -> Result<Option<AnyParseNode>, ParseError> {
        let Some(arg_token) = self.gullet.scan_argument(optional)? else {
            return Ok(None);
        };
        let outer_mode = self.mode;
        if let Some(m) = mode {
            self.switch_mode(m);
        }
        self.gullet.begin_group();
        let expression = self.parse_expression(false, Some(&BreakToken::Eof))?;
        self.expect("EOF", true)?;
        self.gullet.end_group()?;
        if mode.is_some() {
            self.switch_mode(outer_mode);
        }

        Ok(Some(AnyParseNode::OrdGroup(parse_node::ParseNodeOrdGroup {
            mode: self.mode,
            loc: arg_token.loc().cloned(),
            body: expression,
            semisimple: None,
        })))
    }

    /// Parses one argument of the given type.
    fn parse_group_of_type(
        &mut self,
        name: &str,
        arg_type: Option<&ArgType>,
        optional: bool,
    ) -> Result<Option<AnyParseNode>, ParseError> {
        match arg_type {
            Some(ArgType::Color) => self.parse_color_group(optional),
            Some(ArgType::Size) => {
                let size = self.parse_size_group(optional)?;
                Ok(size.map(AnyParseNode::Size))
            }
            Some(ArgType::Url) => self.parse_url_group(optional),
            Some(ArgType::Mode(mode)) => self.parse_argument_group(optional, Some(*mode)),
            Some(ArgType::Hbox) => self
                .parse_argument_group(optional, Some(Mode::Text))?
                .map_or(Ok(None), |group| {
                    Ok(Some(AnyParseNode::Styling(parse_node::ParseNodeStyling {
                        mode: group.mode(),
                        loc: None,
                        style: TEXT,
                        body: vec![group],
                    })))
                }),
            Some(ArgType::Raw) => {
                let token = self.parse_string_group(optional)?;
                Ok(token.map(|t| {
                    AnyParseNode::Raw(parse_node::ParseNodeRaw {
                        mode: Mode::Text,
                        loc: None,
                        string: t.text.to_string(),
                    })
                }))
            }
            Some(ArgType::Primitive) => {
                if optional {
                    return Err(ParseError::new(
                        ParseErrorKind::PrimitiveArgumentCannotBeOptional,
                    ));
                }
                if let Some(group) = self.parse_group(name, None)? {
                    Ok(Some(group))
                } else {
                    let token = self.fetch()?;
                    Err(ParseError::with_token(
                        ParseErrorKind::ExpectedGroupAs {
                            context: name.to_owned(),
                        },
                        token,
                    ))
                }
            }
            Some(ArgType::Original) | None => self.parse_argument_group(optional, None),
        }
    }

    /// Parses a group: a braced subexpression, a function call, or a
    /// single symbol.
    fn parse_group(
        &mut self,
        name: &str,
        break_on_token_text: Option<&BreakToken>,
    ) -> Result<Option<AnyParseNode>, ParseError> {
        let first_token = self.fetch()?.clone();
        let text = first_token.text.to_string();
        if text == "{" || text == "\\begingroup" {
            self.consume();
            let break_token = if text == "{" {
                BreakToken::RightBrace
            } else {
                BreakToken::EndGroup
            };

            if self.group_nesting_depth >= MAX_GROUP_NESTING {
                return Err(ParseError::with_token(
                    ParseErrorKind::GroupNestingTooDeep {
                        max: MAX_GROUP_NESTING,
                    },
                    &first_token,
                ));
            }
            self.group_nesting_depth += 1;
            self.gullet.begin_group();
            let expression = self.parse_expression(false, Some(&break_token));
            self.group_nesting_depth -= 1;
            let expression = expression?;
            let last_token = self.fetch()?.clone();
            self.expect(break_token.as_ref(), true)?;
            self.gullet.end_group()?;

            Ok(Some(AnyParseNode::OrdGroup(parse_node::ParseNodeOrdGroup {
                mode: self.mode,
                loc: first_token.loc().range_ref(last_token.loc()),
                body: expression,
                // \begingroup...\endgroup groups are transparent for
                // spacing purposes.
                semisimple: (text == "\\begingroup").then_some(true),
            })))
        } else {
            let result = self.parse_function(break_on_token_text, Some(name))?;
            let mut result = if result.is_some() {
                result
            } else {
                self.parse_symbol()?
            };

            if result.is_none() && text.starts_with('\\') && !IMPLICIT_COMMANDS.contains(text.as_str())
            {
                if self.settings.throw_on_error {
                    return Err(ParseError::with_token(
                        ParseErrorKind::UndefinedControlSequence { name: text.clone() },
                        &first_token,
                    ));
                }
                result = Some(self.format_unsupported_cmd(&text).into());
                self.consume();
            }

            Ok(result)
        }
    }

    /// An unsupported command rendered as literal text in the error
    /// color, for non-throwing mode.
    #[must_use]
    pub fn format_unsupported_cmd(&self, text: &str) -> parse_node::ParseNodeColor {
        let textord_array: Vec<AnyParseNode> = text
            .chars()
            .map(|ch| {
                AnyParseNode::TextOrd(parse_node::ParseNodeTextOrd {
                    mode: Mode::Text,
                    loc: None,
                    text: ch.to_string(),
                })
            })
            .collect();
        let text_node = AnyParseNode::Text(parse_node::ParseNodeText {
            mode: self.mode,
            loc: None,
            body: textord_array,
            font: None,
        });
        parse_node::ParseNodeColor {
            mode: self.mode,
            loc: None,
            color: self.settings.error_color.clone(),
            body: vec![text_node],
        }
    }

    /// Parses a function call if the current token names one.
    pub fn parse_function(
        &mut self,
        break_on_token_text: Option<&BreakToken>,
        name: Option<&str>,
    ) -> Result<Option<AnyParseNode>, ParseError> {
        let token = self.fetch()?.clone();
        let func = token.text.to_string();
        let Some(func_data) = self.ctx.functions.get(&func) else {
            return Ok(None);
        };
        self.consume();

        if let Some(name) = name
            && name != "atom"
            && !func_data.allowed_in_argument
        {
            return Err(ParseError::with_token(
                ParseErrorKind::FunctionMissingArguments {
                    func: func.clone(),
                    context: name.to_owned(),
                },
                &token,
            ));
        } else if self.mode == Mode::Text && !func_data.allowed_in_text {
            return Err(ParseError::with_token(
                ParseErrorKind::FunctionDisallowedInMode {
                    func: func.clone(),
                    mode: Mode::Text,
                },
                &token,
            ));
        } else if self.mode == Mode::Math && !func_data.allowed_in_math {
            return Err(ParseError::with_token(
                ParseErrorKind::FunctionDisallowedInMode {
                    func: func.clone(),
                    mode: Mode::Math,
                },
                &token,
            ));
        }

        let (args, opt_args) = self.parse_arguments(&func, func_data)?;
        let node = self.call_function(&func, args, opt_args, Some(&token), break_on_token_text)?;
        Ok(Some(node))
    }

    /// Parses a symbol at the current token, including `\verb`, combining
    /// accents, and precomposed Unicode characters.
    fn parse_symbol(&mut self) -> Result<Option<AnyParseNode>, ParseError> {
        let nucleus = self.fetch()?.clone();
        let mut text = nucleus.text.to_string();

        if let Some(arg) = text.strip_prefix("\\verb")
            && arg.chars().next().is_some_and(|c| !c.is_ascii_alphabetic())
        {
            self.consume();
            let star = arg.starts_with('*');
            let body = if star { &arg[1..] } else { arg };

            // The lexer guarantees matching delimiters.
            if body.len() < 2 || body.chars().next() != body.chars().last() {
                return Err(ParseError::with_token(
                    ParseErrorKind::VerbAssertionFailed,
                    &nucleus,
                ));
            }

            let inner_body = &body[1..body.len() - 1];
            return Ok(Some(AnyParseNode::Verb(parse_node::ParseNodeVerb {
                mode: Mode::Text,
                loc: nucleus.loc,
                body: inner_body.to_owned(),
                star,
            })));
        }

        // Decompose precomposed characters the symbol table doesn't carry,
        // so their combining marks go through the accent machinery.
        if let Some(first_char) = text.chars().next()
            && let Some(mapped) = UNICODE_SYMBOLS.get(&first_char)
            && self
                .ctx
                .symbols
                .get(self.mode, &first_char.to_string())
                .is_none()
        {
            if self.mode == Mode::Math {
                self.settings.report_nonstrict(
                    "unicodeTextInMathMode",
                    &format!("Accented Unicode text character \"{first_char}\" used in math mode"),
                    nucleus
                        .loc
                        .as_ref()
                        .map(|loc| loc as &dyn ErrorLocationProvider),
                )?;
            }
            let rest: String = text.chars().skip(1).collect();
            text = format!("{mapped}{rest}");
        }

        // Split off trailing combining marks.
        let matched = last_non_combining_mark_index(&text).map(|strip_index| {
            let accents = text.split_off(strip_index);
            if text == "i" {
                "\u{0131}".clone_into(&mut text); // dotless i under accents
            } else if text == "j" {
                "\u{0237}".clone_into(&mut text);
            }
            accents
        });

        let mut symbol_node = if let Some(info) = self.ctx.symbols.get(self.mode, &text) {
            match info.group {
                Group::Atom(atom) => AnyParseNode::Atom(parse_node::ParseNodeAtom {
                    family: atom,
                    mode: self.mode,
                    loc: nucleus.loc.clone(),
                    text: text.clone(),
                }),
                Group::NonAtom(na) => match na {
                    NonAtom::MathOrd => AnyParseNode::MathOrd(parse_node::ParseNodeMathOrd {
                        mode: self.mode,
                        loc: nucleus.loc.clone(),
                        text: text.clone(),
                    }),
                    NonAtom::TextOrd => AnyParseNode::TextOrd(parse_node::ParseNodeTextOrd {
                        mode: self.mode,
                        loc: nucleus.loc.clone(),
                        text: text.clone(),
                    }),
                    NonAtom::Spacing => AnyParseNode::Spacing(parse_node::ParseNodeSpacing {
                        mode: self.mode,
                        loc: nucleus.loc.clone(),
                        text: text.clone(),
                    }),
                    NonAtom::AccentToken => {
                        AnyParseNode::AccentToken(parse_node::ParseNodeAccentToken {
                            mode: self.mode,
                            loc: nucleus.loc.clone(),
                            text: text.clone(),
                        })
                    }
                    NonAtom::OpToken => AnyParseNode::OpToken(parse_node::ParseNodeOpToken {
                        mode: self.mode,
                        loc: nucleus.loc.clone(),
                        text: text.clone(),
                    }),
                },
            }
        } else if let Some(first_char) = text.chars().next()
            && first_char >= '\u{80}'
        {
            // Unknown non-ASCII character: report per strict settings and
            // fall back to a text ord.
            if !supported_codepoint(first_char as u32) {
                self.settings.report_nonstrict(
                    "unknownSymbol",
                    &format!(
                        "Unrecognized Unicode character \"{text}\" (0x{:X})",
                        first_char as u32
                    ),
                    nucleus
                        .loc
                        .as_ref()
                        .map(|loc| loc as &dyn ErrorLocationProvider),
                )?;
            } else if self.mode == Mode::Math {
                self.settings.report_nonstrict(
                    "unicodeTextInMathMode",
                    &format!("Unicode text character \"{text}\" used in math mode"),
                    nucleus
                        .loc
                        .as_ref()
                        .map(|loc| loc as &dyn ErrorLocationProvider),
                )?;
            }
            AnyParseNode::TextOrd(parse_node::ParseNodeTextOrd {
                mode: Mode::Text,
                loc: nucleus.loc.clone(),
                text: text.clone(),
            })
        } else {
            // EOF, ^, _, {, }, and other non-symbols.
            return Ok(None);
        };

        self.consume();

        // Wrap the base in accent nodes, innermost mark first.
        if let Some(accent_chars) = matched {
            for ch in accent_chars.chars() {
                let Some(accent_mapping) = get_accent_mapping(ch) else {
                    return Err(ParseError::with_token(
                        ParseErrorKind::UnknownAccent {
                            accent: ch.to_string(),
                        },
                        &nucleus,
                    ));
                };
                let command = if self.mode == Mode::Math {
                    accent_mapping.math.unwrap_or(accent_mapping.text)
                } else {
                    accent_mapping.text
                };
                if command.is_empty() {
                    return Err(ParseError::with_token(
                        ParseErrorKind::UnsupportedAccentInMode {
                            accent: ch.to_string(),
                            mode: self.mode,
                        },
                        &nucleus,
                    ));
                }
                symbol_node = AnyParseNode::Accent(Box::new(parse_node::ParseNodeAccent {
                    mode: self.mode,
                    loc: nucleus.loc.clone(),
                    label: command.to_owned(),
                    is_stretchy: Some(false),
                    is_shifty: Some(true),
                    base: symbol_node,
                }));
            }
        }

        Ok(Some(symbol_node))
    }

    /// Parses a separate token list as its own job. Tokens are given in
    /// reverse order, as in a macro expansion.
    pub fn subparse(&mut self, tokens: Vec<Token>) -> Result<Vec<AnyParseNode>, ParseError> {
        let old_token = self.next_token.take();

        // Terminate the job with an excess brace.
        self.gullet.push_token(Token::new("}", None));
        self.gullet.push_tokens(tokens);
        let parse = self.parse_expression(false, None)?;
        self.expect("}", true)?;

        self.next_token = old_token;
        Ok(parse)
    }

    /// Parses the group following a script character.
    pub fn handle_sup_subscript(&mut self, name: &str) -> Result<AnyParseNode, ParseError> {
        let symbol_token = self.fetch()?.clone();
        let symbol = symbol_token.text.to_string();
        self.consume();
        self.consume_spaces()?;

        // Skip internal nodes such as \relax.
        let mut group = self.parse_group(name, None)?;
        while let Some(AnyParseNode::Internal(_)) = group {
            group = self.parse_group(name, None)?;
        }

        group.map_or_else(
            || {
                Err(ParseError::with_token(
                    ParseErrorKind::ExpectedGroupAfterSymbol { symbol },
                    &symbol_token,
                ))
            },
            Ok,
        )
    }

    /// Invokes the handler registered for `name`.
    pub fn call_function(
        &mut self,
        name: &str,
        args: Vec<AnyParseNode>,
        opt_args: Vec<Option<AnyParseNode>>,
        token: Option<&Token>,
        break_on_token_text: Option<&BreakToken>,
    ) -> Result<AnyParseNode, ParseError> {
        if let Some(func) = self.ctx.functions.get(name)
            && let Some(handler) = func.handler
        {
            let context = FunctionContext {
                func_name: name.to_owned(),
                parser: self,
                token,
                break_on_token_text,
            };
            return handler(context, args, opt_args);
        }

        Err(ParseError::new(ParseErrorKind::NoFunctionHandler {
            name: name.to_owned(),
        }))
    }

    /// Parses the required and optional arguments of a function or
    /// environment.
    pub fn parse_arguments(
        &mut self,
        func: &str,
        func_data: &dyn Spec,
    ) -> Result<(Vec<AnyParseNode>, Vec<Option<AnyParseNode>>), ParseError> {
        let total_args = func_data.num_args() + func_data.num_optional_args();
        if total_args == 0 {
            return Ok((Vec::new(), Vec::new()));
        }

        let mut args = Vec::new();
        let mut opt_args = Vec::new();

        for i in 0..total_args {
            let arg_type = func_data.arg_types().and_then(|v| v.get(i));
            let is_optional = i < func_data.num_optional_args();

            // Primitives take primitive arguments; \sqrt's radicand does
            // too when no index was given.
            let arg_type = if (func_data.primitive() && arg_type.is_none())
                || (func_data.node_type() == Some(&NodeType::Sqrt)
                    && i == 1
                    && opt_args
                        .first()
                        .is_none_or(|opt: &Option<AnyParseNode>| opt.is_none()))
            {
                Some(ArgType::Primitive)
            } else {
                arg_type.copied()
            };

            let arg = self.parse_group_of_type(
                &format!("argument to '{func}'"),
                arg_type.as_ref(),
                is_optional,
            )?;

            if is_optional {
                opt_args.push(arg);
            } else if let Some(a) = arg {
                args.push(a);
            } else {
                return Err(ParseError::new(ParseErrorKind::ExpectedGroupAs {
                    context: format!("argument to '{func}'"),
                }));
            }
        }

        Ok((args, opt_args))
    }
}

/// Combines dash and quote runs into ligature text ords.
fn form_ligatures(group: &mut Vec<AnyParseNode>) {
    let mut n = group.len() as isize - 1;
    let mut i = 0usize;

    while (i as isize) < n {
        let a = group[i].clone();
        let v = a.text();
        if v == Some("-") && group[i + 1].text() == Some("-") {
            if (i as isize + 1) < n && group[i + 2].text() == Some("-") {
                group.splice(
                    i..i + 3,
                    vec![AnyParseNode::TextOrd(parse_node::ParseNodeTextOrd {
                        mode: Mode::Text,
                        loc: a.loc().range_ref(group[i + 2].loc()),
                        text: "---".to_owned(),
                    })],
                );
                n -= 2;
            } else {
                group.splice(
                    i..i + 2,
                    vec![AnyParseNode::TextOrd(parse_node::ParseNodeTextOrd {
                        mode: Mode::Text,
                        loc: a.loc().range_ref(group[i + 1].loc()),
                        text: "--".to_owned(),
                    })],
                );
                n -= 1;
            }
        }
        if (i as isize) < n
            && let Some(ch) = v
            && (ch == "'" || ch == "`")
            && group[i + 1].text() == v
        {
            group.splice(
                i..i + 2,
                vec![AnyParseNode::TextOrd(parse_node::ParseNodeTextOrd {
                    mode: Mode::Text,
                    loc: a.loc().range_ref(group[i + 1].loc()),
                    text: format!("{ch}{ch}"),
                })],
            );
            n -= 1;
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Vec<AnyParseNode>, ParseError> {
        let settings = Settings::default();
        let ctx = EngineContext::default();
        Parser::new(input, &settings, &ctx).parse()
    }

    #[test]
    fn test_simple_expression() {
        let nodes = parse("x+y").unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(matches!(nodes[0], AnyParseNode::MathOrd(_)));
        assert!(matches!(nodes[1], AnyParseNode::Atom(_)));
        assert_eq!(nodes[1].text(), Some("+"));
    }

    #[test]
    fn test_supsub_combines_scripts() {
        let nodes = parse("x^2_i").unwrap();
        assert_eq!(nodes.len(), 1);
        let AnyParseNode::SupSub(ss) = &nodes[0] else {
            panic!("expected supsub, got {:?}", nodes[0]);
        };
        assert!(ss.base.is_some());
        assert!(ss.sup.is_some());
        assert!(ss.sub.is_some());
    }

    #[test]
    fn test_double_superscript_rejected() {
        let err = parse("x^2^3").unwrap_err();
        assert!(err.to_string().contains("Double superscript"), "{err}");
    }

    #[test]
    fn test_unclosed_group_rejected() {
        assert!(parse("{x").is_err());
    }

    #[test]
    fn test_primes_become_superscript() {
        let nodes = parse("f''").unwrap();
        assert_eq!(nodes.len(), 1);
        let AnyParseNode::SupSub(ss) = &nodes[0] else {
            panic!("expected supsub");
        };
        let Some(sup) = ss.sup.as_deref() else {
            panic!("expected superscript");
        };
        let AnyParseNode::OrdGroup(primes) = sup else {
            panic!("expected ordgroup of primes");
        };
        assert_eq!(primes.body.len(), 2);
        assert_eq!(primes.body[0].text(), Some("\\prime"));
    }

    #[test]
    fn test_unicode_superscript_digits() {
        let nodes = parse("x\u{b2}").unwrap();
        assert_eq!(nodes.len(), 1);
        let AnyParseNode::SupSub(ss) = &nodes[0] else {
            panic!("expected supsub");
        };
        assert!(ss.sup.is_some());
        assert!(ss.sub.is_none());
    }

    #[test]
    fn test_undefined_command_rejected() {
        let err = parse("\\nosuchcommandxyz").unwrap_err();
        assert!(
            err.to_string().contains("Undefined control sequence"),
            "{err}"
        );
    }

    #[test]
    fn test_undefined_command_formats_placeholder_when_not_throwing() {
        let settings = Settings::builder().throw_on_error(false).build();
        let ctx = EngineContext::default();
        let nodes = Parser::new("\\nosuchcommandxyz", &settings, &ctx)
            .parse()
            .unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(matches!(nodes[0], AnyParseNode::Color(_)));
    }

    #[test]
    fn test_def_with_delimited_parameters() {
        let nodes = parse(r"\def\pair#1.#2;{#1+#2}\pair x.y;").unwrap();
        let texts: Vec<&str> = nodes.iter().filter_map(AnyParseNode::text).collect();
        assert_eq!(texts, ["x", "+", "y"]);
    }

    #[test]
    fn test_group_nesting_ceiling() {
        let mut input = String::new();
        for _ in 0..(MAX_GROUP_NESTING + 1) {
            input.push('{');
        }
        input.push('x');
        for _ in 0..(MAX_GROUP_NESTING + 1) {
            input.push('}');
        }
        let err = parse(&input).unwrap_err();
        assert!(err.to_string().contains("nesting too deep"), "{err}");
    }
}
