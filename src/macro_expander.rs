//! The gullet: expands macros until only unexpandable tokens remain.

use std::sync::Arc;

use crate::context::EngineContext;
use crate::lexer::Lexer;
use crate::macros::builtins::BUILTIN_MACROS;
use crate::macros::{
    MacroArg, MacroContextInterface, MacroDefinition, MacroExpansion, MacroExpansionResult,
};
use crate::namespace::Namespace;
use crate::types::{Mode, ParseError, ParseErrorKind, Settings, Token};

/// Commands that behave like commands without being a macro, function, or
/// symbol.
pub const IMPLICIT_COMMANDS: phf::Set<&str> = phf::phf_set! {
    "^",
    "_",
    "\\limits",
    "\\nolimits",
};

/// Token source for the parser. Pulls from the lexer, expands macros, and
/// lets callers push tokens back.
pub struct MacroExpander<'a> {
    settings: &'a Settings,
    expansion_count: usize,
    lexer: Lexer<'a>,
    macros: Namespace<'a, MacroDefinition>,
    /// Pending tokens in reverse order; the next token is the last element.
    stack: Vec<Token>,
    mode: Mode,
    ctx: &'a EngineContext,
}

impl<'a> MacroExpander<'a> {
    /// Create an expander over `input`, seeding the macro namespace from the
    /// settings' macro map over the builtin table.
    #[must_use]
    pub fn new(input: &str, settings: &'a Settings, mode: Mode, ctx: &'a EngineContext) -> Self {
        let globals = settings.macros.borrow_mut();
        let macros = Namespace::new(&BUILTIN_MACROS, globals);

        Self {
            lexer: Lexer::new(Arc::from(input), settings),
            settings,
            expansion_count: 0,
            macros,
            mode,
            stack: Vec::new(),
            ctx,
        }
    }

    /// Start over on a new input string, keeping macros and mode.
    pub fn feed(&mut self, input: &str) {
        self.lexer = Lexer::new(Arc::from(input), self.settings);
    }

    /// Switch between math and text modes.
    pub const fn switch_mode(&mut self, new_mode: Mode) {
        self.mode = new_mode;
    }

    /// Close all open macro groups, as at the end of a parse.
    pub fn end_all_groups(&mut self) -> usize {
        self.macros.end_groups()
    }

    /// Forward a `\catcode` change to the lexer.
    pub fn set_catcode(&mut self, ch: char, code: u8) {
        self.lexer.set_catcode(ch, code);
    }

    /// The underlying lexer, for `\verb` re-lexing.
    pub const fn lexer_mut(&mut self) -> &mut Lexer<'a> {
        &mut self.lexer
    }

    /// Push a token back; it is returned by the next `pop_token`.
    pub fn push_token(&mut self, token: Token) {
        self.stack.push(token);
    }

    /// Push a reverse-order token list back.
    pub fn push_tokens(&mut self, tokens: Vec<Token>) {
        self.stack.extend(tokens);
    }

    /// Scan one macro argument without expanding it, pushing its tokens
    /// (terminated by an `EOF` marker) back onto the stack.
    ///
    /// Returns a token spanning the argument, or `None` for a missing
    /// optional argument.
    pub fn scan_argument(&mut self, is_optional: bool) -> Result<Option<Token>, ParseError> {
        let (start_tok, end_tok, tokens);
        if is_optional {
            self.consume_spaces()?;
            if self.future_mut()?.text != "[" {
                return Ok(None);
            }
            let start = self.pop_token()?;
            let arg = self.consume_arg(Some(&vec!["]".to_owned()]))?;
            start_tok = start;
            end_tok = arg.end;
            tokens = arg.tokens;
        } else {
            let arg = self.consume_arg(None)?;
            start_tok = arg.start;
            end_tok = arg.end;
            tokens = arg.tokens;
        }

        // Mark the end of the argument for the parser.
        self.push_token(Token::new("EOF", None));
        self.push_tokens(tokens);

        Ok(start_tok.range(end_tok, String::new()))
    }

    fn consume_args_with_delims(
        &mut self,
        num_args: usize,
        delimiters: Option<&Vec<Vec<String>>>,
    ) -> Result<Vec<Vec<Token>>, ParseError> {
        if let Some(d) = delimiters {
            if d.len() != num_args + 1 {
                return Err(ParseError::new(
                    ParseErrorKind::MacroDelimiterLengthMismatch,
                ));
            }
            for expected in &d[0] {
                let tok = self.pop_token()?;
                if *expected != tok.text.as_str() {
                    return Err(ParseError::with_token(
                        ParseErrorKind::MacroDefinitionMismatch,
                        &tok,
                    ));
                }
            }
        }

        let mut args: Vec<Vec<Token>> = Vec::with_capacity(num_args);
        for i in 0..num_args {
            let delims_for_arg = delimiters.map(|v| &v[i + 1]);
            let arg = self.consume_arg(delims_for_arg)?;
            args.push(arg.tokens);
        }
        Ok(args)
    }

    fn count_expansion(&mut self, amount: usize) -> Result<(), ParseError> {
        self.expansion_count += amount;
        if self.expansion_count > self.settings.max_expand {
            return Err(ParseError::new(ParseErrorKind::MacroTooManyExpansions));
        }
        Ok(())
    }

    fn expand_once_internal(&mut self, expandable_only: bool) -> Result<Option<isize>, ParseError> {
        let top_token = self.pop_token()?;
        let name = top_token.text.as_str().to_owned();
        let expansion = if top_token.noexpand == Some(true) {
            None
        } else {
            self.get_expansion(&name)?
        };

        let expansion = match expansion {
            Some(exp) if !(expandable_only && exp.unexpandable == Some(true)) => exp,
            other => {
                if expandable_only
                    && other.is_none()
                    && name.starts_with('\\')
                    && !self.is_defined(&name)
                {
                    return Err(ParseError::with_token(
                        ParseErrorKind::UndefinedControlSequence { name },
                        &top_token,
                    ));
                }
                self.push_token(top_token);
                return Ok(None);
            }
        };

        self.count_expansion(1)?;
        let mut tokens = expansion.tokens.clone();
        let args =
            self.consume_args_with_delims(expansion.num_args, expansion.delimiters.as_ref())?;
        if tokens.iter().any(|tok| tok.text == "#") {
            // Splice argument tokens over the `#n` placeholders, walking
            // backward so indices before the splice stay valid. `##`
            // collapses to a literal `#`.
            let mut i = isize::try_from(tokens.len()).unwrap_or(isize::MAX) - 1;
            while i >= 0 {
                let idx = i as usize;
                if tokens[idx].text == "#" {
                    if idx == 0 {
                        return Err(ParseError::with_token(
                            ParseErrorKind::MacroIncompletePlaceholder,
                            &tokens[idx],
                        ));
                    }
                    let tok = tokens[idx - 1].clone();
                    if tok.text == "#" {
                        tokens.remove(idx);
                        i -= 2;
                        continue;
                    }
                    if tok.text.len() == 1
                        && let Ok(parsed) = tok.text.as_str().parse::<usize>()
                        && parsed >= 1
                        && parsed <= args.len()
                    {
                        tokens.splice((idx - 1)..=idx, args[parsed - 1].clone());
                        i -= 2;
                        continue;
                    }

                    return Err(ParseError::with_token(
                        ParseErrorKind::InvalidMacroArgumentNumber {
                            value: tok.text.as_str().to_owned(),
                        },
                        &tok,
                    ));
                }
                i -= 1;
            }
        }
        self.push_tokens(tokens.clone());
        Ok(Some(isize::try_from(tokens.len()).unwrap_or(isize::MAX)))
    }

    fn expand_tokens_internal(&mut self, tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
        let mut output: Vec<Token> = Vec::new();
        let old_len = self.stack.len();
        self.push_tokens(tokens);
        while self.stack.len() > old_len {
            if self.expand_once_internal(true)?.is_none() {
                let mut token = self
                    .stack
                    .pop()
                    .ok_or_else(|| ParseError::new(ParseErrorKind::MacroStackUnexpectedlyEmpty))?;
                if token.treat_as_relax == Some(true) {
                    // \noexpand expands to the token itself.
                    token.noexpand = Some(false);
                    token.treat_as_relax = Some(false);
                }
                output.push(token);
            }
        }
        self.count_expansion(output.len())?;
        Ok(output)
    }

    /// Resolve `name` to an expansion, running callback macros.
    fn get_expansion(&mut self, name: &str) -> Result<Option<MacroExpansion>, ParseError> {
        // A single character whose catcode is not 13 (active) never expands.
        if name.chars().count() == 1
            && let Some(ch) = name.chars().next()
            && let Some(catcode) = self.lexer.get_catcode(ch)
            && catcode != 13
        {
            return Ok(None);
        }

        let Some(definition) = self.macros.get(name).cloned() else {
            return Ok(None);
        };

        let result = match definition {
            MacroDefinition::Function(f) => f(self as &mut dyn MacroContextInterface)?,
            MacroDefinition::StaticFunction(f) => f(self as &mut dyn MacroContextInterface)?,
            MacroDefinition::StaticStr(s) => return Ok(Some(self.string_to_expansion(s))),
            MacroDefinition::String(s) => return Ok(Some(self.string_to_expansion(&s))),
            MacroDefinition::Expansion(e) => return Ok(Some(e)),
        };
        Ok(Some(match result {
            MacroExpansionResult::String(s) => self.string_to_expansion(&s),
            MacroExpansionResult::Expansion(e) => e,
            MacroExpansionResult::Empty => MacroExpansion::default(),
        }))
    }

    /// Lex replacement text into a reverse-order expansion, counting its
    /// `#n` parameters.
    fn string_to_expansion(&self, expansion: &str) -> MacroExpansion {
        let mut num_args = 0usize;
        if expansion.contains('#') {
            let stripped = expansion.replace("##", "");
            while stripped.contains(&format!("#{}", num_args + 1)) {
                num_args += 1;
            }
        }

        let mut body_lexer = Lexer::new(Arc::from(expansion), self.settings);
        let mut tokens: Vec<Token> = Vec::new();
        while let Ok(tok) = body_lexer.lex() {
            if tok.text == "EOF" {
                break;
            }
            tokens.push(tok);
        }
        tokens.reverse();
        MacroExpansion {
            tokens,
            num_args,
            delimiters: None,
            unexpandable: None,
        }
    }
}

impl<'a> MacroContextInterface<'a> for MacroExpander<'a> {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn context(&self) -> &EngineContext {
        self.ctx
    }

    fn macros<'s>(&'s self) -> &'s Namespace<'a, MacroDefinition> {
        &self.macros
    }

    fn macros_mut<'s>(&'s mut self) -> &'s mut Namespace<'a, MacroDefinition> {
        &mut self.macros
    }

    fn future_mut(&mut self) -> Result<Token, ParseError> {
        if self.stack.is_empty() {
            let tok = self.lexer.lex()?;
            self.push_token(tok);
        }
        self.stack
            .last()
            .cloned()
            .ok_or_else(|| ParseError::new(ParseErrorKind::MacroStackUnexpectedlyEmpty))
    }

    fn pop_token(&mut self) -> Result<Token, ParseError> {
        self.future_mut()?;
        self.stack
            .pop()
            .ok_or_else(|| ParseError::new(ParseErrorKind::MacroStackUnexpectedlyEmpty))
    }

    fn consume_spaces(&mut self) -> Result<(), ParseError> {
        loop {
            let token = self.future_mut()?;
            if token.text == " " {
                self.stack.pop();
            } else {
                break;
            }
        }
        Ok(())
    }

    fn expand_once(&mut self, expandable_only: Option<bool>) -> Result<Option<isize>, ParseError> {
        self.expand_once_internal(expandable_only.unwrap_or(false))
    }

    fn expand_after_future(&mut self) -> Result<Token, ParseError> {
        self.expand_once_internal(false)?;
        self.future_mut()
    }

    fn expand_next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            if self.expand_once_internal(false)?.is_none() {
                let mut token = self
                    .stack
                    .pop()
                    .ok_or_else(|| ParseError::new(ParseErrorKind::MacroStackUnexpectedlyEmpty))?;
                if token.treat_as_relax == Some(true) {
                    token.set_text("\\relax");
                }
                return Ok(token);
            }
        }
    }

    fn expand_macro(&mut self, name: &str) -> Result<Option<Vec<Token>>, ParseError> {
        if self.macros.has(name) {
            let toks = self.expand_tokens_internal(vec![Token::new(name.to_owned(), None)])?;
            Ok(Some(toks))
        } else {
            Ok(None)
        }
    }

    fn expand_macro_as_text(&mut self, name: &str) -> Result<Option<String>, ParseError> {
        Ok(self.expand_macro(name)?.map(|tokens| {
            tokens
                .into_iter()
                .map(|t| String::from(t.text))
                .collect::<String>()
        }))
    }

    fn expand_tokens(&mut self, tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
        self.expand_tokens_internal(tokens)
    }

    fn consume_arg(&mut self, delims: Option<&Vec<String>>) -> Result<MacroArg, ParseError> {
        let mut tokens: Vec<Token> = Vec::new();
        let is_delimited = delims.is_some_and(|d| !d.is_empty());
        if !is_delimited {
            // Unlike \verb arguments, ordinary ones skip leading spaces.
            self.consume_spaces()?;
        }
        let start = self.future_mut()?;
        let mut tok;
        let mut depth: isize = 0;
        let mut match_idx: usize = 0;
        loop {
            tok = self.pop_token()?;
            tokens.push(tok.clone());
            if tok.text == "{" {
                depth += 1;
            } else if tok.text == "}" {
                depth -= 1;
                if depth == -1 {
                    return Err(ParseError::with_token(ParseErrorKind::ExtraCloseBrace, &tok));
                }
            } else if tok.text == "EOF" {
                let expected = delims
                    .filter(|_| is_delimited)
                    .and_then(|d| d.get(match_idx))
                    .map_or("}", String::as_str);
                return Err(ParseError::with_token(
                    ParseErrorKind::UnexpectedEndOfMacroArgument {
                        expected: expected.to_owned(),
                    },
                    &tok,
                ));
            }
            if let Some(d) = delims
                && is_delimited
            {
                if (depth == 0 || (depth == 1 && d[match_idx] == "{"))
                    && tok.text == d[match_idx].as_str()
                {
                    match_idx += 1;
                    if match_idx == d.len() {
                        // The delimiter tokens are not part of the argument.
                        let keep = tokens.len() - match_idx;
                        tokens.truncate(keep);
                        break;
                    }
                } else {
                    match_idx = 0;
                }
            }
            if depth == 0 && !is_delimited {
                // Undelimited: a single token, or one balanced group.
                if start.text != "{" || tok.text == "}" {
                    break;
                }
            }
        }

        if start.text == "{" && tokens.last().map(|t| t.text.as_str()) == Some("}") {
            tokens.pop();
            if !tokens.is_empty() {
                tokens.remove(0);
            }
        }
        tokens.reverse();
        Ok(MacroArg {
            tokens,
            start,
            end: tok,
        })
    }

    fn consume_args(&mut self, num_args: usize) -> Result<Vec<Vec<Token>>, ParseError> {
        self.consume_args_with_delims(num_args, None)
    }

    fn is_defined(&self, name: &str) -> bool {
        self.macros.has(name)
            || self.ctx.functions.contains_key(name)
            || IMPLICIT_COMMANDS.contains(name)
            || self.ctx.symbols.contains(Mode::Math, name)
            || self.ctx.symbols.contains(Mode::Text, name)
    }

    fn is_expandable(&self, name: &str) -> bool {
        match self.macros.get(name) {
            Some(MacroDefinition::Expansion(e)) => e.unexpandable != Some(true),
            Some(_) => true,
            None => self
                .ctx
                .functions
                .get(name)
                .is_some_and(|f| !f.primitive),
        }
    }

    fn begin_group(&mut self) {
        self.macros.begin_group();
    }

    fn end_group(&mut self) -> Result<(), ParseError> {
        self.macros.end_group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Settings;

    fn expand_all(input: &str, settings: &Settings) -> Result<Vec<String>, ParseError> {
        let ctx = EngineContext::default();
        let mut expander = MacroExpander::new(input, settings, Mode::Math, &ctx);
        let mut out = Vec::new();
        loop {
            let token = expander.expand_next_token()?;
            if token.text == "EOF" {
                break;
            }
            out.push(token.text.as_str().to_owned());
        }
        Ok(out)
    }

    #[test]
    fn test_plain_tokens_pass_through() {
        let settings = Settings::default();
        assert_eq!(
            expand_all("a+b", &settings).unwrap(),
            vec!["a", "+", "b"]
        );
    }

    #[test]
    fn test_string_macro_expands() {
        let settings = Settings::default();
        settings.macros.borrow_mut().insert(
            "\\foo".to_owned(),
            MacroDefinition::String("ab".to_owned()),
        );
        assert_eq!(expand_all(r"\foo", &settings).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_macro_with_arguments() {
        let settings = Settings::default();
        settings.macros.borrow_mut().insert(
            "\\swap".to_owned(),
            MacroDefinition::String("#2#1".to_owned()),
        );
        assert_eq!(
            expand_all(r"\swap{x}{y}", &settings).unwrap(),
            vec!["y", "x"]
        );
    }

    #[test]
    fn test_double_hash_is_literal() {
        let settings = Settings::default();
        settings.macros.borrow_mut().insert(
            "\\sharp@".to_owned(),
            MacroDefinition::String("##".to_owned()),
        );
        assert_eq!(expand_all(r"\sharp@", &settings).unwrap(), vec!["#"]);
    }

    #[test]
    fn test_recursive_macro_hits_expansion_limit() {
        let settings = Settings::builder().max_expand(10).build();
        settings.macros.borrow_mut().insert(
            "\\loop@".to_owned(),
            MacroDefinition::String("\\loop@".to_owned()),
        );
        assert!(expand_all(r"\loop@", &settings).is_err());
    }

    #[test]
    fn test_builtin_expandafter() {
        let settings = Settings::default();
        settings.macros.borrow_mut().insert(
            "\\pair".to_owned(),
            MacroDefinition::String("xy".to_owned()),
        );
        assert_eq!(
            expand_all(r"\expandafter a\pair", &settings).unwrap(),
            vec!["a", "x", "y"]
        );
    }

    #[test]
    fn test_newcommand_defines_and_renew_requires_existing() {
        let settings = Settings::default();
        assert_eq!(
            expand_all(r"\newcommand{\x}{ab}\x", &settings).unwrap(),
            vec!["a", "b"]
        );
        let settings = Settings::default();
        assert!(expand_all(r"\renewcommand{\undefinedthing}{a}", &settings).is_err());
    }

    #[test]
    fn test_char_builtin_forms() {
        let settings = Settings::default();
        assert_eq!(
            expand_all(r"\char`a", &settings).unwrap(),
            vec![r"\@char", "{", "9", "7", "}"]
        );
        let settings = Settings::default();
        assert_eq!(
            expand_all("\\char\"61", &settings).unwrap(),
            vec![r"\@char", "{", "9", "7", "}"]
        );
    }

    #[test]
    fn test_consume_arg_strips_braces() {
        let settings = Settings::default();
        let ctx = EngineContext::default();
        let mut expander = MacroExpander::new("{a b}", &settings, Mode::Math, &ctx);
        let arg = expander.consume_arg(None).unwrap();
        let texts: Vec<&str> = arg.tokens.iter().rev().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", " ", "b"]);
    }
}
