//! The tokenizer. Lexes one token at a time from a fixed input string,
//! tracking byte positions so the expander can re-lex from arbitrary points.

use std::sync::Arc;

use crate::namespace::KeyMap;
use crate::types::{
    LexerInterface, ParseError, ParseErrorKind, Settings, SourceLocation, Token, TokenText,
};

/// Byte index of the last character in `s` that is not a combining
/// diacritical mark, or `None` when nothing would be cut.
#[must_use]
pub fn last_non_combining_mark_index(s: &str) -> Option<usize> {
    let mut cut_idx = s.len();
    for (idx, ch) in s.char_indices().rev() {
        if is_combining_mark(ch) {
            cut_idx = idx;
        } else {
            break;
        }
    }
    (cut_idx != s.len()).then_some(cut_idx)
}

const fn is_combining_mark(ch: char) -> bool {
    (ch as u32) >= 0x0300 && (ch as u32) <= 0x036F
}

/// Length of a run of whitespace at the start of `s`.
fn match_space(s: &str) -> Option<usize> {
    let len = s
        .chars()
        .take_while(|c| matches!(c, ' ' | '\r' | '\n' | '\t'))
        .map(char::len_utf8)
        .sum();
    (len > 0).then_some(len)
}

/// `\␣` followed by optional whitespace, or `\` before a newline. Both
/// collapse to a single control space.
fn match_control_space(s: &str) -> Option<usize> {
    let mut chars = s.chars();
    if chars.next()? != '\\' {
        return None;
    }
    let mut len = 1;
    let next = chars.next()?;
    len += next.len_utf8();
    if next == '\n' {
        // The newline alone ends the escape.
    } else if matches!(next, ' ' | '\r' | '\t') {
        while let Some(c) = chars.clone().next() {
            if matches!(c, ' ' | '\r' | '\t') {
                chars.next();
                len += c.len_utf8();
            } else {
                break;
            }
        }
        if chars.clone().next() == Some('\n') {
            chars.next();
            len += 1;
        }
    } else {
        return None;
    }
    while let Some(c) = chars.clone().next() {
        if matches!(c, ' ' | '\r' | '\t') {
            chars.next();
            len += c.len_utf8();
        } else {
            break;
        }
    }
    Some(len)
}

/// A printable character plus any trailing combining marks.
fn match_normal_char_with_accents(s: &str) -> Option<usize> {
    let mut chars = s.chars();
    let first = chars.next()?;
    let u = first as u32;
    let printable = matches!(u,
        0x0021..=0x005B | 0x005D..=0x2027 | 0x202A..=0xD7FF | 0xF900..=0xFFFF
    ) || u > 0xFFFF;
    if !printable {
        return None;
    }
    let mut len = first.len_utf8();
    for c in chars {
        if is_combining_mark(c) {
            len += c.len_utf8();
        } else {
            break;
        }
    }
    Some(len)
}

/// `\verb|...|` or `\verb*|...|`, lexed as a single token because its body
/// must escape tokenization entirely.
fn match_verb(s: &str, star: bool) -> Option<usize> {
    let prefix = if star { r"\verb*" } else { r"\verb" };
    let rest = s.strip_prefix(prefix)?;

    let mut chars = rest.char_indices();
    let (_, delim_char) = chars.next()?;
    if !star && delim_char.is_ascii_alphabetic() {
        return None;
    }

    for (i, c) in chars {
        if matches!(c, '\n' | '\r') {
            return None;
        }
        if c == delim_char {
            return Some(prefix.len() + i + c.len_utf8());
        }
    }
    None
}

/// A backslash followed by letters (`@` included, as in LaTeX internals).
fn match_control_word(s: &str) -> Option<usize> {
    let mut chars = s.chars();
    if chars.next()? != '\\' {
        return None;
    }
    let mut len = 1;
    let mut matched = false;
    for c in chars {
        if c.is_ascii_alphabetic() || c == '@' {
            len += c.len_utf8();
            matched = true;
        } else {
            break;
        }
    }
    matched.then_some(len)
}

/// A control word and the whitespace run that follows it. The whitespace
/// is consumed but not part of the token text.
fn match_control_word_with_space(s: &str) -> Option<(usize, usize)> {
    let len = match_control_word(s)?;
    let space_len = match_space(&s[len..]).unwrap_or(0);
    Some((len, space_len))
}

/// A backslash followed by any single non-letter character.
fn match_control_symbol(s: &str) -> Option<usize> {
    let mut chars = s.chars();
    if chars.next()? != '\\' {
        return None;
    }
    let c = chars.next()?;
    Some(1 + c.len_utf8())
}

#[derive(PartialEq, Eq)]
enum MatchKind {
    Unknown,
    Space,
    ControlSpace,
    NormalWithAccents,
    Verb,
    ControlWordWhitespace,
    ControlSymbol,
}

struct TokenMatch {
    kind: MatchKind,
    len: usize,
    trailing_space: usize,
}

/// Longest-match dispatch over the token alternatives, in priority order.
fn next_match(slice: &str) -> TokenMatch {
    let (kind, len, trailing_space) = if let Some(l) = match_space(slice) {
        (MatchKind::Space, l, 0)
    } else if let Some(l) = match_control_space(slice) {
        (MatchKind::ControlSpace, l, 0)
    } else if let Some(l) = match_normal_char_with_accents(slice) {
        (MatchKind::NormalWithAccents, l, 0)
    } else if let Some(l) = match_verb(slice, true).or_else(|| match_verb(slice, false)) {
        (MatchKind::Verb, l, 0)
    } else if let Some((l, s)) = match_control_word_with_space(slice) {
        (MatchKind::ControlWordWhitespace, l + s, s)
    } else if let Some(l) = match_control_symbol(slice) {
        (MatchKind::ControlSymbol, l, 0)
    } else {
        let len = slice.chars().next().map_or(0, char::len_utf8);
        (MatchKind::Unknown, len, 0)
    };
    TokenMatch {
        kind,
        len,
        trailing_space,
    }
}

/// Catcode-aware tokenizer over a shared input string.
pub struct Lexer<'a> {
    input: Arc<str>,
    last_index: usize,
    settings: &'a Settings,
    /// Per-parse category-code overrides. Only `%` (14, comment) and `~`
    /// (13, active) are seeded; `\catcode` changes land here.
    catcodes: KeyMap<char, u8>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `input` with the default catcode overrides.
    #[must_use]
    pub fn new(input: Arc<str>, settings: &'a Settings) -> Self {
        let mut catcodes = KeyMap::default();
        catcodes.insert('%', 14);
        catcodes.insert('~', 13);

        Self {
            input,
            last_index: 0,
            settings,
            catcodes,
        }
    }

    /// Override the category code of a character.
    pub fn set_catcode(&mut self, ch: char, code: u8) {
        self.catcodes.insert(ch, code);
    }

    /// Current category-code override of a character, if any.
    #[must_use]
    pub fn get_catcode(&self, ch: char) -> Option<u8> {
        self.catcodes.get(&ch).copied()
    }

    /// Lex the next token, skipping comments.
    ///
    /// At end of input an `EOF` token with a zero-width span is returned;
    /// an unrecognized character is an error carrying its location.
    pub fn lex(&mut self) -> Result<Token, ParseError> {
        if self.last_index >= self.input.len() {
            return Ok(Token::new(
                TokenText::Static("EOF"),
                Some(SourceLocation::new(
                    Arc::clone(&self.input),
                    self.last_index,
                    self.last_index,
                )),
            ));
        }

        let start = self.last_index;
        let slice = &self.input[start..];
        let matched = next_match(slice);
        self.last_index += matched.len;

        let token_text = match matched.kind {
            MatchKind::Unknown => {
                let ch = &slice[..matched.len];
                let token = Token::new(
                    ch.to_owned(),
                    Some(SourceLocation::new(
                        Arc::clone(&self.input),
                        start,
                        self.last_index,
                    )),
                );
                return Err(ParseError::with_token(
                    ParseErrorKind::UnexpectedCharacter {
                        character: ch.to_owned(),
                    },
                    &token,
                ));
            }
            MatchKind::ControlWordWhitespace => TokenText::slice(
                Arc::clone(&self.input),
                start,
                self.last_index - matched.trailing_space,
            ),
            MatchKind::ControlSymbol | MatchKind::NormalWithAccents | MatchKind::Verb => {
                TokenText::slice(Arc::clone(&self.input), start, self.last_index)
            }
            MatchKind::ControlSpace => TokenText::Static(r"\ "),
            MatchKind::Space => TokenText::Static(" "),
        };

        if token_text.len() == 1
            && let Some(first_char) = token_text.as_str().chars().next()
            && self.get_catcode(first_char) == Some(14)
        {
            // Comment: skip to the newline, which then lexes as a space.
            if let Some(rel_pos) = self.input[start..].find('\n') {
                self.last_index = start + rel_pos;
            } else {
                self.last_index = self.input.len();
                self.settings.report_nonstrict(
                    "commentAtEnd",
                    "% comment has no terminating newline; LaTeX would fail because of commenting the end of math mode",
                    None,
                )?;
            }
            return self.lex();
        }

        Ok(Token::new(
            token_text,
            Some(SourceLocation::new(
                Arc::clone(&self.input),
                start,
                self.last_index,
            )),
        ))
    }

    /// Byte position the next `lex` call reads from.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.last_index
    }

    /// Reposition the lexer, used when re-lexing after `\verb` handling.
    pub const fn set_position(&mut self, last_index: usize) {
        self.last_index = last_index;
    }
}

impl LexerInterface for Lexer<'_> {
    fn input(&self) -> &str {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(input: &str) -> Vec<String> {
        let settings = Settings::default();
        let mut lexer = Lexer::new(Arc::from(input), &settings);
        let mut out = Vec::new();
        loop {
            let token = lexer.lex().unwrap();
            if token.text() == "EOF" {
                break;
            }
            out.push(token.text().to_owned());
        }
        out
    }

    #[test]
    fn test_lexes_symbols_and_control_words() {
        assert_eq!(lex_all(r"a+\frac"), vec!["a", "+", r"\frac"]);
    }

    #[test]
    fn test_control_word_swallows_trailing_space() {
        assert_eq!(lex_all("\\alpha  x"), vec![r"\alpha", "x"]);
    }

    #[test]
    fn test_whitespace_collapses_to_one_token() {
        assert_eq!(lex_all("a \t\n b"), vec!["a", " ", "b"]);
    }

    #[test]
    fn test_control_symbol() {
        assert_eq!(lex_all(r"\%\,"), vec![r"\%", r"\,"]);
    }

    #[test]
    fn test_combining_marks_stay_attached() {
        assert_eq!(lex_all("A\u{0301}"), vec!["A\u{0301}"]);
    }

    #[test]
    fn test_comment_skips_to_newline() {
        assert_eq!(lex_all("a% ignored\nb"), vec!["a", " ", "b"]);
    }

    #[test]
    fn test_comment_at_end_errors_in_strict_mode() {
        let settings = Settings::builder()
            .strict(crate::types::StrictSetting::Bool(true))
            .build();
        let mut lexer = Lexer::new(Arc::from("a% no newline"), &settings);
        assert_eq!(lexer.lex().unwrap().text(), "a");
        assert!(lexer.lex().is_err());
    }

    #[test]
    fn test_verb_is_one_token() {
        assert_eq!(lex_all(r"\verb|x y|z"), vec![r"\verb|x y|", "z"]);
        assert_eq!(lex_all(r"\verb*!a b!"), vec![r"\verb*!a b!"]);
    }

    #[test]
    fn test_token_spans() {
        let settings = Settings::default();
        let mut lexer = Lexer::new(Arc::from(r"x\alpha"), &settings);
        let first = lexer.lex().unwrap();
        let second = lexer.lex().unwrap();
        let loc = second.loc.unwrap();
        assert_eq!(first.loc.unwrap().start(), 0);
        assert_eq!((loc.start(), loc.end()), (1, 7));
    }
}
