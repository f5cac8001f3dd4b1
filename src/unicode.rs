//! Unicode input tables: combining accents, precomposed characters, and
//! superscript/subscript characters.

use phf::{Map, Set, phf_map, phf_set};

/// LaTeX commands standing in for one combining accent character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccentMapping {
    /// Text-mode command.
    pub text: &'static str,
    /// Math-mode command; `None` when the accent only exists in text.
    pub math: Option<&'static str>,
}

/// Combining diacritical marks the parser converts into accent commands.
pub const UNICODE_ACCENTS: Map<char, AccentMapping> = phf_map! {
    '\u{0301}' => AccentMapping { text: "\\'", math: Some("\\acute") },
    '\u{0300}' => AccentMapping { text: "\\`", math: Some("\\grave") },
    '\u{0308}' => AccentMapping { text: "\\\"", math: Some("\\ddot") },
    '\u{0303}' => AccentMapping { text: "\\~", math: Some("\\tilde") },
    '\u{0304}' => AccentMapping { text: "\\=", math: Some("\\bar") },
    '\u{0306}' => AccentMapping { text: "\\u", math: Some("\\breve") },
    '\u{030c}' => AccentMapping { text: "\\v", math: Some("\\check") },
    '\u{0302}' => AccentMapping { text: "\\^", math: Some("\\hat") },
    '\u{0307}' => AccentMapping { text: "\\.", math: Some("\\dot") },
    '\u{030a}' => AccentMapping { text: "\\r", math: Some("\\mathring") },
    '\u{030b}' => AccentMapping { text: "\\H", math: None },
    '\u{0327}' => AccentMapping { text: "\\c", math: None },
};

/// The accent mapping for a combining character, if it is one we support.
#[must_use]
pub fn get_accent_mapping(ch: char) -> Option<&'static AccentMapping> {
    UNICODE_ACCENTS.get(&ch)
}

/// Precomposed characters decomposed into base plus combining mark, so the
/// accent machinery sees one spelling regardless of input normalization.
pub static UNICODE_SYMBOLS: Map<char, &'static str> = phf_map! {
    // acute
    '\u{e1}' => "a\u{0301}", '\u{e9}' => "e\u{0301}", '\u{ed}' => "i\u{0301}",
    '\u{f3}' => "o\u{0301}", '\u{fa}' => "u\u{0301}", '\u{fd}' => "y\u{0301}",
    '\u{c1}' => "A\u{0301}", '\u{c9}' => "E\u{0301}", '\u{cd}' => "I\u{0301}",
    '\u{d3}' => "O\u{0301}", '\u{da}' => "U\u{0301}", '\u{dd}' => "Y\u{0301}",
    '\u{107}' => "c\u{0301}", '\u{144}' => "n\u{0301}", '\u{15b}' => "s\u{0301}",
    '\u{17a}' => "z\u{0301}",
    // grave
    '\u{e0}' => "a\u{0300}", '\u{e8}' => "e\u{0300}", '\u{ec}' => "i\u{0300}",
    '\u{f2}' => "o\u{0300}", '\u{f9}' => "u\u{0300}",
    '\u{c0}' => "A\u{0300}", '\u{c8}' => "E\u{0300}", '\u{cc}' => "I\u{0300}",
    '\u{d2}' => "O\u{0300}", '\u{d9}' => "U\u{0300}",
    // diaeresis
    '\u{e4}' => "a\u{0308}", '\u{eb}' => "e\u{0308}", '\u{ef}' => "i\u{0308}",
    '\u{f6}' => "o\u{0308}", '\u{fc}' => "u\u{0308}", '\u{ff}' => "y\u{0308}",
    '\u{c4}' => "A\u{0308}", '\u{cb}' => "E\u{0308}", '\u{cf}' => "I\u{0308}",
    '\u{d6}' => "O\u{0308}", '\u{dc}' => "U\u{0308}",
    // tilde
    '\u{e3}' => "a\u{0303}", '\u{f1}' => "n\u{0303}", '\u{f5}' => "o\u{0303}",
    '\u{c3}' => "A\u{0303}", '\u{d1}' => "N\u{0303}", '\u{d5}' => "O\u{0303}",
    // circumflex
    '\u{e2}' => "a\u{0302}", '\u{ea}' => "e\u{0302}", '\u{ee}' => "i\u{0302}",
    '\u{f4}' => "o\u{0302}", '\u{fb}' => "u\u{0302}",
    '\u{c2}' => "A\u{0302}", '\u{ca}' => "E\u{0302}", '\u{ce}' => "I\u{0302}",
    '\u{d4}' => "O\u{0302}", '\u{db}' => "U\u{0302}",
    // macron
    '\u{101}' => "a\u{0304}", '\u{113}' => "e\u{0304}", '\u{12b}' => "i\u{0304}",
    '\u{14d}' => "o\u{0304}", '\u{16b}' => "u\u{0304}",
    '\u{100}' => "A\u{0304}", '\u{112}' => "E\u{0304}", '\u{12a}' => "I\u{0304}",
    '\u{14c}' => "O\u{0304}", '\u{16a}' => "U\u{0304}",
    // breve
    '\u{103}' => "a\u{0306}", '\u{115}' => "e\u{0306}", '\u{11f}' => "g\u{0306}",
    '\u{12d}' => "i\u{0306}", '\u{14f}' => "o\u{0306}", '\u{16d}' => "u\u{0306}",
    // caron
    '\u{10d}' => "c\u{030c}", '\u{11b}' => "e\u{030c}", '\u{148}' => "n\u{030c}",
    '\u{159}' => "r\u{030c}", '\u{161}' => "s\u{030c}", '\u{17e}' => "z\u{030c}",
    '\u{10c}' => "C\u{030c}", '\u{160}' => "S\u{030c}", '\u{17d}' => "Z\u{030c}",
    // dot above
    '\u{10b}' => "c\u{0307}", '\u{117}' => "e\u{0307}", '\u{121}' => "g\u{0307}",
    '\u{17c}' => "z\u{0307}",
    // ring above
    '\u{e5}' => "a\u{030a}", '\u{16f}' => "u\u{030a}", '\u{c5}' => "A\u{030a}",
    // double acute
    '\u{151}' => "o\u{030b}", '\u{171}' => "u\u{030b}",
    '\u{150}' => "O\u{030b}", '\u{170}' => "U\u{030b}",
    // cedilla
    '\u{e7}' => "c\u{0327}", '\u{15f}' => "s\u{0327}",
    '\u{c7}' => "C\u{0327}", '\u{15e}' => "S\u{0327}",
};

const UNICODE_SUB_CHARS: Set<char> = phf_set!(
    '\u{208a}', '\u{208b}', '\u{208c}', '\u{208d}', '\u{208e}', '\u{2080}', '\u{2081}', '\u{2082}',
    '\u{2083}', '\u{2084}', '\u{2085}', '\u{2086}', '\u{2087}', '\u{2088}', '\u{2089}', '\u{2090}',
    '\u{2091}', '\u{2095}', '\u{1d62}', '\u{2c7c}', '\u{2096}', '\u{2097}', '\u{2098}', '\u{2099}',
    '\u{2092}', '\u{209a}', '\u{1d63}', '\u{209b}', '\u{209c}', '\u{1d64}', '\u{1d65}', '\u{2093}',
    '\u{1d66}', '\u{1d67}', '\u{1d68}', '\u{1d69}', '\u{1d6a}',
);

/// Unicode superscript/subscript characters mapped to their base glyphs.
pub static U_SUBS_AND_SUPS: Map<char, &'static str> = phf_map! {
    '\u{208a}' => "+",
    '\u{208b}' => "-",
    '\u{208c}' => "=",
    '\u{208d}' => "(",
    '\u{208e}' => ")",
    '\u{2080}' => "0",
    '\u{2081}' => "1",
    '\u{2082}' => "2",
    '\u{2083}' => "3",
    '\u{2084}' => "4",
    '\u{2085}' => "5",
    '\u{2086}' => "6",
    '\u{2087}' => "7",
    '\u{2088}' => "8",
    '\u{2089}' => "9",
    '\u{2090}' => "a",
    '\u{2091}' => "e",
    '\u{2095}' => "h",
    '\u{1D62}' => "i",
    '\u{2C7C}' => "j",
    '\u{2096}' => "k",
    '\u{2097}' => "l",
    '\u{2098}' => "m",
    '\u{2099}' => "n",
    '\u{2092}' => "o",
    '\u{209A}' => "p",
    '\u{1D63}' => "r",
    '\u{209B}' => "s",
    '\u{209C}' => "t",
    '\u{1D64}' => "u",
    '\u{1D65}' => "v",
    '\u{2093}' => "x",
    '\u{1D66}' => "\u{3b2}",
    '\u{1D67}' => "\u{3b3}",
    '\u{1D68}' => "\u{3c1}",
    '\u{1D69}' => "\u{3c6}",
    '\u{1D6A}' => "\u{3c7}",
    '\u{207a}' => "+",
    '\u{207b}' => "-",
    '\u{207c}' => "=",
    '\u{207d}' => "(",
    '\u{207e}' => ")",
    '\u{2070}' => "0",
    '\u{b9}' => "1",
    '\u{b2}' => "2",
    '\u{b3}' => "3",
    '\u{2074}' => "4",
    '\u{2075}' => "5",
    '\u{2076}' => "6",
    '\u{2077}' => "7",
    '\u{2078}' => "8",
    '\u{2079}' => "9",
    '\u{1D2C}' => "A",
    '\u{1D2E}' => "B",
    '\u{1D30}' => "D",
    '\u{1D31}' => "E",
    '\u{1D33}' => "G",
    '\u{1D34}' => "H",
    '\u{1D35}' => "I",
    '\u{1D36}' => "J",
    '\u{1D37}' => "K",
    '\u{1D38}' => "L",
    '\u{1D39}' => "M",
    '\u{1D3A}' => "N",
    '\u{1D3C}' => "O",
    '\u{1D3E}' => "P",
    '\u{1D3F}' => "R",
    '\u{1D40}' => "T",
    '\u{1D41}' => "U",
    '\u{2C7D}' => "V",
    '\u{1D42}' => "W",
    '\u{1D43}' => "a",
    '\u{1D47}' => "b",
    '\u{1D9C}' => "c",
    '\u{1D48}' => "d",
    '\u{1D49}' => "e",
    '\u{1DA0}' => "f",
    '\u{1D4D}' => "g",
    '\u{02B0}' => "h",
    '\u{2071}' => "i",
    '\u{02B2}' => "j",
    '\u{1D4F}' => "k",
    '\u{02E1}' => "l",
    '\u{1D50}' => "m",
    '\u{207F}' => "n",
    '\u{1D52}' => "o",
    '\u{1D56}' => "p",
    '\u{02B3}' => "r",
    '\u{02E2}' => "s",
    '\u{1D57}' => "t",
    '\u{1D58}' => "u",
    '\u{1D5B}' => "v",
    '\u{02B7}' => "w",
    '\u{02E3}' => "x",
    '\u{02B8}' => "y",
    '\u{1DBB}' => "z",
    '\u{1D5D}' => "\u{3b2}",
    '\u{1D5E}' => "\u{3b3}",
    '\u{1D5F}' => "\u{3b4}",
    '\u{1D60}' => "\u{3c6}",
    '\u{1D61}' => "\u{3c7}",
    '\u{1DBF}' => "\u{3b8}",
};

/// Whether `ch` is a Unicode subscript character (as opposed to a
/// superscript one).
#[must_use]
pub fn is_unicode_subscript(ch: char) -> bool {
    UNICODE_SUB_CHARS.contains(&ch)
}

// Script blocks that need a font-fallback class in the output. Latin
// (including combining diacritics) renders with the shipped fonts and
// is deliberately absent.
const SCRIPT_DATA: &[(&str, &[(u32, u32)])] = &[
    ("cyrillic", &[(0x0400, 0x04FF)]),
    ("armenian", &[(0x0530, 0x058F)]),
    ("brahmic", &[(0x0900, 0x109F)]),
    ("georgian", &[(0x10A0, 0x10FF)]),
    (
        "cjk",
        &[(0x3000, 0x30FF), (0x4E00, 0x9FAF), (0xFF00, 0xFF60)],
    ),
    ("hangul", &[(0xAC00, 0xD7AF)]),
];

/// The script name of a codepoint that needs a fallback font, if any.
#[must_use]
pub fn script_from_codepoint(codepoint: u32) -> Option<&'static str> {
    for (name, blocks) in SCRIPT_DATA {
        if blocks
            .iter()
            .any(|&(start, end)| (start..=end).contains(&codepoint))
        {
            return Some(name);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_classification() {
        assert_eq!(script_from_codepoint(0x0416), Some("cyrillic"));
        assert_eq!(script_from_codepoint(0x4E2D), Some("cjk"));
        assert_eq!(script_from_codepoint(0xAC00), Some("hangul"));
        assert_eq!(script_from_codepoint(u32::from('x')), None);
        assert_eq!(script_from_codepoint(0x0301), None);
    }

    #[test]
    fn test_sub_sup_classification() {
        assert!(is_unicode_subscript('\u{2082}'));
        assert!(!is_unicode_subscript('\u{b2}'));
        assert_eq!(U_SUBS_AND_SUPS.get(&'\u{2082}'), Some(&"2"));
        assert_eq!(U_SUBS_AND_SUPS.get(&'\u{b2}'), Some(&"2"));
        assert_eq!(U_SUBS_AND_SUPS.get(&'2'), None);
    }

    #[test]
    fn test_precomposed_decompositions_roundtrip() {
        for (ch, decomposed) in &UNICODE_SYMBOLS {
            let mut chars = decomposed.chars();
            let base = chars.next();
            let mark = chars.next();
            assert!(base.is_some_and(|c| c.is_ascii_alphabetic()), "{ch}");
            assert!(mark.is_some_and(|c| UNICODE_ACCENTS.contains_key(&c)), "{ch}");
        }
    }

    #[test]
    fn test_accent_mapping_modes() {
        let acute = get_accent_mapping('\u{0301}').unwrap();
        assert_eq!(acute.math, Some("\\acute"));
        let cedilla = get_accent_mapping('\u{0327}').unwrap();
        assert_eq!(cedilla.math, None);
        assert_eq!(cedilla.text, "\\c");
    }
}
