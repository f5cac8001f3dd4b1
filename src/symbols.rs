//! Symbol table mapping command names and characters to glyph info.

use phf::phf_map;

use crate::namespace::KeyMap;
use crate::types::Mode;

/// Font family a symbol's glyph lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Computer Modern main fonts.
    Main,
    /// AMS extension fonts.
    Ams,
}

/// Spacing classes of the classic TeX atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Atom {
    /// Binary operator, `+` and friends.
    Bin,
    /// Closing delimiter.
    Close,
    /// Inner atom, ellipses for instance.
    Inner,
    /// Opening delimiter.
    Open,
    /// Punctuation.
    Punct,
    /// Relation, `=` and friends.
    Rel,
}

/// Symbol classes that are not spacing atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonAtom {
    /// Accent base glyph, combined above a nucleus.
    AccentToken,
    /// Ordinary math symbol.
    MathOrd,
    /// Large-operator glyph.
    OpToken,
    /// Explicit spacing command.
    Spacing,
    /// Ordinary text symbol.
    TextOrd,
}

/// Classification of a symbol, atom or otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    /// A spacing atom.
    Atom(Atom),
    /// Everything else.
    NonAtom(NonAtom),
}

/// Everything the builders need to know about one symbol.
#[derive(Debug, Clone)]
pub struct CharInfo {
    /// Font family carrying the glyph.
    pub font: Font,
    /// Spacing classification.
    pub group: Group,
    /// Glyph to render in place of the command name.
    pub replace: Option<char>,
}

/// Mode-separated symbol table.
///
/// Lookups hit math or text mode independently; a name may be defined in
/// both with different classifications (`*` is a binary operator in math
/// but ordinary text).
pub struct Symbols {
    math: KeyMap<String, CharInfo>,
    text: KeyMap<String, CharInfo>,
}

impl Default for Symbols {
    fn default() -> Self {
        create_symbols()
    }
}

impl Symbols {
    /// An empty table; [`create_symbols`] builds the populated one.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            math: KeyMap::default(),
            text: KeyMap::default(),
        }
    }

    /// Register a symbol under `name` in the given mode.
    ///
    /// With `accept_unicode_char` the replacement character itself also
    /// becomes a valid lookup key, so pasted Unicode input parses.
    pub fn define_symbol(
        &mut self,
        mode: Mode,
        font: Font,
        group: Group,
        replace: Option<char>,
        name: &str,
        accept_unicode_char: bool,
    ) {
        let char_info = CharInfo {
            font,
            group,
            replace,
        };

        let table = match mode {
            Mode::Math => &mut self.math,
            Mode::Text => &mut self.text,
        };

        table.insert(name.to_owned(), char_info.clone());

        if accept_unicode_char && let Some(ch) = replace {
            table.insert(ch.to_string(), char_info);
        }
    }

    /// Math-mode lookup.
    #[must_use]
    pub fn get_math(&self, name: &str) -> Option<&CharInfo> {
        self.math.get(name)
    }

    /// Text-mode lookup.
    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<&CharInfo> {
        self.text.get(name)
    }

    /// Lookup in the given mode.
    #[must_use]
    pub fn get(&self, mode: Mode, name: &str) -> Option<&CharInfo> {
        match mode {
            Mode::Math => self.get_math(name),
            Mode::Text => self.get_text(name),
        }
    }

    /// Whether `name` is defined in the given mode.
    #[must_use]
    pub fn contains(&self, mode: Mode, name: &str) -> bool {
        self.get(mode, name).is_some()
    }
}

/// Ligature sequences replaced during text-mode lexing of `tt`-exempt fonts.
pub const LIGATURES: phf::Map<&str, &str> = phf_map!(
    "--" => "\u{2013}",
    "---" => "\u{2014}",
    "``" => "\u{201c}",
    "''" => "\u{201d}",
);

/// Whether `s` is a known ligature sequence.
#[must_use]
pub fn is_ligature(s: &str) -> bool {
    LIGATURES.contains_key(s)
}

/// Replacement character for a ligature sequence.
#[must_use]
pub fn get_ligature_replacement(s: &str) -> Option<&'static str> {
    LIGATURES.get(s).copied()
}

const fn wide_char(high: u16, low: u16) -> char {
    let cp = 0x10000 + (((high as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);
    // SAFETY: callers only pass surrogate halves from the mathematical
    // alphanumeric block, whose combination is always a valid scalar.
    unsafe { char::from_u32_unchecked(cp) }
}

type Spec = (&'static str, char, Group);

const fn bin(name: &'static str, ch: char) -> Spec {
    (name, ch, Group::Atom(Atom::Bin))
}
const fn rel(name: &'static str, ch: char) -> Spec {
    (name, ch, Group::Atom(Atom::Rel))
}
const fn open(name: &'static str, ch: char) -> Spec {
    (name, ch, Group::Atom(Atom::Open))
}
const fn close(name: &'static str, ch: char) -> Spec {
    (name, ch, Group::Atom(Atom::Close))
}
const fn punct(name: &'static str, ch: char) -> Spec {
    (name, ch, Group::Atom(Atom::Punct))
}
const fn inner(name: &'static str, ch: char) -> Spec {
    (name, ch, Group::Atom(Atom::Inner))
}
const fn mathord(name: &'static str, ch: char) -> Spec {
    (name, ch, Group::NonAtom(NonAtom::MathOrd))
}
const fn textord(name: &'static str, ch: char) -> Spec {
    (name, ch, Group::NonAtom(NonAtom::TextOrd))
}
const fn op(name: &'static str, ch: char) -> Spec {
    (name, ch, Group::NonAtom(NonAtom::OpToken))
}
const fn accent(name: &'static str, ch: char) -> Spec {
    (name, ch, Group::NonAtom(NonAtom::AccentToken))
}

/// Main-font math symbols, keyed by command name.
const MAIN_MATH: &[Spec] = &[
    // Relations.
    rel("=", '='),
    rel("<", '<'),
    rel(">", '>'),
    rel(":", ':'),
    rel(r"\equiv", '\u{2261}'),
    rel(r"\prec", '\u{227a}'),
    rel(r"\succ", '\u{227b}'),
    rel(r"\sim", '\u{223c}'),
    rel(r"\perp", '\u{22a5}'),
    rel(r"\preceq", '\u{2aaf}'),
    rel(r"\succeq", '\u{2ab0}'),
    rel(r"\simeq", '\u{2243}'),
    rel(r"\mid", '\u{2223}'),
    rel(r"\ll", '\u{226a}'),
    rel(r"\gg", '\u{226b}'),
    rel(r"\asymp", '\u{224d}'),
    rel(r"\parallel", '\u{2225}'),
    rel(r"\smile", '\u{2323}'),
    rel(r"\frown", '\u{2322}'),
    rel(r"\subseteq", '\u{2286}'),
    rel(r"\supseteq", '\u{2287}'),
    rel(r"\cong", '\u{2245}'),
    rel(r"\approx", '\u{2248}'),
    rel(r"\subset", '\u{2282}'),
    rel(r"\supset", '\u{2283}'),
    rel(r"\in", '\u{2208}'),
    rel(r"\ni", '\u{220b}'),
    rel(r"\propto", '\u{221d}'),
    rel(r"\vdash", '\u{22a2}'),
    rel(r"\dashv", '\u{22a3}'),
    rel(r"\models", '\u{22a8}'),
    rel(r"\leq", '\u{2264}'),
    rel(r"\geq", '\u{2265}'),
    rel(r"\doteq", '\u{2250}'),
    rel(r"\ne", '\u{2260}'),
    rel(r"\neq", '\u{2260}'),
    rel(r"\not", '\u{0338}'),
    // Arrows are relations too.
    rel(r"\leftarrow", '\u{2190}'),
    rel(r"\rightarrow", '\u{2192}'),
    rel(r"\leftrightarrow", '\u{2194}'),
    rel(r"\Leftarrow", '\u{21d0}'),
    rel(r"\Rightarrow", '\u{21d2}'),
    rel(r"\Leftrightarrow", '\u{21d4}'),
    rel(r"\longleftarrow", '\u{27f5}'),
    rel(r"\longrightarrow", '\u{27f6}'),
    rel(r"\longleftrightarrow", '\u{27f7}'),
    rel(r"\Longleftarrow", '\u{27f8}'),
    rel(r"\Longrightarrow", '\u{27f9}'),
    rel(r"\Longleftrightarrow", '\u{27fa}'),
    rel(r"\mapsto", '\u{21a6}'),
    rel(r"\longmapsto", '\u{27fc}'),
    rel(r"\hookleftarrow", '\u{21a9}'),
    rel(r"\hookrightarrow", '\u{21aa}'),
    rel(r"\uparrow", '\u{2191}'),
    rel(r"\downarrow", '\u{2193}'),
    rel(r"\updownarrow", '\u{2195}'),
    rel(r"\Uparrow", '\u{21d1}'),
    rel(r"\Downarrow", '\u{21d3}'),
    rel(r"\Updownarrow", '\u{21d5}'),
    rel(r"\nearrow", '\u{2197}'),
    rel(r"\searrow", '\u{2198}'),
    rel(r"\swarrow", '\u{2199}'),
    rel(r"\nwarrow", '\u{2196}'),
    rel(r"\rightharpoonup", '\u{21c0}'),
    rel(r"\rightharpoondown", '\u{21c1}'),
    rel(r"\leftharpoonup", '\u{21bc}'),
    rel(r"\leftharpoondown", '\u{21bd}'),
    // Binary operators.
    bin("+", '+'),
    bin("*", '*'),
    bin("-", '\u{2212}'),
    bin(r"\pm", '\u{00b1}'),
    bin(r"\mp", '\u{2213}'),
    bin(r"\setminus", '\u{2216}'),
    bin(r"\cdot", '\u{22c5}'),
    bin(r"\ast", '\u{2217}'),
    bin(r"\times", '\u{00d7}'),
    bin(r"\div", '\u{00f7}'),
    bin(r"\star", '\u{22c6}'),
    bin(r"\circ", '\u{2218}'),
    bin(r"\bullet", '\u{2219}'),
    bin(r"\cap", '\u{2229}'),
    bin(r"\cup", '\u{222a}'),
    bin(r"\sqcap", '\u{2293}'),
    bin(r"\sqcup", '\u{2294}'),
    bin(r"\uplus", '\u{228e}'),
    bin(r"\amalg", '\u{2a3f}'),
    bin(r"\vee", '\u{2228}'),
    bin(r"\wedge", '\u{2227}'),
    bin(r"\lor", '\u{2228}'),
    bin(r"\land", '\u{2227}'),
    bin(r"\dagger", '\u{2020}'),
    bin(r"\ddagger", '\u{2021}'),
    bin(r"\wr", '\u{2240}'),
    bin(r"\diamond", '\u{22c4}'),
    bin(r"\oplus", '\u{2295}'),
    bin(r"\ominus", '\u{2296}'),
    bin(r"\otimes", '\u{2297}'),
    bin(r"\oslash", '\u{2298}'),
    bin(r"\odot", '\u{2299}'),
    bin(r"\bigtriangleup", '\u{25b3}'),
    bin(r"\bigtriangledown", '\u{25bd}'),
    bin(r"\bigcirc", '\u{25ef}'),
    bin(r"\triangleleft", '\u{25c3}'),
    bin(r"\triangleright", '\u{25b9}'),
    // Delimiters.
    open("(", '('),
    open("[", '['),
    open(r"\lbrack", '['),
    open(r"\lbrace", '{'),
    open(r"\langle", '\u{27e8}'),
    open(r"\lvert", '\u{2223}'),
    open(r"\lVert", '\u{2225}'),
    open(r"\lceil", '\u{2308}'),
    open(r"\lfloor", '\u{230a}'),
    open(r"\lgroup", '\u{27ee}'),
    open(r"\lmoustache", '\u{23b0}'),
    close(")", ')'),
    close("]", ']'),
    close("?", '?'),
    close("!", '!'),
    close(r"\rbrack", ']'),
    close(r"\rbrace", '}'),
    close(r"\rangle", '\u{27e9}'),
    close(r"\rvert", '\u{2223}'),
    close(r"\rVert", '\u{2225}'),
    close(r"\rceil", '\u{2309}'),
    close(r"\rfloor", '\u{230b}'),
    close(r"\rgroup", '\u{27ef}'),
    close(r"\rmoustache", '\u{23b1}'),
    // Punctuation.
    punct(",", ','),
    punct(";", ';'),
    punct(r"\cdotp", '\u{22c5}'),
    punct(r"\ldotp", '.'),
    // Inner ellipses.
    inner(r"\mathellipsis", '\u{2026}'),
    inner(r"\ldots", '\u{2026}'),
    inner(r"\cdots", '\u{22ef}'),
    // Ordinary symbols.
    textord(r"\vdots", '\u{22ee}'),
    textord(r"\ddots", '\u{22f1}'),
    mathord(r"\#", '#'),
    mathord(r"\&", '&'),
    mathord(r"\$", '$'),
    mathord(r"\%", '%'),
    mathord(r"\_", '_'),
    mathord(r"\aleph", '\u{2135}'),
    mathord(r"\imath", '\u{0131}'),
    mathord(r"\jmath", '\u{0237}'),
    mathord(r"\ell", '\u{2113}'),
    mathord(r"\wp", '\u{2118}'),
    mathord(r"\Re", '\u{211c}'),
    mathord(r"\Im", '\u{2111}'),
    mathord(r"\partial", '\u{2202}'),
    mathord(r"\infty", '\u{221e}'),
    mathord(r"\prime", '\u{2032}'),
    mathord(r"\emptyset", '\u{2205}'),
    mathord(r"\nabla", '\u{2207}'),
    mathord(r"\hbar", '\u{210f}'),
    // Greek lowercase.
    mathord(r"\alpha", '\u{03b1}'),
    mathord(r"\beta", '\u{03b2}'),
    mathord(r"\gamma", '\u{03b3}'),
    mathord(r"\delta", '\u{03b4}'),
    mathord(r"\epsilon", '\u{03f5}'),
    mathord(r"\zeta", '\u{03b6}'),
    mathord(r"\eta", '\u{03b7}'),
    mathord(r"\theta", '\u{03b8}'),
    mathord(r"\iota", '\u{03b9}'),
    mathord(r"\kappa", '\u{03ba}'),
    mathord(r"\lambda", '\u{03bb}'),
    mathord(r"\mu", '\u{03bc}'),
    mathord(r"\nu", '\u{03bd}'),
    mathord(r"\xi", '\u{03be}'),
    mathord(r"\omicron", '\u{03bf}'),
    mathord(r"\pi", '\u{03c0}'),
    mathord(r"\rho", '\u{03c1}'),
    mathord(r"\sigma", '\u{03c3}'),
    mathord(r"\tau", '\u{03c4}'),
    mathord(r"\upsilon", '\u{03c5}'),
    mathord(r"\phi", '\u{03d5}'),
    mathord(r"\chi", '\u{03c7}'),
    mathord(r"\psi", '\u{03c8}'),
    mathord(r"\omega", '\u{03c9}'),
    mathord(r"\varepsilon", '\u{03b5}'),
    mathord(r"\vartheta", '\u{03d1}'),
    mathord(r"\varpi", '\u{03d6}'),
    mathord(r"\varrho", '\u{03f1}'),
    mathord(r"\varsigma", '\u{03c2}'),
    mathord(r"\varphi", '\u{03c6}'),
    // Greek uppercase renders upright, hence textord.
    textord(r"\Gamma", '\u{0393}'),
    textord(r"\Delta", '\u{0394}'),
    textord(r"\Theta", '\u{0398}'),
    textord(r"\Lambda", '\u{039b}'),
    textord(r"\Xi", '\u{039e}'),
    textord(r"\Pi", '\u{03a0}'),
    textord(r"\Sigma", '\u{03a3}'),
    textord(r"\Upsilon", '\u{03a5}'),
    textord(r"\Phi", '\u{03a6}'),
    textord(r"\Psi", '\u{03a8}'),
    textord(r"\Omega", '\u{03a9}'),
    textord(r"\forall", '\u{2200}'),
    textord(r"\exists", '\u{2203}'),
    textord(r"\neg", '\u{00ac}'),
    textord(r"\lnot", '\u{00ac}'),
    textord(r"\top", '\u{22a4}'),
    textord(r"\bot", '\u{22a5}'),
    textord(r"\flat", '\u{266d}'),
    textord(r"\natural", '\u{266e}'),
    textord(r"\sharp", '\u{266f}'),
    textord(r"\clubsuit", '\u{2663}'),
    textord(r"\diamondsuit", '\u{2662}'),
    textord(r"\heartsuit", '\u{2661}'),
    textord(r"\spadesuit", '\u{2660}'),
    textord(r"\angle", '\u{2220}'),
    textord(r"\triangle", '\u{25b3}'),
    textord(r"\dag", '\u{2020}'),
    textord(r"\ddag", '\u{2021}'),
    textord("'", '\u{2032}'),
    // Characters usable as \left / \right delimiters.
    textord(r"\vert", '\u{2223}'),
    textord("|", '\u{2223}'),
    textord(r"\Vert", '\u{2225}'),
    textord(r"\|", '\u{2225}'),
    textord(r"\backslash", '\\'),
    open(r"\{", '{'),
    close(r"\}", '}'),
    textord("/", '/'),
    textord("@", '@'),
    textord("\"", '"'),
    textord(".", '.'),
    mathord(r"\surd", '\u{221a}'),
    // Accent bases.
    accent(r"\acute", '\u{00b4}'),
    accent(r"\grave", '\u{0060}'),
    accent(r"\ddot", '\u{00a8}'),
    accent(r"\tilde", '\u{007e}'),
    accent(r"\bar", '\u{00af}'),
    accent(r"\breve", '\u{02d8}'),
    accent(r"\check", '\u{02c7}'),
    accent(r"\hat", '\u{005e}'),
    accent(r"\vec", '\u{20d7}'),
    accent(r"\dot", '\u{02d9}'),
    accent(r"\mathring", '\u{02da}'),
    accent(r"\widehat", '\u{005e}'),
    accent(r"\widetilde", '\u{007e}'),
    // Big operators.
    op(r"\sum", '\u{2211}'),
    op(r"\prod", '\u{220f}'),
    op(r"\coprod", '\u{2210}'),
    op(r"\int", '\u{222b}'),
    op(r"\oint", '\u{222e}'),
    op(r"\iint", '\u{222c}'),
    op(r"\iiint", '\u{222d}'),
    op(r"\smallint", '\u{222b}'),
    op(r"\bigvee", '\u{22c1}'),
    op(r"\bigwedge", '\u{22c0}'),
    op(r"\bigcap", '\u{22c2}'),
    op(r"\bigcup", '\u{22c3}'),
    op(r"\bigsqcup", '\u{2a06}'),
    op(r"\bigodot", '\u{2a00}'),
    op(r"\bigoplus", '\u{2a01}'),
    op(r"\bigotimes", '\u{2a02}'),
    op(r"\biguplus", '\u{2a04}'),
];

/// AMS-font math symbols.
const AMS_MATH: &[Spec] = &[
    rel(r"\therefore", '\u{2234}'),
    rel(r"\because", '\u{2235}'),
    rel(r"\leqq", '\u{2266}'),
    rel(r"\geqq", '\u{2267}'),
    rel(r"\lesssim", '\u{2272}'),
    rel(r"\gtrsim", '\u{2273}'),
    rel(r"\nless", '\u{226e}'),
    rel(r"\ngtr", '\u{226f}'),
    rel(r"\nleqslant", '\u{e010}'),
    rel(r"\ngeqslant", '\u{e00f}'),
    rel(r"\subsetneq", '\u{228a}'),
    rel(r"\supsetneq", '\u{228b}'),
    rel(r"\vartriangle", '\u{25b3}'),
    rel(r"\triangleq", '\u{225c}'),
    rel(r"\nmid", '\u{2224}'),
    rel(r"\nparallel", '\u{2226}'),
    rel(r"\rightrightarrows", '\u{21c9}'),
    rel(r"\leftleftarrows", '\u{21c7}'),
    rel(r"\rightleftharpoons", '\u{21cc}'),
    rel(r"\leftrightharpoons", '\u{21cb}'),
    bin(r"\boxplus", '\u{229e}'),
    bin(r"\boxminus", '\u{229f}'),
    bin(r"\boxtimes", '\u{22a0}'),
    bin(r"\ltimes", '\u{22c9}'),
    bin(r"\rtimes", '\u{22ca}'),
    bin(r"\circledast", '\u{229b}'),
    bin(r"\circledcirc", '\u{229a}'),
    bin(r"\smallsetminus", '\u{2216}'),
    open(r"\ulcorner", '\u{250c}'),
    open(r"\llcorner", '\u{2514}'),
    close(r"\urcorner", '\u{2510}'),
    close(r"\lrcorner", '\u{2518}'),
    textord(r"\varnothing", '\u{2205}'),
    textord(r"\nexists", '\u{2204}'),
    textord(r"\mho", '\u{2127}'),
    textord(r"\Finv", '\u{2132}'),
    textord(r"\Game", '\u{2141}'),
    textord(r"\beth", '\u{2136}'),
    textord(r"\gimel", '\u{2137}'),
    textord(r"\daleth", '\u{2138}'),
    textord(r"\diagdown", '\u{2572}'),
    textord(r"\diagup", '\u{2571}'),
    textord(r"\blacksquare", '\u{25a0}'),
    textord(r"\lozenge", '\u{25ca}'),
    textord(r"\blacklozenge", '\u{29eb}'),
    textord(r"\checkmark", '\u{2713}'),
    textord(r"\maltese", '\u{2720}'),
    mathord(r"\digamma", '\u{03dd}'),
    mathord(r"\varkappa", '\u{03f0}'),
    textord(r"\hslash", '\u{210f}'),
];

/// Main-font text-mode symbols.
const MAIN_TEXT: &[Spec] = &[
    textord(r"\#", '#'),
    textord(r"\&", '&'),
    textord(r"\$", '$'),
    textord(r"\%", '%'),
    textord(r"\_", '_'),
    textord(r"\{", '{'),
    textord(r"\}", '}'),
    textord(r"\dag", '\u{2020}'),
    textord(r"\ddag", '\u{2021}'),
    textord(r"\textellipsis", '\u{2026}'),
    textord("\u{2013}", '\u{2013}'),
    textord("\u{2014}", '\u{2014}'),
    textord("\u{201c}", '\u{201c}'),
    textord("\u{201d}", '\u{201d}'),
    textord("`", '\u{2018}'),
    textord("'", '\u{2019}'),
    accent(r"\'", '\u{00b4}'),
    accent(r"\`", '\u{0060}'),
    accent("\\\"", '\u{00a8}'),
    accent(r"\^", '\u{02c6}'),
    accent(r"\~", '\u{02dc}'),
    accent(r"\=", '\u{00af}'),
    accent(r"\u", '\u{02d8}'),
    accent(r"\.", '\u{02d9}'),
    accent(r"\r", '\u{02da}'),
    accent(r"\H", '\u{02dd}'),
    accent(r"\v", '\u{02c7}'),
];

/// Build the populated symbol table.
///
/// Named commands, their Unicode equivalents, ASCII letters and digits, and
/// the mathematical alphanumeric block (mapped back to their base letters)
/// are all registered here.
#[must_use]
#[expect(clippy::too_many_lines)]
pub fn create_symbols() -> Symbols {
    let mut symbols = Symbols::empty();

    for &(name, ch, group) in MAIN_MATH {
        symbols.define_symbol(Mode::Math, Font::Main, group, Some(ch), name, true);
    }
    for &(name, ch, group) in AMS_MATH {
        symbols.define_symbol(Mode::Math, Font::Ams, group, Some(ch), name, true);
    }
    for &(name, ch, group) in MAIN_TEXT {
        symbols.define_symbol(Mode::Text, Font::Main, group, Some(ch), name, true);
    }

    // The text-mode accent commands double as control sequences in math
    // via the accent functions; the double-quote accent needs its math
    // spelling too.
    symbols.define_symbol(
        Mode::Text,
        Font::Main,
        Group::NonAtom(NonAtom::AccentToken),
        Some('\u{00a8}'),
        "\\\"",
        false,
    );

    // Spacing symbols; ~ lexes as an active character bound to \nobreakspace.
    for name in [" ", "\\ ", "~", r"\space", r"\nobreakspace"] {
        symbols.define_symbol(
            Mode::Math,
            Font::Main,
            Group::NonAtom(NonAtom::Spacing),
            Some('\u{00a0}'),
            name,
            false,
        );
        symbols.define_symbol(
            Mode::Text,
            Font::Main,
            Group::NonAtom(NonAtom::Spacing),
            Some('\u{00a0}'),
            name,
            false,
        );
    }

    for ch in "0123456789/@.\"".chars() {
        symbols.define_symbol(
            Mode::Math,
            Font::Main,
            Group::NonAtom(NonAtom::TextOrd),
            Some(ch),
            &ch.to_string(),
            false,
        );
    }

    for ch in "0123456789!@*()-=+\";:?/.,".chars() {
        symbols.define_symbol(
            Mode::Text,
            Font::Main,
            Group::NonAtom(NonAtom::TextOrd),
            Some(ch),
            &ch.to_string(),
            false,
        );
    }

    let letters = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    for ch in letters.chars() {
        symbols.define_symbol(
            Mode::Math,
            Font::Main,
            Group::NonAtom(NonAtom::MathOrd),
            Some(ch),
            &ch.to_string(),
            false,
        );
        symbols.define_symbol(
            Mode::Text,
            Font::Main,
            Group::NonAtom(NonAtom::TextOrd),
            Some(ch),
            &ch.to_string(),
            false,
        );
    }

    // Mathematical alphanumeric symbols map back onto their base letters;
    // the styled rendering is recovered from the codepoint by the builders.
    let mut define_wide = |low: u16, base: char, letters_only_26: bool, i: usize| {
        if letters_only_26 && i >= 26 {
            return;
        }
        let wide = wide_char(0xD835, low).to_string();
        symbols.define_symbol(
            Mode::Math,
            Font::Main,
            Group::NonAtom(NonAtom::MathOrd),
            Some(base),
            &wide,
            false,
        );
        symbols.define_symbol(
            Mode::Text,
            Font::Main,
            Group::NonAtom(NonAtom::TextOrd),
            Some(base),
            &wide,
            false,
        );
    };

    for (i, ch) in letters.chars().enumerate() {
        let i16 = i as u16;
        define_wide(0xDC00 + i16, ch, false, i); // bold
        define_wide(0xDC34 + i16, ch, false, i); // italic
        define_wide(0xDC68 + i16, ch, false, i); // bold italic
        define_wide(0xDD04 + i16, ch, false, i); // fraktur
        define_wide(0xDD6C + i16, ch, false, i); // bold fraktur
        define_wide(0xDDA0 + i16, ch, false, i); // sans-serif
        define_wide(0xDDD4 + i16, ch, false, i); // sans bold
        define_wide(0xDE08 + i16, ch, false, i); // sans italic
        define_wide(0xDE70 + i16, ch, false, i); // monospace
        define_wide(0xDD38 + i16, ch, true, i); // double-struck, A-Z only
        define_wide(0xDC9C + i16, ch, true, i); // script, A-Z only
    }
    // Double-struck k sits outside the contiguous block.
    define_wide(0xDD5C, 'k', false, 0);

    for i in 0..10u16 {
        let ch = char::from(b'0' + i as u8);
        define_wide(0xDFCE + i, ch, false, 0); // bold
        define_wide(0xDFE2 + i, ch, false, 0); // sans-serif
        define_wide(0xDFEC + i, ch, false, 0); // bold sans
        define_wide(0xDFF6 + i, ch, false, 0); // monospace
    }

    for ch in "\u{00d0}\u{00de}\u{00fe}".chars() {
        symbols.define_symbol(
            Mode::Math,
            Font::Main,
            Group::NonAtom(NonAtom::MathOrd),
            Some(ch),
            &ch.to_string(),
            false,
        );
        symbols.define_symbol(
            Mode::Text,
            Font::Main,
            Group::NonAtom(NonAtom::TextOrd),
            Some(ch),
            &ch.to_string(),
            false,
        );
    }

    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_symbols() {
        let symbols = create_symbols();
        let equiv = symbols.get_math(r"\equiv").unwrap();
        assert_eq!(equiv.replace, Some('\u{2261}'));
        assert!(matches!(equiv.group, Group::Atom(Atom::Rel)));
        assert_eq!(equiv.font, Font::Main);

        let alpha = symbols.get_math(r"\alpha").unwrap();
        assert_eq!(alpha.replace, Some('\u{03b1}'));
        assert!(matches!(alpha.group, Group::NonAtom(NonAtom::MathOrd)));
    }

    #[test]
    fn test_unicode_keys_accepted() {
        let symbols = create_symbols();
        assert!(symbols.get_math("\u{2261}").is_some());
        assert!(symbols.get_math("\u{03b1}").is_some());
    }

    #[test]
    fn test_modes_are_independent() {
        let symbols = create_symbols();
        // * is a binary operator in math but plain text otherwise.
        assert!(matches!(
            symbols.get_math("*").map(|c| c.group),
            Some(Group::Atom(Atom::Bin))
        ));
        assert!(matches!(
            symbols.get_text("*").map(|c| c.group),
            Some(Group::NonAtom(NonAtom::TextOrd))
        ));
    }

    #[test]
    fn test_text_mode_spaces() {
        let symbols = create_symbols();
        // A literal space survives the text-mode lexer and must resolve
        // like \space does.
        for name in [" ", "\\ ", "~", r"\space", r"\nobreakspace"] {
            let info = symbols.get_text(name).unwrap_or_else(|| panic!("{name:?}"));
            assert_eq!(info.replace, Some('\u{00a0}'), "{name:?}");
            assert!(matches!(info.group, Group::NonAtom(NonAtom::Spacing)));
        }
    }

    #[test]
    fn test_wide_characters_reduce_to_base() {
        let symbols = create_symbols();
        // Mathematical bold capital A.
        let info = symbols.get_math("\u{1d400}").unwrap();
        assert_eq!(info.replace, Some('A'));
        // Double-struck k special case.
        let info = symbols.get_math("\u{1d55c}").unwrap();
        assert_eq!(info.replace, Some('k'));
    }

    #[test]
    fn test_ligatures() {
        assert!(is_ligature("--"));
        assert!(is_ligature("---"));
        assert_eq!(get_ligature_replacement("``"), Some("\u{201c}"));
        assert_eq!(get_ligature_replacement("x"), None);
    }

    #[test]
    fn test_ams_font_tagging() {
        let symbols = create_symbols();
        assert_eq!(symbols.get_math(r"\therefore").map(|c| c.font), Some(Font::Ams));
    }
}
