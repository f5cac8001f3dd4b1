//! The builtin macro table, consulted after user macros and before
//! functions and symbols.

use std::io::{self, Write as _};

use phf::{phf_map, phf_set};

use crate::macros::{MacroContextInterface, MacroDefinition, MacroExpansion, MacroExpansionResult};
use crate::symbols::{Atom, Group};
use crate::types::{Mode, ParseError, ParseErrorKind, TokenText};

/// Which `\dots` variant a following token selects.
const DOTS_TYPE: phf::Map<&'static str, &'static str> = phf_map! {
    "," => "\\dotsc",
    "\\not" => "\\dotsb",
    "\\DOTSB" => "\\dotsb",
    "\\coprod" => "\\dotsb",
    "\\bigvee" => "\\dotsb",
    "\\bigwedge" => "\\dotsb",
    "\\biguplus" => "\\dotsb",
    "\\bigcap" => "\\dotsb",
    "\\bigcup" => "\\dotsb",
    "\\prod" => "\\dotsb",
    "\\sum" => "\\dotsb",
    "\\bigotimes" => "\\dotsb",
    "\\bigoplus" => "\\dotsb",
    "\\bigodot" => "\\dotsb",
    "\\bigsqcup" => "\\dotsb",
    "\\longrightarrow" => "\\dotsb",
    "\\Longrightarrow" => "\\dotsb",
    "\\longleftarrow" => "\\dotsb",
    "\\Longleftarrow" => "\\dotsb",
    "\\longleftrightarrow" => "\\dotsb",
    "\\Longleftrightarrow" => "\\dotsb",
    "\\mapsto" => "\\dotsb",
    "\\longmapsto" => "\\dotsb",
    "\\hookrightarrow" => "\\dotsb",
    "\\doteq" => "\\dotsb",
    "\\mathbin" => "\\dotsb",
    "\\mathrel" => "\\dotsb",
    "\\DOTSI" => "\\dotsi",
    "\\int" => "\\dotsi",
    "\\oint" => "\\dotsi",
    "\\iint" => "\\dotsi",
    "\\iiint" => "\\dotsi",
    "\\DOTSX" => "\\dotsx",
};

/// Tokens after which `\dotso` gets a trailing thin space.
const IS_SPACE_AFTER_DOTS: phf::Set<&'static str> = phf_set! {
    ")",
    "]",
    "\\rbrack",
    "\\}",
    "\\rbrace",
    "\\rangle",
    "\\rceil",
    "\\rfloor",
    "\\rgroup",
    "\\rmoustache",
    "\\right",
    "\\bigr",
    "\\biggr",
    "\\Bigr",
    "\\Biggr",
    "$",
    ";",
    ".",
    ",",
};

/// `\newcommand` and friends, differing only in their redefinition policy.
fn new_command(
    context: &mut dyn MacroContextInterface,
    exists_ok: bool,
    nonexists_ok: bool,
    skip_if_exists: bool,
) -> Result<MacroExpansionResult, ParseError> {
    let arg = context.consume_arg(None)?.tokens;
    if arg.len() != 1 {
        return Err(ParseError::new(ParseErrorKind::ExpectedControlSequence));
    }

    let name = arg[0].text.as_str().to_owned();
    let exists = context.is_defined(&name);
    if exists && !exists_ok {
        return Err(ParseError::new(ParseErrorKind::NewcommandRedefinition {
            name: name.clone(),
        }));
    }
    if !exists && !nonexists_ok {
        return Err(ParseError::new(ParseErrorKind::RenewcommandNonexistent {
            name: name.clone(),
        }));
    }

    let mut num_args = 0;
    let mut body = context.consume_arg(None)?.tokens;
    if body.len() == 1 && body[0].text == "[" {
        let mut arg_text = String::new();
        let mut token = context.expand_next_token()?;
        while token.text != "]" && token.text != "EOF" {
            arg_text += token.text.as_str();
            token = context.expand_next_token()?;
        }
        num_args = arg_text
            .parse::<usize>()
            .map_err(|_| ParseError::new(ParseErrorKind::InvalidNewcommandArgumentCount))?;
        body = context.consume_arg(None)?.tokens;
    }

    if !(exists && skip_if_exists) {
        context.macros_mut().set(
            &name,
            Some(MacroDefinition::Expansion(MacroExpansion {
                tokens: body,
                num_args,
                ..Default::default()
            })),
            false,
        );
    }

    Ok(MacroExpansionResult::Empty)
}

/// Builtin macros, equivalent to a LaTeX format file preamble.
pub const BUILTIN_MACROS: phf::Map<&str, MacroDefinition> = phf_map! {
    "\\noexpand" => MacroDefinition::StaticFunction(|context| {
        // The expansion is the token itself, but an expandable token gets
        // copied with flags making the parser treat it as \relax.
        let mut token = context.pop_token()?;
        if context.is_expandable(token.text.as_str()) {
            token.noexpand = Some(true);
            token.treat_as_relax = Some(true);
        }
        Ok(MacroExpansionResult::Expansion(MacroExpansion {
            tokens: vec![token],
            num_args: 0,
            ..Default::default()
        }))
    }),
    "\\expandafter" => MacroDefinition::StaticFunction(|context| {
        let t = context.pop_token()?;
        let _ = context.expand_once(Some(true))?;
        Ok(MacroExpansionResult::Expansion(MacroExpansion {
            tokens: vec![t],
            num_args: 0,
            ..Default::default()
        }))
    }),
    "\\@firstoftwo" => MacroDefinition::StaticFunction(|context| {
        let args = context.consume_args(2)?;
        Ok(MacroExpansionResult::Expansion(MacroExpansion {
            tokens: args[0].clone(),
            num_args: 0,
            ..Default::default()
        }))
    }),
    "\\@secondoftwo" => MacroDefinition::StaticFunction(|context| {
        let args = context.consume_args(2)?;
        Ok(MacroExpansionResult::Expansion(MacroExpansion {
            tokens: args[1].clone(),
            num_args: 0,
            ..Default::default()
        }))
    }),
    "\\@ifnextchar" => MacroDefinition::StaticFunction(|context| {
        // Looks ahead past spaces to the next unexpanded token; expands to
        // the second argument when it matches the first, else the third.
        let args = context.consume_args(3)?;
        context.consume_spaces()?;
        let next_token = context.future_mut()?;
        let branch = if args[0].len() == 1 && args[0][0].text == next_token.text {
            args[1].clone()
        } else {
            args[2].clone()
        };
        Ok(MacroExpansionResult::Expansion(MacroExpansion {
            tokens: branch,
            num_args: 0,
            ..Default::default()
        }))
    }),
    "\\@ifstar" => MacroDefinition::StaticStr("\\@ifnextchar *{\\@firstoftwo{#1}}"),
    "\\TextOrMath" => MacroDefinition::StaticFunction(|context| {
        let args = context.consume_args(2)?;
        let tokens = if context.mode() == Mode::Text {
            args[0].clone()
        } else {
            args[1].clone()
        };
        Ok(MacroExpansionResult::Expansion(MacroExpansion {
            tokens,
            num_args: 0,
            ..Default::default()
        }))
    }),
    "\\char" => MacroDefinition::StaticFunction(|context| {
        // \char123, \char'123, \char"123 and \char`x per the TeXbook; all
        // reduce to a \@char{n} call the parser resolves to a glyph.
        let token = context.pop_token()?;
        let text_to_value = |s: &str| -> Option<u32> {
            let mut chars = s.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return None;
            };
            c.to_digit(16)
        };

        let parse_number = |first: &TokenText,
                            base: u32,
                            context: &mut dyn MacroContextInterface|
         -> Result<u32, ParseError> {
            let mut number = match text_to_value(first.as_str()) {
                Some(digit) if digit < base => digit,
                _ => {
                    return Err(ParseError::new(ParseErrorKind::InvalidValue {
                        context: "\\char".to_owned(),
                        value: first.as_str().to_owned(),
                    }));
                }
            };
            while let Ok(tok) = context.future_mut()
                && tok.text != "EOF"
            {
                match text_to_value(tok.text.as_str()) {
                    Some(digit) if digit < base => {
                        number = number * base + digit;
                        context.pop_token()?;
                    }
                    _ => break,
                }
            }
            Ok(number)
        };

        let number = match token.text.as_str() {
            "'" => {
                let tok = context.pop_token()?;
                let text = tok.text;
                parse_number(&text, 8, context)?
            }
            "\"" => {
                let tok = context.pop_token()?;
                let text = tok.text;
                parse_number(&text, 16, context)?
            }
            "`" => {
                let tok = context.pop_token()?;
                let code_at = usize::from(tok.text.as_str().starts_with('\\'));
                if tok.text == "EOF" {
                    return Err(ParseError::new(ParseErrorKind::InvalidValue {
                        context: "\\char".to_owned(),
                        value: "EOF".to_owned(),
                    }));
                }
                tok.text
                    .as_str()
                    .chars()
                    .nth(code_at)
                    .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidValue {
                        context: "\\char".to_owned(),
                        value: tok.text.as_str().to_owned(),
                    }))? as u32
            }
            _ => parse_number(&token.text, 10, context)?,
        };

        Ok(MacroExpansionResult::String(format!("\\@char{{{number}}}")))
    }),
    "\\newcommand" => MacroDefinition::StaticFunction(|context| {
        new_command(context, false, true, false)
    }),
    "\\renewcommand" => MacroDefinition::StaticFunction(|context| {
        new_command(context, true, false, false)
    }),
    "\\providecommand" => MacroDefinition::StaticFunction(|context| {
        new_command(context, true, true, true)
    }),

    "\\message" => MacroDefinition::StaticFunction(|context| {
        let args = context.consume_args(1)?;
        let msg = args[0]
            .iter()
            .rev()
            .map(|t| t.text.as_str())
            .collect::<String>();
        let mut handle = io::stdout().lock();
        let _ = writeln!(handle, "{msg}");
        Ok(MacroExpansionResult::Empty)
    }),
    "\\errmessage" => MacroDefinition::StaticFunction(|context| {
        let args = context.consume_args(1)?;
        let msg = args[0]
            .iter()
            .rev()
            .map(|t| t.text.as_str())
            .collect::<String>();
        let mut handle = io::stderr().lock();
        let _ = writeln!(handle, "{msg}");
        Ok(MacroExpansionResult::Empty)
    }),

    // Grouping.
    "\\bgroup" => MacroDefinition::StaticStr("{"),
    "\\egroup" => MacroDefinition::StaticStr("}"),

    // latex.ltx basics.
    "~" => MacroDefinition::StaticStr("\\nobreakspace"),
    "\\lq" => MacroDefinition::StaticStr("`"),
    "\\rq" => MacroDefinition::StaticStr("'"),
    "\\aa" => MacroDefinition::StaticStr("\\r a"),
    "\\AA" => MacroDefinition::StaticStr("\\r A"),
    "\\mathstrut" => MacroDefinition::StaticStr("\\vphantom{(}"),
    "\\underbar" => MacroDefinition::StaticStr("\\underline{\\text{#1}}"),
    "\\newline" => MacroDefinition::StaticStr("\\\\\\relax"),

    "\\notin" => MacroDefinition::StaticStr("\\mathrel{\\char`\u{2209}}"),
    "\u{2209}" => MacroDefinition::StaticStr("\\notin"),

    // Script and Fraktur letters outside the contiguous Unicode block.
    "\u{212C}" => MacroDefinition::StaticStr("\\mathscr{B}"),
    "\u{2130}" => MacroDefinition::StaticStr("\\mathscr{E}"),
    "\u{2131}" => MacroDefinition::StaticStr("\\mathscr{F}"),
    "\u{210B}" => MacroDefinition::StaticStr("\\mathscr{H}"),
    "\u{2110}" => MacroDefinition::StaticStr("\\mathscr{I}"),
    "\u{2112}" => MacroDefinition::StaticStr("\\mathscr{L}"),
    "\u{2133}" => MacroDefinition::StaticStr("\\mathscr{M}"),
    "\u{211B}" => MacroDefinition::StaticStr("\\mathscr{R}"),
    "\u{212D}" => MacroDefinition::StaticStr("\\mathfrak{C}"),
    "\u{210C}" => MacroDefinition::StaticStr("\\mathfrak{H}"),
    "\u{2128}" => MacroDefinition::StaticStr("\\mathfrak{Z}"),
    "\\Bbbk" => MacroDefinition::StaticStr("\\mathbb{k}"),
    "\u{00B7}" => MacroDefinition::StaticStr("\\cdotp"),

    // amsmath dots.
    "\\dotsb" => MacroDefinition::StaticStr("\\cdots"),
    "\\dotsm" => MacroDefinition::StaticStr("\\cdots"),
    "\\dotsi" => MacroDefinition::StaticStr("\\!\\cdots"),
    "\\dotsx" => MacroDefinition::StaticStr("\\ldots\\,"),
    "\\dots" => MacroDefinition::StaticFunction(|context| {
        // \dots chooses its shape from the token that follows.
        let mut thedots = "\\dotso";
        let next = context.expand_after_future()?.text;
        if let Some(dots_type) = DOTS_TYPE.get(next.as_str()) {
            thedots = dots_type;
        } else if next.as_str().starts_with("\\not") {
            thedots = "\\dotsb";
        } else if let Some(char_info) = context.context().symbols.get_math(next.as_str())
            && let Group::Atom(Atom::Bin | Atom::Rel) = char_info.group
        {
            thedots = "\\dotsb";
        }
        Ok(MacroExpansionResult::String(thedots.to_owned()))
    }),
    "\\dotso" => MacroDefinition::StaticFunction(|context| {
        let next = context.future_mut()?.text;
        if IS_SPACE_AFTER_DOTS.contains(next.as_str()) {
            Ok(MacroExpansionResult::String("\\ldots\\,".to_owned()))
        } else {
            Ok(MacroExpansionResult::String("\\ldots".to_owned()))
        }
    }),
    "\\dotsc" => MacroDefinition::StaticFunction(|context| {
        let next = context.future_mut()?.text;
        if IS_SPACE_AFTER_DOTS.contains(next.as_str()) && next != "," {
            Ok(MacroExpansionResult::String("\\ldots\\,".to_owned()))
        } else {
            Ok(MacroExpansionResult::String("\\ldots".to_owned()))
        }
    }),
    "\\DOTSI" => MacroDefinition::StaticStr("\\relax"),
    "\\DOTSB" => MacroDefinition::StaticStr("\\relax"),
    "\\DOTSX" => MacroDefinition::StaticStr("\\relax"),

    // Spacing, following amsmath's overrides of the LaTeX defaults.
    "\\tmspace" => MacroDefinition::StaticStr("\\TextOrMath{\\kern#1#3}{\\mskip#1#2}\\relax"),
    "\\," => MacroDefinition::StaticStr("\\tmspace+{3mu}{.1667em}"),
    "\\thinspace" => MacroDefinition::StaticStr("\\,"),
    "\\>" => MacroDefinition::StaticStr("\\mskip{4mu}"),
    "\\:" => MacroDefinition::StaticStr("\\tmspace+{4mu}{.2222em}"),
    "\\medspace" => MacroDefinition::StaticStr("\\:"),
    "\\;" => MacroDefinition::StaticStr("\\tmspace+{5mu}{.2777em}"),
    "\\thickspace" => MacroDefinition::StaticStr("\\;"),
    "\\!" => MacroDefinition::StaticStr("\\tmspace-{3mu}{.1667em}"),
    "\\negthinspace" => MacroDefinition::StaticStr("\\!"),
    "\\negmedspace" => MacroDefinition::StaticStr("\\tmspace-{4mu}{.2222em}"),
    "\\negthickspace" => MacroDefinition::StaticStr("\\tmspace-{5mu}{.277em}"),
    "\\enspace" => MacroDefinition::StaticStr("\\kern.5em "),
    "\\enskip" => MacroDefinition::StaticStr("\\hskip.5em\\relax"),
    "\\quad" => MacroDefinition::StaticStr("\\hskip1em\\relax"),
    "\\qquad" => MacroDefinition::StaticStr("\\hskip2em\\relax"),

    // \tag dispatches on the star form; the worker stores the text into
    // \df@tag, which the top-level parse collects.
    "\\tag" => MacroDefinition::StaticStr("\\@ifstar\\tag@literal\\tag@paren"),
    "\\tag@paren" => MacroDefinition::StaticStr("\\tag@literal{({#1})}"),
    "\\tag@literal" => MacroDefinition::StaticFunction(|context| {
        if context.macros().get("\\df@tag").is_some() {
            return Err(ParseError::new(ParseErrorKind::MultipleTag));
        }
        Ok(MacroExpansionResult::String(
            "\\gdef\\df@tag{\\text{#1}}".to_owned(),
        ))
    }),

    "\\bmod" => MacroDefinition::StaticStr("\\mskip5mu\\mathbin{\\mathrm{mod}}\\mskip5mu"),
    "\\pod" => MacroDefinition::StaticStr("\\allowbreak\\mkern8mu(#1)"),
    "\\pmod" => MacroDefinition::StaticStr("\\pod{\\mathrm{mod}\\mkern6mu#1}"),
    "\\mod" => MacroDefinition::StaticStr("\\allowbreak\\mkern12mu\\mathrm{mod}\\,\\,#1"),

    // \hspace and its star form.
    "\\hspace" => MacroDefinition::StaticStr("\\@ifstar\\@hspacer\\@hspace"),
    "\\@hspace" => MacroDefinition::StaticStr("\\hskip #1\\relax"),
    "\\@hspacer" => MacroDefinition::StaticStr("\\rule{0pt}{0pt}\\hskip #1\\relax"),

    // amsmath italic capital Greek.
    "\\varGamma" => MacroDefinition::StaticStr("\\mathit{\\Gamma}"),
    "\\varDelta" => MacroDefinition::StaticStr("\\mathit{\\Delta}"),
    "\\varTheta" => MacroDefinition::StaticStr("\\mathit{\\Theta}"),
    "\\varLambda" => MacroDefinition::StaticStr("\\mathit{\\Lambda}"),
    "\\varXi" => MacroDefinition::StaticStr("\\mathit{\\Xi}"),
    "\\varPi" => MacroDefinition::StaticStr("\\mathit{\\Pi}"),
    "\\varSigma" => MacroDefinition::StaticStr("\\mathit{\\Sigma}"),
    "\\varUpsilon" => MacroDefinition::StaticStr("\\mathit{\\Upsilon}"),
    "\\varPhi" => MacroDefinition::StaticStr("\\mathit{\\Phi}"),
    "\\varPsi" => MacroDefinition::StaticStr("\\mathit{\\Psi}"),
    "\\varOmega" => MacroDefinition::StaticStr("\\mathit{\\Omega}"),

    "\\colon" => MacroDefinition::StaticStr("\\nobreak\\mskip2mu\\mathpunct{:}\\mskip6mu\\relax"),
    "\\iff" => MacroDefinition::StaticStr("\\DOTSB\\;\\Longleftrightarrow\\;"),
    "\\implies" => MacroDefinition::StaticStr("\\DOTSB\\;\\Longrightarrow\\;"),
    "\\impliedby" => MacroDefinition::StaticStr("\\DOTSB\\;\\Longleftarrow\\;"),

    // mathtools colon relations, plain renditions.
    "\\ordinarycolon" => MacroDefinition::StaticStr(":"),
    "\\vcentcolon" => MacroDefinition::StaticStr("\\mathrel{\\mathop\\ordinarycolon}"),
    "\\dblcolon" => MacroDefinition::StaticStr("\\mathrel{\\vcentcolon\\mathrel{\\mkern-.9mu}\\vcentcolon}"),
    "\\coloneqq" => MacroDefinition::StaticStr("\\mathrel{\\vcentcolon\\mathrel{\\mkern-1.2mu}=}"),
    "\\eqqcolon" => MacroDefinition::StaticStr("\\mathrel{=\\mathrel{\\mkern-1.2mu}\\vcentcolon}"),
    "\\colonequals" => MacroDefinition::StaticStr("\\coloneqq"),
    "\\equalscolon" => MacroDefinition::StaticStr("\\eqqcolon"),
    "\u{2237}" => MacroDefinition::StaticStr("\\dblcolon"),
    "\u{2254}" => MacroDefinition::StaticStr("\\coloneqq"),
    "\u{2255}" => MacroDefinition::StaticStr("\\eqqcolon"),

    "\\limsup" => MacroDefinition::StaticStr("\\DOTSB\\operatorname*{lim\\,sup}"),
    "\\liminf" => MacroDefinition::StaticStr("\\DOTSB\\operatorname*{lim\\,inf}"),
    "\\argmin" => MacroDefinition::StaticStr("\\DOTSB\\operatorname*{arg\\,min}"),
    "\\argmax" => MacroDefinition::StaticStr("\\DOTSB\\operatorname*{arg\\,max}"),
    "\\injlim" => MacroDefinition::StaticStr("\\DOTSB\\operatorname*{inj\\,lim}"),
    "\\projlim" => MacroDefinition::StaticStr("\\DOTSB\\operatorname*{proj\\,lim}"),
    "\\operatorname" => MacroDefinition::StaticStr("\\@ifstar\\operatornamewithlimits\\operatorname@"),

    // braket.sty.
    "\\bra" => MacroDefinition::StaticStr("\\mathinner{\\langle{#1}|}"),
    "\\ket" => MacroDefinition::StaticStr("\\mathinner{|{#1}\\rangle}"),
    "\\braket" => MacroDefinition::StaticStr("\\mathinner{\\langle{#1}\\rangle}"),
    "\\Bra" => MacroDefinition::StaticStr("\\left\\langle#1\\right|"),
    "\\Ket" => MacroDefinition::StaticStr("\\left|#1\\right\\rangle"),

    // texvc aliases.
    "\\darr" => MacroDefinition::StaticStr("\\downarrow"),
    "\\dArr" => MacroDefinition::StaticStr("\\Downarrow"),
    "\\uarr" => MacroDefinition::StaticStr("\\uparrow"),
    "\\uArr" => MacroDefinition::StaticStr("\\Uparrow"),
    "\\larr" => MacroDefinition::StaticStr("\\leftarrow"),
    "\\lArr" => MacroDefinition::StaticStr("\\Leftarrow"),
    "\\rarr" => MacroDefinition::StaticStr("\\rightarrow"),
    "\\rArr" => MacroDefinition::StaticStr("\\Rightarrow"),
    "\\harr" => MacroDefinition::StaticStr("\\leftrightarrow"),
    "\\hArr" => MacroDefinition::StaticStr("\\Leftrightarrow"),
    "\\lang" => MacroDefinition::StaticStr("\\langle"),
    "\\rang" => MacroDefinition::StaticStr("\\rangle"),
    "\\N" => MacroDefinition::StaticStr("\\mathbb{N}"),
    "\\R" => MacroDefinition::StaticStr("\\mathbb{R}"),
    "\\Z" => MacroDefinition::StaticStr("\\mathbb{Z}"),
    "\\natnums" => MacroDefinition::StaticStr("\\mathbb{N}"),
    "\\reals" => MacroDefinition::StaticStr("\\mathbb{R}"),
    "\\Reals" => MacroDefinition::StaticStr("\\mathbb{R}"),
    "\\cnums" => MacroDefinition::StaticStr("\\mathbb{C}"),
    "\\Complex" => MacroDefinition::StaticStr("\\mathbb{C}"),
    "\\alef" => MacroDefinition::StaticStr("\\aleph"),
    "\\alefsym" => MacroDefinition::StaticStr("\\aleph"),
    "\\bull" => MacroDefinition::StaticStr("\\bullet"),
    "\\clubs" => MacroDefinition::StaticStr("\\clubsuit"),
    "\\diamonds" => MacroDefinition::StaticStr("\\diamondsuit"),
    "\\hearts" => MacroDefinition::StaticStr("\\heartsuit"),
    "\\spades" => MacroDefinition::StaticStr("\\spadesuit"),
    "\\empty" => MacroDefinition::StaticStr("\\emptyset"),
    "\\exist" => MacroDefinition::StaticStr("\\exists"),
    "\\isin" => MacroDefinition::StaticStr("\\in"),
    "\\sub" => MacroDefinition::StaticStr("\\subset"),
    "\\sube" => MacroDefinition::StaticStr("\\subseteq"),
    "\\supe" => MacroDefinition::StaticStr("\\supseteq"),
    "\\infin" => MacroDefinition::StaticStr("\\infty"),
    "\\real" => MacroDefinition::StaticStr("\\Re"),
    "\\image" => MacroDefinition::StaticStr("\\Im"),
    "\\weierp" => MacroDefinition::StaticStr("\\wp"),
    "\\plusmn" => MacroDefinition::StaticStr("\\pm"),
    "\\sdot" => MacroDefinition::StaticStr("\\cdot"),
    "\\Dagger" => MacroDefinition::StaticStr("\\ddagger"),
    "\\thetasym" => MacroDefinition::StaticStr("\\vartheta"),
    "\\Alpha" => MacroDefinition::StaticStr("\\mathrm{A}"),
    "\\Beta" => MacroDefinition::StaticStr("\\mathrm{B}"),
    "\\Epsilon" => MacroDefinition::StaticStr("\\mathrm{E}"),
    "\\Zeta" => MacroDefinition::StaticStr("\\mathrm{Z}"),
    "\\Eta" => MacroDefinition::StaticStr("\\mathrm{H}"),
    "\\Iota" => MacroDefinition::StaticStr("\\mathrm{I}"),
    "\\Kappa" => MacroDefinition::StaticStr("\\mathrm{K}"),
    "\\Mu" => MacroDefinition::StaticStr("\\mathrm{M}"),
    "\\Nu" => MacroDefinition::StaticStr("\\mathrm{N}"),
    "\\Omicron" => MacroDefinition::StaticStr("\\mathrm{O}"),
    "\\Rho" => MacroDefinition::StaticStr("\\mathrm{P}"),
    "\\Tau" => MacroDefinition::StaticStr("\\mathrm{T}"),
    "\\Chi" => MacroDefinition::StaticStr("\\mathrm{X}"),

    // Short color shorthands.
    "\\blue" => MacroDefinition::StaticStr("\\textcolor{##6495ed}{#1}"),
    "\\orange" => MacroDefinition::StaticStr("\\textcolor{##ffa500}{#1}"),
    "\\pink" => MacroDefinition::StaticStr("\\textcolor{##ff00af}{#1}"),
    "\\red" => MacroDefinition::StaticStr("\\textcolor{##df0030}{#1}"),
    "\\green" => MacroDefinition::StaticStr("\\textcolor{##28ae7b}{#1}"),
    "\\gray" => MacroDefinition::StaticStr("\\textcolor{gray}{#1}"),
    "\\purple" => MacroDefinition::StaticStr("\\textcolor{##9d38bd}{#1}"),

    // From the array environment.
    "\\nonumber" => MacroDefinition::StaticStr("\\gdef\\@eqnsw{0}"),
    "\\notag" => MacroDefinition::StaticStr("\\nonumber"),
};
