//! TeX macro assignments: `\def`, `\gdef`, `\edef`, `\xdef`, `\let`,
//! `\futurelet`, and the `\global`/`\long` prefixes.

use phf::phf_map;

use crate::context::EngineContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::macros::{MacroContextInterface as _, MacroDefinition, MacroExpansion};
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeInternal};
use crate::types::{ParseError, ParseErrorKind, Token};

/// Registers the macro assignment commands.
pub fn define_def(ctx: &mut EngineContext) {
    define_prefixes(ctx);
    define_def_cmd(ctx);
    define_let_cmd(ctx);
    define_futurelet_cmd(ctx);
}

/// The global alias of each command a `\global` prefix may precede.
const GLOBAL_IMAGE: phf::Map<&str, &str> = phf_map!(
    "\\global" => "\\global",
    "\\long" => "\\\\globallong",
    "\\\\globallong" => "\\\\globallong",
    "\\def" => "\\gdef",
    "\\gdef" => "\\gdef",
    "\\edef" => "\\xdef",
    "\\xdef" => "\\xdef",
    "\\let" => "\\\\globallet",
    "\\futurelet" => "\\\\globalfuture",
);

/// Tokens that can never name a macro.
fn check_control_sequence(tok: &Token) -> Result<String, ParseError> {
    let name = tok.text.as_str();
    if matches!(name, "\\" | "{" | "}" | "$" | "&" | "#" | "^" | "_" | "EOF") {
        return Err(ParseError::with_token(
            ParseErrorKind::ExpectedControlSequence,
            tok,
        ));
    }
    Ok(name.to_owned())
}

/// An alias for `\let`: reuse the existing definition when there is one,
/// otherwise freeze the token itself as an unexpandable body.
fn let_definition(context: &FunctionContext, tok: &Token) -> MacroDefinition {
    if let Some(existing) = context.parser.gullet.macros().get(tok.text.as_str()) {
        existing.clone()
    } else {
        let mut frozen = tok.clone();
        frozen.noexpand = Some(true);
        let unexpandable = !context.parser.gullet.is_expandable(tok.text.as_str());
        MacroDefinition::Expansion(MacroExpansion {
            tokens: vec![frozen],
            num_args: 0,
            delimiters: None,
            unexpandable: Some(unexpandable),
        })
    }
}

fn define_prefixes(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Internal),
        names: &["\\global", "\\long", "\\\\globallong"],
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            context.parser.consume_spaces()?;
            let mut token = context.parser.fetch()?.clone();
            let Some(&replacement) = GLOBAL_IMAGE.get(token.text.as_str()) else {
                return Err(ParseError::with_token(
                    ParseErrorKind::InvalidTokenAfterMacroPrefix {
                        token: token.text.as_str().to_owned(),
                    },
                    &token,
                ));
            };
            context.parser.consume();
            if (context.func_name == "\\global" || context.func_name == "\\\\globallong")
                && replacement != token.text.as_str()
            {
                token.set_text(replacement);
            }
            context.parser.gullet.push_token(token);
            context
                .parser
                .parse_function(context.break_on_token_text, None)?
                .ok_or_else(|| ParseError::new(ParseErrorKind::ExpectedFunctionAfterPrefix))
        }),
        html_builder: None,
        mathml_builder: None,
    });
}

fn define_def_cmd(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Internal),
        names: &["\\def", "\\gdef", "\\edef", "\\xdef"],
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            primitive: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            let name_tok = context.parser.gullet.pop_token()?;
            let name = check_control_sequence(&name_tok)?;

            // Read the parameter text up to the opening brace of the body.
            let mut num_args = 0usize;
            let mut delimiters: Vec<Vec<String>> = vec![Vec::new()];
            let mut insert: Option<Token> = None;

            loop {
                if context.parser.gullet.future_mut()?.text == "{" {
                    break;
                }
                let tok = context.parser.gullet.pop_token()?;
                if tok.text == "#" {
                    // `#{` ends the parameter text and makes `{` a
                    // delimiter of the last parameter.
                    if context.parser.gullet.future_mut()?.text == "{" {
                        insert = Some(context.parser.gullet.future_mut()?);
                        delimiters[num_args].push("{".to_owned());
                        break;
                    }
                    let arg_tok = context.parser.gullet.pop_token()?;
                    let digit = arg_tok.text.as_str();
                    if digit.len() != 1
                        || !digit
                            .chars()
                            .next()
                            .is_some_and(|c| c.is_ascii_digit() && c != '0')
                    {
                        return Err(ParseError::with_token(
                            ParseErrorKind::InvalidMacroArgumentNumber {
                                value: digit.to_owned(),
                            },
                            &arg_tok,
                        ));
                    }
                    let arg_num: usize = digit.parse().map_err(|_| {
                        ParseError::with_token(
                            ParseErrorKind::InvalidMacroArgumentNumber {
                                value: digit.to_owned(),
                            },
                            &arg_tok,
                        )
                    })?;
                    if arg_num != num_args + 1 {
                        return Err(ParseError::with_token(
                            ParseErrorKind::ExpectedMacroParameter {
                                expected: num_args + 1,
                                found: arg_num,
                            },
                            &arg_tok,
                        ));
                    }
                    num_args += 1;
                    delimiters.push(Vec::new());
                } else if tok.text == "EOF" {
                    return Err(ParseError::with_token(
                        ParseErrorKind::ExpectedMacroDefinition,
                        &tok,
                    ));
                } else {
                    delimiters[num_args].push(tok.text.as_str().to_owned());
                }
            }

            let arg = context.parser.gullet.consume_arg(None)?;
            let mut tokens = arg.tokens;
            if let Some(ins) = insert {
                tokens.insert(0, ins);
            }

            let global = matches!(context.func_name.as_str(), "\\gdef" | "\\xdef");
            if matches!(context.func_name.as_str(), "\\edef" | "\\xdef") {
                // \edef and \xdef fully expand the body at definition time.
                tokens = context.parser.gullet.expand_tokens(tokens)?;
                tokens.reverse();
            }

            context.parser.gullet.macros_mut().set(
                &name,
                Some(MacroDefinition::Expansion(MacroExpansion {
                    tokens,
                    num_args,
                    delimiters: Some(delimiters),
                    unexpandable: None,
                })),
                global,
            );

            Ok(AnyParseNode::Internal(ParseNodeInternal {
                mode: context.parser.mode,
                loc: context.loc(),
            }))
        }),
        html_builder: None,
        mathml_builder: None,
    });
}

fn define_let_cmd(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Internal),
        names: &["\\let", "\\\\globallet"],
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            primitive: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            let name_tok = context.parser.gullet.pop_token()?;
            let name = check_control_sequence(&name_tok)?;

            context.parser.gullet.consume_spaces()?;

            // An optional `=` with one optional space follows the name.
            let rhs_tok = {
                let tok = context.parser.gullet.pop_token()?;
                if tok.text == "=" {
                    let next_tok = context.parser.gullet.pop_token()?;
                    if next_tok.text == " " {
                        context.parser.gullet.pop_token()?
                    } else {
                        next_tok
                    }
                } else {
                    tok
                }
            };

            let global = context.func_name == "\\\\globallet";
            let macro_def = let_definition(&context, &rhs_tok);
            context
                .parser
                .gullet
                .macros_mut()
                .set(&name, Some(macro_def), global);

            Ok(AnyParseNode::Internal(ParseNodeInternal {
                mode: context.parser.mode,
                loc: context.loc(),
            }))
        }),
        html_builder: None,
        mathml_builder: None,
    });
}

fn define_futurelet_cmd(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Internal),
        names: &["\\futurelet", "\\\\globalfuture"],
        props: FunctionPropSpec {
            num_args: 0,
            allowed_in_text: true,
            primitive: true,
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, _args, _opt_args| {
            let name_tok = context.parser.gullet.pop_token()?;
            let name = check_control_sequence(&name_tok)?;

            let middle_tok = context.parser.gullet.pop_token()?;
            let tok = context.parser.gullet.pop_token()?;

            let global = context.func_name == "\\\\globalfuture";
            let macro_def = let_definition(&context, &tok);
            context
                .parser
                .gullet
                .macros_mut()
                .set(&name, Some(macro_def), global);

            // Both inspected tokens go back on the stream.
            context.parser.gullet.push_token(tok);
            context.parser.gullet.push_token(middle_tok);

            Ok(AnyParseNode::Internal(ParseNodeInternal {
                mode: context.parser.mode,
                loc: context.loc(),
            }))
        }),
        html_builder: None,
        mathml_builder: None,
    });
}
