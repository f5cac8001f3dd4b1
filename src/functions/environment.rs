//! `\begin` and `\end`, the gateway into the environment registry.

use crate::context::EngineContext;
use crate::define_environment::EnvContext;
use crate::define_function::{FunctionContext, FunctionDefSpec, FunctionPropSpec};
use crate::parser::parse_node::{AnyParseNode, NodeType, ParseNodeEnvironment};
use crate::types::{ArgType, Mode, ParseError, ParseErrorKind};

/// Reads the environment name out of the text-mode name group.
fn environment_name(name_group: &AnyParseNode) -> Result<String, ParseError> {
    let AnyParseNode::OrdGroup(ord) = name_group else {
        return Err(ParseError::new(ParseErrorKind::InvalidEnvironmentName {
            found: NodeType::from(name_group).to_string(),
        }));
    };

    let mut name = String::new();
    for node in &ord.body {
        let AnyParseNode::TextOrd(text_ord) = node else {
            return Err(ParseError::new(ParseErrorKind::InvalidEnvironmentName {
                found: NodeType::from(node).to_string(),
            }));
        };
        name.push_str(&text_ord.text);
    }

    Ok(name)
}

/// Registers `\begin` and `\end`.
pub fn define_environment_delimiters(ctx: &mut EngineContext) {
    ctx.define_function(FunctionDefSpec {
        node_type: Some(NodeType::Environment),
        names: &["\\begin", "\\end"],
        props: FunctionPropSpec {
            num_args: 1,
            arg_types: Some(vec![ArgType::Mode(Mode::Text)]),
            ..Default::default()
        },
        handler: Some(|context: FunctionContext, args, _opt_args| {
            let name_group = args[0].clone();
            let env_name = environment_name(&name_group)?;

            if context.func_name == "\\end" {
                // The \begin handler consumes this node and verifies the
                // names match.
                return Ok(AnyParseNode::Environment(Box::new(ParseNodeEnvironment {
                    mode: context.parser.mode,
                    loc: context.loc(),
                    name: env_name,
                    name_group: Box::new(name_group),
                })));
            }

            let engine = context.parser.ctx;
            let Some(env) = engine.environments.get(&env_name) else {
                return Err(ParseError::new(ParseErrorKind::NoSuchEnvironment {
                    name: env_name,
                }));
            };

            // Consume the environment's arguments, then hand the parser
            // to its handler for the body.
            let (env_args, env_opt_args) = context
                .parser
                .parse_arguments(&format!("\\begin{{{env_name}}}"), env)?;

            let env_context = EnvContext {
                mode: context.parser.mode,
                env_name: env_name.clone(),
                parser: &mut *context.parser,
            };
            let result = (env.handler)(env_context, env_args, env_opt_args)?;

            context.parser.expect("\\end", false)?;
            let end_name_token = context.parser.next_token.clone();
            let end = context.parser.parse_function(None, None)?;
            let Some(AnyParseNode::Environment(end_node)) = end else {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedEnvironmentAfterEnd {
                        found: env_name.clone(),
                    },
                ));
            };

            if end_node.name != env_name {
                let kind = ParseErrorKind::MismatchedEnvironmentEnd {
                    begin: env_name,
                    end: end_node.name,
                };
                return Err(if let Some(token) = &end_name_token {
                    ParseError::with_token(kind, token)
                } else {
                    ParseError::new(kind)
                });
            }

            Ok(result)
        }),
        html_builder: None,
        mathml_builder: None,
    });
}
