//! Render configuration.
//!
//! Every knob is independently toggleable through the builder; anything left
//! unset gets the documented default.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use bon::bon;

use crate::macros::MacroMap;
use crate::namespace::KeyMap;
use crate::types::{ErrorLocationProvider, ParseError, ParseErrorKind};
use crate::utils::protocol_from_url;

/// Which output tree(s) to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Box tree only.
    Html,
    /// Accessibility tree only.
    Mathml,
    /// Both, accessibility tree first.
    HtmlAndMathml,
}

/// Fixed strictness levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrictMode {
    /// Accept LaTeX-incompatible input silently.
    Ignore,
    /// Accept it, but write a warning to stderr.
    Warn,
    /// Reject it with a `StrictModeError`.
    Error,
}

/// Value a strict-mode callback may return to override the effective
/// strictness for a single report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrictReturn {
    /// A concrete mode.
    Mode(StrictMode),
    /// `true` maps to `Error`, `false` to `Ignore`.
    Bool(bool),
}

/// User-supplied strictness callback, consulted once per report.
pub type StrictFunction =
    dyn Fn(&str, &str, Option<&dyn ErrorLocationProvider>) -> Option<StrictReturn> + Send + Sync;

/// Strictness configuration: a fixed mode, a boolean shorthand, or a
/// per-report callback.
#[derive(Clone)]
pub enum StrictSetting {
    /// Fixed mode.
    Mode(StrictMode),
    /// `true` = error, `false` = ignore.
    Bool(bool),
    /// Callback returning an override per call; `None` means ignore.
    Function(Arc<StrictFunction>),
}

impl fmt::Debug for StrictSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mode(m) => f.debug_tuple("Mode").field(m).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl Default for StrictSetting {
    fn default() -> Self {
        Self::Mode(StrictMode::Warn)
    }
}

/// Details about a potentially dangerous command, handed to trust callbacks.
#[derive(Debug, Clone, Default)]
pub struct TrustContext {
    /// The command under scrutiny, e.g. `\href`.
    pub command: String,
    /// Target URL, when the command carries one.
    pub url: Option<String>,
    /// Protocol inferred from the URL (`_relative` for protocol-less URLs).
    pub protocol: Option<String>,
    /// Requested CSS class, when applicable.
    pub class: Option<String>,
    /// Requested element id, when applicable.
    pub id: Option<String>,
    /// Requested inline style, when applicable.
    pub style: Option<String>,
    /// Requested extra attributes, when applicable.
    pub attributes: Option<KeyMap<String, String>>,
}

/// User-supplied trust callback; `None` means "not trusted".
pub type TrustFunction = dyn Fn(&mut TrustContext) -> Option<bool> + Send + Sync;

/// Trust configuration gating `\href`/`\url` targets.
#[derive(Clone)]
pub enum TrustSetting {
    /// Trust everything (`true`) or nothing (`false`).
    Bool(bool),
    /// Decide per command/URL.
    Function(Arc<TrustFunction>),
}

impl fmt::Debug for TrustSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl Default for TrustSetting {
    fn default() -> Self {
        Self::Bool(false)
    }
}

/// Render configuration for a single invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Block (display) vs inline layout.
    pub display_mode: bool,
    /// Which output tree(s) to emit.
    pub output: OutputFormat,
    /// Equation numbers on the left.
    pub leqno: bool,
    /// Left-aligned display equations.
    pub fleqn: bool,
    /// Raise errors (`true`) or render them as colored text (`false`).
    pub throw_on_error: bool,
    /// CSS color used when rendering errors inline.
    pub error_color: String,
    /// Seed macro definitions; mutated by `\gdef` when `global_group` is set.
    pub macros: RefCell<MacroMap>,
    /// Minimum thickness for fraction bars and radical rules, in em.
    pub min_rule_thickness: f64,
    /// Strictness configuration.
    pub strict: StrictSetting,
    /// Trust configuration for URLs and similar.
    pub trust: TrustSetting,
    /// Cap on any computed size, in em.
    pub max_size: f64,
    /// Macro-expansion ceiling; the primary runaway-recursion guard.
    pub max_expand: usize,
    /// Keep the outermost namespace group open across the parse.
    pub global_group: bool,
    /// Global scaling factor.
    pub size_multiplier: f64,
    /// Base color for the rendered math.
    pub color: Option<String>,
}

#[bon]
impl Settings {
    /// Build settings, defaulting any omitted field.
    ///
    /// Defaults: inline mode, both outputs, `throw_on_error = true`,
    /// `error_color = "#cc0000"`, empty macro map,
    /// `min_rule_thickness = 0.0`, strict `warn`, trust `false`,
    /// `max_size = ∞`, `max_expand = 1000`, `size_multiplier = 1.0`.
    #[must_use]
    #[builder]
    pub fn new(
        /// Block (display) vs inline layout.
        display_mode: Option<bool>,
        /// Which output tree(s) to emit.
        output: Option<OutputFormat>,
        /// Equation numbers on the left.
        leqno: Option<bool>,
        /// Left-aligned display equations.
        fleqn: Option<bool>,
        /// Raise errors or render them inline.
        throw_on_error: Option<bool>,
        /// CSS color for rendered errors.
        error_color: Option<String>,
        /// Seed macro definitions.
        macros: Option<MacroMap>,
        /// Minimum rule thickness in em.
        min_rule_thickness: Option<f64>,
        /// Strictness configuration.
        strict: Option<StrictSetting>,
        /// Trust configuration.
        trust: Option<TrustSetting>,
        /// Cap on computed sizes, in em.
        max_size: Option<f64>,
        /// Macro-expansion ceiling.
        max_expand: Option<usize>,
        /// Keep the outermost group open across the parse.
        global_group: Option<bool>,
        /// Global scaling factor.
        size_multiplier: Option<f64>,
        /// Base color for the rendered math.
        color: Option<String>,
    ) -> Self {
        Self {
            display_mode: display_mode.unwrap_or(false),
            output: output.unwrap_or(OutputFormat::HtmlAndMathml),
            leqno: leqno.unwrap_or(false),
            fleqn: fleqn.unwrap_or(false),
            throw_on_error: throw_on_error.unwrap_or(true),
            error_color: error_color.unwrap_or_else(|| "#cc0000".to_owned()),
            macros: RefCell::from(macros.unwrap_or_default()),
            min_rule_thickness: min_rule_thickness.unwrap_or(0.0),
            strict: strict.unwrap_or_default(),
            trust: trust.unwrap_or_default(),
            max_size: max_size.unwrap_or(f64::INFINITY).max(0.0),
            max_expand: max_expand.unwrap_or(1000),
            global_group: global_group.unwrap_or(false),
            size_multiplier: size_multiplier.unwrap_or(1.0),
            color,
        }
    }

    /// Report LaTeX-incompatible input according to the strict setting.
    ///
    /// Accepts in `ignore`, warns to stderr and accepts in `warn`, rejects
    /// with a `StrictModeError` in `error`. A callback is consulted per
    /// report and its return value overrides the mode for that call only.
    #[expect(clippy::print_stderr)]
    pub fn report_nonstrict(
        &self,
        error_code: &str,
        error_msg: &str,
        token: Option<&dyn ErrorLocationProvider>,
    ) -> Result<(), ParseError> {
        match self.resolve_strict(error_code, error_msg, token) {
            StrictMode::Ignore => Ok(()),
            StrictMode::Error => {
                let kind = ParseErrorKind::StrictModeError {
                    message: error_msg.to_owned(),
                    code: error_code.to_owned(),
                };
                if let Some(t) = token {
                    Err(ParseError::with_token(kind, t))
                } else {
                    Err(ParseError::new(kind))
                }
            }
            StrictMode::Warn => {
                eprintln!(
                    "LaTeX-incompatible input and strict mode is set to 'warn': {error_msg} [{error_code}]"
                );
                Ok(())
            }
        }
    }

    /// Whether strict (LaTeX-adhering) behavior should be enforced for this
    /// finding. Warn mode logs and returns `false`.
    #[must_use]
    #[expect(clippy::print_stderr)]
    pub fn use_strict_behavior(
        &self,
        error_code: &str,
        error_msg: &str,
        token: Option<&dyn ErrorLocationProvider>,
    ) -> bool {
        match self.resolve_strict(error_code, error_msg, token) {
            StrictMode::Ignore => false,
            StrictMode::Error => true,
            StrictMode::Warn => {
                eprintln!(
                    "LaTeX-incompatible input and strict mode is set to 'warn': {error_msg} [{error_code}]"
                );
                false
            }
        }
    }

    /// Whether the potentially dangerous content in `context` is trusted.
    ///
    /// The protocol is inferred from the URL when absent; a malformed
    /// protocol is never trusted.
    pub fn is_trusted(&self, context: &mut TrustContext) -> bool {
        if context.protocol.is_none()
            && let Some(url) = &context.url
        {
            if let Some(protocol) = protocol_from_url(url) {
                context.protocol = Some(protocol);
            } else {
                return false;
            }
        }

        match &self.trust {
            TrustSetting::Bool(b) => *b,
            TrustSetting::Function(f) => f(context).unwrap_or(false),
        }
    }

    fn resolve_strict(
        &self,
        error_code: &str,
        error_msg: &str,
        token: Option<&dyn ErrorLocationProvider>,
    ) -> StrictMode {
        match &self.strict {
            StrictSetting::Mode(m) => *m,
            StrictSetting::Bool(b) => {
                if *b {
                    StrictMode::Error
                } else {
                    StrictMode::Ignore
                }
            }
            StrictSetting::Function(f) => match f(error_code, error_msg, token) {
                Some(StrictReturn::Mode(m)) => m,
                Some(StrictReturn::Bool(true)) => StrictMode::Error,
                Some(StrictReturn::Bool(false)) | None => StrictMode::Ignore,
            },
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.display_mode);
        assert!(settings.throw_on_error);
        assert_eq!(settings.error_color, "#cc0000");
        assert_eq!(settings.max_expand, 1000);
        assert_eq!(settings.max_size, f64::INFINITY);
        assert_eq!(settings.output, OutputFormat::HtmlAndMathml);
    }

    #[test]
    fn test_strict_error_mode_rejects() {
        let settings = Settings::builder()
            .strict(StrictSetting::Mode(StrictMode::Error))
            .build();
        assert!(settings.report_nonstrict("unicodeTextInMathMode", "test", None).is_err());
        assert!(settings.use_strict_behavior("unicodeTextInMathMode", "test", None));
    }

    #[test]
    fn test_strict_function_overrides_per_call() {
        let settings = Settings::builder()
            .strict(StrictSetting::Function(Arc::new(|code, _, _| {
                Some(StrictReturn::Bool(code == "commentAtEnd"))
            })))
            .build();
        assert!(settings.report_nonstrict("commentAtEnd", "test", None).is_err());
        assert!(settings.report_nonstrict("otherCode", "test", None).is_ok());
    }

    #[test]
    fn test_trust_defaults_to_untrusted() {
        let settings = Settings::default();
        let mut ctx = TrustContext {
            command: r"\url".to_owned(),
            url: Some("https://example.com".to_owned()),
            ..TrustContext::default()
        };
        assert!(!settings.is_trusted(&mut ctx));
        assert_eq!(ctx.protocol.as_deref(), Some("https"));
    }

    #[test]
    fn test_trust_callback_sees_protocol() {
        let settings = Settings::builder()
            .trust(TrustSetting::Function(Arc::new(|ctx: &mut TrustContext| {
                Some(ctx.protocol.as_deref() == Some("https"))
            })))
            .build();
        let mut https = TrustContext {
            command: r"\href".to_owned(),
            url: Some("https://example.com".to_owned()),
            ..TrustContext::default()
        };
        let mut javascript = TrustContext {
            command: r"\href".to_owned(),
            url: Some("javascript:alert(1)".to_owned()),
            ..TrustContext::default()
        };
        assert!(settings.is_trusted(&mut https));
        assert!(!settings.is_trusted(&mut javascript));
    }
}
