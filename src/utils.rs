//! Small string helpers shared by the builders.

use std::fmt;

/// Convert a camelCase name to hyphen-case.
///
/// Used when turning node-type names into CSS class fragments.
#[must_use]
pub fn hyphenate(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, ch) in s.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i != 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Escape markup-significant characters into a fresh string.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let _ = escape_into(&mut escaped, text);
    escaped
}

/// Stream the escaped form of `text` into `writer`.
///
/// Replaces `&`, `<`, `>`, `"` and `'` with entities; every other byte is
/// copied through in runs to avoid per-character writes.
#[inline]
pub fn escape_into<W: fmt::Write>(writer: &mut W, text: &str) -> fmt::Result {
    let mut last = 0;
    for (idx, ch) in text.char_indices() {
        let replacement = match ch {
            '&' => Some("&amp;"),
            '>' => Some("&gt;"),
            '<' => Some("&lt;"),
            '"' => Some("&quot;"),
            '\'' => Some("&#x27;"),
            _ => None,
        };
        if let Some(rep) = replacement {
            if last < idx {
                writer.write_str(&text[last..idx])?;
            }
            writer.write_str(rep)?;
            last = idx + ch.len_utf8();
        }
    }
    if last < text.len() {
        writer.write_str(&text[last..])
    } else {
        Ok(())
    }
}

/// Extract the scheme of a URL for trust checks.
///
/// Returns the lowercase scheme, `"_relative"` for URLs without one, or
/// `None` when the scheme is malformed (including colons smuggled in as
/// HTML entities, which browsers would decode after us).
#[must_use]
pub fn protocol_from_url(url: &str) -> Option<String> {
    let mut s = url;

    // Control characters and spaces before the scheme are ignored by
    // browsers, so strip them before inspecting.
    while let Some(first) = s.chars().next() {
        if first <= '\u{20}' {
            s = &s[first.len_utf8()..];
        } else {
            break;
        }
    }

    for (i, ch) in s.char_indices() {
        if ch == ':' {
            return validate_scheme(&s[..i], ":");
        } else if ch == '&' {
            if let Some((entity, _skip)) = match_html_colon_entity(&s[i..]) {
                return validate_scheme(&s[..i], entity);
            }
        } else if ch == '\\' || ch == '/' || ch == '#' || ch == '?' {
            return Some("_relative".into());
        }
    }

    Some("_relative".into())
}

/// Recognize `&#0*58`, `&#x0*3a` and `&colon` forms of a colon.
fn match_html_colon_entity(s: &str) -> Option<(&'static str, usize)> {
    if let Some(decimal) = s.strip_prefix("&#") {
        let mut idx = 0;
        while decimal[idx..].starts_with('0') {
            idx += 1;
        }
        if decimal[idx..].starts_with("58") {
            return Some(("&#0*58", 2 + idx + 2));
        }
        if decimal[idx..].starts_with('x') || decimal[idx..].starts_with('X') {
            let hexpart = &decimal[idx + 1..];
            let mut idx2 = 0;
            while hexpart[idx2..].starts_with('0') {
                idx2 += 1;
            }
            if hexpart[idx2..].to_ascii_lowercase().starts_with("3a") {
                return Some(("&#x0*3a", 2 + idx + 1 + idx2 + 2));
            }
        }
    }
    if s.to_ascii_lowercase().starts_with("&colon") {
        return Some(("&colon", 6));
    }
    None
}

fn validate_scheme(scheme: &str, colon_match: &str) -> Option<String> {
    if colon_match != ":" {
        return None;
    }
    let mut chars = scheme.chars();
    if !matches!(chars.next(), Some(c) if c.is_ascii_alphabetic()) {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        return None;
    }
    Some(scheme.to_lowercase())
}

/// Push a value onto a vector and return a mutable reference to it.
pub fn push_and_get_mut<T>(vec: &mut Vec<T>, value: T) -> &mut T {
    vec.push(value);
    let idx = vec.len() - 1;
    &mut vec[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphenate() {
        assert_eq!(hyphenate("camelCase"), "camel-case");
        assert_eq!(hyphenate("verticalAlign"), "vertical-align");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape("<i>\"x\"</i>"), "&lt;i&gt;&quot;x&quot;&lt;/i&gt;");
        assert_eq!(escape("it's"), "it&#x27;s");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_protocol_from_url() {
        assert_eq!(protocol_from_url("https://example.com"), Some("https".into()));
        assert_eq!(protocol_from_url("FTP://example.com"), Some("ftp".into()));
        assert_eq!(protocol_from_url("mailto:me@example.com"), Some("mailto".into()));
        assert_eq!(protocol_from_url("/path/to/file"), Some("_relative".into()));
        assert_eq!(protocol_from_url("  \u{0007}../rel"), Some("_relative".into()));
        assert_eq!(protocol_from_url("1abc://foo"), None);
        assert_eq!(protocol_from_url("abc^://foo"), None);
        assert_eq!(protocol_from_url("http&#058//foo"), None);
        assert_eq!(protocol_from_url("http&#x03a//foo"), None);
        assert_eq!(protocol_from_url("http&colon//foo"), None);
    }
}
