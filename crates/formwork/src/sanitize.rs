//! Input sanitization for submitted values.
//!
//! Submitted text is reduced to plain text before validation: entities are
//! decoded, HTML tags are stripped, and entities that the stripping exposed
//! are decoded again. Single-line widgets additionally collapse newlines to
//! spaces; the textarea variant keeps them.

use std::sync::{Arc, OnceLock};

use regex::Regex;

/// A sanitizer: raw submitted text in, plain text out.
pub type SanitizeFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| {
        Regex::new("<[^>]*>").unwrap_or_else(|e| unreachable!("tag pattern is valid: {e}"))
    })
}

fn newline_pattern() -> &'static Regex {
    static NEWLINES: OnceLock<Regex> = OnceLock::new();
    NEWLINES.get_or_init(|| {
        Regex::new("\r?\n").unwrap_or_else(|e| unreachable!("newline pattern is valid: {e}"))
    })
}

/// Sanitizes a multi-line value: trims, then strips HTML. Newlines survive.
pub fn plain_text(value: &str) -> String {
    strip_html(value.trim())
}

/// Sanitizes a single-line value: newlines become spaces, then the result is
/// trimmed and stripped of HTML.
pub fn one_line_plain_text(value: &str) -> String {
    let one_line = newline_pattern().replace_all(value, " ");
    strip_html(one_line.trim())
}

/// Decodes entities, drops every `<...>` run, and decodes entities the
/// stripping may have exposed (e.g. `&lt;b&gt;` turning into a tag's worth
/// of text).
fn strip_html(value: &str) -> String {
    let unescaped = unescape_entities(value);
    let stripped = tag_pattern().replace_all(&unescaped, "");
    unescape_entities(&stripped)
}

/// Decodes the named entities produced by common HTML escaping plus decimal
/// and hexadecimal character references. Unrecognized sequences pass through
/// untouched.
pub(crate) fn unescape_entities(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match decode_entity(tail) {
            Some((decoded, consumed)) => {
                out.push(decoded);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decodes one entity at the start of `tail` (which begins with `&`),
/// returning the character and the byte length consumed.
fn decode_entity(tail: &str) -> Option<(char, usize)> {
    let end = tail.find(';')?;
    let body = &tail[1..end];
    let consumed = end + 1;
    let named = match body {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    };
    if let Some(c) = named {
        return Some((c, consumed));
    }
    let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = body.strip_prefix('#') {
        dec.parse::<u32>().ok()?
    } else {
        return None;
    };
    char::from_u32(code).map(|c| (c, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line_strips_tags() {
        assert_eq!(one_line_plain_text("<b>bold</b> move"), "bold move");
    }

    #[test]
    fn test_one_line_collapses_newlines() {
        assert_eq!(one_line_plain_text("a\nb\r\nc"), "a b c");
        assert_eq!(one_line_plain_text("  padded \n"), "padded");
    }

    #[test]
    fn test_plain_text_keeps_newlines() {
        assert_eq!(plain_text("line one\nline two\n"), "line one\nline two");
    }

    #[test]
    fn test_escaped_tags_are_stripped_too() {
        // First decode exposes the tag, the strip removes it.
        assert_eq!(one_line_plain_text("&lt;script&gt;x&lt;/script&gt;"), "x");
    }

    #[test]
    fn test_double_escaped_entities_decode_after_strip() {
        assert_eq!(one_line_plain_text("&amp;lt;"), "<");
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(unescape_entities("&#65;&#x42;"), "AB");
        assert_eq!(unescape_entities("&#x27;"), "'");
    }

    #[test]
    fn test_unknown_entities_pass_through() {
        assert_eq!(unescape_entities("fish &chips; &nope"), "fish &chips; &nope");
    }

    #[test]
    fn test_plain_value_untouched() {
        assert_eq!(one_line_plain_text("hello world"), "hello world");
    }
}
