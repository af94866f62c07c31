use crate::constants::{is_structural_char, ESCAPE, LIST_MARKER, QUOTE};
use crate::error::{Error, Result};
use crate::utils::{literal, TextSink};

/// Escape special characters in a string for quoted output.
pub fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    escape_string_into(&mut result, s);
    result
}

pub(crate) fn escape_string_into<B: TextSink>(out: &mut B, s: &str) {
    for ch in s.chars() {
        match ch {
            '\n' => out.put_str("\\n"),
            '\r' => out.put_str("\\r"),
            '\t' => out.put_str("\\t"),
            QUOTE => out.put_str("\\\""),
            ESCAPE => out.put_str("\\\\"),
            _ => out.put_char(ch),
        }
    }
}

/// Reverse of [`escape_string`] applied to a full quoted token (leading
/// quote included). Fails on an unterminated region, an unknown escape
/// sequence, or content after the closing quote.
pub(crate) fn unquote(token: &str, line: usize) -> Result<String> {
    let inner = match token.strip_prefix(QUOTE) {
        Some(inner) => inner,
        None => return Err(Error::quoting(line, "expected a quoted token")),
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == ESCAPE {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some(QUOTE) => out.push(QUOTE),
                Some(ESCAPE) => out.push(ESCAPE),
                Some(other) => {
                    return Err(Error::quoting(
                        line,
                        format!("invalid escape sequence: \\{other}"),
                    ))
                }
                None => return Err(Error::quoting(line, "unterminated escape sequence")),
            }
        } else if ch == QUOTE {
            if chars.next().is_some() {
                return Err(Error::quoting(
                    line,
                    "unexpected characters after closing quote",
                ));
            }
            return Ok(out);
        } else {
            out.push(ch);
        }
    }

    Err(Error::quoting(line, "unterminated string: missing closing quote"))
}

/// Check if a key can be written without quotes (alphanumeric, underscore,
/// dot). Anything else round-trips through the quoted form.
///
/// # Examples
/// ```
/// use toon_codec::is_valid_unquoted_key;
///
/// assert!(is_valid_unquoted_key("user_name"));
/// assert!(!is_valid_unquoted_key("1bad"));
/// ```
pub fn is_valid_unquoted_key(key: &str) -> bool {
    let bytes = key.as_bytes();
    let first = match bytes.first() {
        Some(first) => *first,
        None => return false,
    };
    if !first.is_ascii_alphabetic() && first != b'_' {
        return false;
    }

    bytes[1..]
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'.')
}

/// Determine whether a string value must be quoted to survive a round
/// trip, given the active delimiter.
///
/// # Examples
/// ```
/// use toon_codec::needs_quoting;
///
/// assert!(needs_quoting("true", ','));
/// assert!(needs_quoting("a,b", ','));
/// assert!(!needs_quoting("hello world", ','));
/// ```
pub fn needs_quoting(s: &str, delimiter: char) -> bool {
    if s.is_empty() {
        return true;
    }

    // Reserved spellings and number-shaped strings would re-classify on
    // decode.
    if literal::is_keyword(s) || literal::parse_number(s).is_some() {
        return true;
    }

    let mut chars = s.chars();
    let first = match chars.next() {
        Some(ch) => ch,
        None => return true,
    };

    if first.is_whitespace() || first == LIST_MARKER {
        return true;
    }

    let mut last = first;
    for ch in s.chars() {
        if is_structural_char(ch)
            || ch == QUOTE
            || ch == ESCAPE
            || ch == delimiter
            || ch == '\n'
            || ch == '\r'
            || ch == '\t'
        {
            return true;
        }
        last = ch;
    }

    last.is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Delimiter;

    #[rstest::rstest]
    fn test_escape_string() {
        assert_eq!(escape_string("hello"), "hello");
        assert_eq!(escape_string("hello\nworld"), "hello\\nworld");
        assert_eq!(escape_string("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_string("back\\slash"), "back\\\\slash");
        assert_eq!(escape_string("tab\there"), "tab\\there");
    }

    #[rstest::rstest]
    fn test_unquote_mirrors_escape() {
        for original in ["", "hello", "a\nb", "say \"hi\"", "back\\slash", "x\r\ty"] {
            let mut quoted = String::from('"');
            escape_string_into(&mut quoted, original);
            quoted.push('"');
            assert_eq!(unquote(&quoted, 1).unwrap(), original);
        }
    }

    #[rstest::rstest]
    fn test_unquote_failures() {
        let err = unquote("\"missing", 3).unwrap_err();
        assert!(err.to_string().contains("unterminated"));
        assert_eq!(err.line(), Some(3));

        let err = unquote(r#""bad\x""#, 1).unwrap_err();
        assert!(err.to_string().contains("invalid escape sequence"));

        let err = unquote(r#""hello" trailing"#, 1).unwrap_err();
        assert!(err.to_string().contains("after closing quote"));
    }

    #[rstest::rstest]
    fn test_needs_quoting() {
        let comma = Delimiter::Comma.as_char();

        assert!(needs_quoting("", comma));

        assert!(needs_quoting("true", comma));
        assert!(needs_quoting("false", comma));
        assert!(needs_quoting("null", comma));
        assert!(needs_quoting("123", comma));
        assert!(needs_quoting("-5", comma));
        assert!(needs_quoting("1.5e3", comma));
        // not valid under the number grammar, safe bare
        assert!(!needs_quoting("05", comma));
        assert!(!needs_quoting("1x", comma));

        assert!(needs_quoting("hello[world]", comma));
        assert!(needs_quoting("key:value", comma));
        assert!(needs_quoting("{brace}", comma));

        assert!(needs_quoting("a,b", comma));
        assert!(!needs_quoting("a,b", Delimiter::Pipe.as_char()));
        assert!(needs_quoting("a|b", Delimiter::Pipe.as_char()));

        assert!(!needs_quoting("hello world", comma));
        assert!(needs_quoting(" hello", comma));
        assert!(needs_quoting("hello ", comma));
        assert!(needs_quoting("- item", comma));
        assert!(needs_quoting("-dash", comma));

        assert!(!needs_quoting("hello", comma));
        assert!(!needs_quoting("héllo wörld", comma));
    }

    #[rstest::rstest]
    fn test_is_valid_unquoted_key() {
        assert!(is_valid_unquoted_key("normal_key"));
        assert!(is_valid_unquoted_key("key123"));
        assert!(is_valid_unquoted_key("key.value"));
        assert!(is_valid_unquoted_key("_private"));
        assert!(is_valid_unquoted_key("KeyName"));
        assert!(is_valid_unquoted_key("a"));
        assert!(is_valid_unquoted_key("_"));

        assert!(!is_valid_unquoted_key(""));
        assert!(!is_valid_unquoted_key("123"));
        assert!(!is_valid_unquoted_key("key:value"));
        assert!(!is_valid_unquoted_key("key-value"));
        assert!(!is_valid_unquoted_key("key value"));
        assert!(!is_valid_unquoted_key(".key"));
        assert!(!is_valid_unquoted_key("key[value]"));
        assert!(!is_valid_unquoted_key("key{value}"));
    }
}
