use smallvec::SmallVec;

use crate::constants::{ESCAPE, LENGTH_MARKER, QUOTE};
use crate::error::{Error, Result};
use crate::options::Delimiter;
use crate::utils::{literal, string};
use crate::value::Value;

/// A parsed key, unescaped when it was quoted in the source.
#[derive(Debug, Clone)]
pub(crate) struct Key {
    pub text: String,
}

/// A parsed `key[N]:{fields}` header line. `inline` holds whatever
/// followed the colon when no field list did.
#[derive(Debug)]
pub(crate) struct ArrayHeader<'a> {
    pub key: Option<Key>,
    pub len: usize,
    pub fields: Option<SmallVec<[Key; 8]>>,
    pub inline: Option<&'a str>,
}

/// Split on the first colon outside quotes. Returns `None` when the line
/// has no unquoted colon.
pub(crate) fn split_key_value<'a>(
    content: &'a str,
    line: usize,
) -> Result<Option<(&'a str, &'a str)>> {
    let (colon, _) = find_unquoted(content, b':', line)?;
    Ok(colon.map(|idx| (&content[..idx], &content[idx + 1..])))
}

/// Recognize an array header: an unquoted `[` that precedes any unquoted
/// colon. Returns `None` for ordinary key/value or scalar lines; a line
/// that commits to the header shape but is malformed is an error.
pub(crate) fn parse_array_header<'a>(
    content: &'a str,
    delimiter: Delimiter,
    line: usize,
) -> Result<Option<ArrayHeader<'a>>> {
    let (colon, bracket) = find_unquoted(content, b':', line)?;
    let bracket = match bracket {
        Some(idx) => idx,
        None => return Ok(None),
    };
    if colon.is_some_and(|c| c < bracket) {
        return Ok(None);
    }

    let key_part = content[..bracket].trim();
    let key = if key_part.is_empty() {
        None
    } else {
        Some(parse_key_token(key_part, false, line)?)
    };

    let close = content[bracket + 1..]
        .find(']')
        .map(|i| bracket + 1 + i)
        .ok_or_else(|| Error::structure(line, "unterminated array header"))?;

    let mut count = &content[bracket + 1..close];
    if let Some(stripped) = count.strip_prefix(LENGTH_MARKER) {
        count = stripped;
    }
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::structure(
            line,
            format!("invalid array length '{count}'"),
        ));
    }
    let len: usize = count
        .parse()
        .map_err(|_| Error::structure(line, "array length out of range"))?;

    let rest = &content[close + 1..];
    let rest = rest
        .strip_prefix(':')
        .ok_or_else(|| Error::structure(line, "expected ':' after array header"))?;

    if let Some(body) = rest.trim_start().strip_prefix('{') {
        let end = body
            .find('}')
            .ok_or_else(|| Error::structure(line, "unterminated field list"))?;
        let mut fields: SmallVec<[Key; 8]> = SmallVec::new();
        for token in split_delimited(&body[..end], delimiter, line)? {
            if token.is_empty() {
                return Err(Error::structure(line, "empty field name in header"));
            }
            fields.push(parse_key_token(token, false, line)?);
        }
        let after = body[end + 1..].trim();
        if !after.is_empty() {
            return Err(Error::structure(line, "unexpected content after field list"));
        }
        return Ok(Some(ArrayHeader {
            key,
            len,
            fields: Some(fields),
            inline: None,
        }));
    }

    let inline = rest.trim();
    Ok(Some(ArrayHeader {
        key,
        len,
        fields: None,
        inline: (!inline.is_empty()).then_some(inline),
    }))
}

/// Split a row or inline payload on the delimiter, honoring quoted
/// segments. Each returned token is trimmed of surrounding whitespace.
pub(crate) fn split_delimited<'a>(
    input: &'a str,
    delimiter: Delimiter,
    line: usize,
) -> Result<SmallVec<[&'a str; 8]>> {
    let delim = delimiter.as_char();
    let mut tokens: SmallVec<[&'a str; 8]> = SmallVec::new();
    let mut start = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if in_quotes {
            if ch == ESCAPE {
                escaped = true;
            } else if ch == QUOTE {
                in_quotes = false;
            }
            continue;
        }
        if ch == QUOTE {
            in_quotes = true;
            continue;
        }
        if ch == delim {
            tokens.push(input[start..idx].trim());
            start = idx + 1;
        }
    }

    if in_quotes {
        return Err(Error::quoting(line, "unterminated string"));
    }

    tokens.push(input[start..].trim());
    Ok(tokens)
}

/// Classify one trimmed token with fixed precedence: quoted string, then
/// null, booleans, the number grammar, and finally a bare string.
pub(crate) fn parse_scalar_token(token: &str, line: usize) -> Result<Value> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(Value::String(String::new()));
    }

    if token.starts_with(QUOTE) {
        return Ok(Value::String(string::unquote(token, line)?));
    }

    match token {
        "null" => return Ok(Value::Null),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    if let Some(number) = literal::parse_number(token) {
        return Ok(Value::Number(number));
    }

    Ok(Value::String(token.to_string()))
}

pub(crate) fn parse_key_token(token: &str, strict: bool, line: usize) -> Result<Key> {
    let token = token.trim();
    if token.starts_with(QUOTE) {
        return Ok(Key {
            text: string::unquote(token, line)?,
        });
    }
    if token.is_empty() {
        return Err(Error::structure(line, "empty key"));
    }
    if strict && token.chars().any(char::is_whitespace) {
        return Err(Error::structure(
            line,
            format!("unquoted key '{token}' contains whitespace"),
        ));
    }
    Ok(Key {
        text: token.to_string(),
    })
}

/// Locate the first unquoted occurrence of `target` and of `[` in one
/// pass. Errors on an unterminated quoted region.
fn find_unquoted(
    content: &str,
    target: u8,
    line: usize,
) -> Result<(Option<usize>, Option<usize>)> {
    let mut target_at = None;
    let mut bracket_at = None;
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, byte) in content.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        if in_quotes {
            if byte == ESCAPE as u8 {
                escaped = true;
            } else if byte == QUOTE as u8 {
                in_quotes = false;
            }
            continue;
        }
        if byte == QUOTE as u8 {
            in_quotes = true;
            continue;
        }
        if byte == target && target_at.is_none() {
            target_at = Some(idx);
        }
        if byte == b'[' && bracket_at.is_none() {
            bracket_at = Some(idx);
        }
    }

    if in_quotes {
        return Err(Error::quoting(line, "unterminated string"));
    }

    Ok((target_at, bracket_at))
}
