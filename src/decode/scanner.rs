use memchr::memchr;

use crate::error::{Error, Result};
use crate::options::ToonOptions;

/// One logical line of input: structural depth, trimmed content, and the
/// raw source line for diagnostics.
#[derive(Debug, Clone)]
pub(crate) struct Line<'a> {
    pub depth: usize,
    pub content: &'a str,
    pub raw: &'a str,
    pub number: usize,
    pub blank: bool,
}

/// Split raw text into logical lines. Strict mode rejects tab indentation
/// and widths that are not a multiple of the configured step; non-strict
/// mode counts a tab as one indent unit and rounds mismatched widths
/// down.
pub(crate) fn scan<'a>(input: &'a str, options: &ToonOptions) -> Result<Vec<Line<'a>>> {
    let step = options.indent.get_spaces();
    if step == 0 {
        return Err(Error::scan(1, "indent width must be positive"));
    }

    let mut lines = Vec::new();
    let bytes = input.as_bytes();
    let mut offset = 0;
    let mut number = 0;

    loop {
        number += 1;
        let end = memchr(b'\n', &bytes[offset..]).map(|i| offset + i);
        let raw = match end {
            Some(e) => &input[offset..e],
            None => &input[offset..],
        };
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        lines.push(scan_line(line, step, options.strict, number)?);

        match end {
            Some(e) => offset = e + 1,
            None => break,
        }
    }

    Ok(lines)
}

fn scan_line<'a>(line: &'a str, step: usize, strict: bool, number: usize) -> Result<Line<'a>> {
    let mut columns = 0usize;
    let mut consumed = 0usize;

    for ch in line.chars() {
        match ch {
            ' ' => {
                columns += 1;
                consumed += 1;
            }
            '\t' => {
                if strict {
                    return Err(Error::scan(number, "tabs are not allowed in indentation"));
                }
                columns += step;
                consumed += 1;
            }
            _ => break,
        }
    }

    // indentation characters are all single-byte
    let content = line[consumed..].trim_end();
    if content.is_empty() {
        return Ok(Line {
            depth: 0,
            content: "",
            raw: line,
            number,
            blank: true,
        });
    }

    if strict && columns % step != 0 {
        return Err(Error::scan(
            number,
            format!("indentation of {columns} spaces is not a multiple of {step}"),
        ));
    }

    Ok(Line {
        depth: columns / step,
        content,
        raw: line,
        number,
        blank: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_default(input: &str) -> Result<Vec<Line<'_>>> {
        scan(input, &ToonOptions::default())
    }

    #[rstest::rstest]
    fn test_scan_depths_and_numbers() {
        let lines = scan_default("a: 1\n  b: 2\n    c: 3").unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].depth, 0);
        assert_eq!(lines[1].depth, 1);
        assert_eq!(lines[2].depth, 2);
        assert_eq!(lines[2].number, 3);
        assert_eq!(lines[1].content, "b: 2");
    }

    #[rstest::rstest]
    fn test_scan_blank_lines() {
        let lines = scan_default("a: 1\n\n   \nb: 2").unwrap();
        assert!(lines[1].blank);
        assert!(lines[2].blank);
        assert!(!lines[3].blank);
    }

    #[rstest::rstest]
    fn test_scan_strips_carriage_returns() {
        let lines = scan_default("a: 1\r\n  b: 2\r").unwrap();
        assert_eq!(lines[0].content, "a: 1");
        assert_eq!(lines[1].content, "b: 2");
    }

    #[rstest::rstest]
    fn test_scan_rejects_tabs_in_strict_mode() {
        let err = scan_default("\tkey: value").unwrap_err();
        assert!(err.to_string().contains("tabs are not allowed"));
        assert_eq!(err.line(), Some(1));
    }

    #[rstest::rstest]
    fn test_scan_rejects_uneven_indent_in_strict_mode() {
        let err = scan_default("a:\n   b: 1").unwrap_err();
        assert!(err.to_string().contains("not a multiple"));
        assert_eq!(err.line(), Some(2));
    }

    #[rstest::rstest]
    fn test_scan_non_strict_relaxations() {
        let options = ToonOptions::new().with_strict(false);
        let lines = scan("\tkey: 1\n   deep: 2", &options).unwrap();
        // tab counts as one indent unit
        assert_eq!(lines[0].depth, 1);
        // 3 spaces with step 2 rounds down
        assert_eq!(lines[1].depth, 1);
    }

    #[rstest::rstest]
    fn test_scan_rejects_zero_indent_width() {
        let err = scan("a: 1", &ToonOptions::new().with_spaces(0)).unwrap_err();
        assert!(err.to_string().contains("indent width"));
    }
}
